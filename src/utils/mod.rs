//! Utility modules for dp_road_graph

pub mod visualization;

pub use visualization::{colors, PathStyle, PointStyle, Visualizer};
