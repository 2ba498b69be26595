//! DP poly path
//!
//! Lateral path search over a layered lattice of station / offset samples.
//! The sampler lays out the layers, the cost model scores quintic edges
//! between adjacent layers, the road graph runs forward dynamic programming
//! and the path builder densifies the winning node sequence.

pub mod config;
pub mod path_sampler;
pub mod trajectory_cost;
pub mod dp_road_graph;
pub mod path_builder;
pub mod optimizer;

pub use config::{CostWeights, DpPolyPathConfig, TieBreak};
pub use path_sampler::{init_frenet_point, PathSampler, SampleLayer};
pub use trajectory_cost::{is_blocked, TrajectoryCost, BLOCKED_COST};
pub use dp_road_graph::{DpRoadGraph, GraphNode, LayeredGraph, NodeIndex};
pub use path_builder::PathBuilder;
pub use optimizer::DpPolyPathOptimizer;
