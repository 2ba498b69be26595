//! Coordinate frame math shared by the reference line and path builder

pub mod cartesian_frenet_conversion;

pub use cartesian_frenet_conversion::{frenet_to_cartesian, normalize_angle};
