//! dp_road_graph - lateral path search over a DP road graph
//!
//! Given a reference line, the vehicle's init state, a speed profile and a
//! set of obstacle decisions, this crate finds a smooth, collision-free
//! lateral path by dynamic programming over sampled station / offset layers.

// Core modules
pub mod common;
pub mod math;
pub mod utils;

// Planner inputs and outputs
pub mod planning_data;
pub mod reference_line;

// Algorithm modules
pub mod path_planning;

// Re-export common types for convenience
pub use common::{FrenetFramePoint, PathPoint, Point2D, SlPoint, TrajectoryPoint};
pub use common::{PathOptimizer, ReferenceLine};
pub use common::{PlannerError, PlannerResult};
pub use path_planning::dp_poly_path::{DpPolyPathConfig, DpPolyPathOptimizer};
pub use planning_data::{DecisionData, ObstacleDecision, PathData, SpeedData};
