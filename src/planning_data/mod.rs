//! Value objects exchanged with the planner's collaborators

pub mod speed_data;
pub mod decision_data;
pub mod path_data;

pub use speed_data::{SpeedData, SpeedPoint};
pub use decision_data::{DecisionData, DecisionIntent, ObstacleDecision};
pub use path_data::{DiscretizedPath, FrenetFramePath, PathData};
