//! Error types for dp_road_graph

use thiserror::Error;

/// Failure of one planning cycle
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlannerError {
    /// Reference line or init state cannot support the requested horizon
    #[error("Input unavailable: {0}")]
    InputUnavailable(String),

    /// Every candidate of a layer is blocked
    #[error("Infeasible: no collision-free node at layer {layer}")]
    Infeasible { layer: usize },

    /// Built path exceeds the curvature limit
    #[error("Kinematic violation: |kappa| = {kappa:.4} exceeds {limit:.4} at s = {s:.2}")]
    KinematicViolation { s: f64, kappa: f64, limit: f64 },

    /// Configuration values are inconsistent
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read or parsed
    #[error("Config load error: {0}")]
    ConfigLoad(String),

    /// Planner produced inconsistent output
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for PlannerError {
    fn from(e: std::io::Error) -> Self {
        PlannerError::ConfigLoad(e.to_string())
    }
}

impl From<toml::de::Error> for PlannerError {
    fn from(e: toml::de::Error) -> Self {
        PlannerError::ConfigLoad(e.to_string())
    }
}

/// Result type alias for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;
