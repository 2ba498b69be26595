//! Configuration of the DP poly path search

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::{PlannerError, PlannerResult};

/// Rule used when several predecessors give the same cumulative cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Prefer the predecessor closest to the reference line
    #[default]
    NearestReference,
    /// Prefer the lowest candidate index (rightmost offset)
    FirstCandidate,
}

/// Weights of the edge cost terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostWeights {
    /// Squared lateral offset of the edge end node
    pub reference_deviation: f64,
    /// Squared lateral offset near the lane boundary
    pub lane_boundary: f64,
    /// Distance to the lane boundary below which `lane_boundary` applies [m]
    pub lane_boundary_buffer: f64,
    /// Squared first lateral derivative, integrated over station
    pub heading: f64,
    /// Squared second lateral derivative, integrated over station
    pub curvature: f64,
    /// Squared third lateral derivative, integrated over station
    pub curvature_rate: f64,
    /// Scale of the nudge clearance penalty
    pub obstacle: f64,
    /// Clearance floor used in the nudge penalty [m]
    pub min_clearance: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            reference_deviation: 1.0,
            lane_boundary: 10.0,
            lane_boundary_buffer: 0.5,
            heading: 5.0,
            curvature: 100.0,
            curvature_rate: 1000.0,
            obstacle: 1.0,
            min_clearance: 0.1,
        }
    }
}

/// DP road graph settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DpPolyPathConfig {
    /// Time span of the speed profile the path has to cover [s]
    pub planning_time: f64,
    /// Lower bound of the searched station distance [m]
    pub min_horizon_length: f64,
    /// Upper bound of the searched station distance [m]
    pub max_horizon_length: f64,
    /// Preferred number of sampled layers after the start node
    pub sample_level: usize,
    /// Minimum station spacing between layers [m]
    pub step_length_min: f64,
    /// Maximum station spacing between layers [m]
    pub step_length_max: f64,
    /// Lateral candidates per layer
    pub sample_points_num_each_level: usize,
    /// Lateral candidates on the first and last sampled layers
    pub boundary_level_points_num: usize,
    /// Largest sampled lateral offset magnitude [m]
    pub max_lateral_offset: f64,
    /// Station step of the smoothness integral [m]
    pub eval_resolution: f64,
    /// Station step of the output path [m]
    pub path_resolution: f64,
    /// Lateral buffer added around blocking footprints [m]
    pub vehicle_half_width: f64,
    /// Largest admissible path curvature [1/m]
    pub max_curvature: f64,
    pub tie_break: TieBreak,
    /// Minimize the nodes of one layer on the rayon pool
    pub parallel_search: bool,
    pub weights: CostWeights,
}

impl Default for DpPolyPathConfig {
    fn default() -> Self {
        Self {
            planning_time: 7.0,
            min_horizon_length: 20.0,
            max_horizon_length: 150.0,
            sample_level: 7,
            step_length_min: 8.0,
            step_length_max: 15.0,
            sample_points_num_each_level: 9,
            boundary_level_points_num: 9,
            max_lateral_offset: 2.0,
            eval_resolution: 0.5,
            path_resolution: 0.1,
            vehicle_half_width: 1.0,
            max_curvature: 0.2,
            tie_break: TieBreak::NearestReference,
            parallel_search: true,
            weights: CostWeights::default(),
        }
    }
}

impl DpPolyPathConfig {
    /// Load and validate a TOML file
    pub fn load(path: &Path) -> PlannerResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate TOML text; missing keys take default values
    pub fn from_toml_str(text: &str) -> PlannerResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PlannerResult<()> {
        let check = |ok: bool, msg: &str| {
            if ok {
                Ok(())
            } else {
                Err(PlannerError::InvalidConfig(msg.to_string()))
            }
        };

        check(self.planning_time > 0.0, "planning_time must be positive")?;
        check(
            self.min_horizon_length >= 0.0 && self.max_horizon_length > 0.0,
            "horizon bounds must be non-negative and the maximum positive",
        )?;
        check(
            self.min_horizon_length <= self.max_horizon_length,
            "min_horizon_length exceeds max_horizon_length",
        )?;
        check(self.sample_level >= 1, "sample_level must be at least 1")?;
        check(
            self.step_length_min > 0.0 && self.step_length_min <= self.step_length_max,
            "step lengths must satisfy 0 < min <= max",
        )?;
        check(
            self.sample_points_num_each_level >= 1,
            "sample_points_num_each_level must be at least 1",
        )?;
        check(
            self.boundary_level_points_num >= 1
                && self.boundary_level_points_num <= self.sample_points_num_each_level,
            "boundary_level_points_num must be in 1..=sample_points_num_each_level",
        )?;
        check(self.max_lateral_offset >= 0.0, "max_lateral_offset must be non-negative")?;
        check(self.eval_resolution > 0.0, "eval_resolution must be positive")?;
        check(self.path_resolution > 0.0, "path_resolution must be positive")?;
        check(self.vehicle_half_width >= 0.0, "vehicle_half_width must be non-negative")?;
        check(self.max_curvature > 0.0, "max_curvature must be positive")?;

        let w = &self.weights;
        check(
            [
                w.reference_deviation,
                w.lane_boundary,
                w.lane_boundary_buffer,
                w.heading,
                w.curvature,
                w.curvature_rate,
                w.obstacle,
            ]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0),
            "cost weights must be finite and non-negative",
        )?;
        check(w.min_clearance > 0.0, "min_clearance must be positive")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(DpPolyPathConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let text = r#"
            sample_points_num_each_level = 5
            tie_break = "first_candidate"

            [weights]
            obstacle = 2.5
        "#;
        let config = DpPolyPathConfig::from_toml_str(text).unwrap();
        assert_eq!(config.sample_points_num_each_level, 5);
        assert_eq!(config.tie_break, TieBreak::FirstCandidate);
        assert_eq!(config.weights.obstacle, 2.5);
        assert_eq!(config.weights.curvature, CostWeights::default().curvature);
        assert_eq!(config.path_resolution, 0.1);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = DpPolyPathConfig::from_toml_str("path_resolution = 0.0").unwrap_err();
        assert!(matches!(err, PlannerError::InvalidConfig(_)));

        let err = DpPolyPathConfig::from_toml_str("boundary_level_points_num = 12").unwrap_err();
        assert!(matches!(err, PlannerError::InvalidConfig(_)));
    }

    #[test]
    fn test_malformed_toml() {
        let err = DpPolyPathConfig::from_toml_str("sample_level = \"many\"").unwrap_err();
        assert!(matches!(err, PlannerError::ConfigLoad(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = DpPolyPathConfig::load(Path::new("/nonexistent/dp_poly_path.toml")).unwrap_err();
        assert!(matches!(err, PlannerError::ConfigLoad(_)));
    }
}
