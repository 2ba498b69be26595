//! Lateral path optimizer backed by the DP road graph

use std::path::Path;

use log::{debug, info};

use crate::common::{PathOptimizer, PlannerResult, ReferenceLine, TrajectoryPoint};
use crate::planning_data::{DecisionData, PathData, SpeedData};

use super::config::DpPolyPathConfig;
use super::dp_road_graph::DpRoadGraph;

/// DP poly path optimizer
///
/// Holds only its configuration; every call to [`PathOptimizer::optimize`]
/// is an independent planning cycle.
#[derive(Debug, Clone, Default)]
pub struct DpPolyPathOptimizer {
    config: DpPolyPathConfig,
}

impl DpPolyPathOptimizer {
    pub fn new(config: DpPolyPathConfig) -> PlannerResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn from_file(path: &Path) -> PlannerResult<Self> {
        Ok(Self {
            config: DpPolyPathConfig::load(path)?,
        })
    }

    pub fn config(&self) -> &DpPolyPathConfig {
        &self.config
    }
}

impl PathOptimizer for DpPolyPathOptimizer {
    fn optimize(
        &self,
        reference_line: &dyn ReferenceLine,
        init_point: &TrajectoryPoint,
        speed_data: &SpeedData,
        decision_data: &DecisionData,
    ) -> PlannerResult<PathData> {
        debug!(
            "[DpPolyPath] planning from ({:.2}, {:.2}) at v = {:.2} with {} decisions",
            init_point.x,
            init_point.y,
            init_point.v,
            decision_data.len()
        );

        let graph = DpRoadGraph::new(&self.config, init_point, speed_data);
        match graph.find_tunnel(reference_line, decision_data) {
            Ok(path) => {
                info!(
                    "[DpPolyPath] path found: {} points, {:.2} m",
                    path.len(),
                    path.discretized_path().length()
                );
                Ok(path)
            }
            Err(e) => {
                info!("[DpPolyPath] planning failed: {}", e);
                Err(e)
            }
        }
    }
}
