//! Common traits defining interfaces for planner collaborators

use crate::common::error::PlannerResult;
use crate::common::types::*;
use crate::math::cartesian_frenet_conversion;
use crate::planning_data::{DecisionData, PathData, SpeedData};

/// Read-only query surface of a reference line
///
/// Implementations must be free of interior mutability visible to callers:
/// the search queries them from several threads within one cycle.
pub trait ReferenceLine: Sync {
    /// Total station length [m]
    fn length(&self) -> f64;

    /// Reference point at station `s`, `None` outside `[0, length]`
    fn reference_point(&self, s: f64) -> Option<ReferencePoint>;

    /// Project a Cartesian point into station / lateral offset
    fn to_curvilinear(&self, point: Point2D) -> Option<SlPoint>;

    /// Reference curvature at station `s`
    fn curvature_at(&self, s: f64) -> Option<f64> {
        self.reference_point(s).map(|p| p.kappa)
    }

    /// Drivable (right, left) lateral offsets at station `s`
    fn lateral_bounds(&self, _s: f64) -> (f64, f64) {
        (f64::NEG_INFINITY, f64::INFINITY)
    }

    /// Convert a Frenet state into a Cartesian pose
    ///
    /// `dddl` only feeds the curvature rate; pass 0 when unknown.
    fn to_cartesian(&self, s: f64, l: f64, dl: f64, ddl: f64, dddl: f64) -> Option<CartesianPoint> {
        let reference = self.reference_point(s)?;
        Some(cartesian_frenet_conversion::frenet_to_cartesian(
            &reference, l, dl, ddl, dddl,
        ))
    }
}

/// Trait for lateral path optimizers
pub trait PathOptimizer {
    /// Produce a path for one planning cycle
    fn optimize(
        &self,
        reference_line: &dyn ReferenceLine,
        init_point: &TrajectoryPoint,
        speed_data: &SpeedData,
        decision_data: &DecisionData,
    ) -> PlannerResult<PathData>;
}
