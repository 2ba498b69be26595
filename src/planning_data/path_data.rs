//! Output of the path search: aligned Cartesian and Frenet paths

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::common::{FrenetFramePoint, PathPoint, PlannerError, PlannerResult};

fn lerp(a: f64, b: f64, ratio: f64) -> f64 {
    a + (b - a) * ratio
}

/// Cartesian path ordered by accumulated distance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscretizedPath {
    points: Vec<PathPoint>,
}

impl DiscretizedPath {
    pub fn new(points: Vec<PathPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[PathPoint] {
        &self.points
    }

    pub fn num_of_points(&self) -> usize {
        self.points.len()
    }

    /// Accumulated distance from the first to the last point
    pub fn length(&self) -> f64 {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => last.s - first.s,
            _ => 0.0,
        }
    }

    /// Interpolated point at accumulated distance `s`, clamped to the path
    pub fn evaluate(&self, s: f64) -> Option<PathPoint> {
        let first = self.points.first()?;
        let last = self.points.last()?;
        if s <= first.s {
            return Some(*first);
        }
        if s >= last.s {
            return Some(*last);
        }
        let (p0, p1) = self
            .points
            .iter()
            .tuple_windows()
            .find(|(_, p1)| p1.s >= s)?;
        let ds = p1.s - p0.s;
        let ratio = if ds > 0.0 { (s - p0.s) / ds } else { 0.0 };
        let dtheta = crate::math::normalize_angle(p1.theta - p0.theta);
        Some(PathPoint {
            x: lerp(p0.x, p1.x, ratio),
            y: lerp(p0.y, p1.y, ratio),
            theta: crate::math::normalize_angle(p0.theta + dtheta * ratio),
            kappa: lerp(p0.kappa, p1.kappa, ratio),
            dkappa: lerp(p0.dkappa, p1.dkappa, ratio),
            s,
        })
    }
}

/// Frenet path ordered by station
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrenetFramePath {
    points: Vec<FrenetFramePoint>,
}

impl FrenetFramePath {
    pub fn new(points: Vec<FrenetFramePoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[FrenetFramePoint] {
        &self.points
    }

    pub fn number_of_points(&self) -> usize {
        self.points.len()
    }

    /// Interpolated point at station `s`; `None` outside the covered range
    pub fn evaluate_by_s(&self, s: f64) -> Option<FrenetFramePoint> {
        let first = self.points.first()?;
        let last = self.points.last()?;
        if s < first.s || s > last.s {
            return None;
        }
        if self.points.len() == 1 {
            return Some(*first);
        }
        let idx = self.points.partition_point(|p| p.s < s).max(1);
        let p0 = &self.points[idx - 1];
        let p1 = &self.points[idx];
        let ds = p1.s - p0.s;
        let ratio = if ds > 0.0 { (s - p0.s) / ds } else { 0.0 };
        Some(FrenetFramePoint::new(
            s,
            lerp(p0.l, p1.l, ratio),
            lerp(p0.dl, p1.dl, ratio),
            lerp(p0.ddl, p1.ddl, ratio),
        ))
    }
}

/// Path produced by one successful search
///
/// Both sequences have the same length and index `i` of each refers to the
/// same physical point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathData {
    discretized_path: DiscretizedPath,
    frenet_frame_path: FrenetFramePath,
}

impl PathData {
    pub fn new(
        discretized_path: DiscretizedPath,
        frenet_frame_path: FrenetFramePath,
    ) -> PlannerResult<Self> {
        if discretized_path.num_of_points() != frenet_frame_path.number_of_points() {
            return Err(PlannerError::Internal(format!(
                "path size mismatch: {} cartesian vs {} frenet points",
                discretized_path.num_of_points(),
                frenet_frame_path.number_of_points()
            )));
        }
        Ok(Self {
            discretized_path,
            frenet_frame_path,
        })
    }

    pub fn discretized_path(&self) -> &DiscretizedPath {
        &self.discretized_path
    }

    pub fn frenet_frame_path(&self) -> &FrenetFramePath {
        &self.frenet_frame_path
    }

    /// Cartesian and Frenet point pairs
    pub fn iter(&self) -> impl Iterator<Item = (&PathPoint, &FrenetFramePoint)> {
        self.discretized_path
            .points()
            .iter()
            .zip(self.frenet_frame_path.points().iter())
    }

    pub fn len(&self) -> usize {
        self.discretized_path.num_of_points()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn point(x: f64, s: f64) -> PathPoint {
        PathPoint {
            x,
            y: 0.0,
            theta: 0.0,
            kappa: 0.0,
            dkappa: 0.0,
            s,
        }
    }

    #[test]
    fn test_mismatched_sizes_rejected() {
        let path = DiscretizedPath::new(vec![point(0.0, 0.0)]);
        let frenet = FrenetFramePath::new(vec![]);
        let err = PathData::new(path, frenet).unwrap_err();
        assert!(matches!(err, PlannerError::Internal(_)));
        assert!(format!("{}", err).contains("1 cartesian vs 0 frenet"));
    }

    #[test]
    fn test_discretized_evaluate() {
        let path = DiscretizedPath::new(vec![point(0.0, 0.0), point(1.0, 1.0), point(3.0, 3.0)]);
        assert_relative_eq!(path.length(), 3.0);
        assert_relative_eq!(path.evaluate(2.0).unwrap().x, 2.0);
        assert_relative_eq!(path.evaluate(-1.0).unwrap().x, 0.0);
        assert_relative_eq!(path.evaluate(10.0).unwrap().x, 3.0);
    }

    #[test]
    fn test_frenet_evaluate_by_s() {
        let frenet = FrenetFramePath::new(vec![
            FrenetFramePoint::new(0.0, 0.0, 0.0, 0.0),
            FrenetFramePoint::new(1.0, 1.0, 0.0, 0.0),
        ]);
        assert_relative_eq!(frenet.evaluate_by_s(0.25).unwrap().l, 0.25);
        assert_relative_eq!(frenet.evaluate_by_s(0.0).unwrap().l, 0.0);
        assert!(frenet.evaluate_by_s(1.5).is_none());
    }
}
