//! Reference line backed by a cubic spline through waypoints

use crate::common::{Point2D, PlannerError, PlannerResult, ReferenceLine, ReferencePoint, SlPoint};
use crate::path_planning::cubic_spline_planner::Spline2D;

/// Spacing of the coarse samples used to seed the projection [m]
const PROJECTION_SAMPLE_STEP: f64 = 0.5;
const PROJECTION_MAX_ITER: usize = 20;
const STATION_TOLERANCE: f64 = 1e-6;

/// Reference line built from waypoints
#[derive(Debug, Clone)]
pub struct SplineReferenceLine {
    spline: Spline2D,
    samples: Vec<(f64, Point2D)>,
    lane_half_width: Option<f64>,
}

impl SplineReferenceLine {
    pub fn new(xs: &[f64], ys: &[f64]) -> PlannerResult<Self> {
        let spline = Spline2D::new(xs, ys)?;
        let length = spline.length();
        if length <= 0.0 {
            return Err(PlannerError::InputUnavailable(
                "reference line has zero length".to_string(),
            ));
        }

        let n = (length / PROJECTION_SAMPLE_STEP).ceil() as usize;
        let samples = (0..=n)
            .map(|i| {
                let s = (i as f64 * PROJECTION_SAMPLE_STEP).min(length);
                let (x, y) = spline.calc_position(s);
                (s, Point2D::new(x, y))
            })
            .collect();

        Ok(Self {
            spline,
            samples,
            lane_half_width: None,
        })
    }

    /// Straight reference line from `start` along `heading`
    pub fn straight(start: Point2D, heading: f64, length: f64) -> PlannerResult<Self> {
        let (sin_h, cos_h) = heading.sin_cos();
        let xs = [start.x, start.x + length * 0.5 * cos_h, start.x + length * cos_h];
        let ys = [start.y, start.y + length * 0.5 * sin_h, start.y + length * sin_h];
        Self::new(&xs, &ys)
    }

    /// Restrict the drivable corridor to `[-half_width, half_width]`
    pub fn with_lane_half_width(mut self, half_width: f64) -> Self {
        self.lane_half_width = Some(half_width);
        self
    }

    pub fn spline(&self) -> &Spline2D {
        &self.spline
    }

    fn nearest_sample_station(&self, point: Point2D) -> f64 {
        self.samples
            .iter()
            .min_by(|a, b| a.1.distance(&point).total_cmp(&b.1.distance(&point)))
            .map(|(s, _)| *s)
            .unwrap_or(0.0)
    }
}

impl ReferenceLine for SplineReferenceLine {
    fn length(&self) -> f64 {
        self.spline.length()
    }

    fn reference_point(&self, s: f64) -> Option<ReferencePoint> {
        let length = self.length();
        if s < -STATION_TOLERANCE || s > length + STATION_TOLERANCE {
            return None;
        }
        let s = s.clamp(0.0, length);
        let (x, y) = self.spline.calc_position(s);
        Some(ReferencePoint {
            x,
            y,
            heading: self.spline.calc_yaw(s),
            kappa: self.spline.calc_curvature(s),
            dkappa: self.spline.calc_curvature_derivative(s),
        })
    }

    fn to_curvilinear(&self, point: Point2D) -> Option<SlPoint> {
        let length = self.length();
        let mut s = self.nearest_sample_station(point);

        // Newton iterations on d/ds |C(s) - P|^2 / 2
        for _ in 0..PROJECTION_MAX_ITER {
            let (x, y) = self.spline.calc_position(s);
            let (dx, dy) = self.spline.calc_tangent(s);
            let (ddx, ddy) = self.spline.calc_second_derivative(s);
            let ex = x - point.x;
            let ey = y - point.y;
            let f = ex * dx + ey * dy;
            let df = dx * dx + dy * dy + ex * ddx + ey * ddy;
            if df.abs() < 1e-12 {
                break;
            }
            let step = f / df;
            s = (s - step).clamp(0.0, length);
            if step.abs() < 1e-10 {
                break;
            }
        }

        if !s.is_finite() {
            return None;
        }
        let (x, y) = self.spline.calc_position(s);
        let (sin_h, cos_h) = self.spline.calc_yaw(s).sin_cos();
        let l = -(point.x - x) * sin_h + (point.y - y) * cos_h;
        Some(SlPoint::new(s, l))
    }

    fn lateral_bounds(&self, _s: f64) -> (f64, f64) {
        match self.lane_half_width {
            Some(w) => (-w, w),
            None => (f64::NEG_INFINITY, f64::INFINITY),
        }
    }
}
