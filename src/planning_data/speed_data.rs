//! Longitudinal speed profile consumed by the path search

use serde::{Deserialize, Serialize};

use crate::common::{PlannerError, PlannerResult};

/// One sample of the speed profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedPoint {
    pub s: f64,
    pub t: f64,
    pub v: f64,
    pub a: f64,
    /// jerk [m/sss]
    pub da: f64,
}

impl SpeedPoint {
    pub fn new(s: f64, t: f64, v: f64, a: f64, da: f64) -> Self {
        Self { s, t, v, a, da }
    }
}

/// Speed profile ordered by time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeedData {
    points: Vec<SpeedPoint>,
}

impl SpeedData {
    pub fn new(points: Vec<SpeedPoint>) -> PlannerResult<Self> {
        if points.windows(2).any(|w| w[1].t < w[0].t) {
            return Err(PlannerError::InputUnavailable(
                "speed profile time must be non-decreasing".to_string(),
            ));
        }
        Ok(Self { points })
    }

    /// Profile holding `v` from the origin for `duration` seconds, sampled every `dt`
    pub fn constant(v: f64, duration: f64, dt: f64) -> Self {
        let n = (duration / dt).round() as usize;
        let points = (0..=n)
            .map(|i| {
                let t = i as f64 * dt;
                SpeedPoint::new(v * t, t, v, 0.0, 0.0)
            })
            .collect();
        Self { points }
    }

    /// Append a sample; ignored if it would go back in time
    pub fn add_speed_point(&mut self, s: f64, t: f64, v: f64, a: f64, da: f64) -> bool {
        if self.points.last().map_or(false, |last| t < last.t) {
            return false;
        }
        self.points.push(SpeedPoint::new(s, t, v, a, da));
        true
    }

    pub fn points(&self) -> &[SpeedPoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn total_time(&self) -> f64 {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => last.t - first.t,
            _ => 0.0,
        }
    }

    pub fn total_distance(&self) -> f64 {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => last.s - first.s,
            _ => 0.0,
        }
    }

    /// Distance travelled from the first sample until relative time `t`
    ///
    /// Linear interpolation, clamped to the profile's time range.
    pub fn distance_at_time(&self, t: f64) -> Option<f64> {
        let first = self.points.first()?;
        let last = self.points.last()?;
        let t_abs = (first.t + t).clamp(first.t, last.t);

        let idx = self.points.partition_point(|p| p.t <= t_abs);
        if idx == 0 {
            return Some(0.0);
        }
        if idx >= self.points.len() {
            return Some(last.s - first.s);
        }
        let p0 = &self.points[idx - 1];
        let p1 = &self.points[idx];
        let dt = p1.t - p0.t;
        let s = if dt <= f64::EPSILON {
            p0.s
        } else {
            p0.s + (p1.s - p0.s) * (t_abs - p0.t) / dt
        };
        Some(s - first.s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_constant_profile() {
        let speed = SpeedData::constant(10.0, 8.0, 0.1);
        assert_relative_eq!(speed.total_time(), 8.0, epsilon = 1e-9);
        assert_relative_eq!(speed.distance_at_time(7.0).unwrap(), 70.0, epsilon = 1e-9);
        assert_relative_eq!(speed.distance_at_time(20.0).unwrap(), 80.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rejects_time_going_back() {
        let points = vec![
            SpeedPoint::new(0.0, 0.0, 1.0, 0.0, 0.0),
            SpeedPoint::new(1.0, -1.0, 1.0, 0.0, 0.0),
        ];
        assert!(SpeedData::new(points).is_err());

        let mut speed = SpeedData::default();
        assert!(speed.add_speed_point(0.0, 1.0, 0.0, 0.0, 0.0));
        assert!(!speed.add_speed_point(0.0, 0.5, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_standing_still() {
        let mut speed = SpeedData::default();
        for i in 0..100 {
            speed.add_speed_point(0.0, i as f64 * 0.1, 0.0, 0.0, 0.0);
        }
        assert_eq!(speed.distance_at_time(7.0), Some(0.0));
        assert_eq!(SpeedData::default().distance_at_time(1.0), None);
    }
}
