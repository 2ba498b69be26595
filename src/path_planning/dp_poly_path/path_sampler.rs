//! Lattice sampling ahead of the vehicle
//!
//! Produces the layers of the road graph: layer 0 holds the projected init
//! state, every following layer a fan of lateral offsets at one station.

use log::{debug, trace};

use crate::common::{
    FrenetFramePoint, PlannerError, PlannerResult, ReferenceLine, TrajectoryPoint,
};
use crate::math::cartesian_frenet_conversion;
use crate::planning_data::SpeedData;

use super::config::DpPolyPathConfig;

const HORIZON_EPSILON: f64 = 1e-6;

/// Candidate lateral offsets at one station
#[derive(Debug, Clone, PartialEq)]
pub struct SampleLayer {
    pub s: f64,
    /// Ordered from right to left
    pub offsets: Vec<f64>,
    /// Drivable (right, left) offsets at `s`
    pub bounds: (f64, f64),
}

impl SampleLayer {
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// Project the init state into the reference frame, with the lateral
/// derivatives implied by its heading and curvature
pub fn init_frenet_point(
    reference_line: &dyn ReferenceLine,
    init_point: &TrajectoryPoint,
) -> PlannerResult<FrenetFramePoint> {
    let state = [init_point.x, init_point.y, init_point.theta, init_point.kappa];
    if state.iter().any(|v| !v.is_finite()) {
        return Err(PlannerError::InputUnavailable(format!(
            "init point has non-finite pose or curvature: {:?}",
            state
        )));
    }
    let sl = reference_line
        .to_curvilinear(init_point.position())
        .ok_or_else(|| {
            PlannerError::InputUnavailable(format!(
                "cannot project init point ({:.2}, {:.2}) onto reference line",
                init_point.x, init_point.y
            ))
        })?;
    let reference = reference_line.reference_point(sl.s).ok_or_else(|| {
        PlannerError::InputUnavailable(format!("no reference point at s = {:.2}", sl.s))
    })?;

    let dl = cartesian_frenet_conversion::lateral_derivative(
        reference.heading,
        init_point.theta,
        sl.l,
        reference.kappa,
    );
    let ddl = cartesian_frenet_conversion::second_order_lateral_derivative(
        reference.heading,
        init_point.theta,
        reference.kappa,
        init_point.kappa,
        reference.dkappa,
        sl.l,
    );
    Ok(FrenetFramePoint::new(sl.s, sl.l, dl, ddl))
}

/// Lattice sampler
pub struct PathSampler<'a> {
    config: &'a DpPolyPathConfig,
}

impl<'a> PathSampler<'a> {
    pub fn new(config: &'a DpPolyPathConfig) -> Self {
        Self { config }
    }

    /// Station distance to search, clamped to the configured bounds
    pub fn planning_horizon(&self, init_point: &TrajectoryPoint, speed_data: &SpeedData) -> f64 {
        let planned = speed_data
            .distance_at_time(self.config.planning_time)
            .unwrap_or_else(|| init_point.v.max(0.0) * self.config.planning_time);
        planned.clamp(self.config.min_horizon_length, self.config.max_horizon_length)
    }

    /// Evenly spaced layer stations; the last one is exactly `init_s + horizon`
    pub fn layer_stations(&self, init_s: f64, horizon: f64) -> Vec<f64> {
        let config = self.config;
        let mut count = config.sample_level.max(1);
        let step = horizon / count as f64;
        if step > config.step_length_max {
            count = (horizon / config.step_length_max).ceil() as usize;
        } else if step < config.step_length_min {
            count = ((horizon / config.step_length_min).floor() as usize).max(1);
        }
        let step = horizon / count as f64;

        (1..=count)
            .map(|i| {
                if i == count {
                    init_s + horizon
                } else {
                    init_s + step * i as f64
                }
            })
            .collect()
    }

    /// `count` offsets spread evenly over `[-max, max]`, right to left
    pub fn lateral_offsets(&self, count: usize) -> Vec<f64> {
        let max = self.config.max_lateral_offset;
        if count <= 1 {
            return vec![0.0];
        }
        let spacing = 2.0 * max / (count - 1) as f64;
        (0..count).map(|i| -max + spacing * i as f64).collect()
    }

    /// Offsets of the first and last sampled layers: the central part of the
    /// regular fan
    fn boundary_offsets(&self) -> Vec<f64> {
        let regular = self.lateral_offsets(self.config.sample_points_num_each_level);
        let keep = self.config.boundary_level_points_num.min(regular.len());
        let start = (regular.len() - keep) / 2;
        regular[start..start + keep].to_vec()
    }

    /// Sample all layers starting from the projected init state
    pub fn generate_layers(
        &self,
        reference_line: &dyn ReferenceLine,
        init_point: &TrajectoryPoint,
        speed_data: &SpeedData,
    ) -> PlannerResult<Vec<SampleLayer>> {
        let init = init_frenet_point(reference_line, init_point)?;
        self.sample_from(reference_line, &init, init_point, speed_data)
    }

    /// Sample all layers from an already projected init state
    pub fn sample_from(
        &self,
        reference_line: &dyn ReferenceLine,
        init: &FrenetFramePoint,
        init_point: &TrajectoryPoint,
        speed_data: &SpeedData,
    ) -> PlannerResult<Vec<SampleLayer>> {
        let horizon = self.planning_horizon(init_point, speed_data);
        if horizon <= HORIZON_EPSILON {
            debug!("[PathSampler] FAILED: zero planning horizon");
            return Err(PlannerError::InputUnavailable(
                "planning horizon is zero".to_string(),
            ));
        }

        let end_s = init.s + horizon;
        if end_s > reference_line.length() + HORIZON_EPSILON {
            debug!(
                "[PathSampler] FAILED: reference line length {:.2} < required {:.2}",
                reference_line.length(),
                end_s
            );
            return Err(PlannerError::InputUnavailable(format!(
                "reference line ends at s = {:.2}, horizon needs s = {:.2}",
                reference_line.length(),
                end_s
            )));
        }

        let stations = self.layer_stations(init.s, horizon);
        let regular = self.lateral_offsets(self.config.sample_points_num_each_level);
        let boundary = self.boundary_offsets();

        let mut layers = Vec::with_capacity(stations.len() + 1);
        layers.push(SampleLayer {
            s: init.s,
            offsets: vec![init.l],
            bounds: reference_line.lateral_bounds(init.s),
        });

        let last = stations.len();
        for (i, &s) in stations.iter().enumerate() {
            let layer_index = i + 1;
            let fan = if layer_index == 1 || layer_index == last {
                &boundary
            } else {
                &regular
            };
            let bounds = reference_line.lateral_bounds(s);
            let offsets: Vec<f64> = fan
                .iter()
                .copied()
                .filter(|l| *l >= bounds.0 && *l <= bounds.1)
                .collect();
            if offsets.is_empty() {
                debug!(
                    "[PathSampler] FAILED: no offset inside bounds ({:.2}, {:.2}) at s = {:.2}",
                    bounds.0, bounds.1, s
                );
                return Err(PlannerError::Infeasible { layer: layer_index });
            }
            trace!(
                "[PathSampler] layer {} at s = {:.2}: {} candidates",
                layer_index,
                s,
                offsets.len()
            );
            layers.push(SampleLayer { s, offsets, bounds });
        }

        debug!(
            "[PathSampler] horizon {:.2} m from s = {:.2}: {} layers",
            horizon,
            init.s,
            layers.len()
        );
        Ok(layers)
    }
}
