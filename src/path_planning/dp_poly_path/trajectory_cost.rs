//! Cost model of the road graph
//!
//! Pure scoring of lattice nodes and of the quintic edges between adjacent
//! layers. Nothing here keeps state between calls, so edges can be scored in
//! any order and from any thread.

use crate::common::FrenetFramePoint;
use crate::path_planning::quintic_polynomials::QuinticPolynomial;
use crate::planning_data::{DecisionData, DecisionIntent};

use super::config::DpPolyPathConfig;

/// Cost of an edge that enters a blocking footprint
///
/// Every finite cost compares strictly below it.
pub const BLOCKED_COST: f64 = f64::INFINITY;

const GRID_EPSILON: f64 = 1e-9;

pub fn is_blocked(cost: f64) -> bool {
    cost >= BLOCKED_COST
}

/// Stations `origin + k * resolution` lying in `[from, to]`
///
/// Shared by the cost model and the path builder so that both look at
/// bit-identical stations.
pub fn grid_stations(origin: f64, resolution: f64, from: f64, to: f64) -> impl Iterator<Item = f64> {
    let k_start = ((from - origin) / resolution - GRID_EPSILON).ceil().max(0.0) as u64;
    let k_end = ((to - origin) / resolution + GRID_EPSILON).floor();
    let count = if k_end < k_start as f64 {
        0
    } else {
        k_end as u64 - k_start + 1
    };
    (k_start..k_start + count).map(move |k| grid_station(origin, resolution, k))
}

pub fn grid_station(origin: f64, resolution: f64, k: u64) -> f64 {
    origin + k as f64 * resolution
}

/// Lateral curve between two lattice nodes, parameterised by the station
/// relative to `from.s`
pub fn edge_curve(from: &FrenetFramePoint, to: &FrenetFramePoint) -> QuinticPolynomial {
    QuinticPolynomial::new(from.l, from.dl, from.ddl, to.l, to.dl, to.ddl, to.s - from.s)
}

/// Edge and node scoring for one planning cycle
pub struct TrajectoryCost<'a> {
    config: &'a DpPolyPathConfig,
    decision_data: &'a DecisionData,
    grid_origin: f64,
}

impl<'a> TrajectoryCost<'a> {
    /// `grid_origin` is the station the output path starts at
    pub fn new(config: &'a DpPolyPathConfig, decision_data: &'a DecisionData, grid_origin: f64) -> Self {
        Self {
            config,
            decision_data,
            grid_origin,
        }
    }

    /// Deviation from the reference line, raised near the lane boundary
    pub fn point_cost(&self, l: f64, bounds: (f64, f64)) -> f64 {
        let w = &self.config.weights;
        let mut cost = w.reference_deviation * l * l;

        let (right, left) = bounds;
        if right.is_finite() && left.is_finite() {
            let distance = (l - right).min(left - l);
            if distance < w.lane_boundary_buffer {
                let intrusion = w.lane_boundary_buffer - distance;
                cost += w.lane_boundary * intrusion * intrusion;
            }
        }
        cost
    }

    /// Sampled integral of squared lateral derivatives over `[0, length]`
    pub fn smoothness_cost(&self, curve: &QuinticPolynomial, length: f64) -> f64 {
        if length <= 0.0 {
            return 0.0;
        }
        let w = &self.config.weights;
        let n = (length / self.config.eval_resolution).ceil().max(1.0) as usize;
        let ds = length / n as f64;

        (0..n)
            .map(|k| {
                let t = (k as f64 + 0.5) * ds;
                let dl = curve.evaluate(1, t);
                let ddl = curve.evaluate(2, t);
                let dddl = curve.evaluate(3, t);
                (w.heading * dl * dl + w.curvature * ddl * ddl + w.curvature_rate * dddl * dddl) * ds
            })
            .sum()
    }

    /// Interference with decisions over the station span `[start_s, end_s]`
    ///
    /// Returns [`BLOCKED_COST`] as soon as one sampled station falls inside a
    /// blocking footprint.
    pub fn obstacle_cost(&self, curve: &QuinticPolynomial, start_s: f64, end_s: f64) -> f64 {
        let buffer = self.config.vehicle_half_width;
        let w = &self.config.weights;
        let mut cost = 0.0;

        for decision in self.decision_data.relevant(start_s, end_s) {
            let from = start_s.max(decision.start_s);
            let to = end_s.min(decision.end_s);
            let mut stations: Vec<f64> =
                grid_stations(self.grid_origin, self.config.path_resolution, from, to).collect();
            if decision.contains_station(end_s) {
                stations.push(end_s);
            }

            for s in stations {
                let l = curve.evaluate(0, s - start_s);
                let clearance = decision.lateral_clearance(l, buffer);
                match decision.intent {
                    DecisionIntent::Block => {
                        if clearance <= 0.0 {
                            return BLOCKED_COST;
                        }
                    }
                    DecisionIntent::Nudge { margin } => {
                        if margin > 0.0 && clearance < margin {
                            // floor kept below the margin: the term is never
                            // negative and stays positive inside the footprint
                            let floor = w.min_clearance.min(0.5 * margin);
                            cost += w.obstacle * (1.0 / clearance.max(floor) - 1.0 / margin);
                        }
                    }
                    DecisionIntent::Ignore => {}
                }
            }
        }
        cost
    }

    /// Total cost of moving from `from` to `to`; `to_bounds` are the lateral
    /// bounds of the target layer
    pub fn edge_cost(
        &self,
        from: &FrenetFramePoint,
        to: &FrenetFramePoint,
        to_bounds: (f64, f64),
    ) -> f64 {
        let curve = edge_curve(from, to);
        let obstacle = self.obstacle_cost(&curve, from.s, to.s);
        if is_blocked(obstacle) {
            return BLOCKED_COST;
        }
        let total = self.smoothness_cost(&curve, to.s - from.s) + obstacle + self.point_cost(to.l, to_bounds);
        if total.is_nan() {
            BLOCKED_COST
        } else {
            total
        }
    }
}
