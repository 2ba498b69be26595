//! DP Road Graph
//!
//! Forward dynamic programming over the sampled lattice. Edges only ever
//! join adjacent layers, so the graph is stored as a layer x candidate
//! table and each node keeps the index of its best predecessor.
//!
//! Based on:
//! - Apollo planner's DP poly path optimizer

use log::{debug, trace};
use ordered_float::OrderedFloat;
use rayon::prelude::*;

use crate::common::{FrenetFramePoint, PlannerError, PlannerResult, ReferenceLine, TrajectoryPoint};
use crate::planning_data::{DecisionData, PathData, SpeedData};

use super::config::{DpPolyPathConfig, TieBreak};
use super::path_builder::PathBuilder;
use super::path_sampler::{init_frenet_point, PathSampler, SampleLayer};
use super::trajectory_cost::{is_blocked, TrajectoryCost, BLOCKED_COST};

/// Position of a node in the lattice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeIndex {
    pub layer: usize,
    pub candidate: usize,
}

impl NodeIndex {
    pub fn new(layer: usize, candidate: usize) -> Self {
        Self { layer, candidate }
    }
}

/// Lattice node with its best cumulative cost from the start
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub index: NodeIndex,
    /// Station, lateral offset and the derivatives the outgoing edges start from
    pub point: FrenetFramePoint,
    pub cost: f64,
    /// Lookup key of the chosen predecessor; `None` for the start node and
    /// for unreachable nodes
    pub predecessor: Option<NodeIndex>,
}

impl GraphNode {
    pub fn is_feasible(&self) -> bool {
        !is_blocked(self.cost)
    }
}

/// Fully evaluated lattice of one search
#[derive(Debug, Clone)]
pub struct LayeredGraph {
    layers: Vec<Vec<GraphNode>>,
}

impl LayeredGraph {
    pub fn layers(&self) -> &[Vec<GraphNode>] {
        &self.layers
    }

    pub fn node(&self, index: NodeIndex) -> Option<&GraphNode> {
        self.layers.get(index.layer)?.get(index.candidate)
    }

    /// Walk predecessors from `index` back to the start node
    pub fn backtrack(&self, index: NodeIndex) -> Vec<GraphNode> {
        let mut path = Vec::with_capacity(self.layers.len());
        let mut current = self.node(index);
        while let Some(node) = current {
            path.push(node.clone());
            current = node.predecessor.and_then(|p| self.node(p));
        }
        path.reverse();
        path
    }
}

/// Road graph search for one planning cycle
pub struct DpRoadGraph<'a> {
    config: &'a DpPolyPathConfig,
    init_point: &'a TrajectoryPoint,
    speed_data: &'a SpeedData,
}

impl<'a> DpRoadGraph<'a> {
    pub fn new(
        config: &'a DpPolyPathConfig,
        init_point: &'a TrajectoryPoint,
        speed_data: &'a SpeedData,
    ) -> Self {
        Self {
            config,
            init_point,
            speed_data,
        }
    }

    /// Sample, search and build the minimum cost path
    pub fn find_tunnel(
        &self,
        reference_line: &dyn ReferenceLine,
        decision_data: &DecisionData,
    ) -> PlannerResult<PathData> {
        let init = init_frenet_point(reference_line, self.init_point)?;
        let layers = PathSampler::new(self.config).sample_from(
            reference_line,
            &init,
            self.init_point,
            self.speed_data,
        )?;

        let cost = TrajectoryCost::new(self.config, decision_data, init.s);
        let tunnel = self.search(&layers, &init, &cost)?;

        PathBuilder::new(self.config).build(&tunnel, reference_line)
    }

    /// Minimum cost node sequence from the start node to the last layer
    pub fn search(
        &self,
        layers: &[SampleLayer],
        init: &FrenetFramePoint,
        cost: &TrajectoryCost,
    ) -> PlannerResult<Vec<GraphNode>> {
        let graph = self.build_graph(layers, init, cost)?;
        let last_layer = graph.layers().len() - 1;

        let best = graph.layers()[last_layer]
            .iter()
            .filter(|n| n.is_feasible())
            .min_by_key(|n| self.rank(n.cost, n))
            .ok_or(PlannerError::Infeasible { layer: last_layer })?;

        debug!(
            "[DpRoadGraph] best terminal node l = {:.2}, cost = {:.4}",
            best.point.l, best.cost
        );
        Ok(graph.backtrack(best.index))
    }

    /// Evaluate every node of the lattice
    ///
    /// Stops with `Infeasible` at the first layer whose nodes are all
    /// unreachable.
    pub fn build_graph(
        &self,
        layers: &[SampleLayer],
        init: &FrenetFramePoint,
        cost: &TrajectoryCost,
    ) -> PlannerResult<LayeredGraph> {
        if layers.len() < 2 {
            return Err(PlannerError::InputUnavailable(
                "road graph needs at least one sampled layer".to_string(),
            ));
        }

        let mut graph: Vec<Vec<GraphNode>> = Vec::with_capacity(layers.len());
        graph.push(vec![GraphNode {
            index: NodeIndex::new(0, 0),
            point: *init,
            cost: 0.0,
            predecessor: None,
        }]);

        for (layer_index, layer) in layers.iter().enumerate().skip(1) {
            let prev = &graph[layer_index - 1];
            let evaluate = |(candidate, &l): (usize, &f64)| {
                let point = FrenetFramePoint::new(layer.s, l, 0.0, 0.0);
                self.minimize_node(prev, NodeIndex::new(layer_index, candidate), point, layer.bounds, cost)
            };

            let current: Vec<GraphNode> = if self.config.parallel_search {
                layer.offsets.par_iter().enumerate().map(evaluate).collect()
            } else {
                layer.offsets.iter().enumerate().map(evaluate).collect()
            };

            let feasible = current.iter().filter(|n| n.is_feasible()).count();
            trace!(
                "[DpRoadGraph] layer {} at s = {:.2}: {}/{} feasible",
                layer_index,
                layer.s,
                feasible,
                current.len()
            );
            if feasible == 0 {
                debug!(
                    "[DpRoadGraph] FAILED: every node blocked at layer {} (s = {:.2})",
                    layer_index, layer.s
                );
                return Err(PlannerError::Infeasible { layer: layer_index });
            }
            graph.push(current);
        }

        Ok(LayeredGraph { layers: graph })
    }

    /// Best predecessor of one node; blocked predecessors never qualify
    fn minimize_node(
        &self,
        prev: &[GraphNode],
        index: NodeIndex,
        point: FrenetFramePoint,
        bounds: (f64, f64),
        cost: &TrajectoryCost,
    ) -> GraphNode {
        let best = prev
            .iter()
            .filter(|p| p.is_feasible())
            .map(|p| (p, p.cost + cost.edge_cost(&p.point, &point, bounds)))
            .filter(|(_, total)| !is_blocked(*total))
            .min_by_key(|(p, total)| self.rank(*total, p));

        match best {
            Some((p, total)) => GraphNode {
                index,
                point,
                cost: total,
                predecessor: Some(p.index),
            },
            None => GraphNode {
                index,
                point,
                cost: BLOCKED_COST,
                predecessor: None,
            },
        }
    }

    /// Total ordering key: cost, then the tie break bias, then candidate index
    fn rank(&self, cost: f64, node: &GraphNode) -> (OrderedFloat<f64>, OrderedFloat<f64>, usize) {
        let bias = match self.config.tie_break {
            TieBreak::NearestReference => node.point.l.abs(),
            TieBreak::FirstCandidate => 0.0,
        };
        (OrderedFloat(cost), OrderedFloat(bias), node.index.candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path_planning::dp_poly_path::config::CostWeights;
    use crate::planning_data::ObstacleDecision;
    use crate::reference_line::SplineReferenceLine;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn layer(s: f64, offsets: &[f64]) -> SampleLayer {
        SampleLayer {
            s,
            offsets: offsets.to_vec(),
            bounds: (f64::NEG_INFINITY, f64::INFINITY),
        }
    }

    fn lattice() -> Vec<SampleLayer> {
        let fan = [-2.0, -1.0, 0.0, 1.0, 2.0];
        vec![
            layer(0.0, &[0.0]),
            layer(10.0, &fan),
            layer(20.0, &fan),
            layer(30.0, &fan),
            layer(40.0, &fan),
        ]
    }

    fn start() -> FrenetFramePoint {
        FrenetFramePoint::new(0.0, 0.0, 0.0, 0.0)
    }

    #[test]
    fn test_empty_road_stays_centered() {
        let config = DpPolyPathConfig::default();
        let init = TrajectoryPoint::new(0.0, 0.0, 0.0, 10.0);
        let speed = SpeedData::default();
        let graph = DpRoadGraph::new(&config, &init, &speed);
        let decisions = DecisionData::default();
        let cost = TrajectoryCost::new(&config, &decisions, 0.0);

        let nodes = graph.search(&lattice(), &start(), &cost).unwrap();
        assert_eq!(nodes.len(), 5);
        for (i, node) in nodes.iter().enumerate() {
            assert_eq!(node.index.layer, i);
            assert_eq!(node.point.l, 0.0);
            assert_eq!(node.cost, 0.0);
        }
    }

    #[test]
    fn test_avoids_blocked_center() {
        let config = DpPolyPathConfig {
            vehicle_half_width: 0.5,
            ..DpPolyPathConfig::default()
        };
        let init = TrajectoryPoint::new(0.0, 0.0, 0.0, 10.0);
        let speed = SpeedData::default();
        let graph = DpRoadGraph::new(&config, &init, &speed);
        let decisions = DecisionData::new(vec![ObstacleDecision::block(
            "car",
            (18.0, 22.0),
            (-0.6, 0.6),
        )]);
        let cost = TrajectoryCost::new(&config, &decisions, 0.0);

        let nodes = graph.search(&lattice(), &start(), &cost).unwrap();
        assert!(nodes[2].point.l.abs() >= 2.0 - 1e-9);
        assert!(nodes.iter().all(|n| n.is_feasible()));
    }

    #[test]
    fn test_fully_blocked_layer_is_infeasible() {
        let config = DpPolyPathConfig::default();
        let init = TrajectoryPoint::new(0.0, 0.0, 0.0, 10.0);
        let speed = SpeedData::default();
        let graph = DpRoadGraph::new(&config, &init, &speed);
        let decisions = DecisionData::new(vec![ObstacleDecision::block(
            "barrier",
            (19.0, 21.0),
            (-5.0, 5.0),
        )]);
        let cost = TrajectoryCost::new(&config, &decisions, 0.0);

        let err = graph.search(&lattice(), &start(), &cost).unwrap_err();
        assert_eq!(err, PlannerError::Infeasible { layer: 2 });
    }

    fn zero_weight_config(tie_break: TieBreak) -> DpPolyPathConfig {
        DpPolyPathConfig {
            tie_break,
            weights: CostWeights {
                reference_deviation: 0.0,
                lane_boundary: 0.0,
                lane_boundary_buffer: 0.0,
                heading: 0.0,
                curvature: 0.0,
                curvature_rate: 0.0,
                obstacle: 0.0,
                min_clearance: 0.1,
            },
            ..DpPolyPathConfig::default()
        }
    }

    fn tunnel_offsets(config: &DpPolyPathConfig) -> Vec<f64> {
        let init = TrajectoryPoint::new(0.0, 0.0, 0.0, 10.0);
        let speed = SpeedData::default();
        let graph = DpRoadGraph::new(config, &init, &speed);
        let decisions = DecisionData::default();
        let cost = TrajectoryCost::new(config, &decisions, 0.0);
        let layers = vec![
            layer(0.0, &[0.0]),
            layer(10.0, &[-1.0, 0.0, 1.0]),
            layer(20.0, &[-1.0, 1.0]),
        ];
        graph
            .search(&layers, &start(), &cost)
            .unwrap()
            .iter()
            .map(|n| n.point.l)
            .collect()
    }

    #[test]
    fn test_tie_break_policies() {
        // every edge costs zero, so each node sees a full tie among predecessors
        let nearest = tunnel_offsets(&zero_weight_config(TieBreak::NearestReference));
        assert_eq!(nearest, vec![0.0, 0.0, -1.0]);

        let first = tunnel_offsets(&zero_weight_config(TieBreak::FirstCandidate));
        assert_eq!(first, vec![0.0, -1.0, -1.0]);
    }

    #[test]
    fn test_cumulative_cost_invariant_with_random_obstacles() {
        let mut rng = StdRng::seed_from_u64(7);
        let config = DpPolyPathConfig::default();
        let init = TrajectoryPoint::new(0.0, 0.0, 0.0, 10.0);
        let speed = SpeedData::default();
        let graph = DpRoadGraph::new(&config, &init, &speed);

        for _ in 0..20 {
            let mut decisions = DecisionData::default();
            for i in 0..3 {
                let s = rng.gen_range(5.0..35.0);
                let l = rng.gen_range(-2.5..2.5);
                let id = format!("obs{}", i);
                if rng.gen_bool(0.5) {
                    decisions.add(ObstacleDecision::block(&id, (s, s + 2.0), (l, l + 0.4)));
                } else {
                    // margins on both sides of the clearance floor
                    let margin = rng.gen_range(0.02..1.5);
                    decisions.add(ObstacleDecision::nudge(&id, (s, s + 4.0), (l, l + 0.4), margin));
                }
            }
            let cost = TrajectoryCost::new(&config, &decisions, 0.0);
            let Ok(lattice_graph) = graph.build_graph(&lattice(), &start(), &cost) else {
                continue;
            };

            for layer_nodes in lattice_graph.layers().iter().skip(1) {
                for node in layer_nodes.iter().filter(|n| n.is_feasible()) {
                    let pred = lattice_graph.node(node.predecessor.unwrap()).unwrap();
                    let edge = cost.edge_cost(&pred.point, &node.point, (f64::NEG_INFINITY, f64::INFINITY));
                    assert!(edge >= 0.0);
                    assert!(node.cost >= pred.cost);
                    assert_relative_eq!(node.cost, pred.cost + edge, epsilon = 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let line = SplineReferenceLine::new(&[0.0, 30.0, 60.0, 120.0], &[0.0, 3.0, -2.0, 0.0]).unwrap();
        let init = TrajectoryPoint::new(0.0, 0.0, 0.1, 10.0);
        let speed = SpeedData::constant(10.0, 8.0, 0.1);
        let decisions = DecisionData::new(vec![ObstacleDecision::nudge(
            "bike",
            (25.0, 35.0),
            (0.0, 1.0),
            1.5,
        )]);

        let parallel = DpPolyPathConfig {
            max_curvature: 1.0,
            ..DpPolyPathConfig::default()
        };
        let sequential = DpPolyPathConfig {
            parallel_search: false,
            ..parallel.clone()
        };

        let a = DpRoadGraph::new(&parallel, &init, &speed)
            .find_tunnel(&line, &decisions)
            .unwrap();
        let b = DpRoadGraph::new(&sequential, &init, &speed)
            .find_tunnel(&line, &decisions)
            .unwrap();
        assert_eq!(a, b);
    }
}
