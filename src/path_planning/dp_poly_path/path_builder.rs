//! Densify the selected node sequence into the output path

use itertools::Itertools;
use log::debug;

use crate::common::{FrenetFramePoint, PathPoint, PlannerError, PlannerResult, Point2D, ReferenceLine};
use crate::path_planning::quintic_polynomials::QuinticPolynomial;
use crate::planning_data::{DiscretizedPath, FrenetFramePath, PathData};

use super::config::DpPolyPathConfig;
use super::dp_road_graph::GraphNode;
use super::trajectory_cost::{edge_curve, grid_station};

struct Segment {
    start_s: f64,
    end_s: f64,
    curve: QuinticPolynomial,
}

pub struct PathBuilder<'a> {
    config: &'a DpPolyPathConfig,
}

impl<'a> PathBuilder<'a> {
    pub fn new(config: &'a DpPolyPathConfig) -> Self {
        Self { config }
    }

    /// Output stations: `origin + k * path_resolution` up to half a step
    /// before `end_s`, then `end_s` itself
    pub fn path_stations(&self, origin: f64, end_s: f64) -> Vec<f64> {
        let resolution = self.config.path_resolution;
        let mut stations: Vec<f64> = (0u64..)
            .map(|k| grid_station(origin, resolution, k))
            .take_while(|s| s + resolution / 2.0 < end_s)
            .collect();
        stations.push(end_s);
        stations
    }

    /// Refit the edge curves between consecutive nodes and sample them into
    /// paired Cartesian and Frenet points
    pub fn build(&self, nodes: &[GraphNode], reference_line: &dyn ReferenceLine) -> PlannerResult<PathData> {
        let segments: Vec<Segment> = nodes
            .iter()
            .tuple_windows()
            .map(|(a, b)| Segment {
                start_s: a.point.s,
                end_s: b.point.s,
                curve: edge_curve(&a.point, &b.point),
            })
            .collect();
        let (Some(first), Some(last)) = (segments.first(), segments.last()) else {
            return Err(PlannerError::InputUnavailable(
                "path needs at least two nodes".to_string(),
            ));
        };

        let stations = self.path_stations(first.start_s, last.end_s);
        let mut path_points: Vec<PathPoint> = Vec::with_capacity(stations.len());
        let mut frenet_points: Vec<FrenetFramePoint> = Vec::with_capacity(stations.len());
        let mut index = 0;
        let mut accumulated = 0.0;

        for s in stations {
            // segment j owns [s_j, s_j+1); the last one also owns its end
            while index + 1 < segments.len() && s >= segments[index].end_s {
                index += 1;
            }
            let segment = &segments[index];
            let t = s - segment.start_s;
            let l = segment.curve.evaluate(0, t);
            let dl = segment.curve.evaluate(1, t);
            let ddl = segment.curve.evaluate(2, t);
            let dddl = segment.curve.evaluate(3, t);

            let cartesian = reference_line
                .to_cartesian(s, l, dl, ddl, dddl)
                .ok_or_else(|| {
                    PlannerError::InputUnavailable(format!(
                        "reference line has no point at s = {:.2}",
                        s
                    ))
                })?;

            if cartesian.kappa.abs() > self.config.max_curvature {
                debug!(
                    "[PathBuilder] FAILED: kappa {:.4} at s = {:.2} over limit {:.4}",
                    cartesian.kappa, s, self.config.max_curvature
                );
                return Err(PlannerError::KinematicViolation {
                    s,
                    kappa: cartesian.kappa,
                    limit: self.config.max_curvature,
                });
            }

            if let Some(prev) = path_points.last() {
                accumulated += prev.position().distance(&Point2D::new(cartesian.x, cartesian.y));
            }
            path_points.push(PathPoint::from_cartesian(cartesian, accumulated));
            frenet_points.push(FrenetFramePoint::new(s, l, dl, ddl));
        }

        debug!(
            "[PathBuilder] {} points over {:.2} m of station, {:.2} m driven",
            path_points.len(),
            last.end_s - first.start_s,
            accumulated
        );
        PathData::new(
            DiscretizedPath::new(path_points),
            FrenetFramePath::new(frenet_points),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path_planning::dp_poly_path::dp_road_graph::NodeIndex;
    use crate::reference_line::SplineReferenceLine;
    use approx::assert_relative_eq;

    fn nodes(points: &[(f64, f64)]) -> Vec<GraphNode> {
        points
            .iter()
            .enumerate()
            .map(|(i, &(s, l))| GraphNode {
                index: NodeIndex::new(i, 0),
                point: FrenetFramePoint::new(s, l, 0.0, 0.0),
                cost: 0.0,
                predecessor: None,
            })
            .collect()
    }

    fn straight_line() -> SplineReferenceLine {
        SplineReferenceLine::straight(Point2D::origin(), 0.0, 200.0).unwrap()
    }

    #[test]
    fn test_stations_end_exactly_at_last_node() {
        let config = DpPolyPathConfig::default();
        let builder = PathBuilder::new(&config);

        let stations = builder.path_stations(0.0, 70.0);
        assert_eq!(stations.len(), 701);
        assert_eq!(*stations.last().unwrap(), 70.0);

        // a grid station within half a step of the end is replaced by the end
        let stations = builder.path_stations(0.0, 1.03);
        assert_eq!(stations.len(), 11);
        assert_eq!(stations[10], 1.03);
        assert!(stations.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_straight_path() {
        let config = DpPolyPathConfig::default();
        let builder = PathBuilder::new(&config);
        let path = builder
            .build(&nodes(&[(0.0, 0.0), (35.0, 0.0), (70.0, 0.0)]), &straight_line())
            .unwrap();

        assert_eq!(path.len(), 701);
        let last = path.discretized_path().points().last().unwrap();
        assert_relative_eq!(last.x, 70.0, epsilon = 1e-6);
        assert_relative_eq!(last.s, 70.0, epsilon = 1e-6);
        assert_relative_eq!(path.discretized_path().length(), 70.0, epsilon = 1e-6);
        for (p, f) in path.iter() {
            assert_relative_eq!(p.y, 0.0, epsilon = 1e-9);
            assert_eq!(f.l, 0.0);
        }
    }

    #[test]
    fn test_path_passes_through_nodes() {
        let config = DpPolyPathConfig {
            max_curvature: 1.0,
            ..DpPolyPathConfig::default()
        };
        let builder = PathBuilder::new(&config);
        let graph_nodes = nodes(&[(0.0, 0.0), (10.0, 1.0), (20.0, -0.5), (30.0, 0.0)]);
        let path = builder.build(&graph_nodes, &straight_line()).unwrap();

        for node in &graph_nodes {
            let f = path.frenet_frame_path().evaluate_by_s(node.point.s).unwrap();
            assert_relative_eq!(f.l, node.point.l, epsilon = 1e-6);
        }
        // Cartesian y equals l on a straight reference along x
        for (p, f) in path.iter() {
            assert_relative_eq!(p.y, f.l, epsilon = 1e-6);
        }
        let s: Vec<f64> = path.discretized_path().points().iter().map(|p| p.s).collect();
        assert!(s.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_curvature_limit() {
        let config = DpPolyPathConfig {
            max_curvature: 0.001,
            ..DpPolyPathConfig::default()
        };
        let builder = PathBuilder::new(&config);
        let err = builder
            .build(&nodes(&[(0.0, 0.0), (10.0, 2.0)]), &straight_line())
            .unwrap_err();
        match err {
            PlannerError::KinematicViolation { kappa, limit, .. } => {
                assert!(kappa.abs() > limit);
                assert_eq!(limit, 0.001);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_nodes_beyond_reference_line() {
        let config = DpPolyPathConfig::default();
        let builder = PathBuilder::new(&config);
        let err = builder
            .build(&nodes(&[(190.0, 0.0), (210.0, 0.0)]), &straight_line())
            .unwrap_err();
        assert!(matches!(err, PlannerError::InputUnavailable(_)));
    }

    #[test]
    fn test_single_node_rejected() {
        let config = DpPolyPathConfig::default();
        let builder = PathBuilder::new(&config);
        let err = builder.build(&nodes(&[(0.0, 0.0)]), &straight_line()).unwrap_err();
        assert!(matches!(err, PlannerError::InputUnavailable(_)));
    }
}
