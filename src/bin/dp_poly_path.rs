//! DP poly path demo
//!
//! Plans a lateral path on a curved road around a parked car (nudge) and a
//! lane closure (block), then plots the result.
//!
//! Run with `RUST_LOG=debug` to follow the search.

use std::path::Path;

use log::{info, warn};

use dp_road_graph::common::{PathOptimizer, ReferenceLine, TrajectoryPoint};
use dp_road_graph::path_planning::dp_poly_path::{DpPolyPathConfig, DpPolyPathOptimizer};
use dp_road_graph::planning_data::{DecisionData, ObstacleDecision, PathData, SpeedData};
use dp_road_graph::reference_line::SplineReferenceLine;
use dp_road_graph::utils::{PathStyle, Visualizer};
use dp_road_graph::PlannerResult;

const CONFIG_PATH: &str = "configs/dp_poly_path.toml";
const OUTPUT_DIR: &str = "img";

fn load_config() -> DpPolyPathConfig {
    let path = Path::new(CONFIG_PATH);
    if !path.exists() {
        info!("{} not found, using default config", CONFIG_PATH);
        return DpPolyPathConfig::default();
    }
    match DpPolyPathConfig::load(path) {
        Ok(config) => config,
        Err(e) => {
            warn!("failed to load {}: {}, using default config", CONFIG_PATH, e);
            DpPolyPathConfig::default()
        }
    }
}

fn scenario() -> DecisionData {
    DecisionData::new(vec![
        ObstacleDecision::nudge("parked_car", (22.0, 30.0), (0.4, 2.2), 1.0),
        ObstacleDecision::block("lane_closure", (48.0, 52.0), (-2.5, -0.8)),
    ])
}

fn plot(road: &SplineReferenceLine, decisions: &DecisionData, path: &PathData) {
    let mut vis = Visualizer::new();
    vis.set_title("DP Poly Path");
    vis.plot_reference_line(road, 0.5)
        .plot_decisions(decisions, road)
        .plot_path_data(path, &PathStyle::default());
    if let Some(first) = path.discretized_path().points().first() {
        vis.plot_start(first.position());
    }

    if let Err(e) = std::fs::create_dir_all(OUTPUT_DIR) {
        warn!("cannot create {}: {}", OUTPUT_DIR, e);
        return;
    }
    let file = format!("{}/dp_poly_path.svg", OUTPUT_DIR);
    match vis.save_svg(&file, 1000, 500) {
        Ok(()) => println!("Plot saved to: {}", file),
        Err(e) => eprintln!("Failed to save SVG: {}", e),
    }
}

fn run() -> PlannerResult<()> {
    let config = load_config();
    let optimizer = DpPolyPathOptimizer::new(config)?;

    let road = SplineReferenceLine::new(
        &[0.0, 20.0, 40.0, 60.0, 80.0, 100.0],
        &[0.0, 1.0, 4.0, 6.0, 6.5, 6.0],
    )?
    .with_lane_half_width(3.0);

    let heading = road.reference_point(0.0).map(|p| p.heading).unwrap_or(0.0);
    let init = TrajectoryPoint::new(0.0, 0.0, heading, 8.0);
    let speed = SpeedData::constant(8.0, 8.0, 0.1);
    let decisions = scenario();

    let path = optimizer.optimize(&road, &init, &speed, &decisions)?;

    println!("Path found: {} points, {:.2} m", path.len(), path.discretized_path().length());
    for f in path.frenet_frame_path().points().iter().step_by(50) {
        println!("  s = {:6.2}  l = {:6.3}  dl = {:6.3}", f.s, f.l, f.dl);
    }

    plot(&road, &decisions, &path);
    Ok(())
}

fn main() {
    env_logger::init();

    println!("DP Poly Path Example");
    println!("====================\n");

    if let Err(e) = run() {
        eprintln!("Planning failed: {}", e);
        std::process::exit(1);
    }
}
