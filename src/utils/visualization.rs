//! Visualization utilities for dp_road_graph
//!
//! Plots planned paths against their reference line with gnuplot.

use gnuplot::{AutoOption, AxesCommon, Caption, Color, DashType, Figure, LineStyle, LineWidth, PointSize, PointSymbol};

use crate::common::{Point2D, ReferenceLine};
use crate::planning_data::{DecisionData, DecisionIntent, ObstacleDecision, PathData};

/// Color palette for consistent styling
pub mod colors {
    pub const BLACK: &str = "#000000";
    pub const RED: &str = "#FF0000";
    pub const GREEN: &str = "#00FF00";
    pub const BLUE: &str = "#0000FF";
    pub const ORANGE: &str = "#FFA500";
    pub const GRAY: &str = "#808080";

    // Semantic colors
    pub const REFERENCE: &str = GRAY;
    pub const PATH: &str = RED;
    pub const START: &str = GREEN;
    pub const BLOCK: &str = BLACK;
    pub const NUDGE: &str = ORANGE;
    pub const IGNORE: &str = BLUE;
}

/// Style for path rendering
#[derive(Debug, Clone)]
pub struct PathStyle {
    pub color: String,
    pub line_width: f64,
    pub caption: String,
    pub dashed: bool,
}

impl PathStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            line_width: 2.0,
            caption: caption.to_string(),
            dashed: false,
        }
    }

    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }

    pub fn dashed(mut self) -> Self {
        self.dashed = true;
        self
    }
}

impl Default for PathStyle {
    fn default() -> Self {
        Self::new(colors::PATH, "Path")
    }
}

/// Style for point rendering
#[derive(Debug, Clone)]
pub struct PointStyle {
    pub color: String,
    pub size: f64,
    pub symbol: char,
    pub caption: String,
}

impl PointStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            size: 1.0,
            symbol: 'O',
            caption: caption.to_string(),
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }
}

/// Sample a curve at constant offset `l` from the reference line
pub fn offset_curve(reference_line: &dyn ReferenceLine, l: f64, step: f64) -> (Vec<f64>, Vec<f64>) {
    let step = step.max(1e-3);
    let count = (reference_line.length() / step).floor() as usize;
    (0..=count)
        .map(|i| (i as f64 * step).min(reference_line.length()))
        .filter_map(|s| reference_line.to_cartesian(s, l, 0.0, 0.0, 0.0))
        .map(|p| (p.x, p.y))
        .unzip()
}

/// Closed outline of a decision footprint in Cartesian coordinates
pub fn footprint_outline(
    reference_line: &dyn ReferenceLine,
    decision: &ObstacleDecision,
    step: f64,
) -> (Vec<f64>, Vec<f64>) {
    let step = step.max(1e-3);
    let count = ((decision.end_s - decision.start_s) / step).ceil().max(1.0) as usize;
    let stations: Vec<f64> = (0..=count)
        .map(|i| (decision.start_s + i as f64 * step).min(decision.end_s))
        .collect();

    let right = stations.iter().map(|&s| (s, decision.start_l));
    let left = stations.iter().rev().map(|&s| (s, decision.end_l));
    let (mut xs, mut ys): (Vec<f64>, Vec<f64>) = right
        .chain(left)
        .filter_map(|(s, l)| reference_line.to_cartesian(s, l, 0.0, 0.0, 0.0))
        .map(|p| (p.x, p.y))
        .unzip();
    if let (Some(&x0), Some(&y0)) = (xs.first(), ys.first()) {
        xs.push(x0);
        ys.push(y0);
    }
    (xs, ys)
}

/// Main visualizer struct
pub struct Visualizer {
    figure: Figure,
    title: String,
    x_label: String,
    y_label: String,
    x_range: Option<(f64, f64)>,
    y_range: Option<(f64, f64)>,
    aspect_ratio: Option<f64>,
}

impl Visualizer {
    pub fn new() -> Self {
        Self {
            figure: Figure::new(),
            title: String::new(),
            x_label: "X [m]".to_string(),
            y_label: "Y [m]".to_string(),
            x_range: None,
            y_range: None,
            aspect_ratio: Some(1.0),
        }
    }

    pub fn set_title(&mut self, title: &str) -> &mut Self {
        self.title = title.to_string();
        self
    }

    pub fn set_x_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.x_range = Some((min, max));
        self
    }

    pub fn set_y_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.y_range = Some((min, max));
        self
    }

    /// Set aspect ratio (None for auto)
    pub fn set_aspect_ratio(&mut self, ratio: Option<f64>) -> &mut Self {
        self.aspect_ratio = ratio;
        self
    }

    pub fn plot_path_xy(&mut self, x: &[f64], y: &[f64], style: &PathStyle) -> &mut Self {
        let dash = if style.dashed { DashType::Dash } else { DashType::Solid };
        self.figure.axes2d().lines(
            x,
            y,
            &[
                Caption(&style.caption),
                Color(&style.color),
                LineWidth(style.line_width),
                LineStyle(dash),
            ],
        );
        self
    }

    /// Plot the Cartesian side of a planned path
    pub fn plot_path_data(&mut self, path: &PathData, style: &PathStyle) -> &mut Self {
        let (x, y): (Vec<f64>, Vec<f64>) = path
            .discretized_path()
            .points()
            .iter()
            .map(|p| (p.x, p.y))
            .unzip();
        self.plot_path_xy(&x, &y, style)
    }

    /// Plot the reference line and, when finite, its lane bounds at the start
    pub fn plot_reference_line(&mut self, reference_line: &dyn ReferenceLine, step: f64) -> &mut Self {
        let (x, y) = offset_curve(reference_line, 0.0, step);
        self.plot_path_xy(&x, &y, &PathStyle::new(colors::REFERENCE, "Reference line").dashed());

        let (right, left) = reference_line.lateral_bounds(0.0);
        for bound in [right, left] {
            if bound.is_finite() {
                let (x, y) = offset_curve(reference_line, bound, step);
                self.plot_path_xy(&x, &y, &PathStyle::new(colors::BLACK, "").with_line_width(1.0));
            }
        }
        self
    }

    /// Outline every decision footprint, colored by intent
    pub fn plot_decisions(
        &mut self,
        decisions: &DecisionData,
        reference_line: &dyn ReferenceLine,
    ) -> &mut Self {
        for decision in decisions.decisions() {
            let color = match decision.intent {
                DecisionIntent::Block => colors::BLOCK,
                DecisionIntent::Nudge { .. } => colors::NUDGE,
                DecisionIntent::Ignore => colors::IGNORE,
            };
            let (x, y) = footprint_outline(reference_line, decision, 0.5);
            self.plot_path_xy(&x, &y, &PathStyle::new(color, &decision.id).with_line_width(1.5));
        }
        self
    }

    pub fn plot_point(&mut self, point: Point2D, style: &PointStyle) -> &mut Self {
        self.figure.axes2d().points(
            &[point.x],
            &[point.y],
            &[
                Caption(&style.caption),
                Color(&style.color),
                PointSymbol(style.symbol),
                PointSize(style.size),
            ],
        );
        self
    }

    pub fn plot_start(&mut self, point: Point2D) -> &mut Self {
        self.plot_point(point, &PointStyle::new(colors::START, "Start").with_size(1.5))
    }

    pub fn save_svg(&mut self, path: &str, width: u32, height: u32) -> Result<(), String> {
        self.apply_settings();
        self.figure.save_to_svg(path, width, height).map_err(|e| e.to_string())
    }

    fn apply_settings(&mut self) {
        let axes = self.figure.axes2d();

        if !self.title.is_empty() {
            axes.set_title(&self.title, &[]);
        }
        axes.set_x_label(&self.x_label, &[]);
        axes.set_y_label(&self.y_label, &[]);

        if let Some((min, max)) = self.x_range {
            axes.set_x_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        if let Some((min, max)) = self.y_range {
            axes.set_y_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        if let Some(ratio) = self.aspect_ratio {
            axes.set_aspect_ratio(AutoOption::Fix(ratio));
        }
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}
