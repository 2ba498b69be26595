//! Common types used throughout dp_road_graph

use serde::{Deserialize, Serialize};

/// 2D point representation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl From<(f64, f64)> for Point2D {
    fn from(tuple: (f64, f64)) -> Self {
        Self {
            x: tuple.0,
            y: tuple.1,
        }
    }
}

/// Station / lateral offset pair in the reference line frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlPoint {
    pub s: f64,
    pub l: f64,
}

impl SlPoint {
    pub fn new(s: f64, l: f64) -> Self {
        Self { s, l }
    }
}

/// Vehicle state at the start of a planning cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub x: f64,
    pub y: f64,
    /// heading [rad]
    pub theta: f64,
    /// curvature [1/m]
    pub kappa: f64,
    /// speed [m/s]
    pub v: f64,
    /// acceleration [m/ss]
    pub a: f64,
    pub relative_time: f64,
}

impl TrajectoryPoint {
    pub fn new(x: f64, y: f64, theta: f64, v: f64) -> Self {
        Self {
            x,
            y,
            theta,
            kappa: 0.0,
            v,
            a: 0.0,
            relative_time: 0.0,
        }
    }

    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

/// Sample of the reference line at one station
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferencePoint {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    pub kappa: f64,
    pub dkappa: f64,
}

/// Cartesian pose with curvature and curvature rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CartesianPoint {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
    pub kappa: f64,
    pub dkappa: f64,
}

/// Point of the Cartesian output path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
    pub kappa: f64,
    pub dkappa: f64,
    /// accumulated distance along the path [m]
    pub s: f64,
}

impl PathPoint {
    pub fn from_cartesian(point: CartesianPoint, s: f64) -> Self {
        Self {
            x: point.x,
            y: point.y,
            theta: point.theta,
            kappa: point.kappa,
            dkappa: point.dkappa,
            s,
        }
    }

    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

/// Point of the Frenet output path: l and its derivatives w.r.t. station
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrenetFramePoint {
    pub s: f64,
    pub l: f64,
    pub dl: f64,
    pub ddl: f64,
}

impl FrenetFramePoint {
    pub fn new(s: f64, l: f64, dl: f64, ddl: f64) -> Self {
        Self { s, l, dl, ddl }
    }

    pub fn sl(&self) -> SlPoint {
        SlPoint::new(self.s, self.l)
    }
}
