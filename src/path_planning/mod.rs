// Path Planning algorithms module

pub mod cubic_spline_planner;
pub mod quintic_polynomials;
pub mod dp_poly_path;

pub use cubic_spline_planner::{Spline, Spline2D};
pub use quintic_polynomials::QuinticPolynomial;
pub use dp_poly_path::{DpPolyPathConfig, DpPolyPathOptimizer};
