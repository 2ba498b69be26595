//! Concrete reference lines
//!
//! The planner only talks to the [`ReferenceLine`](crate::common::ReferenceLine)
//! trait; this module provides a spline-backed implementation for tools and
//! tests.

pub mod spline_reference_line;

pub use spline_reference_line::SplineReferenceLine;
