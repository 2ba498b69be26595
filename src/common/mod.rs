//! Common types, traits, and error definitions for dp_road_graph
//!
//! This module provides the value types and collaborator interfaces
//! shared by every stage of the path search.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
