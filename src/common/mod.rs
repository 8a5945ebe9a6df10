//! Common types, traits, and error definitions for terrain_lattice
//!
//! This module provides the foundational building blocks shared by the
//! mapping and lattice expansion stages.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
