//! Strata - Canonical structural types and persistent immutable fact values
//!
//! This crate re-exports both layers of the Strata system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 1: strata_values - Values, persistent collections, writers, relations, trees
//! Layer 0: strata_types  - Type lattice, canonical interning, TypeStore declarations
//! ```

pub use strata_types as types;
pub use strata_values as values;
