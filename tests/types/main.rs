//! Integration tests for Layer 0: Types
//!
//! Tests for canonical types, the lattice, declarations, and matching.

mod lattice;
mod store;
