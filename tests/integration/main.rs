//! Cross-layer integration tests for Strata
//!
//! Tests that exercise the type store and the value layer together.

mod pipeline;
