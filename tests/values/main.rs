//! Integration tests for Layer 1: Values
//!
//! Tests for persistent collections, writers, relational algebra, trees,
//! and annotations.

mod annotations;
mod lists;
mod sets;
mod trees;
mod writers;
