//! Canonical structural types for Strata.
//!
//! This crate provides:
//! - [`Type`] - Canonical, hash-consed type handles
//! - [`TypeStore`] - Type construction and schema declarations
//! - Subtyping and least upper bounds over the type lattice
//! - Parametric matching ([`Bindings`]) and instantiation
//! - [`Error`] - Rich error types with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
mod error;
mod intern;
mod lattice;
mod matching;
mod store;
mod types;

pub use config::StoreConfig;
pub use error::{Error, ErrorCategory, ErrorContext, ErrorKind, Result};
pub use matching::Bindings;
pub use store::{Alternative, TypeStore};
pub use types::{Type, TypeKind};
