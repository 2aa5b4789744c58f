//! Immutable values and persistent collections for Strata.
//!
//! This crate provides:
//! - [`Value`] - The core value type for all Strata data
//! - [`List`], [`Set`], [`Relation`], [`Map`] - Persistent collections
//! - [`ListWriter`], [`SetWriter`], [`MapWriter`] - One-shot builders
//! - [`Tuple`] and [`Node`] - Products and tree values with annotations
//! - [`ValueFactory`] - Construction entry point over a [`TypeStore`]
//!
//! [`TypeStore`]: strata_types::TypeStore

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod collections;
mod factory;
mod list;
mod map;
mod node;
mod numeric;
mod relation;
mod set;
mod tuple;
mod value;
mod writer;

pub use collections::{PMap, PSet, PVector};
pub use factory::ValueFactory;
pub use list::List;
pub use map::Map;
pub use node::Node;
pub use numeric::Rational;
pub use relation::Relation;
pub use set::Set;
pub use tuple::Tuple;
pub use value::Value;
pub use writer::{ElementTyping, ListWriter, MapWriter, SetWriter};
