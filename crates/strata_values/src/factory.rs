//! Construction entry point for values.
//!
//! [`ValueFactory`] pairs a [`TypeStore`] with the constructors for every
//! value kind, so callers building values bottom-up (parsers, readers,
//! tests) never need to reach for the collection internals.

use std::sync::Arc;

use strata_types::{Error, ErrorKind, Result, Type, TypeStore};

use crate::collections::{PMap, PSet, PVector};
use crate::list::List;
use crate::map::Map;
use crate::node::Node;
use crate::numeric::Rational;
use crate::relation::Relation;
use crate::set::Set;
use crate::tuple::Tuple;
use crate::value::Value;
use crate::writer::{ElementTyping, ListWriter, MapWriter, SetWriter, frozen, staged};

/// Builds values against one type store.
#[derive(Clone, Debug, Default)]
pub struct ValueFactory {
    store: TypeStore,
}

impl ValueFactory {
    /// Creates a factory over `store`.
    #[must_use]
    pub fn new(store: TypeStore) -> Self {
        Self { store }
    }

    /// Returns the type store.
    #[must_use]
    pub fn store(&self) -> &TypeStore {
        &self.store
    }

    // =========================================================================
    // Scalars
    // =========================================================================

    /// A boolean.
    #[must_use]
    pub fn bool(&self, value: bool) -> Value {
        Value::Bool(value)
    }

    /// An integer.
    #[must_use]
    pub fn integer(&self, value: i64) -> Value {
        Value::Integer(value)
    }

    /// A real.
    #[must_use]
    pub fn real(&self, value: f64) -> Value {
        Value::Real(value)
    }

    /// The normalized fraction `numerator / denominator`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::DivisionByZero`] for a zero denominator.
    pub fn rational(&self, numerator: i64, denominator: i64) -> Result<Value> {
        Rational::new(numerator, denominator).map(Value::Rational)
    }

    /// A string.
    #[must_use]
    pub fn string(&self, value: &str) -> Value {
        Value::String(Arc::from(value))
    }

    // =========================================================================
    // Tuples
    // =========================================================================

    /// An unlabeled tuple.
    #[must_use]
    pub fn tuple(&self, fields: Vec<Value>) -> Tuple {
        Tuple::new(&self.store, fields)
    }

    /// A labeled tuple.
    ///
    /// # Errors
    ///
    /// Returns an arity mismatch if labels and fields differ in length.
    pub fn labeled_tuple(&self, fields: Vec<Value>, labels: &[&str]) -> Result<Tuple> {
        Tuple::labeled(&self.store, fields, labels)
    }

    /// A tuple of a declared tuple type.
    ///
    /// # Errors
    ///
    /// See [`Tuple::of_type`].
    pub fn tuple_of(&self, ty: &Type, fields: Vec<Value>) -> Result<Tuple> {
        Tuple::of_type(&self.store, ty, fields)
    }

    // =========================================================================
    // Lists
    // =========================================================================

    /// An open empty list whose element type widens from `element`.
    #[must_use]
    pub fn list(&self, element: &Type) -> List {
        let shared = staged(self.store.list(element), ElementTyping::Widening, PVector::new());
        List::from_shared(self.store.clone(), shared)
    }

    /// A frozen list of `values`, typed by the LUB of their types.
    #[must_use]
    pub fn list_with(&self, values: Vec<Value>) -> List {
        let types: Vec<Type> = values.iter().map(Value::ty).collect();
        let element = self.store.lub_all(&types);
        let shared = frozen(
            self.store.list(&element),
            ElementTyping::Widening,
            values.into_iter().map(Value::settle).collect(),
        );
        List::from_shared(self.store.clone(), shared)
    }

    /// A writer for a new list whose element type widens from `element`.
    #[must_use]
    pub fn list_writer(&self, element: &Type) -> ListWriter {
        let shared = staged(self.store.list(element), ElementTyping::Widening, PVector::new());
        ListWriter::new(self.store.clone(), shared)
    }

    // =========================================================================
    // Sets and relations
    // =========================================================================

    /// An open empty set that only admits subtypes of `element`.
    #[must_use]
    pub fn set(&self, element: &Type) -> Set {
        let shared = staged(self.store.set(element), ElementTyping::Fixed, PSet::new());
        Set::from_shared(self.store.clone(), shared)
    }

    /// A frozen set of `values`, typed by the LUB of their types.
    #[must_use]
    pub fn set_with(&self, values: Vec<Value>) -> Set {
        let types: Vec<Type> = values.iter().map(Value::ty).collect();
        let element = self.store.lub_all(&types);
        Set::widening(&self.store, &element, values.into_iter().map(Value::settle).collect())
    }

    /// A writer for a new set that only admits subtypes of `element`.
    #[must_use]
    pub fn set_writer(&self, element: &Type) -> SetWriter {
        let shared = staged(self.store.set(element), ElementTyping::Fixed, PSet::new());
        SetWriter::new(self.store.clone(), shared)
    }

    /// An open empty relation of `tuple` elements.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::NotARelation`] if `tuple` is not a tuple type.
    pub fn relation(&self, tuple: &Type) -> Result<Relation> {
        let ty = self.store.relation_of(tuple)?;
        let shared = staged(ty, ElementTyping::Fixed, PSet::new());
        Set::from_shared(self.store.clone(), shared).to_relation()
    }

    /// A frozen relation of `tuples`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::NotARelation`] if an element is not a tuple.
    pub fn relation_with(&self, tuples: Vec<Value>) -> Result<Relation> {
        if let Some(other) = tuples.iter().find(|v| v.as_tuple().is_none()) {
            return Err(Error::new(ErrorKind::NotARelation(self.store.set(&other.ty()))));
        }
        if tuples.is_empty() {
            let element = self.store.tuple(&[]);
            return Set::widening(&self.store, &element, PSet::new()).to_relation();
        }
        self.set_with(tuples).to_relation()
    }

    /// A writer for a new relation of `tuple` elements.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::NotARelation`] if `tuple` is not a tuple type.
    pub fn relation_writer(&self, tuple: &Type) -> Result<SetWriter> {
        let ty = self.store.relation_of(tuple)?;
        let shared = staged(ty, ElementTyping::Fixed, PSet::new());
        Ok(SetWriter::new(self.store.clone(), shared))
    }

    // =========================================================================
    // Maps
    // =========================================================================

    /// An open empty map that only admits the given key and value types.
    #[must_use]
    pub fn map(&self, key: &Type, value: &Type) -> Map {
        let shared = staged(self.store.map(key, value), ElementTyping::Fixed, PMap::new());
        Map::from_shared(self.store.clone(), shared)
    }

    /// A frozen map of `entries`, typed by the LUBs of keys and values.
    #[must_use]
    pub fn map_with(&self, entries: Vec<(Value, Value)>) -> Map {
        let keys: Vec<Type> = entries.iter().map(|(k, _)| k.ty()).collect();
        let values: Vec<Type> = entries.iter().map(|(_, v)| v.ty()).collect();
        let ty = self
            .store
            .map(&self.store.lub_all(&keys), &self.store.lub_all(&values));
        let entries: PMap<Value, Value> = entries
            .into_iter()
            .map(|(key, value)| (key.settle(), value.settle()))
            .collect();
        let shared = frozen(ty, ElementTyping::Widening, entries);
        Map::from_shared(self.store.clone(), shared)
    }

    /// A writer for a new map that only admits the given key and value types.
    #[must_use]
    pub fn map_writer(&self, key: &Type, value: &Type) -> MapWriter {
        let shared = staged(self.store.map(key, value), ElementTyping::Fixed, PMap::new());
        MapWriter::new(self.store.clone(), shared)
    }

    // =========================================================================
    // Trees
    // =========================================================================

    /// An instance of constructor `ty`.
    ///
    /// # Errors
    ///
    /// See [`Node::constructor`].
    pub fn constructor(&self, ty: &Type, children: Vec<Value>) -> Result<Node> {
        Node::constructor(ty, children)
    }

    /// An untyped node.
    #[must_use]
    pub fn node(&self, name: &str, children: Vec<Value>) -> Node {
        Node::untyped(name, children)
    }

    /// An open empty collection of a named collection type.
    ///
    /// The element typing is fixed: the collection keeps `named` as its
    /// type and rejects elements outside it.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::NotMakeable`] unless `named` resolves to a list,
    /// set, relation or map type.
    pub fn make(&self, named: &Type) -> Result<Value> {
        let resolved = named.resolve();
        let store = self.store.clone();
        let ty = named.clone();
        let value = if resolved.is_list() {
            Value::List(List::from_shared(
                store,
                staged(ty, ElementTyping::Fixed, PVector::new()),
            ))
        } else if resolved.is_set() {
            Value::Set(Set::from_shared(
                store,
                staged(ty, ElementTyping::Fixed, PSet::new()),
            ))
        } else if resolved.is_map() {
            Value::Map(Map::from_shared(
                store,
                staged(ty, ElementTyping::Fixed, PMap::new()),
            ))
        } else {
            return Err(Error::new(ErrorKind::NotMakeable(named.clone())));
        };
        tracing::trace!(ty = %named, "made empty collection");
        Ok(value)
    }
}
