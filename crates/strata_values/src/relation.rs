//! Relations: sets whose elements are tuples.
//!
//! A [`Relation`] is a view over a [`Set`], not a separate collection.
//! It dereferences to the set, so set algebra applies unchanged, and adds
//! the operations that need tuple columns.

use std::ops::Deref;

use rustc_hash::{FxHashMap, FxHashSet};
use strata_types::{Error, ErrorKind, Result, Type};

use crate::collections::PSet;
use crate::set::Set;
use crate::tuple::Tuple;
use crate::value::Value;

/// A set of tuples.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Relation(Set);

fn empty_composition(left: usize, right: usize) -> Error {
    Error::new(ErrorKind::EmptyComposition { left, right }).in_operation("compose")
}

impl Relation {
    /// Wraps a set already known to hold tuples.
    pub(crate) fn from_set(set: Set) -> Self {
        Self(set)
    }

    /// Returns the underlying set.
    #[must_use]
    pub fn as_set(&self) -> &Set {
        &self.0
    }

    /// Consumes the relation, returning the underlying set.
    #[must_use]
    pub fn into_set(self) -> Set {
        self.0
    }

    /// Returns a copy of the underlying set.
    #[must_use]
    pub fn to_set(&self) -> Set {
        self.0.clone()
    }

    /// Returns the column types.
    #[must_use]
    pub fn field_types(&self) -> Vec<Type> {
        self.element_type()
            .field_types()
            .map(<[Type]>::to_vec)
            .unwrap_or_default()
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.element_type().arity().unwrap_or(0)
    }

    fn tuples(&self) -> Vec<Tuple> {
        self.0
            .elements()
            .iter()
            .filter_map(Value::as_tuple)
            .cloned()
            .collect()
    }

    fn derived(&self, element: &Type, tuples: PSet<Value>) -> Relation {
        Relation(Set::widening(self.0.store(), element, tuples))
    }

    /// Checks that this is a binary relation over comparable columns.
    fn binary_columns(&self, operation: &str) -> Result<(Type, Type)> {
        let columns = self.field_types();
        let [from, to] = columns.as_slice() else {
            return Err(Error::arity_mismatch(2, columns.len()).in_operation(operation));
        };
        if !from.is_comparable(to) {
            return Err(Error::incomparable(from.clone(), to.clone()).in_operation(operation));
        }
        Ok((from.clone(), to.clone()))
    }

    /// Returns the transitive closure of a binary relation.
    ///
    /// Iterates semi-naively: each round only extends the pairs found in
    /// the previous round, until no new pair appears.
    ///
    /// # Errors
    ///
    /// Returns an arity mismatch unless the relation is binary, or
    /// [`IncomparableTypes`](strata_types::ErrorKind::IncomparableTypes)
    /// if its two columns are incomparable.
    #[tracing::instrument(level = "debug", skip_all, fields(size = self.len()))]
    pub fn closure(&self) -> Result<Relation> {
        self.binary_columns("closure")?;
        let element = self.element_type();

        let mut successors: FxHashMap<Value, Vec<Value>> = FxHashMap::default();
        let mut pairs: FxHashSet<(Value, Value)> = FxHashSet::default();
        for tuple in self.tuples() {
            let (from, to) = (tuple.fields()[0].clone(), tuple.fields()[1].clone());
            successors.entry(from.clone()).or_default().push(to.clone());
            pairs.insert((from, to));
        }

        let mut delta: Vec<(Value, Value)> = pairs.iter().cloned().collect();
        let mut rounds = 0usize;
        while !delta.is_empty() {
            rounds += 1;
            let mut next = Vec::new();
            for (from, via) in &delta {
                for to in successors.get(via).into_iter().flatten() {
                    let pair = (from.clone(), to.clone());
                    if pairs.insert(pair.clone()) {
                        next.push(pair);
                    }
                }
            }
            delta = next;
        }
        tracing::debug!(rounds, size = pairs.len(), "closure reached fixed point");

        let tuples = pairs
            .into_iter()
            .map(|(from, to)| Value::Tuple(Tuple::from_parts(element.clone(), vec![from, to])))
            .collect();
        Ok(self.derived(&element, tuples))
    }

    /// Returns the transitive closure plus the identity pair of every
    /// value in the carrier.
    ///
    /// # Errors
    ///
    /// See [`Relation::closure`].
    pub fn reflexive_closure(&self) -> Result<Relation> {
        let (from, to) = self.binary_columns("reflexive_closure")?;
        let store = self.0.store();
        let column = store.lub(&from, &to);
        let element = store.tuple(&[column.clone(), column]);

        let closure = self.closure()?;
        let mut tuples: PSet<Value> = closure
            .tuples()
            .into_iter()
            .map(|t| Value::Tuple(Tuple::from_parts(element.clone(), t.fields().to_vec())))
            .collect();
        for value in self.carrier().iter() {
            tuples.insert_mut(Value::Tuple(Tuple::from_parts(
                element.clone(),
                vec![value.clone(), value],
            )));
        }
        Ok(self.derived(&element, tuples))
    }

    /// Joins the last column of this relation with the first column of
    /// `other`, dropping both join columns.
    ///
    /// # Errors
    ///
    /// Returns
    /// [`IncomparableTypes`](strata_types::ErrorKind::IncomparableTypes) if
    /// the join columns are incomparable, or
    /// [`EmptyComposition`](strata_types::ErrorKind::EmptyComposition) if the
    /// result would have no columns.
    #[tracing::instrument(level = "debug", skip_all, fields(left = self.len(), right = other.len()))]
    pub fn compose(&self, other: &Relation) -> Result<Relation> {
        let (left, right) = (self.field_types(), other.field_types());
        let (Some((left_join, left_keep)), Some((right_join, right_keep))) =
            (left.split_last(), right.split_first())
        else {
            return Err(empty_composition(left.len(), right.len()));
        };
        if !left_join.is_comparable(right_join) {
            return Err(
                Error::incomparable(left_join.clone(), right_join.clone()).in_operation("compose")
            );
        }
        let arity = left_keep.len() + right_keep.len();
        if arity == 0 {
            return Err(empty_composition(left.len(), right.len()));
        }

        let mut columns = left_keep.to_vec();
        columns.extend_from_slice(right_keep);
        let element = self.0.store().tuple(&columns);

        let mut by_first: FxHashMap<Value, Vec<Tuple>> = FxHashMap::default();
        for tuple in other.tuples() {
            by_first.entry(tuple.fields()[0].clone()).or_default().push(tuple);
        }

        let mut tuples = PSet::new();
        for tuple in self.tuples() {
            let Some((join, keep)) = tuple.fields().split_last() else {
                continue;
            };
            for matching in by_first.get(join).into_iter().flatten() {
                let mut fields = keep.to_vec();
                fields.extend_from_slice(&matching.fields()[1..]);
                tuples.insert_mut(Value::Tuple(Tuple::from_parts(element.clone(), fields)));
            }
        }

        tracing::debug!(size = tuples.len(), "composition computed");
        Ok(self.derived(&element, tuples))
    }

    /// Returns every field value of every tuple as one set, typed by the
    /// LUB of the column types.
    #[must_use]
    pub fn carrier(&self) -> Set {
        let columns = self.field_types();
        let element = self.0.store().lub_all(&columns);
        let values = self
            .tuples()
            .iter()
            .flat_map(|t| t.fields().iter().cloned())
            .collect();
        Set::widening(self.0.store(), &element, values)
    }

    fn column(&self, index: usize) -> Set {
        let element = self
            .element_type()
            .field_type(index)
            .cloned()
            .unwrap_or_else(Type::void);
        let values = self
            .tuples()
            .iter()
            .filter_map(|t| t.fields().get(index).cloned())
            .collect();
        Set::widening(self.0.store(), &element, values)
    }

    /// Returns the values of the first column.
    #[must_use]
    pub fn domain(&self) -> Set {
        self.column(0)
    }

    /// Returns the values of the last column.
    #[must_use]
    pub fn range(&self) -> Set {
        self.column(self.arity().saturating_sub(1))
    }

    /// Returns the cartesian product, flattening tuples.
    #[must_use]
    pub fn product(&self, other: &Set) -> Relation {
        self.0.product(other)
    }

    /// Returns `universe` minus this relation.
    ///
    /// # Errors
    ///
    /// See [`Set::invert`]. Also returns
    /// [`NotARelation`](strata_types::ErrorKind::NotARelation) if the
    /// universe does not hold tuples.
    pub fn invert(&self, universe: &Set) -> Result<Relation> {
        self.0.invert(universe)?.to_relation()
    }
}

impl Deref for Relation {
    type Target = Set;

    fn deref(&self) -> &Set {
        &self.0
    }
}

impl From<Relation> for Set {
    fn from(relation: Relation) -> Self {
        relation.0
    }
}

impl TryFrom<Set> for Relation {
    type Error = Error;

    fn try_from(set: Set) -> Result<Self> {
        set.to_relation()
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl std::fmt::Debug for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}
