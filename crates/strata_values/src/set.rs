//! Persistent sets and set algebra.
//!
//! A set whose element type is a tuple type is a relation; see
//! [`Relation`] for the operations that only make sense there.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use strata_types::{Error, ErrorKind, Result, Type, TypeStore};

use crate::collections::PSet;
use crate::relation::Relation;
use crate::tuple::Tuple;
use crate::value::{Value, write_joined};
use crate::writer::{ElementTyping, SetWriter, Shared, admit_set, frozen};

/// Immutable unordered set of values.
///
/// Binary algebra never fails: the result's element type is the least
/// upper bound of both operands' element types.
#[derive(Clone)]
pub struct Set {
    store: TypeStore,
    shared: Shared<PSet<Value>>,
}

impl Set {
    pub(crate) fn from_shared(store: TypeStore, shared: Shared<PSet<Value>>) -> Self {
        Self { store, shared }
    }

    /// A frozen set whose element type widens as it is derived from.
    pub(crate) fn widening(store: &TypeStore, element: &Type, elements: PSet<Value>) -> Self {
        Self::from_shared(
            store.clone(),
            frozen(store.set(element), ElementTyping::Widening, elements),
        )
    }

    fn snapshot(&self) -> (Type, ElementTyping, PSet<Value>) {
        let contents = self.shared.read();
        (contents.ty.clone(), contents.typing, contents.payload.clone())
    }

    /// A closed copy of the current contents.
    pub(crate) fn frozen_copy(&self) -> Self {
        let (ty, typing, elements) = self.snapshot();
        Self::from_shared(self.store.clone(), frozen(ty, typing, elements))
    }

    pub(crate) fn store(&self) -> &TypeStore {
        &self.store
    }

    pub(crate) fn elements(&self) -> PSet<Value> {
        self.snapshot().2
    }

    /// Returns the set type.
    #[must_use]
    pub fn ty(&self) -> Type {
        self.shared.read().ty.clone()
    }

    /// Returns the element type.
    #[must_use]
    pub fn element_type(&self) -> Type {
        self.ty().element_type().cloned().unwrap_or_else(Type::value)
    }

    /// Returns how this set admits new elements.
    #[must_use]
    pub fn typing(&self) -> ElementTyping {
        self.shared.read().typing
    }

    /// Returns true if the elements are tuples.
    #[must_use]
    pub fn is_relation(&self) -> bool {
        self.ty().is_relation()
    }

    /// Returns true while a writer may still add elements.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.shared.read().open
    }

    /// Returns the writer of an open set.
    ///
    /// # Errors
    ///
    /// Returns [`WriterClosed`](strata_types::ErrorKind::WriterClosed) once
    /// the set is frozen.
    pub fn writer(&self) -> Result<SetWriter> {
        if !self.is_open() {
            return Err(Error::writer_closed());
        }
        Ok(SetWriter::new(self.store.clone(), Arc::clone(&self.shared)))
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.read().payload.len()
    }

    /// Returns true if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the set contains `value`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::IncomparableTypes`] if `value` could never be an
    /// element of this set.
    pub fn contains(&self, value: &Value) -> Result<bool> {
        let (element, actual) = (self.element_type(), value.ty());
        if !actual.is_comparable(&element) {
            return Err(Error::incomparable(element, actual));
        }
        Ok(self.shared.read().payload.contains(value))
    }

    /// Returns a new set with `value` inserted.
    ///
    /// # Errors
    ///
    /// Returns a type mismatch if the element type is fixed and `value`
    /// does not fit it.
    pub fn insert(&self, value: Value) -> Result<Set> {
        let value = value.settle();
        let actual = value.ty();
        let (ty, typing, elements) = self.snapshot();
        let ty = admit_set(&self.store, &ty, typing, &actual)?;
        Ok(Self::from_shared(
            self.store.clone(),
            frozen(ty, typing, elements.insert(value)),
        ))
    }

    /// Returns a new set without `value`, with the same type.
    #[must_use]
    pub fn remove(&self, value: &Value) -> Set {
        let (ty, typing, elements) = self.snapshot();
        Self::from_shared(self.store.clone(), frozen(ty, typing, elements.remove(value)))
    }

    fn combine(&self, other: &Set, op: impl FnOnce(&PSet<Value>, &PSet<Value>) -> PSet<Value>) -> Set {
        let element = self.store.lub(&self.element_type(), &other.element_type());
        let elements = op(&self.elements(), &other.elements());
        Self::widening(&self.store, &element, elements)
    }

    /// Returns the elements in either set.
    #[must_use]
    pub fn union(&self, other: &Set) -> Set {
        self.combine(other, PSet::union)
    }

    /// Returns the elements in both sets.
    #[must_use]
    pub fn intersect(&self, other: &Set) -> Set {
        self.combine(other, PSet::intersection)
    }

    /// Returns the elements of this set that are not in `other`.
    #[must_use]
    pub fn subtract(&self, other: &Set) -> Set {
        self.combine(other, PSet::difference)
    }

    /// Returns true if every element is also in `other`.
    #[must_use]
    pub fn is_subset_of(&self, other: &Set) -> bool {
        self.elements().is_subset(&other.elements())
    }

    /// Column types this set contributes to a product.
    fn columns(&self) -> Vec<Type> {
        let element = self.element_type();
        match element.field_types() {
            Some(fields) if element.is_tuple() => fields.to_vec(),
            _ => vec![element],
        }
    }

    /// Returns the cartesian product as a relation.
    ///
    /// Tuple elements are flattened, so the product of an `n`-ary and an
    /// `m`-ary relation is `n + m`-ary.
    #[tracing::instrument(level = "debug", skip_all, fields(left = self.len(), right = other.len()))]
    #[must_use]
    pub fn product(&self, other: &Set) -> Relation {
        let (left_columns, right_columns) = (self.columns(), other.columns());
        let flatten_left = self.element_type().is_tuple();
        let flatten_right = other.element_type().is_tuple();

        let mut columns = left_columns;
        columns.extend(right_columns);
        let tuple_ty = self.store.tuple(&columns);

        let (left, right) = (self.elements(), other.elements());
        let mut product = PSet::new();
        for a in &left {
            for b in &right {
                let mut fields = flattened(a, flatten_left);
                fields.extend(flattened(b, flatten_right));
                product.insert_mut(Value::Tuple(Tuple::from_parts(tuple_ty.clone(), fields)));
            }
        }

        tracing::debug!(size = product.len(), "product computed");
        Relation::from_set(Self::widening(&self.store, &tuple_ty, product))
    }

    /// Views this set as a relation.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::NotARelation`] unless the elements are tuples.
    pub fn to_relation(&self) -> Result<Relation> {
        let ty = self.ty();
        if !ty.is_relation() {
            return Err(Error::new(ErrorKind::NotARelation(ty)));
        }
        Ok(Relation::from_set(self.clone()))
    }

    /// Returns `universe` minus this set.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::IncomparableTypes`] if the element types are
    /// incomparable, or [`ErrorKind::NotASubset`] if an element of this set
    /// is missing from `universe`.
    #[tracing::instrument(level = "debug", skip_all, fields(size = self.len(), universe = universe.len()))]
    pub fn invert(&self, universe: &Set) -> Result<Set> {
        let (element, universe_element) = (self.element_type(), universe.element_type());
        if !element.is_comparable(&universe_element) {
            return Err(Error::incomparable(universe_element, element).in_operation("invert"));
        }

        let (own, all) = (self.elements(), universe.elements());
        if !own.is_subset(&all) {
            return Err(Error::new(ErrorKind::NotASubset {
                universe: universe.ty(),
            })
            .in_operation("invert"));
        }

        Ok(Self::widening(&self.store, &universe_element, all.difference(&own)))
    }

    /// Iterates over the elements. The order is stable for a given set.
    pub fn iter(&self) -> impl Iterator<Item = Value> + use<> {
        self.elements().iter().cloned().collect::<Vec<_>>().into_iter()
    }
}

/// The fields a product takes from one operand element.
fn flattened(value: &Value, flatten: bool) -> Vec<Value> {
    match value {
        Value::Tuple(t) if flatten => t.fields().to_vec(),
        other => vec![other.clone()],
    }
}

// Sets are equal when their elements are, whatever their declared types.
impl PartialEq for Set {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared) || self.elements() == other.elements()
    }
}

impl Eq for Set {}

impl Hash for Set {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.elements().hash(state);
    }
}

impl fmt::Display for Set {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let elements = self.elements();
        write!(f, "{{")?;
        write_joined(f, elements.iter())?;
        write!(f, "}}")
    }
}

impl fmt::Debug for Set {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
