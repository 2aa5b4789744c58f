//! Persistent lists.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use strata_types::{Error, Result, Type, TypeStore};

use crate::collections::PVector;
use crate::value::{Value, write_joined};
use crate::writer::{ElementTyping, ListWriter, Shared, admit, admit_list, frozen};

/// Immutable ordered sequence of values.
///
/// Every operation returns a new list; the receiver is never changed.
/// Whether a foreign element is rejected or widens the element type
/// depends on the list's [`ElementTyping`].
#[derive(Clone)]
pub struct List {
    store: TypeStore,
    shared: Shared<PVector<Value>>,
}

impl List {
    pub(crate) fn from_shared(store: TypeStore, shared: Shared<PVector<Value>>) -> Self {
        Self { store, shared }
    }

    fn derived(&self, ty: Type, typing: ElementTyping, elements: PVector<Value>) -> Self {
        Self::from_shared(self.store.clone(), frozen(ty, typing, elements))
    }

    fn snapshot(&self) -> (Type, ElementTyping, PVector<Value>) {
        let contents = self.shared.read();
        (contents.ty.clone(), contents.typing, contents.payload.clone())
    }

    /// A closed copy of the current contents.
    pub(crate) fn frozen_copy(&self) -> Self {
        let (ty, typing, elements) = self.snapshot();
        Self::from_shared(self.store.clone(), frozen(ty, typing, elements))
    }

    /// Returns the list type.
    #[must_use]
    pub fn ty(&self) -> Type {
        self.shared.read().ty.clone()
    }

    /// Returns the element type.
    #[must_use]
    pub fn element_type(&self) -> Type {
        self.ty().element_type().cloned().unwrap_or_else(Type::value)
    }

    /// Returns how this list admits new elements.
    #[must_use]
    pub fn typing(&self) -> ElementTyping {
        self.shared.read().typing
    }

    /// Returns true while a writer may still add elements.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.shared.read().open
    }

    /// Returns the writer of an open list.
    ///
    /// # Errors
    ///
    /// Returns [`WriterClosed`](strata_types::ErrorKind::WriterClosed) once
    /// the list is frozen.
    pub fn writer(&self) -> Result<ListWriter> {
        if !self.is_open() {
            return Err(Error::writer_closed());
        }
        Ok(ListWriter::new(self.store.clone(), Arc::clone(&self.shared)))
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.read().payload.len()
    }

    /// Returns true if the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns an index out of bounds error outside `[0, len)`.
    pub fn get(&self, index: usize) -> Result<Value> {
        let contents = self.shared.read();
        contents
            .payload
            .get(index)
            .cloned()
            .ok_or_else(|| Error::index_out_of_bounds(index, contents.payload.len()))
    }

    /// Returns a new list with `value` appended.
    ///
    /// # Errors
    ///
    /// Returns a type mismatch if the element type is fixed and `value`
    /// does not fit it.
    pub fn append(&self, value: Value) -> Result<List> {
        let value = value.settle();
        let actual = value.ty();
        let (ty, typing, elements) = self.snapshot();
        let ty = admit_list(&self.store, &ty, typing, &actual)?;
        Ok(self.derived(ty, typing, elements.push_back(value)))
    }

    /// Returns a new list with `value` in front.
    ///
    /// # Errors
    ///
    /// See [`List::append`].
    pub fn insert(&self, value: Value) -> Result<List> {
        let value = value.settle();
        let actual = value.ty();
        let (ty, typing, elements) = self.snapshot();
        let ty = admit_list(&self.store, &ty, typing, &actual)?;
        Ok(self.derived(ty, typing, elements.push_front(value)))
    }

    /// Returns a new list with the elements of `other` appended.
    ///
    /// # Errors
    ///
    /// Returns a type mismatch if the element type is fixed and the
    /// element type of `other` does not fit it.
    pub fn concat(&self, other: &List) -> Result<List> {
        let other_element = other.element_type();
        let other_elements = other.snapshot().2;
        let (ty, typing, elements) = self.snapshot();

        let current = ty.element_type().cloned().unwrap_or_else(Type::value);
        let element = admit(&self.store, typing, &current, &other_element)?;
        let ty = match typing {
            ElementTyping::Fixed => ty,
            ElementTyping::Widening => self.store.list(&element),
        };
        Ok(self.derived(ty, typing, elements.concat(&other_elements)))
    }

    /// Returns a new list in reverse order, with the same type.
    #[must_use]
    pub fn reverse(&self) -> List {
        let (ty, typing, elements) = self.snapshot();
        self.derived(ty, typing, elements.reversed())
    }

    /// Returns the `length` elements starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an index out of bounds error if the range does not fit.
    pub fn sublist(&self, offset: usize, length: usize) -> Result<List> {
        let (ty, typing, elements) = self.snapshot();
        let slice = elements.slice(offset, length).ok_or_else(|| {
            Error::index_out_of_bounds(offset.saturating_add(length), elements.len())
        })?;
        Ok(self.derived(ty, typing, slice))
    }

    /// Returns true if an element equals `value`.
    #[must_use]
    pub fn contains(&self, value: &Value) -> bool {
        self.shared.read().payload.iter().any(|item| item == value)
    }

    /// Iterates over the elements in index order.
    ///
    /// Each call starts over at index 0.
    pub fn iter(&self) -> impl Iterator<Item = Value> + use<> {
        self.snapshot().2.into_iter()
    }

    /// Collects the elements into a vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Value> {
        self.iter().collect()
    }

    pub(crate) fn elements(&self) -> PVector<Value> {
        self.snapshot().2
    }
}

// Lists are equal when their element sequences are.
impl PartialEq for List {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared) || self.elements() == other.elements()
    }
}

impl Eq for List {}

impl Hash for List {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.elements().hash(state);
    }
}

impl fmt::Display for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let elements = self.elements();
        write!(f, "[")?;
        write_joined(f, elements.iter())?;
        write!(f, "]")
    }
}

impl fmt::Debug for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
