//! Writers: the single mutable front-end of a collection value.
//!
//! An open collection value and its writer share one staging cell. Writes
//! are visible through the value right away; [`done`](ListWriter::done)
//! closes the cell exactly once, after which the value is frozen and every
//! further write fails with [`ErrorKind::WriterClosed`].
//!
//! [`ErrorKind::WriterClosed`]: strata_types::ErrorKind::WriterClosed

use std::sync::Arc;

use parking_lot::RwLock;
use strata_types::{Error, Result, Type, TypeStore};

use crate::collections::{PMap, PSet, PVector};
use crate::list::List;
use crate::map::Map;
use crate::set::Set;
use crate::value::Value;

/// How a collection's element type reacts to a new element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementTyping {
    /// The element type is declared; elements outside it are rejected.
    Fixed,
    /// The element type is inferred; each element widens it to the LUB.
    Widening,
}

/// Staging cell shared by a collection value and its writer.
pub(crate) struct Contents<P> {
    pub(crate) ty: Type,
    pub(crate) typing: ElementTyping,
    pub(crate) payload: P,
    pub(crate) open: bool,
}

pub(crate) type Shared<P> = Arc<RwLock<Contents<P>>>;

/// Wraps a finished payload in a closed cell.
pub(crate) fn frozen<P>(ty: Type, typing: ElementTyping, payload: P) -> Shared<P> {
    Arc::new(RwLock::new(Contents {
        ty,
        typing,
        payload,
        open: false,
    }))
}

/// Wraps an empty payload in a cell that still accepts writes.
pub(crate) fn staged<P>(ty: Type, typing: ElementTyping, payload: P) -> Shared<P> {
    Arc::new(RwLock::new(Contents {
        ty,
        typing,
        payload,
        open: true,
    }))
}

/// Checks (fixed) or widens (widening) `slot` to admit a value of type `actual`.
pub(crate) fn admit(
    store: &TypeStore,
    typing: ElementTyping,
    slot: &Type,
    actual: &Type,
) -> Result<Type> {
    match typing {
        ElementTyping::Fixed if actual.is_subtype_of(slot) => Ok(slot.clone()),
        ElementTyping::Fixed => Err(Error::type_mismatch(slot.clone(), actual.clone())),
        ElementTyping::Widening => Ok(store.lub(slot, actual)),
    }
}

fn element_of(ty: &Type) -> Type {
    ty.element_type().cloned().unwrap_or_else(Type::value)
}

/// Returns the list type that admits `actual` next to the current elements.
pub(crate) fn admit_list(
    store: &TypeStore,
    ty: &Type,
    typing: ElementTyping,
    actual: &Type,
) -> Result<Type> {
    let element = admit(store, typing, &element_of(ty), actual)?;
    Ok(match typing {
        ElementTyping::Fixed => ty.clone(),
        ElementTyping::Widening => store.list(&element),
    })
}

/// Returns the set type that admits `actual` next to the current elements.
pub(crate) fn admit_set(
    store: &TypeStore,
    ty: &Type,
    typing: ElementTyping,
    actual: &Type,
) -> Result<Type> {
    let element = admit(store, typing, &element_of(ty), actual)?;
    Ok(match typing {
        ElementTyping::Fixed => ty.clone(),
        ElementTyping::Widening => store.set(&element),
    })
}

/// Returns the map type that admits an entry of the given key and value types.
pub(crate) fn admit_entry(
    store: &TypeStore,
    ty: &Type,
    typing: ElementTyping,
    key: &Type,
    value: &Type,
) -> Result<Type> {
    let current_key = ty.key_type().cloned().unwrap_or_else(Type::value);
    let current_value = ty.value_type().cloned().unwrap_or_else(Type::value);
    let key = admit(store, typing, &current_key, key)?;
    let value = admit(store, typing, &current_value, value)?;
    Ok(match typing {
        ElementTyping::Fixed => ty.clone(),
        ElementTyping::Widening => store.map(&key, &value),
    })
}

fn close<P>(shared: &Shared<P>) -> Result<()> {
    let mut contents = shared.write();
    if !contents.open {
        return Err(Error::writer_closed());
    }
    contents.open = false;
    tracing::trace!(ty = %contents.ty, "writer closed");
    Ok(())
}

// =============================================================================
// ListWriter
// =============================================================================

/// Builds a [`List`] in place.
///
/// Writers obtained from the same open value are the same writer and
/// compare equal.
pub struct ListWriter {
    store: TypeStore,
    shared: Shared<PVector<Value>>,
}

impl ListWriter {
    pub(crate) fn new(store: TypeStore, shared: Shared<PVector<Value>>) -> Self {
        Self { store, shared }
    }

    /// Appends `value` at the end.
    ///
    /// # Errors
    ///
    /// Returns [`WriterClosed`](strata_types::ErrorKind::WriterClosed) after
    /// `done()`, or a type mismatch if the list's element type is fixed.
    pub fn append(&self, value: Value) -> Result<()> {
        let value = value.settle();
        let actual = value.ty();
        let mut contents = self.shared.write();
        if !contents.open {
            return Err(Error::writer_closed());
        }
        contents.ty = admit_list(&self.store, &contents.ty, contents.typing, &actual)?;
        contents.payload.push_back_mut(value);
        Ok(())
    }

    /// Inserts `value` at the front.
    ///
    /// # Errors
    ///
    /// See [`ListWriter::append`].
    pub fn insert(&self, value: Value) -> Result<()> {
        let value = value.settle();
        let actual = value.ty();
        let mut contents = self.shared.write();
        if !contents.open {
            return Err(Error::writer_closed());
        }
        contents.ty = admit_list(&self.store, &contents.ty, contents.typing, &actual)?;
        contents.payload.push_front_mut(value);
        Ok(())
    }

    /// Appends every value in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// See [`ListWriter::append`].
    pub fn append_all(&self, values: impl IntoIterator<Item = Value>) -> Result<()> {
        values.into_iter().try_for_each(|value| self.append(value))
    }

    /// Returns the number of staged elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.read().payload.len()
    }

    /// Returns true if nothing is staged yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Freezes the list.
    ///
    /// # Errors
    ///
    /// Returns [`WriterClosed`](strata_types::ErrorKind::WriterClosed) if the
    /// writer was already closed.
    pub fn done(&self) -> Result<List> {
        close(&self.shared)?;
        Ok(List::from_shared(self.store.clone(), Arc::clone(&self.shared)))
    }
}

impl PartialEq for ListWriter {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl Eq for ListWriter {}

impl std::fmt::Debug for ListWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let contents = self.shared.read();
        f.debug_struct("ListWriter")
            .field("ty", &contents.ty)
            .field("open", &contents.open)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// SetWriter
// =============================================================================

/// Builds a [`Set`] (or relation) in place.
pub struct SetWriter {
    store: TypeStore,
    shared: Shared<PSet<Value>>,
}

impl SetWriter {
    pub(crate) fn new(store: TypeStore, shared: Shared<PSet<Value>>) -> Self {
        Self { store, shared }
    }

    /// Inserts `value`. Inserting an element already present is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`WriterClosed`](strata_types::ErrorKind::WriterClosed) after
    /// `done()`, or a type mismatch if the set's element type is fixed.
    pub fn insert(&self, value: Value) -> Result<()> {
        let value = value.settle();
        let actual = value.ty();
        let mut contents = self.shared.write();
        if !contents.open {
            return Err(Error::writer_closed());
        }
        contents.ty = admit_set(&self.store, &contents.ty, contents.typing, &actual)?;
        contents.payload.insert_mut(value);
        Ok(())
    }

    /// Inserts every value, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// See [`SetWriter::insert`].
    pub fn insert_all(&self, values: impl IntoIterator<Item = Value>) -> Result<()> {
        values.into_iter().try_for_each(|value| self.insert(value))
    }

    /// Returns the number of staged elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.read().payload.len()
    }

    /// Returns true if nothing is staged yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Freezes the set.
    ///
    /// # Errors
    ///
    /// Returns [`WriterClosed`](strata_types::ErrorKind::WriterClosed) if the
    /// writer was already closed.
    pub fn done(&self) -> Result<Set> {
        close(&self.shared)?;
        Ok(Set::from_shared(self.store.clone(), Arc::clone(&self.shared)))
    }
}

impl PartialEq for SetWriter {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl Eq for SetWriter {}

impl std::fmt::Debug for SetWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let contents = self.shared.read();
        f.debug_struct("SetWriter")
            .field("ty", &contents.ty)
            .field("open", &contents.open)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// MapWriter
// =============================================================================

/// Builds a [`Map`] in place.
pub struct MapWriter {
    store: TypeStore,
    shared: Shared<PMap<Value, Value>>,
}

impl MapWriter {
    pub(crate) fn new(store: TypeStore, shared: Shared<PMap<Value, Value>>) -> Self {
        Self { store, shared }
    }

    /// Binds `key` to `value`, replacing any earlier binding.
    ///
    /// # Errors
    ///
    /// Returns [`WriterClosed`](strata_types::ErrorKind::WriterClosed) after
    /// `done()`, or a type mismatch if the map's types are fixed.
    pub fn put(&self, key: Value, value: Value) -> Result<()> {
        let (key, value) = (key.settle(), value.settle());
        let (key_ty, value_ty) = (key.ty(), value.ty());
        let mut contents = self.shared.write();
        if !contents.open {
            return Err(Error::writer_closed());
        }
        contents.ty = admit_entry(&self.store, &contents.ty, contents.typing, &key_ty, &value_ty)?;
        contents.payload.insert_mut(key, value);
        Ok(())
    }

    /// Returns the number of staged entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.read().payload.len()
    }

    /// Returns true if nothing is staged yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Freezes the map.
    ///
    /// # Errors
    ///
    /// Returns [`WriterClosed`](strata_types::ErrorKind::WriterClosed) if the
    /// writer was already closed.
    pub fn done(&self) -> Result<Map> {
        close(&self.shared)?;
        Ok(Map::from_shared(self.store.clone(), Arc::clone(&self.shared)))
    }
}

impl PartialEq for MapWriter {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl Eq for MapWriter {}

impl std::fmt::Debug for MapWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let contents = self.shared.read();
        f.debug_struct("MapWriter")
            .field("ty", &contents.ty)
            .field("open", &contents.open)
            .finish_non_exhaustive()
    }
}
