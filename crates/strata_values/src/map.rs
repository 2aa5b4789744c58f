//! Persistent maps.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use strata_types::{Error, Result, Type, TypeStore};

use crate::collections::PMap;
use crate::value::Value;
use crate::writer::{ElementTyping, MapWriter, Shared, admit_entry, frozen};

/// Immutable map from values to values.
#[derive(Clone)]
pub struct Map {
    store: TypeStore,
    shared: Shared<PMap<Value, Value>>,
}

impl Map {
    pub(crate) fn from_shared(store: TypeStore, shared: Shared<PMap<Value, Value>>) -> Self {
        Self { store, shared }
    }

    fn snapshot(&self) -> (Type, ElementTyping, PMap<Value, Value>) {
        let contents = self.shared.read();
        (contents.ty.clone(), contents.typing, contents.payload.clone())
    }

    /// A closed copy of the current contents.
    pub(crate) fn frozen_copy(&self) -> Self {
        let (ty, typing, entries) = self.snapshot();
        Self::from_shared(self.store.clone(), frozen(ty, typing, entries))
    }

    fn entries(&self) -> PMap<Value, Value> {
        self.snapshot().2
    }

    /// Returns the map type.
    #[must_use]
    pub fn ty(&self) -> Type {
        self.shared.read().ty.clone()
    }

    /// Returns the key type.
    #[must_use]
    pub fn key_type(&self) -> Type {
        self.ty().key_type().cloned().unwrap_or_else(Type::value)
    }

    /// Returns the value type.
    #[must_use]
    pub fn value_type(&self) -> Type {
        self.ty().value_type().cloned().unwrap_or_else(Type::value)
    }

    /// Returns how this map admits new entries.
    #[must_use]
    pub fn typing(&self) -> ElementTyping {
        self.shared.read().typing
    }

    /// Returns true while a writer may still add entries.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.shared.read().open
    }

    /// Returns the writer of an open map.
    ///
    /// # Errors
    ///
    /// Returns [`WriterClosed`](strata_types::ErrorKind::WriterClosed) once
    /// the map is frozen.
    pub fn writer(&self) -> Result<MapWriter> {
        if !self.is_open() {
            return Err(Error::writer_closed());
        }
        Ok(MapWriter::new(self.store.clone(), Arc::clone(&self.shared)))
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.read().payload.len()
    }

    /// Returns true if the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the value bound to `key`, if any.
    #[must_use]
    pub fn get(&self, key: &Value) -> Option<Value> {
        self.shared.read().payload.get(key).cloned()
    }

    /// Returns true if `key` is bound.
    #[must_use]
    pub fn contains_key(&self, key: &Value) -> bool {
        self.shared.read().payload.contains_key(key)
    }

    /// Returns a new map with `key` bound to `value`.
    ///
    /// # Errors
    ///
    /// Returns a type mismatch if the map's types are fixed and the entry
    /// does not fit them.
    pub fn put(&self, key: Value, value: Value) -> Result<Map> {
        let (key, value) = (key.settle(), value.settle());
        let (key_ty, value_ty) = (key.ty(), value.ty());
        let (ty, typing, entries) = self.snapshot();
        let ty = admit_entry(&self.store, &ty, typing, &key_ty, &value_ty)?;
        Ok(Self::from_shared(
            self.store.clone(),
            frozen(ty, typing, entries.insert(key, value)),
        ))
    }

    /// Returns a new map without `key`, with the same type.
    #[must_use]
    pub fn remove(&self, key: &Value) -> Map {
        let (ty, typing, entries) = self.snapshot();
        Self::from_shared(self.store.clone(), frozen(ty, typing, entries.remove(key)))
    }

    /// Returns the keys.
    #[must_use]
    pub fn keys(&self) -> Vec<Value> {
        self.entries().keys().cloned().collect()
    }

    /// Returns the values.
    #[must_use]
    pub fn values(&self) -> Vec<Value> {
        self.entries().values().cloned().collect()
    }

    /// Iterates over the entries.
    pub fn iter(&self) -> impl Iterator<Item = (Value, Value)> + use<> {
        self.entries()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect::<Vec<_>>()
            .into_iter()
    }
}

impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared) || self.entries() == other.entries()
    }
}

impl Eq for Map {}

impl Hash for Map {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entries().hash(state);
    }
}

impl fmt::Display for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, (key, value)) in self.entries().iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{key}:{value}")?;
        }
        write!(f, ")")
    }
}

impl fmt::Debug for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
