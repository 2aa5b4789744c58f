//! Fixed-arity tuples.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use strata_types::{Error, ErrorKind, Result, Type, TypeStore};

use crate::value::{Value, settle_all, write_joined};

/// Immutable fixed-arity product of values.
///
/// Field values are always subtypes of the tuple's field types. Equality
/// and hashing are positional over the field values only.
#[derive(Clone)]
pub struct Tuple {
    ty: Type,
    fields: Arc<[Value]>,
}

impl Tuple {
    /// Creates an unlabeled tuple typed by its field values.
    #[must_use]
    pub fn new(store: &TypeStore, fields: Vec<Value>) -> Self {
        let fields = settle_all(fields);
        let types: Vec<Type> = fields.iter().map(Value::ty).collect();
        Self {
            ty: store.tuple(&types),
            fields: fields.into(),
        }
    }

    /// Creates a labeled tuple typed by its field values.
    ///
    /// # Errors
    ///
    /// Returns an arity mismatch if `labels` and `fields` differ in length.
    pub fn labeled(store: &TypeStore, fields: Vec<Value>, labels: &[&str]) -> Result<Self> {
        let fields = settle_all(fields);
        let types: Vec<Type> = fields.iter().map(Value::ty).collect();
        Ok(Self {
            ty: store.labeled_tuple(&types, labels)?,
            fields: fields.into(),
        })
    }

    /// Creates a tuple with a declared tuple type (or alias of one).
    ///
    /// # Errors
    ///
    /// Returns a type mismatch if `ty` is not a tuple type or a field value
    /// is not a subtype of its field type, or an arity mismatch.
    pub fn of_type(store: &TypeStore, ty: &Type, fields: Vec<Value>) -> Result<Self> {
        let Some(field_types) = ty.field_types().filter(|_| ty.is_tuple()) else {
            let types: Vec<Type> = fields.iter().map(Value::ty).collect();
            return Err(Error::type_mismatch(ty.clone(), store.tuple(&types)));
        };
        check_fields(field_types, &fields)?;
        Ok(Self::from_parts(ty.clone(), settle_all(fields)))
    }

    /// Pairs already-checked fields with their tuple type.
    pub(crate) fn from_parts(ty: Type, fields: Vec<Value>) -> Self {
        Self {
            ty,
            fields: fields.into(),
        }
    }

    /// Returns the tuple type.
    #[must_use]
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    /// Returns the field at `index`.
    ///
    /// # Errors
    ///
    /// Returns an index out of bounds error.
    pub fn get(&self, index: usize) -> Result<&Value> {
        self.fields
            .get(index)
            .ok_or_else(|| Error::index_out_of_bounds(index, self.arity()))
    }

    /// Returns the field labeled `label`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::UnknownLabel`] if no field carries that label.
    pub fn get_labeled(&self, label: &str) -> Result<&Value> {
        let index = self.ty.field_index(label).ok_or_else(|| {
            Error::new(ErrorKind::UnknownLabel {
                on: self.ty.clone(),
                label: label.to_string(),
            })
        })?;
        self.get(index)
    }

    /// Returns a new tuple with field `index` replaced.
    ///
    /// The result is retyped by its field values and keeps the labels.
    ///
    /// # Errors
    ///
    /// Returns an index out of bounds error.
    pub fn set(&self, store: &TypeStore, index: usize, value: Value) -> Result<Tuple> {
        if index >= self.arity() {
            return Err(Error::index_out_of_bounds(index, self.arity()));
        }
        let mut fields = self.fields.to_vec();
        fields[index] = value;
        match self.ty.field_labels() {
            Some(labels) => {
                let labels: Vec<&str> = labels.iter().map(AsRef::as_ref).collect();
                Tuple::labeled(store, fields, &labels)
            }
            None => Ok(Tuple::new(store, fields)),
        }
    }

    /// Returns the field values in order.
    #[must_use]
    pub fn fields(&self) -> &[Value] {
        &self.fields
    }

    /// Returns an iterator over the field values.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.fields.iter()
    }
}

/// Checks arity and field subtyping against declared field types.
pub(crate) fn check_fields(field_types: &[Type], fields: &[Value]) -> Result<()> {
    if field_types.len() != fields.len() {
        return Err(Error::arity_mismatch(field_types.len(), fields.len()));
    }
    for (declared, value) in field_types.iter().zip(fields) {
        let actual = value.ty();
        if !actual.is_subtype_of(declared) {
            return Err(Error::type_mismatch(declared.clone(), actual));
        }
    }
    Ok(())
}

impl PartialEq for Tuple {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl Eq for Tuple {}

impl Hash for Tuple {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fields.hash(state);
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<")?;
        write_joined(f, self.fields.iter())?;
        write!(f, ">")
    }
}

impl fmt::Debug for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl<'a> IntoIterator for &'a Tuple {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
