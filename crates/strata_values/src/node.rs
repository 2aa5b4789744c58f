//! Tree values: constructor instances and untyped nodes.
//!
//! A node carries a name, positional children, and a map of annotations.
//! Constructor nodes are typed by a declared constructor and type-check
//! their children; untyped nodes have type `node` and accept any children.
//!
//! Annotations are keyed by label and must be declared in the
//! [`TypeStore`] for the node's type before they can be set or read.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use strata_types::{Error, ErrorKind, Result, Type, TypeStore};

use crate::collections::{PMap, PVector};
use crate::tuple::check_fields;
use crate::value::{Value, write_joined};

struct NodeData {
    ty: Type,
    name: Arc<str>,
    children: PVector<Value>,
    annotations: PMap<Arc<str>, Value>,
}

/// Immutable tree node.
///
/// Equality is deep: type, name, children and annotations.
#[derive(Clone)]
pub struct Node(Arc<NodeData>);

impl Node {
    /// Creates an instance of a declared constructor.
    ///
    /// # Errors
    ///
    /// Returns a type mismatch if `ty` is not a constructor type or a child
    /// does not fit its field type, or an arity mismatch.
    pub fn constructor(ty: &Type, children: Vec<Value>) -> Result<Self> {
        let resolved = ty.resolve();
        let (true, Some(name), Some(fields)) = (
            resolved.is_constructor(),
            resolved.name(),
            resolved.field_types(),
        ) else {
            return Err(Error::type_mismatch(Type::node(), ty.clone()));
        };
        check_fields(fields, &children).map_err(|e| e.in_operation(name))?;

        Ok(Self(Arc::new(NodeData {
            ty: resolved.clone(),
            name: name.into(),
            children: children.into_iter().map(Value::settle).collect(),
            annotations: PMap::new(),
        })))
    }

    /// Creates an untyped node of type `node`.
    #[must_use]
    pub fn untyped(name: &str, children: Vec<Value>) -> Self {
        Self(Arc::new(NodeData {
            ty: Type::node(),
            name: name.into(),
            children: children.into_iter().map(Value::settle).collect(),
            annotations: PMap::new(),
        }))
    }

    fn rebuilt(&self, children: PVector<Value>, annotations: PMap<Arc<str>, Value>) -> Self {
        Self(Arc::new(NodeData {
            ty: self.0.ty.clone(),
            name: self.0.name.clone(),
            children,
            annotations,
        }))
    }

    /// Returns the constructor type, or `node` for untyped nodes.
    #[must_use]
    pub fn ty(&self) -> &Type {
        &self.0.ty
    }

    /// Returns the constructor or node name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Returns true for constructor instances.
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.0.ty.is_constructor()
    }

    /// Returns the number of children.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.0.children.len()
    }

    /// Returns the child at `index`.
    ///
    /// # Errors
    ///
    /// Returns an index out of bounds error.
    pub fn get(&self, index: usize) -> Result<&Value> {
        self.0
            .children
            .get(index)
            .ok_or_else(|| Error::index_out_of_bounds(index, self.arity()))
    }

    /// Returns the child in the field labeled `label`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::UnknownLabel`] if the constructor has no such
    /// field.
    pub fn get_labeled(&self, label: &str) -> Result<&Value> {
        let index = self.0.ty.field_index(label).ok_or_else(|| {
            Error::new(ErrorKind::UnknownLabel {
                on: self.0.ty.clone(),
                label: label.to_string(),
            })
        })?;
        self.get(index)
    }

    /// Iterates over the children in order.
    pub fn children(&self) -> impl Iterator<Item = &Value> {
        self.0.children.iter()
    }

    /// Returns a new node with child `index` replaced.
    ///
    /// Annotations are kept. The receiver is unchanged.
    ///
    /// # Errors
    ///
    /// Returns an index out of bounds error, or a type mismatch if the new
    /// child does not fit the declared field type.
    pub fn set(&self, index: usize, value: Value) -> Result<Node> {
        if index >= self.arity() {
            return Err(Error::index_out_of_bounds(index, self.arity()));
        }
        if let Some(declared) = self.0.ty.field_type(index) {
            let actual = value.ty();
            if !actual.is_subtype_of(declared) {
                return Err(Error::type_mismatch(declared.clone(), actual).in_operation(self.name()));
            }
        }

        let children = self
            .0
            .children
            .update(index, value.settle())
            .ok_or_else(|| Error::index_out_of_bounds(index, self.arity()))?;
        Ok(self.rebuilt(children, self.0.annotations.clone()))
    }

    // =========================================================================
    // Annotations
    // =========================================================================

    fn declared_annotation(&self, store: &TypeStore, label: &str) -> Result<Type> {
        store
            .annotation_type(&self.0.ty, label)
            .ok_or_else(|| Error::undeclared_annotation(self.0.ty.clone(), label))
    }

    /// Returns true if `label` is declared for this node's type.
    #[must_use]
    pub fn declares_annotation(&self, store: &TypeStore, label: &str) -> bool {
        store.declares_annotation(&self.0.ty, label)
    }

    /// Returns true if this node carries annotation `label`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::UndeclaredAnnotation`] if `label` is not
    /// declared for this node's type.
    pub fn has_annotation(&self, store: &TypeStore, label: &str) -> Result<bool> {
        self.declared_annotation(store, label)?;
        Ok(self.0.annotations.contains_key(&Arc::from(label)))
    }

    /// Returns annotation `label`, or `None` if it was never set.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::UndeclaredAnnotation`] if `label` is not
    /// declared for this node's type.
    pub fn get_annotation(&self, store: &TypeStore, label: &str) -> Result<Option<Value>> {
        self.declared_annotation(store, label)?;
        Ok(self.0.annotations.get(&Arc::from(label)).cloned())
    }

    /// Returns a new node with annotation `label` set to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::UndeclaredAnnotation`] for an undeclared label,
    /// or a type mismatch if `value` does not fit the declared type.
    pub fn set_annotation(&self, store: &TypeStore, label: &str, value: Value) -> Result<Node> {
        let declared = self.declared_annotation(store, label)?;
        let actual = value.ty();
        if !actual.is_subtype_of(&declared) {
            return Err(Error::type_mismatch(declared, actual).in_operation("set_annotation"));
        }

        tracing::trace!(node = %self.name(), %label, "annotation set");
        let annotations = self.0.annotations.insert(label.into(), value.settle());
        Ok(self.rebuilt(self.0.children.clone(), annotations))
    }

    /// Returns a new node without annotation `label`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::UndeclaredAnnotation`] for an undeclared label.
    pub fn remove_annotation(&self, store: &TypeStore, label: &str) -> Result<Node> {
        self.declared_annotation(store, label)?;
        let annotations = self.0.annotations.remove(&Arc::from(label));
        Ok(self.rebuilt(self.0.children.clone(), annotations))
    }

    /// Returns the annotations carried by this node, sorted by label.
    #[must_use]
    pub fn annotations(&self) -> Vec<(Arc<str>, Value)> {
        let mut annotations: Vec<_> = self
            .0
            .annotations
            .iter()
            .map(|(label, value)| (label.clone(), value.clone()))
            .collect();
        annotations.sort_by(|a, b| a.0.cmp(&b.0));
        annotations
    }

    /// Returns a copy of this node with no annotations.
    #[must_use]
    pub fn without_annotations(&self) -> Node {
        self.rebuilt(self.0.children.clone(), PMap::new())
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
            || (self.0.ty == other.0.ty
                && self.0.name == other.0.name
                && self.0.children == other.0.children
                && self.0.annotations == other.0.annotations)
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.ty.hash(state);
        self.0.name.hash(state);
        self.0.children.hash(state);
        self.0.annotations.hash(state);
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.0.name)?;
        write_joined(f, self.0.children.iter())?;
        write!(f, ")")?;
        let annotations = self.annotations();
        if !annotations.is_empty() {
            write!(f, "[")?;
            for (i, (label, value)) in annotations.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "@{label}={value}")?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
