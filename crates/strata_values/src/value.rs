//! Core value type for all Strata data.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use strata_types::Type;

use crate::list::List;
use crate::map::Map;
use crate::node::Node;
use crate::numeric::Rational;
use crate::relation::Relation;
use crate::set::Set;
use crate::tuple::Tuple;

/// Core value type for all Strata data.
///
/// Values are immutable and cheaply cloneable. Composite values use
/// structural sharing via persistent data structures, and every value
/// knows its canonical [`Type`].
#[derive(Clone)]
pub enum Value {
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit floating point.
    Real(f64),
    /// Exact fraction.
    Rational(Rational),
    /// String value.
    String(Arc<str>),
    /// Fixed-arity tuple.
    Tuple(Tuple),
    /// Persistent list.
    List(List),
    /// Persistent set. A set of tuples is a relation.
    Set(Set),
    /// Persistent map.
    Map(Map),
    /// Constructor or untyped tree node.
    Node(Node),
}

impl Value {
    /// Returns the canonical type of this value.
    #[must_use]
    pub fn ty(&self) -> Type {
        match self {
            Self::Bool(_) => Type::bool(),
            Self::Integer(_) => Type::integer(),
            Self::Real(_) => Type::real(),
            Self::Rational(_) => Type::rational(),
            Self::String(_) => Type::string(),
            Self::Tuple(t) => t.ty().clone(),
            Self::List(l) => l.ty(),
            Self::Set(s) => s.ty(),
            Self::Map(m) => m.ty(),
            Self::Node(n) => n.ty().clone(),
        }
    }

    /// Attempts to extract a boolean value.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to extract an integer value.
    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract a real value.
    #[must_use]
    pub const fn as_real(&self) -> Option<f64> {
        match self {
            Self::Real(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract a rational value.
    #[must_use]
    pub const fn as_rational(&self) -> Option<Rational> {
        match self {
            Self::Rational(r) => Some(*r),
            _ => None,
        }
    }

    /// Attempts to extract a string reference.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to extract a tuple reference.
    #[must_use]
    pub const fn as_tuple(&self) -> Option<&Tuple> {
        match self {
            Self::Tuple(t) => Some(t),
            _ => None,
        }
    }

    /// Attempts to extract a list reference.
    #[must_use]
    pub const fn as_list(&self) -> Option<&List> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    /// Attempts to extract a set reference (relations included).
    #[must_use]
    pub const fn as_set(&self) -> Option<&Set> {
        match self {
            Self::Set(s) => Some(s),
            _ => None,
        }
    }

    /// Views a set of tuples as a relation.
    #[must_use]
    pub fn as_relation(&self) -> Option<Relation> {
        self.as_set()?.to_relation().ok()
    }

    /// Attempts to extract a map reference.
    #[must_use]
    pub const fn as_map(&self) -> Option<&Map> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Attempts to extract a node reference.
    #[must_use]
    pub const fn as_node(&self) -> Option<&Node> {
        match self {
            Self::Node(n) => Some(n),
            _ => None,
        }
    }
}

// Reals compare bitwise so that `Eq` stays reflexive for NaN.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Real(a), Self::Real(b)) => a.to_bits() == b.to_bits(),
            (Self::Rational(a), Self::Rational(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Tuple(a), Self::Tuple(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Set(a), Self::Set(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Node(a), Self::Node(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Bool(b) => b.hash(state),
            Self::Integer(n) => n.hash(state),
            Self::Real(n) => n.to_bits().hash(state),
            Self::Rational(r) => r.hash(state),
            Self::String(s) => s.hash(state),
            Self::Tuple(t) => t.hash(state),
            Self::List(l) => l.hash(state),
            Self::Set(s) => s.hash(state),
            Self::Map(m) => m.hash(state),
            Self::Node(n) => n.hash(state),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Real(n) => write!(f, "{n:?}"),
            Self::Rational(r) => write!(f, "{r}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Tuple(t) => write!(f, "{t}"),
            Self::List(l) => write!(f, "{l}"),
            Self::Set(s) => write!(f, "{s}"),
            Self::Map(m) => write!(f, "{m}"),
            Self::Node(n) => write!(f, "{n}"),
        }
    }
}

impl Value {
    /// Replaces a collection still open for writing with a closed copy of
    /// its current contents. Stored elements are always settled.
    pub(crate) fn settle(self) -> Value {
        match self {
            Self::List(l) if l.is_open() => Self::List(l.frozen_copy()),
            Self::Set(s) if s.is_open() => Self::Set(s.frozen_copy()),
            Self::Map(m) if m.is_open() => Self::Map(m.frozen_copy()),
            other => other,
        }
    }
}

pub(crate) fn settle_all(values: Vec<Value>) -> Vec<Value> {
    values.into_iter().map(Value::settle).collect()
}

/// Writes `items` separated by commas.
pub(crate) fn write_joined<'a>(
    f: &mut fmt::Formatter<'_>,
    items: impl IntoIterator<Item = &'a Value>,
) -> fmt::Result {
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

// Convenience From implementations

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Real(n)
    }
}

impl From<Rational> for Value {
    fn from(r: Rational) -> Self {
        Self::Rational(r)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s.into())
    }
}

impl From<Arc<str>> for Value {
    fn from(s: Arc<str>) -> Self {
        Self::String(s)
    }
}

impl From<Tuple> for Value {
    fn from(t: Tuple) -> Self {
        Self::Tuple(t)
    }
}

impl From<List> for Value {
    fn from(l: List) -> Self {
        Self::List(l)
    }
}

impl From<Set> for Value {
    fn from(s: Set) -> Self {
        Self::Set(s)
    }
}

impl From<Relation> for Value {
    fn from(r: Relation) -> Self {
        Self::Set(r.into_set())
    }
}

impl From<Map> for Value {
    fn from(m: Map) -> Self {
        Self::Map(m)
    }
}

impl From<Node> for Value {
    fn from(n: Node) -> Self {
        Self::Node(n)
    }
}
