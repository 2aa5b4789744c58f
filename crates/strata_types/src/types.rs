//! Canonical type descriptors.
//!
//! A [`Type`] is a cheap handle to an interned node. Two handles are equal
//! exactly when they point at the same node, and the interner guarantees
//! that structurally identical types share a node, so pointer equality is
//! structural equality.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;

/// Canonical type handle.
///
/// Atomic types are process-wide singletons ([`Type::integer`], ...).
/// Composite types are created through a [`TypeStore`](crate::TypeStore).
#[derive(Clone)]
pub struct Type(Arc<TypeData>);

pub(crate) struct TypeData {
    kind: TypeKind,
    /// True if a parameter occurs anywhere inside this type.
    open: bool,
    /// Anonymous alternatives of a data type. Empty for every other kind.
    alternatives: RwLock<Vec<Type>>,
}

/// The structural shape of a type.
///
/// Child types are themselves canonical, so deriving `Eq` and `Hash` here
/// gives the structural key used by the interner.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Bottom of the lattice. Has no values.
    Void,
    /// Top of the lattice.
    Value,
    /// Signed 64-bit integers. Arithmetic leaving that range fails with
    /// [`ErrorKind::Overflow`](crate::ErrorKind::Overflow).
    Integer,
    /// Floating point numbers.
    Real,
    /// Exact fractions.
    Rational,
    /// Supertype of integer, real and rational.
    Number,
    /// Booleans.
    Bool,
    /// Strings.
    String,
    /// Source locations.
    SourceLocation,
    /// Date-time stamps.
    DateTime,
    /// Any tree node, typed or untyped.
    Node,
    /// Ordered sequence.
    List(Type),
    /// Unordered set. A set of tuples is a relation.
    Set(Type),
    /// Finite map.
    Map(Type, Type),
    /// Fixed-arity product, optionally labeled.
    Tuple {
        /// Field types in order.
        fields: Arc<[Type]>,
        /// Field labels, one per field when present.
        labels: Option<Arc<[Arc<str>]>>,
    },
    /// Transparent named type.
    Alias {
        /// The declared name.
        name: Arc<str>,
        /// The aliased type.
        aliased: Type,
    },
    /// Named sum type whose values are constructor nodes.
    Adt {
        /// The declared name.
        name: Arc<str>,
    },
    /// Labeled product tagged to an abstract data type.
    Constructor {
        /// The owning abstract data type.
        adt: Type,
        /// The constructor name.
        name: Arc<str>,
        /// The field types, as a (possibly labeled) tuple type.
        fields: Type,
    },
    /// Type variable for parametric matching.
    Parameter {
        /// The parameter name.
        name: Arc<str>,
        /// Upper bound for anything bound to this parameter.
        bound: Type,
    },
}

macro_rules! atomic_types {
    ($($(#[$doc:meta])* $static:ident => $ctor:ident : $kind:ident),* $(,)?) => {
        $(
            static $static: LazyLock<Type> = LazyLock::new(|| Type::from_kind(TypeKind::$kind));
        )*

        impl Type {
            $(
                $(#[$doc])*
                #[must_use]
                pub fn $ctor() -> Type {
                    $static.clone()
                }
            )*
        }

        /// Returns the shared singleton for an atomic kind.
        pub(crate) fn atomic(kind: &TypeKind) -> Option<Type> {
            match kind {
                $(TypeKind::$kind => Some(Type::$ctor()),)*
                _ => None,
            }
        }
    };
}

atomic_types! {
    /// The bottom type.
    VOID => void: Void,
    /// The top type.
    VALUE => value: Value,
    /// The integer type.
    INTEGER => integer: Integer,
    /// The real type.
    REAL => real: Real,
    /// The rational type.
    RATIONAL => rational: Rational,
    /// The number type.
    NUMBER => number: Number,
    /// The boolean type.
    BOOL => bool: Bool,
    /// The string type.
    STRING => string: String,
    /// The source location type.
    SOURCE_LOCATION => source_location: SourceLocation,
    /// The date-time type.
    DATE_TIME => date_time: DateTime,
    /// The generic node type.
    NODE => node: Node,
}

impl Type {
    /// Wraps a kind in a fresh node. Only the interner may call this for
    /// composite kinds, otherwise canonicity breaks.
    pub(crate) fn from_kind(kind: TypeKind) -> Self {
        let open = match &kind {
            TypeKind::Parameter { .. } => true,
            TypeKind::List(t) | TypeKind::Set(t) => t.is_open(),
            TypeKind::Map(k, v) => k.is_open() || v.is_open(),
            TypeKind::Tuple { fields, .. } => fields.iter().any(Type::is_open),
            TypeKind::Alias { aliased, .. } => aliased.is_open(),
            TypeKind::Constructor { fields, .. } => fields.is_open(),
            _ => false,
        };
        Self(Arc::new(TypeData {
            kind,
            open,
            alternatives: RwLock::new(Vec::new()),
        }))
    }

    /// Returns the anonymous alternatives of a data type.
    pub(crate) fn alternative_types(&self) -> Vec<Type> {
        self.resolve().0.alternatives.read().clone()
    }

    /// Records an anonymous alternative. Only the store calls this, while
    /// holding its declaration lock.
    pub(crate) fn push_alternative(&self, ty: Type) {
        self.resolve().0.alternatives.write().push(ty);
    }

    /// Returns the structural kind.
    #[must_use]
    pub fn kind(&self) -> &TypeKind {
        &self.0.kind
    }

    /// Returns true if a type parameter occurs inside this type.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.0.open
    }

    /// Strips aliases, returning the first non-alias type.
    #[must_use]
    pub fn resolve(&self) -> &Type {
        let mut current = self;
        while let TypeKind::Alias { aliased, .. } = current.kind() {
            current = aliased;
        }
        current
    }

    /// Returns true if this is the void type.
    #[must_use]
    pub fn is_void(&self) -> bool {
        matches!(self.resolve().kind(), TypeKind::Void)
    }

    /// Returns true if this is the value type.
    #[must_use]
    pub fn is_value(&self) -> bool {
        matches!(self.resolve().kind(), TypeKind::Value)
    }

    /// Returns true if this is the integer type.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        matches!(self.resolve().kind(), TypeKind::Integer)
    }

    /// Returns true if this is the real type.
    #[must_use]
    pub fn is_real(&self) -> bool {
        matches!(self.resolve().kind(), TypeKind::Real)
    }

    /// Returns true if this is the number type itself.
    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self.resolve().kind(), TypeKind::Number)
    }

    /// Returns true for integer, real, rational and number.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(
            self.resolve().kind(),
            TypeKind::Integer | TypeKind::Real | TypeKind::Rational | TypeKind::Number
        )
    }

    /// Returns true if this is a list type.
    #[must_use]
    pub fn is_list(&self) -> bool {
        matches!(self.resolve().kind(), TypeKind::List(_))
    }

    /// Returns true if this is a set type (relations included).
    #[must_use]
    pub fn is_set(&self) -> bool {
        matches!(self.resolve().kind(), TypeKind::Set(_))
    }

    /// Returns true if this is a set whose elements are tuples.
    #[must_use]
    pub fn is_relation(&self) -> bool {
        match self.resolve().kind() {
            TypeKind::Set(elem) => elem.is_tuple(),
            _ => false,
        }
    }

    /// Returns true if this is a map type.
    #[must_use]
    pub fn is_map(&self) -> bool {
        matches!(self.resolve().kind(), TypeKind::Map(..))
    }

    /// Returns true if this is a tuple type.
    #[must_use]
    pub fn is_tuple(&self) -> bool {
        matches!(self.resolve().kind(), TypeKind::Tuple { .. })
    }

    /// Returns true if this is a named alias (without resolving).
    #[must_use]
    pub fn is_alias(&self) -> bool {
        matches!(self.kind(), TypeKind::Alias { .. })
    }

    /// Returns true if this is an abstract data type.
    #[must_use]
    pub fn is_adt(&self) -> bool {
        matches!(self.resolve().kind(), TypeKind::Adt { .. })
    }

    /// Returns true if this is a constructor type.
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        matches!(self.resolve().kind(), TypeKind::Constructor { .. })
    }

    /// Returns true if this is the generic node type.
    #[must_use]
    pub fn is_node(&self) -> bool {
        matches!(self.resolve().kind(), TypeKind::Node)
    }

    /// Returns true if this is a type parameter.
    #[must_use]
    pub fn is_parameter(&self) -> bool {
        matches!(self.resolve().kind(), TypeKind::Parameter { .. })
    }

    /// Returns the element type of a list or set.
    #[must_use]
    pub fn element_type(&self) -> Option<&Type> {
        match self.resolve().kind() {
            TypeKind::List(elem) | TypeKind::Set(elem) => Some(elem),
            _ => None,
        }
    }

    /// Returns the key type of a map.
    #[must_use]
    pub fn key_type(&self) -> Option<&Type> {
        match self.resolve().kind() {
            TypeKind::Map(key, _) => Some(key),
            _ => None,
        }
    }

    /// Returns the value type of a map.
    #[must_use]
    pub fn value_type(&self) -> Option<&Type> {
        match self.resolve().kind() {
            TypeKind::Map(_, value) => Some(value),
            _ => None,
        }
    }

    /// The tuple type that carries the fields of a tuple, relation or constructor.
    fn field_carrier(&self) -> Option<&Type> {
        let resolved = self.resolve();
        match resolved.kind() {
            TypeKind::Tuple { .. } => Some(resolved),
            TypeKind::Set(elem) if elem.is_tuple() => Some(elem.resolve()),
            TypeKind::Constructor { fields, .. } => Some(fields.resolve()),
            _ => None,
        }
    }

    /// Returns the field types of a tuple, relation or constructor.
    #[must_use]
    pub fn field_types(&self) -> Option<&[Type]> {
        match self.field_carrier()?.kind() {
            TypeKind::Tuple { fields, .. } => Some(fields),
            _ => None,
        }
    }

    /// Returns the field labels of a tuple, relation or constructor, if labeled.
    #[must_use]
    pub fn field_labels(&self) -> Option<&[Arc<str>]> {
        match self.field_carrier()?.kind() {
            TypeKind::Tuple { labels, .. } => labels.as_deref(),
            _ => None,
        }
    }

    /// Returns the number of fields of a tuple, relation or constructor.
    #[must_use]
    pub fn arity(&self) -> Option<usize> {
        self.field_types().map(<[Type]>::len)
    }

    /// Returns the type of field `index`.
    #[must_use]
    pub fn field_type(&self, index: usize) -> Option<&Type> {
        self.field_types()?.get(index)
    }

    /// Returns the position of a labeled field.
    #[must_use]
    pub fn field_index(&self, label: &str) -> Option<usize> {
        self.field_labels()?
            .iter()
            .position(|candidate| candidate.as_ref() == label)
    }

    /// Returns the name of an alias, data type, constructor or parameter.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self.kind() {
            TypeKind::Alias { name, .. }
            | TypeKind::Adt { name }
            | TypeKind::Constructor { name, .. }
            | TypeKind::Parameter { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Returns the owning data type of a constructor.
    #[must_use]
    pub fn adt(&self) -> Option<&Type> {
        match self.resolve().kind() {
            TypeKind::Constructor { adt, .. } => Some(adt),
            _ => None,
        }
    }

    /// Returns the aliased type of an alias (one level).
    #[must_use]
    pub fn aliased(&self) -> Option<&Type> {
        match self.kind() {
            TypeKind::Alias { aliased, .. } => Some(aliased),
            _ => None,
        }
    }

    /// Returns the bound of a type parameter.
    #[must_use]
    pub fn bound(&self) -> Option<&Type> {
        match self.resolve().kind() {
            TypeKind::Parameter { bound, .. } => Some(bound),
            _ => None,
        }
    }

    /// Returns true if two handles share the same canonical node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Type) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state);
    }
}

fn write_fields(
    f: &mut fmt::Formatter<'_>,
    fields: &[Type],
    labels: Option<&[Arc<str>]>,
) -> fmt::Result {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{field}")?;
        if let Some(label) = labels.and_then(|labels| labels.get(i)) {
            write!(f, " {label}")?;
        }
    }
    Ok(())
}

/// The canonical descriptor. Distinct canonical types never share a
/// descriptor within one store.
impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            TypeKind::Void => write!(f, "void"),
            TypeKind::Value => write!(f, "value"),
            TypeKind::Integer => write!(f, "int"),
            TypeKind::Real => write!(f, "real"),
            TypeKind::Rational => write!(f, "rat"),
            TypeKind::Number => write!(f, "num"),
            TypeKind::Bool => write!(f, "bool"),
            TypeKind::String => write!(f, "str"),
            TypeKind::SourceLocation => write!(f, "loc"),
            TypeKind::DateTime => write!(f, "datetime"),
            TypeKind::Node => write!(f, "node"),
            TypeKind::List(elem) => write!(f, "list[{elem}]"),
            TypeKind::Set(elem) => match elem.kind() {
                TypeKind::Tuple { fields, labels } => {
                    write!(f, "rel[")?;
                    write_fields(f, fields, labels.as_deref())?;
                    write!(f, "]")
                }
                _ => write!(f, "set[{elem}]"),
            },
            TypeKind::Map(key, value) => write!(f, "map[{key}, {value}]"),
            TypeKind::Tuple { fields, labels } => {
                write!(f, "tuple[")?;
                write_fields(f, fields, labels.as_deref())?;
                write!(f, "]")
            }
            TypeKind::Alias { name, .. } | TypeKind::Adt { name } => write!(f, "{name}"),
            TypeKind::Constructor { adt, name, fields } => {
                write!(f, "{adt}::{name}(")?;
                if let TypeKind::Tuple { fields, labels } = fields.kind() {
                    write_fields(f, fields, labels.as_deref())?;
                }
                write!(f, ")")
            }
            TypeKind::Parameter { name, bound } => {
                if bound.is_value() {
                    write!(f, "&{name}")
                } else {
                    write!(f, "&{name} <: {bound}")
                }
            }
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
