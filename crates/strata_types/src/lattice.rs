//! Subtyping and least upper bounds.
//!
//! Aliases are transparent and parameters stand in for their bounds, so
//! both relations are decided on the resolved structure.

use crate::store::TypeStore;
use crate::types::{Type, TypeKind};

impl Type {
    /// Returns true if every value of `self` is also a value of `other`.
    #[must_use]
    pub fn is_subtype_of(&self, other: &Type) -> bool {
        if self == other {
            return true;
        }

        match (self.kind(), other.kind()) {
            (TypeKind::Alias { aliased, .. }, _) => return aliased.is_subtype_of(other),
            (_, TypeKind::Alias { aliased, .. }) => return self.is_subtype_of(aliased),
            _ => {}
        }

        match (self.kind(), other.kind()) {
            (TypeKind::Void, _) | (_, TypeKind::Value) => true,
            (TypeKind::Parameter { bound, .. }, _) => bound.is_subtype_of(other),
            (_, TypeKind::Parameter { bound, .. }) => self.is_subtype_of(bound),
            (TypeKind::Integer | TypeKind::Real | TypeKind::Rational, TypeKind::Number) => true,
            (TypeKind::List(a), TypeKind::List(b)) | (TypeKind::Set(a), TypeKind::Set(b)) => {
                a.is_subtype_of(b)
            }
            (TypeKind::Map(ka, va), TypeKind::Map(kb, vb)) => {
                ka.is_subtype_of(kb) && va.is_subtype_of(vb)
            }
            (TypeKind::Tuple { fields: fa, .. }, TypeKind::Tuple { fields: fb, .. }) => {
                fa.len() == fb.len() && fa.iter().zip(fb.iter()).all(|(a, b)| a.is_subtype_of(b))
            }
            (TypeKind::Constructor { .. }, TypeKind::Node) => true,
            (_, TypeKind::Adt { .. }) => {
                self.adt() == Some(other)
                    || other
                        .alternative_types()
                        .iter()
                        .any(|alternative| self.is_subtype_of(alternative))
            }
            _ => false,
        }
    }

    /// Returns true if each type is a subtype of the other.
    #[must_use]
    pub fn equivalent(&self, other: &Type) -> bool {
        self.is_subtype_of(other) && other.is_subtype_of(self)
    }

    /// Returns true if either type is a subtype of the other.
    ///
    /// Values of incomparable types can never be equal.
    #[must_use]
    pub fn is_comparable(&self, other: &Type) -> bool {
        self.is_subtype_of(other) || other.is_subtype_of(self)
    }
}

impl TypeStore {
    /// Returns the least upper bound of two types.
    ///
    /// Commutative, idempotent, and an upper bound of both arguments.
    #[must_use]
    pub fn lub(&self, a: &Type, b: &Type) -> Type {
        if a == b {
            return a.clone();
        }

        match (a.kind(), b.kind()) {
            (TypeKind::Void, _) => return b.clone(),
            (_, TypeKind::Void) => return a.clone(),
            (TypeKind::Value, _) | (_, TypeKind::Value) => return Type::value(),
            (TypeKind::Alias { aliased, .. }, _) => return self.lub(aliased, b),
            (_, TypeKind::Alias { aliased, .. }) => return self.lub(a, aliased),
            (TypeKind::Parameter { bound, .. }, _) => return self.lub(bound, b),
            (_, TypeKind::Parameter { bound, .. }) => return self.lub(a, bound),
            _ => {}
        }

        if a.is_numeric() && b.is_numeric() {
            return Type::number();
        }

        match (a.kind(), b.kind()) {
            (TypeKind::List(x), TypeKind::List(y)) => self.list(&self.lub(x, y)),
            (TypeKind::Set(x), TypeKind::Set(y)) => self.set(&self.lub(x, y)),
            (TypeKind::Map(ka, va), TypeKind::Map(kb, vb)) => {
                self.map(&self.lub(ka, kb), &self.lub(va, vb))
            }
            (
                TypeKind::Tuple {
                    fields: fa,
                    labels: la,
                },
                TypeKind::Tuple {
                    fields: fb,
                    labels: lb,
                },
            ) if fa.len() == fb.len() => {
                let fields: Vec<Type> = fa.iter().zip(fb.iter()).map(|(x, y)| self.lub(x, y)).collect();
                let labels = if la == lb { la.clone() } else { None };
                self.intern(TypeKind::Tuple {
                    fields: fields.into(),
                    labels,
                })
            }
            (TypeKind::Constructor { adt: x, .. }, TypeKind::Constructor { adt: y, .. })
                if x == y =>
            {
                x.clone()
            }
            (TypeKind::Constructor { .. }, TypeKind::Constructor { .. } | TypeKind::Node)
            | (TypeKind::Node, TypeKind::Constructor { .. }) => Type::node(),
            (_, TypeKind::Adt { .. }) if a.is_subtype_of(b) => b.clone(),
            (TypeKind::Adt { .. }, _) if b.is_subtype_of(a) => a.clone(),
            _ => Type::value(),
        }
    }

    /// Folds [`TypeStore::lub`] over a sequence, starting from `void`.
    #[must_use]
    pub fn lub_all<'a>(&self, types: impl IntoIterator<Item = &'a Type>) -> Type {
        types
            .into_iter()
            .fold(Type::void(), |acc, ty| self.lub(&acc, ty))
    }
}
