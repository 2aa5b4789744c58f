//! Parametric matching and instantiation.
//!
//! Matching walks a pattern and a subject side by side and records, for
//! each parameter, the least type that covers everything it met. The
//! resulting [`Bindings`] can then be substituted back with
//! [`TypeStore::instantiate`].

use rustc_hash::FxHashMap;

use crate::error::{Error, ErrorKind, Result};
use crate::store::TypeStore;
use crate::types::{Type, TypeKind};

/// Parameter bindings produced by [`TypeStore::match_type`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bindings {
    map: FxHashMap<Type, Type>,
}

impl Bindings {
    /// Creates an empty binding set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the type bound to `parameter`.
    #[must_use]
    pub fn get(&self, parameter: &Type) -> Option<&Type> {
        self.map.get(parameter)
    }

    /// Returns the type bound to the parameter named `name`.
    #[must_use]
    pub fn get_named(&self, name: &str) -> Option<&Type> {
        self.map
            .iter()
            .find(|(param, _)| param.name() == Some(name))
            .map(|(_, bound)| bound)
    }

    /// Binds `parameter` to `ty`, replacing any earlier binding.
    pub fn insert(&mut self, parameter: Type, ty: Type) {
        self.map.insert(parameter, ty);
    }

    /// Returns the number of bound parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterates over `(parameter, bound type)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&Type, &Type)> {
        self.map.iter()
    }
}

impl TypeStore {
    /// Matches `subject` against `pattern`, extending `bindings`.
    ///
    /// A parameter accepts any subtype of its bound. A parameter met twice
    /// is bound to the least upper bound of both subjects. A closed pattern
    /// only requires `subject` to be a subtype of it.
    ///
    /// # Errors
    ///
    /// Returns a type mismatch when the shapes differ or a subject exceeds
    /// a parameter's bound. `bindings` may be partially extended on error.
    pub fn match_type(&self, pattern: &Type, subject: &Type, bindings: &mut Bindings) -> Result<()> {
        if !pattern.is_open() {
            return if subject.is_subtype_of(pattern) {
                Ok(())
            } else {
                Err(Error::type_mismatch(pattern.clone(), subject.clone()))
            };
        }

        if subject.is_void() {
            Self::bind_void(pattern, bindings);
            return Ok(());
        }

        match pattern.kind() {
            TypeKind::Alias { aliased, .. } => return self.match_type(aliased, subject, bindings),
            TypeKind::Parameter { bound, .. } => {
                if !subject.is_subtype_of(bound) {
                    return Err(Error::type_mismatch(bound.clone(), subject.clone()));
                }
                let bound_to = match bindings.get(pattern) {
                    Some(previous) => self.lub(previous, subject),
                    None => subject.clone(),
                };
                bindings.insert(pattern.clone(), bound_to);
                return Ok(());
            }
            _ => {}
        }

        match (pattern.kind(), subject.resolve().kind()) {
            (TypeKind::List(p), TypeKind::List(s)) | (TypeKind::Set(p), TypeKind::Set(s)) => {
                self.match_type(p, s, bindings)
            }
            (TypeKind::Map(pk, pv), TypeKind::Map(sk, sv)) => {
                self.match_type(pk, sk, bindings)?;
                self.match_type(pv, sv, bindings)
            }
            (TypeKind::Tuple { fields: pf, .. }, TypeKind::Tuple { fields: sf, .. })
                if pf.len() == sf.len() =>
            {
                for (p, s) in pf.iter().zip(sf.iter()) {
                    self.match_type(p, s, bindings)?;
                }
                Ok(())
            }
            (
                TypeKind::Constructor {
                    adt: pa,
                    name: pn,
                    fields: pf,
                },
                TypeKind::Constructor {
                    adt: sa,
                    name: sn,
                    fields: sf,
                },
            ) if pa == sa && pn == sn => self.match_type(pf, sf, bindings),
            _ => Err(Error::type_mismatch(pattern.clone(), subject.clone())),
        }
    }

    /// Binds every unbound parameter inside `pattern` to `void`.
    fn bind_void(pattern: &Type, bindings: &mut Bindings) {
        match pattern.kind() {
            TypeKind::Parameter { .. } => {
                if bindings.get(pattern).is_none() {
                    bindings.insert(pattern.clone(), Type::void());
                }
            }
            TypeKind::List(e) | TypeKind::Set(e) => Self::bind_void(e, bindings),
            TypeKind::Map(k, v) => {
                Self::bind_void(k, bindings);
                Self::bind_void(v, bindings);
            }
            TypeKind::Tuple { fields, .. } => {
                for field in fields.iter() {
                    Self::bind_void(field, bindings);
                }
            }
            TypeKind::Alias { aliased, .. } => Self::bind_void(aliased, bindings),
            TypeKind::Constructor { fields, .. } => Self::bind_void(fields, bindings),
            _ => {}
        }
    }

    /// Substitutes bound parameters inside `ty`.
    ///
    /// Closed types are returned as-is. An open alias instantiates to its
    /// substituted body.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::UndefinedParameter`] for a parameter with no binding.
    pub fn instantiate(&self, ty: &Type, bindings: &Bindings) -> Result<Type> {
        if !ty.is_open() {
            return Ok(ty.clone());
        }

        match ty.kind() {
            TypeKind::Parameter { .. } => bindings
                .get(ty)
                .cloned()
                .ok_or_else(|| Error::new(ErrorKind::UndefinedParameter(ty.clone()))),
            TypeKind::List(e) => Ok(self.list(&self.instantiate(e, bindings)?)),
            TypeKind::Set(e) => Ok(self.set(&self.instantiate(e, bindings)?)),
            TypeKind::Map(k, v) => Ok(self.map(
                &self.instantiate(k, bindings)?,
                &self.instantiate(v, bindings)?,
            )),
            TypeKind::Tuple { fields, labels } => {
                let fields = fields
                    .iter()
                    .map(|field| self.instantiate(field, bindings))
                    .collect::<Result<Vec<_>>>()?;
                Ok(self.intern(TypeKind::Tuple {
                    fields: fields.into(),
                    labels: labels.clone(),
                }))
            }
            TypeKind::Alias { aliased, .. } => self.instantiate(aliased, bindings),
            TypeKind::Constructor { adt, name, fields } => Ok(self.intern(TypeKind::Constructor {
                adt: adt.clone(),
                name: name.clone(),
                fields: self.instantiate(fields, bindings)?,
            })),
            _ => Ok(ty.clone()),
        }
    }
}
