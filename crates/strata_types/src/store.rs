//! The type store: canonical type construction and schema declarations.
//!
//! A [`TypeStore`] is a cheaply cloneable handle. Clones share one
//! interner and one declaration registry, so a store is passed around
//! explicitly instead of living in a global.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::config::StoreConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::intern::Interner;
use crate::types::{Type, TypeKind};

/// Names that always denote atomic types and can never be declared.
const RESERVED_NAMES: &[(&str, fn() -> Type)] = &[
    ("void", Type::void),
    ("value", Type::value),
    ("int", Type::integer),
    ("real", Type::real),
    ("rat", Type::rational),
    ("num", Type::number),
    ("bool", Type::bool),
    ("str", Type::string),
    ("loc", Type::source_location),
    ("datetime", Type::date_time),
    ("node", Type::node),
];

/// Structural type keywords. Declaring them would make descriptors ambiguous.
const KEYWORDS: &[&str] = &["list", "set", "rel", "map", "tuple"];

fn invalid_name(name: &str, reason: &'static str) -> Error {
    Error::new(ErrorKind::InvalidName {
        name: name.to_string(),
        reason,
    })
}

/// Requires `name` to be an ASCII identifier (`[A-Za-z_][A-Za-z0-9_]*`).
fn check_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(invalid_name(name, "not an identifier"))
    }
}

/// An anonymous labeled alternative of a data type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alternative {
    /// The alternative's label.
    pub label: Arc<str>,
    /// The alternative's type.
    pub ty: Type,
}

/// Declarations registered in a store. Only ever grows.
#[derive(Default)]
struct Declarations {
    /// Data types and aliases by name.
    named: FxHashMap<Arc<str>, Type>,
    /// Constructors per data type, in declaration order.
    constructors: FxHashMap<Type, Vec<Type>>,
    /// Anonymous alternatives per data type, in declaration order.
    alternatives: FxHashMap<Type, Vec<Alternative>>,
    /// Annotation label to value type, per annotated type.
    annotations: FxHashMap<Type, FxHashMap<Arc<str>, Type>>,
}

struct StoreInner {
    config: StoreConfig,
    interner: Interner,
    declarations: RwLock<Declarations>,
}

/// Shared registry of canonical types and declarations.
///
/// Reads of canonical types are lock-free after interning; declarations
/// are serialized through a single writer lock.
#[derive(Clone)]
pub struct TypeStore(Arc<StoreInner>);

impl TypeStore {
    /// Creates an empty store with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Creates an empty store with the given configuration.
    #[must_use]
    pub fn with_config(config: StoreConfig) -> Self {
        Self(Arc::new(StoreInner {
            interner: Interner::new(&config),
            config,
            declarations: RwLock::new(Declarations::default()),
        }))
    }

    /// Returns the configuration this store was created with.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.0.config
    }

    /// Returns true if both handles refer to the same store.
    #[must_use]
    pub fn ptr_eq(&self, other: &TypeStore) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Returns the number of composite types interned so far.
    #[must_use]
    pub fn interned_count(&self) -> usize {
        self.0.interner.len()
    }

    pub(crate) fn intern(&self, kind: TypeKind) -> Type {
        self.0.interner.intern(kind)
    }

    // =========================================================================
    // Structural construction
    // =========================================================================

    /// Builds the canonical type for any kind.
    ///
    /// Named kinds go through the matching declaration, so the same
    /// conflicts are reported as for `declare_*`.
    ///
    /// # Errors
    ///
    /// Returns an error if the kind is malformed (label count differs from
    /// field count, constructor fields that are not a tuple type, invalid
    /// names) or its declaration conflicts with an existing one.
    pub fn make_type(&self, kind: TypeKind) -> Result<Type> {
        match kind {
            TypeKind::Tuple {
                fields,
                labels: Some(labels),
            } => {
                let labels: Vec<&str> = labels.iter().map(AsRef::as_ref).collect();
                self.labeled_tuple(&fields, &labels)
            }
            TypeKind::Alias { name, aliased } => self.declare_alias(&name, &aliased),
            TypeKind::Adt { name } => self.declare_adt(&name),
            TypeKind::Constructor { adt, name, fields } => {
                let tuple = fields.resolve();
                if !tuple.is_tuple() {
                    return Err(Error::new(ErrorKind::NotATuple(fields.clone())));
                }
                self.register_constructor(&adt, &name, tuple.clone())
            }
            other => Ok(self.intern(other)),
        }
    }

    /// Returns the list type with the given element type.
    #[must_use]
    pub fn list(&self, element: &Type) -> Type {
        self.intern(TypeKind::List(element.clone()))
    }

    /// Returns the set type with the given element type.
    #[must_use]
    pub fn set(&self, element: &Type) -> Type {
        self.intern(TypeKind::Set(element.clone()))
    }

    /// Returns the map type with the given key and value types.
    #[must_use]
    pub fn map(&self, key: &Type, value: &Type) -> Type {
        self.intern(TypeKind::Map(key.clone(), value.clone()))
    }

    /// Returns the unlabeled tuple type with the given field types.
    #[must_use]
    pub fn tuple(&self, fields: &[Type]) -> Type {
        self.intern(TypeKind::Tuple {
            fields: fields.into(),
            labels: None,
        })
    }

    /// Returns the labeled tuple type with the given fields.
    ///
    /// # Errors
    ///
    /// Returns an arity mismatch if `labels` and `fields` differ in length,
    /// or [`ErrorKind::InvalidName`] if a label is not an identifier.
    pub fn labeled_tuple(&self, fields: &[Type], labels: &[&str]) -> Result<Type> {
        if fields.len() != labels.len() {
            return Err(Error::arity_mismatch(fields.len(), labels.len()));
        }
        for label in labels {
            check_identifier(label)?;
        }
        Ok(self.intern(TypeKind::Tuple {
            fields: fields.into(),
            labels: Some(labels.iter().map(|label| Arc::from(*label)).collect()),
        }))
    }

    /// Returns the relation type (set of tuples) with the given column types.
    #[must_use]
    pub fn relation(&self, fields: &[Type]) -> Type {
        self.set(&self.tuple(fields))
    }

    /// Returns the relation type whose columns mimic a tuple type.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::NotARelation`] unless `tuple` is a tuple type or
    /// an alias of one.
    pub fn relation_of(&self, tuple: &Type) -> Result<Type> {
        let resolved = tuple.resolve();
        if !resolved.is_tuple() {
            return Err(Error::new(ErrorKind::NotARelation(tuple.clone())));
        }
        Ok(self.set(resolved))
    }

    /// Returns a parameter bounded by `value`.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Type {
        self.bounded_parameter(name, &Type::value())
    }

    /// Returns a parameter with an explicit upper bound.
    #[must_use]
    pub fn bounded_parameter(&self, name: &str, bound: &Type) -> Type {
        self.intern(TypeKind::Parameter {
            name: name.into(),
            bound: bound.clone(),
        })
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    /// Checks a data type or alias name: an identifier that is neither a
    /// type keyword nor an atomic type name.
    fn check_declarable(name: &str) -> Result<()> {
        check_identifier(name)?;
        if KEYWORDS.contains(&name) {
            return Err(invalid_name(name, "reserved type keyword"));
        }
        match RESERVED_NAMES.iter().find(|(reserved, _)| *reserved == name) {
            Some((_, atom)) => Err(Error::new(ErrorKind::NameClash {
                name: name.to_string(),
                existing: atom(),
            })),
            None => Ok(()),
        }
    }

    /// Declares (or returns) the abstract data type `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidName`] if `name` is not an identifier or
    /// is a type keyword, and a name clash if it names an atomic type or is
    /// already an alias.
    pub fn declare_adt(&self, name: &str) -> Result<Type> {
        Self::check_declarable(name)?;
        let mut decls = self.0.declarations.write();

        if let Some(existing) = decls.named.get(name) {
            return if existing.is_alias() {
                Err(Error::new(ErrorKind::NameClash {
                    name: name.to_string(),
                    existing: existing.clone(),
                }))
            } else {
                Ok(existing.clone())
            };
        }

        let adt = self.intern(TypeKind::Adt { name: name.into() });
        decls.named.insert(name.into(), adt.clone());
        tracing::debug!(%name, "declared data type");
        Ok(adt)
    }

    /// Declares (or returns) the alias `name` for `aliased`.
    ///
    /// # Errors
    ///
    /// Returns a redeclaration error if `name` already aliases another
    /// type, a name clash if it is reserved or names a data type, or
    /// [`ErrorKind::InvalidName`] as for [`TypeStore::declare_adt`].
    pub fn declare_alias(&self, name: &str, aliased: &Type) -> Result<Type> {
        Self::check_declarable(name)?;
        let mut decls = self.0.declarations.write();

        if let Some(existing) = decls.named.get(name) {
            return match existing.aliased() {
                Some(current) if current == aliased => Ok(existing.clone()),
                Some(_) => Err(Error::redeclaration(name, existing.clone())),
                None => Err(Error::new(ErrorKind::NameClash {
                    name: name.to_string(),
                    existing: existing.clone(),
                })),
            };
        }

        let alias = self.intern(TypeKind::Alias {
            name: name.into(),
            aliased: aliased.clone(),
        });
        decls.named.insert(name.into(), alias.clone());
        tracing::debug!(%name, aliased = %aliased, "declared alias");
        Ok(alias)
    }

    /// Declares an unlabeled constructor of `adt`.
    ///
    /// # Errors
    ///
    /// See [`TypeStore::declare_labeled_constructor`].
    pub fn declare_constructor(&self, adt: &Type, name: &str, fields: &[Type]) -> Result<Type> {
        let tuple = self.tuple(fields);
        self.register_constructor(adt, name, tuple)
    }

    /// Declares a constructor of `adt` with labeled fields.
    ///
    /// Redeclaring the exact same signature returns the same type.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::NotAnAdt`] if `adt` is not a data type, an arity
    /// mismatch if labels and fields differ in length,
    /// [`ErrorKind::InvalidName`] if the name or a label is not an
    /// identifier, or a redeclaration error if `adt` already has a
    /// constructor `name` with another signature.
    pub fn declare_labeled_constructor(
        &self,
        adt: &Type,
        name: &str,
        fields: &[Type],
        labels: &[&str],
    ) -> Result<Type> {
        let tuple = self.labeled_tuple(fields, labels)?;
        self.register_constructor(adt, name, tuple)
    }

    fn register_constructor(&self, adt: &Type, name: &str, fields: Type) -> Result<Type> {
        check_identifier(name)?;
        let adt = adt.resolve();
        if !adt.is_adt() {
            return Err(Error::new(ErrorKind::NotAnAdt(adt.clone())));
        }

        let mut decls = self.0.declarations.write();
        let declared = decls.constructors.entry(adt.clone()).or_default();

        let constructor = self.intern(TypeKind::Constructor {
            adt: adt.clone(),
            name: name.into(),
            fields,
        });

        if let Some(existing) = declared.iter().find(|c| c.name() == Some(name)) {
            return if *existing == constructor {
                Ok(constructor)
            } else {
                Err(Error::redeclaration(name, existing.clone()))
            };
        }

        declared.push(constructor.clone());
        tracing::debug!(adt = %adt, constructor = %constructor, "declared constructor");
        Ok(constructor)
    }

    /// Declares an anonymous labeled alternative of `adt` and returns `adt`.
    ///
    /// Every subtype of `ty` becomes a subtype of `adt`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::NestedAdt`] if `ty` is itself a data type or a
    /// constructor, [`ErrorKind::NotAnAdt`] if `adt` is not a data type, or a
    /// redeclaration error if `label` is already used with another type.
    pub fn declare_alternative(&self, adt: &Type, ty: &Type, label: &str) -> Result<Type> {
        check_identifier(label)?;
        let adt = adt.resolve();
        if !adt.is_adt() {
            return Err(Error::new(ErrorKind::NotAnAdt(adt.clone())));
        }
        if ty.is_adt() || ty.is_constructor() {
            return Err(Error::new(ErrorKind::NestedAdt {
                adt: adt.clone(),
                nested: ty.clone(),
            }));
        }

        let mut decls = self.0.declarations.write();
        let declared = decls.alternatives.entry(adt.clone()).or_default();

        if let Some(existing) = declared.iter().find(|alt| alt.label.as_ref() == label) {
            return if existing.ty == *ty {
                Ok(adt.clone())
            } else {
                Err(Error::redeclaration(label, existing.ty.clone()))
            };
        }

        declared.push(Alternative {
            label: label.into(),
            ty: ty.clone(),
        });
        adt.push_alternative(ty.clone());
        tracing::debug!(adt = %adt, %label, ty = %ty, "declared alternative");
        Ok(adt.clone())
    }

    /// Declares annotation `label` with value type `ty` on `on`.
    ///
    /// Annotations are only declarable on data types, constructors and the
    /// generic node type. An identical redeclaration is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::AnnotationNotAllowed`] for other base types,
    /// [`ErrorKind::InvalidName`] if `label` is not an identifier, or a
    /// redeclaration error if `label` is already declared with another type.
    pub fn declare_annotation(&self, on: &Type, label: &str, ty: &Type) -> Result<()> {
        check_identifier(label)?;
        let on = on.resolve();
        if !(on.is_adt() || on.is_constructor() || on.is_node()) {
            return Err(Error::new(ErrorKind::AnnotationNotAllowed { on: on.clone() }));
        }

        let mut decls = self.0.declarations.write();
        let labels = decls.annotations.entry(on.clone()).or_default();

        if let Some(existing) = labels.get(label) {
            return if existing == ty {
                Ok(())
            } else {
                Err(Error::redeclaration(label, existing.clone()))
            };
        }

        labels.insert(label.into(), ty.clone());
        tracing::debug!(on = %on, %label, ty = %ty, "declared annotation");
        Ok(())
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Looks up a declared data type by name.
    #[must_use]
    pub fn lookup_adt(&self, name: &str) -> Option<Type> {
        self.0
            .declarations
            .read()
            .named
            .get(name)
            .filter(|ty| ty.is_adt() && !ty.is_alias())
            .cloned()
    }

    /// Looks up a declared alias by name.
    #[must_use]
    pub fn lookup_alias(&self, name: &str) -> Option<Type> {
        self.0
            .declarations
            .read()
            .named
            .get(name)
            .filter(|ty| ty.is_alias())
            .cloned()
    }

    /// Looks up a constructor of `adt` by name.
    #[must_use]
    pub fn lookup_constructor(&self, adt: &Type, name: &str) -> Option<Type> {
        self.0
            .declarations
            .read()
            .constructors
            .get(adt.resolve())?
            .iter()
            .find(|c| c.name() == Some(name))
            .cloned()
    }

    /// Returns the constructors of `adt` in declaration order.
    #[must_use]
    pub fn constructors(&self, adt: &Type) -> Vec<Type> {
        self.0
            .declarations
            .read()
            .constructors
            .get(adt.resolve())
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the anonymous alternatives of `adt` in declaration order.
    #[must_use]
    pub fn alternatives(&self, adt: &Type) -> Vec<Alternative> {
        self.0
            .declarations
            .read()
            .alternatives
            .get(adt.resolve())
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the declared type of annotation `label` for values of type `on`.
    ///
    /// A constructor sees its own declarations first, then those of its
    /// data type, then those of the generic node type.
    #[must_use]
    pub fn annotation_type(&self, on: &Type, label: &str) -> Option<Type> {
        let decls = self.0.declarations.read();
        Self::annotation_scopes(on)
            .into_iter()
            .find_map(|scope| decls.annotations.get(&scope)?.get(label).cloned())
    }

    /// Returns every annotation label visible on `on`, with its type.
    #[must_use]
    pub fn annotations(&self, on: &Type) -> Vec<(Arc<str>, Type)> {
        let decls = self.0.declarations.read();
        let mut visible: Vec<(Arc<str>, Type)> = Vec::new();
        for scope in Self::annotation_scopes(on) {
            let Some(labels) = decls.annotations.get(&scope) else {
                continue;
            };
            for (label, ty) in labels {
                if !visible.iter().any(|(seen, _)| seen == label) {
                    visible.push((label.clone(), ty.clone()));
                }
            }
        }
        visible.sort_by(|a, b| a.0.cmp(&b.0));
        visible
    }

    /// Returns true if `label` is declared for values of type `on`.
    #[must_use]
    pub fn declares_annotation(&self, on: &Type, label: &str) -> bool {
        self.annotation_type(on, label).is_some()
    }

    fn annotation_scopes(on: &Type) -> Vec<Type> {
        let on = on.resolve();
        let mut scopes = vec![on.clone()];
        if let Some(adt) = on.adt() {
            scopes.push(adt.clone());
        }
        if on.is_adt() || on.is_constructor() {
            scopes.push(Type::node());
        }
        scopes
    }
}

impl Default for TypeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeStore")
            .field("interned", &self.interned_count())
            .finish_non_exhaustive()
    }
}
