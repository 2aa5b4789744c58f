//! Integration tests for the type store
//!
//! Tests declarations, redeclaration rules, lookups, and concurrent interning.

use std::thread;

use strata_types::{ErrorKind, StoreConfig, Type, TypeStore};

// =============================================================================
// Declarations
// =============================================================================

#[test]
fn boolean_adt_declaration() {
    let store = TypeStore::new();
    let boolean = store.declare_adt("Boolean").unwrap();
    let t = store.declare_constructor(&boolean, "true", &[]).unwrap();
    let f = store.declare_constructor(&boolean, "false", &[]).unwrap();
    let and = store
        .declare_constructor(&boolean, "and", &[boolean.clone(), boolean.clone()])
        .unwrap();

    assert_eq!(store.lookup_adt("Boolean"), Some(boolean.clone()));
    assert_eq!(store.lookup_constructor(&boolean, "and"), Some(and.clone()));
    assert_eq!(store.constructors(&boolean), vec![t, f, and.clone()]);
    assert_eq!(and.arity(), Some(2));
    assert_eq!(and.adt(), Some(&boolean));
}

#[test]
fn identical_redeclaration_is_idempotent() {
    let store = TypeStore::new();
    let a = store.declare_adt("A").unwrap();

    assert_eq!(store.declare_adt("A").unwrap(), a);
    let c1 = store.declare_constructor(&a, "c", &[Type::integer()]).unwrap();
    let c2 = store.declare_constructor(&a, "c", &[Type::integer()]).unwrap();
    assert!(c1.ptr_eq(&c2));

    let alias = store.declare_alias("Ints", &store.list(&Type::integer())).unwrap();
    assert_eq!(store.declare_alias("Ints", &store.list(&Type::integer())).unwrap(), alias);

    store.declare_annotation(&a, "pos", &Type::integer()).unwrap();
    store.declare_annotation(&a, "pos", &Type::integer()).unwrap();
}

#[test]
fn conflicting_redeclaration_fails() {
    let store = TypeStore::new();
    let a = store.declare_adt("A").unwrap();
    store.declare_constructor(&a, "c", &[Type::integer()]).unwrap();

    let err = store.declare_constructor(&a, "c", &[Type::string()]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Redeclaration { .. }));
    assert!(err.is_declaration());

    let err = store
        .declare_labeled_constructor(&a, "c", &[Type::integer()], &["n"])
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Redeclaration { .. }));

    store.declare_alias("X", &Type::integer()).unwrap();
    let err = store.declare_alias("X", &Type::real()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Redeclaration { .. }));

    store.declare_annotation(&a, "pos", &Type::integer()).unwrap();
    let err = store.declare_annotation(&a, "pos", &Type::string()).unwrap_err();
    assert!(err.is_declaration());
}

#[test]
fn names_cannot_be_shared_across_kinds() {
    let store = TypeStore::new();
    store.declare_adt("Shape").unwrap();

    let err = store.declare_alias("Shape", &Type::integer()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NameClash { .. }));

    store.declare_alias("Size", &Type::integer()).unwrap();
    assert!(matches!(
        store.declare_adt("Size").unwrap_err().kind,
        ErrorKind::NameClash { .. }
    ));
    assert!(store.declare_adt("int").is_err());
}

#[test]
fn adt_cannot_be_nested_as_alternative() {
    let store = TypeStore::new();
    let outer = store.declare_adt("Outer").unwrap();
    let inner = store.declare_adt("Inner").unwrap();

    let err = store.declare_alternative(&outer, &inner, "nested").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NestedAdt { .. }));

    store.declare_alternative(&outer, &Type::integer(), "number").unwrap();
    let alternatives = store.alternatives(&outer);
    assert_eq!(alternatives.len(), 1);
}

#[test]
fn annotations_only_on_tree_types() {
    let store = TypeStore::new();
    let err = store
        .declare_annotation(&Type::integer(), "size", &Type::integer())
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::AnnotationNotAllowed { .. }));

    store.declare_annotation(&Type::node(), "origin", &Type::string()).unwrap();
    let a = store.declare_adt("A").unwrap();
    let c = store.declare_constructor(&a, "c", &[]).unwrap();
    store.declare_annotation(&a, "size", &Type::integer()).unwrap();

    assert_eq!(store.annotation_type(&c, "size"), Some(Type::integer()));
    assert_eq!(store.annotation_type(&c, "origin"), Some(Type::string()));
    assert!(store.declares_annotation(&a, "size"));
    assert!(!store.declares_annotation(&Type::node(), "size"));
    assert_eq!(store.annotations(&c).len(), 2);
}

#[test]
fn constructor_requires_adt() {
    let store = TypeStore::new();
    let err = store.declare_constructor(&Type::integer(), "c", &[]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NotAnAdt(_)));
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn concurrent_interning_yields_one_canonical_type() {
    let store = TypeStore::with_config(StoreConfig::default().with_shard_count(4));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            thread::spawn(move || {
                let ints = store.list(&Type::integer());
                store.map(&Type::string(), &store.set(&ints))
            })
        })
        .collect();

    let types: Vec<Type> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(types.windows(2).all(|w| w[0].ptr_eq(&w[1])));
}

#[test]
fn concurrent_declarations_are_serialized() {
    let store = TypeStore::new();
    let adt = store.declare_adt("Shared").unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let (store, adt) = (store.clone(), adt.clone());
            thread::spawn(move || store.declare_constructor(&adt, "c", &[Type::integer()]).unwrap())
        })
        .collect();

    let constructors: Vec<Type> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(constructors.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(store.constructors(&adt).len(), 1);
}
