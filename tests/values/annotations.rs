//! Integration tests for node annotations

use strata_types::{ErrorKind, Type, TypeStore};
use strata_values::{Node, ValueFactory};

fn fixture() -> (ValueFactory, Node) {
    let store = TypeStore::new();
    let tree = store.declare_adt("Tree").unwrap();
    let leaf = store.declare_constructor(&tree, "leaf", &[Type::integer()]).unwrap();
    store.declare_annotation(&tree, "size", &Type::integer()).unwrap();

    let vf = ValueFactory::new(store);
    let node = vf.constructor(&leaf, vec![vf.integer(7)]).unwrap();
    (vf, node)
}

#[test]
fn annotation_round_trip() {
    let (vf, node) = fixture();
    let annotated = node.set_annotation(vf.store(), "size", vf.integer(1)).unwrap();

    assert_eq!(annotated.get_annotation(vf.store(), "size").unwrap(), Some(vf.integer(1)));
    assert_ne!(annotated, node);
    assert_eq!(node.get_annotation(vf.store(), "size").unwrap(), None);
}

#[test]
fn declared_versus_present() {
    let (vf, node) = fixture();

    assert!(node.declares_annotation(vf.store(), "size"));
    assert!(!node.has_annotation(vf.store(), "size").unwrap());

    let annotated = node.set_annotation(vf.store(), "size", vf.integer(1)).unwrap();
    assert!(annotated.has_annotation(vf.store(), "size").unwrap());
}

#[test]
fn undeclared_label_fails_everywhere() {
    let (vf, node) = fixture();

    assert!(!node.declares_annotation(vf.store(), "color"));
    for err in [
        node.has_annotation(vf.store(), "color").unwrap_err(),
        node.get_annotation(vf.store(), "color").unwrap_err(),
        node.set_annotation(vf.store(), "color", vf.string("red")).unwrap_err(),
    ] {
        assert!(matches!(err.kind, ErrorKind::UndeclaredAnnotation { .. }));
        assert!(err.is_use());
    }
}

#[test]
fn annotation_value_is_type_checked() {
    let (vf, node) = fixture();
    let err = node.set_annotation(vf.store(), "size", vf.string("big")).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
}

#[test]
fn overwrite_and_remove() {
    let (vf, node) = fixture();
    let one = node.set_annotation(vf.store(), "size", vf.integer(1)).unwrap();
    let two = one.set_annotation(vf.store(), "size", vf.integer(2)).unwrap();

    assert_eq!(two.get_annotation(vf.store(), "size").unwrap(), Some(vf.integer(2)));
    assert_eq!(two.annotations().len(), 1);
    assert_eq!(two.remove_annotation(vf.store(), "size").unwrap(), node);
}

#[test]
fn annotations_survive_child_updates() {
    let (vf, node) = fixture();
    let annotated = node.set_annotation(vf.store(), "size", vf.integer(1)).unwrap();
    let updated = annotated.set(0, vf.integer(8)).unwrap();

    assert_eq!(updated.get_annotation(vf.store(), "size").unwrap(), Some(vf.integer(1)));
}
