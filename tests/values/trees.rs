//! Integration tests for constructor and node values

use strata_types::{ErrorKind, Type, TypeStore};
use strata_values::{Node, Value, ValueFactory};

struct Exprs {
    vf: ValueFactory,
    num: Type,
    add: Type,
}

fn exprs() -> Exprs {
    let store = TypeStore::new();
    let expr = store.declare_adt("Expr").unwrap();
    let num = store.declare_constructor(&expr, "num", &[Type::integer()]).unwrap();
    let add = store
        .declare_labeled_constructor(&expr, "add", &[expr.clone(), expr.clone()], &["lhs", "rhs"])
        .unwrap();
    Exprs {
        vf: ValueFactory::new(store),
        num,
        add,
    }
}

fn num(e: &Exprs, n: i64) -> Value {
    e.vf.constructor(&e.num, vec![e.vf.integer(n)]).unwrap().into()
}

#[test]
fn constructor_type_checks_children() {
    let e = exprs();
    let sum = e.vf.constructor(&e.add, vec![num(&e, 1), num(&e, 2)]).unwrap();

    assert_eq!(sum.ty(), &e.add);
    assert_eq!(sum.get_labeled("rhs").unwrap(), &num(&e, 2));

    let err = e.vf.constructor(&e.add, vec![num(&e, 1), e.vf.integer(2)]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
    let err = e.vf.constructor(&e.add, vec![num(&e, 1)]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ArityMismatch { .. }));
}

#[test]
fn set_child_is_immutable() {
    let e = exprs();
    let sum = e.vf.constructor(&e.add, vec![num(&e, 1), num(&e, 2)]).unwrap();
    let changed = sum.set(1, num(&e, 5)).unwrap();

    assert_eq!(sum.get(1).unwrap(), &num(&e, 2));
    assert_eq!(changed.get(1).unwrap(), &num(&e, 5));
    assert_ne!(sum, changed);
    assert!(sum.set(1, e.vf.string("x")).unwrap_err().is_use());
}

#[test]
fn deep_structural_equality() {
    let e = exprs();
    let a = e.vf.constructor(&e.add, vec![num(&e, 1), num(&e, 2)]).unwrap();
    let b = e.vf.constructor(&e.add, vec![num(&e, 1), num(&e, 2)]).unwrap();
    let c = e.vf.constructor(&e.add, vec![num(&e, 2), num(&e, 1)]).unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn untyped_nodes() {
    let vf = ValueFactory::default();
    let node = vf.node("f", vec![vf.integer(1), vf.string("x")]);

    assert_eq!(node.ty(), &Type::node());
    assert_eq!(node.name(), "f");
    assert_eq!(node.arity(), 2);
    assert!(!node.is_constructor());
    assert_eq!(node.set(0, vf.string("anything")).unwrap().get(0).unwrap(), &vf.string("anything"));
    assert_eq!(format!("{node}"), "f(1,\"x\")");
}

#[test]
fn node_children_iterate_in_order() {
    let e = exprs();
    let sum: Node = e.vf.constructor(&e.add, vec![num(&e, 1), num(&e, 2)]).unwrap();
    let children: Vec<&Value> = sum.children().collect();
    assert_eq!(children, vec![&num(&e, 1), &num(&e, 2)]);
}
