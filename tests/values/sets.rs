//! Integration tests for persistent sets

use strata_types::{ErrorKind, Type};
use strata_values::{Set, Value, ValueFactory};

fn ints(vf: &ValueFactory, values: &[i64]) -> Set {
    vf.set_with(values.iter().copied().map(Value::Integer).collect())
}

#[test]
fn union_of_unrelated_sets_degrades_to_value() {
    let vf = ValueFactory::default();
    let numbers = ints(&vf, &[1, 2]);
    let words = vf.set_with(vec![vf.string("a")]);

    let union = numbers.union(&words);
    assert_eq!(union.len(), 3);
    assert_eq!(union.element_type(), Type::value());
    assert!(numbers.intersect(&words).is_empty());
}

#[test]
fn algebra_never_touches_operands() {
    let vf = ValueFactory::default();
    let a = ints(&vf, &[1, 2, 3]);
    let b = ints(&vf, &[2, 3, 4]);

    assert_eq!(a.union(&b), ints(&vf, &[1, 2, 3, 4]));
    assert_eq!(a.intersect(&b), ints(&vf, &[2, 3]));
    assert_eq!(a.subtract(&b), ints(&vf, &[1]));
    assert_eq!(a, ints(&vf, &[1, 2, 3]));
}

#[test]
fn insert_and_remove() {
    let vf = ValueFactory::default();
    let a = ints(&vf, &[1]);

    let b = a.insert(vf.integer(2)).unwrap();
    assert!(b.contains(&vf.integer(2)).unwrap());
    assert!(!a.contains(&vf.integer(2)).unwrap());
    assert_eq!(b.remove(&vf.integer(2)), a);
}

#[test]
fn contains_rejects_incomparable_value() {
    let vf = ValueFactory::default();
    let err = ints(&vf, &[1]).contains(&vf.string("1")).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::IncomparableTypes { .. }));
}

#[test]
fn iteration_is_stable() {
    let vf = ValueFactory::default();
    let set = ints(&vf, &(0..100).collect::<Vec<_>>());

    let first: Vec<Value> = set.iter().collect();
    let second: Vec<Value> = set.iter().collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 100);
}

#[test]
fn product_of_plain_sets_is_binary_relation() {
    let vf = ValueFactory::default();
    let product = ints(&vf, &[1, 2]).product(&vf.set_with(vec![vf.string("a"), vf.string("b")]));

    assert_eq!(product.len(), 4);
    assert_eq!(product.field_types(), vec![Type::integer(), Type::string()]);
}

#[test]
fn to_relation_only_for_tuples() {
    let vf = ValueFactory::default();
    assert!(matches!(
        ints(&vf, &[1]).to_relation().unwrap_err().kind,
        ErrorKind::NotARelation(_)
    ));

    let tuples = vf.set_with(vec![vf.tuple(vec![vf.integer(1)]).into()]);
    assert_eq!(tuples.to_relation().unwrap().arity(), 1);
}

#[test]
fn invert_requires_universe_membership() {
    let vf = ValueFactory::default();
    let universe = ints(&vf, &[1, 2, 3]);

    assert_eq!(ints(&vf, &[1]).invert(&universe).unwrap(), ints(&vf, &[2, 3]));
    let err = ints(&vf, &[7]).invert(&universe).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NotASubset { .. }));
}
