//! Integration tests for persistent lists

use strata_types::{ErrorKind, Type};
use strata_values::{ElementTyping, Value, ValueFactory};

fn ints(vf: &ValueFactory, values: &[i64]) -> strata_values::List {
    vf.list_with(values.iter().copied().map(Value::Integer).collect())
}

#[test]
fn append_and_insert_leave_original_unchanged() {
    let vf = ValueFactory::default();
    let list = ints(&vf, &[1, 2, 3]);

    let appended = list.append(vf.integer(4)).unwrap();
    let inserted = list.insert(vf.integer(0)).unwrap();

    assert_eq!(list.len(), 3);
    assert_eq!(appended.len(), 4);
    assert_eq!(appended.get(3).unwrap(), vf.integer(4));
    assert_eq!(inserted.get(0).unwrap(), vf.integer(0));
    assert_eq!(list.to_vec(), ints(&vf, &[1, 2, 3]).to_vec());
}

#[test]
fn get_outside_bounds_fails() {
    let vf = ValueFactory::default();
    let list = ints(&vf, &[1]);

    let err = list.get(5).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::IndexOutOfBounds { index: 5, length: 1 }));
    assert!(err.is_use());
}

#[test]
fn inferred_list_widens() {
    let vf = ValueFactory::default();
    let list = ints(&vf, &[1]);
    assert_eq!(list.typing(), ElementTyping::Widening);

    let widened = list.append(vf.string("x")).unwrap();
    assert_eq!(widened.element_type(), Type::value());
    assert_eq!(list.element_type(), Type::integer());
}

#[test]
fn named_list_rejects_foreign_elements() {
    let vf = ValueFactory::default();
    let named = vf
        .store()
        .declare_alias("Numbers", &vf.store().list(&Type::number()))
        .unwrap();

    let list = vf.make(&named).unwrap().as_list().unwrap().clone();
    let writer = list.writer().unwrap();
    writer.append(vf.integer(1)).unwrap();
    writer.append(vf.real(2.5)).unwrap();
    let list = writer.done().unwrap();

    assert_eq!(list.typing(), ElementTyping::Fixed);
    assert!(list.append(vf.string("x")).unwrap_err().is_use());
    assert_eq!(list.append(vf.integer(3)).unwrap().ty(), named);
}

#[test]
fn reverse_and_iteration_order() {
    let vf = ValueFactory::default();
    let list = ints(&vf, &[1, 2, 3]);

    let reversed: Vec<Value> = list.reverse().iter().collect();
    assert_eq!(reversed, vec![vf.integer(3), vf.integer(2), vf.integer(1)]);

    let first: Vec<Value> = list.iter().take(2).collect();
    let again: Vec<Value> = list.iter().take(2).collect();
    assert_eq!(first, again);
}

#[test]
fn concat_sublist_contains() {
    let vf = ValueFactory::default();
    let list = ints(&vf, &[1, 2]).concat(&ints(&vf, &[3, 4])).unwrap();

    assert_eq!(list.len(), 4);
    assert!(list.contains(&vf.integer(3)));
    assert!(!list.contains(&vf.integer(9)));
    assert_eq!(list.sublist(1, 2).unwrap(), ints(&vf, &[2, 3]));
}

#[test]
fn large_list_shares_structure() {
    let vf = ValueFactory::default();
    let mut list = vf.list_with(vec![]);
    for i in 0..1000 {
        list = list.append(vf.integer(i)).unwrap();
    }

    let copy = list.clone();
    let longer = copy.append(vf.integer(1000)).unwrap();
    assert_eq!(list.len(), 1000);
    assert_eq!(longer.len(), 1001);
    assert_eq!(list.element_type(), Type::integer());
}
