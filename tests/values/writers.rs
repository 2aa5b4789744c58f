//! Integration tests for the writer lifecycle

use strata_types::{ErrorKind, Type};
use strata_values::{Value, ValueFactory};

#[test]
fn same_open_value_yields_same_writer() {
    let vf = ValueFactory::default();
    let list = vf.list(&Type::void());

    assert_eq!(list.writer().unwrap(), list.writer().unwrap());
}

#[test]
fn done_freezes_value_and_writer() {
    let vf = ValueFactory::default();
    let set = vf.set(&Type::integer());
    let writer = set.writer().unwrap();

    writer.insert_all((0..5).map(Value::Integer)).unwrap();
    let frozen = writer.done().unwrap();

    assert_eq!(frozen.len(), 5);
    assert!(!set.is_open());
    assert!(set.writer().unwrap_err().is_illegal_state());

    let err = writer.insert(vf.integer(9)).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::WriterClosed));
    assert!(!err.is_use());
    assert_eq!(frozen.len(), 5);
}

#[test]
fn done_twice_is_illegal() {
    let vf = ValueFactory::default();
    let writer = vf.map_writer(&Type::string(), &Type::integer());
    writer.put(vf.string("a"), vf.integer(1)).unwrap();

    assert!(writer.done().is_ok());
    assert!(writer.done().unwrap_err().is_illegal_state());
}

#[test]
fn type_errors_differ_from_lifecycle_errors() {
    let vf = ValueFactory::default();
    let writer = vf.set_writer(&Type::integer());

    let wrong_type = writer.insert(vf.string("x")).unwrap_err();
    assert!(wrong_type.is_use());
    assert!(!wrong_type.is_illegal_state());

    writer.done().unwrap();
    let wrong_phase = writer.insert(vf.integer(1)).unwrap_err();
    assert!(wrong_phase.is_illegal_state());
    assert!(!wrong_phase.is_use());
}

#[test]
fn list_writer_builds_in_order() {
    let vf = ValueFactory::default();
    let writer = vf.list_writer(&Type::void());

    writer.append(vf.integer(2)).unwrap();
    writer.insert(vf.integer(1)).unwrap();
    writer.append_all([vf.integer(3), vf.integer(4)]).unwrap();
    assert_eq!(writer.len(), 4);

    let list = writer.done().unwrap();
    assert_eq!(
        list.to_vec(),
        vec![vf.integer(1), vf.integer(2), vf.integer(3), vf.integer(4)]
    );
    assert_eq!(list.element_type(), Type::integer());
}

#[test]
fn relation_writer_is_typed() {
    let vf = ValueFactory::default();
    let pair = vf.store().tuple(&[Type::integer(), Type::string()]);
    let writer = vf.relation_writer(&pair).unwrap();

    writer.insert(vf.tuple(vec![vf.integer(1), vf.string("a")]).into()).unwrap();
    assert!(writer.insert(vf.tuple(vec![vf.string("a"), vf.integer(1)]).into()).is_err());

    let relation = writer.done().unwrap().to_relation().unwrap();
    assert_eq!(relation.len(), 1);
    assert_eq!(relation.arity(), 2);
}

#[test]
fn independent_writers_on_separate_threads() {
    let vf = ValueFactory::default();

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let vf = vf.clone();
            std::thread::spawn(move || {
                let writer = vf.set_writer(&Type::integer());
                for i in 0..100 {
                    writer.insert(vf.integer(t * 100 + i)).unwrap();
                }
                writer.done().unwrap()
            })
        })
        .collect();

    let sets: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let union = sets.iter().fold(vf.set_with(vec![]), |acc, s| acc.union(s));
    assert_eq!(union.len(), 400);
}

#[test]
fn containers_keep_what_an_open_collection_held_when_stored() {
    let vf = ValueFactory::default();
    let list = vf.list(&Type::integer());
    let list_writer = list.writer().unwrap();
    list_writer.append(vf.integer(1)).unwrap();

    let tuple = vf.tuple(vec![Value::List(list.clone()), vf.string("x")]);
    let map = vf.map(&vf.store().list(&Type::integer()), &Type::string());
    let map_writer = map.writer().unwrap();
    map_writer.put(Value::List(list.clone()), vf.string("one")).unwrap();

    list_writer.append(vf.integer(2)).unwrap();
    list_writer.done().unwrap();

    let held = tuple.get(0).unwrap().as_list().unwrap();
    assert_eq!(held.len(), 1);
    assert!(!held.is_open());
    assert_eq!(map.get(&Value::List(vf.list_with(vec![vf.integer(1)]))), Some(vf.string("one")));
    assert_eq!(map.get(&Value::List(list)), None);
}
