//! End-to-end fact pipelines across the type and value layers
//!
//! Builds relations with typed writers, derives new facts with relational
//! algebra, and attaches results to annotated tree values.

use pretty_assertions::assert_eq;
use strata_types::{Type, TypeStore};
use strata_values::{Relation, Value, ValueFactory};

fn parent_of(vf: &ValueFactory, facts: &[(&str, &str)]) -> Relation {
    let pair = vf
        .store()
        .labeled_tuple(&[Type::string(), Type::string()], &["parent", "child"])
        .unwrap();
    let writer = vf.relation_writer(&pair).unwrap();
    for (parent, child) in facts {
        let tuple = vf.tuple_of(&pair, vec![vf.string(parent), vf.string(child)]).unwrap();
        writer.insert(tuple.into()).unwrap();
    }
    writer.done().unwrap().to_relation().unwrap()
}

fn sorted_pairs(relation: &Relation) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = relation
        .iter()
        .map(|v| {
            let t = v.as_tuple().unwrap();
            (
                t.get(0).unwrap().as_str().unwrap().to_string(),
                t.get(1).unwrap().as_str().unwrap().to_string(),
            )
        })
        .collect();
    pairs.sort();
    pairs
}

fn owned(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs.iter().map(|(a, b)| ((*a).to_string(), (*b).to_string())).collect()
}

#[test]
fn ancestors_via_closure() {
    let vf = ValueFactory::default();
    let parents = parent_of(&vf, &[("ann", "bob"), ("bob", "cid"), ("cid", "dee")]);

    let ancestors = parents.closure().unwrap();
    assert_eq!(
        sorted_pairs(&ancestors),
        owned(&[
            ("ann", "bob"),
            ("ann", "cid"),
            ("ann", "dee"),
            ("bob", "cid"),
            ("bob", "dee"),
            ("cid", "dee"),
        ])
    );
    assert_eq!(ancestors.field_types(), vec![Type::string(), Type::string()]);
}

#[test]
fn grandparents_via_compose() {
    let vf = ValueFactory::default();
    let parents = parent_of(&vf, &[("ann", "bob"), ("bob", "cid"), ("bob", "cal")]);

    let grandparents = parents.compose(&parents).unwrap();
    assert_eq!(sorted_pairs(&grandparents), owned(&[("ann", "cal"), ("ann", "cid")]));
}

#[test]
fn people_without_children() {
    let vf = ValueFactory::default();
    let parents = parent_of(&vf, &[("ann", "bob"), ("bob", "cid")]);

    let everyone = parents.carrier();
    let childless = parents.domain().invert(&everyone).unwrap();
    assert_eq!(childless, vf.set_with(vec![vf.string("cid")]));
}

#[test]
fn labeled_facts_keep_their_type() {
    let vf = ValueFactory::default();
    let parents = parent_of(&vf, &[("ann", "bob")]);

    let fact = parents.iter().next().unwrap();
    let tuple = fact.as_tuple().unwrap();
    assert_eq!(tuple.get_labeled("child").unwrap(), &vf.string("bob"));
    assert_eq!(
        parents.ty().to_string(),
        "rel[str parent, str child]"
    );
}

#[test]
fn derived_facts_as_annotations() {
    let store = TypeStore::new();
    let family = store.declare_adt("Family").unwrap();
    let name = store.declare_constructor(&family, "family", &[Type::string()]).unwrap();
    let members = store.set(&Type::string());
    store.declare_annotation(&family, "members", &members).unwrap();
    let vf = ValueFactory::new(store);

    let parents = parent_of(&vf, &[("ann", "bob"), ("bob", "cid")]);
    let node = vf.constructor(&name, vec![vf.string("smith")]).unwrap();
    let annotated = node
        .set_annotation(vf.store(), "members", parents.carrier().into())
        .unwrap();

    let stored = annotated.get_annotation(vf.store(), "members").unwrap().unwrap();
    assert_eq!(stored.as_set().map(strata_values::Set::len), Some(3));
    assert_eq!(node.get_annotation(vf.store(), "members").unwrap(), None);
    assert!(Value::from(annotated) != Value::from(node));
}

#[test]
fn shared_store_across_threads() {
    let vf = ValueFactory::default();
    let pair = vf.store().tuple(&[Type::integer(), Type::integer()]);

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let (vf, pair) = (vf.clone(), pair.clone());
            std::thread::spawn(move || {
                let writer = vf.relation_writer(&pair).unwrap();
                for i in 0..10 {
                    writer
                        .insert(vf.tuple(vec![vf.integer(t), vf.integer(i)]).into())
                        .unwrap();
                }
                writer.done().unwrap()
            })
        })
        .collect();

    let parts: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let all = parts.iter().skip(1).fold(parts[0].clone(), |acc, s| acc.union(s));
    assert_eq!(all.len(), 40);
    assert!(all.ty().ptr_eq(&vf.store().relation(&[Type::integer(), Type::integer()])));
}
