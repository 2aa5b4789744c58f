//! Integration tests for subtyping and least upper bounds

use proptest::prelude::*;
use strata_types::{Type, TypeStore};

// =============================================================================
// Canonical identity
// =============================================================================

#[test]
fn structurally_equal_types_are_identical() {
    let store = TypeStore::new();
    let a = store.map(&Type::string(), &store.list(&Type::integer()));
    let b = store.map(&Type::string(), &store.list(&Type::integer()));

    assert!(a.ptr_eq(&b));
    assert_eq!(a.to_string(), b.to_string());
}

#[test]
fn descriptors_distinguish_types() {
    let store = TypeStore::new();
    let types = [
        store.list(&Type::integer()),
        store.set(&Type::integer()),
        store.relation(&[Type::integer()]),
        store.tuple(&[Type::integer()]),
        store.map(&Type::integer(), &Type::integer()),
    ];

    for (i, a) in types.iter().enumerate() {
        for b in &types[i + 1..] {
            assert_ne!(a, b);
            assert_ne!(a.to_string(), b.to_string());
        }
    }
}

#[test]
fn declared_names_cannot_mimic_descriptors() {
    let store = TypeStore::new();
    let real = store.list(&Type::integer());

    assert!(store.declare_adt("list[int]").unwrap_err().is_declaration());
    assert!(store.declare_alias("set", &real).unwrap_err().is_declaration());
    assert!(
        store
            .declare_alias("rel[int, int]", &store.relation(&[Type::integer(), Type::integer()]))
            .is_err()
    );
}

#[test]
fn relation_is_a_set_of_tuples() {
    let store = TypeStore::new();
    let pair = store.tuple(&[Type::integer(), Type::integer()]);

    assert_eq!(store.relation(&[Type::integer(), Type::integer()]), store.set(&pair));
    assert_eq!(store.relation_of(&pair).unwrap(), store.set(&pair));
    assert!(store.relation_of(&Type::integer()).is_err());
}

// =============================================================================
// Subtyping
// =============================================================================

#[test]
fn numeric_tower() {
    for ty in [Type::integer(), Type::real(), Type::rational()] {
        assert!(ty.is_subtype_of(&Type::number()));
        assert!(!Type::number().is_subtype_of(&ty));
    }
    assert!(!Type::integer().is_subtype_of(&Type::real()));
}

#[test]
fn void_and_value_bound_the_lattice() {
    let store = TypeStore::new();
    for ty in [Type::bool(), store.list(&Type::string()), Type::node()] {
        assert!(Type::void().is_subtype_of(&ty));
        assert!(ty.is_subtype_of(&Type::value()));
    }
}

#[test]
fn containers_are_covariant() {
    let store = TypeStore::new();
    let ints = store.relation(&[Type::integer(), Type::integer()]);
    let nums = store.relation(&[Type::number(), Type::number()]);

    assert!(ints.is_subtype_of(&nums));
    assert!(!nums.is_subtype_of(&ints));
    assert!(!store.list(&Type::integer()).is_subtype_of(&store.set(&Type::integer())));
}

#[test]
fn constructors_sit_below_their_adt_and_node() {
    let store = TypeStore::new();
    let boolean = store.declare_adt("Boolean").unwrap();
    let other = store.declare_adt("Other").unwrap();
    let t = store.declare_constructor(&boolean, "true", &[]).unwrap();

    assert!(t.is_subtype_of(&boolean));
    assert!(t.is_subtype_of(&Type::node()));
    assert!(!t.is_subtype_of(&other));
}

#[test]
fn adts_are_not_nodes() {
    let store = TypeStore::new();
    let e = store.declare_adt("E").unwrap();

    assert!(!e.is_subtype_of(&Type::node()));
    assert!(!Type::node().is_subtype_of(&e));
    assert!(e.is_subtype_of(&Type::value()));
}

#[test]
fn declared_alternatives_are_subtypes() {
    let store = TypeStore::new();
    let e = store.declare_adt("E").unwrap();
    let leaf = store.declare_constructor(&e, "leaf", &[]).unwrap();

    assert!(!Type::integer().is_subtype_of(&e));
    assert_eq!(store.lub(&Type::integer(), &e), Type::value());

    store.declare_alternative(&e, &Type::integer(), "i").unwrap();

    assert!(Type::integer().is_subtype_of(&e));
    assert!(!e.is_subtype_of(&Type::integer()));
    assert!(!Type::string().is_subtype_of(&e));
    assert_eq!(store.lub(&Type::integer(), &e), e);
    assert_eq!(store.lub(&e, &Type::integer()), e);
    assert_eq!(store.lub(&leaf, &Type::integer()), Type::value());
    assert!(store.list(&Type::integer()).is_subtype_of(&store.list(&e)));
}

// =============================================================================
// Least upper bound
// =============================================================================

#[test]
fn lub_examples() {
    let store = TypeStore::new();

    assert_eq!(store.lub(&Type::integer(), &Type::real()), Type::number());
    assert_eq!(store.lub(&Type::integer(), &Type::string()), Type::value());
    assert_eq!(store.lub(&Type::void(), &Type::string()), Type::string());
    assert_eq!(
        store.lub(&store.list(&Type::integer()), &store.list(&Type::real())),
        store.list(&Type::number())
    );
    assert_eq!(
        store.lub(&store.tuple(&[Type::integer()]), &store.tuple(&[Type::integer(), Type::integer()])),
        Type::value()
    );
}

#[test]
fn lub_of_constructors() {
    let store = TypeStore::new();
    let a = store.declare_adt("A").unwrap();
    let b = store.declare_adt("B").unwrap();
    let a1 = store.declare_constructor(&a, "a1", &[]).unwrap();
    let a2 = store.declare_constructor(&a, "a2", &[Type::integer()]).unwrap();
    let b1 = store.declare_constructor(&b, "b1", &[]).unwrap();

    assert_eq!(store.lub(&a1, &a2), a);
    assert_eq!(store.lub(&a1, &b1), Type::node());
    assert_eq!(store.lub(&a1, &Type::node()), Type::node());
    assert_eq!(store.lub(&a, &Type::node()), Type::value());
    assert_eq!(store.lub(&a, &b), Type::value());
    assert_eq!(store.lub(&a1, &b), Type::value());
}

#[test]
fn lub_keeps_agreeing_labels() {
    let store = TypeStore::new();
    let xy = store.labeled_tuple(&[Type::integer(), Type::integer()], &["x", "y"]).unwrap();
    let xy_real = store.labeled_tuple(&[Type::real(), Type::real()], &["x", "y"]).unwrap();
    let ab = store.labeled_tuple(&[Type::integer(), Type::integer()], &["a", "b"]).unwrap();

    assert_eq!(store.lub(&xy, &xy_real).field_labels().map(<[_]>::len), Some(2));
    assert_eq!(store.lub(&xy, &ab).field_labels(), None);
    assert!(xy.equivalent(&ab));
}

fn atom() -> impl Strategy<Value = Type> {
    prop_oneof![
        Just(Type::void()),
        Just(Type::value()),
        Just(Type::integer()),
        Just(Type::real()),
        Just(Type::rational()),
        Just(Type::number()),
        Just(Type::bool()),
        Just(Type::string()),
        Just(Type::node()),
    ]
}

#[derive(Clone, Debug)]
enum Shape {
    Atom(Type),
    List(Box<Shape>),
    Set(Box<Shape>),
    Pair(Box<Shape>, Box<Shape>),
}

fn shape() -> impl Strategy<Value = Shape> {
    atom().prop_map(Shape::Atom).prop_recursive(3, 16, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|s| Shape::List(Box::new(s))),
            inner.clone().prop_map(|s| Shape::Set(Box::new(s))),
            (inner.clone(), inner).prop_map(|(a, b)| Shape::Pair(Box::new(a), Box::new(b))),
        ]
    })
}

fn build(store: &TypeStore, shape: &Shape) -> Type {
    match shape {
        Shape::Atom(ty) => ty.clone(),
        Shape::List(s) => store.list(&build(store, s)),
        Shape::Set(s) => store.set(&build(store, s)),
        Shape::Pair(a, b) => store.tuple(&[build(store, a), build(store, b)]),
    }
}

proptest! {
    #[test]
    fn subtyping_is_reflexive(s in shape()) {
        let store = TypeStore::new();
        let ty = build(&store, &s);
        prop_assert!(ty.is_subtype_of(&ty));
        prop_assert_eq!(store.lub(&ty, &ty), ty);
    }

    #[test]
    fn lub_is_commutative_upper_bound(a in shape(), b in shape()) {
        let store = TypeStore::new();
        let (a, b) = (build(&store, &a), build(&store, &b));
        let lub = store.lub(&a, &b);

        prop_assert_eq!(&lub, &store.lub(&b, &a));
        prop_assert!(a.is_subtype_of(&lub));
        prop_assert!(b.is_subtype_of(&lub));
    }

    #[test]
    fn subtyping_is_transitive(a in shape(), b in shape(), c in shape()) {
        let store = TypeStore::new();
        let (a, b, c) = (build(&store, &a), build(&store, &b), build(&store, &c));
        if a.is_subtype_of(&b) && b.is_subtype_of(&c) {
            prop_assert!(a.is_subtype_of(&c));
        }
    }

    #[test]
    fn construction_is_canonical(s in shape()) {
        let store = TypeStore::new();
        prop_assert!(build(&store, &s).ptr_eq(&build(&store, &s)));
    }
}
