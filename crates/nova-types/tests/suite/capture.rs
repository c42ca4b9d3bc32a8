use nova_types::{
    format_type, is_subtype, CaptureContext, Type, TypeEnv, TypeStore, WildcardBound,
};

use pretty_assertions::assert_eq;

#[test]
fn wildcards_become_fresh_capture_variables() {
    let env = TypeStore::with_minimal_jdk();
    let wk = *env.well_known();
    let map = env.class_id("java.util.Map").unwrap();
    let ty = Type::class(
        map,
        vec![
            Type::Wildcard(WildcardBound::Unbounded),
            Type::extends(Type::class(wk.number, vec![])),
        ],
    );

    let mut cx = CaptureContext::new(&env);
    let captured = cx.capture_wildcards(&ty);
    assert_eq!(format_type(&cx, &captured), "java.util.Map<CAP#1,CAP#2>");

    let Type::Class(ct) = &captured else {
        panic!("expected a class type, got {captured:?}");
    };
    let Type::TypeVar(second) = ct.args[1] else {
        panic!("expected a capture variable");
    };
    let bounds = cx.type_param(second).unwrap().upper_bounds.clone();
    assert_eq!(bounds, vec![Type::class(wk.number, vec![])]);
    assert!(is_subtype(&cx, &ct.args[1], &Type::class(wk.number, vec![])));
}

#[test]
fn super_wildcards_get_a_lower_bound() {
    let env = TypeStore::with_minimal_jdk();
    let wk = *env.well_known();
    let list = env.class_id("java.util.List").unwrap();
    let integer = Type::class(wk.integer, vec![]);
    let ty = Type::class(list, vec![Type::super_of(integer.clone())]);

    let mut cx = CaptureContext::new(&env);
    let captured = cx.capture_wildcards(&ty);
    let cap = captured.as_class().unwrap().args[0].clone();
    assert!(is_subtype(&cx, &integer, &cap));
}

#[test]
fn types_without_wildcards_are_unchanged() {
    let env = TypeStore::with_minimal_jdk();
    let list = env.class_id("java.util.List").unwrap();
    let ty = Type::class(list, vec![Type::class(env.well_known().string, vec![])]);
    let mut cx = CaptureContext::new(&env);
    assert_eq!(cx.capture_wildcards(&ty), ty);
    assert_eq!(cx.capture_wildcards(&Type::int()), Type::int());
}
