use nova_types::{
    format_method, format_type, presentable_type, MethodDef, Substitution, Type, TypeEnv,
    TypeStore,
};

use pretty_assertions::assert_eq;

#[test]
fn canonical_and_presentable_text() {
    let env = TypeStore::with_minimal_jdk();
    let wk = *env.well_known();
    let map = env.class_id("java.util.Map").unwrap();
    let ty = Type::class(
        map,
        vec![Type::class(wk.string, vec![]), Type::array(Type::class(wk.integer, vec![]))],
    );

    assert_eq!(
        format_type(&env, &ty),
        "java.util.Map<java.lang.String,java.lang.Integer[]>"
    );
    assert_eq!(presentable_type(&env, &ty), "Map<String,Integer[]>");
    assert_eq!(
        presentable_type(&env, &Type::extends(Type::class(wk.number, vec![]))),
        "? extends Number"
    );
}

#[test]
fn null_and_unknown_never_fail() {
    let env = TypeStore::with_minimal_jdk();
    assert_eq!(format_type(&env, &Type::Null), "null");
    assert_eq!(format_type(&env, &Type::Void), "void");
    assert_eq!(format_type(&env, &Type::Unknown), "?");
    assert_eq!(format_type(&env, &Type::array(Type::Unknown)), "?[]");
}

#[test]
fn methods_render_with_substituted_parameters() {
    let mut env = TypeStore::with_minimal_jdk();
    let list = env.class_id("java.util.List").unwrap();
    let e = env.class(list).unwrap().type_params[0];
    let string = Type::class(env.well_known().string, vec![]);
    let object = env.well_known().object;
    let m = env.add_method(MethodDef::new(
        "put",
        object,
        vec![Type::TypeVar(e), Type::int()],
        Type::Void,
    ));

    assert_eq!(format_method(&env, m, &Substitution::empty()), "put(E, int)");
    let subst = Substitution::empty().put(e, Some(string));
    assert_eq!(format_method(&env, m, &subst), "put(String, int)");
}
