use nova_core::JavaLanguageLevel;
use nova_highlight::Severity;
use nova_hir::{LiteralKind, NodeId, NodeKind, TypeElementKind};
use nova_resolve::{Element, ResolveResult};
use nova_types::{ClassKind, PrimitiveType, Type, TypeEnv, WildcardBound};
use pretty_assertions::assert_eq;

use crate::suite::fixture::{single, with_code, Fixture};

/// Type argument elements of a `T<...>` type element.
fn type_args(f: &Fixture, element: NodeId) -> Vec<NodeId> {
    let NodeKind::TypeElement {
        kind: TypeElementKind::Reference { reference },
    } = f.kind(element)
    else {
        panic!("{element:?} is not a class type element");
    };
    match f.kind(*reference) {
        NodeKind::CodeRef {
            type_args: Some(args),
            ..
        } => args.clone(),
        _ => Vec::new(),
    }
}

/// `void m() { <ty> v; }` analyzed; returns the diagnostics and the type element.
fn declare_local(f: &mut Fixture, ty: &Type) -> (NodeId, NodeId) {
    let element = f.type_element(ty);
    let local = f.local(&[], "v", element, None);
    (f.in_method(vec![local]), element)
}

#[test]
fn wrong_number_of_type_arguments() {
    let mut f = Fixture::new("Test.java");
    let ty = f.generic(
        "java.util.List",
        vec![f.ty("java.lang.String"), f.ty("java.lang.Integer")],
    );
    let (root, element) = declare_local(&mut f, &ty);
    let args = type_args(&f, element);
    let expected = f.range(args[0]).cover(f.range(args[1]));

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "wrong-type-argument-count");
    assert_eq!(
        diagnostic.message,
        "Wrong number of type arguments: 2; required: 1"
    );
    assert_eq!(diagnostic.range, expected);
}

#[test]
fn type_arguments_on_a_non_generic_class() {
    let mut f = Fixture::new("Test.java");
    let ty = f.generic("java.lang.String", vec![f.ty("java.lang.Integer")]);
    let (root, _) = declare_local(&mut f, &ty);

    let diagnostics = f.analyze(root);
    assert_eq!(
        single(&diagnostics, "wrong-type-argument-count").message,
        "Type 'String' does not have type parameters"
    );
}

#[test]
fn primitive_type_argument_suggests_the_boxed_type() {
    let mut f = Fixture::new("Test.java");
    let ty = f.generic("java.util.List", vec![Type::Primitive(PrimitiveType::Int)]);
    let (root, element) = declare_local(&mut f, &ty);
    let arg = type_args(&f, element)[0];
    let range = f.range(arg);

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "primitive-type-argument");
    assert_eq!(diagnostic.message, "Type argument cannot be of primitive type");
    assert_eq!(diagnostic.range, range);
    assert_eq!(diagnostic.fix_names(), vec!["replace-primitive-with-boxed"]);
}

/// `class Box<T extends Number>` in the store.
fn declare_box(f: &mut Fixture) {
    let number = f.ty("java.lang.Number");
    let class = f.declare_class("Box", ClassKind::Class, &[]);
    let t = f.store().add_type_param("T", vec![number]);
    f.store().class_mut(class).unwrap().type_params = vec![t];
}

#[test]
fn type_argument_outside_its_bound() {
    let mut f = Fixture::new("Test.java");
    declare_box(&mut f);
    let ty = f.generic("Box", vec![f.ty("java.lang.String")]);
    let (root, element) = declare_local(&mut f, &ty);
    let arg = type_args(&f, element)[0];
    let range = f.range(arg);

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "type-argument-not-within-bounds");
    assert_eq!(
        diagnostic.message,
        "Type parameter 'String' is not within its bound; should extend 'Number'"
    );
    assert_eq!(diagnostic.range, range);
    assert_eq!(diagnostic.fix_names(), vec!["add-to-extends-list"]);
}

#[test]
fn type_arguments_within_bounds() {
    let mut f = Fixture::new("Test.java");
    declare_box(&mut f);
    let integer = f.generic("Box", vec![f.ty("java.lang.Integer")]);
    let wildcard = f.generic("Box", vec![Type::Wildcard(WildcardBound::Unbounded)]);
    let first = f.type_element(&integer);
    let first = f.local(&[], "a", first, None);
    let second = f.type_element(&wildcard);
    let second = f.local(&[], "b", second, None);
    let root = f.in_method(vec![first, second]);

    let diagnostics = f.analyze(root);
    assert!(diagnostics.is_empty(), "{diagnostics:#?}");
}

/// `class Range<A, B extends A>` in the store.
fn declare_range(f: &mut Fixture) {
    let class = f.declare_class("Range", ClassKind::Class, &[]);
    let a = f.store().add_type_param("A", vec![]);
    let b = f.store().add_type_param("B", vec![Type::TypeVar(a)]);
    f.store().class_mut(class).unwrap().type_params = vec![a, b];
}

#[test]
fn dependent_bound_accepts_the_lower_bound_of_a_captured_wildcard() {
    let mut f = Fixture::new("Test.java");
    declare_range(&mut f);
    let integer = f.ty("java.lang.Integer");
    let ty = f.generic("Range", vec![Type::super_of(integer.clone()), integer]);
    let (root, _) = declare_local(&mut f, &ty);

    let diagnostics = f.analyze(root);
    assert!(diagnostics.is_empty(), "{diagnostics:#?}");
}

#[test]
fn dependent_bound_on_an_extends_wildcard_is_its_capture() {
    let mut f = Fixture::new("Test.java");
    declare_range(&mut f);
    let number = f.ty("java.lang.Number");
    let string = f.ty("java.lang.String");
    let ty = f.generic("Range", vec![Type::extends(number), string]);
    let (root, element) = declare_local(&mut f, &ty);
    let arg = type_args(&f, element)[1];
    let range = f.range(arg);

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "type-argument-not-within-bounds");
    assert_eq!(
        diagnostic.message,
        "Type parameter 'String' is not within its bound; should extend 'CAP#1'"
    );
    assert_eq!(diagnostic.range, range);
    assert!(diagnostic.fix_names().is_empty());
}

#[test]
fn wildcard_cannot_be_instantiated() {
    let mut f = Fixture::new("Test.java");
    let ty = f.generic("java.util.ArrayList", vec![Type::Wildcard(WildcardBound::Unbounded)]);
    let new = f.new_object(&ty, vec![]);
    let stmt = f.stmt(new);
    let root = f.in_method(vec![stmt]);

    let diagnostics = f.analyze(root);
    assert_eq!(
        single(&diagnostics, "wildcard-instantiation").message,
        "Wildcard type '?' cannot be instantiated directly"
    );
}

#[test]
fn arrays_of_parameterized_types_cannot_be_created() {
    let mut f = Fixture::new("Test.java");
    let list_of_string = f.generic("java.util.List", vec![f.ty("java.lang.String")]);
    let ty = f.type_element(&list_of_string);
    let size = f.int(3);
    let new = f.expr(
        NodeKind::New {
            qualifier: None,
            ty,
            dims: vec![size],
            array_dims: 1,
            args: None,
            initializer: None,
            anonymous_body: None,
        },
        Type::array(list_of_string.clone()),
    );
    let array_ty = f.type_element(&Type::array(list_of_string));
    let local = f.local(&[], "lists", array_ty, Some(new));
    let root = f.in_method(vec![local]);
    let range = f.range(new);

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "generic-array-creation");
    assert_eq!(diagnostic.message, "Generic array creation");
    assert_eq!(diagnostic.range, range);
}

/// `Object o = null; List<String> l = (List<String>) o;`
fn unchecked_cast_body(f: &mut Fixture) -> (NodeId, NodeId) {
    let object = f.ty("java.lang.Object");
    let list_of_string = f.generic("java.util.List", vec![f.ty("java.lang.String")]);
    let object_ty = f.type_element(&object);
    let null = f.literal(LiteralKind::Null, "null");
    let o = f.local(&[], "o", object_ty, Some(null));
    let read = f.read(o, object);
    let cast_ty = f.type_element(&list_of_string);
    let cast = f.expr(NodeKind::Cast { ty: cast_ty, expr: read }, list_of_string.clone());
    let list_ty = f.type_element(&list_of_string);
    let l = f.local(&[], "l", list_ty, Some(cast));
    (f.in_method(vec![o, l]), cast)
}

#[test]
fn unchecked_cast_is_a_warning() {
    let mut f = Fixture::new("Test.java");
    let (root, cast) = unchecked_cast_body(&mut f);
    let range = f.range(cast);

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "unchecked-cast");
    assert_eq!(diagnostic.severity, Severity::Warning);
    assert_eq!(diagnostic.message, "Unchecked cast: 'Object' to 'List<String>'");
    assert_eq!(diagnostic.range, range);
}

#[test]
fn unchecked_warnings_can_be_turned_off() {
    let mut f = Fixture::new("Test.java");
    f.config.report_unchecked_warnings = false;
    let (root, _) = unchecked_cast_body(&mut f);
    let diagnostics = f.analyze(root);
    assert!(diagnostics.is_empty(), "{diagnostics:#?}");
}

#[test]
fn generic_method_called_through_a_raw_receiver() {
    let mut f = Fixture::new("Test.java");
    let raw = f.ty("java.util.ArrayList");
    let add = {
        let env = f.env();
        let def = env.class(f.class_id("java.util.ArrayList")).unwrap();
        def.methods
            .iter()
            .copied()
            .find(|m| env.method(*m).is_some_and(|d| d.name == "add"))
            .unwrap()
    };

    let raw_ty = f.type_element(&raw);
    let null = f.literal(LiteralKind::Null, "null");
    let local = f.local(&[], "raw", raw_ty, Some(null));
    let receiver = f.read(local, raw.clone());
    let name_range = f.fresh_range(3);
    let method = f.expr(
        NodeKind::Reference {
            qualifier: Some(receiver),
            name: "add".into(),
            name_range,
            type_args: vec![],
        },
        Type::Unknown,
    );
    f.resolve
        .add_candidate(method, ResolveResult::new(Element::Method(add)));
    let arg = f.literal(LiteralKind::String, "\"x\"");
    let args = f.args(vec![arg]);
    let call = f.expr(NodeKind::MethodCall { method, args }, Type::boolean());
    let stmt = f.stmt(call);
    let root = f.in_method(vec![local, stmt]);

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "unchecked-call");
    assert_eq!(diagnostic.severity, Severity::Warning);
    assert_eq!(
        diagnostic.message,
        "Unchecked call to 'add(E)' as a member of raw type 'java.util.ArrayList'"
    );
}

#[test]
fn generics_need_java_5() {
    let mut f = Fixture::new("Test.java").at_level(JavaLanguageLevel::JAVA_1_4);
    let ty = f.generic("java.util.List", vec![f.ty("java.lang.String")]);
    let (root, _) = declare_local(&mut f, &ty);

    let diagnostics = f.analyze(root);
    let gated = with_code(&diagnostics, "insufficient-language-level");
    assert_eq!(gated.len(), 1);
    assert_eq!(
        gated[0].message,
        "Generics are not supported at language level '1.4'"
    );
}
