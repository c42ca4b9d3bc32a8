use nova_hir::{LiteralKind, NodeId, NodeKind};
use nova_resolve::{Element, ResolveResult};
use nova_types::{ClassId, ClassKind, MethodDef, MethodId, Modifier, PrimitiveType, Substitution, Type, TypeEnv};
use pretty_assertions::assert_eq;

use crate::suite::fixture::{single, Fixture};

fn static_method(f: &mut Fixture, owner: ClassId, name: &str, params: Vec<Type>) -> MethodId {
    f.declare_method(MethodDef::new(name, owner, params, Type::Void).with_modifiers(&[Modifier::Static]))
}

/// Method name reference and argument list of a call.
fn parts(f: &Fixture, call: NodeId) -> (NodeId, NodeId) {
    let NodeKind::MethodCall { method, args } = f.kind(call) else {
        unreachable!();
    };
    (*method, *args)
}

#[test]
fn call_to_an_unknown_method() {
    let mut f = Fixture::new("Test.java");
    let arg = f.int(1);
    let call = f.call("foo", vec![arg], Type::Unknown, vec![]);
    let (method, _) = parts(&f, call);
    let stmt = f.stmt(call);
    let root = f.in_method(vec![stmt]);
    let range = f.name_range(method);

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "cannot-resolve-method");
    assert_eq!(diagnostic.message, "Cannot resolve method 'foo(int)'");
    assert_eq!(diagnostic.range, range);
    assert_eq!(diagnostic.fix_names(), vec!["create-method"]);
}

#[test]
fn single_inapplicable_candidate_offers_a_cast() {
    let mut f = Fixture::new("Test.java");
    let helper = f.declare_class("Helper", ClassKind::Class, &[]);
    let take = static_method(&mut f, helper, "take", vec![Type::int()]);
    let arg = f.literal(LiteralKind::Long, "1L");
    let call = f.call(
        "take",
        vec![arg],
        Type::Void,
        vec![ResolveResult::new(Element::Method(take)).inapplicable()],
    );
    let (_, args) = parts(&f, call);
    let stmt = f.stmt(call);
    let root = f.in_method(vec![stmt]);
    let range = f.range(args);

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "inapplicable-call");
    assert_eq!(
        diagnostic.message,
        "'take(int)' in 'Helper' cannot be applied to '(long)'"
    );
    assert_eq!(diagnostic.range, range);
    assert_eq!(diagnostic.fix_names(), vec!["cast-argument"]);
    assert!(diagnostic.tooltip.is_some());
}

#[test]
fn inapplicable_generic_method_shows_substituted_parameters() {
    let mut f = Fixture::new("Test.java");
    let string = f.ty("java.lang.String");
    let list_of_string = f.generic("java.util.ArrayList", vec![string.clone()]);
    let array_list = f.class_id("java.util.ArrayList");
    let (add, e) = {
        let env = f.env();
        let def = env.class(array_list).unwrap();
        let add = def
            .methods
            .iter()
            .copied()
            .find(|m| env.method(*m).is_some_and(|d| d.name == "add"))
            .unwrap();
        (add, def.type_params[0])
    };

    let element = f.type_element(&list_of_string);
    let null = f.literal(LiteralKind::Null, "null");
    let local = f.local(&[], "list", element, Some(null));
    let receiver = f.read(local, list_of_string);
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
    f.resolve.add_candidate(
        method,
        ResolveResult::new(Element::Method(add))
            .with_substitution(Substitution::empty().put(e, Some(string)))
            .inapplicable(),
    );
    let arg = f.int(1);
    let args = f.args(vec![arg]);
    let call = f.expr(NodeKind::MethodCall { method, args }, Type::boolean());
    let stmt = f.stmt(call);
    let root = f.in_method(vec![local, stmt]);

    let diagnostics = f.analyze(root);
    assert_eq!(
        single(&diagnostics, "inapplicable-call").message,
        "'add(String)' in 'ArrayList' cannot be applied to '(int)'"
    );
}

#[test]
fn two_applicable_overloads_without_a_choice_are_ambiguous() {
    let mut f = Fixture::new("Test.java");
    let helper = f.declare_class("Helper", ClassKind::Class, &[]);
    let by_int = static_method(&mut f, helper, "run", vec![Type::int()]);
    let by_long = static_method(&mut f, helper, "run", vec![Type::Primitive(PrimitiveType::Long)]);
    let arg = f.int(1);
    let call = f.call(
        "run",
        vec![arg],
        Type::Void,
        vec![
            ResolveResult::new(Element::Method(by_int)),
            ResolveResult::new(Element::Method(by_long)),
        ],
    );
    let stmt = f.stmt(call);
    let root = f.in_method(vec![stmt]);

    let diagnostics = f.analyze(root);
    assert_eq!(
        single(&diagnostics, "ambiguous-call").message,
        "Ambiguous method call: both 'Helper.run(int)' and 'Helper.run(long)' match"
    );
}

#[test]
fn most_specific_overload_chosen_by_resolution_is_silent() {
    let mut f = Fixture::new("Test.java");
    let helper = f.declare_class("Helper", ClassKind::Class, &[]);
    let by_int = static_method(&mut f, helper, "run", vec![Type::int()]);
    let by_long = static_method(&mut f, helper, "run", vec![Type::Primitive(PrimitiveType::Long)]);
    let arg = f.int(1);
    let call = f.call(
        "run",
        vec![arg],
        Type::Void,
        vec![ResolveResult::new(Element::Method(by_long))],
    );
    let (method, _) = parts(&f, call);
    f.resolve.choose(method, ResolveResult::new(Element::Method(by_int)));
    let stmt = f.stmt(call);
    let root = f.in_method(vec![stmt]);

    let diagnostics = f.analyze(root);
    assert!(diagnostics.is_empty(), "{diagnostics:#?}");
}

#[test]
fn string_argument_picks_the_string_overload_over_object() {
    let mut f = Fixture::new("Test.java");
    let object = f.ty("java.lang.Object");
    let string = f.ty("java.lang.String");
    let helper = f.declare_class("Helper", ClassKind::Class, &[]);
    let by_object = static_method(&mut f, helper, "run", vec![object]);
    let by_string = static_method(&mut f, helper, "run", vec![string]);
    let arg = f.literal(LiteralKind::String, "\"s\"");
    let call = f.call(
        "run",
        vec![arg],
        Type::Void,
        vec![ResolveResult::new(Element::Method(by_object))],
    );
    let (method, _) = parts(&f, call);
    f.resolve.choose(method, ResolveResult::new(Element::Method(by_string)));
    let stmt = f.stmt(call);
    let root = f.in_method(vec![stmt]);

    let diagnostics = f.analyze(root);
    assert!(diagnostics.is_empty(), "{diagnostics:#?}");
}

#[test]
fn no_applicable_overload_cannot_be_resolved() {
    let mut f = Fixture::new("Test.java");
    let helper = f.declare_class("Helper", ClassKind::Class, &[]);
    let by_int = static_method(&mut f, helper, "run", vec![Type::int()]);
    let string = f.ty("java.lang.String");
    let by_string = static_method(&mut f, helper, "run", vec![string]);
    let arg = f.literal(LiteralKind::Boolean, "true");
    let call = f.call(
        "run",
        vec![arg],
        Type::Void,
        vec![
            ResolveResult::new(Element::Method(by_int)).inapplicable(),
            ResolveResult::new(Element::Method(by_string)).inapplicable(),
        ],
    );
    let (_, args) = parts(&f, call);
    let stmt = f.stmt(call);
    let root = f.in_method(vec![stmt]);
    let range = f.range(args);

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "cannot-resolve-method");
    assert_eq!(diagnostic.message, "Cannot resolve method 'run(boolean)'");
    assert_eq!(diagnostic.range, range);
    assert_eq!(diagnostic.fix_names(), vec!["create-method"]);
}

/// `new <class>(args)` with every `candidates` entry recorded on the expression.
fn new_with_candidates(f: &mut Fixture, class: ClassId, args: Vec<NodeId>, candidates: Vec<ResolveResult>) -> NodeId {
    let ty = Type::class(class, vec![]);
    let ty_element = f.type_element(&ty);
    let args = f.args(args);
    let new = f.expr(
        NodeKind::New {
            qualifier: None,
            ty: ty_element,
            dims: vec![],
            array_dims: 0,
            args: Some(args),
            initializer: None,
            anonymous_body: None,
        },
        ty,
    );
    for candidate in candidates {
        f.resolve.add_candidate(new, candidate);
    }
    new
}

#[test]
fn no_applicable_constructor_cannot_be_resolved() {
    let mut f = Fixture::new("Test.java");
    let string = f.ty("java.lang.String");
    let class = f.declare_class("Box", ClassKind::Class, &[]);
    let by_int = f.declare_method(MethodDef::constructor(class, vec![Type::int()]));
    let by_string = f.declare_method(MethodDef::constructor(class, vec![string]));
    let arg = f.literal(LiteralKind::Boolean, "true");
    let new = new_with_candidates(
        &mut f,
        class,
        vec![arg],
        vec![
            ResolveResult::new(Element::Method(by_int)).inapplicable(),
            ResolveResult::new(Element::Method(by_string)).inapplicable(),
        ],
    );
    let NodeKind::New { args: Some(args), .. } = f.kind(new) else {
        unreachable!();
    };
    let range = f.range(*args);
    let stmt = f.stmt(new);
    let root = f.in_method(vec![stmt]);

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "cannot-resolve-constructor");
    assert_eq!(diagnostic.message, "Cannot resolve constructor 'Box(boolean)'");
    assert_eq!(diagnostic.range, range);
    assert_eq!(diagnostic.fix_names(), vec!["create-constructor"]);
}

#[test]
fn constructor_chosen_among_applicable_ones_is_silent() {
    let mut f = Fixture::new("Test.java");
    let object = f.ty("java.lang.Object");
    let string = f.ty("java.lang.String");
    let class = f.declare_class("Box", ClassKind::Class, &[]);
    let by_object = f.declare_method(MethodDef::constructor(class, vec![object]));
    let by_string = f.declare_method(MethodDef::constructor(class, vec![string]));
    let arg = f.literal(LiteralKind::String, "\"s\"");
    let new = new_with_candidates(
        &mut f,
        class,
        vec![arg],
        vec![ResolveResult::new(Element::Method(by_object))],
    );
    f.resolve.choose(new, ResolveResult::new(Element::Method(by_string)));
    let stmt = f.stmt(new);
    let root = f.in_method(vec![stmt]);

    let diagnostics = f.analyze(root);
    assert!(diagnostics.is_empty(), "{diagnostics:#?}");
}

#[test]
fn instance_method_named_from_a_static_context() {
    let mut f = Fixture::new("Test.java");
    let helper = f.declare_class("Helper", ClassKind::Class, &[]);
    let work = f.declare_method(MethodDef::new("work", helper, vec![], Type::Void));
    let call = f.call(
        "work",
        vec![],
        Type::Void,
        vec![ResolveResult::new(Element::Method(work)).wrong_static_context()],
    );
    let (method, _) = parts(&f, call);
    let stmt = f.stmt(call);
    let root = f.in_method(vec![stmt]);
    let range = f.name_range(method);

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "static-context");
    assert_eq!(
        diagnostic.message,
        "Non-static method 'work()' cannot be referenced from a static context"
    );
    assert_eq!(diagnostic.range, range);
}

#[test]
fn valid_single_candidate_is_silent() {
    let mut f = Fixture::new("Test.java");
    let helper = f.declare_class("Helper", ClassKind::Class, &[]);
    let take = static_method(&mut f, helper, "take", vec![Type::int()]);
    let arg = f.int(1);
    let call = f.call(
        "take",
        vec![arg],
        Type::Void,
        vec![ResolveResult::new(Element::Method(take))],
    );
    let stmt = f.stmt(call);
    let root = f.in_method(vec![stmt]);

    let diagnostics = f.analyze(root);
    assert!(diagnostics.is_empty(), "{diagnostics:#?}");
}
