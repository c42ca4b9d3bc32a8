use nova_core::JavaLanguageLevel;
use nova_flow::{CompletionReasons, ControlFlow};
use nova_hir::{NodeId, NodeKind, ReferenceListRole};
use nova_resolve::{Element, ResolveResult};
use nova_types::{ClassId, ClassKind, MethodDef, MethodId, Modifier, Type, TypeEnv};
use pretty_assertions::assert_eq;

use crate::suite::fixture::{single, Fixture};

/// Body block that the flow facts say always returns.
fn returning_body(f: &mut Fixture, statements: Vec<NodeId>) -> NodeId {
    let body = f.block(statements);
    f.flow.set_control_flow(
        body,
        ControlFlow {
            completion: CompletionReasons::RETURN,
            ..ControlFlow::default()
        },
    );
    body
}

/// Declaration node for `method`, named and typed after its store definition.
fn method_decl(f: &mut Fixture, method: MethodId, modifiers: &[Modifier], body: Option<NodeId>) -> NodeId {
    let def = f.env().method(method).unwrap().clone();
    let list = f.modifiers(modifiers);
    let params = def
        .params
        .iter()
        .enumerate()
        .map(|(idx, ty)| {
            let element = f.type_element(ty);
            f.param(&format!("p{idx}"), element)
        })
        .collect();
    let decl = if def.is_constructor {
        let name = f.env().class(def.owner).unwrap().simple_name().to_string();
        f.method(list, &name, None, params, body)
    } else {
        let ret = f.type_element(&def.return_type);
        f.method(list, &def.name, Some(ret), params, body)
    };
    f.resolve.bind_method(decl, method);
    decl
}

/// Top-level class declaration bound to `class`.
fn class_decl(f: &mut Fixture, class: ClassId, kind: ClassKind, modifiers: &[Modifier], members: Vec<NodeId>) -> NodeId {
    let name = f.env().class(class).unwrap().simple_name().to_string();
    let list = f.modifiers(modifiers);
    let decl = f.class(list, &name, kind, members);
    f.resolve.bind_class(decl, class);
    f.file(vec![decl])
}

/// `class Base { <modifiers> void m() {} }` in the store, and `C extends Base`.
fn subclass_of_base(f: &mut Fixture, base_modifiers: &[Modifier]) -> ClassId {
    let base = f.declare_class("Base", ClassKind::Class, &[]);
    f.declare_method(MethodDef::new("m", base, vec![], Type::Void).with_modifiers(base_modifiers));
    let class = f.declare_class("C", ClassKind::Class, &[]);
    f.store().class_mut(class).unwrap().super_class = Some(Type::class(base, vec![]));
    class
}

#[test]
fn abstract_method_with_a_body() {
    let mut f = Fixture::new("C.java");
    let class = f.declare_class("C", ClassKind::Class, &[Modifier::Abstract]);
    let m = f.declare_method(
        MethodDef::new("m", class, vec![], Type::Void).with_modifiers(&[Modifier::Abstract]),
    );
    let body = f.block(vec![]);
    let decl = method_decl(&mut f, m, &[Modifier::Abstract], Some(body));
    let root = class_decl(&mut f, class, ClassKind::Class, &[Modifier::Abstract], vec![decl]);
    let name_range = f.name_range(decl);

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "method-body-not-allowed");
    assert_eq!(diagnostic.message, "Abstract methods cannot have a body");
    assert_eq!(diagnostic.range, name_range);
    assert_eq!(diagnostic.fix_names(), vec!["delete-method-body"]);
}

#[test]
fn plain_interface_method_with_a_body() {
    let mut f = Fixture::new("I.java");
    let interface = f.declare_class("I", ClassKind::Interface, &[]);
    let m = f.declare_method(MethodDef::new("m", interface, vec![], Type::Void));
    let body = f.block(vec![]);
    let decl = method_decl(&mut f, m, &[], Some(body));
    let root = class_decl(&mut f, interface, ClassKind::Interface, &[], vec![decl]);

    let diagnostics = f.analyze(root);
    assert_eq!(
        single(&diagnostics, "method-body-not-allowed").message,
        "Interface abstract methods cannot have body"
    );
}

#[test]
fn concrete_method_without_a_body() {
    let mut f = Fixture::new("C.java");
    let class = f.declare_class("C", ClassKind::Class, &[]);
    let m = f.declare_method(MethodDef::new("m", class, vec![], Type::Void));
    let decl = method_decl(&mut f, m, &[], None);
    let root = class_decl(&mut f, class, ClassKind::Class, &[], vec![decl]);

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "missing-method-body");
    assert_eq!(diagnostic.message, "Missing method body, or declare abstract");
    assert_eq!(diagnostic.fix_names(), vec!["add-method-body"]);
}

#[test]
fn override_cannot_narrow_access() {
    let mut f = Fixture::new("C.java");
    let class = f.declare_class("C", ClassKind::Class, &[]);
    let string = f.ty("java.lang.String");
    let m = f.declare_method(MethodDef::new("toString", class, vec![], string));
    let body = returning_body(&mut f, vec![]);
    let decl = method_decl(&mut f, m, &[], Some(body));
    let NodeKind::Method { modifiers, .. } = f.kind(decl).clone() else {
        unreachable!();
    };
    let root = class_decl(&mut f, class, ClassKind::Class, &[], vec![decl]);
    let modifiers_range = f.range(modifiers);

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "weaker-access");
    assert_eq!(
        diagnostic.message,
        "'toString()' in 'C' cannot override 'toString()' in 'Object'; attempting to assign weaker access privileges ('packageLocal'); was 'public'"
    );
    assert_eq!(diagnostic.fix_names(), vec!["add-modifier"]);
    assert_eq!(diagnostic.fixes[0].range, modifiers_range);
}

#[test]
fn override_with_incompatible_return_type() {
    let mut f = Fixture::new("C.java");
    let class = f.declare_class("C", ClassKind::Class, &[]);
    let m = f.declare_method(
        MethodDef::new("hashCode", class, vec![], Type::Primitive(nova_types::PrimitiveType::Long))
            .with_modifiers(&[Modifier::Public]),
    );
    let body = returning_body(&mut f, vec![]);
    let decl = method_decl(&mut f, m, &[Modifier::Public], Some(body));
    let NodeKind::Method {
        return_type: Some(ret),
        ..
    } = f.kind(decl).clone()
    else {
        unreachable!();
    };
    let root = class_decl(&mut f, class, ClassKind::Class, &[], vec![decl]);
    let ret_range = f.range(ret);

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "incompatible-return-type");
    assert_eq!(
        diagnostic.message,
        "'hashCode()' in 'C' cannot override 'hashCode()' in 'Object'; attempting to use incompatible return type"
    );
    assert_eq!(diagnostic.range, ret_range);
    assert_eq!(diagnostic.fix_names(), vec!["change-return-type"]);
}

#[test]
fn final_method_cannot_be_overridden() {
    let mut f = Fixture::new("C.java");
    let class = subclass_of_base(&mut f, &[Modifier::Final]);
    let m = f.declare_method(MethodDef::new("m", class, vec![], Type::Void));
    let body = f.block(vec![]);
    let decl = method_decl(&mut f, m, &[], Some(body));
    let root = class_decl(&mut f, class, ClassKind::Class, &[], vec![decl]);

    let diagnostics = f.analyze(root);
    assert_eq!(
        single(&diagnostics, "overrides-final").message,
        "'m()' cannot override 'm()' in 'Base'; overridden method is final"
    );
}

#[test]
fn static_method_cannot_override_instance_method() {
    let mut f = Fixture::new("C.java");
    let class = subclass_of_base(&mut f, &[]);
    let m = f.declare_method(
        MethodDef::new("m", class, vec![], Type::Void).with_modifiers(&[Modifier::Static]),
    );
    let body = f.block(vec![]);
    let decl = method_decl(&mut f, m, &[Modifier::Static], Some(body));
    let root = class_decl(&mut f, class, ClassKind::Class, &[], vec![decl]);

    let diagnostics = f.analyze(root);
    assert_eq!(
        single(&diagnostics, "static-instance-override").message,
        "'m()' in 'C' cannot override 'm()' in 'Base'; overriding method is static"
    );
}

#[test]
fn override_cannot_add_checked_exceptions() {
    let mut f = Fixture::new("C.java");
    let class = subclass_of_base(&mut f, &[]);
    let io = f.ty("java.io.IOException");
    let m = f.declare_method(MethodDef::new("m", class, vec![], Type::Void).with_throws(vec![io.clone()]));

    let list = f.modifiers(&[]);
    let ret = f.type_element(&Type::Void);
    let thrown = f.type_element(&io);
    let throws = f.node(NodeKind::ReferenceList {
        role: ReferenceListRole::Throws,
        types: vec![thrown],
    });
    let body = f.block(vec![]);
    let name_range = f.fresh_range(1);
    let decl = f.node(NodeKind::Method {
        name: "m".into(),
        name_range,
        modifiers: list,
        type_params: vec![],
        return_type: Some(ret),
        params: vec![],
        throws: Some(throws),
        body: Some(body),
    });
    f.resolve.bind_method(decl, m);
    let root = class_decl(&mut f, class, ClassKind::Class, &[], vec![decl]);
    let throws_range = f.range(throws);

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "incompatible-throws");
    assert_eq!(
        diagnostic.message,
        "'m()' in 'C' cannot override 'm()' in 'Base'; overridden method does not throw 'IOException'"
    );
    assert_eq!(diagnostic.range, throws_range);
}

#[test]
fn second_declaration_with_the_same_signature() {
    let mut f = Fixture::new("C.java");
    let class = f.declare_class("C", ClassKind::Class, &[]);
    let int = Type::int();
    let first = f.declare_method(MethodDef::new("m", class, vec![int.clone()], Type::Void));
    let second = f.declare_method(MethodDef::new("m", class, vec![int], Type::Void));
    let first_body = f.block(vec![]);
    let first = method_decl(&mut f, first, &[], Some(first_body));
    let second_body = f.block(vec![]);
    let second = method_decl(&mut f, second, &[], Some(second_body));
    let root = class_decl(&mut f, class, ClassKind::Class, &[], vec![first, second]);
    let second_range = f.name_range(second);

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "duplicate-method");
    assert_eq!(diagnostic.message, "'m(int)' is already defined in 'C'");
    assert_eq!(diagnostic.range, second_range);
}

#[test]
fn constructor_implicitly_calls_a_missing_default_super_constructor() {
    let mut f = Fixture::new("C.java");
    let base = f.declare_class("Base", ClassKind::Class, &[]);
    f.declare_method(MethodDef::constructor(base, vec![Type::int()]));
    let class = f.declare_class("C", ClassKind::Class, &[]);
    f.store().class_mut(class).unwrap().super_class = Some(Type::class(base, vec![]));
    let ctor = f.declare_method(MethodDef::constructor(class, vec![]));
    let body = f.block(vec![]);
    let decl = method_decl(&mut f, ctor, &[], Some(body));
    let root = class_decl(&mut f, class, ClassKind::Class, &[], vec![decl]);
    let name_range = f.name_range(decl);

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "no-default-constructor");
    assert_eq!(
        diagnostic.message,
        "There is no default constructor available in 'Base'"
    );
    assert_eq!(diagnostic.range, name_range);
}

/// `this(<args>);` delegating to `target`.
fn this_call(f: &mut Fixture, target: MethodId, args: Vec<NodeId>) -> (NodeId, NodeId) {
    let this = f.expr(NodeKind::This { qualifier: None }, Type::Void);
    f.resolve
        .add_candidate(this, ResolveResult::new(Element::Method(target)));
    let args = f.args(args);
    let call = f.expr(NodeKind::MethodCall { method: this, args }, Type::Void);
    (f.stmt(call), call)
}

#[test]
fn constructors_delegating_in_a_cycle() {
    let mut f = Fixture::new("C.java");
    let class = f.declare_class("C", ClassKind::Class, &[]);
    let no_args = f.declare_method(MethodDef::constructor(class, vec![]));
    let one_arg = f.declare_method(MethodDef::constructor(class, vec![Type::int()]));

    let one = f.int(1);
    let (first_stmt, first_call) = this_call(&mut f, one_arg, vec![one]);
    let first_body = f.block(vec![first_stmt]);
    let first = method_decl(&mut f, no_args, &[], Some(first_body));
    let (second_stmt, _) = this_call(&mut f, no_args, vec![]);
    let second_body = f.block(vec![second_stmt]);
    let second = method_decl(&mut f, one_arg, &[], Some(second_body));
    let root = class_decl(&mut f, class, ClassKind::Class, &[], vec![first, second]);
    let call_range = f.range(first_call);

    let diagnostics = f.analyze(root);
    let found = crate::suite::fixture::with_code(&diagnostics, "recursive-constructor-invocation");
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].message, "Recursive constructor invocation");
    assert_eq!(found[0].range, call_range);
}

#[test]
fn interfaces_have_no_constructors() {
    let mut f = Fixture::new("I.java");
    let interface = f.declare_class("I", ClassKind::Interface, &[]);
    let ctor = f.declare_method(MethodDef::constructor(interface, vec![]));
    let body = f.block(vec![]);
    let decl = method_decl(&mut f, ctor, &[], Some(body));
    let root = class_decl(&mut f, interface, ClassKind::Interface, &[], vec![decl]);

    let diagnostics = f.analyze(root);
    assert_eq!(
        single(&diagnostics, "not-allowed-in-interface").message,
        "Not allowed in interface"
    );
}

/// `class C { @SafeVarargs <modifiers> void m(<params>) {} }`.
fn safe_varargs(modifiers: &[Modifier], varargs: bool) -> Vec<nova_highlight::Diagnostic> {
    let mut f = Fixture::new("C.java");
    let class = f.declare_class("C", ClassKind::Class, &[]);
    let string = f.ty("java.lang.String");
    let params = if varargs { vec![Type::array(string.clone())] } else { vec![] };
    let mut def = MethodDef::new("m", class, params, Type::Void).with_modifiers(modifiers);
    def.is_varargs = varargs;
    let m = f.declare_method(def);

    let annotation = f.annotation("java.lang.SafeVarargs");
    let list = f.annotated(modifiers, vec![annotation]);
    let ret = f.type_element(&Type::Void);
    let params = if varargs {
        let element = f.varargs(&string);
        vec![f.param("args", element)]
    } else {
        vec![]
    };
    let body = f.block(vec![]);
    let decl = f.method(list, "m", Some(ret), params, Some(body));
    f.resolve.bind_method(decl, m);
    let root = class_decl(&mut f, class, ClassKind::Class, &[], vec![decl]);
    f.analyze(root)
}

#[test]
fn safe_varargs_placement() {
    let diagnostics = safe_varargs(&[Modifier::Final], false);
    assert_eq!(
        single(&diagnostics, "safe-varargs-misuse").message,
        "@SafeVarargs is not allowed on methods with fixed arity"
    );

    let diagnostics = safe_varargs(&[], true);
    assert_eq!(
        single(&diagnostics, "safe-varargs-misuse").message,
        "@SafeVarargs is not allowed on non-final instance methods"
    );

    let diagnostics = safe_varargs(&[Modifier::Static], true);
    assert!(diagnostics.is_empty(), "{diagnostics:#?}");
}

/// `class C implements Runnable { @Override public void run() {} }`.
fn override_of_interface_method(level: JavaLanguageLevel) -> Vec<nova_highlight::Diagnostic> {
    let mut f = Fixture::new("C.java").at_level(level);
    let runnable = f.ty("java.lang.Runnable");
    let class = f.declare_class("C", ClassKind::Class, &[]);
    f.store().class_mut(class).unwrap().interfaces = vec![runnable];
    let run = f.declare_method(
        MethodDef::new("run", class, vec![], Type::Void).with_modifiers(&[Modifier::Public]),
    );
    let annotation = f.annotation("java.lang.Override");
    let list = f.annotated(&[Modifier::Public], vec![annotation]);
    let ret = f.type_element(&Type::Void);
    let body = f.block(vec![]);
    let decl = f.method(list, "run", Some(ret), vec![], Some(body));
    f.resolve.bind_method(decl, run);
    let root = class_decl(&mut f, class, ClassKind::Class, &[], vec![decl]);
    f.analyze(root)
}

#[test]
fn override_of_interface_methods_needs_java_6() {
    let diagnostics = override_of_interface_method(JavaLanguageLevel::JAVA_5);
    assert_eq!(
        single(&diagnostics, "override-on-interface-method").message,
        "@Override is not allowed when implementing interface method"
    );

    let diagnostics = override_of_interface_method(JavaLanguageLevel::JAVA_6);
    assert!(diagnostics.is_empty(), "{diagnostics:#?}");
}
