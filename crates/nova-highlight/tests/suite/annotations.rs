use nova_core::JavaLanguageLevel;
use nova_highlight::Diagnostic;
use nova_hir::{LiteralKind, NodeId, NodeKind};
use nova_types::{ClassKind, MethodDef, Modifier, Type};
use pretty_assertions::assert_eq;

use crate::suite::fixture::{single, with_code, Fixture};

/// `class C { <annotations> void m() {} }`.
fn on_method(f: &mut Fixture, annotations: Vec<NodeId>) -> NodeId {
    let class = f.declare_class("C", ClassKind::Class, &[]);
    let method = f.declare_method(MethodDef::new("m", class, vec![], Type::Void));
    let list = f.annotated(&[], annotations);
    let ret = f.type_element(&Type::Void);
    let body = f.block(vec![]);
    let decl = f.method(list, "m", Some(ret), vec![], Some(body));
    f.resolve.bind_method(decl, method);
    let class_list = f.modifiers(&[]);
    let class_decl = f.class(class_list, "C", ClassKind::Class, vec![decl]);
    f.resolve.bind_class(class_decl, class);
    f.file(vec![class_decl])
}

/// `<annotations> <kind> name { <abstract methods> }` as the only class of the file.
fn on_type(f: &mut Fixture, kind: ClassKind, name: &str, abstract_methods: &[&str], annotations: Vec<NodeId>) -> NodeId {
    let class = f.declare_class(name, kind, &[]);
    let mut members = Vec::new();
    for method_name in abstract_methods {
        let method = f.declare_method(
            MethodDef::new(*method_name, class, vec![], Type::Void).with_modifiers(&[Modifier::Abstract]),
        );
        let list = f.modifiers(&[]);
        let ret = f.type_element(&Type::Void);
        let decl = f.method(list, method_name, Some(ret), vec![], None);
        f.resolve.bind_method(decl, method);
        members.push(decl);
    }
    let list = f.annotated(&[], annotations);
    let decl = f.class(list, name, kind, members);
    f.resolve.bind_class(decl, class);
    f.file(vec![decl])
}

fn pair(f: &mut Fixture, name: Option<&str>, value: NodeId) -> NodeId {
    f.node(NodeKind::NameValuePair {
        name: name.map(Into::into),
        value,
    })
}

#[test]
fn override_is_not_applicable_to_a_type() {
    let mut f = Fixture::new("C.java");
    let annotation = f.annotation("java.lang.Override");
    let root = on_type(&mut f, ClassKind::Class, "C", &[], vec![annotation]);
    let range = f.range(annotation);

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "annotation-not-applicable");
    assert_eq!(diagnostic.message, "'@Override' not applicable to type");
    assert_eq!(diagnostic.range, range);
}

#[test]
fn deprecated_applies_anywhere() {
    let mut f = Fixture::new("C.java");
    let annotation = f.annotation("java.lang.Deprecated");
    let root = on_method(&mut f, vec![annotation]);
    let diagnostics = f.analyze(root);
    assert!(diagnostics.is_empty(), "{diagnostics:#?}");
}

#[test]
fn second_copy_of_an_annotation_is_a_duplicate() {
    let mut f = Fixture::new("C.java");
    let first = f.annotation("java.lang.Deprecated");
    let second = f.annotation("java.lang.Deprecated");
    let root = on_method(&mut f, vec![first, second]);
    let range = f.range(second);

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "duplicate-annotation");
    assert_eq!(diagnostic.message, "Duplicate annotation");
    assert_eq!(diagnostic.range, range);
}

#[test]
fn required_attribute_missing() {
    let mut f = Fixture::new("C.java");
    let annotation = f.annotation("java.lang.SuppressWarnings");
    let root = on_method(&mut f, vec![annotation]);

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "missing-annotation-attributes");
    assert_eq!(diagnostic.message, "'value' missing though required");
    assert_eq!(diagnostic.fix_names(), vec!["add-missing-attributes"]);
}

#[test]
fn unknown_and_repeated_attributes() {
    let mut f = Fixture::new("C.java");
    let unchecked = f.literal(LiteralKind::String, "\"unchecked\"");
    let first = pair(&mut f, None, unchecked);
    let raw = f.literal(LiteralKind::String, "\"rawtypes\"");
    let second = pair(&mut f, Some("value"), raw);
    let other = f.literal(LiteralKind::String, "\"x\"");
    let unknown = pair(&mut f, Some("since"), other);
    let annotation = f.annotation_with("java.lang.SuppressWarnings", vec![first, second, unknown]);
    let root = on_method(&mut f, vec![annotation]);
    let second_range = f.range(second);
    let unknown_range = f.range(unknown);

    let diagnostics = f.analyze(root);
    let duplicate = single(&diagnostics, "duplicate-annotation-attribute");
    assert_eq!(duplicate.message, "Duplicate attribute 'value'");
    assert_eq!(duplicate.range, second_range);
    let unresolved = single(&diagnostics, "unresolved-annotation-attribute");
    assert_eq!(unresolved.message, "Cannot resolve method 'since'");
    assert_eq!(unresolved.range, unknown_range);
    assert!(with_code(&diagnostics, "missing-annotation-attributes").is_empty());
}

#[test]
fn attribute_value_must_match_the_declared_type() {
    let mut f = Fixture::new("C.java");
    let value = f.int(1);
    let arg = pair(&mut f, None, value);
    let annotation = f.annotation_with("java.lang.SuppressWarnings", vec![arg]);
    let root = on_method(&mut f, vec![annotation]);
    let range = f.range(value);

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "incompatible-types");
    assert_eq!(
        diagnostic.message,
        "Incompatible types. Found: 'int', required: 'String'"
    );
    assert_eq!(diagnostic.range, range);
}

#[test]
fn array_attribute_accepts_a_single_value() {
    let mut f = Fixture::new("C.java");
    let value = f.literal(LiteralKind::String, "\"unchecked\"");
    let arg = pair(&mut f, None, value);
    let annotation = f.annotation_with("java.lang.SuppressWarnings", vec![arg]);
    let root = on_method(&mut f, vec![annotation]);
    let diagnostics = f.analyze(root);
    assert!(diagnostics.is_empty(), "{diagnostics:#?}");
}

fn functional(kind: ClassKind, methods: &[&str]) -> Vec<Diagnostic> {
    let mut f = Fixture::new("F.java");
    let annotation = f.annotation("java.lang.FunctionalInterface");
    let root = on_type(&mut f, kind, "F", methods, vec![annotation]);
    f.analyze(root)
}

#[test]
fn functional_interface_needs_exactly_one_abstract_method() {
    assert!(with_code(&functional(ClassKind::Interface, &["run"]), "invalid-functional-interface").is_empty());

    let diagnostics = functional(ClassKind::Interface, &[]);
    assert_eq!(
        single(&diagnostics, "invalid-functional-interface").message,
        "Invalid '@FunctionalInterface' annotation; No target method found"
    );

    let diagnostics = functional(ClassKind::Interface, &["a", "b"]);
    assert_eq!(
        single(&diagnostics, "invalid-functional-interface").message,
        "Invalid '@FunctionalInterface' annotation; Multiple non-overriding abstract methods found in interface F"
    );
}

#[test]
fn functional_interface_on_a_class() {
    let diagnostics = functional(ClassKind::Class, &[]);
    assert_eq!(
        single(&diagnostics, "invalid-functional-interface").message,
        "Invalid '@FunctionalInterface' annotation; 'F' is not a functional interface"
    );
}

#[test]
fn non_annotation_class_used_as_annotation() {
    let mut f = Fixture::new("C.java");
    let annotation = f.annotation("java.lang.String");
    let NodeKind::Annotation { reference, .. } = f.kind(annotation).clone() else {
        unreachable!();
    };
    let root = on_method(&mut f, vec![annotation]);
    let range = f.range(reference);

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "annotation-type-expected");
    assert_eq!(diagnostic.message, "Annotation type expected");
    assert_eq!(diagnostic.range, range);
}

#[test]
fn annotations_need_java_5() {
    let mut f = Fixture::new("C.java").at_level(JavaLanguageLevel::JAVA_1_4);
    let annotation = f.annotation("java.lang.Deprecated");
    let root = on_method(&mut f, vec![annotation]);

    let diagnostics = f.analyze(root);
    assert_eq!(
        single(&diagnostics, "insufficient-language-level").message,
        "Annotations are not supported at language level '1.4'"
    );
}
