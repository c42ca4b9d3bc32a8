use nova_core::JavaLanguageLevel;
use nova_hir::{NodeId, NodeKind};
use nova_resolve::{Element, ResolveResult};
use nova_types::{ClassKind, FieldDef, Modifier, Modifiers, Type};
use pretty_assertions::assert_eq;

use crate::suite::fixture::{single, with_code, Fixture};

fn import(f: &mut Fixture, path: &str, is_static: bool) -> NodeId {
    f.node(NodeKind::Import {
        path: path.into(),
        is_static,
        on_demand: false,
    })
}

/// A file with `imports` and one empty class `name`.
fn file(f: &mut Fixture, imports: Vec<NodeId>, name: &str) -> NodeId {
    let class = f.declare_class(name, ClassKind::Class, &[]);
    let list = f.modifiers(&[]);
    let decl = f.class(list, name, ClassKind::Class, vec![]);
    f.resolve.bind_class(decl, class);
    f.file_with_imports(imports, vec![decl])
}

#[test]
fn conflicting_single_type_imports() {
    let mut f = Fixture::new("C.java");
    let first = import(&mut f, "java.util.List", false);
    let second = import(&mut f, "java.awt.List", false);
    let root = file(&mut f, vec![first, second], "C");
    let second_range = f.range(second);

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "import-conflict");
    assert_eq!(
        diagnostic.message,
        "'List' is already defined in a single-type import"
    );
    assert_eq!(diagnostic.range, second_range);
    assert_eq!(diagnostic.fix_names(), vec!["delete-element"]);
}

#[test]
fn repeated_identical_import_is_not_a_conflict() {
    let mut f = Fixture::new("C.java");
    let first = import(&mut f, "java.util.List", false);
    let second = import(&mut f, "java.util.List", false);
    let root = file(&mut f, vec![first, second], "C");
    let diagnostics = f.analyze(root);
    assert!(with_code(&diagnostics, "import-conflict").is_empty());
}

#[test]
fn import_shadowing_a_class_of_this_file() {
    let mut f = Fixture::new("List.java");
    let imported = import(&mut f, "java.util.List", false);
    let root = file(&mut f, vec![imported], "List");

    let diagnostics = f.analyze(root);
    assert_eq!(
        single(&diagnostics, "import-conflict").message,
        "'List' is already defined in this compilation unit"
    );
}

/// Static field `X` of a fresh class `owner`.
fn constant(f: &mut Fixture, owner: &str) -> nova_types::FieldId {
    let class = f.declare_class(owner, ClassKind::Class, &[]);
    f.store().add_field(FieldDef {
        name: "X".into(),
        owner: class,
        ty: Type::int(),
        modifiers: Modifiers::new(&[Modifier::Public, Modifier::Static, Modifier::Final]),
        is_enum_constant: false,
    })
}

#[test]
fn conflicting_static_field_imports() {
    let mut f = Fixture::new("C.java");
    let a = constant(&mut f, "p.A");
    let b = constant(&mut f, "p.B");
    let first = import(&mut f, "p.A.X", true);
    f.resolve.add_candidate(first, ResolveResult::new(Element::Field(a)));
    let second = import(&mut f, "p.B.X", true);
    f.resolve.add_candidate(second, ResolveResult::new(Element::Field(b)));
    let root = file(&mut f, vec![first, second], "C");
    let second_range = f.range(second);

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "import-conflict");
    assert_eq!(
        diagnostic.message,
        "'X' is already defined in a single-static-import"
    );
    assert_eq!(diagnostic.range, second_range);
}

#[test]
fn static_method_imports_may_share_a_name() {
    let mut f = Fixture::new("C.java");
    let a = f.declare_class("p.A", ClassKind::Class, &[]);
    let b = f.declare_class("p.B", ClassKind::Class, &[]);
    let on_a = f.declare_method(
        nova_types::MethodDef::new("max", a, vec![], Type::int()).with_modifiers(&[Modifier::Static]),
    );
    let on_b = f.declare_method(
        nova_types::MethodDef::new("max", b, vec![], Type::int()).with_modifiers(&[Modifier::Static]),
    );
    let first = import(&mut f, "p.A.max", true);
    f.resolve.add_candidate(first, ResolveResult::new(Element::Method(on_a)));
    let second = import(&mut f, "p.B.max", true);
    f.resolve.add_candidate(second, ResolveResult::new(Element::Method(on_b)));
    let root = file(&mut f, vec![first, second], "C");

    let diagnostics = f.analyze(root);
    assert!(with_code(&diagnostics, "import-conflict").is_empty());
}

#[test]
fn static_imports_need_java_5() {
    let mut f = Fixture::new("C.java").at_level(JavaLanguageLevel::JAVA_1_4);
    let a = constant(&mut f, "p.A");
    let imported = import(&mut f, "p.A.X", true);
    f.resolve.add_candidate(imported, ResolveResult::new(Element::Field(a)));
    let root = file(&mut f, vec![imported], "C");

    let diagnostics = f.analyze(root);
    assert_eq!(
        single(&diagnostics, "insufficient-language-level").message,
        "Static imports are not supported at language level '1.4'"
    );
}
