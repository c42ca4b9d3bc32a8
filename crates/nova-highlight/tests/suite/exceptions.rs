use nova_hir::{LiteralKind, NodeId, NodeKind};
use nova_types::{ClassKind, MethodDef, Modifier, Type};
use pretty_assertions::assert_eq;

use crate::suite::fixture::{single, with_code, Fixture};

/// `catch (<caught> <name>) { <handler> }`, returning the section and its parameter.
fn catch(f: &mut Fixture, caught: &Type, name: &str, handler: Vec<NodeId>) -> (NodeId, NodeId) {
    let ty = f.type_element(caught);
    let param = f.param(name, ty);
    let block = f.block(handler);
    let section = f.node(NodeKind::CatchSection { param, block });
    (section, param)
}

/// `try (<resources>) { } <catches>` where the block throws `thrown`.
fn try_stmt(f: &mut Fixture, resources: Vec<NodeId>, thrown: Vec<Type>, catches: Vec<NodeId>) -> NodeId {
    let block = f.block(vec![]);
    f.flow.set_thrown(block, thrown);
    f.node(NodeKind::Try {
        resources,
        block,
        catches,
        finally: None,
    })
}

/// `<ty> r = null` as a try-with-resources entry.
fn resource(f: &mut Fixture, ty: &Type) -> NodeId {
    let element = f.type_element(ty);
    let null = f.literal(LiteralKind::Null, "null");
    f.local(&[], "r", element, Some(null))
}

/// An `AutoCloseable` whose `close()` declares nothing.
fn quiet_resource_type(f: &mut Fixture) -> Type {
    let class = f.declare_class("Res", ClassKind::Class, &[]);
    let auto_closeable = f.ty("java.lang.AutoCloseable");
    if let Some(def) = f.store().class_mut(class) {
        def.interfaces.push(auto_closeable);
    }
    f.declare_method(MethodDef::new("close", class, vec![], Type::Void).with_modifiers(&[Modifier::Public]));
    Type::class(class, vec![])
}

#[test]
fn close_of_a_closeable_resource_reaches_the_catch() {
    let mut f = Fixture::new("Test.java");
    let closeable = f.ty("java.io.Closeable");
    let io = f.ty("java.io.IOException");
    let res = resource(&mut f, &closeable);
    let (section, _) = catch(&mut f, &io, "e", vec![]);
    let stmt = try_stmt(&mut f, vec![res], vec![], vec![section]);
    let root = f.in_method(vec![stmt]);

    let diagnostics = f.analyze(root);
    assert!(diagnostics.is_empty(), "{diagnostics:#?}");
}

#[test]
fn resource_initializer_exceptions_reach_the_catch() {
    let mut f = Fixture::new("Test.java");
    let res_ty = quiet_resource_type(&mut f);
    let io = f.ty("java.io.IOException");
    let res = resource(&mut f, &res_ty);
    f.flow.set_thrown(res, vec![io.clone()]);
    let (section, _) = catch(&mut f, &io, "e", vec![]);
    let stmt = try_stmt(&mut f, vec![res], vec![], vec![section]);
    let root = f.in_method(vec![stmt]);

    let diagnostics = f.analyze(root);
    assert!(diagnostics.is_empty(), "{diagnostics:#?}");
}

#[test]
fn quiet_resource_leaves_the_catch_unreachable() {
    let mut f = Fixture::new("Test.java");
    let res_ty = quiet_resource_type(&mut f);
    let io = f.ty("java.io.IOException");
    let res = resource(&mut f, &res_ty);
    let (section, param) = catch(&mut f, &io, "e", vec![]);
    let stmt = try_stmt(&mut f, vec![res], vec![], vec![section]);
    let root = f.in_method(vec![stmt]);
    let range = f.range(param);

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "exception-never-thrown");
    assert_eq!(
        diagnostic.message,
        "Exception 'java.io.IOException' is never thrown in body of corresponding try statement"
    );
    assert_eq!(diagnostic.range, range);
    assert_eq!(diagnostic.fix_names(), vec!["delete-catch"]);
}

#[test]
fn section_after_a_narrower_catch_of_everything_thrown_is_unreachable() {
    let mut f = Fixture::new("Test.java");
    let not_found = f.ty("java.io.FileNotFoundException");
    let io = f.ty("java.io.IOException");
    let (first, _) = catch(&mut f, &not_found, "e", vec![]);
    let (second, _) = catch(&mut f, &io, "ex", vec![]);
    let stmt = try_stmt(&mut f, vec![], vec![not_found], vec![first, second]);
    let root = f.in_method(vec![stmt]);
    let range = f.range(second);

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "exception-already-caught-warning");
    assert_eq!(
        diagnostic.message,
        "Unreachable section: exception 'java.io.FileNotFoundException' has already been caught"
    );
    assert_eq!(diagnostic.range, range);
    assert_eq!(diagnostic.fix_names(), vec!["delete-catch"]);
}

#[test]
fn rethrown_exception_after_a_narrow_catch_is_not_flagged() {
    let mut f = Fixture::new("Test.java");
    let not_found = f.ty("java.io.FileNotFoundException");
    let exception = f.ty("java.lang.Exception");
    let (first, _) = catch(&mut f, &not_found, "e", vec![]);

    let ty = f.type_element(&exception);
    let param = f.param("ex", ty);
    let rethrown = f.read(param, exception);
    let throw = f.node(NodeKind::Throw { exception: rethrown });
    let block = f.block(vec![throw]);
    let second = f.node(NodeKind::CatchSection { param, block });

    let stmt = try_stmt(&mut f, vec![], vec![not_found], vec![first, second]);
    let root = f.in_method(vec![stmt]);

    let diagnostics = f.analyze(root);
    assert!(diagnostics.is_empty(), "{diagnostics:#?}");
}

#[test]
fn runtime_exceptions_keep_a_broad_unchecked_catch_reachable() {
    let mut f = Fixture::new("Test.java");
    let illegal_state = f.ty("java.lang.IllegalStateException");
    let runtime = f.ty("java.lang.RuntimeException");
    let (first, _) = catch(&mut f, &illegal_state, "e", vec![]);
    let (second, _) = catch(&mut f, &runtime, "ex", vec![]);
    let stmt = try_stmt(&mut f, vec![], vec![illegal_state], vec![first, second]);
    let root = f.in_method(vec![stmt]);

    let diagnostics = f.analyze(root);
    assert!(diagnostics.is_empty(), "{diagnostics:#?}");
}

#[test]
fn only_the_covered_multi_catch_alternative_is_unreachable() {
    let mut f = Fixture::new("Test.java");
    let not_found = f.ty("java.io.FileNotFoundException");
    let io = f.ty("java.io.IOException");
    let illegal_state = f.ty("java.lang.IllegalStateException");
    let (first, _) = catch(&mut f, &not_found, "e", vec![]);
    let (second, _) = catch(&mut f, &Type::Disjunction(vec![io, illegal_state]), "ex", vec![]);
    let stmt = try_stmt(&mut f, vec![], vec![not_found], vec![first, second]);
    let root = f.in_method(vec![stmt]);

    let diagnostics = f.analyze(root);
    let warnings = with_code(&diagnostics, "exception-already-caught-warning");
    assert_eq!(warnings.len(), 1, "{diagnostics:#?}");
    assert_eq!(
        warnings[0].message,
        "Unreachable section: exception 'java.io.FileNotFoundException' has already been caught"
    );
    assert_eq!(warnings[0].fix_names(), vec!["delete-multi-catch-alternative"]);
}
