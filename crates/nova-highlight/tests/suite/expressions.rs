use nova_hir::{AssignOp, BinaryOp, LiteralKind, NodeId, NodeKind, UnaryOp};
use nova_resolve::{Element, ResolveResult};
use nova_types::{ClassKind, FieldDef, MethodDef, Modifier, Modifiers, PrimitiveType, Type};
use pretty_assertions::assert_eq;

use crate::suite::fixture::{single, with_code, Fixture};

/// `<ty> v = <init>;`
fn local_of(f: &mut Fixture, ty: &Type, init: NodeId) -> NodeId {
    let element = f.type_element(ty);
    f.local(&[], "v", element, Some(init))
}

#[test]
fn if_condition_must_be_boolean() {
    let mut f = Fixture::new("Test.java");
    let condition = f.int(1);
    let then_branch = f.block(vec![]);
    let stmt = f.node(NodeKind::If {
        condition,
        then_branch,
        else_branch: None,
    });
    let root = f.in_method(vec![stmt]);
    let range = f.range(condition);

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "incompatible-types");
    assert_eq!(
        diagnostic.message,
        "Incompatible types. Found: 'int', required: 'boolean'"
    );
    assert_eq!(diagnostic.range, range);
}

#[test]
fn binary_operator_on_mismatched_operands() {
    let mut f = Fixture::new("Test.java");
    let lhs = f.literal(LiteralKind::Boolean, "true");
    let rhs = f.int(1);
    let sum = f.expr(
        NodeKind::Binary {
            op: BinaryOp::Add,
            lhs,
            rhs,
        },
        Type::Unknown,
    );
    let stmt = local_of(&mut f, &Type::int(), sum);
    let root = f.in_method(vec![stmt]);
    let range = f.range(sum);

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "operator-not-applicable");
    assert_eq!(
        diagnostic.message,
        "Operator '+' cannot be applied to 'boolean', 'int'"
    );
    assert_eq!(diagnostic.range, range);
}

#[test]
fn string_concatenation_accepts_any_operand() {
    let mut f = Fixture::new("Test.java");
    let string = f.ty("java.lang.String");
    let lhs = f.literal(LiteralKind::String, "\"n = \"");
    let rhs = f.literal(LiteralKind::Boolean, "false");
    let sum = f.expr(
        NodeKind::Binary {
            op: BinaryOp::Add,
            lhs,
            rhs,
        },
        string.clone(),
    );
    let stmt = local_of(&mut f, &string, sum);
    let root = f.in_method(vec![stmt]);

    let diagnostics = f.analyze(root);
    assert!(diagnostics.is_empty(), "{diagnostics:#?}");
}

#[test]
fn logical_not_needs_a_boolean() {
    let mut f = Fixture::new("Test.java");
    let operand = f.int(1);
    let not = f.expr(
        NodeKind::Unary {
            op: UnaryOp::Not,
            operand,
        },
        Type::Unknown,
    );
    let stmt = local_of(&mut f, &Type::boolean(), not);
    let root = f.in_method(vec![stmt]);

    let diagnostics = f.analyze(root);
    assert_eq!(
        single(&diagnostics, "operator-not-applicable").message,
        "Operator '!' cannot be applied to 'int'"
    );
}

/// `String s = ""; s <op>= 1;`
fn compound_on_string(op: BinaryOp) -> Vec<nova_highlight::Diagnostic> {
    let mut f = Fixture::new("Test.java");
    let string = f.ty("java.lang.String");
    let empty = f.literal(LiteralKind::String, "\"\"");
    let element = f.type_element(&string);
    let s = f.local(&[], "s", element, Some(empty));
    let target = f.read(s, string.clone());
    let one = f.int(1);
    let assignment = f.expr(
        NodeKind::Assignment {
            op: AssignOp::Compound(op),
            lhs: target,
            rhs: one,
        },
        string,
    );
    let stmt = f.stmt(assignment);
    let root = f.in_method(vec![s, stmt]);
    f.analyze(root)
}

#[test]
fn compound_assignment_operators() {
    let diagnostics = compound_on_string(BinaryOp::Sub);
    assert_eq!(
        single(&diagnostics, "operator-not-applicable").message,
        "Operator '-=' cannot be applied to 'String', 'int'"
    );

    let diagnostics = compound_on_string(BinaryOp::Add);
    assert!(diagnostics.is_empty(), "{diagnostics:#?}");
}

#[test]
fn string_added_into_a_primitive_variable() {
    let mut f = Fixture::new("Test.java");
    let zero = f.int(0);
    let element = f.primitive(PrimitiveType::Int);
    let x = f.local(&[], "x", element, Some(zero));
    let target = f.read(x, Type::int());
    let text = f.literal(LiteralKind::String, "\"a\"");
    let assignment = f.expr(
        NodeKind::Assignment {
            op: AssignOp::Compound(BinaryOp::Add),
            lhs: target,
            rhs: text,
        },
        Type::int(),
    );
    let stmt = f.stmt(assignment);
    let root = f.in_method(vec![x, stmt]);
    let range = f.range(assignment);

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "incompatible-types");
    assert_eq!(
        diagnostic.message,
        "Incompatible types. Found: 'String', required: 'int'"
    );
    assert_eq!(diagnostic.range, range);
}

#[test]
fn cast_between_unrelated_types() {
    let mut f = Fixture::new("Test.java");
    let string = f.ty("java.lang.String");
    let operand = f.int(1);
    let ty = f.type_element(&string);
    let cast = f.expr(NodeKind::Cast { ty, expr: operand }, string.clone());
    let stmt = local_of(&mut f, &string, cast);
    let root = f.in_method(vec![stmt]);
    let range = f.range(cast);

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "inconvertible-types");
    assert_eq!(
        diagnostic.message,
        "Inconvertible types; cannot cast 'int' to 'String'"
    );
    assert_eq!(diagnostic.range, range);
}

/// `boolean v = <operand> instanceof <target>;`
fn instance_of(f: &mut Fixture, operand: NodeId, target: &Type) -> (NodeId, NodeId) {
    let ty = f.type_element(target);
    let test = f.expr(NodeKind::InstanceOf { expr: operand, ty }, Type::boolean());
    let stmt = local_of(f, &Type::boolean(), test);
    (stmt, ty)
}

#[test]
fn instanceof_with_unrelated_final_classes() {
    let mut f = Fixture::new("Test.java");
    let integer = f.ty("java.lang.Integer");
    let operand = f.literal(LiteralKind::String, "\"s\"");
    let (stmt, _) = instance_of(&mut f, operand, &integer);
    let root = f.in_method(vec![stmt]);

    let diagnostics = f.analyze(root);
    assert_eq!(
        single(&diagnostics, "inconvertible-types").message,
        "Inconvertible types; cannot cast 'String' to 'Integer'"
    );
}

#[test]
fn instanceof_needs_a_reifiable_type() {
    let mut f = Fixture::new("Test.java");
    let object = f.ty("java.lang.Object");
    let list_of_string = f.generic("java.util.List", vec![f.ty("java.lang.String")]);
    let null = f.literal(LiteralKind::Null, "null");
    let o = local_of(&mut f, &object, null);
    let operand = f.read(o, object);
    let (stmt, ty) = instance_of(&mut f, operand, &list_of_string);
    let root = f.in_method(vec![o, stmt]);
    let range = f.range(ty);

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "illegal-generic-instanceof");
    assert_eq!(diagnostic.message, "Illegal generic type for instanceof");
    assert_eq!(diagnostic.range, range);
}

#[test]
fn final_local_with_initializer_cannot_be_assigned() {
    let mut f = Fixture::new("Test.java");
    let int = f.primitive(PrimitiveType::Int);
    let one = f.int(1);
    let x = f.local(&[Modifier::Final], "x", int, Some(one));
    let NodeKind::LocalVariable { modifiers, .. } = f.kind(x).clone() else {
        unreachable!();
    };
    let target = f.read(x, Type::int());
    let two = f.int(2);
    let assignment = f.expr(
        NodeKind::Assignment {
            op: AssignOp::Assign,
            lhs: target,
            rhs: two,
        },
        Type::int(),
    );
    let stmt = f.stmt(assignment);
    let root = f.in_method(vec![x, stmt]);
    let range = f.range(target);
    let modifiers_range = f.range(modifiers);

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "assign-to-final");
    assert_eq!(diagnostic.message, "Cannot assign a value to final variable 'x'");
    assert_eq!(diagnostic.range, range);
    assert_eq!(diagnostic.fix_names(), vec!["remove-modifier"]);
    assert_eq!(diagnostic.fixes[0].range, modifiers_range);
}

#[test]
fn indexing_a_non_array() {
    let mut f = Fixture::new("Test.java");
    let int = f.primitive(PrimitiveType::Int);
    let zero = f.int(0);
    let i = f.local(&[], "i", int, Some(zero));
    let array = f.read(i, Type::int());
    let index = f.int(0);
    let access = f.expr(NodeKind::ArrayAccess { array, index }, Type::Unknown);
    let stmt = local_of(&mut f, &Type::int(), access);
    let root = f.in_method(vec![i, stmt]);

    let diagnostics = f.analyze(root);
    assert_eq!(
        single(&diagnostics, "array-type-expected").message,
        "Array type expected; found: 'int'"
    );
}

#[test]
fn thrown_value_must_be_throwable() {
    let mut f = Fixture::new("Test.java");
    let exception = f.literal(LiteralKind::String, "\"boom\"");
    let stmt = f.node(NodeKind::Throw { exception });
    let root = f.in_method(vec![stmt]);

    let diagnostics = f.analyze(root);
    assert_eq!(
        single(&diagnostics, "incompatible-types").message,
        "Incompatible types. Found: 'String', required: 'Throwable'"
    );
}

#[test]
fn synchronized_lock_must_be_a_reference() {
    let mut f = Fixture::new("Test.java");
    let lock = f.int(1);
    let body = f.block(vec![]);
    let stmt = f.node(NodeKind::Synchronized { lock, body });
    let root = f.in_method(vec![stmt]);

    let diagnostics = f.analyze(root);
    assert_eq!(
        single(&diagnostics, "incompatible-types").message,
        "Incompatible types. Found: 'int', required: 'reference'"
    );
}

/// `class Test { static void m() { <statements> } }`
fn in_static_method(f: &mut Fixture, statements: Vec<NodeId>) -> NodeId {
    let class = f.class_id("Test");
    let method = f.declare_method(
        MethodDef::new("m", class, vec![], Type::Void).with_modifiers(&[Modifier::Static]),
    );
    let body = f.block(statements);
    let list = f.modifiers(&[Modifier::Static]);
    let ret = f.type_element(&Type::Void);
    let decl = f.method(list, "m", Some(ret), vec![], Some(body));
    f.resolve.bind_method(decl, method);
    let class_list = f.modifiers(&[]);
    let class_decl = f.class(class_list, "Test", ClassKind::Class, vec![decl]);
    f.resolve.bind_class(class_decl, class);
    f.file(vec![class_decl])
}

#[test]
fn this_in_a_static_method() {
    let mut f = Fixture::new("Test.java");
    let class = f.declare_class("Test", ClassKind::Class, &[]);
    let this = f.expr(NodeKind::This { qualifier: None }, Type::class(class, vec![]));
    let object = f.ty("java.lang.Object");
    let stmt = local_of(&mut f, &object, this);
    let root = in_static_method(&mut f, vec![stmt]);
    let range = f.range(this);

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "static-context");
    assert_eq!(
        diagnostic.message,
        "'this' cannot be referenced from a static context"
    );
    assert_eq!(diagnostic.range, range);
}

#[test]
fn instance_field_read_from_a_static_method() {
    let mut f = Fixture::new("Test.java");
    let class = f.declare_class("Test", ClassKind::Class, &[]);
    let count = f.store().add_field(FieldDef {
        name: "count".into(),
        owner: class,
        ty: Type::int(),
        modifiers: Modifiers::new(&[]),
        is_enum_constant: false,
    });
    let read = f.reference("count", Type::int(), None);
    f.resolve.add_candidate(
        read,
        ResolveResult::new(Element::Field(count)).wrong_static_context(),
    );
    let stmt = local_of(&mut f, &Type::int(), read);
    let root = in_static_method(&mut f, vec![stmt]);
    let range = f.name_range(read);

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "static-context");
    assert_eq!(
        diagnostic.message,
        "Non-static field 'count' cannot be referenced from a static context"
    );
    assert_eq!(diagnostic.range, range);
}

/// `int v = <literal>;`, the literal optionally negated.
fn int_literal(text: &str, kind: LiteralKind, negated: bool) -> Vec<nova_highlight::Diagnostic> {
    let mut f = Fixture::new("Test.java");
    let literal = f.literal(kind, text);
    let ty = match kind {
        LiteralKind::Long => Type::Primitive(PrimitiveType::Long),
        _ => Type::int(),
    };
    let init = if negated {
        f.expr(
            NodeKind::Unary {
                op: UnaryOp::Minus,
                operand: literal,
            },
            ty.clone(),
        )
    } else {
        literal
    };
    let stmt = local_of(&mut f, &ty, init);
    let root = f.in_method(vec![stmt]);
    f.analyze(root)
}

#[test]
fn integer_literal_ranges() {
    let diagnostics = int_literal("2147483648", LiteralKind::Int, false);
    assert_eq!(
        single(&diagnostics, "number-too-large").message,
        "Integer number too large"
    );

    assert!(int_literal("2147483648", LiteralKind::Int, true).is_empty());
    assert!(int_literal("0xFFFFFFFF", LiteralKind::Int, false).is_empty());

    let diagnostics = int_literal("9223372036854775808L", LiteralKind::Long, false);
    assert_eq!(
        single(&diagnostics, "number-too-large").message,
        "Long number too large"
    );
}

#[test]
fn abstract_method_called_through_super() {
    let mut f = Fixture::new("Test.java");
    let base = f.declare_class("Base", ClassKind::Class, &[Modifier::Abstract]);
    let work = f.declare_method(
        MethodDef::new("work", base, vec![], Type::Void).with_modifiers(&[Modifier::Abstract]),
    );
    let base_ty = Type::class(base, vec![]);

    let sup = f.expr(NodeKind::Super { qualifier: None }, base_ty.clone());
    let name_range = f.fresh_range(4);
    let method = f.expr(
        NodeKind::Reference {
            qualifier: Some(sup),
            name: "work".into(),
            name_range,
            type_args: vec![],
        },
        Type::Unknown,
    );
    f.resolve
        .add_candidate(method, ResolveResult::new(Element::Method(work)));
    let args = f.args(vec![]);
    let call = f.expr(NodeKind::MethodCall { method, args }, Type::Void);
    let stmt = f.stmt(call);
    let root = f.in_method(vec![stmt]);
    let test = f.class_id("Test");
    f.store().class_mut(test).unwrap().super_class = Some(base_ty);
    let range = f.range(call);

    let diagnostics = f.analyze(root);
    let diagnostic = single(&diagnostics, "abstract-super-call");
    assert_eq!(
        diagnostic.message,
        "Abstract method 'work()' in 'Base' cannot be accessed directly"
    );
    assert_eq!(diagnostic.range, range);
    assert!(with_code(&diagnostics, "cannot-resolve-method").is_empty());
}
