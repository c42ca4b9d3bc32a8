//! Expression typing: conditions, operators, casts, literals and `this`/`super`.

use nova_core::JavaFeature;
use nova_hir::{AssignOp, BinaryOp, LiteralKind, NodeId, NodeKind, UnaryOp};
use nova_resolve::Element;
use nova_types::{
    as_primitive, format_method, is_convertible, is_enum, is_reifiable, is_throwable,
    presentable_type, ClassKind, Modifier, PrimitiveType, Substitution, Type, TypeEnv,
};

use crate::context::{CheckResult, RuleContext};
use crate::diagnostic::Severity;
use crate::rules::features::check_feature;
use crate::rules::references::field_declaration;
use crate::rules::{class_name, incompatible_types, is_expr_assignable};
use crate::{Diagnostic, Fix};

fn parent<'a>(rc: &RuleContext<'a>, expr: NodeId) -> Option<(NodeId, &'a NodeKind)> {
    let p = rc.ast.parent(expr)?;
    Some((p, rc.kind(p)))
}

fn is_boolean(env: &dyn TypeEnv, ty: &Type) -> bool {
    as_primitive(env, ty) == Some(PrimitiveType::Boolean)
}

/// `boolean` required at `expr`; `Unknown` passes.
fn require_boolean(rc: &RuleContext<'_>, expr: NodeId) -> CheckResult<Option<Diagnostic>> {
    let found = rc.expr_type(expr)?;
    if found.contains_unknown() || is_boolean(rc.env(), &found) {
        return Ok(None);
    }
    Ok(Some(
        incompatible_types(rc, rc.range(expr), &Type::boolean(), &found).build(),
    ))
}

/// Conditions of `if`, `while`, `do` and `for`.
pub(crate) fn must_be_boolean(rc: &RuleContext<'_>, expr: NodeId) -> CheckResult<Option<Diagnostic>> {
    let is_condition = match parent(rc, expr) {
        Some((_, NodeKind::If { condition, .. }))
        | Some((_, NodeKind::While { condition, .. }))
        | Some((_, NodeKind::DoWhile { condition, .. })) => *condition == expr,
        Some((_, NodeKind::For { condition, .. })) => *condition == Some(expr),
        _ => false,
    };
    if !is_condition {
        return Ok(None);
    }
    require_boolean(rc, expr)
}

pub(crate) fn array_access(rc: &RuleContext<'_>, expr: NodeId) -> CheckResult<Option<Diagnostic>> {
    let NodeKind::ArrayAccess { array, .. } = rc.kind(expr) else {
        return Ok(None);
    };
    let ty = rc.expr_type(*array)?;
    if ty.contains_unknown() || matches!(ty, Type::Array(_)) {
        return Ok(None);
    }
    Ok(Some(Diagnostic::error(
        "array-type-expected",
        rc.range(*array),
        format!(
            "Array type expected; found: '{}'",
            presentable_type(rc.env(), &ty)
        ),
    )))
}

/// Dimension expressions and array indexes promote to `int`.
pub(crate) fn array_dimension_int(rc: &RuleContext<'_>, expr: NodeId) -> CheckResult<Option<Diagnostic>> {
    let is_index = match parent(rc, expr) {
        Some((_, NodeKind::New { dims, .. })) => dims.contains(&expr),
        Some((_, NodeKind::ArrayAccess { index, .. })) => *index == expr,
        _ => false,
    };
    if !is_index {
        return Ok(None);
    }
    let found = rc.expr_type(expr)?;
    let promotes = matches!(
        as_primitive(rc.env(), &found),
        Some(PrimitiveType::Byte | PrimitiveType::Short | PrimitiveType::Char | PrimitiveType::Int)
    );
    if found.contains_unknown() || promotes {
        return Ok(None);
    }
    Ok(Some(
        incompatible_types(rc, rc.range(expr), &Type::int(), &found).build(),
    ))
}

/// The expression is the target of an assignment or an increment.
fn is_written(rc: &RuleContext<'_>, expr: NodeId) -> bool {
    rc.ast.parent_skipping_parens(expr).is_some_and(|p| match rc.kind(p) {
        NodeKind::Assignment { lhs, .. } => rc.ast.skip_parens(*lhs) == expr,
        NodeKind::Unary { op, .. } => op.is_increment(),
        _ => false,
    })
}

/// Code inside a constructor or initializer of `class_decl` itself.
fn in_own_initialization(rc: &RuleContext<'_>, expr: NodeId, class_decl: NodeId, is_static: bool) -> bool {
    if rc.ast.enclosing_class(expr) != Some(class_decl) {
        return false;
    }
    match rc.ast.enclosing_code_owner(expr).map(|o| rc.kind(o)) {
        Some(NodeKind::Method { return_type: None, .. }) => !is_static,
        Some(NodeKind::Initializer { modifiers, .. }) => {
            rc.has_modifier(*modifiers, Modifier::Static) == is_static
        }
        _ => false,
    }
}

pub(crate) fn cannot_write_final(rc: &RuleContext<'_>, expr: NodeId) -> CheckResult<Option<Diagnostic>> {
    if !matches!(rc.kind(expr), NodeKind::Reference { .. }) || !is_written(rc, expr) {
        return Ok(None);
    }
    let Some(result) = rc.resolve(expr)? else {
        return Ok(None);
    };
    let name = rc.ast.name(expr).map(|n| n.to_string()).unwrap_or_default();
    let (decl, illegal) = match result.element {
        Element::Variable(decl) => {
            let (modifiers, has_initializer) = match rc.kind(decl) {
                NodeKind::LocalVariable {
                    modifiers,
                    initializer,
                    ..
                } => (*modifiers, initializer.is_some()),
                NodeKind::Parameter { modifiers, .. } => (*modifiers, true),
                _ => return Ok(None),
            };
            (
                Some(decl),
                rc.has_modifier(modifiers, Modifier::Final) && has_initializer,
            )
        }
        Element::Field(field) => {
            let Some(def) = rc.env().field(field) else {
                return Ok(None);
            };
            if !def.is_final() {
                return Ok(None);
            }
            let class_decl = rc.resolver.class_declaration(def.owner);
            let decl = class_decl.and_then(|c| field_declaration(rc, c, field));
            let blank = decl.is_some_and(|d| {
                matches!(
                    rc.kind(d),
                    NodeKind::Field {
                        initializer: None,
                        ..
                    }
                )
            });
            let qualified_elsewhere = matches!(
                rc.kind(expr),
                NodeKind::Reference { qualifier: Some(q), .. }
                    if !matches!(rc.kind(*q), NodeKind::This { qualifier: None })
            );
            let allowed = blank
                && !qualified_elsewhere
                && class_decl.is_some_and(|c| in_own_initialization(rc, expr, c, def.is_static()));
            (decl, !allowed)
        }
        _ => return Ok(None),
    };
    if !illegal {
        return Ok(None);
    }
    let mut builder = Diagnostic::builder(Severity::Error, "assign-to-final", rc.range(expr))
        .message(format!("Cannot assign a value to final variable '{name}'"));
    if let Some(list) = decl.and_then(|d| rc.kind(d).modifier_list()) {
        builder = builder.fix_with_range(
            Fix::RemoveModifier {
                modifier: Modifier::Final,
            },
            rc.range(list),
        );
    }
    Ok(Some(builder.build()))
}

pub(crate) fn variable_expected(rc: &RuleContext<'_>, expr: NodeId) -> CheckResult<Option<Diagnostic>> {
    if !is_written(rc, expr) {
        return Ok(None);
    }
    let is_variable = match rc.kind(expr) {
        NodeKind::ArrayAccess { .. } => true,
        NodeKind::Reference { .. } => match rc.multi_resolve(expr)?.first() {
            Some(r) => matches!(r.element, Element::Variable(_) | Element::Field(_)),
            None => true,
        },
        NodeKind::Parenthesized { .. } => true,
        _ => false,
    };
    Ok((!is_variable).then(|| {
        Diagnostic::error("variable-expected", rc.range(expr), "Variable expected")
    }))
}

/// Array type an array initializer must produce, from its declaration,
/// `new T[]{...}` or enclosing initializer.
fn array_init_target(rc: &RuleContext<'_>, init: NodeId) -> CheckResult<Option<Type>> {
    let Some((p, kind)) = parent(rc, init) else {
        return Ok(None);
    };
    match kind {
        NodeKind::LocalVariable { ty, .. } | NodeKind::Field { ty, .. } => Ok(Some(rc.type_of(*ty)?)),
        NodeKind::New { .. } => Ok(Some(rc.expr_type(p)?)),
        NodeKind::ArrayInit { .. } => Ok(array_init_target(rc, p)?.map(|outer| match outer {
            Type::Array(component) => *component,
            _ => Type::Unknown,
        })),
        _ => Ok(None),
    }
}

pub(crate) fn array_initializer_elements(rc: &RuleContext<'_>, expr: NodeId) -> CheckResult<Vec<Diagnostic>> {
    let NodeKind::ArrayInit { elements } = rc.kind(expr) else {
        return Ok(Vec::new());
    };
    let Some(target) = array_init_target(rc, expr)? else {
        return Ok(Vec::new());
    };
    if target.contains_unknown() {
        return Ok(Vec::new());
    }
    let Type::Array(component) = &target else {
        return Ok(vec![Diagnostic::error(
            "illegal-initializer",
            rc.range(expr),
            format!(
                "Illegal initializer for '{}'",
                presentable_type(rc.env(), &target)
            ),
        )]);
    };
    let mut out = Vec::new();
    for element in elements {
        if matches!(rc.kind(*element), NodeKind::ArrayInit { .. }) {
            continue;
        }
        let (ok, found) = is_expr_assignable(rc, component, *element)?;
        if !ok {
            out.push(incompatible_types(rc, rc.range(*element), component, &found).build());
        }
    }
    Ok(out)
}

pub(crate) fn ternary_condition(rc: &RuleContext<'_>, expr: NodeId) -> CheckResult<Option<Diagnostic>> {
    match parent(rc, expr) {
        Some((_, NodeKind::Conditional { condition, .. })) if *condition == expr => {
            require_boolean(rc, expr)
        }
        _ => Ok(None),
    }
}

fn void_not_allowed(rc: &RuleContext<'_>, expr: NodeId) -> CheckResult<Option<Diagnostic>> {
    Ok(matches!(rc.expr_type(expr)?, Type::Void).then(|| {
        Diagnostic::error(
            "void-not-allowed",
            rc.range(expr),
            "'void' type not allowed here",
        )
    }))
}

pub(crate) fn assert_types(rc: &RuleContext<'_>, expr: NodeId) -> CheckResult<Option<Diagnostic>> {
    match parent(rc, expr) {
        Some((_, NodeKind::Assert { condition, .. })) if *condition == expr => {
            require_boolean(rc, expr)
        }
        Some((_, NodeKind::Assert { message, .. })) if *message == Some(expr) => {
            void_not_allowed(rc, expr)
        }
        _ => Ok(None),
    }
}

pub(crate) fn synchronized_type(rc: &RuleContext<'_>, expr: NodeId) -> CheckResult<Option<Diagnostic>> {
    let is_lock = matches!(parent(rc, expr), Some((_, NodeKind::Synchronized { lock, .. })) if *lock == expr);
    if !is_lock {
        return Ok(None);
    }
    let found = rc.expr_type(expr)?;
    if !found.is_primitive() && !matches!(found, Type::Null) {
        return Ok(None);
    }
    Ok(Some(Diagnostic::error(
        "incompatible-types",
        rc.range(expr),
        format!(
            "Incompatible types. Found: '{}', required: 'reference'",
            presentable_type(rc.env(), &found)
        ),
    )))
}

pub(crate) fn conditional_branch(rc: &RuleContext<'_>, expr: NodeId) -> CheckResult<Option<Diagnostic>> {
    match parent(rc, expr) {
        Some((_, NodeKind::Conditional {
            then_expr,
            else_expr,
            ..
        })) if *then_expr == expr || *else_expr == expr => void_not_allowed(rc, expr),
        _ => Ok(None),
    }
}

pub(crate) fn must_be_throwable(rc: &RuleContext<'_>, expr: NodeId) -> CheckResult<Option<Diagnostic>> {
    if !matches!(parent(rc, expr), Some((_, NodeKind::Throw { .. }))) {
        return Ok(None);
    }
    let env = rc.env();
    let found = rc.expr_type(expr)?;
    if found.contains_unknown() || matches!(found, Type::Null) || is_throwable(env, &found) {
        return Ok(None);
    }
    let required = Type::class(env.well_known().throwable, Vec::new());
    Ok(Some(
        incompatible_types(rc, rc.range(expr), &required, &found).build(),
    ))
}

/// Selector type of the switch owning a case label.
pub(crate) fn switch_selector_type(rc: &RuleContext<'_>, label: NodeId) -> CheckResult<Option<Type>> {
    for a in rc.ast.ancestors(label) {
        if let NodeKind::Switch { selector, .. } = rc.kind(a) {
            return Ok(Some(rc.expr_type(*selector)?));
        }
    }
    Ok(None)
}

pub(crate) fn constant_required(rc: &RuleContext<'_>, expr: NodeId) -> CheckResult<Option<Diagnostic>> {
    let Some((label, NodeKind::SwitchLabel { .. })) = parent(rc, expr) else {
        return Ok(None);
    };
    let selector = switch_selector_type(rc, label)?;
    if selector.as_ref().is_some_and(|s| is_enum(rc.env(), s)) {
        return Ok(None);
    }
    if rc.constant(expr)?.is_some() || rc.expr_type(expr)?.contains_unknown() {
        return Ok(None);
    }
    Ok(Some(Diagnostic::error(
        "constant-expression-required",
        rc.range(expr),
        "Constant expression required",
    )))
}

pub(crate) fn assignment_compatible(rc: &RuleContext<'_>, expr: NodeId) -> CheckResult<Option<Diagnostic>> {
    let NodeKind::Assignment {
        op: AssignOp::Assign,
        lhs,
        rhs,
    } = rc.kind(expr)
    else {
        return Ok(None);
    };
    if matches!(rc.kind(*rhs), NodeKind::ArrayInit { .. }) {
        return Ok(None);
    }
    let target = rc.expr_type(*lhs)?;
    let (ok, found) = is_expr_assignable(rc, &target, *rhs)?;
    if ok {
        return Ok(None);
    }
    let env = rc.env();
    let mut builder = incompatible_types(rc, rc.range(*rhs), &target, &found);
    if is_convertible(env, &target, &found) {
        builder = builder.fix(Fix::AddTypeCast {
            ty: presentable_type(env, &target),
        });
    }
    Ok(Some(builder.build()))
}

fn is_string(env: &dyn TypeEnv, ty: &Type) -> bool {
    ty.class_id() == Some(env.well_known().string)
}

/// JLS 15.17 to 15.24 operand rules.
fn binary_applicable(env: &dyn TypeEnv, op: BinaryOp, lhs: &Type, rhs: &Type) -> bool {
    let l = as_primitive(env, lhs);
    let r = as_primitive(env, rhs);
    let numeric = |p: Option<PrimitiveType>| p.is_some_and(|p| p.is_numeric());
    let integral = |p: Option<PrimitiveType>| p.is_some_and(|p| p.is_integral());
    let boolean = |p: Option<PrimitiveType>| p == Some(PrimitiveType::Boolean);
    match op {
        BinaryOp::Add => {
            is_string(env, lhs) || is_string(env, rhs) || (numeric(l) && numeric(r))
        }
        BinaryOp::Sub
        | BinaryOp::Mul
        | BinaryOp::Div
        | BinaryOp::Rem
        | BinaryOp::Lt
        | BinaryOp::Gt
        | BinaryOp::Le
        | BinaryOp::Ge => numeric(l) && numeric(r),
        BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => integral(l) && integral(r),
        BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor => {
            (integral(l) && integral(r)) || (boolean(l) && boolean(r))
        }
        BinaryOp::And | BinaryOp::Or => boolean(l) && boolean(r),
        BinaryOp::Eq | BinaryOp::Ne => {
            if lhs.is_primitive() || rhs.is_primitive() {
                (numeric(l) && numeric(r)) || (boolean(l) && boolean(r))
            } else {
                is_convertible(env, lhs, rhs) || is_convertible(env, rhs, lhs)
            }
        }
    }
}

fn operator_error(rc: &RuleContext<'_>, expr: NodeId, op: &str, operands: &[&Type]) -> Diagnostic {
    let env = rc.env();
    let rendered: Vec<String> = operands
        .iter()
        .map(|t| format!("'{}'", presentable_type(env, t)))
        .collect();
    Diagnostic::error(
        "operator-not-applicable",
        rc.range(expr),
        format!("Operator '{op}' cannot be applied to {}", rendered.join(", ")),
    )
}

pub(crate) fn compound_operator(rc: &RuleContext<'_>, expr: NodeId) -> CheckResult<Option<Diagnostic>> {
    let NodeKind::Assignment {
        op: AssignOp::Compound(op),
        lhs,
        rhs,
    } = rc.kind(expr)
    else {
        return Ok(None);
    };
    let l = rc.expr_type(*lhs)?;
    let r = rc.expr_type(*rhs)?;
    if l.contains_unknown() || r.contains_unknown() {
        return Ok(None);
    }
    // `s += x` only needs the left side to be a String.
    if *op == BinaryOp::Add && is_string(rc.env(), &l) {
        return Ok(None);
    }
    if !binary_applicable(rc.env(), *op, &l, &r) {
        return Ok(Some(operator_error(rc, expr, &format!("{}=", op.text()), &[&l, &r])));
    }
    // `x += s` yields a String that must convert back to the type of `x`.
    if *op == BinaryOp::Add && is_string(rc.env(), &r) && !is_convertible(rc.env(), &l, &r) {
        return Ok(Some(incompatible_types(rc, rc.range(expr), &l, &r).build()));
    }
    Ok(None)
}

pub(crate) fn binary_operator(rc: &RuleContext<'_>, expr: NodeId) -> CheckResult<Option<Diagnostic>> {
    let NodeKind::Binary { op, lhs, rhs } = rc.kind(expr) else {
        return Ok(None);
    };
    let l = rc.expr_type(*lhs)?;
    let r = rc.expr_type(*rhs)?;
    if l.contains_unknown() || r.contains_unknown() || binary_applicable(rc.env(), *op, &l, &r) {
        return Ok(None);
    }
    Ok(Some(operator_error(rc, expr, op.text(), &[&l, &r])))
}

pub(crate) fn unary_operator(rc: &RuleContext<'_>, expr: NodeId) -> CheckResult<Option<Diagnostic>> {
    let NodeKind::Unary { op, operand } = rc.kind(expr) else {
        return Ok(None);
    };
    let ty = rc.expr_type(*operand)?;
    if ty.contains_unknown() {
        return Ok(None);
    }
    let p = as_primitive(rc.env(), &ty);
    let ok = match op {
        UnaryOp::Not => p == Some(PrimitiveType::Boolean),
        UnaryOp::BitNot => p.is_some_and(|p| p.is_integral()),
        _ => p.is_some_and(|p| p.is_numeric()),
    };
    Ok((!ok).then(|| operator_error(rc, expr, op.text(), &[&ty])))
}

fn inconvertible(rc: &RuleContext<'_>, range: nova_core::TextRange, source: &Type, target: &Type) -> Diagnostic {
    let env = rc.env();
    Diagnostic::error(
        "inconvertible-types",
        range,
        format!(
            "Inconvertible types; cannot cast '{}' to '{}'",
            presentable_type(env, source),
            presentable_type(env, target)
        ),
    )
}

pub(crate) fn instanceof_convertible(rc: &RuleContext<'_>, expr: NodeId) -> CheckResult<Option<Diagnostic>> {
    let NodeKind::InstanceOf { expr: operand, ty } = rc.kind(expr) else {
        return Ok(None);
    };
    let source = rc.expr_type(*operand)?;
    let target = rc.type_of(*ty)?;
    if source.contains_unknown() || target.contains_unknown() {
        return Ok(None);
    }
    if source.is_primitive() || !is_convertible(rc.env(), &target, &source) {
        return Ok(Some(inconvertible(rc, rc.range(expr), &source, &target)));
    }
    Ok(None)
}

pub(crate) fn instanceof_reifiable(rc: &RuleContext<'_>, expr: NodeId) -> CheckResult<Option<Diagnostic>> {
    let NodeKind::InstanceOf { ty, .. } = rc.kind(expr) else {
        return Ok(None);
    };
    let target = rc.type_of(*ty)?;
    if target.contains_unknown() || is_reifiable(rc.env(), &target) {
        return Ok(None);
    }
    Ok(Some(Diagnostic::error(
        "illegal-generic-instanceof",
        rc.range(*ty),
        "Illegal generic type for instanceof",
    )))
}

pub(crate) fn cast_convertible(rc: &RuleContext<'_>, expr: NodeId) -> CheckResult<Option<Diagnostic>> {
    let NodeKind::Cast { ty, expr: operand } = rc.kind(expr) else {
        return Ok(None);
    };
    let source = rc.expr_type(*operand)?;
    let target = rc.type_of(*ty)?;
    if source.contains_unknown() || target.contains_unknown() || is_convertible(rc.env(), &target, &source) {
        return Ok(None);
    }
    Ok(Some(inconvertible(rc, rc.range(expr), &source, &target)))
}

/// Digits and radix of an integer literal with the suffix and underscores removed.
fn split_integer(text: &str) -> (u32, String) {
    let text = text.trim_end_matches(['l', 'L']);
    let (radix, digits) = if let Some(rest) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        (16, rest)
    } else if let Some(rest) = text.strip_prefix("0b").or_else(|| text.strip_prefix("0B")) {
        (2, rest)
    } else if text.len() > 1 && text.starts_with('0') {
        (8, &text[1..])
    } else {
        (10, text)
    };
    (radix, digits.chars().filter(|c| *c != '_').collect())
}

fn under_unary_minus(rc: &RuleContext<'_>, literal: NodeId) -> bool {
    rc.ast.parent_skipping_parens(literal).is_some_and(|p| {
        matches!(
            rc.kind(p),
            NodeKind::Unary {
                op: UnaryOp::Minus,
                ..
            }
        )
    })
}

pub(crate) fn number_range(rc: &RuleContext<'_>, expr: NodeId) -> CheckResult<Option<Diagnostic>> {
    let NodeKind::Literal { kind, text } = rc.kind(expr) else {
        return Ok(None);
    };
    let (limit, unsigned_limit, message) = match kind {
        LiteralKind::Int => (
            i32::MAX as u128,
            u32::MAX as u128,
            "Integer number too large",
        ),
        LiteralKind::Long => (i64::MAX as u128, u64::MAX as u128, "Long number too large"),
        _ => return Ok(None),
    };
    let (radix, digits) = split_integer(text);
    if digits.is_empty() {
        return Ok(None);
    }
    let fits = match u128::from_str_radix(&digits, radix) {
        Ok(value) if radix == 10 => {
            value <= limit || (value == limit + 1 && under_unary_minus(rc, expr))
        }
        Ok(value) => value <= unsigned_limit,
        Err(_) => false,
    };
    Ok((!fits).then(|| Diagnostic::error("number-too-large", rc.range(expr), message)))
}

/// Binary literals, underscores and hexadecimal floating point literals.
pub(crate) fn literal_features(rc: &RuleContext<'_>, expr: NodeId) -> CheckResult<Option<Diagnostic>> {
    let NodeKind::Literal { kind, text } = rc.kind(expr) else {
        return Ok(None);
    };
    let lower = text.to_ascii_lowercase();
    let range = rc.range(expr);
    let numeric = matches!(
        kind,
        LiteralKind::Int | LiteralKind::Long | LiteralKind::Float | LiteralKind::Double
    );
    if !numeric {
        return Ok(None);
    }
    if matches!(kind, LiteralKind::Int | LiteralKind::Long) && lower.starts_with("0b") {
        if let Some(d) = check_feature(rc, JavaFeature::BinaryLiterals, range) {
            return Ok(Some(d));
        }
    }
    if lower.contains('_') {
        if let Some(d) = check_feature(rc, JavaFeature::UnderscoresInLiterals, range) {
            return Ok(Some(d));
        }
    }
    if matches!(kind, LiteralKind::Float | LiteralKind::Double) && lower.starts_with("0x") {
        return Ok(check_feature(rc, JavaFeature::HexFloatingPointLiterals, range));
    }
    Ok(None)
}

fn this_keyword(rc: &RuleContext<'_>, expr: NodeId) -> Option<String> {
    let (keyword, qualifier) = match rc.kind(expr) {
        NodeKind::This { qualifier } => ("this", qualifier),
        NodeKind::Super { qualifier } => ("super", qualifier),
        _ => return None,
    };
    Some(match qualifier.and_then(|q| rc.ast.name(q)) {
        Some(outer) => format!("{outer}.{keyword}"),
        None => keyword.to_string(),
    })
}

fn is_explicit_constructor_call_name(rc: &RuleContext<'_>, expr: NodeId) -> bool {
    rc.ast.parent(expr).is_some_and(|p| {
        matches!(rc.kind(p), NodeKind::MethodCall { method, .. } if *method == expr)
    })
}

pub(crate) fn this_in_static_context(rc: &RuleContext<'_>, expr: NodeId) -> CheckResult<Option<Diagnostic>> {
    let Some(keyword) = this_keyword(rc, expr) else {
        return Ok(None);
    };
    if is_explicit_constructor_call_name(rc, expr) || !rc.is_static_context(expr) {
        return Ok(None);
    }
    Ok(Some(Diagnostic::error(
        "static-context",
        rc.range(expr),
        format!("'{keyword}' cannot be referenced from a static context"),
    )))
}

/// `this`/`super` in the arguments of `this(...)`/`super(...)`.
pub(crate) fn this_before_super(rc: &RuleContext<'_>, expr: NodeId) -> CheckResult<Option<Diagnostic>> {
    let Some(keyword) = this_keyword(rc, expr) else {
        return Ok(None);
    };
    if is_explicit_constructor_call_name(rc, expr) {
        return Ok(None);
    }
    let Some(ctor) = rc.ast.enclosing_method(expr) else {
        return Ok(None);
    };
    let Some(call) = crate::rules::methods::explicit_constructor_call(rc, ctor) else {
        return Ok(None);
    };
    let NodeKind::MethodCall { args, .. } = rc.kind(call) else {
        return Ok(None);
    };
    let inside_args = rc.ast.ancestors(expr).any(|a| a == *args);
    let in_anonymous_body = rc
        .ast
        .ancestors(expr)
        .take_while(|a| *a != *args)
        .any(|a| matches!(rc.kind(a), NodeKind::Class { .. }));
    if !inside_args || in_anonymous_body {
        return Ok(None);
    }
    Ok(Some(Diagnostic::error(
        "this-before-super",
        rc.range(expr),
        format!("Cannot reference '{keyword}' before supertype constructor has been called"),
    )))
}

/// `super.m()` where `m` is abstract.
pub(crate) fn abstract_super_call(rc: &RuleContext<'_>, expr: NodeId) -> CheckResult<Option<Diagnostic>> {
    if !matches!(rc.kind(expr), NodeKind::Super { .. }) {
        return Ok(None);
    }
    let Some(reference) = rc.ast.parent(expr).filter(|p| {
        matches!(rc.kind(*p), NodeKind::Reference { qualifier: Some(q), .. } if *q == expr)
    }) else {
        return Ok(None);
    };
    let Some(method) = rc.resolve(reference)?.and_then(|r| r.as_method()) else {
        return Ok(None);
    };
    let env = rc.env();
    let Some(def) = env.method(method) else {
        return Ok(None);
    };
    let interface_abstract = env
        .class(def.owner)
        .is_some_and(|c| c.kind == ClassKind::Interface)
        && !def.modifiers.has(Modifier::Default)
        && !def.is_static();
    if !def.is_abstract() && !interface_abstract {
        return Ok(None);
    }
    let range = rc
        .ast
        .parent(reference)
        .filter(|p| matches!(rc.kind(*p), NodeKind::MethodCall { .. }))
        .map(|call| rc.range(call))
        .unwrap_or_else(|| rc.range(reference));
    Ok(Some(Diagnostic::error(
        "abstract-super-call",
        range,
        format!(
            "Abstract method '{}' in '{}' cannot be accessed directly",
            format_method(env, method, &Substitution::empty()),
            class_name(rc, def.owner)
        ),
    )))
}
