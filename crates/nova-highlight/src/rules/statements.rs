//! Statement-level checks: `return`, jumps, `switch` and labels.

use nova_core::{JavaFeature, Name};
use nova_hir::{LiteralKind, NodeId, NodeKind};
use nova_resolve::{ConstValue, Element};
use nova_types::{as_primitive, is_enum, presentable_type, FieldId, PrimitiveType, Type};

use crate::context::{CheckResult, RuleContext};
use crate::diagnostic::Severity;
use crate::rules::features::check_feature;
use crate::rules::{incompatible_types, is_expr_assignable};
use crate::{Diagnostic, Fix};

pub(crate) fn return_type(rc: &RuleContext<'_>, stmt: NodeId) -> CheckResult<Option<Diagnostic>> {
    let NodeKind::Return { value } = rc.kind(stmt) else {
        return Ok(None);
    };
    let Some(owner) = rc.ast.enclosing_code_owner(stmt) else {
        return Ok(None);
    };
    let range = rc.range(stmt);
    let return_type = match rc.kind(owner) {
        NodeKind::Method { return_type, .. } => *return_type,
        NodeKind::Initializer { .. } => {
            return Ok(Some(Diagnostic::error(
                "return-outside-method",
                range,
                "Cannot return from within an initializer",
            )));
        }
        _ => return Ok(None),
    };
    let declared = match return_type {
        Some(ty) => rc.type_of(ty)?,
        None => Type::Void,
    };
    match (value, &declared) {
        (Some(value), Type::Void) => {
            let mut builder = Diagnostic::builder(Severity::Error, "return-value-in-void", rc.range(*value))
                .message("Cannot return a value from a method with void result type")
                .fix(Fix::RemoveReturnValue);
            let found = rc.expr_type(*value)?;
            if let (Some(ty), false) = (return_type, found.contains_unknown()) {
                builder = builder.fix_with_range(
                    Fix::ChangeReturnType {
                        new_type: presentable_type(rc.env(), &found),
                    },
                    rc.range(ty),
                );
            }
            Ok(Some(builder.build()))
        }
        (None, Type::Void) => Ok(None),
        (None, _) if declared.contains_unknown() => Ok(None),
        (None, _) => Ok(Some(Diagnostic::error(
            "missing-return-value",
            range,
            "Missing return value",
        ))),
        (Some(value), _) => {
            let (ok, found) = is_expr_assignable(rc, &declared, *value)?;
            if ok {
                return Ok(None);
            }
            let mut builder = incompatible_types(rc, rc.range(*value), &declared, &found);
            if let Some(ty) = return_type {
                builder = builder.fix_with_range(
                    Fix::ChangeReturnType {
                        new_type: presentable_type(rc.env(), &found),
                    },
                    rc.range(ty),
                );
            }
            Ok(Some(builder.build()))
        }
    }
}

/// Statements a `break`/`continue` can see, innermost first, up to the
/// enclosing method, lambda or class body.
fn jump_scope<'a>(rc: &'a RuleContext<'_>, stmt: NodeId) -> impl Iterator<Item = NodeId> + 'a {
    rc.ast.ancestors(stmt).take_while(move |a| {
        !matches!(
            rc.kind(*a),
            NodeKind::Method { .. }
                | NodeKind::Lambda { .. }
                | NodeKind::Class { .. }
                | NodeKind::Initializer { .. }
        )
    })
}

fn find_label(rc: &RuleContext<'_>, stmt: NodeId, label: &Name) -> Option<NodeId> {
    jump_scope(rc, stmt)
        .find(|a| matches!(rc.kind(*a), NodeKind::Labeled { label: l, .. } if l == label))
}

pub(crate) fn jump_target(rc: &RuleContext<'_>, stmt: NodeId) -> CheckResult<Option<Diagnostic>> {
    let range = rc.range(stmt);
    let diagnostic = match rc.kind(stmt) {
        NodeKind::Break { label: Some(label) } | NodeKind::Continue { label: Some(label) } => {
            match find_label(rc, stmt, label) {
                None => Some(Diagnostic::error(
                    "undefined-label",
                    range,
                    format!("Undefined label: '{label}'"),
                )),
                Some(labeled) if matches!(rc.kind(stmt), NodeKind::Continue { .. }) => {
                    let body = match rc.kind(labeled) {
                        NodeKind::Labeled { body, .. } => *body,
                        _ => None,
                    };
                    (!body.is_some_and(|b| rc.kind(b).is_loop())).then(|| {
                        Diagnostic::error(
                            "not-a-loop-label",
                            range,
                            format!("Not a loop label: '{label}'"),
                        )
                    })
                }
                Some(_) => None,
            }
        }
        NodeKind::Break { label: None } => {
            let inside = jump_scope(rc, stmt)
                .any(|a| rc.kind(a).is_loop() || matches!(rc.kind(a), NodeKind::Switch { .. }));
            (!inside).then(|| {
                Diagnostic::error("break-outside-loop", range, "Break outside switch or loop")
            })
        }
        NodeKind::Continue { label: None } => {
            let inside = jump_scope(rc, stmt).any(|a| rc.kind(a).is_loop());
            (!inside).then(|| {
                Diagnostic::error("continue-outside-loop", range, "Continue outside of loop")
            })
        }
        _ => None,
    };
    Ok(diagnostic)
}

pub(crate) fn not_a_statement(rc: &RuleContext<'_>, stmt: NodeId) -> CheckResult<Option<Diagnostic>> {
    let NodeKind::ExpressionStatement { expr } = rc.kind(stmt) else {
        return Ok(None);
    };
    let is_statement = match rc.kind(*expr) {
        NodeKind::Assignment { .. } | NodeKind::MethodCall { .. } | NodeKind::Error { .. } => true,
        NodeKind::Unary { op, .. } => op.is_increment(),
        NodeKind::New { array_dims, .. } => *array_dims == 0,
        _ => false,
    };
    Ok((!is_statement).then(|| {
        Diagnostic::error("not-a-statement", rc.range(*expr), "Not a statement")
    }))
}

const SWITCH_SELECTOR_TYPES: &str =
    "char, byte, short, int, Character, Byte, Short, Integer, String, or an enum";

/// Selector of a `switch`: integral up to `int` (boxed or not), `String` or
/// an enum.
pub(crate) fn switch_selector(rc: &RuleContext<'_>, stmt: NodeId) -> CheckResult<Option<Diagnostic>> {
    let NodeKind::Switch { selector, .. } = rc.kind(stmt) else {
        return Ok(None);
    };
    let env = rc.env();
    let found = rc.expr_type(*selector)?;
    if found.contains_unknown() {
        return Ok(None);
    }
    let range = rc.range(*selector);
    if found.class_id() == Some(env.well_known().string) {
        return Ok(check_feature(rc, JavaFeature::StringsInSwitch, range));
    }
    let integral = matches!(
        as_primitive(env, &found),
        Some(PrimitiveType::Char | PrimitiveType::Byte | PrimitiveType::Short | PrimitiveType::Int)
    );
    if integral || is_enum(env, &found) {
        return Ok(None);
    }
    let shown = presentable_type(env, &found);
    let mut builder = Diagnostic::builder(Severity::Error, "incompatible-types", range)
        .message(format!(
            "Incompatible types. Found: '{shown}', required: '{SWITCH_SELECTOR_TYPES}'"
        ))
        .fix(Fix::ConvertSwitchToIf);
    if matches!(
        found,
        Type::Primitive(PrimitiveType::Long | PrimitiveType::Float | PrimitiveType::Double)
    ) {
        builder = builder
            .fix(Fix::AddTypeCast { ty: "int".into() })
            .fix(Fix::WrapWithAdapter {
                from: shown,
                to: "int".into(),
            });
    }
    Ok(Some(builder.build()))
}

/// Identity of a case value for duplicate detection.
#[derive(Debug, PartialEq)]
enum LabelKey {
    Constant(ConstValue),
    EnumConstant(FieldId),
}

fn label_key(rc: &RuleContext<'_>, value: NodeId) -> CheckResult<Option<LabelKey>> {
    if let Some(constant) = rc.constant(value)? {
        return Ok(Some(LabelKey::Constant(constant)));
    }
    Ok(rc.resolve(value)?.and_then(|r| match r.element {
        Element::Field(field) => Some(LabelKey::EnumConstant(field)),
        _ => None,
    }))
}

fn render_label(rc: &RuleContext<'_>, value: NodeId, key: &LabelKey) -> String {
    match (rc.kind(value), key) {
        (NodeKind::Literal { text, .. }, _) => text.to_string(),
        (_, LabelKey::Constant(ConstValue::Int(v) | ConstValue::Long(v))) => v.to_string(),
        (_, LabelKey::Constant(ConstValue::Char(c))) => {
            format!("'{}'", char::from_u32(u32::from(*c)).unwrap_or('?'))
        }
        (_, LabelKey::Constant(ConstValue::Str(s))) => format!("\"{s}\""),
        (_, LabelKey::Constant(other)) => format!("{other:?}"),
        _ => rc.ast.name(value).map(|n| n.to_string()).unwrap_or_default(),
    }
}

/// Case labels of the switch containing `label`, in source order.
fn sibling_labels(rc: &RuleContext<'_>, label: NodeId) -> Vec<NodeId> {
    let Some(body) = rc.ast.parent(label) else {
        return Vec::new();
    };
    match rc.kind(body) {
        NodeKind::Block { statements, .. } => statements
            .iter()
            .copied()
            .filter(|s| matches!(rc.kind(*s), NodeKind::SwitchLabel { .. }))
            .collect(),
        _ => Vec::new(),
    }
}

pub(crate) fn duplicate_label(rc: &RuleContext<'_>, label: NodeId) -> CheckResult<Option<Diagnostic>> {
    let NodeKind::SwitchLabel { values } = rc.kind(label) else {
        return Ok(None);
    };
    let siblings = sibling_labels(rc, label);
    let earlier: Vec<NodeId> = siblings.iter().copied().take_while(|s| *s != label).collect();
    if values.is_empty() {
        let repeated = earlier.iter().any(|s| {
            matches!(rc.kind(*s), NodeKind::SwitchLabel { values } if values.is_empty())
        });
        return Ok(repeated.then(|| {
            Diagnostic::error("duplicate-default", rc.range(label), "Duplicate default label")
        }));
    }
    let mut seen = Vec::new();
    for sibling in &earlier {
        if let NodeKind::SwitchLabel { values } = rc.kind(*sibling) {
            for value in values {
                if let Some(key) = label_key(rc, *value)? {
                    seen.push(key);
                }
            }
        }
    }
    for value in values {
        let Some(key) = label_key(rc, *value)? else {
            continue;
        };
        if seen.contains(&key) {
            return Ok(Some(Diagnostic::error(
                "duplicate-label",
                rc.range(*value),
                format!("Duplicate label '{}'", render_label(rc, *value, &key)),
            )));
        }
        seen.push(key);
    }
    Ok(None)
}

/// Case values must be assignable to the selector type.
pub(crate) fn case_value_type(rc: &RuleContext<'_>, label: NodeId) -> CheckResult<Vec<Diagnostic>> {
    let NodeKind::SwitchLabel { values } = rc.kind(label) else {
        return Ok(Vec::new());
    };
    let Some(selector) = crate::rules::expressions::switch_selector_type(rc, label)? else {
        return Ok(Vec::new());
    };
    let env = rc.env();
    if selector.contains_unknown() || is_enum(env, &selector) {
        return Ok(Vec::new());
    }
    // Boxed selectors compare against the primitive case constants.
    let target = match as_primitive(env, &selector) {
        Some(p) => Type::Primitive(p),
        None => selector,
    };
    let mut out = Vec::new();
    for value in values {
        if matches!(rc.kind(*value), NodeKind::Literal { kind: LiteralKind::Null, .. }) {
            continue;
        }
        let (ok, found) = is_expr_assignable(rc, &target, *value)?;
        if !ok {
            out.push(incompatible_types(rc, rc.range(*value), &target, &found).build());
        }
    }
    Ok(out)
}

pub(crate) fn duplicate_statement_label(rc: &RuleContext<'_>, stmt: NodeId) -> CheckResult<Option<Diagnostic>> {
    let NodeKind::Labeled {
        label, label_range, ..
    } = rc.kind(stmt)
    else {
        return Ok(None);
    };
    Ok(find_label(rc, stmt, label).map(|_| {
        Diagnostic::error(
            "duplicate-label",
            *label_range,
            format!("Label '{label}' already in use"),
        )
    }))
}

