//! Name references: resolution problems, definite assignment and forward references.

use nova_hir::{AssignOp, NodeId, NodeKind};
use nova_resolve::{Element, ResolveResult};
use nova_types::{format_class_name, format_method, ClassKind, FieldId, Modifier, Modifiers};

use crate::caches::PassCaches;
use crate::context::{CheckResult, RuleContext};
use crate::Diagnostic;

/// Reference naming the method of a call; those are checked by the call rules.
pub(crate) fn is_call_name(rc: &RuleContext<'_>, reference: NodeId) -> bool {
    rc.ast.parent(reference).is_some_and(|p| {
        matches!(rc.kind(p), NodeKind::MethodCall { method, .. } if *method == reference)
    })
}

fn reference_name(rc: &RuleContext<'_>, reference: NodeId) -> String {
    rc.ast.name(reference).map(|n| n.to_string()).unwrap_or_default()
}

/// Human-readable element name used in ambiguity messages.
fn describe(rc: &RuleContext<'_>, result: &ResolveResult) -> String {
    let env = rc.env();
    match &result.element {
        Element::Class(c) => format_class_name(env, *c),
        Element::Method(m) => {
            let owner = env
                .method(*m)
                .map(|d| format_class_name(env, d.owner))
                .unwrap_or_default();
            format!("{owner}.{}", format_method(env, *m, &result.substitution))
        }
        Element::Field(f) => env
            .field(*f)
            .map(|d| format!("{}.{}", format_class_name(env, d.owner), d.name))
            .unwrap_or_default(),
        Element::Variable(decl) => rc.ast.name(*decl).map(|n| n.to_string()).unwrap_or_default(),
        Element::TypeParam(tp) => env.type_param(*tp).map(|d| d.name.clone()).unwrap_or_default(),
        Element::Package(name) => name.to_string(),
    }
}

/// `'x' has private access in 'C'` and friends for an inaccessible result.
pub(crate) fn access_problem(rc: &RuleContext<'_>, result: &ResolveResult) -> Option<String> {
    let env = rc.env();
    let (modifiers, name, owner): (Modifiers, String, String) = match &result.element {
        Element::Field(f) => {
            let def = env.field(*f)?;
            (def.modifiers, def.name.clone(), format_class_name(env, def.owner))
        }
        Element::Method(m) => {
            let def = env.method(*m)?;
            (
                def.modifiers,
                format_method(env, *m, &result.substitution),
                format_class_name(env, def.owner),
            )
        }
        Element::Class(c) => {
            let def = env.class(*c)?;
            let owner = match def.outer {
                Some(outer) => format_class_name(env, outer),
                None => def
                    .name
                    .rsplit_once('.')
                    .map(|(package, _)| package.to_string())
                    .unwrap_or_default(),
            };
            (def.modifiers, def.simple_name().to_string(), owner)
        }
        _ => return None,
    };
    Some(match modifiers.access() {
        Modifier::Private => format!("'{name}' has private access in '{owner}'"),
        Modifier::Protected => format!("'{name}' has protected access in '{owner}'"),
        _ => format!("'{name}' is not public in '{owner}'. Cannot be accessed from outside package"),
    })
}

fn qualifier_unresolved(rc: &RuleContext<'_>, reference: NodeId) -> CheckResult<bool> {
    let NodeKind::Reference {
        qualifier: Some(qualifier),
        ..
    } = rc.kind(reference)
    else {
        return Ok(false);
    };
    if !matches!(rc.kind(*qualifier), NodeKind::Reference { .. }) {
        return Ok(rc.expr_type(*qualifier)?.contains_unknown());
    }
    Ok(rc.multi_resolve(*qualifier)?.is_empty() && rc.expr_type(*qualifier)?.is_unknown())
}

/// Unresolved, ambiguous, inaccessible or statically misused names.
pub(crate) fn resolve_problems(rc: &RuleContext<'_>, reference: NodeId) -> CheckResult<Option<Diagnostic>> {
    if is_call_name(rc, reference) {
        return Ok(None);
    }
    let range = rc.ast.name_range(reference);
    let name = reference_name(rc, reference);
    let results = rc.multi_resolve(reference)?;
    match results.as_slice() {
        [] => {
            if qualifier_unresolved(rc, reference)? {
                return Ok(None);
            }
            Ok(Some(Diagnostic::error(
                "cannot-resolve-symbol",
                range,
                format!("Cannot resolve symbol '{name}'"),
            )))
        }
        [single] if !single.accessible => Ok(access_problem(rc, single)
            .map(|message| Diagnostic::error("inaccessible-member", range, message))),
        [single] if !single.statics_ok => {
            let what = match single.element {
                Element::Method(_) => "method",
                _ => "field",
            };
            Ok(Some(Diagnostic::error(
                "static-context",
                range,
                format!("Non-static {what} '{name}' cannot be referenced from a static context"),
            )))
        }
        [_] => Ok(None),
        [first, second, ..] => Ok(Some(Diagnostic::error(
            "ambiguous-reference",
            range,
            format!(
                "Reference to '{name}' is ambiguous, both '{}' and '{}' match",
                describe(rc, first),
                describe(rc, second)
            ),
        ))),
    }
}

/// `x = ...` writes rather than reads `x`.
fn is_assignment_target(rc: &RuleContext<'_>, reference: NodeId) -> bool {
    rc.ast.parent_skipping_parens(reference).is_some_and(|p| {
        matches!(
            rc.kind(p),
            NodeKind::Assignment { op: AssignOp::Assign, lhs, .. } if rc.ast.skip_parens(*lhs) == reference
        )
    })
}

pub(crate) fn initialized_before_use(
    rc: &RuleContext<'_>,
    caches: &mut PassCaches,
    reference: NodeId,
) -> CheckResult<Option<Diagnostic>> {
    let Some(region) = rc.flow_region(reference) else {
        return Ok(None);
    };
    if !caches.uninitialized_reads(rc, region)?.contains(&reference) {
        return Ok(None);
    }
    Ok(Some(Diagnostic::error(
        "variable-not-initialized",
        rc.ast.name_range(reference),
        format!(
            "Variable '{}' might not have been initialized",
            reference_name(rc, reference)
        ),
    )))
}

pub(crate) fn final_already_assigned(
    rc: &RuleContext<'_>,
    caches: &mut PassCaches,
    reference: NodeId,
) -> CheckResult<Option<Diagnostic>> {
    let Some(region) = rc.flow_region(reference) else {
        return Ok(None);
    };
    if !caches.reassigned_finals(rc, region)?.contains(&reference) {
        return Ok(None);
    }
    Ok(Some(Diagnostic::error(
        "final-already-assigned",
        rc.ast.name_range(reference),
        format!(
            "Variable '{}' might already have been assigned to",
            reference_name(rc, reference)
        ),
    )))
}

pub(crate) fn final_assigned_in_loop(
    rc: &RuleContext<'_>,
    caches: &mut PassCaches,
    reference: NodeId,
) -> CheckResult<Option<Diagnostic>> {
    let Some(region) = rc.flow_region(reference) else {
        return Ok(None);
    };
    if !caches.finals_assigned_in_loop(rc, region)?.contains(&reference) {
        return Ok(None);
    }
    Ok(Some(Diagnostic::error(
        "final-assigned-in-loop",
        rc.ast.name_range(reference),
        format!(
            "Variable '{}' might be assigned in loop",
            reference_name(rc, reference)
        ),
    )))
}

/// A class or package name where a value is needed.
pub(crate) fn expression_expected(rc: &RuleContext<'_>, reference: NodeId) -> CheckResult<Option<Diagnostic>> {
    let Some(parent) = rc.ast.parent_skipping_parens(reference) else {
        return Ok(None);
    };
    let value_position = match rc.kind(parent) {
        NodeKind::Binary { .. }
        | NodeKind::Unary { .. }
        | NodeKind::ArgList { .. }
        | NodeKind::Return { .. }
        | NodeKind::Conditional { .. }
        | NodeKind::ArrayAccess { .. }
        | NodeKind::ExpressionStatement { .. }
        | NodeKind::Throw { .. } => true,
        NodeKind::Assignment { rhs, .. } => rc.ast.skip_parens(*rhs) == reference,
        NodeKind::LocalVariable { initializer, .. } | NodeKind::Field { initializer, .. } => {
            initializer.map(|i| rc.ast.skip_parens(i)) == Some(reference)
        }
        _ => false,
    };
    if !value_position {
        return Ok(None);
    }
    let is_type_or_package = rc
        .resolve(reference)?
        .is_some_and(|r| matches!(r.element, Element::Class(_) | Element::Package(_)));
    Ok(is_type_or_package.then(|| {
        Diagnostic::error("expression-expected", rc.range(reference), "Expression expected")
    }))
}

/// Declaration node of `field` among the members of `class_decl`.
pub(crate) fn field_declaration(rc: &RuleContext<'_>, class_decl: NodeId, field: FieldId) -> Option<NodeId> {
    let NodeKind::Class { members, .. } = rc.kind(class_decl) else {
        return None;
    };
    members
        .iter()
        .copied()
        .find(|m| rc.resolver.declared_field(*m) == Some(field))
}

/// Unqualified (or `this.`-qualified) reference to a field of the enclosing class.
fn own_field(rc: &RuleContext<'_>, reference: NodeId) -> CheckResult<Option<(FieldId, NodeId)>> {
    let NodeKind::Reference { qualifier, .. } = rc.kind(reference) else {
        return Ok(None);
    };
    if qualifier.is_some_and(|q| !matches!(rc.kind(q), NodeKind::This { qualifier: None })) {
        return Ok(None);
    }
    let Some(field) = rc.resolve(reference)?.and_then(|r| r.as_field()) else {
        return Ok(None);
    };
    let Some(class_decl) = rc.ast.enclosing_class(reference) else {
        return Ok(None);
    };
    let owned = rc
        .env()
        .field(field)
        .is_some_and(|f| rc.resolver.declared_class(class_decl) == Some(f.owner));
    if !owned {
        return Ok(None);
    }
    Ok(field_declaration(rc, class_decl, field).map(|decl| (field, decl)))
}

/// Field or initializer member of the enclosing class that holds `reference`.
fn owning_member(rc: &RuleContext<'_>, reference: NodeId) -> Option<NodeId> {
    let owner = rc.ast.enclosing_code_owner(reference)?;
    matches!(
        rc.kind(owner),
        NodeKind::Field { .. } | NodeKind::Initializer { .. }
    )
    .then_some(owner)
}

fn member_is_static(rc: &RuleContext<'_>, member: NodeId) -> bool {
    rc.kind(member)
        .modifier_list()
        .is_some_and(|list| rc.has_modifier(list, Modifier::Static))
}

pub(crate) fn illegal_forward_reference(rc: &RuleContext<'_>, reference: NodeId) -> CheckResult<Option<Diagnostic>> {
    let Some(member) = owning_member(rc, reference) else {
        return Ok(None);
    };
    if is_assignment_target(rc, reference) {
        return Ok(None);
    }
    let Some((_, decl)) = own_field(rc, reference)? else {
        return Ok(None);
    };
    if member_is_static(rc, member) != member_is_static(rc, decl) {
        return Ok(None);
    }
    let declared_later = rc.range(decl).start() > rc.range(reference).start();
    let own_initializer = member == decl;
    Ok((declared_later || own_initializer).then(|| {
        Diagnostic::error(
            "illegal-forward-reference",
            rc.ast.name_range(reference),
            "Illegal forward reference",
        )
    }))
}

/// Non-constant static fields of an enum are not initialized yet while its
/// constructors and instance initializers run.
pub(crate) fn static_field_from_enum_constructor(
    rc: &RuleContext<'_>,
    reference: NodeId,
) -> CheckResult<Option<Diagnostic>> {
    let Some(class_decl) = rc.ast.enclosing_class(reference) else {
        return Ok(None);
    };
    if !matches!(
        rc.kind(class_decl),
        NodeKind::Class {
            kind: ClassKind::Enum,
            ..
        }
    ) {
        return Ok(None);
    }
    let Some(owner) = rc.ast.enclosing_code_owner(reference) else {
        return Ok(None);
    };
    let instance_context = match rc.kind(owner) {
        NodeKind::Method {
            return_type: None, ..
        } => true,
        NodeKind::Initializer { .. } | NodeKind::Field { .. } => !member_is_static(rc, owner),
        _ => false,
    };
    if !instance_context {
        return Ok(None);
    }
    let Some((field, decl)) = own_field(rc, reference)? else {
        return Ok(None);
    };
    let Some(def) = rc.env().field(field) else {
        return Ok(None);
    };
    if !def.is_static() {
        return Ok(None);
    }
    let constant = match rc.kind(decl) {
        NodeKind::Field {
            initializer: Some(init),
            ..
        } if def.is_final() && !def.is_enum_constant => rc.constant(*init)?.is_some(),
        _ => false,
    };
    if constant {
        return Ok(None);
    }
    Ok(Some(Diagnostic::error(
        "static-from-enum-constructor",
        rc.ast.name_range(reference),
        format!(
            "It is illegal to access static member '{}' from enum constructor or instance initializer",
            def.name
        ),
    )))
}

/// Parameter declaration written by this reference, if any.
pub(crate) fn written_parameter(rc: &RuleContext<'_>, reference: NodeId) -> CheckResult<Option<NodeId>> {
    let written = rc.ast.parent_skipping_parens(reference).is_some_and(|p| match rc.kind(p) {
        NodeKind::Assignment { lhs, .. } => rc.ast.skip_parens(*lhs) == reference,
        NodeKind::Unary { op, .. } => op.is_increment(),
        _ => false,
    });
    if !written {
        return Ok(None);
    }
    let variable = match rc.resolve(reference)? {
        Some(ResolveResult {
            element: Element::Variable(decl),
            ..
        }) => decl,
        _ => return Ok(None),
    };
    Ok(matches!(rc.kind(variable), NodeKind::Parameter { .. }).then_some(variable))
}
