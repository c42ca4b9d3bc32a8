//! Variable declarations: fields, locals, parameters and resources.

use nova_core::JavaFeature;
use nova_hir::{NodeId, NodeKind, TypeElementKind};
use nova_types::{
    instantiate_supertype, is_assignable, is_convertible, is_subtype, is_throwable,
    presentable_type, Type, WildcardBound,
};

use crate::context::{CheckResult, RuleContext};
use crate::rules::features::check_feature;
use crate::rules::{incompatible_types, is_expr_assignable};
use crate::{Diagnostic, Fix};

fn type_element_kind<'a>(rc: &RuleContext<'a>, var: NodeId) -> Option<(NodeId, &'a TypeElementKind)> {
    let ty = rc.kind(var).variable_type()?;
    match rc.kind(ty) {
        NodeKind::TypeElement { kind } => Some((ty, kind)),
        _ => None,
    }
}

fn variable_name(rc: &RuleContext<'_>, var: NodeId) -> String {
    rc.ast.name(var).map(|n| n.to_string()).unwrap_or_default()
}

pub(crate) fn initializer_assignable(rc: &RuleContext<'_>, var: NodeId) -> CheckResult<Option<Diagnostic>> {
    let (NodeKind::Field {
        ty,
        initializer: Some(init),
        ..
    }
    | NodeKind::LocalVariable {
        ty,
        initializer: Some(init),
        ..
    }) = rc.kind(var)
    else {
        return Ok(None);
    };
    if matches!(
        rc.kind(*ty),
        NodeKind::TypeElement {
            kind: TypeElementKind::Inferred
        }
    ) || matches!(rc.kind(*init), NodeKind::ArrayInit { .. })
    {
        return Ok(None);
    }
    let target = rc.type_of(*ty)?;
    let (ok, found) = is_expr_assignable(rc, &target, *init)?;
    if ok {
        return Ok(None);
    }
    let env = rc.env();
    let mut builder = incompatible_types(rc, rc.range(*init), &target, &found).fix_with_range(
        Fix::ChangeVariableType {
            variable: variable_name(rc, var),
            new_type: presentable_type(env, &found),
        },
        rc.range(*ty),
    );
    if is_convertible(env, &target, &found) {
        builder = builder.fix(Fix::AddTypeCast {
            ty: presentable_type(env, &target),
        });
    }
    Ok(Some(builder.build()))
}

pub(crate) fn illegal_void(rc: &RuleContext<'_>, var: NodeId) -> CheckResult<Option<Diagnostic>> {
    match type_element_kind(rc, var) {
        Some((ty, TypeElementKind::Void)) => Ok(Some(Diagnostic::error(
            "illegal-type",
            rc.range(ty),
            "Illegal type: 'void'",
        ))),
        _ => Ok(None),
    }
}

/// Declared type of a try-with-resources entry. A `var` resource takes its
/// initializer's type; a resource reference (Java 9) is an expression.
pub(crate) fn resource_type(rc: &RuleContext<'_>, resource: NodeId) -> CheckResult<Type> {
    let Some(ty) = rc.kind(resource).variable_type() else {
        return rc.expr_type(resource);
    };
    match rc.kind(resource) {
        NodeKind::LocalVariable {
            initializer: Some(init),
            ..
        } if matches!(
            rc.kind(ty),
            NodeKind::TypeElement {
                kind: TypeElementKind::Inferred
            }
        ) =>
        {
            rc.expr_type(*init)
        }
        _ => rc.type_of(ty),
    }
}

/// Try-with-resources variables must be `AutoCloseable`.
pub(crate) fn resource_auto_closeable(rc: &RuleContext<'_>, var: NodeId) -> CheckResult<Option<Diagnostic>> {
    let is_resource = rc.ast.parent(var).is_some_and(|p| {
        matches!(rc.kind(p), NodeKind::Try { resources, .. } if resources.contains(&var))
    });
    let Some(ty) = rc.kind(var).variable_type().filter(|_| is_resource) else {
        return Ok(None);
    };
    let env = rc.env();
    let declared = resource_type(rc, var)?;
    let required = Type::class(env.well_known().auto_closeable, Vec::new());
    if declared.contains_unknown() || is_subtype(env, &declared, &required) {
        return Ok(None);
    }
    Ok(Some(incompatible_types(rc, rc.range(ty), &required, &declared).build()))
}

pub(crate) fn varargs_last(rc: &RuleContext<'_>, param: NodeId) -> CheckResult<Option<Diagnostic>> {
    let Some((ty, TypeElementKind::Array { varargs: true, .. })) = type_element_kind(rc, param) else {
        return Ok(None);
    };
    let last = rc.ast.parent(param).and_then(|p| match rc.kind(p) {
        NodeKind::Method { params, .. } | NodeKind::Lambda { params, .. } => params.last().copied(),
        _ => None,
    });
    if last.is_some_and(|l| l != param) {
        return Ok(Some(Diagnostic::error(
            "varargs-not-last",
            rc.range(ty),
            "Vararg parameter must be the last in the list",
        )));
    }
    Ok(None)
}

/// Element type produced by iterating over `iterable`, or `None` when it
/// cannot be iterated.
fn iteration_element(rc: &RuleContext<'_>, iterable: &Type) -> Option<Type> {
    let env = rc.env();
    match iterable {
        Type::Array(component) => Some((**component).clone()),
        Type::Class(ct) => {
            let view = instantiate_supertype(env, ct, env.well_known().iterable)?;
            let object = Type::class(env.well_known().object, Vec::new());
            Some(match view.args.into_iter().next() {
                Some(Type::Wildcard(WildcardBound::Extends(bound))) => *bound,
                Some(Type::Wildcard(_)) | None => object,
                Some(arg) => arg,
            })
        }
        _ => None,
    }
}

pub(crate) fn foreach_type(rc: &RuleContext<'_>, param: NodeId) -> CheckResult<Option<Diagnostic>> {
    let Some(parent) = rc.ast.parent(param) else {
        return Ok(None);
    };
    let NodeKind::ForEach {
        param: loop_param,
        iterable,
        ..
    } = rc.kind(parent)
    else {
        return Ok(None);
    };
    if *loop_param != param {
        return Ok(None);
    }
    let env = rc.env();
    let iterated = rc.expr_type(*iterable)?;
    if iterated.contains_unknown() {
        return Ok(None);
    }
    let Some(element) = iteration_element(rc, &iterated) else {
        return Ok(Some(Diagnostic::error(
            "foreach-not-applicable",
            rc.range(*iterable),
            format!(
                "foreach not applicable to type '{}'",
                presentable_type(env, &iterated)
            ),
        )));
    };
    let Some((ty, kind)) = type_element_kind(rc, param) else {
        return Ok(None);
    };
    if matches!(kind, TypeElementKind::Inferred) {
        return Ok(None);
    }
    let declared = rc.type_of(ty)?;
    if declared.contains_unknown() || element.contains_unknown() || is_assignable(env, &declared, &element) {
        return Ok(None);
    }
    Ok(Some(incompatible_types(rc, rc.range(ty), &declared, &element).build()))
}

/// Catch parameter type elements, one per multi-catch alternative.
fn catch_alternatives(rc: &RuleContext<'_>, param: NodeId) -> Option<(NodeId, Vec<NodeId>)> {
    let parent = rc.ast.parent(param)?;
    if !matches!(rc.kind(parent), NodeKind::CatchSection { param: p, .. } if *p == param) {
        return None;
    }
    let (ty, kind) = type_element_kind(rc, param)?;
    Some(match kind {
        TypeElementKind::Disjunction { alternatives } => (ty, alternatives.clone()),
        _ => (ty, vec![ty]),
    })
}

pub(crate) fn multi_catch_feature(rc: &RuleContext<'_>, param: NodeId) -> CheckResult<Option<Diagnostic>> {
    match catch_alternatives(rc, param) {
        Some((ty, alternatives)) if alternatives.len() > 1 => {
            Ok(check_feature(rc, JavaFeature::MultiCatch, rc.range(ty)))
        }
        _ => Ok(None),
    }
}

pub(crate) fn catch_type_throwable(rc: &RuleContext<'_>, param: NodeId) -> CheckResult<Option<Diagnostic>> {
    let Some((_, alternatives)) = catch_alternatives(rc, param) else {
        return Ok(None);
    };
    let env = rc.env();
    let required = Type::class(env.well_known().throwable, Vec::new());
    for alternative in alternatives {
        let caught = rc.type_of(alternative)?;
        if caught.contains_unknown() || matches!(caught, Type::TypeVar(_)) || is_throwable(env, &caught) {
            continue;
        }
        return Ok(Some(
            incompatible_types(rc, rc.range(alternative), &required, &caught).build(),
        ));
    }
    Ok(None)
}

pub(crate) fn catch_type_parameter(rc: &RuleContext<'_>, param: NodeId) -> CheckResult<Option<Diagnostic>> {
    let Some((_, alternatives)) = catch_alternatives(rc, param) else {
        return Ok(None);
    };
    for alternative in alternatives {
        if matches!(rc.type_of(alternative)?, Type::TypeVar(_)) {
            return Ok(Some(Diagnostic::error(
                "catch-type-parameter",
                rc.range(alternative),
                "Cannot catch type parameters",
            )));
        }
    }
    Ok(None)
}

pub(crate) fn disjoint_alternatives(rc: &RuleContext<'_>, param: NodeId) -> CheckResult<Option<Diagnostic>> {
    let Some((_, alternatives)) = catch_alternatives(rc, param) else {
        return Ok(None);
    };
    if alternatives.len() < 2 {
        return Ok(None);
    }
    let env = rc.env();
    let mut typed = Vec::with_capacity(alternatives.len());
    for alternative in &alternatives {
        typed.push((*alternative, rc.type_of(*alternative)?));
    }
    for (idx, (node, ty)) in typed.iter().enumerate() {
        if ty.contains_unknown() {
            continue;
        }
        let wider = typed
            .iter()
            .enumerate()
            .find(|(other, (_, o))| *other != idx && !o.contains_unknown() && is_subtype(env, ty, o));
        if let Some((_, (_, wider))) = wider {
            return Ok(Some(Diagnostic::error(
                "multi-catch-not-disjoint",
                rc.range(*node),
                format!(
                    "Types in multi-catch must be disjoint: '{}' is a subclass of '{}'",
                    presentable_type(env, ty),
                    presentable_type(env, wider)
                ),
            )));
        }
    }
    Ok(None)
}
