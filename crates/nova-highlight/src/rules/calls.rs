//! Method calls, explicit constructor calls and `new` expressions.

use nova_hir::{NodeId, NodeKind};
use nova_resolve::ResolveResult;
use nova_types::{
    format_arg_types, format_class_name, format_method, is_assignable, is_convertible,
    presentable_type, ClassKind, MethodId, Type,
};

use crate::context::{CheckResult, RuleContext};
use crate::diagnostic::Severity;
use crate::rules::references::access_problem;
use crate::tooltip::{argument_mismatch_tooltip, ArgumentRow};
use crate::{Diagnostic, Fix};

fn argument_nodes<'a>(rc: &RuleContext<'a>, args: Option<NodeId>) -> &'a [NodeId] {
    match args.map(|a| rc.kind(a)) {
        Some(NodeKind::ArgList { args }) => args,
        _ => &[],
    }
}

fn argument_types(rc: &RuleContext<'_>, args: &[NodeId]) -> CheckResult<Vec<Type>> {
    args.iter().map(|a| rc.expr_type(*a)).collect()
}

fn enclosing_constructor(rc: &RuleContext<'_>, node: NodeId) -> Option<NodeId> {
    rc.ast
        .enclosing_method(node)
        .filter(|m| matches!(rc.kind(*m), NodeKind::Method { return_type: None, .. }))
}

fn constructor_call_keyword(rc: &RuleContext<'_>, call: NodeId) -> Option<&'static str> {
    match rc.kind(call) {
        NodeKind::MethodCall { method, .. } => match rc.kind(*method) {
            NodeKind::This { .. } => Some("this"),
            NodeKind::Super { .. } => Some("super"),
            _ => None,
        },
        _ => None,
    }
}

pub(crate) fn enum_super_call(rc: &RuleContext<'_>, call: NodeId) -> CheckResult<Option<Diagnostic>> {
    if constructor_call_keyword(rc, call) != Some("super") {
        return Ok(None);
    }
    let in_enum = rc.ast.enclosing_class(call).is_some_and(|c| {
        matches!(
            rc.kind(c),
            NodeKind::Class {
                kind: ClassKind::Enum,
                ..
            }
        )
    });
    Ok(in_enum.then(|| {
        Diagnostic::error(
            "enum-super-call",
            rc.range(call),
            "Call to super not allowed in enum constructor",
        )
    }))
}

pub(crate) fn constructor_call_first(rc: &RuleContext<'_>, call: NodeId) -> CheckResult<Option<Diagnostic>> {
    let Some(keyword) = constructor_call_keyword(rc, call) else {
        return Ok(None);
    };
    let is_first = enclosing_constructor(rc, call)
        .and_then(|ctor| crate::rules::methods::explicit_constructor_call(rc, ctor))
        == Some(call);
    Ok((!is_first).then(|| {
        Diagnostic::error(
            "constructor-call-not-first",
            rc.range(call),
            format!("Call to '{keyword}()' must be first statement in constructor body"),
        )
    }))
}

/// Expands a varargs parameter list to `arity` entries when the call passes
/// the variable arguments individually.
fn expanded_params(rc: &RuleContext<'_>, method: MethodId, params: Vec<Type>, args: &[Type]) -> Vec<Type> {
    let env = rc.env();
    let varargs = env.method(method).is_some_and(|m| m.is_varargs);
    let Some(Type::Array(component)) = params.last().cloned() else {
        return params;
    };
    if !varargs {
        return params;
    }
    let fixed = params.len() - 1;
    let passes_array = args.len() == params.len()
        && args
            .last()
            .is_some_and(|a| a.contains_unknown() || is_assignable(env, &params[fixed], a));
    if passes_array {
        return params;
    }
    let mut expanded = params[..fixed].to_vec();
    expanded.extend(std::iter::repeat(*component).take(args.len().saturating_sub(fixed)));
    expanded
}

fn compatible(rc: &RuleContext<'_>, param: &Type, arg: &Type) -> bool {
    param.contains_unknown() || arg.contains_unknown() || is_assignable(rc.env(), param, arg)
}

/// `'m(int)' in 'C' cannot be applied to '(String)'` with the mismatch table.
fn inapplicable(
    rc: &RuleContext<'_>,
    range: nova_core::TextRange,
    candidate: &ResolveResult,
    method: MethodId,
    args: &[Type],
) -> Option<Diagnostic> {
    let env = rc.env();
    let def = env.method(method)?;
    let params: Vec<Type> = def
        .params
        .iter()
        .map(|p| candidate.substitution.apply(env, p))
        .collect();
    let params = expanded_params(rc, method, params, args);
    let rows = ArgumentRow::rows(&params, args, |_, p, a| compatible(rc, p, a));
    let owner = format_class_name(env, def.owner);
    let shown = format_method(env, method, &candidate.substitution);
    let name = if def.is_constructor { owner.clone() } else { def.name.clone() };
    let mut builder = Diagnostic::builder(Severity::Error, "inapplicable-call", range)
        .message(format!(
            "'{shown}' in '{owner}' cannot be applied to '{}'",
            format_arg_types(env, args)
        ))
        .tooltip(argument_mismatch_tooltip(env, &name, &owner, &rows));
    for (index, row) in rows.iter().enumerate() {
        if let (Some(param), Some(arg), false) = (&row.param, &row.arg, row.compatible) {
            if is_convertible(env, param, arg) {
                builder = builder.fix(Fix::CastArgument {
                    index,
                    ty: presentable_type(env, param),
                });
            }
        }
    }
    Some(builder.build())
}

fn ambiguous(rc: &RuleContext<'_>, range: nova_core::TextRange, first: &ResolveResult, second: &ResolveResult) -> Option<Diagnostic> {
    let env = rc.env();
    let render = |r: &ResolveResult| -> Option<String> {
        let method = r.as_method()?;
        let def = env.method(method)?;
        Some(format!(
            "{}.{}",
            format_class_name(env, def.owner),
            format_method(env, method, &r.substitution)
        ))
    };
    Some(Diagnostic::error(
        "ambiguous-call",
        range,
        format!(
            "Ambiguous method call: both '{}' and '{}' match",
            render(first)?,
            render(second)?
        ),
    ))
}

/// Inapplicable or ambiguous candidates. When several candidates exist and
/// none applies, `unresolved` builds the report since its wording depends on
/// the call shape.
fn diagnose_candidates(
    rc: &RuleContext<'_>,
    range: nova_core::TextRange,
    candidates: &[ResolveResult],
    args: &[Type],
    unresolved: impl FnOnce() -> Diagnostic,
) -> Option<Diagnostic> {
    let applicable: Vec<&ResolveResult> = candidates.iter().filter(|c| c.applicable).collect();
    match (candidates, applicable.as_slice()) {
        ([], _) => None,
        ([single], []) => inapplicable(rc, range, single, single.as_method()?, args),
        (_, []) => Some(unresolved()),
        (_, [first, second, ..]) => ambiguous(rc, range, first, second),
        _ => None,
    }
}

/// Whether resolution settled on one usable candidate.
fn resolved_validly(rc: &RuleContext<'_>, reference: NodeId) -> CheckResult<bool> {
    Ok(rc.resolve(reference)?.is_some_and(|r| r.is_valid()))
}

fn cannot_resolve_method(range: nova_core::TextRange, name: &str, shown_args: &str) -> Diagnostic {
    Diagnostic::builder(Severity::Error, "cannot-resolve-method", range)
        .message(format!("Cannot resolve method '{name}{shown_args}'"))
        .fix(Fix::CreateMethod {
            name: name.to_string(),
        })
        .build()
}

fn cannot_resolve_constructor(range: nova_core::TextRange, name: &str, shown_args: &str) -> Diagnostic {
    Diagnostic::builder(Severity::Error, "cannot-resolve-constructor", range)
        .message(format!("Cannot resolve constructor '{name}{shown_args}'"))
        .fix(Fix::CreateConstructor {
            class: name.to_string(),
        })
        .build()
}

fn receiver_unresolved(rc: &RuleContext<'_>, method: NodeId) -> CheckResult<bool> {
    match rc.kind(method) {
        NodeKind::Reference {
            qualifier: Some(q), ..
        } => Ok(rc.expr_type(*q)?.contains_unknown() && rc.multi_resolve(*q)?.is_empty()),
        _ => Ok(false),
    }
}

pub(crate) fn diagnose_call(rc: &RuleContext<'_>, call: NodeId) -> CheckResult<Option<Diagnostic>> {
    let NodeKind::MethodCall { method, args } = rc.kind(call) else {
        return Ok(None);
    };
    let arg_nodes = argument_nodes(rc, Some(*args));
    let candidates = rc.multi_resolve(*method)?;
    if resolved_validly(rc, *method)? {
        return Ok(None);
    }
    let arg_types = argument_types(rc, arg_nodes)?;
    let shown_args = format_arg_types(rc.env(), &arg_types);
    let range = rc.range(*args);
    let name = match rc.kind(*method) {
        NodeKind::Reference { name, name_range, .. } => Some((name.as_str(), *name_range)),
        _ => None,
    };
    if candidates.is_empty() {
        let Some((name, name_range)) = name else {
            return Ok(None);
        };
        if receiver_unresolved(rc, *method)? {
            return Ok(None);
        }
        return Ok(Some(cannot_resolve_method(name_range, name, &shown_args)));
    }
    let shown_name = name
        .map(|(name, _)| name)
        .or_else(|| constructor_call_keyword(rc, call))
        .unwrap_or_default();
    Ok(diagnose_candidates(rc, range, &candidates, &arg_types, || {
        cannot_resolve_method(range, shown_name, &shown_args)
    }))
}

/// Access and static-context problems of the method named by a call.
pub(crate) fn call_name(rc: &RuleContext<'_>, reference: NodeId) -> CheckResult<Option<Diagnostic>> {
    if !crate::rules::references::is_call_name(rc, reference) {
        return Ok(None);
    }
    let Some(result) = rc.resolve(reference)? else {
        return Ok(None);
    };
    if result.is_valid() {
        return Ok(None);
    }
    let range = rc.ast.name_range(reference);
    if !result.accessible {
        return Ok(access_problem(rc, &result)
            .map(|message| Diagnostic::error("inaccessible-member", range, message)));
    }
    if !result.statics_ok {
        let Some(method) = result.as_method() else {
            return Ok(None);
        };
        return Ok(Some(Diagnostic::error(
            "static-context",
            range,
            format!(
                "Non-static method '{}' cannot be referenced from a static context",
                format_method(rc.env(), method, &result.substitution)
            ),
        )));
    }
    Ok(None)
}

/// Constructor resolution of a class instance creation.
pub(crate) fn constructor_arguments(rc: &RuleContext<'_>, new: NodeId) -> CheckResult<Option<Diagnostic>> {
    let NodeKind::New {
        ty,
        array_dims: 0,
        args,
        ..
    } = rc.kind(new)
    else {
        return Ok(None);
    };
    let Some(class) = rc.resolve_class(*ty)? else {
        return Ok(None);
    };
    let env = rc.env();
    let Some(def) = env.class(class) else {
        return Ok(None);
    };
    let arg_nodes = argument_nodes(rc, *args);
    let arg_types = argument_types(rc, arg_nodes)?;
    let range = args.map(|a| rc.range(a)).unwrap_or_else(|| rc.range(new));
    let candidates = rc.multi_resolve(new)?;
    let name = def.simple_name().to_string();
    let shown_args = format_arg_types(env, &arg_types);
    if candidates.is_empty() {
        let declares_constructors = def
            .methods
            .iter()
            .any(|m| env.method(*m).is_some_and(|d| d.is_constructor));
        if def.is_interface() || (!declares_constructors && arg_nodes.is_empty()) {
            return Ok(None);
        }
        return Ok(Some(cannot_resolve_constructor(range, &name, &shown_args)));
    }
    if let [single] = candidates.as_slice() {
        if single.applicable && !single.accessible {
            return Ok(access_problem(rc, single)
                .map(|message| Diagnostic::error("inaccessible-member", range, message)));
        }
    }
    if resolved_validly(rc, new)? {
        return Ok(None);
    }
    Ok(diagnose_candidates(rc, range, &candidates, &arg_types, || {
        cannot_resolve_constructor(range, &name, &shown_args)
    }))
}
