//! Type arguments, bounds, wildcards, erasure clashes and unchecked warnings.

use std::collections::HashSet;

use nova_hir::{NodeId, NodeKind, ReferenceListRole, TypeElementKind};
use nova_types::{
    are_override_equivalent, format_method, format_type, is_assignable, is_convertible,
    is_reifiable, is_raw, is_return_type_substitutable, is_subclass, is_subtype, method_signature,
    presentable_type, visible_methods, CaptureContext, InheritedMethod, MethodId, Substitution,
    Type, TypeEnv, WildcardBound,
};

use crate::caches::PassCaches;
use crate::context::{CheckResult, RuleContext};
use crate::diagnostic::Severity;
use crate::rules::class_name;
use crate::{Diagnostic, Fix};

fn type_args<'a>(rc: &RuleContext<'a>, code_ref: NodeId) -> &'a [NodeId] {
    match rc.kind(code_ref) {
        NodeKind::CodeRef {
            type_args: Some(args),
            ..
        } => args,
        _ => &[],
    }
}

pub(crate) fn type_argument_count(rc: &RuleContext<'_>, code_ref: NodeId) -> CheckResult<Option<Diagnostic>> {
    let args = type_args(rc, code_ref);
    if args.is_empty() {
        return Ok(None);
    }
    let Some(class) = rc.resolve_class(code_ref)? else {
        return Ok(None);
    };
    let Some(def) = rc.env().class(class) else {
        return Ok(None);
    };
    let range = nova_core::cover(rc.range(args[0]), rc.range(args[args.len() - 1]));
    let message = if def.type_params.is_empty() {
        format!("Type '{}' does not have type parameters", def.simple_name())
    } else if def.type_params.len() != args.len() {
        format!(
            "Wrong number of type arguments: {}; required: {}",
            args.len(),
            def.type_params.len()
        )
    } else {
        return Ok(None);
    };
    Ok(Some(Diagnostic::error("wrong-type-argument-count", range, message)))
}

/// First type argument that violates the bound of its type parameter.
pub(crate) fn type_argument_bounds(rc: &RuleContext<'_>, code_ref: NodeId) -> CheckResult<Option<Diagnostic>> {
    let args = type_args(rc, code_ref);
    if args.is_empty() {
        return Ok(None);
    }
    let env = rc.env();
    let Some(class) = rc.resolve_class(code_ref)? else {
        return Ok(None);
    };
    let Some(def) = env.class(class) else {
        return Ok(None);
    };
    if def.type_params.len() != args.len() {
        return Ok(None);
    }
    let mut arg_types = Vec::with_capacity(args.len());
    for arg in args {
        arg_types.push(rc.type_of(*arg)?);
    }
    // Bounds see the captured arguments, so `B extends A` with `A` a wildcard
    // is checked against `CAP#n`.
    let mut cx = CaptureContext::new(env);
    let captured = match cx.capture_wildcards(&Type::class(class, arg_types.clone())) {
        Type::Class(ct) => ct.args,
        _ => arg_types.clone(),
    };
    let env: &dyn TypeEnv = &cx;
    let subst = def
        .type_params
        .iter()
        .zip(captured)
        .fold(Substitution::empty(), |s, (tp, ty)| s.put(*tp, Some(ty)));
    let object = Type::class(env.well_known().object, vec![]);

    for ((tp, arg), element) in def.type_params.iter().zip(&arg_types).zip(args) {
        if arg.contains_unknown() || arg.is_primitive() {
            continue;
        }
        let Some(param) = env.type_param(*tp) else {
            continue;
        };
        for declared in &param.upper_bounds {
            if *declared == object {
                continue;
            }
            let bound = subst.apply(env, declared);
            if bound.contains_unknown() || within_bound(env, arg, &bound) {
                continue;
            }
            let verb = match bound.class_id().and_then(|c| env.class(c)) {
                Some(b) if b.is_interface() => "implement",
                _ => "extend",
            };
            let arg_text = presentable_type(env, arg);
            let bound_text = presentable_type(env, &bound);
            let mut builder = Diagnostic::builder(
                Severity::Error,
                "type-argument-not-within-bounds",
                rc.range(*element),
            )
            .message(format!(
                "Type parameter '{arg_text}' is not within its bound; should {verb} '{bound_text}'"
            ));
            if matches!(arg, Type::Class(_) | Type::TypeVar(_)) && matches!(bound, Type::Class(_)) {
                builder = builder.fix(Fix::AddToExtendsList {
                    class: arg_text,
                    ty: bound_text,
                });
            }
            return Ok(Some(builder.build()));
        }
    }
    Ok(None)
}

fn within_bound(env: &dyn TypeEnv, arg: &Type, bound: &Type) -> bool {
    match arg {
        Type::Wildcard(WildcardBound::Unbounded) => true,
        Type::Wildcard(WildcardBound::Extends(upper)) => is_convertible(env, bound, upper),
        Type::Wildcard(WildcardBound::Super(lower)) => is_assignable(env, bound, lower),
        _ => is_assignable(env, bound, arg),
    }
}

/// `Outer<String>.Nested` where `Nested` is static.
pub(crate) fn static_class_from_parameterized(
    rc: &RuleContext<'_>,
    code_ref: NodeId,
) -> CheckResult<Option<Diagnostic>> {
    let NodeKind::CodeRef {
        qualifier: Some(qualifier),
        ..
    } = rc.kind(code_ref)
    else {
        return Ok(None);
    };
    if type_args(rc, *qualifier).is_empty() {
        return Ok(None);
    }
    let Some(class) = rc.resolve_class(code_ref)? else {
        return Ok(None);
    };
    let is_static = rc.env().class(class).is_some_and(|def| !def.is_inner());
    Ok(is_static.then(|| {
        Diagnostic::error(
            "static-class-from-parameterized",
            rc.range(code_ref),
            format!(
                "Cannot select static class '{}' from parameterized type",
                class_name(rc, class)
            ),
        )
    }))
}

pub(crate) fn primitive_type_argument(rc: &RuleContext<'_>, type_element: NodeId) -> CheckResult<Option<Diagnostic>> {
    let NodeKind::TypeElement {
        kind: TypeElementKind::Primitive(p),
    } = rc.kind(type_element)
    else {
        return Ok(None);
    };
    let is_type_arg = rc
        .ast
        .parent(type_element)
        .is_some_and(|parent| matches!(rc.kind(parent), NodeKind::CodeRef { .. }));
    if !is_type_arg {
        return Ok(None);
    }
    let boxed = p.boxed_name().rsplit('.').next().unwrap_or_default().to_string();
    Ok(Some(
        Diagnostic::builder(Severity::Error, "primitive-type-argument", rc.range(type_element))
            .message("Type argument cannot be of primitive type")
            .fix(Fix::ReplacePrimitiveWithBoxed { boxed })
            .build(),
    ))
}

/// Wildcards are type arguments only, and never of an instantiated type.
pub(crate) fn wildcard_usage(rc: &RuleContext<'_>, type_element: NodeId) -> CheckResult<Option<Diagnostic>> {
    let NodeKind::TypeElement {
        kind: TypeElementKind::Wildcard { .. },
    } = rc.kind(type_element)
    else {
        return Ok(None);
    };
    let Some(code_ref) = rc
        .ast
        .parent(type_element)
        .filter(|p| matches!(rc.kind(*p), NodeKind::CodeRef { .. }))
    else {
        return Ok(Some(Diagnostic::error(
            "wildcard-not-expected",
            rc.range(type_element),
            "No wildcard expected",
        )));
    };
    let instantiated = rc
        .ast
        .parent(code_ref)
        .and_then(|te| rc.ast.parent(te).map(|n| (te, n)))
        .is_some_and(|(te, n)| matches!(rc.kind(n), NodeKind::New { ty, .. } if *ty == te));
    if !instantiated {
        return Ok(None);
    }
    let text = presentable_type(rc.env(), &rc.type_of(type_element)?);
    Ok(Some(Diagnostic::error(
        "wildcard-instantiation",
        rc.range(type_element),
        format!("Wildcard type '{text}' cannot be instantiated directly"),
    )))
}

pub(crate) fn generic_throwable(rc: &RuleContext<'_>, list: NodeId) -> CheckResult<Option<Diagnostic>> {
    let NodeKind::ReferenceList {
        role: ReferenceListRole::Extends,
        types,
    } = rc.kind(list)
    else {
        return Ok(None);
    };
    let generic = rc.ast.parent(list).is_some_and(|class| {
        matches!(rc.kind(class), NodeKind::Class { type_params, .. } if !type_params.is_empty())
    });
    if !generic {
        return Ok(None);
    }
    let throwable = rc.env().well_known().throwable;
    for ty in types {
        if let Some(class) = rc.resolve_class(*ty)? {
            if is_subclass(rc.env(), class, throwable) {
                return Ok(Some(Diagnostic::error(
                    "generic-throwable",
                    rc.range(*ty),
                    "Generic class may not extend 'java.lang.Throwable'",
                )));
            }
        }
    }
    Ok(None)
}

pub(crate) fn type_parameter_instantiation(rc: &RuleContext<'_>, new: NodeId) -> CheckResult<Option<Diagnostic>> {
    let NodeKind::New { ty, array_dims: 0, .. } = rc.kind(new) else {
        return Ok(None);
    };
    let created = rc.type_of(*ty)?;
    let Type::TypeVar(_) = created else {
        return Ok(None);
    };
    Ok(Some(Diagnostic::error(
        "type-parameter-instantiation",
        rc.range(*ty),
        format!(
            "Type parameter '{}' cannot be instantiated directly",
            presentable_type(rc.env(), &created)
        ),
    )))
}

pub(crate) fn generic_array_creation(rc: &RuleContext<'_>, new: NodeId) -> CheckResult<Option<Diagnostic>> {
    let NodeKind::New { ty, array_dims, .. } = rc.kind(new) else {
        return Ok(None);
    };
    if *array_dims == 0 {
        return Ok(None);
    }
    let component = rc.type_of(*ty)?;
    if is_reifiable(rc.env(), &component) {
        return Ok(None);
    }
    Ok(Some(Diagnostic::error(
        "generic-array-creation",
        rc.range(new),
        "Generic array creation",
    )))
}

pub(crate) fn unchecked_cast(rc: &RuleContext<'_>, cast: NodeId) -> CheckResult<Option<Diagnostic>> {
    if !rc.config.report_unchecked_warnings {
        return Ok(None);
    }
    let NodeKind::Cast { ty, expr } = rc.kind(cast) else {
        return Ok(None);
    };
    let env = rc.env();
    let target = rc.type_of(*ty)?;
    let source = rc.expr_type(*expr)?;
    if target.contains_unknown()
        || source.contains_unknown()
        || is_reifiable(env, &target)
        || is_subtype(env, &source, &target)
    {
        return Ok(None);
    }
    Ok(Some(Diagnostic::warning(
        "unchecked-cast",
        rc.range(cast),
        format!(
            "Unchecked cast: '{}' to '{}'",
            presentable_type(env, &source),
            presentable_type(env, &target)
        ),
    )))
}

/// A generic member invoked through a raw receiver.
pub(crate) fn unchecked_call(rc: &RuleContext<'_>, call: NodeId) -> CheckResult<Option<Diagnostic>> {
    if !rc.config.report_unchecked_warnings {
        return Ok(None);
    }
    let NodeKind::MethodCall { method, .. } = rc.kind(call) else {
        return Ok(None);
    };
    let NodeKind::Reference {
        qualifier: Some(receiver),
        ..
    } = rc.kind(*method)
    else {
        return Ok(None);
    };
    let Some(resolved) = rc.resolve(*method)? else {
        return Ok(None);
    };
    let Some(method_id) = resolved.as_method() else {
        return Ok(None);
    };
    let env = rc.env();
    let receiver_ty = rc.expr_type(*receiver)?;
    if !is_raw(env, &receiver_ty) {
        return Ok(None);
    }
    let Some(def) = env.method(method_id) else {
        return Ok(None);
    };
    let class_vars = env
        .class(def.owner)
        .map(|c| c.type_params.clone())
        .unwrap_or_default();
    let generic_params = def
        .params
        .iter()
        .any(|p| mentions_any(p, &class_vars));
    if !generic_params {
        return Ok(None);
    }
    Ok(Some(Diagnostic::warning(
        "unchecked-call",
        rc.range(call),
        format!(
            "Unchecked call to '{}' as a member of raw type '{}'",
            format_method(env, method_id, &Substitution::empty()),
            format_type(env, &receiver_ty)
        ),
    )))
}

fn mentions_any(ty: &Type, vars: &[nova_types::TypeVarId]) -> bool {
    match ty {
        Type::TypeVar(v) => vars.contains(v),
        Type::Class(ct) => ct.args.iter().any(|a| mentions_any(a, vars)),
        Type::Array(c) => mentions_any(c, vars),
        Type::Wildcard(WildcardBound::Extends(b) | WildcardBound::Super(b)) => mentions_any(b, vars),
        Type::Intersection(parts) | Type::Disjunction(parts) => {
            parts.iter().any(|p| mentions_any(p, vars))
        }
        _ => false,
    }
}

/// Methods whose erasures coincide without one overriding the other.
///
/// Clashes between two methods of the class are reported on the later one;
/// clashes involving one declared method on that method; clashes between
/// two inherited methods on the class name.
pub(crate) fn same_erasure(
    rc: &RuleContext<'_>,
    caches: &mut PassCaches,
    class_decl: NodeId,
) -> CheckResult<Vec<Diagnostic>> {
    let env = rc.env();
    let Some(class) = rc.resolver.declared_class(class_decl) else {
        return Ok(Vec::new());
    };
    let Some(def) = env.class(class) else {
        return Ok(Vec::new());
    };
    let own: Vec<MethodId> = def
        .methods
        .iter()
        .copied()
        .filter(|m| env.method(*m).is_some_and(|d| !d.is_constructor))
        .collect();

    let mut out = Vec::new();
    let mut blamed: HashSet<MethodId> = HashSet::new();
    let groups = caches.methods_by_erasure(env, class_decl, &own);
    let mut clashes: Vec<(MethodId, MethodId)> = Vec::new();
    for methods in groups.values() {
        for (idx, later) in methods.iter().enumerate() {
            for earlier in &methods[..idx] {
                if !override_equivalent(env, *earlier, *later) {
                    clashes.push((*earlier, *later));
                }
            }
        }
    }
    clashes.sort_by_key(|(_, later)| own.iter().position(|m| m == later));
    for (earlier, later) in clashes {
        if !blamed.insert(later) {
            continue;
        }
        if let Some(decl) = rc.resolver.method_declaration(later) {
            out.push(Diagnostic::error(
                "same-erasure",
                rc.range(decl),
                format!(
                    "'{}' clashes with '{}'; both methods have same erasure",
                    format_method(env, later, &Substitution::empty()),
                    format_method(env, earlier, &Substitution::empty())
                ),
            ));
        }
    }

    let inherited: Vec<InheritedMethod> = visible_methods(env, class)
        .into_iter()
        .filter(|m| m.owner != class)
        .collect();
    let key = |m: &InheritedMethod| {
        m.signature(env)
            .map(|sig| nova_types::erased_signature(env, &sig))
    };

    for method in &own {
        if blamed.contains(method) {
            continue;
        }
        let Some(sig) = method_signature(env, *method, &Substitution::empty()) else {
            continue;
        };
        let own_key = nova_types::erased_signature(env, &sig);
        let clash = inherited.iter().find(|inh| {
            key(inh).as_ref() == Some(&own_key)
                && inh
                    .signature(env)
                    .is_some_and(|s| !are_override_equivalent(env, &sig, &s))
        });
        let (Some(clash), Some(decl)) = (clash, rc.resolver.method_declaration(*method)) else {
            continue;
        };
        blamed.insert(*method);
        out.push(Diagnostic::error(
            "same-erasure",
            rc.range(decl),
            format!(
                "'{}' in '{}' clashes with '{}' in '{}'; both methods have same erasure, yet neither overrides the other",
                format_method(env, *method, &Substitution::empty()),
                class_name(rc, class),
                format_method(env, clash.method, &clash.subst),
                class_name(rc, clash.owner)
            ),
        ));
    }

    'pairs: for (idx, b) in inherited.iter().enumerate() {
        for a in &inherited[..idx] {
            if a.owner == b.owner || key(a) != key(b) || key(a).is_none() {
                continue;
            }
            let (Some(sa), Some(sb)) = (a.signature(env), b.signature(env)) else {
                continue;
            };
            if are_override_equivalent(env, &sa, &sb) {
                continue;
            }
            out.push(Diagnostic::error(
                "same-erasure",
                rc.ast.name_range(class_decl),
                format!(
                    "'{}' in '{}' clashes with '{}' in '{}'; both methods have same erasure",
                    format_method(env, a.method, &a.subst),
                    class_name(rc, a.owner),
                    format_method(env, b.method, &b.subst),
                    class_name(rc, b.owner)
                ),
            ));
            break 'pairs;
        }
    }
    Ok(out)
}

fn override_equivalent(env: &dyn TypeEnv, a: MethodId, b: MethodId) -> bool {
    match (
        method_signature(env, a, &Substitution::empty()),
        method_signature(env, b, &Substitution::empty()),
    ) {
        (Some(sa), Some(sb)) => are_override_equivalent(env, &sa, &sb),
        _ => true,
    }
}

/// Two inherited override-equivalent methods the class does not override
/// whose return types are not substitutable for one another.
pub(crate) fn inherited_unrelated_returns(rc: &RuleContext<'_>, class_decl: NodeId) -> CheckResult<Option<Diagnostic>> {
    let env = rc.env();
    let Some(class) = rc.resolver.declared_class(class_decl) else {
        return Ok(None);
    };
    let visible = visible_methods(env, class);
    let own: Vec<_> = visible
        .iter()
        .filter(|m| m.owner == class)
        .filter_map(|m| m.signature(env))
        .collect();
    let inherited: Vec<&InheritedMethod> = visible.iter().filter(|m| m.owner != class).collect();
    for (idx, b) in inherited.iter().enumerate() {
        for a in &inherited[..idx] {
            if a.owner == b.owner
                || is_subclass(env, a.owner, b.owner)
                || is_subclass(env, b.owner, a.owner)
            {
                continue;
            }
            let (Some(sa), Some(sb)) = (a.signature(env), b.signature(env)) else {
                continue;
            };
            if !are_override_equivalent(env, &sa, &sb)
                || own.iter().any(|o| are_override_equivalent(env, o, &sa))
            {
                continue;
            }
            let (ra, rb) = (a.return_type(env), b.return_type(env));
            if is_return_type_substitutable(env, &ra, &rb) || is_return_type_substitutable(env, &rb, &ra) {
                continue;
            }
            return Ok(Some(Diagnostic::error(
                "incompatible-inherited-methods",
                rc.ast.name_range(class_decl),
                format!(
                    "'{}' in '{}' clashes with '{}' in '{}'; methods have unrelated return types",
                    format_method(env, a.method, &a.subst),
                    class_name(rc, a.owner),
                    format_method(env, b.method, &b.subst),
                    class_name(rc, b.owner)
                ),
            )));
        }
    }
    Ok(None)
}
