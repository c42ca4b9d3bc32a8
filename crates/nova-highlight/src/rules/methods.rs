//! Method and constructor declarations: overriding, bodies and constructor chains.

use std::collections::HashSet;

use nova_hir::{NodeId, NodeKind};
use nova_types::{
    access_rank, are_override_equivalent, format_method, is_checked_exception,
    is_effectively_abstract, is_return_type_substitutable, is_subtype, method_signature,
    presentable_type, super_methods, ClassKind, InheritedMethod, MethodDef, MethodId, Modifier,
    Substitution, TypeEnv,
};

use crate::caches::PassCaches;
use crate::context::{CheckResult, RuleContext};
use crate::diagnostic::Severity;
use crate::rules::annotations::annotation_class;
use crate::rules::class_name;
use crate::rules::classes::super_without_default_constructor;
use crate::{Diagnostic, Fix};

/// Declared method of `decl` together with its definition.
fn declared<'a>(rc: &RuleContext<'a>, decl: NodeId) -> Option<(MethodId, &'a MethodDef)> {
    let method = rc.resolver.declared_method(decl)?;
    Some((method, rc.env().method(method)?))
}

fn is_constructor_decl(rc: &RuleContext<'_>, decl: NodeId) -> bool {
    matches!(
        rc.kind(decl),
        NodeKind::Method {
            return_type: None,
            ..
        }
    )
}

fn method_body(rc: &RuleContext<'_>, decl: NodeId) -> Option<NodeId> {
    match rc.kind(decl) {
        NodeKind::Method { body, .. } => *body,
        _ => None,
    }
}

fn in_interface(rc: &RuleContext<'_>, decl: NodeId) -> bool {
    rc.ast
        .enclosing_class(decl)
        .is_some_and(|c| rc.is_interface_decl(c))
}

/// `this(...)` or `super(...)` opening a constructor body.
pub(crate) fn explicit_constructor_call(rc: &RuleContext<'_>, ctor: NodeId) -> Option<NodeId> {
    let body = method_body(rc, ctor)?;
    let NodeKind::Block { statements, .. } = rc.kind(body) else {
        return None;
    };
    let NodeKind::ExpressionStatement { expr } = rc.kind(*statements.first()?) else {
        return None;
    };
    let call = rc.ast.skip_parens(*expr);
    match rc.kind(call) {
        NodeKind::MethodCall { method, .. }
            if matches!(rc.kind(*method), NodeKind::This { .. } | NodeKind::Super { .. }) =>
        {
            Some(call)
        }
        _ => None,
    }
}

fn delegates_to_this(rc: &RuleContext<'_>, call: NodeId) -> Option<NodeId> {
    match rc.kind(call) {
        NodeKind::MethodCall { method, .. } if matches!(rc.kind(*method), NodeKind::This { .. }) => {
            Some(*method)
        }
        _ => None,
    }
}

/// Access level as seen by overriding: interface members are implicitly public.
fn effective_access(env: &dyn TypeEnv, method: &MethodDef) -> Modifier {
    let in_interface = env.class(method.owner).is_some_and(|c| c.is_interface());
    if in_interface && !method.modifiers.has(Modifier::Private) {
        Modifier::Public
    } else {
        method.modifiers.access()
    }
}

struct Overriding<'a> {
    method: MethodId,
    def: &'a MethodDef,
    supers: Vec<InheritedMethod>,
}

fn overriding<'a>(rc: &RuleContext<'a>, decl: NodeId) -> Option<Overriding<'a>> {
    let (method, def) = declared(rc, decl)?;
    if def.is_constructor || def.modifiers.has(Modifier::Private) {
        return None;
    }
    let supers = super_methods(rc.env(), def.owner, method)
        .into_iter()
        .filter(|s| {
            // Static interface methods are not inherited.
            rc.env().method(s.method).is_some_and(|d| {
                !(d.is_static() && rc.env().class(d.owner).is_some_and(|c| c.is_interface()))
            })
        })
        .collect();
    Some(Overriding {
        method,
        def,
        supers,
    })
}

/// `'m()' in 'C' cannot override 'm()' in 'S'`
fn clash_prefix(rc: &RuleContext<'_>, o: &Overriding<'_>, sup: &InheritedMethod) -> String {
    let env = rc.env();
    let verb = if is_effectively_abstract(env, sup.method) && !is_effectively_abstract(env, o.method) {
        "implement"
    } else {
        "override"
    };
    format!(
        "'{}' in '{}' cannot {verb} '{}' in '{}'",
        format_method(env, o.method, &Substitution::empty()),
        class_name(rc, o.def.owner),
        format_method(env, sup.method, &sup.subst),
        class_name(rc, sup.owner)
    )
}

pub(crate) fn can_have_body(rc: &RuleContext<'_>, decl: NodeId) -> CheckResult<Option<Diagnostic>> {
    let NodeKind::Method {
        modifiers,
        body: Some(_),
        ..
    } = rc.kind(decl)
    else {
        return Ok(None);
    };
    let present = rc.modifiers_of(*modifiers);
    let message = if present.contains(&Modifier::Abstract) {
        "Abstract methods cannot have a body"
    } else if present.contains(&Modifier::Native) {
        "Native methods cannot have a body"
    } else if in_interface(rc, decl)
        && !is_constructor_decl(rc, decl)
        && !present
            .iter()
            .any(|m| matches!(m, Modifier::Default | Modifier::Static | Modifier::Private))
    {
        "Interface abstract methods cannot have body"
    } else {
        return Ok(None);
    };
    Ok(Some(
        Diagnostic::builder(Severity::Error, "method-body-not-allowed", rc.ast.name_range(decl))
            .message(message)
            .fix(Fix::DeleteMethodBody)
            .build(),
    ))
}

pub(crate) fn incompatible_return_type(rc: &RuleContext<'_>, decl: NodeId) -> CheckResult<Option<Diagnostic>> {
    let Some(o) = overriding(rc, decl) else {
        return Ok(None);
    };
    if o.def.is_static() {
        return Ok(None);
    }
    let env = rc.env();
    let ret = &o.def.return_type;
    if ret.contains_unknown() {
        return Ok(None);
    }
    for sup in &o.supers {
        let sup_ret = sup.return_type(env);
        if sup_ret.contains_unknown() || is_return_type_substitutable(env, ret, &sup_ret) {
            continue;
        }
        let range = match rc.kind(decl) {
            NodeKind::Method {
                return_type: Some(ty),
                ..
            } => rc.range(*ty),
            _ => rc.ast.name_range(decl),
        };
        return Ok(Some(
            Diagnostic::builder(Severity::Error, "incompatible-return-type", range)
                .message(format!(
                    "{}; attempting to use incompatible return type",
                    clash_prefix(rc, &o, sup)
                ))
                .fix(Fix::ChangeReturnType {
                    new_type: presentable_type(env, &sup_ret),
                })
                .build(),
        ));
    }
    Ok(None)
}

pub(crate) fn incompatible_throws(rc: &RuleContext<'_>, decl: NodeId) -> CheckResult<Option<Diagnostic>> {
    let Some(o) = overriding(rc, decl) else {
        return Ok(None);
    };
    let env = rc.env();
    for sup in &o.supers {
        let Some(sup_def) = env.method(sup.method) else {
            continue;
        };
        let sup_throws: Vec<_> = sup_def.throws.iter().map(|t| sup.subst.apply(env, t)).collect();
        let offending = o.def.throws.iter().find(|t| {
            !t.contains_unknown()
                && is_checked_exception(env, t)
                && !sup_throws.iter().any(|s| is_subtype(env, t, s))
        });
        let Some(offending) = offending else {
            continue;
        };
        let range = match rc.kind(decl) {
            NodeKind::Method {
                throws: Some(list), ..
            } => rc.range(*list),
            _ => rc.ast.name_range(decl),
        };
        return Ok(Some(Diagnostic::error(
            "incompatible-throws",
            range,
            format!(
                "{}; overridden method does not throw '{}'",
                clash_prefix(rc, &o, sup),
                presentable_type(env, offending)
            ),
        )));
    }
    Ok(None)
}

pub(crate) fn weaker_access(rc: &RuleContext<'_>, decl: NodeId) -> CheckResult<Option<Diagnostic>> {
    let Some(o) = overriding(rc, decl) else {
        return Ok(None);
    };
    if o.def.is_static() {
        return Ok(None);
    }
    let env = rc.env();
    let own = effective_access(env, o.def);
    for sup in &o.supers {
        let Some(sup_def) = env.method(sup.method) else {
            continue;
        };
        let theirs = effective_access(env, sup_def);
        if access_rank(own) >= access_rank(theirs) {
            continue;
        }
        let NodeKind::Method { modifiers, .. } = rc.kind(decl) else {
            return Ok(None);
        };
        return Ok(Some(
            Diagnostic::builder(Severity::Error, "weaker-access", rc.ast.name_range(decl))
                .message(format!(
                    "{}; attempting to assign weaker access privileges ('{}'); was '{}'",
                    clash_prefix(rc, &o, sup),
                    own.keyword(),
                    theirs.keyword()
                ))
                .fix_with_range(Fix::AddModifier { modifier: theirs }, rc.range(*modifiers))
                .build(),
        ));
    }
    Ok(None)
}

pub(crate) fn overrides_final(rc: &RuleContext<'_>, decl: NodeId) -> CheckResult<Option<Diagnostic>> {
    let Some(o) = overriding(rc, decl) else {
        return Ok(None);
    };
    if o.def.is_static() {
        return Ok(None);
    }
    let env = rc.env();
    let final_super = o
        .supers
        .iter()
        .find(|s| env.method(s.method).is_some_and(|d| d.modifiers.has(Modifier::Final)));
    Ok(final_super.map(|sup| {
        Diagnostic::error(
            "overrides-final",
            rc.ast.name_range(decl),
            format!(
                "'{}' cannot override '{}' in '{}'; overridden method is final",
                format_method(env, o.method, &Substitution::empty()),
                format_method(env, sup.method, &sup.subst),
                class_name(rc, sup.owner)
            ),
        )
    }))
}

pub(crate) fn missing_body(rc: &RuleContext<'_>, decl: NodeId) -> CheckResult<Option<Diagnostic>> {
    let NodeKind::Method {
        modifiers,
        body: None,
        ..
    } = rc.kind(decl)
    else {
        return Ok(None);
    };
    let present = rc.modifiers_of(*modifiers);
    let needs_body = if in_interface(rc, decl) {
        present
            .iter()
            .any(|m| matches!(m, Modifier::Default | Modifier::Static | Modifier::Private))
    } else {
        !present
            .iter()
            .any(|m| matches!(m, Modifier::Abstract | Modifier::Native))
    };
    Ok(needs_body.then(|| {
        Diagnostic::builder(Severity::Error, "missing-method-body", rc.ast.name_range(decl))
            .message("Missing method body, or declare abstract")
            .fix(Fix::AddMethodBody)
            .build()
    }))
}

/// Override-equivalent with a method declared earlier in the same class.
pub(crate) fn duplicate_method(
    rc: &RuleContext<'_>,
    caches: &mut PassCaches,
    decl: NodeId,
) -> CheckResult<Option<Diagnostic>> {
    let Some((method, def)) = declared(rc, decl) else {
        return Ok(None);
    };
    let env = rc.env();
    let Some(class_decl) = rc.ast.enclosing_class(decl) else {
        return Ok(None);
    };
    let Some(class) = env.class(def.owner) else {
        return Ok(None);
    };
    let Some(sig) = method_signature(env, method, &Substitution::empty()) else {
        return Ok(None);
    };
    let same_kind: Vec<MethodId> = class
        .methods
        .iter()
        .copied()
        .filter(|m| env.method(*m).is_some_and(|d| d.is_constructor == def.is_constructor))
        .collect();
    let earlier: Vec<MethodId> = if def.is_constructor {
        same_kind
            .iter()
            .copied()
            .take_while(|m| *m != method)
            .collect()
    } else {
        let groups = caches.methods_by_erasure(env, class_decl, &same_kind);
        groups
            .values()
            .find(|group| group.contains(&method))
            .map(|group| group.iter().copied().take_while(|m| *m != method).collect())
            .unwrap_or_default()
    };
    let duplicate = earlier.into_iter().any(|other| {
        method_signature(env, other, &Substitution::empty())
            .is_some_and(|s| are_override_equivalent(env, &sig, &s))
    });
    Ok(duplicate.then(|| {
        Diagnostic::error(
            "duplicate-method",
            rc.ast.name_range(decl),
            format!(
                "'{}' is already defined in '{}'",
                format_method(env, method, &Substitution::empty()),
                class_name(rc, def.owner)
            ),
        )
    }))
}

/// A constructor without `this(...)`/`super(...)` implicitly calls `super()`.
pub(crate) fn constructor_calls_base(rc: &RuleContext<'_>, decl: NodeId) -> CheckResult<Option<Diagnostic>> {
    if !is_constructor_decl(rc, decl) || method_body(rc, decl).is_none() {
        return Ok(None);
    }
    if explicit_constructor_call(rc, decl).is_some() {
        return Ok(None);
    }
    let Some(class_decl) = rc.ast.enclosing_class(decl) else {
        return Ok(None);
    };
    if !matches!(
        rc.kind(class_decl),
        NodeKind::Class {
            kind: ClassKind::Class,
            ..
        }
    ) {
        return Ok(None);
    }
    let Some(class) = rc.resolver.declared_class(class_decl) else {
        return Ok(None);
    };
    Ok(super_without_default_constructor(rc.env(), class).map(|sup| {
        Diagnostic::error(
            "no-default-constructor",
            rc.ast.name_range(decl),
            format!(
                "There is no default constructor available in '{}'",
                class_name(rc, sup)
            ),
        )
    }))
}

pub(crate) fn static_instance_clash(rc: &RuleContext<'_>, decl: NodeId) -> CheckResult<Option<Diagnostic>> {
    let Some(o) = overriding(rc, decl) else {
        return Ok(None);
    };
    let env = rc.env();
    for sup in &o.supers {
        let Some(sup_def) = env.method(sup.method) else {
            continue;
        };
        let reason = match (o.def.is_static(), sup_def.is_static()) {
            (true, false) => "overriding method is static",
            (false, true) => "overridden method is static",
            _ => continue,
        };
        return Ok(Some(Diagnostic::error(
            "static-instance-override",
            rc.ast.name_range(decl),
            format!("{}; {reason}", clash_prefix(rc, &o, sup)),
        )));
    }
    Ok(None)
}

/// A constructor chain of `this(...)` calls that leads back to itself.
pub(crate) fn recursive_constructor_invocation(
    rc: &RuleContext<'_>,
    decl: NodeId,
) -> CheckResult<Option<Diagnostic>> {
    let Some(start) = rc.resolver.declared_method(decl) else {
        return Ok(None);
    };
    let Some(first_call) = explicit_constructor_call(rc, decl) else {
        return Ok(None);
    };
    let mut visited = HashSet::from([start]);
    let mut call = first_call;
    loop {
        let Some(this_ref) = delegates_to_this(rc, call) else {
            return Ok(None);
        };
        let Some(target) = rc.resolve(this_ref)?.and_then(|r| r.as_method()) else {
            return Ok(None);
        };
        if target == start {
            return Ok(Some(Diagnostic::error(
                "recursive-constructor-invocation",
                rc.range(first_call),
                "Recursive constructor invocation",
            )));
        }
        if !visited.insert(target) {
            return Ok(None);
        }
        let Some(next) = rc
            .resolver
            .method_declaration(target)
            .and_then(|d| explicit_constructor_call(rc, d))
        else {
            return Ok(None);
        };
        call = next;
    }
}

fn find_annotation(rc: &RuleContext<'_>, decl: NodeId, class: nova_types::ClassId) -> CheckResult<Option<NodeId>> {
    let Some(list) = rc.kind(decl).modifier_list() else {
        return Ok(None);
    };
    for annotation in rc.annotations_of(list) {
        if annotation_class(rc, *annotation)? == Some(class) {
            return Ok(Some(*annotation));
        }
    }
    Ok(None)
}

pub(crate) fn override_annotation(rc: &RuleContext<'_>, decl: NodeId) -> CheckResult<Option<Diagnostic>> {
    let env = rc.env();
    let Some(annotation) = find_annotation(rc, decl, env.well_known().override_)? else {
        return Ok(None);
    };
    let Some((method, def)) = declared(rc, decl) else {
        return Ok(None);
    };
    let supers = if def.is_static() || def.is_constructor {
        Vec::new()
    } else {
        overriding(rc, decl).map(|o| o.supers).unwrap_or_default()
    };
    let range = rc.range(annotation);
    if supers.is_empty() {
        return Ok(Some(
            Diagnostic::builder(Severity::Error, "method-does-not-override", range)
                .message("Method does not override method from its superclass")
                .fix(Fix::PullUpAsAbstract {
                    method: format_method(env, method, &Substitution::empty()),
                })
                .build(),
        ));
    }
    let only_interfaces = supers
        .iter()
        .all(|s| env.class(s.owner).is_some_and(|c| c.is_interface()));
    if only_interfaces && !rc.level.is_at_least(6) {
        return Ok(Some(Diagnostic::error(
            "override-on-interface-method",
            range,
            "@Override is not allowed when implementing interface method",
        )));
    }
    Ok(None)
}

pub(crate) fn safe_varargs(rc: &RuleContext<'_>, decl: NodeId) -> CheckResult<Option<Diagnostic>> {
    let env = rc.env();
    let Some(annotation) = find_annotation(rc, decl, env.well_known().safe_varargs)? else {
        return Ok(None);
    };
    let Some((_, def)) = declared(rc, decl) else {
        return Ok(None);
    };
    let range = rc.range(annotation);
    if !def.is_varargs {
        return Ok(Some(Diagnostic::error(
            "safe-varargs-misuse",
            range,
            "@SafeVarargs is not allowed on methods with fixed arity",
        )));
    }
    let private_ok = rc.level.is_at_least(9) && def.modifiers.has(Modifier::Private);
    let sealed = def.is_constructor
        || def.is_static()
        || def.modifiers.has(Modifier::Final)
        || private_ok;
    Ok((!sealed).then(|| {
        Diagnostic::error(
            "safe-varargs-misuse",
            range,
            "@SafeVarargs is not allowed on non-final instance methods",
        )
    }))
}

pub(crate) fn constructor_in_interface(rc: &RuleContext<'_>, decl: NodeId) -> CheckResult<Option<Diagnostic>> {
    let applies = is_constructor_decl(rc, decl) && in_interface(rc, decl);
    Ok(applies.then(|| {
        Diagnostic::error(
            "not-allowed-in-interface",
            rc.ast.name_range(decl),
            "Not allowed in interface",
        )
    }))
}

/// Constructors reachable from `ctor` by `this(...)` delegation, `ctor` first.
fn delegation_chain(rc: &RuleContext<'_>, ctor: NodeId) -> CheckResult<Vec<NodeId>> {
    let mut chain = vec![ctor];
    let mut current = ctor;
    while let Some(this_ref) = explicit_constructor_call(rc, current).and_then(|c| delegates_to_this(rc, c)) {
        let next = rc
            .resolve(this_ref)?
            .and_then(|r| r.as_method())
            .and_then(|m| rc.resolver.method_declaration(m));
        match next {
            Some(next) if !chain.contains(&next) => {
                chain.push(next);
                current = next;
            }
            _ => break,
        }
    }
    Ok(chain)
}

fn assigns(rc: &RuleContext<'_>, region: Option<NodeId>, field: NodeId) -> CheckResult<bool> {
    match region {
        Some(region) => Ok(rc.flow.control_flow(region)?.is_definitely_assigned(field)),
        None => Ok(false),
    }
}

/// Blank final fields must be definitely assigned by an initializer or,
/// for instance fields, by every constructor (directly or through `this(...)`).
pub(crate) fn final_field_initialized(rc: &RuleContext<'_>, field: NodeId) -> CheckResult<Option<Diagnostic>> {
    let NodeKind::Field {
        modifiers,
        name,
        initializer: None,
        ..
    } = rc.kind(field)
    else {
        return Ok(None);
    };
    if !rc.has_modifier(*modifiers, Modifier::Final) {
        return Ok(None);
    }
    let Some(class_decl) = rc.ast.enclosing_class(field) else {
        return Ok(None);
    };
    if rc.is_interface_decl(class_decl) {
        return Ok(None);
    }
    let NodeKind::Class { members, .. } = rc.kind(class_decl) else {
        return Ok(None);
    };
    let is_static = rc.has_modifier(*modifiers, Modifier::Static);

    for member in members {
        if let NodeKind::Initializer {
            modifiers: init_modifiers,
            body,
        } = rc.kind(*member)
        {
            if rc.has_modifier(*init_modifiers, Modifier::Static) == is_static
                && assigns(rc, Some(*body), field)?
            {
                return Ok(None);
            }
        }
    }

    if !is_static {
        let ctors: Vec<NodeId> = members
            .iter()
            .copied()
            .filter(|m| is_constructor_decl(rc, *m))
            .collect();
        let mut all_assign = !ctors.is_empty();
        for ctor in &ctors {
            let mut assigned = false;
            for link in delegation_chain(rc, *ctor)? {
                if assigns(rc, method_body(rc, link), field)? {
                    assigned = true;
                    break;
                }
            }
            if !assigned {
                all_assign = false;
                break;
            }
        }
        if all_assign {
            return Ok(None);
        }
    }

    Ok(Some(
        Diagnostic::builder(Severity::Error, "variable-not-initialized", rc.ast.name_range(field))
            .message(format!("Variable '{name}' might not have been initialized"))
            .fix(Fix::AddInitializer {
                variable: name.to_string(),
            })
            .build(),
    ))
}
