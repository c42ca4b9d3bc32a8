//! Class declarations: inheritance, abstractness, constructors and instantiation.

use std::collections::HashSet;

use nova_core::JavaFeature;
use nova_hir::{NodeId, NodeKind, ReferenceListRole};
use nova_types::{
    abstract_methods, all_supertypes, format_method, is_same_type, is_subclass, presentable_type,
    ClassId, ClassKind, ClassType, Type, TypeEnv,
};

use crate::context::{CheckResult, RuleContext};
use crate::diagnostic::Severity;
use crate::rules::class_name;
use crate::rules::features::check_feature;
use crate::{Diagnostic, Fix};

fn class_kind(rc: &RuleContext<'_>, decl: NodeId) -> Option<ClassKind> {
    match rc.kind(decl) {
        NodeKind::Class { kind, .. } => Some(*kind),
        _ => None,
    }
}

fn is_anonymous(rc: &RuleContext<'_>, decl: NodeId) -> bool {
    matches!(rc.kind(decl), NodeKind::Class { anonymous: true, .. })
}

/// Same simple name as a sibling member class declared earlier or as an
/// enclosing class.
pub(crate) fn duplicate_nested_class(rc: &RuleContext<'_>, decl: NodeId) -> CheckResult<Option<Diagnostic>> {
    let Some(name) = rc.ast.name(decl).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };
    let Some(parent) = rc.ast.parent(decl) else {
        return Ok(None);
    };
    let siblings: &[NodeId] = match rc.kind(parent) {
        NodeKind::Class { members, .. } => members,
        NodeKind::Block { statements, .. } => statements,
        _ => return Ok(None),
    };
    let earlier = siblings
        .iter()
        .take_while(|s| **s != decl)
        .any(|s| matches!(rc.kind(*s), NodeKind::Class { name: other, .. } if other == name));
    let enclosing = rc
        .ast
        .ancestors(decl)
        .any(|a| matches!(rc.kind(a), NodeKind::Class { name: other, .. } if other == name));
    Ok((earlier || enclosing).then(|| {
        Diagnostic::error(
            "duplicate-class",
            rc.ast.name_range(decl),
            format!("Duplicate class: '{name}'"),
        )
    }))
}

pub(crate) fn must_be_abstract(rc: &RuleContext<'_>, decl: NodeId) -> CheckResult<Option<Diagnostic>> {
    if class_kind(rc, decl) != Some(ClassKind::Class) {
        return Ok(None);
    }
    let env = rc.env();
    let Some(class) = rc.resolver.declared_class(decl) else {
        return Ok(None);
    };
    if env.class(class).is_some_and(|def| def.is_abstract()) {
        return Ok(None);
    }
    let Some(missing) = abstract_methods(env, class).into_iter().next() else {
        return Ok(None);
    };
    let method = format_method(env, missing.method, &missing.subst);
    let owner = class_name(rc, missing.owner);
    let range = if is_anonymous(rc, decl) {
        rc.range(decl)
    } else {
        rc.ast.name_range(decl)
    };
    let builder = Diagnostic::builder(Severity::Error, "class-must-be-abstract", range);
    let diagnostic = if is_anonymous(rc, decl) {
        builder
            .message(format!(
                "Class must implement abstract method '{method}' in '{owner}'"
            ))
            .fix(Fix::ImplementMethods)
            .build()
    } else {
        let name = class_name(rc, class);
        builder
            .message(format!(
                "Class '{name}' must either be declared abstract or implement abstract method '{method}' in '{owner}'"
            ))
            .fix(Fix::ImplementMethods)
            .fix(Fix::MakeClassAbstract { class: name })
            .build()
    };
    Ok(Some(diagnostic))
}

/// Superclass of `class` when it declares constructors but none without arguments.
pub(crate) fn super_without_default_constructor(env: &dyn TypeEnv, class: ClassId) -> Option<ClassId> {
    let sup = env.class(class)?.super_class.as_ref()?.class_id()?;
    let ctors: Vec<_> = env
        .class(sup)?
        .methods
        .iter()
        .filter_map(|m| env.method(*m))
        .filter(|m| m.is_constructor)
        .collect();
    let has_default = ctors.is_empty()
        || ctors
            .iter()
            .any(|c| c.params.is_empty() || (c.is_varargs && c.params.len() == 1));
    (!has_default).then_some(sup)
}

/// A class without constructors gets an implicit one calling `super()`.
pub(crate) fn implicit_constructor(rc: &RuleContext<'_>, decl: NodeId) -> CheckResult<Option<Diagnostic>> {
    let NodeKind::Class {
        kind: ClassKind::Class,
        members,
        anonymous: false,
        ..
    } = rc.kind(decl)
    else {
        return Ok(None);
    };
    let declares_constructor = members.iter().any(|m| {
        matches!(
            rc.kind(*m),
            NodeKind::Method {
                return_type: None,
                ..
            }
        )
    });
    if declares_constructor {
        return Ok(None);
    }
    let Some(class) = rc.resolver.declared_class(decl) else {
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

/// Walks declared supertypes with the current path as visited set.
pub(crate) fn cyclic_inheritance(rc: &RuleContext<'_>, decl: NodeId) -> CheckResult<Option<Diagnostic>> {
    fn reaches(env: &dyn TypeEnv, from: ClassId, target: ClassId, path: &mut HashSet<ClassId>) -> bool {
        if !path.insert(from) {
            return false;
        }
        let found = env.class(from).is_some_and(|def| {
            def.super_class
                .iter()
                .chain(&def.interfaces)
                .filter_map(Type::class_id)
                .any(|sup| sup == target || reaches(env, sup, target, path))
        });
        path.remove(&from);
        found
    }

    let Some(class) = rc.resolver.declared_class(decl) else {
        return Ok(None);
    };
    if !reaches(rc.env(), class, class, &mut HashSet::new()) {
        return Ok(None);
    }
    Ok(Some(Diagnostic::error(
        "cyclic-inheritance",
        rc.ast.name_range(decl),
        format!("Cyclic inheritance involving '{}'", class_name(rc, class)),
    )))
}

/// The same generic interface reached twice with different arguments.
pub(crate) fn interface_multiple_inheritance(rc: &RuleContext<'_>, decl: NodeId) -> CheckResult<Option<Diagnostic>> {
    let env = rc.env();
    let Some(class) = rc.resolver.declared_class(decl) else {
        return Ok(None);
    };
    let supertypes = all_supertypes(env, class);
    for (idx, b) in supertypes.iter().enumerate() {
        let Some(a) = supertypes[..idx].iter().find(|a| a.def == b.def) else {
            continue;
        };
        if a.args.is_empty() || b.args.is_empty() || same_args(env, a, b) {
            continue;
        }
        return Ok(Some(Diagnostic::error(
            "inconsistent-type-arguments",
            rc.ast.name_range(decl),
            format!(
                "'{}' cannot be inherited with different type arguments: '{}' and '{}'",
                class_name(rc, a.def),
                args_text(env, a),
                args_text(env, b)
            ),
        )));
    }
    Ok(None)
}

fn same_args(env: &dyn TypeEnv, a: &ClassType, b: &ClassType) -> bool {
    a.args.len() == b.args.len()
        && a.args
            .iter()
            .zip(&b.args)
            .all(|(x, y)| x.contains_unknown() || y.contains_unknown() || is_same_type(env, x, y))
}

fn args_text(env: &dyn TypeEnv, ty: &ClassType) -> String {
    ty.args
        .iter()
        .map(|a| presentable_type(env, a))
        .collect::<Vec<_>>()
        .join(",")
}

/// Another source file of the module declares the same top-level class.
pub(crate) fn duplicate_top_level_class(rc: &RuleContext<'_>, decl: NodeId) -> CheckResult<Option<Diagnostic>> {
    let top_level = rc
        .ast
        .parent(decl)
        .is_some_and(|p| matches!(rc.kind(p), NodeKind::File { .. }));
    if !top_level {
        return Ok(None);
    }
    let Some(def) = rc
        .resolver
        .declared_class(decl)
        .and_then(|c| rc.env().class(c))
    else {
        return Ok(None);
    };
    let files = rc.resolver.files_declaring(&def.name)?;
    let other = files.iter().find(|path| {
        let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
        file_name != rc.ast.file_name()
    });
    Ok(other.map(|path| {
        Diagnostic::error(
            "duplicate-class",
            rc.ast.name_range(decl),
            format!("Duplicate class found in the file '{path}'"),
        )
    }))
}

/// Enums and interfaces declared in a block.
pub(crate) fn local_enum_or_interface(rc: &RuleContext<'_>, decl: NodeId) -> CheckResult<Option<Diagnostic>> {
    let local = rc
        .ast
        .parent(decl)
        .is_some_and(|p| matches!(rc.kind(p), NodeKind::Block { .. }));
    match class_kind(rc, decl) {
        Some(ClassKind::Enum | ClassKind::Interface | ClassKind::Annotation) if local => Ok(check_feature(
            rc,
            JavaFeature::LocalEnumsAndInterfaces,
            rc.ast.name_range(decl),
        )),
        _ => Ok(None),
    }
}

fn list_owner(rc: &RuleContext<'_>, list: NodeId) -> Option<(ReferenceListRole, ClassKind, NodeId)> {
    let NodeKind::ReferenceList { role, .. } = rc.kind(list) else {
        return None;
    };
    let class = rc.ast.parent(list)?;
    Some((*role, class_kind(rc, class)?, class))
}

pub(crate) fn extends_allowed(rc: &RuleContext<'_>, list: NodeId) -> CheckResult<Option<Diagnostic>> {
    match list_owner(rc, list) {
        Some((ReferenceListRole::Extends, ClassKind::Enum, _)) => Ok(Some(Diagnostic::error(
            "extends-not-allowed",
            rc.range(list),
            "No extends clause allowed for enum",
        ))),
        _ => Ok(None),
    }
}

pub(crate) fn implements_allowed(rc: &RuleContext<'_>, list: NodeId) -> CheckResult<Option<Diagnostic>> {
    match list_owner(rc, list) {
        Some((ReferenceListRole::Implements, kind, _)) if kind.is_interface() => {
            Ok(Some(Diagnostic::error(
                "implements-not-allowed",
                rc.range(list),
                "No implements clause allowed for interface",
            )))
        }
        _ => Ok(None),
    }
}

pub(crate) fn extends_single_class(rc: &RuleContext<'_>, list: NodeId) -> CheckResult<Option<Diagnostic>> {
    let Some((ReferenceListRole::Extends, ClassKind::Class, _)) = list_owner(rc, list) else {
        return Ok(None);
    };
    let NodeKind::ReferenceList { types, .. } = rc.kind(list) else {
        return Ok(None);
    };
    Ok(types.get(1).map(|second| {
        Diagnostic::error(
            "multiple-superclasses",
            rc.range(*second),
            "Class cannot extend multiple classes",
        )
    }))
}

/// Reference list holding `code_ref` as one of its entries.
fn enclosing_list(rc: &RuleContext<'_>, code_ref: NodeId) -> Option<NodeId> {
    let parent = rc.ast.parent(code_ref)?;
    match rc.kind(parent) {
        NodeKind::ReferenceList { .. } => Some(parent),
        NodeKind::TypeElement { .. } => rc
            .ast
            .parent(parent)
            .filter(|p| matches!(rc.kind(*p), NodeKind::ReferenceList { .. })),
        _ => None,
    }
}

/// `extends`/`implements` entries must name a class or an interface as appropriate.
pub(crate) fn inheritance_target(rc: &RuleContext<'_>, code_ref: NodeId) -> CheckResult<Option<Diagnostic>> {
    let Some((role, kind, _)) = enclosing_list(rc, code_ref).and_then(|l| list_owner(rc, l)) else {
        return Ok(None);
    };
    let Some(target) = rc.resolve_class(code_ref)? else {
        return Ok(None);
    };
    let Some(def) = rc.env().class(target) else {
        return Ok(None);
    };
    let range = rc.range(code_ref);
    let name = def.simple_name().to_string();
    let diagnostic = match (role, kind) {
        (ReferenceListRole::Extends, ClassKind::Class) if def.is_interface() => {
            Diagnostic::error("interface-not-expected", range, "No interface expected here")
        }
        (ReferenceListRole::Extends, ClassKind::Class) if def.kind == ClassKind::Enum => {
            Diagnostic::error("inherit-from-enum", range, format!("Cannot inherit from enum '{name}'"))
        }
        (ReferenceListRole::Extends, ClassKind::Class) if def.is_final() => {
            Diagnostic::error("inherit-from-final", range, format!("Cannot inherit from final '{name}'"))
        }
        (ReferenceListRole::Implements, ClassKind::Class | ClassKind::Enum)
        | (ReferenceListRole::Extends, ClassKind::Interface | ClassKind::Annotation)
            if !def.is_interface() =>
        {
            Diagnostic::error("interface-expected", range, "Interface expected here")
        }
        _ => return Ok(None),
    };
    Ok(Some(diagnostic))
}

fn created_class(rc: &RuleContext<'_>, new: NodeId) -> CheckResult<Option<ClassId>> {
    match rc.kind(new) {
        NodeKind::New {
            ty, array_dims: 0, ..
        } => rc.resolve_class(*ty),
        _ => Ok(None),
    }
}

pub(crate) fn anonymous_extends_final(rc: &RuleContext<'_>, new: NodeId) -> CheckResult<Option<Diagnostic>> {
    let NodeKind::New {
        ty,
        anonymous_body: Some(_),
        ..
    } = rc.kind(new)
    else {
        return Ok(None);
    };
    let Some(class) = created_class(rc, new)? else {
        return Ok(None);
    };
    let final_class = rc.env().class(class).filter(|def| def.is_final() || def.kind == ClassKind::Enum);
    Ok(final_class.map(|def| {
        Diagnostic::error(
            "inherit-from-final",
            rc.range(*ty),
            format!("Cannot inherit from final '{}'", def.simple_name()),
        )
    }))
}

/// `new Inner()` from a static context of the outer class.
pub(crate) fn inner_class_from_static_context(rc: &RuleContext<'_>, new: NodeId) -> CheckResult<Option<Diagnostic>> {
    let NodeKind::New {
        qualifier: None,
        ty,
        ..
    } = rc.kind(new)
    else {
        return Ok(None);
    };
    let Some(class) = created_class(rc, new)? else {
        return Ok(None);
    };
    let env = rc.env();
    let Some(outer) = env
        .class(class)
        .filter(|def| def.is_inner())
        .and_then(|def| def.outer)
    else {
        return Ok(None);
    };
    let from_outer = rc
        .enclosing_class_id(new)
        .is_some_and(|enclosing| is_subclass(env, enclosing, outer));
    if !from_outer || !rc.is_static_context(new) {
        return Ok(None);
    }
    Ok(Some(Diagnostic::error(
        "static-context",
        rc.range(*ty),
        format!(
            "'{}.this' cannot be referenced from a static context",
            class_name(rc, outer)
        ),
    )))
}

pub(crate) fn abstract_instantiation(rc: &RuleContext<'_>, new: NodeId) -> CheckResult<Option<Diagnostic>> {
    let NodeKind::New {
        ty,
        anonymous_body: None,
        ..
    } = rc.kind(new)
    else {
        return Ok(None);
    };
    let Some(class) = created_class(rc, new)? else {
        return Ok(None);
    };
    let abstract_class = rc
        .env()
        .class(class)
        .filter(|def| def.is_abstract() && def.kind != ClassKind::Enum);
    Ok(abstract_class.map(|def| {
        Diagnostic::error(
            "abstract-instantiation",
            rc.range(*ty),
            format!("'{}' is abstract; cannot be instantiated", def.simple_name()),
        )
    }))
}

pub(crate) fn enum_instantiation(rc: &RuleContext<'_>, new: NodeId) -> CheckResult<Option<Diagnostic>> {
    let Some(class) = created_class(rc, new)? else {
        return Ok(None);
    };
    let is_enum = rc
        .env()
        .class(class)
        .is_some_and(|def| def.kind == ClassKind::Enum);
    Ok(is_enum.then(|| {
        Diagnostic::error(
            "enum-instantiation",
            rc.range(new),
            "Enum types cannot be instantiated",
        )
    }))
}
