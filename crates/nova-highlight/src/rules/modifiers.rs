//! Checks run on a single modifier keyword.

use nova_core::JavaFeature;
use nova_hir::{NodeId, NodeKind};
use nova_types::{ClassKind, Modifier};

use crate::context::{CheckResult, RuleContext};
use crate::diagnostic::Severity;
use crate::modifiers::{first_conflict, is_modifier_allowed, DeclarationKind, ModifierContext};
use crate::rules::features::check_feature;
use crate::{Diagnostic, Fix};

/// The modifier, its list and the declaration owning the list.
fn owner(rc: &RuleContext<'_>, keyword: NodeId) -> Option<(Modifier, NodeId, NodeId)> {
    let NodeKind::Modifier { modifier } = rc.kind(keyword) else {
        return None;
    };
    let list = rc.ast.parent(keyword)?;
    let decl = rc.ast.parent(list)?;
    Some((*modifier, list, decl))
}

fn declaration_kind(rc: &RuleContext<'_>, decl: NodeId) -> Option<DeclarationKind> {
    Some(match rc.kind(decl) {
        NodeKind::Class { kind, .. } if kind.is_interface() => DeclarationKind::Interface,
        NodeKind::Class { .. } => DeclarationKind::Class,
        NodeKind::Method { .. } => DeclarationKind::Method,
        NodeKind::Field { .. } => DeclarationKind::Field,
        NodeKind::Initializer { .. } => DeclarationKind::ClassInitializer,
        NodeKind::LocalVariable { .. } => DeclarationKind::LocalVariable,
        NodeKind::Parameter { .. } => DeclarationKind::Parameter,
        _ => return None,
    })
}

/// Class declared inside a code block.
fn is_local_class(rc: &RuleContext<'_>, class: NodeId) -> bool {
    rc.ast
        .parent(class)
        .is_some_and(|p| !matches!(rc.kind(p), NodeKind::Class { .. } | NodeKind::File { .. }))
}

fn modifier_context(rc: &RuleContext<'_>, decl: NodeId, kind: DeclarationKind) -> ModifierContext {
    let mut cx = ModifierContext::new(kind, rc.level);
    let parent = rc.ast.parent(decl);
    cx.in_interface = parent.is_some_and(|p| rc.is_interface_decl(p));
    if matches!(kind, DeclarationKind::Class | DeclarationKind::Interface) {
        cx.top_level = parent.is_some_and(|p| matches!(rc.kind(p), NodeKind::File { .. }));
        cx.local = is_local_class(rc, decl);
    }
    cx
}

/// Feature that would make `modifier` legal on an interface method.
fn interface_method_feature(modifier: Modifier) -> Option<JavaFeature> {
    match modifier {
        Modifier::Default => Some(JavaFeature::DefaultMethods),
        Modifier::Static => Some(JavaFeature::StaticInterfaceMethods),
        Modifier::Private => Some(JavaFeature::PrivateInterfaceMethods),
        _ => None,
    }
}

fn remove_fix(modifier: Modifier) -> Fix {
    Fix::RemoveModifier { modifier }
}

pub(crate) fn not_allowed(rc: &RuleContext<'_>, keyword: NodeId) -> CheckResult<Option<Diagnostic>> {
    let Some((modifier, _, decl)) = owner(rc, keyword) else {
        return Ok(None);
    };
    let Some(kind) = declaration_kind(rc, decl) else {
        return Ok(None);
    };
    let cx = modifier_context(rc, decl, kind);
    if is_modifier_allowed(modifier, cx) {
        return Ok(None);
    }
    let range = rc.range(keyword);
    if kind == DeclarationKind::Method && cx.in_interface {
        if let Some(feature) = interface_method_feature(modifier) {
            if !rc.is_enabled(feature) {
                return Ok(check_feature(rc, feature, range));
            }
        }
    }
    Ok(Some(
        Diagnostic::builder(Severity::Error, "modifier-not-allowed", range)
            .message(format!("Modifier '{}' not allowed here", modifier.keyword()))
            .fix(remove_fix(modifier))
            .build(),
    ))
}

pub(crate) fn illegal_combination(rc: &RuleContext<'_>, keyword: NodeId) -> CheckResult<Option<Diagnostic>> {
    let Some((modifier, list, decl)) = owner(rc, keyword) else {
        return Ok(None);
    };
    let Some(kind) = declaration_kind(rc, decl) else {
        return Ok(None);
    };
    let cx = modifier_context(rc, decl, kind);
    let present = rc.modifiers_of(list);
    Ok(first_conflict(modifier, &present, cx).map(|other| {
        Diagnostic::builder(Severity::Error, "illegal-modifier-combination", rc.range(keyword))
            .message(format!(
                "Illegal combination of modifiers: '{}' and '{}'",
                modifier.keyword(),
                other.keyword()
            ))
            .fix(remove_fix(modifier))
            .build()
    }))
}

fn file_stem(file_name: &str) -> &str {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    base.strip_suffix(".java").unwrap_or(base)
}

/// A public top-level class lives in a file of the same name.
pub(crate) fn public_class_file(rc: &RuleContext<'_>, keyword: NodeId) -> CheckResult<Option<Diagnostic>> {
    let Some((Modifier::Public, _, decl)) = owner(rc, keyword) else {
        return Ok(None);
    };
    let NodeKind::Class { name, .. } = rc.kind(decl) else {
        return Ok(None);
    };
    let top_level = rc
        .ast
        .parent(decl)
        .is_some_and(|p| matches!(rc.kind(p), NodeKind::File { .. }));
    if !top_level || file_stem(rc.ast.file_name()) == name.as_str() {
        return Ok(None);
    }
    let kind = match rc.kind(decl) {
        NodeKind::Class {
            kind: ClassKind::Interface | ClassKind::Annotation,
            ..
        } => "Interface",
        NodeKind::Class {
            kind: ClassKind::Enum,
            ..
        } => "Enum",
        _ => "Class",
    };
    Ok(Some(
        Diagnostic::builder(Severity::Error, "public-class-file-name", rc.ast.name_range(decl))
            .message(format!(
                "{kind} '{name}' is public, should be declared in a file named '{name}.java'"
            ))
            .fix(Fix::RenameFile {
                new_name: format!("{name}.java"),
            })
            .fix_with_range(remove_fix(Modifier::Public), rc.range(keyword))
            .build(),
    ))
}

pub(crate) fn abstract_method_in_concrete_class(
    rc: &RuleContext<'_>,
    keyword: NodeId,
) -> CheckResult<Option<Diagnostic>> {
    let Some((Modifier::Abstract, _, decl)) = owner(rc, keyword) else {
        return Ok(None);
    };
    if !matches!(rc.kind(decl), NodeKind::Method { .. }) {
        return Ok(None);
    }
    let Some(class) = rc.ast.parent(decl) else {
        return Ok(None);
    };
    let NodeKind::Class {
        kind: ClassKind::Class,
        name,
        modifiers,
        anonymous,
        ..
    } = rc.kind(class)
    else {
        return Ok(None);
    };
    if rc.has_modifier(*modifiers, Modifier::Abstract) {
        return Ok(None);
    }
    let mut builder = Diagnostic::builder(Severity::Error, "abstract-method-in-concrete-class", rc.range(keyword))
        .message("Abstract method in non-abstract class")
        .fix(remove_fix(Modifier::Abstract));
    if !anonymous {
        builder = builder.fix(Fix::MakeClassAbstract {
            class: name.to_string(),
        });
    }
    Ok(Some(builder.build()))
}

/// Inner class: non-static, not an interface member, or local or anonymous.
fn is_inner_class(rc: &RuleContext<'_>, class: NodeId) -> bool {
    let NodeKind::Class {
        kind: ClassKind::Class,
        modifiers,
        anonymous,
        ..
    } = rc.kind(class)
    else {
        return false;
    };
    if *anonymous || is_local_class(rc, class) {
        return true;
    }
    match rc.ast.parent(class) {
        Some(outer) if matches!(rc.kind(outer), NodeKind::Class { .. }) => {
            !rc.has_modifier(*modifiers, Modifier::Static) && !rc.is_interface_decl(outer)
        }
        _ => false,
    }
}

/// Constant variables are the one static member inner classes always allow.
fn is_constant_field(rc: &RuleContext<'_>, decl: NodeId, list: NodeId) -> CheckResult<bool> {
    match rc.kind(decl) {
        NodeKind::Field {
            initializer: Some(init),
            ..
        } if rc.has_modifier(list, Modifier::Final) => Ok(rc.constant(*init)?.is_some()),
        _ => Ok(false),
    }
}

pub(crate) fn static_in_inner_class(rc: &RuleContext<'_>, keyword: NodeId) -> CheckResult<Option<Diagnostic>> {
    let Some((Modifier::Static, list, decl)) = owner(rc, keyword) else {
        return Ok(None);
    };
    if !matches!(
        rc.kind(decl),
        NodeKind::Method { .. } | NodeKind::Field { .. } | NodeKind::Class { .. } | NodeKind::Initializer { .. }
    ) {
        return Ok(None);
    }
    let Some(class) = rc.ast.parent(decl) else {
        return Ok(None);
    };
    if !is_inner_class(rc, class) || is_constant_field(rc, decl, list)? {
        return Ok(None);
    }
    Ok(check_feature(rc, JavaFeature::StaticMembersInInnerClass, rc.range(keyword)))
}
