//! Language-level gates.

use nova_core::{FeatureAvailability, JavaFeature, TextRange};
use nova_hir::{NodeId, NodeKind, TypeElementKind};

use crate::context::{CheckResult, RuleContext};
use crate::diagnostic::Severity;
use crate::{Diagnostic, Fix};

/// Error with a raise-language-level fix when `feature` is not usable at the
/// effective language level.
pub(crate) fn check_feature(
    rc: &RuleContext<'_>,
    feature: JavaFeature,
    range: TextRange,
) -> Option<Diagnostic> {
    if rc.is_enabled(feature) {
        return None;
    }
    let message = match rc.level.availability(feature) {
        FeatureAvailability::Preview => format!(
            "{} are a preview feature and are disabled by default. Use --enable-preview to enable",
            feature.display_name()
        ),
        _ => format!(
            "{} are not supported at language level '{}'",
            feature.display_name(),
            rc.level.display_name()
        ),
    };
    let level = match rc.level.availability(feature) {
        FeatureAvailability::Preview => rc.level.with_preview(true),
        _ => feature.required_level(),
    };
    Some(
        Diagnostic::builder(Severity::Error, "insufficient-language-level", range)
            .message(message)
            .fix(Fix::IncreaseLanguageLevel { level })
            .build(),
    )
}

pub(crate) fn annotations(rc: &RuleContext<'_>, annotation: NodeId) -> CheckResult<Option<Diagnostic>> {
    Ok(check_feature(rc, JavaFeature::Annotations, rc.range(annotation)))
}

/// Generic type arguments on a type reference.
pub(crate) fn generics(rc: &RuleContext<'_>, node: NodeId) -> CheckResult<Option<Diagnostic>> {
    let used = match rc.kind(node) {
        NodeKind::CodeRef {
            type_args: Some(args),
            ..
        } => !args.is_empty(),
        NodeKind::TypeParameter { .. } => true,
        _ => false,
    };
    Ok(used
        .then(|| check_feature(rc, JavaFeature::Generics, rc.range(node)))
        .flatten())
}

pub(crate) fn diamond(rc: &RuleContext<'_>, type_element: NodeId) -> CheckResult<Option<Diagnostic>> {
    let NodeKind::TypeElement {
        kind: TypeElementKind::Reference { reference },
    } = rc.kind(type_element)
    else {
        return Ok(None);
    };
    let NodeKind::CodeRef {
        type_args: Some(args),
        ..
    } = rc.kind(*reference)
    else {
        return Ok(None);
    };
    if !args.is_empty() {
        return Ok(None);
    }
    if let Some(diagnostic) = check_feature(rc, JavaFeature::Diamond, rc.range(type_element)) {
        return Ok(Some(diagnostic));
    }
    let anonymous = rc.ast.parent(type_element).is_some_and(|p| {
        matches!(
            rc.kind(p),
            NodeKind::New {
                anonymous_body: Some(_),
                ..
            }
        )
    });
    Ok(anonymous
        .then(|| check_feature(rc, JavaFeature::DiamondWithAnonymous, rc.range(type_element)))
        .flatten())
}

pub(crate) fn for_each(rc: &RuleContext<'_>, stmt: NodeId) -> CheckResult<Option<Diagnostic>> {
    Ok(check_feature(rc, JavaFeature::ForEach, rc.range(stmt)))
}

pub(crate) fn static_import(rc: &RuleContext<'_>, import: NodeId) -> CheckResult<Option<Diagnostic>> {
    match rc.kind(import) {
        NodeKind::Import {
            is_static: true, ..
        } => Ok(check_feature(rc, JavaFeature::StaticImports, rc.range(import))),
        _ => Ok(None),
    }
}

pub(crate) fn varargs(rc: &RuleContext<'_>, param: NodeId) -> CheckResult<Option<Diagnostic>> {
    let Some(ty) = rc.kind(param).variable_type() else {
        return Ok(None);
    };
    match rc.kind(ty) {
        NodeKind::TypeElement {
            kind: TypeElementKind::Array { varargs: true, .. },
        } => Ok(check_feature(rc, JavaFeature::Varargs, rc.range(ty))),
        _ => Ok(None),
    }
}

pub(crate) fn enums(rc: &RuleContext<'_>, class: NodeId) -> CheckResult<Option<Diagnostic>> {
    match rc.kind(class) {
        NodeKind::Class {
            kind: nova_types::ClassKind::Enum,
            ..
        } => Ok(check_feature(rc, JavaFeature::Enums, rc.ast.name_range(class))),
        _ => Ok(None),
    }
}

pub(crate) fn try_with_resources(rc: &RuleContext<'_>, stmt: NodeId) -> CheckResult<Option<Diagnostic>> {
    match rc.kind(stmt) {
        NodeKind::Try { resources, .. } if !resources.is_empty() => {
            let range = nova_core::cover(rc.range(resources[0]), rc.range(resources[resources.len() - 1]));
            Ok(check_feature(rc, JavaFeature::TryWithResources, range))
        }
        _ => Ok(None),
    }
}

pub(crate) fn lambda(rc: &RuleContext<'_>, expr: NodeId) -> CheckResult<Option<Diagnostic>> {
    let feature = match rc.kind(expr) {
        NodeKind::Lambda { .. } => JavaFeature::Lambdas,
        NodeKind::MethodRef { .. } => JavaFeature::MethodReferences,
        _ => return Ok(None),
    };
    Ok(check_feature(rc, feature, rc.range(expr)))
}
