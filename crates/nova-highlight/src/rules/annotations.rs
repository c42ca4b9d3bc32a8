//! Annotation usage: targets, attributes, duplicates and the special meaning
//! of `@Target`, `@Repeatable` and `@FunctionalInterface`.

use std::collections::HashSet;

use nova_core::JavaFeature;
use nova_hir::{NodeId, NodeKind, TypeElementKind};
use nova_types::{abstract_methods, AnnotationInfo, ClassId, ClassKind, ElementType, Type};

use crate::context::{CheckResult, RuleContext};
use crate::rules::features::check_feature;
use crate::rules::{class_name, incompatible_types, is_expr_assignable};
use crate::{Diagnostic, Fix};

pub(crate) fn annotation_class(rc: &RuleContext<'_>, annotation: NodeId) -> CheckResult<Option<ClassId>> {
    match rc.kind(annotation) {
        NodeKind::Annotation { reference, .. } => rc.resolve_class(*reference),
        _ => Ok(None),
    }
}

fn info<'a>(rc: &RuleContext<'a>, class: ClassId) -> Option<&'a AnnotationInfo> {
    rc.env().class(class)?.annotation.as_ref()
}

/// Declaration whose modifier list holds `annotation`.
fn owner(rc: &RuleContext<'_>, annotation: NodeId) -> Option<NodeId> {
    let list = rc.ast.parent(annotation)?;
    rc.ast.parent(list)
}

/// Element types describing `decl`, most specific first.
fn element_types(rc: &RuleContext<'_>, decl: NodeId) -> Vec<ElementType> {
    use ElementType::*;
    match rc.kind(decl) {
        NodeKind::Class {
            kind: ClassKind::Annotation,
            ..
        } => vec![AnnotationType, Type, TypeUse],
        NodeKind::Class { .. } => vec![Type, TypeUse],
        NodeKind::Method {
            return_type: None, ..
        } => vec![Constructor],
        NodeKind::Method {
            return_type: Some(ret),
            ..
        } => match rc.kind(*ret) {
            NodeKind::TypeElement {
                kind: TypeElementKind::Void,
            } => vec![Method],
            _ => vec![Method, TypeUse],
        },
        NodeKind::Field { .. } => vec![Field, TypeUse],
        NodeKind::Parameter { .. } => vec![Parameter, TypeUse],
        NodeKind::LocalVariable { .. } => vec![LocalVariable, TypeUse],
        _ => Vec::new(),
    }
}

fn value_pair(rc: &RuleContext<'_>, annotation: NodeId, attribute: &str) -> Option<NodeId> {
    let NodeKind::Annotation { args, .. } = rc.kind(annotation) else {
        return None;
    };
    args.iter().find_map(|arg| match rc.kind(*arg) {
        NodeKind::NameValuePair { name, value } if pair_name(name.as_deref()) == attribute => {
            Some(*value)
        }
        _ => None,
    })
}

fn pair_name(name: Option<&str>) -> &str {
    name.unwrap_or("value")
}

pub(crate) fn applicability(rc: &RuleContext<'_>, annotation: NodeId) -> CheckResult<Option<Diagnostic>> {
    let Some(class) = annotation_class(rc, annotation)? else {
        return Ok(None);
    };
    let Some(info) = info(rc, class) else {
        return Ok(None);
    };
    let Some(decl) = owner(rc, annotation) else {
        return Ok(None);
    };
    let places = element_types(rc, decl);
    let Some(first) = places.first() else {
        return Ok(None);
    };
    let applicable = match &info.targets {
        // No @Target: every declaration context, but not type uses.
        None => places.iter().any(|p| *p != ElementType::TypeUse),
        Some(targets) => places.iter().any(|p| targets.contains(p)),
    };
    if applicable {
        return Ok(None);
    }
    Ok(Some(Diagnostic::error(
        "annotation-not-applicable",
        rc.range(annotation),
        format!(
            "'@{}' not applicable to {}",
            class_name(rc, class),
            first.presentable()
        ),
    )))
}

pub(crate) fn annotation_type(rc: &RuleContext<'_>, annotation: NodeId) -> CheckResult<Option<Diagnostic>> {
    let Some(class) = annotation_class(rc, annotation)? else {
        return Ok(None);
    };
    let is_annotation = rc
        .env()
        .class(class)
        .is_some_and(|def| def.kind == ClassKind::Annotation);
    if is_annotation {
        return Ok(None);
    }
    let NodeKind::Annotation { reference, .. } = rc.kind(annotation) else {
        return Ok(None);
    };
    Ok(Some(Diagnostic::error(
        "annotation-type-expected",
        rc.range(*reference),
        "Annotation type expected",
    )))
}

pub(crate) fn missing_attributes(rc: &RuleContext<'_>, annotation: NodeId) -> CheckResult<Option<Diagnostic>> {
    let Some(class) = annotation_class(rc, annotation)? else {
        return Ok(None);
    };
    let Some(info) = info(rc, class) else {
        return Ok(None);
    };
    let NodeKind::Annotation { args, .. } = rc.kind(annotation) else {
        return Ok(None);
    };
    let provided: Vec<&str> = args
        .iter()
        .filter_map(|arg| match rc.kind(*arg) {
            NodeKind::NameValuePair { name, .. } => Some(pair_name(name.as_deref())),
            _ => None,
        })
        .collect();
    let missing: Vec<String> = info
        .attributes
        .iter()
        .filter(|a| !a.has_default && !provided.contains(&a.name.as_str()))
        .map(|a| a.name.clone())
        .collect();
    if missing.is_empty() {
        return Ok(None);
    }
    let quoted: Vec<String> = missing.iter().map(|n| format!("'{n}'")).collect();
    Ok(Some(
        Diagnostic::builder(
            crate::Severity::Error,
            "missing-annotation-attributes",
            rc.range(annotation),
        )
        .message(format!("{} missing though required", quoted.join(", ")))
        .fix(Fix::AddMissingAttributes { names: missing })
        .build(),
    ))
}

/// `@Target({METHOD, METHOD})`
pub(crate) fn duplicate_target_values(
    rc: &RuleContext<'_>,
    annotation: NodeId,
) -> CheckResult<Vec<Diagnostic>> {
    if annotation_class(rc, annotation)? != Some(rc.env().well_known().target) {
        return Ok(Vec::new());
    }
    let Some(value) = value_pair(rc, annotation, "value") else {
        return Ok(Vec::new());
    };
    let elements = match rc.kind(value) {
        NodeKind::ArrayInit { elements } => elements.clone(),
        _ => vec![value],
    };
    let mut seen = HashSet::new();
    Ok(elements
        .into_iter()
        .filter(|e| rc.ast.name(*e).is_some_and(|n| !seen.insert(n.clone())))
        .map(|e| Diagnostic::error("repeated-annotation-target", rc.range(e), "Repeated annotation target"))
        .collect())
}

pub(crate) fn duplicate_annotation(rc: &RuleContext<'_>, annotation: NodeId) -> CheckResult<Option<Diagnostic>> {
    let Some(class) = annotation_class(rc, annotation)? else {
        return Ok(None);
    };
    let Some(list) = rc.ast.parent(annotation) else {
        return Ok(None);
    };
    let mut duplicated = false;
    for other in rc.annotations_of(list) {
        if *other == annotation {
            break;
        }
        if annotation_class(rc, *other)? == Some(class) {
            duplicated = true;
            break;
        }
    }
    if !duplicated {
        return Ok(None);
    }
    let repeatable = info(rc, class).is_some_and(|i| i.repeatable_container.is_some());
    if repeatable {
        return Ok(check_feature(
            rc,
            JavaFeature::RepeatableAnnotations,
            rc.range(annotation),
        ));
    }
    Ok(Some(Diagnostic::error(
        "duplicate-annotation",
        rc.range(annotation),
        "Duplicate annotation",
    )))
}

pub(crate) fn functional_interface(rc: &RuleContext<'_>, annotation: NodeId) -> CheckResult<Option<Diagnostic>> {
    if annotation_class(rc, annotation)? != Some(rc.env().well_known().functional_interface) {
        return Ok(None);
    }
    let Some(decl) = owner(rc, annotation) else {
        return Ok(None);
    };
    let Some(class) = rc.resolver.declared_class(decl) else {
        return Ok(None);
    };
    let problem = match rc.kind(decl) {
        NodeKind::Class {
            kind: ClassKind::Interface,
            ..
        } => match abstract_methods(rc.env(), class).len() {
            1 => return Ok(None),
            0 => "No target method found".to_string(),
            _ => format!(
                "Multiple non-overriding abstract methods found in interface {}",
                class_name(rc, class)
            ),
        },
        _ => format!("'{}' is not a functional interface", class_name(rc, class)),
    };
    Ok(Some(Diagnostic::error(
        "invalid-functional-interface",
        rc.range(annotation),
        format!("Invalid '@FunctionalInterface' annotation; {problem}"),
    )))
}

/// `@Repeatable(C.class)`: `C` must be able to contain the annotated type.
pub(crate) fn repeatable_container(rc: &RuleContext<'_>, annotation: NodeId) -> CheckResult<Option<Diagnostic>> {
    let env = rc.env();
    if annotation_class(rc, annotation)? != Some(env.well_known().repeatable) {
        return Ok(None);
    }
    let Some(annotated) = owner(rc, annotation).and_then(|d| rc.resolver.declared_class(d)) else {
        return Ok(None);
    };
    let Some(value) = value_pair(rc, annotation, "value") else {
        return Ok(None);
    };
    let NodeKind::ClassLiteral { ty } = rc.kind(value) else {
        return Ok(None);
    };
    let Some(container) = rc.type_of(*ty)?.class_id() else {
        return Ok(None);
    };
    let name = class_name(rc, container);
    let problem = match info(rc, container) {
        None => Some(format!("'{name}' is not an annotation type")),
        Some(info) => match info.attribute("value") {
            None => Some("no 'value' method declared".to_string()),
            Some(attr) if attr.ty != Type::array(Type::class(annotated, vec![])) => Some(format!(
                "'value' method should have type '{}[]'",
                class_name(rc, annotated)
            )),
            Some(_) => info
                .attributes
                .iter()
                .find(|a| a.name != "value" && !a.has_default)
                .map(|a| format!("does not have a default value for '{}'", a.name)),
        },
    };
    Ok(problem.map(|problem| {
        Diagnostic::error(
            "invalid-repeatable-container",
            rc.range(value),
            format!("Invalid container annotation '{name}': {problem}"),
        )
    }))
}

fn pair_context(rc: &RuleContext<'_>, pair: NodeId) -> CheckResult<Option<(NodeId, ClassId, String)>> {
    let NodeKind::NameValuePair { name, .. } = rc.kind(pair) else {
        return Ok(None);
    };
    let Some(annotation) = rc.ast.parent(pair) else {
        return Ok(None);
    };
    let Some(class) = annotation_class(rc, annotation)? else {
        return Ok(None);
    };
    Ok(Some((annotation, class, pair_name(name.as_deref()).to_string())))
}

pub(crate) fn attribute_exists(rc: &RuleContext<'_>, pair: NodeId) -> CheckResult<Option<Diagnostic>> {
    let Some((_, class, name)) = pair_context(rc, pair)? else {
        return Ok(None);
    };
    let Some(info) = info(rc, class) else {
        return Ok(None);
    };
    if info.attribute(&name).is_some() {
        return Ok(None);
    }
    Ok(Some(Diagnostic::error(
        "unresolved-annotation-attribute",
        rc.range(pair),
        format!("Cannot resolve method '{name}'"),
    )))
}

pub(crate) fn duplicate_attribute(rc: &RuleContext<'_>, pair: NodeId) -> CheckResult<Option<Diagnostic>> {
    let Some((annotation, _, name)) = pair_context(rc, pair)? else {
        return Ok(None);
    };
    let NodeKind::Annotation { args, .. } = rc.kind(annotation) else {
        return Ok(None);
    };
    let earlier = args.iter().take_while(|a| **a != pair).any(|a| {
        matches!(rc.kind(*a), NodeKind::NameValuePair { name: other, .. } if pair_name(other.as_deref()) == name)
    });
    Ok(earlier.then(|| {
        Diagnostic::error(
            "duplicate-annotation-attribute",
            rc.range(pair),
            format!("Duplicate attribute '{name}'"),
        )
    }))
}

pub(crate) fn member_value_type(rc: &RuleContext<'_>, pair: NodeId) -> CheckResult<Vec<Diagnostic>> {
    let Some((_, class, name)) = pair_context(rc, pair)? else {
        return Ok(Vec::new());
    };
    let Some(attr) = info(rc, class).and_then(|i| i.attribute(&name)) else {
        return Ok(Vec::new());
    };
    let NodeKind::NameValuePair { value, .. } = rc.kind(pair) else {
        return Ok(Vec::new());
    };
    let mut out = Vec::new();
    check_value(rc, &attr.ty, *value, &mut out)?;
    Ok(out)
}

fn check_value(
    rc: &RuleContext<'_>,
    expected: &Type,
    value: NodeId,
    out: &mut Vec<Diagnostic>,
) -> CheckResult<()> {
    // A single value is accepted where an array is expected.
    let single = match expected {
        Type::Array(component) => component.as_ref(),
        other => other,
    };
    match rc.kind(value) {
        NodeKind::ArrayInit { elements } => match expected {
            Type::Array(component) => {
                for element in elements {
                    check_value(rc, component, *element, out)?;
                }
            }
            _ => out.push(Diagnostic::error(
                "illegal-annotation-initializer",
                rc.range(value),
                format!(
                    "Illegal initializer for '{}'",
                    nova_types::presentable_type(rc.env(), expected)
                ),
            )),
        },
        NodeKind::Annotation { .. } => {
            if let Some(nested) = annotation_class(rc, value)? {
                let found = Type::class(nested, vec![]);
                if single.class_id().is_some_and(|c| c != nested) {
                    out.push(incompatible_types(rc, rc.range(value), single, &found).build());
                }
            }
        }
        _ => {
            let (ok, found) = is_expr_assignable(rc, single, value)?;
            if !ok {
                out.push(incompatible_types(rc, rc.range(value), single, &found).build());
            }
        }
    }
    Ok(())
}
