//! Checked exceptions: unhandled throws and catch sections.

use nova_hir::{NodeId, NodeKind, TypeElementKind};
use nova_types::{
    erase, format_type, is_checked_exception, is_same_type, is_subtype, member_methods,
    presentable_type, Type, TypeEnv,
};

use crate::context::{CheckResult, RuleContext};
use crate::diagnostic::Severity;
use crate::rules::variables::resource_type;
use crate::{Diagnostic, Fix};

/// Checked exceptions raised at `node` that nothing handles.
pub(crate) fn unhandled(rc: &RuleContext<'_>, node: NodeId) -> CheckResult<Option<Diagnostic>> {
    let exceptions = rc.flow.unhandled_exceptions(node)?;
    if exceptions.is_empty() {
        return Ok(None);
    }
    let env = rc.env();
    let names: Vec<String> = exceptions.iter().map(|e| format_type(env, e)).collect();
    let message = match names.as_slice() {
        [single] => format!("Unhandled exception: {single}"),
        many => format!("Unhandled exceptions: {}", many.join(", ")),
    };
    let range = match rc.kind(node) {
        NodeKind::MethodCall { method, .. } => rc.ast.name_range(*method),
        NodeKind::New { ty, .. } => rc.range(*ty),
        NodeKind::Method { .. } => rc.ast.name_range(node),
        _ => rc.range(node),
    };
    Ok(Some(
        Diagnostic::builder(Severity::Error, "unhandled-exception", range)
            .message(message)
            .fix(Fix::AddExceptionToThrows {
                exceptions: exceptions
                    .iter()
                    .map(|e| presentable_type(env, e))
                    .collect(),
            })
            .fix(Fix::SurroundWithTryCatch)
            .build(),
    ))
}

/// Type elements of a catch parameter, one per multi-catch alternative.
fn alternatives(rc: &RuleContext<'_>, section: NodeId) -> CheckResult<Vec<(NodeId, Type)>> {
    let NodeKind::CatchSection { param, .. } = rc.kind(section) else {
        return Ok(Vec::new());
    };
    let Some(ty) = rc.kind(*param).variable_type() else {
        return Ok(Vec::new());
    };
    let elements = match rc.kind(ty) {
        NodeKind::TypeElement {
            kind: TypeElementKind::Disjunction { alternatives },
        } => alternatives.clone(),
        _ => vec![ty],
    };
    let mut out = Vec::with_capacity(elements.len());
    for element in elements {
        let caught = rc.type_of(element)?;
        if !caught.contains_unknown() {
            out.push((element, caught));
        }
    }
    Ok(out)
}

fn is_multi_catch(rc: &RuleContext<'_>, section: NodeId) -> bool {
    let NodeKind::CatchSection { param, .. } = rc.kind(section) else {
        return false;
    };
    rc.kind(*param).variable_type().is_some_and(|ty| {
        matches!(
            rc.kind(ty),
            NodeKind::TypeElement {
                kind: TypeElementKind::Disjunction { .. }
            }
        )
    })
}

/// Pieces of the try statement that owns a catch section.
struct EnclosingTry<'a> {
    resources: &'a [NodeId],
    block: NodeId,
    /// Catch sections before the one under check.
    earlier: Vec<NodeId>,
}

fn try_of<'a>(rc: &RuleContext<'a>, section: NodeId) -> Option<EnclosingTry<'a>> {
    let parent = rc.ast.parent(section)?;
    match rc.kind(parent) {
        NodeKind::Try {
            resources,
            block,
            catches,
            ..
        } => Some(EnclosingTry {
            resources: resources.as_slice(),
            block: *block,
            earlier: catches.iter().take_while(|c| **c != section).copied().collect(),
        }),
        _ => None,
    }
}

/// Exceptions the implicit `close()` of a resource declares.
fn close_exceptions(rc: &RuleContext<'_>, resource: NodeId) -> CheckResult<Vec<Type>> {
    let env = rc.env();
    let ty = resource_type(rc, resource)?;
    let Some(class) = erase(env, &ty).class_id() else {
        return Ok(Vec::new());
    };
    let close = member_methods(env, class).into_iter().find(|m| {
        env.method(m.method)
            .is_some_and(|def| def.name == "close" && def.params.is_empty())
    });
    Ok(close
        .and_then(|m| {
            env.method(m.method)
                .map(|def| def.throws.iter().map(|t| m.subst.apply(env, t)).collect())
        })
        .unwrap_or_default())
}

/// Everything that can reach the catch sections: the block, the resource
/// initializers and the resources' `close()` calls.
fn thrown_in_try(rc: &RuleContext<'_>, stmt: &EnclosingTry<'_>) -> CheckResult<Vec<Type>> {
    let mut thrown = rc.flow.thrown_exceptions(stmt.block)?;
    for resource in stmt.resources {
        thrown.extend(rc.flow.thrown_exceptions(*resource)?);
        thrown.extend(close_exceptions(rc, *resource)?);
    }
    Ok(thrown)
}

fn earlier_caught(rc: &RuleContext<'_>, earlier: &[NodeId]) -> CheckResult<Vec<Type>> {
    let mut out = Vec::new();
    for section in earlier {
        out.extend(alternatives(rc, *section)?.into_iter().map(|(_, ty)| ty));
    }
    Ok(out)
}

/// `Exception` and `Throwable` also catch unchecked exceptions.
fn is_general_exception(env: &dyn TypeEnv, ty: &Type) -> bool {
    let wk = env.well_known();
    matches!(ty.class_id(), Some(c) if c == wk.exception || c == wk.throwable)
}

/// A catch whose type is a subclass of a type caught by an earlier section.
pub(crate) fn already_caught(rc: &RuleContext<'_>, section: NodeId) -> CheckResult<Vec<Diagnostic>> {
    let Some(stmt) = try_of(rc, section) else {
        return Ok(Vec::new());
    };
    let env = rc.env();
    let caught = earlier_caught(rc, &stmt.earlier)?;
    let mut out = Vec::new();
    for (element, ty) in alternatives(rc, section)? {
        if caught.iter().any(|c| is_subtype(env, &ty, c)) {
            let name = format_type(env, &ty);
            out.push(
                Diagnostic::builder(Severity::Error, "exception-already-caught", rc.range(element))
                    .message(format!("Exception '{name}' has already been caught"))
                    .fix(Fix::MoveCatchUp { exception: name })
                    .build(),
            );
        }
    }
    Ok(out)
}

/// Checked exceptions the try statement cannot throw.
///
/// A plain catch is reported on its parameter, a multi-catch on the unused
/// alternative.
pub(crate) fn never_thrown(rc: &RuleContext<'_>, section: NodeId) -> CheckResult<Vec<Diagnostic>> {
    let Some(stmt) = try_of(rc, section) else {
        return Ok(Vec::new());
    };
    let NodeKind::CatchSection { param, .. } = rc.kind(section) else {
        return Ok(Vec::new());
    };
    let env = rc.env();
    let thrown = thrown_in_try(rc, &stmt)?;
    let multi = is_multi_catch(rc, section);
    let mut out = Vec::new();
    for (element, ty) in alternatives(rc, section)? {
        if is_general_exception(env, &ty) || !is_checked_exception(env, &ty) {
            continue;
        }
        let reachable = thrown
            .iter()
            .any(|t| is_subtype(env, t, &ty) || is_subtype(env, &ty, t));
        if reachable {
            continue;
        }
        let name = format_type(env, &ty);
        let (range, fix) = if multi {
            (
                rc.range(element),
                Fix::DeleteMultiCatchAlternative {
                    exception: name.clone(),
                },
            )
        } else {
            (
                rc.range(*param),
                Fix::DeleteCatch {
                    exception: name.clone(),
                },
            )
        };
        out.push(
            Diagnostic::builder(Severity::Error, "exception-never-thrown", range)
                .message(format!(
                    "Exception '{name}' is never thrown in body of corresponding try statement"
                ))
                .fix(fix)
                .build(),
        );
    }
    Ok(out)
}

/// A catch section every exception of whose type is taken by earlier sections.
///
/// Unchecked exceptions can come from anywhere, so `RuntimeException` and
/// `Error` always count as thrown.
pub(crate) fn already_caught_warning(rc: &RuleContext<'_>, section: NodeId) -> CheckResult<Vec<Diagnostic>> {
    if !rc.config.report_exception_already_caught_warnings {
        return Ok(Vec::new());
    }
    let Some(stmt) = try_of(rc, section) else {
        return Ok(Vec::new());
    };
    if stmt.earlier.is_empty() {
        return Ok(Vec::new());
    }
    let env = rc.env();
    let wk = env.well_known();
    let previous = earlier_caught(rc, &stmt.earlier)?;
    let mut thrown = thrown_in_try(rc, &stmt)?;
    thrown.push(Type::class(wk.error, vec![]));
    thrown.push(Type::class(wk.runtime_exception, vec![]));
    let multi = is_multi_catch(rc, section);

    let mut out = Vec::new();
    for (element, ty) in alternatives(rc, section)? {
        if is_general_exception(env, &ty) {
            continue;
        }
        let mut reaching: Vec<&Type> = Vec::new();
        for t in &thrown {
            let related = is_subtype(env, t, &ty) || is_subtype(env, &ty, t);
            if related && !reaching.iter().any(|r| is_same_type(env, r, t)) {
                reaching.push(t);
            }
        }
        if reaching.is_empty() {
            continue;
        }
        let all_taken = reaching
            .iter()
            .all(|t| previous.iter().any(|p| is_subtype(env, t, p)));
        if !all_taken {
            continue;
        }
        let names: Vec<String> = reaching.iter().map(|t| format_type(env, t)).collect();
        let message = match names.as_slice() {
            [single] => format!("Unreachable section: exception '{single}' has already been caught"),
            many => format!(
                "Unreachable section: exceptions '{}' have already been caught",
                many.join("', '")
            ),
        };
        let name = format_type(env, &ty);
        let fix = if multi {
            Fix::DeleteMultiCatchAlternative { exception: name }
        } else {
            Fix::DeleteCatch { exception: name }
        };
        out.push(
            Diagnostic::builder(Severity::Warning, "exception-already-caught-warning", rc.range(section))
                .message(message)
                .fix(fix)
                .build(),
        );
    }
    Ok(out)
}
