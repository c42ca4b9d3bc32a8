//! Checks answered by the control-flow facts of a code region.

use nova_hir::{NodeId, NodeKind};
use nova_types::Type;

use crate::caches::{ParameterReassignment, PassCaches};
use crate::context::{CheckResult, RuleContext};
use crate::diagnostic::Severity;
use crate::{Diagnostic, Fix};

fn body_of(rc: &RuleContext<'_>, owner: NodeId) -> Option<NodeId> {
    match rc.kind(owner) {
        NodeKind::Method { body, .. } => *body,
        NodeKind::Initializer { body, .. } => Some(*body),
        _ => None,
    }
}

pub(crate) fn unreachable_statement(rc: &RuleContext<'_>, owner: NodeId) -> CheckResult<Option<Diagnostic>> {
    if !rc.config.report_unreachable_code {
        return Ok(None);
    }
    let Some(body) = body_of(rc, owner) else {
        return Ok(None);
    };
    let flow = rc.flow.control_flow(body)?;
    Ok(flow.unreachable_statement().map(|stmt| {
        Diagnostic::error("unreachable-statement", rc.range(stmt), "Unreachable statement")
    }))
}

/// Closing brace of a non-void method body that can complete normally.
pub(crate) fn missing_return(rc: &RuleContext<'_>, block: NodeId) -> CheckResult<Option<Diagnostic>> {
    let NodeKind::Block { rbrace, .. } = rc.kind(block) else {
        return Ok(None);
    };
    let Some(method) = rc.ast.parent(block) else {
        return Ok(None);
    };
    let NodeKind::Method {
        return_type: Some(return_type),
        body: Some(body),
        ..
    } = rc.kind(method)
    else {
        return Ok(None);
    };
    if *body != block {
        return Ok(None);
    }
    let declared = rc.type_of(*return_type)?;
    if matches!(declared, Type::Void) || declared.is_unknown() {
        return Ok(None);
    }
    if !rc.flow.control_flow(block)?.completes_normally() {
        return Ok(None);
    }
    Ok(Some(
        Diagnostic::builder(Severity::Error, "missing-return", *rbrace)
            .message("Missing return statement")
            .fix(Fix::AddReturnStatement)
            .fix_with_range(
                Fix::ChangeReturnType {
                    new_type: "void".into(),
                },
                rc.range(*return_type),
            )
            .build(),
    ))
}

pub(crate) fn initializer_completes_normally(
    rc: &RuleContext<'_>,
    initializer: NodeId,
) -> CheckResult<Option<Diagnostic>> {
    let Some(body) = body_of(rc, initializer) else {
        return Ok(None);
    };
    if rc.flow.control_flow(body)?.completes_normally() {
        return Ok(None);
    }
    Ok(Some(Diagnostic::error(
        "initializer-cannot-complete",
        rc.range(initializer),
        "Initializer must be able to complete normally",
    )))
}

pub(crate) fn initializer_in_interface(rc: &RuleContext<'_>, initializer: NodeId) -> CheckResult<Option<Diagnostic>> {
    let in_interface = rc
        .ast
        .enclosing_class(initializer)
        .is_some_and(|c| rc.is_interface_decl(c));
    Ok(in_interface.then(|| {
        Diagnostic::error(
            "not-allowed-in-interface",
            rc.range(initializer),
            "Not allowed in interface",
        )
    }))
}

/// Informational markers for the parameters of `method` that are assigned
/// in its body. Runs when the traversal leaves the method.
pub(crate) fn reassigned_parameters(
    rc: &RuleContext<'_>,
    caches: &mut PassCaches,
    method: NodeId,
) -> CheckResult<Vec<Diagnostic>> {
    if !rc.config.report_reassigned_variables {
        return Ok(Vec::new());
    }
    let NodeKind::Method {
        params,
        body: Some(body),
        ..
    } = rc.kind(method)
    else {
        return Ok(Vec::new());
    };
    let mut out = Vec::new();
    for param in params {
        if caches.settle_parameter(rc, *param, *body)? != ParameterReassignment::Reassigned {
            continue;
        }
        let name = rc.ast.name(*param).map(|n| n.to_string()).unwrap_or_default();
        out.push(
            Diagnostic::builder(Severity::Info, "reassigned-parameter", rc.ast.name_range(*param))
                .message(format!("Parameter '{name}' is reassigned"))
                .build(),
        );
    }
    Ok(out)
}
