//! Checks grouped by JLS topic.
//!
//! A check looks at one node, asks the collaborators in [`RuleContext`] what
//! it needs, and returns its diagnostics as a value. Checks never see each
//! other's results; ordering and short-circuiting live in the driver.

pub(crate) mod annotations;
pub(crate) mod calls;
pub(crate) mod classes;
pub(crate) mod control_flow;
pub(crate) mod exceptions;
pub(crate) mod expressions;
pub(crate) mod features;
pub(crate) mod generics;
pub(crate) mod imports;
pub(crate) mod methods;
pub(crate) mod modifiers;
pub(crate) mod references;
pub(crate) mod statements;
pub(crate) mod variables;

use nova_core::TextRange;
use nova_hir::NodeId;
use nova_types::{is_assignable_value, Type};

use crate::context::{CheckResult, RuleContext};
use crate::diagnostic::{DiagnosticBuilder, Severity};
use crate::{tooltip, Diagnostic};

/// `Incompatible types` error with the required/found tooltip; callers add fixes.
pub(crate) fn incompatible_types(
    rc: &RuleContext<'_>,
    range: TextRange,
    required: &Type,
    found: &Type,
) -> DiagnosticBuilder {
    let env = rc.env();
    Diagnostic::builder(Severity::Error, "incompatible-types", range)
        .message(tooltip::incompatible_types_message(env, required, found))
        .tooltip(tooltip::incompatible_types_tooltip(env, required, found))
}

/// Assignment-context compatibility of `expr` with `target`, honoring
/// constant narrowing. Unresolved types are always compatible.
pub(crate) fn is_expr_assignable(
    rc: &RuleContext<'_>,
    target: &Type,
    expr: NodeId,
) -> CheckResult<(bool, Type)> {
    let found = rc.expr_type(expr)?;
    if target.contains_unknown() || found.contains_unknown() {
        return Ok((true, found));
    }
    let constant = rc.integral_constant(expr)?;
    Ok((is_assignable_value(rc.env(), target, &found, constant), found))
}

/// Quoted simple name of the class declaring `id`, for messages.
pub(crate) fn class_name(rc: &RuleContext<'_>, class: nova_types::ClassId) -> String {
    nova_types::format_class_name(rc.env(), class)
}
