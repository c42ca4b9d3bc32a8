//! One highlighting pass over a file.
//!
//! The pass walks the tree depth-first in document order. Each node gets a
//! fixed list of checks; the first check that reports an error ends the list
//! for that node, children are still visited. A check that cannot get an
//! answer from its collaborators ([`Deferred`]) also ends the list, silently.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use nova_core::{check_cancelled, CancellationToken, Cancelled};
use nova_hir::{Ast, NodeId, NodeKind, WalkEvent};

use crate::caches::PassCaches;
use crate::context::{CheckResult, HighlightContext, RuleContext};
use crate::rules::{
    annotations, calls, classes, control_flow, exceptions, expressions, features, generics,
    imports, methods, modifiers, references, statements, variables,
};
use crate::{Diagnostic, HighlightConfig};

const TARGET: &str = "nova.highlight";
const RULES_TARGET: &str = "nova.highlight.rules";

/// Lifecycle of a [`Highlighter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassState {
    Idle,
    Running,
    Completed,
    /// The last pass observed cancellation and discarded its results.
    Aborted,
}

/// Runs the semantic checks over a file.
///
/// A highlighter is reusable: every call to [`Highlighter::analyze`] starts
/// from empty caches.
#[derive(Debug)]
pub struct Highlighter {
    state: PassState,
    caches: PassCaches,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter {
    pub fn new() -> Self {
        Self {
            state: PassState::Idle,
            caches: PassCaches::new(),
        }
    }

    pub fn state(&self) -> PassState {
        self.state
    }

    /// Diagnostics for `ast` in traversal order, or `Err(Cancelled)` if
    /// `cancel` fired during the pass. Partial results are never returned.
    pub fn analyze(
        &mut self,
        ast: &Ast,
        cx: &HighlightContext<'_>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Diagnostic>, Cancelled> {
        let _span = tracing::debug_span!(
            target: TARGET,
            "highlight_pass",
            file = ast.file_name(),
            nodes = ast.len()
        )
        .entered();

        self.state = PassState::Running;
        self.caches.clear();
        let rc = RuleContext::new(ast, cx);
        let result = walk(&rc, &mut self.caches, cancel);
        self.caches.clear();

        match result {
            Ok(diagnostics) => {
                self.state = PassState::Completed;
                tracing::debug!(target: TARGET, count = diagnostics.len(), "pass completed");
                Ok(diagnostics)
            }
            Err(cancelled) => {
                self.state = PassState::Aborted;
                tracing::info!(target: TARGET, file = ast.file_name(), "pass cancelled");
                Err(cancelled)
            }
        }
    }
}

fn walk(
    rc: &RuleContext<'_>,
    caches: &mut PassCaches,
    cancel: &CancellationToken,
) -> Result<Vec<Diagnostic>, Cancelled> {
    let mut out = Vec::new();
    let mut events = rc.ast.preorder();
    while let Some(event) = events.next() {
        match event {
            WalkEvent::Enter(node) => {
                let kind = rc.kind(node);
                if matches!(kind, NodeKind::Error { .. }) {
                    events.skip_subtree();
                    continue;
                }
                if kind.is_expression() || matches!(kind, NodeKind::Method { .. } | NodeKind::Class { .. }) {
                    check_cancelled(cancel)?;
                }
                check_node(rc, caches, node, &mut out);
            }
            WalkEvent::Leave(node) => {
                if matches!(rc.kind(node), NodeKind::Method { .. }) {
                    check_cancelled(cancel)?;
                    Chain::new(rc.config, node, &mut out)
                        .run("reassigned-parameters", || {
                            control_flow::reassigned_parameters(rc, caches, node)
                        });
                }
            }
        }
    }
    Ok(out)
}

/// What a check may return.
trait IntoDiagnostics {
    fn into_diagnostics(self) -> Vec<Diagnostic>;
}

impl IntoDiagnostics for Option<Diagnostic> {
    fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.into_iter().collect()
    }
}

impl IntoDiagnostics for Vec<Diagnostic> {
    fn into_diagnostics(self) -> Vec<Diagnostic> {
        self
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}

/// The ordered checks of one node.
struct Chain<'p> {
    config: &'p HighlightConfig,
    node: NodeId,
    out: &'p mut Vec<Diagnostic>,
    stopped: bool,
}

impl<'p> Chain<'p> {
    fn new(config: &'p HighlightConfig, node: NodeId, out: &'p mut Vec<Diagnostic>) -> Self {
        Self {
            config,
            node,
            out,
            stopped: false,
        }
    }

    fn run<D: IntoDiagnostics>(
        &mut self,
        check: &'static str,
        f: impl FnOnce() -> CheckResult<D>,
    ) -> &mut Self {
        if self.stopped || !self.config.is_check_enabled(check) {
            return self;
        }
        tracing::trace!(target: RULES_TARGET, check, node = ?self.node, "run");
        let outcome = if self.config.isolate_rule_panics {
            match catch_unwind(AssertUnwindSafe(f)) {
                Ok(outcome) => outcome,
                Err(panic) => {
                    tracing::error!(
                        target: RULES_TARGET,
                        check,
                        node = ?self.node,
                        panic = %panic_message(panic.as_ref()),
                        "check panicked; skipping the rest of this node"
                    );
                    self.stopped = true;
                    return self;
                }
            }
        } else {
            f()
        };
        match outcome {
            Ok(found) => {
                let found = found.into_diagnostics();
                self.stopped = found.iter().any(Diagnostic::is_error);
                self.out.extend(found);
            }
            Err(reason) => {
                tracing::debug!(
                    target: RULES_TARGET,
                    check,
                    node = ?self.node,
                    %reason,
                    "check deferred"
                );
                self.stopped = true;
            }
        }
        self
    }

    /// Checks every expression gets, after its kind-specific ones.
    fn expression(&mut self, rc: &RuleContext<'_>, expr: NodeId) -> &mut Self {
        self.run("must-be-boolean", || expressions::must_be_boolean(rc, expr))
            .run("array-access", || expressions::array_access(rc, expr))
            .run("array-dimension", || expressions::array_dimension_int(rc, expr))
            .run("assign-to-final", || expressions::cannot_write_final(rc, expr))
            .run("variable-expected", || expressions::variable_expected(rc, expr))
            .run("array-initializer", || expressions::array_initializer_elements(rc, expr))
            .run("ternary-condition", || expressions::ternary_condition(rc, expr))
            .run("assert-types", || expressions::assert_types(rc, expr))
            .run("synchronized-type", || expressions::synchronized_type(rc, expr))
            .run("conditional-branch", || expressions::conditional_branch(rc, expr))
            .run("must-be-throwable", || expressions::must_be_throwable(rc, expr))
            .run("constant-expression", || expressions::constant_required(rc, expr))
    }
}

fn check_node(rc: &RuleContext<'_>, caches: &mut PassCaches, node: NodeId, out: &mut Vec<Diagnostic>) {
    let mut chain = Chain::new(rc.config, node, out);
    let c = &mut chain;
    match rc.kind(node) {
        NodeKind::File { .. } | NodeKind::ArgList { .. } | NodeKind::Error { .. } => {}
        NodeKind::Import { .. } => {
            c.run("single-type-import", || imports::single_type_import(rc, caches, node))
                .run("static-import-feature", || features::static_import(rc, node))
                .run("single-static-import", || imports::single_static_import(rc, caches, node));
        }
        NodeKind::Class { .. } => {
            c.run("enums-feature", || features::enums(rc, node))
                .run("interface-multiple-inheritance", || {
                    classes::interface_multiple_inheritance(rc, node)
                })
                .run("duplicate-top-level-class", || classes::duplicate_top_level_class(rc, node))
                .run("local-enum-or-interface", || classes::local_enum_or_interface(rc, node));
        }
        NodeKind::ModifierList { .. } => modifier_list(c, rc, caches, node),
        NodeKind::Modifier { .. } => {
            c.run("modifier-not-allowed", || modifiers::not_allowed(rc, node))
                .run("illegal-modifier-combination", || modifiers::illegal_combination(rc, node))
                .run("public-class-file-name", || modifiers::public_class_file(rc, node))
                .run("abstract-method-in-concrete-class", || {
                    modifiers::abstract_method_in_concrete_class(rc, node)
                })
                .run("static-in-inner-class", || modifiers::static_in_inner_class(rc, node));
        }
        NodeKind::Annotation { .. } => {
            c.run("annotations-feature", || features::annotations(rc, node))
                .run("annotation-applicability", || annotations::applicability(rc, node))
                .run("annotation-type", || annotations::annotation_type(rc, node))
                .run("missing-attributes", || annotations::missing_attributes(rc, node))
                .run("duplicate-target", || annotations::duplicate_target_values(rc, node))
                .run("duplicate-annotation", || annotations::duplicate_annotation(rc, node))
                .run("functional-interface", || annotations::functional_interface(rc, node))
                .run("repeatable-container", || annotations::repeatable_container(rc, node));
        }
        NodeKind::NameValuePair { .. } => {
            c.run("attribute-exists", || annotations::attribute_exists(rc, node))
                .run("duplicate-attribute", || annotations::duplicate_attribute(rc, node))
                .run("member-value-type", || annotations::member_value_type(rc, node));
        }
        NodeKind::ReferenceList { .. } => {
            c.run("extends-allowed", || classes::extends_allowed(rc, node))
                .run("implements-allowed", || classes::implements_allowed(rc, node))
                .run("extends-single-class", || classes::extends_single_class(rc, node))
                .run("generic-throwable", || generics::generic_throwable(rc, node));
        }
        NodeKind::CodeRef { .. } => {
            c.run("generics-feature", || features::generics(rc, node))
                .run("resolve", || references::resolve_problems(rc, node))
                .run("inheritance-target", || classes::inheritance_target(rc, node))
                .run("type-argument-count", || generics::type_argument_count(rc, node))
                .run("type-argument-bounds", || generics::type_argument_bounds(rc, node))
                .run("static-class-from-parameterized", || {
                    generics::static_class_from_parameterized(rc, node)
                });
        }
        NodeKind::TypeParameter { .. } => {
            c.run("generics-feature", || features::generics(rc, node));
        }
        NodeKind::TypeElement { .. } => {
            c.run("diamond-feature", || features::diamond(rc, node))
                .run("primitive-type-argument", || generics::primitive_type_argument(rc, node))
                .run("wildcard-usage", || generics::wildcard_usage(rc, node));
        }
        NodeKind::Method { .. } => {
            c.run("unreachable-statement", || control_flow::unreachable_statement(rc, node))
                .run("unhandled-exception", || exceptions::unhandled(rc, node))
                .run("recursive-constructor", || methods::recursive_constructor_invocation(rc, node))
                .run("override-annotation", || methods::override_annotation(rc, node))
                .run("safe-varargs", || methods::safe_varargs(rc, node))
                .run("constructor-in-interface", || methods::constructor_in_interface(rc, node));
        }
        NodeKind::Field { .. } => {
            c.run("initializer-type", || variables::initializer_assignable(rc, node))
                .run("illegal-void", || variables::illegal_void(rc, node))
                .run("final-field-initialized", || methods::final_field_initialized(rc, node));
        }
        NodeKind::Initializer { .. } => {
            c.run("initializer-completes", || control_flow::initializer_completes_normally(rc, node))
                .run("unreachable-statement", || control_flow::unreachable_statement(rc, node))
                .run("initializer-in-interface", || control_flow::initializer_in_interface(rc, node));
        }
        NodeKind::EnumConstant { .. } => {}
        NodeKind::LocalVariable { .. } => {
            c.run("initializer-type", || variables::initializer_assignable(rc, node))
                .run("illegal-void", || variables::illegal_void(rc, node))
                .run("resource-auto-closeable", || variables::resource_auto_closeable(rc, node));
        }
        NodeKind::Parameter { .. } => {
            c.run("illegal-void", || variables::illegal_void(rc, node))
                .run("varargs-feature", || features::varargs(rc, node))
                .run("varargs-last", || variables::varargs_last(rc, node))
                .run("foreach-type", || variables::foreach_type(rc, node))
                .run("multi-catch-feature", || variables::multi_catch_feature(rc, node))
                .run("catch-type-throwable", || variables::catch_type_throwable(rc, node))
                .run("catch-type-parameter", || variables::catch_type_parameter(rc, node))
                .run("multi-catch-disjoint", || variables::disjoint_alternatives(rc, node));
        }
        NodeKind::Block { .. } => {
            c.run("missing-return", || control_flow::missing_return(rc, node));
        }
        NodeKind::Return { .. } => {
            c.run("return-type", || statements::return_type(rc, node));
        }
        NodeKind::Break { .. } | NodeKind::Continue { .. } => {
            c.run("jump-target", || statements::jump_target(rc, node));
        }
        NodeKind::ExpressionStatement { .. } => {
            c.run("not-a-statement", || statements::not_a_statement(rc, node));
        }
        NodeKind::Switch { .. } => {
            c.run("switch-selector", || statements::switch_selector(rc, node));
        }
        NodeKind::SwitchLabel { .. } => {
            c.run("duplicate-label", || statements::duplicate_label(rc, node))
                .run("case-value-type", || statements::case_value_type(rc, node));
        }
        NodeKind::Throw { .. } => {
            c.run("unhandled-exception", || exceptions::unhandled(rc, node));
        }
        NodeKind::Try { .. } => {
            c.run("try-with-resources-feature", || features::try_with_resources(rc, node));
        }
        NodeKind::CatchSection { .. } => {
            c.run("exception-already-caught", || exceptions::already_caught(rc, node))
                .run("exception-never-thrown", || exceptions::never_thrown(rc, node))
                .run("exception-already-caught-warning", || {
                    exceptions::already_caught_warning(rc, node)
                });
        }
        NodeKind::Labeled { .. } => {
            c.run("duplicate-statement-label", || statements::duplicate_statement_label(rc, node));
        }
        NodeKind::ForEach { .. } => {
            c.run("foreach-feature", || features::for_each(rc, node));
        }
        NodeKind::If { .. }
        | NodeKind::While { .. }
        | NodeKind::DoWhile { .. }
        | NodeKind::For { .. }
        | NodeKind::Synchronized { .. }
        | NodeKind::Assert { .. }
        | NodeKind::Empty => {}
        NodeKind::Reference { .. } => {
            match references::written_parameter(rc, node) {
                Ok(Some(param)) => caches.mark_reassigned(param),
                Ok(None) => {}
                Err(reason) => tracing::debug!(target: RULES_TARGET, node = ?node, %reason, "write tracking deferred"),
            }
            c.run("resolve", || references::resolve_problems(rc, node))
                .expression(rc, node)
                .run("variable-not-initialized", || references::initialized_before_use(rc, caches, node))
                .run("final-already-assigned", || references::final_already_assigned(rc, caches, node))
                .run("final-assigned-in-loop", || references::final_assigned_in_loop(rc, caches, node))
                .run("call-name", || calls::call_name(rc, node))
                .run("expression-expected", || references::expression_expected(rc, node))
                .run("illegal-forward-reference", || references::illegal_forward_reference(rc, node))
                .run("static-from-enum-constructor", || {
                    references::static_field_from_enum_constructor(rc, node)
                });
        }
        NodeKind::MethodCall { .. } => {
            c.run("enum-super-call", || calls::enum_super_call(rc, node))
                .run("constructor-call-first", || calls::constructor_call_first(rc, node))
                .run("call", || calls::diagnose_call(rc, node))
                .run("unhandled-exception", || exceptions::unhandled(rc, node))
                .run("unchecked-call", || generics::unchecked_call(rc, node))
                .expression(rc, node);
        }
        NodeKind::New { .. } => {
            c.run("unhandled-exception", || exceptions::unhandled(rc, node))
                .run("anonymous-extends-final", || classes::anonymous_extends_final(rc, node))
                .run("inner-class-from-static-context", || {
                    classes::inner_class_from_static_context(rc, node)
                })
                .run("type-parameter-instantiation", || generics::type_parameter_instantiation(rc, node))
                .run("abstract-instantiation", || classes::abstract_instantiation(rc, node))
                .run("enum-instantiation", || classes::enum_instantiation(rc, node))
                .run("generic-array-creation", || generics::generic_array_creation(rc, node))
                .run("constructor-arguments", || calls::constructor_arguments(rc, node))
                .expression(rc, node);
        }
        NodeKind::Assignment { .. } => {
            c.run("assignment-type", || expressions::assignment_compatible(rc, node))
                .run("compound-operator", || expressions::compound_operator(rc, node))
                .expression(rc, node);
        }
        NodeKind::Binary { .. } => {
            c.run("operator", || expressions::binary_operator(rc, node))
                .expression(rc, node);
        }
        NodeKind::Unary { .. } => {
            c.run("operator", || expressions::unary_operator(rc, node))
                .expression(rc, node);
        }
        NodeKind::InstanceOf { .. } => {
            c.run("inconvertible-types", || expressions::instanceof_convertible(rc, node))
                .run("instanceof-reifiable", || expressions::instanceof_reifiable(rc, node))
                .expression(rc, node);
        }
        NodeKind::Cast { .. } => {
            c.run("inconvertible-types", || expressions::cast_convertible(rc, node))
                .run("unchecked-cast", || generics::unchecked_cast(rc, node))
                .expression(rc, node);
        }
        NodeKind::Literal { .. } => {
            c.run("number-range", || expressions::number_range(rc, node))
                .run("literal-features", || expressions::literal_features(rc, node))
                .expression(rc, node);
        }
        NodeKind::Lambda { .. } | NodeKind::MethodRef { .. } => {
            c.run("lambda-feature", || features::lambda(rc, node))
                .expression(rc, node);
        }
        NodeKind::This { .. } | NodeKind::Super { .. } => {
            c.run("static-context", || expressions::this_in_static_context(rc, node))
                .run("this-before-super", || expressions::this_before_super(rc, node))
                .run("abstract-super-call", || expressions::abstract_super_call(rc, node))
                .expression(rc, node);
        }
        NodeKind::Conditional { .. }
        | NodeKind::ArrayAccess { .. }
        | NodeKind::ArrayInit { .. }
        | NodeKind::Parenthesized { .. }
        | NodeKind::ClassLiteral { .. } => {
            c.expression(rc, node);
        }
    }
}

/// Modifier lists carry the declaration-level checks of their owner.
fn modifier_list(c: &mut Chain<'_>, rc: &RuleContext<'_>, caches: &mut PassCaches, list: NodeId) {
    let Some(decl) = rc.ast.parent(list) else {
        return;
    };
    match rc.kind(decl) {
        NodeKind::Method { .. } => {
            c.run("can-have-body", || methods::can_have_body(rc, decl))
                .run("incompatible-return-type", || methods::incompatible_return_type(rc, decl))
                .run("incompatible-throws", || methods::incompatible_throws(rc, decl))
                .run("weaker-access", || methods::weaker_access(rc, decl))
                .run("overrides-final", || methods::overrides_final(rc, decl))
                .run("missing-method-body", || methods::missing_body(rc, decl))
                .run("duplicate-method", || methods::duplicate_method(rc, caches, decl))
                .run("constructor-calls-base", || methods::constructor_calls_base(rc, decl))
                .run("static-instance-clash", || methods::static_instance_clash(rc, decl));
        }
        NodeKind::Class { .. } => {
            c.run("duplicate-nested-class", || classes::duplicate_nested_class(rc, decl))
                .run("must-be-abstract", || classes::must_be_abstract(rc, decl))
                .run("implicit-constructor", || classes::implicit_constructor(rc, decl))
                .run("inherited-unrelated-returns", || generics::inherited_unrelated_returns(rc, decl))
                .run("same-erasure", || generics::same_erasure(rc, caches, decl))
                .run("cyclic-inheritance", || classes::cyclic_inheritance(rc, decl));
        }
        _ => {}
    }
}
