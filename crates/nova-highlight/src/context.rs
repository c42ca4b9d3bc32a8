use nova_core::{IndexNotReady, JavaFeature, JavaLanguageLevel, TextRange};
use nova_flow::{ControlFlowFacts, FlowError};
use nova_hir::{Ast, NodeId, NodeKind};
use nova_resolve::{ConstValue, ResolveResult, Resolver};
use nova_types::{ClassId, Type, TypeEnv};

use crate::HighlightConfig;

/// Collaborators and settings for analyzing one file.
///
/// Everything is borrowed read-only; hosts may share the collaborators
/// between concurrent passes over different files.
#[derive(Clone, Copy)]
pub struct HighlightContext<'a> {
    pub resolver: &'a dyn Resolver,
    pub flow: &'a dyn ControlFlowFacts,
    /// Language level of the module the file belongs to.
    pub language_level: JavaLanguageLevel,
    pub config: &'a HighlightConfig,
}

impl<'a> HighlightContext<'a> {
    pub fn new(
        resolver: &'a dyn Resolver,
        flow: &'a dyn ControlFlowFacts,
        config: &'a HighlightConfig,
    ) -> Self {
        Self {
            resolver,
            flow,
            language_level: JavaLanguageLevel::default(),
            config,
        }
    }

    #[must_use]
    pub fn with_language_level(mut self, level: JavaLanguageLevel) -> Self {
        self.language_level = level;
        self
    }
}

/// A query could not be answered yet; the node's remaining checks are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Deferred {
    #[error(transparent)]
    IndexNotReady(#[from] IndexNotReady),
    #[error(transparent)]
    Flow(#[from] FlowError),
}

pub type CheckResult<T> = Result<T, Deferred>;

/// What a check sees: the tree, the collaborators and the effective language level.
pub struct RuleContext<'a> {
    pub ast: &'a Ast,
    pub resolver: &'a dyn Resolver,
    pub flow: &'a dyn ControlFlowFacts,
    pub level: JavaLanguageLevel,
    pub config: &'a HighlightConfig,
}

impl<'a> RuleContext<'a> {
    pub fn new(ast: &'a Ast, cx: &HighlightContext<'a>) -> Self {
        Self {
            ast,
            resolver: cx.resolver,
            flow: cx.flow,
            level: cx.config.effective_language_level(cx.language_level),
            config: cx.config,
        }
    }

    pub fn env(&self) -> &'a dyn TypeEnv {
        self.resolver.types()
    }

    pub fn kind(&self, id: NodeId) -> &'a NodeKind {
        self.ast.kind(id)
    }

    pub fn range(&self, id: NodeId) -> TextRange {
        self.ast.range(id)
    }

    pub fn is_enabled(&self, feature: JavaFeature) -> bool {
        self.level.is_enabled(feature)
    }

    pub fn resolve(&self, reference: NodeId) -> CheckResult<Option<ResolveResult>> {
        Ok(self.resolver.resolve(reference)?)
    }

    pub fn multi_resolve(&self, reference: NodeId) -> CheckResult<Vec<ResolveResult>> {
        Ok(self.resolver.multi_resolve(reference)?)
    }

    pub fn expr_type(&self, expr: NodeId) -> CheckResult<Type> {
        Ok(self.resolver.expr_type(expr)?)
    }

    pub fn type_of(&self, type_element: NodeId) -> CheckResult<Type> {
        Ok(self.resolver.type_of(type_element)?)
    }

    pub fn constant(&self, expr: NodeId) -> CheckResult<Option<ConstValue>> {
        Ok(self.resolver.constant_value(expr)?)
    }

    pub fn integral_constant(&self, expr: NodeId) -> CheckResult<Option<i64>> {
        Ok(self.constant(expr)?.and_then(|c| c.as_integral()))
    }

    /// Class resolved from a `CodeRef`, or from a type element wrapping one.
    pub fn resolve_class(&self, reference: NodeId) -> CheckResult<Option<ClassId>> {
        let reference = match self.kind(reference) {
            NodeKind::TypeElement {
                kind: nova_hir::TypeElementKind::Reference { reference },
            } => *reference,
            _ => reference,
        };
        Ok(self.resolve(reference)?.and_then(|r| r.as_class()))
    }

    /// Class declared by the enclosing class declaration of `id`.
    pub fn enclosing_class_id(&self, id: NodeId) -> Option<ClassId> {
        self.ast
            .enclosing_class(id)
            .and_then(|c| self.resolver.declared_class(c))
    }

    /// `true` inside a static method, static initializer, static field
    /// initializer or static nested class body, up to the innermost class.
    pub fn is_static_context(&self, id: NodeId) -> bool {
        for a in self.ast.ancestors(id) {
            match self.kind(a) {
                NodeKind::Method { modifiers, .. }
                | NodeKind::Initializer { modifiers, .. }
                | NodeKind::Field { modifiers, .. } => {
                    return self.has_modifier(*modifiers, nova_types::Modifier::Static)
                        || self.is_interface_field(a);
                }
                NodeKind::Class { .. } => return false,
                _ => {}
            }
        }
        false
    }

    fn is_interface_field(&self, field: NodeId) -> bool {
        matches!(self.kind(field), NodeKind::Field { .. })
            && self
                .ast
                .enclosing_class(field)
                .is_some_and(|c| self.is_interface_decl(c))
    }

    pub fn is_interface_decl(&self, class: NodeId) -> bool {
        matches!(self.kind(class), NodeKind::Class { kind, .. } if kind.is_interface())
    }

    pub fn modifiers_of(&self, list: NodeId) -> Vec<nova_types::Modifier> {
        match self.kind(list) {
            NodeKind::ModifierList { modifiers, .. } => modifiers
                .iter()
                .filter_map(|m| match self.kind(*m) {
                    NodeKind::Modifier { modifier } => Some(*modifier),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn has_modifier(&self, list: NodeId, modifier: nova_types::Modifier) -> bool {
        self.modifiers_of(list).contains(&modifier)
    }

    /// Annotation nodes of a modifier list.
    pub fn annotations_of(&self, list: NodeId) -> &'a [NodeId] {
        match self.kind(list) {
            NodeKind::ModifierList { annotations, .. } => annotations,
            _ => &[],
        }
    }

    /// Flow region owning `id`: the body of the innermost method, initializer or lambda.
    pub fn flow_region(&self, id: NodeId) -> Option<NodeId> {
        let owner = self.ast.enclosing_code_owner(id)?;
        match self.kind(owner) {
            NodeKind::Method { body, .. } => *body,
            NodeKind::Initializer { body, .. } => Some(*body),
            NodeKind::Lambda { body, .. } => Some(*body),
            _ => None,
        }
    }
}
