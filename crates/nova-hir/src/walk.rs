use crate::{Ast, NodeId, NodeKind, TypeElementKind};

impl Ast {
    /// Direct children in document order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut push = |n: &NodeId| out.push(*n);
        match self.kind(id) {
            NodeKind::File {
                imports, classes, ..
            } => {
                imports.iter().for_each(&mut push);
                classes.iter().for_each(&mut push);
            }
            NodeKind::Import { .. }
            | NodeKind::Modifier { .. }
            | NodeKind::Break { .. }
            | NodeKind::Continue { .. }
            | NodeKind::Empty
            | NodeKind::Literal { .. } => {}
            NodeKind::Class {
                modifiers,
                type_params,
                extends,
                implements,
                members,
                ..
            } => {
                push(modifiers);
                type_params.iter().for_each(&mut push);
                extends.iter().for_each(&mut push);
                implements.iter().for_each(&mut push);
                members.iter().for_each(&mut push);
            }
            NodeKind::EnumConstant { args, body, .. } => {
                args.iter().for_each(&mut push);
                body.iter().for_each(&mut push);
            }
            NodeKind::Method {
                modifiers,
                type_params,
                return_type,
                params,
                throws,
                body,
                ..
            } => {
                push(modifiers);
                type_params.iter().for_each(&mut push);
                return_type.iter().for_each(&mut push);
                params.iter().for_each(&mut push);
                throws.iter().for_each(&mut push);
                body.iter().for_each(&mut push);
            }
            NodeKind::Field {
                modifiers,
                ty,
                initializer,
                ..
            }
            | NodeKind::LocalVariable {
                modifiers,
                ty,
                initializer,
                ..
            } => {
                push(modifiers);
                push(ty);
                initializer.iter().for_each(&mut push);
            }
            NodeKind::Initializer { modifiers, body } => {
                push(modifiers);
                push(body);
            }
            NodeKind::Parameter { modifiers, ty, .. } => {
                push(modifiers);
                push(ty);
            }
            NodeKind::TypeParameter { bounds, .. } => bounds.iter().for_each(&mut push),
            NodeKind::ModifierList {
                modifiers,
                annotations,
            } => {
                // Annotations usually precede keywords; keep document order.
                let mut all: Vec<NodeId> = annotations.iter().chain(modifiers).copied().collect();
                all.sort_by_key(|n| self.range(*n).start());
                all.iter().for_each(&mut push);
            }
            NodeKind::Annotation { reference, args } => {
                push(reference);
                args.iter().for_each(&mut push);
            }
            NodeKind::NameValuePair { value, .. } => push(value),
            NodeKind::ReferenceList { types, .. } => types.iter().for_each(&mut push),
            NodeKind::TypeElement { kind } => match kind {
                TypeElementKind::Primitive(_) | TypeElementKind::Void | TypeElementKind::Inferred => {}
                TypeElementKind::Reference { reference } => push(reference),
                TypeElementKind::Array { component, .. } => push(component),
                TypeElementKind::Wildcard { bound, .. } => bound.iter().for_each(&mut push),
                TypeElementKind::Disjunction { alternatives } => {
                    alternatives.iter().for_each(&mut push)
                }
            },
            NodeKind::CodeRef {
                qualifier,
                type_args,
                ..
            } => {
                qualifier.iter().for_each(&mut push);
                type_args.iter().flatten().for_each(&mut push);
            }
            NodeKind::Block { statements, .. } => statements.iter().for_each(&mut push),
            NodeKind::ExpressionStatement { expr } => push(expr),
            NodeKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                push(condition);
                push(then_branch);
                else_branch.iter().for_each(&mut push);
            }
            NodeKind::While { condition, body } => {
                push(condition);
                push(body);
            }
            NodeKind::DoWhile { body, condition } => {
                push(body);
                push(condition);
            }
            NodeKind::For {
                init,
                condition,
                update,
                body,
            } => {
                init.iter().for_each(&mut push);
                condition.iter().for_each(&mut push);
                update.iter().for_each(&mut push);
                push(body);
            }
            NodeKind::ForEach {
                param,
                iterable,
                body,
            } => {
                push(param);
                push(iterable);
                push(body);
            }
            NodeKind::Switch { selector, body } => {
                push(selector);
                push(body);
            }
            NodeKind::SwitchLabel { values } => values.iter().for_each(&mut push),
            NodeKind::Return { value } => value.iter().for_each(&mut push),
            NodeKind::Throw { exception } => push(exception),
            NodeKind::Try {
                resources,
                block,
                catches,
                finally,
            } => {
                resources.iter().for_each(&mut push);
                push(block);
                catches.iter().for_each(&mut push);
                finally.iter().for_each(&mut push);
            }
            NodeKind::CatchSection { param, block } => {
                push(param);
                push(block);
            }
            NodeKind::Synchronized { lock, body } => {
                push(lock);
                push(body);
            }
            NodeKind::Labeled { body, .. } => body.iter().for_each(&mut push),
            NodeKind::Assert { condition, message } => {
                push(condition);
                message.iter().for_each(&mut push);
            }
            NodeKind::Reference {
                qualifier,
                type_args,
                ..
            } => {
                qualifier.iter().for_each(&mut push);
                type_args.iter().for_each(&mut push);
            }
            NodeKind::This { qualifier } | NodeKind::Super { qualifier } => {
                qualifier.iter().for_each(&mut push)
            }
            NodeKind::MethodCall { method, args } => {
                push(method);
                push(args);
            }
            NodeKind::ArgList { args } => args.iter().for_each(&mut push),
            NodeKind::New {
                qualifier,
                ty,
                dims,
                args,
                initializer,
                anonymous_body,
                ..
            } => {
                qualifier.iter().for_each(&mut push);
                push(ty);
                dims.iter().for_each(&mut push);
                args.iter().for_each(&mut push);
                initializer.iter().for_each(&mut push);
                anonymous_body.iter().for_each(&mut push);
            }
            NodeKind::Assignment { lhs, rhs, .. } | NodeKind::Binary { lhs, rhs, .. } => {
                push(lhs);
                push(rhs);
            }
            NodeKind::Unary { operand, .. } => push(operand),
            NodeKind::Conditional {
                condition,
                then_expr,
                else_expr,
            } => {
                push(condition);
                push(then_expr);
                push(else_expr);
            }
            NodeKind::InstanceOf { expr, ty } => {
                push(expr);
                push(ty);
            }
            NodeKind::Cast { ty, expr } => {
                push(ty);
                push(expr);
            }
            NodeKind::ArrayAccess { array, index } => {
                push(array);
                push(index);
            }
            NodeKind::ArrayInit { elements } => elements.iter().for_each(&mut push),
            NodeKind::Parenthesized { expr } => push(expr),
            NodeKind::ClassLiteral { ty } => push(ty),
            NodeKind::Lambda { params, body } => {
                params.iter().for_each(&mut push);
                push(body);
            }
            NodeKind::MethodRef { qualifier, .. } => push(qualifier),
            NodeKind::Error { children } => children.iter().for_each(&mut push),
        }
        out
    }

    /// Depth-first traversal with enter/leave events, in document order.
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder {
            ast: self,
            stack: vec![WalkEvent::Enter(self.root)],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkEvent {
    Enter(NodeId),
    Leave(NodeId),
}

/// Iterator returned by [`Ast::preorder`].
#[derive(Debug)]
pub struct Preorder<'a> {
    ast: &'a Ast,
    stack: Vec<WalkEvent>,
}

impl Preorder<'_> {
    /// Do not descend into the node that was just entered. Its `Leave` event is still produced.
    pub fn skip_subtree(&mut self) {
        while let Some(WalkEvent::Enter(_)) = self.stack.last() {
            self.stack.pop();
        }
    }
}

impl Iterator for Preorder<'_> {
    type Item = WalkEvent;

    fn next(&mut self) -> Option<WalkEvent> {
        let event = self.stack.pop()?;
        if let WalkEvent::Enter(id) = event {
            self.stack.push(WalkEvent::Leave(id));
            for child in self.ast.children(id).into_iter().rev() {
                self.stack.push(WalkEvent::Enter(child));
            }
        }
        Some(event)
    }
}
