//! Syntax tree consumed by semantic checks.
//!
//! A file is an arena of [`Node`]s addressed by [`NodeId`]. Every node has a
//! closed [`NodeKind`], a source range and a parent link. Trees are built
//! once with [`AstBuilder`] (by a parser front-end or by tests) and are
//! immutable afterwards.

mod ast;
mod builder;
mod walk;

pub use ast::{
    AssignOp, Ast, BinaryOp, LiteralKind, Node, NodeId, NodeKind, ReferenceListRole,
    TypeElementKind, UnaryOp, WildcardKind,
};
pub use builder::AstBuilder;
pub use walk::{Preorder, WalkEvent};
