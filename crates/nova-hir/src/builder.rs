use nova_core::TextRange;

use crate::{Ast, Node, NodeId, NodeKind};

/// Bottom-up construction of an [`Ast`].
///
/// Children are allocated before their parent; [`AstBuilder::finish`] fills
/// in the parent links.
#[derive(Debug, Default)]
pub struct AstBuilder {
    nodes: Vec<Node>,
    file_name: String,
}

impl AstBuilder {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            nodes: Vec::new(),
            file_name: file_name.into(),
        }
    }

    pub fn alloc(&mut self, kind: NodeKind, range: TextRange) -> NodeId {
        let id = NodeId::from_raw(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            range,
            parent: None,
        });
        id
    }

    /// Replace a node's kind; lets callers allocate a placeholder and patch
    /// child links once they exist.
    pub fn replace(&mut self, id: NodeId, kind: NodeKind) {
        self.nodes[id.idx()].kind = kind;
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.idx()].kind
    }

    pub fn range(&self, id: NodeId) -> TextRange {
        self.nodes[id.idx()].range
    }

    pub fn finish(self, root: NodeId) -> Ast {
        let mut ast = Ast {
            nodes: self.nodes,
            root,
            file_name: self.file_name,
        };
        let links: Vec<(NodeId, NodeId)> = (0..ast.nodes.len())
            .map(|idx| NodeId::from_raw(idx as u32))
            .flat_map(|parent| {
                ast.children(parent)
                    .into_iter()
                    .map(move |child| (child, parent))
            })
            .collect();
        for (child, parent) in links {
            ast.nodes[child.idx()].parent = Some(parent);
        }
        ast
    }
}
