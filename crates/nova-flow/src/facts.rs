use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use nova_core::IndexNotReady;
use nova_hir::NodeId;
use nova_types::Type;

/// Ways control can leave a code region.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CompletionReasons(u8);

impl CompletionReasons {
    pub const NONE: Self = Self(0);
    pub const NORMAL: Self = Self(1);
    pub const RETURN: Self = Self(1 << 1);
    pub const THROW: Self = Self(1 << 2);
    pub const BREAK: Self = Self(1 << 3);
    pub const CONTINUE: Self = Self(1 << 4);

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for CompletionReasons {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl fmt::Debug for CompletionReasons {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (Self::NORMAL, "NORMAL"),
            (Self::RETURN, "RETURN"),
            (Self::THROW, "THROW"),
            (Self::BREAK, "BREAK"),
            (Self::CONTINUE, "CONTINUE"),
        ];
        f.debug_set()
            .entries(
                names
                    .iter()
                    .filter(|(flag, _)| self.contains(*flag))
                    .map(|(_, name)| name),
            )
            .finish()
    }
}

/// Flow facts for one code region (method body, initializer, lambda body, block).
///
/// Variables are identified by their declaration node (field, local or parameter).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlFlow {
    pub completion: CompletionReasons,
    /// First statement that cannot be reached.
    pub unreachable: Option<NodeId>,
    /// References that read a variable before it is definitely assigned.
    pub read_before_write: Vec<NodeId>,
    /// References that assign a final variable which may already be assigned.
    pub initialized_twice: Vec<NodeId>,
    /// References that assign a final variable inside a loop body.
    pub assigned_in_loop: Vec<NodeId>,
    /// Variables definitely assigned when the region completes normally.
    pub definitely_assigned: HashSet<NodeId>,
    /// Variables written somewhere in the region.
    pub written: HashSet<NodeId>,
}

impl ControlFlow {
    pub fn completes_normally(&self) -> bool {
        self.completion.contains(CompletionReasons::NORMAL)
    }

    pub fn is_definitely_assigned(&self, var: NodeId) -> bool {
        self.definitely_assigned.contains(&var)
    }

    pub fn is_definitely_not_assigned(&self, var: NodeId) -> bool {
        !self.written.contains(&var)
    }

    pub fn read_before_write(&self) -> &[NodeId] {
        &self.read_before_write
    }

    pub fn initialized_twice(&self) -> &[NodeId] {
        &self.initialized_twice
    }

    pub fn unreachable_statement(&self) -> Option<NodeId> {
        self.unreachable
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error(transparent)]
    IndexNotReady(#[from] IndexNotReady),
    /// The region contains constructs the graph builder gave up on.
    #[error("control flow of {0:?} cannot be analyzed")]
    Unanalyzable(NodeId),
}

/// Control-flow facts provided by the host's graph builder.
pub trait ControlFlowFacts {
    fn control_flow(&self, region: NodeId) -> Result<Arc<ControlFlow>, FlowError>;

    /// Exception types that can be thrown by statements of `region` (a try block),
    /// including unchecked exceptions named in `throws` clauses.
    fn thrown_exceptions(&self, region: NodeId) -> Result<Vec<Type>, FlowError>;

    /// Checked exceptions raised at `node` (call, `new`, `throw`, method body,
    /// initializer) that no enclosing `try` or `throws` clause handles.
    fn unhandled_exceptions(&self, node: NodeId) -> Result<Vec<Type>, FlowError>;
}
