use std::collections::HashMap;
use std::sync::Arc;

use nova_hir::NodeId;
use nova_types::Type;

use crate::{CompletionReasons, ControlFlow, ControlFlowFacts, FlowError};

/// [`ControlFlowFacts`] backed by precomputed maps.
///
/// Regions without recorded facts complete normally and assign nothing.
#[derive(Debug, Clone, Default)]
pub struct FlowTable {
    regions: HashMap<NodeId, Arc<ControlFlow>>,
    thrown: HashMap<NodeId, Vec<Type>>,
    unhandled: HashMap<NodeId, Vec<Type>>,
    unanalyzable: Vec<NodeId>,
}

impl FlowTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_control_flow(&mut self, region: NodeId, flow: ControlFlow) {
        self.regions.insert(region, Arc::new(flow));
    }

    pub fn set_thrown(&mut self, region: NodeId, thrown: Vec<Type>) {
        self.thrown.insert(region, thrown);
    }

    pub fn set_unhandled(&mut self, node: NodeId, unhandled: Vec<Type>) {
        self.unhandled.insert(node, unhandled);
    }

    pub fn mark_unanalyzable(&mut self, region: NodeId) {
        self.unanalyzable.push(region);
    }
}

impl ControlFlowFacts for FlowTable {
    fn control_flow(&self, region: NodeId) -> Result<Arc<ControlFlow>, FlowError> {
        if self.unanalyzable.contains(&region) {
            return Err(FlowError::Unanalyzable(region));
        }
        Ok(self.regions.get(&region).cloned().unwrap_or_else(|| {
            Arc::new(ControlFlow {
                completion: CompletionReasons::NORMAL,
                ..ControlFlow::default()
            })
        }))
    }

    fn thrown_exceptions(&self, region: NodeId) -> Result<Vec<Type>, FlowError> {
        if self.unanalyzable.contains(&region) {
            return Err(FlowError::Unanalyzable(region));
        }
        Ok(self.thrown.get(&region).cloned().unwrap_or_default())
    }

    fn unhandled_exceptions(&self, node: NodeId) -> Result<Vec<Type>, FlowError> {
        Ok(self.unhandled.get(&node).cloned().unwrap_or_default())
    }
}
