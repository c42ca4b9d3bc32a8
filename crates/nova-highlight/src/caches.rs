//! Per-pass memo tables owned by the driver.
//!
//! Each table answers a question that many nodes of one file ask about the
//! same region (a code block, a class, the import list) so that the answer is
//! computed once per pass instead of once per node. Everything is dropped
//! when the pass ends.

use std::collections::{HashMap, HashSet};

use nova_core::Name;
use nova_hir::NodeId;
use nova_types::{erased_signature, method_signature, MethodId, Substitution, Type, TypeEnv};

use crate::context::{CheckResult, RuleContext};

/// Whether a parameter is assigned anywhere in its method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterReassignment {
    Unknown,
    NotReassigned,
    Reassigned,
}

/// What a single-type import binds a simple name to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub import: NodeId,
    pub path: Name,
}

#[derive(Debug, Default)]
pub struct PassCaches {
    uninitialized: HashMap<NodeId, HashSet<NodeId>>,
    reassigned_finals: HashMap<NodeId, HashSet<NodeId>>,
    assigned_in_loop: HashMap<NodeId, HashSet<NodeId>>,
    single_imported_classes: HashMap<Name, ImportBinding>,
    single_imported_fields: HashMap<Name, ImportBinding>,
    parameters: HashMap<NodeId, ParameterReassignment>,
    methods_by_erasure: HashMap<NodeId, HashMap<(String, Vec<Type>), Vec<MethodId>>>,
}

impl PassCaches {
    pub fn new() -> Self {
        Self::default()
    }

    /// References in `region` that read a variable before it is definitely assigned.
    pub fn uninitialized_reads(
        &mut self,
        rc: &RuleContext<'_>,
        region: NodeId,
    ) -> CheckResult<&HashSet<NodeId>> {
        if !self.uninitialized.contains_key(&region) {
            let flow = rc.flow.control_flow(region)?;
            self.uninitialized
                .insert(region, flow.read_before_write().iter().copied().collect());
        }
        Ok(&self.uninitialized[&region])
    }

    /// References in `region` that assign a final variable which may already be assigned.
    pub fn reassigned_finals(
        &mut self,
        rc: &RuleContext<'_>,
        region: NodeId,
    ) -> CheckResult<&HashSet<NodeId>> {
        if !self.reassigned_finals.contains_key(&region) {
            let flow = rc.flow.control_flow(region)?;
            self.reassigned_finals
                .insert(region, flow.initialized_twice().iter().copied().collect());
        }
        Ok(&self.reassigned_finals[&region])
    }

    pub fn finals_assigned_in_loop(
        &mut self,
        rc: &RuleContext<'_>,
        region: NodeId,
    ) -> CheckResult<&HashSet<NodeId>> {
        if !self.assigned_in_loop.contains_key(&region) {
            let flow = rc.flow.control_flow(region)?;
            self.assigned_in_loop
                .insert(region, flow.assigned_in_loop.iter().copied().collect());
        }
        Ok(&self.assigned_in_loop[&region])
    }

    /// Record a single-type import; returns the earlier binding of the same
    /// simple name if there is one.
    pub fn bind_single_import_class(&mut self, name: Name, binding: ImportBinding) -> Option<ImportBinding> {
        match self.single_imported_classes.get(&name) {
            Some(existing) => Some(existing.clone()),
            None => {
                self.single_imported_classes.insert(name, binding);
                None
            }
        }
    }

    pub fn bind_single_import_field(&mut self, name: Name, binding: ImportBinding) -> Option<ImportBinding> {
        match self.single_imported_fields.get(&name) {
            Some(existing) => Some(existing.clone()),
            None => {
                self.single_imported_fields.insert(name, binding);
                None
            }
        }
    }

    pub fn parameter(&self, param: NodeId) -> ParameterReassignment {
        self.parameters
            .get(&param)
            .copied()
            .unwrap_or(ParameterReassignment::Unknown)
    }

    pub fn mark_reassigned(&mut self, param: NodeId) {
        self.parameters
            .insert(param, ParameterReassignment::Reassigned);
    }

    /// Settle an `Unknown` flag from the flow facts of the owning method body.
    pub fn settle_parameter(
        &mut self,
        rc: &RuleContext<'_>,
        param: NodeId,
        body: NodeId,
    ) -> CheckResult<ParameterReassignment> {
        let state = match self.parameter(param) {
            ParameterReassignment::Unknown => {
                let flow = rc.flow.control_flow(body)?;
                if flow.written.contains(&param) {
                    ParameterReassignment::Reassigned
                } else {
                    ParameterReassignment::NotReassigned
                }
            }
            known => known,
        };
        self.parameters.insert(param, state);
        Ok(state)
    }

    /// Methods of the class declared at `class_decl`, grouped by erased signature.
    pub fn methods_by_erasure(
        &mut self,
        env: &dyn TypeEnv,
        class_decl: NodeId,
        methods: &[MethodId],
    ) -> &HashMap<(String, Vec<Type>), Vec<MethodId>> {
        self.methods_by_erasure.entry(class_decl).or_insert_with(|| {
            let mut groups: HashMap<(String, Vec<Type>), Vec<MethodId>> = HashMap::new();
            for method in methods {
                if let Some(sig) = method_signature(env, *method, &Substitution::empty()) {
                    groups
                        .entry(erased_signature(env, &sig))
                        .or_default()
                        .push(*method);
                }
            }
            groups
        })
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
