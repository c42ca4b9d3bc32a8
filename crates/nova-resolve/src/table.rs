use std::collections::{HashMap, HashSet};

use nova_core::IndexNotReady;
use nova_hir::NodeId;
use nova_types::{ClassId, FieldId, MethodId, Type, TypeEnv, TypeStore};

use crate::{ConstValue, ResolveResult, Resolver};

/// [`Resolver`] backed by precomputed maps.
///
/// Unrecorded expressions and type elements have type `Unknown`, unrecorded
/// references are unresolved.
#[derive(Debug, Clone)]
pub struct ResolveTable {
    store: TypeStore,
    candidates: HashMap<NodeId, Vec<ResolveResult>>,
    chosen: HashMap<NodeId, ResolveResult>,
    expr_types: HashMap<NodeId, Type>,
    element_types: HashMap<NodeId, Type>,
    constants: HashMap<NodeId, ConstValue>,
    classes: HashMap<NodeId, ClassId>,
    methods: HashMap<NodeId, MethodId>,
    fields: HashMap<NodeId, FieldId>,
    files: HashMap<String, Vec<String>>,
    not_ready: HashSet<NodeId>,
    index_ready: bool,
}

impl ResolveTable {
    pub fn new(store: TypeStore) -> Self {
        Self {
            store,
            candidates: HashMap::new(),
            chosen: HashMap::new(),
            expr_types: HashMap::new(),
            element_types: HashMap::new(),
            constants: HashMap::new(),
            classes: HashMap::new(),
            methods: HashMap::new(),
            fields: HashMap::new(),
            files: HashMap::new(),
            not_ready: HashSet::new(),
            index_ready: true,
        }
    }

    pub fn store(&self) -> &TypeStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut TypeStore {
        &mut self.store
    }

    pub fn bind_class(&mut self, decl: NodeId, class: ClassId) {
        self.classes.insert(decl, class);
    }

    pub fn bind_method(&mut self, decl: NodeId, method: MethodId) {
        self.methods.insert(decl, method);
    }

    pub fn bind_field(&mut self, decl: NodeId, field: FieldId) {
        self.fields.insert(decl, field);
    }

    /// Record `result` as a candidate for `reference`. A single candidate is
    /// what [`Resolver::resolve`] returns.
    pub fn add_candidate(&mut self, reference: NodeId, result: ResolveResult) {
        self.candidates.entry(reference).or_default().push(result);
    }

    /// Record `result` as the candidate chosen among several, e.g. the most
    /// specific applicable overload. It is also added as a candidate.
    pub fn choose(&mut self, reference: NodeId, result: ResolveResult) {
        self.add_candidate(reference, result.clone());
        self.chosen.insert(reference, result);
    }

    pub fn set_expr_type(&mut self, expr: NodeId, ty: Type) {
        self.expr_types.insert(expr, ty);
    }

    pub fn set_type(&mut self, type_element: NodeId, ty: Type) {
        self.element_types.insert(type_element, ty);
    }

    pub fn set_constant(&mut self, expr: NodeId, value: ConstValue) {
        self.constants.insert(expr, value);
    }

    pub fn add_file_declaring(&mut self, qualified_name: &str, path: &str) {
        self.files
            .entry(qualified_name.to_string())
            .or_default()
            .push(path.to_string());
    }

    /// Every query about `node` answers "index not ready".
    pub fn mark_not_ready(&mut self, node: NodeId) {
        self.not_ready.insert(node);
    }

    /// Every query answers "index not ready" while `false`.
    pub fn set_index_ready(&mut self, ready: bool) {
        self.index_ready = ready;
    }

    fn ready(&self, node: NodeId) -> Result<(), IndexNotReady> {
        if self.index_ready && !self.not_ready.contains(&node) {
            Ok(())
        } else {
            tracing::trace!(target: "nova.resolve", ?node, "index not ready");
            Err(IndexNotReady)
        }
    }
}

impl Resolver for ResolveTable {
    fn types(&self) -> &dyn TypeEnv {
        &self.store
    }

    fn resolve(&self, reference: NodeId) -> Result<Option<ResolveResult>, IndexNotReady> {
        self.ready(reference)?;
        if let Some(chosen) = self.chosen.get(&reference) {
            return Ok(Some(chosen.clone()));
        }
        Ok(match self.candidates.get(&reference).map(Vec::as_slice) {
            Some([single]) => Some(single.clone()),
            _ => None,
        })
    }

    fn multi_resolve(&self, reference: NodeId) -> Result<Vec<ResolveResult>, IndexNotReady> {
        self.ready(reference)?;
        Ok(self.candidates.get(&reference).cloned().unwrap_or_default())
    }

    fn expr_type(&self, expr: NodeId) -> Result<Type, IndexNotReady> {
        self.ready(expr)?;
        Ok(self.expr_types.get(&expr).cloned().unwrap_or(Type::Unknown))
    }

    fn type_of(&self, type_element: NodeId) -> Result<Type, IndexNotReady> {
        self.ready(type_element)?;
        Ok(self
            .element_types
            .get(&type_element)
            .cloned()
            .unwrap_or(Type::Unknown))
    }

    fn constant_value(&self, expr: NodeId) -> Result<Option<ConstValue>, IndexNotReady> {
        self.ready(expr)?;
        Ok(self.constants.get(&expr).cloned())
    }

    fn declared_class(&self, decl: NodeId) -> Option<ClassId> {
        self.classes.get(&decl).copied()
    }

    fn declared_method(&self, decl: NodeId) -> Option<MethodId> {
        self.methods.get(&decl).copied()
    }

    fn declared_field(&self, decl: NodeId) -> Option<FieldId> {
        self.fields.get(&decl).copied()
    }

    fn class_declaration(&self, class: ClassId) -> Option<NodeId> {
        self.classes
            .iter()
            .filter(|(_, c)| **c == class)
            .map(|(n, _)| *n)
            .min()
    }

    fn method_declaration(&self, method: MethodId) -> Option<NodeId> {
        self.methods
            .iter()
            .filter(|(_, m)| **m == method)
            .map(|(n, _)| *n)
            .min()
    }

    fn files_declaring(&self, qualified_name: &str) -> Result<Vec<String>, IndexNotReady> {
        if !self.index_ready {
            return Err(IndexNotReady);
        }
        Ok(self.files.get(qualified_name).cloned().unwrap_or_default())
    }
}
