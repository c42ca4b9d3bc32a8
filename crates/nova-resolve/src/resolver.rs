use nova_core::{IndexNotReady, Name};
use nova_hir::NodeId;
use nova_types::{ClassId, FieldId, MethodId, Substitution, Type, TypeEnv, TypeVarId};

/// What a reference resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Class(ClassId),
    Method(MethodId),
    Field(FieldId),
    /// A local variable or parameter, identified by its declaration node.
    Variable(NodeId),
    TypeParam(TypeVarId),
    Package(Name),
}

/// One candidate for a reference together with the resolver's verdicts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveResult {
    pub element: Element,
    /// Maps the type parameters visible at the element to their instantiation.
    pub substitution: Substitution,
    pub accessible: bool,
    /// `false` when an instance member is referenced from a static context.
    pub statics_ok: bool,
    /// For methods: whether the call's arguments are applicable.
    pub applicable: bool,
}

impl ResolveResult {
    pub fn new(element: Element) -> Self {
        Self {
            element,
            substitution: Substitution::empty(),
            accessible: true,
            statics_ok: true,
            applicable: true,
        }
    }

    #[must_use]
    pub fn with_substitution(mut self, substitution: Substitution) -> Self {
        self.substitution = substitution;
        self
    }

    #[must_use]
    pub fn inaccessible(mut self) -> Self {
        self.accessible = false;
        self
    }

    #[must_use]
    pub fn wrong_static_context(mut self) -> Self {
        self.statics_ok = false;
        self
    }

    #[must_use]
    pub fn inapplicable(mut self) -> Self {
        self.applicable = false;
        self
    }

    /// Accessible, in the right static context and applicable.
    pub fn is_valid(&self) -> bool {
        self.accessible && self.statics_ok && self.applicable
    }

    pub fn as_class(&self) -> Option<ClassId> {
        match self.element {
            Element::Class(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<MethodId> {
        match self.element {
            Element::Method(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_field(&self) -> Option<FieldId> {
        match self.element {
            Element::Field(id) => Some(id),
            _ => None,
        }
    }
}

/// Compile-time constant value of an expression (JLS 15.29).
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Int(i64),
    Long(i64),
    Float(f64),
    Double(f64),
    Char(u16),
    Bool(bool),
    Str(String),
}

impl ConstValue {
    /// Integral value usable for constant narrowing and `case` comparisons.
    pub fn as_integral(&self) -> Option<i64> {
        match self {
            ConstValue::Int(v) | ConstValue::Long(v) => Some(*v),
            ConstValue::Char(c) => Some(i64::from(*c)),
            _ => None,
        }
    }
}

/// Semantic facts about one file, provided by the host's resolution engine.
///
/// Implementations are read-only for the duration of an analysis pass.
pub trait Resolver {
    fn types(&self) -> &dyn TypeEnv;

    /// The unique valid-or-not target of a reference (`Reference`, `CodeRef`,
    /// `MethodCall`, `New`, `This`/`Super` constructor calls). `None` when
    /// unresolved or ambiguous.
    fn resolve(&self, reference: NodeId) -> Result<Option<ResolveResult>, IndexNotReady>;

    /// Every candidate considered for a reference (overloads, ambiguous imports).
    fn multi_resolve(&self, reference: NodeId) -> Result<Vec<ResolveResult>, IndexNotReady>;

    /// Type of an expression; `Type::Unknown` if it cannot be computed.
    fn expr_type(&self, expr: NodeId) -> Result<Type, IndexNotReady>;

    /// Type denoted by a type element; `Type::Unknown` if unresolved.
    fn type_of(&self, type_element: NodeId) -> Result<Type, IndexNotReady>;

    fn constant_value(&self, expr: NodeId) -> Result<Option<ConstValue>, IndexNotReady>;

    fn declared_class(&self, decl: NodeId) -> Option<ClassId>;
    fn declared_method(&self, decl: NodeId) -> Option<MethodId>;
    fn declared_field(&self, decl: NodeId) -> Option<FieldId>;

    /// Declaration node of a class declared in this file.
    fn class_declaration(&self, class: ClassId) -> Option<NodeId>;
    /// Declaration node of a method declared in this file.
    fn method_declaration(&self, method: MethodId) -> Option<NodeId>;

    /// Paths of every source file in the module that declares `qualified_name`.
    fn files_declaring(&self, qualified_name: &str) -> Result<Vec<String>, IndexNotReady>;
}
