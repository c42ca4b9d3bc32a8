use std::fmt;

use nova_core::{Name, TextRange};
use nova_types::{ClassKind, Modifier, PrimitiveType};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn from_raw(raw: u32) -> Self {
        NodeId(raw)
    }

    #[must_use]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub range: TextRange,
    pub parent: Option<NodeId>,
}

/// One parsed Java file.
#[derive(Debug, Clone, PartialEq)]
pub struct Ast {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
    pub(crate) file_name: String,
}

impl Ast {
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// File name without directories, e.g. `Foo.java`.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.idx()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.idx()].kind
    }

    pub fn range(&self, id: NodeId) -> TextRange {
        self.nodes[id.idx()].range
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.idx()].parent
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Strict ancestors, innermost first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |p| self.parent(*p))
    }

    /// Parent after skipping parenthesized expressions.
    pub fn parent_skipping_parens(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id)
            .find(|p| !matches!(self.kind(*p), NodeKind::Parenthesized { .. }))
    }

    /// The expression with any parentheses removed.
    pub fn skip_parens(&self, mut id: NodeId) -> NodeId {
        while let NodeKind::Parenthesized { expr } = self.kind(id) {
            id = *expr;
        }
        id
    }

    /// Innermost enclosing class declaration (including anonymous class bodies).
    pub fn enclosing_class(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id)
            .find(|a| matches!(self.kind(*a), NodeKind::Class { .. }))
    }

    /// Innermost enclosing method or constructor, stopping at class boundaries.
    pub fn enclosing_method(&self, id: NodeId) -> Option<NodeId> {
        for a in self.ancestors(id) {
            match self.kind(a) {
                NodeKind::Method { .. } => return Some(a),
                NodeKind::Class { .. } | NodeKind::Lambda { .. } => return None,
                _ => {}
            }
        }
        None
    }

    /// Innermost method, initializer or lambda that owns `id`'s code.
    pub fn enclosing_code_owner(&self, id: NodeId) -> Option<NodeId> {
        for a in self.ancestors(id) {
            match self.kind(a) {
                NodeKind::Method { .. }
                | NodeKind::Initializer { .. }
                | NodeKind::Lambda { .. }
                | NodeKind::Field { .. } => return Some(a),
                NodeKind::Class { .. } => return None,
                _ => {}
            }
        }
        None
    }

    pub fn is_expression(&self, id: NodeId) -> bool {
        self.kind(id).is_expression()
    }

    pub fn name(&self, id: NodeId) -> Option<&Name> {
        self.kind(id).name()
    }

    /// Range of the declared name, falling back to the node range.
    pub fn name_range(&self, id: NodeId) -> TextRange {
        self.kind(id).name_range().unwrap_or_else(|| self.range(id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceListRole {
    Extends,
    Implements,
    Throws,
    /// Bounds of a type parameter.
    Bounds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WildcardKind {
    Unbounded,
    Extends,
    Super,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeElementKind {
    Primitive(PrimitiveType),
    Void,
    /// `var` in a local variable or lambda parameter.
    Inferred,
    Reference { reference: NodeId },
    Array { component: NodeId, varargs: bool },
    Wildcard { kind: WildcardKind, bound: Option<NodeId> },
    /// `IOException | SQLException` in a multi-catch parameter.
    Disjunction { alternatives: Vec<NodeId> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiteralKind {
    Int,
    Long,
    Float,
    Double,
    Char,
    String,
    Boolean,
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    UShr,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    BitAnd,
    BitOr,
    BitXor,
    And,
    Or,
}

impl BinaryOp {
    pub const fn text(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::UShr => ">>>",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    BitNot,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

impl UnaryOp {
    pub const fn text(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::PreInc | UnaryOp::PostInc => "++",
            UnaryOp::PreDec | UnaryOp::PostDec => "--",
        }
    }

    pub const fn is_increment(self) -> bool {
        matches!(
            self,
            UnaryOp::PreInc | UnaryOp::PreDec | UnaryOp::PostInc | UnaryOp::PostDec
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignOp {
    Assign,
    Compound(BinaryOp),
}

/// Every syntactic construct the checks know about.
///
/// Child links are [`NodeId`]s into the same [`Ast`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    // Declarations
    File {
        package: Option<Name>,
        imports: Vec<NodeId>,
        classes: Vec<NodeId>,
    },
    Import {
        /// Qualified name without the trailing `.*`.
        path: Name,
        is_static: bool,
        on_demand: bool,
    },
    Class {
        name: Name,
        name_range: TextRange,
        kind: ClassKind,
        modifiers: NodeId,
        type_params: Vec<NodeId>,
        extends: Option<NodeId>,
        implements: Option<NodeId>,
        members: Vec<NodeId>,
        /// Anonymous class bodies have an empty name.
        anonymous: bool,
    },
    EnumConstant {
        name: Name,
        name_range: TextRange,
        args: Option<NodeId>,
        body: Option<NodeId>,
    },
    Method {
        name: Name,
        name_range: TextRange,
        modifiers: NodeId,
        type_params: Vec<NodeId>,
        /// `None` for constructors (and for malformed methods missing a return type).
        return_type: Option<NodeId>,
        params: Vec<NodeId>,
        throws: Option<NodeId>,
        body: Option<NodeId>,
    },
    Field {
        modifiers: NodeId,
        ty: NodeId,
        name: Name,
        name_range: TextRange,
        initializer: Option<NodeId>,
    },
    Initializer {
        modifiers: NodeId,
        body: NodeId,
    },
    Parameter {
        modifiers: NodeId,
        ty: NodeId,
        name: Name,
        name_range: TextRange,
    },
    TypeParameter {
        name: Name,
        bounds: Option<NodeId>,
    },
    ModifierList {
        modifiers: Vec<NodeId>,
        annotations: Vec<NodeId>,
    },
    Modifier {
        modifier: Modifier,
    },
    Annotation {
        reference: NodeId,
        args: Vec<NodeId>,
    },
    NameValuePair {
        /// `None` for the shorthand `@A(value)` form.
        name: Option<Name>,
        value: NodeId,
    },
    ReferenceList {
        role: ReferenceListRole,
        types: Vec<NodeId>,
    },
    TypeElement {
        kind: TypeElementKind,
    },
    /// A reference to a type or package in a type position (`java.util.List<String>`).
    CodeRef {
        qualifier: Option<NodeId>,
        name: Name,
        name_range: TextRange,
        /// `Some(vec![])` is the diamond `<>`.
        type_args: Option<Vec<NodeId>>,
    },

    // Statements
    Block {
        statements: Vec<NodeId>,
        rbrace: TextRange,
    },
    LocalVariable {
        modifiers: NodeId,
        ty: NodeId,
        name: Name,
        name_range: TextRange,
        initializer: Option<NodeId>,
    },
    ExpressionStatement {
        expr: NodeId,
    },
    If {
        condition: NodeId,
        then_branch: NodeId,
        else_branch: Option<NodeId>,
    },
    While {
        condition: NodeId,
        body: NodeId,
    },
    DoWhile {
        body: NodeId,
        condition: NodeId,
    },
    For {
        init: Vec<NodeId>,
        condition: Option<NodeId>,
        update: Vec<NodeId>,
        body: NodeId,
    },
    ForEach {
        param: NodeId,
        iterable: NodeId,
        body: NodeId,
    },
    Switch {
        selector: NodeId,
        body: NodeId,
    },
    SwitchLabel {
        /// Empty for `default:`.
        values: Vec<NodeId>,
    },
    Return {
        value: Option<NodeId>,
    },
    Throw {
        exception: NodeId,
    },
    Break {
        label: Option<Name>,
    },
    Continue {
        label: Option<Name>,
    },
    Try {
        resources: Vec<NodeId>,
        block: NodeId,
        catches: Vec<NodeId>,
        finally: Option<NodeId>,
    },
    CatchSection {
        param: NodeId,
        block: NodeId,
    },
    Synchronized {
        lock: NodeId,
        body: NodeId,
    },
    Labeled {
        label: Name,
        label_range: TextRange,
        body: Option<NodeId>,
    },
    Assert {
        condition: NodeId,
        message: Option<NodeId>,
    },
    Empty,

    // Expressions
    Literal {
        kind: LiteralKind,
        text: Name,
    },
    /// Name reference, possibly qualified: variables, fields, method names of calls.
    Reference {
        qualifier: Option<NodeId>,
        name: Name,
        name_range: TextRange,
        type_args: Vec<NodeId>,
    },
    This {
        qualifier: Option<NodeId>,
    },
    Super {
        qualifier: Option<NodeId>,
    },
    MethodCall {
        /// A `Reference`, or `This`/`Super` for explicit constructor calls.
        method: NodeId,
        args: NodeId,
    },
    ArgList {
        args: Vec<NodeId>,
    },
    New {
        qualifier: Option<NodeId>,
        /// Class reference (`CodeRef` type element) or array element type.
        ty: NodeId,
        /// Dimension expressions of an array creation.
        dims: Vec<NodeId>,
        /// Total array dimensions, including `[]` without an expression.
        array_dims: u8,
        args: Option<NodeId>,
        initializer: Option<NodeId>,
        anonymous_body: Option<NodeId>,
    },
    Assignment {
        op: AssignOp,
        lhs: NodeId,
        rhs: NodeId,
    },
    Binary {
        op: BinaryOp,
        lhs: NodeId,
        rhs: NodeId,
    },
    Unary {
        op: UnaryOp,
        operand: NodeId,
    },
    Conditional {
        condition: NodeId,
        then_expr: NodeId,
        else_expr: NodeId,
    },
    InstanceOf {
        expr: NodeId,
        ty: NodeId,
    },
    Cast {
        ty: NodeId,
        expr: NodeId,
    },
    ArrayAccess {
        array: NodeId,
        index: NodeId,
    },
    ArrayInit {
        elements: Vec<NodeId>,
    },
    Parenthesized {
        expr: NodeId,
    },
    ClassLiteral {
        ty: NodeId,
    },
    Lambda {
        params: Vec<NodeId>,
        body: NodeId,
    },
    MethodRef {
        qualifier: NodeId,
        name: Name,
    },

    /// Syntax error placeholder; nothing below it is checked.
    Error {
        children: Vec<NodeId>,
    },
}

impl NodeKind {
    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            NodeKind::Literal { .. }
                | NodeKind::Reference { .. }
                | NodeKind::This { .. }
                | NodeKind::Super { .. }
                | NodeKind::MethodCall { .. }
                | NodeKind::New { .. }
                | NodeKind::Assignment { .. }
                | NodeKind::Binary { .. }
                | NodeKind::Unary { .. }
                | NodeKind::Conditional { .. }
                | NodeKind::InstanceOf { .. }
                | NodeKind::Cast { .. }
                | NodeKind::ArrayAccess { .. }
                | NodeKind::ArrayInit { .. }
                | NodeKind::Parenthesized { .. }
                | NodeKind::ClassLiteral { .. }
                | NodeKind::Lambda { .. }
                | NodeKind::MethodRef { .. }
        )
    }

    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::Block { .. }
                | NodeKind::LocalVariable { .. }
                | NodeKind::ExpressionStatement { .. }
                | NodeKind::If { .. }
                | NodeKind::While { .. }
                | NodeKind::DoWhile { .. }
                | NodeKind::For { .. }
                | NodeKind::ForEach { .. }
                | NodeKind::Switch { .. }
                | NodeKind::SwitchLabel { .. }
                | NodeKind::Return { .. }
                | NodeKind::Throw { .. }
                | NodeKind::Break { .. }
                | NodeKind::Continue { .. }
                | NodeKind::Try { .. }
                | NodeKind::Synchronized { .. }
                | NodeKind::Labeled { .. }
                | NodeKind::Assert { .. }
                | NodeKind::Empty
        )
    }

    pub fn is_loop(&self) -> bool {
        matches!(
            self,
            NodeKind::While { .. }
                | NodeKind::DoWhile { .. }
                | NodeKind::For { .. }
                | NodeKind::ForEach { .. }
        )
    }

    /// Declared name of declarations and references.
    pub fn name(&self) -> Option<&Name> {
        match self {
            NodeKind::Class { name, .. }
            | NodeKind::EnumConstant { name, .. }
            | NodeKind::Method { name, .. }
            | NodeKind::Field { name, .. }
            | NodeKind::Parameter { name, .. }
            | NodeKind::TypeParameter { name, .. }
            | NodeKind::LocalVariable { name, .. }
            | NodeKind::CodeRef { name, .. }
            | NodeKind::Reference { name, .. }
            | NodeKind::Labeled { label: name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn name_range(&self) -> Option<TextRange> {
        match self {
            NodeKind::Class {
                name_range,
                anonymous: false,
                ..
            }
            | NodeKind::EnumConstant { name_range, .. }
            | NodeKind::Method { name_range, .. }
            | NodeKind::Field { name_range, .. }
            | NodeKind::Parameter { name_range, .. }
            | NodeKind::LocalVariable { name_range, .. }
            | NodeKind::CodeRef { name_range, .. }
            | NodeKind::Reference { name_range, .. }
            | NodeKind::Labeled {
                label_range: name_range,
                ..
            } => Some(*name_range),
            _ => None,
        }
    }

    /// Variables: fields, locals, parameters.
    pub fn is_variable(&self) -> bool {
        matches!(
            self,
            NodeKind::Field { .. } | NodeKind::LocalVariable { .. } | NodeKind::Parameter { .. }
        )
    }

    /// Modifier list of a declaration, if it has one.
    pub fn modifier_list(&self) -> Option<NodeId> {
        match self {
            NodeKind::Class { modifiers, .. }
            | NodeKind::Method { modifiers, .. }
            | NodeKind::Field { modifiers, .. }
            | NodeKind::Initializer { modifiers, .. }
            | NodeKind::Parameter { modifiers, .. }
            | NodeKind::LocalVariable { modifiers, .. } => Some(*modifiers),
            _ => None,
        }
    }

    /// Declared type element of a variable.
    pub fn variable_type(&self) -> Option<NodeId> {
        match self {
            NodeKind::Field { ty, .. }
            | NodeKind::LocalVariable { ty, .. }
            | NodeKind::Parameter { ty, .. } => Some(*ty),
            _ => None,
        }
    }
}
