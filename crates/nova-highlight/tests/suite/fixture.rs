//! Hand-built trees plus the resolver and flow facts a pass needs.
//!
//! Ranges are synthetic: every allocated node gets a fresh, non-overlapping
//! range so diagnostics can be matched back to the node that caused them.

use nova_core::{CancellationToken, Cancelled, JavaLanguageLevel, TextRange, TextSize};
use nova_flow::FlowTable;
use nova_highlight::{Diagnostic, HighlightConfig, HighlightContext, Highlighter};
use nova_hir::{Ast, AstBuilder, LiteralKind, NodeId, NodeKind, TypeElementKind, WildcardKind};
use nova_resolve::{ConstValue, Element, ResolveResult, ResolveTable, Resolver};
use nova_types::{
    ClassDef, ClassId, ClassKind, MethodDef, MethodId, Modifier, Modifiers, PrimitiveType, Type,
    TypeEnv, TypeStore, WildcardBound,
};

pub struct Fixture {
    tree: AstBuilder,
    pub resolve: ResolveTable,
    pub flow: FlowTable,
    pub config: HighlightConfig,
    pub level: JavaLanguageLevel,
    offset: u32,
}

impl Fixture {
    pub fn new(file_name: &str) -> Self {
        Self {
            tree: AstBuilder::new(file_name),
            resolve: ResolveTable::new(TypeStore::with_minimal_jdk()),
            flow: FlowTable::new(),
            config: HighlightConfig::default(),
            level: JavaLanguageLevel::JAVA_21,
            offset: 0,
        }
    }

    pub fn at_level(mut self, level: JavaLanguageLevel) -> Self {
        self.level = level;
        self
    }

    // ---- type store -------------------------------------------------------

    pub fn env(&self) -> &TypeStore {
        self.resolve.store()
    }

    pub fn store(&mut self) -> &mut TypeStore {
        self.resolve.store_mut()
    }

    pub fn class_id(&self, name: &str) -> ClassId {
        self.env()
            .class_id(name)
            .unwrap_or_else(|| panic!("class {name} is not declared"))
    }

    /// Non-generic class type, e.g. `ty("java.lang.String")`.
    pub fn ty(&self, name: &str) -> Type {
        Type::class(self.class_id(name), vec![])
    }

    /// Parameterized class type, e.g. `generic("java.util.List", vec![string])`.
    pub fn generic(&self, name: &str, args: Vec<Type>) -> Type {
        Type::class(self.class_id(name), args)
    }

    /// Adds a source class; plain classes extend `Object`.
    pub fn declare_class(&mut self, name: &str, kind: ClassKind, modifiers: &[Modifier]) -> ClassId {
        let mut def = ClassDef::new(name, kind);
        def.modifiers = Modifiers::new(modifiers);
        if kind == ClassKind::Class {
            def.super_class = Some(self.ty("java.lang.Object"));
        }
        self.store().add_class(def)
    }

    pub fn declare_method(&mut self, def: MethodDef) -> MethodId {
        self.store().add_method(def)
    }

    pub fn constructor(&self, class: &str, arity: usize) -> MethodId {
        let env = self.env();
        let def = env
            .class(self.class_id(class))
            .unwrap_or_else(|| panic!("class {class} has no definition"));
        def.methods
            .iter()
            .copied()
            .find(|m| {
                env.method(*m)
                    .is_some_and(|d| d.is_constructor && d.params.len() == arity)
            })
            .unwrap_or_else(|| panic!("{class} has no constructor with {arity} parameters"))
    }

    // ---- raw nodes --------------------------------------------------------

    pub fn fresh_range(&mut self, len: u32) -> TextRange {
        let start = self.offset;
        self.offset += len + 1;
        TextRange::new(TextSize::from(start), TextSize::from(start + len))
    }

    pub fn node(&mut self, kind: NodeKind) -> NodeId {
        let range = self.fresh_range(8);
        self.tree.alloc(kind, range)
    }

    pub fn range(&self, id: NodeId) -> TextRange {
        self.tree.range(id)
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        self.tree.kind(id)
    }

    /// Range of the declared name of `id`.
    pub fn name_range(&self, id: NodeId) -> TextRange {
        self.tree
            .kind(id)
            .name_range()
            .unwrap_or_else(|| self.tree.range(id))
    }

    // ---- modifiers and annotations ----------------------------------------

    pub fn modifiers(&mut self, modifiers: &[Modifier]) -> NodeId {
        self.annotated(modifiers, vec![])
    }

    pub fn annotated(&mut self, modifiers: &[Modifier], annotations: Vec<NodeId>) -> NodeId {
        let modifiers = modifiers
            .iter()
            .map(|m| self.node(NodeKind::Modifier { modifier: *m }))
            .collect();
        self.node(NodeKind::ModifierList {
            modifiers,
            annotations,
        })
    }

    /// Keyword node `modifier` inside the modifier list `list`.
    pub fn keyword(&self, list: NodeId, modifier: Modifier) -> NodeId {
        let NodeKind::ModifierList { modifiers, .. } = self.kind(list) else {
            panic!("{list:?} is not a modifier list");
        };
        modifiers
            .iter()
            .copied()
            .find(|m| matches!(self.kind(*m), NodeKind::Modifier { modifier: found } if *found == modifier))
            .unwrap_or_else(|| panic!("{list:?} has no {modifier:?}"))
    }

    /// `@Name` with a resolved reference and no arguments.
    pub fn annotation(&mut self, class: &str) -> NodeId {
        self.annotation_with(class, vec![])
    }

    pub fn annotation_with(&mut self, class: &str, args: Vec<NodeId>) -> NodeId {
        let ty = self.ty(class);
        let reference = self.code_ref(&ty, None);
        self.node(NodeKind::Annotation { reference, args })
    }

    // ---- types ------------------------------------------------------------

    /// Class name reference resolved to the class of `ty`.
    pub fn code_ref(&mut self, ty: &Type, type_args: Option<Vec<NodeId>>) -> NodeId {
        let class = ty.class_id();
        let name = class
            .and_then(|c| self.env().class(c))
            .map(|d| d.simple_name().to_string())
            .unwrap_or_else(|| "Unresolved".to_string());
        let name_range = self.fresh_range(name.len() as u32);
        let node = self.node(NodeKind::CodeRef {
            qualifier: None,
            name: name.into(),
            name_range,
            type_args,
        });
        if let Some(class) = class {
            self.resolve
                .add_candidate(node, ResolveResult::new(Element::Class(class)));
        }
        node
    }

    /// Type element tree for `ty`: every element typed, every name resolved.
    pub fn type_element(&mut self, ty: &Type) -> NodeId {
        let kind = match ty {
            Type::Primitive(p) => TypeElementKind::Primitive(*p),
            Type::Void => TypeElementKind::Void,
            Type::Array(component) => TypeElementKind::Array {
                component: self.type_element(component),
                varargs: false,
            },
            Type::Class(ct) => {
                let args = if ct.args.is_empty() {
                    None
                } else {
                    Some(ct.args.iter().map(|a| self.type_element(a)).collect())
                };
                TypeElementKind::Reference {
                    reference: self.code_ref(ty, args),
                }
            }
            Type::Wildcard(bound) => match bound {
                WildcardBound::Unbounded => TypeElementKind::Wildcard {
                    kind: WildcardKind::Unbounded,
                    bound: None,
                },
                WildcardBound::Extends(b) => TypeElementKind::Wildcard {
                    kind: WildcardKind::Extends,
                    bound: Some(self.type_element(b)),
                },
                WildcardBound::Super(b) => TypeElementKind::Wildcard {
                    kind: WildcardKind::Super,
                    bound: Some(self.type_element(b)),
                },
            },
            Type::Disjunction(alternatives) => TypeElementKind::Disjunction {
                alternatives: alternatives.iter().map(|a| self.type_element(a)).collect(),
            },
            _ => TypeElementKind::Inferred,
        };
        let element = self.node(NodeKind::TypeElement { kind });
        self.resolve.set_type(element, ty.clone());
        element
    }

    pub fn primitive(&mut self, p: PrimitiveType) -> NodeId {
        self.type_element(&Type::Primitive(p))
    }

    /// `T...` parameter type.
    pub fn varargs(&mut self, component: &Type) -> NodeId {
        let component_element = self.type_element(component);
        let element = self.node(NodeKind::TypeElement {
            kind: TypeElementKind::Array {
                component: component_element,
                varargs: true,
            },
        });
        self.resolve
            .set_type(element, Type::array(component.clone()));
        element
    }

    // ---- expressions ------------------------------------------------------

    pub fn expr(&mut self, kind: NodeKind, ty: Type) -> NodeId {
        let id = self.node(kind);
        self.resolve.set_expr_type(id, ty);
        id
    }

    /// Literal with its type; integral literals that fit also get a constant value.
    pub fn literal(&mut self, kind: LiteralKind, text: &str) -> NodeId {
        let ty = match kind {
            LiteralKind::Int => Type::int(),
            LiteralKind::Long => Type::Primitive(PrimitiveType::Long),
            LiteralKind::Float => Type::Primitive(PrimitiveType::Float),
            LiteralKind::Double => Type::Primitive(PrimitiveType::Double),
            LiteralKind::Char => Type::Primitive(PrimitiveType::Char),
            LiteralKind::Boolean => Type::boolean(),
            LiteralKind::String => self.ty("java.lang.String"),
            LiteralKind::Null => Type::Null,
        };
        let id = self.expr(
            NodeKind::Literal {
                kind,
                text: text.into(),
            },
            ty,
        );
        let constant = match kind {
            LiteralKind::Int => text.parse::<i32>().ok().map(|v| ConstValue::Int(v.into())),
            LiteralKind::Boolean => Some(ConstValue::Bool(text == "true")),
            LiteralKind::String => Some(ConstValue::Str(text.trim_matches('"').to_string())),
            _ => None,
        };
        if let Some(constant) = constant {
            self.resolve.set_constant(id, constant);
        }
        id
    }

    pub fn int(&mut self, value: i32) -> NodeId {
        self.literal(LiteralKind::Int, &value.to_string())
    }

    /// Unqualified name expression resolved to `target`.
    pub fn reference(&mut self, name: &str, ty: Type, target: Option<Element>) -> NodeId {
        let name_range = self.fresh_range(name.len() as u32);
        let id = self.expr(
            NodeKind::Reference {
                qualifier: None,
                name: name.into(),
                name_range,
                type_args: vec![],
            },
            ty,
        );
        if let Some(target) = target {
            self.resolve.add_candidate(id, ResolveResult::new(target));
        }
        id
    }

    /// Reads the local, parameter or field declared by `decl`.
    pub fn read(&mut self, decl: NodeId, ty: Type) -> NodeId {
        let name = self
            .tree
            .kind(decl)
            .name()
            .map(|n| n.to_string())
            .unwrap_or_default();
        let element = match self.resolve.declared_field(decl) {
            Some(field) => Element::Field(field),
            None => Element::Variable(decl),
        };
        self.reference(&name, ty, Some(element))
    }

    pub fn args(&mut self, args: Vec<NodeId>) -> NodeId {
        self.node(NodeKind::ArgList { args })
    }

    /// `name(args)`; `candidates` are recorded on the method name.
    pub fn call(&mut self, name: &str, args: Vec<NodeId>, ret: Type, candidates: Vec<ResolveResult>) -> NodeId {
        let method = self.reference(name, Type::Unknown, None);
        for candidate in candidates {
            self.resolve.add_candidate(method, candidate);
        }
        let args = self.args(args);
        self.expr(NodeKind::MethodCall { method, args }, ret)
    }

    /// `new T(args)` resolved to the constructor of `class` with matching arity.
    pub fn new_object(&mut self, ty: &Type, args: Vec<NodeId>) -> NodeId {
        let class = ty.class_id();
        let arity = args.len();
        let ty_element = self.type_element(ty);
        let args = self.args(args);
        let id = self.expr(
            NodeKind::New {
                qualifier: None,
                ty: ty_element,
                dims: vec![],
                array_dims: 0,
                args: Some(args),
                initializer: None,
                anonymous_body: None,
            },
            ty.clone(),
        );
        let ctor = class.and_then(|c| {
            let env = self.env();
            env.class(c)?.methods.iter().copied().find(|m| {
                env.method(*m)
                    .is_some_and(|d| d.is_constructor && d.params.len() == arity)
            })
        });
        if let Some(ctor) = ctor {
            self.resolve
                .add_candidate(id, ResolveResult::new(Element::Method(ctor)));
        }
        id
    }

    // ---- statements and declarations --------------------------------------

    pub fn stmt(&mut self, expr: NodeId) -> NodeId {
        self.node(NodeKind::ExpressionStatement { expr })
    }

    pub fn block(&mut self, statements: Vec<NodeId>) -> NodeId {
        let rbrace = self.fresh_range(1);
        self.node(NodeKind::Block { statements, rbrace })
    }

    pub fn local(&mut self, modifiers: &[Modifier], name: &str, ty: NodeId, initializer: Option<NodeId>) -> NodeId {
        let modifiers = self.modifiers(modifiers);
        let name_range = self.fresh_range(name.len() as u32);
        self.node(NodeKind::LocalVariable {
            modifiers,
            ty,
            name: name.into(),
            name_range,
            initializer,
        })
    }

    pub fn param(&mut self, name: &str, ty: NodeId) -> NodeId {
        let modifiers = self.modifiers(&[]);
        let name_range = self.fresh_range(name.len() as u32);
        self.node(NodeKind::Parameter {
            modifiers,
            ty,
            name: name.into(),
            name_range,
        })
    }

    pub fn field(&mut self, modifiers: NodeId, name: &str, ty: NodeId, initializer: Option<NodeId>) -> NodeId {
        let name_range = self.fresh_range(name.len() as u32);
        self.node(NodeKind::Field {
            modifiers,
            ty,
            name: name.into(),
            name_range,
            initializer,
        })
    }

    pub fn method(
        &mut self,
        modifiers: NodeId,
        name: &str,
        return_type: Option<NodeId>,
        params: Vec<NodeId>,
        body: Option<NodeId>,
    ) -> NodeId {
        let name_range = self.fresh_range(name.len() as u32);
        self.node(NodeKind::Method {
            name: name.into(),
            name_range,
            modifiers,
            type_params: vec![],
            return_type,
            params,
            throws: None,
            body,
        })
    }

    pub fn class(&mut self, modifiers: NodeId, name: &str, kind: ClassKind, members: Vec<NodeId>) -> NodeId {
        let name_range = self.fresh_range(name.len() as u32);
        self.node(NodeKind::Class {
            name: name.into(),
            name_range,
            kind,
            modifiers,
            type_params: vec![],
            extends: None,
            implements: None,
            members,
            anonymous: false,
        })
    }

    pub fn file(&mut self, classes: Vec<NodeId>) -> NodeId {
        self.file_with_imports(vec![], classes)
    }

    pub fn file_with_imports(&mut self, imports: Vec<NodeId>, classes: Vec<NodeId>) -> NodeId {
        self.node(NodeKind::File {
            package: None,
            imports,
            classes,
        })
    }

    /// `class Test { <ret> m() { statements } }` with the class and method
    /// bound to declarations in the type store.
    pub fn in_method_returning(&mut self, ret: Type, statements: Vec<NodeId>) -> NodeId {
        let class = self.declare_class("Test", ClassKind::Class, &[]);
        let method = self.declare_method(MethodDef::new("m", class, vec![], ret.clone()));
        let body = self.block(statements);
        let return_type = self.type_element(&ret);
        let modifiers = self.modifiers(&[]);
        let decl = self.method(modifiers, "m", Some(return_type), vec![], Some(body));
        self.resolve.bind_method(decl, method);
        let class_modifiers = self.modifiers(&[]);
        let class_decl = self.class(class_modifiers, "Test", ClassKind::Class, vec![decl]);
        self.resolve.bind_class(class_decl, class);
        self.file(vec![class_decl])
    }

    pub fn in_method(&mut self, statements: Vec<NodeId>) -> NodeId {
        self.in_method_returning(Type::Void, statements)
    }

    // ---- running ----------------------------------------------------------

    pub fn finish(self, root: NodeId) -> Prepared {
        Prepared {
            ast: self.tree.finish(root),
            resolve: self.resolve,
            flow: self.flow,
            config: self.config,
            level: self.level,
        }
    }

    pub fn analyze(self, root: NodeId) -> Vec<Diagnostic> {
        self.finish(root).analyze()
    }
}

/// A finished tree with its facts, ready for one or more passes.
pub struct Prepared {
    pub ast: Ast,
    pub resolve: ResolveTable,
    pub flow: FlowTable,
    pub config: HighlightConfig,
    pub level: JavaLanguageLevel,
}

impl Prepared {
    pub fn context(&self) -> HighlightContext<'_> {
        HighlightContext::new(&self.resolve, &self.flow, &self.config).with_language_level(self.level)
    }

    pub fn run(&self, highlighter: &mut Highlighter, cancel: &CancellationToken) -> Result<Vec<Diagnostic>, Cancelled> {
        highlighter.analyze(&self.ast, &self.context(), cancel)
    }

    pub fn analyze(&self) -> Vec<Diagnostic> {
        self.run(&mut Highlighter::new(), &CancellationToken::new())
            .expect("pass was not cancelled")
    }
}

pub fn with_code<'a>(diagnostics: &'a [Diagnostic], code: &str) -> Vec<&'a Diagnostic> {
    diagnostics.iter().filter(|d| d.code == code).collect()
}

/// The only diagnostic with `code`.
pub fn single<'a>(diagnostics: &'a [Diagnostic], code: &str) -> &'a Diagnostic {
    match with_code(diagnostics, code).as_slice() {
        [one] => one,
        other => panic!("expected one `{code}` diagnostic, got {}: {diagnostics:#?}", other.len()),
    }
}

pub fn messages(diagnostics: &[Diagnostic]) -> Vec<&str> {
    diagnostics.iter().map(|d| d.message.as_str()).collect()
}
