//! Declarations as seen by the type system: classes, methods, fields and type parameters.

use serde::{Deserialize, Serialize};

use crate::{ClassId, Type, TypeVarId};

/// Java modifier keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Modifier {
    Public,
    Protected,
    Private,
    PackageLocal,
    Static,
    Abstract,
    Final,
    Native,
    Synchronized,
    Transient,
    Volatile,
    Strictfp,
    Default,
    Sealed,
    NonSealed,
}

impl Modifier {
    pub const ALL: [Modifier; 15] = [
        Modifier::Public,
        Modifier::Protected,
        Modifier::Private,
        Modifier::PackageLocal,
        Modifier::Static,
        Modifier::Abstract,
        Modifier::Final,
        Modifier::Native,
        Modifier::Synchronized,
        Modifier::Transient,
        Modifier::Volatile,
        Modifier::Strictfp,
        Modifier::Default,
        Modifier::Sealed,
        Modifier::NonSealed,
    ];

    /// Source keyword. `PackageLocal` has no keyword and renders as `packageLocal`.
    pub const fn keyword(self) -> &'static str {
        match self {
            Modifier::Public => "public",
            Modifier::Protected => "protected",
            Modifier::Private => "private",
            Modifier::PackageLocal => "packageLocal",
            Modifier::Static => "static",
            Modifier::Abstract => "abstract",
            Modifier::Final => "final",
            Modifier::Native => "native",
            Modifier::Synchronized => "synchronized",
            Modifier::Transient => "transient",
            Modifier::Volatile => "volatile",
            Modifier::Strictfp => "strictfp",
            Modifier::Default => "default",
            Modifier::Sealed => "sealed",
            Modifier::NonSealed => "non-sealed",
        }
    }

    const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

/// A set of modifiers.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers(u16);

impl Modifiers {
    pub const EMPTY: Modifiers = Modifiers(0);

    pub fn new(mods: &[Modifier]) -> Self {
        mods.iter().fold(Self::EMPTY, |acc, m| acc.with(*m))
    }

    #[must_use]
    pub const fn with(self, m: Modifier) -> Self {
        Modifiers(self.0 | m.bit())
    }

    pub const fn has(self, m: Modifier) -> bool {
        self.0 & m.bit() != 0
    }

    pub fn iter(self) -> impl Iterator<Item = Modifier> {
        Modifier::ALL.into_iter().filter(move |m| self.has(*m))
    }

    /// Effective access level; no access keyword means package-private.
    pub fn access(self) -> Modifier {
        [Modifier::Public, Modifier::Protected, Modifier::Private]
            .into_iter()
            .find(|m| self.has(*m))
            .unwrap_or(Modifier::PackageLocal)
    }
}

impl std::fmt::Debug for Modifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Java access levels ordered from weakest to strongest.
pub fn access_rank(access: Modifier) -> u8 {
    match access {
        Modifier::Private => 0,
        Modifier::PackageLocal => 1,
        Modifier::Protected => 2,
        _ => 3,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
    Annotation,
}

impl ClassKind {
    pub fn is_interface(self) -> bool {
        matches!(self, ClassKind::Interface | ClassKind::Annotation)
    }
}

/// `java.lang.annotation.ElementType` constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ElementType {
    Type,
    Field,
    Method,
    Parameter,
    Constructor,
    LocalVariable,
    AnnotationType,
    Package,
    TypeParameter,
    TypeUse,
}

impl ElementType {
    pub const fn name(self) -> &'static str {
        match self {
            ElementType::Type => "TYPE",
            ElementType::Field => "FIELD",
            ElementType::Method => "METHOD",
            ElementType::Parameter => "PARAMETER",
            ElementType::Constructor => "CONSTRUCTOR",
            ElementType::LocalVariable => "LOCAL_VARIABLE",
            ElementType::AnnotationType => "ANNOTATION_TYPE",
            ElementType::Package => "PACKAGE",
            ElementType::TypeParameter => "TYPE_PARAMETER",
            ElementType::TypeUse => "TYPE_USE",
        }
    }

    /// Description used in "not applicable" messages.
    pub const fn presentable(self) -> &'static str {
        match self {
            ElementType::Type => "type",
            ElementType::Field => "field",
            ElementType::Method => "method",
            ElementType::Parameter => "parameter",
            ElementType::Constructor => "constructor",
            ElementType::LocalVariable => "local variable",
            ElementType::AnnotationType => "annotation type",
            ElementType::Package => "package",
            ElementType::TypeParameter => "type parameter",
            ElementType::TypeUse => "type use",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationAttribute {
    pub name: String,
    pub ty: Type,
    pub has_default: bool,
}

/// Metadata carried by annotation type declarations.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnnotationInfo {
    /// `None` when the annotation type has no `@Target` (applicable to declarations).
    pub targets: Option<Vec<ElementType>>,
    /// Container type named by `@Repeatable`.
    pub repeatable_container: Option<ClassId>,
    pub attributes: Vec<AnnotationAttribute>,
}

impl AnnotationInfo {
    pub fn attribute(&self, name: &str) -> Option<&AnnotationAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDef {
    /// Fully qualified name, nested classes joined with `.`.
    pub name: String,
    pub kind: ClassKind,
    pub modifiers: Modifiers,
    pub type_params: Vec<TypeVarId>,
    pub super_class: Option<Type>,
    pub interfaces: Vec<Type>,
    pub outer: Option<ClassId>,
    pub fields: Vec<crate::FieldId>,
    /// Methods and constructors in declaration order.
    pub methods: Vec<crate::MethodId>,
    pub annotation: Option<AnnotationInfo>,
}

impl ClassDef {
    pub fn new(name: impl Into<String>, kind: ClassKind) -> Self {
        Self {
            name: name.into(),
            kind,
            modifiers: Modifiers::EMPTY,
            type_params: Vec::new(),
            super_class: None,
            interfaces: Vec::new(),
            outer: None,
            fields: Vec::new(),
            methods: Vec::new(),
            annotation: None,
        }
    }

    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    pub fn is_interface(&self) -> bool {
        self.kind.is_interface()
    }

    pub fn is_abstract(&self) -> bool {
        self.is_interface() || self.modifiers.has(Modifier::Abstract)
    }

    pub fn is_final(&self) -> bool {
        self.modifiers.has(Modifier::Final)
    }

    /// Inner (non-static nested) class: has an enclosing instance.
    pub fn is_inner(&self) -> bool {
        self.outer.is_some()
            && !self.modifiers.has(Modifier::Static)
            && matches!(self.kind, ClassKind::Class)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDef {
    pub name: String,
    pub owner: ClassId,
    pub modifiers: Modifiers,
    pub type_params: Vec<TypeVarId>,
    pub params: Vec<Type>,
    /// `Type::Void` for `void` methods and constructors.
    pub return_type: Type,
    pub throws: Vec<Type>,
    pub is_varargs: bool,
    pub is_constructor: bool,
}

impl MethodDef {
    pub fn new(name: impl Into<String>, owner: ClassId, params: Vec<Type>, ret: Type) -> Self {
        Self {
            name: name.into(),
            owner,
            modifiers: Modifiers::EMPTY,
            type_params: Vec::new(),
            params,
            return_type: ret,
            throws: Vec::new(),
            is_varargs: false,
            is_constructor: false,
        }
    }

    pub fn constructor(owner: ClassId, params: Vec<Type>) -> Self {
        Self {
            is_constructor: true,
            ..Self::new("<init>", owner, params, Type::Void)
        }
    }

    #[must_use]
    pub fn with_modifiers(mut self, mods: &[Modifier]) -> Self {
        self.modifiers = Modifiers::new(mods);
        self
    }

    #[must_use]
    pub fn with_throws(mut self, throws: Vec<Type>) -> Self {
        self.throws = throws;
        self
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.has(Modifier::Static)
    }

    pub fn is_abstract(&self) -> bool {
        self.modifiers.has(Modifier::Abstract)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub owner: ClassId,
    pub ty: Type,
    pub modifiers: Modifiers,
    pub is_enum_constant: bool,
}

impl FieldDef {
    pub fn is_static(&self) -> bool {
        self.modifiers.has(Modifier::Static) || self.is_enum_constant
    }

    pub fn is_final(&self) -> bool {
        self.modifiers.has(Modifier::Final) || self.is_enum_constant
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeParamDef {
    pub name: String,
    /// Declared bounds in source order; empty means `Object`.
    pub upper_bounds: Vec<Type>,
    /// Only capture variables of `? super` wildcards have one.
    pub lower_bound: Option<Type>,
}
