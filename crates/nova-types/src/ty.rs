use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub(crate) u32);

        impl $name {
            #[must_use]
            pub fn idx(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

id_type!(
    /// A class, interface, enum or annotation type declaration.
    ClassId
);
id_type!(
    /// A method or constructor declaration.
    MethodId
);
id_type!(
    /// A field or enum constant declaration.
    FieldId
);
id_type!(
    /// A declared type parameter or a capture variable.
    TypeVarId
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 8] = [
        PrimitiveType::Boolean,
        PrimitiveType::Byte,
        PrimitiveType::Short,
        PrimitiveType::Char,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Float,
        PrimitiveType::Double,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Char => "char",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }

    /// Fully qualified name of the wrapper class.
    pub const fn boxed_name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "java.lang.Boolean",
            PrimitiveType::Byte => "java.lang.Byte",
            PrimitiveType::Short => "java.lang.Short",
            PrimitiveType::Char => "java.lang.Character",
            PrimitiveType::Int => "java.lang.Integer",
            PrimitiveType::Long => "java.lang.Long",
            PrimitiveType::Float => "java.lang.Float",
            PrimitiveType::Double => "java.lang.Double",
        }
    }

    pub const fn is_numeric(self) -> bool {
        !matches!(self, PrimitiveType::Boolean)
    }

    pub const fn is_integral(self) -> bool {
        matches!(
            self,
            PrimitiveType::Byte
                | PrimitiveType::Short
                | PrimitiveType::Char
                | PrimitiveType::Int
                | PrimitiveType::Long
        )
    }

    /// Identity or widening primitive conversion (JLS 5.1.2).
    pub fn widens_to(self, target: PrimitiveType) -> bool {
        use PrimitiveType::*;
        if self == target {
            return true;
        }
        matches!(
            (self, target),
            (Byte, Short | Int | Long | Float | Double)
                | (Short, Int | Long | Float | Double)
                | (Char, Int | Long | Float | Double)
                | (Int, Long | Float | Double)
                | (Long, Float | Double)
                | (Float, Double)
        )
    }

    /// Whether an `int` constant `value` fits this type (used for constant narrowing).
    pub fn fits_constant(self, value: i64) -> bool {
        match self {
            PrimitiveType::Byte => i8::try_from(value).is_ok(),
            PrimitiveType::Short => i16::try_from(value).is_ok(),
            PrimitiveType::Char => u16::try_from(value).is_ok(),
            PrimitiveType::Int => i32::try_from(value).is_ok(),
            PrimitiveType::Long => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WildcardBound {
    Unbounded,
    Extends(Box<Type>),
    Super(Box<Type>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassType {
    pub def: ClassId,
    /// Empty for a raw or non-generic class, otherwise one entry per declared parameter.
    pub args: Vec<Type>,
    /// Qualifying type of an inner class (`Outer<String>.Inner`).
    pub outer: Option<Box<Type>>,
}

/// A Java type term.
///
/// `Unknown` is the sentinel for anything that could not be resolved; every
/// operation accepts it and checks treat it as "no information".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Primitive(PrimitiveType),
    Class(ClassType),
    Array(Box<Type>),
    Wildcard(WildcardBound),
    TypeVar(TypeVarId),
    Intersection(Vec<Type>),
    /// Alternatives of a multi-catch parameter.
    Disjunction(Vec<Type>),
    Null,
    Void,
    Unknown,
}

impl Type {
    pub fn class(def: ClassId, args: Vec<Type>) -> Type {
        Type::Class(ClassType {
            def,
            args,
            outer: None,
        })
    }

    pub fn array(component: Type) -> Type {
        Type::Array(Box::new(component))
    }

    pub const fn boolean() -> Type {
        Type::Primitive(PrimitiveType::Boolean)
    }

    pub const fn int() -> Type {
        Type::Primitive(PrimitiveType::Int)
    }

    pub fn extends(bound: Type) -> Type {
        Type::Wildcard(WildcardBound::Extends(Box::new(bound)))
    }

    pub fn super_of(bound: Type) -> Type {
        Type::Wildcard(WildcardBound::Super(Box::new(bound)))
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    pub fn as_primitive(&self) -> Option<PrimitiveType> {
        match self {
            Type::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Type::Class(_)
                | Type::Array(_)
                | Type::TypeVar(_)
                | Type::Intersection(_)
                | Type::Disjunction(_)
                | Type::Null
        )
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown)
    }

    /// `true` if any component of the type is unresolved.
    pub fn contains_unknown(&self) -> bool {
        match self {
            Type::Unknown => true,
            Type::Array(c) => c.contains_unknown(),
            Type::Class(ct) => {
                ct.args.iter().any(Type::contains_unknown)
                    || ct.outer.as_deref().is_some_and(Type::contains_unknown)
            }
            Type::Wildcard(WildcardBound::Extends(b) | WildcardBound::Super(b)) => {
                b.contains_unknown()
            }
            Type::Intersection(parts) | Type::Disjunction(parts) => {
                parts.iter().any(Type::contains_unknown)
            }
            _ => false,
        }
    }

    pub fn class_id(&self) -> Option<ClassId> {
        match self {
            Type::Class(ct) => Some(ct.def),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&ClassType> {
        match self {
            Type::Class(ct) => Some(ct),
            _ => None,
        }
    }

    pub fn array_dimensions(&self) -> usize {
        match self {
            Type::Array(c) => 1 + c.array_dimensions(),
            _ => 0,
        }
    }

    /// Innermost component of an array type (or the type itself).
    pub fn deep_component(&self) -> &Type {
        match self {
            Type::Array(c) => c.deep_component(),
            other => other,
        }
    }

    /// Alternatives of a multi-catch type, or the type itself.
    pub fn alternatives(&self) -> Vec<&Type> {
        match self {
            Type::Disjunction(alts) => alts.iter().collect(),
            other => vec![other],
        }
    }
}

impl From<PrimitiveType> for Type {
    fn from(p: PrimitiveType) -> Self {
        Type::Primitive(p)
    }
}
