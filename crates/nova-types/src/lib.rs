//! Java type system primitives for semantic checks.
//!
//! A small, self-contained model of Java types ([`Type`]) and declarations
//! ([`ClassDef`], [`MethodDef`], ...) together with the pure operations the
//! checks are built on: substitution, erasure, subtyping, assignability,
//! capture conversion, hierarchy walks and diagnostic formatting.
//!
//! All operations are total. Anything unresolved is [`Type::Unknown`], which
//! every relation accepts.

mod capture;
mod def;
mod env;
mod format;
mod hierarchy;
mod subst;
mod subtyping;
mod ty;

pub use capture::{capture_wildcards, CaptureContext};
pub use def::{
    access_rank, AnnotationAttribute, AnnotationInfo, ClassDef, ClassKind, ElementType, FieldDef,
    MethodDef, Modifier, Modifiers, TypeParamDef,
};
pub use env::{TypeEnv, TypeStore, WellKnownTypes};
pub use format::{format_arg_types, format_class_name, format_method, format_type, presentable_type};
pub use hierarchy::{
    abstract_methods, all_supertypes, are_override_equivalent, declared_type, erased_signature,
    is_effectively_abstract, is_return_type_substitutable, is_subsignature, member_methods,
    method_signature, super_methods, visible_methods, InheritedMethod, MethodSignature,
};
pub use subst::{erase, is_raw, substitute, Substitution};
pub use subtyping::{
    as_primitive, box_type, contains, direct_supertypes, glb, instantiate_supertype,
    is_assignable, is_assignable_value, is_checked_exception, is_convertible, is_enum,
    is_reifiable, is_same_type, is_subclass, is_subtype, is_throwable, is_unchecked_assignable,
    unbox_type,
};
pub use ty::{ClassId, ClassType, FieldId, MethodId, PrimitiveType, Type, TypeVarId, WildcardBound};
