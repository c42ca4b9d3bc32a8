//! Type variable substitution and generic erasure (JLS 4.6).

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{ClassId, ClassType, Type, TypeEnv, TypeVarId, WildcardBound};

/// Immutable mapping from type variables to types.
///
/// A variable mapped to `None` is *raw*: substituting it yields the erasure of
/// its bound, and any class type mentioning it becomes raw as well.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Substitution {
    map: BTreeMap<TypeVarId, Option<Type>>,
}

impl Substitution {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[must_use]
    pub fn put(mut self, var: TypeVarId, ty: Option<Type>) -> Self {
        self.map.insert(var, ty);
        self
    }

    /// `None` if `var` is unmapped, `Some(None)` if it is mapped raw.
    pub fn get(&self, var: TypeVarId) -> Option<Option<&Type>> {
        self.map.get(&var).map(Option::as_ref)
    }

    pub fn is_raw(&self) -> bool {
        !self.map.is_empty() && self.map.values().all(Option::is_none)
    }

    pub fn vars(&self) -> impl Iterator<Item = TypeVarId> + '_ {
        self.map.keys().copied()
    }

    /// Substitution that maps the parameters of `class` to the arguments of `ty`,
    /// or raw mappings when `ty` is raw.
    pub fn for_class_type(env: &dyn TypeEnv, ty: &ClassType) -> Self {
        let Some(def) = env.class(ty.def) else {
            return Self::empty();
        };
        let mut out = match ty.outer.as_deref() {
            Some(Type::Class(outer)) => Self::for_class_type(env, outer),
            _ => Self::empty(),
        };
        let raw = ty.args.is_empty();
        for (idx, param) in def.type_params.iter().enumerate() {
            let arg = if raw { None } else { ty.args.get(idx).cloned() };
            out.map.insert(*param, arg);
        }
        out
    }

    /// Raw substitution for every type parameter of `class`.
    pub fn raw_for(env: &dyn TypeEnv, class: ClassId) -> Self {
        let mut out = Self::empty();
        if let Some(def) = env.class(class) {
            for param in &def.type_params {
                out.map.insert(*param, None);
            }
        }
        out
    }

    /// Apply `self`, then `other`.
    #[must_use]
    pub fn combine(&self, env: &dyn TypeEnv, other: &Substitution) -> Substitution {
        let mut map = BTreeMap::new();
        for (var, ty) in &self.map {
            let mapped = ty.as_ref().map(|t| substitute(env, other, t));
            map.insert(*var, mapped);
        }
        for (var, ty) in &other.map {
            map.entry(*var).or_insert_with(|| ty.clone());
        }
        Substitution { map }
    }

    /// Keep only the mappings for `vars`.
    #[must_use]
    pub fn restrict(&self, vars: &[TypeVarId]) -> Substitution {
        Substitution {
            map: self
                .map
                .iter()
                .filter(|(var, _)| vars.contains(var))
                .map(|(var, ty)| (*var, ty.clone()))
                .collect(),
        }
    }

    pub fn apply(&self, env: &dyn TypeEnv, ty: &Type) -> Type {
        substitute(env, self, ty)
    }
}

/// Structural substitution.
///
/// A type variable is replaced once and the replacement is not descended into
/// again, so F-bounded parameters (`T extends Comparable<T>`) terminate.
pub fn substitute(env: &dyn TypeEnv, subst: &Substitution, ty: &Type) -> Type {
    if subst.is_empty() {
        return ty.clone();
    }
    subst_inner(env, subst, ty).unwrap_or_else(|| erase(env, ty))
}

/// `None` means "raw": the caller must erase.
fn subst_inner(env: &dyn TypeEnv, subst: &Substitution, ty: &Type) -> Option<Type> {
    match ty {
        Type::TypeVar(var) => match subst.get(*var) {
            Some(Some(replacement)) => Some(replacement.clone()),
            Some(None) => None,
            None => Some(ty.clone()),
        },
        Type::Class(ct) => {
            let mut args = Vec::with_capacity(ct.args.len());
            for arg in &ct.args {
                match subst_inner(env, subst, arg) {
                    Some(a) => args.push(a),
                    None => return Some(erase(env, ty)),
                }
            }
            let outer = match ct.outer.as_deref() {
                Some(o) => Some(Box::new(substitute(env, subst, o))),
                None => None,
            };
            Some(Type::Class(ClassType {
                def: ct.def,
                args,
                outer,
            }))
        }
        Type::Array(component) => Some(Type::array(substitute(env, subst, component))),
        Type::Wildcard(bound) => Some(Type::Wildcard(match bound {
            WildcardBound::Unbounded => WildcardBound::Unbounded,
            WildcardBound::Extends(b) => {
                WildcardBound::Extends(Box::new(substitute(env, subst, b)))
            }
            WildcardBound::Super(b) => WildcardBound::Super(Box::new(substitute(env, subst, b))),
        })),
        Type::Intersection(parts) => Some(Type::Intersection(
            parts.iter().map(|p| substitute(env, subst, p)).collect(),
        )),
        Type::Disjunction(parts) => Some(Type::Disjunction(
            parts.iter().map(|p| substitute(env, subst, p)).collect(),
        )),
        Type::Primitive(_) | Type::Null | Type::Void | Type::Unknown => Some(ty.clone()),
    }
}

/// Generic erasure (JLS 4.6). Idempotent.
pub fn erase(env: &dyn TypeEnv, ty: &Type) -> Type {
    let mut visiting = HashSet::new();
    erase_inner(env, ty, &mut visiting)
}

fn erase_inner(env: &dyn TypeEnv, ty: &Type, visiting: &mut HashSet<TypeVarId>) -> Type {
    match ty {
        Type::Class(ct) => Type::class(ct.def, Vec::new()),
        Type::Array(component) => Type::array(erase_inner(env, component, visiting)),
        Type::TypeVar(var) => {
            let object = Type::class(env.well_known().object, Vec::new());
            if !visiting.insert(*var) {
                return object;
            }
            let erased = env
                .type_param(*var)
                .and_then(|tp| tp.upper_bounds.first())
                .map(|bound| erase_inner(env, bound, visiting))
                .unwrap_or(object);
            visiting.remove(var);
            erased
        }
        Type::Wildcard(WildcardBound::Extends(bound)) => erase_inner(env, bound, visiting),
        Type::Wildcard(_) => Type::class(env.well_known().object, Vec::new()),
        Type::Intersection(parts) => match parts.first() {
            Some(first) => erase_inner(env, first, visiting),
            None => Type::Unknown,
        },
        Type::Disjunction(parts) => Type::Disjunction(
            parts
                .iter()
                .map(|p| erase_inner(env, p, visiting))
                .collect(),
        ),
        Type::Primitive(_) | Type::Null | Type::Void | Type::Unknown => ty.clone(),
    }
}

/// `true` if `class` declares type parameters and `ty` supplies none.
pub fn is_raw(env: &dyn TypeEnv, ty: &Type) -> bool {
    match ty {
        Type::Class(ct) => {
            ct.args.is_empty()
                && env
                    .class(ct.def)
                    .is_some_and(|def| !def.type_params.is_empty())
        }
        _ => false,
    }
}
