//! Method signatures seen through a class hierarchy (JLS 8.4.2, 8.4.8).

use std::collections::HashSet;

use crate::{
    direct_supertypes, erase, is_same_type, is_subtype, ClassId, ClassType, MethodId, Modifier,
    Substitution, Type, TypeEnv, TypeVarId,
};

/// A method's name and parameter types after substitution into some class context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub name: String,
    pub params: Vec<Type>,
    pub type_params: Vec<TypeVarId>,
}

/// A method as a member of some class, with the substitution that maps its
/// declaring class's type parameters into that class's context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InheritedMethod {
    pub method: MethodId,
    pub owner: ClassId,
    pub subst: Substitution,
}

impl InheritedMethod {
    pub fn signature(&self, env: &dyn TypeEnv) -> Option<MethodSignature> {
        method_signature(env, self.method, &self.subst)
    }

    pub fn return_type(&self, env: &dyn TypeEnv) -> Type {
        env.method(self.method)
            .map(|m| self.subst.apply(env, &m.return_type))
            .unwrap_or(Type::Unknown)
    }
}

pub fn method_signature(
    env: &dyn TypeEnv,
    method: MethodId,
    subst: &Substitution,
) -> Option<MethodSignature> {
    let def = env.method(method)?;
    Some(MethodSignature {
        name: def.name.clone(),
        params: def.params.iter().map(|p| subst.apply(env, p)).collect(),
        type_params: def.type_params.clone(),
    })
}

/// Grouping key for override-equivalence: name plus erased parameter types.
pub fn erased_signature(env: &dyn TypeEnv, sig: &MethodSignature) -> (String, Vec<Type>) {
    (
        sig.name.clone(),
        sig.params.iter().map(|p| erase(env, p)).collect(),
    )
}

/// JLS 8.4.2: `sub` is a subsignature of `sup` if they have the same signature
/// (after adapting method type parameters) or `sub` equals the erasure of `sup`.
pub fn is_subsignature(env: &dyn TypeEnv, sub: &MethodSignature, sup: &MethodSignature) -> bool {
    if sub.name != sup.name || sub.params.len() != sup.params.len() {
        return false;
    }
    if sub.type_params.len() == sup.type_params.len() {
        let adapt = sup
            .type_params
            .iter()
            .zip(&sub.type_params)
            .fold(Substitution::empty(), |s, (from, to)| {
                s.put(*from, Some(Type::TypeVar(*to)))
            });
        let same = sub
            .params
            .iter()
            .zip(&sup.params)
            .all(|(a, b)| is_same_type(env, a, &adapt.apply(env, b)));
        if same {
            return true;
        }
    }
    sub.type_params.is_empty()
        && sub
            .params
            .iter()
            .zip(&sup.params)
            .all(|(a, b)| is_same_type(env, a, &erase(env, b)))
}

pub fn are_override_equivalent(env: &dyn TypeEnv, a: &MethodSignature, b: &MethodSignature) -> bool {
    is_subsignature(env, a, b) || is_subsignature(env, b, a)
}

/// JLS 8.4.8.3 return-type-substitutability of `sub_ret` for `sup_ret`.
pub fn is_return_type_substitutable(env: &dyn TypeEnv, sub_ret: &Type, sup_ret: &Type) -> bool {
    match (sub_ret, sup_ret) {
        (_, Type::Unknown) | (Type::Unknown, _) => true,
        (Type::Void, _) | (_, Type::Void) => sub_ret == sup_ret,
        (Type::Primitive(_), _) | (_, Type::Primitive(_)) => sub_ret == sup_ret,
        _ => is_subtype(env, sub_ret, sup_ret) || is_subtype(env, sub_ret, &erase(env, sup_ret)),
    }
}

/// The class's own declared type: `C<T1..Tn>` with its type variables as arguments.
pub fn declared_type(env: &dyn TypeEnv, class: ClassId) -> ClassType {
    let args = env
        .class(class)
        .map(|def| def.type_params.iter().map(|tp| Type::TypeVar(*tp)).collect())
        .unwrap_or_default();
    ClassType {
        def: class,
        args,
        outer: None,
    }
}

/// Every strict supertype of `class` reachable through the hierarchy, in
/// depth-first order, each with its instantiation in `class`'s context.
///
/// A class is not re-entered while it is on the current path; the same class
/// reached through another path is visited again.
pub fn all_supertypes(env: &dyn TypeEnv, class: ClassId) -> Vec<ClassType> {
    fn walk(env: &dyn TypeEnv, ty: &ClassType, path: &mut HashSet<ClassId>, out: &mut Vec<ClassType>) {
        if !path.insert(ty.def) {
            return;
        }
        for sup in direct_supertypes(env, ty) {
            if let Type::Class(sup) = sup {
                if path.contains(&sup.def) {
                    continue;
                }
                out.push(sup.clone());
                walk(env, &sup, path, out);
            }
        }
        path.remove(&ty.def);
    }

    let mut out = Vec::new();
    walk(env, &declared_type(env, class), &mut HashSet::new(), &mut out);
    out
}

/// Methods (not constructors) of `class` followed by those inherited from
/// its supertypes, deduplicated by declaration.
pub fn visible_methods(env: &dyn TypeEnv, class: ClassId) -> Vec<InheritedMethod> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    let mut push_class = |ty: &ClassType, out: &mut Vec<InheritedMethod>| {
        let Some(def) = env.class(ty.def) else {
            return;
        };
        let subst = Substitution::for_class_type(env, ty);
        for method in &def.methods {
            let Some(m) = env.method(*method) else {
                continue;
            };
            if m.is_constructor || (ty.def != class && m.modifiers.has(Modifier::Private)) {
                continue;
            }
            if seen.insert(*method) {
                out.push(InheritedMethod {
                    method: *method,
                    owner: ty.def,
                    subst: subst.clone(),
                });
            }
        }
    };
    push_class(&declared_type(env, class), &mut out);
    for sup in all_supertypes(env, class) {
        push_class(&sup, &mut out);
    }
    out
}

/// Methods in strict supertypes of `class` that `method` overrides or hides.
///
/// Only the nearest match along each path is reported.
pub fn super_methods(env: &dyn TypeEnv, class: ClassId, method: MethodId) -> Vec<InheritedMethod> {
    fn walk(
        env: &dyn TypeEnv,
        ty: &ClassType,
        sig: &MethodSignature,
        path: &mut HashSet<ClassId>,
        out: &mut Vec<InheritedMethod>,
    ) {
        if !path.insert(ty.def) {
            return;
        }
        for sup in direct_supertypes(env, ty) {
            let Type::Class(sup) = sup else {
                continue;
            };
            let Some(def) = env.class(sup.def) else {
                continue;
            };
            let subst = Substitution::for_class_type(env, &sup);
            let hit = def.methods.iter().find(|m| {
                env.method(**m).is_some_and(|d| {
                    !d.is_constructor
                        && !d.modifiers.has(Modifier::Private)
                        && method_signature(env, **m, &subst)
                            .is_some_and(|s| is_subsignature(env, sig, &s))
                })
            });
            match hit {
                Some(m) => {
                    if !out.iter().any(|o| o.method == *m) {
                        out.push(InheritedMethod {
                            method: *m,
                            owner: sup.def,
                            subst,
                        });
                    }
                }
                None => walk(env, &sup, sig, path, out),
            }
        }
        path.remove(&ty.def);
    }

    let Some(sig) = method_signature(env, method, &Substitution::empty()) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    walk(env, &declared_type(env, class), &sig, &mut HashSet::new(), &mut out);
    out
}

/// Abstract in effect: declared `abstract`, or an interface method without
/// `default`, `static` or `private`.
pub fn is_effectively_abstract(env: &dyn TypeEnv, method: MethodId) -> bool {
    let Some(m) = env.method(method) else {
        return false;
    };
    if m.modifiers.has(Modifier::Abstract) {
        return true;
    }
    let in_interface = env.class(m.owner).is_some_and(|c| c.is_interface());
    in_interface
        && !m.is_constructor
        && !m.modifiers.has(Modifier::Default)
        && !m.modifiers.has(Modifier::Static)
        && !m.modifiers.has(Modifier::Private)
}

/// Visible methods with overridden ones removed: the most derived declaration
/// of each override-equivalent group survives.
pub fn member_methods(env: &dyn TypeEnv, class: ClassId) -> Vec<InheritedMethod> {
    let mut kept: Vec<(InheritedMethod, MethodSignature)> = Vec::new();
    for candidate in visible_methods(env, class) {
        let Some(sig) = candidate.signature(env) else {
            continue;
        };
        let overridden = kept
            .iter()
            .any(|(_, k)| is_subsignature(env, k, &sig) || is_subsignature(env, &sig, k));
        if !overridden {
            kept.push((candidate, sig));
            continue;
        }
        // A concrete inherited method implements an abstract one from an
        // interface visited earlier.
        if !is_effectively_abstract(env, candidate.method) {
            if let Some(slot) = kept.iter_mut().find(|(k, ks)| {
                is_effectively_abstract(env, k.method)
                    && k.owner != class
                    && env.class(k.owner).is_some_and(|c| c.is_interface())
                    && (is_subsignature(env, ks, &sig) || is_subsignature(env, &sig, ks))
            }) {
                *slot = (candidate, sig);
            }
        }
    }
    kept.into_iter().map(|(m, _)| m).collect()
}

/// Abstract member methods that are not public `Object` methods.
///
/// A functional interface has exactly one.
pub fn abstract_methods(env: &dyn TypeEnv, class: ClassId) -> Vec<InheritedMethod> {
    let object = env.well_known().object;
    let object_methods: Vec<MethodSignature> = env
        .class(object)
        .map(|def| {
            def.methods
                .iter()
                .filter_map(|m| method_signature(env, *m, &Substitution::empty()))
                .collect()
        })
        .unwrap_or_default();
    member_methods(env, class)
        .into_iter()
        .filter(|m| is_effectively_abstract(env, m.method))
        .filter(|m| {
            m.signature(env).is_some_and(|sig| {
                !object_methods
                    .iter()
                    .any(|o| are_override_equivalent(env, o, &sig))
            })
        })
        .collect()
}
