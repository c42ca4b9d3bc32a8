//! Subtyping, assignability (JLS 5.2) and casting (JLS 5.5) relations.
//!
//! Every relation is lenient towards `Type::Unknown`: an unresolved type is
//! compatible with everything so that incomplete code never produces a
//! spurious type error.

use std::collections::HashSet;

use crate::{
    erase, is_raw, ClassId, ClassKind, ClassType, PrimitiveType, Substitution, Type, TypeEnv,
    TypeVarId, WildcardBound,
};

/// Direct supertypes of a class type with the instantiation's substitution applied.
///
/// Raw instantiations produce raw supertypes. Interfaces report `Object`.
pub fn direct_supertypes(env: &dyn TypeEnv, ty: &ClassType) -> Vec<Type> {
    let Some(def) = env.class(ty.def) else {
        return Vec::new();
    };
    let subst = Substitution::for_class_type(env, ty);
    let mut out = Vec::with_capacity(def.interfaces.len() + 1);
    match &def.super_class {
        Some(sc) => out.push(subst.apply(env, sc)),
        None if ty.def != env.well_known().object => {
            out.push(Type::class(env.well_known().object, Vec::new()))
        }
        None => {}
    }
    out.extend(def.interfaces.iter().map(|i| subst.apply(env, i)));
    out
}

/// View `ty` as an instantiation of `target` by walking the supertype graph.
///
/// The walk carries a visited set that is popped on backtrack, so a class
/// reached twice along different paths is explored on each path. Cyclic
/// hierarchies (an error reported elsewhere) terminate.
pub fn instantiate_supertype(env: &dyn TypeEnv, ty: &ClassType, target: ClassId) -> Option<ClassType> {
    fn walk(
        env: &dyn TypeEnv,
        ty: &ClassType,
        target: ClassId,
        visiting: &mut HashSet<ClassId>,
    ) -> Option<ClassType> {
        if ty.def == target {
            return Some(ty.clone());
        }
        if !visiting.insert(ty.def) {
            return None;
        }
        let mut found = None;
        for sup in direct_supertypes(env, ty) {
            if let Type::Class(sup) = sup {
                if let Some(hit) = walk(env, &sup, target, visiting) {
                    found = Some(hit);
                    break;
                }
            }
        }
        visiting.remove(&ty.def);
        found
    }

    walk(env, ty, target, &mut HashSet::new())
}

/// `true` if `sub` inherits (directly or transitively) from `sup`, or they are the same class.
pub fn is_subclass(env: &dyn TypeEnv, sub: ClassId, sup: ClassId) -> bool {
    sup == env.well_known().object
        || instantiate_supertype(env, &ClassType { def: sub, args: Vec::new(), outer: None }, sup)
            .is_some()
}

pub fn is_same_type(env: &dyn TypeEnv, a: &Type, b: &Type) -> bool {
    if a.contains_unknown() || b.contains_unknown() {
        return true;
    }
    match (a, b) {
        (Type::Class(x), Type::Class(y)) => {
            x.def == y.def
                && x.args.len() == y.args.len()
                && x.args
                    .iter()
                    .zip(&y.args)
                    .all(|(p, q)| is_same_type(env, p, q))
        }
        (Type::Array(x), Type::Array(y)) => is_same_type(env, x, y),
        (Type::Wildcard(x), Type::Wildcard(y)) => match (x, y) {
            (WildcardBound::Unbounded, WildcardBound::Unbounded) => true,
            (WildcardBound::Extends(p), WildcardBound::Extends(q))
            | (WildcardBound::Super(p), WildcardBound::Super(q)) => is_same_type(env, p, q),
            _ => false,
        },
        _ => a == b,
    }
}

pub fn is_subtype(env: &dyn TypeEnv, sub: &Type, sup: &Type) -> bool {
    let mut visiting = HashSet::new();
    subtype_inner(env, sub, sup, &mut visiting)
}

fn subtype_inner(
    env: &dyn TypeEnv,
    sub: &Type,
    sup: &Type,
    visiting: &mut HashSet<TypeVarId>,
) -> bool {
    if sub == sup || sub.is_unknown() || sup.is_unknown() {
        return true;
    }
    let object = env.well_known().object;
    match (sub, sup) {
        (Type::Primitive(a), Type::Primitive(b)) => a.widens_to(*b),
        (Type::Primitive(_), _) | (_, Type::Primitive(_)) => false,
        (Type::Void, _) | (_, Type::Void) => false,
        (Type::Null, _) => sup.is_reference(),
        (_, Type::Intersection(parts)) => parts
            .iter()
            .all(|p| subtype_inner(env, sub, p, visiting)),
        (Type::Intersection(parts), _) => parts
            .iter()
            .any(|p| subtype_inner(env, p, sup, visiting)),
        (Type::Disjunction(alts), _) => alts
            .iter()
            .all(|a| subtype_inner(env, a, sup, visiting)),
        (Type::TypeVar(var), _) => {
            if let Type::TypeVar(target) = sup {
                if lower_bound_accepts(env, *target, sub, visiting) {
                    return true;
                }
            }
            if !visiting.insert(*var) {
                return false;
            }
            let bounds = env
                .type_param(*var)
                .map(|tp| tp.upper_bounds.clone())
                .unwrap_or_default();
            let ok = if bounds.is_empty() {
                sup.class_id() == Some(object)
            } else {
                bounds.iter().any(|b| subtype_inner(env, b, sup, visiting))
            };
            visiting.remove(var);
            ok
        }
        (_, Type::TypeVar(target)) => lower_bound_accepts(env, *target, sub, visiting),
        (Type::Array(a), Type::Array(b)) => match (&**a, &**b) {
            (Type::Primitive(x), Type::Primitive(y)) => x == y,
            (Type::Primitive(_), _) | (_, Type::Primitive(_)) => false,
            _ => subtype_inner(env, a, b, visiting),
        },
        (Type::Array(_), Type::Class(ct)) => {
            let wk = env.well_known();
            ct.def == object || ct.def == wk.cloneable || ct.def == wk.serializable
        }
        (Type::Class(a), Type::Class(b)) => {
            if b.def == object {
                return true;
            }
            let Some(view) = instantiate_supertype(env, a, b.def) else {
                return false;
            };
            if b.args.is_empty() {
                return true;
            }
            if view.args.is_empty() {
                return false;
            }
            view.args.len() == b.args.len()
                && b
                    .args
                    .iter()
                    .zip(&view.args)
                    .all(|(formal, actual)| contains(env, formal, actual))
        }
        _ => false,
    }
}

fn lower_bound_accepts(
    env: &dyn TypeEnv,
    var: TypeVarId,
    sub: &Type,
    visiting: &mut HashSet<TypeVarId>,
) -> bool {
    env.type_param(var)
        .and_then(|tp| tp.lower_bound.clone())
        .is_some_and(|lower| subtype_inner(env, sub, &lower, visiting))
}

/// Type argument containment (JLS 4.5.1): does `formal` contain `actual`?
pub fn contains(env: &dyn TypeEnv, formal: &Type, actual: &Type) -> bool {
    let object = Type::class(env.well_known().object, Vec::new());
    match formal {
        Type::Wildcard(WildcardBound::Unbounded) => true,
        Type::Wildcard(WildcardBound::Extends(bound)) => match actual {
            Type::Wildcard(WildcardBound::Extends(b)) => is_subtype(env, b, bound),
            Type::Wildcard(_) => is_subtype(env, &object, bound),
            other => is_subtype(env, other, bound),
        },
        Type::Wildcard(WildcardBound::Super(bound)) => match actual {
            Type::Wildcard(WildcardBound::Super(b)) => is_subtype(env, bound, b),
            Type::Wildcard(_) => false,
            other => is_subtype(env, bound, other),
        },
        other => is_same_type(env, other, actual),
    }
}

pub fn box_type(env: &dyn TypeEnv, p: PrimitiveType) -> Type {
    Type::class(env.well_known().boxed(p), Vec::new())
}

/// Primitive type obtained by unboxing `ty` (JLS 5.1.8), looking through type variable bounds.
pub fn unbox_type(env: &dyn TypeEnv, ty: &Type) -> Option<PrimitiveType> {
    match ty {
        Type::Class(ct) => env.well_known().unboxed(ct.def),
        Type::TypeVar(var) => env
            .type_param(*var)?
            .upper_bounds
            .iter()
            .find_map(|b| match b {
                Type::Class(ct) => env.well_known().unboxed(ct.def),
                _ => None,
            }),
        _ => None,
    }
}

/// Primitive view of `ty`: itself if primitive, else its unboxed type.
pub fn as_primitive(env: &dyn TypeEnv, ty: &Type) -> Option<PrimitiveType> {
    ty.as_primitive().or_else(|| unbox_type(env, ty))
}

/// Assignment compatibility in an assignment context (JLS 5.2).
///
/// Allows identity, widening primitive, widening reference, boxing followed by
/// widening reference, unboxing followed by widening primitive and unchecked
/// conversion from a raw type.
pub fn is_assignable(env: &dyn TypeEnv, target: &Type, source: &Type) -> bool {
    if target.is_unknown() || source.is_unknown() {
        return true;
    }
    match (target, source) {
        (Type::Void, _) | (_, Type::Void) => false,
        (Type::Primitive(t), Type::Primitive(s)) => s.widens_to(*t),
        (Type::Primitive(t), _) => unbox_type(env, source).is_some_and(|s| s.widens_to(*t)),
        (_, Type::Primitive(s)) => is_subtype(env, &box_type(env, *s), target),
        _ => is_subtype(env, source, target) || is_unchecked_assignable(env, target, source),
    }
}

/// Raw `source` assigned to parameterized `target` (unchecked conversion).
pub fn is_unchecked_assignable(env: &dyn TypeEnv, target: &Type, source: &Type) -> bool {
    let (Type::Class(t), Type::Class(s)) = (target, source) else {
        return false;
    };
    if t.args.is_empty() {
        return false;
    }
    match instantiate_supertype(env, s, t.def) {
        Some(view) => view.args.is_empty() || is_raw(env, source),
        None => false,
    }
}

/// Assignability including narrowing of an `int`-typed compile-time constant
/// (JLS 5.2: `byte b = 10;`).
pub fn is_assignable_value(
    env: &dyn TypeEnv,
    target: &Type,
    source: &Type,
    constant: Option<i64>,
) -> bool {
    if is_assignable(env, target, source) {
        return true;
    }
    let Some(value) = constant else {
        return false;
    };
    let source_ok = matches!(
        source.as_primitive(),
        Some(PrimitiveType::Int | PrimitiveType::Short | PrimitiveType::Char | PrimitiveType::Byte)
    );
    if !source_ok {
        return false;
    }
    let narrow_target = match target {
        Type::Primitive(p) => Some(*p),
        Type::Class(ct) => env.well_known().unboxed(ct.def),
        _ => None,
    };
    matches!(
        narrow_target,
        Some(p @ (PrimitiveType::Byte | PrimitiveType::Short | PrimitiveType::Char)) if p.fits_constant(value)
    )
}

/// Casting context compatibility (JLS 5.5), used by casts and `instanceof`.
pub fn is_convertible(env: &dyn TypeEnv, target: &Type, source: &Type) -> bool {
    if target.is_unknown() || source.is_unknown() {
        return true;
    }
    match (target, source) {
        (Type::Void, _) | (_, Type::Void) => false,
        (Type::Primitive(t), Type::Primitive(s)) => {
            (*t == PrimitiveType::Boolean) == (*s == PrimitiveType::Boolean)
        }
        (Type::Primitive(t), _) => match unbox_type(env, source) {
            Some(s) => s.widens_to(*t),
            None => {
                // Object o; (int) o
                let boxed = box_type(env, *t);
                is_subtype(env, &boxed, source)
            }
        },
        (_, Type::Primitive(s)) => is_subtype(env, &box_type(env, *s), target),
        (_, Type::Null) => target.is_reference(),
        (Type::Array(t), Type::Array(s)) => match (&**t, &**s) {
            (Type::Primitive(a), Type::Primitive(b)) => a == b,
            (Type::Primitive(_), _) | (_, Type::Primitive(_)) => false,
            _ => is_convertible(env, t, s),
        },
        _ => {
            let te = erase(env, target);
            let se = erase(env, source);
            if is_subtype(env, &se, &te) || is_subtype(env, &te, &se) {
                return true;
            }
            match (&te, &se) {
                (Type::Class(t), Type::Class(s)) => {
                    let tk = env.class(t.def);
                    let sk = env.class(s.def);
                    match (tk, sk) {
                        (Some(tk), Some(sk)) => {
                            (tk.is_interface() && !sk.is_final())
                                || (sk.is_interface() && !tk.is_final())
                        }
                        _ => true,
                    }
                }
                // Type variables and intersections are checked through their erasure only.
                _ => matches!(source, Type::TypeVar(_) | Type::Intersection(_))
                    || matches!(target, Type::TypeVar(_) | Type::Intersection(_)),
            }
        }
    }
}

/// Checked exception type: a `Throwable` that is neither an `Error` nor a `RuntimeException`.
pub fn is_checked_exception(env: &dyn TypeEnv, ty: &Type) -> bool {
    let wk = env.well_known();
    let Some(id) = erase(env, ty).class_id() else {
        return false;
    };
    is_subclass(env, id, wk.throwable)
        && !is_subclass(env, id, wk.runtime_exception)
        && !is_subclass(env, id, wk.error)
}

/// Reifiable types (JLS 4.7): usable in `instanceof` and array creation.
pub fn is_reifiable(env: &dyn TypeEnv, ty: &Type) -> bool {
    match ty {
        Type::Primitive(_) | Type::Null | Type::Void | Type::Unknown => true,
        Type::Array(c) => is_reifiable(env, c),
        Type::Class(ct) => {
            let args_ok = ct
                .args
                .iter()
                .all(|a| matches!(a, Type::Wildcard(WildcardBound::Unbounded)));
            let outer_ok = ct.outer.as_deref().map_or(true, |o| is_reifiable(env, o));
            args_ok && outer_ok
        }
        _ => false,
    }
}

/// Greatest lower bound of two types.
pub fn glb(env: &dyn TypeEnv, a: &Type, b: &Type) -> Type {
    if is_subtype(env, a, b) {
        a.clone()
    } else if is_subtype(env, b, a) {
        b.clone()
    } else {
        Type::Intersection(vec![a.clone(), b.clone()])
    }
}

/// Is `ty` a `java.lang.Throwable`?
pub fn is_throwable(env: &dyn TypeEnv, ty: &Type) -> bool {
    let throwable = Type::class(env.well_known().throwable, Vec::new());
    ty.alternatives()
        .into_iter()
        .all(|alt| is_subtype(env, alt, &throwable))
}

/// `true` for enum types, looking at the declaration kind.
pub fn is_enum(env: &dyn TypeEnv, ty: &Type) -> bool {
    ty.class_id()
        .and_then(|id| env.class(id))
        .is_some_and(|def| def.kind == ClassKind::Enum)
}
