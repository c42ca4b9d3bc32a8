//! Type and member rendering for diagnostics.
//!
//! Two flavors: *canonical* text uses fully qualified names
//! (`java.util.List<java.lang.String>`), *presentable* text uses simple names
//! (`List<String>`). Neither ever fails; missing declarations render as `?`.

use crate::{MethodId, Substitution, Type, TypeEnv, WildcardBound};

pub fn format_type(env: &dyn TypeEnv, ty: &Type) -> String {
    let mut out = String::new();
    write_type(env, ty, true, &mut out);
    out
}

pub fn presentable_type(env: &dyn TypeEnv, ty: &Type) -> String {
    let mut out = String::new();
    write_type(env, ty, false, &mut out);
    out
}

fn write_type(env: &dyn TypeEnv, ty: &Type, qualified: bool, out: &mut String) {
    match ty {
        Type::Primitive(p) => out.push_str(p.name()),
        Type::Class(ct) => {
            match env.class(ct.def) {
                Some(def) if qualified => out.push_str(&def.name),
                Some(def) => out.push_str(def.simple_name()),
                None => out.push('?'),
            }
            if !ct.args.is_empty() {
                out.push('<');
                for (idx, arg) in ct.args.iter().enumerate() {
                    if idx > 0 {
                        out.push(',');
                    }
                    write_type(env, arg, qualified, out);
                }
                out.push('>');
            }
        }
        Type::Array(component) => {
            write_type(env, component, qualified, out);
            out.push_str("[]");
        }
        Type::Wildcard(WildcardBound::Unbounded) => out.push('?'),
        Type::Wildcard(WildcardBound::Extends(b)) => {
            out.push_str("? extends ");
            write_type(env, b, qualified, out);
        }
        Type::Wildcard(WildcardBound::Super(b)) => {
            out.push_str("? super ");
            write_type(env, b, qualified, out);
        }
        Type::TypeVar(var) => match env.type_param(*var) {
            Some(tp) => out.push_str(&tp.name),
            None => out.push('?'),
        },
        Type::Intersection(parts) => write_joined(env, parts, " & ", qualified, out),
        Type::Disjunction(parts) => write_joined(env, parts, " | ", qualified, out),
        Type::Null => out.push_str("null"),
        Type::Void => out.push_str("void"),
        Type::Unknown => out.push('?'),
    }
}

fn write_joined(env: &dyn TypeEnv, parts: &[Type], sep: &str, qualified: bool, out: &mut String) {
    for (idx, part) in parts.iter().enumerate() {
        if idx > 0 {
            out.push_str(sep);
        }
        write_type(env, part, qualified, out);
    }
}

/// Simple class name for a class type, canonical text otherwise.
pub fn format_class_name(env: &dyn TypeEnv, id: crate::ClassId) -> String {
    env.class(id)
        .map(|def| def.simple_name().to_string())
        .unwrap_or_else(|| "?".to_string())
}

/// `name(ParamType, ...)` with parameter types substituted through `subst`.
///
/// Constructors are rendered with the simple name of their class.
pub fn format_method(env: &dyn TypeEnv, method: MethodId, subst: &Substitution) -> String {
    let Some(def) = env.method(method) else {
        return "?".to_string();
    };
    let name = if def.is_constructor {
        format_class_name(env, def.owner)
    } else {
        def.name.clone()
    };
    let params: Vec<String> = def
        .params
        .iter()
        .enumerate()
        .map(|(idx, p)| {
            let ty = subst.apply(env, p);
            if def.is_varargs && idx + 1 == def.params.len() {
                if let Type::Array(component) = &ty {
                    return format!("{}...", presentable_type(env, component));
                }
            }
            presentable_type(env, &ty)
        })
        .collect();
    format!("{name}({})", params.join(", "))
}

/// Argument types as shown in "cannot be applied to" messages: `(int, String)`.
pub fn format_arg_types(env: &dyn TypeEnv, args: &[Type]) -> String {
    let rendered: Vec<String> = args.iter().map(|a| presentable_type(env, a)).collect();
    format!("({})", rendered.join(", "))
}
