//! HTML renditions of messages shown in hover popups.

use nova_types::{
    contains, format_type, instantiate_supertype, is_same_type, presentable_type, Type, TypeEnv,
};

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

pub fn red(text: &str) -> String {
    format!("<font color='red'><b>{text}</b></font>")
}

fn html(body: &str) -> String {
    format!("<html><body>{body}</body></html>")
}

/// `Incompatible types. Found: 'X', required: 'Y'`
pub fn incompatible_types_message(env: &dyn TypeEnv, required: &Type, found: &Type) -> String {
    format!(
        "Incompatible types. Found: '{}', required: '{}'",
        presentable_type(env, found),
        presentable_type(env, required)
    )
}

/// Required/found table. When both sides are parameterized views of the same
/// generic class, the mismatching type arguments are marked in red on both rows.
pub fn incompatible_types_tooltip(env: &dyn TypeEnv, required: &Type, found: &Type) -> String {
    let (required_text, found_text) = match type_argument_mismatch(env, required, found) {
        Some(marks) => marks,
        None => (
            escape(&presentable_type(env, required)),
            red(&escape(&presentable_type(env, found))),
        ),
    };
    html(&format!(
        "Incompatible types.<table><tr><td>Required:</td><td>{required_text}</td></tr>\
         <tr><td>Found:</td><td>{found_text}</td></tr></table>"
    ))
}

fn type_argument_mismatch(env: &dyn TypeEnv, required: &Type, found: &Type) -> Option<(String, String)> {
    let (Type::Class(req), Type::Class(fnd)) = (required, found) else {
        return None;
    };
    if req.args.is_empty() || fnd.args.is_empty() {
        return None;
    }
    let view = instantiate_supertype(env, fnd, req.def)?;
    if view.args.len() != req.args.len() {
        return None;
    }
    let mismatched: Vec<bool> = req
        .args
        .iter()
        .zip(&view.args)
        .map(|(r, v)| !(is_same_type(env, r, v) || contains(env, r, v)))
        .collect();
    if !mismatched.iter().any(|m| *m) {
        return None;
    }

    let required_args: Vec<String> = req
        .args
        .iter()
        .zip(&mismatched)
        .map(|(arg, bad)| mark(env, arg, *bad))
        .collect();
    let found_args: Vec<String> = fnd
        .args
        .iter()
        .map(|arg| {
            let bad = view
                .args
                .iter()
                .zip(&mismatched)
                .any(|(v, m)| *m && v == arg);
            mark(env, arg, bad)
        })
        .collect();
    Some((
        render_class(env, required, &required_args),
        render_class(env, found, &found_args),
    ))
}

fn mark(env: &dyn TypeEnv, ty: &Type, bad: bool) -> String {
    let text = escape(&presentable_type(env, ty));
    if bad {
        red(&text)
    } else {
        text
    }
}

fn render_class(env: &dyn TypeEnv, ty: &Type, args: &[String]) -> String {
    let raw = match ty {
        Type::Class(ct) => env
            .class(ct.def)
            .map(|def| def.simple_name().to_string())
            .unwrap_or_else(|| "?".to_string()),
        other => presentable_type(env, other),
    };
    format!("{}&lt;{}&gt;", escape(&raw), args.join(", "))
}

/// Parameter/argument pair of a call that failed applicability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentRow {
    pub param: Option<Type>,
    pub arg: Option<Type>,
    /// The argument is assignable to the parameter.
    pub compatible: bool,
}

impl ArgumentRow {
    pub fn rows(
        params: &[Type],
        args: &[Type],
        compatible: impl Fn(usize, &Type, &Type) -> bool,
    ) -> Vec<ArgumentRow> {
        (0..params.len().max(args.len()))
            .map(|idx| {
                let param = params.get(idx).cloned();
                let arg = args.get(idx).cloned();
                let ok = match (&param, &arg) {
                    (Some(p), Some(a)) => compatible(idx, p, a),
                    _ => false,
                };
                ArgumentRow {
                    param,
                    arg,
                    compatible: ok,
                }
            })
            .collect()
    }
}

/// Compatible arguments in short presentable form, mismatching ones fully
/// qualified in red.
fn render_arg(env: &dyn TypeEnv, row: &ArgumentRow) -> String {
    match &row.arg {
        Some(arg) if row.compatible => escape(&presentable_type(env, arg)),
        Some(arg) => red(&escape(&format_type(env, arg))),
        None => String::new(),
    }
}

fn render_param(env: &dyn TypeEnv, row: &ArgumentRow) -> String {
    row.param
        .as_ref()
        .map(|p| escape(&presentable_type(env, p)))
        .unwrap_or_default()
}

/// Tooltip for a call whose single candidate is not applicable.
///
/// Three shapes: a one-line form when exactly one of two or more
/// same-arity arguments mismatches, a short inline form when there are at
/// most two parameters and arguments, and a table otherwise.
pub fn argument_mismatch_tooltip(
    env: &dyn TypeEnv,
    method_name: &str,
    class_name: &str,
    rows: &[ArgumentRow],
) -> String {
    let params = rows.iter().filter(|r| r.param.is_some()).count();
    let args = rows.iter().filter(|r| r.arg.is_some()).count();
    let mismatches: Vec<(usize, &ArgumentRow)> = rows
        .iter()
        .enumerate()
        .filter(|(_, r)| !r.compatible)
        .collect();

    if params == args && args >= 2 && mismatches.len() == 1 {
        let (idx, row) = mismatches[0];
        return html(&format!(
            "Argument {}: {} cannot be converted to '{}'",
            idx + 1,
            render_arg(env, row),
            render_param(env, row)
        ));
    }

    if params.max(args) <= 2 {
        let params_text: Vec<String> = rows
            .iter()
            .filter(|r| r.param.is_some())
            .map(|r| render_param(env, r))
            .collect();
        let args_text: Vec<String> = rows
            .iter()
            .filter(|r| r.arg.is_some())
            .map(|r| render_arg(env, r))
            .collect();
        return html(&format!(
            "<b>{}</b>({}) in <b>{}</b> cannot be applied to ({})",
            escape(method_name),
            params_text.join(", "),
            escape(class_name),
            args_text.join(", ")
        ));
    }

    let mut body = format!(
        "<table><tr><td colspan='2'><b>{}</b> in <b>{}</b> cannot be applied to:</td></tr>\
         <tr><td>Expected Parameters:</td><td>Actual Arguments:</td></tr>",
        escape(method_name),
        escape(class_name)
    );
    for row in rows {
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>",
            render_param(env, row),
            render_arg(env, row)
        ));
    }
    body.push_str("</table>");
    html(&body)
}
