//! Import declarations.

use nova_core::Name;
use nova_hir::{NodeId, NodeKind};
use nova_resolve::Element;

use crate::caches::{ImportBinding, PassCaches};
use crate::context::{CheckResult, RuleContext};
use crate::diagnostic::Severity;
use crate::{Diagnostic, Fix};

fn simple_name(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

/// Top-level class of this file with the given simple name.
fn declared_in_file(rc: &RuleContext<'_>, name: &str) -> bool {
    let NodeKind::File { classes, .. } = rc.kind(rc.ast.root()) else {
        return false;
    };
    classes
        .iter()
        .any(|c| rc.ast.name(*c).is_some_and(|n| n == name))
}

fn qualified_top_level(rc: &RuleContext<'_>, name: &str) -> String {
    match rc.kind(rc.ast.root()) {
        NodeKind::File {
            package: Some(package),
            ..
        } => format!("{package}.{name}"),
        _ => name.to_string(),
    }
}

fn delete_import(range: nova_core::TextRange, message: String) -> Diagnostic {
    Diagnostic::builder(Severity::Error, "import-conflict", range)
        .message(message)
        .fix(Fix::DeleteElement)
        .build()
}

/// Two single-type imports binding the same simple name to different classes,
/// or one shadowing a class declared in this file.
pub(crate) fn single_type_import(
    rc: &RuleContext<'_>,
    caches: &mut PassCaches,
    import: NodeId,
) -> CheckResult<Option<Diagnostic>> {
    let NodeKind::Import {
        path,
        is_static: false,
        on_demand: false,
    } = rc.kind(import)
    else {
        return Ok(None);
    };
    let name = simple_name(path);
    let range = rc.range(import);
    if declared_in_file(rc, name) && qualified_top_level(rc, name) != path.as_str() {
        return Ok(Some(delete_import(
            range,
            format!("'{name}' is already defined in this compilation unit"),
        )));
    }
    let binding = ImportBinding {
        import,
        path: path.clone(),
    };
    match caches.bind_single_import_class(Name::new(name), binding) {
        Some(existing) if existing.path != *path => Ok(Some(delete_import(
            range,
            format!("'{name}' is already defined in a single-type import"),
        ))),
        _ => Ok(None),
    }
}

/// Single-static imports of two different fields under one simple name.
/// Methods may share a name across imports, so only fields are tracked.
pub(crate) fn single_static_import(
    rc: &RuleContext<'_>,
    caches: &mut PassCaches,
    import: NodeId,
) -> CheckResult<Option<Diagnostic>> {
    let NodeKind::Import {
        path,
        is_static: true,
        on_demand: false,
    } = rc.kind(import)
    else {
        return Ok(None);
    };
    let is_field = rc
        .multi_resolve(import)?
        .iter()
        .any(|r| matches!(r.element, Element::Field(_)));
    if !is_field {
        return Ok(None);
    }
    let name = simple_name(path);
    let binding = ImportBinding {
        import,
        path: path.clone(),
    };
    match caches.bind_single_import_field(Name::new(name), binding) {
        Some(existing) if existing.path != *path => Ok(Some(delete_import(
            rc.range(import),
            format!("'{name}' is already defined in a single-static-import"),
        ))),
        _ => Ok(None),
    }
}
