//! Which modifiers may appear on which declarations, and which of them
//! conflict (JLS 8.1.1, 8.3.1, 8.4.3, 9.1.1, 9.4).

use nova_core::JavaLanguageLevel;
use nova_types::Modifier;

use Modifier::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Class,
    Interface,
    Method,
    Field,
    ClassInitializer,
    LocalVariable,
    Parameter,
}

type Table = &'static [(Modifier, &'static [Modifier])];

const ACCESS_ROWS: [(Modifier, &[Modifier]); 4] = [
    (PackageLocal, &[Private, Public, Protected]),
    (Private, &[PackageLocal, Public, Protected]),
    (Public, &[PackageLocal, Private, Protected]),
    (Protected, &[PackageLocal, Public, Private]),
];

const CLASS: Table = &[
    (Abstract, &[Final]),
    (Final, &[Abstract, Sealed, NonSealed]),
    ACCESS_ROWS[0],
    ACCESS_ROWS[1],
    ACCESS_ROWS[2],
    ACCESS_ROWS[3],
    (Strictfp, &[]),
    (Static, &[]),
    (Sealed, &[Final, NonSealed]),
    (NonSealed, &[Final, Sealed]),
];

const INTERFACE: Table = &[
    (Abstract, &[]),
    ACCESS_ROWS[0],
    ACCESS_ROWS[1],
    ACCESS_ROWS[2],
    ACCESS_ROWS[3],
    (Strictfp, &[]),
    (Static, &[]),
    (Sealed, &[NonSealed]),
    (NonSealed, &[Sealed]),
];

const METHOD: Table = &[
    (
        Abstract,
        &[Native, Static, Final, Private, Strictfp, Synchronized, Default],
    ),
    (Native, &[Abstract, Strictfp]),
    ACCESS_ROWS[0],
    (Private, &[PackageLocal, Public, Protected, Abstract, Default]),
    ACCESS_ROWS[2],
    ACCESS_ROWS[3],
    (Static, &[Abstract, Default]),
    (Default, &[Abstract, Static, Private]),
    (Synchronized, &[Abstract]),
    (Strictfp, &[Abstract, Native]),
    (Final, &[Abstract]),
];

const FIELD: Table = &[
    (Final, &[Volatile]),
    ACCESS_ROWS[0],
    ACCESS_ROWS[1],
    ACCESS_ROWS[2],
    ACCESS_ROWS[3],
    (Static, &[]),
    (Transient, &[]),
    (Volatile, &[Final]),
];

const CLASS_INITIALIZER: Table = &[(Static, &[])];

const LOCAL: Table = &[(Final, &[])];

fn table(kind: DeclarationKind) -> Table {
    match kind {
        DeclarationKind::Class => CLASS,
        DeclarationKind::Interface => INTERFACE,
        DeclarationKind::Method => METHOD,
        DeclarationKind::Field => FIELD,
        DeclarationKind::ClassInitializer => CLASS_INITIALIZER,
        DeclarationKind::LocalVariable | DeclarationKind::Parameter => LOCAL,
    }
}

/// Modifiers that cannot be combined with `modifier` on a declaration of `kind`.
///
/// Empty when `modifier` is not allowed on `kind` at all; see [`is_known_modifier`].
pub fn incompatible_modifiers(modifier: Modifier, kind: DeclarationKind) -> &'static [Modifier] {
    table(kind)
        .iter()
        .find(|(m, _)| *m == modifier)
        .map(|(_, incompatible)| *incompatible)
        .unwrap_or(&[])
}

/// `true` if the table for `kind` mentions `modifier` at all.
pub fn is_known_modifier(modifier: Modifier, kind: DeclarationKind) -> bool {
    table(kind).iter().any(|(m, _)| *m == modifier)
}

/// Where a declaration sits; drives the context-dependent parts of the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModifierContext {
    pub kind: DeclarationKind,
    /// Member of an interface or annotation type.
    pub in_interface: bool,
    /// Top-level class or interface.
    pub top_level: bool,
    /// Class, enum or interface declared inside a code block.
    pub local: bool,
    pub level: JavaLanguageLevel,
}

impl ModifierContext {
    pub fn new(kind: DeclarationKind, level: JavaLanguageLevel) -> Self {
        Self {
            kind,
            in_interface: false,
            top_level: false,
            local: false,
            level,
        }
    }
}

/// Is `modifier` legal in `cx`?
pub fn is_modifier_allowed(modifier: Modifier, cx: ModifierContext) -> bool {
    if !is_known_modifier(modifier, cx.kind) {
        return false;
    }
    match cx.kind {
        DeclarationKind::Class | DeclarationKind::Interface => {
            if cx.top_level {
                !matches!(modifier, Private | Protected | Static)
            } else if cx.local {
                matches!(modifier, Abstract | Final | Strictfp)
                    || (cx.kind == DeclarationKind::Interface && modifier == Static)
            } else if cx.in_interface {
                !matches!(modifier, Private | Protected)
            } else {
                true
            }
        }
        DeclarationKind::Method if cx.in_interface => match modifier {
            Public | Abstract => true,
            Static | Default | Strictfp => cx.level.is_at_least(8),
            Private => cx.level.is_at_least(9),
            _ => false,
        },
        DeclarationKind::Field if cx.in_interface => matches!(modifier, Public | Static | Final),
        _ => true,
    }
}

/// Context-aware incompatible set: inside interfaces `static` methods cannot
/// also be `final`.
pub fn incompatible_in_context(modifier: Modifier, cx: ModifierContext) -> Vec<Modifier> {
    let mut out = incompatible_modifiers(modifier, cx.kind).to_vec();
    if cx.kind == DeclarationKind::Method && cx.in_interface {
        match modifier {
            Static => out.push(Final),
            Final => out.push(Static),
            _ => {}
        }
    }
    out.dedup();
    out
}

/// First modifier in `present` that conflicts with `modifier`, including a
/// repetition of `modifier` itself.
pub fn first_conflict(
    modifier: Modifier,
    present: &[Modifier],
    cx: ModifierContext,
) -> Option<Modifier> {
    if present.iter().filter(|m| **m == modifier).count() > 1 {
        return Some(modifier);
    }
    let incompatible = incompatible_in_context(modifier, cx);
    present
        .iter()
        .copied()
        .find(|m| *m != modifier && incompatible.contains(m))
}
