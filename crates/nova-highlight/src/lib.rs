//! Semantic highlighting for Java sources.
//!
//! [`Highlighter::analyze`] walks a resolved [`nova_hir::Ast`] and reports the
//! errors, warnings and informational markers a Java editor shows on top of
//! syntax errors: type mismatches, unresolved or inaccessible members,
//! illegal modifiers, override clashes, definite-assignment problems,
//! unhandled exceptions and language-level gates. Each diagnostic carries
//! its suggested [`Fix`]es as plain values.
//!
//! Symbol resolution and flow analysis are not done here; a pass consumes
//! them through the [`nova_resolve::Resolver`] and
//! [`nova_flow::ControlFlowFacts`] traits bundled in a [`HighlightContext`].

mod caches;
mod config;
mod context;
mod diagnostic;
mod driver;
mod fix;
mod modifiers;
mod rules;
pub mod tooltip;

pub use crate::config::{json_schema, ConfigError, HighlightConfig, LanguageLevelConfig};
pub use crate::context::{CheckResult, Deferred, HighlightContext};
pub use crate::diagnostic::{AttachedFix, Diagnostic, DiagnosticBuilder, Severity};
pub use crate::driver::{Highlighter, PassState};
pub use crate::fix::Fix;
pub use crate::modifiers::{incompatible_modifiers, DeclarationKind};

pub use nova_core::{CancellationToken, Cancelled};
