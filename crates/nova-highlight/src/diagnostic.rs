use nova_core::TextRange;
use serde::Serialize;

use crate::Fix;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Error,
    Warning,
    WeakWarning,
    Info,
}

/// A fix offered for a diagnostic, together with the range it applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachedFix {
    pub fix: Fix,
    pub range: TextRange,
}

/// One reported problem.
///
/// Built with [`Diagnostic::builder`]; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Stable kebab-case identifier, e.g. `incompatible-types`.
    pub code: &'static str,
    pub range: TextRange,
    pub message: String,
    /// HTML rendition of the message for hover popups.
    pub tooltip: Option<String>,
    /// Caret offset inside `range` an editor should navigate to.
    pub navigation_shift: u32,
    pub fixes: Vec<AttachedFix>,
}

impl Diagnostic {
    pub fn builder(severity: Severity, code: &'static str, range: TextRange) -> DiagnosticBuilder {
        DiagnosticBuilder {
            diagnostic: Diagnostic {
                severity,
                code,
                range,
                message: String::new(),
                tooltip: None,
                navigation_shift: 0,
                fixes: Vec::new(),
            },
        }
    }

    pub fn error(code: &'static str, range: TextRange, message: impl Into<String>) -> Self {
        Self::builder(Severity::Error, code, range)
            .message(message)
            .build()
    }

    pub fn warning(code: &'static str, range: TextRange, message: impl Into<String>) -> Self {
        Self::builder(Severity::Warning, code, range)
            .message(message)
            .build()
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn fix_names(&self) -> Vec<&'static str> {
        self.fixes.iter().map(|f| f.fix.name()).collect()
    }

    pub fn has_fix(&self, name: &str) -> bool {
        self.fixes.iter().any(|f| f.fix.name() == name)
    }
}

#[derive(Debug, Clone)]
#[must_use]
pub struct DiagnosticBuilder {
    diagnostic: Diagnostic,
}

impl DiagnosticBuilder {
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.diagnostic.message = message.into();
        self
    }

    pub fn tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.diagnostic.tooltip = Some(tooltip.into());
        self
    }

    pub fn navigation_shift(mut self, shift: u32) -> Self {
        self.diagnostic.navigation_shift = shift;
        self
    }

    /// Attach a fix applying to the diagnostic's own range.
    pub fn fix(self, fix: Fix) -> Self {
        let range = self.diagnostic.range;
        self.fix_with_range(fix, range)
    }

    /// Attach a fix that applies to some other (usually wider) range, e.g. a
    /// missing return anchored at `}` fixed by changing the declared return type.
    pub fn fix_with_range(mut self, fix: Fix, range: TextRange) -> Self {
        self.diagnostic.fixes.push(AttachedFix { fix, range });
        self
    }

    pub fn fixes(self, fixes: impl IntoIterator<Item = Fix>) -> Self {
        fixes.into_iter().fold(self, DiagnosticBuilder::fix)
    }

    pub fn build(self) -> Diagnostic {
        self.diagnostic
    }
}
