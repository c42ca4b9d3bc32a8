//! Core shared types for Nova's semantic layer.
//!
//! Everything here is small and dependency-light: text ranges, names, cooperative
//! cancellation, Java language levels and the "index not ready" signal shared by
//! every collaborator that answers semantic queries.

mod cancel;
mod error;
mod language_level;
mod text;

pub use cancel::{check_cancelled, CancellationToken, Cancelled};
pub use error::IndexNotReady;
pub use language_level::{FeatureAvailability, JavaFeature, JavaLanguageLevel};
pub use text::{cover, TextRange, TextSize};

/// Interned-ish identifier text (class, method, variable and label names).
pub type Name = smol_str::SmolStr;
