//! Resolution facts consumed by semantic checks.
//!
//! Checks never resolve names themselves. They ask a [`Resolver`] what a
//! reference points to, what type an expression has and which declarations a
//! syntax node introduces. Every query may answer [`IndexNotReady`] while the
//! project index is still being built.
//!
//! [`ResolveTable`] is a map-backed implementation for hosts that compute
//! these facts up front (and for tests).

mod resolver;
mod table;

pub use nova_core::IndexNotReady;
pub use resolver::{ConstValue, Element, ResolveResult, Resolver};
pub use table::ResolveTable;
