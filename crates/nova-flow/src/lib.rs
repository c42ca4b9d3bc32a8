//! Flow analysis facts: reachability, definite assignment and exception flow.
//!
//! Checks consume these facts through [`ControlFlowFacts`]; building the
//! control-flow graph is the host's job. [`FlowTable`] is a map-backed
//! implementation.

mod facts;
mod table;

pub use crate::facts::{CompletionReasons, ControlFlow, ControlFlowFacts, FlowError};
pub use crate::table::FlowTable;
