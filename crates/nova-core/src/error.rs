/// A semantic query could not be answered because the project index is still
/// being built.
///
/// This is a transient condition. Consumers treat it as "no answer yet" and
/// never surface it to the user; the next analysis pass asks again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[error("index is not ready")]
pub struct IndexNotReady;
