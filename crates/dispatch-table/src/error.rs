//! Error types for the dispatch-table builder.
//!
//! Internal invariant violations (range overlaps, an `isSetter` disagreement
//! between merged targets, a signature computed before `targetRanges` is
//! final) are compiler bugs with no recovery path — those are asserted with
//! `debug_assert!`/`panic!` at the point of detection rather than routed
//! through this enum. `DispatchError` covers the fault classes that
//! genuinely depend on external input: metadata the front end failed to
//! supply, lookups against selectors that were never registered, and
//! emission-time targets that fail to resolve in a loaded module.

use thiserror::Error;

/// Errors surfaced by the dispatch-table builder's public entry points.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A reachable member lacks front-end metadata.
    #[error("missing front-end metadata for member: {0}")]
    MissingMetadata(String),

    /// A lookup-only selector resolution was attempted before any target
    /// for that selector id had been registered.
    #[error("unknown selector for reference {0}")]
    UnknownSelector(String),

    /// Emission-time: the target function for a reference could not be
    /// resolved even though its class is concrete and its module is loaded.
    /// A `None` resolution is only sound for deferred modules, handled by
    /// leaving the table slot empty rather than returning this error.
    #[error("unresolved target function for reference {0} in a loaded module")]
    UnresolvedTarget(String),

    /// Catch-all for packing/emission inconsistencies detected at runtime
    /// that are still worth a diagnostic message on the way down.
    #[error("internal dispatch-table builder error: {0}")]
    Internal(String),
}

/// Result type alias used throughout the dispatch-table builder.
pub type DispatchResult<T> = std::result::Result<T, DispatchError>;
