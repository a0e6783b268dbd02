//! Engine-level error type.

use thiserror::Error;

use crate::store::StoreError;

/// Anything that can fail while orchestrating a message.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A failure inside the affect model (config, validation, io).
    #[error("affect error: {0}")]
    Affect(#[from] anima_core::AffectError),

    /// A terminal failure from the provider invocation layer.
    ///
    /// Deep-path invocation failures are normally swallowed by the fast-path
    /// fallback; this surfaces only from direct appraisal calls.
    #[error("invocation error: {0}")]
    Invoke(#[from] anima_llm::InvokeError),

    /// A failure from the character store.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Convenience alias for engine results.
pub type Result<T> = std::result::Result<T, EngineError>;
