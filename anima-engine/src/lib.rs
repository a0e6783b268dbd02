//! # anima-engine — Orchestration for the Anima Affect System
//!
//! Ties the game-agnostic `anima-core` affect model and the `anima-llm`
//! invocation layer into a per-message pipeline:
//!
//! ```text
//! message ──► router ──┬─► fast path: keyword deltas → apply_deltas
//! (per        classify │
//!  character)          └─► deep path: appraisal prompt → provider →
//!                          OCC mapping → timed decay/inertia update
//!                                  │
//!                                  ▼
//!                  dyads → mood → storage decision → persist
//! ```
//!
//! A deep-path provider failure of any class degrades to the fast path for
//! that message; the pipeline always produces a response.
//!
//! ## Modules
//!
//! - `orchestrator` — the pipeline itself, one entry point per message
//! - `store` — character persistence trait and the in-memory implementation
//! - `appraiser` — provider-backed message appraisal behind a trait
//! - `prompts` — appraisal prompt templates and rendering
//! - `error` — engine error type wrapping core, llm, and store failures

pub mod appraiser;
pub mod error;
pub mod orchestrator;
pub mod prompts;
pub mod store;

pub use appraiser::{Appraisal, AppraisalContext, Appraiser, ProviderAppraiser};
pub use error::{EngineError, Result};
pub use orchestrator::{MessageOutcome, Orchestrator, ResponseMetadata};
pub use store::{CharacterRecord, CharacterStore, MemoryStore, StoredMemory};

/// Install a `tracing` subscriber reading `RUST_LOG`, defaulting to `info`.
///
/// Safe to call more than once; later calls are no-ops. Meant for binaries
/// and integration tests embedding the engine.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
