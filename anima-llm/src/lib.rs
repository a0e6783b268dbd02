//! # anima-llm — Resilient Text-Generation Invocation
//!
//! Wraps an OpenAI-compatible chat-completion endpoint behind a single
//! resilient entry point. Every appraisal call in Anima goes through this
//! crate, ensuring:
//!   - **Credential rotation** over a shared pool (circular, atomic cursor)
//!   - **Retry with exponential backoff** for transient server errors
//!   - **Circuit breaking** when the upstream is overloaded, with a single
//!     half-open probe after cooldown
//!   - **Deadline enforcement** across the whole attempt sequence, so a
//!     caller is never parked indefinitely
//!
//! # Failure routing
//!
//! ```text
//! overload / 429        — feed the breaker, same credential
//! quota / 403           — rotate to the next credential immediately
//! 5xx                   — backoff on the same credential, then rotate
//! timeout / network     — treated like 5xx (and trips the probe when half-open)
//! credits / malformed   — fatal, returned to the caller untouched
//! ```
//!
//! The transport is a trait, so tests drive the full loop against a scripted
//! fake while production uses [`HttpTransport`] over reqwest.

pub mod breaker;
pub mod client;
pub mod credentials;
pub mod error;
pub mod types;

pub use breaker::{BreakerPolicy, BreakerState, CircuitBreaker, Permit};
pub use client::{HttpTransport, ProviderClient, RawResponse, Transport};
pub use credentials::{Credential, CredentialPool};
pub use error::InvokeError;
pub use types::{ChatMessage, ChatRequest, ChatResponse, InvocationSettings, Role, TokenUsage};
