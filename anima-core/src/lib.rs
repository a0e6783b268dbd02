//! # Anima Core Library
//!
//! Deterministic affect model for synthetic characters.
//!
//! Every character carries an [`AffectState`] — eight primary emotions on
//! Plutchik's wheel, each in [0, 1] — plus a slower three-axis
//! [`MoodState`] in the background. Incoming messages move the state
//! through a fixed pipeline:
//!
//! - **Routing** ([`router`]) — cheap rule-based triage: most messages
//!   take a fast deterministic path, emotionally loaded or reflective
//!   ones earn a model-backed appraisal.
//! - **Analysis** ([`analyzer`]) — the fast path's keyword and emoji
//!   deltas.
//! - **Appraisal mapping** ([`appraisal`]) — the deep path's cognitive
//!   appraisal vocabulary, translated onto the wheel.
//! - **Decay and inertia** ([`decay`]) — states age toward baseline and
//!   resist sudden change, shaped by stable personality traits.
//! - **Dyads** ([`dyad`]) — secondary emotions synthesized from primary
//!   pairs, with conflict and stability read-outs.
//! - **Storage scoring** ([`storage`]) — what is worth keeping in
//!   long-term memory.
//!
//! Everything in this crate is pure and synchronous; network I/O and
//! persistence live in the companion crates.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod analyzer;
pub mod appraisal;
pub mod config;
pub mod decay;
pub mod dyad;
pub mod error;
pub mod router;
pub mod storage;
pub mod types;

pub use config::AnimaConfig;
pub use error::{AffectError, Result};
pub use types::*;
