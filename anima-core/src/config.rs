//! Configuration for the anima affect engine.
//!
//! Maps directly to `anima.toml`. Every field has a default so an empty
//! file (or no file at all) yields a working configuration.

use serde::{Deserialize, Serialize};

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AnimaConfig {
    /// Decay, inertia, and mood dynamics.
    #[serde(default)]
    pub affect: AffectConfig,
    /// Fast/deep path routing.
    #[serde(default)]
    pub router: RouterConfig,
    /// Upstream text-generation provider settings.
    #[serde(default)]
    pub invocation: InvocationConfig,
    /// Circuit breaker tuning.
    #[serde(default)]
    pub breaker: BreakerConfig,
    /// Long-term memory storage scoring.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AnimaConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `AffectError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::AffectError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Decay, inertia, and mood dynamics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffectConfig {
    /// Base exponential decay rate toward baseline, per minute.
    #[serde(default = "default_decay_rate")]
    pub base_decay_rate: f32,
    /// Base inertia coefficient (0 = no resistance, 1 = frozen).
    #[serde(default = "default_0_3")]
    pub base_inertia: f32,
    /// Mood inertia; mood moves much slower than momentary emotion.
    #[serde(default = "default_0_9")]
    pub mood_inertia: f32,
    /// Intensities below this drop to zero after decay/blend, unless the
    /// baseline itself sits above it.
    #[serde(default = "default_noise_floor")]
    pub noise_floor: f32,
    /// Probability per update of an unprompted mood perturbation.
    #[serde(default = "default_perturbation")]
    pub perturbation_probability: f64,
    /// Whether spontaneous perturbation is applied at all. Disable for
    /// deterministic tests and replays.
    #[serde(default = "default_true")]
    pub perturbation_enabled: bool,
}

impl Default for AffectConfig {
    fn default() -> Self {
        Self {
            base_decay_rate: 0.05,
            base_inertia: 0.3,
            mood_inertia: 0.9,
            noise_floor: 0.05,
            perturbation_probability: 0.05,
            perturbation_enabled: true,
        }
    }
}

/// Fast/deep path routing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Complexity score at or above which a message takes the deep path.
    #[serde(default = "default_0_5")]
    pub deep_threshold: f32,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            deep_threshold: 0.5,
        }
    }
}

/// Upstream text-generation provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationConfig {
    /// OpenAI-compatible endpoint base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,
    /// Per-attempt request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Overall wall-clock ceiling across all retries and rotations, in
    /// milliseconds.
    #[serde(default = "default_deadline_ms")]
    pub overall_deadline_ms: u64,
    /// Retry attempts on a transient 5xx before rotating credentials.
    #[serde(default = "default_3")]
    pub server_error_retries: u32,
    /// First backoff delay in milliseconds; doubles per attempt.
    #[serde(default = "default_backoff_ms")]
    pub backoff_initial_ms: u64,
    /// Explicit credential list. When empty, credentials are read from the
    /// environment (`ANIMA_API_KEY`, `ANIMA_API_KEY_1`..`_10`).
    #[serde(default)]
    pub credentials: Vec<String>,
}

impl Default for InvocationConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.venice.ai/api/v1".to_string(),
            model: "llama-3.3-70b".to_string(),
            timeout_ms: 30_000,
            overall_deadline_ms: 120_000,
            server_error_retries: 3,
            backoff_initial_ms: 1_000,
            credentials: Vec::new(),
        }
    }
}

/// Circuit breaker tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakerConfig {
    /// Consecutive overload failures before the breaker opens.
    #[serde(default = "default_15")]
    pub failure_ceiling: u32,
    /// How long the breaker stays open before allowing a probe, in
    /// milliseconds.
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_ceiling: 15,
            cooldown_ms: 30_000,
        }
    }
}

/// Long-term memory storage scoring.
///
/// The caps and threshold are tuning knobs, not constants: conservative
/// deployments raise the threshold, archival ones lower it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Maximum points from the emotional-arousal factor.
    #[serde(default = "default_30")]
    pub emotional_cap: f32,
    /// Maximum points from the personal-information factor.
    #[serde(default = "default_40")]
    pub informative_cap: f32,
    /// Maximum points from the significant-event factor.
    #[serde(default = "default_50")]
    pub event_cap: f32,
    /// Points granted by the repetition factor (all or nothing).
    #[serde(default = "default_20")]
    pub temporal_points: f32,
    /// Total score at or above which the interaction is stored.
    #[serde(default = "default_50")]
    pub store_threshold: f32,
    /// Bonus points (scaled by confidence) when an important person is
    /// mentioned.
    #[serde(default = "default_15_f32")]
    pub important_person_bonus: f32,
    /// How many recent history entries the repetition factor scans.
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            emotional_cap: 30.0,
            informative_cap: 40.0,
            event_cap: 50.0,
            temporal_points: 20.0,
            store_threshold: 50.0,
            important_person_bonus: 15.0,
            history_window: 20,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_base_url() -> String { "https://api.venice.ai/api/v1".to_string() }
fn default_model() -> String { "llama-3.3-70b".to_string() }
fn default_decay_rate() -> f32 { 0.05 }
fn default_noise_floor() -> f32 { 0.05 }
fn default_perturbation() -> f64 { 0.05 }
fn default_0_3() -> f32 { 0.3 }
fn default_0_5() -> f32 { 0.5 }
fn default_0_9() -> f32 { 0.9 }
fn default_15_f32() -> f32 { 15.0 }
fn default_20() -> f32 { 20.0 }
fn default_30() -> f32 { 30.0 }
fn default_40() -> f32 { 40.0 }
fn default_50() -> f32 { 50.0 }
fn default_3() -> u32 { 3 }
fn default_15() -> u32 { 15 }
fn default_timeout_ms() -> u64 { 30_000 }
fn default_deadline_ms() -> u64 { 120_000 }
fn default_backoff_ms() -> u64 { 1_000 }
fn default_cooldown_ms() -> u64 { 30_000 }
fn default_history_window() -> usize { 20 }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = AnimaConfig::from_toml("").expect("parse empty");
        assert!((config.affect.base_decay_rate - 0.05).abs() < f32::EPSILON);
        assert_eq!(config.breaker.failure_ceiling, 15);
        assert_eq!(config.breaker.cooldown_ms, 30_000);
        assert!((config.storage.store_threshold - 50.0).abs() < f32::EPSILON);
        assert!(config.affect.perturbation_enabled);
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let toml = r#"
            [breaker]
            failure_ceiling = 5

            [storage]
            store_threshold = 75.0
        "#;
        let config = AnimaConfig::from_toml(toml).expect("parse");
        assert_eq!(config.breaker.failure_ceiling, 5);
        assert_eq!(config.breaker.cooldown_ms, 30_000);
        assert!((config.storage.store_threshold - 75.0).abs() < f32::EPSILON);
        assert!((config.storage.event_cap - 50.0).abs() < f32::EPSILON);
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = AnimaConfig::from_toml("[affect\nbroken").expect_err("must fail");
        assert!(matches!(err, crate::AffectError::Config(_)));
    }

    #[test]
    fn loads_from_file() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(
            file,
            "[router]\ndeep_threshold = 0.6\n\n[invocation]\ncredentials = [\"k1\", \"k2\"]\n"
        )
        .expect("write");
        let config = AnimaConfig::from_file(file.path()).expect("load");
        assert!((config.router.deep_threshold - 0.6).abs() < f32::EPSILON);
        assert_eq!(config.invocation.credentials.len(), 2);
    }
}
