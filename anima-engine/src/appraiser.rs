//! Provider-backed cognitive appraisal.
//!
//! The deep path asks the model to appraise one user message and hand back a
//! structured verdict: a ten-variable appraisal vector plus a sparse map of
//! emotion labels with intensities. [`Appraiser`] is the seam; orchestrator
//! tests swap in a scripted implementation, production wires in
//! [`ProviderAppraiser`] over a shared [`ProviderClient`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anima_core::appraisal::{AppraisalVector, OccLabel};
use anima_core::config::AnimaConfig;
use anima_llm::{
    BreakerPolicy, CircuitBreaker, CredentialPool, InvocationSettings, InvokeError, ProviderClient,
};
use async_trait::async_trait;
use serde::Deserialize;

use crate::prompts;

// ---------------------------------------------------------------------------
// Appraisal result
// ---------------------------------------------------------------------------

/// The model's verdict on one message.
#[derive(Debug, Clone, PartialEq)]
pub struct Appraisal {
    /// Cognitive appraisal variables, clamped to their ranges.
    pub vector: AppraisalVector,
    /// Emotion labels with intensities in `[0, 1]`. Only known labels
    /// survive parsing.
    pub emotions: HashMap<String, f32>,
}

/// Everything the appraiser needs to know about the moment of the message.
#[derive(Debug, Clone)]
pub struct AppraisalContext {
    /// Character the message is addressed to.
    pub character_id: String,
    /// The user's message, verbatim.
    pub message: String,
    /// Current mood label, e.g. "Sereno".
    pub mood: String,
    /// Dominant primary emotion right now, e.g. "joy".
    pub dominant: String,
}

/// Appraises a message in context.
#[async_trait]
pub trait Appraiser: Send + Sync {
    /// Produce an appraisal, or a provider error the caller may fall back on.
    async fn appraise(&self, context: &AppraisalContext) -> Result<Appraisal, InvokeError>;
}

// ---------------------------------------------------------------------------
// Provider-backed implementation
// ---------------------------------------------------------------------------

/// Wire shape of the model's JSON answer. Both keys default so a partial
/// answer still parses; garbage inside either key is a malformed response.
#[derive(Debug, Deserialize)]
struct AppraisalPayload {
    #[serde(default)]
    appraisal: AppraisalVector,
    #[serde(default)]
    emotions: HashMap<String, f32>,
}

/// [`Appraiser`] over a live chat-completion endpoint.
pub struct ProviderAppraiser {
    client: Arc<ProviderClient>,
}

impl ProviderAppraiser {
    /// Wrap an existing client.
    #[must_use]
    pub fn new(client: Arc<ProviderClient>) -> Self {
        Self { client }
    }

    /// Build a client from configuration.
    ///
    /// Credentials come from the config list when present, otherwise from
    /// the `ANIMA_API_KEY` / `ANIMA_API_KEY_{n}` environment variables.
    pub fn from_config(config: &AnimaConfig) -> Result<Self, InvokeError> {
        let invocation = &config.invocation;
        let pool = if invocation.credentials.is_empty() {
            CredentialPool::from_env()?
        } else {
            CredentialPool::new(invocation.credentials.clone())?
        };
        let settings = InvocationSettings {
            base_url: invocation.base_url.clone(),
            model: invocation.model.clone(),
            attempt_timeout: Duration::from_millis(invocation.timeout_ms),
            overall_deadline: Duration::from_millis(invocation.overall_deadline_ms),
            server_error_retries: invocation.server_error_retries,
            backoff_initial: Duration::from_millis(invocation.backoff_initial_ms),
        };
        let breaker = Arc::new(CircuitBreaker::new(BreakerPolicy {
            failure_ceiling: config.breaker.failure_ceiling,
            cooldown: Duration::from_millis(config.breaker.cooldown_ms),
        }));
        Ok(Self::new(Arc::new(ProviderClient::new(settings, pool, breaker))))
    }

    /// The client behind this appraiser.
    #[must_use]
    pub fn client(&self) -> &ProviderClient {
        &self.client
    }
}

#[async_trait]
impl Appraiser for ProviderAppraiser {
    async fn appraise(&self, context: &AppraisalContext) -> Result<Appraisal, InvokeError> {
        let (system, user) = prompts::render_appraisal(
            &context.character_id,
            &context.mood,
            &context.dominant,
            &context.message,
        );
        let value = self.client.generate_json(&system, &user).await?;
        let payload: AppraisalPayload = serde_json::from_value(value)
            .map_err(|err| InvokeError::MalformedResponse(err.to_string()))?;
        let mut emotions = HashMap::with_capacity(payload.emotions.len());
        for (label, intensity) in payload.emotions {
            if OccLabel::parse(&label).is_none() {
                tracing::warn!(label = %label, "unknown emotion label from provider, dropping");
                continue;
            }
            emotions.insert(label, intensity.clamp(0.0, 1.0));
        }
        Ok(Appraisal {
            vector: payload.appraisal.clamped(),
            emotions,
        })
    }
}
