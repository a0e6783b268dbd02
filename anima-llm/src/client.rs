//! The resilient invocation loop.
//!
//! [`ProviderClient`] owns a credential pool, a circuit breaker, and a
//! transport, and drives one chat completion through as many attempts as
//! the failure taxonomy and the overall deadline allow. The transport is
//! a trait so the whole loop is testable against a scripted fake.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::breaker::{CircuitBreaker, Permit};
use crate::credentials::{Credential, CredentialPool};
use crate::error::{InvokeError, classify_response};
use crate::types::{ChatRequest, ChatResponse, InvocationSettings, TokenUsage};

/// Status and body of one HTTP exchange, before classification.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body, untouched.
    pub body: String,
}

/// One HTTP exchange against the provider.
///
/// Implementations must map connection-level failures to
/// [`InvokeError::Timeout`] or [`InvokeError::Network`] and return every
/// actual response, whatever its status, as a [`RawResponse`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` to the chat-completions route under `base_url`,
    /// authenticated with `key`.
    async fn send(
        &self,
        base_url: &str,
        key: &str,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<RawResponse, InvokeError>;
}

/// Production transport over reqwest, against an OpenAI-compatible API.
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    /// A transport with a fresh connection pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        base_url: &str,
        key: &str,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<RawResponse, InvokeError> {
        let url = format!("{base_url}/chat/completions");
        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {key}"))
            .json(body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    InvokeError::Timeout(timeout.as_millis() as u64)
                } else {
                    InvokeError::from(err)
                }
            })?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(RawResponse { status, body })
    }
}

/// Resilient client for one provider endpoint.
///
/// Clone-free by design: wrap it in an [`Arc`] and share it, so every
/// caller funnels through the same breaker and rotation cursor.
pub struct ProviderClient {
    transport: Arc<dyn Transport>,
    settings: InvocationSettings,
    pool: CredentialPool,
    breaker: Arc<CircuitBreaker>,
}

impl ProviderClient {
    /// A client over the production HTTP transport.
    #[must_use]
    pub fn new(
        settings: InvocationSettings,
        pool: CredentialPool,
        breaker: Arc<CircuitBreaker>,
    ) -> Self {
        Self::with_transport(Arc::new(HttpTransport::new()), settings, pool, breaker)
    }

    /// A client over an injected transport.
    #[must_use]
    pub fn with_transport(
        transport: Arc<dyn Transport>,
        settings: InvocationSettings,
        pool: CredentialPool,
        breaker: Arc<CircuitBreaker>,
    ) -> Self {
        Self {
            transport,
            settings,
            pool,
            breaker,
        }
    }

    /// The breaker guarding this provider.
    #[must_use]
    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// The credential pool behind this client.
    #[must_use]
    pub fn pool(&self) -> &CredentialPool {
        &self.pool
    }

    /// Endpoint and retry tuning.
    #[must_use]
    pub fn settings(&self) -> &InvocationSettings {
        &self.settings
    }

    /// Drive one chat completion to success or a terminal error.
    ///
    /// Routing per failure class: overloads feed the breaker and retry the
    /// same credential once it allows; quota rejections rotate immediately;
    /// server errors, timeouts, and network failures back off exponentially
    /// on the same credential and rotate after
    /// [`InvocationSettings::server_error_retries`] attempts. The whole
    /// sequence is bounded by [`InvocationSettings::overall_deadline`].
    ///
    /// # Errors
    ///
    /// [`InvokeError::PoolExhausted`] once every credential has failed,
    /// [`InvokeError::ProviderSaturated`] or [`InvokeError::DeadlineExceeded`]
    /// when the budget runs out, and any fatal classification untouched.
    pub async fn invoke(&self, request: &ChatRequest) -> Result<ChatResponse, InvokeError> {
        let deadline = Instant::now() + self.settings.overall_deadline;
        let mut credential = self.pool.current();
        let mut tried = 0usize;
        let mut retries = 0u32;

        loop {
            let permit = self.breaker.acquire(deadline).await?;
            let probing = permit == Permit::Probe;
            if Instant::now() >= deadline {
                return Err(InvokeError::DeadlineExceeded(self.settings.overall_deadline));
            }

            match self.attempt(&credential, request).await {
                Ok(response) => {
                    self.breaker.record_success();
                    debug!(
                        credential = credential.index,
                        latency_ms = response.latency_ms,
                        tokens = response.usage.total_tokens,
                        "invocation succeeded"
                    );
                    return Ok(response);
                }
                Err(InvokeError::ServerOverload { status, .. }) => {
                    warn!(credential = credential.index, status, "provider overloaded");
                    self.breaker.record_overload();
                }
                Err(InvokeError::Quota { status, .. }) => {
                    // The provider answered, so a probe counts as recovery.
                    if probing {
                        self.breaker.record_success();
                    }
                    warn!(
                        credential = credential.index,
                        status, "credential out of quota, rotating"
                    );
                    self.next_credential(&mut credential, &mut tried, &mut retries)?;
                }
                Err(err @ InvokeError::ServerError { .. }) => {
                    if probing {
                        self.breaker.record_success();
                    }
                    warn!(credential = credential.index, error = %err, "transient server error");
                    self.backoff_or_rotate(&mut credential, &mut tried, &mut retries, deadline)
                        .await?;
                }
                Err(err @ (InvokeError::Timeout(_) | InvokeError::Network(_))) => {
                    // Nothing answered; a failed probe re-opens the breaker.
                    if probing {
                        self.breaker.record_probe_failure();
                    }
                    warn!(credential = credential.index, error = %err, "no response from provider");
                    self.backoff_or_rotate(&mut credential, &mut tried, &mut retries, deadline)
                        .await?;
                }
                Err(err) => {
                    if probing {
                        self.breaker.record_success();
                    }
                    return Err(err);
                }
            }
        }
    }

    /// Invoke with JSON-only framing and parse the answer as a value.
    ///
    /// Models habitually wrap JSON in markdown fences; those are stripped
    /// before parsing.
    ///
    /// # Errors
    ///
    /// Everything [`ProviderClient::invoke`] returns, plus
    /// [`InvokeError::MalformedResponse`] when the text is not JSON.
    pub async fn generate_json(
        &self,
        system: &str,
        user: &str,
    ) -> Result<serde_json::Value, InvokeError> {
        let request = ChatRequest::new(system, user).with_temperature(0.3);
        let response = self.invoke(&request).await?;
        let cleaned = strip_code_fences(&response.text);
        serde_json::from_str(cleaned)
            .map_err(|err| InvokeError::MalformedResponse(format!("expected JSON: {err}")))
    }

    async fn attempt(
        &self,
        credential: &Credential,
        request: &ChatRequest,
    ) -> Result<ChatResponse, InvokeError> {
        let mut body = json!({
            "model": self.settings.model,
            "messages": request.messages,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });
        if let Some(stop) = &request.stop {
            body["stop"] = json!(stop);
        }

        let started = Instant::now();
        let raw = self
            .transport
            .send(
                &self.settings.base_url,
                &credential.key,
                &body,
                self.settings.attempt_timeout,
            )
            .await?;
        let latency_ms = started.elapsed().as_millis() as u64;

        if !(200..300).contains(&raw.status) {
            return Err(classify_response(raw.status, &raw.body));
        }

        let parsed: serde_json::Value = serde_json::from_str(&raw.body)
            .map_err(|err| InvokeError::MalformedResponse(err.to_string()))?;
        let Some(text) = parsed["choices"][0]["message"]["content"].as_str() else {
            return Err(InvokeError::MalformedResponse(
                "response carries no message content".to_string(),
            ));
        };
        let usage =
            serde_json::from_value::<TokenUsage>(parsed["usage"].clone()).unwrap_or_default();
        let model = parsed["model"]
            .as_str()
            .unwrap_or(&self.settings.model)
            .to_string();

        Ok(ChatResponse {
            text: text.to_string(),
            model,
            usage,
            latency_ms,
        })
    }

    fn next_credential(
        &self,
        credential: &mut Credential,
        tried: &mut usize,
        retries: &mut u32,
    ) -> Result<(), InvokeError> {
        *tried += 1;
        if *tried >= self.pool.len() {
            return Err(InvokeError::PoolExhausted { tried: *tried });
        }
        *credential = self.pool.rotate();
        *retries = 0;
        Ok(())
    }

    async fn backoff_or_rotate(
        &self,
        credential: &mut Credential,
        tried: &mut usize,
        retries: &mut u32,
        deadline: Instant,
    ) -> Result<(), InvokeError> {
        if *retries >= self.settings.server_error_retries {
            warn!(
                credential = credential.index,
                "retries exhausted on this credential, rotating"
            );
            return self.next_credential(credential, tried, retries);
        }
        let backoff = self.settings.backoff_initial * 2u32.pow(*retries);
        *retries += 1;
        if Instant::now() + backoff >= deadline {
            return Err(InvokeError::DeadlineExceeded(self.settings.overall_deadline));
        }
        debug!(
            credential = credential.index,
            retry = *retries,
            backoff_ms = backoff.as_millis() as u64,
            "backing off before retry"
        );
        tokio::time::sleep(backoff).await;
        Ok(())
    }
}

/// Strip a leading/trailing markdown code fence from model output.
#[must_use]
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    inner.trim()
}
