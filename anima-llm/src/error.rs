//! Error taxonomy for provider invocation.
//!
//! Providers disagree on status codes (429 means "slow down" on one and
//! "out of quota" on another), so [`classify_response`] folds status and
//! body text into a fixed set of outcomes the retry loop can route on.

use std::time::Duration;

use thiserror::Error;

/// How much response body to keep in error details.
const DETAIL_LIMIT: usize = 200;

/// Everything that can go wrong while invoking the provider.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvokeError {
    /// The upstream is shedding load; retrying the same credential is fine
    /// once the breaker allows it.
    #[error("provider overloaded (HTTP {status}): {detail}")]
    ServerOverload {
        /// HTTP status of the rejected attempt.
        status: u16,
        /// Truncated response body.
        detail: String,
    },

    /// This credential is rate-limited or out of quota; rotate to the next.
    #[error("credential quota exhausted (HTTP {status}): {detail}")]
    Quota {
        /// HTTP status of the rejected attempt.
        status: u16,
        /// Truncated response body.
        detail: String,
    },

    /// The account behind the credential has no balance left. Not retryable.
    #[error("insufficient credits: {0}")]
    InsufficientCredits(String),

    /// Transient upstream failure (5xx); retry with backoff, then rotate.
    #[error("server error (HTTP {status}): {detail}")]
    ServerError {
        /// HTTP status of the failed attempt.
        status: u16,
        /// Truncated response body.
        detail: String,
    },

    /// The attempt exceeded its network timeout (milliseconds).
    #[error("request timed out after {0}ms")]
    Timeout(u64),

    /// Connection-level failure before any response arrived.
    #[error("network error: {0}")]
    Network(String),

    /// Every credential in the pool was tried without a success.
    #[error("all {tried} credentials exhausted")]
    PoolExhausted {
        /// How many credentials were tried.
        tried: usize,
    },

    /// The circuit breaker held the call past its deadline.
    #[error("provider saturated, gave up waiting on the circuit breaker")]
    ProviderSaturated,

    /// The overall wall-clock budget ran out across retries.
    #[error("invocation deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    /// The provider answered 2xx but the body was not usable.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    /// The credential pool is empty.
    #[error("no credentials configured")]
    NoCredentials,

    /// A response that matched no known failure signature. Not retryable.
    #[error("unclassified provider error (HTTP {status}): {detail}")]
    Unknown {
        /// HTTP status of the failed attempt.
        status: u16,
        /// Truncated response body.
        detail: String,
    },
}

impl InvokeError {
    /// True for outcomes that no amount of retrying or rotating will fix.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            InvokeError::InsufficientCredits(_)
                | InvokeError::MalformedResponse(_)
                | InvokeError::NoCredentials
                | InvokeError::Unknown { .. }
        )
    }
}

impl From<reqwest::Error> for InvokeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            InvokeError::Timeout(0)
        } else {
            InvokeError::Network(err.to_string())
        }
    }
}

/// Classify a non-2xx response by status code and body text.
///
/// Body substrings win over the status code, because a 429 carrying a quota
/// message must rotate rather than wait out the breaker. Matching is done on
/// the lowercased body. Pure function: the same input always classifies the
/// same way.
#[must_use]
pub fn classify_response(status: u16, body: &str) -> InvokeError {
    let lowered = body.to_lowercase();
    let detail = snippet(body);

    if lowered.contains("insufficient credits")
        || lowered.contains("credit balance")
        || lowered.contains("billing")
    {
        return InvokeError::InsufficientCredits(detail);
    }
    if status == 403
        || lowered.contains("quota")
        || lowered.contains("rate limit")
        || lowered.contains("rate_limit")
    {
        return InvokeError::Quota { status, detail };
    }
    if status == 429
        || lowered.contains("retry later")
        || lowered.contains("overloaded")
        || lowered.contains("capacity")
    {
        return InvokeError::ServerOverload { status, detail };
    }
    if (500..=599).contains(&status) {
        return InvokeError::ServerError { status, detail };
    }
    InvokeError::Unknown { status, detail }
}

/// Trim a response body down to a loggable detail string.
fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.len() <= DETAIL_LIMIT {
        return trimmed.to_string();
    }
    let mut end = DETAIL_LIMIT;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &trimmed[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_429_is_overload() {
        let err = classify_response(429, "Too Many Requests");
        assert!(matches!(err, InvokeError::ServerOverload { status: 429, .. }));
    }

    #[test]
    fn quota_text_overrides_the_429_status() {
        let err = classify_response(429, "Monthly quota exceeded for this key");
        assert!(matches!(err, InvokeError::Quota { status: 429, .. }));
    }

    #[test]
    fn rate_limit_text_is_quota() {
        let err = classify_response(429, "rate limit reached, upgrade your plan");
        assert!(matches!(err, InvokeError::Quota { .. }));
        let err = classify_response(400, "error: rate_limit_exceeded");
        assert!(matches!(err, InvokeError::Quota { .. }));
    }

    #[test]
    fn forbidden_is_quota() {
        let err = classify_response(403, "Forbidden");
        assert!(matches!(err, InvokeError::Quota { status: 403, .. }));
    }

    #[test]
    fn credits_text_beats_everything() {
        let err = classify_response(429, "Insufficient credits: add a payment method");
        assert!(matches!(err, InvokeError::InsufficientCredits(_)));
        let err = classify_response(402, "your credit balance is too low");
        assert!(matches!(err, InvokeError::InsufficientCredits(_)));
        let err = classify_response(500, "billing error");
        assert!(matches!(err, InvokeError::InsufficientCredits(_)));
    }

    #[test]
    fn overload_text_without_429() {
        let err = classify_response(200, "model overloaded, retry later");
        assert!(matches!(err, InvokeError::ServerOverload { .. }));
        let err = classify_response(529, "at capacity");
        assert!(matches!(err, InvokeError::ServerOverload { .. }));
    }

    #[test]
    fn five_hundreds_are_server_errors() {
        for status in [500u16, 502, 503, 504] {
            let err = classify_response(status, "upstream exploded");
            assert!(matches!(err, InvokeError::ServerError { .. }), "status {status}");
        }
    }

    #[test]
    fn unmatched_responses_are_unknown_and_fatal() {
        let err = classify_response(418, "I'm a teapot");
        assert!(matches!(err, InvokeError::Unknown { status: 418, .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn classification_is_idempotent() {
        let first = classify_response(429, "quota exceeded");
        let second = classify_response(429, "quota exceeded");
        assert_eq!(first, second);
    }

    #[test]
    fn long_bodies_are_truncated_in_detail() {
        let body = "x".repeat(5000);
        let err = classify_response(418, &body);
        if let InvokeError::Unknown { detail, .. } = err {
            assert!(detail.len() < 250);
            assert!(detail.ends_with("..."));
        } else {
            panic!("expected Unknown");
        }
    }

    #[test]
    fn fatal_flags_match_the_taxonomy() {
        assert!(InvokeError::NoCredentials.is_fatal());
        assert!(InvokeError::MalformedResponse("bad".into()).is_fatal());
        assert!(!InvokeError::ServerOverload { status: 429, detail: String::new() }.is_fatal());
        assert!(!InvokeError::PoolExhausted { tried: 3 }.is_fatal());
        assert!(!InvokeError::Timeout(30_000).is_fatal());
    }
}
