//! Model fallback orchestration.
//!
//! A call is attempted against the requested (or default) model first, then
//! against each configured fallback model in order, but only for failures
//! that plausibly clear up on a different model. Schema and authentication
//! problems fail every model identically, so they surface immediately.

use std::future::Future;

use crate::error::LlmError;

/// Substrings of error messages that mark a failure as retryable on a
/// fallback model. Matched case-insensitively.
const RETRYABLE_SIGNALS: &[&str] = &[
    "rate limit",
    "quota",
    "exhausted",
    "internal server error",
    "api error",
    "streaming failed",
    "connection",
];

/// Run `operation` against the candidate models in order.
///
/// The candidate list is the requested model (or the configured default when
/// the request names none) followed by the configured fallbacks. A
/// non-retryable failure, or any failure when no fallbacks are configured,
/// returns immediately. When every candidate fails retryably, the last
/// failure is wrapped in [`LlmError::AllModelsExhausted`].
pub(crate) async fn run_with_fallback<T, F, Fut>(
    requested_model: Option<&str>,
    default_model: &str,
    fallback_models: &[String],
    operation: F,
) -> crate::Result<T>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = crate::Result<T>>,
{
    let initial = requested_model.unwrap_or(default_model);

    let mut last_failure = match operation(initial.to_string()).await {
        Ok(value) => return Ok(value),
        Err(error) => {
            if fallback_models.is_empty() || !is_retryable(&error) {
                return Err(error);
            }

            log::warn!("model {initial} failed, trying the next candidate: {error}");
            (initial.to_string(), error)
        }
    };

    for model in fallback_models {
        match operation(model.clone()).await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if !is_retryable(&error) {
                    return Err(error);
                }

                log::warn!("model {model} failed, trying the next candidate: {error}");
                last_failure = (model.clone(), error);
            }
        }
    }

    let (model, source) = last_failure;

    Err(LlmError::AllModelsExhausted {
        model,
        source: Box::new(source),
    })
}

fn is_retryable(error: &LlmError) -> bool {
    match error {
        LlmError::Schema(_)
        | LlmError::ArgumentParse { .. }
        | LlmError::NotImplemented(_)
        | LlmError::Configuration(_)
        | LlmError::InvalidRequest(_)
        | LlmError::AuthenticationFailed(_)
        | LlmError::ModelNotFound(_)
        | LlmError::AllModelsExhausted { .. } => false,
        LlmError::RateLimitExceeded { .. }
        | LlmError::InsufficientQuota(_)
        | LlmError::ConnectionError(_)
        | LlmError::StreamingFailed(_)
        | LlmError::InternalError(_) => true,
        LlmError::ProviderApiError { .. } => {
            let message = error.to_string().to_lowercase();
            RETRYABLE_SIGNALS.iter().any(|signal| message.contains(signal))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Mutex,
        atomic::{AtomicU32, Ordering},
    };

    use super::*;

    #[tokio::test]
    async fn walks_the_candidate_list_in_order_until_exhaustion() {
        let attempted = Mutex::new(Vec::new());
        let fallbacks = vec!["b".to_string(), "c".to_string()];

        let result: crate::Result<()> = run_with_fallback(Some("a"), "default", &fallbacks, |model| {
            attempted.lock().unwrap().push(model.clone());
            async move {
                Err(LlmError::RateLimitExceeded {
                    message: format!("{model} is over its limit"),
                })
            }
        })
        .await;

        assert_eq!(*attempted.lock().unwrap(), vec!["a", "b", "c"]);
        assert!(matches!(
            result,
            Err(LlmError::AllModelsExhausted { ref model, ref source })
                if model == "c" && matches!(**source, LlmError::RateLimitExceeded { .. })
        ));
    }

    #[tokio::test]
    async fn falls_back_to_the_default_model_when_none_is_requested() {
        let result = run_with_fallback(None, "default", &[], |model| async move { Ok(model) }).await;

        assert_eq!(result.unwrap(), "default");
    }

    #[tokio::test]
    async fn a_later_candidate_can_succeed() {
        let calls = AtomicU32::new(0);
        let fallbacks = vec!["b".to_string()];

        let result = run_with_fallback(Some("a"), "default", &fallbacks, |model| {
            let attempt = calls.fetch_add(1, Ordering::Relaxed);
            async move {
                if attempt == 0 {
                    Err(LlmError::InternalError(Some("backend blip".to_string())))
                } else {
                    Ok(model)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "b");
    }

    #[tokio::test]
    async fn any_failure_is_terminal_without_configured_fallbacks() {
        let calls = AtomicU32::new(0);

        let result: crate::Result<()> = run_with_fallback(Some("a"), "default", &[], |_| {
            calls.fetch_add(1, Ordering::Relaxed);
            async {
                Err(LlmError::RateLimitExceeded {
                    message: "over the limit".to_string(),
                })
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::Relaxed), 1);
        assert!(matches!(result, Err(LlmError::RateLimitExceeded { .. })));
    }

    #[tokio::test]
    async fn non_retryable_failures_short_circuit() {
        let calls = AtomicU32::new(0);
        let fallbacks = vec!["b".to_string()];

        let result: crate::Result<()> = run_with_fallback(Some("a"), "default", &fallbacks, |_| {
            calls.fetch_add(1, Ordering::Relaxed);
            async { Err(LlmError::AuthenticationFailed("bad key".to_string())) }
        })
        .await;

        assert_eq!(calls.load(Ordering::Relaxed), 1);
        assert!(matches!(result, Err(LlmError::AuthenticationFailed(_))));
    }

    #[tokio::test]
    async fn a_non_retryable_failure_on_a_fallback_candidate_is_surfaced_unwrapped() {
        let calls = AtomicU32::new(0);
        let fallbacks = vec!["b".to_string(), "c".to_string()];

        let result: crate::Result<()> = run_with_fallback(Some("a"), "default", &fallbacks, |_| {
            let attempt = calls.fetch_add(1, Ordering::Relaxed);
            async move {
                if attempt == 0 {
                    Err(LlmError::InternalError(Some("backend blip".to_string())))
                } else {
                    Err(LlmError::ModelNotFound("no such model: b".to_string()))
                }
            }
        })
        .await;

        // The second candidate's failure ends the walk; "c" is never tried
        // and the error is not wrapped in an exhaustion error.
        assert_eq!(calls.load(Ordering::Relaxed), 2);
        assert!(matches!(result, Err(LlmError::ModelNotFound(_))));
    }

    #[test]
    fn provider_errors_match_the_signal_table_case_insensitively() {
        let rate_limited = LlmError::ProviderApiError {
            status: 503,
            message: "upstream Rate Limit tripped".to_string(),
        };
        // "API error" is in the Display form of every provider error, so an
        // unmapped backend status is always worth retrying on a fallback.
        let unmapped = LlmError::ProviderApiError {
            status: 418,
            message: "teapot".to_string(),
        };

        assert!(is_retryable(&rate_limited));
        assert!(is_retryable(&unmapped));
    }

    #[test]
    fn schema_errors_are_never_retryable() {
        assert!(!is_retryable(&LlmError::Schema("bad content".to_string())));
        assert!(!is_retryable(&LlmError::ModelNotFound("no such model".to_string())));
        assert!(is_retryable(&LlmError::StreamingFailed("stream cut".to_string())));
        assert!(is_retryable(&LlmError::InsufficientQuota("out of credits".to_string())));
    }
}
