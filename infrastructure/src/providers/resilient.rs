//! Timeout and retry decorator for any [`ResponseProvider`].
//!
//! The engine never retries a failed call; this wrapper is where bounded
//! retries happen. It also reports "thinking" and "retrying" progress through
//! the hook the engine passes in.

use async_trait::async_trait;
use conclave_application::{NotificationSink, ProviderError, ResponseProvider};
use conclave_domain::{DiscussionConfig, Notice, PersonaId, resolve_persona};
use std::time::Duration;
use tracing::warn;

/// Per-call limits applied by [`ResilientProvider`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Upper bound for a single attempt
    pub timeout: Duration,
    /// Attempts after the first one
    pub max_retries: u32,
    /// Pause before the first retry, doubled for each further retry
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            max_retries: 1,
            backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    fn backoff_before(&self, retry: u32) -> Duration {
        self.backoff
            .saturating_mul(2u32.saturating_pow(retry.saturating_sub(1)))
    }
}

pub struct ResilientProvider<P> {
    inner: P,
    policy: RetryPolicy,
}

impl<P: ResponseProvider> ResilientProvider<P> {
    pub fn new(inner: P, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    async fn attempt(
        &self,
        persona: &PersonaId,
        prompt: &str,
        config: &DiscussionConfig,
        progress: Option<&dyn NotificationSink>,
    ) -> Result<String, ProviderError> {
        tokio::time::timeout(
            self.policy.timeout,
            self.inner.generate(persona, prompt, config, progress),
        )
        .await
        .unwrap_or(Err(ProviderError::Timeout(self.policy.timeout)))
    }
}

#[async_trait]
impl<P: ResponseProvider> ResponseProvider for ResilientProvider<P> {
    async fn generate(
        &self,
        persona: &PersonaId,
        prompt: &str,
        config: &DiscussionConfig,
        progress: Option<&dyn NotificationSink>,
    ) -> Result<String, ProviderError> {
        let persona_name = resolve_persona(persona, config)
            .map(|p| p.name)
            .unwrap_or_else(|| persona.to_string());
        let max_attempts = self.policy.max_attempts();

        if let Some(sink) = progress {
            sink.notice(&Notice::Thinking {
                persona_name: persona_name.clone(),
            })
            .await;
        }

        let mut attempt = 1;
        loop {
            match self.attempt(persona, prompt, config, progress).await {
                Ok(reply) => return Ok(reply),
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    warn!(
                        "Provider call for {} failed (attempt {}/{}): {}",
                        persona, attempt, max_attempts, e
                    );
                    tokio::time::sleep(self.policy.backoff_before(attempt)).await;
                    attempt += 1;
                    if let Some(sink) = progress {
                        sink.notice(&Notice::Retrying {
                            persona_name: persona_name.clone(),
                            attempt,
                            max_attempts,
                        })
                        .await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `failures` calls, then answers
    struct Flaky {
        failures: u32,
        error: ProviderError,
        calls: AtomicU32,
        delay: Duration,
    }

    impl Flaky {
        fn new(failures: u32, error: ProviderError) -> Self {
            Self {
                failures,
                error,
                calls: AtomicU32::new(0),
                delay: Duration::ZERO,
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ResponseProvider for Flaky {
        async fn generate(
            &self,
            _persona: &PersonaId,
            _prompt: &str,
            _config: &DiscussionConfig,
            _progress: Option<&dyn NotificationSink>,
        ) -> Result<String, ProviderError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if n < self.failures {
                Err(self.error.clone())
            } else {
                Ok("fine".to_string())
            }
        }
    }

    #[derive(Default)]
    struct Recorded(Mutex<Vec<String>>);

    #[async_trait]
    impl NotificationSink for Recorded {
        async fn notify(&self, text: &str) {
            self.0.lock().unwrap().push(text.to_string());
        }
    }

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            timeout: Duration::from_secs(5),
            max_retries,
            backoff: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_retries_then_succeeds() {
        let provider = ResilientProvider::new(
            Flaky::new(1, ProviderError::Unavailable("503".into())),
            policy(2),
        );
        let sink = Recorded::default();
        let config = DiscussionConfig::default();

        let reply = provider
            .generate(&"analyst".into(), "p", &config, Some(&sink))
            .await
            .unwrap();

        assert_eq!(reply, "fine");
        assert_eq!(provider.inner.calls(), 2);
        let lines = sink.0.lock().unwrap().clone();
        assert_eq!(lines[0], "Analytical Network is thinking...");
        assert!(lines[1].contains("retrying 2/3"));
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let provider = ResilientProvider::new(Flaky::new(10, ProviderError::EmptyResponse), policy(1));
        let config = DiscussionConfig::default();

        let err = provider
            .generate(&"analyst".into(), "p", &config, None)
            .await
            .unwrap_err();

        assert_eq!(err, ProviderError::EmptyResponse);
        assert_eq!(provider.inner.calls(), 2);
    }

    #[tokio::test]
    async fn test_unknown_persona_is_not_retried() {
        let provider = ResilientProvider::new(
            Flaky::new(10, ProviderError::UnknownPersona("ghost".into())),
            policy(3),
        );
        let config = DiscussionConfig::default();

        let err = provider
            .generate(&"ghost".into(), "p", &config, None)
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::UnknownPersona(_)));
        assert_eq!(provider.inner.calls(), 1);
    }

    #[tokio::test]
    async fn test_slow_call_times_out() {
        let mut slow = Flaky::new(0, ProviderError::EmptyResponse);
        slow.delay = Duration::from_millis(500);
        let timeout = Duration::from_millis(20);
        let provider = ResilientProvider::new(
            slow,
            RetryPolicy {
                timeout,
                max_retries: 0,
                backoff: Duration::ZERO,
            },
        );
        let config = DiscussionConfig::default();

        let err = provider
            .generate(&"analyst".into(), "p", &config, None)
            .await
            .unwrap_err();

        assert_eq!(err, ProviderError::Timeout(timeout));
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy {
            backoff: Duration::from_millis(100),
            ..Default::default()
        };
        assert_eq!(policy.backoff_before(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_before(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_before(3), Duration::from_millis(400));
    }
}
