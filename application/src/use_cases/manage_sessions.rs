//! Session management
//!
//! One [`Session`] per conversation context, created on first contact and
//! discarded on reset. Each session owns its configuration, its engine and
//! its pending-input state; sessions never share run state.

use crate::config::BehaviorConfig;
use crate::ports::conversation_logger::{ConversationLogger, NoConversationLogger};
use crate::ports::notification::{NotificationSink, SinkFactory};
use crate::ports::response_provider::ResponseProvider;
use crate::use_cases::run_collaboration::{CollaborationEngine, SharedConfig, shared_config};
use conclave_domain::{ContextId, DiscussionConfig, PendingInput};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLockReadGuard};
use tracing::{debug, info};

/// State attached to one conversation context
pub struct Session {
    context: ContextId,
    config: SharedConfig,
    engine: Arc<CollaborationEngine>,
    pending: Mutex<Option<PendingInput>>,
}

impl Session {
    pub fn context(&self) -> &ContextId {
        &self.context
    }

    pub fn engine(&self) -> &Arc<CollaborationEngine> {
        &self.engine
    }

    /// Read access to the live configuration
    pub fn config(&self) -> RwLockReadGuard<'_, DiscussionConfig> {
        self.config
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Mutate the configuration.
    ///
    /// Allowed mid-run; the engine picks changes up at its next iteration.
    pub fn update_config<R>(&self, f: impl FnOnce(&mut DiscussionConfig) -> R) -> R {
        let mut config = self
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut config)
    }

    /// Arm a pending-input state, replacing any previous one
    pub fn set_pending(&self, pending: PendingInput) {
        *self.lock_pending() = Some(pending);
    }

    /// Consume the pending-input state, if any
    pub fn take_pending(&self) -> Option<PendingInput> {
        self.lock_pending().take()
    }

    pub fn pending(&self) -> Option<PendingInput> {
        self.lock_pending().clone()
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, Option<PendingInput>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// In-memory map of sessions keyed by context id
pub struct SessionRegistry {
    provider: Arc<dyn ResponseProvider>,
    sinks: Arc<dyn SinkFactory>,
    logger: Arc<dyn ConversationLogger>,
    defaults: DiscussionConfig,
    behavior: BehaviorConfig,
    sessions: Mutex<HashMap<ContextId, Arc<Session>>>,
}

impl SessionRegistry {
    pub fn new(provider: Arc<dyn ResponseProvider>, sinks: Arc<dyn SinkFactory>) -> Self {
        Self {
            provider,
            sinks,
            logger: Arc::new(NoConversationLogger),
            defaults: DiscussionConfig::default(),
            behavior: BehaviorConfig::default(),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Configuration every new session starts from
    pub fn with_defaults(mut self, defaults: DiscussionConfig) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_behavior(mut self, behavior: BehaviorConfig) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn behavior(&self) -> &BehaviorConfig {
        &self.behavior
    }

    /// Where replies for `context` are delivered, whether or not a session exists
    pub fn sink_for(&self, context: &ContextId) -> Arc<dyn NotificationSink> {
        self.sinks.sink_for(context)
    }

    /// The session for `context`, created with default settings if absent
    pub fn get_or_create(&self, context: &ContextId) -> Arc<Session> {
        let mut sessions = self.lock_sessions();
        if let Some(session) = sessions.get(context) {
            return Arc::clone(session);
        }

        info!(context = %context, "Creating session");
        let config = shared_config(self.defaults.clone());
        let engine = CollaborationEngine::new(
            Arc::clone(&self.provider),
            self.sinks.sink_for(context),
            Arc::clone(&config),
        )
        .with_behavior(self.behavior.clone())
        .with_conversation_logger(Arc::clone(&self.logger));

        let session = Arc::new(Session {
            context: context.clone(),
            config,
            engine: Arc::new(engine),
            pending: Mutex::new(None),
        });
        sessions.insert(context.clone(), Arc::clone(&session));
        session
    }

    pub fn get(&self, context: &ContextId) -> Option<Arc<Session>> {
        self.lock_sessions().get(context).cloned()
    }

    /// Discard the session for `context`, stopping its run first.
    ///
    /// Returns whether a session existed.
    pub fn reset(&self, context: &ContextId) -> bool {
        let removed = self.lock_sessions().remove(context);
        match removed {
            Some(session) => {
                if session.engine.cancel() {
                    debug!(context = %context, "Stopped running collaboration on reset");
                }
                info!(context = %context, "Session reset");
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.lock_sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_sessions(&self) -> std::sync::MutexGuard<'_, HashMap<ContextId, Arc<Session>>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::notification::{NoNotifications, NotificationSink};
    use crate::ports::response_provider::ProviderError;
    use async_trait::async_trait;
    use conclave_domain::PersonaId;

    struct EchoProvider;

    #[async_trait]
    impl ResponseProvider for EchoProvider {
        async fn generate(
            &self,
            _persona: &PersonaId,
            prompt: &str,
            config: &DiscussionConfig,
            _progress: Option<&dyn NotificationSink>,
        ) -> Result<String, ProviderError> {
            if prompt.contains("do you accept") {
                Ok(config.vote_keywords().accept.to_string())
            } else {
                Ok("echo".to_string())
            }
        }
    }

    fn registry() -> SessionRegistry {
        let sinks = |_: &ContextId| -> Arc<dyn NotificationSink> { Arc::new(NoNotifications) };
        SessionRegistry::new(Arc::new(EchoProvider), Arc::new(sinks))
            .with_behavior(BehaviorConfig::immediate())
    }

    #[test]
    fn test_one_session_per_context() {
        let registry = registry();
        let a1 = registry.get_or_create(&"a".into());
        let a2 = registry.get_or_create(&"a".into());
        let b = registry.get_or_create(&"b".into());

        assert!(Arc::ptr_eq(&a1, &a2));
        assert!(!Arc::ptr_eq(&a1, &b));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_sessions_have_independent_config() {
        let registry = registry();
        let a = registry.get_or_create(&"a".into());
        let b = registry.get_or_create(&"b".into());

        a.update_config(|c| c.set_iteration_count(5)).unwrap();

        assert_eq!(a.config().iteration_count(), 5);
        assert_eq!(b.config().iteration_count(), 2);
    }

    #[test]
    fn test_reset_discards_session_and_pending() {
        let registry = registry();
        let context = ContextId::from("a");
        let session = registry.get_or_create(&context);
        session.set_pending(PendingInput::Topic);
        session.update_config(|c| c.set_iteration_count(4)).unwrap();

        assert!(registry.reset(&context));
        assert!(registry.get(&context).is_none());
        assert!(!registry.reset(&context));

        let fresh = registry.get_or_create(&context);
        assert!(fresh.pending().is_none());
        assert_eq!(fresh.config().iteration_count(), 2);
    }

    #[test]
    fn test_pending_is_consumed_once() {
        let registry = registry();
        let session = registry.get_or_create(&"a".into());
        session.set_pending(PendingInput::PersonaName);

        assert_eq!(session.take_pending(), Some(PendingInput::PersonaName));
        assert_eq!(session.take_pending(), None);
    }

    #[test]
    fn test_defaults_apply_to_new_sessions() {
        let mut defaults = DiscussionConfig::default();
        defaults.set_language("French").unwrap();
        let registry = registry().with_defaults(defaults);

        let session = registry.get_or_create(&"a".into());
        assert_eq!(session.config().language(), "French");
    }

    #[tokio::test]
    async fn test_session_engine_sees_config_edits() {
        let registry = registry();
        let session = registry.get_or_create(&"a".into());
        session.update_config(|c| c.set_iteration_count(1)).unwrap();

        let outcome = session.engine().start("a topic").await;

        match outcome {
            crate::use_cases::run_collaboration::RunOutcome::Completed {
                accepted_summaries,
                ..
            } => assert_eq!(accepted_summaries.len(), 1),
            other => panic!("expected completion, got {:?}", other),
        }
    }
}
