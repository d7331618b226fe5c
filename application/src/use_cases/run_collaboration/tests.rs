use super::*;
use crate::ports::response_provider::ProviderError;
use async_trait::async_trait;
use std::sync::{OnceLock, Weak};
use tokio::sync::Semaphore;

// ==================== Test doubles ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallKind {
    Turn,
    Summary,
    Vote,
    Final,
}

fn kind_of(prompt: &str) -> CallKind {
    if prompt.starts_with("Create a short summary") {
        CallKind::Summary
    } else if prompt.contains("do you accept this summary") {
        CallKind::Vote
    } else if prompt.starts_with("Based on the topic") {
        CallKind::Final
    } else {
        CallKind::Turn
    }
}

type Responder = Box<dyn Fn(&PersonaId, CallKind) -> Result<String, ProviderError> + Send + Sync>;

/// Scripted provider recording every call
struct MockProvider {
    calls: Mutex<Vec<(PersonaId, CallKind, String)>>,
    respond: Responder,
    /// Engine to stop whenever a call of this kind arrives
    stop_on: Option<(CallKind, OnceLock<Arc<CollaborationEngine>>)>,
    /// Calls wait for a permit when set
    gate: Option<Arc<Semaphore>>,
}

impl MockProvider {
    fn new(respond: Responder) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            respond,
            stop_on: None,
            gate: None,
        }
    }

    /// Fixed turn text, every vote uses `vote`
    fn voting(vote: &'static str) -> Self {
        Self::new(Box::new(move |persona: &PersonaId, kind: CallKind| {
            Ok(match kind {
                CallKind::Vote => format!("{} - fine by me", vote),
                CallKind::Summary => "the summary".to_string(),
                CallKind::Final => "the report".to_string(),
                CallKind::Turn => format!("{} thinks so", persona),
            })
        }))
    }

    fn stopping_on(mut self, kind: CallKind) -> Self {
        self.stop_on = Some((kind, OnceLock::new()));
        self
    }

    fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    fn attach(&self, engine: &Arc<CollaborationEngine>) {
        if let Some((_, slot)) = &self.stop_on {
            let _ = slot.set(Arc::clone(engine));
        }
    }

    fn calls(&self) -> Vec<(PersonaId, CallKind, String)> {
        self.calls.lock().unwrap().clone()
    }

    fn kinds(&self) -> Vec<CallKind> {
        self.calls().into_iter().map(|(_, kind, _)| kind).collect()
    }

    fn count(&self, kind: CallKind) -> usize {
        self.kinds().into_iter().filter(|k| *k == kind).count()
    }
}

#[async_trait]
impl ResponseProvider for MockProvider {
    async fn generate(
        &self,
        persona: &PersonaId,
        prompt: &str,
        _config: &DiscussionConfig,
        _progress: Option<&dyn NotificationSink>,
    ) -> Result<String, ProviderError> {
        let kind = kind_of(prompt);
        self.calls
            .lock()
            .unwrap()
            .push((persona.clone(), kind, prompt.to_string()));

        if let Some(gate) = &self.gate {
            let _permit = gate.acquire().await.unwrap();
        }

        let result = (self.respond)(persona, kind);

        if let Some((stop_kind, slot)) = &self.stop_on
            && *stop_kind == kind
            && let Some(engine) = slot.get()
        {
            engine.request_stop().await;
        }

        result
    }
}

/// Sink recording every notification in order
#[derive(Default)]
struct RecordingSink {
    texts: Mutex<Vec<String>>,
    /// Engine to stop when a notification starts with this prefix
    stop_at: Option<(&'static str, OnceLock<Weak<CollaborationEngine>>)>,
}

impl RecordingSink {
    fn stopping_at(prefix: &'static str) -> Self {
        Self {
            stop_at: Some((prefix, OnceLock::new())),
            ..Default::default()
        }
    }

    fn attach(&self, engine: &Arc<CollaborationEngine>) {
        if let Some((_, slot)) = &self.stop_at {
            let _ = slot.set(Arc::downgrade(engine));
        }
    }

    fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }

    fn count_prefix(&self, prefix: &str) -> usize {
        self.texts()
            .iter()
            .filter(|t| t.starts_with(prefix))
            .count()
    }

    fn count_exact(&self, notice: Notice) -> usize {
        let text = notice.to_string();
        self.texts().iter().filter(|t| **t == text).count()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(&self, text: &str) {
        self.texts.lock().unwrap().push(text.to_string());

        if let Some((prefix, slot)) = &self.stop_at
            && text.starts_with(prefix)
            && let Some(engine) = slot.get().and_then(Weak::upgrade)
        {
            engine.request_stop().await;
        }
    }
}

// ==================== Helpers ====================

/// Two custom personas "A" and "B" enabled, in that order
fn config_ab(iterations: u32) -> DiscussionConfig {
    let mut config = DiscussionConfig::default();
    let a = config.add_custom_persona("A", "You are A.").unwrap();
    let b = config.add_custom_persona("B", "You are B.").unwrap();
    config.set_enabled_personas(vec![a, b]).unwrap();
    config.set_iteration_count(iterations).unwrap();
    config
}

fn engine_with(
    provider: Arc<MockProvider>,
    sink: Arc<RecordingSink>,
    config: DiscussionConfig,
) -> Arc<CollaborationEngine> {
    let engine = Arc::new(
        CollaborationEngine::new(provider.clone(), sink.clone(), shared_config(config))
            .with_behavior(BehaviorConfig::immediate()),
    );
    provider.attach(&engine);
    sink.attach(&engine);
    engine
}

fn vote_notices(sink: &RecordingSink) -> usize {
    sink.texts()
        .iter()
        .filter(|t| t.starts_with("A votes:") || t.starts_with("B votes:"))
        .count()
}

// ==================== Successful runs ====================

#[tokio::test]
async fn test_all_accept_single_iteration() {
    let provider = Arc::new(MockProvider::voting("accept"));
    let sink = Arc::new(RecordingSink::default());
    let engine = engine_with(provider.clone(), sink.clone(), config_ab(1));

    let outcome = engine.start("test").await;

    assert_eq!(
        outcome,
        RunOutcome::Completed {
            accepted_summaries: vec!["the summary".to_string()],
            final_report: Some("the report".to_string()),
        }
    );
    assert_eq!(sink.count_prefix("A:\n") + sink.count_prefix("B:\n"), 2);
    assert_eq!(sink.count_prefix("Summary of iteration 1:"), 1);
    assert_eq!(vote_notices(&sink), 2);
    assert_eq!(sink.count_prefix("Vote passed (2 for, 0 against)"), 1);
    assert_eq!(sink.count_prefix("Final collaboration report:"), 1);
    assert_eq!(engine.run_state().accepted_summaries().len(), 1);
    assert!(engine.phase().is_idle());
}

#[tokio::test]
async fn test_call_counts_and_order_per_iteration() {
    let provider = Arc::new(MockProvider::voting("accept"));
    let sink = Arc::new(RecordingSink::default());
    let mut config = config_ab(3);
    // Repeated id: A speaks twice per round
    config.duplicate_at(0).unwrap();
    let engine = engine_with(provider.clone(), sink, config);

    assert!(engine.start("a longer topic").await.is_completed());

    let k = 3;
    let m = 3;
    assert_eq!(provider.count(CallKind::Turn), m * k);
    assert_eq!(provider.count(CallKind::Summary), m);
    assert_eq!(provider.count(CallKind::Vote), m * k);
    assert_eq!(provider.count(CallKind::Final), 1);

    use CallKind::*;
    let one_iteration = [Turn, Turn, Turn, Summary, Vote, Vote, Vote];
    let expected: Vec<CallKind> = one_iteration
        .iter()
        .cycle()
        .take(one_iteration.len() * m)
        .copied()
        .chain(std::iter::once(Final))
        .collect();
    assert_eq!(provider.kinds(), expected);
}

#[tokio::test]
async fn test_turn_prompts_build_on_transcript_and_context() {
    let provider = Arc::new(MockProvider::voting("accept"));
    let sink = Arc::new(RecordingSink::default());
    let engine = engine_with(provider.clone(), sink, config_ab(2));

    engine.start("bridges").await;

    let turns: Vec<_> = provider
        .calls()
        .into_iter()
        .filter(|(_, kind, _)| *kind == CallKind::Turn)
        .collect();

    // First iteration: A sees nothing, B sees A
    assert!(!turns[0].2.contains("said:"));
    assert!(turns[1].2.contains("A said: custom-1 thinks so"));
    assert!(turns[1].2.ends_with("As B, give your view."));
    // Second iteration carries the accepted summary, but a fresh transcript
    assert!(turns[2].2.contains("Summary 1: the summary"));
    assert!(!turns[2].2.contains("said:"));
}

#[tokio::test]
async fn test_final_report_uses_summarizer() {
    let provider = Arc::new(MockProvider::voting("accept"));
    let engine = engine_with(provider.clone(), Arc::new(RecordingSink::default()), config_ab(1));

    engine.start("bridges").await;

    let (persona, kind, prompt) = provider.calls().pop().unwrap();
    assert_eq!(kind, CallKind::Final);
    assert!(persona.is_summarizer());
    assert!(prompt.contains("the summary"));
}

// ==================== Voting ====================

#[tokio::test]
async fn test_all_reject_skips_final_report() {
    let provider = Arc::new(MockProvider::voting("reject"));
    let sink = Arc::new(RecordingSink::default());
    let engine = engine_with(provider.clone(), sink.clone(), config_ab(1));

    let outcome = engine.start("test").await;

    assert_eq!(
        outcome,
        RunOutcome::Completed {
            accepted_summaries: vec![],
            final_report: None,
        }
    );
    assert_eq!(sink.count_prefix("Vote failed (0 for, 2 against)"), 1);
    assert_eq!(sink.count_exact(Notice::FinishedWithoutSummaries), 1);
    assert_eq!(provider.count(CallKind::Final), 0);
    assert!(engine.run_state().accepted_summaries().is_empty());
}

#[tokio::test]
async fn test_tie_rejects() {
    let provider = Arc::new(MockProvider::new(Box::new(|persona: &PersonaId, kind: CallKind| {
        Ok(match kind {
            CallKind::Vote if persona.as_str() == "custom-1" => "accept".to_string(),
            CallKind::Vote => "reject".to_string(),
            _ => "text".to_string(),
        })
    })));
    let sink = Arc::new(RecordingSink::default());
    let engine = engine_with(provider, sink.clone(), config_ab(1));

    engine.start("test").await;

    assert_eq!(sink.count_prefix("Vote failed (1 for, 1 against)"), 1);
    assert!(engine.run_state().accepted_summaries().is_empty());
}

#[tokio::test]
async fn test_vote_keyword_is_case_insensitive_prefix() {
    let provider = Arc::new(MockProvider::voting("ACCEPT"));
    let sink = Arc::new(RecordingSink::default());
    let engine = engine_with(provider, sink.clone(), config_ab(1));

    engine.start("test").await;

    assert_eq!(sink.count_prefix("Vote passed (2 for, 0 against)"), 1);
}

#[tokio::test]
async fn test_votes_use_language_keywords() {
    let provider = Arc::new(MockProvider::voting("akzeptiere"));
    let sink = Arc::new(RecordingSink::default());
    let mut config = config_ab(1);
    config.set_language("German").unwrap();
    let engine = engine_with(provider.clone(), sink.clone(), config);

    engine.start("test").await;

    assert_eq!(sink.count_prefix("Vote passed"), 1);
    let vote_prompt = provider
        .calls()
        .into_iter()
        .find(|(_, kind, _)| *kind == CallKind::Vote)
        .unwrap()
        .2;
    assert!(vote_prompt.contains("\"akzeptiere\""));
}

// ==================== Failures ====================

#[tokio::test]
async fn test_provider_error_aborts_run() {
    let provider = Arc::new(MockProvider::new(Box::new(|persona: &PersonaId, kind: CallKind| {
        if persona.as_str() == "custom-2" && kind == CallKind::Turn {
            Err(ProviderError::Unavailable("socket closed".into()))
        } else {
            Ok("fine".to_string())
        }
    })));
    let sink = Arc::new(RecordingSink::default());
    let engine = engine_with(provider.clone(), sink.clone(), config_ab(2));

    let outcome = engine.start("test").await;

    match outcome {
        RunOutcome::Failed { persona, message } => {
            assert_eq!(persona, "B");
            assert!(!message.contains("socket closed"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(provider.kinds(), vec![CallKind::Turn, CallKind::Turn]);
    assert_eq!(provider.count(CallKind::Vote), 0);
    assert_eq!(sink.count_prefix("Critical error:"), 1);
    assert!(engine.phase().is_idle());
}

#[tokio::test]
async fn test_blank_reply_is_critical() {
    let provider = Arc::new(MockProvider::new(Box::new(|_: &PersonaId, _: CallKind| Ok("   ".to_string()))));
    let sink = Arc::new(RecordingSink::default());
    let engine = engine_with(provider.clone(), sink.clone(), config_ab(1));

    let outcome = engine.start("test").await;

    assert!(matches!(outcome, RunOutcome::Failed { .. }));
    assert_eq!(provider.calls().len(), 1);
    assert_eq!(sink.count_prefix("Critical error:"), 1);
}

#[tokio::test]
async fn test_final_report_failure_is_critical() {
    let provider = Arc::new(MockProvider::new(Box::new(|_: &PersonaId, kind: CallKind| match kind {
        CallKind::Final => Err(ProviderError::Timeout(std::time::Duration::from_secs(60))),
        CallKind::Vote => Ok("accept".to_string()),
        _ => Ok("text".to_string()),
    })));
    let sink = Arc::new(RecordingSink::default());
    let engine = engine_with(provider, sink.clone(), config_ab(1));

    let outcome = engine.start("test").await;

    assert!(matches!(outcome, RunOutcome::Failed { .. }));
    assert_eq!(sink.count_prefix("Final collaboration report:"), 0);
    assert!(engine.phase().is_idle());
}

// ==================== Preconditions ====================

#[tokio::test]
async fn test_no_personas_rejected() {
    let provider = Arc::new(MockProvider::voting("accept"));
    let sink = Arc::new(RecordingSink::default());
    let mut config = DiscussionConfig::default();
    config.set_enabled_personas(vec![]).unwrap();
    let engine = engine_with(provider.clone(), sink.clone(), config);

    let outcome = engine.start("test").await;

    assert_eq!(
        outcome,
        RunOutcome::Rejected(StartRejection::NoPersonasEnabled)
    );
    assert_eq!(sink.texts(), vec![Notice::NoPersonasEnabled.to_string()]);
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_blank_topic_rejected() {
    let provider = Arc::new(MockProvider::voting("accept"));
    let engine = engine_with(provider.clone(), Arc::new(RecordingSink::default()), config_ab(1));

    let outcome = engine.start("   ").await;

    assert!(matches!(
        outcome,
        RunOutcome::Rejected(StartRejection::InvalidTopic(_))
    ));
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_start_while_running_is_rejected() {
    let gate = Arc::new(Semaphore::new(0));
    let provider = Arc::new(MockProvider::voting("accept").gated(gate.clone()));
    let sink = Arc::new(RecordingSink::default());
    let engine = engine_with(provider.clone(), sink.clone(), config_ab(1));

    let running = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.start("first topic").await })
    };
    while provider.calls().is_empty() {
        tokio::task::yield_now().await;
    }
    assert_eq!(engine.phase(), EnginePhase::Running);

    let second = engine.start("second topic").await;
    assert_eq!(second, RunOutcome::Rejected(StartRejection::AlreadyRunning));
    assert_eq!(sink.count_exact(Notice::AlreadyRunning), 1);
    assert_eq!(
        engine.run_state().topic().unwrap().content(),
        "first topic"
    );

    gate.add_permits(1);
    assert!(running.await.unwrap().is_completed());
}

// ==================== Cancellation ====================

#[tokio::test]
async fn test_stop_when_idle_is_noop() {
    let provider = Arc::new(MockProvider::voting("accept"));
    let sink = Arc::new(RecordingSink::default());
    let engine = engine_with(provider, sink.clone(), config_ab(1));

    assert!(!engine.request_stop().await);
    assert!(!engine.request_stop().await);
    assert_eq!(sink.count_exact(Notice::NothingToStop), 2);
    assert!(engine.phase().is_idle());
}

#[tokio::test]
async fn test_stop_before_voting_skips_votes() {
    // Stop arrives while the synthesizer is working: after the persona turns,
    // before the vote phase.
    let provider = Arc::new(MockProvider::voting("accept").stopping_on(CallKind::Summary));
    let sink = Arc::new(RecordingSink::default());
    let engine = engine_with(provider.clone(), sink.clone(), config_ab(2));

    let outcome = engine.start("test").await;

    assert_eq!(
        outcome,
        RunOutcome::Interrupted {
            iterations_completed: 0
        }
    );
    assert_eq!(provider.count(CallKind::Vote), 0);
    assert_eq!(provider.count(CallKind::Final), 0);
    assert_eq!(sink.count_exact(Notice::StopRequested), 1);
    assert_eq!(sink.count_exact(Notice::Interrupted), 1);
    assert!(engine.run_state().accepted_summaries().is_empty());
    assert!(engine.phase().is_idle());
}

#[tokio::test]
async fn test_stop_during_turn_discards_reply() {
    let provider = Arc::new(MockProvider::voting("accept").stopping_on(CallKind::Turn));
    let sink = Arc::new(RecordingSink::default());
    let engine = engine_with(provider.clone(), sink.clone(), config_ab(1));

    let outcome = engine.start("test").await;

    assert!(matches!(outcome, RunOutcome::Interrupted { .. }));
    assert_eq!(provider.calls().len(), 1);
    assert_eq!(sink.count_prefix("A:\n"), 0);
}

#[tokio::test]
async fn test_stop_during_vote_discards_round() {
    let provider = Arc::new(MockProvider::voting("accept").stopping_on(CallKind::Vote));
    let sink = Arc::new(RecordingSink::default());
    let engine = engine_with(provider.clone(), sink.clone(), config_ab(2));

    let outcome = engine.start("test").await;

    assert!(matches!(outcome, RunOutcome::Interrupted { .. }));
    assert_eq!(provider.count(CallKind::Vote), 1);
    assert_eq!(sink.count_prefix("Vote passed"), 0);
    assert!(engine.run_state().accepted_summaries().is_empty());
}

#[tokio::test]
async fn test_stop_during_finalization_is_ignored() {
    let provider = Arc::new(MockProvider::voting("accept").stopping_on(CallKind::Final));
    let sink = Arc::new(RecordingSink::default());
    let engine = engine_with(provider, sink.clone(), config_ab(1));

    assert!(engine.start("first topic").await.is_completed());
    assert_eq!(sink.count_exact(Notice::StopRequested), 1);
    assert_eq!(sink.count_prefix("Final collaboration report:"), 1);
    assert!(engine.phase().is_idle());
}

#[tokio::test]
async fn test_stop_after_last_vote_skips_final_report() {
    let provider = Arc::new(MockProvider::voting("accept"));
    let sink = Arc::new(RecordingSink::stopping_at("Vote passed"));
    let engine = engine_with(provider.clone(), sink.clone(), config_ab(1));

    let outcome = engine.start("first topic").await;

    assert_eq!(
        outcome,
        RunOutcome::Interrupted {
            iterations_completed: 1
        }
    );
    assert_eq!(provider.count(CallKind::Final), 0);
    assert_eq!(sink.count_exact(Notice::StopRequested), 1);
    assert_eq!(sink.count_exact(Notice::Interrupted), 1);
    assert_eq!(sink.count_exact(Notice::Finalizing), 0);
    assert_eq!(sink.count_prefix("Final collaboration report:"), 0);
    assert!(engine.phase().is_idle());
}

// ==================== Restart ====================

#[tokio::test]
async fn test_restart_clears_previous_summaries() {
    let provider = Arc::new(MockProvider::voting("accept"));
    let sink = Arc::new(RecordingSink::default());
    let engine = engine_with(provider, sink, config_ab(2));

    engine.start("first topic").await;
    assert_eq!(engine.run_state().accepted_summaries().len(), 2);

    let outcome = engine.start("second topic").await;
    match outcome {
        RunOutcome::Completed {
            accepted_summaries, ..
        } => assert_eq!(accepted_summaries.len(), 2),
        other => panic!("expected completion, got {:?}", other),
    }
    assert_eq!(
        engine.run_state().topic().unwrap().content(),
        "second topic"
    );
}

#[tokio::test]
async fn test_restart_after_interrupt_starts_fresh() {
    let provider = Arc::new(MockProvider::voting("accept").stopping_on(CallKind::Vote));
    let sink = Arc::new(RecordingSink::default());
    let engine = engine_with(provider.clone(), sink, config_ab(1));

    let first = engine.start("first topic").await;
    assert!(matches!(first, RunOutcome::Interrupted { .. }));

    // The hook fires again on the next run's first vote; the token is new, so
    // the stop only affects that run once it is requested.
    let second = engine.start("second topic").await;
    assert!(matches!(
        second,
        RunOutcome::Interrupted {
            iterations_completed: 0
        }
    ));
    assert_eq!(
        engine.run_state().topic().unwrap().content(),
        "second topic"
    );
    assert_eq!(provider.count(CallKind::Turn), 4);
}

// ==================== Mid-run configuration ====================

#[tokio::test]
async fn test_config_change_applies_at_next_iteration() {
    let config = shared_config(config_ab(2));
    let edit_target = Arc::clone(&config);
    let provider = Arc::new(MockProvider::new(Box::new(move |_: &PersonaId, kind: CallKind| {
        if kind == CallKind::Summary {
            // Drop B from the rotation once the first round is summarised
            let mut config = edit_target.write().unwrap();
            if config.enabled_personas().len() == 2 {
                config.remove_at(1).unwrap();
            }
        }
        Ok(match kind {
            CallKind::Vote => "accept".to_string(),
            _ => "text".to_string(),
        })
    })));
    let sink = Arc::new(RecordingSink::default());
    let engine = Arc::new(
        CollaborationEngine::new(provider.clone(), sink, config)
            .with_behavior(BehaviorConfig::immediate()),
    );

    engine.start("test").await;

    // Iteration 1 still used both personas for the vote; iteration 2 only A
    assert_eq!(provider.count(CallKind::Turn), 3);
    assert_eq!(provider.count(CallKind::Vote), 3);
}
