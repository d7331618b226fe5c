//! Discussion record port
//!
//! The engine hands every step of a run to a [`ConversationLogger`]: the
//! start, each persona turn, the round summary, each vote and its tally, and
//! the way the run ended (`final_report`, `run_interrupted` or `run_failed`).
//! Operator diagnostics stay on `tracing`; this record is for replaying what
//! was actually said.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// One step of a discussion run
pub struct ConversationEvent {
    /// Short snake_case name such as `"persona_turn"` or `"vote_outcome"`
    pub event_type: &'static str,
    pub timestamp: DateTime<Utc>,
    /// Step details; adapters merge an object payload into the record
    pub payload: Value,
}

impl ConversationEvent {
    /// Stamp `payload` with the current time
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            timestamp: Utc::now(),
            payload,
        }
    }
}

/// Sink for discussion records.
///
/// Recording never blocks the run on I/O errors: an adapter that cannot
/// write drops the event.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// Discards every event
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_event_is_stamped_now() {
        let before = Utc::now();
        let event = ConversationEvent::new("vote", json!({ "persona": "analyst" }));

        assert_eq!(event.event_type, "vote");
        assert!(event.timestamp >= before);
        assert_eq!(event.payload["persona"], "analyst");
    }
}
