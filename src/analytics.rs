//! Engagement events reported by the demo.

use serde_json::{Value, json};

/// Something worth counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticsEvent {
    /// The visitor pressed "Run demo"
    DemoStarted,
    /// The visitor cycled to another example
    QuestionChanged { index: usize },
}

impl AnalyticsEvent {
    /// Event name as reported to the analytics backend.
    pub fn name(&self) -> &'static str {
        match self {
            AnalyticsEvent::DemoStarted => "demo_started",
            AnalyticsEvent::QuestionChanged { .. } => "demo_question_changed",
        }
    }

    pub fn params(&self) -> Value {
        match self {
            AnalyticsEvent::DemoStarted => json!({ "event_category": "engagement" }),
            AnalyticsEvent::QuestionChanged { index } => json!({
                "event_category": "engagement",
                "question_index": index,
            }),
        }
    }
}

/// Destination for [`AnalyticsEvent`]s.
///
/// Sinks must not fail loudly: a missing backend is the normal case.
pub trait AnalyticsSink {
    fn track(&self, event: &AnalyticsEvent);
}

/// Writes events to the log at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl AnalyticsSink for LogSink {
    fn track(&self, event: &AnalyticsEvent) {
        log::debug!("analytics: {} {}", event.name(), event.params());
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(AnalyticsEvent::DemoStarted.name(), "demo_started");
        assert_eq!(
            AnalyticsEvent::QuestionChanged { index: 2 }.name(),
            "demo_question_changed"
        );
    }

    #[test]
    fn test_event_params() {
        assert_eq!(
            AnalyticsEvent::DemoStarted.params(),
            json!({ "event_category": "engagement" })
        );

        let params = AnalyticsEvent::QuestionChanged { index: 1 }.params();
        assert_eq!(params["event_category"], "engagement");
        assert_eq!(params["question_index"], 1);
    }
}
