//! Events produced while an agent works on a task.

use crate::model::{ToolCallRequest, Usage};
use std::collections::BTreeMap;
use std::time::Duration;

/// One step of an agent invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    /// The model asked for one or more tool calls.
    ToolCallRequest {
        source: String,
        /// Text the model sent alongside the calls, if any.
        content: Option<String>,
        calls: Vec<ToolCallRequest>,
        usage: Option<Usage>,
    },
    /// Requested tools have run.
    ToolCallExecution {
        source: String,
        results: Vec<ToolCallRecord>,
    },
    /// A chunk of model output, only produced by streaming invocations.
    PartialOutput { source: String, text: String },
    /// The final answer. Always the last event of an invocation.
    FinalMessage {
        source: String,
        content: String,
        usage: Option<Usage>,
    },
}

/// Discriminant of [`AgentEvent`], used for counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    ToolCallRequest,
    ToolCallExecution,
    PartialOutput,
    FinalMessage,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EventKind::ToolCallRequest => "ToolCallRequestEvent",
            EventKind::ToolCallExecution => "ToolCallExecutionEvent",
            EventKind::PartialOutput => "ModelOutputChunk",
            EventKind::FinalMessage => "FinalMessage",
        };
        write!(f, "{}", name)
    }
}

impl AgentEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            AgentEvent::ToolCallRequest { .. } => EventKind::ToolCallRequest,
            AgentEvent::ToolCallExecution { .. } => EventKind::ToolCallExecution,
            AgentEvent::PartialOutput { .. } => EventKind::PartialOutput,
            AgentEvent::FinalMessage { .. } => EventKind::FinalMessage,
        }
    }

    /// Name of the agent that produced the event.
    pub fn source(&self) -> &str {
        match self {
            AgentEvent::ToolCallRequest { source, .. }
            | AgentEvent::ToolCallExecution { source, .. }
            | AgentEvent::PartialOutput { source, .. }
            | AgentEvent::FinalMessage { source, .. } => source,
        }
    }

    /// Token usage attached to the event, if any.
    pub fn usage(&self) -> Option<&Usage> {
        match self {
            AgentEvent::ToolCallRequest { usage, .. } | AgentEvent::FinalMessage { usage, .. } => {
                usage.as_ref()
            }
            AgentEvent::ToolCallExecution { .. } | AgentEvent::PartialOutput { .. } => None,
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, AgentEvent::FinalMessage { .. })
    }
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRecord {
    /// Id assigned by the model to the call.
    pub call_id: String,
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Result returned to the model.
    pub result: String,
    /// Whether `result` describes a failure to run the tool.
    pub is_error: bool,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}

/// Aggregate statistics over an event sequence, for display.
#[derive(Debug, Clone, Default)]
pub struct EventStats {
    counts: BTreeMap<EventKind, usize>,
    usage: Usage,
    total: usize,
}

impl EventStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect statistics for a slice of events.
    pub fn from_events(events: &[AgentEvent]) -> Self {
        let mut stats = Self::new();
        for event in events {
            stats.observe(event);
        }
        stats
    }

    /// Count one event. Events without usage contribute no tokens.
    pub fn observe(&mut self, event: &AgentEvent) {
        *self.counts.entry(event.kind()).or_insert(0) += 1;
        self.total += 1;
        if let Some(usage) = event.usage() {
            self.usage.accumulate(usage);
        }
    }

    pub fn total_events(&self) -> usize {
        self.total
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Event counts by kind, in a stable order.
    pub fn breakdown(&self) -> impl Iterator<Item = (EventKind, usize)> + '_ {
        self.counts.iter().map(|(k, v)| (*k, *v))
    }

    pub fn usage(&self) -> Usage {
        self.usage
    }

    pub fn total_tokens(&self) -> u64 {
        self.usage.total()
    }

    /// Mean time per event, or `None` when nothing was observed.
    pub fn average_per_event(&self, elapsed: Duration) -> Option<Duration> {
        u32::try_from(self.total)
            .ok()
            .filter(|n| *n > 0)
            .map(|n| elapsed / n)
    }

    /// Event throughput, or `None` for an empty run or zero elapsed time.
    pub fn events_per_second(&self, elapsed: Duration) -> Option<f64> {
        let secs = elapsed.as_secs_f64();
        (self.total > 0 && secs > 0.0).then(|| self.total as f64 / secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn final_message(usage: Option<Usage>) -> AgentEvent {
        AgentEvent::FinalMessage {
            source: "my_assistant".to_string(),
            content: "The weather in Chennai is sunny".to_string(),
            usage,
        }
    }

    #[test]
    fn test_stats_sum_usage_and_skip_missing() {
        let events = vec![
            AgentEvent::ToolCallRequest {
                source: "my_assistant".to_string(),
                content: None,
                calls: Vec::new(),
                usage: Some(Usage::new(60, 15)),
            },
            AgentEvent::ToolCallExecution {
                source: "my_assistant".to_string(),
                results: Vec::new(),
            },
            AgentEvent::PartialOutput {
                source: "my_assistant".to_string(),
                text: "The ".to_string(),
            },
            final_message(None),
        ];

        let stats = EventStats::from_events(&events);
        assert_eq!(stats.total_events(), 4);
        assert_eq!(stats.count(EventKind::ToolCallRequest), 1);
        assert_eq!(stats.count(EventKind::FinalMessage), 1);
        assert_eq!(stats.usage(), Usage::new(60, 15));
        assert_eq!(stats.total_tokens(), 75);
    }

    #[test]
    fn test_empty_stats() {
        let stats = EventStats::new();
        assert_eq!(stats.total_tokens(), 0);
        assert!(stats.average_per_event(Duration::from_secs(1)).is_none());
        assert!(stats.events_per_second(Duration::from_secs(1)).is_none());
    }

    #[test]
    fn test_timing() {
        let stats = EventStats::from_events(&[final_message(Some(Usage::new(1, 1))), final_message(None)]);
        assert_eq!(
            stats.average_per_event(Duration::from_millis(500)),
            Some(Duration::from_millis(250))
        );
        assert_eq!(stats.events_per_second(Duration::from_secs(2)), Some(1.0));
    }

    #[test]
    fn test_event_accessors() {
        let event = final_message(Some(Usage::new(3, 4)));
        assert!(event.is_final());
        assert_eq!(event.source(), "my_assistant");
        assert_eq!(event.usage().map(Usage::total), Some(7));
        assert_eq!(event.kind().to_string(), "FinalMessage");
    }
}
