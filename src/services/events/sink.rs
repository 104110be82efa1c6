use std::sync::Mutex;

use async_trait::async_trait;

use super::types::Event;

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("event sink unavailable: {0}")]
    Unavailable(String),
}

/// Consumer of audit events.
///
/// Callers treat publishing as fire-and-forget: an `Err` is logged by the
/// caller and never changes the response.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, event: Event) -> Result<(), EventError>;
}

/// Writes each event as one JSON line on the `audit` tracing target.
#[derive(Debug, Clone, Default)]
pub struct TracingEventSink;

impl TracingEventSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventSink for TracingEventSink {
    async fn publish(&self, event: Event) -> Result<(), EventError> {
        let json = serde_json::to_string(&event)?;
        tracing::info!(target: "audit", event = %json, "audit event");
        Ok(())
    }
}

/// Keeps events in memory, in publish order.
#[derive(Debug, Default)]
pub struct MemoryEventSink {
    events: Mutex<Vec<Event>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events.
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl EventSink for MemoryEventSink {
    async fn publish(&self, event: Event) -> Result<(), EventError> {
        self.events
            .lock()
            .map_err(|_| EventError::Unavailable("memory sink lock poisoned".into()))?
            .push(event);
        Ok(())
    }
}
