//! Audit emission for failed authorize requests.
//!
//! Publishing runs on its own task and is awaited. If the request future is
//! dropped mid-way, the task still finishes; any failure is logged here and
//! never reaches the response.

use std::sync::Arc;

use tracing::{debug, warn};

use super::types::{RequestContext, ValidationOutcome};
use crate::services::events::{Event, EventError, EventSink};

#[derive(Clone)]
pub struct AuditEmitter {
    sink: Arc<dyn EventSink>,
}

impl AuditEmitter {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }

    /// Raw error code as message; the localized text never goes into audit.
    pub fn failure_event(
        outcome: &ValidationOutcome,
        endpoint_name: &str,
        request_id: &str,
    ) -> Event {
        Event::endpoint_failure(
            endpoint_name,
            outcome.effective_error_code(),
            outcome.error_kind,
            request_id,
        )
    }

    pub async fn emit(&self, outcome: &ValidationOutcome, endpoint_name: &str, ctx: &RequestContext) {
        if !outcome.is_error() {
            return;
        }

        let event = Self::failure_event(outcome, endpoint_name, &ctx.request_id);
        let sink = Arc::clone(&self.sink);
        let timeout = ctx.collaborator_timeout;

        let task = tokio::spawn(async move {
            let publish = sink.publish(event);
            match timeout {
                Some(limit) => tokio::time::timeout(limit, publish)
                    .await
                    .unwrap_or_else(|_| Err(EventError::Unavailable("publish timed out".into()))),
                None => publish.await,
            }
        });

        match task.await {
            Ok(Ok(())) => debug!(request_id = %ctx.request_id, "audit event published"),
            Ok(Err(err)) => warn!(
                error = ?err,
                request_id = %ctx.request_id,
                "failed to publish audit event"
            ),
            Err(err) => warn!(
                error = ?err,
                request_id = %ctx.request_id,
                "audit publish task did not complete"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::authorize::{AUTHORIZE_ENDPOINT_NAME, ErrorKind, ValidatedAuthorizeRequest};
    use crate::services::events::{EventId, EventType, MemoryEventSink};
    use async_trait::async_trait;
    use std::time::Duration;

    struct FailingSink;

    #[async_trait]
    impl EventSink for FailingSink {
        async fn publish(&self, _event: Event) -> Result<(), EventError> {
            Err(EventError::Unavailable("down".into()))
        }
    }

    struct HangingSink;

    #[async_trait]
    impl EventSink for HangingSink {
        async fn publish(&self, _event: Event) -> Result<(), EventError> {
            std::future::pending::<()>().await;
            Ok(())
        }
    }

    struct PanickingSink;

    #[async_trait]
    impl EventSink for PanickingSink {
        async fn publish(&self, _event: Event) -> Result<(), EventError> {
            panic!("sink exploded");
        }
    }

    #[tokio::test]
    async fn emits_one_failure_event_with_raw_code() {
        let sink = Arc::new(MemoryEventSink::new());
        let emitter = AuditEmitter::new(sink.clone());
        let outcome = ValidationOutcome::client_error("some error", None);

        emitter
            .emit(&outcome, AUTHORIZE_ENDPOINT_NAME, &RequestContext::new("req-1"))
            .await;

        let events = sink.events();
        assert_eq!(events.len(), 1);
        let evt = &events[0];
        assert_eq!(evt.event_type, EventType::Failure);
        assert_eq!(evt.id, EventId::EndpointFailure);
        assert_eq!(evt.message, "some error");
        assert_eq!(evt.details.endpoint_name, "Authorize");
        assert_eq!(evt.error_kind, ErrorKind::Client);
        assert_eq!(evt.request_id, "req-1");
    }

    #[tokio::test]
    async fn successful_outcome_is_not_audited() {
        let sink = Arc::new(MemoryEventSink::new());
        let emitter = AuditEmitter::new(sink.clone());
        let outcome = ValidationOutcome::success(ValidatedAuthorizeRequest::new("c"));

        emitter
            .emit(&outcome, AUTHORIZE_ENDPOINT_NAME, &RequestContext::new("r"))
            .await;
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn sink_failure_is_swallowed() {
        let emitter = AuditEmitter::new(Arc::new(FailingSink));
        let outcome = ValidationOutcome::user_error("foo", None);
        emitter
            .emit(&outcome, AUTHORIZE_ENDPOINT_NAME, &RequestContext::new("r"))
            .await;
    }

    #[tokio::test]
    async fn sink_panic_is_swallowed() {
        let emitter = AuditEmitter::new(Arc::new(PanickingSink));
        let outcome = ValidationOutcome::user_error("foo", None);
        emitter
            .emit(&outcome, AUTHORIZE_ENDPOINT_NAME, &RequestContext::new("r"))
            .await;
    }

    #[tokio::test]
    async fn hanging_sink_is_bounded_by_context_timeout() {
        let emitter = AuditEmitter::new(Arc::new(HangingSink));
        let outcome = ValidationOutcome::user_error("foo", None);
        let ctx = RequestContext::new("r").with_timeout(Some(Duration::from_millis(20)));

        let done = tokio::time::timeout(
            Duration::from_secs(2),
            emitter.emit(&outcome, AUTHORIZE_ENDPOINT_NAME, &ctx),
        )
        .await;
        assert!(done.is_ok());
    }

    #[tokio::test]
    async fn emission_completes_when_caller_is_cancelled() {
        struct SlowSink(Arc<MemoryEventSink>);

        #[async_trait]
        impl EventSink for SlowSink {
            async fn publish(&self, event: Event) -> Result<(), EventError> {
                tokio::time::sleep(Duration::from_millis(30)).await;
                self.0.publish(event).await
            }
        }

        let memory = Arc::new(MemoryEventSink::new());
        let emitter = AuditEmitter::new(Arc::new(SlowSink(memory.clone())));
        let outcome = ValidationOutcome::user_error("foo", None);
        let ctx = RequestContext::new("r");

        // Drop the emit future before the sink finishes.
        let cancelled = tokio::time::timeout(
            Duration::from_millis(5),
            emitter.emit(&outcome, AUTHORIZE_ENDPOINT_NAME, &ctx),
        )
        .await;
        assert!(cancelled.is_err());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(memory.len(), 1);
    }
}
