use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::services::authorize::ErrorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Success,
    Failure,
    Information,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventId {
    EndpointSuccess,
    EndpointFailure,
}

impl EventId {
    /// Stable numeric id for sinks that index on numbers.
    pub fn code(&self) -> u32 {
        match self {
            EventId::EndpointSuccess => 3000,
            EventId::EndpointFailure => 3001,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EventId::EndpointSuccess => "Endpoint Success",
            EventId::EndpointFailure => "Endpoint Failure",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointDetail {
    pub endpoint_name: String,
}

/// A locale-independent audit record.
///
/// `message` carries raw error codes only, never localized text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub event_id: Uuid,
    pub category: &'static str,
    pub name: &'static str,
    pub event_type: EventType,
    pub id: EventId,
    pub code: u32,
    pub message: String,
    pub details: EndpointDetail,
    pub error_kind: ErrorKind,
    pub request_id: String,
    pub time: DateTime<Utc>,
}

impl Event {
    pub fn endpoint_failure(
        endpoint_name: impl Into<String>,
        message: impl Into<String>,
        error_kind: ErrorKind,
        request_id: impl Into<String>,
    ) -> Self {
        let id = EventId::EndpointFailure;
        Self {
            event_id: Uuid::new_v4(),
            category: "Endpoints",
            name: id.name(),
            event_type: EventType::Failure,
            id,
            code: id.code(),
            message: message.into(),
            details: EndpointDetail {
                endpoint_name: endpoint_name.into(),
            },
            error_kind,
            request_id: request_id.into(),
            time: Utc::now(),
        }
    }
}
