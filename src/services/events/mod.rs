/*!
 * Audit events
 *
 * Responsibility:
 * - 監査イベントの型 (locale に依存しない構造化レコード)
 * - 外部 sink への publish インターフェース
 *
 * Public API:
 * - Event / EventType / EventId / EndpointDetail
 * - EventSink (+ TracingEventSink, MemoryEventSink)
 */

mod sink;
mod types;

pub use sink::{EventError, EventSink, MemoryEventSink, TracingEventSink};
pub use types::{EndpointDetail, Event, EventId, EventType};
