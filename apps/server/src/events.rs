//! Broadcast event bus bridging sync progress to SSE subscribers.
//!
//! Publishing never blocks and never fails: with no subscribers the event
//! is simply dropped, and a slow subscriber lags rather than stalling the
//! sync. Dropping a subscriber has no effect on the publishing side.

use serde::Serialize;
use tokio::sync::broadcast;

use devpulse_core::sync::{SyncProgressPayload, SyncProgressReporter, SyncRunSummary};

pub const SYNC_START: &str = "sync-start";
pub const SYNC_PROGRESS: &str = "sync-progress";
pub const SYNC_COMPLETE: &str = "sync-complete";

const EVENT_BUS_CAPACITY: usize = 256;

/// One server-sent event: a name plus a JSON payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerEvent {
    pub event: String,
    pub payload: serde_json::Value,
}

impl ServerEvent {
    pub fn new(event: &str) -> Self {
        Self {
            event: event.to_string(),
            payload: serde_json::Value::Null,
        }
    }

    pub fn with_payload(event: &str, payload: serde_json::Value) -> Self {
        Self {
            event: event.to_string(),
            payload,
        }
    }
}

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ServerEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_BUS_CAPACITY);
        Self { sender }
    }

    pub fn publish(&self, event: ServerEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Progress reporter that publishes events to the EventBus for SSE
/// delivery.
pub struct EventBusProgressReporter {
    event_bus: EventBus,
}

impl EventBusProgressReporter {
    pub fn new(event_bus: EventBus) -> Self {
        Self { event_bus }
    }
}

impl SyncProgressReporter for EventBusProgressReporter {
    fn report_sync_start(&self) {
        self.event_bus.publish(ServerEvent::new(SYNC_START));
    }

    fn report_progress(&self, payload: SyncProgressPayload) {
        self.event_bus.publish(ServerEvent::with_payload(
            SYNC_PROGRESS,
            serde_json::to_value(&payload).unwrap_or_default(),
        ));
    }

    fn report_sync_complete(&self, summary: &SyncRunSummary) {
        self.event_bus.publish(ServerEvent::with_payload(
            SYNC_COMPLETE,
            serde_json::to_value(summary).unwrap_or_default(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devpulse_core::sync::{SyncStatus, SyncStepStatus};

    #[tokio::test]
    async fn reporter_publishes_the_full_event_sequence() {
        let bus = EventBus::new();
        let mut receiver = bus.subscribe();
        let reporter = EventBusProgressReporter::new(bus.clone());

        reporter.report_sync_start();
        reporter.report_progress(SyncProgressPayload {
            step: "github".to_string(),
            status: SyncStepStatus::Done,
            message: "github sync finished".to_string(),
        });
        reporter.report_sync_complete(&SyncRunSummary {
            success: true,
            status: SyncStatus::Success,
            errors: Vec::new(),
            duration_ms: 12,
        });

        assert_eq!(receiver.recv().await.unwrap().event, SYNC_START);
        let progress = receiver.recv().await.unwrap();
        assert_eq!(progress.event, SYNC_PROGRESS);
        assert_eq!(progress.payload["step"], "github");
        let complete = receiver.recv().await.unwrap();
        assert_eq!(complete.event, SYNC_COMPLETE);
        assert_eq!(complete.payload["status"], "success");
    }

    #[tokio::test]
    async fn publishing_without_subscribers_is_a_no_op() {
        let bus = EventBus::new();
        bus.publish(ServerEvent::new(SYNC_START));
    }
}
