//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`WizardBus`] is the publish/subscribe hub for [`WizardEvent`]s: step
//! change reports flowing child to parent, user-facing notices, entity
//! lifecycle events and the terminal submission outcome. Clone the bus
//! freely; all clones publish into the same channel.

use chrono::Utc;
use serde::Serialize;
use tokio::sync::broadcast;

use astrovault_core::steps::WizardStep;
use astrovault_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Notice
// ---------------------------------------------------------------------------

/// How a notice should be presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Navigation-blocking hints and other non-error guidance.
    Info,
    /// A completed operation worth confirming.
    Success,
    /// A failed operation the user may retry.
    Error,
}

/// A user-facing notification. Blocking hints and mutation failures share
/// this single channel and differ only in severity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
    pub timestamp: Timestamp,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Error, message)
    }

    fn with_severity(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// WizardEvent
// ---------------------------------------------------------------------------

/// An event that occurred inside the submission wizard.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WizardEvent {
    /// A step reported new data and validity.
    StepChanged {
        step: WizardStep,
        is_valid: bool,
        timestamp: Timestamp,
    },

    /// A user-facing notification.
    Notice(Notice),

    /// An entity was persisted by one of the link stores.
    EntityCreated {
        entity: &'static str,
        id: DbId,
        timestamp: Timestamp,
    },

    /// An entity was deleted by one of the link stores.
    EntityDeleted {
        entity: &'static str,
        id: DbId,
        timestamp: Timestamp,
    },

    /// The multipart submission was accepted by the backend.
    SubmissionCompleted { timestamp: Timestamp },

    /// The multipart submission failed; the wizard data is retained.
    SubmissionFailed {
        message: String,
        timestamp: Timestamp,
    },
}

impl WizardEvent {
    pub fn step_changed(step: WizardStep, is_valid: bool) -> Self {
        Self::StepChanged {
            step,
            is_valid,
            timestamp: Utc::now(),
        }
    }

    pub fn entity_created(entity: &'static str, id: DbId) -> Self {
        Self::EntityCreated {
            entity,
            id,
            timestamp: Utc::now(),
        }
    }

    pub fn entity_deleted(entity: &'static str, id: DbId) -> Self {
        Self::EntityDeleted {
            entity,
            id,
            timestamp: Utc::now(),
        }
    }

    pub fn submission_completed() -> Self {
        Self::SubmissionCompleted {
            timestamp: Utc::now(),
        }
    }

    pub fn submission_failed(message: impl Into<String>) -> Self {
        Self::SubmissionFailed {
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// WizardBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus for one wizard instance.
///
/// Wraps a [`broadcast::Sender`] so any number of subscribers (a UI shell,
/// a logger, a test) can independently receive every published event.
#[derive(Clone)]
pub struct WizardBus {
    sender: broadcast::Sender<WizardEvent>,
}

impl WizardBus {
    /// Create a bus with a specific channel capacity. When the buffer is
    /// full the oldest unconsumed events are dropped and slow receivers
    /// observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to all events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<WizardEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all current subscribers. With zero subscribers
    /// the event is silently dropped.
    pub fn publish(&self, event: WizardEvent) {
        // Ignore the SendError -- it only means there are no receivers.
        let _ = self.sender.send(event);
    }

    /// Publish a user-facing notice.
    pub fn notify(&self, notice: Notice) {
        self.publish(WizardEvent::Notice(notice));
    }

    /// Number of active subscribers.
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for WizardBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = WizardBus::default();
        let mut rx = bus.subscribe();

        bus.publish(WizardEvent::step_changed(WizardStep::Images, true));
        bus.notify(Notice::info("heads up"));

        match rx.recv().await.unwrap() {
            WizardEvent::StepChanged { step, is_valid, .. } => {
                assert_eq!(step, WizardStep::Images);
                assert!(is_valid);
            }
            other => panic!("unexpected event: {other:?}"),
        }
        match rx.recv().await.unwrap() {
            WizardEvent::Notice(notice) => {
                assert_eq!(notice.severity, Severity::Info);
                assert_eq!(notice.message, "heads up");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn publishing_without_subscribers_does_not_error() {
        let bus = WizardBus::default();
        assert_eq!(bus.receiver_count(), 0);
        bus.publish(WizardEvent::submission_completed());
    }

    #[tokio::test]
    async fn clones_share_the_same_channel() {
        let bus = WizardBus::default();
        let clone = bus.clone();
        let mut rx = bus.subscribe();

        clone.publish(WizardEvent::entity_created("location", 42));

        match rx.recv().await.unwrap() {
            WizardEvent::EntityCreated { entity, id, .. } => {
                assert_eq!(entity, "location");
                assert_eq!(id, 42);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn notice_constructors_set_severity() {
        assert_eq!(Notice::info("a").severity, Severity::Info);
        assert_eq!(Notice::success("b").severity, Severity::Success);
        assert_eq!(Notice::error("c").severity, Severity::Error);
    }
}
