//! Messages the engine sends to the rest of the application.

use crossbeam_channel::{Receiver, Sender, unbounded};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }
}

/// Selection broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    /// Country under the pointer; empty when nothing is hovered.
    Hovered(String),
    Selected(String),
    SelectionCleared,
}

/// Sending half of the engine's channels. A dropped receiver is not an
/// error: nobody is listening.
#[derive(Debug, Clone)]
pub struct Outbox {
    notifications: Sender<Notification>,
    selection: Sender<SelectionEvent>,
}

/// Receiving half of [`Outbox::channel`].
#[derive(Debug, Clone)]
pub struct Inbox {
    pub notifications: Receiver<Notification>,
    pub selection: Receiver<SelectionEvent>,
}

impl Outbox {
    pub fn new(notifications: Sender<Notification>, selection: Sender<SelectionEvent>) -> Self {
        Self {
            notifications,
            selection,
        }
    }

    /// Unbounded outbox paired with its inbox.
    pub fn channel() -> (Self, Inbox) {
        let (notification_tx, notification_rx) = unbounded();
        let (selection_tx, selection_rx) = unbounded();
        (
            Self::new(notification_tx, selection_tx),
            Inbox {
                notifications: notification_rx,
                selection: selection_rx,
            },
        )
    }

    pub fn notify(&self, notification: Notification) {
        tracing::info!(severity = ?notification.severity, "{}", notification.message);
        if self.notifications.send(notification).is_err() {
            tracing::trace!("Notification dropped, receiver gone");
        }
    }

    pub fn broadcast(&self, event: SelectionEvent) {
        tracing::debug!(?event, "Selection event");
        if self.selection.send(event).is_err() {
            tracing::trace!("Selection event dropped, receiver gone");
        }
    }
}

impl Inbox {
    /// Everything queued so far on the selection channel.
    pub fn drain_selection(&self) -> Vec<SelectionEvent> {
        self.selection.try_iter().collect()
    }

    pub fn drain_notifications(&self) -> Vec<Notification> {
        self.notifications.try_iter().collect()
    }
}
