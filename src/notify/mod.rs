//! In-app notification queue with timed auto-dismissal.
//!
//! Transient messages (toasts) surfaced by the HTTP layer and the session
//! manager land here. The queue preserves insertion order; each notification
//! with a non-zero duration schedules exactly one deferred removal, and
//! removal is idempotent so a manual dismissal racing the timer is harmless.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;

/// Default display duration for info notifications.
pub const INFO_DURATION: Duration = Duration::from_millis(3000);
/// Default display duration for success notifications.
pub const SUCCESS_DURATION: Duration = Duration::from_millis(3000);
/// Default display duration for warning notifications.
pub const WARNING_DURATION: Duration = Duration::from_millis(4000);
/// Default display duration for error notifications.
pub const ERROR_DURATION: Duration = Duration::from_millis(5000);

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Info => "info",
            NotificationKind::Success => "success",
            NotificationKind::Warning => "warning",
            NotificationKind::Error => "error",
        }
    }
}

/// Unique notification id: wall-clock milliseconds with a random suffix so
/// ids minted within the same millisecond stay distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotificationId(u64);

impl NotificationId {
    fn next() -> Self {
        let millis = Utc::now().timestamp_millis() as u64;
        NotificationId((millis << 16) | u64::from(rand::random::<u16>()))
    }
}

/// A single queued notification.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub message: String,
    /// Zero means the notification persists until manually dismissed.
    pub duration: Duration,
}

/// Cloneable handle to the process-wide notification queue.
#[derive(Clone, Default)]
pub struct NotificationBus {
    queue: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a notification and schedule its removal when `duration` is
    /// non-zero. Returns the id for manual dismissal.
    pub fn push(
        &self,
        kind: NotificationKind,
        message: impl Into<String>,
        duration: Duration,
    ) -> NotificationId {
        let notification = Notification {
            id: NotificationId::next(),
            kind,
            message: message.into(),
            duration,
        };
        let id = notification.id;
        self.queue.lock().push(notification);

        if !duration.is_zero() {
            let bus = self.clone();
            tokio::spawn(async move {
                tokio::time::sleep(duration).await;
                bus.dismiss(id);
            });
        }

        id
    }

    /// Remove a notification by id. Dismissing an id that is already gone is
    /// a no-op: the auto-dismiss timer and a manual dismissal may race.
    pub fn dismiss(&self, id: NotificationId) {
        let mut queue = self.queue.lock();
        if let Some(pos) = queue.iter().position(|n| n.id == id) {
            queue.remove(pos);
        }
    }

    /// Empty the queue. In-flight timers become no-ops.
    pub fn clear(&self) {
        self.queue.lock().clear();
    }

    /// Current queue contents, in insertion order.
    pub fn snapshot(&self) -> Vec<Notification> {
        self.queue.lock().clone()
    }

    /// Take the queue contents, leaving it empty.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.queue.lock())
    }

    pub fn info(&self, message: impl Into<String>) -> NotificationId {
        self.push(NotificationKind::Info, message, INFO_DURATION)
    }

    pub fn success(&self, message: impl Into<String>) -> NotificationId {
        self.push(NotificationKind::Success, message, SUCCESS_DURATION)
    }

    pub fn warning(&self, message: impl Into<String>) -> NotificationId {
        self.push(NotificationKind::Warning, message, WARNING_DURATION)
    }

    pub fn error(&self, message: impl Into<String>) -> NotificationId {
        self.push(NotificationKind::Error, message, ERROR_DURATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn preserves_insertion_order() {
        let bus = NotificationBus::new();
        bus.push(NotificationKind::Info, "first", Duration::ZERO);
        bus.push(NotificationKind::Error, "second", Duration::ZERO);
        bus.push(NotificationKind::Success, "third", Duration::ZERO);

        let queue = bus.snapshot();
        let messages: Vec<&str> = queue.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn zero_duration_is_never_auto_dismissed() {
        let bus = NotificationBus::new();
        bus.push(NotificationKind::Warning, "sticky", Duration::ZERO);

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(bus.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn auto_dismisses_after_duration() {
        let bus = NotificationBus::new();
        bus.push(NotificationKind::Info, "fleeting", Duration::from_millis(20));

        assert_eq!(bus.snapshot().len(), 1);
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(bus.snapshot().is_empty());
    }

    #[tokio::test]
    async fn dismiss_is_idempotent() {
        let bus = NotificationBus::new();
        let id = bus.push(NotificationKind::Error, "boom", Duration::ZERO);

        bus.dismiss(id);
        bus.dismiss(id);
        assert!(bus.snapshot().is_empty());
    }

    #[tokio::test]
    async fn clear_empties_queue_while_timers_noop() {
        let bus = NotificationBus::new();
        bus.push(NotificationKind::Info, "a", Duration::from_millis(20));
        bus.push(NotificationKind::Info, "b", Duration::ZERO);

        bus.clear();
        assert!(bus.snapshot().is_empty());

        // Let the pending timer fire against the emptied queue.
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(bus.snapshot().is_empty());
    }

    #[tokio::test]
    async fn convenience_variants_set_kind_and_duration() {
        let bus = NotificationBus::new();
        bus.info("i");
        bus.success("s");
        bus.warning("w");
        bus.error("e");

        let queue = bus.snapshot();
        assert_eq!(queue[0].kind, NotificationKind::Info);
        assert_eq!(queue[0].duration, INFO_DURATION);
        assert_eq!(queue[2].kind, NotificationKind::Warning);
        assert_eq!(queue[2].duration, WARNING_DURATION);
        assert_eq!(queue[3].kind, NotificationKind::Error);
        assert_eq!(queue[3].duration, ERROR_DURATION);
    }

    #[tokio::test]
    async fn drain_takes_everything() {
        let bus = NotificationBus::new();
        bus.info("one");
        bus.warning("two");

        let drained = bus.drain();
        assert_eq!(drained.len(), 2);
        assert!(bus.snapshot().is_empty());
    }
}
