//! User-facing notifications raised by the prediction pipeline.
//!
//! The pipeline only emits; rendering them (toasts, stderr lines) is the
//! collaborator's job.

use std::sync::Mutex;

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum NotificationLevel {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub description: Option<String>,
}

impl Notification {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            title: title.into(),
            description: Some(description.into()),
        }
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            title: title.into(),
            description: None,
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            title: title.into(),
            description: Some(description.into()),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Keeps every notification in memory, for collaborators that drain them
/// after each call.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    received: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Notification> {
        let mut guard = match self.received.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::take(&mut *guard)
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        match self.received.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn count(&self, level: NotificationLevel) -> usize {
        self.snapshot()
            .iter()
            .filter(|notification| notification.level == level)
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        let mut guard = match self.received.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_notifier_counts_by_level_and_drains() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Notification::warning("offline"));
        notifier.notify(Notification::success("done", "all good"));
        notifier.notify(Notification::warning("offline again"));

        assert_eq!(notifier.count(NotificationLevel::Warning), 2);
        assert_eq!(notifier.count(NotificationLevel::Success), 1);

        let drained = notifier.take();
        assert_eq!(drained.len(), 3);
        assert_eq!(drained[0].title, "offline");
        assert!(notifier.snapshot().is_empty());
    }
}
