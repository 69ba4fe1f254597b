use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vitach_core::{DomainResult, Record, UserId, require_non_empty};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Warning,
    Error,
    #[default]
    Info,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPriority {
    #[default]
    Normal,
    High,
}

/// A message addressed to one user, kept until deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub user_id: UserId,
    #[serde(default)]
    pub kind: NotificationKind,
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub read_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: NotificationPriority,
}

impl Notification {
    /// Error notifications are high priority.
    pub fn new(user_id: UserId, kind: NotificationKind, title: &str, message: &str) -> Self {
        Self {
            user_id,
            kind,
            title: title.to_string(),
            message: message.to_string(),
            read: false,
            read_at: None,
            priority: if kind == NotificationKind::Error {
                NotificationPriority::High
            } else {
                NotificationPriority::Normal
            },
        }
    }

    /// Returns `false` when it was already read.
    pub fn mark_read(&mut self, at: DateTime<Utc>) -> bool {
        if self.read {
            return false;
        }
        self.read = true;
        self.read_at = Some(at);
        true
    }
}

impl Record for Notification {
    const COLLECTION: &'static str = "notifications";

    fn validate(&self) -> DomainResult<()> {
        require_non_empty("title", &self.title)
    }
}

pub fn unread_count<'a>(notifications: impl IntoIterator<Item = &'a Notification>) -> usize {
    notifications.into_iter().filter(|n| !n.read).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_are_high_priority_and_read_once() {
        let user = UserId::new();
        let mut n = Notification::new(user, NotificationKind::Error, "Échec", "Stock introuvable");
        assert_eq!(n.priority, NotificationPriority::High);

        let info = Notification::new(user, NotificationKind::Info, "Info", "");
        assert_eq!(info.priority, NotificationPriority::Normal);
        assert_eq!(unread_count([&n, &info]), 2);

        let at = Utc::now();
        assert!(n.mark_read(at));
        assert!(!n.mark_read(Utc::now()));
        assert_eq!(n.read_at, Some(at));
        assert_eq!(unread_count([&n, &info]), 1);
    }
}
