use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmailNotification {
    Sent,
    Failed,
    NotRequested,
}

/// Outcome of the notifications attached to a create command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationStatus {
    pub email: EmailNotification,
}

impl NotificationStatus {
    pub fn not_requested() -> Self {
        Self {
            email: EmailNotification::NotRequested,
        }
    }
}
