use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EntryKind, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
}

/// What a notification reports on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Created,
    Updated,
    Deleted,
    ValidationFailed,
    FetchFailed,
    InsertFailed,
    UpdateFailed,
    DeleteFailed,
    EditNotActive,
    EntryNotFound,
}

/// A user-facing alert produced from the outcome of a catalog operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub kind: NotificationKind,
    pub message: String,
    pub issued_at: DateTime<Utc>,
}

fn capitalized(kind: EntryKind) -> &'static str {
    match kind {
        EntryKind::Meal => "Meal",
        EntryKind::Drink => "Drink",
    }
}

impl Notification {
    fn new(level: NotificationLevel, kind: NotificationKind, message: String) -> Self {
        Self {
            level,
            kind,
            message,
            issued_at: Utc::now(),
        }
    }

    pub fn created(kind: EntryKind) -> Self {
        Self::new(
            NotificationLevel::Success,
            NotificationKind::Created,
            format!("{} added successfully", capitalized(kind)),
        )
    }

    pub fn updated(kind: EntryKind) -> Self {
        Self::new(
            NotificationLevel::Success,
            NotificationKind::Updated,
            format!("{} updated successfully", capitalized(kind)),
        )
    }

    pub fn deleted(kind: EntryKind) -> Self {
        Self::new(
            NotificationLevel::Success,
            NotificationKind::Deleted,
            format!("{} deleted successfully", capitalized(kind)),
        )
    }

    /// Convert a failed operation into the alert shown to the user
    pub fn from_error(error: &StoreError) -> Self {
        let (kind, message) = match error {
            StoreError::Validation { message } => (
                NotificationKind::ValidationFailed,
                format!("Please fill in all fields correctly. {}", message),
            ),
            StoreError::Fetch { kind, source } => (
                NotificationKind::FetchFailed,
                format!("Error fetching {}s: {}", kind, source),
            ),
            StoreError::Insert { kind, source } => (
                NotificationKind::InsertFailed,
                format!("Error adding {}: {}", kind, source),
            ),
            StoreError::Update { kind, source, .. } => (
                NotificationKind::UpdateFailed,
                format!("Error updating {}: {}", kind, source),
            ),
            StoreError::Delete { kind, source, .. } => (
                NotificationKind::DeleteFailed,
                format!("Error deleting {}: {}", kind, source),
            ),
            StoreError::NoActiveEdit { kind, id } => (
                NotificationKind::EditNotActive,
                format!("{} {} is not being edited", capitalized(*kind), id),
            ),
            StoreError::EntryNotFound { kind, id } => (
                NotificationKind::EntryNotFound,
                format!("{} {} was not found", capitalized(*kind), id),
            ),
        };

        Self::new(NotificationLevel::Error, kind, message)
    }

    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}
