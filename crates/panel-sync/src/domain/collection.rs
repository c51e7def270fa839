//! Collection Kinds
//!
//! The remote collections behind each console panel, which mutations each
//! one accepts, and the operator-facing outcome messages.

use serde::{Deserialize, Serialize};

/// Mutation kinds a panel can issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CollectionKind {
    Announcements,
    Notifications,
    Schedules,
    /// Residents' feedback, read only
    Feedbacks,
}

const GENERIC_FAILURE: &str = "Something went wrong.";

impl CollectionKind {
    pub const ALL: [CollectionKind; 4] = [
        CollectionKind::Announcements,
        CollectionKind::Notifications,
        CollectionKind::Schedules,
        CollectionKind::Feedbacks,
    ];

    /// Remote collection name used unless the config overrides it
    pub fn default_collection_name(&self) -> &'static str {
        match self {
            CollectionKind::Announcements => "Announcements",
            CollectionKind::Notifications => "Notifications",
            CollectionKind::Schedules => "Schedules",
            CollectionKind::Feedbacks => "Feedbacks",
        }
    }

    /// Singular, lowercase name for log lines and messages
    pub fn label(&self) -> &'static str {
        match self {
            CollectionKind::Announcements => "announcement",
            CollectionKind::Notifications => "notification",
            CollectionKind::Schedules => "schedule",
            CollectionKind::Feedbacks => "feedback",
        }
    }

    pub fn allows(&self, op: Operation) -> bool {
        match self {
            CollectionKind::Announcements | CollectionKind::Schedules => true,
            CollectionKind::Notifications => op == Operation::Delete,
            CollectionKind::Feedbacks => false,
        }
    }

    /// Field stamped with the server-side creation time on create
    pub fn created_at_field(&self) -> Option<&'static str> {
        match self {
            CollectionKind::Announcements => Some("postedAt"),
            CollectionKind::Schedules => Some("addedAt"),
            CollectionKind::Notifications | CollectionKind::Feedbacks => None,
        }
    }

    /// Fields holding instants, stored as native timestamps by the remote
    pub fn timestamp_fields(&self) -> &'static [&'static str] {
        match self {
            CollectionKind::Announcements => &["postedAt"],
            CollectionKind::Notifications => &["TimeStamp"],
            CollectionKind::Schedules => &["addedAt"],
            CollectionKind::Feedbacks => &["sentAt"],
        }
    }

    pub fn success_message(&self, op: Operation) -> &'static str {
        match (self, op) {
            (CollectionKind::Announcements, Operation::Create) => {
                "Announcement has been posted successfully."
            }
            (CollectionKind::Announcements, Operation::Update) => {
                "Announcement has been updated successfully."
            }
            (CollectionKind::Announcements, Operation::Delete) => {
                "Announcement has been deleted successfully."
            }
            (CollectionKind::Schedules, Operation::Create) => "Schedule added successfully.",
            (CollectionKind::Schedules, Operation::Update) => "Schedule Updated Successfully",
            (CollectionKind::Schedules, Operation::Delete) => "Schedule Deleted Successfully",
            (CollectionKind::Notifications, Operation::Delete) => "Notification has been deleted.",
            _ => "Done.",
        }
    }

    pub fn failure_message(&self, op: Operation) -> &'static str {
        match (self, op) {
            (CollectionKind::Schedules, Operation::Create) => {
                "Failed to add schedule. Please try again."
            }
            (CollectionKind::Schedules, Operation::Update) => {
                "Failed to update schedule. Please try again."
            }
            (CollectionKind::Schedules, Operation::Delete) => {
                "Failed to delete schedule. Please try again."
            }
            _ => GENERIC_FAILURE,
        }
    }
}
