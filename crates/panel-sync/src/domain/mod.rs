//! Domain Layer
//!
//! List items as held by a panel, the remote collections the console edits,
//! and the typed records stored in them.

mod announcement;
mod collection;
mod feedback;
mod list_item;
mod notification;
mod record;
mod schedule;

pub use announcement::Announcement;
pub use collection::{CollectionKind, Operation};
pub use feedback::Feedback;
pub use list_item::{ListItem, Payload};
pub use notification::Notification;
pub use record::Record;
pub use schedule::{group_by_day, Day, Schedule};
