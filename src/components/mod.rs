//! UI Components
//!
//! Reusable Leptos components.

mod alert_bar;
mod announcement_form;
mod delete_confirm_button;
mod list_panel;
mod schedule_form;

pub use alert_bar::AlertBar;
pub use announcement_form::AnnouncementForm;
pub use delete_confirm_button::DeleteConfirmButton;
pub use list_panel::ListPanel;
pub use schedule_form::ScheduleForm;
