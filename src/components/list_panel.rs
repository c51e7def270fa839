//! List Panel Component
//!
//! Renders one collection as the panel core displays it. Rows still waiting
//! on the remote store are dimmed and cannot be edited yet.

use leptos::prelude::*;
use panel_sync::domain::group_by_day;
use panel_sync::{CollectionKind, Feedback, ListItem, Notification, Operation, Record, Schedule};

use super::{AnnouncementForm, DeleteConfirmButton, ScheduleForm};
use crate::context::AppContext;
use crate::store::{store_items, use_console_store};

/// Title and detail line for one row
fn summarize(kind: CollectionKind, item: &ListItem) -> (String, String) {
    match kind {
        CollectionKind::Announcements => (
            item.str_field("announcement").unwrap_or_default().to_string(),
            item.str_field("postedAt").unwrap_or_default().to_string(),
        ),
        CollectionKind::Notifications => match Notification::from_item(item) {
            Ok(n) => (
                n.message,
                format!(
                    "Point {}{}",
                    n.gb_point,
                    n.timestamp.map(|t| format!(" · {}", t.format("%b %d %H:%M"))).unwrap_or_default()
                ),
            ),
            Err(_) => (item.id.clone(), String::new()),
        },
        CollectionKind::Schedules => match Schedule::from_item(item) {
            Ok(s) => (
                format!("{} ({})", s.barangay, s.note),
                format!("{} - {}", s.time_from.format("%H:%M"), s.time_to.format("%H:%M")),
            ),
            Err(_) => (item.id.clone(), String::new()),
        },
        CollectionKind::Feedbacks => match Feedback::from_item(item) {
            Ok(f) => (f.message, f.sender.unwrap_or_else(|| "Anonymous".to_string())),
            Err(_) => (item.id.clone(), String::new()),
        },
    }
}

#[component]
fn ListRow(
    kind: CollectionKind,
    item: ListItem,
    #[prop(optional)] editing: Option<RwSignal<Option<ListItem>>>,
) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let pending = ctx.is_temporary(kind, &item.id);
    let (title, detail) = summarize(kind, &item);
    let row_class = if pending { "list-row pending" } else { "list-row" };
    let id = item.id.clone();

    view! {
        <div class=row_class>
            <span class="row-title">{title}</span>
            <span class="row-detail">{detail}</span>
            {editing.filter(|_| !pending).map(|editing| view! {
                <button class="edit-btn" on:click=move |_| editing.set(Some(item.clone()))>"Edit"</button>
            })}
            {(kind.allows(Operation::Delete) && !pending).then(|| view! {
                <DeleteConfirmButton kind=kind item_id=id />
            })}
        </div>
    }
}

/// One collection panel with its form, if the collection accepts creates
#[component]
pub fn ListPanel(kind: CollectionKind) -> impl IntoView {
    let store = use_console_store();
    let items = Memo::new(move |_| store_items(&store, kind));
    let editing = RwSignal::new(None::<ListItem>);

    let form = match kind {
        CollectionKind::Announcements => Some(view! { <AnnouncementForm editing=editing /> }.into_any()),
        CollectionKind::Schedules => Some(view! { <ScheduleForm editing=editing /> }.into_any()),
        CollectionKind::Notifications | CollectionKind::Feedbacks => None,
    };

    let rows = move || {
        let items = items.get();
        if kind == CollectionKind::Schedules {
            group_by_day(&items)
                .into_iter()
                .map(|(day, items)| view! {
                    <section class="day-group">
                        <h3>{day.as_str()}</h3>
                        {items.into_iter().map(|item| view! {
                            <ListRow kind=kind item=item editing=editing />
                        }).collect_view()}
                    </section>
                })
                .collect_view()
                .into_any()
        } else if kind.allows(Operation::Update) {
            items
                .into_iter()
                .map(|item| view! { <ListRow kind=kind item=item editing=editing /> })
                .collect_view()
                .into_any()
        } else {
            items
                .into_iter()
                .map(|item| view! { <ListRow kind=kind item=item /> })
                .collect_view()
                .into_any()
        }
    };

    view! {
        <section class="list-panel">
            {form}
            <div class="list-rows">{rows}</div>
            <p class="item-count">{move || format!("{} {}", items.get().len(), kind.default_collection_name().to_lowercase())}</p>
        </section>
    }
}
