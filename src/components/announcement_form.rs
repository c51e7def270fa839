//! Announcement Form Component
//!
//! Posts a new announcement, or edits the one picked from the list.

use leptos::prelude::*;
use panel_sync::{Announcement, ListItem, Record};

use crate::context::AppContext;

#[component]
pub fn AnnouncementForm(editing: RwSignal<Option<ListItem>>) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");

    let (text, set_text) = signal(String::new());
    let (form_error, set_form_error) = signal::<Option<String>>(None);

    let reset = move || {
        set_text.set(String::new());
        editing.set(None);
        set_form_error.set(None);
    };

    // Prefill when a row is picked for editing
    Effect::new(move |_| {
        let Some(item) = editing.get() else { return };
        match Announcement::from_item(&item) {
            Ok(a) => set_text.set(a.announcement),
            Err(e) => set_form_error.set(Some(e.to_string())),
        }
    });

    let post = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let announcement = Announcement::new(text.get());
        let result = match editing.get_untracked() {
            Some(item) => ctx.update_record(&item.id, &announcement),
            None => ctx.create_record(&announcement),
        };
        match result {
            Ok(()) => reset(),
            Err(e) => set_form_error.set(Some(e.to_string())),
        }
    };

    view! {
        <form class="announcement-form" on:submit=post>
            <textarea
                placeholder="Write an announcement..."
                prop:value=move || text.get()
                on:input=move |ev| set_text.set(event_target_value(&ev))
            />
            <button type="submit">{move || if editing.get().is_some() { "Update" } else { "Post" }}</button>
            {move || editing.get().is_some().then(|| view! {
                <button type="button" class="cancel-btn" on:click=move |_| reset()>"Cancel"</button>
            })}
            {move || form_error.get().map(|e| view! { <p class="form-error">{e}</p> })}
        </form>
    }
}
