//! Schedule Form Component
//!
//! Adds a collection slot, or edits the one picked from the list.

use chrono::NaiveTime;
use leptos::prelude::*;
use panel_sync::{Day, ListItem, Record, Schedule};

use crate::context::AppContext;

fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw, "%H:%M").map_err(|_| format!("'{}' is not a time", raw))
}

#[component]
pub fn ScheduleForm(editing: RwSignal<Option<ListItem>>) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");

    let note = RwSignal::new(String::new());
    let barangay = RwSignal::new(String::new());
    let day = RwSignal::new(Day::Monday.as_str().to_string());
    let time_from = RwSignal::new(String::from("07:00"));
    let time_to = RwSignal::new(String::from("09:00"));
    let (form_error, set_form_error) = signal::<Option<String>>(None);

    let reset = move || {
        note.set(String::new());
        barangay.set(String::new());
        editing.set(None);
        set_form_error.set(None);
    };

    // Prefill when a row is picked for editing
    Effect::new(move |_| {
        let Some(item) = editing.get() else { return };
        match Schedule::from_item(&item) {
            Ok(s) => {
                note.set(s.note);
                barangay.set(s.barangay);
                day.set(s.day.as_str().to_string());
                time_from.set(s.time_from.format("%H:%M").to_string());
                time_to.set(s.time_to.format("%H:%M").to_string());
            }
            Err(e) => set_form_error.set(Some(e.to_string())),
        }
    });

    let read_form = move || -> Result<Schedule, String> {
        Ok(Schedule {
            note: note.get(),
            barangay: barangay.get(),
            day: Day::parse(&day.get()).ok_or_else(|| "pick a day".to_string())?,
            time_from: parse_time(&time_from.get())?,
            time_to: parse_time(&time_to.get())?,
            added_at: None,
        })
    };

    let save = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let result = read_form().and_then(|schedule| {
            let submitted = match editing.get_untracked() {
                Some(item) => ctx.update_record(&item.id, &schedule),
                None => ctx.create_record(&schedule),
            };
            submitted.map_err(|e| e.to_string())
        });
        match result {
            Ok(()) => reset(),
            Err(e) => set_form_error.set(Some(e)),
        }
    };

    view! {
        <form class="schedule-form" on:submit=save>
            <input
                type="text"
                placeholder="Barangay"
                prop:value=move || barangay.get()
                on:input=move |ev| barangay.set(event_target_value(&ev))
            />
            <input
                type="text"
                placeholder="Note"
                prop:value=move || note.get()
                on:input=move |ev| note.set(event_target_value(&ev))
            />
            <select prop:value=move || day.get() on:change=move |ev| day.set(event_target_value(&ev))>
                {Day::ALL.iter().map(|d| view! { <option value=d.as_str()>{d.as_str()}</option> }).collect_view()}
            </select>
            <input type="time" prop:value=move || time_from.get() on:input=move |ev| time_from.set(event_target_value(&ev)) />
            <input type="time" prop:value=move || time_to.get() on:input=move |ev| time_to.set(event_target_value(&ev)) />
            <button type="submit">{move || if editing.get().is_some() { "Save" } else { "Add" }}</button>
            {move || editing.get().is_some().then(|| view! {
                <button type="button" class="cancel-btn" on:click=move |_| reset()>"Cancel"</button>
            })}
            {move || form_error.get().map(|e| view! { <p class="form-error">{e}</p> })}
        </form>
    }
}
