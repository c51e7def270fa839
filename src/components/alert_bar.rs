//! Alert Bar Component
//!
//! Snackbar for the shell's single alert slot.

use leptos::prelude::*;
use panel_sync::AlertKind;

use crate::context::AppContext;
use crate::store::{use_console_store, ConsoleStateStoreFields};

#[component]
pub fn AlertBar() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let store = use_console_store();

    move || {
        store.alert().get().map(|alert| {
            let class = match alert.kind {
                AlertKind::Success => "alert-bar alert-success",
                AlertKind::Error => "alert-bar alert-error",
                AlertKind::Info => "alert-bar alert-info",
            };
            view! {
                <div class=class role="status">
                    <span class="alert-message">{alert.message}</span>
                    <button class="alert-close" on:click=move |_| ctx.dismiss_alert()>"×"</button>
                </div>
            }
        })
    }
}
