//! Delete Confirm Button Component
//!
//! Inline delete confirmation driven by the panel's confirmation gate.

use leptos::prelude::*;
use panel_sync::CollectionKind;

use crate::context::AppContext;

/// Inline delete confirmation button
///
/// Shows a × button initially. When clicked, opens the panel's confirmation
/// for `item_id` and shows "Delete?" with ✓/✗ buttons. Only one row can be
/// asking at a time; opening another replaces it.
#[component]
pub fn DeleteConfirmButton(kind: CollectionKind, #[prop(into)] item_id: String) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let target = item_id.clone();
    let asking = move || ctx.pending_delete.get().as_deref() == Some(target.as_str());
    let asking_clone = asking.clone();

    view! {
        <Show when=move || !asking()>
            <button
                class="delete-btn"
                on:click={
                    let id = item_id.clone();
                    move |ev| {
                        ev.stop_propagation();
                        if let Err(e) = ctx.request_delete(kind, &id) {
                            tracing::warn!(error = %e, "delete request refused");
                        }
                    }
                }
            >
                "×"
            </button>
        </Show>
        <Show when=asking_clone>
            <span class="delete-confirm">
                <span class="delete-confirm-text">"Delete?"</span>
                <button
                    class="confirm-btn"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        if let Err(e) = ctx.confirm_delete(kind) {
                            tracing::warn!(error = %e, "delete not started");
                        }
                    }
                >
                    "✓"
                </button>
                <button
                    class="cancel-btn"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        ctx.cancel_delete(kind);
                    }
                >
                    "✗"
                </button>
            </span>
        </Show>
    }
}
