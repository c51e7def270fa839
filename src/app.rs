//! Waste Collection Console App
//!
//! Shell component: tab bar, alert bar and the active list panel.

use std::rc::Rc;

use leptos::prelude::*;
use panel_sync::{CollectionKind, Console, ConsoleConfig, MemoryRemote, RemoteStore};
use reactive_stores::Store;

use crate::components::{AlertBar, ListPanel};
use crate::context::{AppContext, SharedConsole};
use crate::runtime::BrowserRuntime;
use crate::store::{ConsoleState, ConsoleStore};

/// Bundled console settings; add a `firestore` section to go live
const CONSOLE_CONFIG: &str = include_str!("../console.json");

fn build_console() -> SharedConsole {
    let runtime = BrowserRuntime::shared();
    let config = ConsoleConfig::from_json_str(CONSOLE_CONFIG).unwrap_or_else(|e| {
        tracing::error!(error = %e, "bad console.json, using defaults");
        ConsoleConfig::default()
    });
    match Console::from_config(config, runtime.clone()) {
        Ok(console) => Rc::new(console),
        Err(e) => {
            tracing::error!(error = %e, "remote store unavailable, using in-memory store");
            let remote: Rc<dyn RemoteStore> = Rc::new(MemoryRemote::new());
            Rc::new(Console::new(ConsoleConfig::default(), remote, runtime))
        }
    }
}

#[component]
pub fn App() -> impl IntoView {
    let store: ConsoleStore = Store::new(ConsoleState::default());
    provide_context(store);

    let ctx = AppContext::new(build_console(), store);
    provide_context(ctx);

    // Mount the shown panel; switching tabs unmounts the previous one
    Effect::new(move |_| {
        let kind = ctx.active_kind.get();
        tracing::debug!(kind = ?kind, "showing panel");
        ctx.mount_only(kind);
    });

    on_cleanup(move || ctx.close_all());

    view! {
        <div class="app-layout">
            <nav class="panel-tab-bar">
                {CollectionKind::ALL.iter().map(|kind| {
                    let kind = *kind;
                    let tab_class = move || {
                        if ctx.active_kind.get() == kind { "panel-tab active" } else { "panel-tab" }
                    };
                    view! {
                        <button class=tab_class on:click=move |_| ctx.show(kind)>
                            {kind.default_collection_name()}
                        </button>
                    }
                }).collect_view()}
            </nav>

            <main class="main-content">
                <h1>"Waste Collection Console"</h1>
                {move || {
                    let kind = ctx.active_kind.get();
                    view! { <ListPanel kind=kind /> }
                }}
            </main>

            <AlertBar />
        </div>
    }
}
