//! Browser event loop for the panel core

use std::rc::Rc;
use std::time::Duration;

use futures::future::LocalBoxFuture;
use panel_sync::{Runtime, SharedRuntime};

#[derive(Clone, Copy, Default)]
pub struct BrowserRuntime;

impl BrowserRuntime {
    pub fn shared() -> SharedRuntime {
        Rc::new(BrowserRuntime)
    }
}

impl Runtime for BrowserRuntime {
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        Box::pin(gloo_timers::future::sleep(duration))
    }
}
