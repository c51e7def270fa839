//! Executor seam
//!
//! The core runs on a single cooperative event loop but never names the
//! executor. The browser shell plugs in `wasm-bindgen-futures` + `gloo-timers`,
//! native code and tests use [`TokioRuntime`] inside a `LocalSet`.

use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use futures::future::{AbortHandle, Abortable, LocalBoxFuture};

/// Single-threaded task spawner and timer source
pub trait Runtime {
    /// Run `task` on the current event loop without blocking the caller
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>);

    /// Future that completes after `duration`
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}

pub type SharedRuntime = Rc<dyn Runtime>;

/// Spawn `task` and return a handle that cancels it.
///
/// Once aborted the task is never polled again.
pub fn spawn_abortable<F>(runtime: &dyn Runtime, task: F) -> AbortHandle
where
    F: Future<Output = ()> + 'static,
{
    let (handle, registration) = AbortHandle::new_pair();
    let task = Abortable::new(task, registration);
    runtime.spawn_local(Box::pin(async move {
        let _ = task.await;
    }));
    handle
}

/// Tokio-backed runtime. `spawn_local` must be called from within a `LocalSet`.
#[cfg(feature = "tokio-runtime")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioRuntime;

#[cfg(feature = "tokio-runtime")]
impl TokioRuntime {
    pub fn shared() -> SharedRuntime {
        Rc::new(TokioRuntime)
    }
}

#[cfg(feature = "tokio-runtime")]
impl Runtime for TokioRuntime {
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        tokio::task::spawn_local(task);
    }

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}
