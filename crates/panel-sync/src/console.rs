//! Console Shell Handle
//!
//! Owned by the application shell: holds the configuration, the remote
//! store and the one alert queue every panel reports through.

use std::rc::Rc;

use crate::config::ConsoleConfig;
use crate::domain::CollectionKind;
use crate::error::ConsoleResult;
use crate::panel::{Alert, AlertQueue, Panel};
use crate::remote::{FirestoreRemote, MemoryRemote, RemoteStore};
use crate::runtime::SharedRuntime;

pub struct Console<R: RemoteStore + ?Sized + 'static> {
    config: ConsoleConfig,
    remote: Rc<R>,
    runtime: SharedRuntime,
    alerts: AlertQueue,
}

impl<R: RemoteStore + ?Sized + 'static> Console<R> {
    pub fn new(config: ConsoleConfig, remote: Rc<R>, runtime: SharedRuntime) -> Self {
        let alerts = AlertQueue::new(runtime.clone(), config.alert_duration_ms);
        Self {
            config,
            remote,
            runtime,
            alerts,
        }
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn remote(&self) -> &Rc<R> {
        &self.remote
    }

    pub fn alerts(&self) -> &AlertQueue {
        &self.alerts
    }

    /// Mount the panel for `kind`; drop or `close` it to unmount
    pub fn open_panel(&self, kind: CollectionKind) -> Panel<R> {
        Panel::open(
            kind,
            self.config.collection_name(kind),
            &self.config.temp_id_prefix,
            self.remote.clone(),
            self.runtime.clone(),
            self.alerts.clone(),
        )
    }

    pub fn current_alert(&self) -> Option<Alert> {
        self.alerts.current()
    }

    pub fn dismiss_alert(&self) {
        self.alerts.hide();
    }
}

impl Console<dyn RemoteStore> {
    /// Firestore when configured, otherwise the in-memory store
    pub fn from_config(config: ConsoleConfig, runtime: SharedRuntime) -> ConsoleResult<Self> {
        config.validate()?;
        let remote: Rc<dyn RemoteStore> = match &config.firestore {
            Some(firestore) => {
                tracing::info!(project = %firestore.project_id, "using firestore backend");
                Rc::new(FirestoreRemote::new(firestore, runtime.clone())?)
            }
            None => {
                tracing::info!("no firestore configured, using in-memory store");
                Rc::new(MemoryRemote::new())
            }
        };
        Ok(Console::new(config, remote, runtime))
    }
}
