//! Panel Integration Tests
//!
//! Panels against the in-memory remote on a paused tokio clock.

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use serde_json::json;
    use tokio::task::LocalSet;

    use crate::domain::{CollectionKind, Payload, Record, Schedule};
    use crate::error::{ConsoleError, RemoteError};
    use crate::panel::{Alert, AlertKind, AlertQueue, GateState, MutationOutcome, Panel};
    use crate::remote::{MemoryRemote, RemoteDocument};
    use crate::runtime::TokioRuntime;
    use crate::{Console, ConsoleConfig};

    fn payload(value: serde_json::Value) -> Payload {
        value.as_object().cloned().unwrap_or_default()
    }

    fn schedule(note: &str) -> Payload {
        payload(json!({
            "note": note,
            "barangay": "San Isidro",
            "day": "Monday",
            "timeF": "07:00",
            "timeT": "09:00",
        }))
    }

    /// Let spawned local tasks (subscription pumps, timers) run
    async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    fn console(remote: &Rc<MemoryRemote>) -> Console<MemoryRemote> {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
        Console::new(ConsoleConfig::default(), remote.clone(), TokioRuntime::shared())
    }

    fn notes(panel: &Panel<MemoryRemote>) -> Vec<String> {
        panel
            .list()
            .iter()
            .map(|i| i.str_field("note").unwrap_or_default().to_string())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshots_replace_without_duplicates() {
        LocalSet::new()
            .run_until(async {
                let remote = Rc::new(MemoryRemote::new());
                remote.seed(
                    "Schedules",
                    vec![
                        RemoteDocument::new("a1", schedule("Trash Day")),
                        RemoteDocument::new("b2", schedule("Recycling")),
                    ],
                );
                let console = console(&remote);
                let panel = console.open_panel(CollectionKind::Schedules);
                settle().await;
                assert_eq!(notes(&panel), vec!["Trash Day", "Recycling"]);

                // Same id re-delivered with changed fields, another removed
                remote.put("Schedules", "a1", schedule("Trash Pickup"));
                remote.remove("Schedules", "b2");
                settle().await;

                assert_eq!(notes(&panel), vec!["Trash Pickup"]);
                assert_eq!(panel.list().len(), 1);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_update_rolls_back_to_identical_store() {
        LocalSet::new()
            .run_until(async {
                let remote = Rc::new(MemoryRemote::new());
                remote.seed("Schedules", vec![RemoteDocument::new("a1", schedule("Trash Day"))]);
                let console = console(&remote);
                let panel = console.open_panel(CollectionKind::Schedules);
                settle().await;
                let before = panel.list();

                remote.fail_next_write(RemoteError::Rejected("permission denied".into()));
                let write = panel
                    .update("a1", payload(json!({ "note": "Trash Pickup" })))
                    .expect("valid update");
                assert_eq!(notes(&panel), vec!["Trash Pickup"]);

                let result = write.await;
                assert!(matches!(result, Err(ConsoleError::RemoteWriteFailure(_))));
                assert_eq!(panel.list(), before);

                let alert = panel.current_alert().expect("error alert");
                assert_eq!(alert.kind, AlertKind::Error);
                assert_eq!(alert.message, "Failed to update schedule. Please try again.");
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_superseded_once_when_ack_first() {
        LocalSet::new()
            .run_until(async {
                let remote = Rc::new(MemoryRemote::new());
                let console = console(&remote);
                let panel = console.open_panel(CollectionKind::Schedules);
                settle().await;

                let write = panel.create(schedule("New Route")).expect("valid create");
                let optimistic = panel.list();
                assert_eq!(optimistic.len(), 1);
                assert!(panel.is_temporary(&optimistic[0].id));
                assert!(optimistic[0].field("addedAt").is_some());

                let outcome = write.await.expect("create succeeds");
                let MutationOutcome::Created { id } = outcome else {
                    panic!("expected a create outcome");
                };
                settle().await;

                let items = panel.list();
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].id, id);
                assert_eq!(
                    panel.current_alert().map(|a| a.message),
                    Some("Schedule added successfully.".to_string())
                );
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_superseded_once_when_snapshot_first() {
        LocalSet::new()
            .run_until(async {
                let remote = Rc::new(MemoryRemote::new());
                let console = console(&remote);
                let panel = console.open_panel(CollectionKind::Announcements);
                settle().await;

                remote.hold_acks();
                let write = panel
                    .create(payload(json!({ "announcement": "No pickup on holidays" })))
                    .expect("valid create");
                let handle = tokio::task::spawn_local(write);
                settle().await;

                // Server snapshot already carries the new document
                assert_eq!(remote.documents("Announcements").len(), 1);
                assert_eq!(panel.list().len(), 2);

                remote.release_acks();
                let outcome = handle.await.expect("task").expect("create succeeds");
                settle().await;

                let items = panel.list();
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].id, outcome.id());
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_update_takes_precedence_over_snapshot() {
        LocalSet::new()
            .run_until(async {
                let remote = Rc::new(MemoryRemote::new());
                remote.seed("Schedules", vec![RemoteDocument::new("a1", schedule("Trash Day"))]);
                let console = console(&remote);
                let panel = console.open_panel(CollectionKind::Schedules);
                settle().await;

                remote.hold_acks();
                let write = panel
                    .update("a1", payload(json!({ "note": "Mine" })))
                    .expect("valid update");
                let handle = tokio::task::spawn_local(write);
                settle().await;

                // Another operator writes while ours is unacknowledged
                remote.put("Schedules", "a1", schedule("Theirs"));
                settle().await;
                assert_eq!(notes(&panel), vec!["Mine"]);

                remote.release_acks();
                handle.await.expect("task").expect("update succeeds");
                assert_eq!(notes(&panel), vec!["Mine"]);

                // Next snapshot is authoritative again
                remote.put("Schedules", "a1", schedule("Later"));
                settle().await;
                assert_eq!(notes(&panel), vec!["Later"]);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_ids_sharing_temp_prefix_are_editable() {
        LocalSet::new()
            .run_until(async {
                let remote = Rc::new(MemoryRemote::new());
                remote.seed(
                    "Announcements",
                    vec![RemoteDocument::new(
                        "pending-review",
                        payload(json!({ "announcement": "Draft" })),
                    )],
                );
                let console = console(&remote);
                let panel = console.open_panel(CollectionKind::Announcements);
                settle().await;
                assert!(!panel.is_temporary("pending-review"));

                let write = panel
                    .update("pending-review", payload(json!({ "announcement": "Final" })))
                    .expect("real id accepted");
                write.await.expect("update succeeds");

                panel.request_delete("pending-review").expect("valid request");
                let write = panel.confirm_delete().expect("valid").expect("pending request");
                write.await.expect("delete succeeds");
                settle().await;

                assert_eq!(remote.write_count(), 2);
                assert!(remote.documents("Announcements").is_empty());
                assert!(panel.list().is_empty());
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_delete_changes_nothing() {
        LocalSet::new()
            .run_until(async {
                let remote = Rc::new(MemoryRemote::new());
                remote.seed("Schedules", vec![RemoteDocument::new("a1", schedule("Trash Day"))]);
                let console = console(&remote);
                let panel = console.open_panel(CollectionKind::Schedules);
                settle().await;
                let before = panel.list();

                panel.request_delete("a1").expect("valid request");
                assert_eq!(panel.pending_delete().map(|r| r.target_id), Some("a1".to_string()));
                panel.cancel_delete();

                assert!(panel.pending_delete().is_none());
                assert_eq!(panel.list(), before);
                assert_eq!(remote.write_count(), 0);
                assert!(panel.confirm_delete().expect("idle confirm").is_none());
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmed_delete_failure_restores_item() {
        LocalSet::new()
            .run_until(async {
                let remote = Rc::new(MemoryRemote::new());
                remote.seed("Schedules", vec![RemoteDocument::new("a1", schedule("Trash Day"))]);
                let console = console(&remote);
                let panel = console.open_panel(CollectionKind::Schedules);
                settle().await;
                let before = panel.list();

                remote.fail_next_write(RemoteError::Transport("offline".into()));
                panel.request_delete("a1").expect("valid request");
                let write = panel.confirm_delete().expect("valid").expect("pending request");
                assert!(panel.list().is_empty());
                assert!(panel.pending_delete().is_none());

                assert!(write.await.is_err());
                assert_eq!(panel.list(), before);
                let alert = panel.current_alert().expect("alert");
                assert_eq!(alert.kind, AlertKind::Error);
                assert_eq!(alert.message, "Failed to delete schedule. Please try again.");
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmed_delete_success() {
        LocalSet::new()
            .run_until(async {
                let remote = Rc::new(MemoryRemote::new());
                remote.seed(
                    "Announcements",
                    vec![RemoteDocument::new("n1", payload(json!({ "announcement": "Hi" })))],
                );
                let console = console(&remote);
                let panel = console.open_panel(CollectionKind::Announcements);
                settle().await;

                panel.request_delete("n1").expect("valid request");
                let write = panel.confirm_delete().expect("valid").expect("pending request");
                let outcome = write.await.expect("delete succeeds");
                settle().await;

                assert_eq!(outcome, MutationOutcome::Deleted { id: "n1".to_string() });
                assert!(panel.list().is_empty());
                assert!(remote.documents("Announcements").is_empty());
                let alert = panel.current_alert().expect("alert");
                assert_eq!(alert.kind, AlertKind::Success);
                assert_eq!(alert.message, "Announcement has been deleted successfully.");
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmation_listener_follows_gate() {
        LocalSet::new()
            .run_until(async {
                let remote = Rc::new(MemoryRemote::new());
                remote.seed(
                    "Announcements",
                    vec![RemoteDocument::new("n1", payload(json!({ "announcement": "Hi" })))],
                );
                let console = console(&remote);
                let panel = console.open_panel(CollectionKind::Announcements);
                let seen = Rc::new(RefCell::new(Vec::new()));
                let sink = seen.clone();
                panel.on_confirmation_change(move |state| {
                    sink.borrow_mut().push(match state {
                        GateState::Pending(request) => Some(request.target_id.clone()),
                        GateState::Idle => None,
                    });
                });
                settle().await;

                panel.request_delete("n1").expect("valid request");
                let write = panel.confirm_delete().expect("valid").expect("pending request");
                // Reopened on the same item while its delete is still in flight
                panel.request_delete("n1").expect("valid request");
                assert!(panel.pending_delete().is_some());

                write.await.expect("delete succeeds");
                settle().await;

                assert!(panel.pending_delete().is_none());
                assert_eq!(
                    *seen.borrow(),
                    vec![Some("n1".to_string()), None, Some("n1".to_string()), None]
                );

                panel.cancel_delete();
                assert_eq!(seen.borrow().len(), 4);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_arguments_never_reach_remote_or_alerts() {
        LocalSet::new()
            .run_until(async {
                let remote = Rc::new(MemoryRemote::new());
                let console = console(&remote);
                let schedules = console.open_panel(CollectionKind::Schedules);
                let notifications = console.open_panel(CollectionKind::Notifications);
                settle().await;

                assert!(matches!(
                    schedules.update("", schedule("x")),
                    Err(ConsoleError::InvalidArgument(_))
                ));
                assert!(schedules.request_delete("  ").is_err());
                assert!(notifications.create(payload(json!({ "Message": "x" }))).is_err());
                assert!(notifications.update("n1", payload(json!({ "Message": "x" }))).is_err());

                let mut bad = Schedule::from_payload(&schedule("x")).expect("schedule payload");
                bad.time_to = bad.time_from;
                assert!(schedules.create_record(&bad).is_err());

                assert_eq!(remote.write_count(), 0);
                assert!(console.current_alert().is_none());
                assert!(schedules.list().is_empty());
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_alert_expires_and_resets() {
        LocalSet::new()
            .run_until(async {
                let alerts = AlertQueue::new(TokioRuntime::shared(), 3000);
                alerts.show(Alert::success("Saved", 3000));

                tokio::time::advance(Duration::from_millis(2999)).await;
                settle().await;
                assert!(alerts.current().is_some());

                tokio::time::advance(Duration::from_millis(1)).await;
                settle().await;
                assert!(alerts.current().is_none());

                // A second show restarts the timer instead of stacking
                alerts.show(Alert::info("first", 3000));
                tokio::time::advance(Duration::from_millis(2000)).await;
                settle().await;
                alerts.show(Alert::error("second", 3000));
                tokio::time::advance(Duration::from_millis(2000)).await;
                settle().await;
                assert_eq!(alerts.current().map(|a| a.message), Some("second".to_string()));

                tokio::time::advance(Duration::from_millis(1000)).await;
                settle().await;
                assert!(alerts.current().is_none());

                alerts.show(Alert::info("manual", 3000));
                alerts.hide();
                assert!(alerts.current().is_none());
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscription_failure_surfaces_once_and_recovers() {
        LocalSet::new()
            .run_until(async {
                let remote = Rc::new(MemoryRemote::new());
                remote.seed("Schedules", vec![RemoteDocument::new("a1", schedule("Trash Day"))]);
                let console = console(&remote);
                let panel = console.open_panel(CollectionKind::Schedules);
                settle().await;

                remote.interrupt("Schedules", RemoteError::Transport("socket closed".into()));
                settle().await;
                let alert = console.current_alert().expect("alert");
                assert_eq!(alert.kind, AlertKind::Info);
                assert_eq!(alert.message, "Connection to Schedules lost. Retrying...");
                console.dismiss_alert();

                remote.interrupt("Schedules", RemoteError::Transport("still down".into()));
                settle().await;
                assert!(console.current_alert().is_none());
                let status = panel.subscription_status().expect("subscribed");
                assert!(matches!(status.error(), Some(ConsoleError::SubscriptionFailure(_))));
                assert_eq!(notes(&panel), vec!["Trash Day"]);

                remote.resync("Schedules");
                settle().await;
                let status = panel.subscription_status().expect("subscribed");
                assert!(status.active);
                assert!(status.last_error.is_none());
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_stops_deliveries_and_orphans_writes() {
        LocalSet::new()
            .run_until(async {
                let remote = Rc::new(MemoryRemote::new());
                let console = console(&remote);
                let panel = console.open_panel(CollectionKind::Schedules);
                let seen = Rc::new(std::cell::Cell::new(0));
                let counter = seen.clone();
                panel.on_change(move |_| counter.set(counter.get() + 1));
                settle().await;
                assert_eq!(remote.watcher_count("Schedules"), 1);

                let write = panel.create(schedule("Late")).expect("valid create");
                panel.close();
                settle().await;
                let after_close = seen.get();
                assert_eq!(remote.watcher_count("Schedules"), 0);

                // The write still resolves; its store target is gone
                let outcome = write.await.expect("create succeeds");
                settle().await;
                assert_eq!(seen.get(), after_close);
                assert_eq!(remote.documents("Schedules")[0].id, outcome.id());
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_console_from_config_defaults_to_memory() {
        LocalSet::new()
            .run_until(async {
                let console = Console::from_config(ConsoleConfig::default(), TokioRuntime::shared())
                    .expect("console");
                let panel = console.open_panel(CollectionKind::Feedbacks);
                settle().await;

                assert!(panel.list().is_empty());
                assert!(panel.request_delete("f1").is_err());
                assert_eq!(console.alerts().default_duration_ms(), 3000);
            })
            .await;
    }
}
