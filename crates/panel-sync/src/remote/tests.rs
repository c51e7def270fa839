//! Remote Store Tests
//!
//! In-memory live store behaviour and the Firestore value codec.

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::VecDeque;
    use std::rc::Rc;
    use std::time::Duration;

    use futures::future::{FutureExt, LocalBoxFuture};
    use futures::StreamExt;
    use serde_json::{json, Value};
    use tokio::time::Instant;

    use crate::config::FirestoreConfig;
    use crate::domain::{CollectionKind, Payload};
    use crate::error::RemoteError;
    use crate::remote::firestore::{
        decode_fields, decode_value, encode_fields, encode_value, field_path, poll_live_query,
    };
    use crate::remote::{FirestoreRemote, MemoryRemote, RemoteDocument, RemoteStore, Snapshot};
    use crate::runtime::TokioRuntime;

    fn payload(value: Value) -> Payload {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn test_watch_delivers_initial_snapshot() {
        let remote = MemoryRemote::new();
        let feedback = payload(json!({ "message": "Late pickup" }));
        remote.seed("Feedbacks", vec![RemoteDocument::new("f1", feedback)]);

        let mut live = remote.watch("Feedbacks");
        let first = live.next().await.expect("delivery").expect("snapshot");

        assert_eq!(first.len(), 1);
        assert_eq!(first[0].id, "f1");
        assert_eq!(remote.watcher_count("Feedbacks"), 1);

        drop(live);
        assert_eq!(remote.watcher_count("Feedbacks"), 0);
    }

    #[tokio::test]
    async fn test_writes_rebroadcast_full_collection() {
        let remote = MemoryRemote::new();
        let mut live = remote.watch("Schedules");
        assert!(live.next().await.expect("delivery").expect("snapshot").is_empty());

        let id = remote
            .create("Schedules", payload(json!({ "note": "Trash Day" })))
            .await
            .expect("create");
        assert_eq!(id, "schedules-1");
        let after_create = live.next().await.expect("delivery").expect("snapshot");
        assert_eq!(after_create.len(), 1);

        remote
            .update("Schedules", &id, payload(json!({ "barangay": "Poblacion" })))
            .await
            .expect("update");
        let after_update = live.next().await.expect("delivery").expect("snapshot");
        // Update merges, untouched fields survive
        assert_eq!(after_update[0].fields["note"], json!("Trash Day"));
        assert_eq!(after_update[0].fields["barangay"], json!("Poblacion"));

        remote.delete("Schedules", &id).await.expect("delete");
        assert!(live.next().await.expect("delivery").expect("snapshot").is_empty());
        assert_eq!(remote.write_count(), 3);
    }

    #[tokio::test]
    async fn test_update_of_missing_document_is_not_found() {
        let remote = MemoryRemote::new();
        let err = remote
            .update("Announcements", "gone", payload(json!({ "announcement": "x" })))
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::NotFound(_)));

        // Deleting something already gone is not an error
        remote.delete("Announcements", "gone").await.expect("delete");
    }

    #[tokio::test]
    async fn test_injected_failures_are_consumed_in_order() {
        let remote = MemoryRemote::new();
        remote.fail_next_write(RemoteError::Transport("offline".into()));
        remote.fail_next_write(RemoteError::Rejected("denied".into()));

        let first = remote.create("Announcements", Payload::new()).await.unwrap_err();
        let second = remote.create("Announcements", Payload::new()).await.unwrap_err();
        let third = remote.create("Announcements", Payload::new()).await;

        assert!(matches!(first, RemoteError::Transport(_)));
        assert!(matches!(second, RemoteError::Rejected(_)));
        assert!(third.is_ok());
        assert_eq!(remote.documents("Announcements").len(), 1);
    }

    #[tokio::test]
    async fn test_interrupt_keeps_stream_open() {
        let remote = MemoryRemote::new();
        let mut live = remote.watch("Notifications");
        live.next().await.expect("initial");

        remote.interrupt("Notifications", RemoteError::Transport("socket closed".into()));
        assert!(live.next().await.expect("delivery").is_err());

        remote.put("Notifications", "n1", payload(json!({ "Message": "Truck delayed" })));
        let snapshot = live.next().await.expect("delivery").expect("snapshot");
        assert_eq!(snapshot[0].id, "n1");
    }

    #[test]
    fn test_encode_wraps_typed_values() {
        let fields = encode_fields(&payload(json!({
            "note": "Trash Day",
            "count": 3,
            "ratio": 0.5,
            "done": false,
            "addedAt": "2024-03-01T08:00:00.000Z",
            "tags": ["a"],
        })), &["addedAt"]);

        assert_eq!(fields["note"], json!({ "stringValue": "Trash Day" }));
        assert_eq!(fields["count"], json!({ "integerValue": "3" }));
        assert_eq!(fields["ratio"], json!({ "doubleValue": 0.5 }));
        assert_eq!(fields["done"], json!({ "booleanValue": false }));
        assert_eq!(fields["addedAt"], json!({ "timestampValue": "2024-03-01T08:00:00.000Z" }));
        assert_eq!(
            fields["tags"],
            json!({ "arrayValue": { "values": [{ "stringValue": "a" }] } })
        );
    }

    #[test]
    fn test_text_that_looks_like_a_timestamp_stays_text() {
        let original = payload(json!({
            "announcement": "2024-03-01T16:00:00+08:00",
            "postedAt": "2024-03-01T16:00:00+08:00",
        }));
        let fields = encode_fields(&original, CollectionKind::Announcements.timestamp_fields());

        assert_eq!(
            fields["announcement"],
            json!({ "stringValue": "2024-03-01T16:00:00+08:00" })
        );
        assert_eq!(
            fields["postedAt"],
            json!({ "timestampValue": "2024-03-01T16:00:00+08:00" })
        );

        let decoded = decode_fields(&fields).expect("decode");
        assert_eq!(decoded["announcement"], original["announcement"]);
        assert_eq!(decoded["postedAt"], json!("2024-03-01T08:00:00Z"));
    }

    #[test]
    fn test_non_time_field_is_never_a_timestamp() {
        let note = payload(json!({ "note": "2024-03-01T08:00:00Z", "addedAt": "tomorrow" }));
        let fields = encode_fields(&note, CollectionKind::Schedules.timestamp_fields());
        assert_eq!(fields["note"], json!({ "stringValue": "2024-03-01T08:00:00Z" }));
        // Not a valid instant, so sent as written
        assert_eq!(fields["addedAt"], json!({ "stringValue": "tomorrow" }));
        assert_eq!(
            encode_value(&json!("2024-03-01T08:00:00Z")),
            json!({ "stringValue": "2024-03-01T08:00:00Z" })
        );
    }

    fn scripted_poll(
        script: Vec<Result<Snapshot, RemoteError>>,
        calls: Rc<Cell<usize>>,
    ) -> impl FnMut() -> LocalBoxFuture<'static, Result<Snapshot, RemoteError>> {
        let mut script: VecDeque<_> = script.into();
        move || {
            calls.set(calls.get() + 1);
            // Last entry repeats once the script runs out
            let next = if script.len() > 1 {
                script.pop_front()
            } else {
                script.front().cloned()
            };
            let next = next.unwrap_or_else(|| Ok(Vec::new()));
            async move { next }.boxed_local()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_emits_only_changes() {
        let one = vec![RemoteDocument::new("a1", payload(json!({ "note": "Trash Day" })))];
        let two = vec![
            RemoteDocument::new("a1", payload(json!({ "note": "Trash Day" }))),
            RemoteDocument::new("b2", payload(json!({ "note": "Recycling" }))),
        ];
        let calls = Rc::new(Cell::new(0));
        let poll = scripted_poll(vec![Ok(one.clone()), Ok(one.clone()), Ok(two.clone())], calls.clone());
        let interval = Duration::from_millis(2000);
        let started = Instant::now();

        let mut live = poll_live_query("Schedules", TokioRuntime::shared(), interval, poll);

        assert_eq!(live.next().await.expect("delivery").expect("snapshot"), one);
        assert_eq!(started.elapsed(), Duration::ZERO);

        // The unchanged second listing is swallowed
        assert_eq!(live.next().await.expect("delivery").expect("snapshot"), two);
        assert_eq!(calls.get(), 3);
        assert_eq!(started.elapsed(), interval * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_reports_failure_then_redelivers() {
        let one = vec![RemoteDocument::new("n1", payload(json!({ "Message": "Truck delayed" })))];
        let calls = Rc::new(Cell::new(0));
        let poll = scripted_poll(
            vec![
                Ok(one.clone()),
                Err(RemoteError::Transport("offline".into())),
                Ok(one.clone()),
            ],
            calls.clone(),
        );

        let mut live = poll_live_query(
            "Notifications",
            TokioRuntime::shared(),
            Duration::from_millis(500),
            poll,
        );

        assert_eq!(live.next().await.expect("delivery").expect("snapshot"), one);
        assert!(matches!(
            live.next().await.expect("delivery"),
            Err(RemoteError::Transport(_))
        ));
        // Same member set as before the outage, delivered again in full
        assert_eq!(live.next().await.expect("delivery").expect("snapshot"), one);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_decode_unwraps_firestore_fields() {
        let raw = json!({
            "Message": { "stringValue": "Truck delayed" },
            "GBPoint": { "integerValue": "12" },
            "TimeStamp": { "timestampValue": "2024-03-01T16:00:00+08:00" },
            "meta": { "mapValue": { "fields": { "seen": { "booleanValue": true } } } },
            "empty": { "arrayValue": {} },
        });

        let decoded = decode_fields(raw.as_object().expect("object")).expect("decode");

        assert_eq!(decoded["Message"], json!("Truck delayed"));
        assert_eq!(decoded["GBPoint"], json!(12));
        assert_eq!(decoded["TimeStamp"], json!("2024-03-01T08:00:00Z"));
        assert_eq!(decoded["meta"], json!({ "seen": true }));
        assert_eq!(decoded["empty"], json!([]));
    }

    #[test]
    fn test_decode_rejects_untyped_values() {
        assert!(matches!(decode_value(&json!("plain")), Err(RemoteError::Decode(_))));
        assert!(matches!(decode_value(&json!({})), Err(RemoteError::Decode(_))));
        assert!(matches!(
            decode_value(&json!({ "integerValue": "twelve" })),
            Err(RemoteError::Decode(_))
        ));
    }

    #[test]
    fn test_field_path_quotes_non_identifiers() {
        assert_eq!(field_path("timeF"), "timeF");
        assert_eq!(field_path("_meta"), "_meta");
        assert_eq!(field_path("posted at"), "`posted at`");
        assert_eq!(field_path("1st"), "`1st`");
    }

    #[test]
    fn test_firestore_documents_url() {
        let mut config = FirestoreConfig::new("waste-console");
        config.base_url = "http://localhost:8080/v1/".to_string();

        let remote = FirestoreRemote::new(&config, TokioRuntime::shared()).expect("remote");

        assert_eq!(
            remote.documents_url(),
            "http://localhost:8080/v1/projects/waste-console/databases/(default)/documents"
        );
        assert!(FirestoreRemote::new(&FirestoreConfig::new(" "), TokioRuntime::shared()).is_err());
    }
}
