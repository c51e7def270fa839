//! Firestore Remote Store
//!
//! REST client for the console's Firestore collections. Point writes go to
//! the documents endpoints; the live query polls the collection and emits a
//! snapshot whenever its member set changes. A failed poll is reported once
//! on the stream and polling carries on, which is how the watch reconnects.

mod codec;

use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::{FutureExt, LocalBoxFuture};
use futures::stream::{self, StreamExt};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::json;

pub use codec::{decode_fields, decode_value, encode_fields, encode_value, field_path};
use codec::{decode_document, FirestoreDocument, ListDocumentsResponse};

use super::traits::{LiveQuery, RemoteStore, Snapshot};
use crate::config::FirestoreConfig;
use crate::domain::{CollectionKind, Payload};
use crate::error::{ConsoleError, ConsoleResult, RemoteError};
use crate::runtime::SharedRuntime;

const PAGE_SIZE: &str = "300";

struct FirestoreClient {
    http: Client,
    documents_url: String,
    api_key: Option<String>,
    auth_token: Option<String>,
    /// Fields written as native timestamps, across every console collection
    timestamp_fields: Vec<&'static str>,
}

impl FirestoreClient {
    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.documents_url, collection)
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.documents_url, collection, id)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = match &self.api_key {
            Some(key) => request.query(&[("key", key.as_str())]),
            None => request,
        };
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn list(&self, collection: &str) -> Result<Snapshot, RemoteError> {
        let mut snapshot = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self
                .authorize(self.http.get(self.collection_url(collection)))
                .query(&[("pageSize", PAGE_SIZE)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }
            let response = check(request.send().await.map_err(transport)?).await?;
            let page: ListDocumentsResponse = response
                .json()
                .await
                .map_err(|e| RemoteError::Decode(e.to_string()))?;
            for doc in &page.documents {
                snapshot.push(decode_document(doc)?);
            }
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => return Ok(snapshot),
            }
        }
    }

    async fn create(&self, collection: &str, payload: &Payload) -> Result<String, RemoteError> {
        let body = json!({ "fields": encode_fields(payload, &self.timestamp_fields) });
        let request = self.authorize(self.http.post(self.collection_url(collection)));
        let response = check(request.json(&body).send().await.map_err(transport)?).await?;
        let doc: FirestoreDocument = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        Ok(decode_document(&doc)?.id)
    }

    async fn update(&self, collection: &str, id: &str, payload: &Payload) -> Result<(), RemoteError> {
        let body = json!({ "fields": encode_fields(payload, &self.timestamp_fields) });
        let mut request = self
            .authorize(self.http.patch(self.document_url(collection, id)))
            .query(&[("currentDocument.exists", "true")]);
        for key in payload.keys() {
            request = request.query(&[("updateMask.fieldPaths", field_path(key))]);
        }
        check(request.json(&body).send().await.map_err(transport)?).await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), RemoteError> {
        let request = self.authorize(self.http.delete(self.document_url(collection, id)));
        check(request.send().await.map_err(transport)?).await?;
        Ok(())
    }
}

fn transport(e: reqwest::Error) -> RemoteError {
    RemoteError::Transport(e.to_string())
}

async fn check(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    if status == StatusCode::NOT_FOUND {
        Err(RemoteError::NotFound(body))
    } else {
        Err(RemoteError::Rejected(format!("{}: {}", status, body)))
    }
}

/// Firestore-backed remote store
#[derive(Clone)]
pub struct FirestoreRemote {
    client: Rc<FirestoreClient>,
    runtime: SharedRuntime,
    poll_interval: Duration,
}

impl FirestoreRemote {
    pub fn new(config: &FirestoreConfig, runtime: SharedRuntime) -> ConsoleResult<Self> {
        config.validate()?;
        let http = Client::builder()
            .build()
            .map_err(|e| ConsoleError::Config(format!("http client: {}", e)))?;
        let documents_url = format!(
            "{}/projects/{}/databases/{}/documents",
            config.base_url.trim_end_matches('/'),
            config.project_id,
            config.database
        );
        Ok(Self {
            client: Rc::new(FirestoreClient {
                http,
                documents_url,
                api_key: config.api_key.clone(),
                auth_token: config.auth_token.clone(),
                timestamp_fields: CollectionKind::ALL
                    .iter()
                    .flat_map(|kind| kind.timestamp_fields().iter().copied())
                    .collect(),
            }),
            runtime,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        })
    }

    pub fn documents_url(&self) -> &str {
        &self.client.documents_url
    }
}

struct PollState<P> {
    poll: P,
    runtime: SharedRuntime,
    collection: String,
    interval: Duration,
    last: Option<Snapshot>,
    started: bool,
}

/// Turn a one-shot listing into a live query.
///
/// Polls immediately, then every `interval`. A snapshot is emitted only when
/// it differs from the last one emitted; a failed poll is emitted as an error
/// and forces the next good listing to be delivered in full.
pub(crate) fn poll_live_query<P>(
    collection: &str,
    runtime: SharedRuntime,
    interval: Duration,
    poll: P,
) -> LiveQuery
where
    P: FnMut() -> LocalBoxFuture<'static, Result<Snapshot, RemoteError>> + 'static,
{
    let state = PollState {
        poll,
        runtime,
        collection: collection.to_string(),
        interval,
        last: None,
        started: false,
    };
    stream::unfold(state, |mut state| async move {
        loop {
            if state.started {
                state.runtime.sleep(state.interval).await;
            }
            state.started = true;
            match (state.poll)().await {
                Ok(snapshot) => {
                    if state.last.as_ref() == Some(&snapshot) {
                        continue;
                    }
                    state.last = Some(snapshot.clone());
                    return Some((Ok(snapshot), state));
                }
                Err(err) => {
                    tracing::warn!(collection = %state.collection, error = %err, "firestore poll failed");
                    state.last = None;
                    return Some((Err(err), state));
                }
            }
        }
    })
    .boxed_local()
}

#[async_trait(?Send)]
impl RemoteStore for FirestoreRemote {
    fn watch(&self, collection: &str) -> LiveQuery {
        let client = self.client.clone();
        let name = collection.to_string();
        poll_live_query(collection, self.runtime.clone(), self.poll_interval, move || {
            let client = client.clone();
            let name = name.clone();
            async move { client.list(&name).await }.boxed_local()
        })
    }

    async fn create(&self, collection: &str, payload: Payload) -> Result<String, RemoteError> {
        self.client.create(collection, &payload).await
    }

    async fn update(&self, collection: &str, id: &str, payload: Payload) -> Result<(), RemoteError> {
        self.client.update(collection, id, &payload).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), RemoteError> {
        self.client.delete(collection, id).await
    }
}
