//! HTTP backend for the hosted document service.
//!
//! Request/response operations are plain JSON over reqwest.  The live
//! query endpoint streams newline-delimited JSON: one line per change,
//! each line a full refreshed ordered snapshot.  A background task drains
//! the stream into the subscription channel until the consumer cancels or
//! the remote side closes.

use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::backend::{DocumentBackend, DocumentId, WatchQuery};
use crate::error::{Result, StoreError};
use crate::live::{self, Subscription, SubscriptionProducer, WatchEvent};

/// Configuration for the remote store connection.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL of the hosted service, without a trailing slash.
    pub base_url: String,
    /// Capacity of each subscription's delivery channel.
    pub channel_capacity: usize,
}

impl StoreConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            channel_capacity: 32,
        }
    }
}

/// [`DocumentBackend`] talking to the hosted service.
pub struct HttpBackend {
    client: reqwest::Client,
    config: StoreConfig,
}

impl HttpBackend {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/collections/{collection}",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[derive(Deserialize)]
struct InsertResponse {
    id: String,
}

#[async_trait]
impl DocumentBackend for HttpBackend {
    async fn insert_one(&self, collection: &str, document: Value) -> Result<DocumentId> {
        let resp = self
            .client
            .post(self.collection_url(collection))
            .json(&document)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(StoreError::RemoteStatus {
                status: resp.status().as_u16(),
            });
        }

        let inserted: InsertResponse = resp.json().await?;
        debug!(collection, id = %inserted.id, "document inserted");
        Ok(DocumentId(inserted.id))
    }

    async fn query_eq(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<Value>> {
        let value_json = serde_json::to_string(value)?;
        let resp = self
            .client
            .get(self.collection_url(collection))
            .query(&[("field", field), ("value", value_json.as_str())])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(StoreError::RemoteStatus {
                status: resp.status().as_u16(),
            });
        }

        Ok(resp.json().await?)
    }

    async fn watch(&self, query: WatchQuery) -> Result<Subscription> {
        let mut params = vec![("orderBy".to_string(), query.order_by.clone())];
        if let Some((field, value)) = &query.filter {
            params.push(("field".to_string(), field.clone()));
            params.push(("value".to_string(), serde_json::to_string(value)?));
        }

        let resp = self
            .client
            .get(format!("{}/watch", self.collection_url(&query.collection)))
            .query(&params)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(StoreError::RemoteStatus {
                status: resp.status().as_u16(),
            });
        }

        let (producer, subscription) = live::channel(self.config.channel_capacity);
        let collection = query.collection.clone();
        tokio::spawn(drain_watch_stream(resp, producer, collection));

        Ok(subscription)
    }
}

/// Forward snapshot lines from the streaming response into the
/// subscription channel until cancellation or end of stream.
async fn drain_watch_stream(
    resp: reqwest::Response,
    producer: SubscriptionProducer,
    collection: String,
) {
    let SubscriptionProducer { tx, mut cancel_rx } = producer;
    let mut stream = resp.bytes_stream();
    let mut buf: Vec<u8> = Vec::new();

    loop {
        tokio::select! {
            _ = cancel_rx.changed() => {
                debug!(collection, "watch cancelled by consumer");
                return;
            }
            chunk = stream.next() => match chunk {
                Some(Ok(bytes)) => {
                    buf.extend_from_slice(&bytes);
                    while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
                        let line: Vec<u8> = buf.drain(..=pos).collect();
                        let line = &line[..line.len() - 1];
                        if line.is_empty() {
                            continue;
                        }
                        match serde_json::from_slice::<Vec<Value>>(line) {
                            Ok(snapshot) => {
                                if tx.send(WatchEvent::Snapshot(snapshot)).await.is_err() {
                                    return;
                                }
                            }
                            Err(e) => {
                                warn!(collection, error = %e, "malformed watch frame");
                                let _ = tx.send(WatchEvent::Error(e.to_string())).await;
                                return;
                            }
                        }
                    }
                }
                Some(Err(e)) => {
                    warn!(collection, error = %e, "watch stream failed");
                    let _ = tx.send(WatchEvent::Error(e.to_string())).await;
                    return;
                }
                None => {
                    debug!(collection, "watch stream ended by remote");
                    return;
                }
            }
        }
    }
}
