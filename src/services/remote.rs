//! src/services/remote.rs
//!
//! Remote object-store seam. The sync engine only ever talks to the
//! `RemoteStore` trait: one listing page at a time, one payload stream per
//! object. The S3-backed implementation lives here too; transport failures
//! are carried as opaque strings and never retried at this layer.

use crate::models::object::ObjectDescriptor;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use thiserror::Error;
use tokio_util::io::ReaderStream;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("list error: {0}")]
    List(String),
    #[error("get error: {0}")]
    Get(String),
}

/// One page of a bucket listing.
#[derive(Debug, Default)]
pub struct ObjectPage {
    pub objects: Vec<ObjectDescriptor>,

    /// Token for the next page; `None` when this page is the last.
    pub next_continuation_token: Option<String>,
}

/// Streamed object payload, yielded in chunks.
pub type ObjectStream = Pin<Box<dyn Stream<Item = Result<Bytes, StoreError>> + Send>>;

/// Transport operations the sync engine needs from a remote store.
///
/// Pagination is pull-driven: the caller requests one page at a time and
/// stops requesting on the first failure, so a listing is never buffered
/// whole and can be abandoned mid-sequence.
#[async_trait]
pub trait RemoteStore: Send + Sync + 'static {
    /// Fetch a single listing page, optionally continuing from a token
    /// returned by the previous page.
    async fn list_page(
        &self,
        bucket: &str,
        continuation_token: Option<&str>,
    ) -> Result<ObjectPage, StoreError>;

    /// Open the payload of one object for streaming.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectStream, StoreError>;
}

/// `RemoteStore` backed by the AWS SDK S3 client.
pub struct S3RemoteStore {
    client: Client,
}

impl S3RemoteStore {
    /// Build a client from the standard AWS environment (region,
    /// credentials). An explicit endpoint switches to path-style addressing
    /// for S3-compatible stores.
    pub async fn from_env(endpoint: Option<&str>) -> Self {
        let base = aws_config::load_defaults(BehaviorVersion::latest()).await;
        let mut builder = aws_sdk_s3::config::Builder::from(&base);
        if let Some(endpoint) = endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        Self {
            client: Client::from_conf(builder.build()),
        }
    }
}

#[async_trait]
impl RemoteStore for S3RemoteStore {
    async fn list_page(
        &self,
        bucket: &str,
        continuation_token: Option<&str>,
    ) -> Result<ObjectPage, StoreError> {
        let mut req = self.client.list_objects_v2().bucket(bucket);
        if let Some(token) = continuation_token {
            req = req.continuation_token(token);
        }
        let out = req
            .send()
            .await
            .map_err(|err| StoreError::List(err.to_string()))?;

        let objects = out
            .contents()
            .iter()
            .filter_map(|obj| {
                // Entries without a key are unusable; drop them at the boundary.
                let key = obj.key()?.to_string();
                Some(ObjectDescriptor::new(key, obj.size().unwrap_or(0)))
            })
            .collect();

        let next_continuation_token = if out.is_truncated().unwrap_or(false) {
            out.next_continuation_token().map(str::to_string)
        } else {
            None
        };

        Ok(ObjectPage {
            objects,
            next_continuation_token,
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectStream, StoreError> {
        let out = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| StoreError::Get(err.to_string()))?;

        let reader = out.body.into_async_read();
        let stream =
            ReaderStream::new(reader).map(|chunk| chunk.map_err(|err| StoreError::Get(err.to_string())));
        Ok(Box::pin(stream))
    }
}
