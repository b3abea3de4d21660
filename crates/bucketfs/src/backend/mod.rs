// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Object storage capability consumed by the filesystem layer
//!
//! Backends only know whole objects: fetch, store, delete, list and copy.
//! Random access, splicing and directory emulation live above this trait.
//! There is a peer implementation for each kind of storage:
//! - `memory`: in-process map, used for tests and scratch filesystems
//! - `objstore`: the `object_store` crate (local disk, S3, in-memory)

mod memory;
mod objstore;

pub use memory::MemoryBackend;
pub use objstore::{ObjectStoreBackend, StoreFactory};

use crate::error::{Error, Result};
use crate::location::Location;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::{BoxStream, StreamExt};

/// Opaque version token of a stored object (an ETag or generation number)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectVersion {
    pub e_tag: Option<String>,
    pub version: Option<String>,
}

/// Precondition attached to a store request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCondition {
    /// Replace whatever is there
    Overwrite,
    /// Fail with `Error::AlreadyExists` if the key is present
    CreateNew,
    /// Fail with `Error::Conflict` unless the stored object still has this version
    Matches(ObjectVersion),
}

/// Listing and HEAD result for one key
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectInfo {
    pub location: Location,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
    pub content_type: Option<String>,
    pub version: Option<ObjectVersion>,
}

/// Chunked object payload
pub type ObjectBody = BoxStream<'static, Result<Bytes>>;

/// Result of a GET: metadata plus an optional body.
///
/// `body` is `None` when the backend reported success without a payload.
pub struct FetchedObject {
    pub info: ObjectInfo,
    pub body: Option<ObjectBody>,
}

impl FetchedObject {
    /// Drain the body into memory, failing with `ResponseNil` if there is none
    pub async fn into_bytes(self) -> Result<Vec<u8>> {
        let Some(mut body) = self.body else {
            return Err(Error::response_nil(self.info.location.to_string()));
        };
        let mut buffer = Vec::with_capacity(capacity_hint(self.info.size));
        while let Some(chunk) = body.next().await {
            buffer.extend_from_slice(&chunk?);
        }
        Ok(buffer)
    }
}

/// Largest up-front allocation taken on the word of object metadata
const MAX_CAPACITY_HINT: usize = 64 * 1024 * 1024;

fn capacity_hint(size: u64) -> usize {
    usize::try_from(size)
        .unwrap_or(MAX_CAPACITY_HINT)
        .min(MAX_CAPACITY_HINT)
}

impl std::fmt::Debug for FetchedObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchedObject")
            .field("info", &self.info)
            .field("body", &self.body.as_ref().map(|_| "<stream>"))
            .finish()
    }
}

/// Whole-object storage operations
#[async_trait]
pub trait ObjectBackend: Send + Sync {
    /// GET the object at `location`
    async fn fetch(&self, location: &Location) -> Result<FetchedObject>;

    /// HEAD the object at `location`
    async fn head(&self, location: &Location) -> Result<ObjectInfo>;

    /// PUT `data` as the complete content of `location`
    async fn store(
        &self,
        location: &Location,
        data: Bytes,
        content_type: Option<&str>,
        condition: StoreCondition,
    ) -> Result<ObjectVersion>;

    async fn delete(&self, location: &Location) -> Result<()>;

    /// Every key in `container` starting with `prefix`, sorted by key
    async fn list(&self, container: &str, prefix: &str) -> Result<Vec<ObjectInfo>>;

    async fn copy(&self, container: &str, from_key: &str, to_key: &str) -> Result<()>;

    /// Whether `store` honours `StoreCondition::Matches`
    fn supports_conditional_writes(&self) -> bool {
        true
    }
}
