// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::{FetchedObject, ObjectBackend, ObjectInfo, ObjectVersion, StoreCondition};
use crate::error::{Error, Result};
use crate::location::Location;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

struct StoredObject {
    data: Bytes,
    content_type: Option<String>,
    last_modified: DateTime<Utc>,
    generation: u64,
}

impl StoredObject {
    fn version(&self) -> ObjectVersion {
        ObjectVersion {
            e_tag: Some(format!("\"{:016x}\"", self.generation)),
            version: Some(self.generation.to_string()),
        }
    }

    fn info(&self, location: &Location) -> ObjectInfo {
        ObjectInfo {
            location: location.clone(),
            size: self.data.len() as u64,
            last_modified: self.last_modified,
            content_type: self.content_type.clone(),
            version: Some(self.version()),
        }
    }
}

/// In-process object storage.
///
/// Every store bumps a process-wide generation counter, which doubles as
/// the object version for conditional stores. Clones share the same map.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    objects: Arc<Mutex<BTreeMap<Location, StoredObject>>>,
    generation: Arc<AtomicU64>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys across all containers
    pub async fn len(&self) -> usize {
        self.objects.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.lock().await.is_empty()
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[async_trait]
impl ObjectBackend for MemoryBackend {
    async fn fetch(&self, location: &Location) -> Result<FetchedObject> {
        let objects = self.objects.lock().await;
        let object = objects
            .get(location)
            .ok_or_else(|| Error::not_found(location.to_string()))?;
        let data = object.data.clone();
        Ok(FetchedObject {
            info: object.info(location),
            body: Some(stream::once(async move { Ok(data) }).boxed()),
        })
    }

    async fn head(&self, location: &Location) -> Result<ObjectInfo> {
        let objects = self.objects.lock().await;
        objects
            .get(location)
            .map(|object| object.info(location))
            .ok_or_else(|| Error::not_found(location.to_string()))
    }

    async fn store(
        &self,
        location: &Location,
        data: Bytes,
        content_type: Option<&str>,
        condition: StoreCondition,
    ) -> Result<ObjectVersion> {
        let mut objects = self.objects.lock().await;
        match (&condition, objects.get(location)) {
            (StoreCondition::Overwrite, _) => {}
            (StoreCondition::CreateNew, Some(_)) => {
                return Err(Error::already_exists(location.to_string()));
            }
            (StoreCondition::CreateNew, None) => {}
            (StoreCondition::Matches(expected), Some(existing)) => {
                if existing.version() != *expected {
                    return Err(Error::conflict(location.to_string()));
                }
            }
            (StoreCondition::Matches(_), None) => {
                return Err(Error::conflict(location.to_string()));
            }
        }

        let object = StoredObject {
            data,
            content_type: content_type.map(str::to_string),
            last_modified: Utc::now(),
            generation: self.next_generation(),
        };
        let version = object.version();
        _ = objects.insert(location.clone(), object);
        Ok(version)
    }

    async fn delete(&self, location: &Location) -> Result<()> {
        let mut objects = self.objects.lock().await;
        objects
            .remove(location)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(location.to_string()))
    }

    async fn list(&self, container: &str, prefix: &str) -> Result<Vec<ObjectInfo>> {
        let objects = self.objects.lock().await;
        Ok(objects
            .iter()
            .filter(|(loc, _)| loc.container() == container && loc.key().starts_with(prefix))
            .map(|(loc, object)| object.info(loc))
            .collect())
    }

    async fn copy(&self, container: &str, from_key: &str, to_key: &str) -> Result<()> {
        let from = Location::new(container, from_key);
        let to = Location::new(container, to_key);
        let mut objects = self.objects.lock().await;
        let source = objects
            .get(&from)
            .ok_or_else(|| Error::not_found(from.to_string()))?;
        let copied = StoredObject {
            data: source.data.clone(),
            content_type: source.content_type.clone(),
            last_modified: Utc::now(),
            generation: self.next_generation(),
        };
        _ = objects.insert(to, copied);
        Ok(())
    }
}
