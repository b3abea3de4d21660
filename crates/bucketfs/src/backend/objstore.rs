// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! `object_store` implementation of [`ObjectBackend`]
//!
//! Each container maps to its own `ObjectStore` instance, built on first
//! use by a [`StoreFactory`]: an S3 bucket, a subdirectory of a local root,
//! or an in-memory store.
//!
//! `object_store` paths cannot end in a delimiter, so directory-marker keys
//! (`a/b/`) are stored as `a/b/_dir_marker` and translated back on the way out.

use super::{FetchedObject, ObjectBackend, ObjectInfo, ObjectVersion, StoreCondition};
use crate::error::{Error, Result};
use crate::location::{Location, SEPARATOR};
use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, TryStreamExt};
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::{
    Attribute, AttributeValue, Attributes, GetOptions, ObjectMeta, ObjectStore, PutMode,
    PutOptions, PutPayload, UpdateVersion,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

const DIR_MARKER: &str = "_dir_marker";

/// How to build the `ObjectStore` behind one container
#[derive(Debug, Clone, PartialEq)]
pub enum StoreFactory {
    /// A fresh `InMemory` store per container
    Memory,
    /// `<root>/<container>` on the local disk
    Local { root: PathBuf },
    /// An S3 bucket named after the container; credentials from the environment
    S3 {
        region: Option<String>,
        endpoint: Option<String>,
        allow_http: bool,
    },
}

impl StoreFactory {
    fn build(&self, container: &str) -> Result<Arc<dyn ObjectStore>> {
        match self {
            StoreFactory::Memory => Ok(Arc::new(InMemory::new())),
            StoreFactory::Local { root } => {
                let dir = root.join(container);
                std::fs::create_dir_all(&dir)?;
                Ok(Arc::new(LocalFileSystem::new_with_prefix(dir)?))
            }
            StoreFactory::S3 {
                region,
                endpoint,
                allow_http,
            } => {
                let mut builder = AmazonS3Builder::from_env()
                    .with_bucket_name(container)
                    .with_allow_http(*allow_http);
                if let Some(region) = region {
                    builder = builder.with_region(region);
                }
                if let Some(endpoint) = endpoint {
                    builder = builder.with_endpoint(endpoint);
                }
                Ok(Arc::new(builder.build()?))
            }
        }
    }

    /// Whether put requests may carry attributes such as the content type
    fn supports_attributes(&self) -> bool {
        !matches!(self, StoreFactory::Local { .. })
    }

    /// `LocalFileSystem` rejects `PutMode::Update`
    fn supports_update(&self) -> bool {
        !matches!(self, StoreFactory::Local { .. })
    }
}

/// [`ObjectBackend`] over the `object_store` crate
pub struct ObjectStoreBackend {
    factory: StoreFactory,
    stores: Mutex<HashMap<String, Arc<dyn ObjectStore>>>,
}

impl ObjectStoreBackend {
    #[must_use]
    pub fn new(factory: StoreFactory) -> Self {
        Self {
            factory,
            stores: Mutex::new(HashMap::new()),
        }
    }

    /// Use an existing store for `container` instead of building one
    pub fn register(&self, container: &str, store: Arc<dyn ObjectStore>) -> Result<()> {
        let mut stores = self
            .stores
            .lock()
            .map_err(|e| Error::Config(format!("store registry poisoned: {e}")))?;
        _ = stores.insert(container.to_string(), store);
        Ok(())
    }

    fn store_for(&self, container: &str) -> Result<Arc<dyn ObjectStore>> {
        let mut stores = self
            .stores
            .lock()
            .map_err(|e| Error::Config(format!("store registry poisoned: {e}")))?;
        if let Some(store) = stores.get(container) {
            return Ok(store.clone());
        }
        diagnostics::debug!(
            "Building object store for container {container}",
            container: container
        );
        let store = self.factory.build(container)?;
        _ = stores.insert(container.to_string(), store.clone());
        Ok(store)
    }
}

fn object_path(location: &Location) -> Result<ObjectPath> {
    let key = location.key();
    let raw = if location.is_dir() {
        format!("{key}{DIR_MARKER}")
    } else {
        key.to_string()
    };
    ObjectPath::parse(raw).map_err(|_| Error::invalid_path(location.to_string()))
}

fn key_of(path: &ObjectPath) -> String {
    let raw = path.as_ref();
    match raw.strip_suffix(DIR_MARKER) {
        Some(dir) if dir.is_empty() || dir.ends_with(SEPARATOR) => dir.to_string(),
        _ => raw.to_string(),
    }
}

fn version_of(e_tag: Option<String>, version: Option<String>) -> Option<ObjectVersion> {
    if e_tag.is_none() && version.is_none() {
        None
    } else {
        Some(ObjectVersion { e_tag, version })
    }
}

fn info_from_meta(container: &str, meta: ObjectMeta, attributes: Option<&Attributes>) -> ObjectInfo {
    let content_type = attributes
        .and_then(|attrs| attrs.get(&Attribute::ContentType))
        .map(|value| value.to_string());
    ObjectInfo {
        location: Location::new(container, key_of(&meta.location)),
        size: meta.size,
        last_modified: meta.last_modified,
        content_type,
        version: version_of(meta.e_tag, meta.version),
    }
}

/// Translate store errors into the crate's taxonomy where one applies
fn translate(location: &Location, err: object_store::Error) -> Error {
    match err {
        object_store::Error::NotFound { .. } => Error::not_found(location.to_string()),
        object_store::Error::AlreadyExists { .. } => Error::already_exists(location.to_string()),
        object_store::Error::Precondition { .. } => Error::conflict(location.to_string()),
        other => Error::ObjectStore(other),
    }
}

#[async_trait]
impl ObjectBackend for ObjectStoreBackend {
    async fn fetch(&self, location: &Location) -> Result<FetchedObject> {
        let store = self.store_for(location.container())?;
        let path = object_path(location)?;
        let result = store.get(&path).await.map_err(|e| translate(location, e))?;

        let info = info_from_meta(
            location.container(),
            result.meta.clone(),
            Some(&result.attributes),
        );
        let body = result.into_stream().map_err(Error::from).boxed();
        Ok(FetchedObject {
            info,
            body: Some(body),
        })
    }

    async fn head(&self, location: &Location) -> Result<ObjectInfo> {
        let store = self.store_for(location.container())?;
        let path = object_path(location)?;
        let options = GetOptions {
            head: true,
            ..Default::default()
        };
        let result = store
            .get_opts(&path, options)
            .await
            .map_err(|e| translate(location, e))?;
        Ok(info_from_meta(
            location.container(),
            result.meta,
            Some(&result.attributes),
        ))
    }

    async fn store(
        &self,
        location: &Location,
        data: Bytes,
        content_type: Option<&str>,
        condition: StoreCondition,
    ) -> Result<ObjectVersion> {
        let store = self.store_for(location.container())?;
        let path = object_path(location)?;

        let mode = match condition {
            StoreCondition::Overwrite => PutMode::Overwrite,
            StoreCondition::CreateNew => PutMode::Create,
            StoreCondition::Matches(version) => PutMode::Update(UpdateVersion {
                e_tag: version.e_tag,
                version: version.version,
            }),
        };
        let mut attributes = Attributes::new();
        if let Some(content_type) = content_type.filter(|_| self.factory.supports_attributes()) {
            _ = attributes.insert(
                Attribute::ContentType,
                AttributeValue::from(content_type.to_string()),
            );
        }
        let options = PutOptions {
            mode,
            attributes,
            ..Default::default()
        };

        let result = store
            .put_opts(&path, PutPayload::from(data), options)
            .await
            .map_err(|e| translate(location, e))?;
        Ok(ObjectVersion {
            e_tag: result.e_tag,
            version: result.version,
        })
    }

    async fn delete(&self, location: &Location) -> Result<()> {
        let store = self.store_for(location.container())?;
        let path = object_path(location)?;
        // Deleting a missing key reports NotFound
        _ = store.head(&path).await.map_err(|e| translate(location, e))?;
        store.delete(&path).await.map_err(|e| translate(location, e))
    }

    async fn list(&self, container: &str, prefix: &str) -> Result<Vec<ObjectInfo>> {
        let store = self.store_for(container)?;
        // object_store lists by whole path segments, so list the enclosing
        // directory and filter on the raw prefix
        let list_root = match prefix.rfind(SEPARATOR) {
            Some(idx) if idx > 0 => Some(
                ObjectPath::parse(&prefix[..idx])
                    .map_err(|_| Error::invalid_path(format!("{container}/{prefix}")))?,
            ),
            _ => None,
        };

        let mut infos: Vec<ObjectInfo> = store
            .list(list_root.as_ref())
            .map_err(Error::from)
            .try_filter_map(|meta| async move {
                let info = info_from_meta(container, meta, None);
                let keep = info.location.key().starts_with(prefix);
                Ok(keep.then_some(info))
            })
            .try_collect()
            .await?;
        infos.sort_by(|a, b| a.location.cmp(&b.location));
        Ok(infos)
    }

    async fn copy(&self, container: &str, from_key: &str, to_key: &str) -> Result<()> {
        let store = self.store_for(container)?;
        let from = Location::new(container, from_key);
        let to = Location::new(container, to_key);
        store
            .copy(&object_path(&from)?, &object_path(&to)?)
            .await
            .map_err(|e| translate(&from, e))
    }

    fn supports_conditional_writes(&self) -> bool {
        self.factory.supports_update()
    }
}
