// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Hierarchical filesystem emulated over a flat key namespace
//!
//! Directories exist either as zero-length marker objects whose key ends
//! in `/`, or implicitly because some key has them as a prefix. The
//! container root always exists. There is no current directory.

use crate::backend::{MemoryBackend, ObjectBackend, ObjectInfo, StoreCondition};
use crate::error::{Error, Result};
use crate::file::{RemoteFile, WritePolicy};
use crate::info::{FileInfo, guess_content_type};
use crate::location::{Location, SEPARATOR};
use crate::observe::{Metrics, Observer, Operation};
use bytes::Bytes;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Factory for [`RemoteFile`] handles plus directory operations
#[derive(Clone)]
pub struct FileSystem {
    backend: Arc<dyn ObjectBackend>,
    observer: Observer,
    policy: WritePolicy,
}

impl std::fmt::Debug for FileSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSystem")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl FileSystem {
    pub fn new(backend: Arc<dyn ObjectBackend>) -> Self {
        Self {
            backend,
            observer: Observer::default(),
            policy: WritePolicy::default(),
        }
    }

    /// A scratch filesystem over a fresh [`MemoryBackend`]
    #[must_use]
    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn Metrics>) -> Self {
        self.observer = Observer::new(metrics);
        self
    }

    #[must_use]
    pub fn with_write_policy(mut self, policy: WritePolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn backend(&self) -> &Arc<dyn ObjectBackend> {
        &self.backend
    }

    #[must_use]
    pub fn write_policy(&self) -> WritePolicy {
        self.policy
    }

    fn handle(&self, info: ObjectInfo) -> RemoteFile {
        RemoteFile::from_info(self.backend.clone(), self.observer.clone(), self.policy, info)
    }

    /// Create (or truncate) an empty file and return a handle at offset 0
    pub async fn create(&self, path: &str) -> Result<RemoteFile> {
        let span = self.observer.start(Operation::Create, path);
        let result = self.create_file(path).await;
        span.finish(result)
    }

    async fn create_file(&self, path: &str) -> Result<RemoteFile> {
        let location = Location::parse(path)?;
        location.require_key()?;
        if location.is_dir() {
            return Err(Error::invalid_path(path));
        }
        let parent = location.parent();
        if !self.dir_exists(&parent).await? {
            return Err(Error::not_found(parent.to_string()));
        }

        let content_type = guess_content_type(location.key());
        let version = self
            .backend
            .store(&location, Bytes::new(), Some(&content_type), StoreCondition::Overwrite)
            .await?;
        Ok(self.handle(ObjectInfo {
            location,
            size: 0,
            last_modified: Utc::now(),
            content_type: Some(content_type),
            version: Some(version),
        }))
    }

    /// Open an existing object
    pub async fn open(&self, path: &str) -> Result<RemoteFile> {
        let span = self.observer.start(Operation::Open, path);
        let result = self.open_file(path).await;
        span.finish(result)
    }

    async fn open_file(&self, path: &str) -> Result<RemoteFile> {
        let location = Location::parse(path)?;
        location.require_key()?;
        let info = self.backend.head(&location).await?;
        Ok(self.handle(info))
    }

    /// Delete a single object
    pub async fn remove(&self, path: &str) -> Result<()> {
        let span = self.observer.start(Operation::Remove, path);
        let result = self.remove_object(path).await;
        span.finish(result)
    }

    async fn remove_object(&self, path: &str) -> Result<()> {
        let location = Location::parse(path)?;
        location.require_key()?;
        self.backend.delete(&location).await
    }

    /// Delete `path` and everything below it. Missing paths are not an error.
    pub async fn remove_all(&self, path: &str) -> Result<()> {
        let span = self.observer.start(Operation::RemoveAll, path);
        let result = self.remove_tree(path).await;
        span.finish(result)
    }

    async fn remove_tree(&self, path: &str) -> Result<()> {
        let location = Location::parse(path)?;
        let prefix = location.dir_prefix();
        for info in self.backend.list(location.container(), &prefix).await? {
            self.backend.delete(&info.location).await?;
        }
        if !location.is_root() && !location.is_dir() {
            match self.backend.delete(&location).await {
                Err(err) if err.is_not_found() => {}
                other => other?,
            }
        }
        Ok(())
    }

    /// Move a file, or every key below a directory, within one container
    pub async fn rename(&self, from: &str, to: &str) -> Result<()> {
        let span = self.observer.start(Operation::Rename, format!("{from} -> {to}"));
        let result = self.move_entries(from, to).await;
        span.finish(result)
    }

    async fn move_entries(&self, from: &str, to: &str) -> Result<()> {
        let source = Location::parse(from)?;
        let target = Location::parse(to)?;
        source.require_key()?;
        target.require_key()?;
        if source == target {
            return Ok(());
        }
        if source.container() != target.container() {
            return Err(Error::CrossContainer {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        let container = source.container();

        if !source.is_dir() {
            match self.backend.head(&source).await {
                Ok(_) => {
                    self.backend.copy(container, source.key(), target.as_file().key()).await?;
                    return self.backend.delete(&source).await;
                }
                Err(err) if err.is_not_found() => {}
                Err(err) => return Err(err),
            }
        }

        let from_prefix = source.dir_prefix();
        let to_prefix = target.dir_prefix();
        let entries = self.backend.list(container, &from_prefix).await?;
        if entries.is_empty() {
            return Err(Error::not_found(from));
        }
        for info in entries {
            let Some(moved) = info.location.rebase(&from_prefix, &to_prefix) else {
                continue;
            };
            self.backend.copy(container, info.location.key(), moved.key()).await?;
            self.backend.delete(&info.location).await?;
        }
        Ok(())
    }

    /// Create one directory marker; the parent must already exist
    pub async fn mkdir(&self, path: &str) -> Result<()> {
        let span = self.observer.start(Operation::Mkdir, path);
        let result = self.make_dir(path).await;
        span.finish(result)
    }

    async fn make_dir(&self, path: &str) -> Result<()> {
        let location = Location::parse(path)?;
        location.require_key()?;
        let parent = location.parent();
        if !self.dir_exists(&parent).await? {
            return Err(Error::not_found(parent.to_string()));
        }
        if self.file_exists(&location.as_file()).await? {
            return Err(Error::already_exists(path));
        }
        self.store_marker(&location.as_dir()).await
    }

    /// Create a directory and every missing ancestor
    pub async fn mkdir_all(&self, path: &str) -> Result<()> {
        let span = self.observer.start(Operation::MkdirAll, path);
        let result = self.make_dir_all(path).await;
        span.finish(result)
    }

    async fn make_dir_all(&self, path: &str) -> Result<()> {
        let location = Location::parse(path)?;
        location.require_key()?;
        let mut chain = location.as_dir().ancestors();
        chain.push(location.as_dir());

        for dir in chain {
            if self.file_exists(&dir.as_file()).await? {
                return Err(Error::not_a_directory(dir.as_file().to_string()));
            }
            if self.dir_exists(&dir).await? {
                continue;
            }
            match self.store_marker(&dir).await {
                Err(Error::AlreadyExists(_)) => {}
                other => other?,
            }
        }
        Ok(())
    }

    /// Immediate children of a directory, sorted by name
    pub async fn read_dir(&self, path: &str) -> Result<Vec<FileInfo>> {
        let span = self.observer.start(Operation::ReadDir, path);
        let result = self.list_dir(path).await;
        span.finish(result)
    }

    async fn list_dir(&self, path: &str) -> Result<Vec<FileInfo>> {
        let location = Location::parse(path)?;
        let prefix = location.dir_prefix();
        let listed = self.backend.list(location.container(), &prefix).await?;
        if listed.is_empty() && !location.is_root() {
            if self.file_exists(&location.as_file()).await? {
                return Err(Error::not_a_directory(path));
            }
            return Err(Error::not_found(path));
        }

        let mut files = Vec::new();
        let mut dirs: BTreeMap<String, Vec<ObjectInfo>> = BTreeMap::new();
        for info in listed {
            let Some(rest) = info.location.key().strip_prefix(prefix.as_str()) else {
                continue;
            };
            match rest.split_once(SEPARATOR) {
                _ if rest.is_empty() => {}
                Some((child, _)) => {
                    let child = child.to_string();
                    dirs.entry(child).or_default().push(info);
                }
                None => files.push(FileInfo::from_object(&info)),
            }
        }

        let mut entries: Vec<FileInfo> = dirs
            .iter()
            .map(|(name, contents)| FileInfo::directory(&location.as_dir().child(name), contents))
            .chain(files)
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    /// Object metadata, or directory metadata aggregated from its contents
    pub async fn stat(&self, path: &str) -> Result<FileInfo> {
        let span = self.observer.start(Operation::Stat, path);
        let result = self.stat_entry(path).await;
        span.finish(result)
    }

    async fn stat_entry(&self, path: &str) -> Result<FileInfo> {
        let location = Location::parse(path)?;
        if !location.is_root() && !location.is_dir() {
            match self.backend.head(&location).await {
                Ok(info) => return Ok(FileInfo::from_object(&info)),
                Err(err) if err.is_not_found() => {}
                Err(err) => return Err(err),
            }
        }

        let contents = self
            .backend
            .list(location.container(), &location.dir_prefix())
            .await?;
        if contents.is_empty() && !location.is_root() {
            return Err(Error::not_found(path));
        }
        Ok(FileInfo::directory(&location, &contents))
    }

    /// A flat namespace has no current directory
    pub fn chdir(&self, path: &str) -> Result<()> {
        self.observer
            .start(Operation::Chdir, path)
            .finish(Err(Error::ChdirNotSupported))
    }

    /// Always the namespace root
    pub fn getwd(&self) -> Result<String> {
        self.observer
            .start(Operation::Getwd, SEPARATOR.to_string())
            .finish(Ok(SEPARATOR.to_string()))
    }

    async fn file_exists(&self, location: &Location) -> Result<bool> {
        if location.is_root() || location.is_dir() {
            return Ok(false);
        }
        match self.backend.head(location).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    async fn dir_exists(&self, location: &Location) -> Result<bool> {
        if location.is_root() {
            return Ok(true);
        }
        let prefix = location.dir_prefix();
        Ok(!self
            .backend
            .list(location.container(), &prefix)
            .await?
            .is_empty())
    }

    async fn store_marker(&self, marker: &Location) -> Result<()> {
        _ = self
            .backend
            .store(marker, Bytes::new(), None, StoreCondition::CreateNew)
            .await?;
        Ok(())
    }
}
