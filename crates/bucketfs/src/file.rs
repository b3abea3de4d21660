// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Random-access files over whole-object storage
//!
//! A [`RemoteFile`] keeps a cursor and a cached size for one key and
//! translates `read`/`write`/`seek` into whole-object fetches and
//! replacements. Nothing is cached between calls: every read fetches the
//! full object and every write stores the full object.
//!
//! Writes at a non-zero offset are read-modify-write splices. Under
//! [`WritePolicy::LastWriterWins`] a concurrent writer between the fetch
//! and the store is silently overwritten. [`WritePolicy::Conditional`]
//! makes the store conditional on the version the fetch observed and
//! reports [`Error::Conflict`] instead.
//!
//! A handle is meant for one task at a time; every mutating method takes
//! `&mut self`.

use crate::backend::{ObjectBackend, ObjectInfo, ObjectVersion, StoreCondition};
use crate::error::{Error, Result};
use crate::info::{DEFAULT_DIR_MODE, DEFAULT_FILE_MODE, guess_content_type};
use crate::location::Location;
use crate::observe::{Observer, Operation};
use crate::rows::RowReader;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::SeekFrom;
use std::sync::Arc;

/// `whence` values accepted by [`RemoteFile::seek_whence`]
pub const SEEK_START: i32 = 0;
pub const SEEK_CURRENT: i32 = 1;
pub const SEEK_END: i32 = 2;

/// How splice writes protect against concurrent writers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritePolicy {
    /// Unconditional replace; concurrent updates may be lost
    #[default]
    LastWriterWins,
    /// Replace only if the object still has the version last observed
    Conditional,
}

pub struct RemoteFile {
    backend: Arc<dyn ObjectBackend>,
    observer: Observer,
    policy: WritePolicy,
    location: Location,
    cursor: u64,
    size: u64,
    content_type: String,
    last_modified: DateTime<Utc>,
    version: Option<ObjectVersion>,
    closed: bool,
}

impl std::fmt::Debug for RemoteFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteFile")
            .field("location", &self.location)
            .field("cursor", &self.cursor)
            .field("size", &self.size)
            .field("content_type", &self.content_type)
            .field("policy", &self.policy)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl RemoteFile {
    /// Handle over an existing object, positioned at offset 0
    pub(crate) fn from_info(
        backend: Arc<dyn ObjectBackend>,
        observer: Observer,
        policy: WritePolicy,
        info: ObjectInfo,
    ) -> Self {
        let content_type = info
            .content_type
            .unwrap_or_else(|| guess_content_type(info.location.key()));
        Self {
            backend,
            observer,
            policy,
            location: info.location,
            cursor: 0,
            size: info.size,
            content_type,
            last_modified: info.last_modified,
            version: info.version,
            closed: false,
        }
    }

    /// Fill `buf` from the cursor and advance it by the bytes copied.
    ///
    /// When the object ends first, the copied prefix of `buf` is valid and
    /// the call fails with [`Error::UnexpectedEof`] carrying its length.
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let span = self.observer.start(Operation::Read, self.location.to_string());
        let result = self.read_from_cursor(buf).await;
        span.finish(result)
    }

    async fn read_from_cursor(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.ensure_open()?;
        let (content, _) = self.fetch_content().await?;
        let copied = copy_range(&content, self.cursor, buf);
        self.cursor += copied as u64;
        short_read(copied, buf.len())
    }

    /// Fill `buf` from `offset` without moving the cursor.
    ///
    /// The range is checked against the cached size before any I/O.
    pub async fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        let span = self.observer.start(Operation::ReadAt, self.location.to_string());
        let result = self.read_from_offset(buf, offset).await;
        span.finish(result)
    }

    async fn read_from_offset(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        self.ensure_open()?;
        let len = buf.len() as u64;
        if offset.checked_add(len).is_none_or(|end| end > self.size) {
            return Err(Error::out_of_range(offset.into(), len, self.size));
        }
        let (content, _) = self.fetch_content().await?;
        let copied = copy_range(&content, offset, buf);
        short_read(copied, buf.len())
    }

    /// Write `data` at the cursor and advance it.
    ///
    /// At offset 0 the object is replaced by `data` outright, dropping any
    /// previous content past `data.len()`. Elsewhere the existing object is
    /// fetched and `data` is spliced over it, keeping the tail.
    pub async fn write(&mut self, data: &[u8]) -> Result<usize> {
        let span = self.observer.start(Operation::Write, self.location.to_string());
        let result = self.write_at_cursor(data).await;
        span.finish(result)
    }

    async fn write_at_cursor(&mut self, data: &[u8]) -> Result<usize> {
        self.ensure_open()?;
        let (payload, condition) = if self.cursor == 0 {
            (
                Bytes::copy_from_slice(data),
                self.condition_for(self.version.clone()),
            )
        } else {
            let (existing, version) = self.fetch_content().await?;
            (splice(&existing, self.cursor, data)?, self.condition_for(version))
        };
        self.replace(payload, condition).await?;
        self.cursor += data.len() as u64;
        Ok(data.len())
    }

    /// Splice `data` over the object at `offset` without moving the cursor
    pub async fn write_at(&mut self, data: &[u8], offset: u64) -> Result<usize> {
        let span = self.observer.start(Operation::WriteAt, self.location.to_string());
        let result = self.write_at_offset(data, offset).await;
        span.finish(result)
    }

    async fn write_at_offset(&mut self, data: &[u8], offset: u64) -> Result<usize> {
        self.ensure_open()?;
        let (existing, version) = self.fetch_content().await?;
        let payload = splice(&existing, offset, data)?;
        let condition = self.condition_for(version);
        self.replace(payload, condition).await?;
        Ok(data.len())
    }

    /// Move the cursor. The target must lie within `[0, size]`.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        let span = self.observer.start(Operation::Seek, self.location.to_string());
        let result = self.resolve_seek(pos);
        span.finish(result)
    }

    /// [`seek`](Self::seek) with a numeric whence: 0 start, 1 current, 2 end
    pub fn seek_whence(&mut self, offset: i64, whence: i32) -> Result<u64> {
        let span = self.observer.start(Operation::Seek, self.location.to_string());
        let result = match whence {
            SEEK_START => match u64::try_from(offset) {
                Ok(offset) => self.resolve_seek(SeekFrom::Start(offset)),
                Err(_) => Err(Error::out_of_range(offset.into(), 0, self.size)),
            },
            SEEK_CURRENT => self.resolve_seek(SeekFrom::Current(offset)),
            SEEK_END => self.resolve_seek(SeekFrom::End(offset)),
            other => Err(Error::InvalidWhence(other)),
        };
        span.finish(result)
    }

    fn resolve_seek(&mut self, pos: SeekFrom) -> Result<u64> {
        self.ensure_open()?;
        let target: i128 = match pos {
            SeekFrom::Start(offset) => offset.into(),
            SeekFrom::Current(offset) => i128::from(self.cursor) + i128::from(offset),
            SeekFrom::End(offset) => i128::from(self.size) + i128::from(offset),
        };
        if target < 0 || target > i128::from(self.size) {
            return Err(Error::out_of_range(target, 0, self.size));
        }
        self.cursor = target as u64;
        Ok(self.cursor)
    }

    /// Release the handle. Closing twice is a no-op; any other call on a
    /// closed handle fails with [`Error::Closed`].
    pub fn close(&mut self) -> Result<()> {
        let span = self.observer.start(Operation::Close, self.location.to_string());
        self.closed = true;
        span.finish(Ok(()))
    }

    /// Fetch the whole object and decode it as rows
    pub async fn read_all(&self) -> Result<RowReader> {
        let span = self.observer.start(Operation::ReadAll, self.location.to_string());
        let result = self.decode_rows().await;
        span.finish(result)
    }

    async fn decode_rows(&self) -> Result<RowReader> {
        self.ensure_open()?;
        let (content, _) = self.fetch_content().await?;
        RowReader::new(self.location.name(), content)
    }

    /// Last path segment of the key
    #[must_use]
    pub fn name(&self) -> String {
        let name = self.location.name().to_string();
        self.observer
            .start(Operation::GetName, self.location.to_string())
            .success(name)
    }

    /// Cached object size in bytes
    #[must_use]
    pub fn size(&self) -> u64 {
        self.observer
            .start(Operation::Size, self.location.to_string())
            .success(self.size)
    }

    #[must_use]
    pub fn mod_time(&self) -> DateTime<Utc> {
        self.observer
            .start(Operation::LastModified, self.location.to_string())
            .success(self.last_modified)
    }

    /// True when the key is a directory marker (ends with `/`)
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.observer
            .start(Operation::IsDir, self.location.to_string())
            .success(self.location.is_dir())
    }

    #[must_use]
    pub fn mode(&self) -> u32 {
        let mode = if self.location.is_dir() {
            DEFAULT_DIR_MODE
        } else {
            DEFAULT_FILE_MODE
        };
        self.observer
            .start(Operation::FileMode, self.location.to_string())
            .success(mode)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(Error::closed(self.location.to_string()))
        } else {
            Ok(())
        }
    }

    async fn fetch_content(&self) -> Result<(Vec<u8>, Option<ObjectVersion>)> {
        let fetched = self.backend.fetch(&self.location).await?;
        let version = fetched.info.version.clone();
        Ok((fetched.into_bytes().await?, version))
    }

    fn condition_for(&self, observed: Option<ObjectVersion>) -> StoreCondition {
        match (self.policy, observed) {
            (WritePolicy::Conditional, Some(version)) => StoreCondition::Matches(version),
            _ => StoreCondition::Overwrite,
        }
    }

    /// Store `payload` as the whole object and refresh the cached state
    async fn replace(&mut self, payload: Bytes, condition: StoreCondition) -> Result<()> {
        let len = payload.len() as u64;
        let version = self
            .backend
            .store(&self.location, payload, Some(&self.content_type), condition)
            .await?;
        self.size = len;
        self.version = Some(version);
        self.last_modified = Utc::now();
        Ok(())
    }
}

/// Copy `content[offset..]` into `buf` as far as both allow
fn copy_range(content: &[u8], offset: u64, buf: &mut [u8]) -> usize {
    let start = usize::try_from(offset).unwrap_or(usize::MAX).min(content.len());
    let end = start.saturating_add(buf.len()).min(content.len());
    let copied = end - start;
    buf[..copied].copy_from_slice(&content[start..end]);
    copied
}

fn short_read(copied: usize, wanted: usize) -> Result<usize> {
    if copied < wanted {
        Err(Error::UnexpectedEof { read: copied })
    } else {
        Ok(copied)
    }
}

/// `existing[..offset] + data + existing[offset + data.len()..]`
///
/// Fails if `offset` lies past the end of `existing`.
pub(crate) fn splice(existing: &[u8], offset: u64, data: &[u8]) -> Result<Bytes> {
    let at = usize::try_from(offset)
        .ok()
        .filter(|at| *at <= existing.len())
        .ok_or_else(|| Error::out_of_range(offset.into(), data.len() as u64, existing.len() as u64))?;

    let mut out = Vec::with_capacity(existing.len().max(at + data.len()));
    out.extend_from_slice(&existing[..at]);
    out.extend_from_slice(data);
    if let Some(tail) = existing.get(at + data.len()..) {
        out.extend_from_slice(tail);
    }
    Ok(out.into())
}
