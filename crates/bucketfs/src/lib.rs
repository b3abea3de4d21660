// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Seekable files and emulated directories over object storage
//!
//! Object stores only support whole-object GET and PUT. This crate layers
//! POSIX-like random access on top:
//!
//! - **RemoteFile**: `read`, `read_at`, `write`, `write_at`, `seek` on one key
//! - **RowReader**: lines or JSON elements over a fully read file
//! - **FileSystem**: create/open handles, directories as key prefixes
//!
//! Paths have the form `container/relative/key`; the first segment is the
//! container (bucket).
//!
//! # Usage
//!
//! ```no_run
//! # async fn example() -> bucketfs::Result<()> {
//! use bucketfs::FileSystem;
//! use std::io::SeekFrom;
//!
//! let fs = FileSystem::memory();
//! let mut file = fs.create("bucket/greeting.txt").await?;
//! file.write(b"Hello, World!").await?;
//! file.write_at(b"GoFr", 7).await?;
//!
//! file.seek(SeekFrom::Start(0))?;
//! let mut buf = vec![0; 13];
//! file.read(&mut buf).await?;
//! assert_eq!(&buf, b"Hello, GoFrd!");
//! # Ok(())
//! # }
//! ```

pub mod backend;
mod config;
mod error;
mod file;
mod fs;
mod info;
mod location;
mod observe;
mod rows;

#[cfg(test)]
mod tests;

pub use backend::{
    FetchedObject, MemoryBackend, ObjectBackend, ObjectBody, ObjectInfo, ObjectStoreBackend,
    ObjectVersion, StoreCondition, StoreFactory,
};
pub use config::{BackendConfig, Config};
pub use error::{Error, Result};
pub use file::{RemoteFile, SEEK_CURRENT, SEEK_END, SEEK_START, WritePolicy};
pub use fs::FileSystem;
pub use info::{DEFAULT_DIR_MODE, DEFAULT_FILE_MODE, FileInfo, guess_content_type};
pub use location::{Location, SEPARATOR};
pub use observe::{
    FILE_STATS_HISTOGRAM, Metrics, NoopMetrics, Observer, Operation, OperationLog,
    RecordingMetrics, Sample, Span, Status,
};
pub use rows::{JsonRows, RowReader, Rows, TextRows};
