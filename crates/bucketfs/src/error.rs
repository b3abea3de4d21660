// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by remote files, row readers and the filesystem layer
#[derive(Error, Debug)]
pub enum Error {
    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Entry already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Cannot move {from} to {to}: containers differ")]
    CrossContainer { from: String, to: String },

    #[error("Offset {offset} with length {len} is out of range for size {size}")]
    OutOfRange { offset: i128, len: u64, size: u64 },

    #[error("Invalid whence value: {0}")]
    InvalidWhence(i32),

    /// The object ended before the buffer was filled; `read` bytes are valid.
    #[error("Unexpected end of object after {read} bytes")]
    UnexpectedEof { read: usize },

    #[error("Backend returned no content for {0}")]
    ResponseNil(String),

    #[error("Object was modified concurrently: {0}")]
    Conflict(String),

    #[error("File is closed: {0}")]
    Closed(String),

    #[error("Changing directory is not supported")]
    ChdirNotSupported,

    #[error("No current row; call next() first")]
    NoCurrentRow,

    #[error("Content is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    ObjectStore(#[from] object_store::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn not_found<S: AsRef<str>>(path: S) -> Self {
        Error::NotFound(path.as_ref().into())
    }

    pub fn already_exists<S: AsRef<str>>(path: S) -> Self {
        Error::AlreadyExists(path.as_ref().into())
    }

    pub fn invalid_path<S: AsRef<str>>(path: S) -> Self {
        Error::InvalidPath(path.as_ref().into())
    }

    pub fn not_a_directory<S: AsRef<str>>(path: S) -> Self {
        Error::NotADirectory(path.as_ref().into())
    }

    pub fn response_nil<S: AsRef<str>>(path: S) -> Self {
        Error::ResponseNil(path.as_ref().into())
    }

    pub fn conflict<S: AsRef<str>>(path: S) -> Self {
        Error::Conflict(path.as_ref().into())
    }

    pub fn closed<S: AsRef<str>>(path: S) -> Self {
        Error::Closed(path.as_ref().into())
    }

    pub fn out_of_range(offset: i128, len: u64, size: u64) -> Self {
        Error::OutOfRange { offset, len, size }
    }

    /// True for the range-check failures of `read_at`, `write_at` and `seek`
    #[must_use]
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Error::OutOfRange { .. })
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound(_) => true,
            Error::ObjectStore(object_store::Error::NotFound { .. }) => true,
            _ => false,
        }
    }
}
