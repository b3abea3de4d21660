// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::backend::ObjectInfo;
use crate::location::Location;
use chrono::{DateTime, Utc};

/// Object stores have no permission model; files report this mode
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// Mode reported for directory markers and emulated directories
pub const DEFAULT_DIR_MODE: u32 = 0o755;

/// Stat and directory-listing result
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    pub name: String,
    pub location: Location,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
    pub content_type: Option<String>,
    pub is_dir: bool,
}

impl FileInfo {
    pub(crate) fn from_object(info: &ObjectInfo) -> Self {
        Self {
            name: info.location.name().to_string(),
            location: info.location.clone(),
            size: info.size,
            last_modified: info.last_modified,
            content_type: info
                .content_type
                .clone()
                .or_else(|| Some(guess_content_type(info.location.key()))),
            is_dir: info.location.is_dir(),
        }
    }

    /// Aggregate a directory from the objects listed under it
    pub(crate) fn directory(location: &Location, contents: &[ObjectInfo]) -> Self {
        Self {
            name: location.name().to_string(),
            location: location.as_dir(),
            size: contents.iter().map(|o| o.size).sum(),
            last_modified: contents
                .iter()
                .map(|o| o.last_modified)
                .max()
                .unwrap_or_default(),
            content_type: None,
            is_dir: true,
        }
    }

    #[must_use]
    pub fn mode(&self) -> u32 {
        if self.is_dir {
            DEFAULT_DIR_MODE
        } else {
            DEFAULT_FILE_MODE
        }
    }
}

/// Content type from the file extension, `application/octet-stream` when unknown
#[must_use]
pub fn guess_content_type(name: &str) -> String {
    mime_guess::from_path(name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
