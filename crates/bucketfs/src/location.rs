// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Container-qualified object locations
//!
//! Every path handed to this crate has the form `container/relative/key`.
//! The first segment names the container (bucket); the remainder is the
//! object key, which may contain further `/` separators that simulate
//! subdirectories. A key ending in `/` is a directory marker.

use crate::error::{Error, Result};
use std::fmt;

pub const SEPARATOR: char = '/';

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    container: String,
    key: String,
}

impl Location {
    /// Parse `container/key`. Leading separators are ignored.
    pub fn parse<S: AsRef<str>>(path: S) -> Result<Self> {
        let path = path.as_ref();
        let trimmed = path.trim_start_matches(SEPARATOR);
        let (container, key) = match trimmed.split_once(SEPARATOR) {
            Some((container, key)) => (container, key),
            None => (trimmed, ""),
        };

        if container.is_empty() {
            return Err(Error::invalid_path(path));
        }
        if key.contains("//") {
            return Err(Error::invalid_path(path));
        }

        Ok(Self {
            container: container.to_string(),
            key: key.to_string(),
        })
    }

    pub fn new<C: Into<String>, K: Into<String>>(container: C, key: K) -> Self {
        Self {
            container: container.into(),
            key: key.into(),
        }
    }

    #[must_use]
    pub fn container(&self) -> &str {
        &self.container
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The container itself, with no key
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.key.is_empty()
    }

    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.key.ends_with(SEPARATOR)
    }

    /// Fails unless the location names an object rather than the container
    pub fn require_key(&self) -> Result<()> {
        if self.is_root() {
            Err(Error::invalid_path(self.to_string()))
        } else {
            Ok(())
        }
    }

    /// Final path segment, ignoring a trailing separator
    #[must_use]
    pub fn name(&self) -> &str {
        let trimmed = self.key.trim_end_matches(SEPARATOR);
        if trimmed.is_empty() {
            return &self.container;
        }
        match trimmed.rsplit_once(SEPARATOR) {
            Some((_, name)) => name,
            None => trimmed,
        }
    }

    /// Key prefix that lists everything below this location
    #[must_use]
    pub fn dir_prefix(&self) -> String {
        if self.is_root() || self.is_dir() {
            self.key.clone()
        } else {
            format!("{}{}", self.key, SEPARATOR)
        }
    }

    /// The directory-marker form of this location
    #[must_use]
    pub fn as_dir(&self) -> Self {
        Self::new(self.container.clone(), self.dir_prefix())
    }

    /// The same location with any trailing separator removed
    #[must_use]
    pub fn as_file(&self) -> Self {
        Self::new(
            self.container.clone(),
            self.key.trim_end_matches(SEPARATOR),
        )
    }

    /// The enclosing directory, in marker form. The container root is its own parent.
    #[must_use]
    pub fn parent(&self) -> Self {
        let trimmed = self.key.trim_end_matches(SEPARATOR);
        match trimmed.rsplit_once(SEPARATOR) {
            Some((parent, _)) => Self::new(self.container.clone(), format!("{parent}{SEPARATOR}")),
            None => Self::new(self.container.clone(), ""),
        }
    }

    /// Every ancestor directory below the container root, outermost first
    #[must_use]
    pub fn ancestors(&self) -> Vec<Self> {
        let mut out = Vec::new();
        let mut current = self.parent();
        while !current.is_root() {
            out.push(current.clone());
            current = current.parent();
        }
        out.reverse();
        out
    }

    /// Location of `name` directly inside this directory
    #[must_use]
    pub fn child(&self, name: &str) -> Self {
        Self::new(self.container.clone(), format!("{}{}", self.dir_prefix(), name))
    }

    /// Replace the leading `from` prefix of the key with `to`
    #[must_use]
    pub fn rebase(&self, from: &str, to: &str) -> Option<Self> {
        self.key
            .strip_prefix(from)
            .map(|rest| Self::new(self.container.clone(), format!("{to}{rest}")))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.container, SEPARATOR, self.key)
    }
}
