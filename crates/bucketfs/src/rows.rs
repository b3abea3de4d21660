// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Row-oriented decoding over a fully buffered file
//!
//! Files named `*.json` decode as JSON: an array yields one row per
//! element, any other value is a single row. Everything else is split
//! into lines. Readers are forward-only and cannot be restarted.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::VecDeque;

#[derive(Debug)]
pub enum RowReader {
    Text(TextRows),
    Json(JsonRows),
}

impl RowReader {
    /// Choose the variant from the file name and take ownership of `content`
    pub fn new(name: &str, content: Vec<u8>) -> Result<Self> {
        if name.ends_with(".json") {
            Ok(RowReader::Json(JsonRows::new(&content)?))
        } else {
            Ok(RowReader::Text(TextRows::new(content)?))
        }
    }

    /// Advance to the next row; false once the sequence is exhausted.
    ///
    /// Each call moves past exactly one row whether or not it was scanned.
    pub fn next(&mut self) -> bool {
        match self {
            RowReader::Text(rows) => rows.next(),
            RowReader::Json(rows) => rows.next(),
        }
    }

    /// Decode the current row as `T`.
    ///
    /// Text rows decode as JSON strings, so only string-like targets succeed.
    pub fn scan<T: DeserializeOwned>(&mut self) -> Result<T> {
        match self {
            RowReader::Text(rows) => {
                let line = rows.scan_line()?;
                Ok(serde_json::from_value(Value::String(line))?)
            }
            RowReader::Json(rows) => rows.scan(),
        }
    }

    /// Iterate the remaining rows decoded as `T`
    pub fn rows<T: DeserializeOwned>(self) -> Rows<T> {
        Rows {
            reader: self,
            _marker: std::marker::PhantomData,
        }
    }

    #[must_use]
    pub fn is_json(&self) -> bool {
        matches!(self, RowReader::Json(_))
    }
}

/// Newline-delimited text rows
#[derive(Debug)]
pub struct TextRows {
    lines: VecDeque<String>,
    current: Option<String>,
}

impl TextRows {
    fn new(content: Vec<u8>) -> Result<Self> {
        let text = String::from_utf8(content)?;
        Ok(Self {
            lines: text.lines().map(str::to_string).collect(),
            current: None,
        })
    }

    pub fn next(&mut self) -> bool {
        self.current = self.lines.pop_front();
        self.current.is_some()
    }

    /// The line selected by the last successful `next()`
    pub fn scan_line(&mut self) -> Result<String> {
        self.current.clone().ok_or(Error::NoCurrentRow)
    }
}

/// JSON array elements, or one standalone JSON value
#[derive(Debug)]
pub struct JsonRows {
    pending: VecDeque<Value>,
    current: Option<Value>,
    array: bool,
}

impl JsonRows {
    fn new(content: &[u8]) -> Result<Self> {
        let array = content
            .iter()
            .find(|b| !b.is_ascii_whitespace())
            .is_some_and(|b| *b == b'[');

        let pending = if array {
            serde_json::from_slice::<Vec<Value>>(content)?.into()
        } else {
            VecDeque::from([serde_json::from_slice::<Value>(content)?])
        };
        Ok(Self {
            pending,
            current: None,
            array,
        })
    }

    pub fn next(&mut self) -> bool {
        self.current = self.pending.pop_front();
        self.current.is_some()
    }

    /// Decode the value selected by the last successful `next()`
    pub fn scan<T: DeserializeOwned>(&self) -> Result<T> {
        let value = self.current.as_ref().ok_or(Error::NoCurrentRow)?;
        Ok(T::deserialize(value)?)
    }

    /// Whether the content was a JSON array
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.array
    }
}

/// Iterator adapter returned by [`RowReader::rows`]
pub struct Rows<T> {
    reader: RowReader,
    _marker: std::marker::PhantomData<T>,
}

impl<T: DeserializeOwned> Iterator for Rows<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.reader.next() {
            Some(self.reader.scan())
        } else {
            None
        }
    }
}
