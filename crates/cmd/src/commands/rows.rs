// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;

use anyhow::{Result, anyhow};
use bucketfs::{FileSystem, RowReader};
use diagnostics::debug;
use serde_json::Value;

/// Print one row per line: text lines verbatim, JSON elements compacted
pub async fn rows_command<W: Write>(fs: &FileSystem, path: &str, out: &mut W) -> Result<usize> {
    let file = fs.open(path).await?;
    let reader = file.read_all().await?;
    if let RowReader::Json(json) = &reader {
        let shape = if json.is_array() { "array" } else { "value" };
        debug!("Reading {path} as a JSON {shape}", path: path, shape: shape);
    }

    let mut count = 0;
    for row in reader.rows::<Value>() {
        let line = match row? {
            Value::String(text) => text,
            other => other.to_string(),
        };
        writeln!(out, "{}", line).map_err(|e| anyhow!("Failed to write to stdout: {}", e))?;
        count += 1;
    }
    Ok(count)
}
