// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;

use anyhow::{Result, anyhow};
use bucketfs::FileSystem;

pub async fn stat_command<W: Write>(fs: &FileSystem, path: &str, out: &mut W) -> Result<()> {
    let info = fs.stat(path).await?;
    let kind = if info.is_dir { "directory" } else { "file" };
    writeln!(
        out,
        "Path: {}\nType: {}\nSize: {}\nMode: {:o}\nModified: {}\nContent-Type: {}",
        info.location,
        kind,
        info.size,
        info.mode(),
        info.last_modified.to_rfc3339(),
        info.content_type.as_deref().unwrap_or("-"),
    )
    .map_err(|e| anyhow!("Failed to write to stdout: {}", e))
}
