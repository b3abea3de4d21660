// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;

use anyhow::{Result, anyhow};
use bucketfs::FileSystem;

use crate::common::format_entry;

pub async fn list_command<W: Write>(fs: &FileSystem, path: &str, out: &mut W) -> Result<()> {
    for entry in fs.read_dir(path).await? {
        writeln!(out, "{}", format_entry(&entry))
            .map_err(|e| anyhow!("Failed to write to stdout: {}", e))?;
    }
    Ok(())
}
