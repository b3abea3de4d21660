// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Result, anyhow};
use bucketfs::{FileSystem, Location};
use diagnostics::{debug, info};

/// Create or replace `path` with `content`
pub async fn put_command(fs: &FileSystem, path: &str, content: &[u8], parents: bool) -> Result<()> {
    if parents {
        let parent = Location::parse(path)?.parent();
        if !parent.is_root() {
            debug!("Creating parent directories for {path}", path: path);
            fs.mkdir_all(&parent.to_string()).await?;
        }
    }

    let mut file = fs.create(path).await?;
    let written = file
        .write(content)
        .await
        .map_err(|e| anyhow!("Failed to write '{}': {}", path, e))?;
    file.close()?;

    info!("Wrote {written} bytes to {path}", written: written, path: path);
    Ok(())
}

/// Overwrite part of an existing file in place
pub async fn write_at_command(fs: &FileSystem, path: &str, offset: u64, data: &[u8]) -> Result<u64> {
    let mut file = fs.open(path).await?;
    let written = file
        .write_at(data, offset)
        .await
        .map_err(|e| anyhow!("Failed to write '{}' at offset {}: {}", path, offset, e))?;
    let size = file.size();
    file.close()?;

    info!(
        "Wrote {written} bytes to {path} at {offset}; size is now {size}",
        written: written,
        path: path,
        offset: offset,
        size: size
    );
    Ok(size)
}
