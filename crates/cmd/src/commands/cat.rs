// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::{SeekFrom, Write};

use anyhow::{Result, anyhow};
use bucketfs::FileSystem;
use diagnostics::debug;

/// Copy a file to `out`, starting at `offset`
pub async fn cat_command<W: Write>(
    fs: &FileSystem,
    path: &str,
    offset: u64,
    out: &mut W,
) -> Result<()> {
    let mut file = fs.open(path).await?;
    let start = file.seek(SeekFrom::Start(offset))?;

    // Every read fetches the whole object, so read the remainder in one go
    let remaining = usize::try_from(file.size() - start)
        .map_err(|_| anyhow!("File '{}' is too large to buffer", path))?;
    let mut buf = vec![0; remaining];
    let read = file
        .read(&mut buf)
        .await
        .map_err(|e| anyhow!("Failed to read '{}': {}", path, e))?;
    file.close()?;

    out.write_all(&buf[..read])
        .map_err(|e| anyhow!("Failed to write to stdout: {}", e))?;
    debug!("Copied {read} bytes from {path}", read: read, path: path);
    Ok(())
}
