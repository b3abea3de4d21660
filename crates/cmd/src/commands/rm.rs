// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use bucketfs::FileSystem;
use diagnostics::info;

pub async fn rm_command(fs: &FileSystem, path: &str, recursive: bool) -> Result<()> {
    if recursive {
        fs.remove_all(path).await?;
    } else {
        fs.remove(path).await?;
    }
    info!("Removed {path}", path: path);
    Ok(())
}
