// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use bucketfs::FileSystem;
use diagnostics::info;

pub async fn mv_command(fs: &FileSystem, source: &str, dest: &str) -> Result<()> {
    fs.rename(source, dest).await?;
    info!("Moved {source} to {dest}", source: source, dest: dest);
    Ok(())
}
