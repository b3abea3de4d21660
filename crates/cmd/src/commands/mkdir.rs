// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use bucketfs::FileSystem;
use diagnostics::{debug, info};

pub async fn mkdir_command(fs: &FileSystem, path: &str, parents: bool) -> Result<()> {
    debug!("Creating directory {path}", path: path);

    if parents {
        fs.mkdir_all(path).await?;
    } else {
        fs.mkdir(path).await?;
    }

    info!("Directory created successfully: {path}", path: path);
    Ok(())
}
