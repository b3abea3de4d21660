// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use bucketfs::{Config, FileInfo, FileSystem};

/// Environment variable naming a YAML config file when `--config` is absent
pub const CONFIG_ENV: &str = "BFS_CONFIG";

/// Resolve configuration: explicit path, then `BFS_CONFIG`, then local
/// storage rooted at the current directory
pub fn load_config(override_path: Option<PathBuf>) -> Result<Config> {
    let path = override_path.or_else(|| env::var(CONFIG_ENV).ok().map(PathBuf::from));
    match path {
        Some(path) => Config::load(&path)
            .map_err(|e| anyhow!("Failed to load config '{}': {}", path.display(), e)),
        None => {
            let cwd = env::current_dir()
                .map_err(|e| anyhow!("Failed to determine current directory: {}", e))?;
            Ok(Config::local(cwd))
        }
    }
}

pub fn open_filesystem(override_path: Option<PathBuf>) -> Result<FileSystem> {
    let config = load_config(override_path)?;
    Ok(FileSystem::from_config(&config)?)
}

/// Helper function to format file sizes
#[must_use]
pub fn format_file_size(size: u64) -> String {
    if size >= 1024 * 1024 {
        format!("{:.1}MB", size as f64 / (1024.0 * 1024.0))
    } else if size >= 1024 {
        format!("{:.1}KB", size as f64 / 1024.0)
    } else {
        format!("{}B", size)
    }
}

/// One listing line: type, mode, size, modification time, name
#[must_use]
pub fn format_entry(info: &FileInfo) -> String {
    let type_symbol = if info.is_dir { "d" } else { "-" };
    let size_str = if info.is_dir {
        "-".to_string()
    } else {
        format_file_size(info.size)
    };
    let name = if info.is_dir {
        format!("{}/", info.name)
    } else {
        info.name.clone()
    };
    format!(
        "{}{:o} {:>8} {} {}",
        type_symbol,
        info.mode(),
        size_str,
        info.last_modified.format("%Y-%m-%d %H:%M:%S"),
        name
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(12), "12B");
        assert_eq!(format_file_size(2048), "2.0KB");
        assert_eq!(format_file_size(3 * 1024 * 1024), "3.0MB");
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let err = load_config(Some(PathBuf::from("/nonexistent/bfs.yaml"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/bfs.yaml"));
    }

    #[test]
    fn test_local_conditional_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bfs.yaml");
        std::fs::write(
            &path,
            format!(
                "backend:\n  kind: local\n  root: {}\nwrite_policy: conditional\n",
                dir.path().display()
            ),
        )
        .unwrap();

        let err = open_filesystem(Some(path)).unwrap_err();
        assert!(err.to_string().contains("conditional"), "{err}");
    }
}
