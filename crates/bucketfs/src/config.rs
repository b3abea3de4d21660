// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! YAML configuration for building a [`FileSystem`]
//!
//! ```yaml
//! backend:
//!   kind: s3
//!   region: eu-west-1
//!   endpoint: http://localhost:9000
//!   allow_http: true
//! write_policy: conditional
//! ```

use crate::backend::{MemoryBackend, ObjectBackend, ObjectStoreBackend, StoreFactory};
use crate::error::{Error, Result};
use crate::file::WritePolicy;
use crate::fs::FileSystem;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendConfig {
    /// Process-local storage, lost on exit
    #[default]
    Memory,
    /// One directory per container under `root`
    Local { root: PathBuf },
    /// One bucket per container; credentials from the AWS environment variables
    S3 {
        #[serde(default)]
        region: Option<String>,
        #[serde(default)]
        endpoint: Option<String>,
        #[serde(default)]
        allow_http: bool,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub write_policy: WritePolicy,
}

impl BackendConfig {
    /// The `kind` tag as written in YAML
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            BackendConfig::Memory => "memory",
            BackendConfig::Local { .. } => "local",
            BackendConfig::S3 { .. } => "s3",
        }
    }
}

impl Config {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml_ng::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml_ng::to_string(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Read and parse a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        Self::from_yaml_str(&text)
    }

    /// Local storage rooted at `root`
    #[must_use]
    pub fn local<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            backend: BackendConfig::Local { root: root.into() },
            write_policy: WritePolicy::default(),
        }
    }

    fn build_backend(&self) -> Arc<dyn ObjectBackend> {
        match &self.backend {
            BackendConfig::Memory => Arc::new(MemoryBackend::new()),
            BackendConfig::Local { root } => Arc::new(ObjectStoreBackend::new(StoreFactory::Local {
                root: root.clone(),
            })),
            BackendConfig::S3 {
                region,
                endpoint,
                allow_http,
            } => Arc::new(ObjectStoreBackend::new(StoreFactory::S3 {
                region: region.clone(),
                endpoint: endpoint.clone(),
                allow_http: *allow_http,
            })),
        }
    }
}

impl FileSystem {
    /// Build a filesystem from configuration. Stores are created lazily
    /// per container, so bad credentials surface on first use.
    ///
    /// Fails with `Error::Config` when the write policy needs version
    /// preconditions the backend cannot check.
    pub fn from_config(config: &Config) -> Result<Self> {
        let backend = format!("{:?}", config.backend);
        diagnostics::info!("Configuring filesystem with {backend}", backend: backend);

        let store = config.build_backend();
        if config.write_policy == WritePolicy::Conditional && !store.supports_conditional_writes() {
            return Err(Error::Config(format!(
                "write_policy 'conditional' is not supported by the {} backend",
                config.backend.kind()
            )));
        }
        Ok(FileSystem::new(store).with_write_policy(config.write_policy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_yaml_str("{}").unwrap();
        assert_eq!(config.backend, BackendConfig::Memory);
        assert_eq!(config.write_policy, WritePolicy::LastWriterWins);
    }

    #[test]
    fn test_parse_s3() {
        let config = Config::from_yaml_str(
            "backend:\n  kind: s3\n  region: eu-west-1\n  allow_http: true\nwrite_policy: conditional\n",
        )
        .unwrap();
        assert_eq!(
            config.backend,
            BackendConfig::S3 {
                region: Some("eu-west-1".into()),
                endpoint: None,
                allow_http: true,
            }
        );
        assert_eq!(config.write_policy, WritePolicy::Conditional);
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = Config::local("/tmp/bfs");
        let text = config.to_yaml_string().unwrap();
        assert_eq!(Config::from_yaml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_unknown_kind() {
        let err = Config::from_yaml_str("backend:\n  kind: ftp\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_backend_kind() {
        assert_eq!(BackendConfig::Memory.kind(), "memory");
        assert_eq!(Config::local("/tmp/bfs").backend.kind(), "local");
    }

    #[test]
    fn test_conditional_policy_needs_capable_backend() {
        let mut config = Config::local("/tmp/bfs");
        config.write_policy = WritePolicy::Conditional;
        match FileSystem::from_config(&config) {
            Err(Error::Config(msg)) => assert!(msg.contains("local"), "{msg}"),
            other => panic!("expected a config error, got {other:?}"),
        }

        let memory = Config {
            backend: BackendConfig::Memory,
            write_policy: WritePolicy::Conditional,
        };
        let fs = FileSystem::from_config(&memory).unwrap();
        assert_eq!(fs.write_policy(), WritePolicy::Conditional);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(Config::load("/nonexistent/bfs.yaml"), Err(Error::Config(_))));
    }
}
