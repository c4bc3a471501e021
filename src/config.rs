//! Provider configuration loading
//!
//! The config file is a JSON array of [`DriveConfig`] records, one per
//! storage provider. Loading validates provider names against the registry
//! before any client is constructed, so a typo fails fast instead of at
//! first use.

use crate::drive::{Drive, DriveConfig, DriveRegistry};
use crate::error::DriveError;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Platform config directory location for the default config file.
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "umbra", "umbra")
        .map(|dirs| dirs.config_dir().join("config.json"))
}

/// Read and validate the config file.
pub fn read(path: &Path, registry: &DriveRegistry) -> Result<Vec<DriveConfig>, DriveError> {
    let contents = fs::read(path).map_err(|e| {
        DriveError::InvalidConfig(format!("reading config {:?}: {}", path, e))
    })?;
    parse(&contents, registry)
        .map_err(|e| DriveError::InvalidConfig(format!("parsing {:?}: {}", path, e)))
}

/// Parse config file contents. Broken out from [`read`] so unmarshalling of
/// example configuration objects can be tested directly.
fn parse(contents: &[u8], registry: &DriveRegistry) -> Result<Vec<DriveConfig>, String> {
    let configs: Vec<DriveConfig> =
        serde_json::from_slice(contents).map_err(|e| format!("json unmarshal error: {}", e))?;
    if configs.is_empty() {
        return Err("no provider in config file".to_string());
    }
    for config in &configs {
        if !registry.is_registered(&config.provider) {
            return Err(format!("unsupported provider in config: {:?}", config.provider));
        }
    }
    Ok(configs)
}

/// Construct one client per configured provider.
pub fn clients(
    path: &Path,
    registry: &DriveRegistry,
) -> Result<Vec<Arc<dyn Drive>>, DriveError> {
    let configs = read(path, registry)?;
    let mut clients = Vec::with_capacity(configs.len());
    for config in configs {
        let provider = config.provider.clone();
        let client = registry.build(config)?;
        info!(provider = %provider, "initialized drive client");
        clients.push(client);
    }
    Ok(clients)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_memory_and_localdisk() {
        let registry = DriveRegistry::builtin();
        let contents = br#"[
            {"provider": "memory"},
            {"provider": "localdisk",
             "record_root": "/tmp/umbra/records",
             "chunk_root": "/tmp/umbra/chunks",
             "max_files": 100}
        ]"#;
        let configs = parse(contents, &registry).unwrap();
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0].provider, "memory");
        assert_eq!(configs[1].max_files, Some(100));
    }

    #[test]
    fn test_parse_rejects_empty_list() {
        let registry = DriveRegistry::builtin();
        let err = parse(b"[]", &registry).unwrap_err();
        assert!(err.contains("no provider"));
    }

    #[test]
    fn test_parse_rejects_unknown_provider() {
        let registry = DriveRegistry::builtin();
        let err = parse(br#"[{"provider": "zeppelin"}]"#, &registry).unwrap_err();
        assert!(err.contains("unsupported provider"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let registry = DriveRegistry::builtin();
        assert!(parse(b"not json", &registry).is_err());
    }

    #[test]
    fn test_clients_constructed_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        fs::write(&config_path, br#"[{"provider": "memory"}]"#).unwrap();

        let registry = DriveRegistry::builtin();
        let clients = clients(&config_path, &registry).unwrap();
        assert_eq!(clients.len(), 1);
        assert_eq!(clients[0].describe().provider, "memory");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let registry = DriveRegistry::builtin();
        assert!(read(Path::new("/no/such/config.json"), &registry).is_err());
    }
}
