//! Loading of the process-wide [`ProcessConfig`] from a TOML file at startup.

use crate::config::types::ProcessConfig;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Reads and parses the coordinator's startup configuration file.
pub fn load_process_config(path: &Path) -> Result<ProcessConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: ProcessConfig = toml::from_str(&content)?;

    if config.database_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    Ok(config)
}

/// Hex-encoded SHA-256 hash of the config file's content. Stored alongside a
/// run's provenance so operators can tell which file a run started under —
/// this is not a substitute for the per-run JSON `configure` payload.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads the process config and returns it along with its content hash.
pub fn load_process_config_with_hash(path: &Path) -> Result<(ProcessConfig, String), ConfigError> {
    let config = load_process_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_valid_config() {
        let file = temp_config(
            r#"
bind-address = "0.0.0.0:9000"
database-path = "./coordinator.db"
maintenance-tick-seconds = 30
"#,
        );
        let config = load_process_config(file.path()).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:9000");
        assert_eq!(config.database_path, "./coordinator.db");
        assert_eq!(config.maintenance_tick_seconds, 30);
    }

    #[test]
    fn defaults_apply_when_omitted() {
        let file = temp_config(r#"database-path = "./coordinator.db""#);
        let config = load_process_config(file.path()).unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:8080");
        assert_eq!(config.maintenance_tick_seconds, 60);
    }

    #[test]
    fn missing_database_path_rejected() {
        let file = temp_config(r#"bind-address = "127.0.0.1:8080""#);
        assert!(load_process_config(file.path()).is_err());
    }

    #[test]
    fn invalid_toml_rejected() {
        let file = temp_config("not valid toml {{{");
        assert!(load_process_config(file.path()).is_err());
    }

    #[test]
    fn nonexistent_path_rejected() {
        assert!(load_process_config(Path::new("/nonexistent/config.toml")).is_err());
    }

    #[test]
    fn same_content_same_hash() {
        let file = temp_config("database-path = \"./x.db\"");
        let h1 = compute_config_hash(file.path()).unwrap();
        let h2 = compute_config_hash(file.path()).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
    }
}
