//! Simulation configuration: YAML structures, validation, and loading.

use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use serde::{Deserialize, Serialize};

use crate::topology::{self, Topology};

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid general configuration: {0}")]
    InvalidGeneral(String),
    #[error("Invalid network configuration: {0}")]
    InvalidNetwork(String),
}

/// Top-level simulation configuration.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    pub network: NetworkConfig,
}

/// Shared general configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeneralConfig {
    /// Node i listens on `base_port + i`.
    #[serde(default = "default_base_port")]
    pub base_port: u16,
    /// Optional JSON results file written after the run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results_path: Option<PathBuf>,
}

fn default_base_port() -> u16 {
    3001
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            base_port: default_base_port(),
            results_path: None,
        }
    }
}

/// Network configuration: the cost matrix comes either from a plain-text
/// file or inline from the YAML itself.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(untagged)]
pub enum NetworkConfig {
    File {
        path: PathBuf,
        #[serde(skip_serializing_if = "Option::is_none")]
        names: Option<Vec<String>>,
    },
    Inline {
        matrix: Vec<Vec<f64>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        names: Option<Vec<String>>,
    },
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.general.base_port == 0 {
            return Err(ValidationError::InvalidGeneral(
                "base_port must be nonzero".to_string(),
            ));
        }

        match &self.network {
            NetworkConfig::File { path, .. } => {
                if path.as_os_str().is_empty() {
                    return Err(ValidationError::InvalidNetwork(
                        "matrix path cannot be empty".to_string(),
                    ));
                }
            }
            NetworkConfig::Inline { matrix, .. } => {
                if matrix.is_empty() {
                    return Err(ValidationError::InvalidNetwork(
                        "inline matrix cannot be empty".to_string(),
                    ));
                }
            }
        }

        if let Some(names) = self.names() {
            if names.is_empty() {
                return Err(ValidationError::InvalidNetwork(
                    "names cannot be an empty list".to_string(),
                ));
            }
        }

        Ok(())
    }

    fn names(&self) -> Option<&Vec<String>> {
        match &self.network {
            NetworkConfig::File { names, .. } => names.as_ref(),
            NetworkConfig::Inline { names, .. } => names.as_ref(),
        }
    }

    /// Build the validated topology described by this configuration.
    pub fn topology(&self) -> Result<Topology> {
        match &self.network {
            NetworkConfig::File { path, names } => {
                topology::load_topology(path, names.clone()).wrap_err_with(|| {
                    format!("failed to load topology from '{}'", path.display())
                })
            }
            NetworkConfig::Inline { matrix, names } => {
                let names = match names {
                    Some(names) => names.clone(),
                    None => topology::default_names(matrix.len())?,
                };
                Ok(Topology::new(names, matrix.clone())?)
            }
        }
    }

    /// A default configuration around a bare matrix file, for the
    /// `--topology` CLI shortcut.
    pub fn for_matrix_file(path: PathBuf) -> Self {
        Self {
            general: GeneralConfig::default(),
            network: NetworkConfig::File { path, names: None },
        }
    }
}

/// Load and validate a configuration from a YAML file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read configuration file '{}'", path.display()))?;
    let config: Config = serde_yaml::from_str(&content)
        .wrap_err_with(|| format!("failed to parse configuration file '{}'", path.display()))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_file_network_parsing() {
        let yaml = r#"
general:
  base_port: 5000
network:
  path: "network.txt"
  names: [A, B, C]
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.general.base_port, 5000);
        match &config.network {
            NetworkConfig::File { path, names } => {
                assert_eq!(path, &PathBuf::from("network.txt"));
                assert_eq!(names.as_deref(), Some(&["A".to_string(), "B".to_string(), "C".to_string()][..]));
            }
            _ => panic!("expected a file network"),
        }
    }

    #[test]
    fn test_inline_network_parsing() {
        let yaml = r#"
network:
  matrix:
    - [0, 1, 5]
    - [1, 0, 1]
    - [5, 1, 0]
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.general.base_port, 3001);

        let topology = config.topology().unwrap();
        assert_eq!(topology.names(), &["A", "B", "C"]);
        assert_eq!(topology.cost(0, 2), 5.0);
    }

    #[test]
    fn test_validation_errors() {
        let yaml = r#"
general:
  base_port: 0
network:
  matrix:
    - [0]
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidGeneral(_))
        ));

        let yaml = r#"
network:
  matrix: []
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidNetwork(_))
        ));

        let yaml = r#"
network:
  path: ""
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidNetwork(_))
        ));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "general:").unwrap();
        writeln!(file, "  base_port: 6000").unwrap();
        writeln!(file, "network:").unwrap();
        writeln!(file, "  matrix:").unwrap();
        writeln!(file, "    - [0, 2]").unwrap();
        writeln!(file, "    - [2, 0]").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.general.base_port, 6000);
        assert_eq!(config.topology().unwrap().node_count(), 2);
    }

    #[test]
    fn test_for_matrix_file() {
        let config = Config::for_matrix_file(PathBuf::from("network.txt"));
        assert_eq!(config.general.base_port, 3001);
        assert!(config.validate().is_ok());
    }
}
