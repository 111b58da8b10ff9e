//! Topology configuration.
//!
//! A YAML file maps every environment name to its control endpoint and the
//! peers it connects to at startup:
//!
//! ```yaml
//! alpha:
//!   ip: 127.0.0.1
//!   port: 5500
//!   connections: [beta]
//! beta:
//!   ip: 127.0.0.1
//!   port: 5501
//!   connections: []
//! ```

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::path::Path;

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use super::error::SystemError;

/// One environment's endpoint and startup connections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentSpec {
    pub ip: String,
    /// Control port. Zero picks an ephemeral port at bind time.
    pub port: u16,
    #[serde(default)]
    pub connections: Vec<String>,
}

impl EnvironmentSpec {
    /// `ip:port` as a dialable address.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }
}

/// The whole program's environment map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topology {
    environments: HashMap<String, EnvironmentSpec>,
}

impl Topology {
    /// Parse a YAML topology file.
    pub fn from_path(path: &Path) -> Result<Self, SystemError> {
        let text = std::fs::read_to_string(path).map_err(|source| SystemError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let topology: Self =
            serde_yaml::from_str(&text).map_err(|e| SystemError::ConfigParse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        topology.validate()?;
        Ok(topology)
    }

    /// Look up one environment.
    pub fn environment(&self, name: &str) -> Result<&EnvironmentSpec, SystemError> {
        self.environments
            .get(name)
            .ok_or_else(|| SystemError::UnknownEnvironment(name.to_string()))
    }

    /// Every connection must name a declared environment.
    pub fn validate(&self) -> Result<(), SystemError> {
        for (env, spec) in &self.environments {
            for peer in &spec.connections {
                if !self.environments.contains_key(peer) {
                    return Err(SystemError::UnknownConnection {
                        env: env.clone(),
                        peer: peer.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Builder used by embedders and tests.
    pub fn with_environment(mut self, name: impl Into<String>, spec: EnvironmentSpec) -> Self {
        self.environments.insert(name.into(), spec);
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
alpha:
  ip: 127.0.0.1
  port: 5500
  connections: [beta]
beta:
  ip: 127.0.0.1
  port: 5501
";

    #[test]
    fn test_parse_sample_topology() {
        let topology: Topology = serde_yaml::from_str(SAMPLE).unwrap();

        let alpha = topology.environment("alpha").unwrap();
        assert_eq!(alpha.addr(), "127.0.0.1:5500");
        assert_eq!(alpha.connections, vec!["beta"]);

        // `connections` defaults to empty.
        assert!(topology.environment("beta").unwrap().connections.is_empty());
        assert!(topology.validate().is_ok());
    }

    #[test]
    fn test_unknown_environment_lookup() {
        let topology: Topology = serde_yaml::from_str(SAMPLE).unwrap();

        assert!(matches!(
            topology.environment("gamma").unwrap_err(),
            SystemError::UnknownEnvironment(_)
        ));
    }

    #[test]
    fn test_validate_rejects_undeclared_connection() {
        let topology = Topology::default().with_environment(
            "alpha",
            EnvironmentSpec {
                ip: "127.0.0.1".to_string(),
                port: 0,
                connections: vec!["ghost".to_string()],
            },
        );

        assert!(matches!(
            topology.validate().unwrap_err(),
            SystemError::UnknownConnection { .. }
        ));
    }
}
