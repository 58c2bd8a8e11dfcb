//! Hub configuration types.

use atheneum_peering::{NetMap, NodePair};
use atheneum_types::LibraryIdentity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid YAML for this schema.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    /// The file parsed but the values are unusable.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration for the Atheneum hub.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HubConfig {
    /// Display name of the library behind this hub.
    pub node_name: String,
    /// Description shown on the home endpoint.
    pub description: Option<String>,
    /// Externally-reachable library-node address other hubs know us by.
    pub public_url: String,
    /// Our own backing library node, target of activation syncs.
    /// Defaults to the canonical form of `public_url`.
    pub library_url: Option<String>,
    /// HTTP listen address.
    pub listen_addr: SocketAddr,
    /// Log level.
    pub log_level: String,
    /// Log format ("pretty" or "json").
    pub log_format: String,
    /// Timeout for a single relay dispatch, in seconds.
    pub relay_timeout_secs: u64,
    /// Address aliasing and node/hub pairing tables.
    pub network: NetworkConfig,
    /// Issue-tracker credentials for the feedback endpoint.
    pub tickets: TicketsConfig,
    /// Address MCP bridge processes reach this hub on.
    pub hub_url: String,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            node_name: "Atheneum Hub".to_string(),
            description: None,
            public_url: "http://library-a:8000".to_string(),
            library_url: None,
            listen_addr: ([127, 0, 0, 1], 8080).into(),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            relay_timeout_secs: 2,
            network: NetworkConfig::default(),
            tickets: TicketsConfig::default(),
            hub_url: "http://127.0.0.1:8080".to_string(),
        }
    }
}

impl HubConfig {
    /// Loads configuration from a YAML file.
    pub fn load_yaml(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: HubConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node_name.trim().is_empty() {
            return Err(ConfigError::Invalid("node_name is empty".into()));
        }
        if !self.public_url.starts_with("http://") && !self.public_url.starts_with("https://") {
            return Err(ConfigError::Invalid(format!(
                "public_url must be an http(s) URL, got '{}'",
                self.public_url
            )));
        }
        if self.relay_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "relay_timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    /// The address map built from the network tables.
    pub fn netmap(&self) -> NetMap {
        if self.network.aliases.is_empty() && self.network.pairs.is_empty() {
            NetMap::dev_default()
        } else {
            NetMap::new(self.network.aliases.clone(), self.network.pairs.clone())
        }
    }

    /// This hub's display identity.
    pub fn identity(&self) -> LibraryIdentity {
        LibraryIdentity::new(self.node_name.clone(), self.description.clone())
    }

    /// The library node activation syncs go to.
    pub fn library_endpoint(&self, netmap: &NetMap) -> String {
        self.library_url
            .clone()
            .unwrap_or_else(|| netmap.normalize(&self.public_url))
    }

    /// Timeout for a single relay dispatch.
    pub fn relay_timeout(&self) -> Duration {
        Duration::from_secs(self.relay_timeout_secs)
    }
}

/// Address aliasing and node/hub pairing tables.
///
/// Leave both tables empty to use the built-in development topology;
/// an alias that maps an address to itself keeps the tables explicit
/// while disabling the development defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NetworkConfig {
    /// Map of published address to canonical library-node address.
    #[serde(default)]
    pub aliases: HashMap<String, String>,
    /// Library-node / coordination-hub pairings.
    #[serde(default)]
    pub pairs: Vec<NodePair>,
}

/// Issue-tracker credentials for the feedback endpoint.
///
/// All four fields must be set for feedback submission to work; the
/// endpoint reports itself unavailable otherwise.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TicketsConfig {
    /// Tracker base URL.
    #[serde(default)]
    pub base_url: String,
    /// Project issues are filed under.
    #[serde(default)]
    pub project_key: String,
    /// Account email for API authentication.
    #[serde(default)]
    pub email: String,
    /// API token for the account.
    #[serde(default)]
    pub api_token: String,
}

impl TicketsConfig {
    /// Whether enough is configured to file issues.
    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty()
            && !self.project_key.is_empty()
            && !self.email.is_empty()
            && !self.api_token.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HubConfig::default();
        assert_eq!(config.listen_addr, ([127, 0, 0, 1], 8080).into());
        assert_eq!(config.relay_timeout_secs, 2);
        assert!(!config.tickets.is_configured());
        config.validate().unwrap();

        // Empty network tables fall back to the development topology.
        let netmap = config.netmap();
        assert_eq!(
            netmap.normalize("http://localhost:8001"),
            "http://library-a:8000"
        );
    }

    #[test]
    fn test_parse_full_yaml() {
        let yaml = r#"
node_name: "Central Library"
description: "The reading room"
public_url: "http://central.example:8000"
library_url: "http://central.internal:8000"
listen_addr: "0.0.0.0:9090"
log_level: "debug"
log_format: "json"
relay_timeout_secs: 5
network:
  aliases:
    "http://central.example:8000": "http://central.internal:8000"
  pairs:
    - node: "http://central.internal:8000"
      hub: "http://hub.central.internal:8080"
tickets:
  base_url: "https://tracker.example"
  project_key: "LIB"
  email: "ops@example.org"
  api_token: "secret"
"#;
        let config: HubConfig = serde_yaml::from_str(yaml).unwrap();
        config.validate().unwrap();

        assert_eq!(config.node_name, "Central Library");
        assert_eq!(config.listen_addr, ([0, 0, 0, 0], 9090).into());
        assert_eq!(config.relay_timeout(), Duration::from_secs(5));
        assert!(config.tickets.is_configured());

        let netmap = config.netmap();
        assert_eq!(
            netmap.normalize("http://central.example:8000"),
            "http://central.internal:8000"
        );
        assert_eq!(
            netmap.coordination_endpoint("http://central.example:8000"),
            "http://hub.central.internal:8080"
        );
        assert_eq!(
            config.library_endpoint(&netmap),
            "http://central.internal:8000"
        );
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
node_name: "Branch Library"
public_url: "http://branch.example:8000"
"#;
        let config: HubConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.node_name, "Branch Library");
        assert_eq!(config.listen_addr, ([127, 0, 0, 1], 8080).into());
        assert_eq!(config.log_level, "info");
        assert_eq!(config.relay_timeout_secs, 2);
    }

    #[test]
    fn test_library_endpoint_defaults_to_canonical_public_url() {
        let mut config = HubConfig::default();
        config.public_url = "http://localhost:8002".to_string();
        let netmap = config.netmap();
        assert_eq!(config.library_endpoint(&netmap), "http://library-b:8000");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = HubConfig::default();
        config.public_url = "library-a:8000".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = HubConfig::default();
        config.relay_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = HubConfig::default();
        config.node_name = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hub.yaml");
        std::fs::write(
            &path,
            "node_name: \"File Library\"\npublic_url: \"http://file.example:8000\"\n",
        )
        .unwrap();

        let config = HubConfig::load_yaml(&path).unwrap();
        assert_eq!(config.node_name, "File Library");

        let missing = HubConfig::load_yaml(dir.path().join("absent.yaml"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
