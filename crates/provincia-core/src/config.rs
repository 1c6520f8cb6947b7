//! Configuration loading and typed config structures for the turn engine.
//!
//! The canonical configuration lives in `provincia-config.yaml` at the
//! project root. Engine configuration describes how the engine behaves; the
//! world itself (modes, resources, terrain) comes with each snapshot's
//! settings bundle.

use std::path::Path;

use provincia_world::{FlowAlgorithm, TransportOptions};
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration.
///
/// Mirrors the structure of `provincia-config.yaml`. Every field has a
/// default, so an empty document is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Transport solving.
    #[serde(default)]
    pub transport: TransportConfig,

    /// Capacity roll-up from buildings.
    #[serde(default)]
    pub infrastructure: InfrastructureConfig,

    /// Eligibility resolution.
    #[serde(default)]
    pub eligibility: EligibilityConfig,
}

impl EngineConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// Transport configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransportConfig {
    /// Solver used for every availability query.
    #[serde(default)]
    pub algorithm: FlowAlgorithm,

    /// Whether partner routes are solved each turn.
    #[serde(default = "default_true")]
    pub partner_routes: bool,

    /// Whether pure sea-lane provinces are skipped as origins.
    #[serde(default = "default_true")]
    pub skip_sea_lane_origins: bool,
}

impl TransportConfig {
    /// Solver options for the availability passes.
    pub const fn options(&self) -> TransportOptions {
        TransportOptions {
            algorithm: self.algorithm,
            skip_sea_lane_origins: self.skip_sea_lane_origins,
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            algorithm: FlowAlgorithm::MaxFlow,
            partner_routes: true,
            skip_sea_lane_origins: true,
        }
    }
}

/// Infrastructure configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InfrastructureConfig {
    /// Rebuild province capacity from active buildings before transport.
    #[serde(default)]
    pub aggregate_from_buildings: bool,
}

/// Eligibility configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EligibilityConfig {
    /// Emit a siting diagnostic listing each template's candidates.
    #[serde(default = "default_true")]
    pub report_matches: bool,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            report_matches: true,
        }
    }
}

const fn default_true() -> bool {
    true
}
