use std::{fs, path::Path};

use cmetrics_rpc::{custom_metrics::GROUP_NAME, meta::GroupVersion};
use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, version_set::VersionSet};

/// Client-side negotiation settings.
///
/// ```toml
/// group = "custom.metrics.k8s.io"
/// preferred-versions = ["custom.metrics.k8s.io/v1beta2", "custom.metrics.k8s.io/v1beta1"]
/// response-version = "custom.metrics.k8s.io/v1beta2"
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ClientConfig {
    /// API group targeted by the client calls that take no explicit group.
    pub group: String,
    /// Ordered subset of the built-in versions to accept. Empty means all.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub preferred_versions: Vec<String>,
    /// Version responses are converted into when the caller does not ask for
    /// one. Defaults to the most-preferred known version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_version: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            group: GROUP_NAME.to_string(),
            preferred_versions: Vec::new(),
            response_version: None,
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_toml_str(&contents)
    }

    /// Known versions after applying `preferred-versions`.
    pub fn version_set(&self) -> Result<VersionSet, ConfigError> {
        let builtin = VersionSet::metric_versions();
        if self.preferred_versions.is_empty() {
            return Ok(builtin.clone());
        }
        Ok(builtin.restricted_to(&self.preferred_versions)?)
    }

    /// The configured response version, or the most-preferred known one.
    ///
    /// The configured value must be one of the versions in [`Self::version_set`].
    pub fn response_version(&self) -> Result<GroupVersion, ConfigError> {
        let known = self.version_set()?;
        let Some(value) = &self.response_version else {
            return Ok(known.preferred().clone());
        };

        let version = GroupVersion::parse(value).map_err(|source| {
            ConfigError::InvalidVersion {
                value: value.clone(),
                source,
            }
        })?;
        if !known.is_known(&version) {
            return Err(ConfigError::UnknownResponseVersion {
                version,
                known: known.versions().cloned().collect(),
            });
        }
        Ok(version)
    }
}
