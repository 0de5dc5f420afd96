//! Discovery records describing the API groups a server currently exposes.
//!
//! Servers may add or drop groups at any time, so these records are always
//! produced fresh by a discovery fetch and never persisted.

use serde::{Deserialize, Serialize};

use crate::meta::{GroupVersion, InvalidGroupVersion};

/// All API groups advertised by one server.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ApiGroupList {
    #[serde(default)]
    pub groups: Vec<ApiGroup>,
}

impl ApiGroupList {
    pub fn new(groups: Vec<ApiGroup>) -> Self {
        Self { groups }
    }

    /// Returns the first advertised group with the given name.
    pub fn group(&self, name: &str) -> Option<&ApiGroup> {
        self.groups.iter().find(|group| group.name == name)
    }
}

/// One API group, its served versions in server order, and the version the
/// server declares as preferred.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGroup {
    pub name: String,
    #[serde(default)]
    pub versions: Vec<GroupVersionForDiscovery>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_version: Option<GroupVersionForDiscovery>,
}

impl ApiGroup {
    /// Builds a group serving `versions` in the given order.
    pub fn new<'a>(
        name: impl Into<String>,
        versions: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let name = name.into();
        let versions = versions
            .into_iter()
            .map(|version| GroupVersionForDiscovery::new(&name, version))
            .collect();
        Self {
            name,
            versions,
            preferred_version: None,
        }
    }

    /// Declares `version` as the server-preferred version.
    pub fn with_preferred(mut self, version: &str) -> Self {
        self.preferred_version =
            Some(GroupVersionForDiscovery::new(&self.name, version));
        self
    }

    /// The declared preferred version, ignoring an empty declaration.
    pub fn declared_preference(&self) -> Option<&GroupVersionForDiscovery> {
        self.preferred_version
            .as_ref()
            .filter(|preferred| !preferred.group_version.is_empty())
    }
}

/// One served version as it appears in a discovery document.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupVersionForDiscovery {
    /// Full `group/version` string.
    pub group_version: String,
    /// Version component only, for convenience.
    #[serde(default)]
    pub version: String,
}

impl GroupVersionForDiscovery {
    pub fn new(group: &str, version: &str) -> Self {
        Self {
            group_version: GroupVersion::new(group, version).to_string(),
            version: version.to_string(),
        }
    }

    pub fn parse(&self) -> Result<GroupVersion, InvalidGroupVersion> {
        GroupVersion::parse(&self.group_version)
    }
}
