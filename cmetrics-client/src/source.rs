//! Negotiated-version cache in front of a discovery collaborator.

use std::collections::HashMap;

use cmetrics_core::{negotiate::negotiate, version_set::VersionSet};
use cmetrics_rpc::{discovery::ApiGroup, meta::GroupVersion};
use parking_lot::RwLock;
use tracing::{debug, info, trace, warn};

use crate::{discovery::DiscoveryClient, error::VersionError};

const SOURCE_LOG_TARGET: &str = "cmetrics.source";

/// Answers which version to speak for an API group, fetching and negotiating
/// at most once per group until invalidated.
pub struct VersionSource<D> {
    discovery: D,
    known: VersionSet,
    negotiated: RwLock<HashMap<String, GroupVersion>>,
}

impl<D: DiscoveryClient> VersionSource<D> {
    pub fn new(discovery: D, known: VersionSet) -> Self {
        Self {
            discovery,
            known,
            negotiated: RwLock::new(HashMap::new()),
        }
    }

    pub fn known(&self) -> &VersionSet {
        &self.known
    }

    pub fn discovery(&self) -> &D {
        &self.discovery
    }

    /// Returns the negotiated version for `group`, negotiating on a miss.
    ///
    /// Failures are never cached, so the next call after a discovery error,
    /// a missing group, or a failed negotiation fetches again.
    pub fn preferred_version(&self, group: &str) -> Result<GroupVersion, VersionError> {
        {
            let negotiated = self.negotiated.read();
            if let Some(version) = negotiated.get(group) {
                trace!(target: SOURCE_LOG_TARGET, group, version = %version, "cache hit");
                return Ok(version.clone());
            }
        }

        let mut negotiated = self.negotiated.write();

        // Another caller may have filled the entry while we waited.
        if let Some(version) = negotiated.get(group) {
            return Ok(version.clone());
        }

        let advertised = self.fetch_group(group)?;
        let version = negotiate(&advertised, &self.known)?;
        info!(
            target: SOURCE_LOG_TARGET,
            group,
            version = %version,
            "negotiated API version"
        );
        negotiated.insert(group.to_string(), version.clone());
        Ok(version)
    }

    /// The version currently cached for `group`, without fetching.
    pub fn cached_version(&self, group: &str) -> Option<GroupVersion> {
        self.negotiated.read().get(group).cloned()
    }

    /// Fetches the server's listing for `group`.
    ///
    /// A group missing from the listing may only mean the discovery cache is
    /// stale, so the collaborator is invalidated and asked once more before
    /// reporting the group as unregistered.
    pub fn advertised_group(&self, group: &str) -> Result<ApiGroup, VersionError> {
        self.fetch_group(group)
    }

    /// Drops the cached version for `group` and the discovery cache behind it.
    pub fn invalidate(&self, group: &str) {
        let mut negotiated = self.negotiated.write();
        let previous = negotiated.remove(group);
        self.discovery.invalidate();
        debug!(
            target: SOURCE_LOG_TARGET,
            group,
            previous = ?previous.map(|version| version.to_string()),
            "invalidated negotiated version"
        );
    }

    pub fn invalidate_all(&self) {
        let mut negotiated = self.negotiated.write();
        negotiated.clear();
        self.discovery.invalidate();
        debug!(target: SOURCE_LOG_TARGET, "invalidated all negotiated versions");
    }

    fn fetch_group(&self, group: &str) -> Result<ApiGroup, VersionError> {
        if let Some(advertised) = self.lookup_group(group)? {
            return Ok(advertised);
        }

        debug!(
            target: SOURCE_LOG_TARGET,
            group,
            "group missing from discovery, refreshing"
        );
        self.discovery.invalidate();
        self.lookup_group(group)?
            .ok_or_else(|| VersionError::GroupNotRegistered {
                group: group.to_string(),
            })
    }

    fn lookup_group(&self, group: &str) -> Result<Option<ApiGroup>, VersionError> {
        let groups = self.discovery.server_groups().map_err(|error| {
            warn!(
                target: SOURCE_LOG_TARGET,
                group,
                error = %error,
                "discovery failed"
            );
            VersionError::Discovery(error)
        })?;
        Ok(groups.groups.into_iter().find(|advertised| advertised.name == group))
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use cmetrics_core::version_set::VersionSet;
    use cmetrics_rpc::{
        custom_metrics::{GROUP_NAME, v1beta1},
        discovery::{ApiGroup, ApiGroupList},
    };

    use super::VersionSource;
    use crate::{discovery::DiscoveryFn, error::VersionError};

    #[test]
    fn plain_function_discovery_negotiates() {
        let source = VersionSource::new(
            DiscoveryFn::new(|| {
                Ok(ApiGroupList::new(vec![
                    ApiGroup::new(GROUP_NAME, ["v1beta1", "v1beta2"])
                        .with_preferred("v1beta1"),
                ]))
            }),
            VersionSet::metric_versions().clone(),
        );

        assert_eq!(
            source.preferred_version(GROUP_NAME).unwrap(),
            v1beta1::group_version()
        );
        assert_eq!(source.cached_version(GROUP_NAME), Some(v1beta1::group_version()));
    }

    #[test]
    fn discovery_errors_pass_through_verbatim() {
        let source = VersionSource::new(
            DiscoveryFn::new(|| Err(anyhow!("connection refused"))),
            VersionSet::metric_versions().clone(),
        );

        let error = source.preferred_version(GROUP_NAME).unwrap_err();

        assert!(matches!(error, VersionError::Discovery(_)));
        assert!(error.is_retryable());
        assert_eq!(error.to_string(), "connection refused");
        assert_eq!(source.cached_version(GROUP_NAME), None);
    }
}
