//! Ordered set of wire schema versions this build can speak.

use cmetrics_rpc::{
    custom_metrics::{v1beta1, v1beta2},
    meta::GroupVersion,
};
use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::error::VersionSetError;

static METRIC_VERSIONS: Lazy<VersionSet> = Lazy::new(|| VersionSet {
    versions: [v1beta2::group_version(), v1beta1::group_version()]
        .into_iter()
        .map(|gv| (gv.to_string(), gv))
        .collect(),
});

/// Known versions, most-preferred first.
///
/// Keyed by the `group/version` string so discovery entries can be matched
/// without re-parsing. The set never changes once built.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VersionSet {
    versions: IndexMap<String, GroupVersion>,
}

impl VersionSet {
    pub fn new(
        versions: impl IntoIterator<Item = GroupVersion>,
    ) -> Result<Self, VersionSetError> {
        let mut by_name = IndexMap::new();
        for gv in versions {
            if by_name.contains_key(&gv.to_string()) {
                return Err(VersionSetError::Duplicate(gv));
            }
            by_name.insert(gv.to_string(), gv);
        }
        if by_name.is_empty() {
            return Err(VersionSetError::Empty);
        }
        Ok(Self { versions: by_name })
    }

    /// Custom metrics versions compiled into this build.
    pub fn metric_versions() -> &'static VersionSet {
        &METRIC_VERSIONS
    }

    /// Narrows this set to `names`, in the order given.
    pub fn restricted_to<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<Self, VersionSetError> {
        let versions = names
            .iter()
            .map(|name| {
                self.lookup(name.as_ref()).cloned().ok_or_else(|| {
                    VersionSetError::Unknown(name.as_ref().to_string())
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(versions)
    }

    pub fn versions(&self) -> impl ExactSizeIterator<Item = &GroupVersion> {
        self.versions.values()
    }

    /// The most-preferred version.
    pub fn preferred(&self) -> &GroupVersion {
        // Construction rejects empty sets.
        &self.versions[0]
    }

    pub fn is_known(&self, candidate: &GroupVersion) -> bool {
        self.versions.contains_key(&candidate.to_string())
    }

    pub fn lookup(&self, group_version: &str) -> Option<&GroupVersion> {
        self.versions.get(group_version)
    }

    /// Known versions belonging to `group`, in preference order.
    pub fn in_group<'a>(
        &'a self,
        group: &'a str,
    ) -> impl Iterator<Item = &'a GroupVersion> + 'a {
        self.versions().filter(move |gv| gv.group == group)
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}
