//! Picks the one version to speak for an advertised API group.

use cmetrics_rpc::{discovery::ApiGroup, meta::GroupVersion};

use crate::{error::NegotiationError, version_set::VersionSet};

/// Selects the version to use with `advertised`.
///
/// A declared server preference wins when this build knows it. Otherwise the
/// first known version in server order is used.
pub fn negotiate(
    advertised: &ApiGroup,
    known: &VersionSet,
) -> Result<GroupVersion, NegotiationError> {
    if let Some(gv) = advertised
        .declared_preference()
        .and_then(|preferred| known.lookup(&preferred.group_version))
    {
        return Ok(gv.clone());
    }

    advertised
        .versions
        .iter()
        .find_map(|version| known.lookup(&version.group_version))
        .cloned()
        .ok_or_else(|| NegotiationError::NoCompatibleVersion {
            group: advertised.name.clone(),
            advertised: advertised
                .versions
                .iter()
                .map(|version| version.group_version.clone())
                .collect(),
        })
}

#[cfg(test)]
mod tests {
    use cmetrics_rpc::{
        custom_metrics::{GROUP_NAME, v1beta1, v1beta2},
        discovery::ApiGroup,
        meta::GroupVersion,
    };

    use super::negotiate;
    use crate::{error::NegotiationError, version_set::VersionSet};

    fn known(versions: &[&str]) -> VersionSet {
        VersionSet::new(
            versions
                .iter()
                .map(|version| GroupVersion::new(GROUP_NAME, *version)),
        )
        .unwrap()
    }

    #[test]
    fn declared_preference_wins_regardless_of_order() {
        let known = VersionSet::metric_versions();

        for versions in [["v1beta1", "v1beta2"], ["v1beta2", "v1beta1"]] {
            let group = ApiGroup::new(GROUP_NAME, versions).with_preferred("v1beta1");
            assert_eq!(negotiate(&group, known), Ok(v1beta1::group_version()));
        }
    }

    #[test]
    fn server_order_wins_without_declared_preference() {
        let group = ApiGroup::new(GROUP_NAME, ["v2", "v1"]);

        assert_eq!(
            negotiate(&group, &known(&["v1", "v2"])),
            Ok(GroupVersion::new(GROUP_NAME, "v2"))
        );
    }

    #[test]
    fn unknown_declared_preference_falls_back_to_server_order() {
        let group = ApiGroup::new(GROUP_NAME, ["v1beta3", "v1beta1", "v1beta2"])
            .with_preferred("v1beta3");

        assert_eq!(
            negotiate(&group, VersionSet::metric_versions()),
            Ok(v1beta1::group_version())
        );
    }

    #[test]
    fn fails_when_nothing_intersects() {
        let group = ApiGroup::new(GROUP_NAME, ["v1", "v2"]).with_preferred("v1");

        assert_eq!(
            negotiate(&group, &known(&["v3"])),
            Err(NegotiationError::NoCompatibleVersion {
                group: GROUP_NAME.to_string(),
                advertised: vec![
                    format!("{GROUP_NAME}/v1"),
                    format!("{GROUP_NAME}/v2"),
                ],
            })
        );
    }

    #[test]
    fn declared_preference_outside_known_set_does_not_leak() {
        let group = ApiGroup::new(GROUP_NAME, ["v1", "v2"]).with_preferred("v1");

        assert_eq!(
            negotiate(&group, &known(&["v2"])),
            Ok(GroupVersion::new(GROUP_NAME, "v2"))
        );
    }

    #[test]
    fn empty_version_list_is_a_negotiation_failure() {
        let group = ApiGroup::new(GROUP_NAME, Vec::<&str>::new());

        assert!(matches!(
            negotiate(&group, VersionSet::metric_versions()),
            Err(NegotiationError::NoCompatibleVersion { advertised, .. })
                if advertised.is_empty()
        ));
    }

    #[test]
    fn picks_newest_known_when_server_lists_it_first() {
        let group = ApiGroup::new(GROUP_NAME, ["v1beta2", "v1beta1"]);

        assert_eq!(
            negotiate(&group, VersionSet::metric_versions()),
            Ok(v1beta2::group_version())
        );
    }
}
