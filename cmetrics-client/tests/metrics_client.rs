mod support;

use std::sync::Arc;

use cmetrics_client::{MetricsClient, VersionError};
use cmetrics_core::{
    config::ClientConfig,
    error::{ConfigError, ConversionError},
};
use cmetrics_rpc::{
    custom_metrics::{GROUP_NAME, WireObject, internal, v1beta1, v1beta2},
    discovery::ApiGroup,
};
use serde_json::{Value, json};
use support::FakeDiscovery;

fn client_for(group: ApiGroup) -> (Arc<FakeDiscovery>, MetricsClient<Arc<FakeDiscovery>>) {
    let discovery = Arc::new(FakeDiscovery::serving(vec![group]));
    (discovery.clone(), MetricsClient::new(discovery))
}

fn list_options() -> internal::MetricListOptions {
    internal::MetricListOptions {
        metric_label_selector: "foo".to_string(),
        ..Default::default()
    }
}

fn v1beta1_value_list() -> Vec<u8> {
    serde_json::to_vec(&json!({
        "kind": "MetricValueList",
        "apiVersion": "custom.metrics.k8s.io/v1beta1",
        "metadata": {"selfLink": "/apis/custom.metrics.k8s.io/v1beta1/namespaces/default/pods/%2A/qps"},
        "items": [{
            "describedObject": {"kind": "Pod", "namespace": "default", "name": "web-0", "apiVersion": "/v1"},
            "metricName": "qps",
            "timestamp": "2024-05-01T12:00:00Z",
            "windowSeconds": 60,
            "value": "1500m",
            "selector": {"matchLabels": {"verb": "GET"}}
        }]
    }))
    .unwrap()
}

#[test]
fn request_uses_declared_preferred_version() {
    let (_, client) = client_for(
        ApiGroup::new(GROUP_NAME, ["v1beta2"]).with_preferred("v1beta1"),
    );

    let request = client.convert_list_options(&list_options(), GROUP_NAME).unwrap();

    assert_eq!(
        request,
        WireObject::V1Beta1(v1beta1::MetricObject::ListOptions(
            v1beta1::MetricListOptions {
                label_selector: String::new(),
                metric_label_selector: "foo".to_string(),
            }
        ))
    );
}

#[test]
fn request_uses_first_available_version_without_preference() {
    let (_, client) = client_for(ApiGroup::new(GROUP_NAME, ["v1beta2", "v1beta1"]));

    let request = client.convert_request(list_options(), GROUP_NAME).unwrap();

    assert_eq!(request.group_version(), v1beta2::group_version());
    let encoded: Value =
        serde_json::from_slice(&client.encode_request(list_options(), GROUP_NAME).unwrap())
            .unwrap();
    assert_eq!(
        encoded,
        json!({
            "kind": "MetricListOptions",
            "apiVersion": "custom.metrics.k8s.io/v1beta2",
            "metricLabelSelector": "foo"
        })
    );
}

#[test]
fn response_is_converted_to_the_desired_version() {
    let (_, client) = client_for(ApiGroup::new(GROUP_NAME, ["v1beta1"]));
    client.negotiated_version(GROUP_NAME).unwrap();

    let response = client
        .convert_response(
            &v1beta1_value_list(),
            GROUP_NAME,
            Some(&v1beta2::group_version()),
        )
        .unwrap();

    let WireObject::V1Beta2(v1beta2::MetricObject::ValueList(list)) = response else {
        panic!("expected a v1beta2 value list, got {response:?}");
    };
    let item = &list.items[0];
    assert_eq!(item.metric.name, "qps");
    assert_eq!(
        item.metric.selector.as_ref().unwrap().match_labels["verb"],
        "GET"
    );
    assert_eq!(item.window_seconds, Some(60));
    assert_eq!(item.value.0, "1500m");
}

#[test]
fn response_in_desired_version_is_returned_as_decoded() {
    let (_, client) = client_for(ApiGroup::new(GROUP_NAME, ["v1beta1"]));

    let response = client
        .convert_response(
            &v1beta1_value_list(),
            GROUP_NAME,
            Some(&v1beta1::group_version()),
        )
        .unwrap();

    let WireObject::V1Beta1(v1beta1::MetricObject::ValueList(list)) = response else {
        panic!("expected a v1beta1 value list");
    };
    assert_eq!(list.items[0].metric_name, "qps");
}

#[test]
fn response_defaults_to_configured_version() {
    let discovery = Arc::new(FakeDiscovery::serving(vec![ApiGroup::new(
        GROUP_NAME,
        ["v1beta1"],
    )]));
    let config = ClientConfig::from_toml_str(
        r#"response-version = "custom.metrics.k8s.io/v1beta1""#,
    )
    .unwrap();
    let client = MetricsClient::from_config(discovery, &config).unwrap();

    let response = client
        .convert_response(&v1beta1_value_list(), GROUP_NAME, None)
        .unwrap();

    assert_eq!(response.group_version(), v1beta1::group_version());
    assert_eq!(client.group(), GROUP_NAME);
}

#[test]
fn undecodable_response_names_attempted_versions() {
    let (_, client) = client_for(ApiGroup::new(GROUP_NAME, ["v1beta2"]));

    let error = client
        .convert_response(br#"{"kind": "Status", "apiVersion": "v1"}"#, GROUP_NAME, None)
        .unwrap_err();

    let VersionError::Conversion(ConversionError::Undecodable { attempted, .. }) = error
    else {
        panic!("expected an undecodable response, got {error:?}");
    };
    assert_eq!(attempted, [v1beta2::group_version(), v1beta1::group_version()]);
}

#[test]
fn restricted_config_refuses_unlisted_versions() {
    let discovery = Arc::new(FakeDiscovery::serving(vec![ApiGroup::new(
        GROUP_NAME,
        ["v1beta2"],
    )]));
    let config = ClientConfig::from_toml_str(
        r#"preferred-versions = ["custom.metrics.k8s.io/v1beta1"]"#,
    )
    .unwrap();
    let client = MetricsClient::from_config(discovery, &config).unwrap();

    assert!(matches!(
        client.convert_request(list_options(), GROUP_NAME),
        Err(VersionError::Negotiation(_))
    ));

    let v1beta2_payload = v1beta2::MetricObject::ListOptions(Default::default())
        .to_json()
        .unwrap();
    assert!(matches!(
        client.convert_response(&v1beta2_payload, GROUP_NAME, None),
        Err(VersionError::Conversion(ConversionError::Undecodable { .. }))
    ));
}

#[test]
fn client_invalidation_renegotiates() {
    let (discovery, client) = client_for(ApiGroup::new(GROUP_NAME, ["v1beta2", "v1beta1"]));
    assert_eq!(
        client.negotiated_version(GROUP_NAME).unwrap(),
        v1beta2::group_version()
    );

    discovery.serve(vec![ApiGroup::new(GROUP_NAME, ["v1beta1"])]);
    client.invalidate(GROUP_NAME);

    let request = client.convert_request(list_options(), GROUP_NAME).unwrap();
    assert_eq!(request.group_version(), v1beta1::group_version());
    assert_eq!(discovery.fetches(), 2);
}

#[test]
fn client_loads_config_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cmetrics.toml");
    std::fs::write(
        &path,
        r#"
group = "custom.metrics.k8s.io"
preferred-versions = ["custom.metrics.k8s.io/v1beta1", "custom.metrics.k8s.io/v1beta2"]
"#,
    )
    .unwrap();
    let config = ClientConfig::load(&path).unwrap();
    let (discovery, _) = client_for(ApiGroup::new(GROUP_NAME, ["v1beta2", "v1beta1"]));
    let client = MetricsClient::from_config(discovery, &config).unwrap();

    assert_eq!(
        client.converter().known().preferred(),
        &v1beta1::group_version()
    );
    assert_eq!(
        client.negotiated_version(GROUP_NAME).unwrap(),
        v1beta2::group_version()
    );
}

#[test]
fn configured_group_drives_group_less_calls() {
    let discovery = Arc::new(FakeDiscovery::serving(vec![
        ApiGroup::new(GROUP_NAME, ["v1beta1"]),
        ApiGroup::new("metrics.example.io", ["v1beta1"]),
    ]));
    let default_client = MetricsClient::new(discovery.clone());
    let config = ClientConfig::from_toml_str(r#"group = "metrics.example.io""#).unwrap();
    let example_client = MetricsClient::from_config(discovery.clone(), &config).unwrap();

    assert_eq!(default_client.version().unwrap(), v1beta1::group_version());
    assert_eq!(
        default_client.request(list_options()).unwrap().group_version(),
        v1beta1::group_version()
    );
    assert_eq!(
        default_client
            .response(&v1beta1_value_list(), None)
            .unwrap()
            .group_version(),
        v1beta2::group_version()
    );

    assert_eq!(example_client.group(), "metrics.example.io");
    let Err(VersionError::Negotiation(error)) = example_client.version() else {
        panic!("custom metrics versions negotiated for a foreign group");
    };
    assert!(error.to_string().contains("metrics.example.io"));
    assert!(matches!(
        example_client.response(&v1beta1_value_list(), None),
        Err(VersionError::Conversion(ConversionError::Undecodable { .. }))
    ));
    assert!(example_client.encode(list_options()).is_err());

    default_client.refresh();
    assert_eq!(default_client.source().cached_version(GROUP_NAME), None);
}

#[test]
fn config_with_unconvertible_response_version_is_rejected() {
    for contents in [
        r#"response-version = "custom.metrics.k8s.io/v9""#,
        r#"response-version = "v1beta1""#,
        "preferred-versions = [\"custom.metrics.k8s.io/v1beta1\"]\nresponse-version = \"custom.metrics.k8s.io/v1beta2\"",
    ] {
        let discovery = Arc::new(FakeDiscovery::serving(Vec::new()));
        let config = ClientConfig::from_toml_str(contents).unwrap();

        assert!(
            matches!(
                MetricsClient::from_config(discovery, &config),
                Err(ConfigError::UnknownResponseVersion { .. })
            ),
            "accepted {contents}"
        );
    }
}
