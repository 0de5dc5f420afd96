//! `custom.metrics.k8s.io/v1beta1`: the first published schema, where a metric value
//! carries a flat `metricName` and an optional top-level series `selector`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    GROUP_NAME, METRIC_LIST_OPTIONS_KIND, METRIC_VALUE_KIND, METRIC_VALUE_LIST_KIND,
    internal, to_json_with_type_meta,
};
use crate::meta::{GroupVersion, LabelSelector, ListMeta, ObjectReference, Quantity};

pub const VERSION: &str = "v1beta1";

pub fn group_version() -> GroupVersion {
    GroupVersion::new(GROUP_NAME, VERSION)
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricListOptions {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label_selector: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub metric_label_selector: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricValue {
    pub described_object: ObjectReference,
    pub metric_name: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_seconds: Option<i64>,
    pub value: Quantity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<LabelSelector>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct MetricValueList {
    #[serde(default)]
    pub metadata: ListMeta,
    pub items: Vec<MetricValue>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MetricObject {
    ListOptions(MetricListOptions),
    Value(MetricValue),
    ValueList(MetricValueList),
}

impl MetricObject {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ListOptions(_) => METRIC_LIST_OPTIONS_KIND,
            Self::Value(_) => METRIC_VALUE_KIND,
            Self::ValueList(_) => METRIC_VALUE_LIST_KIND,
        }
    }

    /// Decodes `bytes` as the v1beta1 type named by `kind`. Returns `Ok(None)`
    /// for kinds this version does not define.
    pub fn from_slice(kind: &str, bytes: &[u8]) -> serde_json::Result<Option<Self>> {
        let object = match kind {
            METRIC_LIST_OPTIONS_KIND => Self::ListOptions(serde_json::from_slice(bytes)?),
            METRIC_VALUE_KIND => Self::Value(serde_json::from_slice(bytes)?),
            METRIC_VALUE_LIST_KIND => Self::ValueList(serde_json::from_slice(bytes)?),
            _ => return Ok(None),
        };
        Ok(Some(object))
    }

    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        let gv = group_version();
        match self {
            Self::ListOptions(options) => to_json_with_type_meta(self.kind(), &gv, options),
            Self::Value(value) => to_json_with_type_meta(self.kind(), &gv, value),
            Self::ValueList(list) => to_json_with_type_meta(self.kind(), &gv, list),
        }
    }
}

impl From<MetricObject> for internal::MetricObject {
    fn from(object: MetricObject) -> Self {
        match object {
            MetricObject::ListOptions(options) => Self::ListOptions(options.into()),
            MetricObject::Value(value) => Self::Value(value.into()),
            MetricObject::ValueList(list) => Self::ValueList(list.into()),
        }
    }
}

impl From<internal::MetricObject> for MetricObject {
    fn from(object: internal::MetricObject) -> Self {
        match object {
            internal::MetricObject::ListOptions(options) => Self::ListOptions(options.into()),
            internal::MetricObject::Value(value) => Self::Value(value.into()),
            internal::MetricObject::ValueList(list) => Self::ValueList(list.into()),
        }
    }
}

impl From<MetricListOptions> for internal::MetricListOptions {
    fn from(options: MetricListOptions) -> Self {
        Self {
            label_selector: options.label_selector,
            metric_label_selector: options.metric_label_selector,
        }
    }
}

impl From<internal::MetricListOptions> for MetricListOptions {
    fn from(options: internal::MetricListOptions) -> Self {
        Self {
            label_selector: options.label_selector,
            metric_label_selector: options.metric_label_selector,
        }
    }
}

// The flat name and selector fold into the canonical metric identifier.
impl From<MetricValue> for internal::MetricValue {
    fn from(value: MetricValue) -> Self {
        Self {
            described_object: value.described_object,
            metric: internal::MetricIdentifier {
                name: value.metric_name,
                selector: value.selector,
            },
            timestamp: value.timestamp,
            window_seconds: value.window_seconds,
            value: value.value,
        }
    }
}

impl From<internal::MetricValue> for MetricValue {
    fn from(value: internal::MetricValue) -> Self {
        Self {
            described_object: value.described_object,
            metric_name: value.metric.name,
            timestamp: value.timestamp,
            window_seconds: value.window_seconds,
            value: value.value,
            selector: value.metric.selector,
        }
    }
}

impl From<MetricValueList> for internal::MetricValueList {
    fn from(list: MetricValueList) -> Self {
        Self {
            metadata: list.metadata,
            items: list.items.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<internal::MetricValueList> for MetricValueList {
    fn from(list: internal::MetricValueList) -> Self {
        Self {
            metadata: list.metadata,
            items: list.items.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::{METRIC_VALUE_KIND, MetricObject, MetricValue};
    use crate::{
        custom_metrics::internal,
        meta::{LabelSelector, ObjectReference, Quantity},
    };

    fn sample_value() -> MetricValue {
        MetricValue {
            described_object: ObjectReference {
                kind: Some("Pod".to_string()),
                namespace: Some("default".to_string()),
                name: Some("web-0".to_string()),
                ..Default::default()
            },
            metric_name: "queue_depth".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            window_seconds: Some(60),
            value: Quantity::new("12"),
            selector: Some(LabelSelector {
                match_labels: BTreeMap::from([(
                    "queue".to_string(),
                    "billing".to_string(),
                )]),
                match_expressions: Vec::new(),
            }),
        }
    }

    #[test]
    fn flat_metric_fields_move_into_the_canonical_identifier() {
        let canonical = internal::MetricValue::from(sample_value());

        assert_eq!(canonical.metric.name, "queue_depth");
        assert_eq!(
            canonical.metric.selector.as_ref().unwrap().match_labels["queue"],
            "billing"
        );
        assert_eq!(MetricValue::from(canonical), sample_value());
    }

    #[test]
    fn requires_flat_metric_name() {
        let nested = serde_json::to_vec(&json!({
            "describedObject": {"kind": "Pod", "name": "web-0"},
            "metric": {"name": "queue_depth"},
            "timestamp": "2024-05-01T12:00:00Z",
            "value": "12"
        }))
        .unwrap();

        assert!(MetricObject::from_slice(METRIC_VALUE_KIND, &nested).is_err());
    }

    #[test]
    fn encodes_flat_wire_shape() {
        let bytes = MetricObject::Value(sample_value()).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["apiVersion"], json!("custom.metrics.k8s.io/v1beta1"));
        assert_eq!(value["metricName"], json!("queue_depth"));
        assert_eq!(value["windowSeconds"], json!(60));
        assert_eq!(value["selector"]["matchLabels"]["queue"], json!("billing"));
    }
}
