//! `custom.metrics.k8s.io/v1beta2`: metrics are identified by a nested
//! `metric` object carrying both the name and the series selector.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    GROUP_NAME, METRIC_LIST_OPTIONS_KIND, METRIC_VALUE_KIND, METRIC_VALUE_LIST_KIND,
    internal, to_json_with_type_meta,
};
use crate::meta::{GroupVersion, LabelSelector, ListMeta, ObjectReference, Quantity};

pub const VERSION: &str = "v1beta2";

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

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct MetricIdentifier {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<LabelSelector>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricValue {
    pub described_object: ObjectReference,
    pub metric: MetricIdentifier,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_seconds: Option<i64>,
    pub value: Quantity,
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

    /// Decodes `bytes` as the v1beta2 type named by `kind`. Returns `Ok(None)`
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

impl From<MetricValue> for internal::MetricValue {
    fn from(value: MetricValue) -> Self {
        Self {
            described_object: value.described_object,
            metric: internal::MetricIdentifier {
                name: value.metric.name,
                selector: value.metric.selector,
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
            metric: MetricIdentifier {
                name: value.metric.name,
                selector: value.metric.selector,
            },
            timestamp: value.timestamp,
            window_seconds: value.window_seconds,
            value: value.value,
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
