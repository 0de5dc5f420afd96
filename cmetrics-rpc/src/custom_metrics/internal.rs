//! Canonical custom metrics types.
//!
//! Callers build requests and read converted responses in this shape. It is
//! never sent over the wire: every external version converts to and from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    GROUP_NAME, METRIC_LIST_OPTIONS_KIND, METRIC_VALUE_KIND, METRIC_VALUE_LIST_KIND,
};
use crate::meta::{GroupVersion, LabelSelector, ListMeta, ObjectReference, Quantity};

/// Version name reserved for the canonical representation.
pub const VERSION: &str = "__internal";

pub fn group_version() -> GroupVersion {
    GroupVersion::new(GROUP_NAME, VERSION)
}

/// Query parameters for custom metrics list requests.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricListOptions {
    /// Restricts the described objects by their labels.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label_selector: String,
    /// Restricts the metric series by their labels.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub metric_label_selector: String,
}

/// Name and series selector identifying one metric.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct MetricIdentifier {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<LabelSelector>,
}

/// One sample of a metric for one described object.
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
    #[serde(default)]
    pub items: Vec<MetricValue>,
}

/// Any canonical custom metrics object.
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
}

impl From<MetricListOptions> for MetricObject {
    fn from(options: MetricListOptions) -> Self {
        Self::ListOptions(options)
    }
}

impl From<MetricValue> for MetricObject {
    fn from(value: MetricValue) -> Self {
        Self::Value(value)
    }
}

impl From<MetricValueList> for MetricObject {
    fn from(list: MetricValueList) -> Self {
        Self::ValueList(list)
    }
}
