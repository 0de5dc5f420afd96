//! Versioned wire types for the `custom.metrics.k8s.io` API group.
//!
//! Each external version lives in its own module and knows how to convert to
//! and from [`internal`], the canonical representation every conversion pivots
//! through. Versions never convert to each other directly.

pub mod internal;
pub mod v1beta1;
pub mod v1beta2;

use serde::Serialize;

use crate::meta::{GroupVersion, TypeMeta};

/// Name of the custom metrics API group.
pub const GROUP_NAME: &str = "custom.metrics.k8s.io";

pub const METRIC_LIST_OPTIONS_KIND: &str = "MetricListOptions";
pub const METRIC_VALUE_KIND: &str = "MetricValue";
pub const METRIC_VALUE_LIST_KIND: &str = "MetricValueList";

/// A custom metrics object tagged with the external version it is encoded in.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WireObject {
    V1Beta1(v1beta1::MetricObject),
    V1Beta2(v1beta2::MetricObject),
}

impl WireObject {
    /// The version this object is encoded in.
    pub fn group_version(&self) -> GroupVersion {
        match self {
            Self::V1Beta1(_) => v1beta1::group_version(),
            Self::V1Beta2(_) => v1beta2::group_version(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::V1Beta1(object) => object.kind(),
            Self::V1Beta2(object) => object.kind(),
        }
    }

    /// Encodes the object as JSON with `kind` and `apiVersion` filled in.
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        match self {
            Self::V1Beta1(object) => object.to_json(),
            Self::V1Beta2(object) => object.to_json(),
        }
    }
}

#[derive(Serialize)]
struct Typed<'a, T> {
    #[serde(flatten)]
    type_meta: TypeMeta,
    #[serde(flatten)]
    body: &'a T,
}

pub(crate) fn to_json_with_type_meta<T: Serialize>(
    kind: &str,
    group_version: &GroupVersion,
    body: &T,
) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(&Typed {
        type_meta: TypeMeta::new(kind, group_version),
        body,
    })
}
