//! Hub-and-spoke conversion between custom metrics schema versions.
//!
//! Every external version registers one spoke: a decoder plus a pair of
//! conversions to and from the canonical [`internal`] pivot. Converting from
//! version A to version B always goes A -> pivot -> B, so adding a version
//! costs one spoke instead of one converter per existing version.

use cmetrics_rpc::{
    custom_metrics::{WireObject, internal, internal::MetricObject, v1beta1, v1beta2},
    meta::{GroupVersion, TypeMeta},
};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use tracing::{debug, trace};

use crate::{
    error::{ConversionError, VersionSetError},
    version_set::VersionSet,
};

const CONVERT_LOG_TARGET: &str = "cmetrics.convert";

type DecodeFn = fn(&str, &[u8]) -> serde_json::Result<Option<WireObject>>;
type ToPivotFn = fn(WireObject) -> Option<MetricObject>;
type FromPivotFn = fn(MetricObject) -> WireObject;

/// Conversions for one external version.
#[derive(Clone, Copy)]
struct Spoke {
    decode: DecodeFn,
    to_pivot: ToPivotFn,
    from_pivot: FromPivotFn,
}

static SPOKES: Lazy<IndexMap<GroupVersion, Spoke>> = Lazy::new(|| {
    IndexMap::from([
        (
            v1beta2::group_version(),
            Spoke {
                decode: |kind, bytes| {
                    Ok(v1beta2::MetricObject::from_slice(kind, bytes)?
                        .map(WireObject::V1Beta2))
                },
                to_pivot: |object| match object {
                    WireObject::V1Beta2(object) => Some(object.into()),
                    _ => None,
                },
                from_pivot: |pivot| WireObject::V1Beta2(pivot.into()),
            },
        ),
        (
            v1beta1::group_version(),
            Spoke {
                decode: |kind, bytes| {
                    Ok(v1beta1::MetricObject::from_slice(kind, bytes)?
                        .map(WireObject::V1Beta1))
                },
                to_pivot: |object| match object {
                    WireObject::V1Beta1(object) => Some(object.into()),
                    _ => None,
                },
                from_pivot: |pivot| WireObject::V1Beta1(pivot.into()),
            },
        ),
    ])
});

/// Converts custom metrics objects between wire versions through the pivot.
///
/// Holds no per-call state and is safe to share between threads.
#[derive(Clone, Debug)]
pub struct SchemaConverter {
    known: VersionSet,
}

impl SchemaConverter {
    /// Converter over every version compiled into this build.
    pub fn new() -> Self {
        Self {
            known: VersionSet::metric_versions().clone(),
        }
    }

    /// Converter whose default decode candidates are `known`. Every version
    /// in `known` must have a registered spoke.
    pub fn with_versions(known: VersionSet) -> Result<Self, VersionSetError> {
        if let Some(missing) = known.versions().find(|gv| !SPOKES.contains_key(*gv)) {
            return Err(VersionSetError::Unknown(missing.to_string()));
        }
        Ok(Self { known })
    }

    pub fn known(&self) -> &VersionSet {
        &self.known
    }

    /// The canonical version every conversion pivots through.
    pub fn pivot_version(&self) -> GroupVersion {
        internal::group_version()
    }

    /// Whether `version` has conversions to and from the pivot.
    pub fn supports(&self, version: &GroupVersion) -> bool {
        SPOKES.contains_key(version)
    }

    /// Converts a canonical request value into `target`'s wire form.
    pub fn to_wire(
        &self,
        request: impl Into<MetricObject>,
        target: &GroupVersion,
    ) -> Result<WireObject, ConversionError> {
        self.from_pivot(request.into(), target)
    }

    /// Decodes `bytes` as the first of `candidates` that accepts them and
    /// reports which version matched.
    pub fn from_wire(
        &self,
        bytes: &[u8],
        candidates: &[GroupVersion],
    ) -> Result<(GroupVersion, WireObject), ConversionError> {
        let undecodable = |detail: String| ConversionError::Undecodable {
            attempted: candidates.to_vec(),
            detail,
        };

        if candidates.is_empty() {
            return Err(undecodable("no candidate versions".to_string()));
        }
        let header = serde_json::from_slice::<TypeMeta>(bytes)
            .map_err(|error| undecodable(error.to_string()))?;
        let Some(kind) = header.kind.as_deref() else {
            return Err(undecodable("payload has no kind".to_string()));
        };

        let mut failures = Vec::new();
        for candidate in candidates {
            let Some(spoke) = SPOKES.get(candidate) else {
                failures.push(format!("{candidate}: no decoder registered"));
                continue;
            };

            let candidate_name = candidate.to_string();
            match header.api_version.as_deref() {
                Some(api_version) if api_version != candidate_name => {
                    failures.push(format!("{candidate}: payload is {api_version}"));
                    continue;
                }
                _ => {}
            }

            match (spoke.decode)(kind, bytes) {
                Ok(Some(object)) => {
                    debug!(
                        target: CONVERT_LOG_TARGET,
                        kind,
                        version = %candidate,
                        "decoded payload"
                    );
                    return Ok((candidate.clone(), object));
                }
                Ok(None) if header.api_version.is_some() => {
                    return Err(ConversionError::UnknownKind {
                        version: candidate.clone(),
                        kind: kind.to_string(),
                    });
                }
                Ok(None) => {
                    failures.push(format!("{candidate}: kind {kind} is not defined"));
                }
                Err(error) => {
                    trace!(
                        target: CONVERT_LOG_TARGET,
                        version = %candidate,
                        %error,
                        "payload rejected by candidate"
                    );
                    failures.push(format!("{candidate}: {error}"));
                }
            }
        }

        Err(undecodable(failures.join("; ")))
    }

    /// Decodes `bytes` against every known version, most-preferred first.
    pub fn decode(
        &self,
        bytes: &[u8],
    ) -> Result<(GroupVersion, WireObject), ConversionError> {
        let candidates = self.known.versions().cloned().collect::<Vec<_>>();
        self.from_wire(bytes, &candidates)
    }

    /// Decodes `bytes` and lifts the result to the canonical representation.
    pub fn decode_to_pivot(
        &self,
        bytes: &[u8],
        candidates: &[GroupVersion],
    ) -> Result<(GroupVersion, MetricObject), ConversionError> {
        let (version, object) = self.from_wire(bytes, candidates)?;
        Ok((version, self.to_pivot(object)?))
    }

    /// Serializes `object` with its type metadata filled in.
    pub fn encode(&self, object: &WireObject) -> Result<Vec<u8>, ConversionError> {
        Ok(object.to_json()?)
    }

    /// Converts `object`, encoded as `from`, into `to`.
    ///
    /// Same-version conversions return the object untouched without going
    /// through the pivot.
    pub fn convert_to(
        &self,
        object: WireObject,
        from: &GroupVersion,
        to: &GroupVersion,
    ) -> Result<WireObject, ConversionError> {
        let found = object.group_version();
        if found != *from {
            return Err(ConversionError::VersionMismatch {
                expected: from.clone(),
                found,
            });
        }
        if from == to {
            return Ok(object);
        }
        if !self.supports(from) || !self.supports(to) {
            return Err(ConversionError::Unsupported {
                from: from.clone(),
                to: to.clone(),
            });
        }

        let pivot = self.to_pivot(object)?;
        debug!(
            target: CONVERT_LOG_TARGET,
            kind = pivot.kind(),
            %from,
            %to,
            "converting via pivot"
        );
        self.from_pivot(pivot, to)
    }

    /// Lifts a wire object to the canonical representation.
    pub fn to_pivot(&self, object: WireObject) -> Result<MetricObject, ConversionError> {
        let from = object.group_version();
        let spoke = SPOKES.get(&from).ok_or_else(|| ConversionError::Unsupported {
            from: from.clone(),
            to: self.pivot_version(),
        })?;
        (spoke.to_pivot)(object).ok_or_else(|| ConversionError::VersionMismatch {
            expected: from.clone(),
            found: from,
        })
    }

    /// Lowers a canonical value into `to`'s wire form.
    pub fn from_pivot(
        &self,
        pivot: MetricObject,
        to: &GroupVersion,
    ) -> Result<WireObject, ConversionError> {
        let spoke = SPOKES.get(to).ok_or_else(|| ConversionError::Unsupported {
            from: self.pivot_version(),
            to: to.clone(),
        })?;
        Ok((spoke.from_pivot)(pivot))
    }
}

impl Default for SchemaConverter {
    fn default() -> Self {
        Self::new()
    }
}
