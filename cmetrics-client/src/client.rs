//! Caller-facing entry point for request and response pipelines.

use cmetrics_core::{
    config::ClientConfig, convert::SchemaConverter, error::ConfigError,
    version_set::VersionSet,
};
use cmetrics_rpc::{
    custom_metrics::{
        WireObject,
        internal::{MetricListOptions, MetricObject},
    },
    meta::GroupVersion,
};
use tracing::debug;

use crate::{discovery::DiscoveryClient, error::VersionError, source::VersionSource};

const CLIENT_LOG_TARGET: &str = "cmetrics.client";

/// Negotiates per-group versions and converts payloads to and from them.
pub struct MetricsClient<D> {
    source: VersionSource<D>,
    converter: SchemaConverter,
    group: String,
    response_version: GroupVersion,
}

impl<D: DiscoveryClient> MetricsClient<D> {
    /// Client speaking every version compiled into this build.
    pub fn new(discovery: D) -> Self {
        let config = ClientConfig::default();
        let known = VersionSet::metric_versions().clone();
        Self {
            response_version: known.preferred().clone(),
            source: VersionSource::new(discovery, known),
            converter: SchemaConverter::new(),
            group: config.group,
        }
    }

    pub fn from_config(discovery: D, config: &ClientConfig) -> Result<Self, ConfigError> {
        let known = config.version_set()?;
        Ok(Self {
            response_version: config.response_version()?,
            source: VersionSource::new(discovery, known.clone()),
            converter: SchemaConverter::with_versions(known)?,
            group: config.group.clone(),
        })
    }

    /// The configured API group.
    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn source(&self) -> &VersionSource<D> {
        &self.source
    }

    pub fn converter(&self) -> &SchemaConverter {
        &self.converter
    }

    /// Negotiated version of the configured group.
    pub fn version(&self) -> Result<GroupVersion, VersionError> {
        self.negotiated_version(&self.group)
    }

    /// [`Self::convert_request`] against the configured group.
    pub fn request(
        &self,
        request: impl Into<MetricObject>,
    ) -> Result<WireObject, VersionError> {
        self.convert_request(request, &self.group)
    }

    /// [`Self::encode_request`] against the configured group.
    pub fn encode(&self, request: impl Into<MetricObject>) -> Result<Vec<u8>, VersionError> {
        self.encode_request(request, &self.group)
    }

    /// [`Self::convert_response`] against the configured group.
    pub fn response(
        &self,
        bytes: &[u8],
        desired: Option<&GroupVersion>,
    ) -> Result<WireObject, VersionError> {
        self.convert_response(bytes, &self.group, desired)
    }

    /// Drops the negotiated version of the configured group.
    pub fn refresh(&self) {
        self.invalidate(&self.group);
    }

    pub fn negotiated_version(&self, group: &str) -> Result<GroupVersion, VersionError> {
        self.source.preferred_version(group)
    }

    /// Converts a canonical request into the version negotiated for `group`.
    pub fn convert_request(
        &self,
        request: impl Into<MetricObject>,
        group: &str,
    ) -> Result<WireObject, VersionError> {
        let version = self.source.preferred_version(group)?;
        Ok(self.converter.to_wire(request, &version)?)
    }

    /// Converts a canonical request and serializes it for the transport.
    pub fn encode_request(
        &self,
        request: impl Into<MetricObject>,
        group: &str,
    ) -> Result<Vec<u8>, VersionError> {
        let wire = self.convert_request(request, group)?;
        Ok(self.converter.encode(&wire)?)
    }

    pub fn convert_list_options(
        &self,
        options: &MetricListOptions,
        group: &str,
    ) -> Result<WireObject, VersionError> {
        self.convert_request(options.clone(), group)
    }

    /// Decodes a response in whichever known version of `group` the server
    /// used and converts it to `desired`, or to the configured response
    /// version when `desired` is `None`.
    pub fn convert_response(
        &self,
        bytes: &[u8],
        group: &str,
        desired: Option<&GroupVersion>,
    ) -> Result<WireObject, VersionError> {
        let candidates = self
            .converter
            .known()
            .in_group(group)
            .cloned()
            .collect::<Vec<_>>();
        let (decoded, object) = self.converter.from_wire(bytes, &candidates)?;

        if let Some(negotiated) = self.source.cached_version(group) {
            if negotiated != decoded {
                debug!(
                    target: CLIENT_LOG_TARGET,
                    group,
                    %negotiated,
                    %decoded,
                    "server answered in a different version than negotiated"
                );
            }
        }

        let desired = desired.unwrap_or(&self.response_version);
        Ok(self.converter.convert_to(object, &decoded, desired)?)
    }

    pub fn invalidate(&self, group: &str) {
        self.source.invalidate(group);
    }
}
