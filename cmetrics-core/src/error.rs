use std::path::PathBuf;

use cmetrics_rpc::meta::{GroupVersion, InvalidGroupVersion};
use thiserror::Error;

/// Error returned when a version set would violate its ordering invariants.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum VersionSetError {
    #[error("version set must contain at least one version")]
    Empty,
    #[error("version {0} is listed more than once")]
    Duplicate(GroupVersion),
    #[error("version {0} has no registered conversion")]
    Unknown(String),
}

/// The server advertises the group, but none of its versions are known to
/// this build. Not transient: retrying without upgrading will fail again.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum NegotiationError {
    #[error(
        "no known available versions of {group} found (server advertises [{}])",
        join(.advertised)
    )]
    NoCompatibleVersion {
        group: String,
        advertised: Vec<String>,
    },
}

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("no conversion from {from} to {to}")]
    Unsupported { from: GroupVersion, to: GroupVersion },
    #[error("object is encoded as {found}, expected {expected}")]
    VersionMismatch {
        expected: GroupVersion,
        found: GroupVersion,
    },
    #[error("kind {kind} is not defined in {version}")]
    UnknownKind { version: GroupVersion, kind: String },
    #[error(
        "payload did not decode as any of [{}]: {detail}",
        join(.attempted)
    )]
    Undecodable {
        attempted: Vec<GroupVersion>,
        detail: String,
    },
    #[error("failed to encode object")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config")]
    Parse(#[from] toml::de::Error),
    #[error("invalid version {value:?} in config")]
    InvalidVersion {
        value: String,
        #[source]
        source: InvalidGroupVersion,
    },
    #[error(
        "response version {version} is not one of the configured versions [{}]",
        join(.known)
    )]
    UnknownResponseVersion {
        version: GroupVersion,
        known: Vec<GroupVersion>,
    },
    #[error(transparent)]
    Versions(#[from] VersionSetError),
}

fn join<T: ToString>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
