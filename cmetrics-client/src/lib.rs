pub mod client;
pub mod discovery;
pub mod error;
pub mod source;

pub use client::MetricsClient;
pub use discovery::{DiscoveryClient, DiscoveryFn};
pub use error::VersionError;
pub use source::VersionSource;
