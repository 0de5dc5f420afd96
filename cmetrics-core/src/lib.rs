pub mod config;
pub mod convert;
pub mod error;
pub mod negotiate;
pub mod version_set;

pub use config::ClientConfig;
pub use convert::SchemaConverter;
pub use error::{ConfigError, ConversionError, NegotiationError, VersionSetError};
pub use negotiate::negotiate;
pub use version_set::VersionSet;
