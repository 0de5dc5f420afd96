//! Version negotiation and schema conversion for clients of the
//! `custom.metrics.k8s.io` API group.
//!
//! Wire types live in [`cmetrics_rpc`], the pure negotiation and conversion
//! logic in [`cmetrics_core`], and the cached client in the crate root.

pub use cmetrics_client::*;
pub use cmetrics_core;
pub use cmetrics_rpc;
