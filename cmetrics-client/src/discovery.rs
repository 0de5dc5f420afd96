//! Boundary to the service that reports which API groups a server exposes.

use std::sync::Arc;

use anyhow::Result;
use cmetrics_rpc::discovery::ApiGroupList;

/// Source of discovery listings.
///
/// Implementations may cache listings; `invalidate` asks them to drop that
/// cache so the next `server_groups` call reflects the live server.
pub trait DiscoveryClient: Send + Sync {
    fn server_groups(&self) -> Result<ApiGroupList>;

    fn invalidate(&self) {}
}

impl<D: DiscoveryClient + ?Sized> DiscoveryClient for Arc<D> {
    fn server_groups(&self) -> Result<ApiGroupList> {
        (**self).server_groups()
    }

    fn invalidate(&self) {
        (**self).invalidate()
    }
}

/// Adapts a plain function returning the server's groups. It has no cache,
/// so invalidation is a no-op.
pub struct DiscoveryFn<F>(pub F);

impl<F> DiscoveryFn<F>
where
    F: Fn() -> Result<ApiGroupList> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> DiscoveryClient for DiscoveryFn<F>
where
    F: Fn() -> Result<ApiGroupList> + Send + Sync,
{
    fn server_groups(&self) -> Result<ApiGroupList> {
        (self.0)()
    }
}
