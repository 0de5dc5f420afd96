#![allow(dead_code)]

use std::{
    sync::atomic::{AtomicUsize, Ordering},
    thread,
    time::Duration,
};

use anyhow::{Result, anyhow};
use cmetrics_client::DiscoveryClient;
use cmetrics_rpc::discovery::{ApiGroup, ApiGroupList};
use parking_lot::Mutex;

/// Discovery double that serves a swappable listing and counts calls.
#[derive(Default)]
pub struct FakeDiscovery {
    listing: Mutex<Option<ApiGroupList>>,
    fetches: AtomicUsize,
    invalidations: AtomicUsize,
    delay: Option<Duration>,
}

impl FakeDiscovery {
    pub fn serving(groups: Vec<ApiGroup>) -> Self {
        Self {
            listing: Mutex::new(Some(ApiGroupList::new(groups))),
            ..Self::default()
        }
    }

    /// Discovery whose every fetch fails.
    pub fn failing() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn serve(&self, groups: Vec<ApiGroup>) {
        *self.listing.lock() = Some(ApiGroupList::new(groups));
    }

    pub fn fail(&self) {
        *self.listing.lock() = None;
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn invalidations(&self) -> usize {
        self.invalidations.load(Ordering::SeqCst)
    }
}

impl DiscoveryClient for FakeDiscovery {
    fn server_groups(&self) -> Result<ApiGroupList> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        self.listing
            .lock()
            .clone()
            .ok_or_else(|| anyhow!("the server is currently unable to handle the request"))
    }

    fn invalidate(&self) {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
    }
}
