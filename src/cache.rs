use crate::model::{Address, CacheEntry};
use std::time::Duration;

/// TTL-bounded memo of the last known-good address
///
/// Staleness is checked on read; stale entries stay until overwritten or cleared.
#[derive(Debug)]
pub struct AddressCache {
    entry: Option<CacheEntry>,
    ttl: Duration,
}

impl AddressCache {
    pub fn new(ttl: Duration) -> Self {
        Self { entry: None, ttl }
    }

    /// Cached address if present and unexpired
    pub fn get(&self) -> Option<Address> {
        self.entry
            .as_ref()
            .filter(|entry| entry.is_fresh(self.ttl))
            .map(|entry| entry.address.clone())
    }

    /// Replace any prior entry with `address`, stamped now
    pub fn set(&mut self, address: Address) {
        self.entry = Some(CacheEntry::new(address));
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }

    /// Raw entry, fresh or not
    pub fn entry(&self) -> Option<&CacheEntry> {
        self.entry.as_ref()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
