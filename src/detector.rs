use crate::cache::AddressCache;
use crate::config::{DiscoveryConfig, RuntimeContext};
use crate::fallback::FallbackList;
use crate::model::{
    Address, Detection, DetectionSource, EndpointKind, ScanCandidate, SubnetPrefix,
};
use crate::net::probe::Prober;
use crate::scanner::SubnetScanner;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Phases of a detection request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionState {
    /// Looking for a fresh cache entry
    Cached,
    /// Scanning subnets, then probing remembered addresses
    Discovering,
    /// Nothing answered; an environment default is chosen
    Exhausted,
}

/// Finds the backend address: cache, then subnet scan, then fallback list,
/// then a fixed default. Detection always yields an address.
pub struct IpDetector {
    config: Arc<DiscoveryConfig>,
    scanner: SubnetScanner,
    caches: Mutex<HashMap<EndpointKind, AddressCache>>,
    fallbacks: Mutex<FallbackList>,
    // Held for the whole discovery pass; holds that pass's outcome, `None` when exhausted
    discovery_gate: Mutex<Option<Detection>>,
    // Bumped under the gate each time a pass completes
    passes: AtomicU64,
}

impl IpDetector {
    /// Create a detector, reading the fallback list from the configured file if any
    pub fn new(config: DiscoveryConfig, prober: Arc<dyn Prober>) -> Self {
        let fallbacks = match config.fallback_file {
            Some(ref path) => FallbackList::load_or_builtin(path, config.fallback_cap),
            None => FallbackList::builtin(config.fallback_cap),
        };
        Self::with_fallbacks(config, prober, fallbacks)
    }

    pub fn with_fallbacks(
        config: DiscoveryConfig,
        prober: Arc<dyn Prober>,
        fallbacks: FallbackList,
    ) -> Self {
        let config = Arc::new(config);
        let caches = EndpointKind::ALL
            .iter()
            .map(|&kind| (kind, AddressCache::new(config.cache_ttl())))
            .collect();
        Self {
            scanner: SubnetScanner::new(prober, Arc::clone(&config)),
            config,
            caches: Mutex::new(caches),
            fallbacks: Mutex::new(fallbacks),
            discovery_gate: Mutex::new(None),
            passes: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Resolve the backend address for `kind`
    pub async fn detect(&self, kind: EndpointKind) -> Detection {
        let mut state = DetectionState::Cached;
        loop {
            state = match state {
                DetectionState::Cached => match self.cached(kind).await {
                    Some(address) => {
                        tracing::debug!(%address, ?kind, "cache hit");
                        return Detection {
                            address,
                            source: DetectionSource::Cache,
                        };
                    }
                    None => DetectionState::Discovering,
                },
                DetectionState::Discovering => {
                    let seen = self.passes.load(Ordering::Acquire);
                    let mut last_pass = self.discovery_gate.lock().await;

                    if let Some(address) = self.cached(kind).await {
                        return Detection {
                            address,
                            source: DetectionSource::Cache,
                        };
                    }

                    // A pass finished while we waited: share its outcome, even a miss
                    if self.passes.load(Ordering::Acquire) != seen {
                        tracing::debug!(?kind, "joining outcome of concurrent discovery");
                        match last_pass.clone() {
                            Some(detection) => return detection,
                            None => DetectionState::Exhausted,
                        }
                    } else {
                        let outcome = self.discover().await;
                        *last_pass = outcome.clone();
                        self.passes.fetch_add(1, Ordering::AcqRel);
                        match outcome {
                            Some(detection) => return detection,
                            None => DetectionState::Exhausted,
                        }
                    }
                }
                DetectionState::Exhausted => return self.last_resort(),
            };
        }
    }

    /// Drop every cached entry and run discovery again
    pub async fn force_refresh(&self, kind: EndpointKind) -> Detection {
        self.clear().await;
        self.detect(kind).await
    }

    pub async fn clear(&self) {
        let mut caches = self.caches.lock().await;
        for cache in caches.values_mut() {
            cache.clear();
        }
    }

    /// Fresh cached address for `kind`, if any
    pub async fn cached(&self, kind: EndpointKind) -> Option<Address> {
        let caches = self.caches.lock().await;
        let cache = caches.get(&kind)?;
        let fresh = cache.get();
        if fresh.is_none() {
            if let Some(stale) = cache.entry() {
                tracing::debug!(address = %stale.address, ?kind, ttl_secs = cache.ttl().as_secs(), "cached address expired");
            }
        }
        fresh
    }

    /// Snapshot of the fallback list
    pub async fn fallbacks(&self) -> Vec<Address> {
        self.fallbacks.lock().await.list().to_vec()
    }

    async fn discover(&self) -> Option<Detection> {
        let prefixes = self.scan_prefixes().await;
        if let Some((address, stage)) = self.scanner.scan(&prefixes).await {
            self.confirm(&address).await;
            return Some(Detection {
                address,
                source: DetectionSource::Scan(stage),
            });
        }

        let fallbacks = self.fallbacks.lock().await.clone();
        if fallbacks.is_empty() {
            tracing::debug!("fallback list empty, nothing to retry");
            return None;
        }
        let remembered: Vec<ScanCandidate> = fallbacks
            .list()
            .iter()
            .cloned()
            .enumerate()
            .map(|(rank, address)| ScanCandidate {
                address,
                rank: rank as u32,
            })
            .collect();
        tracing::debug!(count = remembered.len(), "probing fallback list");

        let address = self.scanner.probe_in_order(remembered).await?;
        tracing::info!(%address, "backend found in fallback list");
        self.confirm(&address).await;
        Some(Detection {
            address,
            source: DetectionSource::Fallback,
        })
    }

    /// Write a confirmed address through to the caches and the fallback list
    async fn confirm(&self, address: &Address) {
        {
            let mut caches = self.caches.lock().await;
            for cache in caches.values_mut() {
                cache.set(address.clone());
            }
        }

        let mut fallbacks = self.fallbacks.lock().await;
        fallbacks.record_success(address.clone());
        tracing::debug!(%address, remembered = fallbacks.len(), "fallback list updated");
        if let Some(ref path) = self.config.fallback_file {
            if let Err(err) = fallbacks.save(path) {
                tracing::warn!(path = %path.display(), error = %err, "could not persist fallback list");
            }
        }
    }

    /// Subnets of remembered addresses (most recent first), then configured ones
    async fn scan_prefixes(&self) -> Vec<SubnetPrefix> {
        let mut prefixes: Vec<SubnetPrefix> = Vec::new();
        if self.config.prefer_recent_subnets {
            for address in self.fallbacks().await {
                if let Some(prefix) = address.prefix() {
                    if !prefixes.contains(&prefix) {
                        prefixes.push(prefix);
                    }
                }
            }
        }
        for prefix in &self.config.prefixes {
            if !prefixes.contains(prefix) {
                prefixes.push(*prefix);
            }
        }
        prefixes
    }

    fn last_resort(&self) -> Detection {
        let detection = match self.config.runtime {
            RuntimeContext::Simulator => Detection {
                address: Address::localhost(),
                source: DetectionSource::Simulator,
            },
            RuntimeContext::Device => Detection {
                address: self.config.last_resort.clone(),
                source: DetectionSource::LastResort,
            },
        };
        tracing::warn!(address = %detection.address, "discovery exhausted, using default address");
        detection
    }
}
