use crate::config::{DiscoveryConfig, RouterPolicy};
use crate::constants::ROUTER_HOST;
use crate::model::{Address, ScanCandidate, Stage, SubnetPrefix};
use crate::net::probe::Prober;
use futures::pin_mut;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::time::Instant;

/// Staged subnet scanner: router, then shortlist, then full sweep
///
/// Stages run strictly one after another. Inside a stage up to
/// `max_concurrent_probes` probes run at once, but results are consumed in
/// rank order, so the lowest-ranked reachable candidate wins. Probes still in
/// flight when a winner is found are dropped, which aborts their requests.
pub struct SubnetScanner {
    prober: Arc<dyn Prober>,
    config: Arc<DiscoveryConfig>,
}

impl SubnetScanner {
    pub fn new(prober: Arc<dyn Prober>, config: Arc<DiscoveryConfig>) -> Self {
        Self { prober, config }
    }

    /// Ordered candidates for one stage over `prefixes`, skipping `already_probed`
    pub fn stage_candidates(
        &self,
        stage: Stage,
        prefixes: &[SubnetPrefix],
        already_probed: &HashSet<Address>,
    ) -> Vec<ScanCandidate> {
        let hosts: Vec<u8> = match stage {
            Stage::Router => vec![ROUTER_HOST],
            Stage::Shortlist => (self.config.shortlist_start..=self.config.shortlist_end).collect(),
            Stage::Sweep => (1..=254).collect(),
        };

        let mut seen = HashSet::new();
        prefixes
            .iter()
            .flat_map(|prefix| hosts.iter().map(move |&host| prefix.host(host)))
            .filter(|address| !already_probed.contains(address) && seen.insert(address.clone()))
            .enumerate()
            .map(|(rank, address)| ScanCandidate {
                address,
                rank: rank as u32,
            })
            .collect()
    }

    /// Scan `prefixes` and return the first reachable address with the stage that found it
    pub async fn scan(&self, prefixes: &[SubnetPrefix]) -> Option<(Address, Stage)> {
        if prefixes.is_empty() {
            tracing::debug!("no subnet prefixes to scan");
            return None;
        }

        let scan_start = Instant::now();
        let mut probed = HashSet::new();

        // Stage 1: gateways
        let routers = self.stage_candidates(Stage::Router, prefixes, &probed);
        probed.extend(routers.iter().map(|c| c.address.clone()));

        // Gateways that answered under ConfirmSubnet, kept as the answer of last resort
        let mut live_gateways: Vec<Address> = Vec::new();
        let shortlist_prefixes: Vec<SubnetPrefix> = match self.config.router_policy {
            RouterPolicy::AcceptRouter => {
                if let Some(address) = self.probe_in_order(routers).await {
                    tracing::info!(%address, stage = ?Stage::Router, elapsed_ms = scan_start.elapsed().as_millis() as u64, "backend found");
                    return Some((address, Stage::Router));
                }
                prefixes.to_vec()
            }
            RouterPolicy::ConfirmSubnet => {
                live_gateways = self.probe_all(routers).await;
                let live: Vec<SubnetPrefix> =
                    live_gateways.iter().filter_map(Address::prefix).collect();
                if live.is_empty() {
                    prefixes.to_vec()
                } else {
                    tracing::debug!(?live, "gateways answered, narrowing shortlist");
                    live
                }
            }
        };

        // Stage 2: common developer hosts
        let shortlist = self.stage_candidates(Stage::Shortlist, &shortlist_prefixes, &probed);
        probed.extend(shortlist.iter().map(|c| c.address.clone()));
        if let Some(address) = self.probe_in_order(shortlist).await {
            tracing::info!(%address, stage = ?Stage::Shortlist, elapsed_ms = scan_start.elapsed().as_millis() as u64, "backend found");
            return Some((address, Stage::Shortlist));
        }

        // Stage 3: everything else
        let sweep = self.stage_candidates(Stage::Sweep, prefixes, &probed);
        if let Some(address) = self.probe_in_order(sweep).await {
            tracing::info!(%address, stage = ?Stage::Sweep, elapsed_ms = scan_start.elapsed().as_millis() as u64, "backend found");
            return Some((address, Stage::Sweep));
        }

        if let Some(address) = live_gateways.into_iter().next() {
            tracing::info!(%address, stage = ?Stage::Router, elapsed_ms = scan_start.elapsed().as_millis() as u64, "only a gateway answered, using it");
            return Some((address, Stage::Router));
        }

        tracing::info!(
            prefixes = prefixes.len(),
            elapsed_ms = scan_start.elapsed().as_millis() as u64,
            "scan exhausted without a reachable backend"
        );
        None
    }

    /// Probe candidates with bounded concurrency; the lowest-ranked reachable one wins
    pub async fn probe_in_order(&self, mut candidates: Vec<ScanCandidate>) -> Option<Address> {
        candidates.sort_by_key(|c| c.rank);
        let results = stream::iter(candidates)
            .map(|candidate| {
                let prober = Arc::clone(&self.prober);
                async move { prober.probe(&candidate.address).await }
            })
            .buffered(self.config.concurrency());
        pin_mut!(results);

        while let Some(result) = results.next().await {
            if result.reachable {
                return Some(result.address);
            }
        }
        None
    }

    /// Probe every candidate and return the reachable ones in rank order
    pub async fn probe_all(&self, mut candidates: Vec<ScanCandidate>) -> Vec<Address> {
        candidates.sort_by_key(|c| c.rank);
        stream::iter(candidates)
            .map(|candidate| {
                let prober = Arc::clone(&self.prober);
                async move { prober.probe(&candidate.address).await }
            })
            .buffered(self.config.concurrency())
            .filter_map(|result| async move { result.reachable.then_some(result.address) })
            .collect()
            .await
    }
}
