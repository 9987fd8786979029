#![allow(dead_code)]

use async_trait::async_trait;
use endpoint_scout::config::DiscoveryConfig;
use endpoint_scout::model::{Address, ProbeResult, SubnetPrefix};
use endpoint_scout::net::probe::Prober;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Prober answering only for a fixed set of addresses, recording every probe
pub struct ScriptedProber {
    reachable: Mutex<HashSet<Address>>,
    probed: Mutex<Vec<Address>>,
}

impl ScriptedProber {
    pub fn new(reachable: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            reachable: Mutex::new(reachable.iter().map(|a| addr(a)).collect()),
            probed: Mutex::new(Vec::new()),
        })
    }

    pub fn set_reachable(&self, reachable: &[&str]) {
        *self.reachable.lock().unwrap() = reachable.iter().map(|a| addr(a)).collect();
    }

    pub fn probed(&self) -> Vec<Address> {
        self.probed.lock().unwrap().clone()
    }

    pub fn probe_count(&self) -> usize {
        self.probed.lock().unwrap().len()
    }

    pub fn was_probed(&self, address: &str) -> bool {
        self.probed.lock().unwrap().contains(&addr(address))
    }

    pub fn reset(&self) {
        self.probed.lock().unwrap().clear();
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self, address: &Address) -> ProbeResult {
        self.probed.lock().unwrap().push(address.clone());
        // Yield so concurrent probes interleave like real I/O
        tokio::task::yield_now().await;
        ProbeResult {
            address: address.clone(),
            reachable: self.reachable.lock().unwrap().contains(address),
            elapsed_ms: 0,
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Hosts that take time to answer, tracking how many checks overlap
///
/// Reachable addresses answer after `fast`, the rest after `slow`.
pub struct TimedResponder {
    reachable: HashSet<Address>,
    fast: Duration,
    slow: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    started: AtomicUsize,
    completed: AtomicUsize,
}

impl TimedResponder {
    pub fn new(reachable: &[&str], fast: Duration, slow: Duration) -> Arc<Self> {
        Arc::new(Self {
            reachable: reachable.iter().map(|a| addr(a)).collect(),
            fast,
            slow,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            started: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        })
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Prober for TimedResponder {
    async fn probe(&self, address: &Address) -> ProbeResult {
        self.started.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let reachable = self.reachable.contains(address);
        tokio::time::sleep(if reachable { self.fast } else { self.slow }).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);
        ProbeResult {
            address: address.clone(),
            reachable,
            elapsed_ms: 0,
        }
    }

    fn name(&self) -> &'static str {
        "timed"
    }
}

pub fn addr(s: &str) -> Address {
    s.parse().unwrap()
}

/// Test configuration scanning only `prefixes`, without recent-subnet preference
pub fn test_config(prefixes: &[&str]) -> DiscoveryConfig {
    DiscoveryConfig {
        prefixes: prefixes
            .iter()
            .map(|p| p.parse::<SubnetPrefix>().unwrap())
            .collect(),
        prefer_recent_subnets: false,
        ..DiscoveryConfig::default()
    }
}
