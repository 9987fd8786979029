use crate::constants::*;
use crate::errors::ResolveError;
use crate::model::{Address, SubnetPrefix};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How a reachable gateway (`.1`) is treated during a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouterPolicy {
    /// A reachable `.1` is the answer
    #[default]
    AcceptRouter,
    /// A reachable `.1` marks its subnet as live for the shortlist stage and
    /// is only returned when no other host answers
    ConfirmSubnet,
}

/// Where the client runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeContext {
    #[default]
    Device,
    Simulator,
}

/// Build environment of the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Endpoints are discovered on the local network
    Development,
    /// Endpoints are fixed and never discovered
    Production {
        graphql_url: String,
        websocket_url: String,
    },
}

/// Configuration settings for endpoint discovery
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Subnets to scan, most likely first
    pub prefixes: Vec<SubnetPrefix>,

    /// Port and path of the backend service
    pub port: u16,
    pub path: String,

    /// Timeout in milliseconds for a single probe
    pub probe_timeout_ms: u64,

    /// Lifetime of a cached resolution in seconds
    pub cache_ttl_secs: u64,

    /// Maximum number of probes in flight within a stage
    pub max_concurrent_probes: usize,

    /// Inclusive host range probed before the full sweep
    pub shortlist_start: u8,
    pub shortlist_end: u8,

    /// Maximum number of remembered addresses
    pub fallback_cap: usize,

    pub router_policy: RouterPolicy,
    pub runtime: RuntimeContext,

    /// Returned on a device when discovery and fallbacks all fail
    pub last_resort: Address,

    /// JSON file holding the fallback list; the built-in list is used when absent
    pub fallback_file: Option<PathBuf>,

    /// Scan subnets of remembered addresses before the configured ones
    pub prefer_recent_subnets: bool,
}

impl Environment {
    /// Production endpoints from a GraphQL URL; the WebSocket URL swaps the scheme
    pub fn production(graphql_url: &str) -> Self {
        let websocket_url = if let Some(rest) = graphql_url.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = graphql_url.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            graphql_url.to_string()
        };
        Self::Production {
            graphql_url: graphql_url.to_string(),
            websocket_url,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production { .. })
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            prefixes: DEFAULT_PREFIXES
                .iter()
                .filter_map(|p| p.parse().ok())
                .collect(),
            port: SERVICE_PORT,
            path: SERVICE_PATH.to_string(),
            probe_timeout_ms: PROBE_TIMEOUT_MS,
            cache_ttl_secs: CACHE_TTL_SECS,
            max_concurrent_probes: MAX_CONCURRENT_PROBES,
            shortlist_start: SHORTLIST_START,
            shortlist_end: SHORTLIST_END,
            fallback_cap: FALLBACK_CAP,
            router_policy: RouterPolicy::default(),
            runtime: RuntimeContext::default(),
            last_resort: LAST_RESORT_ADDRESS
                .parse()
                .unwrap_or_else(|_| Address::localhost()),
            fallback_file: None,
            prefer_recent_subnets: true,
        }
    }
}

impl DiscoveryConfig {
    /// Load a JSON configuration file; absent fields keep their defaults
    pub fn from_file(path: &Path) -> Result<Self, ResolveError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ResolveError> {
        if self.shortlist_start > self.shortlist_end {
            return Err(ResolveError::Config(format!(
                "shortlist range {}..={} is empty",
                self.shortlist_start, self.shortlist_end
            )));
        }
        if self.shortlist_start == 0 || self.shortlist_end == 255 {
            return Err(ResolveError::Config(
                "shortlist must stay within hosts 1..=254".to_string(),
            ));
        }
        if self.fallback_cap == 0 {
            return Err(ResolveError::Config(
                "fallback cap must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Concurrency limit, never below one
    pub fn concurrency(&self) -> usize {
        self.max_concurrent_probes.max(1)
    }
}
