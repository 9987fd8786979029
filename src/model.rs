use crate::constants::SIMULATOR_ADDRESS;
use crate::errors::ResolveError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::time::Duration;
use tokio::time::Instant;

/// Candidate host for the backend: a dotted-quad IPv4 address or `localhost`
///
/// Only the syntax is checked here; a successful probe is what makes an
/// address meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn localhost() -> Self {
        Self(SIMULATOR_ADDRESS.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_localhost(&self) -> bool {
        self.0 == SIMULATOR_ADDRESS
    }

    /// The `/24` prefix this address lives in, `None` for `localhost`
    pub fn prefix(&self) -> Option<SubnetPrefix> {
        let ip = Ipv4Addr::from_str(&self.0).ok()?;
        let [a, b, c, _] = ip.octets();
        Some(SubnetPrefix([a, b, c]))
    }
}

impl FromStr for Address {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == SIMULATOR_ADDRESS || Ipv4Addr::from_str(trimmed).is_ok() {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(ResolveError::InvalidAddress(s.to_string()))
        }
    }
}

impl TryFrom<String> for Address {
    type Error = ResolveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl From<Ipv4Addr> for Address {
    fn from(ip: Ipv4Addr) -> Self {
        Self(ip.to_string())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// First three octets of a `/24` network, e.g. `192.168.1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubnetPrefix([u8; 3]);

impl SubnetPrefix {
    pub fn new(a: u8, b: u8, c: u8) -> Self {
        Self([a, b, c])
    }

    /// Address of host `host` inside this subnet
    pub fn host(&self, host: u8) -> Address {
        let [a, b, c] = self.0;
        Address::from(Ipv4Addr::new(a, b, c, host))
    }
}

impl FromStr for SubnetPrefix {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches(".0/24").trim_end_matches('.');
        let octets: Vec<u8> = trimmed
            .split('.')
            .map(|part| part.parse::<u8>())
            .collect::<Result<_, _>>()
            .map_err(|_| ResolveError::InvalidPrefix(s.to_string()))?;
        match octets.as_slice() {
            [a, b, c] => Ok(Self([*a, *b, *c])),
            _ => Err(ResolveError::InvalidPrefix(s.to_string())),
        }
    }
}

impl TryFrom<String> for SubnetPrefix {
    type Error = ResolveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SubnetPrefix> for String {
    fn from(prefix: SubnetPrefix) -> Self {
        prefix.to_string()
    }
}

impl fmt::Display for SubnetPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.0;
        write!(f, "{}.{}.{}", a, b, c)
    }
}

/// Logical endpoint kinds served by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointKind {
    Graphql,
    Websocket,
}

impl EndpointKind {
    pub const ALL: [EndpointKind; 2] = [EndpointKind::Graphql, EndpointKind::Websocket];
}

/// A resolved address and the moment it was confirmed
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub address: Address,
    pub resolved_at: Instant,
}

impl CacheEntry {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            resolved_at: Instant::now(),
        }
    }

    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.resolved_at.elapsed() < ttl
    }
}

/// Phase of the subnet scan, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Router,
    Shortlist,
    Sweep,
}

/// Address queued for probing; lower rank is probed first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanCandidate {
    pub address: Address,
    pub rank: u32,
}

/// Outcome of a single probe
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    pub address: Address,
    pub reachable: bool,
    pub elapsed_ms: u64,
}

/// Fully-qualified URLs for one backend host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    pub graphql_url: String,
    pub websocket_url: String,
}

impl ResolvedEndpoint {
    pub fn for_address(address: &Address, port: u16, path: &str) -> Self {
        Self {
            graphql_url: format!("http://{}:{}{}", address, port, path),
            websocket_url: format!("ws://{}:{}{}", address, port, path),
        }
    }

    pub fn url(&self, kind: EndpointKind) -> &str {
        match kind {
            EndpointKind::Graphql => &self.graphql_url,
            EndpointKind::Websocket => &self.websocket_url,
        }
    }
}

/// Where a detected address came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionSource {
    Cache,
    Scan(Stage),
    Fallback,
    Simulator,
    LastResort,
}

/// Result of one detection request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub address: Address,
    pub source: DetectionSource,
}
