//! endpoint-scout - locates a development backend on the local network
//!
//! This library resolves a working base URL for a backend whose address is unknown:
//! - Reachability probing of candidate hosts
//! - Staged subnet scanning (gateway, common hosts, full sweep)
//! - TTL cache and a bounded history of addresses that answered before
//! - GraphQL/WebSocket URL resolution for development and production builds

pub mod cache;
pub mod config;
pub mod constants;
pub mod detector;
pub mod errors;
pub mod fallback;
pub mod model;
pub mod net;
pub mod resolver;
pub mod scanner;
pub mod table;

// Re-export commonly used types for convenience
pub use cache::AddressCache;
pub use config::{DiscoveryConfig, Environment, RouterPolicy, RuntimeContext};
pub use detector::{DetectionState, IpDetector};
pub use errors::ResolveError;
pub use fallback::FallbackList;
pub use model::{
    Address, Detection, DetectionSource, EndpointKind, ProbeResult, ResolvedEndpoint,
    ScanCandidate, Stage, SubnetPrefix,
};
pub use net::probe::{HttpProber, Prober};
pub use resolver::EndpointResolver;
pub use scanner::SubnetScanner;
