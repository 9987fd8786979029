/// Port the development backend listens on
pub const SERVICE_PORT: u16 = 4000;

/// Path of the GraphQL endpoint, shared by HTTP and WebSocket transports
pub const SERVICE_PATH: &str = "/graphql";

/// Body sent by the reachability probe
pub const PROBE_QUERY: &str = r#"{"query": "{ __typename }"}"#;

/// Per-probe deadline in milliseconds
pub const PROBE_TIMEOUT_MS: u64 = 800;

/// Lifetime of a cached resolution in seconds
pub const CACHE_TTL_SECS: u64 = 5 * 60;

/// Maximum number of remembered addresses
pub const FALLBACK_CAP: usize = 5;

/// Probes allowed in flight within one scan stage
pub const MAX_CONCURRENT_PROBES: usize = 12;

/// Host suffixes commonly handed out to developer machines
pub const SHORTLIST_START: u8 = 100;
pub const SHORTLIST_END: u8 = 120;

/// Host suffix presumed to be the gateway
pub const ROUTER_HOST: u8 = 1;

/// Address returned by simulators and emulators when nothing answers
pub const SIMULATOR_ADDRESS: &str = "localhost";

/// Address returned on a physical device when nothing answers
pub const LAST_RESORT_ADDRESS: &str = "192.168.1.100";

/// Subnets scanned when nothing else is configured
pub const DEFAULT_PREFIXES: &[&str] = &["192.168.1", "192.168.0", "10.0.0"];

/// Built-in fallback list
/// Used when no fallback file is configured or the file cannot be read.
/// The host-side tool rewrites these entries with the developer machine's address.
pub const BUILTIN_FALLBACKS: &[&str] = &["192.168.1.100", "192.168.0.100", "localhost"];
