use network_interface;
use thiserror::Error;

/// Error types for endpoint discovery and resolution
///
/// Probing and detection never fail; these cover construction,
/// configuration, persistence and contract violations.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Invalid Address: {0}")]
    InvalidAddress(String),

    #[error("Invalid Subnet Prefix: {0}")]
    InvalidPrefix(String),

    #[error("Endpoint requested before any resolution took place")]
    NotInitialized,

    #[error("I/O Error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP Client Error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Serialization Error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Network Interface Error: {0}")]
    NetworkInterfaceWrapped(#[from] network_interface::Error),

    #[error("Configuration Error: {0}")]
    Config(String),
}
