use crate::config::DiscoveryConfig;
use crate::constants::PROBE_QUERY;
use crate::errors::ResolveError;
use crate::model::{Address, ProbeResult, SubnetPrefix};
use async_trait::async_trait;
use network_interface::{NetworkInterface, NetworkInterfaceConfig};
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use tokio::time::{timeout, Instant};

/// Reachability probing of a single address
pub mod probe {
    use super::*;
    use reqwest::header::CONTENT_TYPE;

    /// Checks whether an address hosts the backend service
    ///
    /// Implementations never fail: timeouts and network errors are reported
    /// as unreachable.
    #[async_trait]
    pub trait Prober: Send + Sync {
        async fn probe(&self, address: &Address) -> ProbeResult;

        /// Return a human-readable name for this prober
        fn name(&self) -> &'static str;
    }

    /// Probes by posting a trivial GraphQL query to the service path
    pub struct HttpProber {
        client: reqwest::Client,
        port: u16,
        path: String,
        deadline: Duration,
    }

    impl HttpProber {
        pub fn new(config: &DiscoveryConfig) -> Result<Self, ResolveError> {
            let deadline = config.probe_timeout();
            let client = reqwest::Client::builder()
                .timeout(deadline)
                .connect_timeout(deadline)
                .no_proxy()
                .build()?;
            Ok(Self {
                client,
                port: config.port,
                path: config.path.clone(),
                deadline,
            })
        }

        pub fn url_for(&self, address: &Address) -> String {
            format!("http://{}:{}{}", address, self.port, self.path)
        }
    }

    #[async_trait]
    impl Prober for HttpProber {
        fn name(&self) -> &'static str {
            "GraphQL POST reachability probe"
        }

        async fn probe(&self, address: &Address) -> ProbeResult {
            let started = Instant::now();
            let request = self
                .client
                .post(self.url_for(address))
                .header(CONTENT_TYPE, "application/json")
                .body(PROBE_QUERY)
                .send();

            // Any HTTP response counts, whatever its status.
            // Dropping the request future on timeout aborts the connection.
            let reachable = match timeout(self.deadline, request).await {
                Ok(Ok(response)) => {
                    tracing::debug!(%address, status = %response.status(), "probe answered");
                    true
                }
                Ok(Err(err)) => {
                    tracing::debug!(%address, error = %err, "probe failed");
                    false
                }
                Err(_) => {
                    tracing::debug!(%address, "probe timed out");
                    false
                }
            };

            ProbeResult {
                address: address.clone(),
                reachable,
                elapsed_ms: started.elapsed().as_millis() as u64,
            }
        }
    }
}

/// Local network interface inspection
pub mod interface {
    use super::*;

    /// `/24` prefixes of this host's own non-loopback IPv4 interfaces
    pub fn local_prefixes() -> Result<Vec<SubnetPrefix>, ResolveError> {
        let interfaces = NetworkInterface::show()?;
        let mut prefixes = Vec::new();
        for interface in interfaces {
            if is_virtual_interface(&interface.name) {
                continue;
            }
            for addr in &interface.addr {
                if let IpAddr::V4(ipv4) = addr.ip() {
                    if let Some(prefix) = prefix_for(ipv4) {
                        if !prefixes.contains(&prefix) {
                            prefixes.push(prefix);
                        }
                    }
                }
            }
        }
        Ok(prefixes)
    }

    /// `/24` prefix for a usable unicast address
    pub fn prefix_for(ip: Ipv4Addr) -> Option<SubnetPrefix> {
        if ip.is_loopback() || ip.is_unspecified() || ip.is_link_local() || ip.is_multicast() {
            return None;
        }
        let [a, b, c, _] = ip.octets();
        Some(SubnetPrefix::new(a, b, c))
    }

    fn is_virtual_interface(name: &str) -> bool {
        name.starts_with("lo") || name.starts_with("docker") || name.starts_with("veth")
    }

    /// List all available network interfaces and the prefixes they map to
    pub fn list_network_interfaces() -> Result<(), ResolveError> {
        let interfaces = NetworkInterface::show()?;
        println!("Available network interfaces:");
        for interface in interfaces {
            println!("  Interface: {}", interface.name);
            for addr in &interface.addr {
                if let IpAddr::V4(ipv4) = addr.ip() {
                    if let Some(prefix) = prefix_for(ipv4) {
                        println!("    IPv4: {} -> Prefix: {}", ipv4, prefix);
                    }
                }
            }
        }
        Ok(())
    }
}
