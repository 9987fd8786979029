use endpoint_scout::config::{DiscoveryConfig, Environment, RouterPolicy, RuntimeContext};
use endpoint_scout::errors::ResolveError;
use endpoint_scout::model::{Address, EndpointKind, ResolvedEndpoint, SubnetPrefix};
use std::time::Duration;
use test_utils::addr;

mod test_utils;

#[test]
fn test_default_config_values() {
    let config = DiscoveryConfig::default();

    assert_eq!(config.port, 4000);
    assert_eq!(config.path, "/graphql");
    assert_eq!(config.probe_timeout(), Duration::from_millis(800));
    assert_eq!(config.cache_ttl(), Duration::from_secs(300));
    assert_eq!(config.fallback_cap, 5);
    assert_eq!(config.router_policy, RouterPolicy::AcceptRouter);
    assert_eq!(config.runtime, RuntimeContext::Device);
    assert!(!config.prefixes.is_empty());
    assert!(config.validate().is_ok());
}

#[test]
fn test_concurrency_never_zero() {
    let config = DiscoveryConfig {
        max_concurrent_probes: 0,
        ..DiscoveryConfig::default()
    };
    assert_eq!(config.concurrency(), 1);
}

#[test]
fn test_partial_config_file_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scout.json");
    std::fs::write(
        &path,
        r#"{
            "prefixes": ["192.168.10", "192.168.1.0/24"],
            "router_policy": "confirm_subnet",
            "runtime": "simulator",
            "max_concurrent_probes": 4
        }"#,
    )
    .unwrap();

    let config = DiscoveryConfig::from_file(&path).unwrap();

    assert_eq!(
        config.prefixes,
        vec![SubnetPrefix::new(192, 168, 10), SubnetPrefix::new(192, 168, 1)]
    );
    assert_eq!(config.router_policy, RouterPolicy::ConfirmSubnet);
    assert_eq!(config.runtime, RuntimeContext::Simulator);
    assert_eq!(config.max_concurrent_probes, 4);
    assert_eq!(config.port, 4000);
}

#[test]
fn test_empty_shortlist_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scout.json");
    std::fs::write(&path, r#"{ "shortlist_start": 120, "shortlist_end": 100 }"#).unwrap();

    assert!(matches!(
        DiscoveryConfig::from_file(&path),
        Err(ResolveError::Config(_))
    ));
}

#[test]
fn test_address_parsing() {
    assert!("192.168.1.20".parse::<Address>().is_ok());
    assert!("localhost".parse::<Address>().unwrap().is_localhost());
    assert!(matches!(
        "example.local".parse::<Address>(),
        Err(ResolveError::InvalidAddress(_))
    ));
    assert!("10.0.0".parse::<Address>().is_err());
    assert_eq!(
        addr("192.168.7.9").prefix(),
        Some(SubnetPrefix::new(192, 168, 7))
    );
    assert_eq!(addr("localhost").prefix(), None);
}

#[test]
fn test_prefix_parsing() {
    assert_eq!(
        "192.168.1".parse::<SubnetPrefix>().unwrap().host(1),
        addr("192.168.1.1")
    );
    assert!(matches!(
        "192.168".parse::<SubnetPrefix>(),
        Err(ResolveError::InvalidPrefix(_))
    ));
    assert!("192.168.256".parse::<SubnetPrefix>().is_err());
}

#[test]
fn test_endpoint_url_shapes() {
    let endpoint = ResolvedEndpoint::for_address(&addr("192.168.1.9"), 4000, "/graphql");

    assert_eq!(endpoint.graphql_url, "http://192.168.1.9:4000/graphql");
    assert_eq!(endpoint.url(EndpointKind::Websocket), "ws://192.168.1.9:4000/graphql");
}

#[test]
fn test_production_environment_derives_websocket_scheme() {
    assert_eq!(
        Environment::production("http://api.test/graphql"),
        Environment::Production {
            graphql_url: "http://api.test/graphql".to_string(),
            websocket_url: "ws://api.test/graphql".to_string(),
        }
    );
    assert!(!Environment::Development.is_production());
}
