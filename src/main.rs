// ==========================================================
//  endpoint-scout - locate a development backend on the LAN
// ==========================================================

use endpoint_scout::net::interface;
use endpoint_scout::table::endpoint_table;
use endpoint_scout::{
    DiscoveryConfig, EndpointResolver, Environment, ResolveError, RuntimeContext, SubnetPrefix,
};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

fn print_help() {
    println!("Usage: endpoint-scout [OPTIONS]");
    println!("Options:");
    println!("  -p, --prefix <A.B.C>       subnet prefix to scan, repeatable (default: local interfaces, then built-in list)");
    println!("  -j, --jobs <N>             concurrent probes per stage (default: 12)");
    println!("  -t, --timeout <MS>         per-probe timeout in milliseconds (default: 800)");
    println!("  --simulator                fall back to localhost when nothing answers");
    println!("  --production <URL>         use a fixed GraphQL URL instead of discovery");
    println!("  --production-ws <URL>      fixed WebSocket URL (default: derived from --production)");
    println!("  --fallback-file <PATH>     JSON file holding remembered addresses");
    println!("  --config <PATH>            JSON configuration file");
    println!("  --refresh                  resolve twice, forcing a fresh discovery the second time");
    println!("  --list                     list network interfaces and their prefixes");
    println!("  -h, --help                 show this help message");
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<&String>) -> Result<T, ResolveError> {
    value
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| ResolveError::Config(format!("{} expects a valid value", flag)))
}

#[tokio::main]
async fn main() -> Result<(), ResolveError> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let raw_args: Vec<String> = std::env::args().collect();
    let mut args = raw_args.iter().skip(1);

    let mut config_path: Option<PathBuf> = None;
    let mut prefixes: Vec<SubnetPrefix> = Vec::new();
    let mut jobs: Option<usize> = None;
    let mut timeout_ms: Option<u64> = None;
    let mut simulator = false;
    let mut production: Option<String> = None;
    let mut production_ws: Option<String> = None;
    let mut fallback_file: Option<PathBuf> = None;
    let mut refresh = false;

    // Parse command line arguments
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--prefix" | "-p" => prefixes.push(parse_value(arg, args.next())?),
            "--jobs" | "-j" => jobs = Some(parse_value(arg, args.next())?),
            "--timeout" | "-t" => timeout_ms = Some(parse_value(arg, args.next())?),
            "--simulator" => simulator = true,
            "--production" => production = Some(parse_value(arg, args.next())?),
            "--production-ws" => production_ws = Some(parse_value(arg, args.next())?),
            "--fallback-file" => fallback_file = Some(parse_value(arg, args.next())?),
            "--config" => config_path = Some(parse_value(arg, args.next())?),
            "--refresh" => refresh = true,
            "--list" => {
                interface::list_network_interfaces()?;
                return Ok(());
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            other => {
                print_help();
                return Err(ResolveError::Config(format!("unknown argument '{}'", other)));
            }
        }
    }

    let mut config = match config_path {
        Some(ref path) => DiscoveryConfig::from_file(path)?,
        None => DiscoveryConfig::default(),
    };

    if prefixes.is_empty() {
        // Own subnets first; a phone and its backend usually share one
        match interface::local_prefixes() {
            Ok(local) => {
                let mut merged = local;
                for prefix in &config.prefixes {
                    if !merged.contains(prefix) {
                        merged.push(*prefix);
                    }
                }
                config.prefixes = merged;
            }
            Err(err) => tracing::warn!(error = %err, "could not inspect local interfaces"),
        }
    } else {
        config.prefixes = prefixes;
    }
    if let Some(j) = jobs {
        config.max_concurrent_probes = j.max(1);
    }
    if let Some(ms) = timeout_ms {
        config.probe_timeout_ms = ms;
    }
    if simulator {
        config.runtime = RuntimeContext::Simulator;
    }
    if fallback_file.is_some() {
        config.fallback_file = fallback_file;
    }

    let environment = match (production, production_ws) {
        (Some(graphql_url), Some(websocket_url)) => Environment::Production {
            graphql_url,
            websocket_url,
        },
        (Some(graphql_url), None) => Environment::production(&graphql_url),
        (None, Some(_)) => {
            return Err(ResolveError::Config(
                "--production-ws requires --production".to_string(),
            ))
        }
        (None, None) => Environment::Development,
    };

    let prefix_list = config
        .prefixes
        .iter()
        .map(SubnetPrefix::to_string)
        .collect::<Vec<String>>()
        .join(", ");
    if !environment.is_production() {
        println!("Scanning prefixes: {}", prefix_list);
        println!();
    }

    let resolver = EndpointResolver::from_config(config, environment)?;
    let mut endpoint = resolver.init().await;
    if refresh {
        endpoint = resolver.refresh().await;
    }

    let fallbacks = resolver.detector().fallbacks().await;
    println!("{}", endpoint_table(resolver.environment(), &endpoint, &fallbacks));

    resolver.teardown().await;
    Ok(())
}
