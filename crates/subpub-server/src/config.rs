//! Server configuration.

use std::time::Duration;

use clap::Parser;
use subpub_types::BrokerConfig;

/// SubPub server command line arguments.
///
/// Every flag can also be set through the environment, including from a
/// `.env` file in the working directory.
#[derive(Debug, Parser)]
#[command(name = "subpub")]
#[command(about = "Topic publish/subscribe server")]
pub struct Args {
    /// Address to listen on for HTTP requests.
    #[arg(short, long, env = "SUBPUB_LISTEN", default_value = "127.0.0.1:3000")]
    pub listen: String,

    /// Port override for the listen address (`8080` or `:8080`).
    #[arg(long, env = "PORT", value_parser = parse_port)]
    pub port: Option<u16>,

    /// Deadline (ms) for draining in-flight deliveries on shutdown.
    #[arg(long, env = "SUBPUB_SHUTDOWN_TIMEOUT_MS", default_value_t = 5_000)]
    pub shutdown_timeout_ms: u64,

    /// Maximum subscriber callbacks running at once (0 = unlimited).
    #[arg(long, env = "SUBPUB_MAX_CONCURRENT_DELIVERIES", default_value_t = 0)]
    pub max_concurrent_deliveries: usize,
}

fn parse_port(value: &str) -> Result<u16, String> {
    value
        .trim()
        .trim_start_matches(':')
        .parse()
        .map_err(|e| format!("invalid port {value:?}: {e}"))
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on for HTTP requests.
    pub listen_addr: String,
    /// How long shutdown waits for in-flight deliveries.
    pub shutdown_timeout: Duration,
    /// Broker settings.
    pub broker: BrokerConfig,
}

impl From<&Args> for ServerConfig {
    fn from(args: &Args) -> Self {
        Self {
            listen_addr: listen_addr(&args.listen, args.port),
            shutdown_timeout: Duration::from_millis(args.shutdown_timeout_ms),
            broker: BrokerConfig::default()
                .with_max_concurrent_deliveries(args.max_concurrent_deliveries),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:3000".to_string(),
            shutdown_timeout: Duration::from_secs(5),
            broker: BrokerConfig::default(),
        }
    }
}

/// Replace the port of `listen` when `port` is given.
fn listen_addr(listen: &str, port: Option<u16>) -> String {
    let Some(port) = port else {
        return listen.to_string();
    };

    match listen.rsplit_once(':') {
        Some((host, _)) => format!("{host}:{port}"),
        None => format!("{listen}:{port}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port("8080"), Ok(8080));
        assert_eq!(parse_port(":9090"), Ok(9090));
        assert!(parse_port("http").is_err());
        assert!(parse_port("70000").is_err());
    }

    #[test]
    fn test_listen_addr_override() {
        assert_eq!(listen_addr("127.0.0.1:3000", None), "127.0.0.1:3000");
        assert_eq!(listen_addr("127.0.0.1:3000", Some(8080)), "127.0.0.1:8080");
        assert_eq!(listen_addr("0.0.0.0", Some(8080)), "0.0.0.0:8080");
        assert_eq!(listen_addr("[::1]:3000", Some(4000)), "[::1]:4000");
    }

    #[test]
    fn test_config_from_args() {
        let args = Args::try_parse_from([
            "subpub",
            "--listen",
            "0.0.0.0:7000",
            "--port",
            ":7001",
            "--shutdown-timeout-ms",
            "250",
            "--max-concurrent-deliveries",
            "32",
        ])
        .unwrap();
        let config = ServerConfig::from(&args);

        assert_eq!(config.listen_addr, "0.0.0.0:7001");
        assert_eq!(config.shutdown_timeout, Duration::from_millis(250));
        assert_eq!(config.broker.max_concurrent_deliveries, 32);
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.listen_addr, "127.0.0.1:3000");
        assert_eq!(config.shutdown_timeout, Duration::from_secs(5));
        assert!(config.broker.is_unbounded());
    }
}
