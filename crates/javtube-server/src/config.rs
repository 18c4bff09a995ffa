//! Command-line and environment configuration for the facade

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use clap::Parser;
use javtube_core::url::{DEFAULT_ARCHIVE_URL, DEFAULT_BASE_URL};
use javtube_core::{AuthTokenCache, ClientConfig, USER_AGENT};

/// Local JSON facade over the javtube scraper
#[derive(Debug, Clone, Parser)]
#[command(name = "javtube-server", version, about)]
pub struct ServerArgs {
    /// Interface to bind
    #[arg(long, env = "JAVTUBE_HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    /// Port to bind
    #[arg(short, long, env = "JAVTUBE_PORT", default_value_t = 3001)]
    pub port: u16,

    /// Catalog origin
    #[arg(long, env = "JAVTUBE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Creator archive origin
    #[arg(long, env = "JAVTUBE_ARCHIVE_URL", default_value = DEFAULT_ARCHIVE_URL)]
    pub archive_url: String,

    /// Per-request upstream timeout in seconds
    #[arg(long, env = "JAVTUBE_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,

    /// Upper bound on outbound requests per second (0 disables pacing)
    #[arg(long, env = "JAVTUBE_RPS", default_value_t = 5.0)]
    pub requests_per_second: f64,

    /// Expire cached archive credentials after this many seconds
    #[arg(long, env = "JAVTUBE_TOKEN_TTL_SECS")]
    pub token_ttl_secs: Option<u64>,
}

impl ServerArgs {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            archive_url: self.archive_url.trim_end_matches('/').to_string(),
            user_agent: USER_AGENT.to_string(),
            requests_per_second: self.requests_per_second,
            timeout_secs: self.timeout_secs,
        }
    }

    /// The process-wide archive token cache, created once at startup
    pub fn token_cache(&self) -> AuthTokenCache {
        match self.token_ttl_secs {
            Some(secs) => AuthTokenCache::with_ttl(Duration::from_secs(secs)),
            None => AuthTokenCache::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_arguments() {
        let args = ServerArgs::try_parse_from([
            "javtube-server",
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
            "--base-url",
            "http://localhost:9000/",
            "--timeout-secs",
            "3",
            "--token-ttl-secs",
            "600",
        ])
        .unwrap();

        assert_eq!(args.addr().to_string(), "0.0.0.0:8080");

        let config = args.client_config();
        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(
            args.token_cache().ttl(),
            Some(Duration::from_secs(600))
        );
    }

    #[test]
    fn test_rejects_bad_port() {
        assert!(ServerArgs::try_parse_from(["javtube-server", "--port", "http"]).is_err());
    }
}
