//! Configuration Module
//!
//! Server settings loaded from environment variables, and the static table of
//! cache domains with their capacity and time-to-live.

use std::env;
use std::time::Duration;

// == Domain Names ==
pub const CASES: &str = "cases";
pub const RESOURCES: &str = "resources";
pub const QUIZ_RESULTS: &str = "quizResults";
pub const USER_PROGRESS: &str = "userProgress";
pub const CONVERSATIONS: &str = "conversations";

// == Domain Config ==
/// Capacity and TTL for one cache domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainConfig {
    /// Domain name used to route requests
    pub name: String,
    /// Maximum number of live records
    pub capacity: usize,
    /// Maximum record age before it reads as expired
    pub ttl: Duration,
}

impl DomainConfig {
    pub fn new(name: impl Into<String>, capacity: usize, ttl: Duration) -> Self {
        Self {
            name: name.into(),
            capacity,
            ttl,
        }
    }
}

/// The application's domain table.
///
/// | domain | capacity | ttl |
/// |---|---|---|
/// | cases | 50 | 10 min |
/// | resources | 30 | 15 min |
/// | quizResults | 20 | 5 min |
/// | userProgress | 10 | 2 min |
/// | conversations | 15 | 8 min |
pub fn default_domains() -> Vec<DomainConfig> {
    const MINUTE: u64 = 60;
    vec![
        DomainConfig::new(CASES, 50, Duration::from_secs(10 * MINUTE)),
        DomainConfig::new(RESOURCES, 30, Duration::from_secs(15 * MINUTE)),
        DomainConfig::new(QUIZ_RESULTS, 20, Duration::from_secs(5 * MINUTE)),
        DomainConfig::new(USER_PROGRESS, 10, Duration::from_secs(2 * MINUTE)),
        DomainConfig::new(CONVERSATIONS, 15, Duration::from_secs(8 * MINUTE)),
    ]
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Expiry sweep interval in seconds, 0 disables the sweep
    pub sweep_interval: u64,
    /// Reject unknown domains with 404 instead of degrading silently
    pub strict_domains: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SWEEP_INTERVAL` - Expiry sweep frequency in seconds (default: 0, off)
    /// - `STRICT_DOMAINS` - `true`/`1` to reject unknown domains (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            sweep_interval: env::var("SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.sweep_interval),
            strict_domains: env::var("STRICT_DOMAINS")
                .ok()
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.strict_domains),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            sweep_interval: 0,
            strict_domains: false,
        }
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
