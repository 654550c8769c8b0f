//! Server configuration loaded from environment variables

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use crate::error::{RelayError, RelayResult};

/// What the session does with an inbound frame that is not `{"message": ...}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedFramePolicy {
    /// Log and ignore the frame; the connection stays open
    Drop,
    /// Close the connection with a protocol-error close code
    Close,
}

impl FromStr for MalformedFramePolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drop" => Ok(Self::Drop),
            "close" => Ok(Self::Close),
            _ => Err(()),
        }
    }
}

/// Relay server configuration
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub host: IpAddr,
    pub port: u16,

    /// Depth of each connection's outbound queue. A member whose queue is
    /// full misses broadcasts until it drains.
    pub outbox_capacity: usize,

    pub on_malformed: MalformedFramePolicy,

    /// Emit logs as JSON lines instead of plain text
    pub log_json: bool,
}

impl RelayConfig {
    pub const DEFAULT_PORT: u16 = 8000;
    pub const DEFAULT_OUTBOX_CAPACITY: usize = 256;

    /// Load configuration from `CHAT_*` environment variables
    pub fn from_env() -> RelayResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> RelayResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("CHAT_HOST") {
            config.host = parse("CHAT_HOST", host)?;
        }
        if let Some(port) = lookup("CHAT_PORT") {
            config.port = parse("CHAT_PORT", port)?;
        }
        if let Some(capacity) = lookup("CHAT_OUTBOX_CAPACITY") {
            config.outbox_capacity = parse("CHAT_OUTBOX_CAPACITY", capacity)?;
            if config.outbox_capacity == 0 {
                return Err(RelayError::Config {
                    key: "CHAT_OUTBOX_CAPACITY",
                    value: "0".to_string(),
                });
            }
        }
        if let Some(policy) = lookup("CHAT_ON_MALFORMED") {
            config.on_malformed = policy
                .parse()
                .map_err(|_| RelayError::Config {
                    key: "CHAT_ON_MALFORMED",
                    value: policy.clone(),
                })?;
        }
        if let Some(json) = lookup("CHAT_LOG_JSON") {
            config.log_json = match json.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" | "" => false,
                _ => {
                    return Err(RelayError::Config {
                        key: "CHAT_LOG_JSON",
                        value: json,
                    })
                }
            };
        }

        Ok(config)
    }

    /// Socket address to bind
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: Self::DEFAULT_PORT,
            outbox_capacity: Self::DEFAULT_OUTBOX_CAPACITY,
            on_malformed: MalformedFramePolicy::Close,
            log_json: false,
        }
    }
}

fn parse<T: FromStr>(key: &'static str, value: String) -> RelayResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| RelayError::Config { key, value })
}
