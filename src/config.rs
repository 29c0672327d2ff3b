use std::env;
use std::fmt;
use std::time::Duration;

use crate::error::{ProxyError, ProxyResult};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;
const DEFAULT_IMAGE_TIMEOUT_SECS: u64 = 30;

pub const FACEBOOK_MOBILE_BASE_URL: &str = "https://m.facebook.com";
pub const FACEBOOK_GRAPH_BASE_URL: &str = "https://graph.facebook.com";
pub const INSTAGRAM_API_BASE_URL: &str = "https://i.instagram.com";

/// Graph API access token. Kept out of `Debug` output so configuration dumps
/// never show it.
#[derive(Clone, PartialEq, Eq)]
pub struct GraphToken(String);

impl GraphToken {
    pub fn new(token: impl Into<String>) -> Self {
        GraphToken(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for GraphToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GraphToken(***)")
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub facebook_mobile_base: String,
    pub facebook_graph_base: String,
    pub instagram_api_base: String,
    pub api_timeout: Duration,
    pub image_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub graph_token: Option<GraphToken>,
}

impl Config {
    /// Reads the process environment, after loading `.env` if one exists.
    pub fn from_env() -> ProxyResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> ProxyResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let graph_token = lookup("FB_GRAPH_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .map(GraphToken::new);

        let server = ServerConfig {
            host: lookup("SERVER_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or("SERVER_PORT", &lookup, DEFAULT_PORT)?,
        };

        let upstream = UpstreamConfig {
            facebook_mobile_base: base_url("FACEBOOK_MOBILE_BASE_URL", &lookup, FACEBOOK_MOBILE_BASE_URL),
            facebook_graph_base: base_url("FACEBOOK_GRAPH_BASE_URL", &lookup, FACEBOOK_GRAPH_BASE_URL),
            instagram_api_base: base_url("INSTAGRAM_API_BASE_URL", &lookup, INSTAGRAM_API_BASE_URL),
            api_timeout: Duration::from_secs(parse_or(
                "UPSTREAM_TIMEOUT_SECS",
                &lookup,
                DEFAULT_UPSTREAM_TIMEOUT_SECS,
            )?),
            image_timeout: Duration::from_secs(parse_or(
                "IMAGE_TIMEOUT_SECS",
                &lookup,
                DEFAULT_IMAGE_TIMEOUT_SECS,
            )?),
        };

        Ok(Config {
            server,
            upstream,
            graph_token,
        })
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }
}

fn base_url<F>(key: &str, lookup: &F, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
        .trim_end_matches('/')
        .to_string()
}

fn parse_or<F, T>(key: &str, lookup: &F, default: T) -> ProxyResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| {
            ProxyError::Configuration(format!("{} must be a valid number, got {:?}", key, raw))
        }),
        None => Ok(default),
    }
}
