use std::time::Duration;

use log::{debug, error, info};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};

use crate::error::{ProxyError, ProxyResult};
use crate::identifier::ExtractedIdentifier;

pub const ID_NOT_FOUND: &str = "Could not extract Facebook Profile ID.";

// The mobile page only embeds `"userID"` in the English desktop-browser variant.
const DESKTOP_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124 Safari/537.36";
const ENGLISH: &str = "en-US,en;q=0.9";

static USER_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""userID":"(\d+)""#).expect("userID regex"));

/// Turns a vanity username into Facebook's numeric profile id by scraping the
/// public mobile profile page.
#[derive(Clone)]
pub struct IdentityResolver {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl IdentityResolver {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            timeout,
        }
    }

    pub async fn resolve(&self, identifier: &ExtractedIdentifier) -> ProxyResult<String> {
        let username = match identifier {
            ExtractedIdentifier::NumericId(id) => {
                debug!("Identifier {} is already numeric, skipping lookup", id);
                return Ok(id.clone());
            }
            ExtractedIdentifier::Username(username) => username,
        };

        let profile_url = format!("{}/{}", self.base_url, urlencoding::encode(username));
        info!("Resolving Facebook username {} via {}", username, profile_url);

        let response = self
            .client
            .get(&profile_url)
            .headers(scrape_headers())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ProxyError::upstream("facebook profile page", e))?;

        if !response.status().is_success() {
            error!("Facebook profile page request failed with status: {}", response.status());
            return Err(ProxyError::UpstreamStatus {
                service: "facebook profile page",
                status: response.status(),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| ProxyError::upstream("facebook profile page", e))?;

        match find_user_id(&html) {
            Some(id) => {
                info!("Resolved Facebook username {} to id {}", username, id);
                Ok(id.to_string())
            }
            None => Err(ProxyError::not_found(ID_NOT_FOUND)),
        }
    }
}

fn scrape_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(DESKTOP_USER_AGENT));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ENGLISH));
    headers
}

/// First `"userID":"<digits>"` in the page markup.
pub fn find_user_id(html: &str) -> Option<&str> {
    USER_ID_REGEX
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
