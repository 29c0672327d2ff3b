//! Instagram profile URL -> HD profile picture URL, via the web-profile-info
//! endpoint the Instagram app itself uses.

use std::time::Duration;

use log::{error, info};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{HeaderValue, USER_AGENT};
use serde::Deserialize;

use crate::config::Config;
use crate::error::{ProxyError, ProxyResult};

pub const INVALID_URL: &str = "Invalid Instagram URL.";
pub const PICTURE_NOT_FOUND: &str = "Could not find profile picture URL.";

// The endpoint rejects, or reshapes its response for, anything that does not
// look like the iOS app.
const APP_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 12_3_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Mobile/15E148 Instagram 105.0.0.11.118 (iPhone11,8; iOS 12_3_1; en_US; en-US; scale=2.00; 828x1792; 165586599)";

static USERNAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"instagram\.com/([A-Za-z0-9_.]+)").expect("instagram username regex"));

#[derive(Deserialize)]
struct WebProfileInfo {
    data: Option<ProfileData>,
}

#[derive(Deserialize)]
struct ProfileData {
    user: Option<ProfileUser>,
}

#[derive(Deserialize)]
struct ProfileUser {
    profile_pic_url_hd: Option<String>,
}

/// First run of `[A-Za-z0-9_.]` right after `instagram.com/`.
pub fn extract_username(raw: &str) -> ProxyResult<String> {
    USERNAME_REGEX
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ProxyError::InvalidUrl(INVALID_URL.to_string()))
}

#[derive(Clone)]
pub struct InstagramLocator {
    client: reqwest::Client,
    api_base: String,
    timeout: Duration,
}

impl InstagramLocator {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            api_base: config.upstream.instagram_api_base.clone(),
            timeout: config.upstream.api_timeout,
        }
    }

    pub async fn picture_url(&self, profile_url: &str) -> ProxyResult<String> {
        let username = extract_username(profile_url)?;
        let api_url = format!(
            "{}/api/v1/users/web_profile_info/?username={}",
            self.api_base,
            urlencoding::encode(&username)
        );
        info!("Fetching Instagram profile info for {}", username);

        let response = self
            .client
            .get(&api_url)
            .header(USER_AGENT, HeaderValue::from_static(APP_USER_AGENT))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ProxyError::upstream("instagram profile info", e))?;

        if !response.status().is_success() {
            error!("Instagram profile info request failed with status: {}", response.status());
            return Err(ProxyError::UpstreamStatus {
                service: "instagram profile info",
                status: response.status(),
            });
        }

        let info = response
            .json::<WebProfileInfo>()
            .await
            .map_err(|e| ProxyError::upstream("instagram profile info", e))?;

        hd_picture(info).ok_or_else(|| ProxyError::not_found(PICTURE_NOT_FOUND))
    }
}

fn hd_picture(info: WebProfileInfo) -> Option<String> {
    info.data?
        .user?
        .profile_pic_url_hd
        .filter(|url| !url.is_empty())
}
