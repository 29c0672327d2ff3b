use crate::config::GraphToken;
use crate::error::{ProxyError, ProxyResult};

pub const NOT_CONFIGURED: &str =
    "API is not configured. The FB_GRAPH_TOKEN environment variable must be set.";

// Largest variant the Graph API will serve.
const PICTURE_WIDTH: u32 = 5000;

/// Builds the authenticated Graph API picture URL for a numeric profile id.
/// No request is made here.
#[derive(Clone)]
pub struct PictureLocator {
    graph_base: String,
    token: Option<GraphToken>,
}

impl PictureLocator {
    pub fn new(graph_base: impl Into<String>, token: Option<GraphToken>) -> Self {
        Self {
            graph_base: graph_base.into(),
            token,
        }
    }

    pub fn picture_url(&self, facebook_id: &str) -> ProxyResult<String> {
        let token = self
            .token
            .as_ref()
            .ok_or_else(|| ProxyError::Configuration(NOT_CONFIGURED.to_string()))?;

        Ok(format!(
            "{}/{}/picture?width={}&access_token={}",
            self.graph_base,
            facebook_id,
            PICTURE_WIDTH,
            urlencoding::encode(token.expose())
        ))
    }
}
