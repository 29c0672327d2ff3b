//! Facebook profile URL -> Graph API picture URL.

pub mod extract;
pub mod locate;
pub mod resolve;

use log::info;

use crate::config::Config;
use crate::error::ProxyResult;

pub use extract::extract_identifier;
pub use locate::PictureLocator;
pub use resolve::IdentityResolver;

#[derive(Clone)]
pub struct FacebookPipeline {
    resolver: IdentityResolver,
    locator: PictureLocator,
}

impl FacebookPipeline {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            resolver: IdentityResolver::new(
                client,
                config.upstream.facebook_mobile_base.clone(),
                config.upstream.api_timeout,
            ),
            locator: PictureLocator::new(
                config.upstream.facebook_graph_base.clone(),
                config.graph_token.clone(),
            ),
        }
    }

    /// Extract, resolve, then locate. The returned URL embeds the access
    /// token and must not be logged.
    pub async fn picture_url(&self, profile_url: &str) -> ProxyResult<String> {
        let identifier = extract_identifier(profile_url)?;
        let facebook_id = self.resolver.resolve(&identifier).await?;
        info!("Locating Graph picture for Facebook id {}", facebook_id);
        self.locator.picture_url(&facebook_id)
    }
}
