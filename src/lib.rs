// Library exports for the profile picture proxy.
// main.rs only wires these into an HttpServer, so tests can build the same App.

pub mod config;
pub mod error;
pub mod facebook;
pub mod handlers;
pub mod identifier;
pub mod instagram;
pub mod stream;

pub use config::Config;
pub use error::{ProxyError, ProxyResult};

use std::time::Duration;

use actix_web::web;

use facebook::FacebookPipeline;
use instagram::InstagramLocator;
use stream::ImageStreamer;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_REDIRECTS: usize = 10;

/// Per-process state shared by every worker. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub facebook: FacebookPipeline,
    pub instagram: InstagramLocator,
    pub images: ImageStreamer,
}

impl AppState {
    pub fn new(config: &Config) -> ProxyResult<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ProxyError::internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(AppState {
            facebook: FacebookPipeline::new(client.clone(), config),
            instagram: InstagramLocator::new(client.clone(), config),
            images: ImageStreamer::new(client, config.upstream.image_timeout),
        })
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    let query_config = web::QueryConfig::default()
        .error_handler(|_, _| ProxyError::Validation("Invalid query string.".to_string()).into());

    cfg.app_data(query_config)
        .service(web::resource("/api/pfp").route(web::get().to(handlers::facebook_handler)))
        .service(web::resource("/api/instagram").route(web::get().to(handlers::instagram_handler)))
        .default_service(web::to(handlers::usage_handler));
}
