use actix_web::{web, HttpResponse, Responder};
use log::info;
use serde::Deserialize;
use serde_json::json;

use crate::error::{ProxyError, ProxyResult};
use crate::AppState;

#[derive(Deserialize)]
pub struct ProfileQuery {
    url: Option<String>,
}

impl ProfileQuery {
    /// An empty `url` is treated the same as a missing one.
    fn profile_url(&self) -> ProxyResult<&str> {
        self.url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or_else(ProxyError::missing_url)
    }
}

/// Answers every unrouted path.
pub async fn usage_handler() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": "Welcome to the Profile Picture API!",
        "usage": {
            "facebook": "/api/pfp?url=<facebook-profile-url>",
            "instagram": "/api/instagram?url=<instagram-profile-url>"
        }
    }))
}

/// GET /api/pfp?url=<facebook-profile-url>
pub async fn facebook_handler(
    query: web::Query<ProfileQuery>,
    state: web::Data<AppState>,
) -> ProxyResult<HttpResponse> {
    let profile_url = query.profile_url()?;
    info!("Facebook picture requested for {}", profile_url);

    let image_url = state.facebook.picture_url(profile_url).await?;
    state.images.relay(&image_url).await
}

/// GET /api/instagram?url=<instagram-profile-url>
pub async fn instagram_handler(
    query: web::Query<ProfileQuery>,
    state: web::Data<AppState>,
) -> ProxyResult<HttpResponse> {
    let profile_url = query.profile_url()?;
    info!("Instagram picture requested for {}", profile_url);

    let image_url = state.instagram.picture_url(profile_url).await?;
    state.images.relay(&image_url).await
}
