//! Relays an upstream image to the caller without buffering it.

use std::time::Duration;

use actix_web::http::header::{self, CacheControl, CacheDirective, HeaderValue};
use actix_web::web::Bytes;
use actix_web::HttpResponse;
use futures_util::stream::{self, Stream, StreamExt, TryStreamExt};
use log::{error, info};

use crate::error::{ProxyError, ProxyResult};

pub const CHUNK_SIZE: usize = 8 * 1024;
pub const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

const SHARED_MAX_AGE_SECS: u32 = 86_400;
const STALE_WHILE_REVALIDATE_SECS: u32 = 604_800;

#[derive(Clone)]
pub struct ImageStreamer {
    client: reqwest::Client,
    timeout: Duration,
}

impl ImageStreamer {
    pub fn new(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Fetches `image_url` and answers with its body as it arrives. The
    /// upstream response is owned by the body stream, so it is released when
    /// the body is drained or when actix drops it after the client goes away.
    pub async fn relay(&self, image_url: &str) -> ProxyResult<HttpResponse> {
        let upstream = self
            .client
            .get(image_url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ProxyError::upstream("image", e))?;

        info!("Image fetch response status: {}", upstream.status());
        if !upstream.status().is_success() {
            return Err(ProxyError::UpstreamStatus {
                service: "image",
                status: upstream.status(),
            });
        }

        // Forwarded byte for byte; values with non-ASCII bytes are still valid.
        let content_type = upstream
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|ct| HeaderValue::from_bytes(ct.as_bytes()).ok())
            .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));

        let body = rechunk(upstream.bytes_stream().map_err(reqwest::Error::without_url))
            .inspect_err(|e| error!("Image stream aborted: {}", e));

        Ok(HttpResponse::Ok()
            .insert_header((header::CONTENT_TYPE, content_type))
            .insert_header(cache_control())
            .streaming(body))
    }
}

pub fn cache_control() -> CacheControl {
    CacheControl(vec![
        CacheDirective::Public,
        CacheDirective::Extension("s-maxage".to_owned(), Some(SHARED_MAX_AGE_SECS.to_string())),
        CacheDirective::Extension(
            "stale-while-revalidate".to_owned(),
            Some(STALE_WHILE_REVALIDATE_SECS.to_string()),
        ),
    ])
}

/// Splits each upstream chunk into pieces of at most [`CHUNK_SIZE`] bytes.
/// Chunks are never merged, so nothing waits for more data than has arrived.
pub fn rechunk<S, E>(upstream: S) -> impl Stream<Item = Result<Bytes, E>>
where
    S: Stream<Item = Result<Bytes, E>>,
{
    upstream.flat_map(|item| {
        let pieces = match item {
            Ok(mut bytes) => {
                let mut pieces = Vec::with_capacity(bytes.len() / CHUNK_SIZE + 1);
                while bytes.len() > CHUNK_SIZE {
                    pieces.push(Ok(bytes.split_to(CHUNK_SIZE)));
                }
                if !bytes.is_empty() {
                    pieces.push(Ok(bytes));
                }
                pieces
            }
            Err(e) => vec![Err(e)],
        };
        stream::iter(pieces)
    })
}
