// Shared fixtures for the endpoint tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use actix_web::web;
use wiremock::MockServer;

pub use pfp_proxy::*;

pub const TEST_TOKEN: &str = "test-graph-token";

/// One mock server per upstream, so each test can assert which ones were hit.
pub struct Upstreams {
    pub facebook_mobile: MockServer,
    pub graph: MockServer,
    pub instagram: MockServer,
    pub cdn: MockServer,
}

impl Upstreams {
    pub async fn start() -> Self {
        Self {
            facebook_mobile: MockServer::start().await,
            graph: MockServer::start().await,
            instagram: MockServer::start().await,
            cdn: MockServer::start().await,
        }
    }

    pub fn config(&self, token: Option<&str>) -> Config {
        let mut vars = HashMap::new();
        vars.insert("FACEBOOK_MOBILE_BASE_URL", self.facebook_mobile.uri());
        vars.insert("FACEBOOK_GRAPH_BASE_URL", self.graph.uri());
        vars.insert("INSTAGRAM_API_BASE_URL", self.instagram.uri());
        vars.insert("UPSTREAM_TIMEOUT_SECS", "5".to_string());
        vars.insert("IMAGE_TIMEOUT_SECS", "60".to_string());
        if let Some(token) = token {
            vars.insert("FB_GRAPH_TOKEN", token.to_string());
        }

        Config::from_lookup(|key| vars.get(key).cloned()).expect("test config")
    }

    pub fn state(&self, token: Option<&str>) -> web::Data<AppState> {
        web::Data::new(AppState::new(&self.config(token)).expect("test state"))
    }
}

/// Deterministic, non-repeating-per-chunk payload large enough to span
/// several 8 KiB chunks.
pub fn image_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

pub fn profile_page(user_id: &str) -> String {
    format!(
        r#"<html><head></head><body><script>requireLazy(["x"],function(){{({{"actorID":"0","userID":"{}","name":"John"}})}});</script></body></html>"#,
        user_id
    )
}

/// Serves `body` once without a Content-Type header.
/// Returns the base URL.
pub fn serve_once_without_content_type(body: Vec<u8>) -> String {
    serve_once(body, None)
}

/// Serves `body` once with `content_type` written verbatim, so tests can send
/// header bytes that a typed builder would refuse.
/// Returns the base URL.
pub fn serve_once(body: Vec<u8>, content_type: Option<&'static [u8]>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind raw upstream");
    let addr = listener.local_addr().expect("raw upstream address");

    thread::spawn(move || {
        let Some(mut stream) = accept_request(&listener) else {
            return;
        };
        let mut head = Vec::from(&b"HTTP/1.1 200 OK\r\n"[..]);
        if let Some(content_type) = content_type {
            head.extend_from_slice(b"Content-Type: ");
            head.extend_from_slice(content_type);
            head.extend_from_slice(b"\r\n");
        }
        head.extend_from_slice(
            format!("Content-Length: {}\r\nConnection: close\r\n\r\n", body.len()).as_bytes(),
        );
        let _ = stream.write_all(&head);
        let _ = stream.write_all(&body);
    });

    format!("http://{}", addr)
}

/// Announced length of [`serve_endless_image`]; far more than any test reads.
pub const ENDLESS_IMAGE_LEN: usize = 1 << 30;

/// Serves one image that trickles out slowly and never finishes in test time.
/// When a write fails because the reader went away, the number of bytes
/// written so far is sent on the returned channel.
pub fn serve_endless_image() -> (String, mpsc::Receiver<usize>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind raw upstream");
    let addr = listener.local_addr().expect("raw upstream address");
    let (closed_tx, closed_rx) = mpsc::channel();

    thread::spawn(move || {
        let Some(mut stream) = accept_request(&listener) else {
            return;
        };
        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: image/jpeg\r\nContent-Length: {}\r\n\r\n",
            ENDLESS_IMAGE_LEN
        );
        if stream.write_all(head.as_bytes()).is_err() {
            return;
        }

        let chunk = image_bytes(8 * 1024);
        let mut written = 0;
        while written < ENDLESS_IMAGE_LEN {
            if stream.write_all(&chunk).is_err() {
                let _ = closed_tx.send(written);
                return;
            }
            written += chunk.len();
            thread::sleep(Duration::from_millis(5));
        }
    });

    (format!("http://{}", addr), closed_rx)
}

/// Accepts one connection and reads the request head.
fn accept_request(listener: &TcpListener) -> Option<TcpStream> {
    let (mut stream, _) = listener.accept().ok()?;
    let mut request = Vec::new();
    let mut buf = [0u8; 4096];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return None,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }
    Some(stream)
}
