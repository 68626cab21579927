//! Shared utilities for integration tests.

use std::net::SocketAddr;

use axum::body::Body;
use axum::http::{header::SET_COOKIE, Request, Response, StatusCode};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use cookie_domain_rewrite::config::{DomainReplacement, RewriteConfig};

/// The rewrite rules used throughout the suite.
pub fn local_config() -> RewriteConfig {
    RewriteConfig {
        match_domains: vec!["*.local".to_string()],
        replacements: vec![DomainReplacement::new("oreilly.review", "oreilly.local")],
    }
}

/// Build a request carrying the given Host, Origin and Referer values.
#[allow(dead_code)]
pub fn request(host: &str, origin: Option<&str>, referer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri("/test").header("Host", host);
    if let Some(origin) = origin {
        builder = builder.header("Origin", origin);
    }
    if let Some(referer) = referer {
        builder = builder.header("Referer", referer);
    }
    builder.body(Body::empty()).unwrap()
}

/// Response with one Set-Cookie header per entry, in order.
#[allow(dead_code)]
pub fn cookie_response(cookies: &[&str]) -> Response<Body> {
    let mut builder = Response::builder().status(StatusCode::OK);
    for cookie in cookies {
        builder = builder.header(SET_COOKIE, *cookie);
    }
    builder.body(Body::from("ok")).unwrap()
}

/// All Set-Cookie values of a header map, in order.
#[allow(dead_code)]
pub fn set_cookies(headers: &axum::http::HeaderMap) -> Vec<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

/// Start a raw HTTP/1.1 backend that answers every request with the given
/// Set-Cookie lines. Returns the address it listens on.
#[allow(dead_code)]
pub async fn start_cookie_backend(cookies: &'static [&'static str]) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;

                        let mut response = String::from("HTTP/1.1 200 OK\r\n");
                        for cookie in cookies {
                            response.push_str(&format!("Set-Cookie: {}\r\n", cookie));
                        }
                        response.push_str("Content-Length: 2\r\nConnection: close\r\n\r\nok");

                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}
