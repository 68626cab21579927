//! Rewrite layer behaviour on an in-process axum Router.

use axum::body::Body;
use axum::http::{header::SET_COOKIE, StatusCode};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use tower::ServiceExt;

use cookie_domain_rewrite::config::{DomainReplacement, RewriteConfig};
use cookie_domain_rewrite::rewrite::{CookieDomainRewriteLayer, RewriteError};

mod common;

const SESSION_REVIEW: &str = "session=abc123; Domain=oreilly.review; Secure; HttpOnly";
const SESSION_LOCAL: &str = "session=abc123; Domain=oreilly.local; Secure; HttpOnly";

fn app(config: &RewriteConfig, cookie: &'static str) -> Router {
    Router::new()
        .route("/test", get(move || async move { common::cookie_response(&[cookie]) }))
        .layer(CookieDomainRewriteLayer::new(config).unwrap())
}

struct Case {
    name: &'static str,
    match_domains: &'static [&'static str],
    replacements: &'static [(&'static str, &'static str)],
    host: &'static str,
    origin: Option<&'static str>,
    referer: Option<&'static str>,
    set_cookie: &'static str,
    expected: &'static str,
}

const CASES: &[Case] = &[
    Case {
        name: "rewrite from .local domain via Host header",
        match_domains: &["*.local"],
        replacements: &[("oreilly.review", "oreilly.local")],
        host: "api.oreilly.local",
        origin: None,
        referer: None,
        set_cookie: SESSION_REVIEW,
        expected: SESSION_LOCAL,
    },
    Case {
        name: "rewrite from .local domain via Origin header",
        match_domains: &["*.local"],
        replacements: &[("oreilly.review", "oreilly.local")],
        host: "api.oreilly.review",
        origin: Some("https://www.oreilly.local"),
        referer: None,
        set_cookie: SESSION_REVIEW,
        expected: SESSION_LOCAL,
    },
    Case {
        name: "rewrite from .local domain via Referer header",
        match_domains: &["*.local"],
        replacements: &[("oreilly.review", "oreilly.local")],
        host: "api.oreilly.review",
        origin: Some("https://www.oreilly.review"),
        referer: Some("http://www.oreilly.local:3000/login"),
        set_cookie: SESSION_REVIEW,
        expected: SESSION_LOCAL,
    },
    Case {
        name: "no rewrite from .review domain",
        match_domains: &["*.local"],
        replacements: &[("oreilly.review", "oreilly.local")],
        host: "api.oreilly.review",
        origin: Some("https://www.oreilly.review"),
        referer: None,
        set_cookie: SESSION_REVIEW,
        expected: SESSION_REVIEW,
    },
    Case {
        name: "rewrite lowercase domain attribute",
        match_domains: &["*.local"],
        replacements: &[("oreilly.review", "oreilly.local")],
        host: "api.oreilly.local",
        origin: None,
        referer: None,
        set_cookie: "session=abc123; domain=oreilly.review; Secure; HttpOnly",
        expected: "session=abc123; domain=oreilly.local; Secure; HttpOnly",
    },
    Case {
        name: "multiple replacements",
        match_domains: &["*.local"],
        replacements: &[
            ("oreilly.review", "oreilly.local"),
            ("example.review", "example.local"),
        ],
        host: "api.oreilly.local",
        origin: None,
        referer: None,
        set_cookie: "session=abc123; Domain=example.review; Secure",
        expected: "session=abc123; Domain=example.local; Secure",
    },
    Case {
        name: "exact domain match",
        match_domains: &["api.oreilly.local"],
        replacements: &[("oreilly.review", "oreilly.local")],
        host: "api.oreilly.local",
        origin: None,
        referer: None,
        set_cookie: "session=abc123; Domain=oreilly.review; Secure",
        expected: "session=abc123; Domain=oreilly.local; Secure",
    },
    Case {
        name: "no match for exact domain",
        match_domains: &["api.oreilly.local"],
        replacements: &[("oreilly.review", "oreilly.local")],
        host: "www.oreilly.local",
        origin: None,
        referer: None,
        set_cookie: "session=abc123; Domain=oreilly.review; Secure",
        expected: "session=abc123; Domain=oreilly.review; Secure",
    },
    Case {
        name: "host port is ignored",
        match_domains: &["*.local"],
        replacements: &[("oreilly.review", "oreilly.local")],
        host: "api.oreilly.local:8080",
        origin: None,
        referer: None,
        set_cookie: SESSION_REVIEW,
        expected: SESSION_LOCAL,
    },
];

#[tokio::test]
async fn test_cookie_domain_rewriter_cases() {
    for case in CASES {
        let config = RewriteConfig {
            match_domains: case.match_domains.iter().map(|s| s.to_string()).collect(),
            replacements: case
                .replacements
                .iter()
                .map(|(from, to)| DomainReplacement::new(*from, *to))
                .collect(),
        };

        let res = app(&config, case.set_cookie)
            .oneshot(common::request(case.host, case.origin, case.referer))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK, "{}", case.name);
        assert_eq!(
            common::set_cookies(res.headers()),
            vec![case.expected.to_string()],
            "{}",
            case.name
        );
    }
}

#[tokio::test]
async fn test_multiple_set_cookie_headers() {
    let app = Router::new()
        .route(
            "/test",
            get(|| async {
                common::cookie_response(&[
                    "session=abc123; Domain=oreilly.review; Secure",
                    "user=john; Domain=oreilly.review; HttpOnly",
                    "tracking=xyz; Domain=other.com; Secure",
                ])
            }),
        )
        .layer(CookieDomainRewriteLayer::new(&common::local_config()).unwrap());

    let res = app
        .oneshot(common::request("api.oreilly.local", None, None))
        .await
        .unwrap();

    assert_eq!(
        common::set_cookies(res.headers()),
        vec![
            "session=abc123; Domain=oreilly.local; Secure",
            "user=john; Domain=oreilly.local; HttpOnly",
            "tracking=xyz; Domain=other.com; Secure",
        ]
    );
}

#[tokio::test]
async fn test_passthrough_keeps_every_cookie() {
    let cookies = [
        "a=1; Domain=oreilly.review",
        "b=2; domain=oreilly.review; Path=/",
        "c=3",
    ];
    let app = Router::new()
        .route("/test", get(move || async move { common::cookie_response(&cookies) }))
        .layer(CookieDomainRewriteLayer::new(&common::local_config()).unwrap());

    let res = app
        .oneshot(common::request("api.oreilly.review", None, None))
        .await
        .unwrap();

    assert_eq!(common::set_cookies(res.headers()), cookies.to_vec());
}

#[tokio::test]
async fn test_response_without_cookies() {
    let app = Router::new()
        .route("/test", get(|| async { "no cookies" }))
        .layer(CookieDomainRewriteLayer::new(&common::local_config()).unwrap());

    let res = app
        .oneshot(common::request("api.oreilly.local", None, None))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get(SET_COOKIE).is_none());
    let body = axum::body::to_bytes(res.into_body(), 1024).await.unwrap();
    assert_eq!(&body[..], b"no cookies");
}

#[tokio::test]
async fn test_error_status_and_body_untouched() {
    let app = Router::new()
        .route(
            "/test",
            get(|| async {
                Response::builder()
                    .status(StatusCode::UNAUTHORIZED)
                    .header(SET_COOKIE, "session=; Domain=oreilly.review; Max-Age=0")
                    .body(Body::from("Domain=oreilly.review"))
                    .unwrap()
            }),
        )
        .layer(CookieDomainRewriteLayer::new(&common::local_config()).unwrap());

    let res = app
        .oneshot(common::request("api.oreilly.local", None, None))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        common::set_cookies(res.headers()),
        vec!["session=; Domain=oreilly.local; Max-Age=0"]
    );
    let body = axum::body::to_bytes(res.into_body(), 1024).await.unwrap();
    assert_eq!(&body[..], b"Domain=oreilly.review");
}

#[test]
fn test_layer_requires_replacements() {
    let config = RewriteConfig {
        match_domains: vec!["*.local".to_string()],
        replacements: Vec::new(),
    };
    assert!(matches!(
        CookieDomainRewriteLayer::new(&config),
        Err(RewriteError::NoReplacements)
    ));
}
