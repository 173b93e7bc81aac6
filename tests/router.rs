//! End-to-end checks that the named route table matches what the built
//! router actually serves, using the same extensions the demo host installs.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Extension, Router,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower::ServiceExt;
use wink::config::{Authentication, Config};
use wink::wink::{guard::AuthRegistry, registrar, routes::RouteTable};

fn blog_config(routes_enabled: bool) -> Config {
    Config {
        middleware_group: "web".to_string(),
        domain: None,
        path: "blog".to_string(),
        authentication: Authentication { routes_enabled },
    }
}

/// Wire the router with the same extensions the demo host installs. The
/// pool is lazy; nothing talks to a database unless a session cookie is
/// presented.
fn app(config: Config) -> (Router, RouteTable) {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost:5432/wink")
        .expect("valid lazy pool");

    let mut auth = AuthRegistry::new();
    registrar::register_guard(&mut auth);

    let (router, table) = registrar::register_routes(&config);

    let router = router
        .layer(Extension(pool))
        .layer(Extension(Arc::new(config)))
        .layer(Extension(Arc::new(auth)));

    (router, table)
}

#[tokio::test]
async fn named_login_route_resolves_and_serves() {
    let (router, table) = app(blog_config(true));

    let login = table.get("wink.auth.login").expect("login route is named");
    assert_eq!(login.method, axum::http::Method::GET);
    assert_eq!(login.path, "/blog/login");

    let response = router
        .oneshot(
            Request::builder()
                .uri(login.path.as_str())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn auth_routes_absent_when_disabled() {
    let (router, table) = app(blog_config(false));

    assert!(table.get("wink.auth.login").is_none());

    let response = router
        .oneshot(
            Request::builder()
                .uri("/blog/login")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn content_api_requires_a_session() {
    let (router, _table) = app(blog_config(true));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/blog/api/posts")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unauthenticated_browser_requests_land_on_login() {
    let (router, _table) = app(blog_config(true));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/blog")
                .header(header::ACCEPT, "text/html")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok()),
        Some("/blog/login")
    );
}

#[tokio::test]
async fn password_reset_submission_is_routed_without_a_session() {
    let (router, table) = app(blog_config(true));

    let update = table
        .get("wink.password.update")
        .expect("update route is named");
    assert_eq!(update.method, axum::http::Method::POST);
    assert_eq!(update.path, "/blog/password/reset/:token");

    // No session cookie; the short password is rejected by the handler
    // itself, proving the route is reachable and not behind the guard.
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/blog/password/reset/some-token")
                .header(
                    header::CONTENT_TYPE,
                    "application/x-www-form-urlencoded",
                )
                .body(Body::from("email=author%40example.com&password=short"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn password_forgot_form_is_public() {
    let (router, table) = app(blog_config(true));

    let forgot = table.get("wink.password.forgot").unwrap();

    let response = router
        .oneshot(
            Request::builder()
                .uri(forgot.path.as_str())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
