//! Session authentication and the domain constraint, as axum middleware.

use crate::config::Config;
use crate::wink::{
    guard::{AuthRegistry, GuardDriver},
    registrar, session,
};
use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

/// The author resolved by the session guard, inserted into request
/// extensions for the handlers behind the middleware.
#[derive(Debug, Clone)]
pub struct CurrentAuthor {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

/// Require an authenticated author session.
///
/// Browser requests without one are redirected to the login route; API
/// requests get a 401.
pub async fn authenticate(mut request: Request, next: Next) -> Response {
    let Some(config) = request.extensions().get::<Arc<Config>>().cloned() else {
        error!("Config extension is missing");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };
    let Some(pool) = request.extensions().get::<PgPool>().cloned() else {
        error!("Database pool extension is missing");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };
    let Some(auth) = request.extensions().get::<Arc<AuthRegistry>>().cloned() else {
        error!("Auth registry extension is missing");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    // The wink guard must have been registered at startup with a session
    // driver and a known provider.
    match auth.guard(registrar::GUARD) {
        Some(guard)
            if guard.driver == GuardDriver::Session && auth.provider(&guard.provider).is_some() => {
        }
        _ => {
            error!("The {} guard is not registered", registrar::GUARD);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }

    let record = match session::extract_session_token(request.headers()) {
        Some(token) => {
            let token_hash = session::hash_session_token(&token);
            match session::lookup_session(&pool, &token_hash).await {
                Ok(record) => record,
                Err(err) => {
                    error!("Failed to lookup session: {err}");
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
            }
        }
        None => None,
    };

    match record {
        Some(record) => {
            request.extensions_mut().insert(CurrentAuthor {
                id: record.author_id,
                email: record.email,
                name: record.name,
            });
            next.run(request).await
        }
        None => unauthenticated(&request, &config),
    }
}

fn unauthenticated(request: &Request, config: &Config) -> Response {
    if wants_html(request) {
        Redirect::to(&format!("{}/login", config.route_prefix())).into_response()
    } else {
        StatusCode::UNAUTHORIZED.into_response()
    }
}

fn wants_html(request: &Request) -> bool {
    request
        .headers()
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

/// Reject requests whose `Host` header does not match the configured domain.
/// A 404 keeps the package invisible on other hosts.
pub async fn enforce_domain(request: Request, next: Next) -> Response {
    let domain = request
        .extensions()
        .get::<Arc<Config>>()
        .and_then(|config| config.domain.clone());

    if let Some(domain) = domain {
        let host = request
            .headers()
            .get(header::HOST)
            .and_then(|value| value.to_str().ok())
            .map(|host| host.split(':').next().unwrap_or(host));

        if host != Some(domain.as_str()) {
            return StatusCode::NOT_FOUND.into_response();
        }
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request as HttpRequest, middleware::from_fn, routing::get, Extension, Router};
    use tower::ServiceExt;

    fn config_with_domain(domain: Option<&str>) -> Arc<Config> {
        Arc::new(Config {
            domain: domain.map(ToString::to_string),
            ..Config::default()
        })
    }

    async fn handler() -> &'static str {
        "ok"
    }

    #[tokio::test]
    async fn domain_mismatch_is_not_found() {
        let app = Router::new()
            .route("/", get(handler))
            .layer(from_fn(enforce_domain))
            .layer(Extension(config_with_domain(Some("blog.example.com"))));

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/")
                    .header("host", "other.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn domain_match_passes_and_ignores_port() {
        let app = Router::new()
            .route("/", get(handler))
            .layer(from_fn(enforce_domain))
            .layer(Extension(config_with_domain(Some("blog.example.com"))));

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/")
                    .header("host", "blog.example.com:8080")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn no_domain_answers_on_any_host() {
        let app = Router::new()
            .route("/", get(handler))
            .layer(from_fn(enforce_domain))
            .layer(Extension(config_with_domain(None)));

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/")
                    .header("host", "anything.example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn html_detection() {
        let request = HttpRequest::builder()
            .header(header::ACCEPT, "text/html,application/xhtml+xml")
            .body(Body::empty())
            .unwrap();
        assert!(wants_html(&request));

        let request = HttpRequest::builder()
            .header(header::ACCEPT, "application/json")
            .body(Body::empty())
            .unwrap();
        assert!(!wants_html(&request));
    }
}
