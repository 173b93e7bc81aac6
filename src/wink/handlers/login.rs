//! Login, session establishment and logout for authors.

use crate::config::Config;
use crate::wink::{
    authors,
    handlers::{page, valid_email},
    middleware::CurrentAuthor,
    session,
};
use axum::{
    extract::{Extension, Form},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, error, instrument};

#[derive(Deserialize, Debug)]
pub struct LoginForm {
    email: String,
    password: SecretString,
}

/// GET /login
pub async fn show_login_form(config: Extension<Arc<Config>>) -> Html<String> {
    Html(login_page(&config, None))
}

/// POST /login
#[instrument(skip_all)]
pub async fn login(
    pool: Extension<PgPool>,
    config: Extension<Arc<Config>>,
    Form(form): Form<LoginForm>,
) -> Response {
    if !valid_email(&form.email) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Html(login_page(&config, Some("Enter a valid email address."))),
        )
            .into_response();
    }

    let author =
        match authors::verify_credentials(&pool, &form.email, form.password.expose_secret()).await
        {
            Ok(Some(author)) => author,
            Ok(None) => {
                debug!("Failed login attempt for {}", form.email);

                return (
                    StatusCode::UNAUTHORIZED,
                    Html(login_page(
                        &config,
                        Some("These credentials do not match our records."),
                    )),
                )
                    .into_response();
            }
            Err(err) => {
                error!("Error verifying credentials: {err:?}");

                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

    let token = session::generate_token();
    if let Err(err) =
        session::create_session(&pool, author.id, &session::hash_session_token(&token)).await
    {
        error!("Failed to create session: {err}");

        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let cookie = match session::session_cookie(&token) {
        Ok(cookie) => cookie,
        Err(err) => {
            error!("Failed to build session cookie: {err}");

            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    debug!("Author {} logged in", author.email);

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);

    let prefix = config.route_prefix();
    let home = if prefix.is_empty() {
        "/"
    } else {
        prefix.as_str()
    };

    (headers, Redirect::to(home)).into_response()
}

/// GET /logout, behind the session guard
pub async fn logout(
    pool: Extension<PgPool>,
    config: Extension<Arc<Config>>,
    author: Extension<CurrentAuthor>,
    headers: HeaderMap,
) -> Response {
    if let Some(token) = session::extract_session_token(&headers) {
        if let Err(err) = session::delete_session(&pool, &session::hash_session_token(&token)).await
        {
            error!("Failed to delete session: {err}");
        }
    }

    debug!("Author {} logged out", author.email);

    // Always clear the cookie, even if the session record was missing.
    let mut response_headers = HeaderMap::new();
    if let Ok(cookie) = session::clear_session_cookie() {
        response_headers.insert(SET_COOKIE, cookie);
    }

    (
        response_headers,
        Redirect::to(&format!("{}/login", config.route_prefix())),
    )
        .into_response()
}

fn login_page(config: &Config, error: Option<&str>) -> String {
    let action = format!("{}/login", config.route_prefix());
    let forgot = format!("{}/password/forgot", config.route_prefix());
    let error = error.map_or(String::new(), |message| {
        format!("<p class=\"wink-error\">{message}</p>\n")
    });

    page(
        "Sign in",
        &format!(
            "{error}<form method=\"POST\" action=\"{action}\">\n\
             <label for=\"email\">Email</label>\n\
             <input id=\"email\" name=\"email\" type=\"email\" required>\n\
             <label for=\"password\">Password</label>\n\
             <input id=\"password\" name=\"password\" type=\"password\" required>\n\
             <button type=\"submit\">Sign in</button>\n\
             </form>\n<p><a href=\"{forgot}\">Forgot your password?</a></p>"
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_page_uses_configured_prefix() {
        let config = Config {
            path: "blog".to_string(),
            ..Config::default()
        };

        let html = login_page(&config, None);
        assert!(html.contains("action=\"/blog/login\""));
        assert!(html.contains("href=\"/blog/password/forgot\""));
        assert!(!html.contains("wink-error"));
    }

    #[test]
    fn login_page_renders_error() {
        let html = login_page(&Config::default(), Some("These credentials do not match."));

        assert!(html.contains("wink-error"));
        assert!(html.contains("These credentials do not match."));
    }

    #[tokio::test]
    async fn login_form_handler_renders() {
        let Html(html) = show_login_form(Extension(Arc::new(Config::default()))).await;

        assert!(html.contains("action=\"/wink/login\""));
    }
}
