//! Password reset: request form, reset link issuance, the new-password page
//! and the token-consuming update. Mail delivery is the host's concern; the
//! reset link is emitted through the log.

use crate::config::Config;
use crate::wink::{
    authors,
    handlers::{page, valid_email},
    session,
};
use axum::{
    extract::{Extension, Form, Path},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::{Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sqlx::{PgPool, Row};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Reset tokens expire after an hour.
const RESET_TOKEN_TTL_MINUTES: i64 = 60;

/// Minimum length accepted for a new password.
const PASSWORD_MIN_LENGTH: usize = 8;

#[derive(Deserialize, Debug)]
pub struct ResetRequestForm {
    email: String,
}

#[derive(Deserialize, Debug)]
pub struct NewPasswordForm {
    email: String,
    password: SecretString,
}

/// GET /password/forgot
pub async fn show_reset_request_form(config: Extension<Arc<Config>>) -> Html<String> {
    Html(reset_request_page(&config, None))
}

/// POST /password/forgot
#[instrument(skip_all)]
pub async fn send_reset_link_email(
    pool: Extension<PgPool>,
    config: Extension<Arc<Config>>,
    Form(form): Form<ResetRequestForm>,
) -> Response {
    if !valid_email(&form.email) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Html(reset_request_page(
                &config,
                Some("Enter a valid email address."),
            )),
        )
            .into_response();
    }

    // The response is identical whether or not the email belongs to an
    // author, to avoid account enumeration.
    match issue_reset_token(&pool, &form.email).await {
        Ok(Some(token)) => {
            let path = format!("{}/password/reset/{token}", config.route_prefix());
            let reset_url = match config.domain.as_deref() {
                Some(domain) => format!("https://{domain}{path}"),
                None => path,
            };

            info!("Password reset link for {}: {}", form.email, reset_url);
        }
        Ok(None) => {
            debug!("Password reset requested for an unknown email");
        }
        Err(err) => {
            error!("Failed to issue reset token: {err}");

            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }

    Html(page(
        "Check your email",
        "<p>If that email belongs to an author, a password reset link is on its way.</p>",
    ))
    .into_response()
}

async fn issue_reset_token(pool: &PgPool, email: &str) -> Result<Option<String>, sqlx::Error> {
    let author = sqlx::query("SELECT id FROM wink_authors WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    if author.is_none() {
        return Ok(None);
    }

    let token = session::generate_token();
    let expires_at = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);

    // Stale tokens are purged whenever a new one is issued.
    sqlx::query("DELETE FROM wink_password_resets WHERE expires_at <= now()")
        .execute(pool)
        .await?;

    // One pending reset per email; a new request replaces the old token.
    sqlx::query(
        "INSERT INTO wink_password_resets (email, token_hash, expires_at) VALUES ($1, $2, $3) \
         ON CONFLICT (email) DO UPDATE \
         SET token_hash = EXCLUDED.token_hash, expires_at = EXCLUDED.expires_at",
    )
    .bind(email)
    .bind(session::hash_session_token(&token))
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(Some(token))
}

/// GET /password/reset/:token
pub async fn show_new_password(
    pool: Extension<PgPool>,
    config: Extension<Arc<Config>>,
    Path(token): Path<String>,
) -> Response {
    let token_hash = session::hash_session_token(&token);

    let row = sqlx::query(
        "SELECT email FROM wink_password_resets WHERE token_hash = $1 AND expires_at > now()",
    )
    .bind(&token_hash)
    .fetch_optional(&*pool)
    .await;

    match row {
        Ok(Some(row)) => {
            let email: String = row.get("email");

            Html(new_password_page(&config, &email, &token, None)).into_response()
        }
        Ok(None) => {
            debug!("Unknown or expired reset token");

            StatusCode::NOT_FOUND.into_response()
        }
        Err(err) => {
            error!("Failed to lookup reset token: {err}");

            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// POST /password/reset/:token
#[instrument(skip_all)]
pub async fn reset_password(
    pool: Extension<PgPool>,
    config: Extension<Arc<Config>>,
    Path(token): Path<String>,
    Form(form): Form<NewPasswordForm>,
) -> Response {
    if form.password.expose_secret().len() < PASSWORD_MIN_LENGTH {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Html(new_password_page(
                &config,
                &form.email,
                &token,
                Some("Passwords must be at least 8 characters."),
            )),
        )
            .into_response();
    }

    // The update is keyed on the email stored with the token, never on the
    // email posted with the form.
    let token_hash = session::hash_session_token(&token);
    let row = sqlx::query(
        "SELECT email FROM wink_password_resets WHERE token_hash = $1 AND expires_at > now()",
    )
    .bind(&token_hash)
    .fetch_optional(&*pool)
    .await;

    let email: String = match row {
        Ok(Some(row)) => row.get("email"),
        Ok(None) => {
            debug!("Unknown or expired reset token");

            return StatusCode::NOT_FOUND.into_response();
        }
        Err(err) => {
            error!("Failed to lookup reset token: {err}");

            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let hash = match authors::hash_password(form.password.expose_secret()) {
        Ok(hash) => hash,
        Err(err) => {
            error!("Failed to hash password: {err:?}");

            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if let Err(err) =
        sqlx::query("UPDATE wink_authors SET password = $1, updated_at = now() WHERE email = $2")
            .bind(&hash)
            .bind(&email)
            .execute(&*pool)
            .await
    {
        error!("Failed to update password: {err}");

        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    // Tokens are single use.
    if let Err(err) = sqlx::query("DELETE FROM wink_password_resets WHERE email = $1")
        .bind(&email)
        .execute(&*pool)
        .await
    {
        error!("Failed to remove consumed reset token: {err}");
    }

    info!("Password reset completed for {email}");

    Redirect::to(&format!("{}/login", config.route_prefix())).into_response()
}

fn reset_request_page(config: &Config, error: Option<&str>) -> String {
    let action = format!("{}/password/forgot", config.route_prefix());
    let error = error.map_or(String::new(), |message| {
        format!("<p class=\"wink-error\">{message}</p>\n")
    });

    page(
        "Reset password",
        &format!(
            "{error}<form method=\"POST\" action=\"{action}\">\n\
             <label for=\"email\">Email</label>\n\
             <input id=\"email\" name=\"email\" type=\"email\" required>\n\
             <button type=\"submit\">Send reset link</button>\n\
             </form>"
        ),
    )
}

fn new_password_page(config: &Config, email: &str, token: &str, error: Option<&str>) -> String {
    let action = format!("{}/password/reset/{token}", config.route_prefix());
    let error = error.map_or(String::new(), |message| {
        format!("<p class=\"wink-error\">{message}</p>\n")
    });

    page(
        "Choose a new password",
        &format!(
            "{error}<form method=\"POST\" action=\"{action}\">\n\
             <label for=\"email\">Email</label>\n\
             <input id=\"email\" name=\"email\" type=\"email\" value=\"{email}\" readonly>\n\
             <label for=\"password\">New password</label>\n\
             <input id=\"password\" name=\"password\" type=\"password\" minlength=\"{PASSWORD_MIN_LENGTH}\" required>\n\
             <button type=\"submit\">Save password</button>\n\
             </form>"
        ),
    )
}
