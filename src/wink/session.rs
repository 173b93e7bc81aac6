//! Author sessions: token generation and hashing, cookie helpers, and the
//! `wink_sessions` storage behind the session guard.

use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};
use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub const SESSION_COOKIE_NAME: &str = "wink_session";

/// Session lifetime in seconds.
pub const SESSION_TTL_SECONDS: i64 = 60 * 60 * 24 * 7;

#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub author_id: Uuid,
    pub email: String,
    pub name: String,
}

/// Generate a fresh random session token.
#[must_use]
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);

    Base64UrlUnpadded::encode_string(&bytes)
}

/// Hash a token for storage. Only the hash is stored; raw tokens are never
/// compared against the database.
#[must_use]
pub fn hash_session_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

pub async fn create_session(
    pool: &PgPool,
    author_id: Uuid,
    token_hash: &str,
) -> Result<(), sqlx::Error> {
    let expires_at = Utc::now() + Duration::seconds(SESSION_TTL_SECONDS);

    // Expired sessions are swept whenever a new one is created, so the
    // table does not grow without bound.
    sqlx::query("DELETE FROM wink_sessions WHERE expires_at <= now()")
        .execute(pool)
        .await?;

    sqlx::query("INSERT INTO wink_sessions (token_hash, author_id, expires_at) VALUES ($1, $2, $3)")
        .bind(token_hash)
        .bind(author_id)
        .bind(expires_at)
        .execute(pool)
        .await?;

    Ok(())
}

/// Resolve a token hash to the author behind the session, if one exists and
/// has not expired.
pub async fn lookup_session(
    pool: &PgPool,
    token_hash: &str,
) -> Result<Option<SessionRecord>, sqlx::Error> {
    let row = sqlx::query(
        "SELECT a.id, a.email, a.name FROM wink_sessions s \
         JOIN wink_authors a ON a.id = s.author_id \
         WHERE s.token_hash = $1 AND s.expires_at > now()",
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| SessionRecord {
        author_id: row.get(0),
        email: row.get(1),
        name: row.get(2),
    }))
}

pub async fn delete_session(pool: &PgPool, token_hash: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM wink_sessions WHERE token_hash = $1")
        .bind(token_hash)
        .execute(pool)
        .await?;

    Ok(())
}

/// Build the `HttpOnly` cookie carrying the session token.
pub fn session_cookie(token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={SESSION_TTL_SECONDS}"
    ))
}

pub fn clear_session_cookie() -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"
    ))
}

/// Pull the session token out of the request's cookies.
#[must_use]
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;

    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let (Some(key), Some(val)) = (parts.next(), parts.next()) else {
            continue;
        };
        let (key, val) = (key.trim(), val.trim());
        if key == SESSION_COOKIE_NAME && !val.is_empty() {
            return Some(val.to_string());
        }
    }

    None
}
