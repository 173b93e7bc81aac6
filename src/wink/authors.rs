//! Author records: the model behind the `wink_authors` provider.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde::Serialize;
use sqlx::{FromRow, PgPool, Row};
use uuid::Uuid;

/// An author record. The password hash never leaves the database layer.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Author {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub slug: String,
    pub bio: Option<String>,
    pub avatar: Option<String>,
}

pub async fn all(pool: &PgPool) -> Result<Vec<Author>, sqlx::Error> {
    sqlx::query_as("SELECT id, name, email, slug, bio, avatar FROM wink_authors ORDER BY name")
        .fetch_all(pool)
        .await
}

pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Author>, sqlx::Error> {
    sqlx::query_as("SELECT id, name, email, slug, bio, avatar FROM wink_authors WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Author>, sqlx::Error> {
    sqlx::query_as("SELECT id, name, email, slug, bio, avatar FROM wink_authors WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

/// Check a password against the stored hash for `email` through the
/// `wink_authors` provider. Returns the author only when the password
/// matches.
pub async fn verify_credentials(
    pool: &PgPool,
    email: &str,
    password: &str,
) -> Result<Option<Author>> {
    let row = sqlx::query(
        "SELECT id, name, email, slug, bio, avatar, password FROM wink_authors WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    let stored = row
        .as_ref()
        .map(|row| row.get::<String, _>("password"));

    if !check_password(password, stored.as_deref())? {
        return Ok(None);
    }

    let Some(row) = row else {
        return Ok(None);
    };

    Ok(Some(Author {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        slug: row.get("slug"),
        bio: row.get("bio"),
        avatar: row.get("avatar"),
    }))
}

/// Check a candidate password against an optionally-present stored hash.
/// When no hash exists, a throwaway hash is computed anyway so a login
/// attempt costs the same whether or not the email belongs to an author.
fn check_password(password: &str, stored: Option<&str>) -> Result<bool> {
    match stored {
        Some(hash) => verify_password(password, hash),
        None => {
            let _ = hash_password(password)?;

            Ok(false)
        }
    }
}

/// Hash a password with Argon2id for storage in `wink_authors`.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| anyhow!("Failed to parse password hash: {e}"))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
