//! The package's primary route group: the authenticated authoring API for
//! posts, tags and authors. Kept apart from the registrar so the route list
//! can evolve on its own; the registrar mounts it behind the session guard.

use crate::wink::{authors, middleware::CurrentAuthor};
use axum::{
    extract::{Extension, Path},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::{FromRow, PgPool};
use tracing::{error, instrument};
use uuid::Uuid;

/// Declarative list of the content routes. The registrar walks it when it
/// fills the route table, so names, methods and paths stay in one place.
pub struct ContentRoute {
    pub name: &'static str,
    pub method: Method,
    pub path: &'static str,
}

pub const ROUTES: &[ContentRoute] = &[
    ContentRoute {
        name: "wink.home",
        method: Method::GET,
        path: "/",
    },
    ContentRoute {
        name: "wink.posts.index",
        method: Method::GET,
        path: "/api/posts",
    },
    ContentRoute {
        name: "wink.posts.show",
        method: Method::GET,
        path: "/api/posts/:id",
    },
    ContentRoute {
        name: "wink.posts.store",
        method: Method::POST,
        path: "/api/posts/:id",
    },
    ContentRoute {
        name: "wink.posts.delete",
        method: Method::DELETE,
        path: "/api/posts/:id",
    },
    ContentRoute {
        name: "wink.tags.index",
        method: Method::GET,
        path: "/api/tags",
    },
    ContentRoute {
        name: "wink.tags.store",
        method: Method::POST,
        path: "/api/tags",
    },
    ContentRoute {
        name: "wink.authors.index",
        method: Method::GET,
        path: "/api/authors",
    },
    ContentRoute {
        name: "wink.authors.show",
        method: Method::GET,
        path: "/api/authors/:id",
    },
];

/// Build the content router. Mounted by the registrar behind the package's
/// authentication middleware.
pub fn routes() -> Router {
    Router::new()
        .route("/", get(home))
        .route("/api/posts", get(posts_index))
        .route(
            "/api/posts/:id",
            get(posts_show).post(posts_store).delete(posts_delete),
        )
        .route("/api/tags", get(tags_index).post(tags_store))
        .route("/api/authors", get(authors_index))
        .route("/api/authors/:id", get(authors_show))
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub body: String,
    pub published: bool,
    pub publish_date: Option<DateTime<Utc>>,
    pub author_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct PostInput {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub publish_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub author_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Deserialize)]
pub struct TagInput {
    pub name: String,
    pub slug: String,
}

const POST_COLUMNS: &str = "id, title, slug, excerpt, body, published, publish_date, author_id, \
                            created_at, updated_at";

async fn home(author: Extension<CurrentAuthor>, pool: Extension<PgPool>) -> Response {
    let counts: Result<(i64, i64), sqlx::Error> = sqlx::query_as(
        "SELECT (SELECT count(*) FROM wink_posts), (SELECT count(*) FROM wink_tags)",
    )
    .fetch_one(&*pool)
    .await;

    match counts {
        Ok((posts, tags)) => Json(json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "author": author.name,
            "posts": posts,
            "tags": tags,
        }))
        .into_response(),
        Err(err) => internal_error(&err),
    }
}

async fn posts_index(pool: Extension<PgPool>) -> Response {
    let posts: Result<Vec<Post>, sqlx::Error> = sqlx::query_as(&format!(
        "SELECT {POST_COLUMNS} FROM wink_posts ORDER BY created_at DESC"
    ))
    .fetch_all(&*pool)
    .await;

    match posts {
        Ok(posts) => Json(posts).into_response(),
        Err(err) => internal_error(&err),
    }
}

async fn posts_show(pool: Extension<PgPool>, Path(id): Path<Uuid>) -> Response {
    let post: Result<Option<Post>, sqlx::Error> =
        sqlx::query_as(&format!("SELECT {POST_COLUMNS} FROM wink_posts WHERE id = $1"))
            .bind(id)
            .fetch_optional(&*pool)
            .await;

    match post {
        Ok(Some(post)) => Json(post).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => internal_error(&err),
    }
}

/// Upsert keyed on the client-generated post id, so drafts can be saved
/// repeatedly under one identity.
#[instrument(skip_all)]
async fn posts_store(
    pool: Extension<PgPool>,
    Path(id): Path<Uuid>,
    Json(input): Json<PostInput>,
) -> Response {
    let saved: Result<Post, sqlx::Error> = sqlx::query_as(&format!(
        "INSERT INTO wink_posts (id, title, slug, excerpt, body, published, publish_date, author_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         ON CONFLICT (id) DO UPDATE SET \
         title = EXCLUDED.title, slug = EXCLUDED.slug, excerpt = EXCLUDED.excerpt, \
         body = EXCLUDED.body, published = EXCLUDED.published, \
         publish_date = EXCLUDED.publish_date, author_id = EXCLUDED.author_id, \
         updated_at = now() \
         RETURNING {POST_COLUMNS}"
    ))
    .bind(id)
    .bind(&input.title)
    .bind(&input.slug)
    .bind(&input.excerpt)
    .bind(&input.body)
    .bind(input.published)
    .bind(input.publish_date)
    .bind(input.author_id)
    .fetch_one(&*pool)
    .await;

    match saved {
        Ok(post) => Json(post).into_response(),
        Err(err) => internal_error(&err),
    }
}

async fn posts_delete(pool: Extension<PgPool>, Path(id): Path<Uuid>) -> Response {
    let result = sqlx::query("DELETE FROM wink_posts WHERE id = $1")
        .bind(id)
        .execute(&*pool)
        .await;

    match result {
        Ok(done) if done.rows_affected() == 0 => StatusCode::NOT_FOUND.into_response(),
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => internal_error(&err),
    }
}

async fn tags_index(pool: Extension<PgPool>) -> Response {
    let tags: Result<Vec<Tag>, sqlx::Error> =
        sqlx::query_as("SELECT id, name, slug FROM wink_tags ORDER BY name")
            .fetch_all(&*pool)
            .await;

    match tags {
        Ok(tags) => Json(tags).into_response(),
        Err(err) => internal_error(&err),
    }
}

#[instrument(skip_all)]
async fn tags_store(pool: Extension<PgPool>, Json(input): Json<TagInput>) -> Response {
    let tag: Result<Tag, sqlx::Error> = sqlx::query_as(
        "INSERT INTO wink_tags (name, slug) VALUES ($1, $2) \
         ON CONFLICT (slug) DO UPDATE SET name = EXCLUDED.name \
         RETURNING id, name, slug",
    )
    .bind(&input.name)
    .bind(&input.slug)
    .fetch_one(&*pool)
    .await;

    match tag {
        Ok(tag) => (StatusCode::CREATED, Json(tag)).into_response(),
        Err(err) => internal_error(&err),
    }
}

async fn authors_index(pool: Extension<PgPool>) -> Response {
    match authors::all(&pool).await {
        Ok(authors) => Json(authors).into_response(),
        Err(err) => internal_error(&err),
    }
}

async fn authors_show(pool: Extension<PgPool>, Path(id): Path<Uuid>) -> Response {
    match authors::find(&pool, id).await {
        Ok(Some(author)) => Json(author).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => internal_error(&err),
    }
}

fn internal_error(err: &sqlx::Error) -> Response {
    error!("Database error: {err}");

    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}
