//! # Wink (blog & authoring subsystem for axum hosts)
//!
//! `wink` bolts an authoring backend onto an axum application: a session
//! guard for authors, login and password reset routes, and an authenticated
//! content API for posts, tags and authors.
//!
//! The crate deliberately owns very little machinery of its own:
//!
//! - **Registration is explicit.** [`wink::registrar::register_routes`]
//!   takes the configuration and returns the package router together with a
//!   [`wink::routes::RouteTable`], the named-route registry hosts can
//!   inspect. Nothing global is mutated.
//! - **Authentication is a named guard.** The `wink` session guard and its
//!   `wink_authors` provider are entries in a [`wink::guard::AuthRegistry`];
//!   the session middleware resolves requests through them.
//! - **Resources are published, not installed.** Static assets and the
//!   default `wink.toml` are declared as publish groups and copied by the
//!   CLI `publish` action into host-defined directories.
//!
//! The `wink` binary wraps all of this in a demo host (`server`), plus the
//! `migrate` and `publish` maintenance actions.

pub mod cli;
pub mod config;
pub mod wink;
