//! The explicit route table: a named-route registry for everything wink
//! mounts into the host router.
//!
//! axum has no named routes, so the registrar records one entry per route it
//! registers. Hosts (and tests) resolve names like `wink.auth.login` to a
//! method, a full path with the configured prefix applied, and the
//! middleware attached to the route.

use axum::http::Method;

/// Middleware label recorded on routes behind the package's session
/// authentication.
pub const AUTH_MIDDLEWARE: &str = "wink.auth";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedRoute {
    pub name: String,
    pub method: Method,
    pub path: String,
    pub middleware: Vec<String>,
}

#[derive(Debug, Default, Clone)]
pub struct RouteTable {
    routes: Vec<NamedRoute>,
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, name: &str, method: Method, path: String, middleware: Vec<String>) {
        self.routes.push(NamedRoute {
            name: name.to_string(),
            method,
            path,
            middleware,
        });
    }

    /// Look up a route by its `wink.` namespaced name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&NamedRoute> {
        self.routes.iter().find(|route| route.name == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedRoute> {
        self.routes.iter()
    }
}
