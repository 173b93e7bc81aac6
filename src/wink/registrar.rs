//! Route and guard registration.
//!
//! The composition root of the package: given the configuration, build the
//! routers wink mounts into the host together with the named route table,
//! and fill the auth registry with the `wink` session guard. Everything is
//! returned to the caller; no global state is touched.

use crate::config::Config;
use crate::wink::{
    content,
    guard::{AuthRegistry, Guard, GuardDriver, Provider, ProviderDriver},
    handlers, middleware,
    routes::{RouteTable, AUTH_MIDDLEWARE},
};
use axum::{http::Method, middleware::from_fn, routing::get, Router};

/// Name of the session guard the package registers.
pub const GUARD: &str = "wink";
/// Name of the author provider backing the guard.
pub const PROVIDER: &str = "wink_authors";

/// Build the package routers and route table from the configuration.
///
/// The authentication group (login, logout, forgot/reset password) is only
/// registered when `authentication.routes_enabled` is set; the content
/// group is always registered. Both sit under the configured domain/path
/// scope, and the content group and logout route additionally sit behind
/// the session authentication middleware.
pub fn register_routes(config: &Config) -> (Router, RouteTable) {
    let mut table = RouteTable::new();
    let prefix = config.route_prefix();

    let mut package = Router::new();

    if config.authentication.routes_enabled {
        package = package.merge(authentication_routes(config, &prefix, &mut table));
    }

    package = package.merge(content_routes(config, &prefix, &mut table));
    package = package.layer(from_fn(middleware::enforce_domain));

    let router = if prefix.is_empty() {
        Router::new().merge(package)
    } else {
        Router::new().nest(&prefix, package)
    };

    (router, table)
}

fn authentication_routes(config: &Config, prefix: &str, table: &mut RouteTable) -> Router {
    let group = vec![config.middleware_group.clone()];
    let gated = vec![
        config.middleware_group.clone(),
        AUTH_MIDDLEWARE.to_string(),
    ];

    table.add(
        "wink.auth.login",
        Method::GET,
        format!("{prefix}/login"),
        group.clone(),
    );
    table.add(
        "wink.auth.attempt",
        Method::POST,
        format!("{prefix}/login"),
        group.clone(),
    );
    table.add(
        "wink.password.forgot",
        Method::GET,
        format!("{prefix}/password/forgot"),
        group.clone(),
    );
    table.add(
        "wink.password.email",
        Method::POST,
        format!("{prefix}/password/forgot"),
        group.clone(),
    );
    table.add(
        "wink.password.reset",
        Method::GET,
        format!("{prefix}/password/reset/:token"),
        group.clone(),
    );
    table.add(
        "wink.password.update",
        Method::POST,
        format!("{prefix}/password/reset/:token"),
        group,
    );
    table.add(
        "wink.logout",
        Method::GET,
        format!("{prefix}/logout"),
        gated,
    );

    Router::new()
        .route(
            "/login",
            get(handlers::show_login_form).post(handlers::login),
        )
        .route(
            "/password/forgot",
            get(handlers::show_reset_request_form).post(handlers::send_reset_link_email),
        )
        .route(
            "/password/reset/:token",
            get(handlers::show_new_password).post(handlers::reset_password),
        )
        .merge(
            // Logout needs an author to log out.
            Router::new()
                .route("/logout", get(handlers::logout))
                .route_layer(from_fn(middleware::authenticate)),
        )
}

fn content_routes(config: &Config, prefix: &str, table: &mut RouteTable) -> Router {
    let gated = vec![
        config.middleware_group.clone(),
        AUTH_MIDDLEWARE.to_string(),
    ];

    for route in content::ROUTES {
        let path = if route.path == "/" {
            if prefix.is_empty() {
                "/".to_string()
            } else {
                prefix.to_string()
            }
        } else {
            format!("{prefix}{}", route.path)
        };

        table.add(route.name, route.method.clone(), path, gated.clone());
    }

    content::routes().route_layer(from_fn(middleware::authenticate))
}

/// Register the `wink` session guard and the author provider backing it.
pub fn register_guard(auth: &mut AuthRegistry) {
    auth.set_provider(
        PROVIDER,
        Provider {
            driver: ProviderDriver::Database,
            model: "wink_authors".to_string(),
        },
    );

    auth.set_guard(
        GUARD,
        Guard {
            driver: GuardDriver::Session,
            provider: PROVIDER.to_string(),
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Authentication;

    const AUTH_ROUTES: [(&str, &str, &str); 7] = [
        ("wink.auth.login", "GET", "/login"),
        ("wink.auth.attempt", "POST", "/login"),
        ("wink.password.forgot", "GET", "/password/forgot"),
        ("wink.password.email", "POST", "/password/forgot"),
        ("wink.password.reset", "GET", "/password/reset/:token"),
        ("wink.password.update", "POST", "/password/reset/:token"),
        ("wink.logout", "GET", "/logout"),
    ];

    fn blog_config(routes_enabled: bool) -> Config {
        Config {
            middleware_group: "web".to_string(),
            domain: None,
            path: "blog".to_string(),
            authentication: Authentication { routes_enabled },
        }
    }

    #[test]
    fn auth_routes_registered_when_enabled() {
        let (_router, table) = register_routes(&blog_config(true));

        for (name, method, path) in AUTH_ROUTES {
            let route = table
                .get(name)
                .unwrap_or_else(|| panic!("{name} is missing"));
            assert_eq!(route.method.as_str(), method, "{name}");
            assert_eq!(route.path, format!("/blog{path}"), "{name}");
        }
    }

    #[test]
    fn auth_routes_skipped_when_disabled() {
        let (_router, table) = register_routes(&blog_config(false));

        for (name, _, _) in AUTH_ROUTES {
            assert!(table.get(name).is_none(), "{name} should not be registered");
        }
    }

    #[test]
    fn content_routes_always_registered() {
        for routes_enabled in [true, false] {
            let (_router, table) = register_routes(&blog_config(routes_enabled));

            for route in content::ROUTES {
                assert!(
                    table.get(route.name).is_some(),
                    "{} is missing with routes_enabled={routes_enabled}",
                    route.name
                );
            }
        }
    }

    #[test]
    fn middleware_recorded_per_route() {
        let (_router, table) = register_routes(&blog_config(true));

        // The unauthenticated auth routes carry only the middleware group.
        for name in [
            "wink.auth.login",
            "wink.auth.attempt",
            "wink.password.forgot",
            "wink.password.email",
            "wink.password.reset",
            "wink.password.update",
        ] {
            assert_eq!(
                table.get(name).unwrap().middleware,
                vec!["web".to_string()],
                "{name}"
            );
        }

        // Logout and every content route sit behind the session guard too.
        let gated = vec!["web".to_string(), AUTH_MIDDLEWARE.to_string()];
        assert_eq!(table.get("wink.logout").unwrap().middleware, gated);
        for route in content::ROUTES {
            assert_eq!(table.get(route.name).unwrap().middleware, gated, "{}", route.name);
        }
    }

    #[test]
    fn login_resolves_under_configured_path() {
        let (_router, table) = register_routes(&blog_config(true));

        let login = table.get("wink.auth.login").unwrap();
        assert_eq!(login.method, Method::GET);
        assert_eq!(login.path, "/blog/login");
    }

    #[test]
    fn empty_path_mounts_at_root() {
        let mut config = blog_config(true);
        config.path = String::new();

        let (_router, table) = register_routes(&config);

        assert_eq!(table.get("wink.auth.login").unwrap().path, "/login");
        assert_eq!(table.get("wink.home").unwrap().path, "/");
    }

    #[test]
    fn custom_middleware_group_is_recorded() {
        let mut config = blog_config(true);
        config.middleware_group = "admin".to_string();

        let (_router, table) = register_routes(&config);

        assert_eq!(
            table.get("wink.auth.login").unwrap().middleware,
            vec!["admin".to_string()]
        );
    }

    #[test]
    fn guard_and_provider_registration() {
        let mut auth = AuthRegistry::new();

        register_guard(&mut auth);

        let guard = auth.guard(GUARD).unwrap();
        assert_eq!(guard.driver, GuardDriver::Session);
        assert_eq!(guard.provider, PROVIDER);

        let provider = auth.provider(PROVIDER).unwrap();
        assert_eq!(provider.driver, ProviderDriver::Database);
        assert_eq!(provider.model, "wink_authors");
    }
}
