//! Route tables.
//!
//! Controllers expose a `routes()` function returning [`Routes`]; the
//! application collects them into [`AppRoutes`] and turns them into an
//! [`axum::Router`].

use std::fmt;

use axum::{http::Method, routing::MethodRouter, Router as AXRouter};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{app::AppContext, controller, Result};

#[derive(Clone, Default, Debug)]
pub struct Routes {
    pub prefix: Option<String>,
    pub handlers: Vec<Handler>,
}

#[derive(Clone, Default)]
pub struct Handler {
    pub uri: String,
    pub method: MethodRouter<AppContext>,
    pub actions: Vec<Method>,
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("uri", &self.uri)
            .field("actions", &self.actions)
            .finish_non_exhaustive()
    }
}

impl Routes {
    /// Creates a new [`Routes`] instance with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a route under the given uri.
    ///
    /// ```rust
    /// use axum::routing::get;
    /// use biblioteca::controller::{format, Routes};
    ///
    /// async fn ping() -> biblioteca::Result<axum::response::Response> {
    ///     format::json(())
    /// }
    /// Routes::new().add("/_ping", get(ping));
    /// ```
    #[must_use]
    pub fn add(mut self, uri: &str, method: MethodRouter<AppContext>) -> Self {
        let actions = actions_of(&method);
        self.handlers.push(Handler {
            uri: uri.to_owned(),
            method,
            actions,
        });
        self
    }

    /// Sets a prefix for the routes.
    #[must_use]
    pub fn prefix(mut self, uri: &str) -> Self {
        self.prefix = Some(uri.to_owned());
        self
    }

    /// Appends the handlers of `other`.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.handlers.extend(other.handlers);
        self
    }
}

/// Reads the HTTP verbs a method router answers to from its debug output,
/// which lists every registered endpoint.
fn actions_of(method: &MethodRouter<AppContext>) -> Vec<Method> {
    let debug = format!("{method:?}");
    [
        ("get", Method::GET),
        ("post", Method::POST),
        ("put", Method::PUT),
        ("patch", Method::PATCH),
        ("delete", Method::DELETE),
    ]
    .into_iter()
    .filter(|(field, _)| debug.contains(&format!("{field}: BoxedHandler")))
    .map(|(_, action)| action)
    .collect()
}

/// A flattened route, used by the `routes` command.
#[derive(Debug, Clone)]
pub struct ListRoutes {
    pub uri: String,
    pub actions: Vec<Method>,
    pub method: MethodRouter<AppContext>,
}

impl fmt::Display for ListRoutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let actions = self
            .actions
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        write!(f, "[{actions}] {}", self.uri)
    }
}

/// The full route table of the application.
#[derive(Clone, Default, Debug)]
pub struct AppRoutes {
    prefix: Option<String>,
    routes: Vec<Routes>,
}

impl AppRoutes {
    /// Creates an empty table.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every controller of the library service.
    #[must_use]
    pub fn with_default_routes() -> Self {
        Self::empty()
            .add_route(controller::monitoring::routes())
            .add_route(controller::catalog::routes())
            .add_route(controller::individuals::routes())
            .add_route(controller::sparql::routes())
            .add_route(controller::search::routes())
            .add_route(controller::i18n::routes())
    }

    /// Sets a prefix applied to every route.
    #[must_use]
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    #[must_use]
    pub fn add_route(mut self, routes: Routes) -> Self {
        self.routes.push(routes);
        self
    }

    #[must_use]
    pub fn get_prefix(&self) -> Option<&String> {
        self.prefix.as_ref()
    }

    /// Flattens the table, joining prefixes and uris.
    #[must_use]
    pub fn collect(&self) -> Vec<ListRoutes> {
        let base_url_prefix = self.get_prefix().map_or("/", |url| url.as_str());

        self.routes
            .iter()
            .flat_map(|controller| {
                let mut uri_parts = vec![base_url_prefix];
                if let Some(prefix) = controller.prefix.as_ref() {
                    uri_parts.push(prefix);
                }
                controller.handlers.iter().map(move |handler| {
                    let mut parts = uri_parts.clone();
                    parts.push(&handler.uri);
                    ListRoutes {
                        uri: join_uri(&parts),
                        actions: handler.actions.clone(),
                        method: handler.method.clone(),
                    }
                })
            })
            .collect()
    }

    /// Builds the axum router with the tracing, panic and CORS layers.
    ///
    /// # Errors
    ///
    /// Currently this function doesn't return any error. this is for feature
    /// functionality
    pub fn to_router(&self, ctx: AppContext) -> Result<AXRouter> {
        let mut app = AXRouter::new();
        for router in self.collect() {
            tracing::debug!(route = %router, "registering route");
            app = app.route(&router.uri, router.method);
        }

        let mut app = app
            .layer(CatchPanicLayer::new())
            .layer(TraceLayer::new_for_http());
        if ctx.config.server.cors.enable {
            app = app.layer(CorsLayer::permissive());
        }
        Ok(app.with_state(ctx))
    }
}

fn join_uri(parts: &[&str]) -> String {
    let joined = parts
        .iter()
        .map(|part| part.trim_matches('/'))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    format!("/{joined}")
}

#[cfg(test)]
mod tests {
    use axum::routing::{get, post};

    use super::*;

    async fn noop() {}

    #[test]
    fn uris_are_joined_with_prefixes() {
        assert_eq!(join_uri(&["/", "/individuos", "/datos"]), "/individuos/datos");
        assert_eq!(join_uri(&["/", "/"]), "/");
        assert_eq!(join_uri(&["/api/", "libros"]), "/api/libros");
    }

    #[test]
    fn collects_every_handler() {
        let routes = AppRoutes::empty()
            .prefix("/api")
            .add_route(Routes::new().prefix("individuos").add("/", post(noop)))
            .add_route(Routes::new().add("/libros", get(noop)));
        let uris: Vec<String> = routes.collect().into_iter().map(|r| r.uri).collect();
        assert_eq!(uris, vec!["/api/individuos", "/api/libros"]);
    }

    #[test]
    fn default_table_lists_the_service_endpoints() {
        let table = AppRoutes::with_default_routes().collect();
        let listed: Vec<String> = table.iter().map(ToString::to_string).collect();
        for expected in [
            "[GET] /",
            "[POST] /individuos",
            "[POST] /individuos/datos",
            "[POST] /individuos/relacion",
            "[GET] /individuos/{name}",
            "[POST] /consultar/sparql",
            "[GET] /libros",
            "[GET] /editoriales",
            "[GET] /buscador",
            "[GET] /buscador/online",
            "[GET] /config/idioma/{code}",
            "[GET] /_readiness",
        ] {
            assert!(listed.iter().any(|l| l == expected), "missing {expected}");
        }
    }
}
