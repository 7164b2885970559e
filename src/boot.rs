//! Application startup: builds the context from configuration, assembles
//! the router and serves it.

use std::sync::Arc;

use axum::Router;
use tokio::{net::TcpListener, signal};

use crate::{
    app::AppContext,
    config::Config,
    controller::{AppRoutes, ListRoutes},
    environment::Environment,
    errors::Error,
    i18n::Languages,
    ontology::OntologyService,
    search::{DbpediaSearch, DisabledSearch, RemoteSearch},
    Result,
};

/// Outcome of booting the application.
pub struct BootResult {
    pub app_context: AppContext,
    pub router: Router,
}

/// Where the server listens.
#[derive(Debug, Clone)]
pub struct ServeParams {
    pub port: u16,
    pub binding: String,
}

impl ServeParams {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            port: config.server.port,
            binding: config.server.binding.clone(),
        }
    }
}

/// Builds the shared context: opens the ontology store (declaring the schema
/// and saving it once) and selects the remote search adapter.
///
/// # Errors
///
/// Fails when the store cannot be opened or the HTTP client cannot be built.
pub async fn create_context(environment: &Environment, config: Config) -> Result<AppContext> {
    let ontology = OntologyService::from_config(&config.ontology).await?;

    let remote: Arc<dyn RemoteSearch> = if config.remote_search.enable {
        Arc::new(DbpediaSearch::from_config(&config.remote_search)?)
    } else {
        tracing::info!("remote search disabled");
        Arc::new(DisabledSearch)
    };

    Ok(AppContext {
        environment: environment.clone(),
        languages: Languages::from_config(&config.i18n),
        config,
        ontology: Arc::new(ontology),
        remote,
    })
}

/// Creates the context and the router for `environment`.
///
/// # Errors
///
/// Fails when the context cannot be created.
pub async fn create_app(environment: &Environment, config: Config) -> Result<BootResult> {
    let app_context = create_context(environment, config).await?;
    let router = AppRoutes::with_default_routes().to_router(app_context.clone())?;
    Ok(BootResult {
        app_context,
        router,
    })
}

/// Serves the application until ctrl-c (or SIGTERM) is received.
///
/// # Errors
///
/// Fails when the address cannot be bound or the server stops with an error.
pub async fn start(boot: BootResult, params: ServeParams) -> Result<()> {
    let address = format!("{}:{}", params.binding, params.port);
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|err| Error::Message(format!("cannot bind `{address}`: {err}")))?;

    tracing::info!(
        environment = %boot.app_context.environment,
        address = %address,
        url = %boot.app_context.config.server.full_url(),
        "listening"
    );

    axum::serve(listener, boot.router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Every route of the service, for the `routes` command.
#[must_use]
pub fn list_endpoints() -> Vec<ListRoutes> {
    AppRoutes::with_default_routes().collect()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(err.msg = %err, "failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(err.msg = %err, "failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests_cfg;

    #[tokio::test]
    async fn context_uses_configured_backends() {
        let config = tests_cfg::config::test_config();
        let ctx = create_context(&Environment::Test, config).await.unwrap();

        let summary = ctx.ontology.summary().await;
        assert_eq!(summary.class_count, 13);
        assert_eq!(ctx.languages.default_language().as_str(), "es");
    }

    #[tokio::test]
    async fn invalid_base_iri_fails_to_boot() {
        let mut config = tests_cfg::config::test_config();
        config.ontology.base_iri = "not an iri".to_string();
        assert!(create_context(&Environment::Test, config).await.is_err());
    }

    #[test]
    fn endpoints_are_listed() {
        assert!(list_endpoints().iter().any(|r| r.uri == "/buscador/online"));
    }
}
