use std::sync::Arc;

use biblioteca::{
    app::AppContext,
    controller::AppRoutes,
    ontology::{InMemoryOntologyRepository, Iri, OntologyService},
    tests_cfg, TestServer,
};

mod catalog;
mod i18n;
mod individuals;
mod search;
mod sparql;

fn server_for(ctx: AppContext) -> TestServer {
    let router = AppRoutes::with_default_routes()
        .to_router(ctx)
        .expect("router");
    TestServer::new(router).expect("test server")
}

async fn server() -> TestServer {
    server_for(tests_cfg::app::get_app_context().await)
}

/// Context whose store is kept in `repository`, so saves can be counted.
async fn context_with_repository(repository: Arc<InMemoryOntologyRepository>) -> AppContext {
    let mut ctx = tests_cfg::app::get_app_context().await;
    let base = Iri::new("http://uni.edu/biblioteca.owl#").expect("base iri");
    let service = OntologyService::open(repository, base)
        .await
        .expect("ontology service");
    ctx.ontology = Arc::new(service);
    ctx
}
