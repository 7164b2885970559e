use std::sync::Arc;

use crate::{
    app::AppContext, boot, environment::Environment, search::RemoteSearch,
    tests_cfg::config::test_config,
};

/// Context over an empty in-memory store with remote search disabled.
pub async fn get_app_context() -> AppContext {
    boot::create_context(&Environment::Test, test_config())
        .await
        .expect("test context")
}

/// Same as [`get_app_context`] with `remote` answering online searches.
pub async fn get_app_context_with_remote(remote: Arc<dyn RemoteSearch>) -> AppContext {
    let mut ctx = get_app_context().await;
    ctx.remote = remote;
    ctx
}
