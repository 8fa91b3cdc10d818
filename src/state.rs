use std::sync::Arc;

use crate::clients::{SearchProvider, build_shared_http_client, providers_from_config};
use crate::config::Config;
use crate::db::Store;
use crate::services::{DiscoveryService, SeaOrmDiscoveryService};

/// Everything the HTTP layer and the CLI share. Built once at startup; the
/// configuration is immutable afterwards.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub discovery: Arc<dyn DiscoveryService>,
}

impl SharedState {
    /// Builds the provider chain from the configured credentials.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // One client for every provider so connections are pooled.
        let http_client = build_shared_http_client(config.search.request_timeout())?;
        let providers = providers_from_config(&config.search, &http_client);
        Self::with_providers(config, providers).await
    }

    /// Same as [`SharedState::new`] with an explicit provider chain.
    pub async fn with_providers(
        config: Config,
        providers: Vec<Arc<dyn SearchProvider>>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let discovery = Arc::new(SeaOrmDiscoveryService::new(
            store.clone(),
            providers,
            &config,
        )) as Arc<dyn DiscoveryService + Send + Sync + 'static>;

        Ok(Self {
            config: Arc::new(config),
            store,
            discovery,
        })
    }
}
