use crate::config::Config;
use jobs::{Generator, InMemJobs};
use solver_anneal::AnnealingSolver;
use std::sync::Arc;
use store::InMemStore;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<InMemJobs>,
    pub store: InMemStore,
}

impl AppState {
    pub fn new(store: InMemStore, config: &Config) -> Self {
        let shared = Arc::new(store.clone());
        let generator = Generator::new(shared.clone(), shared, Arc::new(AnnealingSolver::new()))
            .with_defaults(config.anneal.clone())
            .with_max_parallel(config.max_parallel);
        Self {
            jobs: Arc::new(InMemJobs::new(generator)),
            store,
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store = match &config.dataset {
            Some(path) => InMemStore::from_json_file(path)?,
            None => {
                info!("no dataset configured, starting with an empty store");
                InMemStore::default()
            }
        };
        Ok(Self::new(store, config))
    }
}
