// Application state module
// Owns the configuration, the route table, and the per-collection gateways

use std::sync::Arc;

use super::types::Config;
use crate::routing::RouteTable;
use crate::store::{CityGateway, CountyGateway, MemoryStore};

/// Application state shared across connections
pub struct AppState {
    pub config: Config,
    pub routes: RouteTable,
    pub counties: CountyGateway,
    pub cities: CityGateway,
}

impl AppState {
    /// Build the state: validate the route table and open the store,
    /// seeding it when `[store] seed_file` is configured.
    pub fn new(config: &Config) -> Result<Self, Box<dyn std::error::Error>> {
        let routes = RouteTable::standard()?;
        let store = match config.store.seed_file.as_deref() {
            Some(path) => Arc::new(MemoryStore::load_seed(path)?),
            None => Arc::new(MemoryStore::new()),
        };
        Ok(Self {
            config: config.clone(),
            routes,
            counties: CountyGateway(Arc::clone(&store)),
            cities: CityGateway(store),
        })
    }
}
