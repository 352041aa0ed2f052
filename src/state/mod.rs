//! Shared application state
//!
//! Cloned into every request handler; everything inside is cheap to clone.

use std::sync::Arc;
use crate::config::Settings;
use crate::database::{DatabasePool, DatabaseService};
use crate::services::ServiceFactory;

#[derive(Clone, Debug)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub db: DatabaseService,
    pub services: Arc<ServiceFactory>,
}

impl AppState {
    /// Build the state from loaded settings and a connection pool
    pub fn new(settings: Settings, pool: DatabasePool) -> Self {
        let db = DatabaseService::new(pool);
        let services = ServiceFactory::new(&settings, db.clone());

        Self {
            settings: Arc::new(settings),
            db,
            services: Arc::new(services),
        }
    }
}
