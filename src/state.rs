use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::jwt::JwtKeys;
use crate::config::AppConfig;
use crate::orders::repo::{OrderStore, PgOrderStore};
use crate::users::repo::{PgUserStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub jwt: JwtKeys,
    pub users: Arc<dyn UserStore>,
    pub orders: Arc<dyn OrderStore>,
}

impl AppState {
    /// Wires the Postgres-backed stores around an already connected pool.
    pub fn new(config: &AppConfig, db: PgPool) -> Self {
        let users = Arc::new(PgUserStore::new(db.clone())) as Arc<dyn UserStore>;
        let orders = Arc::new(PgOrderStore::new(db)) as Arc<dyn OrderStore>;
        Self::from_parts(JwtKeys::from_config(&config.jwt), users, orders)
    }

    pub fn from_parts(
        jwt: JwtKeys,
        users: Arc<dyn UserStore>,
        orders: Arc<dyn OrderStore>,
    ) -> Self {
        Self { jwt, users, orders }
    }

    /// State over a fresh in-memory store; the store handle is returned for assertions.
    #[cfg(test)]
    pub fn fake() -> (Self, Arc<crate::memory::MemoryStore>) {
        let store = Arc::new(crate::memory::MemoryStore::default());
        let state = Self::from_parts(
            JwtKeys::from_config(&AppConfig::for_tests().jwt),
            store.clone() as Arc<dyn UserStore>,
            store.clone() as Arc<dyn OrderStore>,
        );
        (state, store)
    }
}
