use crate::auth::CurrentUser;
use crate::config::Config;
use crate::db::DbPool;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Server-side session store mapping session tokens to the authenticated
/// user. Tokens are invalidated on logout or server restart.
pub type SessionStore = Arc<Mutex<HashMap<String, CurrentUser>>>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Arc<Config>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(db: DbPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}
