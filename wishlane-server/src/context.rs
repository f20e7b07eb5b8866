use std::sync::Arc;

use axum::extract::FromRef;
use wishlane_social::{PgDatabase, Social};

#[derive(Clone, FromRef)]
pub struct ServerContext {
    pub social: Arc<Social<PgDatabase>>,
}
