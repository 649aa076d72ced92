use std::sync::Arc;

use sqlx::PgPool;

use crate::core::config::Settings;
use crate::services::store::PgStore;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    db: PgPool,
}

impl AppState {
    pub(crate) fn new(settings: Settings, db: PgPool) -> Self {
        Self { inner: Arc::new(InnerState { settings, db }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn db(&self) -> &PgPool {
        &self.inner.db
    }

    /// Store view used by the grading services.
    pub(crate) fn store(&self) -> PgStore<'_> {
        PgStore::new(&self.inner.db)
    }
}
