//! Application state shared across handlers.

use sqlx::PgPool;

/// Application state shared across all handlers.
///
/// `PgPool` is internally reference-counted, so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pool: PgPool,
}

impl AppState {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}
