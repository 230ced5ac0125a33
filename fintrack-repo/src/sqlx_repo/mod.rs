use crate::category_repo::CategoryRepo;
use crate::transaction_repo::TransactionRepo;
use crate::user_repo::UserRepo;
use crate::HealthCheck;
use anyhow::Context;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;

mod associations;
mod category_repo;
mod transaction_repo;
mod user_repo;

pub struct SqlxStore {
    pool: PgPool,
}

impl SqlxStore {
    pub fn new(pool: PgPool) -> SqlxStore {
        SqlxStore { pool }
    }

    /// Applies the embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), anyhow::Error> {
        sqlx::migrate!()
            .run(&self.pool)
            .await
            .context("Unable to run migrations")
    }
}

#[async_trait]
impl HealthCheck for SqlxStore {
    async fn check(&self) -> bool {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }
}

pub async fn create_repos(
    database_url: &str,
    max_pool_size: u32,
) -> Result<(Arc<dyn UserRepo>, Arc<dyn CategoryRepo>, Arc<dyn TransactionRepo>), anyhow::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_pool_size)
        .connect(database_url)
        .await
        .context("Unable to connect to database")?;

    let store = Arc::new(SqlxStore::new(pool));
    Ok((
        Arc::clone(&store) as Arc<dyn UserRepo>,
        Arc::clone(&store) as Arc<dyn CategoryRepo>,
        store as Arc<dyn TransactionRepo>,
    ))
}
