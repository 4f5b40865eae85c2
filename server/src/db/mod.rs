//! Database Module
//!
//! Embedded SurrealDB storage: connection setup and schema definition.
//! Repositories live in [`repository`], row types in [`models`].

pub mod models;
pub mod repository;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

use crate::utils::AppError;

const NAMESPACE: &str = "selempangku";
const DATABASE: &str = "main";

/// Schema and indexes, applied idempotently at startup.
///
/// Order and payment rows are financial records: there is deliberately no
/// DELETE path for them anywhere in the schema or the repositories.
const SCHEMA: &str = r#"
    DEFINE TABLE IF NOT EXISTS member SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS member_username ON member FIELDS username UNIQUE;

    DEFINE TABLE IF NOT EXISTS product SCHEMALESS;
    DEFINE TABLE IF NOT EXISTS account SCHEMALESS;

    DEFINE TABLE IF NOT EXISTS order SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS order_user ON order FIELDS user;
    DEFINE INDEX IF NOT EXISTS order_status ON order FIELDS status;

    DEFINE TABLE IF NOT EXISTS payment SCHEMALESS;
    DEFINE INDEX IF NOT EXISTS payment_order ON payment FIELDS order_id;
    DEFINE INDEX IF NOT EXISTS payment_status ON payment FIELDS status;
"#;

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the on-disk database at `db_path`
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        Self::prepare(db).await
    }

    /// In-memory database, used by the integration tests
    pub async fn memory() -> Result<Self, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open memory database: {e}")))?;

        Self::prepare(db).await
    }

    async fn prepare(db: Surreal<Db>) -> Result<Self, AppError> {
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        db.query(SCHEMA)
            .await
            .map_err(|e| AppError::database(format!("Failed to apply schema: {e}")))?
            .check()
            .map_err(|e| AppError::database(format!("Schema definition rejected: {e}")))?;

        tracing::info!("Database schema applied");

        Ok(Self { db })
    }
}
