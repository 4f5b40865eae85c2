//! Repository Module
//!
//! Data access for the SurrealDB tables. Every multi-step mutation that must
//! be atomic (stock reservation, payment submission/decision) is expressed as
//! a single `BEGIN TRANSACTION … COMMIT TRANSACTION` query with conditional
//! `UPDATE … WHERE` statements; a failed precondition `THROW`s a marker that
//! [`check_transaction`] translates into a typed error. There is no
//! read-then-write anywhere on a guarded field.

pub mod account;
pub mod member;
pub mod order;
pub mod payment;
pub mod product;

// Re-exports
pub use account::AccountRepository;
pub use member::MemberRepository;
pub use order::OrderRepository;
pub use payment::PaymentRepository;
pub use product::ProductRepository;

use std::collections::HashMap;

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;
use thiserror::Error;

// Markers thrown inside transactions when a status precondition fails.
// They surface in the SurrealDB error text and are matched by substring,
// so they must stay unique across the codebase.
pub(crate) const OUT_OF_STOCK: &str = "selempang_out_of_stock";
pub(crate) const ORDER_STATE_CONFLICT: &str = "selempang_order_state_conflict";
pub(crate) const PAYMENT_STATE_CONFLICT: &str = "selempang_payment_state_conflict";

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// A compare-and-set precondition failed; the marker says which one
    #[error("State conflict: {0}")]
    StateConflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}

/// Resolve "table:key" or bare "key" into a [`RecordId`] for `table`
pub fn record_id(table: &str, id: &str) -> RecordId {
    match id.parse::<RecordId>() {
        Ok(rid) if rid.table() == table => rid,
        _ => RecordId::from_table_key(table, id),
    }
}

/// Inspect a transaction response for errors.
///
/// A cancelled transaction reports an error for every statement; the one we
/// care about is the `THROW`n marker. Anything else is a real store failure.
pub(crate) fn check_transaction(mut resp: surrealdb::Response) -> RepoResult<()> {
    let errors: HashMap<usize, surrealdb::Error> = resp.take_errors();
    if errors.is_empty() {
        return Ok(());
    }

    let joined = errors
        .values()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ");

    for marker in [OUT_OF_STOCK, ORDER_STATE_CONFLICT, PAYMENT_STATE_CONFLICT] {
        if joined.contains(marker) {
            return Err(RepoError::StateConflict(marker.to_string()));
        }
    }

    Err(RepoError::Database(joined))
}
