//! Bank Account Repository

use super::{BaseRepository, RepoError, RepoResult, record_id};
use crate::db::models::{Account, AccountCreate, AccountUpdate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const ACCOUNT_TABLE: &str = "account";

#[derive(Clone)]
pub struct AccountRepository {
    base: BaseRepository,
}

impl AccountRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Active destination accounts (shown on the payment form)
    pub async fn find_all_active(&self) -> RepoResult<Vec<Account>> {
        let accounts: Vec<Account> = self
            .base
            .db()
            .query("SELECT * FROM account WHERE is_active = true ORDER BY bank_name")
            .await?
            .take(0)?;
        Ok(accounts)
    }

    /// All accounts (admin)
    pub async fn find_all(&self) -> RepoResult<Vec<Account>> {
        let accounts: Vec<Account> = self
            .base
            .db()
            .query("SELECT * FROM account ORDER BY bank_name")
            .await?
            .take(0)?;
        Ok(accounts)
    }

    /// Find account by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Account>> {
        let account: Option<Account> = self.base.db().select(record_id(ACCOUNT_TABLE, id)).await?;
        Ok(account)
    }

    /// Create a new destination account
    pub async fn create(&self, data: AccountCreate) -> RepoResult<Account> {
        let account = Account {
            id: None,
            bank_name: data.bank_name,
            account_number: data.account_number,
            holder_name: data.holder_name,
            is_active: true,
            created_at: shared::util::now_millis(),
        };

        let created: Option<Account> = self
            .base
            .db()
            .create(ACCOUNT_TABLE)
            .content(account)
            .await?;

        created.ok_or_else(|| RepoError::Database("Failed to create account".to_string()))
    }

    /// Update an account
    pub async fn update(&self, id: &str, data: AccountUpdate) -> RepoResult<Account> {
        let thing = record_id(ACCOUNT_TABLE, id);

        let mut set_parts: Vec<&str> = Vec::new();
        if data.bank_name.is_some() {
            set_parts.push("bank_name = $bank_name");
        }
        if data.account_number.is_some() {
            set_parts.push("account_number = $account_number");
        }
        if data.holder_name.is_some() {
            set_parts.push("holder_name = $holder_name");
        }
        if data.is_active.is_some() {
            set_parts.push("is_active = $is_active");
        }

        if set_parts.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Account {} not found", id)));
        }

        let query_str = format!("UPDATE $thing SET {} RETURN AFTER", set_parts.join(", "));

        let mut query = self.base.db().query(query_str).bind(("thing", thing));
        if let Some(v) = data.bank_name {
            query = query.bind(("bank_name", v));
        }
        if let Some(v) = data.account_number {
            query = query.bind(("account_number", v));
        }
        if let Some(v) = data.holder_name {
            query = query.bind(("holder_name", v));
        }
        if let Some(v) = data.is_active {
            query = query.bind(("is_active", v));
        }

        let accounts: Vec<Account> = query.await?.take(0)?;
        accounts
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Account {} not found", id)))
    }

    /// Deactivate an account (payments keep referencing it)
    pub async fn deactivate(&self, id: &str) -> RepoResult<Account> {
        let thing = record_id(ACCOUNT_TABLE, id);
        let accounts: Vec<Account> = self
            .base
            .db()
            .query("UPDATE $thing SET is_active = false RETURN AFTER")
            .bind(("thing", thing))
            .await?
            .take(0)?;
        accounts
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Account {} not found", id)))
    }
}
