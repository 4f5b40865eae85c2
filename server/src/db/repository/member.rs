//! Member Repository

use super::{BaseRepository, RepoError, RepoResult, record_id};
use crate::db::models::Member;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const MEMBER_TABLE: &str = "member";

#[derive(Clone)]
pub struct MemberRepository {
    base: BaseRepository,
}

impl MemberRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find an active member by username (login)
    pub async fn find_by_username(&self, username: &str) -> RepoResult<Option<Member>> {
        let members: Vec<Member> = self
            .base
            .db()
            .query("SELECT * FROM member WHERE username = $username AND is_active = true")
            .bind(("username", username.to_string()))
            .await?
            .take(0)?;
        Ok(members.into_iter().next())
    }

    /// Find member by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Member>> {
        let member: Option<Member> = self.base.db().select(record_id(MEMBER_TABLE, id)).await?;
        Ok(member)
    }

    /// All members, including deactivated ones (admin)
    pub async fn find_all(&self) -> RepoResult<Vec<Member>> {
        let members: Vec<Member> = self
            .base
            .db()
            .query("SELECT * FROM member ORDER BY username")
            .await?
            .take(0)?;
        Ok(members)
    }

    /// Create a member; the unique index on username rejects duplicates
    pub async fn create(&self, member: Member) -> RepoResult<Member> {
        let username = member.username.clone();
        let result: Result<Option<Member>, surrealdb::Error> = self
            .base
            .db()
            .create(MEMBER_TABLE)
            .content(member)
            .await;

        match result {
            Ok(Some(created)) => Ok(created),
            Ok(None) => Err(RepoError::Database("Failed to create member".to_string())),
            Err(e) => {
                let msg = e.to_string().to_lowercase();
                if msg.contains("unique") || msg.contains("already exists") {
                    Err(RepoError::Duplicate(format!(
                        "Username {} already taken",
                        username
                    )))
                } else {
                    Err(e.into())
                }
            }
        }
    }

    /// Soft-delete a member
    pub async fn deactivate(&self, id: &str) -> RepoResult<Member> {
        let thing = record_id(MEMBER_TABLE, id);
        let members: Vec<Member> = self
            .base
            .db()
            .query("UPDATE $thing SET is_active = false RETURN AFTER")
            .bind(("thing", thing))
            .await?
            .take(0)?;
        members
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Member {} not found", id)))
    }
}
