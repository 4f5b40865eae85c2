use std::sync::Arc;

use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::{Argon2, password_hash::rand_core::OsRng};
use shared::Role;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::db::models::Member;
use crate::db::repository::MemberRepository;
use crate::services::{LogSink, NotificationService};

/// Server state - shared handles for every request
///
/// Cloned per request; every field is either `Clone`-cheap or behind `Arc`.
///
/// | Field | Type | Description |
/// |-------|------|-------------|
/// | config | Config | Configuration (immutable) |
/// | db | Surreal<Db> | Embedded database |
/// | jwt_service | Arc<JwtService> | JWT authentication |
/// | notifier | NotificationService | Fire-and-forget notification dispatch |
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Config,
    /// Embedded database (SurrealDB)
    pub db: Surreal<Db>,
    /// JWT authentication service
    pub jwt_service: Arc<JwtService>,
    /// Notification dispatch (best-effort, decoupled from transactions)
    pub notifier: NotificationService,
}

impl ServerState {
    pub fn new(
        config: Config,
        db: Surreal<Db>,
        jwt_service: Arc<JwtService>,
        notifier: NotificationService,
    ) -> Self {
        Self {
            config,
            db,
            jwt_service,
            notifier,
        }
    }

    /// Initialize server state
    ///
    /// 1. Work directory structure
    /// 2. Embedded database under work_dir/database
    /// 3. JWT service and notification worker
    ///
    /// # Panics
    ///
    /// Panics when the database cannot be initialized; the server is useless
    /// without its store.
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let db_path = config.database_dir().join("selempangku.db");
        let db_service = DbService::new(&db_path.to_string_lossy())
            .await
            .expect("Failed to initialize database");

        if let Err(e) = Self::bootstrap_admin(&db_service.db).await {
            tracing::warn!(error = %e, "Admin bootstrap failed");
        }

        let jwt_service = Arc::new(JwtService::new(config.jwt.clone()));
        let notifier = NotificationService::start(Arc::new(LogSink));

        Self::new(config.clone(), db_service.db, jwt_service, notifier)
    }

    /// Seed the operator account on first start.
    ///
    /// Registration only ever creates customers, so without this there would
    /// be no one to verify payments. Controlled by `ADMIN_USERNAME` /
    /// `ADMIN_PASSWORD`; does nothing when the account already exists.
    async fn bootstrap_admin(db: &Surreal<Db>) -> Result<(), String> {
        let username = std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
        let password = match std::env::var("ADMIN_PASSWORD") {
            Ok(p) if p.len() >= 8 => p,
            Ok(_) => return Err("ADMIN_PASSWORD must be at least 8 characters".to_string()),
            Err(_) => {
                tracing::info!("ADMIN_PASSWORD not set, skipping admin bootstrap");
                return Ok(());
            }
        };

        let repo = MemberRepository::new(db.clone());
        if repo
            .find_by_username(&username)
            .await
            .map_err(|e| e.to_string())?
            .is_some()
        {
            return Ok(());
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| e.to_string())?
            .to_string();

        repo.create(Member {
            id: None,
            username: username.clone(),
            password_hash,
            name: "Administrator".to_string(),
            email: None,
            role: Role::Admin,
            is_active: true,
            created_at: shared::util::now_millis(),
        })
        .await
        .map_err(|e| e.to_string())?;

        tracing::info!(target: "security", %username, "Admin account created");
        Ok(())
    }

    /// Get a database handle
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// Get the JWT service
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
