//! SelempangKu Server - order management for custom sash products
//!
//! # Module structure
//!
//! ```text
//! server/src/
//! ├── core/          # Config, state, HTTP server
//! ├── auth/          # JWT authentication, current user
//! ├── api/           # HTTP routes and handlers
//! ├── db/            # Embedded SurrealDB, models, repositories
//! ├── orders/        # Order/payment lifecycle service (the core)
//! ├── services/      # Notification dispatch
//! └── utils/         # Errors, logging
//! ```
//!
//! The interesting part lives in `orders`: the order/payment state machine
//! and the transactional guarantees around stock reservation and payment
//! verification. Everything else is conventional API plumbing around it.

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod orders;
pub mod services;
pub mod utils;

// Re-export public types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use orders::OrderService;
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// One-shot process setup: dotenv, work directory layout, logging.
///
/// Called by the binary before anything else; tests skip it and wire their
/// own state instead.
pub fn setup_environment() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    config.ensure_work_dir_structure()?;

    let log_level = std::env::var("LOG_LEVEL").ok();
    if config.is_production() {
        let logs_dir = config.logs_dir();
        utils::logger::init_logger_with_file(log_level.as_deref(), logs_dir.to_str());
    } else {
        utils::logger::init_logger_with_file(log_level.as_deref(), None);
    }

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   _____      __                                    __ __
  / ___/___  / /__  ____ ___  ____  ____ _____  ____/ //_/_  __
  \__ \/ _ \/ / _ \/ __ `__ \/ __ \/ __ `/ __ \/ __  / / / / /
 ___/ /  __/ /  __/ / / / / / /_/ / /_/ / / / / /_/ / /| |/ /_/ /
/____/\___/_/\___/_/ /_/ /_/ .___/\__,_/_/ /_/\__,_/_/ |_|\__,_/
                          /_/
    "#
    );
}
