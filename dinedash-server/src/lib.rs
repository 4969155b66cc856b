//! DineDash Server
//!
//! Restaurant reservation and food delivery backend.
//!
//! # Module structure
//!
//! ```text
//! dinedash-server/src/
//! ├── core/          # config, state, router, event fan-out
//! ├── auth/          # JWT auth, middleware, extractors
//! ├── api/           # HTTP routes and handlers
//! ├── db/            # embedded SurrealDB, models, repositories
//! ├── reservations/  # reservation workflow engine
//! ├── orders/        # cart and delivery workflow
//! ├── notify/        # email / console notification delivery
//! ├── geo.rs         # geocoding and distance
//! └── utils/         # errors, logging, validation, time
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod geo;
pub mod notify;
pub mod orders;
pub mod reservations;
pub mod utils;

// Re-export common types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState, build_router};
pub use orders::OrderService;
pub use reservations::ReservationEngine;
pub use utils::{AppError, AppResponse, AppResult};

pub use utils::logger::{init_logger, init_logger_with_file};

/// Prepare the process environment: dotenv, working directories and
/// the logger. Called once from `main` before anything else.
pub fn setup_environment(config: &Config) -> std::io::Result<()> {
    config.ensure_work_dir_structure()?;

    let log_dir = config.log_dir();
    if config.is_production() {
        init_logger_with_file(None, log_dir.to_str());
    } else {
        init_logger();
    }
    Ok(())
}
