//! Authentication module
//!
//! JWT authentication and the request-level actor context:
//! - [`JwtService`] - token generation/validation
//! - [`CurrentUser`] - authenticated actor with capability-tagged role
//! - [`require_auth`] - middleware for `/api/` routes

pub mod extractor;
pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::require_auth;
