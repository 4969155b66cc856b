//! Core module - configuration, state, router and server
//!
//! - [`Config`] - environment-derived configuration
//! - [`ServerState`] - shared service handles
//! - [`Server`] - HTTP server
//! - [`EventRouter`] - workflow event fan-out

pub mod config;
pub mod event_router;
pub mod server;
pub mod state;

pub use config::Config;
pub use event_router::{EventChannels, EventRouter};
pub use server::{Server, build_router};
pub use state::{ResourceVersions, ServerState};
