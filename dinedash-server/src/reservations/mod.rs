//! Reservation Workflow
//!
//! Command-processing engine for the reservation lifecycle:
//!
//! ```text
//! Requested ──► Confirmed ──► Cancelled
//!     │                          ▲
//!     └──────────────────────────┘
//! ```
//!
//! Commands are validated against the stored snapshot; every committed
//! transition emits one [`shared::WorkflowEvent`] on the engine's
//! broadcast channel.

pub mod engine;
pub mod error;

pub use engine::ReservationEngine;
pub use error::{WorkflowError, WorkflowResult};
