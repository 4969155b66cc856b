//! Shared types for DineDash
//!
//! Common types used by the server and clients: domain enums, the API
//! response envelope, workflow event payloads, and utility types.

pub mod event;
pub mod models;
pub mod response;
pub mod types;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use event::{ActorSide, SyncPayload, WorkflowEvent, WorkflowEventKind};
pub use models::{AccountRole, OrderStatus, ReservationStatus};
pub use response::ApiResponse;
pub use types::Timestamp;
