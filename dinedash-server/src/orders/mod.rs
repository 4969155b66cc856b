//! Order/Delivery Tracking
//!
//! Thin service over the linear order progression
//! Cart → Placed → Preparing → PickedUp → Delivered. Status changes
//! emit `OrderStatusChanged` workflow events into the same broadcast
//! channel the reservation engine uses.

pub mod service;

pub use service::OrderService;
