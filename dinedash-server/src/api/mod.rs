//! API route modules
//!
//! One module per resource, each exposing a `router()` merged by
//! [`crate::core::server::build_app`].
//!
//! - [`auth`] - register / login / current account
//! - [`health`] - liveness
//! - [`events`] - SSE live updates for presentation sessions
//! - [`restaurants`] - search, details, hours, distance
//! - [`menu_items`] - menu management
//! - [`tables`] - dining table management
//! - [`reservations`] - reservation workflow
//! - [`orders`] - cart, placement and delivery tracking
//! - [`reviews`] - restaurant reviews
//! - [`payments`] - card capture for placed orders
//! - [`blog`] - blog posts

pub mod auth;
pub mod events;
pub mod health;

pub mod blog;
pub mod menu_items;
pub mod orders;
pub mod payments;
pub mod reservations;
pub mod restaurants;
pub mod reviews;
pub mod tables;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};
