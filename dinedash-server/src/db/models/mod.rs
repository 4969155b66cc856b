//! Database Models

// Serde helpers
pub mod serde_helpers;

// Accounts
pub mod account;

// Restaurant Domain
pub mod dining_table;
pub mod menu_item;
pub mod restaurant;

// Reservations
pub mod reservation;

// Orders
pub mod order;
pub mod payment;

// Content
pub mod blog_post;
pub mod review;

// Re-exports
pub use account::{Account, AccountId, AccountView};
pub use blog_post::{BlogPost, BlogPostCreate};
pub use dining_table::{DiningTable, DiningTableCreate, DiningTableUpdate};
pub use menu_item::{MenuItem, MenuItemCreate, MenuItemUpdate};
pub use order::{Order, OrderAddItem, OrderLine};
pub use payment::{Payment, PaymentMethod, PaymentSubmit};
pub use reservation::{Reservation, ReservationRequest};
pub use restaurant::{DayHours, Restaurant, RestaurantCreate, RestaurantUpdate, WeeklyHours};
pub use review::{Review, ReviewCreate};
