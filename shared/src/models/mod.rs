//! Domain model types shared between server and clients

pub mod order;
pub mod reservation;
pub mod role;

pub use order::OrderStatus;
pub use reservation::ReservationStatus;
pub use role::AccountRole;
