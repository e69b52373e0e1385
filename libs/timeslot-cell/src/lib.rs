pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use error::TimeSlotError;
pub use models::*;
pub use router::timeslot_routes;
pub use services::*;
