pub mod reservation;
pub mod store;

pub use reservation::ReservationService;
pub use store::ReservationStore;
