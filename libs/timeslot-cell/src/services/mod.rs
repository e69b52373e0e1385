pub mod repository;
pub mod supabase;
pub mod timeslot;
pub mod validator;

pub use repository::{InMemoryTimeSlotRepository, TimeSlotRepository};
pub use supabase::SupabaseTimeSlotRepository;
pub use timeslot::TimeSlotService;
pub use validator::{DoctorValidator, SupabaseDoctorValidator};
