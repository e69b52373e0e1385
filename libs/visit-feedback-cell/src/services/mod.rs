pub mod feedback;
pub mod store;

pub use feedback::VisitFeedbackService;
pub use store::VisitFeedbackStore;
