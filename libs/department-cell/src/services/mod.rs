pub mod department;
pub mod store;

pub use department::DepartmentService;
pub use store::DepartmentStore;
