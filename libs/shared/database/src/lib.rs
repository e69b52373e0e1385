pub mod memory;
pub mod supabase;

pub use memory::InMemoryDirectory;
pub use supabase::SupabaseClient;
