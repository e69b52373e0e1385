use std::env;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Supabase,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub storage_backend: StorageBackend,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let storage_backend = match env::var("TIMESLOT_STORAGE").as_deref() {
            Ok("supabase") => StorageBackend::Supabase,
            Ok("memory") => StorageBackend::Memory,
            Ok(other) => {
                warn!("Unknown TIMESLOT_STORAGE '{}', falling back to memory", other);
                StorageBackend::Memory
            }
            Err(_) => StorageBackend::Memory,
        };

        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("PORT '{}' is not a valid port, using 3000", raw);
                3000
            }),
            Err(_) => 3000,
        };

        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            storage_backend,
            port,
        };

        if config.storage_backend == StorageBackend::Supabase && !config.is_configured() {
            warn!("Supabase storage selected but SUPABASE_URL / SUPABASE_ANON_PUBLIC_KEY are missing");
        }

        config
    }

    /// In-memory configuration used by tests and local runs.
    pub fn in_memory() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            storage_backend: StorageBackend::Memory,
            port: 3000,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
    }
}
