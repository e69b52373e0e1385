use serde::{Deserialize, Serialize};

pub const DEFAULT_USER_ID: &str = "USER-1";
pub const DEFAULT_PATIENT_ID: &str = "PAT-1";

/// User resolved from the `x-user-*` request headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub role: Option<String>,
    pub patient_id: Option<String>,
}

impl CurrentUser {
    pub fn new(id: &str, role: Option<&str>, patient_id: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            role: role.map(str::to_string),
            patient_id: patient_id.map(str::to_string),
        }
    }

    pub fn patient(id: &str, patient_id: &str) -> Self {
        Self::new(id, Some("patient"), Some(patient_id))
    }

    pub fn with_role(id: &str, role: &str) -> Self {
        Self::new(id, Some(role), None)
    }

    pub fn role_or_guest(&self) -> &str {
        self.role.as_deref().unwrap_or("guest")
    }
}
