use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::Department;

/// In-memory department records. Each instance owns its own list.
#[derive(Debug, Default)]
pub struct DepartmentStore {
    departments: RwLock<Vec<Department>>,
}

impl DepartmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with `DEP-1`, staffed by `DOC-1`.
    pub fn seeded() -> Self {
        let now = Utc::now();
        let department = Department {
            id: "DEP-1".to_string(),
            name: "Interna".to_string(),
            doctors_list: vec!["DOC-1".to_string()],
            capacity: 10,
            contact: "interna@nemocnice.cz".to_string(),
            note: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        Self {
            departments: RwLock::new(vec![department]),
        }
    }

    pub async fn create(&self, department: Department) -> Department {
        debug!("Storing department {} ({})", department.id, department.name);
        self.departments.write().await.push(department.clone());
        department
    }

    pub async fn get(&self, id: &str) -> Option<Department> {
        self.departments
            .read()
            .await
            .iter()
            .find(|department| department.id == id)
            .cloned()
    }

    /// Case-insensitive name lookup.
    pub async fn get_by_name(&self, name: &str) -> Option<Department> {
        let name = name.to_lowercase();
        self.departments
            .read()
            .await
            .iter()
            .find(|department| department.name.to_lowercase() == name)
            .cloned()
    }

    pub async fn list(&self) -> Vec<Department> {
        self.departments.read().await.clone()
    }
}
