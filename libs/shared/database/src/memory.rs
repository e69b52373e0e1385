use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::debug;

use shared_models::directory::{Doctor, Patient, Procedure};

/// In-memory lookup of doctors, patients and procedures.
///
/// Every instance owns its own maps; nothing is shared between instances.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    doctors: RwLock<HashMap<String, Doctor>>,
    patients: RwLock<HashMap<String, Patient>>,
    procedures: RwLock<HashMap<String, Procedure>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory preloaded with `DOC-1`, `PAT-1` and `PROC-1`.
    pub fn seeded() -> Self {
        let doctors = HashMap::from([(
            "DOC-1".to_string(),
            Doctor {
                id: "DOC-1".to_string(),
                first_name: "Jan".to_string(),
                last_name: "Novak".to_string(),
                specialization: "Interna".to_string(),
                is_active: true,
            },
        )]);
        let patients = HashMap::from([(
            "PAT-1".to_string(),
            Patient {
                id: "PAT-1".to_string(),
                first_name: "Test".to_string(),
                last_name: "Pacient".to_string(),
                email: "test.pacient@example.com".to_string(),
                phone: "+420123456789".to_string(),
                reservation_ids: Vec::new(),
            },
        )]);
        let procedures = HashMap::from([(
            "PROC-1".to_string(),
            Procedure {
                id: "PROC-1".to_string(),
                name: "Vstupni prohlidka".to_string(),
                duration_minutes: 30,
            },
        )]);

        Self {
            doctors: RwLock::new(doctors),
            patients: RwLock::new(patients),
            procedures: RwLock::new(procedures),
        }
    }

    pub async fn get_doctor(&self, id: &str) -> Option<Doctor> {
        self.doctors.read().await.get(id).cloned()
    }

    pub async fn get_patient(&self, id: &str) -> Option<Patient> {
        self.patients.read().await.get(id).cloned()
    }

    pub async fn get_procedure(&self, id: &str) -> Option<Procedure> {
        self.procedures.read().await.get(id).cloned()
    }

    pub async fn upsert_doctor(&self, doctor: Doctor) {
        self.doctors.write().await.insert(doctor.id.clone(), doctor);
    }

    /// Links a reservation to the patient. Returns the updated patient, or
    /// `None` when the patient is unknown.
    pub async fn add_reservation(&self, patient_id: &str, reservation_id: &str) -> Option<Patient> {
        let mut patients = self.patients.write().await;
        let patient = patients.get_mut(patient_id)?;
        patient.reservation_ids.push(reservation_id.to_string());
        debug!("Linked reservation {} to patient {}", reservation_id, patient_id);
        Some(patient.clone())
    }
}
