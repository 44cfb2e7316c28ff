use internship_core::error::AppError;
use internship_core::workflows::internship::domain::{NewCompany, StaffAccount, Submission};
use internship_core::workflows::internship::repository::SubmissionRepository;
use internship_core::workflows::internship::{InMemoryStore, InternshipError, Student};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Records preloaded into the in-memory store at startup.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SeedData {
    #[serde(default)]
    pub(crate) students: Vec<Student>,
    #[serde(default)]
    pub(crate) staff: Vec<StaffAccount>,
    #[serde(default)]
    pub(crate) companies: Vec<NewCompany>,
    #[serde(default)]
    pub(crate) submissions: Vec<Submission>,
}

pub(crate) fn load_seed(path: &Path) -> Result<SeedData, AppError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub(crate) fn seed_store(store: &InMemoryStore, seed: SeedData) -> Result<(), AppError> {
    for student in seed.students {
        store.put_student(student).map_err(InternshipError::from)?;
    }
    for account in seed.staff {
        store.put_staff(account).map_err(InternshipError::from)?;
    }
    for company in seed.companies {
        store.put_company(company).map_err(InternshipError::from)?;
    }
    for submission in seed.submissions {
        store
            .insert_submission(submission)
            .map_err(InternshipError::from)?;
    }
    Ok(())
}
