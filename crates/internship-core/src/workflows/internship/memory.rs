//! In-memory implementation of every internship storage seam.
//!
//! Each collection sits behind its own mutex and every write is a read-modify-write under
//! that lock, which gives the conditional and field-level semantics the service relies on.
//! A transition commit holds the student, application, and agreement locks together.
//! All state is lost on restart.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::domain::{
    Agreement, AgreementId, Application, ApplicationId, CompanyId, FacultyId, Grade,
    InternshipCategory, InternshipStatus, NewCompany, PartneredCompany, PlacementFields,
    StaffAccount, Student, StudentId, Submission, SubmissionId,
};
use super::grading::GradeSlot;
use super::placement::directory::{find_by_name, insert_sorted};
use super::repository::{
    AgreementRepository, AgreementWrite, ApplicationRepository, ApplicationWrite,
    CompanyDirectory, LifecycleRepository, RepositoryError, StaffDirectory, StudentRepository,
    SubmissionRepository, TransitionCommit,
};

#[derive(Default)]
pub struct InMemoryStore {
    students: Mutex<HashMap<StudentId, Student>>,
    applications: Mutex<HashMap<StudentId, Vec<Application>>>,
    agreements: Mutex<HashMap<StudentId, Agreement>>,
    companies: Mutex<Vec<PartneredCompany>>,
    submissions: Mutex<HashMap<SubmissionId, Submission>>,
    staff: Mutex<HashMap<FacultyId, StaffAccount>>,
    company_sequence: AtomicU64,
    application_sequence: AtomicU64,
    agreement_sequence: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("in-memory store lock poisoned".to_string()))
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_student(&self, student: Student) -> Result<(), RepositoryError> {
        lock(&self.students)?.insert(student.id.clone(), student);
        Ok(())
    }

    pub fn put_staff(&self, account: StaffAccount) -> Result<(), RepositoryError> {
        lock(&self.staff)?.insert(account.id.clone(), account);
        Ok(())
    }

    pub fn put_company(&self, company: NewCompany) -> Result<PartneredCompany, RepositoryError> {
        let (stored, _) = self.register_company(company)?;
        Ok(stored)
    }

    fn next_company_id(&self) -> CompanyId {
        let id = self.company_sequence.fetch_add(1, Ordering::Relaxed) + 1;
        CompanyId(format!("company-{id:04}"))
    }
}

impl StudentRepository for InMemoryStore {
    fn fetch_student(&self, id: &StudentId) -> Result<Option<Student>, RepositoryError> {
        Ok(lock(&self.students)?.get(id).cloned())
    }

    fn set_category(
        &self,
        id: &StudentId,
        category: InternshipCategory,
    ) -> Result<Student, RepositoryError> {
        let mut students = lock(&self.students)?;
        let student = students.get_mut(id).ok_or(RepositoryError::NotFound)?;
        student.internship_category = Some(category);
        Ok(student.clone())
    }

    fn set_supervisor(
        &self,
        id: &StudentId,
        supervisor: FacultyId,
    ) -> Result<Option<FacultyId>, RepositoryError> {
        let mut students = lock(&self.students)?;
        let student = students.get_mut(id).ok_or(RepositoryError::NotFound)?;
        Ok(student.supervisor_id.replace(supervisor))
    }

    fn write_placement(
        &self,
        id: &StudentId,
        expected: InternshipStatus,
        placement: PlacementFields,
    ) -> Result<Student, RepositoryError> {
        let mut students = lock(&self.students)?;
        let student = students.get_mut(id).ok_or(RepositoryError::NotFound)?;
        if student.internship_status != expected {
            return Err(RepositoryError::Conflict);
        }

        student.placement = Some(placement);
        Ok(student.clone())
    }
}

impl ApplicationRepository for InMemoryStore {
    fn latest_application(
        &self,
        student: &StudentId,
    ) -> Result<Option<Application>, RepositoryError> {
        Ok(lock(&self.applications)?
            .get(student)
            .and_then(|history| history.last())
            .cloned())
    }

    fn next_application_id(&self) -> ApplicationId {
        let id = self.application_sequence.fetch_add(1, Ordering::Relaxed) + 1;
        ApplicationId(format!("app-{id:06}"))
    }
}

impl AgreementRepository for InMemoryStore {
    fn agreement_for(&self, student: &StudentId) -> Result<Option<Agreement>, RepositoryError> {
        Ok(lock(&self.agreements)?.get(student).cloned())
    }

    fn next_agreement_id(&self) -> AgreementId {
        let id = self.agreement_sequence.fetch_add(1, Ordering::Relaxed) + 1;
        AgreementId(format!("agr-{id:06}"))
    }
}

impl LifecycleRepository for InMemoryStore {
    fn commit_transition(&self, commit: TransitionCommit) -> Result<Student, RepositoryError> {
        // Lock order: students, applications, agreements.
        let mut students = lock(&self.students)?;
        let mut applications = lock(&self.applications)?;
        let mut agreements = lock(&self.agreements)?;

        let TransitionCommit {
            student_id,
            expected,
            update,
            application,
            agreement,
        } = commit;

        let student = students.get_mut(&student_id).ok_or(RepositoryError::NotFound)?;
        if student.internship_status != expected {
            return Err(RepositoryError::Conflict);
        }

        let history = applications.get(&student_id);
        let has_application = |id: &ApplicationId| {
            history.is_some_and(|history| history.iter().any(|existing| &existing.id == id))
        };
        match &application {
            Some(ApplicationWrite::Insert(inserted)) if has_application(&inserted.id) => {
                return Err(RepositoryError::Conflict);
            }
            Some(ApplicationWrite::Replace(edited)) if !has_application(&edited.id) => {
                return Err(RepositoryError::NotFound);
            }
            Some(ApplicationWrite::Status(_)) if history.map_or(true, Vec::is_empty) => {
                return Err(RepositoryError::NotFound);
            }
            _ => {}
        }
        if matches!(agreement, Some(AgreementWrite::Status(_)))
            && !agreements.contains_key(&student_id)
        {
            return Err(RepositoryError::NotFound);
        }

        match application {
            Some(ApplicationWrite::Insert(inserted)) => {
                applications.entry(student_id.clone()).or_default().push(inserted);
            }
            Some(ApplicationWrite::Replace(edited)) => {
                let stored = applications.get_mut(&student_id).and_then(|history| {
                    history
                        .iter_mut()
                        .find(|existing| existing.id == edited.id)
                });
                if let Some(stored) = stored {
                    *stored = edited;
                }
            }
            Some(ApplicationWrite::Status(status)) => {
                if let Some(latest) = applications
                    .get_mut(&student_id)
                    .and_then(|history| history.last_mut())
                {
                    latest.status = status;
                }
            }
            None => {}
        }
        match agreement {
            Some(AgreementWrite::Upsert(filed)) => {
                agreements.insert(student_id.clone(), filed);
            }
            Some(AgreementWrite::Status(status)) => {
                if let Some(stored) = agreements.get_mut(&student_id) {
                    stored.status = status;
                }
            }
            None => {}
        }

        student.internship_status = update.status;
        if let Some(category) = update.category {
            student.internship_category = Some(category);
        }
        Ok(student.clone())
    }
}

impl CompanyDirectory for InMemoryStore {
    fn companies(&self) -> Result<Vec<PartneredCompany>, RepositoryError> {
        Ok(lock(&self.companies)?.clone())
    }

    fn fetch_company(&self, id: &CompanyId) -> Result<Option<PartneredCompany>, RepositoryError> {
        Ok(lock(&self.companies)?
            .iter()
            .find(|company| &company.id == id)
            .cloned())
    }

    fn register_company(
        &self,
        company: NewCompany,
    ) -> Result<(PartneredCompany, bool), RepositoryError> {
        let mut companies = lock(&self.companies)?;
        if let Some(existing) = find_by_name(&companies, Some(company.name.as_str())) {
            return Ok((existing.clone(), false));
        }

        let stored = company.with_id(self.next_company_id());
        insert_sorted(&mut companies, stored.clone());
        Ok((stored, true))
    }
}

impl SubmissionRepository for InMemoryStore {
    fn fetch_submission(&self, id: &SubmissionId) -> Result<Option<Submission>, RepositoryError> {
        Ok(lock(&self.submissions)?.get(id).cloned())
    }

    fn insert_submission(&self, submission: Submission) -> Result<Submission, RepositoryError> {
        let mut submissions = lock(&self.submissions)?;
        if submissions.contains_key(&submission.id) {
            return Err(RepositoryError::Conflict);
        }
        submissions.insert(submission.id.clone(), submission.clone());
        Ok(submission)
    }

    fn write_grade(
        &self,
        id: &SubmissionId,
        slot: GradeSlot,
        grade: Grade,
    ) -> Result<Submission, RepositoryError> {
        let mut submissions = lock(&self.submissions)?;
        let submission = submissions.get_mut(id).ok_or(RepositoryError::NotFound)?;
        slot.write(submission, grade);
        Ok(submission.clone())
    }
}

impl StaffDirectory for InMemoryStore {
    fn fetch_staff(&self, id: &FacultyId) -> Result<Option<StaffAccount>, RepositoryError> {
        Ok(lock(&self.staff)?.get(id).cloned())
    }
}
