use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::Utc;
use serde_json::Value;

use crate::workflows::internship::domain::{
    ActorRole, Agreement, AgreementDraft, AgreementId, Application, ApplicationDraft,
    ApplicationId, CompanyId, CompanyRepresentative, FacultyId, Grade, InternshipCategory,
    NewCompany, PartneredCompany, PlacementFields, StaffAccount, Student, StudentId, Submission,
    SubmissionId, SupervisorContact, TaskId, CONTACT_PLACEHOLDER,
};
use crate::workflows::internship::grading::GradeSlot;
use crate::workflows::internship::repository::{
    AgreementRepository, ApplicationRepository, CompanyDirectory, LifecycleRepository,
    RepositoryError, StaffDirectory, StudentRepository, SubmissionRepository, TransitionCommit,
};
use crate::workflows::internship::{
    internship_router, InMemoryStore, InternshipConfig, InternshipService, InternshipStatus,
    TransitionAction,
};

pub(super) type Service = InternshipService<InMemoryStore>;

pub(super) fn build_service() -> (Service, Arc<InMemoryStore>) {
    build_service_with(InternshipConfig::default())
}

pub(super) fn build_service_with(config: InternshipConfig) -> (Service, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let service = InternshipService::new(store.clone(), config);
    (service, store)
}

pub(super) fn seed_student(store: &InMemoryStore, id: &str) -> StudentId {
    let student = Student::new(id, format!("Student {id}"), format!("{id}@uni.example"));
    let student_id = student.id.clone();
    store.put_student(student).expect("seed student");
    student_id
}

pub(super) fn seed_staff(store: &InMemoryStore, id: &str, role: ActorRole) -> FacultyId {
    let account = StaffAccount {
        id: FacultyId(id.to_string()),
        name: format!("Staff {id}"),
        email: format!("{id}@uni.example"),
        role,
    };
    let account_id = account.id.clone();
    store.put_staff(account).expect("seed staff");
    account_id
}

pub(super) fn seed_faculty(store: &InMemoryStore, id: &str) -> FacultyId {
    seed_staff(store, id, ActorRole::Admin)
}

pub(super) fn seed_company(
    store: &InMemoryStore,
    name: &str,
    email: &str,
    representative: Option<(&str, &str)>,
) -> PartneredCompany {
    store
        .put_company(NewCompany {
            name: name.to_string(),
            email: email.to_string(),
            phone: "+880 1700 000000".to_string(),
            address: "12 Gulshan Avenue".to_string(),
            supervisors: representative
                .map(|(name, email)| CompanyRepresentative {
                    name: name.to_string(),
                    email: email.to_string(),
                })
                .into_iter()
                .collect(),
        })
        .expect("seed company")
}

pub(super) fn seed_placeholder_company(store: &InMemoryStore, name: &str) -> PartneredCompany {
    store
        .put_company(NewCompany {
            name: name.to_string(),
            email: CONTACT_PLACEHOLDER.to_string(),
            phone: CONTACT_PLACEHOLDER.to_string(),
            address: CONTACT_PLACEHOLDER.to_string(),
            supervisors: Vec::new(),
        })
        .expect("seed company")
}

pub(super) fn seed_submission(store: &InMemoryStore, student: &StudentId, id: &str) -> SubmissionId {
    let submission = Submission {
        id: SubmissionId(id.to_string()),
        student_id: student.clone(),
        task_id: TaskId("task-weekly-report".to_string()),
        company_grade: None,
        faculty_grade: None,
        submitted_at: Utc::now(),
    };
    store
        .insert_submission(submission)
        .expect("seed submission")
        .id
}

pub(super) fn declared_supervisor() -> SupervisorContact {
    SupervisorContact {
        name: Some("Farhan Kabir".to_string()),
        email: Some("farhan@brightpath.example".to_string()),
        phone: Some("+880 1811 222333".to_string()),
        designation: Some("Engineering Manager".to_string()),
        company_address: Some("44 Banani Road".to_string()),
    }
}

pub(super) fn application_draft(company: &str, category: InternshipCategory) -> ApplicationDraft {
    ApplicationDraft {
        company_name: Some(company.to_string()),
        position: Some("Backend Intern".to_string()),
        internship_category: Some(category),
        self_found_supervisor: category.is_self_sourced().then(declared_supervisor),
    }
}

pub(super) fn agreement_draft() -> AgreementDraft {
    AgreementDraft {
        student_phone: Some("+880 1900 111222".to_string()),
        student_address: Some("7 Dhanmondi Lane".to_string()),
        ..AgreementDraft::default()
    }
}

/// Submit an application and approve it.
pub(super) fn approved_student(
    service: &Service,
    store: &InMemoryStore,
    id: &str,
    company: &str,
    category: InternshipCategory,
) -> StudentId {
    let student_id = seed_student(store, id);
    service
        .submit_application(&student_id, application_draft(company, category))
        .expect("submit application");
    service
        .request_transition(&student_id, TransitionAction::Approve, ActorRole::Admin)
        .expect("approve");
    student_id
}

/// Drive a self-found student up to `agreement_submitted`.
pub(super) fn agreement_submitted_student(
    service: &Service,
    store: &InMemoryStore,
    id: &str,
    company: &str,
) -> StudentId {
    let student_id = approved_student(service, store, id, company, InternshipCategory::SelfFound);
    service
        .submit_agreement(&student_id, agreement_draft())
        .expect("submit agreement");
    student_id
}

/// Store that lands a competing commit immediately before the next commit it receives,
/// so the caller's commit runs against state it did not validate.
pub(super) struct InterleavingStore {
    inner: Arc<InMemoryStore>,
    competing: Mutex<Option<TransitionCommit>>,
}

impl InterleavingStore {
    pub(super) fn interleave(&self, commit: TransitionCommit) {
        *self.competing.lock().expect("competing lock") = Some(commit);
    }
}

/// Service over `store` whose commits can be preceded by a competing one.
pub(super) fn interleaving_service(
    store: Arc<InMemoryStore>,
) -> (InternshipService<InterleavingStore>, Arc<InterleavingStore>) {
    let racing = Arc::new(InterleavingStore {
        inner: store,
        competing: Mutex::new(None),
    });
    let service = InternshipService::new(racing.clone(), InternshipConfig::default());
    (service, racing)
}

impl LifecycleRepository for InterleavingStore {
    fn commit_transition(&self, commit: TransitionCommit) -> Result<Student, RepositoryError> {
        let competing = self.competing.lock().expect("competing lock").take();
        if let Some(competing) = competing {
            self.inner
                .commit_transition(competing)
                .expect("competing commit lands");
        }
        self.inner.commit_transition(commit)
    }
}

impl StudentRepository for InterleavingStore {
    fn fetch_student(&self, id: &StudentId) -> Result<Option<Student>, RepositoryError> {
        self.inner.fetch_student(id)
    }

    fn set_category(
        &self,
        id: &StudentId,
        category: InternshipCategory,
    ) -> Result<Student, RepositoryError> {
        self.inner.set_category(id, category)
    }

    fn set_supervisor(
        &self,
        id: &StudentId,
        supervisor: FacultyId,
    ) -> Result<Option<FacultyId>, RepositoryError> {
        self.inner.set_supervisor(id, supervisor)
    }

    fn write_placement(
        &self,
        id: &StudentId,
        expected: InternshipStatus,
        placement: PlacementFields,
    ) -> Result<Student, RepositoryError> {
        self.inner.write_placement(id, expected, placement)
    }
}

impl ApplicationRepository for InterleavingStore {
    fn latest_application(
        &self,
        student: &StudentId,
    ) -> Result<Option<Application>, RepositoryError> {
        self.inner.latest_application(student)
    }

    fn next_application_id(&self) -> ApplicationId {
        self.inner.next_application_id()
    }
}

impl AgreementRepository for InterleavingStore {
    fn agreement_for(&self, student: &StudentId) -> Result<Option<Agreement>, RepositoryError> {
        self.inner.agreement_for(student)
    }

    fn next_agreement_id(&self) -> AgreementId {
        self.inner.next_agreement_id()
    }
}

impl CompanyDirectory for InterleavingStore {
    fn companies(&self) -> Result<Vec<PartneredCompany>, RepositoryError> {
        self.inner.companies()
    }

    fn fetch_company(&self, id: &CompanyId) -> Result<Option<PartneredCompany>, RepositoryError> {
        self.inner.fetch_company(id)
    }

    fn register_company(
        &self,
        company: NewCompany,
    ) -> Result<(PartneredCompany, bool), RepositoryError> {
        self.inner.register_company(company)
    }
}

impl SubmissionRepository for InterleavingStore {
    fn fetch_submission(&self, id: &SubmissionId) -> Result<Option<Submission>, RepositoryError> {
        self.inner.fetch_submission(id)
    }

    fn insert_submission(&self, submission: Submission) -> Result<Submission, RepositoryError> {
        self.inner.insert_submission(submission)
    }

    fn write_grade(
        &self,
        id: &SubmissionId,
        slot: GradeSlot,
        grade: Grade,
    ) -> Result<Submission, RepositoryError> {
        self.inner.write_grade(id, slot, grade)
    }
}

impl StaffDirectory for InterleavingStore {
    fn fetch_staff(&self, id: &FacultyId) -> Result<Option<StaffAccount>, RepositoryError> {
        self.inner.fetch_staff(id)
    }
}

pub(super) fn router_with_service(service: Service) -> axum::Router {
    internship_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
