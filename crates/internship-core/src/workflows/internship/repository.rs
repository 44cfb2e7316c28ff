use super::domain::{
    Agreement, AgreementId, AgreementStatus, Application, ApplicationId, ApplicationStatus,
    CompanyId, FacultyId, Grade, InternshipCategory, InternshipStatus, NewCompany,
    PartneredCompany, PlacementFields, StaffAccount, Student, StudentId, Submission, SubmissionId,
};
use super::grading::GradeSlot;

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// A conditional write found a different pre-state, or a unique key already exists.
    #[error("record changed or already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Status write applied only while the stored status still equals the expected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: InternshipStatus,
    pub category: Option<InternshipCategory>,
}

/// Application write that travels with a status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplicationWrite {
    /// Append a new application, which becomes the latest.
    Insert(Application),
    /// Replace the stored application carrying the same id.
    Replace(Application),
    /// Set the status of the latest application.
    Status(ApplicationStatus),
}

/// Agreement write that travels with a status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgreementWrite {
    Upsert(Agreement),
    Status(AgreementStatus),
}

/// A guarded status change together with the record writes it implies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionCommit {
    pub student_id: StudentId,
    pub expected: InternshipStatus,
    pub update: StatusUpdate,
    pub application: Option<ApplicationWrite>,
    pub agreement: Option<AgreementWrite>,
}

pub trait StudentRepository: Send + Sync {
    fn fetch_student(&self, id: &StudentId) -> Result<Option<Student>, RepositoryError>;

    fn set_category(
        &self,
        id: &StudentId,
        category: InternshipCategory,
    ) -> Result<Student, RepositoryError>;

    /// Field-level supervisor write returning the previous supervisor.
    fn set_supervisor(
        &self,
        id: &StudentId,
        supervisor: FacultyId,
    ) -> Result<Option<FacultyId>, RepositoryError>;

    /// Placement write guarded by the status observed when the commit was validated.
    fn write_placement(
        &self,
        id: &StudentId,
        expected: InternshipStatus,
        placement: PlacementFields,
    ) -> Result<Student, RepositoryError>;
}

pub trait ApplicationRepository: Send + Sync {
    /// The most recent application for the student, which is authoritative.
    fn latest_application(&self, student: &StudentId)
        -> Result<Option<Application>, RepositoryError>;
    fn next_application_id(&self) -> ApplicationId;
}

pub trait AgreementRepository: Send + Sync {
    /// At most one agreement per student.
    fn agreement_for(&self, student: &StudentId) -> Result<Option<Agreement>, RepositoryError>;
    fn next_agreement_id(&self) -> AgreementId;
}

pub trait LifecycleRepository: Send + Sync {
    /// Apply `commit` as one unit. Nothing is written when the stored status differs from
    /// `commit.expected` (`Conflict`) or a record the commit edits is missing (`NotFound`).
    fn commit_transition(&self, commit: TransitionCommit) -> Result<Student, RepositoryError>;
}

pub trait CompanyDirectory: Send + Sync {
    /// All partnered companies sorted by name.
    fn companies(&self) -> Result<Vec<PartneredCompany>, RepositoryError>;
    fn fetch_company(&self, id: &CompanyId) -> Result<Option<PartneredCompany>, RepositoryError>;
    /// Create-if-absent keyed on the case-insensitive name. Returns the stored entry and
    /// whether this call created it.
    fn register_company(
        &self,
        company: NewCompany,
    ) -> Result<(PartneredCompany, bool), RepositoryError>;
}

pub trait SubmissionRepository: Send + Sync {
    fn fetch_submission(&self, id: &SubmissionId) -> Result<Option<Submission>, RepositoryError>;
    fn insert_submission(&self, submission: Submission) -> Result<Submission, RepositoryError>;
    /// Write exactly one grade slot, leaving the sibling slot untouched.
    fn write_grade(
        &self,
        id: &SubmissionId,
        slot: GradeSlot,
        grade: Grade,
    ) -> Result<Submission, RepositoryError>;
}

pub trait StaffDirectory: Send + Sync {
    fn fetch_staff(&self, id: &FacultyId) -> Result<Option<StaffAccount>, RepositoryError>;
}

/// Every storage seam the internship service reads or writes through.
pub trait InternshipStore:
    StudentRepository
    + ApplicationRepository
    + AgreementRepository
    + LifecycleRepository
    + CompanyDirectory
    + SubmissionRepository
    + StaffDirectory
{
}

impl<T> InternshipStore for T where
    T: StudentRepository
        + ApplicationRepository
        + AgreementRepository
        + LifecycleRepository
        + CompanyDirectory
        + SubmissionRepository
        + StaffDirectory
{
}
