use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder the company directory stores for unknown contact details.
pub const CONTACT_PLACEHOLDER: &str = "—";

/// Fallback written into placement fields when no source supplies a value.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StudentId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgreementId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompanyId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub String);

/// Identifier of a staff account; faculty supervisors are referenced through it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FacultyId(pub String);

/// Lifecycle stage of a student's internship.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum InternshipStatus {
    #[default]
    None,
    Submitted,
    Approved,
    Rejected,
    AgreementSubmitted,
    Verified,
    InternshipAssigned,
}

impl InternshipStatus {
    pub const fn all() -> [Self; 7] {
        [
            Self::None,
            Self::Submitted,
            Self::Approved,
            Self::Rejected,
            Self::AgreementSubmitted,
            Self::Verified,
            Self::InternshipAssigned,
        ]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::AgreementSubmitted => "agreement_submitted",
            Self::Verified => "verified",
            Self::InternshipAssigned => "internship_assigned",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "Not Started",
            Self::Submitted => "Request Submitted",
            Self::Approved => "Request Approved",
            Self::Rejected => "Rejected",
            Self::AgreementSubmitted => "Agreement Submitted",
            Self::Verified => "Verified",
            Self::InternshipAssigned => "Internship Assigned",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::InternshipAssigned)
    }

    /// Stages from which placement fields may be written.
    pub const fn accepts_placement(self) -> bool {
        matches!(self, Self::Verified | Self::InternshipAssigned)
    }
}

impl fmt::Display for InternshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the internship was sourced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InternshipCategory {
    UniversityAssigned,
    SelfFound,
    Freelancer,
}

impl InternshipCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UniversityAssigned => "university_assigned",
            Self::SelfFound => "self_found",
            Self::Freelancer => "freelancer",
        }
    }

    /// Self-sourced placements go through the agreement stage.
    pub const fn is_self_sourced(self) -> bool {
        matches!(self, Self::SelfFound | Self::Freelancer)
    }
}

impl fmt::Display for InternshipCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of actor roles. Faculty supervisors hold `Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Student,
    CompanyAdmin,
    Admin,
    SuperAdmin,
}

impl ActorRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::CompanyAdmin => "company_admin",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }

    pub const fn is_administrative(self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Submitted,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgreementStatus {
    Pending,
    Verified,
    Rejected,
}

/// The five placement fields written onto a student once the internship is verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementFields {
    pub assigned_company: String,
    pub assigned_position: String,
    pub site_supervisor_name: String,
    pub site_supervisor_email: String,
    pub site_supervisor_phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub internship_status: InternshipStatus,
    #[serde(default)]
    pub internship_category: Option<InternshipCategory>,
    #[serde(default)]
    pub supervisor_id: Option<FacultyId>,
    #[serde(default)]
    pub placement: Option<PlacementFields>,
}

impl Student {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: StudentId(id.into()),
            name: name.into(),
            email: email.into(),
            internship_status: InternshipStatus::None,
            internship_category: None,
            supervisor_id: None,
            placement: None,
        }
    }
}

/// Supervisor details a student enters for a self-found internship.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisorContact {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub designation: Option<String>,
    pub company_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub student_id: StudentId,
    pub status: ApplicationStatus,
    pub company_name: Option<String>,
    pub position: Option<String>,
    pub internship_category: Option<InternshipCategory>,
    pub self_found_supervisor: Option<SupervisorContact>,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    /// Apply a student's edits in place; fields left out of the draft keep their value.
    pub fn apply_draft(&mut self, draft: ApplicationDraft, now: DateTime<Utc>) {
        if draft.company_name.is_some() {
            self.company_name = draft.company_name;
        }
        if draft.position.is_some() {
            self.position = draft.position;
        }
        if draft.internship_category.is_some() {
            self.internship_category = draft.internship_category;
        }
        if draft.self_found_supervisor.is_some() {
            self.self_found_supervisor = draft.self_found_supervisor;
        }
        self.updated_at = now;
    }
}

/// Student-provided application form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDraft {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub internship_category: Option<InternshipCategory>,
    #[serde(default)]
    pub self_found_supervisor: Option<SupervisorContact>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agreement {
    pub id: AgreementId,
    pub student_id: StudentId,
    pub status: AgreementStatus,
    pub student_phone: String,
    pub student_address: String,
    pub supervisor_name: Option<String>,
    pub supervisor_email: Option<String>,
    pub supervisor_phone: Option<String>,
    pub company_address: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

/// Student-provided agreement form. Supervisor fields may be omitted and are then
/// derived from the application's self-found supervisor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgreementDraft {
    #[serde(default)]
    pub student_phone: Option<String>,
    #[serde(default)]
    pub student_address: Option<String>,
    #[serde(default)]
    pub supervisor_name: Option<String>,
    #[serde(default)]
    pub supervisor_email: Option<String>,
    #[serde(default)]
    pub supervisor_phone: Option<String>,
    #[serde(default)]
    pub company_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRepresentative {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartneredCompany {
    pub id: CompanyId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    #[serde(default)]
    pub supervisors: Vec<CompanyRepresentative>,
}

/// Directory entry awaiting an identifier from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCompany {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    #[serde(default)]
    pub supervisors: Vec<CompanyRepresentative>,
}

impl NewCompany {
    pub fn with_id(self, id: CompanyId) -> PartneredCompany {
        PartneredCompany {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            supervisors: self.supervisors,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
    pub marks: Option<u16>,
    #[serde(default)]
    pub feedback: Option<String>,
    pub graded_at: DateTime<Utc>,
}

impl Grade {
    pub fn is_present(&self) -> bool {
        self.marks.is_some()
    }
}

/// Task work submitted by a student; the status is derived from the two grade slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub student_id: StudentId,
    pub task_id: TaskId,
    #[serde(default)]
    pub company_grade: Option<Grade>,
    #[serde(default)]
    pub faculty_grade: Option<Grade>,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Submitted,
    GradedByCompany,
    GradedByFaculty,
    FullyGraded,
}

impl SubmissionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::GradedByCompany => "graded_by_company",
            Self::GradedByFaculty => "graded_by_faculty",
            Self::FullyGraded => "fully_graded",
        }
    }
}

/// Staff account as resolved by the identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffAccount {
    pub id: FacultyId,
    pub name: String,
    pub email: String,
    pub role: ActorRole,
}
