use serde::{Deserialize, Serialize};

use super::domain::{ActorRole, Grade, Submission, SubmissionStatus};

/// One of the two independently owned grade slots on a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeSlot {
    Company,
    Faculty,
}

impl GradeSlot {
    /// The slot a role owns; roles that do not grade own none.
    pub const fn for_role(role: ActorRole) -> Option<Self> {
        match role {
            ActorRole::CompanyAdmin => Some(Self::Company),
            ActorRole::Admin => Some(Self::Faculty),
            ActorRole::Student | ActorRole::SuperAdmin => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::Faculty => "faculty",
        }
    }

    pub fn read(self, submission: &Submission) -> Option<&Grade> {
        match self {
            Self::Company => submission.company_grade.as_ref(),
            Self::Faculty => submission.faculty_grade.as_ref(),
        }
    }

    /// Replace this slot only; the sibling slot is never touched.
    pub fn write(self, submission: &mut Submission, grade: Grade) {
        match self {
            Self::Company => submission.company_grade = Some(grade),
            Self::Faculty => submission.faculty_grade = Some(grade),
        }
    }
}

/// Marks and feedback supplied by a grader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeInput {
    pub marks: u16,
    #[serde(default)]
    pub feedback: Option<String>,
}

pub fn derive_status(company: Option<&Grade>, faculty: Option<&Grade>) -> SubmissionStatus {
    let company = company.is_some_and(Grade::is_present);
    let faculty = faculty.is_some_and(Grade::is_present);

    match (company, faculty) {
        (false, false) => SubmissionStatus::Submitted,
        (true, false) => SubmissionStatus::GradedByCompany,
        (false, true) => SubmissionStatus::GradedByFaculty,
        (true, true) => SubmissionStatus::FullyGraded,
    }
}

pub fn derive_submission_status(submission: &Submission) -> SubmissionStatus {
    derive_status(
        submission.company_grade.as_ref(),
        submission.faculty_grade.as_ref(),
    )
}

/// Submission paired with its derived status for callers and API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionView {
    #[serde(flatten)]
    pub submission: Submission,
    pub status: SubmissionStatus,
}

impl From<Submission> for SubmissionView {
    fn from(submission: Submission) -> Self {
        let status = derive_submission_status(&submission);
        Self { submission, status }
    }
}
