use serde::Serialize;

use super::domain::{ActorRole, FacultyId, StaffAccount, Student, StudentId};
use super::error::InternshipError;

/// Outcome of a supervisor reassignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupervisorAssignment {
    pub student_id: StudentId,
    pub previous: Option<FacultyId>,
    pub current: FacultyId,
}

impl SupervisorAssignment {
    pub fn changed(&self) -> bool {
        self.previous.as_ref() != Some(&self.current)
    }
}

/// Only faculty accounts may supervise students.
pub fn ensure_faculty(account: &StaffAccount) -> Result<(), InternshipError> {
    if account.role == ActorRole::Admin {
        Ok(())
    } else {
        Err(InternshipError::validation(format!(
            "account '{}' has role {} and cannot supervise students",
            account.id.0, account.role
        )))
    }
}

/// Authorization predicate for faculty grading and report issuing.
pub fn is_supervisor_of(student: &Student, faculty_id: &FacultyId) -> bool {
    student.supervisor_id.as_ref() == Some(faculty_id)
}
