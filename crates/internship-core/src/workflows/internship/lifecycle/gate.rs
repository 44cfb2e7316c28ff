use serde::Serialize;

use super::super::config::LegacyCategoryPolicy;
use super::super::domain::{
    ActorRole, Agreement, AgreementStatus, Application, ApplicationStatus, InternshipCategory,
    InternshipStatus, Student, StudentId,
};
use super::super::error::InternshipError;
use super::table::{Precondition, TransitionAction, TransitionEdge, TransitionTable};

/// Read-only view of everything the gate needs to judge a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionSnapshot {
    pub student_id: StudentId,
    pub status: InternshipStatus,
    pub category: Option<InternshipCategory>,
    pub application_status: Option<ApplicationStatus>,
    pub application_category: Option<InternshipCategory>,
    pub agreement_status: Option<AgreementStatus>,
    pub placement_committed: bool,
}

impl TransitionSnapshot {
    pub fn capture(
        student: &Student,
        application: Option<&Application>,
        agreement: Option<&Agreement>,
    ) -> Self {
        Self {
            student_id: student.id.clone(),
            status: student.internship_status,
            category: student.internship_category,
            application_status: application.map(|application| application.status),
            application_category: application.and_then(|application| application.internship_category),
            agreement_status: agreement.map(|agreement| agreement.status),
            placement_committed: student.placement.is_some(),
        }
    }
}

/// Validated transition, ready to be committed with a conditional write on `from`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionDecision {
    pub student_id: StudentId,
    pub action: TransitionAction,
    pub actor: ActorRole,
    pub from: InternshipStatus,
    pub to: InternshipStatus,
    /// Category to record on the student alongside the status write.
    pub category: Option<InternshipCategory>,
}

/// Validates requested transitions against the table. Never writes.
#[derive(Debug, Clone)]
pub struct ApprovalGate {
    table: TransitionTable,
    legacy_category: LegacyCategoryPolicy,
}

impl ApprovalGate {
    pub fn new(table: TransitionTable, legacy_category: LegacyCategoryPolicy) -> Self {
        Self {
            table,
            legacy_category,
        }
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    pub fn request_transition(
        &self,
        snapshot: &TransitionSnapshot,
        action: TransitionAction,
        actor: ActorRole,
    ) -> Result<TransitionDecision, InternshipError> {
        let edge = self.table.lookup(snapshot.status, action).ok_or_else(|| {
            InternshipError::InvalidTransition {
                from: snapshot.status,
                action,
                detail: "no such transition from the current status".to_string(),
            }
        })?;

        if !edge.allows(actor) {
            return Err(InternshipError::Unauthorized {
                role: actor,
                operation: format!("{action} an internship in status {}", snapshot.status),
            });
        }

        for precondition in edge.preconditions {
            self.check(edge, *precondition, snapshot)?;
        }

        // Approval records the category declared on the application; rejections leave it alone.
        let category = match action {
            TransitionAction::Approve => snapshot.application_category.or(snapshot.category),
            _ => None,
        };

        Ok(TransitionDecision {
            student_id: snapshot.student_id.clone(),
            action,
            actor,
            from: edge.from,
            to: edge.to,
            category,
        })
    }

    fn check(
        &self,
        edge: &TransitionEdge,
        precondition: Precondition,
        snapshot: &TransitionSnapshot,
    ) -> Result<(), InternshipError> {
        let invalid = |detail: &str| InternshipError::InvalidTransition {
            from: edge.from,
            action: edge.action,
            detail: detail.to_string(),
        };

        match precondition {
            Precondition::ApplicationOnFile => {
                if snapshot.application_status.is_none() {
                    return Err(InternshipError::validation(
                        "an application must be on file before submitting",
                    ));
                }
            }
            Precondition::ApplicationRejected => {
                if snapshot.application_status != Some(ApplicationStatus::Rejected) {
                    return Err(invalid(
                        "the rejection concerns the agreement; resubmit the agreement instead",
                    ));
                }
            }
            Precondition::AgreementOnFile => {
                if snapshot.agreement_status.is_none() {
                    return Err(InternshipError::validation(
                        "an agreement must be on file before submitting it for verification",
                    ));
                }
            }
            Precondition::AgreementRejected => {
                if snapshot.agreement_status != Some(AgreementStatus::Rejected) {
                    return Err(invalid(
                        "the rejection concerns the application; resubmit the application instead",
                    ));
                }
            }
            Precondition::SelfSourcedCategory => {
                if !self.effective_category(snapshot)?.is_self_sourced() {
                    return Err(invalid(
                        "university-assigned internships do not go through the agreement stage",
                    ));
                }
            }
            Precondition::UniversityAssignedCategory => {
                if self.effective_category(snapshot)? != InternshipCategory::UniversityAssigned {
                    return Err(invalid(
                        "self-sourced internships must submit an agreement before verification",
                    ));
                }
            }
            Precondition::PlacementCommitted => {
                if !snapshot.placement_committed {
                    return Err(InternshipError::validation(
                        "placement details must be committed before assigning the internship",
                    ));
                }
            }
        }

        Ok(())
    }

    fn effective_category(
        &self,
        snapshot: &TransitionSnapshot,
    ) -> Result<InternshipCategory, InternshipError> {
        match (snapshot.category, self.legacy_category) {
            (Some(category), _) => Ok(category),
            (None, LegacyCategoryPolicy::TreatAsSelfFound) => Ok(InternshipCategory::SelfFound),
            (None, LegacyCategoryPolicy::RequireCategorization) => {
                Err(InternshipError::validation(format!(
                    "student '{}' has no internship category; an admin must categorize them first",
                    snapshot.student_id.0
                )))
            }
        }
    }
}
