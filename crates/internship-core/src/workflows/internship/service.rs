use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::config::InternshipConfig;
use super::domain::{
    ActorRole, Agreement, AgreementDraft, AgreementId, AgreementStatus, Application,
    ApplicationDraft, ApplicationStatus, CompanyId, FacultyId, Grade, InternshipCategory,
    InternshipStatus, PartneredCompany, PlacementFields, Student, StudentId, Submission,
    SubmissionId, SubmissionStatus, NOT_AVAILABLE,
};
use super::error::InternshipError;
use super::grading::{derive_submission_status, GradeInput, GradeSlot, SubmissionView};
use super::lifecycle::{
    ApprovalGate, PipelineStage, TransitionAction, TransitionDecision, TransitionSnapshot,
    TransitionTable,
};
use super::placement::{self, directory, PlacementProposal, PlacementSources};
use super::repository::{
    AgreementWrite, ApplicationWrite, InternshipStore, RepositoryError, StatusUpdate,
    TransitionCommit,
};
use super::supervisor::{self, SupervisorAssignment};

/// Result of an explicit quick-register request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickRegistration {
    pub company: PartneredCompany,
    /// False when the company already existed, e.g. a concurrent registration won.
    pub created: bool,
    pub proposal: PlacementProposal,
}

/// Facade composing the approval gate, grading reconciler, placement engine, and
/// supervisor assignment over a shared document store.
pub struct InternshipService<S> {
    store: Arc<S>,
    gate: ApprovalGate,
    config: InternshipConfig,
}

impl<S> InternshipService<S>
where
    S: InternshipStore + 'static,
{
    pub fn new(store: Arc<S>, config: InternshipConfig) -> Self {
        let gate = ApprovalGate::new(TransitionTable::standard(), config.legacy_category);
        Self {
            store,
            gate,
            config,
        }
    }

    pub fn config(&self) -> &InternshipConfig {
        &self.config
    }

    /// Display pipeline derived from the transition table.
    pub fn pipeline(&self) -> Vec<PipelineStage> {
        self.gate.table().pipeline()
    }

    pub fn student(&self, student_id: &StudentId) -> Result<Student, InternshipError> {
        self.store
            .fetch_student(student_id)?
            .ok_or_else(|| InternshipError::not_found("student", &student_id.0))
    }

    fn latest_application(&self, student_id: &StudentId) -> Result<Application, InternshipError> {
        self.store
            .latest_application(student_id)?
            .ok_or_else(|| InternshipError::not_found("application", &student_id.0))
    }

    fn snapshot(&self, student: &Student) -> Result<TransitionSnapshot, InternshipError> {
        let application = self.store.latest_application(&student.id)?;
        let agreement = self.store.agreement_for(&student.id)?;
        Ok(TransitionSnapshot::capture(
            student,
            application.as_ref(),
            agreement.as_ref(),
        ))
    }

    /// Validate a transition against the current state without writing anything.
    pub fn evaluate_transition(
        &self,
        student_id: &StudentId,
        action: TransitionAction,
        actor: ActorRole,
    ) -> Result<TransitionDecision, InternshipError> {
        let student = self.student(student_id)?;
        let snapshot = self.snapshot(&student)?;
        self.gate
            .request_transition(&snapshot, action, actor)
            .inspect_err(|err| {
                warn!(
                    student = %student_id.0,
                    %action,
                    %actor,
                    kind = err.kind(),
                    "transition refused"
                );
            })
    }

    /// Validate and commit a transition in one call.
    pub fn request_transition(
        &self,
        student_id: &StudentId,
        action: TransitionAction,
        actor: ActorRole,
    ) -> Result<Student, InternshipError> {
        let decision = self.evaluate_transition(student_id, action, actor)?;
        self.commit_transition(&decision)
    }

    /// Write a validated decision, guarded on the status it was computed against.
    pub fn commit_transition(
        &self,
        decision: &TransitionDecision,
    ) -> Result<Student, InternshipError> {
        self.commit_with(decision, None, None)
    }

    /// Commit the status change and every record write it implies as one store operation.
    /// Explicit writes take the place of the plain status mirror for their record.
    fn commit_with(
        &self,
        decision: &TransitionDecision,
        application: Option<ApplicationWrite>,
        agreement: Option<AgreementWrite>,
    ) -> Result<Student, InternshipError> {
        let (application_status, agreement_status) = mirrored_statuses(decision);

        let application = match (application, application_status) {
            (Some(write), _) => Some(write),
            (None, Some(status)) => {
                self.latest_application(&decision.student_id)?;
                Some(ApplicationWrite::Status(status))
            }
            (None, None) => None,
        };
        let agreement = match (agreement, agreement_status) {
            (Some(write), _) => Some(write),
            (None, Some(status)) => {
                if self.store.agreement_for(&decision.student_id)?.is_none() {
                    return Err(InternshipError::not_found(
                        "agreement",
                        &decision.student_id.0,
                    ));
                }
                Some(AgreementWrite::Status(status))
            }
            (None, None) => None,
        };

        let commit = TransitionCommit {
            student_id: decision.student_id.clone(),
            expected: decision.from,
            update: StatusUpdate {
                status: decision.to,
                category: decision.category,
            },
            application,
            agreement,
        };

        let student = self
            .store
            .commit_transition(commit)
            .map_err(|err| match err {
                RepositoryError::Conflict => {
                    warn!(
                        student = %decision.student_id.0,
                        action = %decision.action,
                        expected = %decision.from,
                        "transition lost a concurrent update"
                    );
                    InternshipError::Conflict {
                        entity: "student",
                        id: decision.student_id.0.clone(),
                        expected: format!("status {}", decision.from),
                    }
                }
                RepositoryError::NotFound => {
                    InternshipError::not_found("student", &decision.student_id.0)
                }
                other => InternshipError::Repository(other),
            })?;

        info!(
            student = %decision.student_id.0,
            action = %decision.action,
            actor = %decision.actor,
            from = %decision.from,
            to = %decision.to,
            "internship transition committed"
        );

        Ok(student)
    }

    /// File a first application and move the student to `submitted`.
    pub fn submit_application(
        &self,
        student_id: &StudentId,
        draft: ApplicationDraft,
    ) -> Result<(Student, Application), InternshipError> {
        let student = self.student(student_id)?;
        let mut snapshot = self.snapshot(&student)?;
        snapshot.application_status = Some(ApplicationStatus::Submitted);
        snapshot.application_category = draft.internship_category;
        let decision =
            self.gate
                .request_transition(&snapshot, TransitionAction::Submit, ActorRole::Student)?;

        let now = Utc::now();
        let mut application = Application {
            id: self.store.next_application_id(),
            student_id: student_id.clone(),
            status: ApplicationStatus::Submitted,
            company_name: None,
            position: None,
            internship_category: None,
            self_found_supervisor: None,
            submitted_at: now,
            updated_at: now,
        };
        application.apply_draft(draft, now);

        let write = ApplicationWrite::Insert(application.clone());
        let student = self.commit_with(&decision, Some(write), None)?;
        Ok((student, application))
    }

    /// Edit the rejected application in place and return the student to `submitted`.
    pub fn resubmit_application(
        &self,
        student_id: &StudentId,
        draft: ApplicationDraft,
    ) -> Result<(Student, Application), InternshipError> {
        let student = self.student(student_id)?;
        let mut application = self.latest_application(student_id)?;
        let agreement = self.store.agreement_for(student_id)?;
        let snapshot =
            TransitionSnapshot::capture(&student, Some(&application), agreement.as_ref());
        let decision = self.gate.request_transition(
            &snapshot,
            TransitionAction::Resubmit,
            ActorRole::Student,
        )?;

        application.apply_draft(draft, Utc::now());
        application.status = ApplicationStatus::Submitted;

        let write = ApplicationWrite::Replace(application.clone());
        let student = self.commit_with(&decision, Some(write), None)?;
        Ok((student, application))
    }

    /// File (or re-file) the agreement for a self-sourced internship.
    pub fn submit_agreement(
        &self,
        student_id: &StudentId,
        draft: AgreementDraft,
    ) -> Result<(Student, Agreement), InternshipError> {
        let student = self.student(student_id)?;
        let application = self.latest_application(student_id)?;
        let existing = self.store.agreement_for(student_id)?;

        let mut snapshot =
            TransitionSnapshot::capture(&student, Some(&application), existing.as_ref());
        snapshot
            .agreement_status
            .get_or_insert(AgreementStatus::Pending);
        let decision = self.gate.request_transition(
            &snapshot,
            TransitionAction::SubmitAgreement,
            ActorRole::Student,
        )?;

        let agreement_id = match existing {
            Some(agreement) => agreement.id,
            None => self.store.next_agreement_id(),
        };
        let agreement = build_agreement(agreement_id, &application, draft)?;

        let write = AgreementWrite::Upsert(agreement.clone());
        let student = self.commit_with(&decision, None, Some(write))?;
        Ok((student, agreement))
    }

    /// Set the category of a legacy student who predates the category field.
    pub fn categorize_student(
        &self,
        student_id: &StudentId,
        category: InternshipCategory,
        actor: ActorRole,
    ) -> Result<Student, InternshipError> {
        if !actor.is_administrative() {
            return Err(InternshipError::Unauthorized {
                role: actor,
                operation: "categorize students".to_string(),
            });
        }

        let student = self.student(student_id)?;
        if let Some(current) = student.internship_category {
            return Err(InternshipError::validation(format!(
                "student '{}' is already categorized as {current}",
                student_id.0
            )));
        }
        if !category.is_self_sourced() && self.store.agreement_for(student_id)?.is_some() {
            return Err(InternshipError::validation(
                "students with an agreement on file must be categorized as self-sourced",
            ));
        }

        let student = self.store.set_category(student_id, category)?;
        info!(student = %student_id.0, %category, "legacy student categorized");
        Ok(student)
    }

    pub fn submission(&self, submission_id: &SubmissionId) -> Result<SubmissionView, InternshipError> {
        let submission = self
            .store
            .fetch_submission(submission_id)?
            .ok_or_else(|| InternshipError::not_found("submission", &submission_id.0))?;
        Ok(submission.into())
    }

    pub fn derive_submission_status(&self, submission: &Submission) -> SubmissionStatus {
        derive_submission_status(submission)
    }

    /// Write the grader's own slot and return the submission with its recomputed status.
    pub fn grade_submission(
        &self,
        submission_id: &SubmissionId,
        actor: ActorRole,
        actor_id: &str,
        input: GradeInput,
    ) -> Result<SubmissionView, InternshipError> {
        let slot = GradeSlot::for_role(actor).ok_or_else(|| InternshipError::Unauthorized {
            role: actor,
            operation: "grade submissions".to_string(),
        })?;

        if input.marks > self.config.max_marks {
            return Err(InternshipError::validation(format!(
                "marks {} exceed the maximum of {}",
                input.marks, self.config.max_marks
            )));
        }

        let submission = self
            .store
            .fetch_submission(submission_id)?
            .ok_or_else(|| InternshipError::not_found("submission", &submission_id.0))?;

        if slot == GradeSlot::Faculty {
            let student = self.student(&submission.student_id)?;
            if !supervisor::is_supervisor_of(&student, &FacultyId(actor_id.to_string())) {
                return Err(InternshipError::Unauthorized {
                    role: actor,
                    operation: format!(
                        "grade submissions of student '{}' they do not supervise",
                        student.id.0
                    ),
                });
            }
        }

        let grade = Grade {
            marks: Some(input.marks),
            feedback: input.feedback,
            graded_at: Utc::now(),
        };
        let updated = self
            .store
            .write_grade(submission_id, slot, grade)
            .map_err(|err| match err {
                RepositoryError::NotFound => {
                    InternshipError::not_found("submission", &submission_id.0)
                }
                other => InternshipError::Repository(other),
            })?;

        let view = SubmissionView::from(updated);
        info!(
            submission = %submission_id.0,
            slot = slot.as_str(),
            grader = actor_id,
            status = view.status.label(),
            "submission graded"
        );
        Ok(view)
    }

    fn load_sources(
        &self,
        student_id: &StudentId,
    ) -> Result<(Application, Option<Agreement>, Vec<PartneredCompany>), InternshipError> {
        self.student(student_id)?;
        let application = self.latest_application(student_id)?;
        let agreement = self.store.agreement_for(student_id)?;
        let directory = self.store.companies()?;
        Ok((application, agreement, directory))
    }

    /// Propose placement fields for the student. Read-only.
    pub fn reconcile_placement(
        &self,
        student_id: &StudentId,
    ) -> Result<PlacementProposal, InternshipError> {
        let (application, agreement, directory) = self.load_sources(student_id)?;
        Ok(placement::reconcile(PlacementSources {
            application: &application,
            agreement: agreement.as_ref(),
            directory: &directory,
        }))
    }

    /// Register the application's company in the directory if no entry matches, then
    /// reconcile again against the updated directory.
    pub fn quick_register(
        &self,
        student_id: &StudentId,
    ) -> Result<QuickRegistration, InternshipError> {
        let (application, agreement, directory) = self.load_sources(student_id)?;
        let sources = PlacementSources {
            application: &application,
            agreement: agreement.as_ref(),
            directory: &directory,
        };

        if let Some(existing) =
            directory::find_by_name(&directory, application.company_name.as_deref())
        {
            return Ok(QuickRegistration {
                company: existing.clone(),
                created: false,
                proposal: placement::reconcile(sources),
            });
        }

        let new_company = directory::registration_from(&application, agreement.as_ref())?;
        let (company, created) = self.store.register_company(new_company)?;
        if created {
            info!(student = %student_id.0, company = %company.name, "company quick-registered");
        }

        let proposal = self.reconcile_placement(student_id)?;
        if proposal.needs_registration {
            return Err(InternshipError::validation(format!(
                "registered company '{}' still does not match the application",
                company.name
            )));
        }

        Ok(QuickRegistration {
            company,
            created,
            proposal,
        })
    }

    /// Recompute the placement against a company chosen by an admin.
    pub fn apply_partnered_company(
        &self,
        student_id: &StudentId,
        company_id: &CompanyId,
    ) -> Result<PlacementProposal, InternshipError> {
        self.student(student_id)?;
        let company = self
            .store
            .fetch_company(company_id)?
            .ok_or_else(|| InternshipError::not_found("company", &company_id.0))?;
        let application = self.latest_application(student_id)?;
        let agreement = self.store.agreement_for(student_id)?;
        Ok(placement::apply_company(
            &company,
            &application,
            agreement.as_ref(),
        ))
    }

    /// Write accepted placement fields onto the student.
    pub fn commit_placement(
        &self,
        student_id: &StudentId,
        fields: PlacementFields,
    ) -> Result<Student, InternshipError> {
        let student = self.student(student_id)?;
        if !student.internship_status.accepts_placement() {
            return Err(InternshipError::validation(format!(
                "placement can only be committed once the internship is verified (status is {})",
                student.internship_status
            )));
        }

        let company = fields.assigned_company.trim();
        if company.is_empty() || company == NOT_AVAILABLE {
            return Err(InternshipError::validation(
                "assigned company is required to commit a placement",
            ));
        }

        let expected = student.internship_status;
        let student = self
            .store
            .write_placement(student_id, expected, fields)
            .map_err(|err| match err {
                RepositoryError::Conflict => InternshipError::Conflict {
                    entity: "student",
                    id: student_id.0.clone(),
                    expected: format!("status {expected}"),
                },
                other => InternshipError::Repository(other),
            })?;

        info!(student = %student_id.0, "placement committed");
        Ok(student)
    }

    /// Point the student at a new faculty supervisor. The lifecycle status is untouched.
    pub fn assign_supervisor(
        &self,
        student_id: &StudentId,
        faculty_id: &FacultyId,
    ) -> Result<SupervisorAssignment, InternshipError> {
        let account = self
            .store
            .fetch_staff(faculty_id)?
            .ok_or_else(|| InternshipError::not_found("faculty", &faculty_id.0))?;
        supervisor::ensure_faculty(&account)?;
        self.student(student_id)?;

        let previous = self
            .store
            .set_supervisor(student_id, faculty_id.clone())
            .map_err(|err| match err {
                RepositoryError::NotFound => InternshipError::not_found("student", &student_id.0),
                other => InternshipError::Repository(other),
            })?;

        let assignment = SupervisorAssignment {
            student_id: student_id.clone(),
            previous,
            current: faculty_id.clone(),
        };
        if assignment.changed() {
            info!(
                student = %student_id.0,
                previous = ?assignment.previous.as_ref().map(|id| id.0.as_str()),
                current = %faculty_id.0,
                "supervisor reassigned"
            );
        }
        Ok(assignment)
    }

    pub fn is_supervisor_of(
        &self,
        student_id: &StudentId,
        faculty_id: &FacultyId,
    ) -> Result<bool, InternshipError> {
        let student = self.student(student_id)?;
        Ok(supervisor::is_supervisor_of(&student, faculty_id))
    }
}

/// Record statuses that follow a status change when the caller supplies no explicit write.
fn mirrored_statuses(
    decision: &TransitionDecision,
) -> (Option<ApplicationStatus>, Option<AgreementStatus>) {
    use InternshipStatus as Status;
    use TransitionAction as Action;

    let application = match (decision.action, decision.from) {
        (Action::Approve, _) => Some(ApplicationStatus::Approved),
        (Action::Reject, Status::Submitted) => Some(ApplicationStatus::Rejected),
        (Action::Resubmit, _) | (Action::Submit, _) => Some(ApplicationStatus::Submitted),
        _ => None,
    };
    let agreement = match (decision.action, decision.from) {
        (Action::SubmitAgreement, _) => Some(AgreementStatus::Pending),
        (Action::Verify, Status::AgreementSubmitted) => Some(AgreementStatus::Verified),
        (Action::Reject, Status::AgreementSubmitted) => Some(AgreementStatus::Rejected),
        _ => None,
    };
    (application, agreement)
}

fn build_agreement(
    id: AgreementId,
    application: &Application,
    draft: AgreementDraft,
) -> Result<Agreement, InternshipError> {
    let declared = application.self_found_supervisor.clone().unwrap_or_default();
    let pick = |value: Option<String>, fallback: Option<String>| {
        value
            .filter(|value| !value.trim().is_empty())
            .or(fallback.filter(|value| !value.trim().is_empty()))
    };

    let student_phone = pick(draft.student_phone, None);
    let student_address = pick(draft.student_address, None);
    let supervisor_name = pick(draft.supervisor_name, declared.name);
    let supervisor_email = pick(draft.supervisor_email, declared.email);
    let supervisor_phone = pick(draft.supervisor_phone, declared.phone);
    let company_address = pick(draft.company_address, declared.company_address);

    let mut missing = Vec::new();
    if student_phone.is_none() {
        missing.push("student_phone");
    }
    if student_address.is_none() {
        missing.push("student_address");
    }
    if supervisor_name.is_none() {
        missing.push("supervisor_name");
    }
    if supervisor_email.is_none() {
        missing.push("supervisor_email");
    }
    if !missing.is_empty() {
        return Err(InternshipError::validation(format!(
            "agreement is missing required fields: {}",
            missing.join(", ")
        )));
    }

    Ok(Agreement {
        id,
        student_id: application.student_id.clone(),
        status: AgreementStatus::Pending,
        student_phone: student_phone.unwrap_or_default(),
        student_address: student_address.unwrap_or_default(),
        supervisor_name,
        supervisor_email,
        supervisor_phone,
        company_address,
        submitted_at: Utc::now(),
    })
}
