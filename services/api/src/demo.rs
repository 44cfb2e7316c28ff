use chrono::Utc;
use clap::Args;
use internship_core::error::AppError;
use internship_core::workflows::internship::domain::{
    AgreementDraft, ApplicationDraft, FacultyId, NewCompany, StaffAccount, Submission,
    SubmissionId, SupervisorContact, TaskId, CONTACT_PLACEHOLDER,
};
use internship_core::workflows::internship::repository::SubmissionRepository;
use internship_core::workflows::internship::{
    ActorRole, GradeInput, InMemoryStore, InternshipCategory, InternshipConfig, InternshipError,
    InternshipService, PlacementSource, Student, StudentId, TransitionAction,
};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Follow the university-assigned path, which skips the agreement stage.
    #[arg(long)]
    pub(crate) university_assigned: bool,
    /// Skip the dual-grading portion of the demo.
    #[arg(long)]
    pub(crate) skip_grading: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        university_assigned,
        skip_grading,
    } = args;

    let store = Arc::new(InMemoryStore::new());
    let student_id = seed_demo_records(&store)?;
    let faculty_id = FacultyId("fac-rahman".to_string());
    let service = InternshipService::new(store.clone(), InternshipConfig::default());

    println!("Internship lifecycle demo");
    println!("Pipeline:");
    for stage in service.pipeline() {
        println!("  {}. {} ({})", stage.position, stage.label, stage.status);
    }

    let category = if university_assigned {
        InternshipCategory::UniversityAssigned
    } else {
        InternshipCategory::SelfFound
    };

    let (student, application) = service.submit_application(
        &student_id,
        ApplicationDraft {
            company_name: Some("BrightPath Labs".to_string()),
            position: Some("Backend Intern".to_string()),
            internship_category: Some(category),
            self_found_supervisor: category.is_self_sourced().then(|| SupervisorContact {
                name: Some("Farhan Kabir".to_string()),
                email: Some("farhan@brightpath.example".to_string()),
                phone: Some("+880 1811 222333".to_string()),
                designation: Some("Engineering Manager".to_string()),
                company_address: Some("44 Banani Road".to_string()),
            }),
        },
    )?;
    println!(
        "\n- Application {} filed ({category}) -> {}",
        application.id.0,
        student.internship_status.label()
    );

    let refused =
        service.request_transition(&student_id, TransitionAction::Approve, ActorRole::Student);
    if let Err(err) = refused {
        println!("- Student self-approval refused: {err}");
    }

    let student =
        service.request_transition(&student_id, TransitionAction::Approve, ActorRole::Admin)?;
    println!("- Admin approved -> {}", student.internship_status.label());

    if category.is_self_sourced() {
        let (student, agreement) = service.submit_agreement(
            &student_id,
            AgreementDraft {
                student_phone: Some("+880 1900 111222".to_string()),
                student_address: Some("7 Dhanmondi Lane".to_string()),
                ..AgreementDraft::default()
            },
        )?;
        println!(
            "- Agreement {} filed with supervisor {} -> {}",
            agreement.id.0,
            agreement.supervisor_name.as_deref().unwrap_or("N/A"),
            student.internship_status.label()
        );
    }

    let student =
        service.request_transition(&student_id, TransitionAction::Verify, ActorRole::SuperAdmin)?;
    println!("- Verified -> {}", student.internship_status.label());

    let proposal = service.reconcile_placement(&student_id)?;
    println!(
        "\n- Placement reconciliation: {} (needs registration: {})",
        describe_source(&proposal.source),
        proposal.needs_registration
    );

    let proposal = if proposal.needs_registration {
        let registration = service.quick_register(&student_id)?;
        println!(
            "- Quick-registered {} as {} (created: {})",
            registration.company.name, registration.company.id.0, registration.created
        );
        registration.proposal
    } else {
        proposal
    };
    print_json("  Accepted placement", &proposal)?;

    service.commit_placement(&student_id, proposal.fields)?;
    let student =
        service.request_transition(&student_id, TransitionAction::Assign, ActorRole::Admin)?;
    println!("- Placement committed -> {}", student.internship_status.label());

    let assignment = service.assign_supervisor(&student_id, &faculty_id)?;
    println!(
        "- Supervisor {} assigned (changed: {})",
        assignment.current.0,
        assignment.changed()
    );

    if skip_grading {
        return Ok(());
    }

    println!("\nDual grading");
    let submission_id = SubmissionId("sub-week-1".to_string());
    store
        .insert_submission(Submission {
            id: submission_id.clone(),
            student_id: student_id.clone(),
            task_id: TaskId("task-weekly-report".to_string()),
            company_grade: None,
            faculty_grade: None,
            submitted_at: Utc::now(),
        })
        .map_err(InternshipError::from)?;

    let steps = [
        (ActorRole::CompanyAdmin, "rep-brightpath", 80),
        (ActorRole::Admin, faculty_id.0.as_str(), 90),
        (ActorRole::CompanyAdmin, "rep-brightpath", 85),
    ];
    for (role, grader, marks) in steps {
        let view = service.grade_submission(
            &submission_id,
            role,
            grader,
            GradeInput {
                marks,
                feedback: None,
            },
        )?;
        println!("- {role} graded {marks} -> {}", view.status.label());
    }

    let view = service.submission(&submission_id)?;
    print_json("  Final submission", &view)?;
    Ok(())
}

fn seed_demo_records(store: &InMemoryStore) -> Result<StudentId, AppError> {
    let student = Student::new("stu-ayesha", "Ayesha Siddiqua", "ayesha@uni.example");
    let student_id = student.id.clone();
    store.put_student(student).map_err(InternshipError::from)?;
    store
        .put_staff(StaffAccount {
            id: FacultyId("fac-rahman".to_string()),
            name: "Dr. Rahman".to_string(),
            email: "rahman@uni.example".to_string(),
            role: ActorRole::Admin,
        })
        .map_err(InternshipError::from)?;
    store
        .put_company(NewCompany {
            name: "Orbit Systems".to_string(),
            email: "hello@orbit.example".to_string(),
            phone: CONTACT_PLACEHOLDER.to_string(),
            address: "12 Gulshan Avenue".to_string(),
            supervisors: Vec::new(),
        })
        .map_err(InternshipError::from)?;
    Ok(student_id)
}

fn describe_source(source: &PlacementSource) -> String {
    match source {
        PlacementSource::SmartLink { company_id } => format!("smart link to {}", company_id.0),
        PlacementSource::Override { company_id } => format!("override with {}", company_id.0),
        PlacementSource::Unmatched => "no directory match".to_string(),
    }
}

fn print_json<T: serde::Serialize>(heading: &str, value: &T) -> Result<(), AppError> {
    println!("{heading}:\n{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
