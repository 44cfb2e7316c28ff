use std::sync::Barrier;
use std::thread;

use chrono::Utc;

use super::common::*;
use crate::workflows::internship::domain::{
    Agreement, AgreementDraft, AgreementStatus, Application, ApplicationDraft,
    ApplicationStatus, PlacementFields, Student,
};
use crate::workflows::internship::repository::{
    AgreementRepository, AgreementWrite, ApplicationRepository, ApplicationWrite,
    StatusUpdate, StudentRepository, TransitionCommit,
};
use crate::workflows::internship::{
    ActorRole, InternshipCategory, InternshipConfig, InternshipError, InternshipStatus,
    LegacyCategoryPolicy, StudentId, TransitionAction,
};

fn placement(company: &str) -> PlacementFields {
    PlacementFields {
        assigned_company: company.to_string(),
        assigned_position: "Backend Intern".to_string(),
        site_supervisor_name: "Nadia Islam".to_string(),
        site_supervisor_email: "nadia@orbit.example".to_string(),
        site_supervisor_phone: "+880 1700 000000".to_string(),
    }
}

#[test]
fn university_assigned_student_reaches_assignment_without_agreement() {
    let (service, store) = build_service();
    let student_id = approved_student(
        &service,
        &store,
        "stu-ua",
        "Orbit Systems",
        InternshipCategory::UniversityAssigned,
    );

    let student = service
        .request_transition(&student_id, TransitionAction::Verify, ActorRole::SuperAdmin)
        .expect("verify");
    assert_eq!(student.internship_status, InternshipStatus::Verified);
    assert_eq!(
        student.internship_category,
        Some(InternshipCategory::UniversityAssigned)
    );

    let premature =
        service.request_transition(&student_id, TransitionAction::Assign, ActorRole::Admin);
    assert!(matches!(premature, Err(InternshipError::Validation(_))));

    service
        .commit_placement(&student_id, placement("Orbit Systems"))
        .expect("commit placement");
    let student = service
        .request_transition(&student_id, TransitionAction::Assign, ActorRole::Admin)
        .expect("assign");
    assert_eq!(student.internship_status, InternshipStatus::InternshipAssigned);
}

#[test]
fn self_found_student_goes_through_agreement() {
    let (service, store) = build_service();
    let student_id = approved_student(
        &service,
        &store,
        "stu-sf",
        "BrightPath",
        InternshipCategory::SelfFound,
    );

    let shortcut =
        service.request_transition(&student_id, TransitionAction::Verify, ActorRole::Admin);
    assert!(matches!(
        shortcut,
        Err(InternshipError::InvalidTransition { .. })
    ));

    let (student, agreement) = service
        .submit_agreement(&student_id, agreement_draft())
        .expect("submit agreement");
    assert_eq!(student.internship_status, InternshipStatus::AgreementSubmitted);
    assert_eq!(agreement.status, AgreementStatus::Pending);
    assert_eq!(agreement.supervisor_name.as_deref(), Some("Farhan Kabir"));

    let student = service
        .request_transition(&student_id, TransitionAction::Verify, ActorRole::Admin)
        .expect("verify");
    assert_eq!(student.internship_status, InternshipStatus::Verified);
    let stored = store
        .agreement_for(&student_id)
        .expect("read agreement")
        .expect("agreement on file");
    assert_eq!(stored.status, AgreementStatus::Verified);
}

#[test]
fn direct_jump_to_verified_is_refused() {
    let (service, store) = build_service();
    let student_id = seed_student(&store, "stu-jump");

    let result =
        service.request_transition(&student_id, TransitionAction::Verify, ActorRole::SuperAdmin);
    assert!(matches!(
        result,
        Err(InternshipError::InvalidTransition {
            from: InternshipStatus::None,
            ..
        })
    ));
    assert_eq!(
        service.student(&student_id).expect("student").internship_status,
        InternshipStatus::None
    );
}

#[test]
fn evaluation_never_writes() {
    let (service, store) = build_service();
    let student_id = seed_student(&store, "stu-eval");
    service
        .submit_application(
            &student_id,
            application_draft("Orbit Systems", InternshipCategory::UniversityAssigned),
        )
        .expect("submit");

    let approve = service
        .evaluate_transition(&student_id, TransitionAction::Approve, ActorRole::Admin)
        .expect("approve is legal");
    let reject = service
        .evaluate_transition(&student_id, TransitionAction::Reject, ActorRole::Admin)
        .expect("reject is legal");

    assert_eq!(approve.from, InternshipStatus::Submitted);
    assert_eq!(reject.from, InternshipStatus::Submitted);
    assert_eq!(
        service.student(&student_id).expect("student").internship_status,
        InternshipStatus::Submitted
    );
}

#[test]
fn students_cannot_approve_themselves() {
    let (service, store) = build_service();
    let student_id = seed_student(&store, "stu-self");
    service
        .submit_application(
            &student_id,
            application_draft("Orbit Systems", InternshipCategory::UniversityAssigned),
        )
        .expect("submit");

    let result =
        service.request_transition(&student_id, TransitionAction::Approve, ActorRole::Student);
    assert!(matches!(
        result,
        Err(InternshipError::Unauthorized {
            role: ActorRole::Student,
            ..
        })
    ));
}

#[test]
fn rejected_application_is_edited_in_place_on_resubmit() {
    let (service, store) = build_service();
    let student_id = seed_student(&store, "stu-resubmit");
    let (_, original) = service
        .submit_application(
            &student_id,
            application_draft("Orbit Systems", InternshipCategory::UniversityAssigned),
        )
        .expect("submit");

    let student = service
        .request_transition(&student_id, TransitionAction::Reject, ActorRole::SuperAdmin)
        .expect("reject");
    assert_eq!(student.internship_status, InternshipStatus::Rejected);

    let edits = ApplicationDraft {
        position: Some("Data Intern".to_string()),
        ..ApplicationDraft::default()
    };
    let (student, edited) = service
        .resubmit_application(&student_id, edits)
        .expect("resubmit");

    assert_eq!(student.internship_status, InternshipStatus::Submitted);
    assert_eq!(edited.id, original.id);
    assert_eq!(edited.position.as_deref(), Some("Data Intern"));
    assert_eq!(edited.company_name.as_deref(), Some("Orbit Systems"));

    let latest = store
        .latest_application(&student_id)
        .expect("read")
        .expect("application");
    assert_eq!(latest.id, original.id);
    assert_eq!(latest.status, ApplicationStatus::Submitted);
}

#[test]
fn agreement_rejection_routes_back_to_agreement_resubmission() {
    let (service, store) = build_service();
    let student_id = agreement_submitted_student(&service, &store, "stu-agr", "BrightPath");

    service
        .request_transition(&student_id, TransitionAction::Reject, ActorRole::Admin)
        .expect("reject agreement");

    let wrong_path = service.resubmit_application(&student_id, ApplicationDraft::default());
    assert!(matches!(
        wrong_path,
        Err(InternshipError::InvalidTransition { .. })
    ));

    let original = store
        .agreement_for(&student_id)
        .expect("read")
        .expect("agreement");
    let (student, agreement) = service
        .submit_agreement(&student_id, agreement_draft())
        .expect("resubmit agreement");
    assert_eq!(student.internship_status, InternshipStatus::AgreementSubmitted);
    assert_eq!(agreement.id, original.id);
    assert_eq!(agreement.status, AgreementStatus::Pending);
}

#[test]
fn agreement_without_student_contact_is_invalid() {
    let (service, store) = build_service();
    let student_id = approved_student(
        &service,
        &store,
        "stu-incomplete",
        "BrightPath",
        InternshipCategory::Freelancer,
    );

    let result = service.submit_agreement(&student_id, Default::default());
    assert!(matches!(result, Err(InternshipError::Validation(_))));
    assert_eq!(
        service.student(&student_id).expect("student").internship_status,
        InternshipStatus::Approved
    );
}

#[test]
fn racing_transitions_produce_one_commit_and_one_conflict() {
    let (service, store) = build_service();
    let student_id = agreement_submitted_student(&service, &store, "stu-race", "BrightPath");

    let barrier = Barrier::new(2);
    let results = thread::scope(|scope| {
        let handles = [TransitionAction::Verify, TransitionAction::Reject].map(|action| {
            let service = &service;
            let barrier = &barrier;
            let student_id = &student_id;
            scope.spawn(move || {
                let decision = service
                    .evaluate_transition(student_id, action, ActorRole::Admin)
                    .expect("both are legal from agreement_submitted");
                barrier.wait();
                service.commit_transition(&decision)
            })
        });
        handles.map(|handle| handle.join().expect("thread completes"))
    });

    let committed = results.iter().filter(|result| result.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|result| matches!(result, Err(InternshipError::Conflict { .. })))
        .count();
    assert_eq!(committed, 1);
    assert_eq!(conflicts, 1);
}

fn competing_commit(
    student_id: &StudentId,
    expected: InternshipStatus,
    to: InternshipStatus,
) -> TransitionCommit {
    TransitionCommit {
        student_id: student_id.clone(),
        expected,
        update: StatusUpdate {
            status: to,
            category: None,
        },
        application: None,
        agreement: None,
    }
}

fn stored_status(store: &impl StudentRepository, student_id: &StudentId) -> InternshipStatus {
    store
        .fetch_student(student_id)
        .expect("read")
        .expect("student")
        .internship_status
}

#[test]
fn losing_application_submission_leaves_the_winners_application() {
    let (_, store) = build_service();
    let student_id = seed_student(&store, "stu-race-submit");
    let (racing, racing_store) = interleaving_service(store.clone());

    let now = Utc::now();
    let winner = Application {
        id: store.next_application_id(),
        student_id: student_id.clone(),
        status: ApplicationStatus::Submitted,
        company_name: Some("Winner Co".to_string()),
        position: Some("Platform Intern".to_string()),
        internship_category: Some(InternshipCategory::UniversityAssigned),
        self_found_supervisor: None,
        submitted_at: now,
        updated_at: now,
    };
    let mut commit =
        competing_commit(&student_id, InternshipStatus::None, InternshipStatus::Submitted);
    commit.application = Some(ApplicationWrite::Insert(winner.clone()));
    racing_store.interleave(commit);

    let result = racing.submit_application(
        &student_id,
        application_draft("Loser Co", InternshipCategory::SelfFound),
    );

    assert!(matches!(
        result,
        Err(InternshipError::Conflict { entity: "student", .. })
    ));
    let latest = store
        .latest_application(&student_id)
        .expect("read")
        .expect("application");
    assert_eq!(latest, winner);
    let student = store.fetch_student(&student_id).expect("read").expect("student");
    assert_eq!(student.internship_status, InternshipStatus::Submitted);
    assert_eq!(student.internship_category, None);
}

#[test]
fn losing_agreement_submission_leaves_the_winners_agreement() {
    let (service, store) = build_service();
    let student_id = approved_student(
        &service,
        &store,
        "stu-race-agreement",
        "BrightPath",
        InternshipCategory::SelfFound,
    );
    let (racing, racing_store) = interleaving_service(store.clone());

    let winner = Agreement {
        id: store.next_agreement_id(),
        student_id: student_id.clone(),
        status: AgreementStatus::Pending,
        student_phone: "+880 1000 000001".to_string(),
        student_address: "1 Lake Road".to_string(),
        supervisor_name: Some("Farhan Kabir".to_string()),
        supervisor_email: Some("farhan@brightpath.example".to_string()),
        supervisor_phone: None,
        company_address: None,
        submitted_at: Utc::now(),
    };
    let mut commit = competing_commit(
        &student_id,
        InternshipStatus::Approved,
        InternshipStatus::AgreementSubmitted,
    );
    commit.agreement = Some(AgreementWrite::Upsert(winner.clone()));
    racing_store.interleave(commit);

    let result = racing.submit_agreement(
        &student_id,
        AgreementDraft {
            student_phone: Some("+880 1999 999999".to_string()),
            student_address: Some("9 Mill Lane".to_string()),
            ..AgreementDraft::default()
        },
    );

    assert!(matches!(result, Err(InternshipError::Conflict { .. })));
    let agreement = store
        .agreement_for(&student_id)
        .expect("read")
        .expect("agreement");
    assert_eq!(agreement, winner);
    let application = store
        .latest_application(&student_id)
        .expect("read")
        .expect("application");
    assert_eq!(application.status, ApplicationStatus::Approved);
    assert_eq!(
        stored_status(store.as_ref(), &student_id),
        InternshipStatus::AgreementSubmitted
    );
}

#[test]
fn losing_resubmission_leaves_the_winners_edit() {
    let (service, store) = build_service();
    let student_id = seed_student(&store, "stu-race-resubmit");
    service
        .submit_application(
            &student_id,
            application_draft("Orbit Systems", InternshipCategory::UniversityAssigned),
        )
        .expect("submit");
    service
        .request_transition(&student_id, TransitionAction::Reject, ActorRole::Admin)
        .expect("reject");
    let (racing, racing_store) = interleaving_service(store.clone());

    let mut winner = store
        .latest_application(&student_id)
        .expect("read")
        .expect("application");
    winner.position = Some("Data Intern".to_string());
    winner.status = ApplicationStatus::Submitted;
    let mut commit = competing_commit(
        &student_id,
        InternshipStatus::Rejected,
        InternshipStatus::Submitted,
    );
    commit.application = Some(ApplicationWrite::Replace(winner.clone()));
    racing_store.interleave(commit);

    let result = racing.resubmit_application(
        &student_id,
        ApplicationDraft {
            position: Some("QA Intern".to_string()),
            internship_category: Some(InternshipCategory::SelfFound),
            ..ApplicationDraft::default()
        },
    );

    assert!(matches!(result, Err(InternshipError::Conflict { .. })));
    let latest = store
        .latest_application(&student_id)
        .expect("read")
        .expect("application");
    assert_eq!(latest, winner);
    assert_eq!(
        stored_status(store.as_ref(), &student_id),
        InternshipStatus::Submitted
    );
}

#[test]
fn approval_without_an_application_on_file_writes_nothing() {
    let (service, store) = build_service();
    let mut student = Student::new("stu-imported", "Imported", "imported@uni.example");
    student.internship_status = InternshipStatus::Submitted;
    let student_id = student.id.clone();
    store.put_student(student).expect("seed student");

    let result =
        service.request_transition(&student_id, TransitionAction::Approve, ActorRole::Admin);

    assert!(matches!(
        result,
        Err(InternshipError::NotFound {
            entity: "application",
            ..
        })
    ));
    assert_eq!(
        stored_status(store.as_ref(), &student_id),
        InternshipStatus::Submitted
    );
    let retry =
        service.request_transition(&student_id, TransitionAction::Reject, ActorRole::Admin);
    assert!(matches!(retry, Err(InternshipError::NotFound { .. })));
}

#[test]
fn verification_without_an_agreement_on_file_writes_nothing() {
    let (service, store) = build_service();
    let mut student = Student::new("stu-no-agreement", "Imported", "imported2@uni.example");
    student.internship_status = InternshipStatus::AgreementSubmitted;
    student.internship_category = Some(InternshipCategory::SelfFound);
    let student_id = student.id.clone();
    store.put_student(student).expect("seed student");

    let result =
        service.request_transition(&student_id, TransitionAction::Verify, ActorRole::Admin);

    assert!(matches!(
        result,
        Err(InternshipError::NotFound {
            entity: "agreement",
            ..
        })
    ));
    assert_eq!(
        stored_status(store.as_ref(), &student_id),
        InternshipStatus::AgreementSubmitted
    );
}

#[test]
fn stale_decision_loses_to_earlier_commit() {
    let (service, store) = build_service();
    let student_id = agreement_submitted_student(&service, &store, "stu-stale", "BrightPath");

    let verify = service
        .evaluate_transition(&student_id, TransitionAction::Verify, ActorRole::Admin)
        .expect("verify legal");
    let reject = service
        .evaluate_transition(&student_id, TransitionAction::Reject, ActorRole::Admin)
        .expect("reject legal");

    let student = service.commit_transition(&verify).expect("verify commits");
    assert_eq!(student.internship_status, InternshipStatus::Verified);

    let err = service
        .commit_transition(&reject)
        .expect_err("stale decision");
    assert!(matches!(err, InternshipError::Conflict { entity: "student", .. }));
    assert_eq!(
        service.student(&student_id).expect("student").internship_status,
        InternshipStatus::Verified
    );
}

#[test]
fn legacy_student_must_be_categorized_before_category_dependent_edges() {
    let (service, store) = build_service();
    let student_id = seed_student(&store, "stu-legacy");
    let draft = ApplicationDraft {
        company_name: Some("Orbit Systems".to_string()),
        ..ApplicationDraft::default()
    };
    service.submit_application(&student_id, draft).expect("submit");
    service
        .request_transition(&student_id, TransitionAction::Approve, ActorRole::Admin)
        .expect("approve");

    let blocked =
        service.request_transition(&student_id, TransitionAction::Verify, ActorRole::Admin);
    assert!(matches!(blocked, Err(InternshipError::Validation(_))));

    let unauthorized = service.categorize_student(
        &student_id,
        InternshipCategory::UniversityAssigned,
        ActorRole::Student,
    );
    assert!(matches!(
        unauthorized,
        Err(InternshipError::Unauthorized { .. })
    ));

    service
        .categorize_student(
            &student_id,
            InternshipCategory::UniversityAssigned,
            ActorRole::Admin,
        )
        .expect("categorize");
    let student = service
        .request_transition(&student_id, TransitionAction::Verify, ActorRole::Admin)
        .expect("verify after categorization");
    assert_eq!(student.internship_status, InternshipStatus::Verified);
}

#[test]
fn legacy_student_can_default_to_self_found() {
    let (service, store) = build_service_with(InternshipConfig {
        legacy_category: LegacyCategoryPolicy::TreatAsSelfFound,
        ..InternshipConfig::default()
    });
    let student_id = seed_student(&store, "stu-legacy-sf");
    service
        .submit_application(&student_id, ApplicationDraft::default())
        .expect("submit");
    service
        .request_transition(&student_id, TransitionAction::Approve, ActorRole::Admin)
        .expect("approve");

    let (student, _) = service
        .submit_agreement(
            &student_id,
            crate::workflows::internship::domain::AgreementDraft {
                supervisor_name: Some("Tanvir Ahmed".to_string()),
                supervisor_email: Some("tanvir@freelance.example".to_string()),
                ..agreement_draft()
            },
        )
        .expect("agreement accepted under self-found default");
    assert_eq!(student.internship_status, InternshipStatus::AgreementSubmitted);
}
