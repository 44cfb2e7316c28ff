use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::domain::{
    ActorRole, Agreement, AgreementDraft, Application, ApplicationDraft, CompanyId, FacultyId,
    InternshipCategory, PlacementFields, Student, StudentId, SubmissionId,
};
use super::error::InternshipError;
use super::grading::{GradeInput, SubmissionView};
use super::lifecycle::{PipelineStage, TransitionAction};
use super::placement::PlacementProposal;
use super::repository::InternshipStore;
use super::service::{InternshipService, QuickRegistration};
use super::supervisor::SupervisorAssignment;

type SharedService<S> = State<Arc<InternshipService<S>>>;

#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub action: TransitionAction,
    pub actor_role: ActorRole,
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub category: InternshipCategory,
    pub actor_role: ActorRole,
}

#[derive(Debug, Deserialize)]
pub struct SupervisorRequest {
    pub faculty_id: String,
}

#[derive(Debug, Deserialize)]
pub struct GradeRequest {
    pub actor_role: ActorRole,
    pub actor_id: String,
    pub marks: u16,
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApplicationReceipt {
    pub student: Student,
    pub application: Application,
}

#[derive(Debug, Serialize)]
pub struct AgreementReceipt {
    pub student: Student,
    pub agreement: Agreement,
}

/// HTTP surface over the internship service.
pub fn internship_router<S>(service: Arc<InternshipService<S>>) -> Router
where
    S: InternshipStore + 'static,
{
    Router::new()
        .route("/api/v1/internships/pipeline", get(pipeline_handler::<S>))
        .route(
            "/api/v1/students/:student_id/transitions",
            post(transition_handler::<S>),
        )
        .route(
            "/api/v1/students/:student_id/category",
            put(category_handler::<S>),
        )
        .route(
            "/api/v1/students/:student_id/application",
            post(submit_application_handler::<S>).put(resubmit_application_handler::<S>),
        )
        .route(
            "/api/v1/students/:student_id/agreement",
            post(submit_agreement_handler::<S>),
        )
        .route(
            "/api/v1/students/:student_id/placement",
            get(reconcile_placement_handler::<S>).put(commit_placement_handler::<S>),
        )
        .route(
            "/api/v1/students/:student_id/placement/quick-register",
            post(quick_register_handler::<S>),
        )
        .route(
            "/api/v1/students/:student_id/placement/companies/:company_id",
            post(apply_company_handler::<S>),
        )
        .route(
            "/api/v1/students/:student_id/supervisor",
            put(supervisor_handler::<S>),
        )
        .route(
            "/api/v1/submissions/:submission_id",
            get(submission_handler::<S>),
        )
        .route(
            "/api/v1/submissions/:submission_id/grades",
            post(grade_handler::<S>),
        )
        .with_state(service)
}

pub(crate) async fn pipeline_handler<S>(State(service): SharedService<S>) -> Json<Vec<PipelineStage>>
where
    S: InternshipStore + 'static,
{
    Json(service.pipeline())
}

pub(crate) async fn transition_handler<S>(
    State(service): SharedService<S>,
    Path(student_id): Path<String>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<Student>, InternshipError>
where
    S: InternshipStore + 'static,
{
    let student = service.request_transition(
        &StudentId(student_id),
        request.action,
        request.actor_role,
    )?;
    Ok(Json(student))
}

async fn category_handler<S>(
    State(service): SharedService<S>,
    Path(student_id): Path<String>,
    Json(request): Json<CategoryRequest>,
) -> Result<Json<Student>, InternshipError>
where
    S: InternshipStore + 'static,
{
    let student =
        service.categorize_student(&StudentId(student_id), request.category, request.actor_role)?;
    Ok(Json(student))
}

async fn submit_application_handler<S>(
    State(service): SharedService<S>,
    Path(student_id): Path<String>,
    Json(draft): Json<ApplicationDraft>,
) -> Result<(StatusCode, Json<ApplicationReceipt>), InternshipError>
where
    S: InternshipStore + 'static,
{
    let (student, application) = service.submit_application(&StudentId(student_id), draft)?;
    Ok((
        StatusCode::CREATED,
        Json(ApplicationReceipt {
            student,
            application,
        }),
    ))
}

async fn resubmit_application_handler<S>(
    State(service): SharedService<S>,
    Path(student_id): Path<String>,
    Json(draft): Json<ApplicationDraft>,
) -> Result<Json<ApplicationReceipt>, InternshipError>
where
    S: InternshipStore + 'static,
{
    let (student, application) = service.resubmit_application(&StudentId(student_id), draft)?;
    Ok(Json(ApplicationReceipt {
        student,
        application,
    }))
}

async fn submit_agreement_handler<S>(
    State(service): SharedService<S>,
    Path(student_id): Path<String>,
    Json(draft): Json<AgreementDraft>,
) -> Result<Json<AgreementReceipt>, InternshipError>
where
    S: InternshipStore + 'static,
{
    let (student, agreement) = service.submit_agreement(&StudentId(student_id), draft)?;
    Ok(Json(AgreementReceipt { student, agreement }))
}

async fn reconcile_placement_handler<S>(
    State(service): SharedService<S>,
    Path(student_id): Path<String>,
) -> Result<Json<PlacementProposal>, InternshipError>
where
    S: InternshipStore + 'static,
{
    Ok(Json(service.reconcile_placement(&StudentId(student_id))?))
}

async fn quick_register_handler<S>(
    State(service): SharedService<S>,
    Path(student_id): Path<String>,
) -> Result<(StatusCode, Json<QuickRegistration>), InternshipError>
where
    S: InternshipStore + 'static,
{
    let registration = service.quick_register(&StudentId(student_id))?;
    let status = if registration.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(registration)))
}

async fn apply_company_handler<S>(
    State(service): SharedService<S>,
    Path((student_id, company_id)): Path<(String, String)>,
) -> Result<Json<PlacementProposal>, InternshipError>
where
    S: InternshipStore + 'static,
{
    let proposal =
        service.apply_partnered_company(&StudentId(student_id), &CompanyId(company_id))?;
    Ok(Json(proposal))
}

async fn commit_placement_handler<S>(
    State(service): SharedService<S>,
    Path(student_id): Path<String>,
    Json(fields): Json<PlacementFields>,
) -> Result<Json<Student>, InternshipError>
where
    S: InternshipStore + 'static,
{
    Ok(Json(service.commit_placement(&StudentId(student_id), fields)?))
}

async fn supervisor_handler<S>(
    State(service): SharedService<S>,
    Path(student_id): Path<String>,
    Json(request): Json<SupervisorRequest>,
) -> Result<Json<SupervisorAssignment>, InternshipError>
where
    S: InternshipStore + 'static,
{
    let assignment =
        service.assign_supervisor(&StudentId(student_id), &FacultyId(request.faculty_id))?;
    Ok(Json(assignment))
}

async fn submission_handler<S>(
    State(service): SharedService<S>,
    Path(submission_id): Path<String>,
) -> Result<Json<SubmissionView>, InternshipError>
where
    S: InternshipStore + 'static,
{
    Ok(Json(service.submission(&SubmissionId(submission_id))?))
}

async fn grade_handler<S>(
    State(service): SharedService<S>,
    Path(submission_id): Path<String>,
    Json(request): Json<GradeRequest>,
) -> Result<Json<SubmissionView>, InternshipError>
where
    S: InternshipStore + 'static,
{
    let view = service.grade_submission(
        &SubmissionId(submission_id),
        request.actor_role,
        &request.actor_id,
        GradeInput {
            marks: request.marks,
            feedback: request.feedback,
        },
    )?;
    Ok(Json(view))
}
