use std::io::Cursor;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicationId, CandidateId, JobId, RecruiterId};
use super::repository::{ApplicationStore, CandidateDirectory, HiringNotifier, JobStore, StoreError};
use super::roster::RosterImporter;
use super::service::{BulkAction, HiringPipelineService, PipelineError, RoundMoveRequest};

/// Router builder exposing the hiring endpoints over a shared service.
pub fn hiring_router<A, J, C, N>(service: Arc<HiringPipelineService<A, J, C, N>>) -> Router
where
    A: ApplicationStore + 'static,
    J: JobStore + 'static,
    C: CandidateDirectory + 'static,
    N: HiringNotifier + 'static,
{
    Router::new()
        .route(
            "/api/v1/hiring/jobs/:job_id/match-preview",
            post(match_preview_handler::<A, J, C, N>),
        )
        .route(
            "/api/v1/hiring/jobs/:job_id/applications",
            post(submit_handler::<A, J, C, N>),
        )
        .route(
            "/api/v1/hiring/jobs/:job_id/rankings",
            post(rankings_handler::<A, J, C, N>),
        )
        .route(
            "/api/v1/hiring/applications/:application_id",
            get(application_handler::<A, J, C, N>),
        )
        .route(
            "/api/v1/hiring/applications/:application_id/round",
            post(move_round_handler::<A, J, C, N>),
        )
        .route(
            "/api/v1/hiring/applications/bulk",
            post(bulk_handler::<A, J, C, N>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct CandidateRequest {
    candidate_id: CandidateId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RankingsRequest {
    #[serde(default)]
    candidate_ids: Vec<CandidateId>,
    /// Inline roster export; when present it wins over `candidate_ids`.
    #[serde(default)]
    roster_csv: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MoveRoundBody {
    recruiter_id: RecruiterId,
    #[serde(flatten)]
    request: RoundMoveRequest,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BulkBody {
    recruiter_id: RecruiterId,
    application_ids: Vec<ApplicationId>,
    #[serde(flatten)]
    action: BulkAction,
}

pub(crate) async fn match_preview_handler<A, J, C, N>(
    State(service): State<Arc<HiringPipelineService<A, J, C, N>>>,
    Path(job_id): Path<String>,
    axum::Json(body): axum::Json<CandidateRequest>,
) -> Response
where
    A: ApplicationStore + 'static,
    J: JobStore + 'static,
    C: CandidateDirectory + 'static,
    N: HiringNotifier + 'static,
{
    match service.preview_match(&body.candidate_id, &JobId(job_id)) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn submit_handler<A, J, C, N>(
    State(service): State<Arc<HiringPipelineService<A, J, C, N>>>,
    Path(job_id): Path<String>,
    axum::Json(body): axum::Json<CandidateRequest>,
) -> Response
where
    A: ApplicationStore + 'static,
    J: JobStore + 'static,
    C: CandidateDirectory + 'static,
    N: HiringNotifier + 'static,
{
    match service.submit(body.candidate_id, JobId(job_id)) {
        Ok(record) => (StatusCode::ACCEPTED, axum::Json(record.view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn rankings_handler<A, J, C, N>(
    State(service): State<Arc<HiringPipelineService<A, J, C, N>>>,
    Path(job_id): Path<String>,
    axum::Json(body): axum::Json<RankingsRequest>,
) -> Response
where
    A: ApplicationStore + 'static,
    J: JobStore + 'static,
    C: CandidateDirectory + 'static,
    N: HiringNotifier + 'static,
{
    let job_id = JobId(job_id);

    let outcome = match body.roster_csv {
        Some(csv) => match RosterImporter::from_reader(Cursor::new(csv.into_bytes())) {
            Ok(roster) => service.rank_roster(&job_id, roster),
            Err(err) => {
                let payload = json!({ "error": err.to_string() });
                return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
            }
        },
        None => service.rank_candidates(&job_id, &body.candidate_ids),
    };

    match outcome {
        Ok(ranked) => (StatusCode::OK, axum::Json(ranked)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn application_handler<A, J, C, N>(
    State(service): State<Arc<HiringPipelineService<A, J, C, N>>>,
    Path(application_id): Path<String>,
) -> Response
where
    A: ApplicationStore + 'static,
    J: JobStore + 'static,
    C: CandidateDirectory + 'static,
    N: HiringNotifier + 'static,
{
    match service.get(&ApplicationId(application_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn move_round_handler<A, J, C, N>(
    State(service): State<Arc<HiringPipelineService<A, J, C, N>>>,
    Path(application_id): Path<String>,
    axum::Json(body): axum::Json<MoveRoundBody>,
) -> Response
where
    A: ApplicationStore + 'static,
    J: JobStore + 'static,
    C: CandidateDirectory + 'static,
    N: HiringNotifier + 'static,
{
    match service.move_round(
        &body.recruiter_id,
        &ApplicationId(application_id),
        body.request,
    ) {
        Ok(record) => (StatusCode::OK, axum::Json(record.view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn bulk_handler<A, J, C, N>(
    State(service): State<Arc<HiringPipelineService<A, J, C, N>>>,
    axum::Json(body): axum::Json<BulkBody>,
) -> Response
where
    A: ApplicationStore + 'static,
    J: JobStore + 'static,
    C: CandidateDirectory + 'static,
    N: HiringNotifier + 'static,
{
    let outcome = service.bulk_update(&body.recruiter_id, &body.application_ids, &body.action);
    (StatusCode::OK, axum::Json(outcome)).into_response()
}

fn error_response(err: PipelineError) -> Response {
    let status = match &err {
        PipelineError::InvalidRound { .. } | PipelineError::NoActiveRound => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        PipelineError::RoundAtCapacity { .. } => StatusCode::CONFLICT,
        PipelineError::NotOwner => StatusCode::FORBIDDEN,
        PipelineError::ApplicationNotFound | PipelineError::JobNotFound => StatusCode::NOT_FOUND,
        PipelineError::Store(StoreError::Conflict) => StatusCode::CONFLICT,
        PipelineError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
        PipelineError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}
