use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use super::availability::AvailabilityQuery;
use super::domain::{InterviewId, NewInterview, PartyRole};
use super::repository::{InterviewRepository, RuleStore, ScheduleNotifier};
use super::service::{ErrorClass, InterviewSchedulingService, SchedulingServiceError};

/// Router builder exposing the scheduling endpoints.
pub fn interview_router<R, S, N>(service: Arc<InterviewSchedulingService<R, S, N>>) -> Router
where
    R: InterviewRepository + 'static,
    S: RuleStore + 'static,
    N: ScheduleNotifier + 'static,
{
    Router::new()
        .route("/api/v1/interviews", post(create_handler::<R, S, N>))
        .route(
            "/api/v1/interviews/:interview_id",
            get(get_handler::<R, S, N>),
        )
        .route(
            "/api/v1/interviews/:interview_id/proposals",
            post(propose_handler::<R, S, N>),
        )
        .route(
            "/api/v1/interviews/:interview_id/confirmation",
            post(confirm_handler::<R, S, N>),
        )
        .route(
            "/api/v1/interviews/:interview_id/slot",
            post(book_handler::<R, S, N>),
        )
        .route(
            "/api/v1/interviews/:interview_id/reschedule",
            post(reschedule_handler::<R, S, N>),
        )
        .route(
            "/api/v1/availability",
            post(availability_handler::<R, S, N>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct ProposeDatesRequest {
    pub party: PartyRole,
    pub dates: Vec<DateTime<Utc>>,
    #[serde(default)]
    pub observations: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmDateRequest {
    pub party: PartyRole,
    pub chosen_date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct BookSlotRequest {
    pub applicant_id: String,
    pub slot_start: DateTime<Utc>,
    #[serde(default)]
    pub observations: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RescheduleRequest {
    pub party: PartyRole,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    pub owner_id: String,
    pub owner_role: PartyRole,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub slot_minutes: u32,
}

pub(crate) async fn create_handler<R, S, N>(
    State(service): State<Arc<InterviewSchedulingService<R, S, N>>>,
    axum::Json(request): axum::Json<NewInterview>,
) -> Response
where
    R: InterviewRepository + 'static,
    S: RuleStore + 'static,
    N: ScheduleNotifier + 'static,
{
    match service.create(request) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_handler<R, S, N>(
    State(service): State<Arc<InterviewSchedulingService<R, S, N>>>,
    Path(interview_id): Path<String>,
) -> Response
where
    R: InterviewRepository + 'static,
    S: RuleStore + 'static,
    N: ScheduleNotifier + 'static,
{
    match service.get(&InterviewId(interview_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn propose_handler<R, S, N>(
    State(service): State<Arc<InterviewSchedulingService<R, S, N>>>,
    Path(interview_id): Path<String>,
    axum::Json(request): axum::Json<ProposeDatesRequest>,
) -> Response
where
    R: InterviewRepository + 'static,
    S: RuleStore + 'static,
    N: ScheduleNotifier + 'static,
{
    let outcome = service.propose_dates(
        &InterviewId(interview_id),
        request.party,
        request.dates,
        request.observations,
        Utc::now(),
    );
    match outcome {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn confirm_handler<R, S, N>(
    State(service): State<Arc<InterviewSchedulingService<R, S, N>>>,
    Path(interview_id): Path<String>,
    axum::Json(request): axum::Json<ConfirmDateRequest>,
) -> Response
where
    R: InterviewRepository + 'static,
    S: RuleStore + 'static,
    N: ScheduleNotifier + 'static,
{
    match service.confirm_date(&InterviewId(interview_id), request.party, request.chosen_date) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn book_handler<R, S, N>(
    State(service): State<Arc<InterviewSchedulingService<R, S, N>>>,
    Path(interview_id): Path<String>,
    axum::Json(request): axum::Json<BookSlotRequest>,
) -> Response
where
    R: InterviewRepository + 'static,
    S: RuleStore + 'static,
    N: ScheduleNotifier + 'static,
{
    let outcome = service.book_slot(
        &InterviewId(interview_id),
        &request.applicant_id,
        request.slot_start,
        request.observations,
        Utc::now(),
    );
    match outcome {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reschedule_handler<R, S, N>(
    State(service): State<Arc<InterviewSchedulingService<R, S, N>>>,
    Path(interview_id): Path<String>,
    axum::Json(request): axum::Json<RescheduleRequest>,
) -> Response
where
    R: InterviewRepository + 'static,
    S: RuleStore + 'static,
    N: ScheduleNotifier + 'static,
{
    match service.request_reschedule(&InterviewId(interview_id), request.party, request.reason) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn availability_handler<R, S, N>(
    State(service): State<Arc<InterviewSchedulingService<R, S, N>>>,
    axum::Json(request): axum::Json<AvailabilityRequest>,
) -> Response
where
    R: InterviewRepository + 'static,
    S: RuleStore + 'static,
    N: ScheduleNotifier + 'static,
{
    let query = AvailabilityQuery {
        owner_id: request.owner_id,
        owner_role: request.owner_role,
        from: request.from,
        to: request.to,
        slot_minutes: request.slot_minutes,
    };
    match service.free_slots(&query, Utc::now()) {
        Ok(slots) => (StatusCode::OK, axum::Json(json!({ "slots": slots }))).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: SchedulingServiceError) -> Response {
    let status = match error.class() {
        ErrorClass::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorClass::Conflict => StatusCode::CONFLICT,
        ErrorClass::NotFound => StatusCode::NOT_FOUND,
        ErrorClass::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
