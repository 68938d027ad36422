use super::common::*;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use chrono::Weekday;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::infra::InMemoryRuleStore;
use crate::workflows::scheduling::router::{self, interview_router};
use crate::workflows::scheduling::service::{InterviewSchedulingService, SchedulingConfig};

fn build_router() -> (axum::Router, Arc<MemoryNotifier>) {
    let (service, _, rules, notifier) = build_service();
    rules.add_rule(weekly_rule(Weekday::Mon, (9, 0), (12, 0)));
    (interview_router(Arc::new(service)), notifier)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("serialize")))
        .expect("request")
}

fn create_body(mode: &str) -> Value {
    json!({
        "application_id": "appl-204",
        "applicant": { "id": APPLICANT_ID, "name": "Maria Prieto" },
        "reviewer": { "id": REVIEWER_ID, "name": "Anna Keller" },
        "platform": "google-meet",
        "mode": mode,
    })
}

async fn create_interview(router: &axum::Router, mode: &str) -> String {
    let response = router
        .clone()
        .oneshot(json_request("POST", "/api/v1/interviews", create_body(mode)))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    payload
        .get("interview_id")
        .and_then(Value::as_str)
        .expect("interview id in payload")
        .to_string()
}

#[tokio::test]
async fn creating_an_interview_returns_the_initial_view() {
    let (router, _) = build_router();

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/interviews",
            create_body("negotiation"),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload.get("status").and_then(Value::as_str),
        Some("awaiting_reviewer_proposed_dates")
    );
    assert_eq!(payload.get("version").and_then(Value::as_u64), Some(1));
}

#[tokio::test]
async fn missing_interviews_are_404() {
    let (router, _) = build_router();

    let response = router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/v1/interviews/itv-missing")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn the_negotiation_flow_runs_end_to_end_over_http() {
    let (router, notifier) = build_router();
    let id = create_interview(&router, "negotiation").await;

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/interviews/{id}/proposals"),
            json!({
                "party": "applicant",
                "dates": ["2030-08-05T09:00:00Z", "2030-08-05T10:00:00Z"],
                "observations": "either works",
            }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload.get("status").and_then(Value::as_str),
        Some("awaiting_reviewer_confirmation")
    );

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/interviews/{id}/confirmation"),
            json!({ "party": "reviewer", "chosen_date": "2030-08-05T10:00:00Z" }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("status").and_then(Value::as_str), Some("confirmed"));
    assert_eq!(
        payload.get("confirmed_by").and_then(Value::as_str),
        Some("reviewer")
    );

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/interviews/{id}/reschedule"),
            json!({ "party": "reviewer", "reason": "panel moved" }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload.get("status").and_then(Value::as_str),
        Some("awaiting_applicant_slot_selection")
    );
    assert!(payload.get("scheduled_at").is_none());

    assert_eq!(notifier.events().len(), 3);
}

#[tokio::test]
async fn confirming_an_unproposed_date_is_unprocessable() {
    let (router, _) = build_router();
    let id = create_interview(&router, "negotiation").await;

    router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/interviews/{id}/proposals"),
            json!({ "party": "applicant", "dates": ["2030-08-05T09:00:00Z"] }),
        ))
        .await
        .expect("route executes");

    let response = router
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/interviews/{id}/confirmation"),
            json!({ "party": "reviewer", "chosen_date": "2030-08-05T09:30:00Z" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .contains("not one of the proposed dates"));
}

#[tokio::test]
async fn out_of_turn_proposals_are_conflicts() {
    let (router, _) = build_router();
    let id = create_interview(&router, "negotiation").await;

    // The reviewer cannot open the bidding.
    let response = router
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/interviews/{id}/proposals"),
            json!({ "party": "reviewer", "dates": ["2030-08-05T09:00:00Z"] }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn the_availability_route_returns_sliced_slots() {
    let (router, _) = build_router();

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/availability",
            json!({
                "owner_id": REVIEWER_ID,
                "owner_role": "reviewer",
                "from": "2030-08-05T00:00:00Z",
                "to": "2030-08-06T00:00:00Z",
                "slot_minutes": 30,
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let slots = payload
        .get("slots")
        .and_then(Value::as_array)
        .expect("slots array");
    // Monday 09:00-12:00 at half-hour slots.
    assert_eq!(slots.len(), 6);
    assert_eq!(
        slots[0].get("start").and_then(Value::as_str),
        Some("2030-08-05T09:00:00Z")
    );
}

#[tokio::test]
async fn booking_over_http_confirms_and_mismatches_are_unprocessable() {
    let (router, _) = build_router();
    let id = create_interview(&router, "slot_selection").await;

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/interviews/{id}/slot"),
            json!({ "applicant_id": APPLICANT_ID, "slot_start": "2030-08-05T09:17:00Z" }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = router
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/interviews/{id}/slot"),
            json!({ "applicant_id": APPLICANT_ID, "slot_start": "2030-08-05T09:30:00Z" }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("status").and_then(Value::as_str), Some("confirmed"));
    assert_eq!(
        payload.get("scheduled_at").and_then(Value::as_str),
        Some("2030-08-05T09:30:00Z")
    );
}

#[tokio::test]
async fn repository_outages_surface_as_internal_errors() {
    let service = Arc::new(InterviewSchedulingService::new(
        Arc::new(UnavailableRepository),
        Arc::new(InMemoryRuleStore::default()),
        Arc::new(MemoryNotifier::default()),
        SchedulingConfig::default(),
    ));

    let response = router::create_handler::<UnavailableRepository, InMemoryRuleStore, MemoryNotifier>(
        State(service),
        axum::Json(submission(
            crate::workflows::scheduling::domain::SchedulingMode::Negotiation,
        )),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
