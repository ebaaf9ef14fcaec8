use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::workflows::crime::LetterGrade;
use crate::workflows::lending::{loan_router, LoanApplicationService};

#[tokio::test]
async fn create_route_returns_created_with_the_record() {
    let (service, _) = build_service(LetterGrade::A);
    let router = loan_router(service);

    let response = router
        .oneshot(
            axum::http::Request::post("/loan")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(
                    serde_json::to_vec(&submission()).unwrap(),
                ))
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["eligible"], json!(true));
    assert_eq!(payload["reason"], json!("Passed all checks"));
    assert_eq!(payload["crimeGrade"], json!("A"));
    assert!(payload.get("id").is_some());
}

#[tokio::test]
async fn create_route_rejects_incomplete_payloads() {
    let (service, repository) = build_service(LetterGrade::A);
    let router = loan_router(service);

    let response = router
        .oneshot(
            axum::http::Request::post("/loan")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(
                    serde_json::to_vec(&json!({ "applicantName": "John Doe" })).unwrap(),
                ))
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], json!("All fields are required"));
    assert_eq!(repository.len(), 0);
}

#[tokio::test]
async fn create_route_maps_grader_failures_to_internal_error() {
    let repository = Arc::new(MemoryRepository::default());
    let service = Arc::new(LoanApplicationService::new(
        repository,
        Arc::new(FailingGrader),
    ));
    let router = loan_router(service);

    let response = router
        .oneshot(
            axum::http::Request::post("/loan")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(
                    serde_json::to_vec(&submission()).unwrap(),
                ))
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn get_route_returns_a_stored_record() {
    let (service, _) = build_service(LetterGrade::B);
    let record = service.create(submission()).await.expect("created");
    let router = loan_router(service);

    let response = router
        .oneshot(
            axum::http::Request::get(format!("/loan/{}", record.id.0))
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["id"], json!(record.id.0));
    assert_eq!(payload["applicantName"], json!("John Doe"));
}

#[tokio::test]
async fn get_route_reports_missing_records() {
    let (service, _) = build_service(LetterGrade::B);
    let router = loan_router(service);

    let response = router
        .oneshot(
            axum::http::Request::get("/loan/loan-424242")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], json!("Loan application not found"));
}
