use crate::auth::require_api_key;
use crate::infra::{AppState, DynGrader, InMemoryLoanApplicationRepository};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{middleware, Extension, Json, Router};
use loan_eligibility::workflows::crime::agent::{GradingAgent, OpenAiChatApi};
use loan_eligibility::workflows::crime::geocode::NominatimGeocoder;
use loan_eligibility::workflows::crime::scraper::HttpPageBrowser;
use loan_eligibility::workflows::crime::{validate_address, CrimeAnalysisResolver};
use loan_eligibility::workflows::lending::{loan_router, LoanApplicationService};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

pub(crate) type Resolver = CrimeAnalysisResolver<HttpPageBrowser, NominatimGeocoder>;
pub(crate) type Agent = GradingAgent<OpenAiChatApi, HttpPageBrowser, NominatimGeocoder>;
pub(crate) type LoanService =
    LoanApplicationService<InMemoryLoanApplicationRepository, DynGrader>;

/// Bundle of the request-serving services the router closes over.
pub(crate) struct ApiServices {
    pub(crate) loans: Arc<LoanService>,
    pub(crate) resolver: Arc<Resolver>,
    pub(crate) agent: Arc<Agent>,
}

/// Assembles the full application router. Root and the health/metrics
/// surface stay open; everything else sits behind the API-key middleware.
pub(crate) fn api_router(
    services: ApiServices,
    state: AppState,
    api_key: Arc<String>,
) -> Router {
    let crime = Router::new()
        .route("/crime-analysis", post(crime_analysis_endpoint))
        .route("/crime-analysis/validate", post(validate_address_endpoint))
        .with_state(services.resolver);
    let agent = Router::new()
        .route("/agent/grade", post(agent_grade_endpoint))
        .with_state(services.agent);

    let protected = loan_router(services.loans)
        .merge(crime)
        .merge(agent)
        .layer(middleware::from_fn_with_state(api_key, require_api_key));

    Router::new()
        .route("/", get(home))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .merge(protected)
        .layer(Extension(state))
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddressRequest {
    #[serde(default)]
    pub(crate) address: String,
}

pub(crate) async fn home() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Loan Eligibility API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn crime_analysis_endpoint(
    State(resolver): State<Arc<Resolver>>,
    Json(request): Json<AddressRequest>,
) -> Response {
    let validation = validate_address(&request.address);
    if !validation.is_valid {
        let payload = json!({ "error": validation.error });
        return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
    }

    let result = resolver.analyze_crime_for_address(&request.address).await;
    Json(result).into_response()
}

pub(crate) async fn validate_address_endpoint(
    State(_resolver): State<Arc<Resolver>>,
    Json(request): Json<AddressRequest>,
) -> Response {
    if request.address.is_empty() {
        let payload = json!({ "error": "Address is required" });
        return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
    }

    Json(validate_address(&request.address)).into_response()
}

/// Minimum address length accepted by the agent endpoint.
const AGENT_MIN_ADDRESS_LEN: usize = 3;

pub(crate) async fn agent_grade_endpoint(
    State(agent): State<Arc<Agent>>,
    Json(request): Json<AddressRequest>,
) -> Response {
    if request.address.len() < AGENT_MIN_ADDRESS_LEN {
        let payload = json!({ "error": "Address must be at least 3 characters" });
        return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
    }

    match agent.grade(&request.address).await {
        Ok(result) => Json(result).into_response(),
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
