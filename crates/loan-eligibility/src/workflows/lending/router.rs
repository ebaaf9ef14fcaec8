use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::{LoanApplicationData, LoanApplicationId};
use super::repository::LoanApplicationRepository;
use super::service::{LoanApplicationService, LoanServiceError};
use crate::workflows::crime::CrimeGrader;

/// Router builder exposing the loan intake and lookup endpoints.
pub fn loan_router<R, G>(service: Arc<LoanApplicationService<R, G>>) -> Router
where
    R: LoanApplicationRepository + 'static,
    G: CrimeGrader + 'static,
{
    Router::new()
        .route("/loan", post(create_handler::<R, G>))
        .route("/loan/:id", get(get_handler::<R, G>))
        .with_state(service)
}

pub(crate) async fn create_handler<R, G>(
    State(service): State<Arc<LoanApplicationService<R, G>>>,
    axum::Json(data): axum::Json<LoanApplicationData>,
) -> Response
where
    R: LoanApplicationRepository + 'static,
    G: CrimeGrader + 'static,
{
    match service.create(data).await {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(LoanServiceError::Validation(error)) => {
            let payload = json!({ "error": error });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn get_handler<R, G>(
    State(service): State<Arc<LoanApplicationService<R, G>>>,
    Path(id): Path<String>,
) -> Response
where
    R: LoanApplicationRepository + 'static,
    G: CrimeGrader + 'static,
{
    let id = LoanApplicationId(id);
    match service.get(&id) {
        Ok(Some(record)) => (StatusCode::OK, axum::Json(record)).into_response(),
        Ok(None) => {
            let payload = json!({ "error": "Loan application not found" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
