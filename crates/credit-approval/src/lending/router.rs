use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use serde_json::json;

use super::domain::{CustomerId, CustomerRegistration, LoanApplication, LoanId};
use super::repository::{CustomerRepository, LoanRepository, RepositoryError};
use super::service::{LendingService, LendingServiceError, RegistrationError};

/// Router builder exposing registration, eligibility and loan endpoints.
pub fn lending_router<C, L>(service: Arc<LendingService<C, L>>) -> Router
where
    C: CustomerRepository + 'static,
    L: LoanRepository + 'static,
{
    Router::new()
        .route("/register", post(register_handler::<C, L>))
        .route("/check-eligibility", post(check_eligibility_handler::<C, L>))
        .route("/create-loan", post(create_loan_handler::<C, L>))
        .route("/view-loan/:loan_id", get(view_loan_handler::<C, L>))
        .route("/view-loans/:customer_id", get(view_loans_handler::<C, L>))
        .with_state(service)
}

/// Body returned by `POST /check-eligibility`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EligibilityResponse {
    pub customer_id: CustomerId,
    pub approval: bool,
    pub interest_rate: f64,
    pub corrected_interest_rate: f64,
    pub tenure: i32,
    pub monthly_installment: f64,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decline_reason: Option<String>,
}

pub(crate) async fn register_handler<C, L>(
    State(service): State<Arc<LendingService<C, L>>>,
    payload: Result<Json<CustomerRegistration>, JsonRejection>,
) -> Response
where
    C: CustomerRepository + 'static,
    L: LoanRepository + 'static,
{
    let Json(registration) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return invalid_payload(rejection),
    };

    match service.register(registration) {
        Ok(customer) => (StatusCode::CREATED, Json(customer)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn check_eligibility_handler<C, L>(
    State(service): State<Arc<LendingService<C, L>>>,
    payload: Result<Json<LoanApplication>, JsonRejection>,
) -> Response
where
    C: CustomerRepository + 'static,
    L: LoanRepository + 'static,
{
    let Json(application) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return invalid_payload(rejection),
    };

    match service.check_eligibility(&application, resolve_today(application.today)) {
        Ok(result) => {
            let body = EligibilityResponse {
                customer_id: application.customer_id(),
                approval: result.approval,
                interest_rate: application.interest_rate,
                corrected_interest_rate: result.corrected_interest_rate,
                tenure: application.tenure,
                monthly_installment: result.monthly_installment,
                score: result.score,
                decline_reason: result.decline_reason.as_ref().map(|reason| reason.summary()),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_loan_handler<C, L>(
    State(service): State<Arc<LendingService<C, L>>>,
    payload: Result<Json<LoanApplication>, JsonRejection>,
) -> Response
where
    C: CustomerRepository + 'static,
    L: LoanRepository + 'static,
{
    let Json(application) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return invalid_payload(rejection),
    };

    match service.create_loan(&application, resolve_today(application.today)) {
        Ok(creation) => (StatusCode::OK, Json(creation)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn view_loan_handler<C, L>(
    State(service): State<Arc<LendingService<C, L>>>,
    Path(loan_id): Path<u64>,
) -> Response
where
    C: CustomerRepository + 'static,
    L: LoanRepository + 'static,
{
    match service.loan(LoanId(loan_id)) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn view_loans_handler<C, L>(
    State(service): State<Arc<LendingService<C, L>>>,
    Path(customer_id): Path<u64>,
) -> Response
where
    C: CustomerRepository + 'static,
    L: LoanRepository + 'static,
{
    match service.customer_loans(CustomerId(customer_id)) {
        Ok(loans) => (StatusCode::OK, Json(loans)).into_response(),
        Err(error) => error_response(error),
    }
}

fn resolve_today(requested: Option<NaiveDate>) -> NaiveDate {
    requested.unwrap_or_else(|| Local::now().date_naive())
}

fn invalid_payload(rejection: JsonRejection) -> Response {
    let payload = json!({ "error": format!("invalid request: {}", rejection.body_text()) });
    (StatusCode::BAD_REQUEST, Json(payload)).into_response()
}

pub(crate) fn error_response(error: LendingServiceError) -> Response {
    let status = match &error {
        LendingServiceError::Eligibility(_)
        | LendingServiceError::TenureOutOfRange(_)
        | LendingServiceError::Registration(RegistrationError::MissingField(_))
        | LendingServiceError::Registration(RegistrationError::InvalidSalary(_)) => {
            StatusCode::BAD_REQUEST
        }
        LendingServiceError::Registration(RegistrationError::DuplicatePhone(_))
        | LendingServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        LendingServiceError::CustomerNotFound(_)
        | LendingServiceError::LoanNotFound(_)
        | LendingServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        LendingServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}
