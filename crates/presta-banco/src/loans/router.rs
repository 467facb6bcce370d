use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::backend::{BackendError, Confirmation, FileDelivery, LoanBackend};
use super::documents::required_documents;
use super::domain::{ApplicationId, LoanType};
use super::ratios::{
    parse_non_negative, PositiveAmount, RatioAssessment, RatioKind, RatioVerdict,
};
use super::savings::{SavingsChecklist, SavingsOutcome};
use super::service::{LoanDeskService, ServiceError};
use super::validation::{FieldValidator, FormKind, FormSchema, FormSubmission, LoanTermsPolicy};

/// Router builder exposing the loan desk over JSON.
pub fn loan_desk_router<B, S>(service: Arc<LoanDeskService<B, S>>) -> Router
where
    B: LoanBackend + 'static,
    S: Confirmation + FileDelivery + 'static,
{
    Router::new()
        .route("/api/v1/validation/field", post(validate_field_handler::<B, S>))
        .route(
            "/api/v1/validation/forms/:form",
            post(validate_form_handler::<B, S>),
        )
        .route(
            "/api/v1/ratios/payment-to-income",
            post(payment_to_income_handler),
        )
        .route(
            "/api/v1/ratios/debt-to-income",
            post(debt_to_income_handler::<B, S>),
        )
        .route("/api/v1/savings/score", post(savings_score_handler))
        .route("/api/v1/loan-types", get(loan_types_handler))
        .route(
            "/api/v1/loan-types/:code/documents",
            get(loan_type_documents_handler),
        )
        .route("/api/v1/requests", get(request_rows_handler::<B, S>))
        .route(
            "/api/v1/requests/:id/action",
            post(request_action_handler::<B, S>),
        )
        .route(
            "/api/v1/requests/:id/payment-ratio",
            post(payment_ratio_handler::<B, S>),
        )
        .with_state(service)
}

/// Amount sent either as a JSON number or as the raw text of an input box.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawAmount {
    Number(f64),
    Text(String),
}

impl RawAmount {
    fn as_raw(&self) -> String {
        match self {
            RawAmount::Number(value) => value.to_string(),
            RawAmount::Text(raw) => raw.clone(),
        }
    }
}

fn raw_or_empty(amount: &Option<RawAmount>) -> String {
    amount.as_ref().map(RawAmount::as_raw).unwrap_or_default()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FieldRequest {
    pub(crate) field: String,
    #[serde(default)]
    pub(crate) value: String,
    #[serde(default)]
    pub(crate) loan_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PaymentRatioRequest {
    #[serde(default)]
    pub(crate) monthly_payment: Option<RawAmount>,
    #[serde(default)]
    pub(crate) monthly_income: Option<RawAmount>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DebtRatioRequest {
    #[serde(default)]
    pub(crate) current_debts: Option<RawAmount>,
    #[serde(default)]
    pub(crate) monthly_income: Option<RawAmount>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IncomeRequest {
    #[serde(default)]
    pub(crate) monthly_income: Option<RawAmount>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SavingsScoreRequest {
    #[serde(default)]
    pub(crate) savings_capacity: Option<bool>,
    #[serde(flatten)]
    pub(crate) checklist: SavingsChecklist,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RatioView {
    kind: RatioKind,
    ratio: f64,
    limit: f64,
    verdict: RatioVerdict,
    approved: bool,
    message: &'static str,
    summary: String,
}

impl From<RatioAssessment> for RatioView {
    fn from(assessment: RatioAssessment) -> Self {
        Self {
            kind: assessment.kind,
            ratio: assessment.ratio,
            limit: assessment.limit,
            verdict: assessment.verdict,
            approved: assessment.is_approved(),
            message: assessment.message(),
            summary: assessment.summary(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoanTypeView {
    code: &'static str,
    label: &'static str,
    description: &'static str,
    bounds: LoanTermsPolicy,
}

pub(crate) async fn validate_field_handler<B, S>(
    State(service): State<Arc<LoanDeskService<B, S>>>,
    axum::Json(request): axum::Json<FieldRequest>,
) -> Response
where
    B: LoanBackend + 'static,
    S: Confirmation + FileDelivery + 'static,
{
    let today = service.today();
    let validator = match request.loan_type.as_deref() {
        None => FieldValidator::for_simulation(today),
        Some(code) => match LoanType::from_code(code) {
            Some(loan_type) => FieldValidator::for_loan_type(loan_type, today),
            None => return unknown_loan_type(code),
        },
    };

    let message = validator.validate(&request.field, &request.value);
    let payload = json!({
        "field": request.field,
        "valid": message.is_empty(),
        "message": message,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn validate_form_handler<B, S>(
    State(service): State<Arc<LoanDeskService<B, S>>>,
    Path(form): Path<String>,
    axum::Json(submission): axum::Json<FormSubmission>,
) -> Response
where
    B: LoanBackend + 'static,
    S: Confirmation + FileDelivery + 'static,
{
    let Some(kind) = FormKind::from_slug(&form) else {
        let payload = json!({
            "error": format!("unknown form '{form}'"),
        });
        return (StatusCode::NOT_FOUND, axum::Json(payload)).into_response();
    };

    let result = FormSchema::for_kind(kind).validate(&submission, service.today());
    let status = if result.is_valid() {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    let payload = json!({
        "form": kind.to_string(),
        "valid": result.is_valid(),
        "messages": result,
    });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn payment_to_income_handler(
    axum::Json(request): axum::Json<PaymentRatioRequest>,
) -> Response {
    match payment_ratio(&request) {
        Ok(assessment) => (StatusCode::OK, axum::Json(RatioView::from(assessment))).into_response(),
        Err(error) => error_response(error),
    }
}

fn payment_ratio(request: &PaymentRatioRequest) -> Result<RatioAssessment, ServiceError> {
    let income = PositiveAmount::parse("monthlyIncome", &raw_or_empty(&request.monthly_income))?;
    let payment = parse_non_negative("monthlyPayment", &raw_or_empty(&request.monthly_payment))?;
    Ok(RatioAssessment::assess(
        RatioKind::PaymentToIncome,
        payment,
        income.get(),
    ))
}

pub(crate) async fn debt_to_income_handler<B, S>(
    State(service): State<Arc<LoanDeskService<B, S>>>,
    axum::Json(request): axum::Json<DebtRatioRequest>,
) -> Response
where
    B: LoanBackend + 'static,
    S: Confirmation + FileDelivery + 'static,
{
    let debts = raw_or_empty(&request.current_debts);
    let income = raw_or_empty(&request.monthly_income);
    match service.debt_to_income(&debts, &income) {
        Ok(assessment) => (StatusCode::OK, axum::Json(RatioView::from(assessment))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn savings_score_handler(
    axum::Json(request): axum::Json<SavingsScoreRequest>,
) -> Response {
    let outcome: SavingsOutcome = request.checklist.score(request.savings_capacity);
    let payload = json!({
        "outcome": outcome,
        "label": outcome.label(),
        "savingsCapacity": outcome.grants_capacity(),
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn loan_types_handler() -> Response {
    let views: Vec<LoanTypeView> = LoanType::ALL
        .into_iter()
        .map(|loan_type| LoanTypeView {
            code: loan_type.code(),
            label: loan_type.label(),
            description: loan_type.description(),
            bounds: LoanTermsPolicy::for_loan_type(loan_type),
        })
        .collect();
    (StatusCode::OK, axum::Json(views)).into_response()
}

pub(crate) async fn loan_type_documents_handler(Path(code): Path<String>) -> Response {
    let Some(loan_type) = LoanType::from_code(&code) else {
        return unknown_loan_type(&code);
    };

    let documents: Vec<_> = required_documents(loan_type)
        .iter()
        .map(|requirement| {
            json!({
                "key": requirement.key.key(),
                "label": requirement.label,
                "downloadName": requirement.key.download_name(),
            })
        })
        .collect();
    (StatusCode::OK, axum::Json(documents)).into_response()
}

pub(crate) async fn request_rows_handler<B, S>(
    State(service): State<Arc<LoanDeskService<B, S>>>,
) -> Response
where
    B: LoanBackend + 'static,
    S: Confirmation + FileDelivery + 'static,
{
    match service.request_rows() {
        Ok(rows) => (StatusCode::OK, axum::Json(rows)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn request_action_handler<B, S>(
    State(service): State<Arc<LoanDeskService<B, S>>>,
    Path(id): Path<u64>,
) -> Response
where
    B: LoanBackend + 'static,
    S: Confirmation + FileDelivery + 'static,
{
    let id = ApplicationId(id);
    let outcome = service
        .backend()
        .fetch_application(id)
        .map_err(ServiceError::from)
        .and_then(|application| service.trigger_action(id, &application.status));

    match outcome {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn payment_ratio_handler<B, S>(
    State(service): State<Arc<LoanDeskService<B, S>>>,
    Path(id): Path<u64>,
    axum::Json(request): axum::Json<IncomeRequest>,
) -> Response
where
    B: LoanBackend + 'static,
    S: Confirmation + FileDelivery + 'static,
{
    let income = raw_or_empty(&request.monthly_income);
    let assessment = service
        .backend()
        .fetch_application(ApplicationId(id))
        .map_err(ServiceError::from)
        .and_then(|application| service.payment_to_income(&application, &income));

    match assessment {
        Ok(assessment) => (StatusCode::OK, axum::Json(RatioView::from(assessment))).into_response(),
        Err(error) => error_response(error),
    }
}

fn unknown_loan_type(code: &str) -> Response {
    let payload = json!({
        "error": format!("unknown loan type '{code}'"),
    });
    (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
}

pub(crate) fn error_response(error: ServiceError) -> Response {
    let status = match &error {
        ServiceError::Input(_) | ServiceError::Validation(_) | ServiceError::Evaluation(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ServiceError::ActionDisabled { .. } | ServiceError::RutUnavailable(_) => {
            StatusCode::CONFLICT
        }
        ServiceError::Backend(BackendError::NotFound(_))
        | ServiceError::Backend(BackendError::DocumentMissing { .. }) => StatusCode::NOT_FOUND,
        ServiceError::Backend(_) | ServiceError::Delivery(_) => StatusCode::BAD_GATEWAY,
    };

    let payload = match &error {
        ServiceError::Validation(result) => json!({
            "error": error.to_string(),
            "messages": result,
        }),
        _ => json!({
            "error": error.to_string(),
        }),
    };
    (status, axum::Json(payload)).into_response()
}
