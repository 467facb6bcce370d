use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::backend::{BackendError, Confirmation, DeliveryError, FileDelivery, LoanBackend};
use super::documents::DocumentKey;
use super::domain::{
    ApplicationId, ClientRegistration, ClientRequestStatus, LoanApplication, LoanRequestDraft,
    LoanType, SimulationRequest,
};
use super::evaluation::{EvaluationForm, EvaluationFormError};
use super::listing::{request_rows, RequestRow};
use super::ratios::{
    parse_non_negative, PositiveAmount, RatioAssessment, RatioInputError, RatioKind,
};
use super::status::{
    next_action_for, EvaluationExit, NavigationTarget, NextAction, OfferResponse, TransitionCode,
};
use super::validation::{self, Field, FieldValidator, FormSubmission, ValidationResult};

pub const DELETE_PROMPT: &str = "¿Está seguro de eliminar esta solicitud?";

/// What triggering a row action did.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionOutcome {
    Transitioned {
        id: ApplicationId,
        code: TransitionCode,
        status: &'static str,
    },
    Navigate {
        id: ApplicationId,
        target: NavigationTarget,
    },
}

/// Monthly payment quoted for a validated simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationQuote {
    pub request: SimulationRequest,
    pub monthly_payment: f64,
}

/// Loan desk operations composing the validator, ratio rules and status
/// mapper over a credit backend and the user-facing shell.
pub struct LoanDeskService<B, S> {
    backend: Arc<B>,
    shell: Arc<S>,
    reference_date: Option<NaiveDate>,
}

impl<B, S> LoanDeskService<B, S>
where
    B: LoanBackend + 'static,
    S: Confirmation + FileDelivery + 'static,
{
    pub fn new(backend: Arc<B>, shell: Arc<S>) -> Self {
        Self {
            backend,
            shell,
            reference_date: None,
        }
    }

    /// Pins the date age checks run against instead of the local calendar.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.reference_date.unwrap_or_else(validation::today)
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub fn request_rows(&self) -> Result<Vec<RequestRow>, ServiceError> {
        let applications = self.backend.list_applications()?;
        Ok(request_rows(&applications))
    }

    /// Runs the row button for a request in `status`. Disabled rows never
    /// reach the backend.
    pub fn trigger_action(
        &self,
        id: ApplicationId,
        status: &str,
    ) -> Result<ActionOutcome, ServiceError> {
        match next_action_for(status) {
            NextAction::Disabled => {
                warn!(%id, status, "action requested on a closed credit request");
                Err(ServiceError::ActionDisabled {
                    id,
                    status: status.to_string(),
                })
            }
            NextAction::Navigate { target } => Ok(ActionOutcome::Navigate { id, target }),
            NextAction::Transition { target_status } => {
                self.backend.edit_status(id, target_status)?;
                info!(%id, code = %target_status, "credit request status updated");
                Ok(ActionOutcome::Transitioned {
                    id,
                    code: target_status,
                    status: target_status.resulting_status(),
                })
            }
        }
    }

    /// Quotes the application's monthly payment and relates it to income.
    /// Income is checked before the backend is called.
    pub fn payment_to_income(
        &self,
        application: &LoanApplication,
        monthly_income: &str,
    ) -> Result<RatioAssessment, ServiceError> {
        let income = PositiveAmount::parse("monthlyIncome", monthly_income).map_err(|err| {
            warn!(id = %application.id, error = %err, "payment ratio rejected");
            err
        })?;

        let monthly_payment = self
            .backend
            .simulate_monthly_payment(&application.simulation_request())?;
        let assessment =
            RatioAssessment::assess(RatioKind::PaymentToIncome, monthly_payment, income.get());
        debug!(
            id = %application.id,
            monthly_payment,
            ratio = assessment.ratio,
            "payment to income computed"
        );
        Ok(assessment)
    }

    pub fn debt_to_income(
        &self,
        current_debts: &str,
        monthly_income: &str,
    ) -> Result<RatioAssessment, ServiceError> {
        let income = PositiveAmount::parse("monthlyIncome", monthly_income)?;
        let debts = parse_non_negative("currentDebts", current_debts)?;
        let assessment = RatioAssessment::assess(RatioKind::DebtToIncome, debts, income.get());
        debug!(ratio = assessment.ratio, "debt to income computed");
        Ok(assessment)
    }

    pub fn submit_evaluation(&self, form: &EvaluationForm) -> Result<(), ServiceError> {
        let answers = form.submission()?;
        self.backend.submit_evaluation(&answers)?;
        info!(id = %answers.application_id, "evaluation submitted");
        Ok(())
    }

    pub fn leave_evaluation(
        &self,
        id: ApplicationId,
        exit: EvaluationExit,
    ) -> Result<TransitionCode, ServiceError> {
        let code = exit.transition();
        self.backend.edit_status(id, code)?;
        info!(%id, ?exit, code = %code, "evaluation closed without submission");
        Ok(code)
    }

    pub fn respond_to_offer(
        &self,
        id: ApplicationId,
        response: OfferResponse,
    ) -> Result<TransitionCode, ServiceError> {
        let code = response.transition();
        self.backend.edit_status(id, code)?;
        info!(%id, ?response, code = %code, "offer answered");
        Ok(code)
    }

    pub fn client_requests(&self, rut: &str) -> Result<Vec<ClientRequestStatus>, ServiceError> {
        let validator = FieldValidator::for_simulation(self.today());
        let message = validator.validate_field(Field::Rut, rut);
        if !message.is_empty() {
            let mut result = ValidationResult::new();
            result.record(Field::Rut.name(), message);
            return Err(ServiceError::Validation(result));
        }
        Ok(self.backend.client_statuses(rut.trim())?)
    }

    /// Deletes after the user confirms. Returns `false` when declined.
    pub fn delete_request(&self, id: ApplicationId) -> Result<bool, ServiceError> {
        if !self.shell.confirm(DELETE_PROMPT) {
            debug!(%id, "deletion declined");
            return Ok(false);
        }
        self.backend.delete_application(id)?;
        info!(%id, "credit request deleted");
        Ok(true)
    }

    /// Fetches a stored document and hands it to the shell as `<key>.pdf`.
    pub fn download_document(
        &self,
        id: ApplicationId,
        key: DocumentKey,
    ) -> Result<String, ServiceError> {
        let bytes = self.backend.fetch_document(id, key)?;
        let file_name = key.download_name();
        self.shell.deliver(&file_name, &mime::APPLICATION_PDF, &bytes)?;
        info!(%id, file = %file_name, bytes = bytes.len(), "document delivered");
        Ok(file_name)
    }

    pub fn simulate(&self, submission: &FormSubmission) -> Result<SimulationQuote, ServiceError> {
        let request = SimulationRequest::from_submission(submission, self.today())
            .map_err(|result| rejected("simulation", result))?;
        let monthly_payment = self.backend.simulate_monthly_payment(&request)?;
        Ok(SimulationQuote {
            request,
            monthly_payment,
        })
    }

    pub fn submit_loan_request(
        &self,
        loan_type: LoanType,
        submission: &FormSubmission,
    ) -> Result<ApplicationId, ServiceError> {
        let draft = LoanRequestDraft::from_submission(loan_type, submission, self.today())
            .map_err(|result| rejected(loan_type.code(), result))?;
        let id = self.backend.create_application(&draft)?;
        info!(
            %id,
            loan_type = loan_type.code(),
            documents = draft.documents.len(),
            "loan request created"
        );
        Ok(id)
    }

    pub fn register_client(&self, submission: &FormSubmission) -> Result<(), ServiceError> {
        let registration = ClientRegistration::from_submission(submission, self.today())
            .map_err(|result| rejected("registration", result))?;
        if !self.backend.rut_available(&registration.rut)? {
            warn!(rut = %registration.rut, "registration with a RUT already in use");
            return Err(ServiceError::RutUnavailable(registration.rut));
        }
        self.backend.register_client(&registration)?;
        info!(rut = %registration.rut, "client registered");
        Ok(())
    }
}

fn rejected(form: &str, result: ValidationResult) -> ServiceError {
    warn!(form, failures = %result, "form rejected");
    ServiceError::Validation(result)
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Input(#[from] RatioInputError),
    #[error("validation failed: {0}")]
    Validation(ValidationResult),
    #[error(transparent)]
    Evaluation(#[from] EvaluationFormError),
    #[error("credit request {id} is '{status}' and has no action")]
    ActionDisabled { id: ApplicationId, status: String },
    #[error("RUT {0} is already registered")]
    RutUnavailable(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}
