use mime::Mime;

use super::documents::DocumentKey;
use super::domain::{
    ApplicationId, ClientRegistration, ClientRequestStatus, LoanApplication, LoanRequestDraft,
    SimulationRequest,
};
use super::evaluation::EvaluationAnswers;
use super::status::TransitionCode;

/// Remote credit backend. Every call maps to one backend request, so the
/// service can be exercised against an in-memory double.
pub trait LoanBackend: Send + Sync {
    fn list_applications(&self) -> Result<Vec<LoanApplication>, BackendError>;
    fn fetch_application(&self, id: ApplicationId) -> Result<LoanApplication, BackendError>;
    /// Monthly payment quoted by the backend's simulator.
    fn simulate_monthly_payment(&self, request: &SimulationRequest) -> Result<f64, BackendError>;
    fn edit_status(&self, id: ApplicationId, code: TransitionCode) -> Result<(), BackendError>;
    fn submit_evaluation(&self, answers: &EvaluationAnswers) -> Result<(), BackendError>;
    fn delete_application(&self, id: ApplicationId) -> Result<(), BackendError>;
    fn fetch_document(&self, id: ApplicationId, key: DocumentKey) -> Result<Vec<u8>, BackendError>;
    fn client_statuses(&self, rut: &str) -> Result<Vec<ClientRequestStatus>, BackendError>;
    fn create_application(&self, draft: &LoanRequestDraft) -> Result<ApplicationId, BackendError>;
    fn rut_available(&self, rut: &str) -> Result<bool, BackendError>;
    fn register_client(&self, registration: &ClientRegistration) -> Result<(), BackendError>;
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("credit request {0} not found")]
    NotFound(ApplicationId),
    #[error("document {key} missing for credit request {id}")]
    DocumentMissing { id: ApplicationId, key: DocumentKey },
    #[error("backend rejected the request: {0}")]
    Rejected(String),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Yes/no prompt shown before destructive actions.
pub trait Confirmation: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Hands downloaded bytes to the user under a file name.
pub trait FileDelivery: Send + Sync {
    fn deliver(&self, file_name: &str, content_type: &Mime, bytes: &[u8])
        -> Result<(), DeliveryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("could not write {file_name}: {source}")]
    Write {
        file_name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("delivery unavailable: {0}")]
    Unavailable(String),
}
