use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use mime::Mime;
use serde_json::Value;

use crate::loans::backend::{BackendError, Confirmation, DeliveryError, FileDelivery, LoanBackend};
use crate::loans::documents::{Attachment, DocumentKey};
use crate::loans::domain::{
    ApplicationId, ClientRegistration, ClientRequestStatus, LoanApplication, LoanRequestDraft,
    SimulationRequest,
};
use crate::loans::evaluation::EvaluationAnswers;
use crate::loans::router::loan_desk_router;
use crate::loans::service::LoanDeskService;
use crate::loans::status::TransitionCode;
use crate::loans::validation::FormSubmission;

pub(super) fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date")
}

pub(super) fn application(id: u64, loan_type: &str, status: &str) -> LoanApplication {
    LoanApplication {
        id: ApplicationId(id),
        rut: "12345678-9".to_string(),
        name: "Ana".to_string(),
        last_name: "Rojas".to_string(),
        loan_type: loan_type.to_string(),
        maximum_amount: 80_000_000,
        interest_rate: 4.2,
        term: 25,
        status: status.to_string(),
    }
}

pub(super) fn simulation_submission() -> FormSubmission {
    FormSubmission::default()
        .with_value("amount", "50000000")
        .with_value("interestRate", "4.5")
        .with_value("term", "20")
}

pub(super) fn first_home_submission() -> FormSubmission {
    FormSubmission::default()
        .with_value("rut", "12345678-9")
        .with_value("maximumAmount", "80000000")
        .with_value("interestRate", "4.2")
        .with_value("term", "25")
        .with_attachment("proofIncome", Attachment::pdf("liquidaciones.pdf", 20_480))
        .with_attachment("appraisalCertificate", Attachment::pdf("tasacion.pdf", 51_200))
        .with_attachment("creditHistory", Attachment::pdf("dicom.pdf", 10_240))
        .with_attachment("bankAccountState", Attachment::pdf("cartola.pdf", 8_192))
        .with_attachment("workCertificate", Attachment::pdf("contrato.pdf", 4_096))
}

pub(super) fn registration_submission() -> FormSubmission {
    FormSubmission::default()
        .with_value("name", "Ana")
        .with_value("lastName", "Rojas")
        .with_value("rut", "12345678-9")
        .with_value("password", "Secreta123")
        .with_value("dateOfBirth", "1990-05-01")
        .with_value("email", "ana@prestabanco.cl")
}

pub(super) type TestService = LoanDeskService<MemoryBackend, RecordingShell>;

pub(super) fn build_service(
    applications: Vec<LoanApplication>,
) -> (TestService, Arc<MemoryBackend>, Arc<RecordingShell>) {
    let backend = Arc::new(MemoryBackend::with_applications(applications));
    let shell = Arc::new(RecordingShell::confirming(true));
    let service = LoanDeskService::new(backend.clone(), shell.clone())
        .with_reference_date(reference_date());
    (service, backend, shell)
}

pub(super) fn router_with_service(service: TestService) -> axum::Router {
    loan_desk_router(Arc::new(service))
}

/// Backend double that quotes a fixed monthly payment and records calls.
pub(super) struct MemoryBackend {
    pub(super) applications: Mutex<BTreeMap<ApplicationId, LoanApplication>>,
    pub(super) status_edits: Mutex<Vec<(ApplicationId, TransitionCode)>>,
    pub(super) evaluations: Mutex<Vec<EvaluationAnswers>>,
    pub(super) registered: Mutex<Vec<ClientRegistration>>,
    pub(super) taken_ruts: Mutex<BTreeSet<String>>,
    pub(super) documents: Mutex<BTreeMap<(ApplicationId, DocumentKey), Vec<u8>>>,
    pub(super) monthly_payment: f64,
    pub(super) calls: AtomicUsize,
}

impl MemoryBackend {
    pub(super) fn with_applications(applications: Vec<LoanApplication>) -> Self {
        Self {
            applications: Mutex::new(
                applications
                    .into_iter()
                    .map(|application| (application.id, application))
                    .collect(),
            ),
            status_edits: Mutex::new(Vec::new()),
            evaluations: Mutex::new(Vec::new()),
            registered: Mutex::new(Vec::new()),
            taken_ruts: Mutex::new(BTreeSet::new()),
            documents: Mutex::new(BTreeMap::new()),
            monthly_payment: 350_000.0,
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(super) fn status_edits(&self) -> Vec<(ApplicationId, TransitionCode)> {
        self.status_edits.lock().expect("edits mutex poisoned").clone()
    }

    pub(super) fn evaluations(&self) -> Vec<EvaluationAnswers> {
        self.evaluations.lock().expect("evaluations mutex poisoned").clone()
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl LoanBackend for MemoryBackend {
    fn list_applications(&self) -> Result<Vec<LoanApplication>, BackendError> {
        self.record_call();
        let guard = self.applications.lock().expect("applications mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn fetch_application(&self, id: ApplicationId) -> Result<LoanApplication, BackendError> {
        self.record_call();
        let guard = self.applications.lock().expect("applications mutex poisoned");
        guard.get(&id).cloned().ok_or(BackendError::NotFound(id))
    }

    fn simulate_monthly_payment(&self, _request: &SimulationRequest) -> Result<f64, BackendError> {
        self.record_call();
        Ok(self.monthly_payment)
    }

    fn edit_status(&self, id: ApplicationId, code: TransitionCode) -> Result<(), BackendError> {
        self.record_call();
        let mut guard = self.applications.lock().expect("applications mutex poisoned");
        let application = guard.get_mut(&id).ok_or(BackendError::NotFound(id))?;
        application.status = code.resulting_status().to_string();
        self.status_edits
            .lock()
            .expect("edits mutex poisoned")
            .push((id, code));
        Ok(())
    }

    fn submit_evaluation(&self, answers: &EvaluationAnswers) -> Result<(), BackendError> {
        self.record_call();
        self.evaluations
            .lock()
            .expect("evaluations mutex poisoned")
            .push(*answers);
        Ok(())
    }

    fn delete_application(&self, id: ApplicationId) -> Result<(), BackendError> {
        self.record_call();
        let mut guard = self.applications.lock().expect("applications mutex poisoned");
        guard.remove(&id).map(|_| ()).ok_or(BackendError::NotFound(id))
    }

    fn fetch_document(&self, id: ApplicationId, key: DocumentKey) -> Result<Vec<u8>, BackendError> {
        self.record_call();
        let guard = self.documents.lock().expect("documents mutex poisoned");
        guard
            .get(&(id, key))
            .cloned()
            .ok_or(BackendError::DocumentMissing { id, key })
    }

    fn client_statuses(&self, rut: &str) -> Result<Vec<ClientRequestStatus>, BackendError> {
        self.record_call();
        let guard = self.applications.lock().expect("applications mutex poisoned");
        Ok(guard
            .values()
            .filter(|application| application.rut == rut)
            .map(|application| ClientRequestStatus {
                id: application.id,
                status: application.status.clone(),
            })
            .collect())
    }

    fn create_application(&self, draft: &LoanRequestDraft) -> Result<ApplicationId, BackendError> {
        self.record_call();
        let mut guard = self.applications.lock().expect("applications mutex poisoned");
        let id = ApplicationId(guard.keys().map(|id| id.0).max().unwrap_or(0) + 1);
        guard.insert(
            id,
            LoanApplication {
                id,
                rut: draft.rut.clone(),
                name: String::new(),
                last_name: String::new(),
                loan_type: draft.loan_type.code().to_string(),
                maximum_amount: draft.maximum_amount,
                interest_rate: draft.interest_rate,
                term: draft.term,
                status: TransitionCode::E1.resulting_status().to_string(),
            },
        );
        Ok(id)
    }

    fn rut_available(&self, rut: &str) -> Result<bool, BackendError> {
        self.record_call();
        let guard = self.taken_ruts.lock().expect("ruts mutex poisoned");
        Ok(!guard.contains(rut))
    }

    fn register_client(&self, registration: &ClientRegistration) -> Result<(), BackendError> {
        self.record_call();
        self.taken_ruts
            .lock()
            .expect("ruts mutex poisoned")
            .insert(registration.rut.clone());
        self.registered
            .lock()
            .expect("registered mutex poisoned")
            .push(registration.clone());
        Ok(())
    }
}

pub(super) struct UnavailableBackend;

impl LoanBackend for UnavailableBackend {
    fn list_applications(&self) -> Result<Vec<LoanApplication>, BackendError> {
        Err(BackendError::Unavailable("connection refused".to_string()))
    }

    fn fetch_application(&self, _id: ApplicationId) -> Result<LoanApplication, BackendError> {
        Err(BackendError::Unavailable("connection refused".to_string()))
    }

    fn simulate_monthly_payment(&self, _request: &SimulationRequest) -> Result<f64, BackendError> {
        Err(BackendError::Unavailable("connection refused".to_string()))
    }

    fn edit_status(&self, _id: ApplicationId, _code: TransitionCode) -> Result<(), BackendError> {
        Err(BackendError::Unavailable("connection refused".to_string()))
    }

    fn submit_evaluation(&self, _answers: &EvaluationAnswers) -> Result<(), BackendError> {
        Err(BackendError::Unavailable("connection refused".to_string()))
    }

    fn delete_application(&self, _id: ApplicationId) -> Result<(), BackendError> {
        Err(BackendError::Unavailable("connection refused".to_string()))
    }

    fn fetch_document(
        &self,
        _id: ApplicationId,
        _key: DocumentKey,
    ) -> Result<Vec<u8>, BackendError> {
        Err(BackendError::Unavailable("connection refused".to_string()))
    }

    fn client_statuses(&self, _rut: &str) -> Result<Vec<ClientRequestStatus>, BackendError> {
        Err(BackendError::Unavailable("connection refused".to_string()))
    }

    fn create_application(
        &self,
        _draft: &LoanRequestDraft,
    ) -> Result<ApplicationId, BackendError> {
        Err(BackendError::Unavailable("connection refused".to_string()))
    }

    fn rut_available(&self, _rut: &str) -> Result<bool, BackendError> {
        Err(BackendError::Unavailable("connection refused".to_string()))
    }

    fn register_client(&self, _registration: &ClientRegistration) -> Result<(), BackendError> {
        Err(BackendError::Unavailable("connection refused".to_string()))
    }
}

/// Shell double answering every prompt the same way and keeping deliveries.
pub(super) struct RecordingShell {
    answer: bool,
    pub(super) prompts: Mutex<Vec<String>>,
    pub(super) deliveries: Mutex<Vec<(String, String, usize)>>,
}

impl RecordingShell {
    pub(super) fn confirming(answer: bool) -> Self {
        Self {
            answer,
            prompts: Mutex::new(Vec::new()),
            deliveries: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts mutex poisoned").clone()
    }

    pub(super) fn deliveries(&self) -> Vec<(String, String, usize)> {
        self.deliveries.lock().expect("deliveries mutex poisoned").clone()
    }
}

impl Confirmation for RecordingShell {
    fn confirm(&self, prompt: &str) -> bool {
        self.prompts
            .lock()
            .expect("prompts mutex poisoned")
            .push(prompt.to_string());
        self.answer
    }
}

impl FileDelivery for RecordingShell {
    fn deliver(
        &self,
        file_name: &str,
        content_type: &Mime,
        bytes: &[u8],
    ) -> Result<(), DeliveryError> {
        self.deliveries
            .lock()
            .expect("deliveries mutex poisoned")
            .push((file_name.to_string(), content_type.to_string(), bytes.len()));
        Ok(())
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
