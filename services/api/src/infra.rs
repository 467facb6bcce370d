use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use mime::Mime;
use presta_banco::loans::{
    ApplicationId, Attachment, BackendError, ClientRegistration, ClientRequestStatus,
    Confirmation, DeliveryError, DocumentKey, EvaluationAnswers, FileDelivery, FormKind,
    LoanApplication, LoanBackend, LoanRequestDraft, LoanType, SimulationRequest, TransitionCode,
};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Monthly payment the in-memory backend quotes for every simulation.
pub(crate) const DEFAULT_MONTHLY_PAYMENT: f64 = 350_000.0;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local stand-in for the credit backend.
pub(crate) struct InMemoryLoanBackend {
    applications: Mutex<BTreeMap<ApplicationId, LoanApplication>>,
    documents: Mutex<BTreeMap<(ApplicationId, DocumentKey), Vec<u8>>>,
    evaluations: Mutex<Vec<EvaluationAnswers>>,
    clients: Mutex<BTreeSet<String>>,
    monthly_payment: f64,
}

impl InMemoryLoanBackend {
    pub(crate) fn new(applications: Vec<LoanApplication>, monthly_payment: f64) -> Self {
        Self {
            applications: Mutex::new(
                applications
                    .into_iter()
                    .map(|application| (application.id, application))
                    .collect(),
            ),
            documents: Mutex::new(BTreeMap::new()),
            evaluations: Mutex::new(Vec::new()),
            clients: Mutex::new(BTreeSet::new()),
            monthly_payment,
        }
    }

    pub(crate) fn store_document(&self, id: ApplicationId, key: DocumentKey, bytes: Vec<u8>) {
        self.documents
            .lock()
            .expect("documents mutex poisoned")
            .insert((id, key), bytes);
    }

    pub(crate) fn evaluations(&self) -> Vec<EvaluationAnswers> {
        self.evaluations
            .lock()
            .expect("evaluations mutex poisoned")
            .clone()
    }
}

impl LoanBackend for InMemoryLoanBackend {
    fn list_applications(&self) -> Result<Vec<LoanApplication>, BackendError> {
        let guard = self.applications.lock().expect("applications mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn fetch_application(&self, id: ApplicationId) -> Result<LoanApplication, BackendError> {
        let guard = self.applications.lock().expect("applications mutex poisoned");
        guard.get(&id).cloned().ok_or(BackendError::NotFound(id))
    }

    fn simulate_monthly_payment(&self, request: &SimulationRequest) -> Result<f64, BackendError> {
        debug!(amount = request.amount, term = request.term, "quoting fixed monthly payment");
        Ok(self.monthly_payment)
    }

    fn edit_status(&self, id: ApplicationId, code: TransitionCode) -> Result<(), BackendError> {
        let mut guard = self.applications.lock().expect("applications mutex poisoned");
        let application = guard.get_mut(&id).ok_or(BackendError::NotFound(id))?;
        application.status = code.resulting_status().to_string();
        Ok(())
    }

    fn submit_evaluation(&self, answers: &EvaluationAnswers) -> Result<(), BackendError> {
        let guard = self.applications.lock().expect("applications mutex poisoned");
        if !guard.contains_key(&answers.application_id) {
            return Err(BackendError::NotFound(answers.application_id));
        }
        self.evaluations
            .lock()
            .expect("evaluations mutex poisoned")
            .push(*answers);
        Ok(())
    }

    fn delete_application(&self, id: ApplicationId) -> Result<(), BackendError> {
        let mut guard = self.applications.lock().expect("applications mutex poisoned");
        guard.remove(&id).map(|_| ()).ok_or(BackendError::NotFound(id))
    }

    fn fetch_document(&self, id: ApplicationId, key: DocumentKey) -> Result<Vec<u8>, BackendError> {
        let guard = self.documents.lock().expect("documents mutex poisoned");
        guard
            .get(&(id, key))
            .cloned()
            .ok_or(BackendError::DocumentMissing { id, key })
    }

    fn client_statuses(&self, rut: &str) -> Result<Vec<ClientRequestStatus>, BackendError> {
        let guard = self.applications.lock().expect("applications mutex poisoned");
        Ok(guard
            .values()
            .filter(|application| application.rut.eq_ignore_ascii_case(rut))
            .map(|application| ClientRequestStatus {
                id: application.id,
                status: application.status.clone(),
            })
            .collect())
    }

    fn create_application(&self, draft: &LoanRequestDraft) -> Result<ApplicationId, BackendError> {
        let mut guard = self.applications.lock().expect("applications mutex poisoned");
        let id = ApplicationId(guard.keys().next_back().map_or(1, |last| last.0 + 1));
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
        let guard = self.clients.lock().expect("clients mutex poisoned");
        Ok(!guard.contains(&rut.to_ascii_lowercase()))
    }

    fn register_client(&self, registration: &ClientRegistration) -> Result<(), BackendError> {
        let mut guard = self.clients.lock().expect("clients mutex poisoned");
        if !guard.insert(registration.rut.to_ascii_lowercase()) {
            return Err(BackendError::Rejected(format!(
                "client {} already exists",
                registration.rut
            )));
        }
        Ok(())
    }
}

/// Local shell: answers confirmations from configuration and writes downloads
/// into a directory.
pub(crate) struct LocalShell {
    auto_confirm: bool,
    download_dir: PathBuf,
}

impl LocalShell {
    pub(crate) fn new(auto_confirm: bool, download_dir: PathBuf) -> Self {
        Self {
            auto_confirm,
            download_dir,
        }
    }
}

impl Confirmation for LocalShell {
    fn confirm(&self, prompt: &str) -> bool {
        info!(prompt, answer = self.auto_confirm, "confirmation answered from configuration");
        self.auto_confirm
    }
}

impl FileDelivery for LocalShell {
    fn deliver(
        &self,
        file_name: &str,
        content_type: &Mime,
        bytes: &[u8],
    ) -> Result<(), DeliveryError> {
        let write_error = |source: std::io::Error| DeliveryError::Write {
            file_name: file_name.to_string(),
            source,
        };
        fs::create_dir_all(&self.download_dir).map_err(write_error)?;
        let path = self.download_dir.join(file_name);
        fs::write(&path, bytes).map_err(write_error)?;
        info!(path = %path.display(), %content_type, bytes = bytes.len(), "download written");
        Ok(())
    }
}

/// Describes a local file as a form attachment, guessing its content type
/// from the extension.
pub(crate) fn attachment_from_path(path: &Path) -> Result<Attachment, std::io::Error> {
    let metadata = fs::metadata(path)?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let content_type = mime_guess::from_path(path)
        .first()
        .map(|guessed| guessed.essence_str().to_string());

    Ok(Attachment {
        file_name,
        content_type,
        size: metadata.len(),
    })
}

/// Request list used by `serve` and `demo` when no export is supplied.
pub(crate) fn demo_applications() -> Vec<LoanApplication> {
    let entries = [
        (1, "12345678-9", "Ana", "Rojas", "firstHome", 80_000_000, 4.2, 25, "En Evaluación"),
        (2, "9876543-k", "Luis", "Soto", "commercial", 40_000_000, 6.0, 15, "En Aprobación Final"),
        (3, "11222333-4", "Marta", "Díaz", "remodeling", 12_000_000, 5.0, 8, "Aprobada"),
        (4, "15444555-6", "Jorge", "Muñoz", "secondHome", 60_000_000, 5.1, 20, "En Desembolso"),
        (5, "17888999-0", "Paula", "Vera", "firstHome", 95_000_000, 3.9, 30, "Finalizada"),
    ];

    entries
        .into_iter()
        .map(
            |(id, rut, name, last_name, loan_type, maximum_amount, interest_rate, term, status)| {
                LoanApplication {
                    id: ApplicationId(id),
                    rut: rut.to_string(),
                    name: name.to_string(),
                    last_name: last_name.to_string(),
                    loan_type: loan_type.to_string(),
                    maximum_amount,
                    interest_rate,
                    term,
                    status: status.to_string(),
                }
            },
        )
        .collect()
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_form_kind(raw: &str) -> Result<FormKind, String> {
    FormKind::from_slug(raw).ok_or_else(|| {
        format!("unknown form '{raw}' (expected registration, simulation or a loan type code)")
    })
}

pub(crate) fn parse_loan_type(raw: &str) -> Result<LoanType, String> {
    LoanType::from_code(raw.trim()).ok_or_else(|| format!("unknown loan type '{raw}'"))
}

/// Parses `key=value` command-line pairs.
pub(crate) fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))
}
