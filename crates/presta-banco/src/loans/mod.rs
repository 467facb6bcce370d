//! Loan desk rules for PrestaBanco mortgage requests.
//!
//! The rule modules (`ratios`, `savings`, `validation`, `status`) are pure and
//! synchronous. `service` composes them over the [`LoanBackend`] and the shell
//! capabilities ([`Confirmation`], [`FileDelivery`]), and `router` exposes the
//! service over HTTP.

pub mod backend;
pub mod documents;
pub mod domain;
pub mod evaluation;
pub mod listing;
pub mod ratios;
pub mod router;
pub mod savings;
pub mod service;
pub mod status;
pub mod validation;

#[cfg(test)]
mod tests;

pub use backend::{BackendError, Confirmation, DeliveryError, FileDelivery, LoanBackend};
pub use documents::{required_documents, Attachment, DocumentKey, DocumentRequirement};
pub use domain::{
    ApplicationId, ClientRegistration, ClientRequestStatus, LoanApplication, LoanRequestDraft,
    LoanType, SimulationRequest,
};
pub use evaluation::{EvaluationAnswers, EvaluationForm, EvaluationFormError, EvaluationQuestion};
pub use listing::{
    load_applications, parse_applications, request_rows, RequestImportError, RequestRow,
};
pub use ratios::{
    debt_to_income_ratio, payment_to_income_ratio, PositiveAmount, RatioAssessment,
    RatioInputError, RatioKind, RatioVerdict,
};
pub use router::loan_desk_router;
pub use savings::{score_savings, SavingsChecklist, SavingsOutcome, SavingsQuestion};
pub use service::{ActionOutcome, LoanDeskService, ServiceError, SimulationQuote};
pub use status::{
    action_label, label_for, next_action_for, EvaluationExit, NavigationTarget, NextAction,
    OfferResponse, TransitionCode,
};
pub use validation::{
    Field, FieldValidator, FormKind, FormSchema, FormSubmission, LoanTermsPolicy, ValidationResult,
};
