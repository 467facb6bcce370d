use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::rules::{parse_date, parse_number};
use super::{FieldValidator, LoanTermsPolicy, ValidationResult};
use crate::loans::documents::{required_documents, Attachment, DocumentRequirement};
use crate::loans::domain::{ClientRegistration, LoanRequestDraft, LoanType, SimulationRequest};

pub const FIELD_REQUIRED: &str = "Campo requerido";

const REGISTRATION_FIELDS: &[&str] = &[
    "name",
    "lastName",
    "rut",
    "password",
    "dateOfBirth",
    "email",
];
const SIMULATION_FIELDS: &[&str] = &["amount", "interestRate", "term"];
const LOAN_REQUEST_FIELDS: &[&str] = &["rut", "maximumAmount", "interestRate", "term"];

/// Which desk form a schema drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    Registration,
    Simulation,
    LoanRequest(LoanType),
}

impl FormKind {
    /// Accepts `registration`, `simulation` or a loan type code.
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug.trim() {
            "registration" => Some(FormKind::Registration),
            "simulation" => Some(FormKind::Simulation),
            other => LoanType::from_code(other).map(FormKind::LoanRequest),
        }
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormKind::Registration => f.write_str("registration"),
            FormKind::Simulation => f.write_str("simulation"),
            FormKind::LoanRequest(loan_type) => write!(f, "{}", loan_type.code()),
        }
    }
}

/// Raw values and attachments captured by a form, keyed by field / document key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormSubmission {
    #[serde(default)]
    pub values: BTreeMap<String, String>,
    #[serde(default)]
    pub attachments: BTreeMap<String, Attachment>,
}

impl FormSubmission {
    pub fn with_value(mut self, field: &str, value: impl Into<String>) -> Self {
        self.values.insert(field.to_string(), value.into());
        self
    }

    pub fn with_attachment(mut self, key: &str, attachment: Attachment) -> Self {
        self.attachments.insert(key.to_string(), attachment);
        self
    }

    pub fn value(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or("")
    }

    fn number(&self, field: &str) -> f64 {
        parse_number(self.value(field)).unwrap_or_default()
    }
}

/// One parameterized description of a desk form: required fields, required
/// document slots and the bounds policy its numeric rules use.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSchema {
    kind: FormKind,
    fields: &'static [&'static str],
    documents: &'static [DocumentRequirement],
    policy: LoanTermsPolicy,
}

impl FormSchema {
    pub fn for_kind(kind: FormKind) -> Self {
        match kind {
            FormKind::Registration => Self {
                kind,
                fields: REGISTRATION_FIELDS,
                documents: &[],
                policy: LoanTermsPolicy::SIMULATION,
            },
            FormKind::Simulation => Self {
                kind,
                fields: SIMULATION_FIELDS,
                documents: &[],
                policy: LoanTermsPolicy::SIMULATION,
            },
            FormKind::LoanRequest(loan_type) => Self {
                kind,
                fields: LOAN_REQUEST_FIELDS,
                documents: required_documents(loan_type),
                policy: LoanTermsPolicy::for_loan_type(loan_type),
            },
        }
    }

    pub fn kind(&self) -> FormKind {
        self.kind
    }

    pub fn fields(&self) -> &'static [&'static str] {
        self.fields
    }

    pub fn documents(&self) -> &'static [DocumentRequirement] {
        self.documents
    }

    pub fn validator(&self, today: NaiveDate) -> FieldValidator {
        FieldValidator::new(self.policy, today)
    }

    /// Runs every field rule and document check. The form may be submitted only
    /// when the returned result is valid.
    pub fn validate(&self, submission: &FormSubmission, today: NaiveDate) -> ValidationResult {
        let validator = self.validator(today);
        let mut result = ValidationResult::new();

        for field in self.fields {
            let raw = submission.value(field);
            let mut message = validator.validate(field, raw);
            if message.is_empty() && raw.trim().is_empty() {
                message = FIELD_REQUIRED.to_string();
            }
            result.record(*field, message);
        }

        for requirement in self.documents {
            let key = requirement.key.key();
            let message = validator.validate_document(submission.attachments.get(key));
            result.record(key, message);
        }

        result
    }
}

impl SimulationRequest {
    pub fn from_submission(
        submission: &FormSubmission,
        today: NaiveDate,
    ) -> Result<Self, ValidationResult> {
        let result = FormSchema::for_kind(FormKind::Simulation).validate(submission, today);
        if !result.is_valid() {
            return Err(result);
        }

        Ok(SimulationRequest {
            amount: submission.number("amount") as u64,
            interest_rate: submission.number("interestRate"),
            term: submission.number("term") as u32,
        })
    }
}

impl LoanRequestDraft {
    pub fn from_submission(
        loan_type: LoanType,
        submission: &FormSubmission,
        today: NaiveDate,
    ) -> Result<Self, ValidationResult> {
        let schema = FormSchema::for_kind(FormKind::LoanRequest(loan_type));
        let result = schema.validate(submission, today);
        if !result.is_valid() {
            return Err(result);
        }

        let documents = schema
            .documents()
            .iter()
            .filter_map(|requirement| submission.attachments.get(requirement.key.key()))
            .cloned()
            .collect();

        Ok(LoanRequestDraft {
            rut: submission.value("rut").trim().to_string(),
            loan_type,
            maximum_amount: submission.number("maximumAmount") as u64,
            interest_rate: submission.number("interestRate"),
            term: submission.number("term") as u32,
            documents,
        })
    }
}

impl ClientRegistration {
    pub fn from_submission(
        submission: &FormSubmission,
        today: NaiveDate,
    ) -> Result<Self, ValidationResult> {
        let result = FormSchema::for_kind(FormKind::Registration).validate(submission, today);
        if !result.is_valid() {
            return Err(result);
        }

        let mut invalid_date = ValidationResult::new();
        let date_of_birth = match parse_date(submission.value("dateOfBirth")) {
            Some(date) => date,
            None => {
                invalid_date.record("dateOfBirth", super::rules::DATE_FORMAT.to_string());
                return Err(invalid_date);
            }
        };

        Ok(ClientRegistration {
            name: submission.value("name").trim().to_string(),
            last_name: submission.value("lastName").trim().to_string(),
            rut: submission.value("rut").trim().to_string(),
            password: submission.value("password").to_string(),
            date_of_birth,
            email: submission.value("email").trim().to_string(),
        })
    }
}
