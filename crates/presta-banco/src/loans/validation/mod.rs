//! Field-level validation shared by every desk form.
//!
//! Each rule maps a raw input string to an empty string (valid) or a
//! user-facing message, and rules are evaluated independently per field.

mod bounds;
pub(crate) mod rules;
mod schema;

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::documents::{self, Attachment};
use super::domain::LoanType;

pub use bounds::{LoanTermsPolicy, NumericBounds};
pub use rules::age_on;
pub use schema::{FormKind, FormSchema, FormSubmission, FIELD_REQUIRED};

/// Fields with a dedicated rule. Anything else is unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Rut,
    Name,
    LastName,
    Password,
    Email,
    DateOfBirth,
    MaximumAmount,
    Amount,
    InterestRate,
    Term,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::Rut,
        Field::Name,
        Field::LastName,
        Field::Password,
        Field::Email,
        Field::DateOfBirth,
        Field::MaximumAmount,
        Field::Amount,
        Field::InterestRate,
        Field::Term,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Field::Rut => "rut",
            Field::Name => "name",
            Field::LastName => "lastName",
            Field::Password => "password",
            Field::Email => "email",
            Field::DateOfBirth => "dateOfBirth",
            Field::MaximumAmount => "maximumAmount",
            Field::Amount => "amount",
            Field::InterestRate => "interestRate",
            Field::Term => "term",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Local calendar date used for age checks.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Stateless rule set bound to a bounds policy and a reference date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldValidator {
    policy: LoanTermsPolicy,
    today: NaiveDate,
}

impl FieldValidator {
    pub fn new(policy: LoanTermsPolicy, today: NaiveDate) -> Self {
        Self { policy, today }
    }

    pub fn for_loan_type(loan_type: LoanType, today: NaiveDate) -> Self {
        Self::new(LoanTermsPolicy::for_loan_type(loan_type), today)
    }

    pub fn for_simulation(today: NaiveDate) -> Self {
        Self::new(LoanTermsPolicy::SIMULATION, today)
    }

    pub fn policy(&self) -> &LoanTermsPolicy {
        &self.policy
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Validates by field name; unknown names are always valid.
    pub fn validate(&self, field: &str, raw: &str) -> String {
        match Field::from_name(field) {
            Some(field) => self.validate_field(field, raw),
            None => String::new(),
        }
    }

    pub fn validate_field(&self, field: Field, raw: &str) -> String {
        match field {
            Field::Rut => rules::rut(raw),
            Field::Name | Field::LastName => rules::person_name(raw),
            Field::Password => rules::password(raw),
            Field::Email => rules::email(raw),
            Field::DateOfBirth => rules::date_of_birth(raw, self.today),
            Field::MaximumAmount | Field::Amount => {
                rules::whole_within(raw, self.policy.amount, || self.policy.amount_message())
            }
            Field::InterestRate => rules::within(raw, self.policy.interest_rate, || {
                self.policy.interest_rate_message()
            }),
            Field::Term => {
                rules::whole_within(raw, self.policy.term, || self.policy.term_message())
            }
        }
    }

    pub fn validate_document(&self, attachment: Option<&Attachment>) -> String {
        documents::validate_attachment(attachment)
    }
}

/// Field name to message map; an empty message marks a valid field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationResult {
    messages: BTreeMap<String, String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, field: impl Into<String>, message: String) {
        self.messages.insert(field.into(), message);
    }

    pub fn message(&self, field: &str) -> &str {
        self.messages.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn is_valid(&self) -> bool {
        self.messages.values().all(String::is_empty)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.messages
            .iter()
            .filter(|(_, message)| !message.is_empty())
            .map(|(field, message)| (field.as_str(), message.as_str()))
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let failures: Vec<String> = self
            .failures()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect();
        if failures.is_empty() {
            f.write_str("all fields valid")
        } else {
            f.write_str(&failures.join("; "))
        }
    }
}
