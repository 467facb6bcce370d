//! Payment-to-income and debt-to-income ratios.
//!
//! The ratio functions are plain arithmetic: a zero or non-numeric income is the
//! caller's problem. [`PositiveAmount::parse`] is the guard callers run before
//! invoking them.

use serde::{Deserialize, Serialize};

/// Highest accepted monthly payment as a percentage of monthly income.
pub const PAYMENT_TO_INCOME_LIMIT: f64 = 35.0;
/// Highest accepted monthly debt as a percentage of monthly income.
pub const DEBT_TO_INCOME_LIMIT: f64 = 50.0;

pub fn payment_to_income_ratio(monthly_payment: f64, monthly_income: f64) -> f64 {
    monthly_payment / monthly_income * 100.0
}

pub fn debt_to_income_ratio(current_debts: f64, monthly_income: f64) -> f64 {
    current_debts / monthly_income * 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioKind {
    PaymentToIncome,
    DebtToIncome,
}

impl RatioKind {
    pub const fn limit(self) -> f64 {
        match self {
            RatioKind::PaymentToIncome => PAYMENT_TO_INCOME_LIMIT,
            RatioKind::DebtToIncome => DEBT_TO_INCOME_LIMIT,
        }
    }

    pub fn compute(self, numerator: f64, monthly_income: f64) -> f64 {
        match self {
            RatioKind::PaymentToIncome => payment_to_income_ratio(numerator, monthly_income),
            RatioKind::DebtToIncome => debt_to_income_ratio(numerator, monthly_income),
        }
    }

    pub fn classify(self, ratio: f64) -> RatioVerdict {
        if ratio <= self.limit() {
            RatioVerdict::Approved
        } else {
            RatioVerdict::Rejected
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioVerdict {
    Approved,
    Rejected,
}

/// Computed ratio with its classification, ready for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatioAssessment {
    pub kind: RatioKind,
    pub ratio: f64,
    pub limit: f64,
    pub verdict: RatioVerdict,
}

impl RatioAssessment {
    pub fn assess(kind: RatioKind, numerator: f64, monthly_income: f64) -> Self {
        let ratio = kind.compute(numerator, monthly_income);
        Self {
            kind,
            ratio,
            limit: kind.limit(),
            verdict: kind.classify(ratio),
        }
    }

    pub fn is_approved(&self) -> bool {
        self.verdict == RatioVerdict::Approved
    }

    pub const fn message(&self) -> &'static str {
        match (self.kind, self.verdict) {
            (RatioKind::PaymentToIncome, RatioVerdict::Approved) => {
                "Aprobado: Relación cuota/ingreso adecuada"
            }
            (RatioKind::PaymentToIncome, RatioVerdict::Rejected) => {
                "Rechazado: Relación cuota/ingreso demasiado alta"
            }
            (RatioKind::DebtToIncome, RatioVerdict::Approved) => {
                "Aprobado: Relación deuda/ingreso adecuada"
            }
            (RatioKind::DebtToIncome, RatioVerdict::Rejected) => {
                "Rechazado: Relación deuda/ingreso demasiado alta"
            }
        }
    }

    /// Percentage rendered with two decimals, e.g. `La relación cuota/ingreso es: 35.00%`.
    pub fn summary(&self) -> String {
        let name = match self.kind {
            RatioKind::PaymentToIncome => "cuota/ingreso",
            RatioKind::DebtToIncome => "deuda/ingreso",
        };
        format!("La relación {name} es: {:.2}%", self.ratio)
    }
}

/// Rejected guard input for a ratio computation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RatioInputError {
    #[error("{field} is required")]
    Missing { field: &'static str },
    #[error("{field} must be a number (got '{raw}')")]
    NotNumeric { field: &'static str, raw: String },
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },
    #[error("{field} cannot be negative")]
    Negative { field: &'static str },
}

fn parse_number(field: &'static str, raw: &str) -> Result<f64, RatioInputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RatioInputError::Missing { field });
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(RatioInputError::NotNumeric {
            field,
            raw: trimmed.to_string(),
        }),
    }
}

/// Parses a numerator such as current monthly debts, where zero is meaningful.
pub fn parse_non_negative(field: &'static str, raw: &str) -> Result<f64, RatioInputError> {
    let value = parse_number(field, raw)?;
    if value < 0.0 {
        return Err(RatioInputError::Negative { field });
    }
    Ok(value)
}

/// Strictly positive, finite amount parsed from raw form input.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct PositiveAmount(f64);

impl PositiveAmount {
    pub fn new(field: &'static str, value: f64) -> Result<Self, RatioInputError> {
        if !value.is_finite() {
            return Err(RatioInputError::NotNumeric {
                field,
                raw: value.to_string(),
            });
        }
        if value <= 0.0 {
            return Err(RatioInputError::NotPositive { field });
        }
        Ok(Self(value))
    }

    pub fn parse(field: &'static str, raw: &str) -> Result<Self, RatioInputError> {
        Self::new(field, parse_number(field, raw)?)
    }

    pub fn get(self) -> f64 {
        self.0
    }
}
