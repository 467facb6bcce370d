use serde::{Deserialize, Serialize};

use crate::loans::domain::LoanType;

/// Closed numeric interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericBounds {
    pub min: f64,
    pub max: f64,
}

impl NumericBounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

const AMOUNT: NumericBounds = NumericBounds::new(1_000_000.0, 100_000_000.0);

/// Amount, annual rate and term limits a form enforces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanTermsPolicy {
    pub amount: NumericBounds,
    pub interest_rate: NumericBounds,
    pub term: NumericBounds,
}

impl LoanTermsPolicy {
    /// Limits of the public credit simulator.
    pub const SIMULATION: LoanTermsPolicy = LoanTermsPolicy {
        amount: AMOUNT,
        interest_rate: NumericBounds::new(1.0, 24.8),
        term: NumericBounds::new(1.0, 58.0),
    };

    pub const fn for_loan_type(loan_type: LoanType) -> Self {
        match loan_type {
            LoanType::FirstHome => LoanTermsPolicy {
                amount: AMOUNT,
                interest_rate: NumericBounds::new(3.5, 5.0),
                term: NumericBounds::new(1.0, 30.0),
            },
            LoanType::SecondHome => LoanTermsPolicy {
                amount: AMOUNT,
                interest_rate: NumericBounds::new(4.0, 6.0),
                term: NumericBounds::new(1.0, 20.0),
            },
            LoanType::Commercial => LoanTermsPolicy {
                amount: AMOUNT,
                interest_rate: NumericBounds::new(5.0, 7.0),
                term: NumericBounds::new(1.0, 25.0),
            },
            LoanType::Remodeling => LoanTermsPolicy {
                amount: AMOUNT,
                interest_rate: NumericBounds::new(4.5, 6.0),
                term: NumericBounds::new(1.0, 15.0),
            },
        }
    }

    pub fn amount_message(&self) -> String {
        format!(
            "El monto debe estar entre {} y {}",
            format_thousands(self.amount.min),
            format_thousands(self.amount.max)
        )
    }

    pub fn interest_rate_message(&self) -> String {
        format!(
            "La tasa debe estar entre {}% y {}%",
            self.interest_rate.min, self.interest_rate.max
        )
    }

    pub fn term_message(&self) -> String {
        format!(
            "El plazo debe ser entre {} y {} años",
            self.term.min, self.term.max
        )
    }
}

/// Chilean grouping: `1000000` renders as `1.000.000`.
fn format_thousands(value: f64) -> String {
    let digits = (value.trunc() as u64).to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    grouped
}
