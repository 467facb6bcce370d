use serde::{Deserialize, Serialize};

/// Positive answers needed for an outright approval of savings capacity.
pub const APPROVAL_THRESHOLD: usize = 5;
/// Positive answers needed before a manual review is offered.
pub const REVIEW_THRESHOLD: usize = 3;

/// Savings-capacity band derived from the checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SavingsOutcome {
    Approval,
    AdditionalReview,
    Rejection,
}

impl SavingsOutcome {
    pub const fn label(self) -> &'static str {
        match self {
            SavingsOutcome::Approval => "Aprobación",
            SavingsOutcome::AdditionalReview => "Revisión Adicional",
            SavingsOutcome::Rejection => "Rechazo",
        }
    }

    /// Value written back into the composite `savingsCapacity` answer.
    pub const fn grants_capacity(self) -> bool {
        matches!(self, SavingsOutcome::Approval)
    }
}

/// Classifies six yes/no answers: the current composite capacity flag followed
/// by the five checklist questions.
pub fn score_savings(answers: [bool; 6]) -> SavingsOutcome {
    let positive = answers.iter().filter(|answer| **answer).count();
    if positive >= APPROVAL_THRESHOLD {
        SavingsOutcome::Approval
    } else if positive >= REVIEW_THRESHOLD {
        SavingsOutcome::AdditionalReview
    } else {
        SavingsOutcome::Rejection
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SavingsQuestion {
    SavingsBalance,
    PositiveBalance,
    RegularDeposits,
    AccumulatedBalance,
    AvoidWithdrawals,
}

impl SavingsQuestion {
    pub const ALL: [SavingsQuestion; 5] = [
        SavingsQuestion::SavingsBalance,
        SavingsQuestion::PositiveBalance,
        SavingsQuestion::RegularDeposits,
        SavingsQuestion::AccumulatedBalance,
        SavingsQuestion::AvoidWithdrawals,
    ];

    pub const fn prompt(self) -> &'static str {
        match self {
            SavingsQuestion::SavingsBalance => "¿Su cuenta de ahorros o inversiones tiene un saldo equivalente al menos al 10% del monto del préstamo solicitado?",
            SavingsQuestion::PositiveBalance => "¿Mantiene un saldo positivo en su cuenta de ahorros sin retiros significativos (más del 50%) en los últimos 12 meses?",
            SavingsQuestion::RegularDeposits => "¿Realiza depósitos regulares en su cuenta de ahorros o inversión, sumando al menos el 5% de sus ingresos mensuales?",
            SavingsQuestion::AccumulatedBalance => "¿Tiene un saldo acumulado en la cuenta de ahorros equivalente al 10% o 20% del préstamo según su antigüedad?",
            SavingsQuestion::AvoidWithdrawals => "¿Ha evitado retiros superiores al 30% del saldo en los últimos 6 meses?",
        }
    }
}

/// Five savings questions answered during an evaluation. Unanswered questions
/// count as negative when scored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsChecklist {
    #[serde(default)]
    pub savings_balance: Option<bool>,
    #[serde(default)]
    pub positive_balance: Option<bool>,
    #[serde(default)]
    pub regular_deposits: Option<bool>,
    #[serde(default)]
    pub accumulated_balance: Option<bool>,
    #[serde(default)]
    pub avoid_withdrawals: Option<bool>,
}

impl SavingsChecklist {
    pub fn answer(&self, question: SavingsQuestion) -> Option<bool> {
        match question {
            SavingsQuestion::SavingsBalance => self.savings_balance,
            SavingsQuestion::PositiveBalance => self.positive_balance,
            SavingsQuestion::RegularDeposits => self.regular_deposits,
            SavingsQuestion::AccumulatedBalance => self.accumulated_balance,
            SavingsQuestion::AvoidWithdrawals => self.avoid_withdrawals,
        }
    }

    pub fn with_answer(mut self, question: SavingsQuestion, value: bool) -> Self {
        let slot = match question {
            SavingsQuestion::SavingsBalance => &mut self.savings_balance,
            SavingsQuestion::PositiveBalance => &mut self.positive_balance,
            SavingsQuestion::RegularDeposits => &mut self.regular_deposits,
            SavingsQuestion::AccumulatedBalance => &mut self.accumulated_balance,
            SavingsQuestion::AvoidWithdrawals => &mut self.avoid_withdrawals,
        };
        *slot = Some(value);
        self
    }

    /// Scorer input with `current_capacity` in first position.
    pub fn answers(&self, current_capacity: Option<bool>) -> [bool; 6] {
        [
            current_capacity.unwrap_or(false),
            self.savings_balance.unwrap_or(false),
            self.positive_balance.unwrap_or(false),
            self.regular_deposits.unwrap_or(false),
            self.accumulated_balance.unwrap_or(false),
            self.avoid_withdrawals.unwrap_or(false),
        ]
    }

    pub fn score(&self, current_capacity: Option<bool>) -> SavingsOutcome {
        score_savings(self.answers(current_capacity))
    }
}
