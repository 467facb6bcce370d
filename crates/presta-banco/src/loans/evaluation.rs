use serde::{Deserialize, Serialize};

use super::domain::ApplicationId;
use super::savings::{SavingsChecklist, SavingsOutcome, SavingsQuestion};

/// Yes/no questions an executive answers directly during an evaluation.
/// `savingsCapacity` is not among them: it is derived from the savings checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EvaluationQuestion {
    IncomeQuota,
    CreditHistory,
    EmploymentSeniority,
    IncomeDebtRelation,
    FinancingLimit,
    ApplicantAge,
}

impl EvaluationQuestion {
    pub const ALL: [EvaluationQuestion; 6] = [
        EvaluationQuestion::IncomeQuota,
        EvaluationQuestion::CreditHistory,
        EvaluationQuestion::EmploymentSeniority,
        EvaluationQuestion::IncomeDebtRelation,
        EvaluationQuestion::FinancingLimit,
        EvaluationQuestion::ApplicantAge,
    ];

    pub const fn prompt(self) -> &'static str {
        match self {
            EvaluationQuestion::IncomeQuota => "¿Presenta una relación cuota/ingreso menor al 35%?",
            EvaluationQuestion::CreditHistory => {
                "¿Tiene un buen historial crediticio sin morosidades recientes?"
            }
            EvaluationQuestion::EmploymentSeniority => {
                "¿Cuenta con al menos 1 a 2 años de antigüedad en su empleo actual?"
            }
            EvaluationQuestion::IncomeDebtRelation => {
                "¿Su relación deuda/ingreso es menor al 50% incluyendo el nuevo crédito?"
            }
            EvaluationQuestion::FinancingLimit => "¿El monto solicitado respeta el límite de financiamiento según el tipo de propiedad?",
            EvaluationQuestion::ApplicantAge => {
                "¿La edad del solicitante permite pagar el crédito antes de los 75 años?"
            }
        }
    }
}

/// Answers submitted to the backend as a single evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationAnswers {
    pub income_quota: Option<bool>,
    pub credit_history: Option<bool>,
    pub employment_seniority: Option<bool>,
    pub income_debt_relation: Option<bool>,
    pub financing_limit: Option<bool>,
    pub applicant_age: Option<bool>,
    pub savings_capacity: Option<bool>,
    pub application_id: ApplicationId,
}

impl EvaluationAnswers {
    pub fn new(application_id: ApplicationId) -> Self {
        Self {
            income_quota: None,
            credit_history: None,
            employment_seniority: None,
            income_debt_relation: None,
            financing_limit: None,
            applicant_age: None,
            savings_capacity: None,
            application_id,
        }
    }

    pub fn answer(&self, question: EvaluationQuestion) -> Option<bool> {
        match question {
            EvaluationQuestion::IncomeQuota => self.income_quota,
            EvaluationQuestion::CreditHistory => self.credit_history,
            EvaluationQuestion::EmploymentSeniority => self.employment_seniority,
            EvaluationQuestion::IncomeDebtRelation => self.income_debt_relation,
            EvaluationQuestion::FinancingLimit => self.financing_limit,
            EvaluationQuestion::ApplicantAge => self.applicant_age,
        }
    }

    fn slot_mut(&mut self, question: EvaluationQuestion) -> &mut Option<bool> {
        match question {
            EvaluationQuestion::IncomeQuota => &mut self.income_quota,
            EvaluationQuestion::CreditHistory => &mut self.credit_history,
            EvaluationQuestion::EmploymentSeniority => &mut self.employment_seniority,
            EvaluationQuestion::IncomeDebtRelation => &mut self.income_debt_relation,
            EvaluationQuestion::FinancingLimit => &mut self.financing_limit,
            EvaluationQuestion::ApplicantAge => &mut self.applicant_age,
        }
    }

    pub fn unanswered(&self) -> Vec<EvaluationQuestion> {
        EvaluationQuestion::ALL
            .into_iter()
            .filter(|question| self.answer(*question).is_none())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvaluationFormError {
    #[error("savings capacity has not been reviewed for application {0}")]
    SavingsNotReviewed(ApplicationId),
}

/// Evaluation screen state. Every transition consumes the form and returns the
/// next state, so the savings scorer never writes into shared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationForm {
    answers: EvaluationAnswers,
    savings: SavingsChecklist,
    savings_outcome: Option<SavingsOutcome>,
}

impl EvaluationForm {
    pub fn new(application_id: ApplicationId) -> Self {
        Self {
            answers: EvaluationAnswers::new(application_id),
            savings: SavingsChecklist::default(),
            savings_outcome: None,
        }
    }

    pub fn application_id(&self) -> ApplicationId {
        self.answers.application_id
    }

    pub fn answers(&self) -> &EvaluationAnswers {
        &self.answers
    }

    pub fn savings(&self) -> &SavingsChecklist {
        &self.savings
    }

    pub fn with_answer(mut self, question: EvaluationQuestion, value: bool) -> Self {
        *self.answers.slot_mut(question) = Some(value);
        self
    }

    pub fn with_savings_answer(mut self, question: SavingsQuestion, value: bool) -> Self {
        self.savings = self.savings.with_answer(question, value);
        self
    }

    /// Scores the checklist, stores the derived capacity flag and unlocks
    /// submission. The previous capacity flag participates in the count.
    pub fn check_savings(mut self) -> Self {
        let outcome = self.savings.score(self.answers.savings_capacity);
        self.answers.savings_capacity = Some(outcome.grants_capacity());
        self.savings_outcome = Some(outcome);
        self
    }

    pub fn savings_outcome(&self) -> Option<SavingsOutcome> {
        self.savings_outcome
    }

    pub fn can_submit(&self) -> bool {
        self.savings_outcome.is_some()
    }

    pub fn submission(&self) -> Result<EvaluationAnswers, EvaluationFormError> {
        if !self.can_submit() {
            return Err(EvaluationFormError::SavingsNotReviewed(
                self.answers.application_id,
            ));
        }
        Ok(self.answers)
    }
}
