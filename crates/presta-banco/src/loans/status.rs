//! Status vocabulary and the next action the request list offers per status.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::LoanType;

pub const INITIAL_REVIEW: &str = "En Revisión Inicial";
pub const PENDING_DOCUMENTATION: &str = "Pendiente de Documentación";
pub const IN_EVALUATION: &str = "En Evaluación";
pub const PRE_APPROVED: &str = "Pre-Aprobada";
pub const IN_FINAL_APPROVAL: &str = "En Aprobación Final";
pub const APPROVED: &str = "Aprobada";
pub const REJECTED: &str = "Rechazada";
pub const CANCELLED_BY_CLIENT: &str = "Cancelada por el Cliente";
pub const IN_DISBURSEMENT: &str = "En Desembolso";
pub const FINALIZED: &str = "Finalizada";

/// Display statuses the desk knows about, in lifecycle order.
pub const KNOWN_STATUSES: [&str; 10] = [
    INITIAL_REVIEW,
    PENDING_DOCUMENTATION,
    IN_EVALUATION,
    PRE_APPROVED,
    IN_FINAL_APPROVAL,
    APPROVED,
    REJECTED,
    CANCELLED_BY_CLIENT,
    IN_DISBURSEMENT,
    FINALIZED,
];

/// Opaque transition codes understood by the backend's edit-status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionCode {
    E1,
    E2,
    E3,
    E4,
    E5,
    E6,
    E7,
    E8,
    E9,
    /// Closes a disbursed loan.
    E10,
}

impl TransitionCode {
    pub const ALL: [TransitionCode; 10] = [
        TransitionCode::E1,
        TransitionCode::E2,
        TransitionCode::E3,
        TransitionCode::E4,
        TransitionCode::E5,
        TransitionCode::E6,
        TransitionCode::E7,
        TransitionCode::E8,
        TransitionCode::E9,
        TransitionCode::E10,
    ];

    /// Code the backend finalizes a disbursed request with.
    pub const FINALIZE: TransitionCode = TransitionCode::E10;

    pub const fn code(self) -> &'static str {
        match self {
            TransitionCode::E1 => "E1",
            TransitionCode::E2 => "E2",
            TransitionCode::E3 => "E3",
            TransitionCode::E4 => "E4",
            TransitionCode::E5 => "E5",
            TransitionCode::E6 => "E6",
            TransitionCode::E7 => "E7",
            TransitionCode::E8 => "E8",
            TransitionCode::E9 => "E9",
            TransitionCode::E10 => "E10",
        }
    }

    /// Display status a request carries after the backend applies this code.
    pub const fn resulting_status(self) -> &'static str {
        match self {
            TransitionCode::E1 => INITIAL_REVIEW,
            TransitionCode::E2 => PENDING_DOCUMENTATION,
            TransitionCode::E3 => IN_EVALUATION,
            TransitionCode::E4 => PRE_APPROVED,
            TransitionCode::E5 => IN_FINAL_APPROVAL,
            TransitionCode::E6 => APPROVED,
            TransitionCode::E7 => REJECTED,
            TransitionCode::E8 => CANCELLED_BY_CLIENT,
            TransitionCode::E9 => IN_DISBURSEMENT,
            TransitionCode::E10 => FINALIZED,
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.code().eq_ignore_ascii_case(code.trim()))
    }
}

impl fmt::Display for TransitionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationTarget {
    Evaluation,
}

/// What the action button of a request row does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NextAction {
    Transition { target_status: TransitionCode },
    Navigate { target: NavigationTarget },
    Disabled,
}

impl NextAction {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, NextAction::Disabled)
    }
}

/// Display name for a loan type code; unknown codes are returned unchanged.
pub fn label_for(code: &str) -> Cow<'_, str> {
    match LoanType::from_code(code) {
        Some(loan_type) => Cow::Borrowed(loan_type.label()),
        None => Cow::Borrowed(code),
    }
}

pub fn next_action_for(status: &str) -> NextAction {
    match status {
        FINALIZED => NextAction::Disabled,
        IN_FINAL_APPROVAL => NextAction::Transition {
            target_status: TransitionCode::E6,
        },
        APPROVED => NextAction::Transition {
            target_status: TransitionCode::E9,
        },
        IN_DISBURSEMENT => NextAction::Transition {
            target_status: TransitionCode::FINALIZE,
        },
        _ => NextAction::Navigate {
            target: NavigationTarget::Evaluation,
        },
    }
}

/// Caption of the row button for a status.
pub fn action_label(status: &str) -> &'static str {
    match status {
        IN_FINAL_APPROVAL => "Aprobar Solicitud",
        APPROVED => "Desembolso",
        IN_DISBURSEMENT => "Finalizar",
        _ => "Ver Detalle",
    }
}

/// Client answer to a pre-approved offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferResponse {
    Accept,
    Reject,
}

impl OfferResponse {
    pub const fn transition(self) -> TransitionCode {
        match self {
            OfferResponse::Accept => TransitionCode::E5,
            OfferResponse::Reject => TransitionCode::E8,
        }
    }
}

/// Ways an executive can leave the evaluation screen without submitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationExit {
    MissingDocuments,
    Cancel,
}

impl EvaluationExit {
    pub const fn transition(self) -> TransitionCode {
        match self {
            EvaluationExit::MissingDocuments | EvaluationExit::Cancel => TransitionCode::E2,
        }
    }
}
