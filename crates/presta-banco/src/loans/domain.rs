use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier assigned by the backend to a credit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub u64);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mortgage products offered by the desk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoanType {
    FirstHome,
    SecondHome,
    Commercial,
    Remodeling,
}

impl LoanType {
    pub const ALL: [LoanType; 4] = [
        LoanType::FirstHome,
        LoanType::SecondHome,
        LoanType::Commercial,
        LoanType::Remodeling,
    ];

    /// Wire code used by the backend (`typeLoan`).
    pub const fn code(self) -> &'static str {
        match self {
            LoanType::FirstHome => "firstHome",
            LoanType::SecondHome => "secondHome",
            LoanType::Commercial => "commercial",
            LoanType::Remodeling => "remodeling",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            LoanType::FirstHome => "Primera Vivienda",
            LoanType::SecondHome => "Segunda Vivienda",
            LoanType::Commercial => "Propiedad Comercial",
            LoanType::Remodeling => "Remodelación",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            LoanType::FirstHome => "Ideal para quienes compran su primera casa",
            LoanType::SecondHome => "Para adquirir una propiedad adicional",
            LoanType::Commercial => "Financiamiento para locales o oficinas",
            LoanType::Remodeling => "Mejora tu propiedad actual",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|loan_type| loan_type.code() == code.trim())
    }
}

impl fmt::Display for LoanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Credit request as returned by the backend listing endpoints.
///
/// `loan_type` keeps the raw backend code so unknown products still render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanApplication {
    pub id: ApplicationId,
    pub rut: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(rename = "typeLoan")]
    pub loan_type: String,
    pub maximum_amount: u64,
    pub interest_rate: f64,
    pub term: u32,
    pub status: String,
}

impl LoanApplication {
    pub fn loan_type(&self) -> Option<LoanType> {
        LoanType::from_code(&self.loan_type)
    }

    pub fn simulation_request(&self) -> SimulationRequest {
        SimulationRequest {
            amount: self.maximum_amount,
            interest_rate: self.interest_rate,
            term: self.term,
        }
    }
}

/// Inputs the backend needs to quote a monthly payment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRequest {
    pub amount: u64,
    pub interest_rate: f64,
    pub term: u32,
}

/// Validated loan request ready to be sent to the backend with its documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRequestDraft {
    pub rut: String,
    #[serde(rename = "typeLoan")]
    pub loan_type: LoanType,
    pub maximum_amount: u64,
    pub interest_rate: f64,
    pub term: u32,
    pub documents: Vec<super::documents::Attachment>,
}

/// Validated client registration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRegistration {
    pub name: String,
    pub last_name: String,
    pub rut: String,
    pub password: String,
    pub date_of_birth: chrono::NaiveDate,
    pub email: String,
}

/// One entry of a client's "my requests" view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRequestStatus {
    pub id: ApplicationId,
    pub status: String,
}
