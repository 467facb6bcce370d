use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::LoanType;

/// Named document slots a credit request can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentKey {
    ProofIncome,
    AppraisalCertificate,
    CreditHistory,
    BankAccountState,
    WorkCertificate,
    PropertyWriting,
    BusinessFinancialStatement,
    BusinessPlan,
    RemodelingBudget,
}

impl DocumentKey {
    pub const ALL: [DocumentKey; 9] = [
        DocumentKey::ProofIncome,
        DocumentKey::AppraisalCertificate,
        DocumentKey::CreditHistory,
        DocumentKey::BankAccountState,
        DocumentKey::WorkCertificate,
        DocumentKey::PropertyWriting,
        DocumentKey::BusinessFinancialStatement,
        DocumentKey::BusinessPlan,
        DocumentKey::RemodelingBudget,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            DocumentKey::ProofIncome => "proofIncome",
            DocumentKey::AppraisalCertificate => "appraisalCertificate",
            DocumentKey::CreditHistory => "creditHistory",
            DocumentKey::BankAccountState => "bankAccountState",
            DocumentKey::WorkCertificate => "workCertificate",
            DocumentKey::PropertyWriting => "propertyWriting",
            DocumentKey::BusinessFinancialStatement => "businessFinancialStatement",
            DocumentKey::BusinessPlan => "businessPlan",
            DocumentKey::RemodelingBudget => "remodelingBudget",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|document| document.key() == key)
    }

    /// File name used when the shell delivers a downloaded document.
    pub fn download_name(self) -> String {
        format!("{}.pdf", self.key())
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRequirement {
    pub key: DocumentKey,
    pub label: &'static str,
}

const fn requirement(key: DocumentKey, label: &'static str) -> DocumentRequirement {
    DocumentRequirement { key, label }
}

const FIRST_HOME: [DocumentRequirement; 5] = [
    requirement(DocumentKey::ProofIncome, "Comprobante de Ingresos"),
    requirement(DocumentKey::AppraisalCertificate, "Certificado de Avalúo"),
    requirement(DocumentKey::CreditHistory, "Historial de Crédito"),
    requirement(DocumentKey::BankAccountState, "Estado de Cuenta"),
    requirement(DocumentKey::WorkCertificate, "Certificado Laboral"),
];

const SECOND_HOME: [DocumentRequirement; 6] = [
    requirement(DocumentKey::ProofIncome, "Comprobante de Ingresos"),
    requirement(DocumentKey::AppraisalCertificate, "Certificado de Avalúo"),
    requirement(DocumentKey::PropertyWriting, "Escritura de Propiedad"),
    requirement(DocumentKey::CreditHistory, "Historial de Crédito"),
    requirement(DocumentKey::BankAccountState, "Estado de Cuenta"),
    requirement(DocumentKey::WorkCertificate, "Certificado Laboral"),
];

const COMMERCIAL: [DocumentRequirement; 6] = [
    requirement(
        DocumentKey::BusinessFinancialStatement,
        "Estados Financieros del Negocio",
    ),
    requirement(DocumentKey::ProofIncome, "Comprobante de Ingresos"),
    requirement(DocumentKey::AppraisalCertificate, "Certificado de Avalúo"),
    requirement(DocumentKey::BusinessPlan, "Plan de Negocios"),
    requirement(DocumentKey::BankAccountState, "Estado de Cuenta Bancario"),
    requirement(DocumentKey::WorkCertificate, "Certificado Laboral"),
];

const REMODELING: [DocumentRequirement; 6] = [
    requirement(DocumentKey::ProofIncome, "Comprobante de Ingresos"),
    requirement(DocumentKey::AppraisalCertificate, "Certificado de Avalúo"),
    requirement(DocumentKey::RemodelingBudget, "Presupuesto Remodelación"),
    requirement(DocumentKey::CreditHistory, "Historial Crediticio"),
    requirement(DocumentKey::BankAccountState, "Estado de Cuenta"),
    requirement(DocumentKey::WorkCertificate, "Certificado Laboral"),
];

/// Ordered document slots required for a product.
pub fn required_documents(loan_type: LoanType) -> &'static [DocumentRequirement] {
    match loan_type {
        LoanType::FirstHome => &FIRST_HOME,
        LoanType::SecondHome => &SECOND_HOME,
        LoanType::Commercial => &COMMERCIAL,
        LoanType::Remodeling => &REMODELING,
    }
}

/// Metadata of a file attached to a document slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub file_name: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub size: u64,
}

impl Attachment {
    pub fn pdf(file_name: impl Into<String>, size: u64) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: Some(mime::APPLICATION_PDF.to_string()),
            size,
        }
    }

    pub fn is_pdf(&self) -> bool {
        self.content_type
            .as_deref()
            .and_then(|raw| raw.parse::<mime::Mime>().ok())
            .map(|parsed| parsed.essence_str() == mime::APPLICATION_PDF.essence_str())
            .unwrap_or(false)
    }
}

pub const DOCUMENT_REQUIRED: &str = "Documento requerido";
pub const PDF_ONLY: &str = "Solo se permiten archivos PDF";

/// Validates a document slot: something must be attached and it must be a PDF.
pub fn validate_attachment(attachment: Option<&Attachment>) -> String {
    match attachment {
        None => DOCUMENT_REQUIRED.to_string(),
        Some(file) if file.file_name.trim().is_empty() => DOCUMENT_REQUIRED.to_string(),
        Some(file) if !file.is_pdf() => PDF_ONLY.to_string(),
        Some(_) => String::new(),
    }
}
