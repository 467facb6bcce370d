//! Request list rows and CSV import of exported request lists.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Serialize;

use super::domain::{ApplicationId, LoanApplication};
use super::status::{action_label, label_for, next_action_for, NextAction};

/// One row of the executive's request list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRow {
    /// 1-based position in the list.
    pub position: usize,
    pub id: ApplicationId,
    pub loan_type_label: String,
    pub rut: String,
    pub name: String,
    pub last_name: String,
    pub status: String,
    pub action_label: &'static str,
    pub action: NextAction,
    pub enabled: bool,
}

impl RequestRow {
    pub fn from_application(position: usize, application: &LoanApplication) -> Self {
        let action = next_action_for(&application.status);
        Self {
            position,
            id: application.id,
            loan_type_label: label_for(&application.loan_type).into_owned(),
            rut: application.rut.clone(),
            name: application.name.clone(),
            last_name: application.last_name.clone(),
            status: application.status.clone(),
            action_label: action_label(&application.status),
            action,
            enabled: action.is_enabled(),
        }
    }
}

pub fn request_rows(applications: &[LoanApplication]) -> Vec<RequestRow> {
    applications
        .iter()
        .enumerate()
        .map(|(index, application)| RequestRow::from_application(index + 1, application))
        .collect()
}

/// Failure while importing an exported request list.
#[derive(Debug)]
pub enum RequestImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl fmt::Display for RequestImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestImportError::Io(err) => write!(f, "failed to read request export: {}", err),
            RequestImportError::Csv(err) => write!(f, "invalid request CSV data: {}", err),
        }
    }
}

impl std::error::Error for RequestImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RequestImportError::Io(err) => Some(err),
            RequestImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for RequestImportError {
    fn from(err: std::io::Error) -> Self {
        RequestImportError::Io(err)
    }
}

impl From<csv::Error> for RequestImportError {
    fn from(err: csv::Error) -> Self {
        RequestImportError::Csv(err)
    }
}

/// Parses `id,rut,name,lastName,typeLoan,maximumAmount,interestRate,term,status`
/// rows. Unknown loan type codes and statuses are kept verbatim.
pub fn parse_applications<R: Read>(reader: R) -> Result<Vec<LoanApplication>, RequestImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut applications = Vec::new();

    for record in csv_reader.deserialize::<LoanApplication>() {
        applications.push(record?);
    }

    Ok(applications)
}

pub fn load_applications(
    path: impl AsRef<Path>,
) -> Result<Vec<LoanApplication>, RequestImportError> {
    let file = File::open(path)?;
    parse_applications(file)
}
