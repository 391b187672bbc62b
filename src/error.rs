use crate::schema::StatementKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndicatorError {
    #[error("Unparseable period header '{header}' in {table} table")]
    UnparseableDate { table: StatementKind, header: String },

    #[error("Reference period {period} is missing from the {table} table")]
    MissingPeriod { table: StatementKind, period: String },

    #[error("Missing line item '{label}' in {table} table")]
    MissingLineItem { table: StatementKind, label: String },

    #[error("{source}; mandatory items absent: {}", .missing.join(", "))]
    IncompleteStatements {
        source: Box<IndicatorError>,
        missing: Vec<String>,
    },

    #[error("Line item '{label}' in {table} table has no value for period {period}")]
    MissingValue {
        table: StatementKind,
        label: String,
        period: String,
    },

    #[error("Zero denominator while computing '{indicator}'")]
    DivisionUndefined { indicator: String },

    #[error("Expected a {expected} table, got a {found} table")]
    StatementKindMismatch {
        expected: StatementKind,
        found: StatementKind,
    },

    #[error("The {0} table has no period columns")]
    EmptyTable(StatementKind),

    #[error("Invalid number '{value}' for '{label}' in column '{column}' of {table} table")]
    InvalidNumber {
        table: StatementKind,
        label: String,
        column: String,
        value: String,
    },

    #[error("Malformed {table} table: {details}")]
    MalformedTable { table: StatementKind, details: String },

    #[error("Invalid value '{value}' in column '{column}' for '{company}' in indicator report")]
    InvalidReportValue {
        company: String,
        column: String,
        value: String,
    },

    #[error("Company '{company}': {source}")]
    Company {
        company: String,
        #[source]
        source: Box<IndicatorError>,
    },

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl IndicatorError {
    pub fn for_company(self, company: impl Into<String>) -> Self {
        match self {
            already @ IndicatorError::Company { .. } => already,
            other => IndicatorError::Company {
                company: company.into(),
                source: Box::new(other),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, IndicatorError>;
