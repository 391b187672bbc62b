//! # Financial Indicators
//!
//! A library for computing a fixed sheet of financial ratios and absolute
//! figures from three per-company statement tables (assets, liabilities &
//! equity, income statement), producing one summary row per company.
//!
//! ## Core Concepts
//!
//! - **Period normalization**: free-text column headers ("31/12/2023", "2023-12-31 00:00:00")
//!   are parsed with a day-first or month-first convention and reordered most recent first
//! - **Statement Set**: the three normalized tables of one company
//! - **Reference period**: the latest assets column, which must exist verbatim in the other two tables
//! - **Indicator Row**: 19 ratios followed by 8 direct values; zero denominators follow a single
//!   configurable policy
//! - **Output Table**: companies as rows, indicator names as columns; a failing company is marked,
//!   never silently dropped
//!
//! ## Example
//!
//! ```rust,ignore
//! use financial_indicators::*;
//!
//! let config = BatchConfig::new(vec![
//!     CompanySource::new("petrobras", "data/petrobras"),
//!     CompanySource::new("prio", "data/prio"),
//! ]);
//!
//! let table = IndicatorProcessor::run_and_save(&config).unwrap();
//! println!("ROE petrobras: {:?}", table.value("petrobras", "ROE"));
//! ```

pub mod aggregator;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod ingestion;
pub mod line_items;
pub mod period;
pub mod report;
pub mod schema;
pub mod statement_set;
pub mod table;

pub use aggregator::{Aggregator, CompanyOutcome, CompanyResult, OutputTable};
pub use engine::IndicatorEngine;
pub use error::{IndicatorError, Result};
pub use indicators::{Indicator, IndicatorRow};
pub use ingestion::{load_company, load_statement_csv, read_statement_csv};
pub use line_items::LineItemCatalog;
pub use period::{normalize, PeriodParser};
pub use report::{read_report_csv, report_to_json, save_report_csv, write_report_csv, ReportRecord};
pub use schema::*;
pub use statement_set::StatementSet;
pub use table::{LineItem, Period, RawTable, StatementTable};

use log::{debug, info};

pub struct IndicatorProcessor;

impl IndicatorProcessor {
    /// Loads every configured company from storage and computes its indicators.
    ///
    /// Loading failures are treated like computation failures: under
    /// [`FailurePolicy::Isolate`] the company is marked failed and the batch continues.
    pub fn run(config: &BatchConfig) -> Result<OutputTable> {
        info!(
            "Computing indicators for {} companies ({:?}, zero division: {:?}, failures: {:?})",
            config.companies.len(),
            config.date_convention,
            config.zero_division,
            config.failure_policy
        );

        let parser = PeriodParser::new(config.date_convention);
        let companies = config.companies.iter().map(|source| {
            debug!("Processing '{}' from {}", source.name, source.folder.display());
            (source.name.clone(), load_company(source, &parser))
        });

        aggregator_for(config).aggregate_loaded(companies)
    }

    /// Runs the batch and writes the table to `config.output_path`.
    pub fn run_and_save(config: &BatchConfig) -> Result<OutputTable> {
        let table = Self::run(config)?;
        save_report_csv(&table, &config.output_path)?;
        Ok(table)
    }
}

/// Computes indicators for already-normalized statements using the policies in `config`.
pub fn compute_indicators<I, S>(config: &BatchConfig, companies: I) -> Result<OutputTable>
where
    I: IntoIterator<Item = (S, StatementSet)>,
    S: Into<String>,
{
    aggregator_for(config).aggregate(companies)
}

fn aggregator_for(config: &BatchConfig) -> Aggregator {
    Aggregator::new(
        IndicatorEngine::new(config.line_items.clone(), config.zero_division),
        config.failure_policy,
    )
}
