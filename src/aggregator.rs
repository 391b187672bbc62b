use crate::engine::IndicatorEngine;
use crate::error::{IndicatorError, Result};
use crate::indicators::IndicatorRow;
use crate::schema::FailurePolicy;
use crate::statement_set::StatementSet;
use log::{info, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CompanyOutcome {
    Computed { row: IndicatorRow },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyResult {
    pub company: String,
    pub outcome: CompanyOutcome,
}

impl CompanyResult {
    pub fn row(&self) -> Option<&IndicatorRow> {
        match &self.outcome {
            CompanyOutcome::Computed { row } => Some(row),
            CompanyOutcome::Failed { .. } => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match &self.outcome {
            CompanyOutcome::Computed { .. } => None,
            CompanyOutcome::Failed { reason } => Some(reason),
        }
    }
}

/// Companies as rows, indicator names as columns.
///
/// Columns are the union of every computed row's indicators in first-seen
/// order. Failed companies keep their row, with no values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputTable {
    columns: Vec<String>,
    rows: Vec<CompanyResult>,
}

impl OutputTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[CompanyResult] {
        &self.rows
    }

    pub fn companies(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.company.as_str())
    }

    pub fn company(&self, company: &str) -> Option<&CompanyResult> {
        self.rows.iter().find(|r| r.company == company)
    }

    pub fn value(&self, company: &str, column: &str) -> Option<f64> {
        let row = self.company(company)?.row()?;
        row.iter()
            .find(|(indicator, _)| indicator.name() == column)
            .and_then(|(_, value)| value)
    }

    /// One company's values aligned with [`OutputTable::columns`].
    pub fn record(&self, result: &CompanyResult) -> Vec<Option<f64>> {
        self.columns
            .iter()
            .map(|column| {
                result.row().and_then(|row| {
                    row.iter()
                        .find(|(indicator, _)| indicator.name() == column)
                        .and_then(|(_, value)| value)
                })
            })
            .collect()
    }

    pub fn has_failures(&self) -> bool {
        self.rows.iter().any(|r| r.failure().is_some())
    }

    pub fn push(&mut self, company: impl Into<String>, outcome: CompanyOutcome) {
        let company = company.into();

        if let CompanyOutcome::Computed { row } = &outcome {
            for (indicator, _) in row.iter() {
                if !self.columns.iter().any(|c| c == indicator.name()) {
                    self.columns.push(indicator.name().to_string());
                }
            }
        }

        match self.rows.iter_mut().find(|r| r.company == company) {
            Some(existing) => {
                warn!("Company '{}' listed more than once; keeping the last result", company);
                existing.outcome = outcome;
            }
            None => self.rows.push(CompanyResult { company, outcome }),
        }
    }
}

pub struct Aggregator {
    engine: IndicatorEngine,
    failure_policy: FailurePolicy,
}

impl Aggregator {
    pub fn new(engine: IndicatorEngine, failure_policy: FailurePolicy) -> Self {
        Self {
            engine,
            failure_policy,
        }
    }

    pub fn engine(&self) -> &IndicatorEngine {
        &self.engine
    }

    /// Runs the engine for each company in order and collects the results.
    pub fn aggregate<I, S>(&self, companies: I) -> Result<OutputTable>
    where
        I: IntoIterator<Item = (S, StatementSet)>,
        S: Into<String>,
    {
        self.aggregate_loaded(
            companies
                .into_iter()
                .map(|(company, statements)| (company, Ok(statements))),
        )
    }

    /// Like [`Aggregator::aggregate`], for companies whose statements may have
    /// failed to load. A load error is recorded under the failure policy like
    /// any computation error.
    pub fn aggregate_loaded<I, S>(&self, companies: I) -> Result<OutputTable>
    where
        I: IntoIterator<Item = (S, Result<StatementSet>)>,
        S: Into<String>,
    {
        let mut table = OutputTable::new();

        for (company, statements) in companies {
            let company = company.into();
            let result = statements.and_then(|statements| self.compute(&company, &statements));
            self.record(&mut table, company, result)?;
        }

        info!(
            "Aggregated {} companies into {} indicator columns",
            table.rows().len(),
            table.columns().len()
        );

        Ok(table)
    }

    // On a missing mandatory item the error lists every mandatory item the statements lack
    fn compute(&self, company: &str, statements: &StatementSet) -> Result<IndicatorRow> {
        self.engine.compute(statements).map_err(|e| match e {
            IndicatorError::MissingLineItem { .. } => {
                let missing: Vec<String> = self
                    .engine
                    .catalog()
                    .missing_items(statements)
                    .into_iter()
                    .map(|(kind, label)| {
                        warn!("Company '{}': {} table lacks '{}'", company, kind, label);
                        format!("'{}' ({})", label, kind)
                    })
                    .collect();
                IndicatorError::IncompleteStatements {
                    source: Box::new(e),
                    missing,
                }
            }
            other => other,
        })
    }

    /// Adds one company's result to `table`, applying the failure policy.
    pub fn record(
        &self,
        table: &mut OutputTable,
        company: String,
        result: Result<IndicatorRow>,
    ) -> Result<()> {
        match result {
            Ok(row) => {
                info!("Computed {} indicators for '{}' at {}", row.len(), company, row.period);
                table.push(company, CompanyOutcome::Computed { row });
            }
            Err(e) => {
                let e = e.for_company(&company);
                match self.failure_policy {
                    FailurePolicy::Abort => return Err(e),
                    FailurePolicy::Isolate => {
                        warn!("Skipping indicators: {}", e);
                        table.push(
                            company,
                            CompanyOutcome::Failed {
                                reason: e.to_string(),
                            },
                        );
                    }
                }
            }
        }
        Ok(())
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(IndicatorEngine::default(), FailurePolicy::default())
    }
}
