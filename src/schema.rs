use crate::error::Result;
use crate::line_items::LineItemCatalog;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum StatementKind {
    #[schemars(description = "Balance sheet assets side (ativos)")]
    Assets,

    #[schemars(description = "Balance sheet liabilities and shareholders' equity side (passivos)")]
    LiabilitiesEquity,

    #[schemars(description = "Income statement for the period (DRE)")]
    IncomeStatement,
}

impl StatementKind {
    /// File name used for this statement inside a company folder.
    pub fn default_file_name(&self) -> &'static str {
        match self {
            StatementKind::Assets => "ativos.csv",
            StatementKind::LiabilitiesEquity => "passivos.csv",
            StatementKind::IncomeStatement => "dre.csv",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatementKind::Assets => "assets",
            StatementKind::LiabilitiesEquity => "liabilities & equity",
            StatementKind::IncomeStatement => "income statement",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum DateConvention {
    #[default]
    #[schemars(description = "Ambiguous numeric dates are read day first: '05/03/2023' is 5 March 2023.")]
    DayFirst,

    #[schemars(description = "Ambiguous numeric dates are read month first: '05/03/2023' is 3 May 2023.")]
    MonthFirst,
}

impl DateConvention {
    pub fn from_day_first(day_first: bool) -> Self {
        if day_first {
            Self::DayFirst
        } else {
            Self::MonthFirst
        }
    }

    pub fn is_day_first(&self) -> bool {
        matches!(self, Self::DayFirst)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum ZeroDivisionPolicy {
    #[default]
    #[schemars(
        description = "Every ratio with a zero denominator, or depending on an undefined ratio, is reported as undefined (null) and the row still completes."
    )]
    Undefined,

    #[schemars(description = "Any zero denominator aborts the company's computation.")]
    Strict,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum FailurePolicy {
    #[default]
    #[schemars(
        description = "A company that fails keeps a row in the output marked as failed; other companies are unaffected."
    )]
    Isolate,

    #[schemars(description = "The first company failure aborts the whole batch.")]
    Abort,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CompanySource {
    #[schemars(description = "Company identifier; becomes the row label of the output table")]
    pub name: String,

    #[schemars(description = "Folder holding the company's three statement files")]
    pub folder: PathBuf,

    #[serde(default)]
    #[schemars(description = "Assets file name inside the folder. Defaults to 'ativos.csv'.")]
    pub assets_file: Option<String>,

    #[serde(default)]
    #[schemars(description = "Liabilities & equity file name inside the folder. Defaults to 'passivos.csv'.")]
    pub liabilities_file: Option<String>,

    #[serde(default)]
    #[schemars(description = "Income statement file name inside the folder. Defaults to 'dre.csv'.")]
    pub income_statement_file: Option<String>,
}

impl CompanySource {
    pub fn new(name: impl Into<String>, folder: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            folder: folder.into(),
            assets_file: None,
            liabilities_file: None,
            income_statement_file: None,
        }
    }

    pub fn statement_path(&self, kind: StatementKind) -> PathBuf {
        let custom = match kind {
            StatementKind::Assets => self.assets_file.as_deref(),
            StatementKind::LiabilitiesEquity => self.liabilities_file.as_deref(),
            StatementKind::IncomeStatement => self.income_statement_file.as_deref(),
        };
        self.folder
            .join(custom.unwrap_or_else(|| kind.default_file_name()))
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from("indicadores_empresas.csv")
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BatchConfig {
    #[schemars(description = "Companies to process, in output order")]
    pub companies: Vec<CompanySource>,

    #[serde(default = "default_output_path")]
    #[schemars(description = "Where the indicator table is written")]
    pub output_path: PathBuf,

    #[serde(default)]
    pub date_convention: DateConvention,

    #[serde(default)]
    pub zero_division: ZeroDivisionPolicy,

    #[serde(default)]
    pub failure_policy: FailurePolicy,

    #[serde(default)]
    #[schemars(description = "Row labels read from the statements. Defaults to Brazilian CVM labels.")]
    pub line_items: LineItemCatalog,
}

impl BatchConfig {
    pub fn new(companies: Vec<CompanySource>) -> Self {
        Self {
            companies,
            output_path: default_output_path(),
            date_convention: DateConvention::default(),
            zero_division: ZeroDivisionPolicy::default(),
            failure_policy: FailurePolicy::default(),
            line_items: LineItemCatalog::default(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(BatchConfig)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_generation() {
        let schema_json = BatchConfig::schema_as_json().unwrap();
        assert!(schema_json.contains("companies"));
        assert!(schema_json.contains("date_convention"));
        assert!(schema_json.contains("zero_division"));
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = BatchConfig::from_json_str(
            r#"{ "companies": [ { "name": "petrobras", "folder": "petrobras" } ] }"#,
        )
        .unwrap();

        assert_eq!(config.companies.len(), 1);
        assert_eq!(config.output_path, PathBuf::from("indicadores_empresas.csv"));
        assert_eq!(config.date_convention, DateConvention::DayFirst);
        assert_eq!(config.zero_division, ZeroDivisionPolicy::Undefined);
        assert_eq!(config.failure_policy, FailurePolicy::Isolate);
        assert_eq!(config.line_items.total_assets, "Total do Ativo");
    }

    #[test]
    fn test_statement_paths() {
        let mut source = CompanySource::new("prio", "data/prio");
        assert_eq!(
            source.statement_path(StatementKind::Assets),
            PathBuf::from("data/prio/ativos.csv")
        );

        source.income_statement_file = Some("income.csv".to_string());
        assert_eq!(
            source.statement_path(StatementKind::IncomeStatement),
            PathBuf::from("data/prio/income.csv")
        );
        assert_eq!(
            source.statement_path(StatementKind::LiabilitiesEquity),
            PathBuf::from("data/prio/passivos.csv")
        );
    }

    #[test]
    fn test_policy_names_round_trip() {
        let config = BatchConfig::from_json_str(
            r#"{
                "companies": [],
                "date_convention": "MonthFirst",
                "zero_division": "Strict",
                "failure_policy": "Abort"
            }"#,
        )
        .unwrap();

        assert!(!config.date_convention.is_day_first());
        assert_eq!(config.zero_division, ZeroDivisionPolicy::Strict);
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
        assert_eq!(DateConvention::from_day_first(true), DateConvention::DayFirst);
    }
}
