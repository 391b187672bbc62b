use crate::aggregator::OutputTable;
use crate::error::{IndicatorError, Result};
use log::info;
use std::io;
use std::path::Path;

/// Header of the extra column written when at least one company failed.
pub const ERROR_COLUMN: &str = "Erro";

/// A company row read back from a written report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRecord {
    pub company: String,
    pub values: Vec<(String, Option<f64>)>,
    pub error: Option<String>,
}

impl ReportRecord {
    pub fn get(&self, column: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .and_then(|(_, value)| *value)
    }
}

/// Writes companies as rows and indicators as columns. The first header cell
/// is left empty; undefined values are empty cells.
pub fn write_report_csv<W: io::Write>(table: &OutputTable, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let with_errors = table.has_failures();

    let mut header = Vec::with_capacity(table.columns().len() + 2);
    header.push(String::new());
    header.extend(table.columns().iter().cloned());
    if with_errors {
        header.push(ERROR_COLUMN.to_string());
    }
    csv_writer.write_record(&header)?;

    for result in table.rows() {
        let mut record = Vec::with_capacity(header.len());
        record.push(result.company.clone());
        record.extend(
            table
                .record(result)
                .into_iter()
                .map(|value| value.map(|v| v.to_string()).unwrap_or_default()),
        );
        if with_errors {
            record.push(result.failure().unwrap_or_default().to_string());
        }
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

pub fn save_report_csv(table: &OutputTable, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)?;
    write_report_csv(table, io::BufWriter::new(file))?;
    info!(
        "Indicators for {} companies saved to '{}'",
        table.rows().len(),
        path.display()
    );
    Ok(())
}

pub fn report_to_json(table: &OutputTable) -> Result<String> {
    Ok(serde_json::to_string_pretty(table)?)
}

pub fn read_report_csv<R: io::Read>(reader: R) -> Result<Vec<ReportRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);
    let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();

    let mut records = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let mut company = String::new();
        let mut values = Vec::new();
        let mut error = None;

        for (idx, (column, cell)) in headers.iter().zip(record.iter()).enumerate() {
            if idx == 0 {
                company = cell.to_string();
            } else if column == ERROR_COLUMN {
                error = (!cell.is_empty()).then(|| cell.to_string());
            } else if cell.is_empty() {
                values.push((column.clone(), None));
            } else {
                let value = cell
                    .parse::<f64>()
                    .map_err(|_| IndicatorError::InvalidReportValue {
                        company: company.clone(),
                        column: column.clone(),
                        value: cell.to_string(),
                    })?;
                values.push((column.clone(), Some(value)));
            }
        }

        records.push(ReportRecord {
            company,
            values,
            error,
        });
    }

    Ok(records)
}
