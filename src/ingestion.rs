use crate::error::{IndicatorError, Result};
use crate::period::PeriodParser;
use crate::schema::{CompanySource, StatementKind};
use crate::statement_set::StatementSet;
use crate::table::{LineItem, RawTable};
use log::debug;
use std::io;
use std::path::Path;

/// Reads one statement exported as CSV.
///
/// The first column holds the row labels and its header is ignored; every
/// other header is a period. Blank cells become missing values.
pub fn read_statement_csv<R: io::Read>(reader: R, kind: StatementKind) -> Result<RawTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .skip(1)
        .map(str::to_string)
        .collect();

    let mut table = RawTable::new(kind, headers);

    for record in csv_reader.records() {
        let record = record?;
        let mut fields = record.iter();
        let label = match fields.next() {
            Some(label) if !label.is_empty() => label.to_string(),
            _ => {
                return Err(IndicatorError::MalformedTable {
                    table: kind,
                    details: format!(
                        "row at line {} has no label",
                        record.position().map(|p| p.line()).unwrap_or_default()
                    ),
                })
            }
        };

        let values = fields
            .zip(table.headers())
            .map(|(cell, column)| parse_cell(cell, kind, &label, column))
            .collect::<Result<Vec<_>>>()?;

        table.push_row(LineItem::new(label, values))?;
    }

    debug!(
        "Read {} table: {} rows x {} columns",
        kind,
        table.rows().len(),
        table.headers().len()
    );

    Ok(table)
}

fn parse_cell(cell: &str, kind: StatementKind, label: &str, column: &str) -> Result<Option<f64>> {
    if cell.is_empty() {
        return Ok(None);
    }
    cell.parse::<f64>()
        .map(Some)
        .map_err(|_| IndicatorError::InvalidNumber {
            table: kind,
            label: label.to_string(),
            column: column.to_string(),
            value: cell.to_string(),
        })
}

pub fn load_statement_csv(path: impl AsRef<Path>, kind: StatementKind) -> Result<RawTable> {
    let path = path.as_ref();
    debug!("Loading {} statement from {}", kind, path.display());
    let file = std::fs::File::open(path)?;
    read_statement_csv(io::BufReader::new(file), kind)
}

/// Loads and normalizes the three statements of one company.
pub fn load_company(source: &CompanySource, parser: &PeriodParser) -> Result<StatementSet> {
    let load = |kind| load_statement_csv(source.statement_path(kind), kind);
    StatementSet::from_raw(
        load(StatementKind::Assets)?,
        load(StatementKind::LiabilitiesEquity)?,
        load(StatementKind::IncomeStatement)?,
        parser,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_labels_headers_and_blanks() {
        let data = "\
,31/12/2023,31/12/2022
Ativo Circulante,500.5,450
Estoques,,70
Total do Ativo, 2000 ,1800
";
        let table = read_statement_csv(data.as_bytes(), StatementKind::Assets).unwrap();

        assert_eq!(table.headers(), &["31/12/2023", "31/12/2022"]);
        assert_eq!(table.rows().len(), 3);
        assert_eq!(table.rows()[0].values, vec![Some(500.5), Some(450.0)]);
        assert_eq!(table.rows()[1].values, vec![None, Some(70.0)]);
        assert_eq!(table.rows()[2].values, vec![Some(2000.0), Some(1800.0)]);
    }

    #[test]
    fn test_invalid_number_names_cell() {
        let data = ",31/12/2023\nEstoques,1.234,56\n";
        let err = read_statement_csv(data.as_bytes(), StatementKind::Assets).unwrap_err();
        // ragged row is rejected by the CSV reader before any number is parsed
        assert!(matches!(err, IndicatorError::CsvError(_)));

        let data = ",31/12/2023\nEstoques,n/a\n";
        match read_statement_csv(data.as_bytes(), StatementKind::Assets).unwrap_err() {
            IndicatorError::InvalidNumber { label, column, value, .. } => {
                assert_eq!(label, "Estoques");
                assert_eq!(column, "31/12/2023");
                assert_eq!(value, "n/a");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_label_is_rejected() {
        let data = ",31/12/2023\n,10\n";
        let err = read_statement_csv(data.as_bytes(), StatementKind::IncomeStatement).unwrap_err();
        assert!(matches!(err, IndicatorError::MalformedTable { .. }));
    }
}
