use crate::error::{IndicatorError, Result};
use crate::schema::StatementKind;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical period identifier. Orders chronologically and renders as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period(NaiveDate);

impl Period {
    pub const KEY_FORMAT: &'static str = "%Y-%m-%d";

    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::KEY_FORMAT))
    }
}

impl FromStr for Period {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), Self::KEY_FORMAT).map(Self)
    }
}

impl From<NaiveDate> for Period {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

/// A named row of a statement table; one value slot per column, `None` for blank cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub label: String,
    pub values: Vec<Option<f64>>,
}

impl LineItem {
    pub fn new(label: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            label: label.into(),
            values,
        }
    }

    pub fn filled(label: impl Into<String>, values: &[f64]) -> Self {
        Self::new(label, values.iter().copied().map(Some).collect())
    }
}

/// A statement table as delivered by a loader: column headers are still free text.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    kind: StatementKind,
    headers: Vec<String>,
    rows: Vec<LineItem>,
}

impl RawTable {
    pub fn new(kind: StatementKind, headers: Vec<String>) -> Self {
        Self {
            kind,
            headers,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(
        kind: StatementKind,
        headers: Vec<String>,
        rows: Vec<LineItem>,
    ) -> Result<Self> {
        let mut table = Self::new(kind, headers);
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn push_row(&mut self, row: LineItem) -> Result<()> {
        if row.values.len() != self.headers.len() {
            return Err(IndicatorError::MalformedTable {
                table: self.kind,
                details: format!(
                    "row '{}' has {} values but the table has {} columns",
                    row.label,
                    row.values.len(),
                    self.headers.len()
                ),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[LineItem] {
        &self.rows
    }

    pub(crate) fn into_parts(self) -> (StatementKind, Vec<String>, Vec<LineItem>) {
        (self.kind, self.headers, self.rows)
    }
}

/// A normalized statement table: distinct periods, most recent first.
///
/// Only the period normalizer builds these, so the ordering invariant holds for
/// every instance.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementTable {
    kind: StatementKind,
    periods: Vec<Period>,
    rows: Vec<LineItem>,
}

impl StatementTable {
    pub(crate) fn from_normalized(
        kind: StatementKind,
        periods: Vec<Period>,
        rows: Vec<LineItem>,
    ) -> Self {
        debug_assert!(periods.windows(2).all(|w| w[0] > w[1]));
        Self {
            kind,
            periods,
            rows,
        }
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn column_keys(&self) -> Vec<String> {
        self.periods.iter().map(Period::key).collect()
    }

    pub fn latest_period(&self) -> Option<Period> {
        self.periods.first().copied()
    }

    pub fn rows(&self) -> &[LineItem] {
        &self.rows
    }

    pub fn has_period(&self, period: Period) -> bool {
        self.column_index(period).is_some()
    }

    pub fn has_line_item(&self, label: &str) -> bool {
        self.row(label).is_some()
    }

    /// First row carrying `label`; later duplicates are shadowed.
    pub fn row(&self, label: &str) -> Option<&LineItem> {
        self.rows.iter().find(|r| r.label == label)
    }

    pub fn value(&self, label: &str, period: Period) -> Option<f64> {
        let idx = self.column_index(period)?;
        self.row(label).and_then(|r| r.values[idx])
    }

    /// Looks up a mandatory line item.
    pub fn lookup(&self, label: &str, period: Period) -> Result<f64> {
        let idx = self.require_period(period)?;
        let row = self
            .row(label)
            .ok_or_else(|| IndicatorError::MissingLineItem {
                table: self.kind,
                label: label.to_string(),
            })?;
        row.values[idx].ok_or_else(|| IndicatorError::MissingValue {
            table: self.kind,
            label: label.to_string(),
            period: period.key(),
        })
    }

    /// Looks up an optional line item, substituting `default` when the row is
    /// absent or its cell is blank.
    pub fn lookup_or(&self, label: &str, period: Period, default: f64) -> Result<f64> {
        let idx = self.require_period(period)?;
        Ok(self
            .row(label)
            .and_then(|r| r.values[idx])
            .unwrap_or(default))
    }

    /// Sums the given labels, skipping any that are absent or blank.
    pub fn sum_present<S: AsRef<str>>(&self, labels: &[S], period: Period) -> Result<f64> {
        let idx = self.require_period(period)?;
        Ok(labels
            .iter()
            .filter_map(|label| self.row(label.as_ref()).and_then(|r| r.values[idx]))
            .sum())
    }

    fn column_index(&self, period: Period) -> Option<usize> {
        self.periods.iter().position(|p| *p == period)
    }

    fn require_period(&self, period: Period) -> Result<usize> {
        self.column_index(period)
            .ok_or_else(|| IndicatorError::MissingPeriod {
                table: self.kind,
                period: period.key(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(y: i32, m: u32, d: u32) -> Period {
        Period::new(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn sample() -> StatementTable {
        StatementTable::from_normalized(
            StatementKind::LiabilitiesEquity,
            vec![period(2023, 12, 31), period(2022, 12, 31)],
            vec![
                LineItem::filled("Capital social realizado", &[100.0, 90.0]),
                LineItem::new("Reservas de lucros", vec![None, Some(5.0)]),
                LineItem::filled("Reservas de capital", &[20.0, 20.0]),
                LineItem::filled("Capital social realizado", &[999.0, 999.0]),
            ],
        )
    }

    #[test]
    fn test_period_key_round_trip() {
        let p = period(2024, 3, 5);
        assert_eq!(p.key(), "2024-03-05");
        assert_eq!("2024-03-05".parse::<Period>().unwrap(), p);
        assert!("05/03/2024".parse::<Period>().is_err());
    }

    #[test]
    fn test_lookup_variants() {
        let table = sample();
        let latest = table.latest_period().unwrap();

        assert_eq!(table.lookup("Capital social realizado", latest).unwrap(), 100.0);
        assert!(matches!(
            table.lookup("Reservas de lucros", latest),
            Err(IndicatorError::MissingValue { .. })
        ));
        assert!(matches!(
            table.lookup("Ações em tesouraria", latest),
            Err(IndicatorError::MissingLineItem { .. })
        ));
        assert!(matches!(
            table.lookup("Capital social realizado", period(2021, 12, 31)),
            Err(IndicatorError::MissingPeriod { .. })
        ));
        assert_eq!(table.lookup_or("Ações em tesouraria", latest, 0.0).unwrap(), 0.0);
    }

    #[test]
    fn test_sum_present_skips_absent_and_blank() {
        let table = sample();
        let labels = [
            "Capital social realizado",
            "Reservas de lucros",
            "Reservas de capital",
            "Ajuste acumulado de conversão",
        ];
        assert_eq!(table.sum_present(&labels, period(2023, 12, 31)).unwrap(), 120.0);
        assert_eq!(table.sum_present(&labels, period(2022, 12, 31)).unwrap(), 115.0);
    }

    #[test]
    fn test_raw_table_rejects_ragged_rows() {
        let result = RawTable::from_rows(
            StatementKind::Assets,
            vec!["31/12/2023".to_string()],
            vec![LineItem::filled("Ativo Circulante", &[1.0, 2.0])],
        );
        assert!(matches!(result, Err(IndicatorError::MalformedTable { .. })));
    }
}
