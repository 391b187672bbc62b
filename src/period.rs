//! Period normalization.
//!
//! Statement loaders hand over column headers exactly as they appear in the
//! source ("31/12/2023", "2023-12-31 00:00:00", "31 Dec 2023", ...). This module
//! turns each header into a [`Period`] and reorders the columns so the most
//! recent period comes first. Consumers rely on that ordering only: the first
//! column is the latest period, nothing more.

use crate::error::{IndicatorError, Result};
use crate::schema::DateConvention;
use crate::table::{LineItem, Period, RawTable, StatementTable};
use chrono::NaiveDate;
use log::{debug, warn};
use std::collections::BTreeMap;

// Every layout ends with the year; two-digit years are widened before parsing
const TEXTUAL_FORMATS: [&str; 7] = [
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d-%b-%Y",
    "%d/%b/%Y",
    "%b %d %Y",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PeriodParser {
    convention: DateConvention,
}

impl PeriodParser {
    pub fn new(convention: DateConvention) -> Self {
        Self { convention }
    }

    pub fn day_first() -> Self {
        Self::new(DateConvention::DayFirst)
    }

    pub fn month_first() -> Self {
        Self::new(DateConvention::MonthFirst)
    }

    pub fn convention(&self) -> DateConvention {
        self.convention
    }

    /// Parses a single column header. Returns `None` when no supported layout matches.
    pub fn parse(&self, header: &str) -> Option<NaiveDate> {
        let text = header.trim();
        if text.is_empty() {
            return None;
        }

        // "31/12/2023 00:00:00" carries a time of day we do not need
        let date_part = match text.split_once(' ') {
            Some((head, tail)) if tail.contains(':') => head,
            _ => text,
        };

        parse_iso_prefix(text)
            .or_else(|| self.parse_numeric(date_part))
            .or_else(|| parse_textual(text))
    }

    pub fn parse_period(&self, header: &str) -> Option<Period> {
        self.parse(header).map(Period::new)
    }

    fn parse_numeric(&self, text: &str) -> Option<NaiveDate> {
        let separator = ['/', '-', '.'].into_iter().find(|c| text.contains(*c));
        let parts: Vec<&str> = match separator {
            Some(sep) => text.split(sep).map(str::trim).collect(),
            None => vec![text],
        };

        if parts.iter().any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit())) {
            return None;
        }

        match parts.as_slice() {
            [year] if year.len() == 4 => NaiveDate::from_ymd_opt(year.parse().ok()?, 1, 1),
            [compact] if compact.len() == 8 => NaiveDate::from_ymd_opt(
                compact[..4].parse().ok()?,
                compact[4..6].parse().ok()?,
                compact[6..].parse().ok()?,
            ),
            [month, year] if year.len() == 4 => {
                NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
            }
            [year, month] if year.len() == 4 && month.len() <= 2 => {
                NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
            }
            [year, month, day] if year.len() == 4 => NaiveDate::from_ymd_opt(
                year.parse().ok()?,
                month.parse().ok()?,
                day.parse().ok()?,
            ),
            [first, second, year] if year.len() == 4 || year.len() == 2 => {
                let year = expand_year(year.parse().ok()?, year.len());
                let first: u32 = first.parse().ok()?;
                let second: u32 = second.parse().ok()?;

                let (day, month) = if self.convention.is_day_first() {
                    (first, second)
                } else {
                    (second, first)
                };

                NaiveDate::from_ymd_opt(year, month, day).or_else(|| {
                    let swapped = NaiveDate::from_ymd_opt(year, day, month)?;
                    warn!(
                        "Header '{}' is not valid as {:?}; reading it with the opposite order as {}",
                        text, self.convention, swapped
                    );
                    Some(swapped)
                })
            }
            _ => None,
        }
    }
}

fn parse_iso_prefix(text: &str) -> Option<NaiveDate> {
    let head = text.get(..10)?;
    let rest = &text[10..];
    if !(rest.is_empty() || rest.starts_with(' ') || rest.starts_with('T')) {
        return None;
    }
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

fn parse_textual(text: &str) -> Option<NaiveDate> {
    let year_digits = text.chars().rev().take_while(char::is_ascii_digit).count();
    let text = match year_digits {
        4 => text.to_string(),
        2 => {
            let (head, year) = text.split_at(text.len() - 2);
            format!("{}{}", head, expand_year(year.parse().ok()?, 2))
        }
        _ => return None,
    };

    TEXTUAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&text, fmt).ok())
}

fn expand_year(value: i32, digits: usize) -> i32 {
    if digits == 4 {
        value
    } else if value < 69 {
        2000 + value
    } else {
        1900 + value
    }
}

/// Rewrites every column header of `raw` to its canonical period and orders
/// the columns most recent first.
///
/// Headers that resolve to the same date collapse into one column; the column
/// appearing last in the source wins.
pub fn normalize(raw: RawTable, parser: &PeriodParser) -> Result<StatementTable> {
    let (kind, headers, rows) = raw.into_parts();

    let mut by_period: BTreeMap<Period, usize> = BTreeMap::new();
    for (idx, header) in headers.iter().enumerate() {
        let period =
            parser
                .parse_period(header)
                .ok_or_else(|| IndicatorError::UnparseableDate {
                    table: kind,
                    header: header.clone(),
                })?;

        if let Some(previous) = by_period.insert(period, idx) {
            warn!(
                "Columns '{}' and '{}' of the {} table both resolve to {}; keeping '{}'",
                headers[previous], header, kind, period, header
            );
        }
    }

    let (periods, order): (Vec<Period>, Vec<usize>) = by_period.into_iter().rev().unzip();

    let rows = rows
        .into_iter()
        .map(|row| LineItem {
            values: order.iter().map(|&idx| row.values[idx]).collect(),
            label: row.label,
        })
        .collect();

    debug!(
        "Normalized {} table: {} columns -> {} periods, latest {:?}",
        kind,
        headers.len(),
        periods.len(),
        periods.first().map(Period::key)
    );

    Ok(StatementTable::from_normalized(kind, periods, rows))
}
