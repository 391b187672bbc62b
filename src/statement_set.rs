use crate::error::{IndicatorError, Result};
use crate::period::{normalize, PeriodParser};
use crate::schema::StatementKind;
use crate::table::{RawTable, StatementTable};

/// The three normalized statements of one company.
///
/// Each table is normalized on its own, so their period columns are not
/// guaranteed to line up.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementSet {
    assets: StatementTable,
    liabilities_equity: StatementTable,
    income_statement: StatementTable,
}

impl StatementSet {
    pub fn new(
        assets: StatementTable,
        liabilities_equity: StatementTable,
        income_statement: StatementTable,
    ) -> Result<Self> {
        expect_kind(&assets, StatementKind::Assets)?;
        expect_kind(&liabilities_equity, StatementKind::LiabilitiesEquity)?;
        expect_kind(&income_statement, StatementKind::IncomeStatement)?;

        Ok(Self {
            assets,
            liabilities_equity,
            income_statement,
        })
    }

    /// Normalizes three raw tables and bundles them.
    pub fn from_raw(
        assets: RawTable,
        liabilities_equity: RawTable,
        income_statement: RawTable,
        parser: &PeriodParser,
    ) -> Result<Self> {
        Self::new(
            normalize(assets, parser)?,
            normalize(liabilities_equity, parser)?,
            normalize(income_statement, parser)?,
        )
    }

    pub fn assets(&self) -> &StatementTable {
        &self.assets
    }

    pub fn liabilities_equity(&self) -> &StatementTable {
        &self.liabilities_equity
    }

    pub fn income_statement(&self) -> &StatementTable {
        &self.income_statement
    }

    pub fn get(&self, kind: StatementKind) -> &StatementTable {
        match kind {
            StatementKind::Assets => &self.assets,
            StatementKind::LiabilitiesEquity => &self.liabilities_equity,
            StatementKind::IncomeStatement => &self.income_statement,
        }
    }
}

fn expect_kind(table: &StatementTable, expected: StatementKind) -> Result<()> {
    if table.kind() != expected {
        return Err(IndicatorError::StatementKindMismatch {
            expected,
            found: table.kind(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::LineItem;

    fn raw(kind: StatementKind, headers: &[&str]) -> RawTable {
        let values = vec![1.0; headers.len()];
        RawTable::from_rows(
            kind,
            headers.iter().map(|h| h.to_string()).collect(),
            vec![LineItem::filled("Linha", &values)],
        )
        .unwrap()
    }

    #[test]
    fn test_tables_are_normalized_independently() {
        let set = StatementSet::from_raw(
            raw(StatementKind::Assets, &["31/12/2022", "31/12/2023"]),
            raw(StatementKind::LiabilitiesEquity, &["31/12/2023"]),
            raw(StatementKind::IncomeStatement, &["2023-12-31", "2022-12-31", "2021-12-31"]),
            &PeriodParser::day_first(),
        )
        .unwrap();

        assert_eq!(set.assets().column_keys(), vec!["2023-12-31", "2022-12-31"]);
        assert_eq!(set.liabilities_equity().periods().len(), 1);
        assert_eq!(
            set.get(StatementKind::IncomeStatement).latest_period(),
            set.assets().latest_period()
        );
    }

    #[test]
    fn test_rejects_swapped_tables() {
        let parser = PeriodParser::day_first();
        let assets = normalize(raw(StatementKind::Assets, &["31/12/2023"]), &parser).unwrap();
        let income =
            normalize(raw(StatementKind::IncomeStatement, &["31/12/2023"]), &parser).unwrap();

        let err = StatementSet::new(assets, income.clone(), income).unwrap_err();
        assert!(matches!(
            err,
            IndicatorError::StatementKindMismatch {
                expected: StatementKind::LiabilitiesEquity,
                found: StatementKind::IncomeStatement,
            }
        ));
    }
}
