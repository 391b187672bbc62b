use crate::error::{IndicatorError, Result};
use crate::indicators::{Indicator, IndicatorRow};
use crate::line_items::LineItemCatalog;
use crate::schema::{StatementKind, ZeroDivisionPolicy};
use crate::statement_set::StatementSet;
use crate::table::Period;
use log::debug;

const DAYS_PER_YEAR: f64 = 365.0;

pub struct IndicatorEngine {
    catalog: LineItemCatalog,
    zero_division: ZeroDivisionPolicy,
}

// Line items for the reference period, after defaults and sums are applied
struct StatementValues {
    current_assets: f64,
    inventories: f64,
    cash_and_equivalents: f64,
    marketable_securities: f64,
    fixed_assets: f64,
    intangible_assets: f64,
    non_current_assets: f64,
    total_assets: f64,
    receivables: f64,
    current_liabilities: f64,
    non_current_liabilities: f64,
    equity: f64,
    revenue: f64,
    cost_of_goods_sold: f64,
    gross_profit: f64,
    net_income: f64,
    ebit: f64,
    financial_expenses: f64,
    depreciation_amortization: f64,
    earnings_per_share: f64,
}

impl StatementValues {
    /// Non-current assets other than fixed and intangible assets.
    fn long_term_realizable(&self) -> f64 {
        self.non_current_assets - (self.fixed_assets + self.intangible_assets)
    }

    fn total_liabilities(&self) -> f64 {
        self.current_liabilities + self.non_current_liabilities
    }
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self::new(LineItemCatalog::default(), ZeroDivisionPolicy::default())
    }
}

impl IndicatorEngine {
    pub fn new(catalog: LineItemCatalog, zero_division: ZeroDivisionPolicy) -> Self {
        Self {
            catalog,
            zero_division,
        }
    }

    pub fn catalog(&self) -> &LineItemCatalog {
        &self.catalog
    }

    pub fn zero_division(&self) -> ZeroDivisionPolicy {
        self.zero_division
    }

    /// The latest assets period, which must also exist verbatim in the other two statements.
    pub fn reference_period(&self, statements: &StatementSet) -> Result<Period> {
        let period = statements
            .assets()
            .latest_period()
            .ok_or(IndicatorError::EmptyTable(StatementKind::Assets))?;

        for kind in [
            StatementKind::LiabilitiesEquity,
            StatementKind::IncomeStatement,
        ] {
            if !statements.get(kind).has_period(period) {
                return Err(IndicatorError::MissingPeriod {
                    table: kind,
                    period: period.key(),
                });
            }
        }

        Ok(period)
    }

    pub fn compute(&self, statements: &StatementSet) -> Result<IndicatorRow> {
        let period = self.reference_period(statements)?;
        debug!("Computing indicators for period {}", period);

        let v = self.extract(statements, period)?;
        let mut row = IndicatorRow::new(period);

        let roe = self.ratio(Indicator::ReturnOnEquity, v.net_income, v.equity)?;
        let roa = self.ratio(Indicator::ReturnOnAssets, v.net_income, v.total_assets)?;
        let inventory_turnover_cost = self.ratio(
            Indicator::InventoryTurnoverCost,
            v.cost_of_goods_sold,
            v.inventories,
        )?;

        row.insert(
            Indicator::GeneralLiquidity,
            self.ratio(
                Indicator::GeneralLiquidity,
                v.current_assets + v.long_term_realizable(),
                v.total_liabilities(),
            )?,
        );
        row.insert(
            Indicator::CurrentLiquidity,
            self.ratio(
                Indicator::CurrentLiquidity,
                v.current_assets,
                v.current_liabilities,
            )?,
        );
        row.insert(
            Indicator::QuickLiquidity,
            self.ratio(
                Indicator::QuickLiquidity,
                v.current_assets - v.inventories,
                v.current_liabilities,
            )?,
        );
        row.insert(
            Indicator::ImmediateLiquidity,
            self.ratio(
                Indicator::ImmediateLiquidity,
                v.cash_and_equivalents + v.marketable_securities,
                v.current_liabilities,
            )?,
        );
        row.insert(
            Indicator::GrossMargin,
            self.ratio(Indicator::GrossMargin, v.gross_profit, v.revenue)?,
        );
        row.insert(
            Indicator::NetMargin,
            self.ratio(Indicator::NetMargin, v.net_income, v.revenue)?,
        );
        row.insert(Indicator::ReturnOnEquity, roe);
        row.insert(Indicator::ReturnOnAssets, roa);
        row.insert(
            Indicator::FinancialLeverage,
            self.chained_ratio(Indicator::FinancialLeverage, roe, roa)?,
        );
        row.insert(
            Indicator::TotalAssetTurnover,
            self.ratio(Indicator::TotalAssetTurnover, v.revenue, v.total_assets)?,
        );
        row.insert(
            Indicator::FixedAssetTurnover,
            self.ratio(Indicator::FixedAssetTurnover, v.revenue, v.fixed_assets)?,
        );
        row.insert(
            Indicator::InventoryTurnover,
            self.ratio(Indicator::InventoryTurnover, v.revenue, v.inventories)?,
        );
        row.insert(
            Indicator::ReceivablesTurnover,
            self.ratio(Indicator::ReceivablesTurnover, v.revenue, v.receivables)?,
        );
        row.insert(Indicator::InventoryTurnoverCost, inventory_turnover_cost);
        row.insert(
            Indicator::AverageInventoryDays,
            self.chained_ratio(
                Indicator::AverageInventoryDays,
                Some(DAYS_PER_YEAR),
                inventory_turnover_cost,
            )?,
        );
        row.insert(
            Indicator::AverageCollectionDays,
            self.ratio(
                Indicator::AverageCollectionDays,
                DAYS_PER_YEAR * v.receivables,
                v.revenue,
            )?,
        );
        row.insert(
            Indicator::Indebtedness,
            self.ratio(
                Indicator::Indebtedness,
                v.total_liabilities(),
                v.total_assets,
            )?,
        );
        row.insert(
            Indicator::InterestCoverage,
            self.ratio(Indicator::InterestCoverage, v.ebit, v.financial_expenses)?,
        );
        row.insert(
            Indicator::Ebitda,
            Some(v.net_income + v.depreciation_amortization),
        );

        let shares = self.ratio(
            Indicator::SharesOutstanding,
            v.net_income,
            v.earnings_per_share,
        )?;

        row.insert(Indicator::GrossProfit, Some(v.gross_profit));
        row.insert(Indicator::Revenue, Some(v.revenue));
        row.insert(Indicator::NetIncome, Some(v.net_income));
        row.insert(Indicator::Equity, Some(v.equity));
        row.insert(Indicator::TotalAssets, Some(v.total_assets));
        row.insert(Indicator::EarningsPerShare, Some(v.earnings_per_share));
        row.insert(Indicator::NetIncomeToShareholders, Some(v.net_income));
        row.insert(Indicator::SharesOutstanding, shares);

        Ok(row)
    }

    fn extract(&self, statements: &StatementSet, period: Period) -> Result<StatementValues> {
        let c = &self.catalog;
        let assets = statements.assets();
        let liabilities = statements.liabilities_equity();
        let income = statements.income_statement();

        Ok(StatementValues {
            current_assets: c.fetch(assets, &c.current_assets, period)?,
            inventories: c.fetch(assets, &c.inventories, period)?,
            cash_and_equivalents: c.fetch(assets, &c.cash_and_equivalents, period)?,
            marketable_securities: c.fetch(assets, &c.marketable_securities, period)?,
            fixed_assets: c.fetch(assets, &c.fixed_assets, period)?,
            intangible_assets: c.fetch(assets, &c.intangible_assets, period)?,
            non_current_assets: c.fetch(assets, &c.non_current_assets, period)?,
            total_assets: c.fetch(assets, &c.total_assets, period)?,
            receivables: c.fetch(assets, &c.receivables, period)?,
            current_liabilities: c.fetch(liabilities, &c.current_liabilities, period)?,
            non_current_liabilities: c.fetch(liabilities, &c.non_current_liabilities, period)?,
            equity: liabilities.sum_present(&c.equity_components, period)?,
            revenue: c.fetch(income, &c.revenue, period)?,
            // Expense lines are reported with either sign depending on the source
            cost_of_goods_sold: c.fetch(income, &c.cost_of_goods_sold, period)?.abs(),
            gross_profit: c.fetch(income, &c.gross_profit, period)?,
            net_income: c.fetch(income, &c.net_income, period)?,
            ebit: c.fetch(income, &c.ebit, period)?,
            financial_expenses: c.fetch(income, &c.financial_expenses, period)?.abs(),
            depreciation_amortization: c
                .fetch(income, &c.depreciation_amortization, period)?
                .abs(),
            earnings_per_share: c.fetch(income, &c.earnings_per_share, period)?,
        })
    }

    fn ratio(&self, indicator: Indicator, numerator: f64, denominator: f64) -> Result<Option<f64>> {
        self.chained_ratio(indicator, Some(numerator), Some(denominator))
    }

    /// Division over possibly undefined operands. An undefined operand yields
    /// an undefined result; a zero denominator follows the configured policy.
    fn chained_ratio(
        &self,
        indicator: Indicator,
        numerator: Option<f64>,
        denominator: Option<f64>,
    ) -> Result<Option<f64>> {
        let (Some(numerator), Some(denominator)) = (numerator, denominator) else {
            return Ok(None);
        };

        if denominator == 0.0 {
            return match self.zero_division {
                ZeroDivisionPolicy::Undefined => Ok(None),
                ZeroDivisionPolicy::Strict => Err(IndicatorError::DivisionUndefined {
                    indicator: indicator.name().to_string(),
                }),
            };
        }

        Ok(Some(numerator / denominator))
    }
}
