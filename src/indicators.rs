use crate::table::Period;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Indicator {
    // Liquidity
    GeneralLiquidity,
    CurrentLiquidity,
    QuickLiquidity,
    ImmediateLiquidity,
    // Profitability
    GrossMargin,
    NetMargin,
    ReturnOnEquity,
    ReturnOnAssets,
    FinancialLeverage,
    // Turnover
    TotalAssetTurnover,
    FixedAssetTurnover,
    InventoryTurnover,
    ReceivablesTurnover,
    InventoryTurnoverCost,
    AverageInventoryDays,
    AverageCollectionDays,
    // Leverage and coverage
    Indebtedness,
    InterestCoverage,
    Ebitda,
    // Direct values
    GrossProfit,
    Revenue,
    NetIncome,
    Equity,
    TotalAssets,
    EarningsPerShare,
    NetIncomeToShareholders,
    SharesOutstanding,
}

impl Indicator {
    pub const RATIOS: [Indicator; 19] = [
        Indicator::GeneralLiquidity,
        Indicator::CurrentLiquidity,
        Indicator::QuickLiquidity,
        Indicator::ImmediateLiquidity,
        Indicator::GrossMargin,
        Indicator::NetMargin,
        Indicator::ReturnOnEquity,
        Indicator::ReturnOnAssets,
        Indicator::FinancialLeverage,
        Indicator::TotalAssetTurnover,
        Indicator::FixedAssetTurnover,
        Indicator::InventoryTurnover,
        Indicator::ReceivablesTurnover,
        Indicator::InventoryTurnoverCost,
        Indicator::AverageInventoryDays,
        Indicator::AverageCollectionDays,
        Indicator::Indebtedness,
        Indicator::InterestCoverage,
        Indicator::Ebitda,
    ];

    pub const VALUES: [Indicator; 8] = [
        Indicator::GrossProfit,
        Indicator::Revenue,
        Indicator::NetIncome,
        Indicator::Equity,
        Indicator::TotalAssets,
        Indicator::EarningsPerShare,
        Indicator::NetIncomeToShareholders,
        Indicator::SharesOutstanding,
    ];

    /// Column name used in the output table.
    pub fn name(&self) -> &'static str {
        match self {
            Indicator::GeneralLiquidity => "IL Geral",
            Indicator::CurrentLiquidity => "IL Corrente",
            Indicator::QuickLiquidity => "IL Seca",
            Indicator::ImmediateLiquidity => "IL Imediata",
            Indicator::GrossMargin => "Margem Bruta",
            Indicator::NetMargin => "Margem Líquida",
            Indicator::ReturnOnEquity => "ROE",
            Indicator::ReturnOnAssets => "ROA",
            Indicator::FinancialLeverage => "Grau Alav. Financeira (DFL)",
            Indicator::TotalAssetTurnover => "I Giro Ativo Total",
            Indicator::FixedAssetTurnover => "I Giro Ativo Fixo",
            Indicator::InventoryTurnover => "I Giro Estoques",
            Indicator::ReceivablesTurnover => "I Giro Contas a Receber",
            Indicator::InventoryTurnoverCost => "Giro Estoque (CPV/Estoque)",
            Indicator::AverageInventoryDays => "PME (dias)",
            Indicator::AverageCollectionDays => "PMC (dias)",
            Indicator::Indebtedness => "I Endividamento",
            Indicator::InterestCoverage => "I Cobertura Juros",
            Indicator::Ebitda => "EBITDA",
            Indicator::GrossProfit => "Lucro Bruto",
            Indicator::Revenue => "Vendas",
            Indicator::NetIncome => "Lucro Líquido",
            Indicator::Equity => "Patrimônio Líquido",
            Indicator::TotalAssets => "Ativo Total",
            Indicator::EarningsPerShare => "Lucro por Ação (básico)",
            Indicator::NetIncomeToShareholders => "Lucro dispon. acionistas",
            Indicator::SharesOutstanding => "Nº ações emitidas",
        }
    }

    pub fn is_ratio(&self) -> bool {
        Self::RATIOS.contains(self)
    }

    pub fn all() -> impl Iterator<Item = Indicator> {
        Self::RATIOS.into_iter().chain(Self::VALUES)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().find(|i| i.name() == name)
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Computed indicators for one company at one period. `None` marks an
/// undefined value. Entries keep insertion order: ratios, then direct values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub period: Period,
    entries: Vec<(Indicator, Option<f64>)>,
}

impl IndicatorRow {
    pub fn new(period: Period) -> Self {
        Self {
            period,
            entries: Vec::with_capacity(Indicator::RATIOS.len() + Indicator::VALUES.len()),
        }
    }

    /// Sets `indicator`, replacing an earlier value in place.
    pub fn insert(&mut self, indicator: Indicator, value: Option<f64>) {
        match self.entries.iter_mut().find(|(i, _)| *i == indicator) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((indicator, value)),
        }
    }

    pub fn get(&self, indicator: Indicator) -> Option<f64> {
        self.entries
            .iter()
            .find(|(i, _)| *i == indicator)
            .and_then(|(_, v)| *v)
    }

    pub fn contains(&self, indicator: Indicator) -> bool {
        self.entries.iter().any(|(i, _)| *i == indicator)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Indicator, Option<f64>)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
