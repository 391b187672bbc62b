use crate::error::Result;
use crate::schema::StatementKind;
use crate::statement_set::StatementSet;
use crate::table::{Period, StatementTable};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Row labels the indicator engine reads from each statement.
///
/// Defaults follow the standardized statements published for Brazilian listed
/// companies. Every field can be overridden from the batch configuration, so
/// statements exported under other labels only need a different catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(default)]
pub struct LineItemCatalog {
    pub current_assets: String,
    pub inventories: String,
    pub cash_and_equivalents: String,
    pub marketable_securities: String,
    pub fixed_assets: String,
    pub intangible_assets: String,
    pub non_current_assets: String,
    pub total_assets: String,
    pub receivables: String,

    pub current_liabilities: String,
    pub non_current_liabilities: String,

    #[schemars(
        description = "Equity component rows. Shareholders' equity is the sum of the ones present; absent rows contribute nothing."
    )]
    pub equity_components: Vec<String>,

    pub revenue: String,
    pub cost_of_goods_sold: String,
    pub gross_profit: String,
    pub net_income: String,
    pub ebit: String,
    pub financial_expenses: String,
    pub depreciation_amortization: String,
    pub earnings_per_share: String,

    #[schemars(description = "Labels treated as zero when the row is absent instead of failing.")]
    pub optional_items: Vec<String>,
}

impl Default for LineItemCatalog {
    fn default() -> Self {
        Self {
            current_assets: "Ativo Circulante".to_string(),
            inventories: "Estoques".to_string(),
            cash_and_equivalents: "Caixa e equivalentes de caixa".to_string(),
            marketable_securities: "Títulos e valores mobiliários".to_string(),
            fixed_assets: "Imobilizado".to_string(),
            intangible_assets: "Intangível".to_string(),
            non_current_assets: "Ativo Não Circulante".to_string(),
            total_assets: "Total do Ativo".to_string(),
            receivables: "Contas a receber".to_string(),
            current_liabilities: "Total Passivo Circulante".to_string(),
            non_current_liabilities: "Total Passivo Não Circulante".to_string(),
            equity_components: vec![
                "Capital social realizado".to_string(),
                "Reservas de capital".to_string(),
                "Reservas de lucros".to_string(),
                "Ajuste acumulado de conversão".to_string(),
                "Ajuste de avaliação patrimonial".to_string(),
                "Resultado do período".to_string(),
            ],
            revenue: "Receita líquida (Receita de vendas)".to_string(),
            cost_of_goods_sold: "Custo dos produtos e serviços vendidos".to_string(),
            gross_profit: "Lucro bruto".to_string(),
            net_income: "Lucro líquido do período".to_string(),
            ebit: "Resultado operacional antes do resultado financeiro".to_string(),
            financial_expenses: "Despesas financeiras".to_string(),
            depreciation_amortization: "Despesa de depreciação e amortização".to_string(),
            earnings_per_share: "Lucro por ação - básico".to_string(),
            optional_items: vec!["Títulos e valores mobiliários".to_string()],
        }
    }
}

impl LineItemCatalog {
    pub fn is_optional(&self, label: &str) -> bool {
        self.optional_items.iter().any(|l| l == label)
    }

    /// Reads `label` from `table`, honouring the optional-with-default allow-list.
    pub fn fetch(&self, table: &StatementTable, label: &str, period: Period) -> Result<f64> {
        if self.is_optional(label) {
            table.lookup_or(label, period, 0.0)
        } else {
            table.lookup(label, period)
        }
    }

    /// Every single-row label the engine reads, paired with its statement.
    /// Equity components are not listed since none of them is required.
    pub fn entries(&self) -> Vec<(StatementKind, &str)> {
        let assets = [
            &self.current_assets,
            &self.inventories,
            &self.cash_and_equivalents,
            &self.marketable_securities,
            &self.fixed_assets,
            &self.intangible_assets,
            &self.non_current_assets,
            &self.total_assets,
            &self.receivables,
        ];
        let liabilities = [&self.current_liabilities, &self.non_current_liabilities];
        let income = [
            &self.revenue,
            &self.cost_of_goods_sold,
            &self.gross_profit,
            &self.net_income,
            &self.ebit,
            &self.financial_expenses,
            &self.depreciation_amortization,
            &self.earnings_per_share,
        ];

        assets
            .into_iter()
            .map(|l| (StatementKind::Assets, l.as_str()))
            .chain(
                liabilities
                    .into_iter()
                    .map(|l| (StatementKind::LiabilitiesEquity, l.as_str())),
            )
            .chain(
                income
                    .into_iter()
                    .map(|l| (StatementKind::IncomeStatement, l.as_str())),
            )
            .collect()
    }

    /// Mandatory labels absent from `statements`, in catalog order.
    pub fn missing_items(&self, statements: &StatementSet) -> Vec<(StatementKind, String)> {
        self.entries()
            .into_iter()
            .filter(|(kind, label)| {
                !self.is_optional(label) && !statements.get(*kind).has_line_item(label)
            })
            .map(|(kind, label)| (kind, label.to_string()))
            .collect()
    }
}
