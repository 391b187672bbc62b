use financial_indicators::*;
use std::fs;
use std::path::Path;

fn write_statements(folder: &Path, scale: f64, with_securities: bool) -> std::io::Result<()> {
    fs::create_dir_all(folder)?;

    let row = |label: &str, latest: f64, previous: f64| {
        format!("{},{},{}\n", label, previous * scale, latest * scale)
    };

    let mut assets = String::from(",31/12/2022,31/12/2023\n");
    assets.push_str(&row("Ativo Circulante", 500.0, 450.0));
    assets.push_str(&row("Caixa e equivalentes de caixa", 100.0, 90.0));
    if with_securities {
        assets.push_str(&row("Títulos e valores mobiliários", 50.0, 40.0));
    }
    assets.push_str(&row("Contas a receber", 120.0, 110.0));
    assets.push_str(&row("Estoques", 80.0, 70.0));
    assets.push_str(&row("Ativo Não Circulante", 1500.0, 1350.0));
    assets.push_str(&row("Imobilizado", 900.0, 850.0));
    assets.push_str(&row("Intangível", 300.0, 280.0));
    assets.push_str(&row("Total do Ativo", 2000.0, 1800.0));

    let mut liabilities = String::from(",31/12/2022,31/12/2023\n");
    liabilities.push_str(&row("Total Passivo Circulante", 250.0, 240.0));
    liabilities.push_str(&row("Total Passivo Não Circulante", 750.0, 700.0));
    liabilities.push_str(&row("Capital social realizado", 600.0, 600.0));
    liabilities.push_str(&row("Reservas de lucros", 400.0, 360.0));

    let mut income = String::from(",31/12/2022,31/12/2023\n");
    income.push_str(&row("Receita líquida (Receita de vendas)", 1000.0, 900.0));
    income.push_str(&row("Custo dos produtos e serviços vendidos", -600.0, -560.0));
    income.push_str(&row("Lucro bruto", 400.0, 340.0));
    income.push_str(&row(
        "Resultado operacional antes do resultado financeiro",
        250.0,
        200.0,
    ));
    income.push_str(&row("Despesas financeiras", -50.0, -45.0));
    income.push_str(&row("Despesa de depreciação e amortização", -70.0, -65.0));
    income.push_str(&row("Lucro líquido do período", 150.0, 120.0));
    income.push_str("Lucro por ação - básico,1.2,1.5\n");

    fs::write(folder.join("ativos.csv"), assets)?;
    fs::write(folder.join("passivos.csv"), liabilities)?;
    fs::write(folder.join("dre.csv"), income)?;
    Ok(())
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    println!("📊 Financial Indicators Demo\n");

    let workspace = tempfile::tempdir()?;
    write_statements(&workspace.path().join("petrobras"), 10.0, true)?;
    write_statements(&workspace.path().join("prio"), 1.0, false)?;

    let mut config = BatchConfig::new(vec![
        CompanySource::new("petrobras", workspace.path().join("petrobras")),
        CompanySource::new("prio", workspace.path().join("prio")),
        CompanySource::new("missing", workspace.path().join("missing")),
    ]);
    config.output_path = workspace.path().join("indicadores_empresas.csv");

    let table = IndicatorProcessor::run_and_save(&config)?;

    for result in table.rows() {
        match &result.outcome {
            CompanyOutcome::Computed { row } => {
                println!("✅ {} ({})", result.company, row.period);
                for (indicator, value) in row.iter() {
                    match value {
                        Some(v) => println!("   {:<30} {:>14.4}", indicator.name(), v),
                        None => println!("   {:<30} {:>14}", indicator.name(), "undefined"),
                    }
                }
            }
            CompanyOutcome::Failed { reason } => {
                println!("❌ {}: {}", result.company, reason);
            }
        }
        println!();
    }

    println!("📁 Report written to {}", config.output_path.display());
    println!("{}", fs::read_to_string(&config.output_path)?);

    Ok(())
}
