use anyhow::Result;
use financial_indicators::*;
use std::fs;
use std::path::Path;

const ASSETS_CSV: &str = "\
,31/12/2022,31/12/2023,30/06/2023
Ativo Circulante,450,500,480
Caixa e equivalentes de caixa,90,100,95
Títulos e valores mobiliários,40,50,45
Contas a receber,110,120,115
Estoques,70,80,75
Ativo Não Circulante,1350,1500,1400
Imobilizado,850,900,880
Intangível,280,300,290
Total do Ativo,1800,2000,1880
";

const LIABILITIES_CSV: &str = "\
,31/12/2023,31/12/2022,30/06/2023
Total Passivo Circulante,250,240,245
Total Passivo Não Circulante,750,700,720
Capital social realizado,600,600,600
Reservas de capital,100,100,100
Reservas de lucros,250,200,220
Ajuste acumulado de conversão,50,40,45
Ajuste de avaliação patrimonial,-20,-20,-20
Resultado do período,20,0,10
";

const INCOME_CSV: &str = "\
,30/06/2023,31/12/2023,31/12/2022
Receita líquida (Receita de vendas),480,1000,900
Custo dos produtos e serviços vendidos,-290,-600,-560
Lucro bruto,190,400,340
Resultado operacional antes do resultado financeiro,120,250,200
Despesas financeiras,-25,-50,-45
Despesa de depreciação e amortização,-35,-70,-65
Lucro líquido do período,70,150,120
Lucro por ação - básico,0.7,1.5,1.2
";

fn write_company(root: &Path, name: &str, assets: &str, liabilities: &str, income: &str) -> Result<()> {
    let folder = root.join(name);
    fs::create_dir_all(&folder)?;
    fs::write(folder.join("ativos.csv"), assets)?;
    fs::write(folder.join("passivos.csv"), liabilities)?;
    fs::write(folder.join("dre.csv"), income)?;
    Ok(())
}

fn without_line(csv: &str, label: &str) -> String {
    csv.lines()
        .filter(|line| !line.starts_with(label))
        .map(|line| format!("{}\n", line))
        .collect()
}

fn assert_close(actual: Option<f64>, expected: f64) {
    let actual = actual.expect("indicator should be defined");
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}

#[test]
fn test_end_to_end_failure_isolation() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_company(dir.path(), "A", ASSETS_CSV, LIABILITIES_CSV, INCOME_CSV)?;
    write_company(
        dir.path(),
        "B",
        &without_line(ASSETS_CSV, "Total do Ativo"),
        LIABILITIES_CSV,
        &without_line(INCOME_CSV, "Lucro bruto"),
    )?;

    let mut config = BatchConfig::new(vec![
        CompanySource::new("A", dir.path().join("A")),
        CompanySource::new("B", dir.path().join("B")),
    ]);
    config.output_path = dir.path().join("indicadores_empresas.csv");

    let table = IndicatorProcessor::run_and_save(&config)?;

    let a = table.company("A").expect("A must be present");
    let row = a.row().expect("A must be computed");
    assert_eq!(row.period.key(), "2023-12-31");
    assert_eq!(row.len(), 27);
    assert_eq!(row.get(Indicator::GrossMargin), Some(0.4));
    assert_close(row.get(Indicator::CurrentLiquidity), 2.0);
    assert_close(row.get(Indicator::Equity), 1000.0);
    assert_close(row.get(Indicator::SharesOutstanding), 100.0);

    let b = table.company("B").expect("B must be present");
    let reason = b.failure().expect("B must be marked failed");
    assert!(reason.contains("'B'"));
    assert!(reason.contains("'Total do Ativo' (assets)"));
    assert!(reason.contains("'Lucro bruto' (income statement)"));

    let written = read_report_csv(fs::File::open(&config.output_path)?)?;
    assert_eq!(written.len(), 2);
    assert_eq!(written[0].company, "A");
    assert_eq!(written[0].get("Margem Bruta"), Some(0.4));
    assert_eq!(written[1].company, "B");
    assert!(written[1].values.iter().all(|(_, v)| v.is_none()));
    assert!(written[1].error.is_some());

    Ok(())
}

#[test]
fn test_batch_config_from_json_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_company(dir.path(), "petrobras", ASSETS_CSV, LIABILITIES_CSV, INCOME_CSV)?;

    let config_path = dir.path().join("batch.json");
    let config_json = serde_json_config(dir.path());
    fs::write(&config_path, config_json)?;

    let config = BatchConfig::from_json_file(&config_path)?;
    assert_eq!(config.zero_division, ZeroDivisionPolicy::Strict);

    let table = IndicatorProcessor::run(&config)?;
    assert_close(table.value("petrobras", "EBITDA"), 220.0);
    assert_close(table.value("petrobras", "I Cobertura Juros"), 5.0);

    Ok(())
}

fn serde_json_config(root: &Path) -> String {
    format!(
        r#"{{
            "companies": [{{ "name": "petrobras", "folder": {:?} }}],
            "zero_division": "Strict",
            "output_path": {:?}
        }}"#,
        root.join("petrobras").display().to_string(),
        root.join("out.csv").display().to_string()
    )
}

#[test]
fn test_month_first_convention_changes_period_reading() -> Result<()> {
    let assets = RawTable::from_rows(
        StatementKind::Assets,
        vec!["01/02/2023".to_string(), "01/03/2023".to_string()],
        vec![LineItem::filled("Total do Ativo", &[1.0, 2.0])],
    )?;

    let day_first = normalize(assets.clone(), &PeriodParser::day_first())?;
    assert_eq!(day_first.column_keys(), vec!["2023-03-01", "2023-02-01"]);

    let month_first = normalize(assets, &PeriodParser::month_first())?;
    assert_eq!(month_first.column_keys(), vec!["2023-01-03", "2023-01-02"]);
    assert_eq!(month_first.rows()[0].values, vec![Some(2.0), Some(1.0)]);

    Ok(())
}

#[test]
fn test_misaligned_income_statement_is_reported() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let shifted_income = INCOME_CSV.replacen("31/12/2023", "30/12/2023", 1);
    write_company(dir.path(), "C", ASSETS_CSV, LIABILITIES_CSV, &shifted_income)?;

    let config = BatchConfig::new(vec![CompanySource::new("C", dir.path().join("C"))]);
    let table = IndicatorProcessor::run(&config)?;

    let reason = table.company("C").and_then(|c| c.failure()).unwrap_or_default();
    assert!(reason.contains("2023-12-31"));
    assert!(reason.contains("income statement"));

    Ok(())
}

#[test]
fn test_unparseable_header_fails_only_that_company() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_company(dir.path(), "A", ASSETS_CSV, LIABILITIES_CSV, INCOME_CSV)?;
    write_company(
        dir.path(),
        "D",
        &ASSETS_CSV.replacen("30/06/2023", "1S23", 1),
        LIABILITIES_CSV,
        INCOME_CSV,
    )?;

    let config = BatchConfig::new(vec![
        CompanySource::new("D", dir.path().join("D")),
        CompanySource::new("A", dir.path().join("A")),
    ]);
    let table = IndicatorProcessor::run(&config)?;

    assert_eq!(table.companies().collect::<Vec<_>>(), vec!["D", "A"]);
    assert!(table.company("D").and_then(|c| c.failure()).unwrap_or_default().contains("1S23"));
    assert!(table.company("A").and_then(|c| c.row()).is_some());

    Ok(())
}
