use std::path::PathBuf;

use anyhow::Result;
use kpi_core::{KpiError, NarrativeStyle};
use kpi_orchestrator::{KpiConfig, KpiOrchestrator};
use narrative_engine::render;

mod input;

use input::load_snapshots;

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  kpi-agent <rows.json>                       Multi-metric report for the whole series");
    eprintln!("  kpi-agent <rows.json> --monthly             Compare the last two periods");
    eprintln!("  kpi-agent <rows.json> --ask \"question\"      Answer a question about one metric");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --style brief|executive|detailed   Narrative style (default: KPI_DEFAULT_STYLE)");
    eprintln!("  --json                             Print the raw analysis as JSON");
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load .env, init tracing
    dotenvy::dotenv().ok();

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    // 2. Arguments
    let args: Vec<String> = std::env::args().collect();
    let path = match args.get(1).filter(|a| !a.starts_with("--")) {
        Some(path) => PathBuf::from(path),
        None => {
            print_usage();
            std::process::exit(1);
        }
    };
    let as_json = args.iter().any(|a| a == "--json");
    let monthly = args.iter().any(|a| a == "--monthly");
    let question = flag_value(&args, "--ask");
    let style_arg = flag_value(&args, "--style");

    // 3. Configuration
    let config = KpiConfig::from_env()?;
    tracing::info!("Configuration loaded");
    tracing::info!("  Default style: {}", config.default_style.as_str());
    tracing::info!("  Default range: {}", config.default_range.as_str());
    tracing::info!("  Enrichment: {}", if config.enrichment_enabled() { "enabled" } else { "disabled" });

    let style = match style_arg {
        Some(s) => s.parse::<NarrativeStyle>()?,
        None => config.default_style,
    };
    let orchestrator = KpiOrchestrator::new(config);

    // 4. Data
    let rows = load_snapshots(&path)?;
    tracing::info!("Loaded {} periods from {}", rows.len(), path.display());

    // 5. Analysis
    if let Some(question) = question {
        let payload = orchestrator.answer(question, style_arg, &rows).await;
        println!("{}", render(&payload));
        return Ok(());
    }

    if monthly {
        let (base, target) = match rows.as_slice() {
            [.., base, target] => (base, target),
            _ => {
                return Err(KpiError::InsufficientData(format!(
                    "Need at least 2 periods of KPI data, found {}.",
                    rows.len()
                ))
                .into())
            }
        };
        let analysis = orchestrator.analyze_monthly(base, target);
        if as_json {
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        } else {
            let report = &analysis.report;
            println!("MONTHLY KPI REPORT ({} -> {})", report.meta.from_period, report.meta.to_period);
            println!("Summary: {}", report.summary);
            println!("Driver: {}", report.driver);
            println!("Risk: {}", report.risk);
            println!("Recommendation: {}", report.recommendation);
            println!("Risk score: {}", analysis.decision.risk_score);
        }
        return Ok(());
    }

    let analysis = orchestrator.analyze_series_enriched(&rows, style).await;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    println!("{}", render(&analysis.to_payload()));
    println!();
    println!("Volatility:");
    for gauge in &analysis.gauges {
        println!(
            "- {}: {:.0} ({}) {}",
            gauge.metric.label(),
            gauge.score,
            gauge.badge.as_str(),
            gauge.arrow.symbol()
        );
    }
    println!();
    println!("Narratives:");
    for item in &analysis.narratives {
        let narrative = &item.narrative;
        println!("- {}: {}", item.metric.label(), narrative.narrative);
        println!("  Risk: {}", narrative.risk);
        println!("  Recommendation: {}", narrative.recommendation);
    }

    Ok(())
}
