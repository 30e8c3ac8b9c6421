//! Terminal front-end for the forecasting dashboard.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use dashboard::{render_report, Dashboard, DashboardConfig, RenderOptions, Result, TabReport};
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "dashboard")]
#[command(about = "Prognozowanie cen akcji i wyników finansowych", long_about = None)]
struct Cli {
    /// JSON configuration file; built-in companies and tabs when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding `{key}/{key}_*.csv` files
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Company key or name; the first configured company when omitted
    #[arg(short = 'C', long)]
    company: Option<String>,

    /// Tab id; every tab when omitted
    #[arg(short, long)]
    tab: Option<String>,

    /// Chart width in characters
    #[arg(long, default_value_t = 80)]
    width: usize,

    /// Chart height in lines
    #[arg(long, default_value_t = 20)]
    height: usize,

    /// Forecast rows printed per tab
    #[arg(long, default_value_t = 10)]
    rows: usize,

    /// Print reports as JSON instead of text
    #[arg(long)]
    json: bool,

    /// List companies and tabs, then exit
    #[arg(long)]
    list: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dashboard=info,forecast_core=info".into()),
        )
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "dashboard failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => DashboardConfig::from_json_file(path)?,
        None => DashboardConfig::default(),
    };
    if let Some(dir) = cli.data_dir {
        config = config.with_data_dir(dir);
    }

    if cli.list {
        print_listing(&config);
        return Ok(());
    }

    let dashboard = Dashboard::new(config);
    let company = match cli.company {
        Some(company) => company,
        None => dashboard
            .config()
            .companies
            .first()
            .map(|c| c.key.clone())
            .ok_or_else(|| dashboard::DashboardError::Config("no companies configured".to_string()))?,
    };

    let reports: Vec<TabReport> = match &cli.tab {
        Some(tab) => vec![dashboard.run(&company, tab)?],
        None => dashboard.run_company(&company)?,
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        let options = RenderOptions {
            width: cli.width,
            height: cli.height,
            max_rows: cli.rows,
        };
        for report in &reports {
            println!("{}", render_report(report, &options));
        }
    }
    Ok(())
}

fn print_listing(config: &DashboardConfig) {
    println!("Spółki:");
    for company in &config.companies {
        println!("  {:<6} {}", company.key, company.name);
    }
    println!("Zakładki:");
    for tab in &config.tabs {
        println!("  {:<12} {}", tab.id, tab.title);
    }
}
