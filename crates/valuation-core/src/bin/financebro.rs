//! financebro: company valuation versus industry peers
//!
//! # Usage
//!
//! ```bash
//! export FMP_API_KEY="your-key"
//!
//! # One-shot comparison
//! cargo run --bin financebro -- compare AAPL
//!
//! # Industry averages only
//! cargo run --bin financebro -- average "Consumer Electronics"
//!
//! # Interactive session
//! cargo run --bin financebro
//! ```

use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use valuation_core::commands::parse_ticker;
use valuation_core::{CompareConfig, ComparisonService, Reply, report};
use valuation_utils::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "financebro")]
#[command(about = "Compare a company's valuation ratios with its industry", long_about = None)]
struct Cli {
    /// Keep industry averages in memory only
    #[arg(long)]
    no_persist: bool,

    /// Directory for the industry averages snapshot (overrides FINANCEBRO_CACHE_DIR)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Industry average lifetime in seconds
    #[arg(long, default_value_t = 43_200)]
    ttl_secs: u64,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare one ticker with its industry and exit
    Compare { ticker: String },
    /// Print the cached or freshly computed averages for an industry label
    Average { industry: String },
}

fn build_config(cli: &Cli) -> valuation_core::Result<CompareConfig> {
    let mut builder = CompareConfig::builder()
        .with_env()
        .persist_cache(!cli.no_persist)
        .average_ttl(std::time::Duration::from_secs(cli.ttl_secs));
    if let Some(dir) = &cli.cache_dir {
        builder = builder.cache_dir(dir);
    }
    builder.build()
}

async fn run_repl(service: &ComparisonService) -> anyhow::Result<()> {
    println!("{}\n", valuation_core::Command::greeting());

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                // EOF
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {e}");
                continue;
            }
        }

        if input.trim().is_empty() {
            continue;
        }

        match service.respond(&input).await {
            Reply::Text(text) => println!("{text}\n"),
            Reply::Silent => {}
            Reply::Exit => {
                println!("Goodbye!");
                break;
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    valuation_utils::init_tracing_with("warn,valuation_core=info");

    let app = AppConfig::from_env();
    let cli = Cli::parse();
    let config = build_config(&cli)?;
    tracing::debug!(
        app = %app.app_name,
        environment = %app.environment,
        cache_dir = ?config.cache_dir,
        "Starting"
    );

    let service = ComparisonService::from_config(&config)?;

    match cli.command {
        Some(Commands::Compare { ticker }) => {
            let comparison = service.compare(&parse_ticker(&ticker)?).await?;
            println!("{}", report::render_report(&comparison));
        }
        Some(Commands::Average { industry }) => {
            let average = service.averages().get_or_compute(&industry).await?;
            if app.is_production() {
                println!("{}", serde_json::to_string(&average)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&average)?);
            }
        }
        None => run_repl(&service).await?,
    }

    Ok(())
}
