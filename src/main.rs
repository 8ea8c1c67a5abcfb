use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use tracing_subscriber::EnvFilter;

use asp_decomposition::{monitoring, runner, types::AppConfig};

#[derive(Parser, Debug)]
#[command(name = "asp-decomposition")]
#[command(about = "Archive-backed ASP mix/price decomposition of an e-commerce catalog", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.toml")]
    config: String,

    /// Write both output files into this directory instead of the configured paths
    #[arg(long)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Collect archived listings, analyze them and write both reports
    Run {},
    /// Re-run the analysis from a previously written observations CSV
    Analyze {
        /// Observations CSV produced by an earlier run
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "asp_decomposition=debug,asp=debug,info");
    }
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    tracing::info!(target: "asp", "asp-decomposition starting");

    let cli = Cli::parse();
    tracing::debug!(target: "asp", config = %cli.config, "loading config");

    let mut settings = AppConfig::from_file(&cli.config)?;
    settings.validate()?;
    if let Some(dir) = &cli.output_dir {
        settings.output.relocate(dir);
    }
    tracing::info!(
        target: "asp",
        config = %cli.config,
        categories = settings.collection.categories.len(),
        observations_csv = %settings.output.observations_csv.display(),
        analysis_json = %settings.output.analysis_json.display(),
        "config loaded"
    );

    match cli.command.unwrap_or(Commands::Run {}) {
        Commands::Run {} => {
            monitoring::logger::log_startup(&settings);
            runner::run_pipeline(&settings).await?;
        }
        Commands::Analyze { input } => {
            runner::analyze_file(&settings, &input)?;
        }
    }

    Ok(())
}
