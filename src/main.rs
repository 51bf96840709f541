use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use clipgrade::gemini::GeminiClient;
use clipgrade::{assemble_report, batch, report, GradeReport, Grader, GraderConfig};

#[derive(Parser)]
#[command(name = "clipgrade")]
#[command(about = "Grade short-form videos and compute the payout they earn", long_about = None)]
struct Cli {
    /// TOML config file overriding the built-in defaults
    #[arg(long, global = true, env = "CLIPGRADE_CONFIG")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a video, evaluate it with the model and print the report
    Grade {
        /// Path of the video file to evaluate
        video: PathBuf,
        /// Model identifier, overrides config and GEMINI_MODEL
        #[arg(long)]
        model: Option<String>,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Score saved model outputs without calling the model
    Score {
        /// Raw text returned for the quality evaluation prompt
        #[arg(long)]
        quality: PathBuf,
        /// Raw text returned for the compliance prompt
        #[arg(long)]
        compliance: PathBuf,
        /// Model label recorded in the report
        #[arg(long, default_value = "offline")]
        model: String,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Score a CSV of recorded assessments and write payouts to another CSV
    Batch {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Markdown,
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Grade {
            video,
            model,
            format,
            out,
        } => {
            if !video.is_file() {
                anyhow::bail!("video to evaluate not found: {}", video.display());
            }

            let mut config = GraderConfig::load(cli.config.as_deref())?;
            if let Some(model) = model {
                config.gemini.model = model;
            }
            let client = GeminiClient::new(&config.gemini)?;
            let grader = Grader::new(client, config);
            let report = grader.grade(&video).await?;
            emit(&report, format, out.as_deref())?;
        }
        Commands::Score {
            quality,
            compliance,
            model,
            format,
            out,
        } => {
            let config = GraderConfig::load(cli.config.as_deref())?;
            let quality_text = std::fs::read_to_string(&quality)
                .with_context(|| format!("failed to read {}", quality.display()))?;
            let compliance_text = std::fs::read_to_string(&compliance)
                .with_context(|| format!("failed to read {}", compliance.display()))?;
            let report = assemble_report(
                Uuid::new_v4(),
                &quality_text,
                &compliance_text,
                &model,
                &config,
            )?;
            emit(&report, format, out.as_deref())?;
        }
        Commands::Batch { csv, out } => {
            let config = GraderConfig::load(cli.config.as_deref())?;
            let scored = batch::score_csv(&csv, &out, &config)
                .with_context(|| format!("failed to score {}", csv.display()))?;
            println!("Scored {scored} videos from {} into {}.", csv.display(), out.display());
        }
    }

    Ok(())
}

fn emit(report: &GradeReport, format: Format, out: Option<&Path>) -> anyhow::Result<()> {
    let rendered = match format {
        Format::Json => serde_json::to_string_pretty(report)?,
        Format::Markdown => report::build_markdown(report),
    };

    match out {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Report written to {}.", path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("clipgrade=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
