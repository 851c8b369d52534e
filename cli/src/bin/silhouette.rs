use clap::{Parser, Subcommand};
use cli::{JobConfig, OutputFormat, Overrides, run_job};
use color_eyre::eyre::{Result, eyre};
use silhouette::{Pipeline, ResizePolicy};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Trace images into filled vector silhouettes
    Trace {
        /// Input image files (PNG, JPEG, TIFF)
        inputs: Vec<PathBuf>,
        /// Job file (.toml or .json); flags below override its values
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Output format
        #[arg(short, long)]
        format: Option<OutputFormat>,
        /// Page sizing policy
        #[arg(long)]
        policy: Option<ResizePolicy>,
        /// Page bound in points
        #[arg(long)]
        bound: Option<u32>,
        /// Simplification tolerance as a fraction of each contour's perimeter
        #[arg(long)]
        tolerance: Option<f64>,
        /// Write intermediate rasters to this directory
        #[arg(long)]
        debug_dir: Option<PathBuf>,
        /// Trace at source resolution instead of resampling
        #[arg(long)]
        native_resolution: bool,
    },
    /// Print the JSON schema of the job file
    Schema,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Trace {
            inputs,
            config,
            output_dir,
            format,
            policy,
            bound,
            tolerance,
            debug_dir,
            native_resolution,
        } => {
            let job = match config {
                Some(path) => JobConfig::from_file(&path)?,
                None => JobConfig::default(),
            };
            let job = job.apply(Overrides {
                inputs: inputs.iter().map(|p| p.to_string_lossy().into_owned()).collect(),
                output_dir: output_dir.map(|p| p.to_string_lossy().into_owned()),
                format,
                debug_dir: debug_dir.map(|p| p.to_string_lossy().into_owned()),
                policy,
                bound,
                tolerance,
                native_resolution,
            });
            run(&job)?;
        }
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&JobConfig::schema())?);
        }
    }

    Ok(())
}

fn run(job: &JobConfig) -> Result<()> {
    let pipeline = Pipeline::builder().with_config(job.trace.clone()).build();
    info!("{}", pipeline.info());
    info!("Tracing {} image(s) into {}", job.inputs.len(), job.output_dir);

    let outcomes = run_job(job)?;

    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(output) => info!("{} -> {}", outcome.input, output.display()),
            Err(e) => {
                failed += 1;
                error!("{}: {}", outcome.input, e);
            }
        }
    }

    info!("Done: {} traced, {} failed", outcomes.len() - failed, failed);
    if failed > 0 {
        return Err(eyre!("{} of {} image(s) failed", failed, outcomes.len()));
    }
    Ok(())
}
