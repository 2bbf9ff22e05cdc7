// This is the command-line entry point for the Imagify client.
// The lib.rs file serves only as a public API for external consumers.

use std::path::PathBuf;
use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use imagify_lib::commands::{self, interactive};
use imagify_lib::{AppConfig, OperationKind, ParameterPatch};

#[derive(Parser, Debug)]
#[command(name = "imagify", version, about = "Imagify Pro client: enhance photos, add a smile, generate a video")]
struct Cli {
    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL (overrides config and IMAGIFY_API_BASE)
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Directory downloads are written to
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Enhance an image once with the given parameters
    Enhance {
        image: PathBuf,
        #[arg(long, default_value_t = 50.0)]
        enhancement: f64,
        #[arg(long, default_value_t = 50.0)]
        sharpness: f64,
        #[arg(long, default_value_t = 50.0)]
        clarity: f64,
    },
    /// Add a smile to a face photo
    Smile { image: PathBuf },
    /// Generate a short video from a face photo (~40s)
    Video { image: PathBuf },
    /// Tune parameters line by line from stdin
    Interactive {
        image: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Operation::Enhance)]
        operation: Operation,
    },
    /// Check that the backend is reachable
    Ping,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Operation {
    Enhance,
    Smile,
    Video,
}

impl From<Operation> for OperationKind {
    fn from(op: Operation) -> Self {
        match op {
            Operation::Enhance => OperationKind::Enhance,
            Operation::Smile => OperationKind::Smile,
            Operation::Video => OperationKind::Video,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)         // Remove file path
        .with_line_number(false)  // Remove line numbers
        .with_thread_ids(false)   // Remove thread IDs
        .with_thread_names(false) // Remove thread names
        .with_target(false)       // Remove module path
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

async fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref()).await.context("loading configuration")?;
    if let Some(api_base) = &cli.api_base {
        config.api_base = api_base.clone();
    }
    if let Some(output_dir) = &cli.output_dir {
        config.output_dir = output_dir.clone();
    }
    config.validate().context("validating configuration")?;
    debug!("Using config: {:?}", config);
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    info!("=== Imagify client starting ===");

    let config = load_config(&cli).await?;

    match cli.command {
        Command::Enhance { image, enhancement, sharpness, clarity } => {
            let patch = ParameterPatch {
                enhancement: Some(enhancement),
                sharpness: Some(sharpness),
                clarity: Some(clarity),
            };
            let saved = commands::run_operation(&config, OperationKind::Enhance, &image, &patch).await?;
            println!("{}", saved.display());
        }
        Command::Smile { image } => {
            let saved = commands::run_operation(&config, OperationKind::Smile, &image, &ParameterPatch::default()).await?;
            println!("{}", saved.display());
        }
        Command::Video { image } => {
            let saved = commands::run_operation(&config, OperationKind::Video, &image, &ParameterPatch::default()).await?;
            println!("{}", saved.display());
        }
        Command::Interactive { image, operation } => {
            let session = commands::open_session(&config, operation.into())?;
            interactive::run(session, image.as_deref(), &config).await?;
        }
        Command::Ping => {
            let message = commands::ping(&config).await?;
            println!("{}", message);
        }
    }

    info!("Exiting");
    Ok(())
}
