use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use doctext::{
    capability::{Capabilities, Capability},
    config::Config,
    models::FileMeta,
    utils, Converter,
};
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "doctext")]
#[command(about = "Extract plain text from PDF, Word, RTF, HTML, XML, ODT, Pages and image files")]
#[command(version)]
struct Cli {
    /// Config file (defaults to the standard search locations)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Verbose logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a file to plain text
    Convert {
        /// File to convert
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Save the text to this file instead of printing it
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
        /// Skip whitespace reflow
        #[arg(long)]
        raw: bool,
    },
    /// Show how a file would be routed
    Classify {
        /// File to classify
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// List extraction backends and whether they are available
    Capabilities {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path),
        None => Config::load(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Convert { file, output, raw } => {
            if raw {
                config.normalizer.enabled = false;
            }
            let converter = Converter::new(&config);
            debug!("Converting {}", file.display());

            let result = converter.convert(&file).await;
            let failed = result.is_err();
            let text = result.unwrap_or_else(|e| e.to_string());

            match output {
                Some(out) => {
                    utils::save_text(&out, &text)?;
                    println!("Saved text to {}", out.display());
                }
                None => println!("{}", text),
            }

            if failed {
                std::process::exit(1);
            }
        }
        Commands::Classify { file } => {
            let meta = FileMeta::from_path(&file);
            println!("File:      {}", meta.path.display());
            println!("Extension: {}", meta.extension);
            println!("MIME:      {}", meta.mime);
            println!("Format:    {}", meta.format);
        }
        Commands::Capabilities { json } => {
            let caps: &Capabilities = Capabilities::resolve(&config);
            if json {
                let rendered = serde_json::to_string_pretty(caps)
                    .context("Failed to serialize capabilities")?;
                println!("{}", rendered);
            } else {
                for capability in Capability::ALL {
                    let status = if caps.ensure(capability) {
                        "available"
                    } else {
                        "unavailable"
                    };
                    println!("{:<14} {}", capability.name(), status);
                }
            }
        }
    }

    Ok(())
}
