//! Tabstate CLI

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tabstate::config::Config;
use tabstate::report::{render_json, render_text};
use tabstate::scan::{ScanEntry, Scanner};

#[derive(Parser)]
#[command(name = "tabstate")]
#[command(version, about = "Recover note content from editor tab state files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true, help = "Config file path")]
    config: Option<PathBuf>,

    #[arg(long, global = true, help = "Output as JSON")]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode every tab state file in a directory
    Scan {
        #[arg(long, help = "TabState directory (overrides config)")]
        dir: Option<PathBuf>,
    },
    /// Decode the given files without name filtering
    Decode {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tabstate=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let entries = match cli.command {
        Commands::Scan { dir } => {
            let dir = match dir {
                Some(dir) => dir,
                None => config.resolve_tabstate_dir()?,
            };
            info!("TabState directory: {}", dir.display());
            Scanner::new(config).scan(&dir).await?
        }
        Commands::Decode { files } => Scanner::new(config).decode_files(files).await,
    };

    print_entries(&entries, cli.json)?;
    Ok(())
}

fn print_entries(entries: &[ScanEntry], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", render_json(entries)?);
    } else {
        for entry in entries {
            println!("{}", render_text(entry));
        }
    }
    Ok(())
}
