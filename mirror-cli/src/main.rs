use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use mirror::{
    DatasetProgress, LocalTransport, MirrorEngine, MirrorOptions, TransferPlan,
};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "mirror")]
#[command(about = "A CLI tool for mirroring remote datasets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute and print the transfer plan without executing it
    Plan {
        /// Source directory serving as the remote dataset
        #[arg(short, long)]
        source: PathBuf,
        /// Previous snapshot root to reuse files from
        #[arg(long)]
        snapshot: Option<PathBuf>,
        /// File-name patterns to select remote files
        #[arg(short, long, required = true)]
        pattern: Vec<String>,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Execute a mirror run
    Run {
        /// Source directory serving as the remote dataset
        #[arg(short, long)]
        source: PathBuf,
        /// Destination directory for the new snapshot
        #[arg(short, long)]
        dest: PathBuf,
        /// Previous snapshot root to reuse files from
        #[arg(long)]
        snapshot: Option<PathBuf>,
        /// File-name patterns to select remote files
        #[arg(short, long, required = true)]
        pattern: Vec<String>,
        /// Upper bound on parallel transfer workers
        #[arg(long, default_value_t = 4)]
        workers: usize,
        /// Dataset identifier progress is recorded against
        #[arg(long)]
        dataset: Option<String>,
        /// Trust the snapshot inventory without probing the filesystem
        #[arg(long)]
        no_check_exists: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Plan {
            source,
            snapshot,
            pattern,
            json,
        } => {
            info!("Planning mirror of {}", source.display());

            let options = MirrorOptions {
                patterns: pattern,
                previous_root: snapshot,
                ..Default::default()
            };
            let engine = MirrorEngine::new(options)?;
            let transport = LocalTransport::new(&source);
            let plan = engine.plan(&transport).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                print_plan(&plan);
            }
            Ok(())
        }
        Commands::Run {
            source,
            dest,
            snapshot,
            pattern,
            workers,
            dataset,
            no_check_exists,
        } => {
            info!("Mirroring {} into {}", source.display(), dest.display());

            let progress = DatasetProgress::new(dataset.clone());
            let options = MirrorOptions {
                patterns: pattern,
                previous_root: snapshot,
                transfer_workers: workers,
                check_exists: !no_check_exists,
                dataset,
                ..Default::default()
            };
            let engine = MirrorEngine::new(options)?;
            let mut transport = LocalTransport::new(&source);

            match engine.run(&mut transport, &dest, &progress).await {
                Ok(report) => {
                    println!(
                        "✅ Mirrored {} files ({} downloaded, {} copied) in {:.2?}",
                        report.downloaded + report.copied,
                        report.downloaded,
                        report.copied,
                        report.duration
                    );
                    Ok(())
                }
                Err(e) => {
                    println!("❌ Mirror run failed: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
}

fn print_plan(plan: &TransferPlan) {
    println!(
        "Plan: {} to download ({} bytes), {} to copy ({} bytes)",
        plan.summary.download_count,
        plan.summary.bytes_to_download,
        plan.summary.copy_count,
        plan.summary.bytes_to_copy
    );
    for entry in &plan.downloads {
        println!("  download  {}", entry.name);
    }
    for entry in &plan.copies {
        println!("  copy      {}", entry.name);
    }
}
