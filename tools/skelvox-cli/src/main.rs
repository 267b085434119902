//! skelvox - skeleton file pair tool
//!
//! Loads a dataset's skeleton file pair through its metadata file
//! (`{meta-dir}/{dataset}.toml`) and reports on or exports it.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use skelvox_common::{SkeletonCollection, TomlMetadataResolver};

mod report;

use report::{CollectionReport, SkeletonReport};

#[derive(Parser)]
#[command(name = "skelvox")]
#[command(about = "Inspect and export skeleton file pairs")]
#[command(version)]
struct Cli {
    /// Directory containing dataset metadata files
    #[arg(long, global = true, default_value = "meta")]
    meta_dir: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print label and point counts for a dataset
    Info {
        /// Dataset identifier
        dataset: String,
    },

    /// Validate a dataset's file pair
    Check {
        /// Dataset identifier
        dataset: String,
    },

    /// Print one label's skeleton as JSON
    Dump {
        /// Dataset identifier
        dataset: String,

        /// Label to print
        #[arg(short, long)]
        label: u64,

        /// Report physical positions instead of voxel coordinates
        #[arg(long)]
        world: bool,
    },

    /// Export every label of a dataset as JSON
    Export {
        /// Dataset identifier
        dataset: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report physical positions instead of voxel coordinates
        #[arg(long)]
        world: bool,

        /// Skip labels without skeleton points
        #[arg(long)]
        skip_empty: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(io::stderr)
        .init();

    let resolver = TomlMetadataResolver::new(&cli.meta_dir);
    let load = |dataset: &str| {
        SkeletonCollection::load(&resolver, dataset)
            .with_context(|| format!("Failed to load skeletons for dataset '{dataset}'"))
    };

    match cli.command {
        Commands::Info { dataset } => {
            let collection = load(&dataset)?;
            let summary = collection.summary();
            tracing::info!(
                "{}: grid {}, {} labels ({} non-empty), {} joints, {} endpoints",
                dataset,
                collection.grid_size(),
                summary.labels,
                summary.non_empty_labels,
                summary.joints,
                summary.endpoints
            );
        }

        Commands::Check { dataset } => {
            let collection = load(&dataset)?;
            tracing::info!("{}: {} labels OK", dataset, collection.len());
        }

        Commands::Dump {
            dataset,
            label,
            world,
        } => {
            let collection = load(&dataset)?;
            let skeleton = collection.get(label).with_context(|| {
                format!(
                    "Label {} not in dataset '{}' ({} labels)",
                    label,
                    dataset,
                    collection.len()
                )
            })?;
            let report = SkeletonReport::new(skeleton, world)?;
            write_json(io::stdout().lock(), &report)?;
        }

        Commands::Export {
            dataset,
            output,
            world,
            skip_empty,
        } => {
            let collection = load(&dataset)?;
            let report = CollectionReport::new(&dataset, &collection, world, skip_empty)?;
            match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("Failed to create output: {:?}", path))?;
                    write_json(BufWriter::new(file), &report)?;
                    tracing::info!(
                        "Exported {} skeletons to {:?}",
                        report.skeletons.len(),
                        path
                    );
                }
                None => write_json(io::stdout().lock(), &report)?,
            }
        }
    }

    Ok(())
}

fn write_json<W: Write, T: serde::Serialize>(mut w: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut w, value).context("Failed to serialize JSON")?;
    writeln!(w)?;
    w.flush()?;
    Ok(())
}
