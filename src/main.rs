use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kindling_manifest::assemble;
use kindling_scanner::scan_dir;
use kindling_trigger::normalize;

/// Kindling - deployment manifests for Rust cloud functions
#[derive(Parser)]
#[command(name = "kindling")]
#[command(version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Scan a source tree and print its deployment manifest
  Manifest {
    /// Root of the function source tree
    source_dir: PathBuf,

    /// Write the manifest to this file instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,
  },

  /// List the triggers declared in a source tree
  Triggers {
    /// Root of the function source tree
    source_dir: PathBuf,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr),
    )
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
    )
    .init();

  let cli = Cli::parse();

  match cli.command {
    Some(Commands::Manifest { source_dir, out }) => write_manifest(source_dir, out)?,
    Some(Commands::Triggers { source_dir }) => list_triggers(source_dir)?,
    None => {
      println!("kindling - use --help to see available commands");
    }
  }

  Ok(())
}

fn write_manifest(source_dir: PathBuf, out: Option<PathBuf>) -> Result<()> {
  let scanned = scan_dir(&source_dir)
    .with_context(|| format!("failed to scan {}", source_dir.display()))?;
  let manifest = assemble(scanned.params.values(), scanned.triggers.values())
    .context("failed to assemble manifest")?;
  let json = manifest
    .to_json_pretty()
    .context("failed to serialize manifest")?;

  match out {
    Some(path) => {
      fs::write(&path, format!("{}\n", json))
        .with_context(|| format!("failed to write manifest: {}", path.display()))?;
      info!(path = %path.display(), endpoints = manifest.endpoints.len(), "manifest written");
    }
    None => println!("{}", json),
  }

  Ok(())
}

fn list_triggers(source_dir: PathBuf) -> Result<()> {
  let scanned = scan_dir(&source_dir)
    .with_context(|| format!("failed to scan {}", source_dir.display()))?;

  if scanned.is_empty() {
    eprintln!("No declarations found in {}", source_dir.display());
    return Ok(());
  }

  for spec in scanned.triggers.values() {
    let id = normalize(&spec.name)
      .with_context(|| format!("trigger '{}' has no valid identifier", spec.name))?;
    println!("{:<14} {:<48} {}", spec.kind().as_str(), id, spec.name);
  }
  for param in scanned.params.values() {
    println!("{:<14} {}", "param", param.name);
  }

  Ok(())
}
