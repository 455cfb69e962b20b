//! Snapshot Lint CLI
//!
//! Checks persisted build configuration snapshots before a host loads them:
//! reports what validation would coerce (empty and duplicate names) and
//! prints or verifies content digests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use buildconf::RegistrySnapshot;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "buildconf-lint")]
#[command(about = "Check persisted build configuration snapshots")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report problems validation would coerce on load
    Check {
        /// Snapshot file (JSON)
        file: PathBuf,
    },

    /// Print the snapshot's content digest
    Digest {
        /// Snapshot file (JSON)
        file: PathBuf,
    },

    /// Verify a snapshot against a previously recorded digest
    Verify {
        /// Snapshot file (JSON)
        file: PathBuf,
        /// Expected SHA-256 hex digest
        #[arg(short, long)]
        digest: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn load_snapshot(file: &Path) -> anyhow::Result<RegistrySnapshot> {
    RegistrySnapshot::load(file).with_context(|| format!("reading snapshot {}", file.display()))
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Check { file } => {
            let snapshot = load_snapshot(&file)?;

            if snapshot.is_empty() {
                println!("ℹ️  No configurations yet - loading seeds one default configuration");
                return Ok(());
            }

            let mut findings = 0usize;
            let mut seen: HashMap<&str, usize> = HashMap::new();
            for (index, configuration) in snapshot.configurations.iter().enumerate() {
                if configuration.name.is_empty() {
                    findings += 1;
                    println!("❌ configuration #{index} has an empty name");
                }
                if let Some(first) = seen.insert(configuration.name.as_str(), index) {
                    findings += 1;
                    println!(
                        "❌ duplicate name {:?}: #{index} will overwrite #{first} on load",
                        configuration.name
                    );
                }
            }

            if findings == 0 {
                println!(
                    "✅ {} configuration(s), no findings",
                    snapshot.configurations.len()
                );
            } else {
                println!("❌ {findings} finding(s)");
                std::process::exit(1);
            }
            Ok(())
        }

        Commands::Digest { file } => {
            let snapshot = load_snapshot(&file)?;
            println!("{}", snapshot.digest());
            Ok(())
        }

        Commands::Verify { file, digest } => {
            let snapshot = load_snapshot(&file)?;
            if snapshot.verify_digest(&digest) {
                println!("✅ digest matches");
            } else {
                println!("❌ digest mismatch");
                println!("   expected: {digest}");
                println!("   actual:   {}", snapshot.digest());
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
