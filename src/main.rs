use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gitsync::{Config, Credentials, SyncEngine};

#[derive(Parser)]
#[command(name = "gitsync")]
#[command(about = "Synchronize local git clones against a declarative repository list")]
#[command(version)]
struct Cli {
    /// Repository list file
    #[arg(short, long, default_value = "repos.yml")]
    file: PathBuf,

    /// Base directory for all clones
    #[arg(short, long, default_value = ".")]
    base: String,

    /// Default username for listing APIs and http(s) remotes
    #[arg(short, long, default_value = "")]
    username: String,

    /// Default password
    #[arg(short, long, default_value = "")]
    password: String,

    /// Read the default password from this file instead
    #[arg(long)]
    password_file: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;
    info!("Starting gitsync v{}", env!("CARGO_PKG_VERSION"));

    // The password file only applies when no literal password was given.
    let mut password = cli.password;
    if password.is_empty() {
        if let Some(path) = &cli.password_file {
            password = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read password file {:?}", path))?
                .trim()
                .to_string();
        }
    }

    let base_dir = shellexpand::full(&cli.base)?;
    let base_dir = PathBuf::from(base_dir.as_ref());
    std::fs::create_dir_all(&base_dir)
        .with_context(|| format!("cannot create base directory {:?}", base_dir))?;

    let config = Config::load(&cli.file)?;
    info!(
        "Loaded {} entries from {}",
        config.repos.len(),
        cli.file.display()
    );

    let defaults = Credentials {
        username: cli.username,
        password,
    };
    let engine = SyncEngine::new(base_dir, defaults);
    let summary = engine.run(&config.repos).await;

    println!("\n🎉 Synchronization complete!");
    println!("   📥 Cloned: {}", summary.cloned);
    println!("   🔄 Updated: {}", summary.updated);
    println!("   ✅ Already up to date: {}", summary.up_to_date);
    println!("   ⏭️  Ignored: {}", summary.skipped);
    println!("   ❌ Failed: {}", summary.failed);

    // Best-effort run-to-completion: partial failure still exits 0.
    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    Ok(())
}
