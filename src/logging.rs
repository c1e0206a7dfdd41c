use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_ENV: &str = "LINKVAULT_LOG";
const DEFAULT_DIRECTIVE: &str = "linkvault=info";

#[derive(Debug, Clone)]
pub enum Target {
    Stderr,
    File(PathBuf),
}

fn env_filter(verbose: bool) -> EnvFilter {
    let fallback = if verbose {
        "linkvault=debug"
    } else {
        DEFAULT_DIRECTIVE
    };
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback))
}

pub fn init(target: Target, verbose: bool) -> Result<()> {
    let filter = env_filter(verbose);
    match target {
        Target::Stderr => tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(verbose),
            )
            .with(filter)
            .try_init()
            .context("install stderr logger")?,
        Target::File(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("logging: create directory {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("logging: open {}", path.display()))?;
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false)
                        .with_target(true),
                )
                .with(filter)
                .try_init()
                .context("install file logger")?;
        }
    }
    Ok(())
}

pub fn default_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("linkvault").join("linkvault.log"))
}
