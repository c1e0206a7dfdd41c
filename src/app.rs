use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;

use crate::collection;
use crate::config;
use crate::feed;
use crate::logging;
use crate::prefs::{self, FileStore, PreferencesBridge};
use crate::ui;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config_file: Option<PathBuf>,
    pub collections_dir: Option<PathBuf>,
    pub verbose: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FeedOptions {
    pub config_file: Option<PathBuf>,
    pub collections_dir: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub limit: Option<usize>,
    pub verbose: bool,
}

fn load_config(config_file: Option<PathBuf>) -> Result<config::Config> {
    config::load(config::LoadOptions {
        config_file,
        env_prefix: None,
    })
    .context("load config")
}

pub fn run(options: RunOptions) -> Result<()> {
    if let Some(path) = logging::default_log_path() {
        if let Err(err) = logging::init(logging::Target::File(path), options.verbose) {
            eprintln!("warning: logging disabled: {err:#}");
        }
    }

    let cfg = load_config(options.config_file)?;
    let collections_dir = options.collections_dir.or(cfg.content.collections_dir);

    let prefs_path = prefs::default_path()
        .context("could not determine a configuration directory for preferences")?;
    let display_path = friendly_path(Some(&prefs_path));
    let bridge = PreferencesBridge::open(Arc::new(FileStore::new(prefs_path)));

    tracing::info!(
        collections = ?collections_dir,
        page_size = cfg.content.page_size,
        "starting browser"
    );

    let mut model = ui::Model::new(ui::Options {
        collections_dir,
        page_size: cfg.content.page_size,
        ui: cfg.ui,
        prefs: bridge,
        prefs_path: display_path,
    });
    model.run()
}

pub fn write_feed(options: FeedOptions) -> Result<()> {
    logging::init(logging::Target::Stderr, options.verbose)?;

    let mut cfg = load_config(options.config_file)?;
    if let Some(limit) = options.limit {
        cfg.feed.limit = limit;
    }
    let dir = options.collections_dir.or(cfg.content.collections_dir);
    let collections = collection::load(dir.as_deref())
        .with_context(|| format!("load collections from {}", friendly_path(dir.as_ref())))?;

    let xml = feed::generate(&collections, &cfg.feed, Utc::now());
    match options.output {
        Some(path) => {
            fs::write(&path, xml).with_context(|| format!("write feed to {}", path.display()))?;
            tracing::info!(path = %path.display(), "feed written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(xml.as_bytes()).context("write feed to stdout")?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn friendly_path(path: Option<&PathBuf>) -> String {
    if let Some(path) = path {
        if let Some(home) = dirs::home_dir() {
            if let Ok(stripped) = path.strip_prefix(&home) {
                let mut display = String::from("~");
                if !stripped.as_os_str().is_empty() {
                    display.push_str(&format!("/{}", stripped.display()));
                }
                return display;
            }
        }
        path.display().to_string()
    } else {
        "bundled collections".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn friendly_path_abbreviates_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let path = home.join("links").join("tools.json");
        assert_eq!(friendly_path(Some(&path)), "~/links/tools.json");
        assert_eq!(friendly_path(Some(&home)), "~");
    }

    #[test]
    fn friendly_path_without_path() {
        assert_eq!(friendly_path(None), "bundled collections");
    }
}
