use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::pipeline::DEFAULT_PAGE_SIZE;
use crate::preview;
use crate::toast;

const DEFAULT_ENV_PREFIX: &str = "LINKVAULT";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub ui: UIConfig,
    #[serde(default)]
    pub feed: FeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentConfig {
    #[serde(default)]
    pub collections_dir: Option<PathBuf>,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            collections_dir: None,
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UIConfig {
    #[serde(default = "default_show_delay", with = "humantime_serde")]
    pub show_delay: Duration,
    #[serde(default = "default_hide_delay", with = "humantime_serde")]
    pub hide_delay: Duration,
    #[serde(default = "default_fade_duration", with = "humantime_serde")]
    pub fade_duration: Duration,
    #[serde(default = "default_toast_duration", with = "humantime_serde")]
    pub toast_duration: Duration,
}

impl Default for UIConfig {
    fn default() -> Self {
        Self {
            show_delay: default_show_delay(),
            hide_delay: default_hide_delay(),
            fade_duration: default_fade_duration(),
            toast_duration: default_toast_duration(),
        }
    }
}

impl UIConfig {
    pub fn preview_delays(&self) -> preview::Delays {
        preview::Delays {
            show: self.show_delay,
            hide: self.hide_delay,
            fade: self.fade_duration,
        }
    }
}

fn default_show_delay() -> Duration {
    preview::SHOW_DELAY
}

fn default_hide_delay() -> Duration {
    preview::HIDE_DELAY
}

fn default_fade_duration() -> Duration {
    preview::FADE_DURATION
}

fn default_toast_duration() -> Duration {
    toast::DEFAULT_DURATION
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedConfig {
    #[serde(default = "default_site_url")]
    pub site_url: String,
    #[serde(default = "default_feed_title")]
    pub title: String,
    #[serde(default = "default_feed_description")]
    pub description: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub author_link: String,
    #[serde(default = "default_feed_limit")]
    pub limit: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            site_url: default_site_url(),
            title: default_feed_title(),
            description: default_feed_description(),
            language: default_language(),
            author_name: String::new(),
            author_link: String::new(),
            limit: default_feed_limit(),
        }
    }
}

fn default_site_url() -> String {
    "https://links.example.org".into()
}

fn default_feed_title() -> String {
    "linkvault".into()
}

fn default_feed_description() -> String {
    "A curated collection of interesting links.".into()
}

fn default_language() -> String {
    "en".into()
}

fn default_feed_limit() -> usize {
    50
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub config_file: Option<PathBuf>,
    pub env_prefix: Option<String>,
}

pub fn load(options: LoadOptions) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(path) = options.config_file.as_ref() {
        let from_file = read_config_file(path)?;
        cfg = merge_config(cfg, from_file);
    } else if let Some(default_path) = default_config_path() {
        if default_path.exists() {
            let from_file = read_config_file(&default_path)?;
            cfg = merge_config(cfg, from_file);
        }
    }

    let prefix = options.env_prefix.as_deref().unwrap_or(DEFAULT_ENV_PREFIX);
    apply_env(&mut cfg, prefix);

    Ok(cfg)
}

fn read_config_file(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&data)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))?;
    Ok(config)
}

fn merge_config(mut base: Config, other: Config) -> Config {
    if other.content.collections_dir.is_some() {
        base.content.collections_dir = other.content.collections_dir;
    }
    if other.content.page_size != 0 {
        base.content.page_size = other.content.page_size;
    }

    base.ui = other.ui;

    if !other.feed.site_url.is_empty() {
        base.feed.site_url = other.feed.site_url;
    }
    if !other.feed.title.is_empty() {
        base.feed.title = other.feed.title;
    }
    if !other.feed.description.is_empty() {
        base.feed.description = other.feed.description;
    }
    if !other.feed.language.is_empty() {
        base.feed.language = other.feed.language;
    }
    if !other.feed.author_name.is_empty() {
        base.feed.author_name = other.feed.author_name;
    }
    if !other.feed.author_link.is_empty() {
        base.feed.author_link = other.feed.author_link;
    }
    if other.feed.limit != 0 {
        base.feed.limit = other.feed.limit;
    }

    base
}

fn apply_env(cfg: &mut Config, prefix: &str) {
    let mut map: HashMap<String, String> = HashMap::new();
    let upper_prefix = format!("{}_", prefix.to_uppercase());

    for (key, value) in env::vars() {
        if let Some(stripped) = key.strip_prefix(&upper_prefix) {
            let normalized = stripped.to_ascii_lowercase().replace("__", ".");
            map.insert(normalized, value);
        }
    }

    for (key, value) in map {
        apply_env_value(cfg, &key, value);
    }
}

fn apply_env_value(cfg: &mut Config, key: &str, value: String) {
    match key {
        "content.collections_dir" => cfg.content.collections_dir = Some(PathBuf::from(value)),
        "content.page_size" => {
            if let Ok(parsed) = value.parse::<usize>() {
                if parsed > 0 {
                    cfg.content.page_size = parsed;
                }
            }
        }
        "ui.show_delay" => {
            if let Ok(duration) = humantime::parse_duration(&value) {
                cfg.ui.show_delay = duration;
            }
        }
        "ui.hide_delay" => {
            if let Ok(duration) = humantime::parse_duration(&value) {
                cfg.ui.hide_delay = duration;
            }
        }
        "ui.fade_duration" => {
            if let Ok(duration) = humantime::parse_duration(&value) {
                cfg.ui.fade_duration = duration;
            }
        }
        "ui.toast_duration" => {
            if let Ok(duration) = humantime::parse_duration(&value) {
                cfg.ui.toast_duration = duration;
            }
        }
        "feed.site_url" => cfg.feed.site_url = value,
        "feed.title" => cfg.feed.title = value,
        "feed.description" => cfg.feed.description = value,
        "feed.language" => cfg.feed.language = value,
        "feed.author_name" => cfg.feed.author_name = value,
        "feed.author_link" => cfg.feed.author_link = value,
        "feed.limit" => {
            if let Ok(parsed) = value.parse::<usize>() {
                cfg.feed.limit = parsed;
            }
        }
        _ => {}
    }
}

pub fn default_path() -> Option<PathBuf> {
    default_config_path()
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("linkvault").join("config.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn empty_config(dir: &Path) -> PathBuf {
        let path = dir.join("config.yaml");
        fs::write(&path, "{}\n").unwrap();
        path
    }

    #[test]
    fn load_defaults_from_empty_file() {
        let dir = tempdir().unwrap();
        let cfg = load(LoadOptions {
            config_file: Some(empty_config(dir.path())),
            env_prefix: Some("LINKVAULT_TEST_NONE".into()),
        })
        .unwrap();
        assert_eq!(cfg.content.page_size, 12);
        assert_eq!(cfg.ui.show_delay, Duration::from_millis(400));
        assert_eq!(cfg.feed.limit, 50);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "content:\n  page_size: 6\n  collections_dir: /srv/links\nui:\n  show_delay: 1s\nfeed:\n  title: My links\n",
        )
        .unwrap();
        let cfg = load(LoadOptions {
            config_file: Some(path),
            env_prefix: Some("LINKVAULT_TEST_NONE".into()),
        })
        .unwrap();
        assert_eq!(cfg.content.page_size, 6);
        assert_eq!(cfg.content.collections_dir, Some(PathBuf::from("/srv/links")));
        assert_eq!(cfg.ui.show_delay, Duration::from_secs(1));
        assert_eq!(cfg.ui.hide_delay, Duration::from_millis(150));
        assert_eq!(cfg.feed.title, "My links");
        assert_eq!(cfg.feed.language, "en");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = load(LoadOptions {
            config_file: Some(PathBuf::from("/nonexistent/linkvault.yaml")),
            env_prefix: Some("LINKVAULT_TEST_NONE".into()),
        })
        .unwrap_err();
        assert!(err.to_string().contains("Failed to read config file at"));
    }

    #[test]
    fn env_overrides() {
        env::set_var("LINKVAULT_ENVTEST_CONTENT__PAGE_SIZE", "5");
        env::set_var("LINKVAULT_ENVTEST_UI__HIDE_DELAY", "250ms");
        let dir = tempdir().unwrap();
        let cfg = load(LoadOptions {
            config_file: Some(empty_config(dir.path())),
            env_prefix: Some("LINKVAULT_ENVTEST".into()),
        })
        .unwrap();
        assert_eq!(cfg.content.page_size, 5);
        assert_eq!(cfg.ui.hide_delay, Duration::from_millis(250));
        env::remove_var("LINKVAULT_ENVTEST_CONTENT__PAGE_SIZE");
        env::remove_var("LINKVAULT_ENVTEST_UI__HIDE_DELAY");
    }
}
