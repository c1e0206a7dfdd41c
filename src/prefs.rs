use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    pub fn next(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::System,
            Theme::System => Theme::Light,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
            Theme::System => "System",
        }
    }

    /// Resolves `System` from the terminal's `COLORFGBG` hint
    /// (`"fg;bg"`, background 7 or 15 means a light terminal).
    pub fn resolve(self, colorfgbg: Option<&str>) -> Appearance {
        match self {
            Theme::Light => Appearance::Light,
            Theme::Dark => Appearance::Dark,
            Theme::System => {
                let background = colorfgbg
                    .and_then(|value| value.rsplit(';').next())
                    .and_then(|bg| bg.trim().parse::<u8>().ok());
                match background {
                    Some(7) | Some(15) => Appearance::Light,
                    _ => Appearance::Dark,
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Appearance {
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    List,
    Grid,
    Compact,
}

impl Layout {
    pub fn next(self) -> Self {
        match self {
            Layout::List => Layout::Grid,
            Layout::Grid => Layout::Compact,
            Layout::Compact => Layout::List,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Layout::List => "List",
            Layout::Grid => "Grid",
            Layout::Compact => "Compact",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default = "default_preview_enabled")]
    pub preview_enabled: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            layout: Layout::default(),
            preview_enabled: default_preview_enabled(),
        }
    }
}

fn default_preview_enabled() -> bool {
    true
}

pub trait PreferenceStore: Send + Sync {
    fn load(&self) -> Result<Option<Preferences>>;
    fn save(&self, prefs: &Preferences) -> Result<()>;
}

pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl PreferenceStore for FileStore {
    fn load(&self) -> Result<Option<Preferences>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("prefs: read {}", self.path.display()))?;
        if data.trim().is_empty() {
            return Ok(None);
        }
        let prefs = serde_yaml::from_str(&data)
            .with_context(|| format!("prefs: parse {}", self.path.display()))?;
        Ok(Some(prefs))
    }

    fn save(&self, prefs: &Preferences) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("prefs: create directory {}", parent.display()))?;
        }
        let contents = serde_yaml::to_string(prefs).context("prefs: serialize")?;
        fs::write(&self.path, contents)
            .with_context(|| format!("prefs: write {}", self.path.display()))
    }
}

#[derive(Default)]
pub struct MemoryStore {
    saved: Mutex<Option<Preferences>>,
}

impl MemoryStore {
    pub fn with(prefs: Preferences) -> Self {
        Self {
            saved: Mutex::new(Some(prefs)),
        }
    }

    pub fn saved(&self) -> Option<Preferences> {
        *self.saved.lock()
    }
}

impl PreferenceStore for MemoryStore {
    fn load(&self) -> Result<Option<Preferences>> {
        Ok(*self.saved.lock())
    }

    fn save(&self, prefs: &Preferences) -> Result<()> {
        *self.saved.lock() = Some(*prefs);
        Ok(())
    }
}

pub struct PreferencesBridge {
    store: Arc<dyn PreferenceStore>,
    current: Preferences,
}

impl PreferencesBridge {
    pub fn open(store: Arc<dyn PreferenceStore>) -> Self {
        let current = match store.load() {
            Ok(Some(prefs)) => prefs,
            Ok(None) => Preferences::default(),
            Err(err) => {
                tracing::warn!(error = ?err, "ignoring unreadable preferences");
                Preferences::default()
            }
        };
        Self { store, current }
    }

    pub fn current(&self) -> Preferences {
        self.current
    }

    pub fn theme(&self) -> Theme {
        self.current.theme
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        self.current.theme = theme;
        self.persist()
    }

    pub fn layout(&self) -> Layout {
        self.current.layout
    }

    pub fn set_layout(&mut self, layout: Layout) -> Result<()> {
        self.current.layout = layout;
        self.persist()
    }

    pub fn preview_enabled(&self) -> bool {
        self.current.preview_enabled
    }

    pub fn set_preview_enabled(&mut self, enabled: bool) -> Result<()> {
        self.current.preview_enabled = enabled;
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        self.store
            .save(&self.current)
            .context("save preferences")
    }
}

pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("linkvault").join("preferences.yaml"))
}
