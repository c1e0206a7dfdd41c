use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use crossbeam_channel::unbounded;
use serde::{Deserialize, Deserializer, Serialize};
use walkdir::WalkDir;

const BUNDLED: [(&str, &str); 3] = [
    ("design", include_str!("../collections/design.json")),
    ("reading", include_str!("../collections/reading.json")),
    ("tools", include_str!("../collections/tools.json")),
];

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("collections directory {0} does not exist")]
    MissingDir(PathBuf),
    #[error("read collection {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parse collection {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("walk collections directory: {0}")]
    Walk(#[from] walkdir::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    #[serde(default, deserialize_with = "nullable_string")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub url: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub date: String,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
}

impl Link {
    /// Stable identity for a card: the explicit id when present, else the URL.
    pub fn key(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.url)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Collection {
    pub title: String,
    pub links: Vec<Link>,
    #[serde(skip)]
    pub source: String,
}

#[derive(Deserialize)]
struct RawCollection {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    links: Option<Vec<Link>>,
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<Id>::deserialize(deserializer)?.map(|id| match id {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    }))
}

pub fn parse(source: &str, text: &str) -> Result<Collection, serde_json::Error> {
    if text.trim().is_empty() {
        return Ok(Collection::empty(source));
    }
    let raw: RawCollection = serde_json::from_str(text)?;
    let title = raw
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| source.to_string());
    Ok(Collection {
        title,
        links: raw.links.unwrap_or_default(),
        source: source.to_string(),
    })
}

impl Collection {
    pub fn empty(source: &str) -> Self {
        Self {
            title: source.to_string(),
            links: Vec::new(),
            source: source.to_string(),
        }
    }
}

pub fn load_file(path: &Path) -> Result<Collection, LoadError> {
    let source = file_stem(path);
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&source, &text).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub fn collection_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    if !dir.is_dir() {
        return Err(LoadError::MissingDir(dir.to_path_buf()));
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        let path = entry.path();
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if entry.file_type().is_file() && is_json {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

pub fn load_dir(dir: &Path) -> Result<Vec<Collection>, LoadError> {
    let files = collection_files(dir)?;
    let (tx, rx) = unbounded();

    thread::scope(|scope| {
        for (index, path) in files.iter().enumerate() {
            let tx = tx.clone();
            scope.spawn(move || {
                let collection = match load_file(path) {
                    Ok(collection) => collection,
                    Err(err) => {
                        tracing::warn!(error = %err, "treating collection as empty");
                        Collection::empty(&file_stem(path))
                    }
                };
                let _ = tx.send((index, collection));
            });
        }
    });
    drop(tx);

    let mut loaded: Vec<(usize, Collection)> = rx.iter().collect();
    loaded.sort_by_key(|(index, _)| *index);
    tracing::debug!(dir = %dir.display(), count = loaded.len(), "loaded collections");
    Ok(loaded.into_iter().map(|(_, collection)| collection).collect())
}

pub fn bundled() -> Vec<Collection> {
    BUNDLED
        .iter()
        .map(|(name, text)| {
            parse(name, text).unwrap_or_else(|err| {
                tracing::warn!(collection = name, error = %err, "bundled collection is invalid");
                Collection::empty(name)
            })
        })
        .collect()
}

pub fn load(dir: Option<&Path>) -> Result<Vec<Collection>, LoadError> {
    match dir {
        Some(dir) => load_dir(dir),
        None => Ok(bundled()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn blank_document_is_empty_collection() {
        let collection = parse("misc", "   \n").unwrap();
        assert_eq!(collection.title, "misc");
        assert!(collection.links.is_empty());
    }

    #[test]
    fn missing_fields_default() {
        let text = r#"{"links":[{"url":"https://a.example","description":null,"id":7}]}"#;
        let collection = parse("fallback", text).unwrap();
        assert_eq!(collection.title, "fallback");
        let link = &collection.links[0];
        assert_eq!(link.title, "");
        assert_eq!(link.description, "");
        assert_eq!(link.id.as_deref(), Some("7"));
        assert_eq!(link.key(), "7");
    }

    #[test]
    fn load_dir_orders_by_file_name_and_tolerates_bad_files() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("b.json"),
            r#"{"title":"Second","links":[{"title":"x","url":"https://x.io"}]}"#,
        )
        .unwrap();
        fs::write(dir.path().join("a.json"), r#"{"title":"First","links":[]}"#).unwrap();
        fs::write(dir.path().join("c.json"), "{ not json").unwrap();
        fs::write(dir.path().join("d.json"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let collections = load_dir(dir.path()).unwrap();
        let titles: Vec<&str> = collections.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second", "c", "d"]);
        assert_eq!(collections[1].links.len(), 1);
        assert_eq!(collections[1].source, "b");
        assert!(collections[2].links.is_empty());
    }

    #[test]
    fn missing_dir_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            load(Some(&missing)),
            Err(LoadError::MissingDir(_))
        ));
    }

    #[test]
    fn bundled_collections_decode() {
        let collections = bundled();
        assert_eq!(collections.len(), BUNDLED.len());
        assert!(collections.iter().all(|c| !c.links.is_empty()));
    }
}
