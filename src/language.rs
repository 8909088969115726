use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Preference key under which the catalog language is persisted.
pub const LANGUAGE_KEY: &str = "language";

/// Catalog languages with a published music data file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Ja,
    En,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Ja, Language::En];

    pub fn code(self) -> &'static str {
        match self {
            Language::Ja => "ja",
            Language::En => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unsupported language code: {0}")]
pub struct ParseLanguageError(pub String);

impl FromStr for Language {
    type Err = ParseLanguageError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ja" => Ok(Language::Ja),
            "en" => Ok(Language::En),
            other => Err(ParseLanguageError(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PreferenceError {
    #[error("failed to read preferences at {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to write preferences at {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse preferences at {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("preference storage unavailable: {0}")]
    Unavailable(String),
}

/// String key-value storage that outlives a quiz session.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

/// Saved language, or Japanese when nothing valid was stored.
pub fn load_language<S: PreferenceStore + ?Sized>(store: &S) -> Language {
    store
        .get(LANGUAGE_KEY)
        .and_then(|value| value.parse().ok())
        .unwrap_or_default()
}

pub fn save_language<S: PreferenceStore + ?Sized>(
    store: &mut S,
    language: Language,
) -> Result<(), PreferenceError> {
    store.set(LANGUAGE_KEY, language.code())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryPreferences {
    values: BTreeMap<String, String>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences kept as a single JSON object on disk, rewritten on every `set`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePreferences {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FilePreferences {
    /// Opens the preference file, starting empty when it does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PreferenceError> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            return Ok(Self {
                path,
                values: BTreeMap::new(),
            });
        }

        let data = fs::read(&path).map_err(|source| PreferenceError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let values = serde_json::from_slice(&data).map_err(|source| PreferenceError::Parse {
            path: path.display().to_string(),
            source,
        })?;

        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values.insert(key.to_string(), value.to_string());

        let serialized = serde_json::to_vec_pretty(&self.values).map_err(|source| {
            PreferenceError::Parse {
                path: self.path.display().to_string(),
                source,
            }
        })?;

        fs::write(&self.path, serialized).map_err(|source| PreferenceError::Write {
            path: self.path.display().to_string(),
            source,
        })
    }
}
