use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::language::{self, Language, PreferenceStore};
use crate::piece::Piece;

/// Why a catalog fetch failed. Kept as data on the [`Catalog`] rather than
/// thrown, so previously loaded pieces stay usable.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Failed to fetch music data for {language}")]
    Http { language: Language, status: u16 },
    #[error("{message}")]
    Transport { message: String },
    #[error("failed to read music data at {path}: {message}")]
    Read { path: String, message: String },
    #[error("failed to parse music data: {message}")]
    Parse { message: String },
    #[error("no music data published for {language}")]
    MissingLanguage { language: Language },
}

/// Something that can produce the full piece collection for a language.
pub trait CatalogSource {
    fn fetch(&self, language: Language) -> Result<Vec<Piece>, CatalogError>;
}

/// File name of the catalog for `language`, shared by disk and HTTP sources.
pub fn catalog_file_name(language: Language) -> String {
    format!("music.{}.json", language.code())
}

/// Reads `music.{code}.json` files from a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl CatalogSource for DirectorySource {
    fn fetch(&self, language: Language) -> Result<Vec<Piece>, CatalogError> {
        let path = self.root.join(catalog_file_name(language));

        let data = fs::read(&path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            message: source.to_string(),
        })?;

        serde_json::from_slice(&data).map_err(|source| CatalogError::Parse {
            message: source.to_string(),
        })
    }
}

/// In-memory catalogs keyed by language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticSource {
    pieces: HashMap<Language, Vec<Piece>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_language(mut self, language: Language, pieces: Vec<Piece>) -> Self {
        self.pieces.insert(language, pieces);
        self
    }
}

impl CatalogSource for StaticSource {
    fn fetch(&self, language: Language) -> Result<Vec<Piece>, CatalogError> {
        self.pieces
            .get(&language)
            .cloned()
            .ok_or(CatalogError::MissingLanguage { language })
    }
}

/// Handed out by [`Catalog::begin_fetch`] and returned with the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub language: Language,
    generation: u64,
}

/// The pieces loaded for the active language.
///
/// The collection is only ever replaced whole: a failed fetch records an
/// error and leaves the previous pieces in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    language: Language,
    pieces: Vec<Piece>,
    loading: bool,
    error: Option<CatalogError>,
    generation: u64,
}

impl Catalog {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            pieces: Vec::new(),
            loading: false,
            error: None,
            generation: 0,
        }
    }

    pub fn with_pieces(language: Language, pieces: Vec<Piece>) -> Self {
        Self {
            pieces,
            ..Self::new(language)
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&CatalogError> {
        self.error.as_ref()
    }

    /// Whether a `load` with this `force` flag would hit the source.
    pub fn needs_fetch(&self, force: bool) -> bool {
        force || self.pieces.is_empty()
    }

    /// Marks a fetch as in flight for the current language.
    ///
    /// Only the most recent ticket settles the loading flag.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        FetchTicket {
            language: self.language,
            generation: self.generation,
        }
    }

    /// Applies the outcome of a fetch started with [`Catalog::begin_fetch`].
    ///
    /// Results superseded by a newer fetch, or for a language that is no
    /// longer current, are dropped.
    pub fn finish_fetch(&mut self, ticket: FetchTicket, result: Result<Vec<Piece>, CatalogError>) {
        if ticket.generation != self.generation {
            debug!("discarding superseded {} catalog result", ticket.language);
            return;
        }

        self.loading = false;

        let language = ticket.language;
        if language != self.language {
            debug!(
                "discarding {} catalog result, current language is {}",
                language, self.language
            );
            return;
        }

        match result {
            Ok(pieces) => {
                info!("loaded {} pieces for {}", pieces.len(), language);
                self.pieces = pieces;
                self.error = None;
            }
            Err(error) => {
                warn!("catalog fetch for {} failed: {}", language, error);
                self.error = Some(error);
            }
        }
    }

    /// Fetches the current language's pieces unless already loaded.
    ///
    /// Returns whether the source was queried.
    pub fn load<S: CatalogSource + ?Sized>(&mut self, source: &S, force: bool) -> bool {
        if !self.needs_fetch(force) {
            return false;
        }

        let ticket = self.begin_fetch();
        let result = source.fetch(ticket.language);
        self.finish_fetch(ticket, result);

        true
    }

    /// Switches language and reloads the catalog.
    ///
    /// Returns `true` when the language actually changed; any quiz built on
    /// the old pieces should be reset by the caller.
    pub fn switch_language(&mut self, language: Language) -> bool {
        if self.language == language {
            return false;
        }

        info!("switching catalog language {} -> {}", self.language, language);
        self.language = language;
        true
    }

    /// Persists the choice, switches language and force-reloads from `source`.
    pub fn set_language<P, S>(&mut self, language: Language, prefs: &mut P, source: &S) -> bool
    where
        P: PreferenceStore + ?Sized,
        S: CatalogSource + ?Sized,
    {
        if !self.switch_language(language) {
            return false;
        }

        if let Err(error) = language::save_language(prefs, language) {
            warn!("could not persist language preference: {}", error);
        }

        self.load(source, true);
        true
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Piece> {
        self.pieces.iter().find(|piece| piece.id == id)
    }

    /// Up to `count` distinct pieces in uniformly random order, optionally
    /// leaving out `exclude_id`.
    pub fn sample_random<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        count: usize,
        exclude_id: Option<&str>,
    ) -> Vec<Piece> {
        let mut pool: Vec<&Piece> = self
            .pieces
            .iter()
            .filter(|piece| exclude_id != Some(piece.id.as_str()))
            .collect();

        pool.shuffle(rng);
        pool.truncate(count);
        pool.into_iter().cloned().collect()
    }
}
