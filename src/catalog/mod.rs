//! Immutable in-memory snapshot of every printing and every set.
//!
//! The catalog is loaded once per process and shared behind `Arc`; cards are
//! handed out as `Arc<Card>` so decks and indices never copy them.

pub mod scryfall;

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use time::Date;
use tracing::{debug, info};

use crate::card::{Card, SetType};
use crate::error::CatalogError;
use crate::ids::CardId;
use scryfall::{RawCard, RawSetList};

/// One set of the catalog, keyed by its lowercase code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetInfo {
    pub code: String,
    pub name: String,
    pub released_at: Option<Date>,
    pub set_type: SetType,
    pub digital: bool,
}

impl SetInfo {
    pub fn is_expansion_or_core(&self) -> bool {
        self.set_type.is_expansion_or_core()
    }
}

/// Where the bulk card data and the set list are cached on disk.
#[derive(Debug, Clone)]
pub struct CatalogPaths {
    pub cards: PathBuf,
    pub sets: PathBuf,
}

impl CatalogPaths {
    /// `default_cards.json` and `sets.json` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            cards: dir.join("default_cards.json"),
            sets: dir.join("sets.json"),
        }
    }
}

#[derive(Debug, Default)]
pub struct CardCatalog {
    cards: Vec<Arc<Card>>,
    by_id: HashMap<CardId, usize>,
    sets: HashMap<String, SetInfo>,
}

impl CardCatalog {
    /// Builds a catalog from already-decoded values. A repeated ID keeps the
    /// first printing seen.
    pub fn new(
        cards: impl IntoIterator<Item = Card>,
        sets: impl IntoIterator<Item = SetInfo>,
    ) -> Self {
        let mut catalog = Self::default();
        for card in cards {
            if catalog.by_id.contains_key(&card.id) {
                debug!(id = %card.id, name = %card.name, "duplicate catalog id ignored");
                continue;
            }
            catalog.by_id.insert(card.id, catalog.cards.len());
            catalog.cards.push(Arc::new(card));
        }
        catalog.sets = sets
            .into_iter()
            .map(|set| (set.code.clone(), set))
            .collect();
        catalog
    }

    pub fn from_json_str(cards_json: &str, sets_json: Option<&str>) -> Result<Self, CatalogError> {
        let raw_cards: Vec<RawCard> =
            serde_json::from_str(cards_json).map_err(|source| CatalogError::Json {
                what: "card data".to_string(),
                source,
            })?;
        let raw_sets = match sets_json {
            Some(json) => serde_json::from_str::<RawSetList>(json)
                .map_err(|source| CatalogError::Json {
                    what: "set list".to_string(),
                    source,
                })?
                .into_sets(),
            None => Vec::new(),
        };
        Ok(Self::new(
            raw_cards.into_iter().map(Card::from),
            raw_sets.into_iter().map(SetInfo::from),
        ))
    }

    /// Reads the bulk card file and, if present, the set list.
    pub fn from_files(cards_path: &Path, sets_path: Option<&Path>) -> Result<Self, CatalogError> {
        let raw_cards: Vec<RawCard> = read_json(cards_path)?;
        let raw_sets = match sets_path {
            Some(path) if path.exists() => read_json::<RawSetList>(path)?.into_sets(),
            _ => Vec::new(),
        };

        let catalog = Self::new(
            raw_cards.into_iter().map(Card::from),
            raw_sets.into_iter().map(SetInfo::from),
        );
        info!(
            cards = catalog.len(),
            sets = catalog.sets.len(),
            path = %cards_path.display(),
            "card catalog loaded"
        );
        Ok(catalog)
    }

    /// Loads the cached snapshot, downloading whichever file is missing first.
    #[cfg(feature = "remote")]
    pub fn load_or_fetch(
        paths: &CatalogPaths,
        client: &crate::resolver::ScryfallClient,
    ) -> Result<Self, CatalogError> {
        if !paths.cards.exists() {
            client.download_bulk("default_cards", &paths.cards)?;
        }
        if !paths.sets.exists() {
            client.download_sets(&paths.sets)?;
        }
        Self::from_files(&paths.cards, Some(&paths.sets))
    }

    pub fn get(&self, id: CardId) -> Option<&Arc<Card>> {
        self.by_id.get(&id).map(|&idx| &self.cards[idx])
    }

    pub fn set(&self, code: &str) -> Option<&SetInfo> {
        self.sets.get(&code.to_ascii_lowercase())
    }

    pub fn cards(&self) -> impl Iterator<Item = &Arc<Card>> {
        self.cards.iter()
    }

    pub fn sets(&self) -> impl Iterator<Item = &SetInfo> {
        self.sets.values()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
    let file = File::open(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| CatalogError::Json {
        what: path.display().to_string(),
        source,
    })
}
