//! The contract site adapters implement, and URL dispatch.
//!
//! Fetching pages is the caller's job; an adapter turns one fetched body into
//! a [`Deck`]. Text adapters go through [`crate::decklist::parse_strict`],
//! structured ones resolve their cards and call [`Deck::build`] through
//! [`CardGroups::into_deck`].

use std::collections::HashSet;
use std::fmt;

use parking_lot::Mutex;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::MAX_ENTRY_QUANTITY;
use crate::deck::{Deck, DeckMetadata};
use crate::decklist::{CardGroups, parse_strict};
use crate::error::{ParsingError, Result};
use crate::ids::{ArenaId, CardId, MtgoId, OracleId, TcgplayerId};
use crate::resolver::{CardQuery, Resolver, get_playset, is_foreign};

/// One site adapter.
pub trait DeckScraper: Send {
    /// Label stored as `metadata.source`.
    fn source(&self) -> &'static str;

    fn scrape(&self, resolver: &Resolver, url: &str, body: &str) -> Result<Deck>;
}

/// A registration: URL predicate plus constructor.
#[derive(Clone, Copy)]
pub struct ScraperEntry {
    pub name: &'static str,
    pub matches: fn(&str) -> bool,
    pub create: fn() -> Box<dyn DeckScraper>,
}

impl fmt::Debug for ScraperEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScraperEntry").field("name", &self.name).finish()
    }
}

/// Registered adapters, tried in registration order.
#[derive(Debug, Default)]
pub struct ScraperRegistry {
    entries: Vec<ScraperEntry>,
}

impl ScraperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the plain-text and JSON adapters.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ScraperEntry {
            name: ArenaTextScraper::NAME,
            matches: ArenaTextScraper::matches,
            create: || Box::new(ArenaTextScraper),
        });
        registry.register(ScraperEntry {
            name: JsonDeckScraper::NAME,
            matches: JsonDeckScraper::matches,
            create: || Box::new(JsonDeckScraper),
        });
        registry
    }

    pub fn register(&mut self, entry: ScraperEntry) {
        self.entries.push(entry);
    }

    pub fn lookup(&self, url: &str) -> Option<&ScraperEntry> {
        self.entries.iter().find(|entry| (entry.matches)(url))
    }

    pub fn create_for(&self, url: &str) -> Option<Box<dyn DeckScraper>> {
        self.lookup(url).map(|entry| (entry.create)())
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.name)
    }

    /// Scrapes `body` with the adapter registered for `url`.
    ///
    /// Returns `Ok(None)` for URLs already in `seen` and for URLs no adapter
    /// claims. A successfully built deck marks its URL as seen.
    pub fn scrape(
        &self,
        resolver: &Resolver,
        seen: &dyn SeenUrls,
        url: &str,
        body: &str,
    ) -> Result<Option<Deck>> {
        if seen.contains(url) {
            debug!(url, "already scraped");
            return Ok(None);
        }
        let Some(scraper) = self.create_for(url) else {
            debug!(url, "no adapter for url");
            return Ok(None);
        };
        let deck = scraper.scrape(resolver, url, body)?;
        seen.insert(url);
        info!(url, source = scraper.source(), cards = deck.len(), "deck scraped");
        Ok(Some(deck))
    }
}

/// Deduplication of decklist URLs across a crawl.
pub trait SeenUrls: Send + Sync {
    fn contains(&self, url: &str) -> bool;

    /// Records `url`; `false` if it was already present.
    fn insert(&self, url: &str) -> bool;
}

/// Process-local [`SeenUrls`].
#[derive(Debug, Default)]
pub struct InMemorySeenUrls {
    urls: Mutex<HashSet<String>>,
}

impl InMemorySeenUrls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.urls.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.lock().is_empty()
    }
}

/// Fragment and trailing slash dropped, so trivially different links to one
/// page compare equal.
pub fn canonical_url(url: &str) -> String {
    let url = url.trim();
    let url = url.split_once('#').map_or(url, |(base, _)| base);
    url.trim_end_matches('/').to_string()
}

impl SeenUrls for InMemorySeenUrls {
    fn contains(&self, url: &str) -> bool {
        self.urls.lock().contains(&canonical_url(url))
    }

    fn insert(&self, url: &str) -> bool {
        self.urls.lock().insert(canonical_url(url))
    }
}

/// Pages that serve a decklist in Arena export format.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArenaTextScraper;

impl ArenaTextScraper {
    pub const NAME: &'static str = "arena-text";

    pub fn matches(url: &str) -> bool {
        let path = canonical_url(url);
        let path = path.split_once('?').map_or(path.as_str(), |(base, _)| base);
        path.ends_with(".txt") || path.ends_with("/arena")
    }
}

impl DeckScraper for ArenaTextScraper {
    fn source(&self) -> &'static str {
        Self::NAME
    }

    fn scrape(&self, resolver: &Resolver, url: &str, body: &str) -> Result<Deck> {
        parse_strict(resolver, body.lines(), DeckMetadata::from_source(Self::NAME, url))
    }
}

fn one() -> usize {
    1
}

/// One card of a structured decklist. Any identifier may be given.
#[derive(Debug, Clone, Deserialize)]
struct JsonCardEntry {
    #[serde(default)]
    name: Option<String>,
    #[serde(default = "one", alias = "qty", alias = "count")]
    quantity: usize,
    #[serde(default)]
    set: Option<String>,
    #[serde(default, alias = "collector_number")]
    number: Option<String>,
    #[serde(default, alias = "id")]
    scryfall_id: Option<CardId>,
    #[serde(default)]
    oracle_id: Option<OracleId>,
    #[serde(default)]
    arena_id: Option<ArenaId>,
    #[serde(default)]
    mtgo_id: Option<MtgoId>,
    #[serde(default)]
    tcgplayer_id: Option<TcgplayerId>,
}

impl JsonCardEntry {
    fn query(&self) -> CardQuery {
        CardQuery {
            name: self.name.clone(),
            set: self.set.clone(),
            number: self.number.clone(),
            arena_id: self.arena_id,
            mtgo_id: self.mtgo_id,
            tcgplayer_id: self.tcgplayer_id,
            id: self.scryfall_id,
            oracle_id: self.oracle_id,
            foreign: self.name.as_deref().is_some_and(is_foreign),
        }
    }
}

#[derive(Debug, Deserialize)]
struct JsonDecklist {
    #[serde(default)]
    commanders: Vec<JsonCardEntry>,
    #[serde(default)]
    companions: Vec<JsonCardEntry>,
    #[serde(default, alias = "maindeck", alias = "main")]
    mainboard: Vec<JsonCardEntry>,
    #[serde(default)]
    sideboard: Vec<JsonCardEntry>,
    #[serde(flatten)]
    metadata: DeckMetadata,
}

/// Generic structured decklist: card arrays per section plus metadata keys
/// at the top level.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDeckScraper;

impl JsonDeckScraper {
    pub const NAME: &'static str = "json";

    pub fn matches(url: &str) -> bool {
        let path = canonical_url(url);
        let path = path.split_once('?').map_or(path.as_str(), |(base, _)| base);
        path.ends_with(".json")
    }

    fn resolve_all(resolver: &Resolver, entries: &[JsonCardEntry]) -> Result<Vec<std::sync::Arc<crate::card::Card>>> {
        let mut cards = Vec::new();
        for entry in entries {
            if !(1..=MAX_ENTRY_QUANTITY).contains(&entry.quantity) {
                return Err(ParsingError::Input(format!(
                    "{}: quantity {} out of range",
                    entry.query().describe(),
                    entry.quantity
                ))
                .into());
            }
            let card = resolver.find_card(&entry.query())?;
            cards.extend(get_playset(&card, entry.quantity));
        }
        Ok(cards)
    }
}

impl DeckScraper for JsonDeckScraper {
    fn source(&self) -> &'static str {
        Self::NAME
    }

    fn scrape(&self, resolver: &Resolver, url: &str, body: &str) -> Result<Deck> {
        let decklist: JsonDecklist = serde_json::from_str(body).map_err(ParsingError::from)?;
        if decklist.mainboard.is_empty() && decklist.commanders.is_empty() {
            return Err(ParsingError::Input(format!("{url}: decklist has no cards")).into());
        }

        let mut metadata = decklist.metadata;
        metadata.source.get_or_insert_with(|| Self::NAME.to_string());
        metadata.url.get_or_insert_with(|| url.to_string());

        let groups = CardGroups {
            maindeck: Self::resolve_all(resolver, &decklist.mainboard)?,
            sideboard: Self::resolve_all(resolver, &decklist.sideboard)?,
            commanders: Self::resolve_all(resolver, &decklist.commanders)?,
            companions: Self::resolve_all(resolver, &decklist.companions)?,
        };
        groups.into_deck(metadata)
    }
}
