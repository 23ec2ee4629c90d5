//! mtgdecks - Magic: The Gathering decklist ingestion
//!
//! Turns decklists scraped from the web into validated [`Deck`] values:
//! card references are resolved against a local [`CardCatalog`] (with an
//! optional remote fallback), Arena-style text is run through a section
//! state machine, and the assembled deck is checked against the
//! construction rules before derived attributes are exposed.

pub mod adapter;
pub mod card;
pub mod catalog;
pub mod color;
pub mod config;
pub mod deck;
pub mod decklist;
pub mod error;
pub mod export;
pub mod ids;
pub mod mana;
pub mod resolver;
pub mod types;

#[cfg(test)]
mod tests;

pub use adapter::{
    ArenaTextScraper, DeckScraper, InMemorySeenUrls, JsonDeckScraper, ScraperEntry,
    ScraperRegistry, SeenUrls,
};
pub use card::{Card, CardBuilder, CardFace, CopyLimit, Legality, Prices, Rarity, SetType};
pub use catalog::{CardCatalog, CatalogPaths, SetInfo};
pub use color::{Color, ColorSet};
pub use config::{DeckRules, MAX_ENTRY_QUANTITY, RemoteConfig, ResolverConfig};
pub use deck::{Archetype, Deck, DeckMetadata, EventInfo};
pub use decklist::{CardGroups, Section, parse, parse_strict};
pub use error::{
    CardNotFound, CatalogError, DeckViolation, DecklistError, Error, InvalidDeck, ParsingError,
    Result,
};
pub use export::{to_arena, to_forge, to_json};
pub use ids::{ArenaId, CardId, MtgoId, OracleId, TcgplayerId};
pub use mana::ManaCost;
#[cfg(feature = "remote")]
pub use resolver::ScryfallClient;
pub use resolver::{CardQuery, CardReference, RemoteCardSource, Resolver, get_playset};
pub use types::TypeLine;
