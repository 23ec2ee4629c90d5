//! Error taxonomy shared by the resolver, the decklist parser and the deck
//! assembler.
//!
//! Every failure is scoped to one card reference or one decklist; callers
//! decide whether to skip, retry or abort a batch.

use thiserror::Error;

use crate::card::CopyLimit;
use crate::decklist::Section;

/// A card reference matched neither the local catalog nor the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("card not found: {query}")]
pub struct CardNotFound {
    pub query: String,
}

impl CardNotFound {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

/// Problems with decklist text itself, as opposed to the deck it describes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecklistError {
    #[error("no recognizable decklist lines in input")]
    Empty,

    #[error("line {line}: section {to:?} entered again from {from:?}")]
    InvalidTransition {
        line: usize,
        from: Section,
        to: Section,
    },

    #[error("line {line}: quantity out of range in {text:?}")]
    BadQuantity { line: usize, text: String },
}

#[derive(Debug, Error)]
pub enum ParsingError {
    #[error(transparent)]
    Decklist(#[from] DecklistError),

    #[error("malformed JSON decklist: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected input: {0}")]
    Input(String),
}

/// The specific deck invariant a build violated, with the numbers involved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeckViolation {
    #[error("partner commander {partner} given without a commander")]
    PartnerWithoutCommander { partner: String },

    #[error("neither {commander} nor {partner} can have a partner")]
    IneligiblePartner { commander: String, partner: String },

    #[error("{count} commanders given, at most 2 allowed")]
    TooManyCommanders { count: usize },

    #[error("{count} companions given, at most 1 allowed")]
    TooManyCompanions { count: usize },

    #[error("{name} is not a companion")]
    IneligibleCompanion { name: String },

    #[error("redundant commander {name}: {extra} more cop(ies) left in the 99 or sideboard")]
    RedundantCommander { name: String, extra: usize },

    #[error("{name}: {count} > {allowed}")]
    PlaysetLimit {
        name: String,
        count: u32,
        allowed: CopyLimit,
    },

    #[error("maindeck too small: {actual} < {min}")]
    TooFewCards { actual: usize, min: usize },

    #[error("sideboard too large: {actual} > {max}")]
    SideboardTooLarge { actual: usize, max: usize },
}

/// A well-formed decklist describing an illegal deck.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid deck: {0}")]
pub struct InvalidDeck(pub DeckViolation);

impl From<DeckViolation> for InvalidDeck {
    fn from(violation: DeckViolation) -> Self {
        InvalidDeck(violation)
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("decoding {what}: {source}")]
    Json {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("fetching {url}: {reason}")]
    Fetch { url: String, reason: String },
}

/// Crate-level error, one variant per concern.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    CardNotFound(#[from] CardNotFound),

    #[error(transparent)]
    Parsing(#[from] ParsingError),

    #[error(transparent)]
    InvalidDeck(#[from] InvalidDeck),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl From<DecklistError> for Error {
    fn from(err: DecklistError) -> Self {
        Error::Parsing(ParsingError::Decklist(err))
    }
}

impl From<DeckViolation> for Error {
    fn from(violation: DeckViolation) -> Self {
        Error::InvalidDeck(InvalidDeck(violation))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
