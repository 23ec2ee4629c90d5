//! Explicit configuration for the resolver, the remote client and deck
//! validation.
//!
//! The library never reads environment variables; callers (the CLI, a crawl
//! orchestrator) fill these in and pass them down.

use std::time::Duration;

/// Resolver behavior.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Whether lookups that miss locally may query the remote service.
    pub allow_remote: bool,
    pub remote: RemoteConfig,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            allow_remote: true,
            remote: RemoteConfig::default(),
        }
    }
}

impl ResolverConfig {
    pub fn offline() -> Self {
        Self {
            allow_remote: false,
            ..Self::default()
        }
    }
}

/// Remote card-service client settings.
///
/// `timeout` bounds one card query, not a page fetch.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub api_base: String,
    pub user_agent: String,
    pub timeout: Duration,
    /// Fixed pause between two consecutive calls.
    pub min_delay: Duration,
    /// Upper bound of the random extra pause added to `min_delay`.
    pub max_jitter: Duration,
    /// Timeout for bulk-data downloads.
    pub bulk_timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.scryfall.com".to_string(),
            user_agent: concat!("mtgdecks/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(10),
            min_delay: Duration::from_millis(100),
            max_jitter: Duration::from_millis(150),
            bulk_timeout: Duration::from_secs(600),
        }
    }
}

/// Largest copy count a single decklist entry may carry.
pub const MAX_ENTRY_QUANTITY: usize = 250;

/// Formats whose decks are 100 cards counting the command zone.
pub const HUNDRED_CARD_FORMATS: [&str; 7] = [
    "commander",
    "duel",
    "edh",
    "historicbrawl",
    "gladiator",
    "paupercommander",
    "predh",
];

/// Structural limits enforced by [`crate::deck::Deck::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckRules {
    /// Maindeck plus commander slots, any format not listed below.
    pub min_size: usize,
    /// Maindeck plus commander slots for the 100-card formats.
    pub min_size_hundred_card: usize,
    pub max_sideboard: usize,
    pub default_copies: u32,
    /// Copies allowed per card once a commander is present.
    pub singleton_copies: u32,
}

impl Default for DeckRules {
    fn default() -> Self {
        Self {
            min_size: 60,
            min_size_hundred_card: 100,
            max_sideboard: 15,
            default_copies: 4,
            singleton_copies: 1,
        }
    }
}

impl DeckRules {
    /// Minimum count of maindeck plus commander cards for `format`.
    pub fn min_size_for(&self, format: Option<&str>) -> usize {
        let is_hundred_card = format.is_some_and(|f| {
            let f = f.to_ascii_lowercase().replace([' ', '_', '-'], "");
            HUNDRED_CARD_FORMATS.contains(&f.as_str())
        });
        if is_hundred_card {
            self.min_size_hundred_card
        } else {
            self.min_size
        }
    }
}
