//! Card identity resolution.
//!
//! Every way a decklist source can name a card (printing, provider ID,
//! catalog ID, oracle ID, English or foreign name) goes through
//! [`Resolver::resolve`]. Local indices are built on first use; the remote
//! service is consulted only for names the catalog does not know.

mod index;
pub mod remote;
pub mod sanitize;

use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::card::Card;
use crate::catalog::CardCatalog;
use crate::config::ResolverConfig;
use crate::error::CardNotFound;
use crate::ids::{ArenaId, CardId, MtgoId, OracleId, TcgplayerId};
use index::CardIndex;
pub use remote::RemoteCardSource;
#[cfg(feature = "remote")]
pub use remote::ScryfallClient;
pub use sanitize::{fold_name, is_foreign, sanitize_name};

/// One way of naming a card. Each resolution attempt follows exactly one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardReference {
    SetNumber { set: String, number: String },
    Arena(ArenaId),
    Mtgo(MtgoId),
    Tcgplayer(TcgplayerId),
    Id(CardId),
    Oracle(OracleId),
    Name { name: String, foreign: bool },
}

impl fmt::Display for CardReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardReference::SetNumber { set, number } => {
                write!(f, "({}) {number}", set.to_ascii_uppercase())
            }
            CardReference::Arena(id) => write!(f, "arena id {}", id.0),
            CardReference::Mtgo(id) => write!(f, "mtgo id {}", id.0),
            CardReference::Tcgplayer(id) => write!(f, "tcgplayer id {}", id.0),
            CardReference::Id(id) => write!(f, "id {id}"),
            CardReference::Oracle(id) => write!(f, "oracle id {id}"),
            CardReference::Name { name, .. } => f.write_str(name),
        }
    }
}

/// Everything a caller may know about a card. Fields are tried in a fixed
/// priority order, see [`CardQuery::references`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardQuery {
    pub name: Option<String>,
    pub set: Option<String>,
    pub number: Option<String>,
    pub arena_id: Option<ArenaId>,
    pub mtgo_id: Option<MtgoId>,
    pub tcgplayer_id: Option<TcgplayerId>,
    pub id: Option<CardId>,
    pub oracle_id: Option<OracleId>,
    /// The name may be a non-English printed name.
    pub foreign: bool,
}

impl CardQuery {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_printing(mut self, set: impl Into<String>, number: impl Into<String>) -> Self {
        self.set = Some(set.into());
        self.number = Some(number.into());
        self
    }

    pub fn foreign(mut self, foreign: bool) -> Self {
        self.foreign = foreign;
        self
    }

    pub fn references(&self) -> Vec<CardReference> {
        let mut refs = Vec::new();
        if let (Some(set), Some(number)) = (&self.set, &self.number) {
            refs.push(CardReference::SetNumber {
                set: set.clone(),
                number: number.clone(),
            });
        }
        refs.extend(self.arena_id.map(CardReference::Arena));
        refs.extend(self.mtgo_id.map(CardReference::Mtgo));
        refs.extend(self.tcgplayer_id.map(CardReference::Tcgplayer));
        refs.extend(self.id.map(CardReference::Id));
        refs.extend(self.oracle_id.map(CardReference::Oracle));
        if let Some(name) = &self.name {
            refs.push(CardReference::Name {
                name: name.clone(),
                foreign: self.foreign,
            });
        }
        refs
    }

    pub(crate) fn describe(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.references().first().map(ToString::to_string))
            .unwrap_or_else(|| "<empty query>".to_string())
    }
}

pub struct Resolver {
    catalog: Arc<CardCatalog>,
    index: OnceLock<CardIndex>,
    remote: Option<Box<dyn RemoteCardSource>>,
    config: ResolverConfig,
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("cards", &self.catalog.len())
            .field("indexed", &self.index.get().is_some())
            .field("remote", &self.remote.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl Resolver {
    /// Local-only resolver.
    pub fn new(catalog: Arc<CardCatalog>) -> Self {
        Self {
            catalog,
            index: OnceLock::new(),
            remote: None,
            config: ResolverConfig::offline(),
        }
    }

    /// Resolver with the production remote client when `config` allows it.
    #[cfg(feature = "remote")]
    pub fn with_config(
        catalog: Arc<CardCatalog>,
        config: ResolverConfig,
    ) -> Result<Self, crate::error::CatalogError> {
        let remote = if config.allow_remote {
            let client = ScryfallClient::new(config.remote.clone())?;
            Some(Box::new(client) as Box<dyn RemoteCardSource>)
        } else {
            None
        };
        Ok(Self {
            catalog,
            index: OnceLock::new(),
            remote,
            config,
        })
    }

    /// Installs `remote` as the fallback and enables remote lookups.
    pub fn with_remote(mut self, remote: Box<dyn RemoteCardSource>) -> Self {
        self.remote = Some(remote);
        self.config.allow_remote = true;
        self
    }

    pub fn catalog(&self) -> &Arc<CardCatalog> {
        &self.catalog
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    fn index(&self) -> &CardIndex {
        self.index.get_or_init(|| CardIndex::build(&self.catalog))
    }

    /// Follows `reference` through the local indices and, for names when
    /// `allow_remote` is set, the remote service.
    pub fn resolve(
        &self,
        reference: &CardReference,
        allow_remote: bool,
    ) -> Result<Arc<Card>, CardNotFound> {
        let index = self.index();
        let local = match reference {
            CardReference::SetNumber { set, number } => index.by_printing(set, number),
            CardReference::Arena(id) => index.by_arena(*id),
            CardReference::Mtgo(id) => index.by_mtgo(*id),
            CardReference::Tcgplayer(id) => index.by_tcgplayer(*id),
            CardReference::Id(id) => self.catalog.get(*id),
            CardReference::Oracle(id) => index.by_oracle(*id),
            CardReference::Name { name, foreign } => index
                .by_name(name)
                .or_else(|| foreign.then(|| index.by_foreign_name(name)).flatten()),
        };
        if let Some(card) = local {
            return Ok(card.clone());
        }

        if allow_remote
            && let CardReference::Name { name, foreign } = reference
            && let Some(card) = self.resolve_remote(name, *foreign)
        {
            return Ok(card);
        }

        debug!(%reference, "card reference not resolved");
        Err(CardNotFound::new(reference.to_string()))
    }

    /// Tries every reference `query` carries locally in priority order, then
    /// the remote service by name.
    pub fn find_card(&self, query: &CardQuery) -> Result<Arc<Card>, CardNotFound> {
        for reference in query.references() {
            if let Ok(card) = self.resolve(&reference, false) {
                return Ok(card);
            }
        }

        if self.config.allow_remote
            && let Some(name) = &query.name
            && let Some(card) = self.resolve_remote(name, query.foreign)
        {
            return Ok(card);
        }
        Err(CardNotFound::new(query.describe()))
    }

    /// Maps a remote hit back onto the local catalog by ID or oracle ID.
    fn resolve_remote(&self, name: &str, foreign: bool) -> Option<Arc<Card>> {
        let remote = self.remote.as_ref()?;
        let card = remote.find(name, foreign)?;
        if let Some(local) = self.catalog.get(card.id) {
            return Some(local.clone());
        }
        if let Some(local) = card.oracle_id.and_then(|id| self.index().by_oracle(id)) {
            return Some(local.clone());
        }
        debug!(name = %card.name, id = %card.id, "using remote card absent from catalog");
        Some(Arc::new(card))
    }
}

/// `quantity` handles on the same card.
pub fn get_playset(card: &Arc<Card>, quantity: usize) -> Vec<Arc<Card>> {
    vec![card.clone(); quantity]
}
