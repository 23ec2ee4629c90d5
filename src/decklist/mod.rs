//! Decklist text to typed card groups, and the text façade over deck
//! assembly.

mod arena;

use std::sync::Arc;

use tracing::warn;

use crate::card::Card;
use crate::deck::{Deck, DeckMetadata};
use crate::error::{DeckViolation, Error, Result};
use crate::resolver::Resolver;

/// Parser state: the section the next playset line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Idle,
    Maindeck,
    Sideboard,
    Commander,
    Companion,
}

/// Resolved cards per section, one entry per copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardGroups {
    pub maindeck: Vec<Arc<Card>>,
    pub sideboard: Vec<Arc<Card>>,
    pub commanders: Vec<Arc<Card>>,
    pub companions: Vec<Arc<Card>>,
}

impl CardGroups {
    /// Checks the command-zone counts and builds the deck.
    pub fn into_deck(self, metadata: DeckMetadata) -> Result<Deck> {
        if self.commanders.len() > 2 {
            return Err(DeckViolation::TooManyCommanders {
                count: self.commanders.len(),
            }
            .into());
        }
        if self.companions.len() > 1 {
            return Err(DeckViolation::TooManyCompanions {
                count: self.companions.len(),
            }
            .into());
        }

        let mut commanders = self.commanders.into_iter();
        let commander = commanders.next();
        let partner = commanders.next();
        let companion = self.companions.into_iter().next();
        Ok(Deck::build(
            self.maindeck,
            self.sideboard,
            commander,
            partner,
            companion,
            metadata,
        )?)
    }
}

/// Classifies, normalizes and runs `lines` through the section state
/// machine. A `Name` line fills `metadata.name` when it is unset.
pub fn parse_groups<I>(resolver: &Resolver, lines: I, metadata: &mut DeckMetadata) -> Result<CardGroups>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let classified = lines
        .into_iter()
        .enumerate()
        .map(|(i, raw)| arena::classify(i + 1, raw.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    let normalized = arena::normalize(classified);
    arena::run(resolver, &normalized, metadata)
}

/// Parses and assembles a deck, failing on the first error.
pub fn parse_strict<I>(resolver: &Resolver, lines: I, metadata: DeckMetadata) -> Result<Deck>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut metadata = metadata;
    let groups = parse_groups(resolver, lines, &mut metadata)?;
    groups.into_deck(metadata)
}

/// Best-effort variant of [`parse_strict`]: logs the failure and returns
/// `None`.
pub fn parse<I>(resolver: &Resolver, lines: I, metadata: DeckMetadata) -> Option<Deck>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let url = metadata.url.clone();
    match parse_strict(resolver, lines, metadata) {
        Ok(deck) => Some(deck),
        Err(err) => {
            warn!(%err, url = url.as_deref().unwrap_or("-"), "decklist skipped");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardBuilder;
    use crate::catalog::CardCatalog;
    use crate::error::{DecklistError, ParsingError};
    use crate::ids::CardId;
    use assert_matches::assert_matches;
    use uuid::Uuid;

    fn resolver() -> Resolver {
        let cards = ["Island", "Mountain"].into_iter().enumerate().map(|(i, name)| {
            CardBuilder::new(CardId::from_raw(Uuid::from_u128(i as u128 + 1)), name)
                .type_line(&format!("Basic Land — {name}"))
                .build()
        });
        Resolver::new(Arc::new(CardCatalog::new(cards, vec![])))
    }

    #[test]
    fn test_same_section_twice_is_rejected() {
        let err = parse_strict(&resolver(), "Deck\n30 Island\nDeck\n30 Mountain".lines(), DeckMetadata::default())
            .unwrap_err();
        assert_matches!(
            err,
            Error::Parsing(ParsingError::Decklist(DecklistError::InvalidTransition {
                line: 3,
                from: Section::Maindeck,
                to: Section::Maindeck,
            }))
        );
    }

    #[test]
    fn test_empty_input() {
        let err = parse_strict(&resolver(), ["", "Deck", "   "], DeckMetadata::default()).unwrap_err();
        assert_matches!(err, Error::Parsing(ParsingError::Decklist(DecklistError::Empty)));
        assert!(parse(&resolver(), [""], DeckMetadata::default()).is_none());
    }

    #[test]
    fn test_unknown_card_surfaces_name() {
        let err = parse_strict(&resolver(), ["60 Islande Bleue"], DeckMetadata::default()).unwrap_err();
        assert_matches!(err, Error::CardNotFound(ref e) if e.query == "Islande Bleue");
    }

    #[test]
    fn test_name_line_fills_metadata() {
        let mut metadata = DeckMetadata::default();
        let groups = parse_groups(
            &resolver(),
            ["Name Mono Blue Lands", "About", "Deck", "60 Island"],
            &mut metadata,
        )
        .unwrap();
        assert_eq!(metadata.name.as_deref(), Some("Mono Blue Lands"));
        assert_eq!(groups.maindeck.len(), 60);
    }

    #[test]
    fn test_three_commanders_rejected() {
        let err = parse_strict(
            &resolver(),
            ["Commander", "3 Island", "Deck", "60 Mountain"],
            DeckMetadata::default(),
        )
        .unwrap_err();
        assert_matches!(
            err,
            Error::InvalidDeck(crate::error::InvalidDeck(DeckViolation::TooManyCommanders { count: 3 }))
        );
    }
}
