//! Deck assembly and validation.
//!
//! [`Deck::build`] is the only way to obtain a deck. It strips commander and
//! companion copies from the boards, enforces copy limits and size bounds,
//! and rejects with the first violated rule. Derived attributes are computed
//! on first access and cached.

pub mod archetype;
mod metadata;

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use time::Date;
use tracing::warn;

use crate::card::{Card, CopyLimit};
use crate::color::ColorSet;
use crate::config::DeckRules;
use crate::error::{DeckViolation, InvalidDeck};
use crate::ids::CardId;
pub use archetype::Archetype;
use archetype::{archetype_from_name, name_tokens, theme_from_name};
pub use metadata::{DeckMetadata, EventInfo};

/// Average mana value below which a deck without better hints is Aggro.
const AGGRO_MAX_AVG_MANA_VALUE: f64 = 2.3;
/// Creature count below which a deck without better hints is Control.
const CONTROL_MAX_CREATURES: usize = 10;

#[derive(Debug, Clone, Default)]
struct Derived {
    theme: OnceLock<Option<String>>,
    archetype: OnceLock<Archetype>,
    color_identity: OnceLock<ColorSet>,
    latest_set: OnceLock<Option<String>>,
    prices: OnceLock<(f64, usize)>,
}

/// A validated, immutable deck.
#[derive(Debug, Clone)]
pub struct Deck {
    maindeck: Vec<Arc<Card>>,
    sideboard: Vec<Arc<Card>>,
    commander: Option<Arc<Card>>,
    partner: Option<Arc<Card>>,
    companion: Option<Arc<Card>>,
    metadata: DeckMetadata,
    derived: Derived,
}

impl Deck {
    /// Validates and assembles a deck under the default [`DeckRules`].
    pub fn build(
        maindeck: Vec<Arc<Card>>,
        sideboard: Vec<Arc<Card>>,
        commander: Option<Arc<Card>>,
        partner: Option<Arc<Card>>,
        companion: Option<Arc<Card>>,
        metadata: DeckMetadata,
    ) -> Result<Self, InvalidDeck> {
        Self::build_with_rules(
            maindeck,
            sideboard,
            commander,
            partner,
            companion,
            metadata,
            &DeckRules::default(),
        )
    }

    /// [`Deck::build`] under explicit `rules`.
    pub fn build_with_rules(
        mut maindeck: Vec<Arc<Card>>,
        mut sideboard: Vec<Arc<Card>>,
        commander: Option<Arc<Card>>,
        partner: Option<Arc<Card>>,
        companion: Option<Arc<Card>>,
        metadata: DeckMetadata,
        rules: &DeckRules,
    ) -> Result<Self, InvalidDeck> {
        check_command_zone(commander.as_ref(), partner.as_ref(), companion.as_ref())?;

        for card in commander.iter().chain(partner.iter()) {
            if !remove_one(&mut maindeck, &card.name) {
                remove_one(&mut sideboard, &card.name);
            }
            let extra = count_named(&maindeck, &card.name) + count_named(&sideboard, &card.name);
            if extra > 0 {
                return Err(DeckViolation::RedundantCommander {
                    name: card.name.clone(),
                    extra,
                }
                .into());
            }
        }
        if let Some(card) = &companion
            && !remove_one(&mut sideboard, &card.name)
        {
            remove_one(&mut maindeck, &card.name);
        }

        let has_commander = commander.is_some();
        check_copies(&maindeck, has_commander, rules)?;

        let slots = usize::from(commander.is_some()) + usize::from(partner.is_some());
        let min = rules.min_size_for(metadata.format.as_deref());
        if maindeck.len() + slots < min {
            return Err(DeckViolation::TooFewCards {
                actual: maindeck.len() + slots,
                min,
            }
            .into());
        }

        let both: Vec<Arc<Card>> = maindeck.iter().chain(&sideboard).cloned().collect();
        check_copies(&both, has_commander, rules)?;
        if sideboard.len() > rules.max_sideboard {
            return Err(DeckViolation::SideboardTooLarge {
                actual: sideboard.len(),
                max: rules.max_sideboard,
            }
            .into());
        }

        let deck = Self {
            maindeck,
            sideboard,
            commander,
            partner,
            companion,
            metadata,
            derived: Derived::default(),
        };
        deck.warn_off_identity();
        Ok(deck)
    }

    pub fn maindeck(&self) -> &[Arc<Card>] {
        &self.maindeck
    }

    pub fn sideboard(&self) -> &[Arc<Card>] {
        &self.sideboard
    }

    pub fn commander(&self) -> Option<&Arc<Card>> {
        self.commander.as_ref()
    }

    pub fn partner(&self) -> Option<&Arc<Card>> {
        self.partner.as_ref()
    }

    /// Commander then partner, whichever are present.
    pub fn commanders(&self) -> impl Iterator<Item = &Arc<Card>> {
        self.commander.iter().chain(self.partner.iter())
    }

    pub fn companion(&self) -> Option<&Arc<Card>> {
        self.companion.as_ref()
    }

    pub fn metadata(&self) -> &DeckMetadata {
        &self.metadata
    }

    /// Maindeck plus commander slots.
    pub fn len(&self) -> usize {
        self.maindeck.len() + self.commanders().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every card of every section, one entry per copy.
    pub fn all_cards(&self) -> impl Iterator<Item = &Arc<Card>> {
        self.commanders()
            .chain(self.companion.iter())
            .chain(&self.maindeck)
            .chain(&self.sideboard)
    }

    /// Maindeck copies grouped per card in first-seen order.
    pub fn playsets(&self) -> Vec<(Arc<Card>, usize)> {
        group_playsets(&self.maindeck)
    }

    pub fn sideboard_playsets(&self) -> Vec<(Arc<Card>, usize)> {
        group_playsets(&self.sideboard)
    }

    /// Average mana value over non-land maindeck copies.
    pub fn avg_mana_value(&self) -> f64 {
        let spells: Vec<f64> = self
            .maindeck
            .iter()
            .filter(|c| !c.is_land())
            .map(|c| c.mana_value())
            .collect();
        if spells.is_empty() {
            return 0.0;
        }
        spells.iter().sum::<f64>() / spells.len() as f64
    }

    pub fn creature_count(&self) -> usize {
        self.maindeck.iter().filter(|c| c.is_creature()).count()
    }

    pub fn theme(&self) -> Option<&str> {
        self.derived
            .theme
            .get_or_init(|| self.metadata.name.as_deref().and_then(theme_from_name))
            .as_deref()
    }

    pub fn archetype(&self) -> Archetype {
        *self.derived.archetype.get_or_init(|| self.infer_archetype())
    }

    fn infer_archetype(&self) -> Archetype {
        if let Some(hint) = self.metadata.archetype.as_deref().and_then(Archetype::from_word) {
            return hint;
        }
        let name = self.metadata.name.as_deref().unwrap_or_default();
        if let Some(named) = archetype_from_name(name) {
            return named;
        }
        if self.theme().is_none() && self.name_mentions_card(name) {
            return Archetype::Combo;
        }
        if self.avg_mana_value() < AGGRO_MAX_AVG_MANA_VALUE {
            return Archetype::Aggro;
        }
        if self.creature_count() < CONTROL_MAX_CREATURES {
            return Archetype::Control;
        }
        Archetype::Midrange
    }

    /// Whether a deck name word is also a word of a non-basic card's name.
    fn name_mentions_card(&self, name: &str) -> bool {
        let tokens = name_tokens(name);
        if tokens.is_empty() {
            return false;
        }
        self.commanders()
            .chain(&self.maindeck)
            .filter(|card| !card.is_basic_land())
            .any(|card| {
                name_tokens(&card.name)
                    .iter()
                    .any(|word| tokens.contains(word))
            })
    }

    /// Commander identity when there is a commander, otherwise the union
    /// over every card.
    pub fn color_identity(&self) -> ColorSet {
        *self.derived.color_identity.get_or_init(|| {
            if self.commander.is_some() {
                union_identity(self.commanders())
            } else {
                union_identity(self.all_cards())
            }
        })
    }

    /// Set code of the most recently released expansion or core printing.
    pub fn latest_set(&self) -> Option<&str> {
        self.derived
            .latest_set
            .get_or_init(|| {
                self.all_cards()
                    .filter(|card| card.set_type.is_expansion_or_core())
                    .filter_map(|card| card.released_at.map(|date| (date, card)))
                    .max_by_key(|(date, _): &(Date, &Arc<Card>)| *date)
                    .map(|(_, card)| card.set_code.clone())
            })
            .as_deref()
    }

    pub fn total_price_usd(&self) -> f64 {
        self.prices().0
    }

    /// Copies that have a USD price.
    pub fn priced_card_count(&self) -> usize {
        self.prices().1
    }

    fn prices(&self) -> (f64, usize) {
        *self.derived.prices.get_or_init(|| {
            self.all_cards()
                .filter_map(|card| card.prices.usd)
                .fold((0.0, 0), |(total, n), usd| (total + usd, n + 1))
        })
    }

    fn warn_off_identity(&self) {
        if self.commander.is_none() {
            return;
        }
        let identity = self.color_identity();
        for (card, _) in group_playsets(&self.maindeck) {
            if !identity.contains_all(card.color_identity) {
                warn!(
                    card = %card.name,
                    card_identity = %card.color_identity,
                    deck_identity = %identity,
                    url = self.metadata.url.as_deref().unwrap_or("-"),
                    "card outside commander color identity"
                );
            }
        }
    }
}

fn check_command_zone(
    commander: Option<&Arc<Card>>,
    partner: Option<&Arc<Card>>,
    companion: Option<&Arc<Card>>,
) -> Result<(), DeckViolation> {
    match (commander, partner) {
        (None, Some(partner)) => {
            return Err(DeckViolation::PartnerWithoutCommander {
                partner: partner.name.clone(),
            });
        }
        (Some(commander), Some(partner)) => {
            match (commander.is_partner_eligible(), partner.is_partner_eligible()) {
                (true, true) => {}
                (false, false) => {
                    return Err(DeckViolation::IneligiblePartner {
                        commander: commander.name.clone(),
                        partner: partner.name.clone(),
                    });
                }
                _ => warn!(
                    commander = %commander.name,
                    partner = %partner.name,
                    "only one of the commanders declares a partner ability"
                ),
            }
        }
        _ => {}
    }

    if let Some(companion) = companion
        && !companion.is_companion()
    {
        return Err(DeckViolation::IneligibleCompanion {
            name: companion.name.clone(),
        });
    }
    Ok(())
}

fn copy_limit(card: &Card, has_commander: bool, rules: &DeckRules) -> CopyLimit {
    if card.is_basic_land() {
        return CopyLimit::Unlimited;
    }
    if let Some(limit) = card.copy_limit_override() {
        return limit;
    }
    if has_commander {
        CopyLimit::Limited(rules.singleton_copies)
    } else {
        CopyLimit::Limited(rules.default_copies)
    }
}

/// Copy counts per card name, first violation in deck order wins.
fn check_copies(cards: &[Arc<Card>], has_commander: bool, rules: &DeckRules) -> Result<(), DeckViolation> {
    let mut order: Vec<&Arc<Card>> = Vec::new();
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for card in cards {
        let count = counts.entry(card.name.as_str()).or_insert(0);
        if *count == 0 {
            order.push(card);
        }
        *count += 1;
    }

    for card in order {
        let count = counts[card.name.as_str()];
        let allowed = copy_limit(card, has_commander, rules);
        if !allowed.allows(count) {
            return Err(DeckViolation::PlaysetLimit {
                name: card.name.clone(),
                count,
                allowed,
            });
        }
    }
    Ok(())
}

fn union_identity<'a>(cards: impl Iterator<Item = &'a Arc<Card>>) -> ColorSet {
    cards
        .map(|card| card.color_identity)
        .fold(ColorSet::COLORLESS, ColorSet::union)
}

/// Removes one copy of `name`, whichever printing it is.
fn remove_one(cards: &mut Vec<Arc<Card>>, name: &str) -> bool {
    match cards.iter().position(|card| card.name == name) {
        Some(at) => {
            cards.remove(at);
            true
        }
        None => false,
    }
}

fn count_named(cards: &[Arc<Card>], name: &str) -> usize {
    cards.iter().filter(|card| card.name == name).count()
}

fn group_playsets(cards: &[Arc<Card>]) -> Vec<(Arc<Card>, usize)> {
    let mut groups: Vec<(Arc<Card>, usize)> = Vec::new();
    let mut at: HashMap<CardId, usize> = HashMap::new();
    for card in cards {
        match at.get(&card.id) {
            Some(&i) => groups[i].1 += 1,
            None => {
                at.insert(card.id, groups.len());
                groups.push((card.clone(), 1));
            }
        }
    }
    groups
}
