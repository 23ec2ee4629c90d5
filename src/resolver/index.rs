use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use tracing::debug;

use crate::card::Card;
use crate::catalog::CardCatalog;
use crate::ids::{ArenaId, MtgoId, OracleId, TcgplayerId};
use crate::resolver::sanitize::fold_name;

/// Derived lookup tables over one catalog snapshot.
#[derive(Debug, Default)]
pub(crate) struct CardIndex {
    by_printing: HashMap<(String, String), Arc<Card>>,
    by_arena: HashMap<ArenaId, Arc<Card>>,
    by_mtgo: HashMap<MtgoId, Arc<Card>>,
    by_tcgplayer: HashMap<TcgplayerId, Arc<Card>>,
    by_oracle: HashMap<OracleId, Arc<Card>>,
    by_full_name: HashMap<String, Arc<Card>>,
    by_face_name: HashMap<String, Arc<Card>>,
    by_foreign_name: HashMap<String, OracleId>,
}

impl CardIndex {
    pub fn build(catalog: &CardCatalog) -> Self {
        let mut index = Self::default();

        for card in catalog.cards() {
            let printing = (card.set_code.clone(), card.collector_number.to_ascii_lowercase());
            offer(&mut index.by_printing, printing, card);

            if let Some(id) = card.arena_id {
                index.by_arena.entry(id).or_insert_with(|| card.clone());
            }
            if let Some(id) = card.mtgo_id {
                index.by_mtgo.entry(id).or_insert_with(|| card.clone());
            }
            if let Some(id) = card.tcgplayer_id {
                index.by_tcgplayer.entry(id).or_insert_with(|| card.clone());
            }
            if let Some(oracle) = card.oracle_id {
                offer(&mut index.by_oracle, oracle, card);
            }

            offer(&mut index.by_full_name, fold_name(&card.name), card);
            if card.is_multi_face() {
                for face in &card.faces {
                    offer(&mut index.by_face_name, fold_name(&face.name), card);
                }
            }

            if card.lang != "en"
                && let Some(oracle) = card.oracle_id
            {
                let printed = card
                    .printed_name
                    .iter()
                    .chain(card.faces.iter().filter_map(|face| face.printed_name.as_ref()));
                for name in printed {
                    index
                        .by_foreign_name
                        .entry(fold_name(name))
                        .or_insert(oracle);
                }
            }
        }

        debug!(
            names = index.by_full_name.len(),
            faces = index.by_face_name.len(),
            foreign = index.by_foreign_name.len(),
            "card indices built"
        );
        index
    }

    pub fn by_printing(&self, set: &str, number: &str) -> Option<&Arc<Card>> {
        self.by_printing
            .get(&(set.trim().to_ascii_lowercase(), number.trim().to_ascii_lowercase()))
    }

    pub fn by_arena(&self, id: ArenaId) -> Option<&Arc<Card>> {
        self.by_arena.get(&id)
    }

    pub fn by_mtgo(&self, id: MtgoId) -> Option<&Arc<Card>> {
        self.by_mtgo.get(&id)
    }

    pub fn by_tcgplayer(&self, id: TcgplayerId) -> Option<&Arc<Card>> {
        self.by_tcgplayer.get(&id)
    }

    pub fn by_oracle(&self, id: OracleId) -> Option<&Arc<Card>> {
        self.by_oracle.get(&id)
    }

    /// Full combined names first, then single face names.
    pub fn by_name(&self, name: &str) -> Option<&Arc<Card>> {
        let key = fold_name(name);
        self.by_full_name
            .get(&key)
            .or_else(|| self.by_face_name.get(&key))
    }

    pub fn by_foreign_name(&self, name: &str) -> Option<&Arc<Card>> {
        let oracle = self.by_foreign_name.get(&fold_name(name))?;
        self.by_oracle(*oracle)
    }
}

/// Canonical printing order: English before other languages, paper before
/// digital-only, then newest release.
fn canonical_order(a: &Card, b: &Card) -> Ordering {
    (a.lang == "en")
        .cmp(&(b.lang == "en"))
        .then((!a.digital).cmp(&!b.digital))
        .then(a.released_at.cmp(&b.released_at))
}

/// Keeps `card` under `key` unless a printing that ranks at least as high is
/// already there.
fn offer<K: Eq + Hash>(map: &mut HashMap<K, Arc<Card>>, key: K, card: &Arc<Card>) {
    match map.get(&key) {
        Some(current) if canonical_order(card, current) != Ordering::Greater => {}
        _ => {
            map.insert(key, card.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardBuilder;
    use crate::ids::CardId;
    use time::macros::date;
    use uuid::Uuid;

    fn bolt(n: u128, set: &str, year: i32, lang: &str, digital: bool) -> Card {
        let released = match year {
            2009 => date!(2009 - 07 - 17),
            2020 => date!(2020 - 08 - 07),
            _ => date!(2023 - 01 - 01),
        };
        CardBuilder::new(CardId::from_raw(Uuid::from_u128(n)), "Lightning Bolt")
            .oracle_id(OracleId::from_raw(Uuid::from_u128(1000)))
            .printing(set, n.to_string())
            .released_at(released)
            .digital(digital)
            .lang(lang, (lang != "en").then(|| "Blitzschlag".to_string()))
            .build()
    }

    #[test]
    fn test_canonical_name_printing() {
        let catalog = CardCatalog::new(
            vec![
                bolt(1, "m10", 2009, "en", false),
                bolt(2, "2xm", 2020, "en", false),
                bolt(3, "ydmu", 2023, "en", true),
                bolt(4, "m10", 2009, "de", false),
            ],
            vec![],
        );
        let index = CardIndex::build(&catalog);

        let canonical = index.by_name("lightning bolt").unwrap();
        assert_eq!(canonical.set_code, "2xm");
        assert_eq!(index.by_oracle(OracleId::from_raw(Uuid::from_u128(1000))), Some(canonical));
        assert_eq!(index.by_foreign_name("Blitzschlag"), Some(canonical));
        assert_eq!(index.by_printing("M10", "4").unwrap().lang, "de");
    }
}
