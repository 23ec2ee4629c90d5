//! Fixture catalog shared by the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, OnceLock};

use mtgdecks::{Card, CardCatalog, CardQuery, Resolver};

pub const CARDS_JSON: &str = include_str!("../fixtures/cards.json");
pub const SETS_JSON: &str = include_str!("../fixtures/sets.json");

pub fn catalog() -> Arc<CardCatalog> {
    static CATALOG: OnceLock<Arc<CardCatalog>> = OnceLock::new();
    CATALOG
        .get_or_init(|| {
            Arc::new(
                CardCatalog::from_json_str(CARDS_JSON, Some(SETS_JSON))
                    .expect("fixture catalog parses"),
            )
        })
        .clone()
}

pub fn resolver() -> Resolver {
    Resolver::new(catalog())
}

pub fn card(resolver: &Resolver, name: &str) -> Arc<Card> {
    resolver
        .find_card(&CardQuery::named(name))
        .unwrap_or_else(|err| panic!("{name}: {err}"))
}

/// Copies of every card, keyed by catalog id, for multiset comparisons.
pub fn multiset(cards: &[Arc<Card>]) -> Vec<(String, usize)> {
    let mut counts = std::collections::BTreeMap::new();
    for card in cards {
        *counts.entry(card.id.to_string()).or_insert(0) += 1;
    }
    counts.into_iter().collect()
}

/// Copies of every card, keyed by name.
pub fn names(cards: &[Arc<Card>]) -> Vec<(String, usize)> {
    let mut counts = std::collections::BTreeMap::new();
    for card in cards {
        *counts.entry(card.name.clone()).or_insert(0) += 1;
    }
    counts.into_iter().collect()
}
