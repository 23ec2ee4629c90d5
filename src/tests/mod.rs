//! Fixture catalog shared by the in-crate scenario tests.


use std::sync::{Arc, OnceLock};

use crate::catalog::CardCatalog;
use crate::resolver::Resolver;

const CARDS_JSON: &str = include_str!("../../tests/fixtures/cards.json");
const SETS_JSON: &str = include_str!("../../tests/fixtures/sets.json");

pub(crate) fn fixture_catalog() -> Arc<CardCatalog> {
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

pub(crate) fn fixture_resolver() -> Resolver {
    Resolver::new(fixture_catalog())
}
