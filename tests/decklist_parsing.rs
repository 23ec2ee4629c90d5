mod common;

use assert_matches::assert_matches;
use mtgdecks::{
    CardQuery, CardReference, DeckMetadata, DecklistError, Error, InMemorySeenUrls, ParsingError,
    ScraperRegistry, get_playset, parse_strict,
};

use common::{card, multiset, resolver};

#[test]
fn resolving_twice_yields_the_same_card() {
    let resolver = resolver();
    let references = [
        CardReference::Name {
            name: "Snapcaster Mage".to_string(),
            foreign: false,
        },
        CardReference::SetNumber {
            set: "m10".to_string(),
            number: "146".to_string(),
        },
        CardReference::Arena(mtgdecks::ArenaId(66003)),
    ];
    for reference in &references {
        let first = resolver.resolve(reference, false).unwrap();
        let second = resolver.resolve(reference, false).unwrap();
        assert_eq!(first, second, "{reference}");
    }

    let bolt = card(&resolver, "Lightning Bolt");
    assert_eq!(
        multiset(&get_playset(&bolt, 4)),
        multiset(&get_playset(&bolt, 4))
    );
    assert!(get_playset(&bolt, 0).is_empty());
}

#[test]
fn every_multi_face_card_resolves_by_each_face() {
    let resolver = resolver();
    let multi_faced: Vec<_> = resolver
        .catalog()
        .cards()
        .filter(|card| card.is_multi_face())
        .cloned()
        .collect();
    assert!(multi_faced.len() >= 2);

    for printing in multi_faced {
        let full = card(&resolver, &printing.name);
        for face in printing.face_names() {
            assert_eq!(card(&resolver, face), full, "{face}");
        }
    }
}

#[test]
fn foreign_printed_names_resolve_to_the_english_card() {
    let resolver = resolver();
    let bolt = card(&resolver, "Lightning Bolt");
    for name in ["Blitzschlag", "稲妻"] {
        let found = resolver
            .find_card(&CardQuery::named(name).foreign(true))
            .unwrap();
        assert_eq!(found, bolt, "{name}");
    }
    assert!(resolver.find_card(&CardQuery::named("Blitzschlag")).is_err());
}

#[test]
fn unknown_card_fails_the_decklist() {
    let err = parse_strict(
        &resolver(),
        ["4 Lightning Bolt", "4 Not A Real Card", "52 Mountain"],
        DeckMetadata::default(),
    )
    .unwrap_err();
    assert_matches!(err, Error::CardNotFound(missing) if missing.query.contains("Not A Real Card"));
}

#[test]
fn quantity_markers_and_printings() {
    let deck = parse_strict(
        &resolver(),
        ["4x Lightning Bolt (M10) 146", "56 X Mountain"],
        DeckMetadata::default(),
    )
    .unwrap();
    let bolt = &deck.maindeck()[0];
    assert_eq!(bolt.set_code, "m10");
    assert_eq!(bolt.collector_number, "146");
    assert_eq!(deck.maindeck().len(), 60);
}

#[test]
fn empty_and_malformed_input() {
    let resolver = resolver();
    for input in [vec![], vec!["", "   "], vec!["Deck", "Sideboard"]] {
        let err = parse_strict(&resolver, input, DeckMetadata::default()).unwrap_err();
        assert_matches!(err, Error::Parsing(ParsingError::Decklist(DecklistError::Empty)));
    }

    let err = parse_strict(&resolver, ["0 Island"], DeckMetadata::default()).unwrap_err();
    assert_matches!(
        err,
        Error::Parsing(ParsingError::Decklist(DecklistError::BadQuantity { line: 1, .. }))
    );
}

#[test]
fn localized_section_headers() {
    let deck = parse_strict(
        &resolver(),
        ["Mazo", "4 Opt", "56 Island", "", "Banquillo", "2 Negate"],
        DeckMetadata::default(),
    )
    .unwrap();
    assert_eq!(deck.maindeck().len(), 60);
    assert_eq!(deck.sideboard().len(), 2);
}

#[test]
fn arena_text_adapter_through_the_registry() {
    let resolver = resolver();
    let registry = ScraperRegistry::with_defaults();
    let seen = InMemorySeenUrls::new();
    let url = "https://decks.example.org/izzet-phoenix.txt";
    let body = "Deck\n4 Arclight Phoenix\n4 Opt\n52 Island\n\nSideboard\n2 Negate\n";

    let deck = registry
        .scrape(&resolver, &seen, url, body)
        .unwrap()
        .unwrap();
    assert_eq!(deck.metadata().source.as_deref(), Some("arena-text"));
    assert_eq!(deck.metadata().url.as_deref(), Some(url));
    assert_eq!(deck.sideboard().len(), 2);

    assert!(registry.scrape(&resolver, &seen, url, body).unwrap().is_none());
    assert!(
        registry
            .scrape(&resolver, &seen, "https://decks.example.org/42", body)
            .unwrap()
            .is_none()
    );
}

#[test]
fn json_adapter_builds_decks() {
    let resolver = resolver();
    let registry = ScraperRegistry::with_defaults();
    let seen = InMemorySeenUrls::new();
    let body = r#"{
        "name": "Rat Colony",
        "format": "standard",
        "author": "someone",
        "date": "2024-05-01",
        "likes": 12,
        "mainboard": [
            {"name": "Relentless Rats", "qty": 24},
            {"name": "Swamp", "quantity": 36}
        ],
        "sideboard": [
            {"set": "rix", "collector_number": "44", "count": 2},
            {"arena_id": 66003, "count": 3}
        ]
    }"#;

    let deck = registry
        .scrape(&resolver, &seen, "https://api.example.org/deck/7.json", body)
        .unwrap()
        .unwrap();
    assert_eq!(deck.metadata().source.as_deref(), Some("json"));
    assert_eq!(deck.metadata().name.as_deref(), Some("Rat Colony"));
    assert_eq!(deck.metadata().extra["likes"], 12);
    assert_eq!(deck.maindeck().len(), 60);
    let sideboard: Vec<&str> = deck.sideboard().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(sideboard, ["Negate", "Negate", "Opt", "Opt", "Opt"]);
}

#[test]
fn json_adapter_rejects_bad_bodies() {
    let resolver = resolver();
    let registry = ScraperRegistry::with_defaults();
    let seen = InMemorySeenUrls::new();

    let err = registry
        .scrape(&resolver, &seen, "https://x.example/a.json", "not json")
        .unwrap_err();
    assert_matches!(err, Error::Parsing(ParsingError::Json(_)));

    let err = registry
        .scrape(&resolver, &seen, "https://x.example/b.json", r#"{"name": "nothing"}"#)
        .unwrap_err();
    assert_matches!(err, Error::Parsing(ParsingError::Input(_)));
    assert!(seen.is_empty());
}

#[test]
fn oversized_quantities_are_rejected_by_both_adapters() {
    let resolver = resolver();
    let registry = ScraperRegistry::with_defaults();
    let seen = InMemorySeenUrls::new();

    let err = registry
        .scrape(&resolver, &seen, "https://x.example/big.txt", "Deck\n4000000000 Mountain\n")
        .unwrap_err();
    assert_matches!(
        err,
        Error::Parsing(ParsingError::Decklist(DecklistError::BadQuantity { line: 2, .. }))
    );

    let body = r#"{"mainboard": [{"name": "Mountain", "qty": 4000000000}]}"#;
    let err = registry
        .scrape(&resolver, &seen, "https://x.example/big.json", body)
        .unwrap_err();
    assert_matches!(err, Error::Parsing(ParsingError::Input(ref msg)) if msg.contains("out of range"));
    assert!(seen.is_empty());
}
