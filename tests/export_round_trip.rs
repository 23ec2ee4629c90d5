mod common;

use mtgdecks::{Deck, DeckMetadata, parse_strict, to_arena, to_forge, to_json};

use common::{multiset, names, resolver};

const COMPANION_DECK: &str = "\
Companion
1 Lurrus of the Dream-Den

Deck
4 Monastery Swiftspear
4 Goblin Guide
4 Lightning Bolt (M10) 146
48 Mountain

Sideboard
1 Lurrus of the Dream-Den
2 Wear // Tear
3 Negate
";

const PARTNER_DECK: &str = "\
1 Thrasios, Triton Hero
1 Tymna the Weaver

Deck
1 Sol Ring
1 Snapcaster Mage
24 Plains
24 Island
24 Swamp
24 Forest
";

fn parse_text(text: &str, metadata: DeckMetadata) -> Deck {
    parse_strict(&resolver(), text.lines(), metadata).unwrap()
}

/// Same cards in every zone. Plain exports drop printings, so they are only
/// comparable by name.
fn assert_same_deck(a: &Deck, b: &Deck, by_printing: bool) {
    if by_printing {
        assert_eq!(multiset(a.maindeck()), multiset(b.maindeck()));
        assert_eq!(multiset(a.sideboard()), multiset(b.sideboard()));
    } else {
        assert_eq!(names(a.maindeck()), names(b.maindeck()));
        assert_eq!(names(a.sideboard()), names(b.sideboard()));
    }
    assert_eq!(a.commander(), b.commander());
    assert_eq!(a.partner(), b.partner());
    assert_eq!(a.companion(), b.companion());
}

#[test]
fn arena_export_round_trips() {
    for (text, format) in [(COMPANION_DECK, "modern"), (PARTNER_DECK, "commander")] {
        let metadata = DeckMetadata::default().with_format(format);
        let deck = parse_text(text, metadata.clone());
        for extended in [false, true] {
            let exported = to_arena(&deck, extended);
            let reparsed = parse_text(&exported, metadata.clone());
            assert_same_deck(&deck, &reparsed, extended);
        }
    }
}

#[test]
fn extended_export_keeps_the_printing() {
    let deck = parse_text(COMPANION_DECK, DeckMetadata::default());
    let plain = to_arena(&deck, false);
    let extended = to_arena(&deck, true);

    assert!(plain.contains("\n4 Lightning Bolt\n"));
    assert!(extended.contains("\n4 Lightning Bolt (M10) 146\n"));
    assert!(extended.starts_with("Companion\n1 Lurrus of the Dream-Den (IKO) "));

    // Without the printing the name picks the canonical printing instead.
    let reparsed = parse_text(&plain, DeckMetadata::default());
    let bolt = reparsed
        .maindeck()
        .iter()
        .find(|card| card.name == "Lightning Bolt")
        .unwrap();
    assert_eq!(bolt.set_code, "2xm");
}

#[test]
fn forge_export_sections() {
    let deck = parse_text(PARTNER_DECK, DeckMetadata::default().with_name("Blue Farm"));
    let forge = to_forge(&deck);
    assert!(forge.starts_with("[metadata]\nName=Blue Farm\n[Commander]\n"));
    assert!(forge.contains("1 Thrasios, Triton Hero|C16|1\n1 Tymna the Weaver|C16|1\n[Main]\n"));
    assert!(forge.contains("1 Sol Ring|C21|1\n"));
    assert!(!forge.contains("[Sideboard]"));

    let deck = parse_text(COMPANION_DECK, DeckMetadata::default());
    let forge = to_forge(&deck);
    assert!(forge.starts_with("[metadata]\nName=Unnamed deck\n[Main]\n"));
    assert!(forge.contains("[Sideboard]\n1 Lurrus of the Dream-Den|IKO|1\n2 Wear // Tear|DGM|1\n3 Negate|RIX|1\n"));
}

#[test]
fn json_export_carries_metadata_and_text() {
    let mut metadata = DeckMetadata::from_source("arena-text", "https://decks.example.org/1.txt")
        .with_name("Boros Lurrus");
    metadata.insert_extra("likes", 3);
    let deck = parse_text(COMPANION_DECK, metadata);

    let value: serde_json::Value = serde_json::from_str(&to_json(&deck).unwrap()).unwrap();
    assert_eq!(value["metadata"]["name"], "Boros Lurrus");
    assert_eq!(value["metadata"]["source"], "arena-text");
    assert_eq!(value["metadata"]["likes"], 3);
    assert_eq!(value["decklist"], to_arena(&deck, false));

    let text = value["decklist"].as_str().unwrap();
    assert_same_deck(&deck, &parse_text(text, DeckMetadata::default()), false);
}
