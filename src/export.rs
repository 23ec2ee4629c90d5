//! Text and JSON projections of a [`Deck`].

use std::fmt::Write;
use std::sync::Arc;

use serde::Serialize;

use crate::card::Card;
use crate::deck::{Deck, DeckMetadata};

fn arena_line(out: &mut String, card: &Card, quantity: usize, extended: bool) {
    if extended && !card.set_code.is_empty() {
        let _ = writeln!(
            out,
            "{quantity} {} ({}) {}",
            card.name,
            card.set_code.to_ascii_uppercase(),
            card.collector_number
        );
    } else {
        let _ = writeln!(out, "{quantity} {}", card.name);
    }
}

fn arena_section(out: &mut String, header: &str, playsets: &[(Arc<Card>, usize)], extended: bool) {
    if playsets.is_empty() {
        return;
    }
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(header);
    out.push('\n');
    for (card, quantity) in playsets {
        arena_line(out, card, *quantity, extended);
    }
}

/// Arena import text; `extended` annotates every line with `(SET) number`.
pub fn to_arena(deck: &Deck, extended: bool) -> String {
    let mut out = String::new();
    let commanders: Vec<(Arc<Card>, usize)> = deck.commanders().map(|c| (c.clone(), 1)).collect();
    let companion: Vec<(Arc<Card>, usize)> = deck.companion().map(|c| (c.clone(), 1)).into_iter().collect();

    arena_section(&mut out, "Commander", &commanders, extended);
    arena_section(&mut out, "Companion", &companion, extended);
    arena_section(&mut out, "Deck", &deck.playsets(), extended);
    arena_section(&mut out, "Sideboard", &deck.sideboard_playsets(), extended);
    out
}

fn forge_section(out: &mut String, header: &str, playsets: &[(Arc<Card>, usize)]) {
    let _ = writeln!(out, "[{header}]");
    for (card, quantity) in playsets {
        let _ = writeln!(
            out,
            "{quantity} {}|{}|1",
            card.name,
            card.set_code.to_ascii_uppercase()
        );
    }
}

/// Forge `.dck` file. The companion is listed in the sideboard, where Forge
/// looks for it.
pub fn to_forge(deck: &Deck) -> String {
    let metadata = deck.metadata();
    let mut out = String::from("[metadata]\n");
    let _ = writeln!(out, "Name={}", metadata.name.as_deref().unwrap_or("Unnamed deck"));
    if let Some(format) = &metadata.format {
        let _ = writeln!(out, "Format={format}");
    }
    if let Some(author) = &metadata.author {
        let _ = writeln!(out, "Author={author}");
    }

    let commanders: Vec<(Arc<Card>, usize)> = deck.commanders().map(|c| (c.clone(), 1)).collect();
    if !commanders.is_empty() {
        forge_section(&mut out, "Commander", &commanders);
    }
    forge_section(&mut out, "Main", &deck.playsets());

    let mut sideboard = deck.sideboard_playsets();
    if let Some(companion) = deck.companion() {
        sideboard.insert(0, (companion.clone(), 1));
    }
    if !sideboard.is_empty() {
        forge_section(&mut out, "Sideboard", &sideboard);
    }
    out
}

#[derive(Serialize)]
struct JsonDeck<'a> {
    metadata: &'a DeckMetadata,
    decklist: String,
}

/// `{"metadata": {...}, "decklist": "<arena text>"}`.
pub fn to_json(deck: &Deck) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonDeck {
        metadata: deck.metadata(),
        decklist: to_arena(deck, false),
    })
}
