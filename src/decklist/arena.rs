//! Line grammar, normalization and the section state machine for Arena-style
//! decklist text.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::config::MAX_ENTRY_QUANTITY;
use crate::decklist::{CardGroups, Section};
use crate::deck::DeckMetadata;
use crate::error::{DecklistError, Error};
use crate::resolver::{CardQuery, Resolver, is_foreign};

static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([\p{L} ]+?)\s*:?\s*(?:[\[(]\s*\d+\s*[\])])?\s*:?$").expect("header pattern is valid")
});

static PLAYSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s*[xX]?\s+(.+)$").expect("playset pattern is valid"));

static PRINTING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)\s+\(([A-Za-z0-9]{2,6})\)\s+(\S+)$").expect("printing pattern is valid")
});

/// Header word to section, after lowercasing and collapsing whitespace.
fn section_for_header(word: &str) -> Option<Section> {
    let section = match word {
        "commander" | "commanders" | "comandante" => Section::Commander,
        "companion" | "compañero" | "companero" => Section::Companion,
        "deck" | "main" | "maindeck" | "mainboard" | "main deck" | "decklist" | "mazo" => {
            Section::Maindeck
        }
        "sideboard" | "side" | "side board" | "sb" | "reserva" | "banquillo" => Section::Sideboard,
        _ => return None,
    };
    Some(section)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlaysetLine {
    pub quantity: usize,
    pub name: String,
    pub set: Option<String>,
    pub number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LineKind {
    Header(Section),
    About,
    Playset(PlaysetLine),
    Name(String),
    Blank,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Line {
    /// 1-based position in the input.
    pub number: usize,
    pub kind: LineKind,
}

impl Line {
    fn is_playset(&self) -> bool {
        matches!(self.kind, LineKind::Playset(_))
    }

    fn is_blank(&self) -> bool {
        matches!(self.kind, LineKind::Blank)
    }

    fn header(&self) -> Option<Section> {
        match self.kind {
            LineKind::Header(section) => Some(section),
            _ => None,
        }
    }
}

pub(crate) fn classify(number: usize, raw: &str) -> Result<Line, DecklistError> {
    let text = raw.trim();
    let kind = if text.is_empty() {
        LineKind::Blank
    } else if text.eq_ignore_ascii_case("about") {
        LineKind::About
    } else if let Some(section) = HEADER.captures(text).and_then(|caps| {
        let word = caps[1].split_whitespace().collect::<Vec<_>>().join(" ");
        section_for_header(&word.to_lowercase())
    }) {
        LineKind::Header(section)
    } else if let Some(caps) = PLAYSET.captures(text) {
        let quantity = caps[1]
            .parse::<usize>()
            .ok()
            .filter(|q| (1..=MAX_ENTRY_QUANTITY).contains(q))
            .ok_or_else(|| DecklistError::BadQuantity {
                line: number,
                text: text.to_string(),
            })?;
        let rest = caps[2].trim();
        let playset = match PRINTING.captures(rest) {
            Some(printing) => PlaysetLine {
                quantity,
                name: printing[1].to_string(),
                set: Some(printing[2].to_ascii_lowercase()),
                number: Some(printing[3].to_string()),
            },
            None => PlaysetLine {
                quantity,
                name: rest.to_string(),
                set: None,
                number: None,
            },
        };
        LineKind::Playset(playset)
    } else if let Some(title) = text.strip_prefix("Name ") {
        LineKind::Name(title.trim().to_string())
    } else {
        LineKind::Other(text.to_string())
    };
    Ok(Line { number, kind })
}

/// Regroups classified lines before the state machine runs.
///
/// Blank runs collapse to one blank line. With no explicit commander header,
/// one or two header-less playset lines ahead of the first maindeck header
/// become the commander section. With no explicit sideboard header, the
/// first blank line between two maindeck playset lines starts the
/// sideboard.
pub(crate) fn normalize(lines: Vec<Line>) -> Vec<Line> {
    let mut lines = collapse_blanks(lines);

    if !has_header(&lines, Section::Commander) {
        synthesize_commander(&mut lines);
    }

    if has_header(&lines, Section::Sideboard) {
        drop_blank_before_sideboard(&mut lines);
    } else {
        synthesize_sideboard(&mut lines);
    }
    lines
}

fn has_header(lines: &[Line], section: Section) -> bool {
    lines.iter().any(|l| l.header() == Some(section))
}

fn collapse_blanks(lines: Vec<Line>) -> Vec<Line> {
    let mut out: Vec<Line> = Vec::with_capacity(lines.len());
    for line in lines {
        if line.is_blank() && out.last().is_none_or(Line::is_blank) {
            continue;
        }
        out.push(line);
    }
    if out.last().is_some_and(Line::is_blank) {
        out.pop();
    }
    out
}

fn synthesize_commander(lines: &mut Vec<Line>) {
    let Some(main_at) = lines
        .iter()
        .position(|l| l.header() == Some(Section::Maindeck))
    else {
        return;
    };
    let leading = &lines[..main_at];
    if leading.iter().any(|l| l.header().is_some()) {
        return;
    }
    let playsets = leading.iter().filter(|l| l.is_playset()).count();
    if !(1..=2).contains(&playsets) {
        return;
    }
    if let Some(first) = leading.iter().position(Line::is_playset) {
        let number = lines[first].number;
        debug!(line = number, "inferred commander header");
        lines.insert(
            first,
            Line {
                number,
                kind: LineKind::Header(Section::Commander),
            },
        );
    }
}

fn synthesize_sideboard(lines: &mut [Line]) {
    let mut section = Section::Idle;
    for i in 0..lines.len() {
        if let Some(header) = lines[i].header() {
            section = header;
            continue;
        }
        if !lines[i].is_blank() || !matches!(section, Section::Idle | Section::Maindeck) {
            continue;
        }
        let after_playset = i > 0 && lines[i - 1].is_playset();
        let before_playset = lines.get(i + 1).is_some_and(Line::is_playset);
        if after_playset && before_playset {
            debug!(line = lines[i].number, "inferred sideboard header");
            lines[i].kind = LineKind::Header(Section::Sideboard);
            return;
        }
    }
}

fn drop_blank_before_sideboard(lines: &mut Vec<Line>) {
    let mut i = 1;
    while i + 1 < lines.len() {
        if lines[i].is_blank()
            && lines[i - 1].is_playset()
            && lines[i + 1].header() == Some(Section::Sideboard)
        {
            lines.remove(i);
        } else {
            i += 1;
        }
    }
}

/// Runs the section state machine, resolving every playset line.
pub(crate) fn run(
    resolver: &Resolver,
    lines: &[Line],
    metadata: &mut DeckMetadata,
) -> Result<CardGroups, Error> {
    let mut state = Section::Idle;
    let mut groups = CardGroups::default();
    let mut seen_playset = false;

    for line in lines {
        match &line.kind {
            LineKind::Header(next) => {
                if *next == state {
                    return Err(DecklistError::InvalidTransition {
                        line: line.number,
                        from: state,
                        to: *next,
                    }
                    .into());
                }
                state = *next;
            }
            LineKind::Playset(playset) => {
                if state == Section::Idle {
                    state = Section::Maindeck;
                }
                seen_playset = true;
                let card = resolve_playset(resolver, playset)?;
                let group = match state {
                    Section::Commander => &mut groups.commanders,
                    Section::Companion => &mut groups.companions,
                    Section::Sideboard => &mut groups.sideboard,
                    Section::Idle | Section::Maindeck => &mut groups.maindeck,
                };
                group.extend(crate::resolver::get_playset(&card, playset.quantity));
            }
            LineKind::Name(title) => {
                if metadata.name.is_none() {
                    metadata.name = Some(title.clone());
                }
            }
            LineKind::About | LineKind::Blank => {}
            LineKind::Other(text) => {
                debug!(line = line.number, %text, "skipping unrecognized decklist line");
            }
        }
    }

    if !seen_playset {
        return Err(DecklistError::Empty.into());
    }
    Ok(groups)
}

fn resolve_playset(
    resolver: &Resolver,
    playset: &PlaysetLine,
) -> Result<std::sync::Arc<crate::card::Card>, Error> {
    let mut query = CardQuery::named(&playset.name);
    if let (Some(set), Some(number)) = (&playset.set, &playset.number) {
        query = query.with_printing(set, number);
    }
    match resolver.find_card(&query) {
        Ok(card) => Ok(card),
        Err(err) if is_foreign(&playset.name) => {
            debug!(name = %playset.name, "retrying as a foreign name");
            resolver.find_card(&query.foreign(true)).map_err(|_| err.into())
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<LineKind> {
        let lines = text
            .lines()
            .enumerate()
            .map(|(i, raw)| classify(i + 1, raw).unwrap())
            .collect();
        normalize(lines).into_iter().map(|l| l.kind).collect()
    }

    fn playset(quantity: usize, name: &str) -> LineKind {
        LineKind::Playset(PlaysetLine {
            quantity,
            name: name.to_string(),
            set: None,
            number: None,
        })
    }

    #[test]
    fn test_header_vocabulary() {
        let cases = [
            ("Commander", Section::Commander),
            ("COMMANDERS:", Section::Commander),
            ("Comandante", Section::Commander),
            ("Compañero", Section::Companion),
            ("Deck", Section::Maindeck),
            ("Main Deck (60)", Section::Maindeck),
            ("Mazo", Section::Maindeck),
            ("Sideboard [15]", Section::Sideboard),
            ("Side Board:", Section::Sideboard),
            ("SB", Section::Sideboard),
            ("Banquillo", Section::Sideboard),
        ];
        for (text, section) in cases {
            assert_eq!(classify(1, text).unwrap().kind, LineKind::Header(section), "{text}");
        }
        assert!(matches!(classify(1, "Island").unwrap().kind, LineKind::Other(_)));
    }

    #[test]
    fn test_playset_lines() {
        assert_eq!(classify(1, "4 Lightning Bolt").unwrap().kind, playset(4, "Lightning Bolt"));
        assert_eq!(classify(1, "1x Sol Ring").unwrap().kind, playset(1, "Sol Ring"));
        assert_eq!(
            classify(1, "2 Wear // Tear (DGM) 135").unwrap().kind,
            LineKind::Playset(PlaysetLine {
                quantity: 2,
                name: "Wear // Tear".to_string(),
                set: Some("dgm".to_string()),
                number: Some("135".to_string()),
            })
        );
        assert!(matches!(
            classify(7, "0 Lightning Bolt"),
            Err(DecklistError::BadQuantity { line: 7, .. })
        ));
        assert!(matches!(
            classify(2, "4000000000 Mountain"),
            Err(DecklistError::BadQuantity { line: 2, .. })
        ));
        assert_eq!(classify(1, "250 Mountain").unwrap().kind, playset(250, "Mountain"));
    }

    #[test]
    fn test_name_and_about_lines() {
        assert_eq!(classify(1, "About").unwrap().kind, LineKind::About);
        assert_eq!(
            classify(2, "Name Mono Red Burn").unwrap().kind,
            LineKind::Name("Mono Red Burn".to_string())
        );
    }

    #[test]
    fn test_commander_synthesized() {
        let out = kinds("1 Urza, Lord High Artificer\n\n\nDeck\n4 Island");
        assert_eq!(
            out,
            vec![
                LineKind::Header(Section::Commander),
                playset(1, "Urza, Lord High Artificer"),
                LineKind::Blank,
                LineKind::Header(Section::Maindeck),
                playset(4, "Island"),
            ]
        );
    }

    #[test]
    fn test_three_leading_lines_are_not_commanders() {
        let out = kinds("1 A\n1 B\n1 C\nDeck\n4 Island");
        assert_eq!(out[0], playset(1, "A"));
        assert!(!out.contains(&LineKind::Header(Section::Commander)));
    }

    #[test]
    fn test_sideboard_synthesized_from_blank() {
        let out = kinds("4 Lightning Bolt\n20 Mountain\n\n2 Negate\n\n1 Opt");
        assert_eq!(
            out,
            vec![
                playset(4, "Lightning Bolt"),
                playset(20, "Mountain"),
                LineKind::Header(Section::Sideboard),
                playset(2, "Negate"),
                LineKind::Blank,
                playset(1, "Opt"),
            ]
        );
    }

    #[test]
    fn test_blank_before_explicit_sideboard_dropped() {
        let out = kinds("Deck\n4 Lightning Bolt\n\nSideboard\n2 Negate");
        assert_eq!(
            out,
            vec![
                LineKind::Header(Section::Maindeck),
                playset(4, "Lightning Bolt"),
                LineKind::Header(Section::Sideboard),
                playset(2, "Negate"),
            ]
        );
    }
}
