//! Name cleanup applied before every name lookup.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

static FACE_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\p{L})\s*/{1,3}\s*(\p{L})").expect("face separator pattern is valid")
});

/// Characters that mark a name as non-English even inside the Latin script.
const FOREIGN_MARKERS: [char; 11] = ['ß', 'ñ', 'Ñ', 'ç', 'Ç', 'ã', 'Ã', 'õ', 'Õ', '¿', '¡'];

/// Curly punctuation to ASCII, any letter-flanked run of one to three
/// slashes to `" // "`, whitespace collapsed.
pub fn sanitize_name(raw: &str) -> String {
    let plain: String = raw
        .chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{02BC}' | '\u{00B4}' | '`' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201E}' => '"',
            '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2212}' => '-',
            '\u{00A0}' => ' ',
            c => c,
        })
        .collect();
    let joined = FACE_SEPARATOR.replace_all(&plain, "${1} // ${2}");
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lookup key: sanitized, lowercased, combining marks stripped, `æ` spelled
/// out.
pub fn fold_name(raw: &str) -> String {
    strip_marks(&sanitize_name(raw).to_lowercase())
}

/// Sanitized name with every non-ASCII character dropped after folding
/// accents away. Case is kept.
pub fn ascii_fold(raw: &str) -> String {
    strip_marks(&sanitize_name(raw))
        .chars()
        .filter(char::is_ascii)
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether `name` is likely a non-English printed name.
pub fn is_foreign(name: &str) -> bool {
    name.chars()
        .any(|c| FOREIGN_MARKERS.contains(&c) || (c.is_alphabetic() && !is_latin(c)))
}

fn strip_marks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.nfd().filter(|c| !is_combining_mark(*c)) {
        match c {
            'æ' => out.push_str("ae"),
            'Æ' => out.push_str("Ae"),
            'œ' => out.push_str("oe"),
            'Œ' => out.push_str("Oe"),
            c => out.push(c),
        }
    }
    out
}

fn is_latin(c: char) -> bool {
    matches!(c as u32,
        0x0041..=0x005A
        | 0x0061..=0x007A
        | 0x00AA
        | 0x00BA
        | 0x00C0..=0x024F
        | 0x1E00..=0x1EFF
        | 0x2C60..=0x2C7F
        | 0xA720..=0xA7FF
        | 0xFF21..=0xFF3A
        | 0xFF41..=0xFF5A)
}
