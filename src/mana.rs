use std::fmt;
use std::str::FromStr;

use crate::color::{Color, ColorSet};

/// Atomic mana payment options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManaSymbol {
    /// White mana {W}
    White,
    /// Blue mana {U}
    Blue,
    /// Black mana {B}
    Black,
    /// Red mana {R}
    Red,
    /// Green mana {G}
    Green,
    /// Colorless mana {C}
    Colorless,
    /// Generic mana {1}, {2}, etc.
    Generic(u8),
    /// Snow mana {S}
    Snow,
    /// Life payment for Phyrexian costs
    Life(u8),
    /// Variable mana {X}
    X,
}

impl ManaSymbol {
    /// Returns the mana value contribution of this symbol.
    pub fn mana_value(&self) -> u32 {
        match self {
            ManaSymbol::White
            | ManaSymbol::Blue
            | ManaSymbol::Black
            | ManaSymbol::Red
            | ManaSymbol::Green
            | ManaSymbol::Colorless
            | ManaSymbol::Snow => 1,
            ManaSymbol::Generic(n) => *n as u32,
            ManaSymbol::Life(_) => 0, // Life payment doesn't contribute to mana value
            ManaSymbol::X => 0,       // X is 0 except on the stack
        }
    }

    pub fn color(&self) -> Option<Color> {
        match self {
            ManaSymbol::White => Some(Color::White),
            ManaSymbol::Blue => Some(Color::Blue),
            ManaSymbol::Black => Some(Color::Black),
            ManaSymbol::Red => Some(Color::Red),
            ManaSymbol::Green => Some(Color::Green),
            _ => None,
        }
    }

    fn text(&self) -> String {
        match self {
            ManaSymbol::White => "W".to_string(),
            ManaSymbol::Blue => "U".to_string(),
            ManaSymbol::Black => "B".to_string(),
            ManaSymbol::Red => "R".to_string(),
            ManaSymbol::Green => "G".to_string(),
            ManaSymbol::Colorless => "C".to_string(),
            ManaSymbol::Generic(n) => n.to_string(),
            ManaSymbol::Snow => "S".to_string(),
            ManaSymbol::Life(_) => "P".to_string(),
            ManaSymbol::X => "X".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid mana cost {cost:?}: {reason}")]
pub struct ManaCostError {
    pub cost: String,
    pub reason: String,
}

/// Represents a mana cost as a sequence of pips, where each pip is a list of
/// alternative payment options (disjunction).
///
/// Examples:
/// - `{2}{W}{W}` = `[[Generic(2)], [White], [White]]`
/// - `{W/U}` (hybrid) = `[[White, Blue]]`
/// - `{2/W}` (twobrid) = `[[Generic(2), White]]`
/// - `{W/P}` (phyrexian) = `[[White, Life(2)]]`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManaCost {
    pips: Vec<Vec<ManaSymbol>>,
}

impl ManaCost {
    pub fn new() -> Self {
        Self { pips: Vec::new() }
    }

    pub fn from_pips(pips: Vec<Vec<ManaSymbol>>) -> Self {
        Self { pips }
    }

    /// Returns the mana value (formerly converted mana cost) of this cost.
    ///
    /// For each pip, uses the maximum mana value among its alternatives.
    pub fn mana_value(&self) -> u32 {
        self.pips
            .iter()
            .map(|pip| pip.iter().map(|s| s.mana_value()).max().unwrap_or(0))
            .sum()
    }

    pub fn pips(&self) -> &[Vec<ManaSymbol>] {
        &self.pips
    }

    /// Colors of every colored symbol in the cost, hybrid halves included.
    pub fn colors(&self) -> ColorSet {
        self.pips
            .iter()
            .flatten()
            .filter_map(ManaSymbol::color)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pips.is_empty()
    }

    /// Format the mana cost in oracle-style syntax (e.g., "{2}{W}{W}").
    pub fn to_oracle(&self) -> String {
        let mut out = String::new();
        for pip in &self.pips {
            let parts: Vec<String> = pip.iter().map(ManaSymbol::text).collect();
            out.push('{');
            out.push_str(&parts.join("/"));
            out.push('}');
        }
        out
    }
}

impl fmt::Display for ManaCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_oracle())
    }
}

/// Parses oracle syntax. Multi-face costs (`{1}{R} // {W}`) are concatenated.
impl FromStr for ManaCost {
    type Err = ManaCostError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let error = |reason: String| ManaCostError {
            cost: raw.to_string(),
            reason,
        };

        let mut pips = Vec::new();
        let mut current = String::new();
        let mut in_brace = false;
        for ch in raw.chars() {
            match ch {
                '{' if !in_brace => {
                    in_brace = true;
                    current.clear();
                }
                '}' if in_brace => {
                    in_brace = false;
                    if current.is_empty() {
                        return Err(error("empty symbol".to_string()));
                    }
                    pips.push(parse_mana_symbol_group(&current).map_err(error)?);
                }
                _ if in_brace => current.push(ch),
                '/' | ' ' => {}
                _ => return Err(error(format!("unexpected character {ch:?}"))),
            }
        }
        if in_brace {
            return Err(error("unterminated symbol".to_string()));
        }

        Ok(ManaCost::from_pips(pips))
    }
}

fn parse_mana_symbol_group(raw: &str) -> Result<Vec<ManaSymbol>, String> {
    raw.split('/').map(parse_mana_symbol).collect()
}

fn parse_mana_symbol(part: &str) -> Result<ManaSymbol, String> {
    let upper = part.trim().to_ascii_uppercase();
    if upper.is_empty() {
        return Err("empty mana symbol".to_string());
    }

    if upper.chars().all(|c| c.is_ascii_digit()) {
        let value = upper
            .parse::<u8>()
            .map_err(|_| format!("invalid generic mana symbol '{part}'"))?;
        return Ok(ManaSymbol::Generic(value));
    }

    match upper.as_str() {
        "W" => Ok(ManaSymbol::White),
        "U" => Ok(ManaSymbol::Blue),
        "B" => Ok(ManaSymbol::Black),
        "R" => Ok(ManaSymbol::Red),
        "G" => Ok(ManaSymbol::Green),
        "C" => Ok(ManaSymbol::Colorless),
        "S" => Ok(ManaSymbol::Snow),
        "X" | "Y" | "Z" => Ok(ManaSymbol::X),
        "P" => Ok(ManaSymbol::Life(2)),
        _ => Err(format!("unsupported mana symbol '{part}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mana_symbol_value() {
        assert_eq!(ManaSymbol::White.mana_value(), 1);
        assert_eq!(ManaSymbol::Generic(3).mana_value(), 3);
        assert_eq!(ManaSymbol::X.mana_value(), 0);
        assert_eq!(ManaSymbol::Life(2).mana_value(), 0);
    }

    #[test]
    fn test_parse_simple_cost() {
        let cost: ManaCost = "{2}{W}{W}".parse().unwrap();
        assert_eq!(cost.mana_value(), 4);
        assert_eq!(cost.pips().len(), 3);
        assert_eq!(cost.colors(), ColorSet::WHITE);
        assert_eq!(cost.to_oracle(), "{2}{W}{W}");
    }

    #[test]
    fn test_parse_hybrid_and_phyrexian() {
        let cost: ManaCost = "{2/W}{G/U/P}".parse().unwrap();
        assert_eq!(
            cost.pips(),
            &[
                vec![ManaSymbol::Generic(2), ManaSymbol::White],
                vec![ManaSymbol::Green, ManaSymbol::Blue, ManaSymbol::Life(2)],
            ]
        );
        assert_eq!(cost.mana_value(), 3);
        assert_eq!(
            cost.colors(),
            ColorSet::WHITE.union(ColorSet::BLUE).union(ColorSet::GREEN)
        );
    }

    #[test]
    fn test_parse_split_cost_concatenates_faces() {
        let cost: ManaCost = "{1}{R} // {W}".parse().unwrap();
        assert_eq!(cost.mana_value(), 3);
        assert_eq!(cost.colors(), ColorSet::RED.union(ColorSet::WHITE));
    }

    #[test]
    fn test_parse_empty_cost() {
        let cost: ManaCost = "".parse().unwrap();
        assert!(cost.is_empty());
        assert_eq!(cost.mana_value(), 0);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("{Q}".parse::<ManaCost>().is_err());
        assert!("{2".parse::<ManaCost>().is_err());
        assert!("2R".parse::<ManaCost>().is_err());
    }
}
