use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Supertype {
    Basic,
    Legendary,
    Snow,
    World,
    Ongoing,
}

impl Supertype {
    pub fn from_word(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "basic" => Some(Supertype::Basic),
            "legendary" => Some(Supertype::Legendary),
            "snow" => Some(Supertype::Snow),
            "world" => Some(Supertype::World),
            "ongoing" => Some(Supertype::Ongoing),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardType {
    Land,
    Creature,
    Artifact,
    Enchantment,
    Planeswalker,
    Instant,
    Sorcery,
    Battle,
    Kindred, // Formerly Tribal
    Conspiracy,
    Dungeon,
}

impl CardType {
    pub fn from_word(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "creature" => Some(CardType::Creature),
            "artifact" => Some(CardType::Artifact),
            "enchantment" => Some(CardType::Enchantment),
            "land" => Some(CardType::Land),
            "planeswalker" => Some(CardType::Planeswalker),
            "instant" => Some(CardType::Instant),
            "sorcery" => Some(CardType::Sorcery),
            "battle" => Some(CardType::Battle),
            "kindred" | "tribal" => Some(CardType::Kindred),
            "conspiracy" => Some(CardType::Conspiracy),
            "dungeon" => Some(CardType::Dungeon),
            _ => None,
        }
    }
}

/// A type line split into its three parts.
///
/// Subtypes are kept as an open vocabulary: new sets add creature and land
/// types faster than any closed enum could track.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeLine {
    pub raw: String,
    pub supertypes: Vec<Supertype>,
    pub card_types: Vec<CardType>,
    pub subtypes: Vec<String>,
}

impl TypeLine {
    /// Parses `"Legendary Creature — Human Artificer"`. Multi-face lines
    /// (`"Instant // Instant"`) contribute every face's types, deduplicated.
    pub fn parse(raw: &str) -> Self {
        let mut line = TypeLine {
            raw: raw.trim().to_string(),
            ..Default::default()
        };

        for face in raw.split("//") {
            let (left, right) = match face.split_once('—') {
                Some((left, right)) => (left, Some(right)),
                None => match face.split_once(" - ") {
                    Some((left, right)) => (left, Some(right)),
                    None => (face, None),
                },
            };

            for word in left.split_whitespace() {
                if let Some(supertype) = Supertype::from_word(word) {
                    if !line.supertypes.contains(&supertype) {
                        line.supertypes.push(supertype);
                    }
                } else if let Some(card_type) = CardType::from_word(word)
                    && !line.card_types.contains(&card_type)
                {
                    line.card_types.push(card_type);
                }
            }

            if let Some(right) = right {
                for word in right.split_whitespace() {
                    if !line.subtypes.iter().any(|s| s == word) {
                        line.subtypes.push(word.to_string());
                    }
                }
            }
        }

        line
    }

    pub fn has_card_type(&self, card_type: CardType) -> bool {
        self.card_types.contains(&card_type)
    }

    pub fn has_supertype(&self, supertype: Supertype) -> bool {
        self.supertypes.contains(&supertype)
    }

    pub fn has_subtype(&self, subtype: &str) -> bool {
        self.subtypes.iter().any(|s| s.eq_ignore_ascii_case(subtype))
    }
}

impl fmt::Display for TypeLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_legendary_creature() {
        let line = TypeLine::parse("Legendary Creature — Human Artificer");
        assert_eq!(line.supertypes, vec![Supertype::Legendary]);
        assert_eq!(line.card_types, vec![CardType::Creature]);
        assert_eq!(line.subtypes, vec!["Human", "Artificer"]);
        assert!(line.has_subtype("artificer"));
    }

    #[test]
    fn test_parse_basic_snow_land() {
        let line = TypeLine::parse("Basic Snow Land — Island");
        assert!(line.has_supertype(Supertype::Basic));
        assert!(line.has_supertype(Supertype::Snow));
        assert!(line.has_card_type(CardType::Land));
        assert!(line.has_subtype("Island"));
    }

    #[test]
    fn test_parse_multi_face_deduplicates() {
        let line = TypeLine::parse("Instant // Instant");
        assert_eq!(line.card_types, vec![CardType::Instant]);
        assert!(line.subtypes.is_empty());
        assert_eq!(line.raw, "Instant // Instant");
    }

    #[test]
    fn test_parse_ascii_dash_and_tribal() {
        let line = TypeLine::parse("Tribal Instant - Faerie");
        assert_eq!(line.card_types, vec![CardType::Kindred, CardType::Instant]);
        assert_eq!(line.subtypes, vec!["Faerie"]);
    }
}
