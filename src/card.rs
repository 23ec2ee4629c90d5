use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use time::Date;

use crate::color::ColorSet;
use crate::ids::{ArenaId, CardId, MtgoId, OracleId, TcgplayerId};
use crate::mana::ManaCost;
use crate::types::{CardType, Supertype, TypeLine};

/// Separator between face names of a multi-face card.
pub const FACE_SEPARATOR: &str = " // ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Mythic,
    Special,
    Bonus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Legality {
    Legal,
    NotLegal,
    Restricted,
    Banned,
}

/// Kind of set a printing belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum SetType {
    Core,
    #[default]
    Expansion,
    Masters,
    DraftInnovation,
    Commander,
    Funny,
    Promo,
    Token,
    Alchemy,
    Other(String),
}

impl SetType {
    pub fn from_code(raw: &str) -> Self {
        match raw {
            "core" => SetType::Core,
            "expansion" => SetType::Expansion,
            "masters" => SetType::Masters,
            "draft_innovation" => SetType::DraftInnovation,
            "commander" => SetType::Commander,
            "funny" => SetType::Funny,
            "promo" => SetType::Promo,
            "token" => SetType::Token,
            "alchemy" => SetType::Alchemy,
            other => SetType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SetType::Core => "core",
            SetType::Expansion => "expansion",
            SetType::Masters => "masters",
            SetType::DraftInnovation => "draft_innovation",
            SetType::Commander => "commander",
            SetType::Funny => "funny",
            SetType::Promo => "promo",
            SetType::Token => "token",
            SetType::Alchemy => "alchemy",
            SetType::Other(other) => other,
        }
    }

    pub fn is_expansion_or_core(&self) -> bool {
        matches!(self, SetType::Expansion | SetType::Core)
    }
}

/// Prices as quoted in the catalog snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Prices {
    pub usd: Option<f64>,
    pub eur: Option<f64>,
    pub tix: Option<f64>,
}

/// How many copies of a card a deck may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyLimit {
    Limited(u32),
    Unlimited,
}

impl CopyLimit {
    pub fn allows(self, count: u32) -> bool {
        match self {
            CopyLimit::Limited(max) => count <= max,
            CopyLimit::Unlimited => true,
        }
    }
}

impl fmt::Display for CopyLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CopyLimit::Limited(max) => write!(f, "{max}"),
            CopyLimit::Unlimited => f.write_str("any number"),
        }
    }
}

/// One face of a multi-face card.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CardFace {
    pub name: String,
    pub mana_cost: Option<ManaCost>,
    pub type_line: TypeLine,
    pub oracle_text: String,
    pub printed_name: Option<String>,
}

/// Static, immutable printing from the card catalog.
///
/// Equality and hashing go through [`Card::id`] only: two values with the
/// same catalog ID are the same card even if one came from a newer snapshot.
#[derive(Debug, Clone)]
pub struct Card {
    pub id: CardId,
    pub oracle_id: Option<OracleId>,
    pub name: String,
    pub faces: Vec<CardFace>,
    pub layout: String,
    pub mana_cost: Option<ManaCost>,
    pub cmc: f64,
    pub colors: ColorSet,
    pub color_identity: ColorSet,
    pub type_line: TypeLine,
    pub oracle_text: String,
    pub keywords: Vec<String>,
    pub rarity: Rarity,
    pub set_code: String,
    pub set_type: SetType,
    pub collector_number: String,
    pub released_at: Option<Date>,
    pub digital: bool,
    pub legalities: BTreeMap<String, Legality>,
    pub arena_id: Option<ArenaId>,
    pub mtgo_id: Option<MtgoId>,
    pub tcgplayer_id: Option<TcgplayerId>,
    pub prices: Prices,
    pub lang: String,
    pub printed_name: Option<String>,
}

impl PartialEq for Card {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Card {}

impl Hash for Card {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Card {
    pub fn is_multi_face(&self) -> bool {
        self.faces.len() > 1
    }

    /// Face names in printed order; a single-faced card yields its own name.
    pub fn face_names(&self) -> Vec<&str> {
        if self.faces.is_empty() {
            vec![self.name.as_str()]
        } else {
            self.faces.iter().map(|face| face.name.as_str()).collect()
        }
    }

    /// The combined name rebuilt from the faces.
    pub fn name_from_faces(&self) -> String {
        self.face_names().join(FACE_SEPARATOR)
    }

    /// First face name; what most decklist sites print for double-faced cards.
    pub fn main_name(&self) -> &str {
        self.faces
            .first()
            .map_or(self.name.as_str(), |face| face.name.as_str())
    }

    /// Rules text of every face, newline separated.
    pub fn full_oracle_text(&self) -> String {
        if !self.oracle_text.is_empty() || self.faces.is_empty() {
            return self.oracle_text.clone();
        }
        self.faces
            .iter()
            .map(|face| face.oracle_text.as_str())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn mana_value(&self) -> f64 {
        self.cmc
    }

    pub fn has_card_type(&self, card_type: CardType) -> bool {
        self.type_line.has_card_type(card_type)
    }

    pub fn has_supertype(&self, supertype: Supertype) -> bool {
        self.type_line.has_supertype(supertype)
    }

    pub fn is_creature(&self) -> bool {
        self.has_card_type(CardType::Creature)
    }

    pub fn is_land(&self) -> bool {
        self.has_card_type(CardType::Land)
    }

    pub fn is_legendary(&self) -> bool {
        self.has_supertype(Supertype::Legendary)
    }

    pub fn is_basic_land(&self) -> bool {
        self.has_supertype(Supertype::Basic) && self.is_land()
    }

    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.keywords.iter().any(|k| k.eq_ignore_ascii_case(keyword))
    }

    pub fn legality(&self, format: &str) -> Option<Legality> {
        self.legalities.get(&format.to_ascii_lowercase()).copied()
    }

    /// Copy allowance printed on the card itself ("A deck can have any number
    /// of cards named ...", "... up to seven cards named ...").
    pub fn copy_limit_override(&self) -> Option<CopyLimit> {
        let text = self.full_oracle_text().to_lowercase();
        if text.contains("a deck can have any number of cards named") {
            return Some(CopyLimit::Unlimited);
        }

        let rest = text.split("a deck can have up to ").nth(1)?;
        let mut words = rest.split_whitespace();
        let count = words.next().and_then(number_word)?;
        (words.next() == Some("cards") && words.next() == Some("named"))
            .then_some(CopyLimit::Limited(count))
    }

    /// Whether this card lets a second commander share the command zone.
    pub fn is_partner_eligible(&self) -> bool {
        const PARTNER_KEYWORDS: [&str; 5] = [
            "partner",
            "partner with",
            "friends forever",
            "choose a background",
            "doctor's companion",
        ];
        if PARTNER_KEYWORDS.iter().any(|k| self.has_keyword(k)) {
            return true;
        }
        if self.is_legendary() && self.type_line.has_subtype("Background") {
            return true;
        }

        self.full_oracle_text().lines().any(|line| {
            let line = line.trim_start().to_lowercase();
            PARTNER_KEYWORDS.iter().any(|k| {
                line.strip_prefix(k)
                    .is_some_and(|rest| rest.is_empty() || !rest.starts_with(char::is_alphabetic))
            })
        })
    }

    pub fn is_companion(&self) -> bool {
        self.has_keyword("companion")
            || self
                .full_oracle_text()
                .lines()
                .any(|line| line.starts_with("Companion —") || line.starts_with("Companion -"))
    }
}

fn number_word(word: &str) -> Option<u32> {
    if let Ok(n) = word.parse::<u32>() {
        return Some(n);
    }
    let n = match word {
        "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        "thirteen" => 13,
        "fourteen" => 14,
        "fifteen" => 15,
        "twenty" => 20,
        _ => return None,
    };
    Some(n)
}

/// Builder for constructing Card instances.
#[derive(Debug, Clone)]
pub struct CardBuilder {
    card: Card,
}

impl CardBuilder {
    pub fn new(id: CardId, name: impl Into<String>) -> Self {
        Self {
            card: Card {
                id,
                oracle_id: None,
                name: name.into(),
                faces: Vec::new(),
                layout: "normal".to_string(),
                mana_cost: None,
                cmc: 0.0,
                colors: ColorSet::COLORLESS,
                color_identity: ColorSet::COLORLESS,
                type_line: TypeLine::default(),
                oracle_text: String::new(),
                keywords: Vec::new(),
                rarity: Rarity::Common,
                set_code: String::new(),
                set_type: SetType::Expansion,
                collector_number: String::new(),
                released_at: None,
                digital: false,
                legalities: BTreeMap::new(),
                arena_id: None,
                mtgo_id: None,
                tcgplayer_id: None,
                prices: Prices::default(),
                lang: "en".to_string(),
                printed_name: None,
            },
        }
    }

    pub fn oracle_id(mut self, id: OracleId) -> Self {
        self.card.oracle_id = Some(id);
        self
    }

    pub fn faces(mut self, faces: Vec<CardFace>) -> Self {
        self.card.faces = faces;
        self
    }

    pub fn layout(mut self, layout: impl Into<String>) -> Self {
        self.card.layout = layout.into();
        self
    }

    /// Sets the cost and, unless set explicitly later, its mana value.
    pub fn mana_cost(mut self, cost: ManaCost) -> Self {
        self.card.cmc = cost.mana_value() as f64;
        self.card.mana_cost = Some(cost);
        self
    }

    pub fn cmc(mut self, cmc: f64) -> Self {
        self.card.cmc = cmc;
        self
    }

    pub fn colors(mut self, colors: ColorSet) -> Self {
        self.card.colors = colors;
        self
    }

    pub fn color_identity(mut self, identity: ColorSet) -> Self {
        self.card.color_identity = identity;
        self
    }

    pub fn type_line(mut self, raw: &str) -> Self {
        self.card.type_line = TypeLine::parse(raw);
        self
    }

    pub fn oracle_text(mut self, text: impl Into<String>) -> Self {
        self.card.oracle_text = text.into();
        self
    }

    pub fn keywords(mut self, keywords: Vec<String>) -> Self {
        self.card.keywords = keywords;
        self
    }

    pub fn rarity(mut self, rarity: Rarity) -> Self {
        self.card.rarity = rarity;
        self
    }

    /// Set code is stored lowercase; collector numbers are kept verbatim.
    pub fn printing(mut self, set_code: &str, collector_number: impl Into<String>) -> Self {
        self.card.set_code = set_code.to_ascii_lowercase();
        self.card.collector_number = collector_number.into();
        self
    }

    pub fn set_type(mut self, set_type: SetType) -> Self {
        self.card.set_type = set_type;
        self
    }

    pub fn released_at(mut self, date: Date) -> Self {
        self.card.released_at = Some(date);
        self
    }

    pub fn digital(mut self, digital: bool) -> Self {
        self.card.digital = digital;
        self
    }

    pub fn legality(mut self, format: &str, legality: Legality) -> Self {
        self.card
            .legalities
            .insert(format.to_ascii_lowercase(), legality);
        self
    }

    pub fn arena_id(mut self, id: ArenaId) -> Self {
        self.card.arena_id = Some(id);
        self
    }

    pub fn mtgo_id(mut self, id: MtgoId) -> Self {
        self.card.mtgo_id = Some(id);
        self
    }

    pub fn tcgplayer_id(mut self, id: TcgplayerId) -> Self {
        self.card.tcgplayer_id = Some(id);
        self
    }

    pub fn prices(mut self, prices: Prices) -> Self {
        self.card.prices = prices;
        self
    }

    pub fn lang(mut self, lang: impl Into<String>, printed_name: Option<String>) -> Self {
        self.card.lang = lang.into();
        self.card.printed_name = printed_name;
        self
    }

    pub fn build(self) -> Card {
        self.card
    }
}
