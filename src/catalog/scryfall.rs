//! Wire shapes of the bulk card data and set lists, and their conversion into
//! catalog values.
//!
//! The same shapes come back from the remote search endpoints, so the remote
//! client reuses [`RawCard`].

use std::collections::BTreeMap;

use serde::Deserialize;
use time::Date;
use time::macros::format_description;
use tracing::debug;
use uuid::Uuid;

use crate::card::{Card, CardBuilder, CardFace, Legality, Prices, Rarity, SetType};
use crate::catalog::SetInfo;
use crate::color::ColorSet;
use crate::ids::{ArenaId, CardId, MtgoId, OracleId, TcgplayerId};
use crate::mana::ManaCost;
use crate::types::TypeLine;

#[derive(Debug, Clone, Deserialize)]
pub struct RawCard {
    pub id: Uuid,
    #[serde(default)]
    pub oracle_id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub printed_name: Option<String>,
    #[serde(default)]
    pub released_at: Option<String>,
    #[serde(default)]
    pub layout: Option<String>,
    #[serde(default)]
    pub mana_cost: Option<String>,
    #[serde(default)]
    pub cmc: Option<f64>,
    #[serde(default)]
    pub type_line: Option<String>,
    #[serde(default)]
    pub oracle_text: Option<String>,
    #[serde(default)]
    pub colors: Option<ColorSet>,
    #[serde(default)]
    pub color_identity: Option<ColorSet>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub card_faces: Vec<RawFace>,
    #[serde(default)]
    pub legalities: BTreeMap<String, Legality>,
    pub set: String,
    #[serde(default)]
    pub set_type: Option<String>,
    pub collector_number: String,
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(default)]
    pub digital: bool,
    #[serde(default)]
    pub arena_id: Option<u32>,
    #[serde(default)]
    pub mtgo_id: Option<u32>,
    #[serde(default)]
    pub tcgplayer_id: Option<u32>,
    #[serde(default)]
    pub prices: RawPrices,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawFace {
    pub name: String,
    #[serde(default)]
    pub printed_name: Option<String>,
    #[serde(default)]
    pub mana_cost: Option<String>,
    #[serde(default)]
    pub type_line: Option<String>,
    #[serde(default)]
    pub oracle_text: Option<String>,
    #[serde(default)]
    pub colors: Option<ColorSet>,
}

/// Prices arrive as decimal strings (`"0.25"`) or null.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPrices {
    #[serde(default)]
    pub usd: Option<String>,
    #[serde(default)]
    pub eur: Option<String>,
    #[serde(default)]
    pub tix: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSet {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub released_at: Option<String>,
    #[serde(default)]
    pub set_type: Option<String>,
    #[serde(default)]
    pub digital: bool,
}

/// Set lists come either bare or wrapped in a list object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawSetList {
    Wrapped { data: Vec<RawSet> },
    Bare(Vec<RawSet>),
}

impl RawSetList {
    pub fn into_sets(self) -> Vec<RawSet> {
        match self {
            RawSetList::Wrapped { data } => data,
            RawSetList::Bare(sets) => sets,
        }
    }
}

/// Search endpoints page their results in a list object.
#[derive(Debug, Deserialize)]
pub struct RawCardList {
    #[serde(default)]
    pub data: Vec<RawCard>,
}

pub(crate) fn parse_date(raw: &str) -> Option<Date> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")).ok()
}

fn parse_cost(raw: Option<&str>) -> Option<ManaCost> {
    let raw = raw?;
    if raw.trim().is_empty() {
        return None;
    }
    match raw.parse::<ManaCost>() {
        Ok(cost) => Some(cost),
        Err(err) => {
            debug!(%err, "skipping unparseable mana cost");
            None
        }
    }
}

fn parse_price(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|p| p.trim().parse::<f64>().ok())
}

fn parse_rarity(raw: Option<&str>) -> Rarity {
    match raw.unwrap_or("common") {
        "uncommon" => Rarity::Uncommon,
        "rare" => Rarity::Rare,
        "mythic" => Rarity::Mythic,
        "special" => Rarity::Special,
        "bonus" => Rarity::Bonus,
        _ => Rarity::Common,
    }
}

impl From<RawFace> for CardFace {
    fn from(raw: RawFace) -> Self {
        CardFace {
            mana_cost: parse_cost(raw.mana_cost.as_deref()),
            type_line: TypeLine::parse(raw.type_line.as_deref().unwrap_or_default()),
            oracle_text: raw.oracle_text.unwrap_or_default(),
            printed_name: raw.printed_name,
            name: raw.name,
        }
    }
}

impl From<RawCard> for Card {
    fn from(raw: RawCard) -> Self {
        // Double-faced layouts keep colors and costs on the faces only.
        let face_colors: ColorSet = raw
            .card_faces
            .iter()
            .filter_map(|face| face.colors)
            .fold(ColorSet::COLORLESS, ColorSet::union);
        let colors = raw.colors.unwrap_or(face_colors);

        let mana_cost = parse_cost(raw.mana_cost.as_deref()).or_else(|| {
            raw.card_faces
                .first()
                .and_then(|face| parse_cost(face.mana_cost.as_deref()))
        });

        let type_line = raw.type_line.clone().unwrap_or_else(|| {
            raw.card_faces
                .iter()
                .filter_map(|face| face.type_line.as_deref())
                .collect::<Vec<_>>()
                .join(" // ")
        });

        let mut builder = CardBuilder::new(CardId::from_raw(raw.id), raw.name.clone())
            .layout(raw.layout.as_deref().unwrap_or("normal"))
            .colors(colors)
            .color_identity(raw.color_identity.unwrap_or(colors))
            .type_line(&type_line)
            .oracle_text(raw.oracle_text.unwrap_or_default())
            .keywords(raw.keywords)
            .rarity(parse_rarity(raw.rarity.as_deref()))
            .printing(&raw.set, raw.collector_number)
            .set_type(SetType::from_code(raw.set_type.as_deref().unwrap_or("expansion")))
            .digital(raw.digital)
            .prices(Prices {
                usd: parse_price(raw.prices.usd.as_deref()),
                eur: parse_price(raw.prices.eur.as_deref()),
                tix: parse_price(raw.prices.tix.as_deref()),
            })
            .lang(raw.lang.unwrap_or_else(|| "en".to_string()), raw.printed_name)
            .faces(raw.card_faces.into_iter().map(CardFace::from).collect());

        if let Some(cost) = mana_cost {
            builder = builder.mana_cost(cost);
        }
        if let Some(cmc) = raw.cmc {
            builder = builder.cmc(cmc);
        }
        if let Some(oracle_id) = raw.oracle_id {
            builder = builder.oracle_id(OracleId::from_raw(oracle_id));
        }
        if let Some(date) = raw.released_at.as_deref().and_then(parse_date) {
            builder = builder.released_at(date);
        }
        for (format, legality) in raw.legalities {
            builder = builder.legality(&format, legality);
        }
        if let Some(id) = raw.arena_id {
            builder = builder.arena_id(ArenaId(id));
        }
        if let Some(id) = raw.mtgo_id {
            builder = builder.mtgo_id(MtgoId(id));
        }
        if let Some(id) = raw.tcgplayer_id {
            builder = builder.tcgplayer_id(TcgplayerId(id));
        }

        builder.build()
    }
}

impl From<RawSet> for SetInfo {
    fn from(raw: RawSet) -> Self {
        SetInfo {
            code: raw.code.to_ascii_lowercase(),
            name: raw.name,
            released_at: raw.released_at.as_deref().and_then(parse_date),
            set_type: SetType::from_code(raw.set_type.as_deref().unwrap_or("expansion")),
            digital: raw.digital,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::FACE_SEPARATOR;
    use time::macros::date;

    const DELVER: &str = r#"{
        "id": "11bf83bb-c95b-4b4f-9a56-ce7a1816307a",
        "oracle_id": "c3ffa3f4-1a8c-4d39-9fb3-55fe3e5c35c6",
        "name": "Delver of Secrets // Insectile Aberration",
        "lang": "en",
        "released_at": "2011-09-30",
        "layout": "transform",
        "cmc": 1.0,
        "type_line": "Creature — Human Wizard // Creature — Human Insect",
        "color_identity": ["U"],
        "keywords": ["Transform", "Flying"],
        "card_faces": [
            {"name": "Delver of Secrets", "mana_cost": "{U}", "type_line": "Creature — Human Wizard",
             "oracle_text": "At the beginning of your upkeep, look at the top card of your library.", "colors": ["U"]},
            {"name": "Insectile Aberration", "mana_cost": "", "type_line": "Creature — Human Insect",
             "oracle_text": "Flying", "colors": ["U"]}
        ],
        "legalities": {"modern": "legal", "standard": "not_legal"},
        "set": "ISD",
        "set_type": "expansion",
        "collector_number": "51",
        "rarity": "common",
        "arena_id": 70001,
        "prices": {"usd": "0.31", "eur": null, "tix": "0.02"}
    }"#;

    #[test]
    fn test_transform_card_conversion() {
        let raw: RawCard = serde_json::from_str(DELVER).unwrap();
        let card = Card::from(raw);

        assert_eq!(card.name, "Delver of Secrets // Insectile Aberration");
        assert_eq!(card.faces.len(), 2);
        assert_eq!(card.face_names().join(FACE_SEPARATOR), card.name);
        assert_eq!(card.colors, ColorSet::BLUE);
        assert_eq!(card.color_identity, ColorSet::BLUE);
        assert_eq!(card.mana_cost.as_ref().map(ManaCost::to_oracle).as_deref(), Some("{U}"));
        assert_eq!(card.cmc, 1.0);
        assert_eq!(card.set_code, "isd");
        assert!(card.is_creature());
        assert!(card.type_line.has_subtype("Insect"));
        assert_eq!(card.legality("Modern"), Some(Legality::Legal));
        assert_eq!(card.arena_id, Some(ArenaId(70001)));
        assert_eq!(card.prices.usd, Some(0.31));
        assert_eq!(card.prices.eur, None);
        assert_eq!(card.released_at, Some(date!(2011 - 09 - 30)));
    }

    #[test]
    fn test_set_list_shapes() {
        let wrapped = r#"{"object": "list", "data": [{"code": "MH1", "name": "Modern Horizons",
            "released_at": "2019-06-14", "set_type": "draft_innovation"}]}"#;
        let sets = serde_json::from_str::<RawSetList>(wrapped).unwrap().into_sets();
        let info = SetInfo::from(sets[0].clone());
        assert_eq!(info.code, "mh1");
        assert_eq!(info.set_type, SetType::DraftInnovation);
        assert!(!info.is_expansion_or_core());

        let bare = r#"[{"code": "m10", "name": "Magic 2010", "set_type": "core"}]"#;
        let sets = serde_json::from_str::<RawSetList>(bare).unwrap().into_sets();
        assert_eq!(sets.len(), 1);
        assert_eq!(SetInfo::from(sets[0].clone()).released_at, None);
    }
}
