//! Archetype labels and the theme vocabulary matched against deck names.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    Aggro,
    Midrange,
    Control,
    Combo,
    Tempo,
    Ramp,
}

impl Archetype {
    pub fn from_word(word: &str) -> Option<Self> {
        match word.trim().to_lowercase().as_str() {
            "aggro" | "aggressive" => Some(Archetype::Aggro),
            "midrange" => Some(Archetype::Midrange),
            "control" => Some(Archetype::Control),
            "combo" => Some(Archetype::Combo),
            "tempo" => Some(Archetype::Tempo),
            "ramp" => Some(Archetype::Ramp),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Archetype::Aggro => "Aggro",
            Archetype::Midrange => "Midrange",
            Archetype::Control => "Control",
            Archetype::Combo => "Combo",
            Archetype::Tempo => "Tempo",
            Archetype::Ramp => "Ramp",
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Color, guild, shard and wedge words; never a theme.
const COLOR_WORDS: &[&str] = &[
    "white", "blue", "black", "red", "green", "mono", "colorless", "azorius", "dimir", "rakdos",
    "gruul", "selesnya", "orzhov", "izzet", "golgari", "boros", "simic", "bant", "esper",
    "grixis", "jund", "naya", "abzan", "jeskai", "sultai", "mardu", "temur", "domain", "4c",
    "5c", "wu", "uw", "ub", "bu", "br", "rb", "rg", "gr", "gw", "wg", "wb", "bw", "ur", "ru",
    "bg", "gb", "rw", "wr", "gu", "ug",
];

const STOP_WORDS: &[&str] = &["the", "of", "and", "a", "an", "in", "to", "with", "deck"];

/// Creature types and mechanical tags a deck name may carry.
const THEMES: &[&str] = &[
    // Creature types
    "advisor", "aetherborn", "alien", "ally", "angel", "antelope", "ape", "archer", "archon",
    "army", "artificer", "assassin", "atog", "aurochs", "avatar", "azra", "badger", "barbarian",
    "bard", "basilisk", "bat", "bear", "beast", "beeble", "berserker", "bird", "bison", "boar",
    "bringer", "brushwagg", "camarid", "camel", "caribou", "cat", "centaur", "cephalid",
    "changeling", "chimera", "citizen", "cleric", "cockatrice", "construct", "coward", "crab",
    "crocodile", "cyclops", "dauthi", "demigod", "demon", "detective", "devil", "dinosaur",
    "djinn", "dog", "dragon", "drake", "dreadnought", "drone", "druid", "dryad", "dwarf",
    "efreet", "egg", "elder", "eldrazi", "elemental", "elephant", "elf", "elk", "employee",
    "eye", "faerie", "ferret", "fish", "flagbearer", "fox", "fractal", "frog", "fungus",
    "gargoyle", "germ", "giant", "gith", "gnoll", "gnome", "goat", "goblin", "god", "golem",
    "gorgon", "gremlin", "griffin", "hag", "halfling", "hamster", "harpy", "hellion", "hippo",
    "hippogriff", "homarid", "homunculus", "horror", "horse", "hound", "human", "hydra",
    "hyena", "illusion", "imp", "incarnation", "inkling", "insect", "jackal", "jellyfish",
    "juggernaut", "kavu", "kirin", "kithkin", "knight", "kobold", "kor", "kraken", "lamia",
    "lammasu", "leech", "leviathan", "lhurgoyf", "licid", "lizard", "manticore", "masticore",
    "mercenary", "merfolk", "metathran", "minion", "minotaur", "mole", "monger", "mongoose",
    "monk", "monkey", "moonfolk", "mouse", "mutant", "myr", "mystic", "naga", "nautilus",
    "nephilim", "nightmare", "nightstalker", "ninja", "noble", "nomad", "nymph", "octopus",
    "ogre", "ooze", "orb", "orc", "orgg", "otter", "ouphe", "ox", "pangolin", "peasant",
    "pegasus", "pest", "phelddagrif", "phoenix", "phyrexian", "pilot", "pincher", "pirate",
    "plant", "porcupine", "praetor", "processor", "rabbit", "raccoon", "ranger", "rat", "rebel",
    "reflection", "rhino", "rigger", "robot", "rogue", "sable", "salamander", "samurai",
    "saproling", "satyr", "scarecrow", "scorpion", "scout", "serf", "serpent", "shade",
    "shaman", "shapeshifter", "shark", "sheep", "siren", "skeleton", "slith", "sliver", "slug",
    "snail", "snake", "soldier", "soltari", "sorcerer", "spawn", "specter", "spellshaper",
    "sphinx", "spider", "spike", "spirit", "splinter", "sponge", "squid", "squirrel",
    "starfish", "surrakar", "survivor", "tentacle", "thalakos", "thopter", "thrull", "tiefling",
    "townsfolk", "treefolk", "trilobite", "troll", "turtle", "unicorn", "vampire", "vedalken",
    "viashino", "volver", "wall", "walrus", "warlock", "warrior", "weasel", "weird", "werewolf",
    "whale", "wizard", "wolf", "wolverine", "wombat", "worm", "wraith", "wurm", "yeti",
    "zombie", "zubera",
    // Mechanics and strategies
    "adventure", "affinity", "aristocrats", "artifact", "aura", "blink", "blitz", "blood",
    "bolster", "burn", "cascade", "casualty", "clue", "connive", "constellation", "convoke",
    "counter", "crime", "cycling", "dash", "daybound", "delirium", "delve", "descend",
    "devotion", "discard", "discover", "disturb", "dredge", "dungeon", "emerge", "energy",
    "enchantment", "enchantress", "enrage", "equipment", "escape", "evoke", "exert", "exploit",
    "explore", "extort", "flash", "flashback", "food", "foretell", "graveyard", "hatebear",
    "heroic", "historic", "infect", "initiative", "investigate", "kicker", "landfall", "legend",
    "lifegain", "madness", "manifest", "mill", "monarch", "morph", "mutate", "ninjutsu",
    "offspring", "outlast", "party", "persist", "plot", "populate", "powerstone", "prison",
    "proliferate", "prowess", "reanimator", "rebound", "reconfigure", "role", "sacrifice",
    "saga", "scapeshift", "snow", "spectacle", "spellslinger", "stax", "storm", "superfriends",
    "surveil", "suspend", "token", "training", "treasure", "tribal", "tron", "undying",
    "unearth", "vehicle", "venture", "voltron", "wheel", "wither",
];

/// `word` lowercased with only its letters and digits kept.
pub(crate) fn clean_token(word: &str) -> String {
    word.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Lowercase name words that can carry meaning: no color words, no stop
/// words.
pub(crate) fn name_tokens(name: &str) -> Vec<String> {
    name.split(|c: char| c.is_whitespace() || c == '-' || c == '/')
        .map(clean_token)
        .filter(|t| !t.is_empty())
        .filter(|t| !COLOR_WORDS.contains(&t.as_str()) && !STOP_WORDS.contains(&t.as_str()))
        .collect()
}

/// Singular candidates of `token`: itself, then simple English plural
/// reductions.
fn singulars(token: &str) -> Vec<String> {
    let mut out = vec![token.to_string()];
    if let Some(stem) = token.strip_suffix("ves") {
        out.push(format!("{stem}f"));
        out.push(format!("{stem}fe"));
    }
    if let Some(stem) = token.strip_suffix("ies") {
        out.push(format!("{stem}y"));
    }
    if let Some(stem) = token.strip_suffix("es") {
        out.push(stem.to_string());
    }
    if let Some(stem) = token.strip_suffix('s') {
        out.push(stem.to_string());
    }
    out
}

/// First vocabulary theme named by the deck name, capitalized.
pub fn theme_from_name(name: &str) -> Option<String> {
    name_tokens(name).iter().find_map(|token| {
        singulars(token)
            .into_iter()
            .find(|candidate| THEMES.contains(&candidate.as_str()))
            .map(|theme| capitalize(&theme))
    })
}

/// First archetype word in the deck name.
pub fn archetype_from_name(name: &str) -> Option<Archetype> {
    name_tokens(name).iter().find_map(|t| Archetype::from_word(t))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
