//! Slot-based location-name grammars.
//!
//! A template is an ordered list of literal and slot tokens. Each grammar is
//! registered for one (country, context kind) pair and carries its own
//! per-slot vocabularies.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::geo::{Country, CulturalContext, GeographicContext, UrbanRural};
use crate::hashing::{StableHasher, hash_keywords};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    City,
    District,
    Landmark,
    Quality,
    Feature,
}

impl Slot {
    /// Value used when a grammar has no vocabulary for the slot.
    pub fn generic_filler(&self) -> &'static str {
        match self {
            Self::City => "Old Town",
            Self::District => "Quarter",
            Self::Landmark => "Landmark",
            Self::Quality => "Quiet",
            Self::Feature => "Path",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token {
    Lit(&'static str),
    Slot(Slot),
}

/// Context kind a grammar is registered under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextKind {
    Traditional,
    Urban,
    Rural,
    General,
}

impl ContextKind {
    pub fn of(ctx: &GeographicContext) -> Self {
        match (ctx.cultural_context, ctx.urban_rural) {
            (CulturalContext::Traditional, _) => Self::Traditional,
            (_, UrbanRural::Urban) | (CulturalContext::Modern, _) => Self::Urban,
            (_, UrbanRural::Rural) => Self::Rural,
            _ => Self::General,
        }
    }
}

pub struct Grammar {
    pub country: Country,
    pub kind: ContextKind,
    pub templates: &'static [&'static [Token]],
    pub vocab: &'static [(Slot, &'static [&'static str])],
}

impl Grammar {
    fn vocab_for(&self, slot: Slot) -> Option<&'static [&'static str]> {
        self.vocab
            .iter()
            .find(|(s, words)| *s == slot && !words.is_empty())
            .map(|(_, words)| *words)
    }

    /// Render template `template_index` with slot values chosen by `fill_hash`.
    pub fn render(&self, template_index: usize, fill_hash: u64) -> String {
        let template = self.templates[template_index % self.templates.len()];
        let mut out = String::new();
        for token in template {
            match token {
                Token::Lit(s) => out.push_str(s),
                Token::Slot(slot) => match self.vocab_for(*slot) {
                    Some(words) => out.push_str(words[(fill_hash % words.len() as u64) as usize]),
                    None => out.push_str(slot.generic_filler()),
                },
            }
        }
        out
    }
}

use Slot::{City, District, Feature, Landmark, Quality};
use Token::{Lit, Slot as S};

static GRAMMARS: &[Grammar] = &[
    Grammar {
        country: Country::Japan,
        kind: ContextKind::Traditional,
        templates: &[
            &[S(City), Lit("の"), S(Quality), Lit("な"), S(Landmark)],
            &[S(City), Lit("の古い"), S(Landmark), Lit("へ続く"), S(Feature)],
            &[S(Quality), Lit("な"), S(Feature), Lit("と"), S(Landmark)],
        ],
        vocab: &[
            (City, &["鎌倉", "京都", "奈良", "金沢", "飛騨高山", "倉敷"]),
            (Quality, &["静か", "穏やか", "幽玄", "厳か", "ひそやか"]),
            (Landmark, &["石段寺", "茶屋街", "古刹", "山門", "五重塔", "庭園"]),
            (Feature, &["石段", "竹林", "苔の小径", "石畳"]),
        ],
    },
    Grammar {
        country: Country::Japan,
        kind: ContextKind::Urban,
        templates: &[
            &[S(City), Lit("の"), S(District), Lit("の"), S(Feature)],
            &[S(District), Lit("の"), S(Quality), Lit("な"), S(Feature)],
        ],
        vocab: &[
            (City, &["東京", "大阪", "神戸", "横浜", "福岡"]),
            (District, &["下町", "裏通り", "商店街", "駅前"]),
            (Feature, &["路地", "喫茶店", "赤提灯", "歩道橋"]),
            (Quality, &["懐かしい", "賑やか", "雨上がり"]),
        ],
    },
    Grammar {
        country: Country::Japan,
        kind: ContextKind::Rural,
        templates: &[&[S(City), Lit("の"), S(Feature), Lit("に佇む"), S(Landmark)]],
        vocab: &[
            (City, &["飛騨", "遠野", "白川郷", "祖谷"]),
            (Feature, &["棚田", "里山", "清流", "竹林"]),
            (Landmark, &["茅葺きの家", "小さな祠", "水車小屋"]),
        ],
    },
    Grammar {
        country: Country::Japan,
        kind: ContextKind::General,
        templates: &[
            &[S(City), Lit("の"), S(Quality), Lit("な"), S(Feature)],
            &[S(Quality), Lit("な"), S(City), Lit("の"), S(Feature)],
        ],
        vocab: &[
            (City, &["鎌倉", "尾道", "小樽", "長崎", "熱海"]),
            (Quality, &["静か", "懐かしい", "穏やか"]),
            (Feature, &["坂道", "海辺", "港町", "温泉街"]),
        ],
    },
    Grammar {
        country: Country::France,
        kind: ContextKind::Urban,
        templates: &[
            &[Lit("Café "), S(Quality), Lit(", "), S(District)],
            &[S(Landmark), Lit(", "), S(District)],
        ],
        vocab: &[
            (District, &["Montmartre", "Le Marais", "Saint-Germain", "Belleville"]),
            (Quality, &["des Lilas", "du Coin", "de la Lune"]),
            (Landmark, &["Passage Verdeau", "Rue Crémieux", "Quai de la Tournelle"]),
        ],
    },
    Grammar {
        country: Country::France,
        kind: ContextKind::Traditional,
        templates: &[&[S(Landmark), Lit(" de "), S(City)]],
        vocab: &[
            (Landmark, &["Vieux Lavoir", "Abbaye", "Chapelle Saint-Roch", "Marché Couvert"]),
            (City, &["Gordes", "Colmar", "Rouen", "Avignon"]),
        ],
    },
    Grammar {
        country: Country::France,
        kind: ContextKind::General,
        templates: &[&[Lit("Promenade "), S(Quality), Lit(", "), S(City)]],
        vocab: &[
            (Quality, &["des Anglais", "du Soir", "des Tilleuls"]),
            (City, &["Nice", "Lyon", "Annecy", "Paris"]),
        ],
    },
    Grammar {
        country: Country::Italy,
        kind: ContextKind::Traditional,
        templates: &[&[S(Landmark), Lit(" di "), S(City)]],
        vocab: &[
            (Landmark, &["Piazza", "Chiostro", "Vicolo", "Basilica"]),
            (City, &["Firenze", "Siena", "Roma", "Assisi", "Venezia"]),
        ],
    },
    Grammar {
        country: Country::Italy,
        kind: ContextKind::General,
        templates: &[&[S(Feature), Lit(" "), S(Quality), Lit(", "), S(City)]],
        vocab: &[
            (Feature, &["Terrazza", "Giardino", "Lungomare"]),
            (Quality, &["del Sole", "degli Aranci", "della Luna"]),
            (City, &["Sorrento", "Amalfi", "Napoli", "Roma"]),
        ],
    },
    Grammar {
        country: Country::Uk,
        kind: ContextKind::Urban,
        templates: &[&[S(Quality), Lit(" "), S(Feature), Lit(", "), S(District)]],
        vocab: &[
            (Quality, &["Old", "Little", "Hidden"]),
            (Feature, &["Mews", "Lane", "Arcade", "Tea Room"]),
            (District, &["Camden", "Covent Garden", "Notting Hill", "Southwark"]),
        ],
    },
    Grammar {
        country: Country::Uk,
        kind: ContextKind::General,
        templates: &[&[S(City), Lit(" "), S(Feature)]],
        vocab: &[
            (City, &["Bath", "York", "Oxford", "Edinburgh"]),
            (Feature, &["Riverside Walk", "Crescent", "Old Bridge"]),
        ],
    },
    Grammar {
        country: Country::Usa,
        kind: ContextKind::Urban,
        templates: &[&[S(District), Lit(" "), S(Feature)]],
        vocab: &[
            (District, &["Brooklyn", "Greenwich Village", "Mission District", "SoHo"]),
            (Feature, &["Diner", "Rooftop", "Corner Bookstore", "Fire Escape"]),
        ],
    },
    Grammar {
        country: Country::Usa,
        kind: ContextKind::General,
        templates: &[&[S(Quality), Lit(" "), S(Feature), Lit(", "), S(City)]],
        vocab: &[
            (Quality, &["Sunset", "Old Town", "Seaside"]),
            (Feature, &["Boardwalk", "Pier", "Main Street"]),
            (City, &["Santa Monica", "Portland", "Savannah"]),
        ],
    },
];

/// Names used when no grammar is registered for the context.
pub static GENERIC_NAMES: &[&str] = &[
    "Forgotten Crossroads",
    "Quiet Harbor Town",
    "Hillside Village",
    "Riverside Promenade",
    "Old Market Square",
    "Lantern-lit Alley",
    "Seaside Overlook",
    "Station at Dusk",
];

pub fn lookup(country: Country, kind: ContextKind) -> Option<&'static Grammar> {
    GRAMMARS.iter().find(|g| g.country == country && g.kind == kind)
}

/// How a location name was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NameSource {
    Grammar { country: Country, context: ContextKind },
    GenericPool,
}

/// Synthesize a name for `ctx`.
///
/// `ordinal` is the candidate slot (0 primary, then secondaries) and offsets
/// both choices so the candidates of one request differ.
pub fn synthesize_name(
    ctx: &GeographicContext,
    keywords: &BTreeSet<String>,
    emotion: &str,
    ordinal: usize,
) -> (String, NameSource) {
    let kw_hash = hash_keywords(keywords);
    let kind = ContextKind::of(ctx);

    if let Some(grammar) = lookup(ctx.country, kind) {
        let template_index = (kw_hash.wrapping_add(ordinal as u64) % grammar.templates.len() as u64) as usize;
        let fill_hash = StableHasher::new()
            .str(emotion)
            .u64(kw_hash)
            .u64(ordinal as u64)
            .finish();
        return (
            grammar.render(template_index, fill_hash),
            NameSource::Grammar {
                country: ctx.country,
                context: kind,
            },
        );
    }

    let pool_hash = StableHasher::new().u64(kw_hash).str(emotion).finish();
    let index = (pool_hash.wrapping_add(ordinal as u64) % GENERIC_NAMES.len() as u64) as usize;
    (GENERIC_NAMES[index].to_string(), NameSource::GenericPool)
}
