use std::collections::{BTreeMap, BTreeSet};

use crate::constants::{
    PROFILE_NEUTRAL_SCORE, REQUESTED_EMOTION_SCORE, RESONANCE_CEIL, RESONANCE_FLOOR, TRIGGER_BOOST,
    TRIGGER_BOOST_CAP,
};
use crate::emotion::normalize_label;
use crate::geo::{Country, GeographicContext};

/// Emotion → score mapping attached to each candidate.
pub type Resonance = BTreeMap<String, f64>;

static REGIONAL_PROFILES: &[(Country, &[(&str, f64)])] = &[
    (
        Country::Japan,
        &[
            ("nostalgic", 0.9),
            ("peaceful", 0.85),
            ("contemplative", 0.8),
            ("melancholy", 0.7),
            ("mysterious", 0.65),
        ],
    ),
    (
        Country::France,
        &[
            ("warm", 0.85),
            ("joyful", 0.8),
            ("contemplative", 0.75),
            ("nostalgic", 0.7),
        ],
    ),
    (
        Country::Italy,
        &[
            ("warm", 0.9),
            ("joyful", 0.85),
            ("awe", 0.75),
            ("nostalgic", 0.7),
        ],
    ),
    (
        Country::Uk,
        &[
            ("contemplative", 0.8),
            ("melancholy", 0.75),
            ("nostalgic", 0.75),
            ("mysterious", 0.7),
        ],
    ),
    (
        Country::Usa,
        &[
            ("joyful", 0.8),
            ("awe", 0.75),
            ("nostalgic", 0.65),
            ("anxious", 0.6),
        ],
    ),
];

/// Trigger keywords per emotion. All of them are vocabulary terms.
static TRIGGERS: &[(&str, &[&str])] = &[
    ("nostalgic", &["古い", "old", "石畳", "cobblestone", "木造", "夕日", "sunset"]),
    ("peaceful", &["静か", "quiet", "静寂", "silence", "湖", "lake", "森", "forest"]),
    ("melancholy", &["雨", "rain", "冷たい", "cold", "港", "harbor"]),
    ("joyful", &["祭り", "festival", "光", "light", "beach", "市場", "market"]),
    ("mysterious", &["霧", "fog", "竹", "bamboo", "神社", "shrine"]),
    ("contemplative", &["寺", "瞑想", "meditation", "教会", "church", "鐘", "bell"]),
    ("warm", &["温かい", "warm", "茶", "tea", "カフェ", "cafe", "café", "温泉"]),
    ("awe", &["富士山", "山", "mountain", "cathedral", "ocean"]),
    ("anxious", &["人混み", "crowd", "暗い", "dark"]),
];

pub fn regional_profile(country: Country) -> Option<&'static [(&'static str, f64)]> {
    REGIONAL_PROFILES
        .iter()
        .find(|(c, _)| *c == country)
        .map(|(_, profile)| *profile)
}

/// Key a requested emotion is scored under; blank labels become "neutral".
pub fn emotion_key(emotion: &str) -> String {
    match normalize_label(emotion) {
        label if label.is_empty() => "neutral".to_string(),
        label => label,
    }
}

/// Score how strongly each emotion resonates with a candidate.
///
/// Starts from the requested emotion, blends the regional profile in by
/// confidence (keeping the larger score where they overlap), adds a bounded
/// boost per trigger hit, then clamps every score.
pub fn score(emotion: &str, ctx: &GeographicContext, keywords: &BTreeSet<String>) -> Resonance {
    let mut scores = Resonance::new();
    scores.insert(emotion_key(emotion), REQUESTED_EMOTION_SCORE);

    if let Some(profile) = regional_profile(ctx.country) {
        let confidence = ctx.confidence.clamp(0.0, 1.0);
        for (name, profile_score) in profile {
            let blended = profile_score * confidence + PROFILE_NEUTRAL_SCORE * (1.0 - confidence);
            scores
                .entry(name.to_string())
                .and_modify(|s| *s = s.max(blended))
                .or_insert(blended);
        }
    }

    for (name, triggers) in TRIGGERS {
        let hits = triggers.iter().filter(|t| keywords.contains(**t)).count();
        if hits == 0 {
            continue;
        }
        let boost = (TRIGGER_BOOST * hits as f64).min(TRIGGER_BOOST_CAP);
        *scores.entry(name.to_string()).or_insert(PROFILE_NEUTRAL_SCORE) += boost;
    }

    for s in scores.values_mut() {
        *s = s.clamp(RESONANCE_FLOOR, RESONANCE_CEIL);
    }
    scores
}
