//! Fixed vocabularies scanned for location keywords.

use std::collections::BTreeSet;

use crate::geo::Country;
use crate::tokenizer::ScanText;

/// A place or landmark term tied to a country and, optionally, a region.
#[derive(Clone, Copy, Debug)]
pub struct Indicator {
    pub term: &'static str,
    pub country: Country,
    pub region: Option<&'static str>,
}

const fn ind(term: &'static str, country: Country, region: Option<&'static str>) -> Indicator {
    Indicator {
        term,
        country,
        region,
    }
}

use Country::{France, Italy, Japan, Uk, Usa};

pub static GEOGRAPHIC_INDICATORS: &[Indicator] = &[
    // japan
    ind("寺", Japan, None),
    ind("神社", Japan, None),
    ind("鳥居", Japan, None),
    ind("石段", Japan, None),
    ind("茶屋", Japan, Some("kansai")),
    ind("京都", Japan, Some("kansai")),
    ind("奈良", Japan, Some("kansai")),
    ind("大阪", Japan, Some("kansai")),
    ind("神戸", Japan, Some("kansai")),
    ind("鎌倉", Japan, Some("kanto")),
    ind("東京", Japan, Some("kanto")),
    ind("浅草", Japan, Some("kanto")),
    ind("富士山", Japan, Some("chubu")),
    ind("金沢", Japan, Some("chubu")),
    ind("北海道", Japan, Some("hokkaido")),
    ind("小樽", Japan, Some("hokkaido")),
    ind("尾道", Japan, Some("chugoku")),
    ind("長崎", Japan, Some("kyushu")),
    ind("沖縄", Japan, Some("okinawa")),
    ind("温泉", Japan, None),
    ind("旅館", Japan, None),
    ind("提灯", Japan, None),
    ind("桜", Japan, None),
    ind("kyoto", Japan, Some("kansai")),
    ind("nara", Japan, Some("kansai")),
    ind("osaka", Japan, Some("kansai")),
    ind("tokyo", Japan, Some("kanto")),
    ind("kamakura", Japan, Some("kanto")),
    ind("shrine", Japan, None),
    ind("torii", Japan, None),
    ind("onsen", Japan, None),
    ind("ryokan", Japan, None),
    ind("japan", Japan, None),
    ind("日本", Japan, None),
    // france
    ind("パリ", France, Some("ile-de-france")),
    ind("エッフェル塔", France, Some("ile-de-france")),
    ind("セーヌ", France, Some("ile-de-france")),
    ind("プロヴァンス", France, Some("provence")),
    ind("フランス", France, None),
    ind("paris", France, Some("ile-de-france")),
    ind("eiffel", France, Some("ile-de-france")),
    ind("seine", France, Some("ile-de-france")),
    ind("louvre", France, Some("ile-de-france")),
    ind("montmartre", France, Some("ile-de-france")),
    ind("provence", France, Some("provence")),
    ind("lavender", France, Some("provence")),
    ind("nice", France, Some("provence")),
    ind("lyon", France, Some("auvergne-rhone-alpes")),
    ind("boulangerie", France, None),
    ind("croissant", France, None),
    ind("france", France, None),
    // italy
    ind("ローマ", Italy, Some("lazio")),
    ind("フィレンツェ", Italy, Some("tuscany")),
    ind("ヴェネツィア", Italy, Some("veneto")),
    ind("イタリア", Italy, None),
    ind("rome", Italy, Some("lazio")),
    ind("colosseum", Italy, Some("lazio")),
    ind("florence", Italy, Some("tuscany")),
    ind("tuscany", Italy, Some("tuscany")),
    ind("venice", Italy, Some("veneto")),
    ind("gondola", Italy, Some("veneto")),
    ind("milan", Italy, Some("lombardy")),
    ind("piazza", Italy, None),
    ind("gelato", Italy, None),
    ind("italy", Italy, None),
    // uk
    ind("ロンドン", Uk, Some("england")),
    ind("テムズ", Uk, Some("england")),
    ind("イギリス", Uk, None),
    ind("london", Uk, Some("england")),
    ind("thames", Uk, Some("england")),
    ind("big ben", Uk, Some("england")),
    ind("oxford", Uk, Some("england")),
    ind("england", Uk, Some("england")),
    ind("edinburgh", Uk, Some("scotland")),
    ind("scotland", Uk, Some("scotland")),
    ind("pub", Uk, None),
    // usa
    ind("ニューヨーク", Usa, Some("new-york")),
    ind("アメリカ", Usa, None),
    ind("new york", Usa, Some("new-york")),
    ind("manhattan", Usa, Some("new-york")),
    ind("brooklyn", Usa, Some("new-york")),
    ind("broadway", Usa, Some("new-york")),
    ind("california", Usa, Some("california")),
    ind("san francisco", Usa, Some("california")),
    ind("los angeles", Usa, Some("california")),
    ind("golden gate", Usa, Some("california")),
    ind("diner", Usa, None),
    ind("route 66", Usa, None),
    ind("america", Usa, None),
];

pub static ENVIRONMENTAL_TERMS: &[&str] = &[
    "海", "山", "川", "森", "雪", "雨", "霧", "湖", "坂", "島", "港", "庭園", "竹", "夕日", "路地",
    "公園", "村", "田んぼ", "畑", "sea", "ocean", "beach", "mountain", "river", "forest", "snow",
    "rain", "fog", "lake", "hill", "island", "harbor", "garden", "bamboo", "sunset", "canal",
    "street", "alley", "park", "village", "farm", "field", "meadow", "vineyard",
];

pub static SENSORY_TERMS: &[&str] = &[
    "香り", "匂い", "音", "鐘", "光", "風", "静か", "静寂", "温かい", "冷たい", "足音", "暗い",
    "人混み", "ネオン", "smell", "scent", "sound", "bell", "light", "breeze", "wind", "quiet",
    "silence", "warm", "cold", "footsteps", "dark", "crowd", "neon",
];

pub static CULTURAL_TERMS: &[&str] = &[
    "古い", "伝統", "祭り", "茶", "着物", "石畳", "木造", "瞑想", "教会", "市場", "カフェ", "城",
    "駅", "商店街", "ビル", "old", "ancient", "traditional", "festival", "tea", "kimono",
    "cobblestone", "church", "cathedral", "market", "cafe", "café", "museum", "castle",
    "meditation", "station", "subway", "skyscraper", "modern",
];

/// Urban / rural / traditional / modern markers. Every marker is also a
/// vocabulary term, so it can only fire if it was extracted.
pub static URBAN_MARKERS: &[&str] = &[
    "路地", "駅", "商店街", "カフェ", "ビル", "ネオン", "人混み", "市場", "東京", "大阪", "street",
    "alley", "station", "subway", "cafe", "café", "market", "crowd", "neon", "skyscraper",
    "paris", "london", "new york", "manhattan", "brooklyn", "tokyo",
];

pub static RURAL_MARKERS: &[&str] = &[
    "村", "田んぼ", "畑", "森", "village", "farm", "field", "meadow", "vineyard", "forest",
];

pub static TRADITIONAL_MARKERS: &[&str] = &[
    "古い", "伝統", "寺", "神社", "鳥居", "石段", "茶屋", "着物", "木造", "祭り", "石畳", "城",
    "old", "ancient", "traditional", "shrine", "torii", "cathedral", "church", "cobblestone",
    "castle", "kimono",
];

pub static MODERN_MARKERS: &[&str] = &["ビル", "ネオン", "skyscraper", "neon", "modern", "subway"];

/// Which vocabulary a keyword came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeywordCategory {
    Geographic,
    Environmental,
    Sensory,
    Cultural,
}

fn all_terms() -> impl Iterator<Item = (&'static str, KeywordCategory)> {
    GEOGRAPHIC_INDICATORS
        .iter()
        .map(|i| (i.term, KeywordCategory::Geographic))
        .chain(ENVIRONMENTAL_TERMS.iter().map(|t| (*t, KeywordCategory::Environmental)))
        .chain(SENSORY_TERMS.iter().map(|t| (*t, KeywordCategory::Sensory)))
        .chain(CULTURAL_TERMS.iter().map(|t| (*t, KeywordCategory::Cultural)))
}

/// Scan `text` against all four vocabularies. The result is sorted and
/// deduplicated.
pub fn extract_keywords(text: &str) -> BTreeSet<String> {
    let scan = ScanText::new(text);
    if scan.is_empty() {
        return BTreeSet::new();
    }
    all_terms()
        .filter(|(term, _)| scan.contains(term))
        .map(|(term, _)| term.to_string())
        .collect()
}

pub fn category_of(term: &str) -> Option<KeywordCategory> {
    all_terms().find(|(t, _)| *t == term).map(|(_, c)| c)
}

pub fn indicator(term: &str) -> Option<&'static Indicator> {
    GEOGRAPHIC_INDICATORS.iter().find(|i| i.term == term)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_japanese() {
        let kw = extract_keywords("古い石段を登る寺の記憶");
        assert!(kw.contains("古い"));
        assert!(kw.contains("石段"));
        assert!(kw.contains("寺"));
    }

    #[test]
    fn test_extract_english_whole_words() {
        let kw = extract_keywords("A quiet café near the Seine at sunset.");
        assert!(kw.contains("quiet"));
        assert!(kw.contains("café"));
        assert!(kw.contains("seine"));
        assert!(kw.contains("sunset"));
        // "nice" must not fire inside other words
        assert!(!extract_keywords("niceties").contains("nice"));
    }

    #[test]
    fn test_extract_phrase() {
        let kw = extract_keywords("Rain on Big Ben.");
        assert!(kw.contains("big ben"));
        assert!(kw.contains("rain"));
    }

    #[test]
    fn test_empty_text_no_keywords() {
        assert!(extract_keywords("").is_empty());
        assert!(extract_keywords("   ...").is_empty());
    }

    #[test]
    fn test_markers_are_vocabulary_terms() {
        for marker in URBAN_MARKERS
            .iter()
            .chain(RURAL_MARKERS)
            .chain(TRADITIONAL_MARKERS)
            .chain(MODERN_MARKERS)
        {
            assert!(category_of(marker).is_some(), "{marker} is not extractable");
        }
    }

    #[test]
    fn test_indicator_lookup() {
        let i = indicator("京都").unwrap();
        assert_eq!(i.country, Country::Japan);
        assert_eq!(i.region, Some("kansai"));
        assert!(indicator("海").is_none());
    }
}
