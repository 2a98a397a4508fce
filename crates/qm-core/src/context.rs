use std::collections::{BTreeMap, BTreeSet};

use crate::constants::{CONTEXT_CONFIDENCE_CAP, CONTEXT_CONFIDENCE_NORMALIZER};
use crate::geo::{Country, CulturalContext, GeographicContext, UrbanRural};
use crate::vocabulary::{
    MODERN_MARKERS, RURAL_MARKERS, TRADITIONAL_MARKERS, URBAN_MARKERS, indicator,
};

fn count_markers(keywords: &BTreeSet<String>, markers: &[&str]) -> usize {
    markers.iter().filter(|m| keywords.contains(**m)).count()
}

/// Classify the geography of an extracted keyword set.
///
/// The country with the most indicator matches wins; ties go to the
/// earlier country in [`Country::SUPPORTED`]. With no matches the context
/// is unknown with confidence 0.
pub fn classify(keywords: &BTreeSet<String>) -> GeographicContext {
    let mut counts = [0usize; Country::SUPPORTED.len()];
    let mut regions: BTreeMap<(Country, &str), usize> = BTreeMap::new();

    for kw in keywords {
        let Some(ind) = indicator(kw) else { continue };
        if let Some(slot) = Country::SUPPORTED.iter().position(|c| *c == ind.country) {
            counts[slot] += 1;
        }
        if let Some(region) = ind.region {
            *regions.entry((ind.country, region)).or_default() += 1;
        }
    }

    // strict > keeps the first of equal counts
    let mut best: Option<(Country, usize)> = None;
    for (country, &count) in Country::SUPPORTED.iter().zip(&counts) {
        if count > 0 && best.is_none_or(|(_, c)| count > c) {
            best = Some((*country, count));
        }
    }
    let Some((country, count)) = best else {
        return GeographicContext::unknown();
    };

    let region = regions
        .iter()
        .filter(|((c, _), _)| *c == country)
        .fold(None::<(&str, usize)>, |acc, ((_, r), &n)| match acc {
            Some((_, m)) if m >= n => acc,
            _ => Some((*r, n)),
        })
        .map(|(r, _)| r.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    GeographicContext {
        region,
        country,
        urban_rural: urban_rural(keywords),
        cultural_context: cultural(keywords),
        confidence: (count as f64 / CONTEXT_CONFIDENCE_NORMALIZER).min(CONTEXT_CONFIDENCE_CAP),
    }
}

fn urban_rural(keywords: &BTreeSet<String>) -> UrbanRural {
    let urban = count_markers(keywords, URBAN_MARKERS);
    let rural = count_markers(keywords, RURAL_MARKERS);
    match (urban, rural) {
        (0, 0) => UrbanRural::Unknown,
        (u, r) if u >= r => UrbanRural::Urban,
        _ => UrbanRural::Rural,
    }
}

fn cultural(keywords: &BTreeSet<String>) -> CulturalContext {
    let traditional = count_markers(keywords, TRADITIONAL_MARKERS);
    let modern = count_markers(keywords, MODERN_MARKERS);
    match (traditional, modern) {
        (0, 0) => CulturalContext::Unknown,
        (t, m) if t >= m => CulturalContext::Traditional,
        _ => CulturalContext::Modern,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::vocabulary::extract_keywords;

    #[test]
    fn test_japanese_temple_memory() {
        let ctx = classify(&extract_keywords("古い石段を登る寺の記憶"));
        assert_eq!(ctx.country, Country::Japan);
        assert_relative_eq!(ctx.confidence, 2.0 / 3.0);
        assert_eq!(ctx.cultural_context, CulturalContext::Traditional);
    }

    #[test]
    fn test_confidence_capped() {
        let ctx = classify(&extract_keywords("京都の寺と神社、鳥居と石段、茶屋"));
        assert_eq!(ctx.country, Country::Japan);
        assert_eq!(ctx.confidence, CONTEXT_CONFIDENCE_CAP);
        assert_eq!(ctx.region, "kansai");
    }

    #[test]
    fn test_tie_goes_to_enumeration_order() {
        // one indicator each for italy and france
        let ctx = classify(&extract_keywords("gelato after the louvre"));
        assert_eq!(ctx.country, Country::France);
        let ctx = classify(&extract_keywords("a pub near the piazza"));
        assert_eq!(ctx.country, Country::Italy);
    }

    #[test]
    fn test_no_indicators_unknown() {
        let ctx = classify(&extract_keywords("rain on the sea"));
        assert_eq!(ctx.country, Country::Unknown);
        assert_eq!(ctx.confidence, 0.0);
        assert_eq!(ctx.region, "unknown");
        assert_eq!(classify(&BTreeSet::new()), GeographicContext::unknown());
    }

    #[test]
    fn test_urban_modern() {
        let ctx = classify(&extract_keywords("neon over the Tokyo station crowd"));
        assert_eq!(ctx.country, Country::Japan);
        assert_eq!(ctx.urban_rural, UrbanRural::Urban);
        assert_eq!(ctx.cultural_context, CulturalContext::Modern);
    }
}
