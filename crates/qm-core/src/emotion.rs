use std::f64::consts::PI;

/// (amplitude, phase) pairs seeding the classical emotion encoding.
pub type EmotionBasis = [(f64, f64); 4];

/// Basis used for labels missing from the table.
pub const NEUTRAL_BASIS: EmotionBasis = [(0.5, 0.0); 4];

static EMOTION_TABLE: &[(&str, EmotionBasis)] = &[
    (
        "nostalgic",
        [(0.8, 0.0), (0.3, PI / 8.0), (0.9, PI / 4.0), (0.6, PI / 3.0)],
    ),
    (
        "melancholy",
        [(0.6, PI / 2.0), (0.9, PI / 3.0), (0.4, 2.0 * PI / 3.0), (0.7, PI / 2.0)],
    ),
    (
        "anxious",
        [(0.9, PI), (0.8, 3.0 * PI / 4.0), (0.2, PI / 6.0), (0.5, 5.0 * PI / 6.0)],
    ),
    (
        "peaceful",
        [(0.3, PI / 4.0), (0.2, PI / 4.0), (0.9, PI / 6.0), (0.8, PI / 3.0)],
    ),
    (
        "mysterious",
        [(0.7, 3.0 * PI / 4.0), (0.6, PI), (0.8, PI / 2.0), (0.9, 2.0 * PI / 3.0)],
    ),
    (
        "warm",
        [(0.9, PI / 6.0), (0.4, PI / 8.0), (0.8, PI / 4.0), (0.9, PI / 6.0)],
    ),
    (
        "joyful",
        [(0.85, 0.0), (0.7, PI / 12.0), (0.9, PI / 6.0), (0.6, 0.0)],
    ),
    (
        "contemplative",
        [(0.8, PI / 3.0), (0.5, PI / 2.0), (0.7, PI / 4.0), (0.6, PI / 3.0)],
    ),
    (
        "awe",
        [(0.9, PI / 8.0), (0.95, PI / 4.0), (0.6, PI / 8.0), (0.8, 0.0)],
    ),
];

/// Trimmed, lowercased emotion label.
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Basis for a known label, or None.
pub fn lookup(label: &str) -> Option<&'static EmotionBasis> {
    let label = normalize_label(label);
    EMOTION_TABLE
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, basis)| basis)
}

pub fn basis_or_neutral(label: &str) -> &'static EmotionBasis {
    lookup(label).unwrap_or(&NEUTRAL_BASIS)
}

pub fn known_emotions() -> impl Iterator<Item = &'static str> {
    EMOTION_TABLE.iter().map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_case_insensitive() {
        assert!(lookup(" Nostalgic ").is_some());
        assert!(lookup("NOSTALGIC").is_some());
    }

    #[test]
    fn test_unknown_is_neutral() {
        assert!(lookup("bewildered").is_none());
        assert_eq!(basis_or_neutral("bewildered"), &NEUTRAL_BASIS);
    }

    #[test]
    fn test_amplitudes_in_unit_range() {
        for name in known_emotions() {
            for (amp, _) in lookup(name).unwrap() {
                assert!((0.0..=1.0).contains(amp), "{name}: {amp}");
            }
        }
    }
}
