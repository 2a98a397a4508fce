use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s'-]").unwrap());
static EDGE_TRIM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^['-]+|['-]+$").unwrap());

/// Tokenize text into lowercase words.
/// Preserves inner apostrophes and hyphens ("don't", "lantern-lit").
/// CJK runs have no word separators and come through as a single token.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned = NON_WORD.replace_all(text, " ");
    cleaned
        .to_lowercase()
        .split_whitespace()
        .map(|t| EDGE_TRIM.replace_all(t, "").to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// A memory fragment prepared for vocabulary scanning.
///
/// ASCII terms must match a whole token (so "art" does not fire inside
/// "start"); terms containing non-ASCII characters match as substrings of
/// the lowercased text, since Japanese text is not whitespace-delimited.
pub struct ScanText {
    lowered: String,
    joined: String,
    tokens: HashSet<String>,
}

impl ScanText {
    pub fn new(text: &str) -> Self {
        let tokens = tokenize(text);
        Self {
            lowered: text.to_lowercase(),
            joined: format!(" {} ", tokens.join(" ")),
            tokens: tokens.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn contains(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        if term.is_ascii() {
            if term.contains(' ') {
                // multi-word phrase: match against the token stream
                return self.joined.contains(&format!(" {term} "));
            }
            self.tokens.contains(&term)
        } else {
            self.lowered.contains(&term)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_tokenize() {
        assert_eq!(tokenize("Hello, world!"), vec!["hello", "world"]);
    }

    #[test]
    fn test_apostrophe_and_hyphen_preserved() {
        assert_eq!(
            tokenize("Don't stop, lantern-lit!"),
            vec!["don't", "stop", "lantern-lit"]
        );
    }

    #[test]
    fn test_edge_punctuation_stripped() {
        assert_eq!(tokenize("'hello' -world-"), vec!["hello", "world"]);
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  \t\n ").is_empty());
    }

    #[test]
    fn test_cjk_single_token() {
        let tokens = tokenize("古い石段を登る寺の記憶");
        assert_eq!(tokens, vec!["古い石段を登る寺の記憶"]);
    }

    #[test]
    fn test_scan_ascii_whole_word() {
        let scan = ScanText::new("We started at the old temple");
        assert!(scan.contains("temple"));
        assert!(scan.contains("Temple"));
        assert!(!scan.contains("art"));
    }

    #[test]
    fn test_scan_ascii_phrase() {
        let scan = ScanText::new("Evening lights near Big Ben.");
        assert!(scan.contains("big ben"));
        assert!(!scan.contains("big bend"));
    }

    #[test]
    fn test_scan_cjk_substring() {
        let scan = ScanText::new("古い石段を登る寺の記憶");
        assert!(scan.contains("石段"));
        assert!(scan.contains("寺"));
        assert!(!scan.contains("海"));
    }
}
