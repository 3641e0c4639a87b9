//! Best-effort language identification.
//!
//! The heuristic scores a handful of high-frequency function words per
//! language. It is intentionally naive; anything implementing
//! `LanguageDetector` can replace it.

pub const DEFAULT_LANGUAGE: &str = "en";

pub trait LanguageDetector: Send + Sync {
    /// Returns an ISO 639-1 style code.
    fn detect(&self, text: &str) -> String;
}

/// Caller hint wins when present and non-blank, otherwise the detector decides.
pub fn resolve_language(detector: &dyn LanguageDetector, hint: Option<&str>, text: &str) -> String {
    match hint.map(str::trim).filter(|h| !h.is_empty()) {
        Some(hint) => hint.to_string(),
        None => detector.detect(text),
    }
}

const LANGUAGE_PATTERNS: &[(&str, &[&str])] = &[
    ("en", &["the", "and", "is", "in", "to", "have", "it"]),
    ("es", &["el", "la", "que", "de", "y", "a", "en", "un"]),
    ("fr", &["le", "la", "les", "du", "des", "et", "est", "en"]),
    ("de", &["der", "die", "das", "und", "ist", "in", "den"]),
    ("it", &["il", "la", "e", "di", "che", "è", "un"]),
    ("pt", &["o", "a", "e", "de", "que", "em", "para"]),
    ("zh", &["的", "是", "不", "了", "在", "人", "有", "我"]),
    ("ja", &["は", "の", "に", "を", "た", "が", "で", "て"]),
    ("ru", &["и", "в", "на", "не", "я", "что", "он", "с"]),
];

/// Scripts written without spaces are matched by substring, the rest by whole word.
const UNSPACED_LANGUAGES: &[&str] = &["zh", "ja"];

#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicLanguageDetector;

impl HeuristicLanguageDetector {
    pub fn new() -> Self {
        Self
    }
}

impl LanguageDetector for HeuristicLanguageDetector {
    fn detect(&self, text: &str) -> String {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        let word_count = lower.split_whitespace().count().max(1) as f64;

        let mut detected = DEFAULT_LANGUAGE;
        let mut highest = 0.0;

        for (lang, patterns) in LANGUAGE_PATTERNS {
            let hits = if UNSPACED_LANGUAGES.contains(lang) {
                patterns.iter().filter(|p| lower.contains(*p)).count()
            } else {
                patterns.iter().filter(|p| words.contains(p)).count()
            };

            let score = hits as f64 / word_count;
            if score > highest {
                highest = score;
                detected = lang;
            }
        }

        detected.to_string()
    }
}
