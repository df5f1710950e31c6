//! Hebrew text normalization.
//!
//! [`HebrewNormalizer`] canonicalizes raw Hebrew input so that query-time
//! tokens line up with index-time terms. Stages run in this order:
//!
//! 1. trim surrounding whitespace
//! 2. strip cantillation marks (U+0591..=U+05AF)
//! 3. strip the curated set of vowel points
//! 4. replace maqaf (U+05BE) with a space
//! 5. delete gershayim (U+05F4) and geresh (U+05F3)
//! 6. map the five final letters to their medial forms
//! 7. collapse whitespace runs and trim again
//!
//! The order is part of the contract with the index-building pipeline.

use lazy_static::lazy_static;

use crate::analysis::char_filter::CharFilter;
use crate::analysis::char_filter::mapping::MappingCharFilter;
use crate::analysis::char_filter::pattern_replace::PatternReplaceCharFilter;
use crate::error::Result;

/// Hebrew accents (te'amim).
const CANTILLATION_PATTERN: &str = r"[\x{0591}-\x{05AF}]";

/// Vowel points stripped at index time. Not a contiguous range: holam haser
/// for vav (U+05BA), rafe (U+05BF) and the upper/lower dots are kept.
const VOWEL_POINT_PATTERN: &str = r"[\x{05B0}\x{05B1}\x{05B2}\x{05B3}\x{05B4}\x{05B5}\x{05B6}\x{05B7}\x{05B8}\x{05B9}\x{05BB}\x{05BC}\x{05BD}\x{05C1}\x{05C2}\x{05C7}]";

const WHITESPACE_PATTERN: &str = r"\s+";

const MAQAF: &str = "\u{05BE}";
const GERESH: &str = "\u{05F3}";
const GERSHAYIM: &str = "\u{05F4}";

/// Final letter forms and their medial counterparts.
pub const FINAL_LETTERS: [(char, char); 5] = [
    ('\u{05DA}', '\u{05DB}'), // ך -> כ
    ('\u{05DD}', '\u{05DE}'), // ם -> מ
    ('\u{05DF}', '\u{05E0}'), // ן -> נ
    ('\u{05E3}', '\u{05E4}'), // ף -> פ
    ('\u{05E5}', '\u{05E6}'), // ץ -> צ
];

lazy_static! {
    static ref DEFAULT_NORMALIZER: HebrewNormalizer =
        HebrewNormalizer::new().expect("built-in Hebrew normalization patterns are valid");
}

/// Canonicalizes text before tokenization or dictionary lookup.
///
/// Implementations must be total and deterministic; an empty or blank input
/// yields an empty string.
pub trait TextNormalizer: Send + Sync {
    /// Normalize `input`.
    fn normalize(&self, input: &str) -> String;
}

impl<F> TextNormalizer for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn normalize(&self, input: &str) -> String {
        self(input)
    }
}

/// The Hebrew normalization pipeline, composed of char filters.
pub struct HebrewNormalizer {
    stages: Vec<Box<dyn CharFilter>>,
    collapse_whitespace: PatternReplaceCharFilter,
}

impl std::fmt::Debug for HebrewNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.stages.iter().map(|s| s.name()).collect();
        f.debug_struct("HebrewNormalizer")
            .field("stages", &names)
            .finish()
    }
}

impl HebrewNormalizer {
    /// Build the pipeline.
    pub fn new() -> Result<Self> {
        let stages: Vec<Box<dyn CharFilter>> = vec![
            Box::new(PatternReplaceCharFilter::remove(CANTILLATION_PATTERN)?),
            Box::new(PatternReplaceCharFilter::remove(VOWEL_POINT_PATTERN)?),
            Box::new(MappingCharFilter::new([(MAQAF, " ")])?),
            Box::new(MappingCharFilter::new([(GERSHAYIM, ""), (GERESH, "")])?),
            Box::new(MappingCharFilter::new(
                FINAL_LETTERS.map(|(fin, medial)| (fin.to_string(), medial.to_string())),
            )?),
        ];

        Ok(Self {
            stages,
            collapse_whitespace: PatternReplaceCharFilter::new(WHITESPACE_PATTERN, " ")?,
        })
    }
}

impl TextNormalizer for HebrewNormalizer {
    fn normalize(&self, input: &str) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return String::new();
        }

        let mut text = trimmed.to_string();
        for stage in &self.stages {
            text = stage.filter(&text);
        }

        self.collapse_whitespace.filter(&text).trim().to_string()
    }
}

/// Normalize `input` with the shared default [`HebrewNormalizer`].
pub fn normalize(input: &str) -> String {
    DEFAULT_NORMALIZER.normalize(input)
}

/// Split already-normalized text into non-empty whitespace-separated tokens.
pub fn tokenize(normalized: &str) -> Vec<String> {
    normalized
        .split_whitespace()
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
