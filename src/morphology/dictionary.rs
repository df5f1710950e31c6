//! In-memory morphological dictionary.
//!
//! Built once from `(surface, base, variants)` triples and never mutated
//! afterwards, so any number of threads can read it without locking.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use ahash::{AHashMap, AHashSet};

use crate::analysis::normalizer::TextNormalizer;
use crate::error::{LookupError, Result};
use crate::morphology::store;

/// One row of the dictionary store, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryEntry {
    pub surface: String,
    pub base: String,
    pub variants: Vec<String>,
}

impl DictionaryEntry {
    pub fn new<S, B, I, V>(surface: S, base: B, variants: I) -> Self
    where
        S: Into<String>,
        B: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            surface: surface.into(),
            base: base.into(),
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }
}

/// All normalized terms that share one normalized base form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Expansion {
    /// Surface forms, variants and the base itself, deduplicated.
    pub terms: BTreeSet<String>,
    /// The base key of the group.
    pub base: Option<String>,
}

impl Expansion {
    /// Whether `token` is this group's base form.
    pub fn is_base(&self, token: &str) -> bool {
        self.base.as_deref() == Some(token)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(term)
    }
}

/// Token to base-group index.
#[derive(Debug, Clone, Default)]
pub struct MorphologyDictionary {
    /// Groups in the order their base key first appeared in the source.
    groups: Vec<Arc<Expansion>>,
    /// Term -> indices into `groups`, in registration order.
    by_token: AHashMap<String, Vec<usize>>,
}

impl MorphologyDictionary {
    /// Build the dictionary from raw entries, normalizing every string.
    pub fn from_entries<N, I>(normalizer: &N, entries: I) -> Self
    where
        N: TextNormalizer + ?Sized,
        I: IntoIterator<Item = DictionaryEntry>,
    {
        // base key -> position in `members`
        let mut base_slots: AHashMap<String, usize> = AHashMap::new();
        let mut members: Vec<(String, BTreeSet<String>)> = Vec::new();

        for entry in entries {
            let surface = normalizer.normalize(&entry.surface);
            if surface.is_empty() {
                continue;
            }

            let base = match normalizer.normalize(&entry.base) {
                b if b.is_empty() => surface.clone(),
                b => b,
            };

            let slot = *base_slots.entry(base.clone()).or_insert_with(|| {
                members.push((base.clone(), BTreeSet::new()));
                members.len() - 1
            });

            let group = &mut members[slot].1;
            group.insert(surface);
            group.extend(
                entry
                    .variants
                    .iter()
                    .map(|v| normalizer.normalize(v))
                    .filter(|v| !v.is_empty()),
            );
            group.insert(base);
        }

        let mut by_token: AHashMap<String, Vec<usize>> = AHashMap::new();
        let groups: Vec<Arc<Expansion>> = members
            .into_iter()
            .enumerate()
            .map(|(idx, (base, terms))| {
                for term in &terms {
                    let slots = by_token.entry(term.clone()).or_default();
                    if !slots.contains(&idx) {
                        slots.push(idx);
                    }
                }
                Arc::new(Expansion {
                    terms,
                    base: Some(base),
                })
            })
            .collect();

        log::debug!(
            "Morphology dictionary built: {} groups, {} terms",
            groups.len(),
            by_token.len()
        );

        Self { groups, by_token }
    }

    /// Read the SQLite dictionary store at `path` and build the dictionary.
    pub fn open<N>(normalizer: &N, path: &Path) -> Result<Self>
    where
        N: TextNormalizer + ?Sized,
    {
        if !path.is_file() {
            return Err(LookupError::dictionary(format!(
                "dictionary store not found at {}",
                path.display()
            )));
        }

        let entries = store::read_entries(path)?;
        let dictionary = Self::from_entries(normalizer, entries);
        log::info!(
            "Loaded morphology dictionary from {}: {} groups",
            path.display(),
            dictionary.group_count()
        );
        Ok(dictionary)
    }

    /// Load the dictionary, degrading to `None` when the store is missing or
    /// unreadable. A missing dictionary only disables query expansion.
    pub fn load<N>(normalizer: &N, path: Option<&Path>) -> Option<Self>
    where
        N: TextNormalizer + ?Sized,
    {
        let path = path?;
        match Self::open(normalizer, path) {
            Ok(dictionary) => Some(dictionary),
            Err(e) => {
                log::warn!(
                    "Morphology dictionary unavailable ({}): {}",
                    path.display(),
                    e
                );
                None
            }
        }
    }

    /// Every group registered under each token, concatenated across tokens
    /// and deduplicated in first-occurrence order.
    pub fn expansions_for<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<Arc<Expansion>> {
        let mut seen = AHashSet::new();
        tokens
            .iter()
            .filter_map(|t| self.by_token.get(t.as_ref()))
            .flatten()
            .filter(|&&idx| seen.insert(idx))
            .map(|&idx| Arc::clone(&self.groups[idx]))
            .collect()
    }

    /// Disambiguate `token` to a single group.
    ///
    /// A group whose base is the token itself wins; otherwise the group with
    /// the most terms; among equally large groups the one registered first.
    pub fn expansion_for(&self, token: &str) -> Option<Arc<Expansion>> {
        let slots = self.by_token.get(token)?;

        let chosen = slots
            .iter()
            .map(|&idx| &self.groups[idx])
            .find(|group| group.is_base(token))
            .or_else(|| {
                slots
                    .iter()
                    .map(|&idx| &self.groups[idx])
                    // first of the largest: max_by_key would keep the last
                    .fold(None, |best: Option<&Arc<Expansion>>, group| match best {
                        Some(b) if b.len() >= group.len() => Some(b),
                        _ => Some(group),
                    })
            })?;

        Some(Arc::clone(chosen))
    }

    /// Whether `term` is registered under any group.
    pub fn contains(&self, term: &str) -> bool {
        self.by_token.contains_key(term)
    }

    /// Number of distinct registered terms.
    pub fn len(&self) -> usize {
        self.by_token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_token.is_empty()
    }

    /// Number of base groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::normalizer::normalize;

    fn norm(s: &str) -> String {
        normalize(s)
    }

    fn terms(e: &Expansion) -> Vec<&str> {
        e.terms.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_groups_by_normalized_base() {
        let dict = MorphologyDictionary::from_entries(
            &norm,
            vec![
                DictionaryEntry::new("ספרים", "ספר", ["ספרי"]),
                DictionaryEntry::new("ספרו", "סֵפֶר", Vec::<String>::new()),
            ],
        );

        assert_eq!(dict.group_count(), 1);
        let expansion = dict.expansion_for("ספרימ").unwrap();
        assert_eq!(expansion.base.as_deref(), Some("ספר"));
        assert_eq!(terms(&expansion), vec!["ספר", "ספרו", "ספרי", "ספרימ"]);
    }

    #[test]
    fn test_every_term_maps_to_whole_group() {
        let dict = MorphologyDictionary::from_entries(
            &norm,
            vec![DictionaryEntry::new("ברכות", "ברכה", ["ברכת", "ברכתו"])],
        );

        let group = dict.expansion_for("ברכה").unwrap();
        for term in &group.terms {
            let found = dict.expansions_for(&[term.as_str()]);
            assert_eq!(found.len(), 1);
            assert_eq!(*found[0], *group);
        }
    }

    #[test]
    fn test_empty_surface_is_skipped_and_empty_base_falls_back() {
        let dict = MorphologyDictionary::from_entries(
            &norm,
            vec![
                DictionaryEntry::new("  ", "ספר", ["ספרי"]),
                DictionaryEntry::new("תורה", "", ["תורת"]),
            ],
        );

        assert!(!dict.contains("ספרי"));
        let torah = dict.expansion_for("תורת").unwrap();
        assert_eq!(torah.base.as_deref(), Some("תורה"));
        assert!(torah.contains("תורה"));
    }

    #[test]
    fn test_token_equal_to_base_wins() {
        // "מלכ" is a surface of "מלכות" and also a base on its own
        let dict = MorphologyDictionary::from_entries(
            &norm,
            vec![
                DictionaryEntry::new("מלך", "מלכות", ["מלכי", "מלכיות", "מלכותא"]),
                DictionaryEntry::new("מלכים", "מלך", Vec::<String>::new()),
            ],
        );

        assert_eq!(dict.expansions_for(&["מלכ"]).len(), 2);
        for _ in 0..10 {
            let chosen = dict.expansion_for("מלכ").unwrap();
            assert_eq!(chosen.base.as_deref(), Some("מלכ"));
        }
    }

    #[test]
    fn test_largest_group_wins_without_base_match() {
        let dict = MorphologyDictionary::from_entries(
            &norm,
            vec![
                DictionaryEntry::new("דבר", "דיבור", Vec::<String>::new()),
                DictionaryEntry::new("דבר", "דברים", ["דברי", "דבריו"]),
            ],
        );

        let chosen = dict.expansion_for("דבר").unwrap();
        assert_eq!(chosen.base.as_deref(), Some("דברימ"));
    }

    #[test]
    fn test_equal_sized_groups_pick_first_registered() {
        let dict = MorphologyDictionary::from_entries(
            &norm,
            vec![
                DictionaryEntry::new("שם", "שמות", Vec::<String>::new()),
                DictionaryEntry::new("שם", "שמים", Vec::<String>::new()),
            ],
        );

        let chosen = dict.expansion_for("שמ").unwrap();
        assert_eq!(chosen.base.as_deref(), Some("שמות"));
    }

    #[test]
    fn test_unknown_token() {
        let dict = MorphologyDictionary::from_entries(&norm, Vec::new());
        assert!(dict.is_empty());
        assert!(dict.expansion_for("אין").is_none());
        assert!(dict.expansions_for(&["אין"]).is_empty());
    }

    #[test]
    fn test_expansions_for_dedups_across_tokens() {
        let dict = MorphologyDictionary::from_entries(
            &norm,
            vec![
                DictionaryEntry::new("ספרים", "ספר", ["ספרי"]),
                DictionaryEntry::new("בתים", "בית", Vec::<String>::new()),
            ],
        );

        let found = dict.expansions_for(&["ספרי", "בית", "ספר", "לא"]);
        let bases: Vec<_> = found.iter().map(|e| e.base.clone().unwrap()).collect();
        assert_eq!(bases, vec!["ספר".to_string(), "בית".to_string()]);
    }

    #[test]
    fn test_load_missing_store_is_absent() {
        let missing = Path::new("/nonexistent/dictionary.db");
        assert!(MorphologyDictionary::load(&norm, Some(missing)).is_none());
        assert!(MorphologyDictionary::load(&norm, None).is_none());
        assert!(matches!(
            MorphologyDictionary::open(&norm, missing),
            Err(LookupError::Dictionary(_))
        ));
    }
}
