//! Synonym-based query expansion

use std::collections::HashSet;

use once_cell::sync::Lazy;

/// Built-in operating-room vocabulary: canonical term -> interchangeable forms
const BUILTIN_SYNONYMS: &[(&str, &[&str])] = &[
    (
        "수술 준비",
        &["수술 세팅", "수술준비", "수술세팅", "세팅", "준비"],
    ),
    ("장비", &["기구", "물품"]),
    ("방법", &["과정", "절차"]),
    ("TUC", &["Tuc", "tuc", "경요도", "요도절제술"]),
    (
        "사용하는",
        &[
            "필요한",
            "필요한 장비",
            "필요한 물품",
            "필요한 기구",
            "필요한 것",
            "사용하는 장비",
        ],
    ),
];

static BUILTIN_TABLE: Lazy<SynonymTable> = Lazy::new(|| {
    SynonymTable::new(BUILTIN_SYNONYMS.iter().map(|(term, syns)| {
        (
            (*term).to_string(),
            syns.iter().map(|s| (*s).to_string()).collect::<Vec<_>>(),
        )
    }))
});

/// Ordered mapping from a canonical term to its synonyms.
///
/// Built once and never mutated. Iteration follows construction order, which
/// fixes the order of expanded variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymTable {
    entries: Vec<(String, Vec<String>)>,
}

impl SynonymTable {
    /// Build a table; empty terms and empty synonyms are discarded
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<S>)>,
        S: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(term, syns)| {
                let syns: Vec<String> = syns
                    .into_iter()
                    .map(|s| -> String { s.into() })
                    .filter(|s| !s.is_empty())
                    .collect();
                let term: String = term.into();
                (term, syns)
            })
            .filter(|(term, _)| !term.is_empty())
            .collect();
        Self { entries }
    }

    /// Shared instance of the built-in table
    pub fn builtin() -> &'static Self {
        &BUILTIN_TABLE
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(t, s)| (t.as_str(), s.as_slice()))
    }
}

impl Default for SynonymTable {
    fn default() -> Self {
        BUILTIN_TABLE.clone()
    }
}

/// Expand `query` into synonym-substituted variants.
///
/// The first element is always `query` itself, followed by newly discovered
/// variants in table order, without duplicates. Each substitution replaces
/// only the first occurrence and variants are not expanded again, so the
/// output is bounded by terms x synonyms.
pub fn expand(query: &str, table: &SynonymTable) -> Vec<String> {
    let mut variants = Vec::new();
    let mut seen = HashSet::new();
    let mut push = |v: String| {
        if seen.insert(v.clone()) {
            variants.push(v);
        }
    };
    push(query.to_string());

    for (term, synonyms) in table.iter() {
        if query.contains(term) {
            for syn in synonyms.iter().filter(|s| !query.contains(s.as_str())) {
                push(query.replacen(term, syn, 1));
            }
        }

        for syn in synonyms.iter().filter(|s| query.contains(s.as_str())) {
            if !query.contains(term) {
                push(query.replacen(syn.as_str(), term, 1));
            }
            for other in synonyms
                .iter()
                .filter(|o| *o != syn && !query.contains(o.as_str()))
            {
                push(query.replacen(syn.as_str(), other, 1));
            }
        }
    }

    variants
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, &[&str])]) -> SynonymTable {
        SynonymTable::new(entries.iter().map(|(t, s)| (*t, s.to_vec())))
    }

    #[test]
    fn test_query_always_first() {
        let builtin = SynonymTable::default();
        for q in ["", "무관한 질문", "TUC 수술 준비", "tuc"] {
            let variants = expand(q, &builtin);
            assert_eq!(variants[0], q);
        }
    }

    #[test]
    fn test_no_expansion_without_terms() {
        let variants = expand("봉합사 종류", &SynonymTable::default());
        assert_eq!(variants, vec!["봉합사 종류".to_string()]);
    }

    #[test]
    fn test_synonym_to_canonical() {
        let variants = expand("TUC 세팅", &SynonymTable::default());
        assert!(variants.contains(&"TUC 수술 준비".to_string()));
        assert!(variants.contains(&"TUC 준비".to_string()));
        assert!(variants.contains(&"TUC 수술 세팅".to_string()));
        assert!(variants.contains(&"tuc 세팅".to_string()));
    }

    #[test]
    fn test_canonical_to_synonyms() {
        let t = table(&[("장비", &["기구", "물품"])]);
        let variants = expand("TUC 장비", &t);
        assert_eq!(variants, vec!["TUC 장비", "TUC 기구", "TUC 물품"]);
    }

    #[test]
    fn test_synonym_to_sibling_synonyms() {
        let t = table(&[("방법", &["과정", "절차"])]);
        let variants = expand("세척 과정", &t);
        assert_eq!(variants, vec!["세척 과정", "세척 방법", "세척 절차"]);
    }

    #[test]
    fn test_replaces_first_occurrence_only() {
        let t = table(&[("장비", &["기구"])]);
        let variants = expand("장비 그리고 장비", &t);
        assert_eq!(variants, vec!["장비 그리고 장비", "기구 그리고 장비"]);
    }

    #[test]
    fn test_present_synonyms_not_substituted_in() {
        let t = table(&[("장비", &["기구", "물품"])]);
        let variants = expand("장비 기구", &t);
        // 물품 is new; 기구 is already present
        assert!(variants.contains(&"물품 기구".to_string()));
        assert!(!variants.contains(&"기구 기구".to_string()));
        // 기구 -> 물품 sibling substitution
        assert!(variants.contains(&"장비 물품".to_string()));
    }

    #[test]
    fn test_deduplicated() {
        let variants = expand("TUC 수술 준비 방법", &SynonymTable::default());
        let unique: HashSet<_> = variants.iter().collect();
        assert_eq!(unique.len(), variants.len());
    }

    #[test]
    fn test_expansion_is_bounded() {
        let builtin = SynonymTable::default();
        let max_per_entry: usize = builtin
            .iter()
            .map(|(_, s)| s.len() + s.len() * s.len())
            .sum();
        let variants = expand("tuc 수술 준비에 사용하는 장비 방법", &builtin);
        assert!(variants.len() <= 1 + max_per_entry);
    }

    #[test]
    fn test_empty_synonyms_discarded() {
        let t = table(&[("장비", &["", "기구"]), ("", &["x"])]);
        assert_eq!(t.len(), 1);
        assert_eq!(t.iter().next().unwrap().1, ["기구".to_string()]);
    }

    #[test]
    fn test_builtin_shared() {
        assert_eq!(SynonymTable::builtin().len(), 5);
        assert_eq!(SynonymTable::builtin(), &SynonymTable::default());
    }
}
