//! Builds query strings in the catalog's search grammar.
//!
//! Every query asks for one result per printing (`unique:prints`) so the
//! scorer and deduplicator see each candidate.

use crate::error::ResolveError;
use lazy_static::lazy_static;
use regex::Regex;

pub const UNIQUE_PRINTS: &str = "unique:prints";

lazy_static! {
    static ref SCOPE_CLAUSE: Regex =
        Regex::new(r"(?i)(^|\s|\()-?(set|s|e|edition|lang|language)[:=]\S+").unwrap();
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchFilters {
    /// Color letters, e.g. `"wu"`.
    pub colors: Option<String>,
    pub card_type: Option<String>,
    pub subtype: Option<String>,
    pub mana_value: Option<u32>,
    pub rarity: Option<String>,
    pub sets: Vec<String>,
    pub langs: Vec<String>,
}

impl SearchFilters {
    pub fn with_sets(mut self, sets: Vec<String>) -> Self {
        self.sets = sets;
        self
    }

    pub fn with_langs(mut self, langs: Vec<String>) -> Self {
        self.langs = langs;
        self
    }

    fn clauses(&self) -> Vec<String> {
        let mut clauses = Vec::new();
        if let Some(colors) = non_blank(&self.colors) {
            clauses.push(format!("c:{}", colors));
        }
        if let Some(card_type) = non_blank(&self.card_type) {
            clauses.push(format!("t:{}", quote_if_spaced(card_type)));
        }
        if let Some(subtype) = non_blank(&self.subtype) {
            clauses.push(format!("t:{}", quote_if_spaced(subtype)));
        }
        if let Some(mv) = self.mana_value {
            clauses.push(format!("mv={}", mv));
        }
        if let Some(rarity) = non_blank(&self.rarity) {
            clauses.push(format!("r:{}", rarity));
        }
        if let Some(clause) = any_of("set", &self.sets) {
            clauses.push(clause);
        }
        if let Some(clause) = any_of("lang", &self.langs) {
            clauses.push(clause);
        }
        clauses
    }
}

/// Free text plus filter clauses.
pub fn build_query(text: &str, filters: &SearchFilters) -> Result<String, ResolveError> {
    let mut clauses = Vec::new();
    let text = collapse_whitespace(text);
    if !text.is_empty() {
        clauses.push(text);
    }
    clauses.extend(filters.clauses());
    finish(clauses)
}

/// Query for text typed in another script. Set and language scoping already
/// embedded in the text is removed, along with any grouping, and a single
/// `lang:` clause for the target language is appended.
pub fn build_cross_language_query(
    text: &str,
    filters: &SearchFilters,
    target_lang: &str,
) -> Result<String, ResolveError> {
    let stripped = strip_scoping(text);
    let unscoped = SearchFilters {
        sets: Vec::new(),
        langs: vec![target_lang.to_string()],
        ..filters.clone()
    };
    if stripped.is_empty() {
        return Err(ResolveError::AmbiguousInput);
    }
    build_query(&stripped, &unscoped)
}

/// `name:"A" OR name:"B" ...` for one fetch batch.
pub fn name_batch_query(names: &[String], filters: &SearchFilters) -> Result<String, ResolveError> {
    let terms: Vec<String> = names
        .iter()
        .map(|n| collapse_whitespace(n))
        .filter(|n| !n.is_empty())
        .map(|n| format!("name:\"{}\"", n.replace('"', "\\\"")))
        .collect();
    batch_query(terms, filters)
}

/// `oracle_id:X OR oracle_id:Y ...` for re-querying known cards.
pub fn identity_batch_query(
    oracle_ids: &[String],
    filters: &SearchFilters,
) -> Result<String, ResolveError> {
    let terms: Vec<String> = oracle_ids
        .iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .map(|id| format!("oracle_id:{}", id))
        .collect();
    batch_query(terms, filters)
}

fn batch_query(terms: Vec<String>, filters: &SearchFilters) -> Result<String, ResolveError> {
    if terms.is_empty() {
        return Err(ResolveError::AmbiguousInput);
    }
    let mut clauses = vec![group(terms)];
    clauses.extend(filters.clauses());
    finish(clauses)
}

fn finish(clauses: Vec<String>) -> Result<String, ResolveError> {
    if clauses.is_empty() {
        return Err(ResolveError::AmbiguousInput);
    }
    let mut query = clauses.join(" ");
    query.push(' ');
    query.push_str(UNIQUE_PRINTS);
    Ok(query)
}

fn strip_scoping(text: &str) -> String {
    let without_scope = SCOPE_CLAUSE.replace_all(text, "$1");
    let without_groups: String = without_scope
        .chars()
        .filter(|c| *c != '(' && *c != ')')
        .collect();
    drop_dangling_or(&without_groups)
}

/// Drops `OR` left with nothing to join after clauses were removed: at
/// either end, or repeated. An `OR` between two terms stays.
fn drop_dangling_or(text: &str) -> String {
    let mut tokens: Vec<&str> = Vec::new();
    for token in text.split_whitespace() {
        if token == "OR" && tokens.last().map_or(true, |last| *last == "OR") {
            continue;
        }
        tokens.push(token);
    }
    while tokens.last() == Some(&"OR") {
        tokens.pop();
    }
    tokens.join(" ")
}

fn any_of(key: &str, values: &[String]) -> Option<String> {
    let terms: Vec<String> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| format!("{}:{}", key, v.to_lowercase()))
        .collect();
    if terms.is_empty() {
        None
    } else {
        Some(group(terms))
    }
}

fn group(terms: Vec<String>) -> String {
    if terms.len() == 1 {
        terms.into_iter().collect()
    } else {
        format!("({})", terms.join(" OR "))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn quote_if_spaced(value: &str) -> String {
    if value.contains(' ') {
        format!("\"{}\"", value)
    } else {
        value.to_string()
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omitted_filters_contribute_nothing() {
        let q = build_query("lightning bolt", &SearchFilters::default()).unwrap();
        assert_eq!(q, "lightning bolt unique:prints");
    }

    #[test]
    fn filters_append_in_order() {
        let filters = SearchFilters {
            colors: Some("r".to_string()),
            card_type: Some("creature".to_string()),
            subtype: Some("goblin".to_string()),
            mana_value: Some(2),
            rarity: Some("rare".to_string()),
            sets: vec!["NEO".to_string(), "m21".to_string()],
            langs: vec!["ja".to_string()],
        };
        let q = build_query("", &filters).unwrap();
        assert_eq!(
            q,
            "c:r t:creature t:goblin mv=2 r:rare (set:neo OR set:m21) lang:ja unique:prints"
        );
    }

    #[test]
    fn empty_query_is_rejected() {
        assert_eq!(
            build_query("   ", &SearchFilters::default()),
            Err(ResolveError::AmbiguousInput)
        );
        assert_eq!(
            name_batch_query(&["".to_string()], &SearchFilters::default()),
            Err(ResolveError::AmbiguousInput)
        );
    }

    #[test]
    fn cross_language_query_drops_embedded_scope() {
        let filters = SearchFilters {
            card_type: Some("creature".to_string()),
            sets: vec!["neo".to_string()],
            langs: vec!["en".to_string()],
            ..Default::default()
        };
        let q = build_cross_language_query("(set:neo OR s:m21) 稲妻 lang:en", &filters, "ja")
            .unwrap();
        assert_eq!(q, "稲妻 t:creature lang:ja unique:prints");
    }

    #[test]
    fn cross_language_query_keeps_user_or() {
        let q = build_cross_language_query("稲妻 OR ショック", &SearchFilters::default(), "ja")
            .unwrap();
        assert_eq!(q, "稲妻 OR ショック lang:ja unique:prints");

        let q = build_cross_language_query(
            "稲妻 (set:neo OR set:m21) OR ショック",
            &SearchFilters::default(),
            "ja",
        )
        .unwrap();
        assert_eq!(q, "稲妻 OR ショック lang:ja unique:prints");
    }

    #[test]
    fn cross_language_query_needs_text() {
        assert_eq!(
            build_cross_language_query("set:neo", &SearchFilters::default(), "ja"),
            Err(ResolveError::AmbiguousInput)
        );
    }

    #[test]
    fn name_batch_is_or_combined_and_escaped() {
        let names = vec!["Mountain".to_string(), "Say \"Hi\"".to_string()];
        let filters = SearchFilters::default().with_langs(vec!["ja".to_string(), "en".to_string()]);
        let q = name_batch_query(&names, &filters).unwrap();
        assert_eq!(
            q,
            r#"(name:"Mountain" OR name:"Say \"Hi\"") (lang:ja OR lang:en) unique:prints"#
        );
    }

    #[test]
    fn identity_batch_single_term_is_ungrouped() {
        let q = identity_batch_query(
            &["abc".to_string()],
            &SearchFilters::default().with_langs(vec!["ja".to_string()]),
        )
        .unwrap();
        assert_eq!(q, "oracle_id:abc lang:ja unique:prints");
    }
}
