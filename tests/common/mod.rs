//! In-memory catalog that understands the query clauses the resolver emits.

#![allow(dead_code)]

use async_trait::async_trait;
use lazy_static::lazy_static;
use printing_resolver::printing::{CardIdentifier, CollectionResponse, Printing};
use printing_resolver::{CatalogClient, CatalogError};
use regex::Regex;
use std::sync::Mutex;
use tokio::time::Instant;

lazy_static! {
    static ref NAME: Regex = Regex::new(r#"name:"((?:[^"\\]|\\.)*)""#).unwrap();
    static ref SET: Regex = Regex::new(r"\bset:([A-Za-z0-9]+)").unwrap();
    static ref LANG: Regex = Regex::new(r"\blang:([A-Za-z-]+)").unwrap();
    static ref ORACLE: Regex = Regex::new(r"\boracle_id:([A-Za-z0-9_-]+)").unwrap();
    static ref CLAUSE: Regex = Regex::new(r"\S+[:=]\S+").unwrap();
}

#[derive(Clone, Debug)]
pub struct Dispatch {
    pub query: String,
    pub at: Instant,
}

pub struct FixtureCatalog {
    printings: Vec<Printing>,
    failures: Vec<(String, u16)>,
    log: Mutex<Vec<Dispatch>>,
}

impl FixtureCatalog {
    pub fn new(printings: Vec<Printing>) -> Self {
        FixtureCatalog {
            printings,
            failures: Vec::new(),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Queries containing `needle` answer with `status` instead of data.
    pub fn failing(mut self, needle: &str, status: u16) -> Self {
        self.failures.push((needle.to_string(), status));
        self
    }

    pub fn dispatched(&self) -> Vec<Dispatch> {
        self.log.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<String> {
        self.dispatched().into_iter().map(|d| d.query).collect()
    }

    fn record(&self, query: &str) {
        self.log.lock().unwrap().push(Dispatch {
            query: query.to_string(),
            at: Instant::now(),
        });
    }

    fn matches(query: &str, printing: &Printing) -> bool {
        let names: Vec<String> = NAME
            .captures_iter(query)
            .map(|c| c[1].replace("\\\"", "\""))
            .collect();
        let sets: Vec<String> = SET.captures_iter(query).map(|c| c[1].to_string()).collect();
        let langs: Vec<String> = LANG.captures_iter(query).map(|c| c[1].to_string()).collect();
        let oracles: Vec<String> = ORACLE.captures_iter(query).map(|c| c[1].to_string()).collect();

        let without_names = NAME.replace_all(query, " ");
        let without_clauses = CLAUSE.replace_all(&without_names, " ");
        let words: Vec<String> = without_clauses
            .split(|c: char| c.is_whitespace() || c == '(' || c == ')')
            .filter(|w| !w.is_empty() && *w != "OR")
            .map(|w| w.to_lowercase())
            .collect();

        let haystack = format!(
            "{} {}",
            printing.name.to_lowercase(),
            printing.printed_name.clone().unwrap_or_default().to_lowercase()
        );

        (names.is_empty() || names.iter().any(|n| printing.answers_to(n)))
            && (sets.is_empty() || sets.contains(&printing.set))
            && (langs.is_empty() || langs.contains(&printing.lang))
            && (oracles.is_empty()
                || printing
                    .oracle_id
                    .as_ref()
                    .map_or(false, |id| oracles.contains(id)))
            && words.iter().all(|w| haystack.contains(w.as_str()))
    }
}

#[async_trait]
impl CatalogClient for FixtureCatalog {
    async fn search(&self, query: &str) -> Result<Vec<Printing>, CatalogError> {
        self.record(query);
        if let Some((_, status)) = self.failures.iter().find(|(needle, _)| query.contains(needle.as_str())) {
            if *status == 404 {
                return Ok(Vec::new());
            }
            return Err(CatalogError::Status {
                code: *status,
                body: "fixture failure".to_string(),
            });
        }
        Ok(self
            .printings
            .iter()
            .filter(|p| Self::matches(query, p))
            .cloned()
            .collect())
    }

    async fn collection(
        &self,
        identifiers: &[CardIdentifier],
    ) -> Result<CollectionResponse, CatalogError> {
        self.record(&format!("collection:{}", identifiers.len()));
        let mut response = CollectionResponse::default();
        for identifier in identifiers {
            let found = self.printings.iter().find(|p| match identifier {
                CardIdentifier::Printing {
                    set,
                    collector_number,
                } => &p.set == set && &p.collector_number == collector_number,
                CardIdentifier::Name { name } => p.answers_to(name),
            });
            match found {
                Some(p) => response.data.push(p.clone()),
                None => response.not_found.push(identifier.clone()),
            }
        }
        Ok(response)
    }
}

pub fn printing(oracle: &str, name: &str, set: &str, lang: &str, number: &str) -> Printing {
    Printing {
        id: format!("{}-{}-{}", set, lang, number),
        oracle_id: Some(oracle.to_string()),
        name: name.to_string(),
        lang: lang.to_string(),
        set: set.to_string(),
        collector_number: number.to_string(),
        type_line: Some("Instant".to_string()),
        ..Default::default()
    }
}

pub fn localized(mut printing: Printing, printed_name: &str) -> Printing {
    printing.printed_name = Some(printed_name.to_string());
    printing
}

pub fn basic(printing: Printing) -> Printing {
    Printing {
        type_line: Some(format!("Basic Land — {}", printing.name)),
        ..printing
    }
}

pub fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
