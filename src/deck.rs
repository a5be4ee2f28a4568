use crate::printing::{normalize_name, CardIdentifier, Printing};
use crate::resolver::Resolution;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref DECK_LINE: Regex = Regex::new(r"^\s*(?:(\d{1,3})\s*[xX]?\s+)?(.+?)\s*$").unwrap();
    static ref PRINTING_LINE: Regex = Regex::new(r"^\s*([A-Za-z0-9]{2,6})\s+(\S+)\s*$").unwrap();
}

/// A line of the user's card list. Quantity is owned here; resolution only
/// fills in the printing.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DeckEntry {
    pub name: String,
    pub quantity: u32,
    pub printing: Option<Printing>,
}

impl DeckEntry {
    pub fn new(name: &str, quantity: u32) -> Self {
        DeckEntry {
            name: name.trim().to_string(),
            quantity,
            printing: None,
        }
    }
}

/// `"4 Lightning Bolt"`, `"4x Lightning Bolt"` or a bare name (quantity 1).
/// A quantity has at most three digits, so `"1996 World Champion"` is a name.
/// Blank lines and `#`/`//` comments give `None`.
pub fn parse_deck_line(line: &str) -> Option<DeckEntry> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("//") {
        return None;
    }
    let caps = DECK_LINE.captures(trimmed)?;
    let quantity = caps
        .get(1)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(1);
    let name = caps.get(2)?.as_str();
    if quantity == 0 {
        return None;
    }
    Some(DeckEntry::new(name, quantity))
}

/// Parses a whole list, folding repeated names into one entry.
pub fn parse_deck_list(text: &str) -> Vec<DeckEntry> {
    let mut entries: Vec<DeckEntry> = Vec::new();
    for entry in text.lines().filter_map(parse_deck_line) {
        let key = normalize_name(&entry.name);
        match entries.iter_mut().find(|e| normalize_name(&e.name) == key) {
            Some(existing) => existing.quantity += entry.quantity,
            None => entries.push(entry),
        }
    }
    entries
}

/// `"neo 123"` lines for the collection import.
pub fn parse_printing_line(line: &str) -> Option<CardIdentifier> {
    let caps = PRINTING_LINE.captures(line)?;
    Some(CardIdentifier::Printing {
        set: caps[1].to_lowercase(),
        collector_number: caps[2].to_string(),
    })
}

pub fn names(entries: &[DeckEntry]) -> Vec<String> {
    entries.iter().map(|e| e.name.clone()).collect()
}

/// Fills in resolved printings; entries without a match keep what they had.
/// Returns how many entries were updated.
pub fn apply_resolution(entries: &mut [DeckEntry], resolution: &Resolution) -> usize {
    let mut updated = 0;
    for entry in entries.iter_mut() {
        let found = resolution.resolved.get(&entry.name).or_else(|| {
            let key = normalize_name(&entry.name);
            resolution
                .resolved
                .iter()
                .find(|(name, _)| normalize_name(name) == key)
                .map(|(_, printing)| printing)
        });
        if let Some(printing) = found {
            entry.printing = Some(printing.clone());
            updated += 1;
        }
    }
    updated
}
