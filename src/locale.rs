//! Script checks for localized text, and the lookup half of the locale patch.

use crate::api::CatalogClient;
use crate::context::ResolutionContext;
use crate::fetcher::CandidateFetcher;
use crate::printing::{LocalizedFields, Printing};
use crate::query::SearchFilters;
use crate::scorer;
use std::collections::HashMap;
use tracing::debug;

/// Writing systems a language's printed text is expected to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Script {
    Japanese,
    Korean,
    Chinese,
    Cyrillic,
    Hebrew,
    Arabic,
    Greek,
    Devanagari,
}

impl Script {
    /// `None` for languages written in Latin script.
    pub fn for_language(lang: &str) -> Option<Script> {
        match lang.to_lowercase().as_str() {
            "ja" => Some(Script::Japanese),
            "ko" => Some(Script::Korean),
            "zhs" | "zht" | "zh" | "zh-hans" | "zh-hant" => Some(Script::Chinese),
            "ru" | "uk" => Some(Script::Cyrillic),
            "he" => Some(Script::Hebrew),
            "ar" => Some(Script::Arabic),
            "grc" | "el" => Some(Script::Greek),
            "sa" | "hi" => Some(Script::Devanagari),
            _ => None,
        }
    }

    pub fn contains(self, c: char) -> bool {
        let cp = c as u32;
        match self {
            Script::Japanese => is_kana(cp) || is_han(cp),
            Script::Korean => is_hangul(cp),
            Script::Chinese => is_han(cp),
            Script::Cyrillic => (0x0400..=0x052F).contains(&cp),
            Script::Hebrew => (0x0590..=0x05FF).contains(&cp),
            Script::Arabic => (0x0600..=0x06FF).contains(&cp) || (0x0750..=0x077F).contains(&cp),
            Script::Greek => (0x0370..=0x03FF).contains(&cp) || (0x1F00..=0x1FFF).contains(&cp),
            Script::Devanagari => (0x0900..=0x097F).contains(&cp),
        }
    }

    /// Whether `text` is actually written in this script.
    pub fn is_written_in(self, text: &str) -> bool {
        text.chars().any(|c| self.contains(c))
    }
}

fn is_kana(cp: u32) -> bool {
    (0x3040..=0x30FF).contains(&cp) || (0xFF66..=0xFF9F).contains(&cp)
}

fn is_han(cp: u32) -> bool {
    (0x4E00..=0x9FFF).contains(&cp) || (0x3400..=0x4DBF).contains(&cp) || (0xF900..=0xFAFF).contains(&cp)
}

fn is_hangul(cp: u32) -> bool {
    (0xAC00..=0xD7AF).contains(&cp) || (0x1100..=0x11FF).contains(&cp) || (0x3130..=0x318F).contains(&cp)
}

/// True when the text has a letter outside the Latin ranges.
pub fn contains_non_latin(text: &str) -> bool {
    text.chars()
        .any(|c| c.is_alphabetic() && (c as u32) > 0x024F && !(0x1E00..=0x1EFF).contains(&(c as u32)))
}

/// Whether a resolved printing still lacks properly localized text.
pub fn needs_localization(printing: &Printing, script: Script) -> bool {
    match printing.printed_name.as_deref() {
        Some(name) => !script.is_written_in(name),
        None => true,
    }
}

/// Looks up localized text for already-resolved cards by abstract identity.
pub struct LocalePatcher<'f, 'c, C: CatalogClient + ?Sized> {
    fetcher: &'f CandidateFetcher<'c, C>,
}

impl<'f, 'c, C: CatalogClient + ?Sized> LocalePatcher<'f, 'c, C> {
    pub fn new(fetcher: &'f CandidateFetcher<'c, C>) -> Self {
        LocalePatcher { fetcher }
    }

    /// Localized fields per identity. A card is only included when a printing
    /// with the same identity has text really written in the target script.
    pub async fn patch(
        &self,
        oracle_ids: &[String],
        ctx: &ResolutionContext,
    ) -> HashMap<String, LocalizedFields> {
        let script = match Script::for_language(&ctx.target_lang) {
            Some(script) => script,
            None => return HashMap::new(),
        };
        let filters = SearchFilters::default().with_langs(vec![ctx.target_lang.clone()]);
        let candidates = self.fetcher.fetch_by_identity(oracle_ids, &filters).await;

        let mut patches = HashMap::new();
        for (id, printings) in candidates {
            let localized: Vec<Printing> = printings
                .into_iter()
                .filter(|p| p.oracle_id.as_deref() == Some(id.as_str()))
                .filter(|p| !needs_localization(p, script))
                .collect();
            if let Some(i) = scorer::best_index(&localized, ctx) {
                debug!(oracle_id = %id, printed_name = ?localized[i].printed_name, "localized text found");
                patches.insert(id, localized[i].localized_fields());
            }
        }
        patches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin_languages_have_no_script() {
        assert_eq!(Script::for_language("en"), None);
        assert_eq!(Script::for_language("fr"), None);
        assert_eq!(Script::for_language("JA"), Some(Script::Japanese));
        assert_eq!(Script::for_language("zhs"), Some(Script::Chinese));
    }

    #[test]
    fn script_membership() {
        assert!(Script::Japanese.is_written_in("稲妻"));
        assert!(Script::Japanese.is_written_in("ショック"));
        assert!(!Script::Japanese.is_written_in("Lightning Bolt"));
        assert!(Script::Korean.is_written_in("번개"));
        assert!(!Script::Korean.is_written_in("稲妻"));
        assert!(Script::Cyrillic.is_written_in("Молния"));
    }

    #[test]
    fn detects_non_latin_input() {
        assert!(contains_non_latin("稲妻"));
        assert!(contains_non_latin("Молния"));
        assert!(!contains_non_latin("Forêt"));
        assert!(!contains_non_latin("Lim-Dûl's Vault"));
        assert!(!contains_non_latin("set:neo 1"));
    }

    #[test]
    fn printed_name_in_wrong_script_needs_localization() {
        let mut p = Printing {
            name: "Lightning Bolt".to_string(),
            ..Default::default()
        };
        assert!(needs_localization(&p, Script::Japanese));
        p.printed_name = Some("Lightning Bolt".to_string());
        assert!(needs_localization(&p, Script::Japanese));
        p.printed_name = Some("稲妻".to_string());
        assert!(!needs_localization(&p, Script::Japanese));
    }
}
