pub const ENGLISH: &str = "en";

/// What the user wants a card list resolved against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolutionContext {
    pub target_set: Option<String>,
    pub target_lang: String,
    /// Sets always acceptable next to the target set, e.g. a core set.
    pub fallback_sets: Vec<String>,
}

impl ResolutionContext {
    pub fn new(target_set: Option<&str>, target_lang: &str) -> Self {
        ResolutionContext {
            target_set: target_set
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty()),
            target_lang: normalize_lang(target_lang),
            fallback_sets: Vec::new(),
        }
    }

    pub fn with_fallback_set(mut self, set: &str) -> Self {
        let set = set.trim().to_lowercase();
        if !set.is_empty() && !self.fallback_sets.contains(&set) {
            self.fallback_sets.push(set);
        }
        self
    }

    pub fn is_target_set(&self, set: &str) -> bool {
        self.target_set
            .as_deref()
            .map_or(false, |t| t.eq_ignore_ascii_case(set))
    }

    pub fn is_fallback_set(&self, set: &str) -> bool {
        self.fallback_sets.iter().any(|f| f.eq_ignore_ascii_case(set))
    }

    pub fn is_target_lang(&self, lang: &str) -> bool {
        self.target_lang.eq_ignore_ascii_case(lang)
    }

    pub fn targets_english(&self) -> bool {
        self.target_lang == ENGLISH
    }

    /// Target set plus fallback sets, without duplicates. Collapses to just
    /// the target when the target is itself a fallback set.
    pub fn priority_sets(&self) -> Vec<String> {
        let mut sets = Vec::new();
        if let Some(target) = &self.target_set {
            sets.push(target.clone());
        }
        for set in &self.fallback_sets {
            if !sets.contains(set) {
                sets.push(set.clone());
            }
        }
        sets
    }

    /// Target language and English.
    pub fn accepted_langs(&self) -> Vec<String> {
        let mut langs = vec![self.target_lang.clone()];
        if !self.targets_english() {
            langs.push(ENGLISH.to_string());
        }
        langs
    }
}

fn normalize_lang(lang: &str) -> String {
    let lang = lang.trim().to_lowercase();
    if lang.is_empty() {
        ENGLISH.to_string()
    } else {
        lang
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_sets_collapse_when_target_is_fallback() {
        let ctx = ResolutionContext::new(Some("M21"), "ja").with_fallback_set("m21");
        assert_eq!(ctx.priority_sets(), vec!["m21".to_string()]);

        let ctx = ResolutionContext::new(Some("neo"), "ja").with_fallback_set("m21");
        assert_eq!(ctx.priority_sets(), vec!["neo".to_string(), "m21".to_string()]);
    }

    #[test]
    fn accepted_langs_do_not_repeat_english() {
        assert_eq!(ResolutionContext::new(None, "EN").accepted_langs(), vec!["en"]);
        assert_eq!(
            ResolutionContext::new(None, "ja").accepted_langs(),
            vec!["ja", "en"]
        );
        assert_eq!(ResolutionContext::new(None, "").target_lang, "en");
    }

    #[test]
    fn blank_target_set_is_none() {
        let ctx = ResolutionContext::new(Some("  "), "ja");
        assert_eq!(ctx.target_set, None);
        assert!(ctx.priority_sets().is_empty());
    }
}
