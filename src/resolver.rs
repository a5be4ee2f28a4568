//! Resolution of requested card names to concrete printings.
//!
//! Deck lists go through a fixed sequence of phases. Each phase only looks
//! at names still unresolved, except the locale patch, which is the single
//! override phase and may rewrite localized text of names already resolved.

use crate::api::CatalogClient;
use crate::context::ResolutionContext;
use crate::dedup::{merge_search_results, unify};
use crate::error::ResolveError;
use crate::fetcher::{CandidateFetcher, FetchConfig};
use crate::lands::canonical_basic_land;
use crate::locale::{contains_non_latin, needs_localization, LocalePatcher, Script};
use crate::printing::{normalize_name, LocalizedFields, Printing};
use crate::query::{build_cross_language_query, build_query, SearchFilters};
use futures::future::join;
use std::collections::{HashMap, HashSet};
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    BasicLands,
    PriorityBatch,
    FallbackBatch,
    LocalePatch,
}

impl Phase {
    pub const PIPELINE: [Phase; 4] = [
        Phase::BasicLands,
        Phase::PriorityBatch,
        Phase::FallbackBatch,
        Phase::LocalePatch,
    ];

    /// Override phases may touch names that are already resolved, and then
    /// only their localized text.
    pub fn is_override_phase(self) -> bool {
        matches!(self, Phase::LocalePatch)
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::BasicLands => "basic_lands",
            Phase::PriorityBatch => "priority_batch",
            Phase::FallbackBatch => "fallback_batch",
            Phase::LocalePatch => "locale_patch",
        }
    }
}

/// Requested name to the printing chosen for it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolutionMap {
    entries: HashMap<String, Printing>,
}

impl ResolutionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Printing> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Printing)> {
        self.entries.iter()
    }

    /// Stores the winner for a name. A name already resolved keeps its
    /// printing; returns whether anything was stored.
    pub fn record(&mut self, phase: Phase, name: &str, printing: Printing) -> bool {
        if self.entries.contains_key(name) {
            return false;
        }
        debug!(
            phase = phase.name(),
            name,
            set = %printing.set,
            lang = %printing.lang,
            collector_number = %printing.collector_number,
            "resolved"
        );
        self.entries.insert(name.to_string(), printing);
        true
    }

    /// Replaces localized text of an already-resolved name. Only override
    /// phases may do this.
    pub fn overlay(&mut self, phase: Phase, name: &str, fields: &LocalizedFields) -> bool {
        if !phase.is_override_phase() {
            return false;
        }
        match self.entries.get_mut(name) {
            Some(printing) => {
                let patched = printing.with_localized(fields);
                let changed = patched != *printing;
                *printing = patched;
                changed
            }
            None => false,
        }
    }

    pub fn into_inner(self) -> HashMap<String, Printing> {
        self.entries
    }
}

impl From<HashMap<String, Printing>> for ResolutionMap {
    fn from(entries: HashMap<String, Printing>) -> Self {
        ResolutionMap { entries }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhaseReport {
    pub phase: Phase,
    /// Names that got a printing, or had their text patched, in this phase.
    pub changed: usize,
    pub unresolved_after: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    pub resolved: HashMap<String, Printing>,
    /// Names without any printing, in request order.
    pub unresolved: Vec<String>,
    pub reports: Vec<PhaseReport>,
}

impl Resolution {
    pub fn not_found_count(&self) -> usize {
        self.unresolved.len()
    }
}

/// Runs searches and deck-list resolution against a catalog client.
pub struct Resolver<C: CatalogClient> {
    client: C,
    fetch: FetchConfig,
}

impl<C: CatalogClient> Resolver<C> {
    pub fn new(client: C, fetch: FetchConfig) -> Self {
        Resolver { client, fetch }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn fetcher(&self) -> CandidateFetcher<'_, C> {
        CandidateFetcher::new(&self.client, self.fetch.clone())
    }

    /// One search: the query as typed plus, for text in another script, a
    /// bridge lookup through the target language. Both run concurrently and
    /// are merged to one printing per card.
    #[instrument(skip(self, filters, ctx), fields(lang = %ctx.target_lang))]
    pub async fn resolve_search(
        &self,
        text: &str,
        filters: &SearchFilters,
        ctx: &ResolutionContext,
    ) -> Result<Vec<Printing>, ResolveError> {
        let primary = build_query(text, filters)?;
        let fetcher = self.fetcher();

        let bridge = if contains_non_latin(text) && !ctx.targets_english() {
            build_cross_language_query(text, filters, &ctx.target_lang).ok()
        } else {
            None
        };

        let candidates = match bridge {
            Some(bridge) => {
                let (primary_hits, bridge_hits) = join(
                    fetcher.search(&primary),
                    self.bridge_search(&fetcher, &bridge, filters, ctx),
                )
                .await;
                primary_hits.into_iter().chain(bridge_hits).collect::<Vec<_>>()
            }
            None => fetcher.search(&primary).await,
        };

        let merged = merge_search_results(candidates, &ctx.target_lang);
        info!(found = merged.len(), "search resolved");
        Ok(merged)
    }

    async fn bridge_search(
        &self,
        fetcher: &CandidateFetcher<'_, C>,
        query: &str,
        filters: &SearchFilters,
        ctx: &ResolutionContext,
    ) -> Vec<Printing> {
        let hits = fetcher.search(query).await;
        let mut ids: Vec<String> = Vec::new();
        for hit in &hits {
            if let Some(id) = &hit.oracle_id {
                if !ids.contains(id) {
                    ids.push(id.clone());
                }
            }
        }
        if ids.is_empty() {
            return hits;
        }

        sleep(self.fetch.batch_delay).await;
        let scoped = filters.clone().with_langs(ctx.accepted_langs());
        let mut by_id = fetcher.fetch_by_identity(&ids, &scoped).await;
        let mut bridged = hits;
        for id in &ids {
            if let Some(printings) = by_id.remove(id) {
                bridged.extend(printings);
            }
        }
        bridged
    }

    /// Resolves every requested name it can. Never fails: names with no
    /// printing end up in `unresolved`.
    #[instrument(skip(self, names, ctx), fields(names = names.len(), lang = %ctx.target_lang))]
    pub async fn resolve_deck_list(&self, names: &[String], ctx: &ResolutionContext) -> Resolution {
        let requested = normalize_requests(names);
        let fetcher = self.fetcher();
        let mut map = ResolutionMap::new();
        let mut reports = Vec::new();
        let mut dispatched = false;

        for phase in Phase::PIPELINE {
            let changed = match phase {
                Phase::BasicLands => {
                    self.basic_lands(&fetcher, &requested, ctx, &mut map, &mut dispatched)
                        .await
                }
                Phase::PriorityBatch => {
                    let filters = SearchFilters::default()
                        .with_sets(ctx.priority_sets())
                        .with_langs(ctx.accepted_langs());
                    self.batch_phase(
                        phase,
                        &fetcher,
                        &requested,
                        &filters,
                        ctx,
                        &mut map,
                        &mut dispatched,
                    )
                    .await
                }
                Phase::FallbackBatch => {
                    let filters = SearchFilters::default().with_langs(ctx.accepted_langs());
                    self.batch_phase(
                        phase,
                        &fetcher,
                        &requested,
                        &filters,
                        ctx,
                        &mut map,
                        &mut dispatched,
                    )
                    .await
                }
                Phase::LocalePatch => {
                    self.locale_patch(&fetcher, ctx, &mut map, &mut dispatched).await
                }
            };
            let unresolved_after = unresolved(&requested, &map);
            info!(
                phase = phase.name(),
                changed,
                unresolved = unresolved_after.len(),
                "phase finished"
            );
            reports.push(PhaseReport {
                phase,
                changed,
                unresolved_after,
            });
        }

        let unresolved = unresolved(&requested, &map);
        if !unresolved.is_empty() {
            warn!(count = unresolved.len(), "cards not found");
        }
        Resolution {
            resolved: map.into_inner(),
            unresolved,
            reports,
        }
    }

    /// Runs only the locale patch over an existing map. Applying it again to
    /// its own output changes nothing.
    pub async fn apply_locale_patch(&self, map: &mut ResolutionMap, ctx: &ResolutionContext) -> usize {
        let mut dispatched = false;
        self.locale_patch(&self.fetcher(), ctx, map, &mut dispatched).await
    }

    async fn throttle(&self, dispatched: &mut bool) {
        if *dispatched {
            sleep(self.fetch.batch_delay).await;
        }
        *dispatched = true;
    }

    async fn basic_lands(
        &self,
        fetcher: &CandidateFetcher<'_, C>,
        requested: &[String],
        ctx: &ResolutionContext,
        map: &mut ResolutionMap,
        dispatched: &mut bool,
    ) -> usize {
        let lands: Vec<(&String, &'static str)> = requested
            .iter()
            .filter(|name| !map.contains(name))
            .filter_map(|name| canonical_basic_land(name).map(|canonical| (name, canonical)))
            .collect();
        if lands.is_empty() {
            return 0;
        }

        let mut canonical: Vec<String> = Vec::new();
        for (_, land) in &lands {
            if !canonical.iter().any(|c| c == land) {
                canonical.push(land.to_string());
            }
        }

        let filters = SearchFilters::default()
            .with_sets(ctx.priority_sets())
            .with_langs(ctx.accepted_langs());
        self.throttle(dispatched).await;
        let candidates = fetcher.fetch_batch(&canonical, &filters).await;

        let mut changed = 0;
        for (name, land) in lands {
            let winner = candidates.get(land).and_then(|list| unify(list, ctx));
            if let Some(printing) = winner {
                if map.record(Phase::BasicLands, name, printing) {
                    changed += 1;
                }
            }
        }
        changed
    }

    #[allow(clippy::too_many_arguments)]
    async fn batch_phase(
        &self,
        phase: Phase,
        fetcher: &CandidateFetcher<'_, C>,
        requested: &[String],
        filters: &SearchFilters,
        ctx: &ResolutionContext,
        map: &mut ResolutionMap,
        dispatched: &mut bool,
    ) -> usize {
        let pending = unresolved(requested, map);
        if pending.is_empty() {
            return 0;
        }

        self.throttle(dispatched).await;
        let candidates = fetcher.fetch_batch(&pending, filters).await;

        let mut changed = 0;
        for name in &pending {
            let winner = candidates.get(name).and_then(|list| unify(list, ctx));
            if let Some(printing) = winner {
                if map.record(phase, name, printing) {
                    changed += 1;
                }
            }
        }
        changed
    }

    async fn locale_patch(
        &self,
        fetcher: &CandidateFetcher<'_, C>,
        ctx: &ResolutionContext,
        map: &mut ResolutionMap,
        dispatched: &mut bool,
    ) -> usize {
        let script = match Script::for_language(&ctx.target_lang) {
            Some(script) => script,
            None => return 0,
        };

        let mut targets: Vec<(String, String)> = map
            .iter()
            .filter(|(_, printing)| needs_localization(printing, script))
            .filter_map(|(name, printing)| printing.oracle_id.clone().map(|id| (name.clone(), id)))
            .collect();
        if targets.is_empty() {
            return 0;
        }
        targets.sort();

        let mut ids: Vec<String> = Vec::new();
        let mut seen = HashSet::new();
        for (_, id) in &targets {
            if seen.insert(id.clone()) {
                ids.push(id.clone());
            }
        }

        self.throttle(dispatched).await;
        let patches = LocalePatcher::new(fetcher).patch(&ids, ctx).await;

        let mut changed = 0;
        for (name, id) in &targets {
            if let Some(fields) = patches.get(id) {
                if map.overlay(Phase::LocalePatch, name, fields) {
                    changed += 1;
                }
            }
        }
        changed
    }
}

/// Trimmed, non-empty names with case-insensitive duplicates removed; the
/// first spelling is kept.
pub fn normalize_requests(names: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut requested = Vec::new();
    for name in names {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            warn!("skipping blank card name");
            continue;
        }
        if seen.insert(normalize_name(trimmed)) {
            requested.push(trimmed.to_string());
        }
    }
    requested
}

fn unresolved(requested: &[String], map: &ResolutionMap) -> Vec<String> {
    requested
        .iter()
        .filter(|name| !map.contains(name))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn printing(set: &str, number: &str) -> Printing {
        Printing {
            id: format!("{}-{}", set, number),
            oracle_id: Some("o".to_string()),
            name: "Shock".to_string(),
            set: set.to_string(),
            lang: "en".to_string(),
            collector_number: number.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn only_locale_patch_overrides() {
        let overriding: Vec<Phase> = Phase::PIPELINE
            .iter()
            .copied()
            .filter(|p| p.is_override_phase())
            .collect();
        assert_eq!(overriding, vec![Phase::LocalePatch]);
    }

    #[test]
    fn record_never_replaces_a_resolved_name() {
        let mut map = ResolutionMap::new();
        assert!(map.record(Phase::PriorityBatch, "Shock", printing("neo", "1")));
        assert!(!map.record(Phase::FallbackBatch, "Shock", printing("m21", "2")));
        assert!(!map.record(Phase::LocalePatch, "Shock", printing("m21", "2")));
        assert_eq!(map.get("Shock").unwrap().set, "neo");
    }

    #[test]
    fn overlay_changes_text_only_and_only_in_override_phase() {
        let mut map = ResolutionMap::new();
        map.record(Phase::PriorityBatch, "Shock", printing("neo", "1"));
        let fields = LocalizedFields {
            printed_name: Some("ショック".to_string()),
            ..Default::default()
        };

        assert!(!map.overlay(Phase::FallbackBatch, "Shock", &fields));
        assert_eq!(map.get("Shock").unwrap().printed_name, None);

        assert!(map.overlay(Phase::LocalePatch, "Shock", &fields));
        let patched = map.get("Shock").unwrap();
        assert_eq!(patched.printed_name.as_deref(), Some("ショック"));
        assert_eq!((patched.set.as_str(), patched.collector_number.as_str()), ("neo", "1"));

        assert!(!map.overlay(Phase::LocalePatch, "Shock", &fields));
        assert!(!map.overlay(Phase::LocalePatch, "Missing", &fields));
    }

    #[test]
    fn requests_are_trimmed_and_deduplicated() {
        let names: Vec<String> = ["Shock", " shock ", "", "  ", "Mountain"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(normalize_requests(&names), vec!["Shock", "Mountain"]);
    }
}
