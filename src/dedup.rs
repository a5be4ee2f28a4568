use crate::context::ResolutionContext;
use crate::printing::{IdentityKey, Printing};
use crate::scorer;
use std::collections::HashMap;

/// Merges results of overlapping queries for one search, keeping one
/// printing per abstract card in first-seen order.
///
/// The first printing seen for a card holds its slot. A later one replaces
/// it when it is in the target language and the holder is not, or when both
/// share a language and the newcomer has the lower collector number.
pub fn merge_search_results<I>(candidates: I, target_lang: &str) -> Vec<Printing>
where
    I: IntoIterator<Item = Printing>,
{
    let mut slots: HashMap<IdentityKey, usize> = HashMap::new();
    let mut merged: Vec<Printing> = Vec::new();

    for candidate in candidates {
        let key = candidate.identity();
        match slots.get(&key).copied() {
            None => {
                slots.insert(key, merged.len());
                merged.push(candidate);
            }
            Some(slot) => {
                if replaces(&merged[slot], &candidate, target_lang) {
                    merged[slot] = candidate;
                }
            }
        }
    }

    merged
}

fn replaces(holder: &Printing, candidate: &Printing, target_lang: &str) -> bool {
    let holder_in_target = holder.lang.eq_ignore_ascii_case(target_lang);
    let candidate_in_target = candidate.lang.eq_ignore_ascii_case(target_lang);
    if candidate_in_target && !holder_in_target {
        return true;
    }
    candidate.lang.eq_ignore_ascii_case(&holder.lang)
        && candidate.collector_rank() < holder.collector_rank()
}

/// The best printing among candidates gathered for a single name.
pub fn unify(candidates: &[Printing], ctx: &ResolutionContext) -> Option<Printing> {
    scorer::best_index(candidates, ctx).map(|i| candidates[i].clone())
}
