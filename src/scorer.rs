//! Ranks a printing against what the user asked for.
//!
//! Tiers are separated by magnitude so a lower tier can never outweigh a
//! higher one: set match dominates language match, which dominates the
//! numbering and art tie-breaks.

use crate::context::{ResolutionContext, ENGLISH};
use crate::printing::Printing;

pub const TARGET_SET: i64 = 10_000;
pub const FALLBACK_SET: i64 = 5_000;
pub const TARGET_LANG: i64 = 1_000;
pub const ENGLISH_LANG: i64 = 500;
pub const ODD_SET_PENALTY: i64 = -100;
pub const NUMERIC_COLLECTOR: i64 = 50;
pub const FULL_ART_BASIC: i64 = 20;

const ODD_SET_TYPES: &[&str] = &["memorabilia", "promo", "token", "funny", "minigame", "box"];
const STANDARD_SET_CODE_LEN: usize = 3;

pub fn score(printing: &Printing, ctx: &ResolutionContext) -> i64 {
    let mut total = 0;

    if ctx.is_target_set(&printing.set) {
        total += TARGET_SET;
    } else if ctx.is_fallback_set(&printing.set) {
        total += FALLBACK_SET;
    }

    if ctx.is_target_lang(&printing.lang) {
        total += TARGET_LANG;
    } else if printing.lang.eq_ignore_ascii_case(ENGLISH) {
        total += ENGLISH_LANG;
    }

    if is_odd_set(printing) {
        total += ODD_SET_PENALTY;
    }

    if !printing.collector_number.is_empty()
        && printing.collector_number.chars().all(|c| c.is_ascii_digit())
    {
        total += NUMERIC_COLLECTOR;
    }

    if printing.full_art && printing.is_basic_land() {
        total += FULL_ART_BASIC;
    }

    total
}

fn is_odd_set(printing: &Printing) -> bool {
    let odd_type = printing
        .set_type
        .as_deref()
        .map_or(false, |t| ODD_SET_TYPES.contains(&t));
    odd_type || printing.oversized || printing.set.chars().count() > STANDARD_SET_CODE_LEN
}

/// Index of the highest scoring candidate; the earliest wins ties.
pub fn best_index(candidates: &[Printing], ctx: &ResolutionContext) -> Option<usize> {
    let mut best: Option<(usize, i64)> = None;
    for (i, candidate) in candidates.iter().enumerate() {
        let s = score(candidate, ctx);
        match best {
            Some((_, top)) if s <= top => {}
            _ => best = Some((i, s)),
        }
    }
    best.map(|(i, _)| i)
}
