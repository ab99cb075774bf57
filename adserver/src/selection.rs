//! The weighted lottery.
//!
//! Raw proportional share is deliberately compressed: large-budget campaigns
//! are capped near [`SHARE_CEILING`] percent exposure per draw and tiny ones
//! are floored near the [`SHARE_FLOOR`]..[`SHARE_CEILING`] band, so bigger
//! spenders are favoured without crowding everyone else out. The reflection
//! formulas are non-linear and unbounded on purpose; selection odds depend
//! on reproducing them exactly.

use rand::Rng;

use primitives::{targeting, Campaign, Input};

const SHARE_FLOOR: i64 = 5;
const SHARE_CEILING: i64 = 20;

/// The campaigns a viewer can be served: active, within budget and
/// matching every configured filter.
pub fn eligible<'a>(campaigns: &'a [Campaign], input: &Input) -> Vec<&'a Campaign> {
    campaigns
        .iter()
        .filter(|campaign| {
            campaign.active
                && campaign.budget.is_available()
                && targeting::eval_all(campaign, input)
        })
        .collect()
}

/// `round(total / pool * 100)` in exact integer arithmetic.
fn raw_share(total: u128, pool: u128) -> i64 {
    ((total * 100 * 2 + pool) / (2 * pool)) as i64
}

/// Reflects shares above the ceiling below it and boosts shares below the
/// floor above it. A very large share can reflect into a negative percent;
/// a near-zero share can exceed the ceiling.
fn clamp_share(percent: i64) -> i64 {
    if percent > SHARE_CEILING {
        SHARE_CEILING - (percent - SHARE_CEILING)
    } else if percent < SHARE_FLOOR {
        SHARE_FLOOR + (2 * SHARE_FLOOR - percent)
    } else {
        percent
    }
}

/// Walks the eligible set in order, extending a cumulative `[start, end)`
/// interval by each campaign's post-clamp share, and returns the index
/// whose interval contains `draw`.
///
/// A negative share extends the interval backwards, which makes it
/// unmatchable; the walk skips it and continues. When the clamped shares do
/// not reach `draw` (they need not sum to 100), nothing wins. An all-zero
/// budget pool never wins either.
pub(crate) fn allocate(eligible: &[&Campaign], draw: i64) -> Option<usize> {
    let pool: u128 = eligible
        .iter()
        .map(|campaign| campaign.budget.total.to_u64() as u128)
        .sum();
    if pool == 0 {
        return None;
    }

    let mut start = 0_i64;
    let mut end = 0_i64;

    for (index, campaign) in eligible.iter().enumerate() {
        let percent = clamp_share(raw_share(campaign.budget.total.to_u64() as u128, pool));

        end += percent;
        if start < draw && draw <= end {
            return Some(index);
        }
        start += percent;
    }

    None
}

/// Filters the candidates and runs one lottery draw over them.
pub fn pick<'a>(campaigns: &'a [Campaign], input: &Input) -> Option<&'a Campaign> {
    let eligible = eligible(campaigns, input);
    if eligible.is_empty() {
        return None;
    }

    let draw: i64 = rand::thread_rng().gen_range(1..=100);

    allocate(&eligible, draw).map(|index| eligible[index])
}
