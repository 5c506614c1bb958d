//! Trade matching — pair buy and sell legs sharing a trade reference.
//!
//! Inner-join semantics on `trade_ref` with an explicit cardinality check:
//! a reference needs exactly one leg per side. References with one side
//! missing are reported as `Unmatched`; references with several legs on a
//! side are reported as `DuplicateLeg` (or merged, under
//! `DuplicatePolicy::MergePartialFills`). Neither case aborts the run.
//!
//! Pairs come out in the order their buy leg first appears in the input.

use crate::domain::{LegPair, RowNumber, Side, TradeLeg, TradeRef};
use crate::error::MatchIssue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// What to do with a reference that has more than one leg on a side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Report the reference as `DuplicateLeg` and exclude it.
    #[default]
    Reject,
    /// Treat same-side legs as partial fills and merge them before pairing.
    #[serde(alias = "merge")]
    MergePartialFills,
}

/// Result of matching a batch of legs.
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    pub pairs: Vec<LegPair>,
    pub issues: Vec<MatchIssue>,
}

impl MatchOutcome {
    pub fn unmatched(&self) -> impl Iterator<Item = &MatchIssue> {
        self.issues
            .iter()
            .filter(|i| matches!(i, MatchIssue::Unmatched { .. }))
    }

    pub fn duplicates(&self) -> impl Iterator<Item = &MatchIssue> {
        self.issues
            .iter()
            .filter(|i| matches!(i, MatchIssue::DuplicateLeg { .. }))
    }
}

#[derive(Default)]
struct RefGroup {
    buys: Vec<TradeLeg>,
    sells: Vec<TradeLeg>,
    first_buy: Option<usize>,
}

/// Pair legs on `trade_ref`.
pub fn match_legs(legs: Vec<TradeLeg>, policy: DuplicatePolicy) -> MatchOutcome {
    let mut order: Vec<TradeRef> = Vec::new();
    let mut groups: HashMap<TradeRef, RefGroup> = HashMap::new();

    for (pos, leg) in legs.into_iter().enumerate() {
        let group = groups.entry(leg.trade_ref.clone()).or_insert_with(|| {
            order.push(leg.trade_ref.clone());
            RefGroup::default()
        });
        match leg.side {
            Side::Buy => {
                group.first_buy.get_or_insert(pos);
                group.buys.push(leg);
            }
            Side::Sell => group.sells.push(leg),
        }
    }

    let mut keyed: Vec<(usize, LegPair)> = Vec::new();
    let mut issues = Vec::new();

    for trade_ref in order {
        let Some(group) = groups.remove(&trade_ref) else {
            continue;
        };
        match pair_group(trade_ref, group, policy) {
            Ok(pair) => keyed.push(pair),
            Err(mut found) => issues.append(&mut found),
        }
    }

    keyed.sort_by_key(|(pos, _)| *pos);
    let pairs: Vec<LegPair> = keyed.into_iter().map(|(_, p)| p).collect();

    let unmatched = issues
        .iter()
        .filter(|i| matches!(i, MatchIssue::Unmatched { .. }))
        .count();
    if unmatched > 0 {
        warn!(unmatched, "trade references with a missing side");
    }
    let duplicates = issues.len() - unmatched;
    if duplicates > 0 {
        warn!(duplicates, "trade references with duplicate legs excluded");
    }
    debug!(pairs = pairs.len(), "legs matched");

    MatchOutcome { pairs, issues }
}

fn pair_group(
    trade_ref: TradeRef,
    group: RefGroup,
    policy: DuplicatePolicy,
) -> Result<(usize, LegPair), Vec<MatchIssue>> {
    let RefGroup {
        buys,
        sells,
        first_buy,
    } = group;

    if buys.is_empty() || sells.is_empty() {
        let (side, legs) = if buys.is_empty() {
            (Side::Sell, &sells)
        } else {
            (Side::Buy, &buys)
        };
        return Err(vec![MatchIssue::Unmatched {
            trade_ref,
            side,
            rows: rows_of(legs),
        }]);
    }

    let (buy, sell) = match policy {
        DuplicatePolicy::Reject => {
            let mut found = Vec::new();
            for (side, legs) in [(Side::Buy, &buys), (Side::Sell, &sells)] {
                if legs.len() > 1 {
                    found.push(MatchIssue::DuplicateLeg {
                        trade_ref: trade_ref.clone(),
                        side,
                        rows: rows_of(legs),
                    });
                }
            }
            if !found.is_empty() {
                return Err(found);
            }
            let buy = buys.into_iter().next();
            let sell = sells.into_iter().next();
            match (buy, sell) {
                (Some(b), Some(s)) => (b, s),
                _ => return Err(Vec::new()),
            }
        }
        DuplicatePolicy::MergePartialFills => {
            match (merge_fills(buys), merge_fills(sells)) {
                (Some(b), Some(s)) => (b, s),
                _ => return Err(Vec::new()),
            }
        }
    };

    Ok((
        first_buy.unwrap_or(usize::MAX),
        LegPair {
            trade_ref,
            buy,
            sell,
        },
    ))
}

/// Merge same-side fills into one leg.
///
/// Quantity and costs are summed and price is quantity-weighted. A buy
/// keeps its earliest fill time, a sell its latest, so the merged trade
/// spans the whole position.
fn merge_fills(fills: Vec<TradeLeg>) -> Option<TradeLeg> {
    let mut iter = fills.into_iter();
    let mut merged = iter.next()?;
    let mut notional = merged.price * merged.quantity;

    for fill in iter {
        notional += fill.price * fill.quantity;
        merged.quantity += fill.quantity;
        merged.brokerage += fill.brokerage;
        merged.other_charges += fill.other_charges;
        let pick_later = merged.side == Side::Sell;
        merged.trigger_time = pick(merged.trigger_time, fill.trigger_time, pick_later);
        merged.date = pick(merged.date, fill.date, pick_later);
    }

    if merged.quantity > 0.0 {
        merged.price = notional / merged.quantity;
    }
    Some(merged)
}

fn pick<T: Ord>(a: Option<T>, b: Option<T>, later: bool) -> Option<T> {
    match (a, b) {
        (Some(x), Some(y)) => Some(if later { x.max(y) } else { x.min(y) }),
        (x, y) => x.or(y),
    }
}

fn rows_of(legs: &[TradeLeg]) -> Vec<RowNumber> {
    legs.iter().map(|l| l.row).collect()
}
