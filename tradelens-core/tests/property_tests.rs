//! Property tests for pipeline invariants.
//!
//! Uses proptest to verify:
//! 1. PnL identity — net = gross + brokerage + other charges, exactly
//! 2. Cumulative recurrence — cum[i] = cum[i-1] + net[i]
//! 3. Drawdown is never positive and the running peak never decreases
//! 4. Hourly mass conservation — bucket totals sum to total net PnL
//! 5. Determinism — identical input gives identical output

use proptest::prelude::*;
use tradelens_core::{run_pipeline, PipelineOptions, RawLeg};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_price() -> impl Strategy<Value = f64> {
    (1.0..1000.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_cost() -> impl Strategy<Value = f64> {
    (-50.0..0.0_f64).prop_map(|c| (c * 100.0).round() / 100.0)
}

#[derive(Debug, Clone)]
struct LegSpec {
    entry: f64,
    exit: f64,
    qty: u32,
    costs: (f64, f64, f64, f64),
    day: u32,
    hour: u32,
    hold_minutes: u32,
}

fn arb_leg_spec() -> impl Strategy<Value = LegSpec> {
    (
        arb_price(),
        arb_price(),
        1u32..500,
        (arb_cost(), arb_cost(), arb_cost(), arb_cost()),
        1u32..28,
        0u32..23,
        0u32..59,
    )
        .prop_map(|(entry, exit, qty, costs, day, hour, hold_minutes)| LegSpec {
            entry,
            exit,
            qty,
            costs,
            day,
            hour,
            hold_minutes,
        })
}

fn to_raw(specs: &[LegSpec]) -> Vec<RawLeg> {
    let mut rows = Vec::new();
    for (i, s) in specs.iter().enumerate() {
        let date = format!("2024-02-{:02}", s.day);
        let trade_ref = format!("T{i}");
        rows.push(RawLeg {
            row: rows.len() + 1,
            date: date.clone(),
            trigger_time: format!("{date} {:02}:00:00", s.hour),
            trade_ref: trade_ref.clone(),
            side: "Buy".into(),
            symbol: "NIFTYFUT".into(),
            price: s.entry.to_string(),
            quantity: s.qty.to_string(),
            brokerage: s.costs.0.to_string(),
            other_charges: s.costs.1.to_string(),
        });
        rows.push(RawLeg {
            row: rows.len() + 1,
            date: date.clone(),
            trigger_time: format!("{date} {:02}:{:02}:00", s.hour, s.hold_minutes),
            trade_ref,
            side: "sell".into(),
            symbol: "NIFTYFUT".into(),
            price: s.exit.to_string(),
            quantity: s.qty.to_string(),
            brokerage: s.costs.2.to_string(),
            other_charges: s.costs.3.to_string(),
        });
    }
    rows
}

proptest! {
    #[test]
    fn net_pnl_identity_is_exact(specs in prop::collection::vec(arb_leg_spec(), 1..40)) {
        let out = run_pipeline(&to_raw(&specs), &PipelineOptions::default()).unwrap();
        prop_assert_eq!(out.trades.len(), specs.len());
        for t in &out.trades {
            prop_assert_eq!(t.net_pnl, t.gross_pnl + t.total_brokerage + t.total_other_charges);
            prop_assert!(t.duration_minutes.unwrap() >= 0.0);
        }
    }

    #[test]
    fn cumulative_recurrence_and_drawdown(specs in prop::collection::vec(arb_leg_spec(), 1..40)) {
        let out = run_pipeline(&to_raw(&specs), &PipelineOptions::default()).unwrap();
        let seq = &out.sequence.trades;
        let mut prev_cum = 0.0;
        let mut prev_peak = f64::NEG_INFINITY;
        for s in seq {
            prop_assert_eq!(s.cumulative_pnl, prev_cum + s.trade.net_pnl);
            prop_assert!(s.drawdown <= 0.0);
            prop_assert!(s.running_peak >= prev_peak);
            prop_assert!(s.running_peak >= s.cumulative_pnl);
            prev_cum = s.cumulative_pnl;
            prev_peak = s.running_peak;
        }
        for w in seq.windows(2) {
            prop_assert!(w[0].trade.entry_date <= w[1].trade.entry_date);
        }
    }

    #[test]
    fn hourly_mass_conservation(specs in prop::collection::vec(arb_leg_spec(), 1..40)) {
        let out = run_pipeline(&to_raw(&specs), &PipelineOptions::default()).unwrap();
        let bucket_total: f64 = out.hourly.iter().map(|b| b.total_pnl).sum();
        let trade_total: f64 = out.trades.iter().map(|t| t.net_pnl).sum();
        let scale = out.trades.iter().map(|t| t.net_pnl.abs()).sum::<f64>().max(1.0);
        prop_assert!((bucket_total - trade_total).abs() <= scale * 1e-9);

        let counted: usize = out.hourly.iter().map(|b| b.trade_count).sum();
        prop_assert_eq!(counted, out.trades.len());
        for b in &out.hourly {
            prop_assert!(b.entry_hour < 24);
            prop_assert!((0.0..=100.0).contains(&b.win_rate_pct));
        }
    }

    #[test]
    fn rerun_is_deterministic(specs in prop::collection::vec(arb_leg_spec(), 1..25)) {
        let raws = to_raw(&specs);
        let a = run_pipeline(&raws, &PipelineOptions::default()).unwrap();
        let b = run_pipeline(&raws, &PipelineOptions::default()).unwrap();
        prop_assert_eq!(
            serde_json::to_string(&a.series).unwrap(),
            serde_json::to_string(&b.series).unwrap()
        );
        prop_assert_eq!(a, b);
    }
}
