// src/metrics.rs
//! Derived per-game numbers. Pure functions of a game's tiers, price and odds.
//!
//! "Unknown" is `None` throughout and is never replaced by a made-up number.

use serde::Serialize;

use crate::data::PrizeTier;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Metrics {
    pub win_probability: Option<f64>,
    pub true_ev: Option<f64>,
    pub dead: bool,
    pub total_remaining: Option<u64>,
}

pub fn evaluate(tiers: &[PrizeTier], price: Option<f64>, overall_odds: Option<f64>) -> Metrics {
    Metrics {
        win_probability: win_probability(overall_odds),
        true_ev: true_ev(tiers, price),
        dead: is_dead(tiers),
        total_remaining: total_remaining(tiers),
    }
}

/// `1 / odds` for a usable "1 in X" denominator.
pub fn win_probability(overall_odds: Option<f64>) -> Option<f64> {
    let odds = overall_odds.filter(|o| o.is_finite() && *o > 0.0)?;
    Some((1.0 / odds).min(1.0))
}

/// Prize-count-weighted value of what is left:
/// `Σ(value × remaining) / Σ(remaining)`.
///
/// The numerator takes tiers with both value and remaining known; the
/// denominator takes every tier with a known remaining count. Free-ticket
/// tiers count at the ticket price when that is known.
pub fn true_ev(tiers: &[PrizeTier], price: Option<f64>) -> Option<f64> {
    let mut weighted = 0.0f64;
    let mut remaining_total = 0u64;
    let mut any_complete = false;

    for tier in tiers {
        let Some(remaining) = tier.remaining else { continue };
        remaining_total = remaining_total.saturating_add(remaining);
        if let Some(value) = tier.value_at(price) {
            weighted += value * remaining as f64;
            any_complete = true;
        }
    }

    if !any_complete || remaining_total == 0 {
        return None;
    }
    Some(weighted / remaining_total as f64)
}

/// Top prize confirmed gone: the highest-valued known tier(s) all show
/// exactly zero remaining. No known tiers means not dead.
pub fn is_dead(tiers: &[PrizeTier]) -> bool {
    let top = tiers
        .iter()
        .filter_map(|t| t.prize)
        .fold(None::<f64>, |acc, v| Some(acc.map_or(v, |a| a.max(v))));
    let Some(top) = top else { return false };

    tiers
        .iter()
        .filter(|t| t.prize == Some(top))
        .all(|t| t.remaining == Some(0))
}

pub fn total_remaining(tiers: &[PrizeTier]) -> Option<u64> {
    tiers
        .iter()
        .filter_map(|t| t.remaining)
        .fold(None, |acc: Option<u64>, r| Some(acc.unwrap_or(0).saturating_add(r)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(prize: Option<f64>, remaining: Option<u64>) -> PrizeTier {
        PrizeTier::new(String::new(), prize, false, None, remaining)
    }

    #[test]
    fn true_ev_is_count_weighted() {
        let tiers = [tier(Some(1000.0), Some(10)), tier(Some(5.0), Some(990))];
        let ev = true_ev(&tiers, Some(5.0)).unwrap();
        assert!((ev - 14.95).abs() < 1e-9, "ev = {ev}");
    }

    #[test]
    fn true_ev_denominator_includes_unknown_value_tiers() {
        // value unknown still counts toward what is left in the pool
        let tiers = [tier(Some(100.0), Some(10)), tier(None, Some(90))];
        assert_eq!(true_ev(&tiers, None), Some(10.0));
    }

    #[test]
    fn true_ev_unknown_without_complete_tier() {
        assert_eq!(true_ev(&[], Some(5.0)), None);
        let tiers = [tier(Some(100.0), None), tier(None, Some(4))];
        assert_eq!(true_ev(&tiers, Some(5.0)), None);
    }

    #[test]
    fn true_ev_unknown_when_nothing_remains() {
        let tiers = [tier(Some(100.0), Some(0)), tier(Some(5.0), Some(0))];
        assert_eq!(true_ev(&tiers, None), None);
    }

    #[test]
    fn ticket_tiers_take_the_game_price() {
        let tiers = [
            tier(Some(20.0), Some(1)),
            PrizeTier::new("Free Ticket".into(), Some(0.0), true, None, Some(3)),
        ];
        assert_eq!(true_ev(&tiers, Some(4.0)), Some((20.0 + 12.0) / 4.0));
        assert_eq!(true_ev(&tiers, None), Some(5.0));
    }

    #[test]
    fn win_probability_from_odds() {
        let p = win_probability(Some(4.5)).unwrap();
        assert!((p - 1.0 / 4.5).abs() < 1e-12);
        assert!((p - 0.2222).abs() < 1e-4);
        assert_eq!(win_probability(Some(0.0)), None);
        assert_eq!(win_probability(Some(-3.0)), None);
        assert_eq!(win_probability(None), None);
        assert_eq!(win_probability(Some(f64::NAN)), None);
    }

    #[test]
    fn dead_only_on_known_zero_top_tier() {
        let dead = [tier(Some(50_000.0), Some(0)), tier(Some(10.0), Some(300))];
        assert!(is_dead(&dead));

        let alive = [tier(Some(50_000.0), Some(1)), tier(Some(10.0), Some(0))];
        assert!(!is_dead(&alive));

        let unknown_top = [tier(Some(50_000.0), None), tier(Some(10.0), Some(0))];
        assert!(!is_dead(&unknown_top));
    }

    #[test]
    fn no_tiers_is_not_dead() {
        assert!(!is_dead(&[]));
        assert!(!is_dead(&[tier(None, Some(0))]));
    }

    #[test]
    fn tied_top_tiers_must_all_be_gone() {
        let tiers = [tier(Some(1000.0), Some(0)), tier(Some(1000.0), Some(2))];
        assert!(!is_dead(&tiers));
    }

    #[test]
    fn huge_counts_saturate_instead_of_overflowing() {
        let tiers = [tier(Some(1.0), Some(u64::MAX)), tier(Some(2.0), Some(5))];
        assert_eq!(total_remaining(&tiers), Some(u64::MAX));
        let ev = true_ev(&tiers, None).unwrap();
        assert!(ev.is_finite() && ev > 0.0);
    }

    #[test]
    fn total_remaining_skips_unknown() {
        assert_eq!(total_remaining(&[]), None);
        assert_eq!(total_remaining(&[tier(None, None)]), None);
        assert_eq!(total_remaining(&[tier(None, Some(3)), tier(None, None), tier(None, Some(0))]), Some(3));
    }
}
