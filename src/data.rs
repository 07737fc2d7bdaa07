// src/data.rs
//
// Data model of one scrape run.
//
// - CandidateGame: what the listing page says about a game.
// - PrizeTier: one reconciled row of a game's prize table.
// - Game: candidate + tiers + derived metrics. Built once, read-only after.
// - ScrapeRunResult: games in listing order plus per-game failure records.

use serde::Serialize;

use crate::jurisdiction::Jurisdiction;
use crate::metrics::{self, Metrics};
use crate::specs::detail::DetailPage;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CandidateGame {
    pub jurisdiction: Jurisdiction,
    pub name: String,
    /// One of the known denominations, or `None` for unknown.
    pub price: Option<f64>,
    /// Absolute URL of the detail page.
    pub detail_url: String,
    pub game_number: Option<u32>,
    pub listed_odds: Option<f64>,
    pub top_prize: Option<f64>,
    pub top_prizes_remaining: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PrizeTier {
    /// Prize cell as printed on the page.
    pub label: String,
    pub prize: Option<f64>,
    pub is_ticket: bool,
    pub total: Option<u64>,
    pub remaining: Option<u64>,
}

impl PrizeTier {
    /// Enforces `remaining <= total`. A row that contradicts itself keeps the
    /// remaining count (that is what the metrics consume) and loses its total.
    pub fn new(
        label: String,
        prize: Option<f64>,
        is_ticket: bool,
        total: Option<u64>,
        remaining: Option<u64>,
    ) -> Self {
        let total = match (total, remaining) {
            (Some(t), Some(r)) if r > t => {
                logw!("Tier {label:?}: remaining {r} exceeds total {t}; total marked unknown");
                None
            }
            _ => total,
        };
        Self { label, prize, is_ticket, total, remaining }
    }

    /// Cash value of one prize in this tier. Free tickets are worth the
    /// ticket price when it is known.
    pub fn value_at(&self, price: Option<f64>) -> Option<f64> {
        match (self.is_ticket, price) {
            (true, Some(p)) => Some(p),
            _ => self.prize,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailStatus {
    /// Detail page fetched and parsed (possibly with zero tiers).
    Parsed,
    /// Fetch or parse failed; tiers unknown.
    Failed,
    /// Not attempted: run cancelled or failure breaker tripped.
    Skipped,
}

impl DetailStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DetailStatus::Parsed => "parsed",
            DetailStatus::Failed => "failed",
            DetailStatus::Skipped => "skipped",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Game {
    #[serde(flatten)]
    candidate: CandidateGame,
    overall_odds: Option<f64>,
    tiers: Vec<PrizeTier>,
    #[serde(flatten)]
    metrics: Metrics,
    detail_status: DetailStatus,
    scraped_at: String,
}

impl Game {
    /// Merge a candidate with whatever its detail page yielded.
    /// Detail-page odds win over the listing's.
    pub fn assemble(
        candidate: CandidateGame,
        detail: Option<DetailPage>,
        detail_status: DetailStatus,
        scraped_at: &str,
    ) -> Self {
        let (tiers, detail_odds) = match detail {
            Some(page) => (page.tiers, page.overall_odds),
            None => (Vec::new(), None),
        };
        let overall_odds = detail_odds.or(candidate.listed_odds);
        let metrics = metrics::evaluate(&tiers, candidate.price, overall_odds);

        Self {
            candidate,
            overall_odds,
            tiers,
            metrics,
            detail_status,
            scraped_at: scraped_at.to_string(),
        }
    }

    pub fn candidate(&self) -> &CandidateGame { &self.candidate }
    pub fn jurisdiction(&self) -> Jurisdiction { self.candidate.jurisdiction }
    pub fn name(&self) -> &str { &self.candidate.name }
    pub fn price(&self) -> Option<f64> { self.candidate.price }
    pub fn detail_url(&self) -> &str { &self.candidate.detail_url }
    pub fn overall_odds(&self) -> Option<f64> { self.overall_odds }
    pub fn tiers(&self) -> &[PrizeTier] { &self.tiers }
    pub fn metrics(&self) -> &Metrics { &self.metrics }
    pub fn win_probability(&self) -> Option<f64> { self.metrics.win_probability }
    pub fn true_ev(&self) -> Option<f64> { self.metrics.true_ev }
    pub fn is_dead(&self) -> bool { self.metrics.dead }
    pub fn detail_status(&self) -> DetailStatus { self.detail_status }
    pub fn scraped_at(&self) -> &str { &self.scraped_at }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    /// Detail URL of the game.
    pub reference: String,
    pub name: String,
    pub reason: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RunState {
    Idle,
    FetchingListing,
    FetchingDetails,
    Reconciling,
    Done,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScrapeRunResult {
    pub jurisdiction: Jurisdiction,
    pub status: RunState,
    pub games: Vec<Game>,
    pub failures: Vec<FailureRecord>,
    /// Listing rows dropped for lacking a name or a detail link.
    pub skipped_listing_rows: usize,
}

impl ScrapeRunResult {
    /// Games whose price is in `prices`; an empty set keeps everything.
    /// Games with unknown price only pass an empty filter.
    pub fn games_priced(&self, prices: &[f64]) -> Vec<&Game> {
        self.games
            .iter()
            .filter(|g| {
                prices.is_empty()
                    || g.price().is_some_and(|p| prices.iter().any(|want| (want - p).abs() < 1e-9))
            })
            .collect()
    }

    pub fn failure_for(&self, reference: &str) -> Option<&FailureRecord> {
        self.failures.iter().find(|f| f.reference == reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(price: Option<f64>, odds: Option<f64>) -> CandidateGame {
        CandidateGame {
            jurisdiction: Jurisdiction::NewJersey,
            name: "Lucky 7s".into(),
            price,
            detail_url: "https://example.test/lucky-7s".into(),
            game_number: Some(1234),
            listed_odds: odds,
            top_prize: Some(1000.0),
            top_prizes_remaining: Some(10),
        }
    }

    #[test]
    fn tier_keeps_remaining_when_it_exceeds_total() {
        let t = PrizeTier::new("$5".into(), Some(5.0), false, Some(10), Some(12));
        assert_eq!(t.total, None);
        assert_eq!(t.remaining, Some(12));

        let ok = PrizeTier::new("$5".into(), Some(5.0), false, Some(10), Some(10));
        assert_eq!(ok.total, Some(10));
    }

    #[test]
    fn detail_odds_override_listing_odds() {
        let page = DetailPage { tiers: Vec::new(), overall_odds: Some(4.0) };
        let g = Game::assemble(candidate(Some(5.0), Some(3.0)), Some(page), DetailStatus::Parsed, "t");
        assert_eq!(g.overall_odds(), Some(4.0));
        assert_eq!(g.win_probability(), Some(0.25));
    }

    #[test]
    fn missing_detail_keeps_listing_odds_and_no_tiers() {
        let g = Game::assemble(candidate(Some(5.0), Some(2.0)), None, DetailStatus::Failed, "t");
        assert!(g.tiers().is_empty());
        assert_eq!(g.overall_odds(), Some(2.0));
        assert_eq!(g.true_ev(), None);
        assert!(!g.is_dead());
    }

    #[test]
    fn price_filter() {
        let result = ScrapeRunResult {
            jurisdiction: Jurisdiction::NewJersey,
            status: RunState::Done,
            games: vec![
                Game::assemble(candidate(Some(5.0), None), None, DetailStatus::Failed, "t"),
                Game::assemble(candidate(None, None), None, DetailStatus::Failed, "t"),
            ],
            failures: Vec::new(),
            skipped_listing_rows: 0,
        };
        assert_eq!(result.games_priced(&[]).len(), 2);
        assert_eq!(result.games_priced(&[5.0, 10.0]).len(), 1);
        assert!(result.games_priced(&[20.0]).is_empty());
    }
}
