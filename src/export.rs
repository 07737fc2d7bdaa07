// src/export.rs
//! Canonical export row per game. Unknown values are empty cells, never `0`.

use serde::Serialize;

use crate::csv::rows_to_string;
use crate::data::{Game, PrizeTier, ScrapeRunResult};
use crate::error::Result;

pub const HEADERS: [&str; 14] = [
    "jurisdiction",
    "game_number",
    "name",
    "price",
    "overall_odds",
    "win_probability",
    "true_ev",
    "dead",
    "top_prize",
    "total_remaining",
    "detail_status",
    "detail_url",
    "scraped_at",
    "tiers",
];

pub fn headers() -> Vec<String> {
    HEADERS.iter().map(|h| h.to_string()).collect()
}

fn opt<T: ToString>(v: Option<T>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

#[derive(Serialize)]
struct TierCell<'a> {
    label: &'a str,
    prize: Option<f64>,
    is_ticket: bool,
    total: Option<u64>,
    remaining: Option<u64>,
}

impl<'a> From<&'a PrizeTier> for TierCell<'a> {
    fn from(t: &'a PrizeTier) -> Self {
        Self { label: &t.label, prize: t.prize, is_ticket: t.is_ticket, total: t.total, remaining: t.remaining }
    }
}

/// Tier breakdown as a compact JSON array; empty cell when there are no tiers.
pub fn tiers_cell(tiers: &[PrizeTier]) -> Result<String> {
    if tiers.is_empty() {
        return Ok(String::new());
    }
    let cells: Vec<TierCell<'_>> = tiers.iter().map(TierCell::from).collect();
    Ok(serde_json::to_string(&cells)?)
}

pub fn game_row(game: &Game) -> Result<Vec<String>> {
    let c = game.candidate();
    let m = game.metrics();
    Ok(vec![
        game.jurisdiction().code().to_string(),
        opt(c.game_number),
        c.name.clone(),
        opt(c.price),
        opt(game.overall_odds()),
        opt(m.win_probability),
        opt(m.true_ev),
        m.dead.to_string(),
        opt(c.top_prize),
        opt(m.total_remaining),
        game.detail_status().as_str().to_string(),
        c.detail_url.clone(),
        game.scraped_at().to_string(),
        tiers_cell(game.tiers())?,
    ])
}

pub fn to_export_string(games: &[&Game], include_headers: bool, sep: char) -> Result<String> {
    let rows = games.iter().map(|g| game_row(g)).collect::<Result<Vec<_>>>()?;
    let headers = headers();
    Ok(rows_to_string(include_headers.then_some(headers.as_slice()), &rows, sep))
}

/// Whole run (games, failures, status) as pretty JSON.
pub fn to_json(result: &ScrapeRunResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}
