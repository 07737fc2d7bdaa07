// src/specs/detail.rs
//! Scraping *spec* for a game's detail page.
//!
//! Purpose:
//! - Locate the prize table: the first `<table>` holding a `<td data-title="Prize">`
//!   cell or a header cell mentioning "prize".
//! - Map columns per row from `data-title` attributes when the row carries them,
//!   else from header positions.
//! - Pull the overall "1 in X" odds from the page text.
//!
//! A page with a prize table but no readable rows is a valid, empty result.
//! Only a body with neither a table nor any odds text is a `ParseError`.

use crate::core::html::{Html, TagBlock, visible_text};
use crate::core::net::Fetch;
use crate::data::PrizeTier;
use crate::error::{Result, ScrapeError};
use crate::normalize::{self, ALIASES, ColumnMap, Field, Parsed};

use super::table::{RawCell, RawTable, tables};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DetailPage {
    pub tiers: Vec<PrizeTier>,
    pub overall_odds: Option<f64>,
}

pub fn fetch(fetcher: &dyn Fetch, url: &str) -> Result<DetailPage> {
    let doc = fetcher.get(url)?;
    parse(&doc, url)
}

pub fn parse(doc: &str, url: &str) -> Result<DetailPage> {
    let overall_odds = find_overall_odds(doc);
    let html = Html::new(doc);

    let Some(table) = tables(doc).find(is_prize_table) else {
        if !html.contains_ci("<table") && overall_odds.is_none() {
            return Err(ScrapeError::parse(url, "no prize table and no odds on page"));
        }
        logw!("No prize table found at {url}");
        return Ok(DetailPage { tiers: Vec::new(), overall_odds });
    };

    let raw = RawTable::read(&table);
    let header_map = ALIASES.resolve(&raw.labels, Field::TIERS);
    let mut tiers = Vec::with_capacity(raw.rows.len());

    for cells in &raw.rows {
        let titled = cells.iter().any(|c| c.title.is_some());
        let row_map;
        let map = if titled {
            let titles: Vec<String> = cells.iter().map(|c| c.title.clone().unwrap_or_default()).collect();
            row_map = ALIASES.resolve(&titles, Field::TIERS);
            &row_map
        } else {
            &header_map
        };
        if let Some(tier) = read_tier(cells, map, url) {
            tiers.push(tier);
        }
    }

    logd!("{url}: {} tier(s), odds {:?}", tiers.len(), overall_odds);
    Ok(DetailPage { tiers, overall_odds })
}

fn is_prize_table(table: &TagBlock<'_>) -> bool {
    let has_prize_cell = table
        .children("td")
        .any(|td| td.attr("data-title").is_some_and(|t| t.trim().eq_ignore_ascii_case("prize")));
    has_prize_cell
        || table
            .children("th")
            .any(|th| th.text().to_lowercase().contains("prize"))
}

fn read_tier(cells: &[RawCell], map: &ColumnMap, url: &str) -> Option<PrizeTier> {
    let texts: Vec<String> = cells.iter().map(|c| c.text.clone()).collect();
    if texts.iter().all(|t| t.is_empty()) {
        return None;
    }
    let label = map.cell(&texts, Field::Prize).unwrap_or("").trim().to_string();
    // summary rows restate the column sums
    if label.to_lowercase().starts_with("total") {
        return None;
    }

    let prize = known(url, &label, normalize::parse_currency(&label));
    let total = known(url, &label, normalize::parse_count(map.cell(&texts, Field::TotalPrizes).unwrap_or("")));
    let remaining = known(url, &label, normalize::parse_count(map.cell(&texts, Field::PrizesRemaining).unwrap_or("")));

    if label.is_empty() && total.is_none() && remaining.is_none() {
        return None;
    }
    let is_ticket = normalize::is_ticket_label(&label);
    Some(PrizeTier::new(label, prize, is_ticket, total, remaining))
}

fn known<T>(url: &str, label: &str, parsed: Parsed<T>) -> Option<T> {
    parsed.unwrap_or_else(|e| {
        logd!("{url}: tier {label:?}: {e}");
        None
    })
}

/// First parsable "1 in X" after an "overall odds" phrase, else after any "odds".
fn find_overall_odds(doc: &str) -> Option<f64> {
    let text = visible_text(doc);
    let lc = text.to_ascii_lowercase();
    for needle in ["overall odds", "odds"] {
        let mut from = 0usize;
        while let Some(rel) = lc[from..].find(needle) {
            let at = from + rel;
            from = at + needle.len();
            let window: String = text[at..].chars().take(80).collect();
            if let Ok(Some(odds)) = normalize::parse_odds(&window) {
                return Some(odds);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_positioned_table() {
        let doc = r#"
        <p>Overall Odds: 1 in 4.50</p>
        <table>
          <thead><tr><th>Prize</th><th>Total Prizes</th><th>Prizes Remaining</th></tr></thead>
          <tbody>
            <tr><td>$1,000</td><td>20</td><td>10</td></tr>
            <tr><td>$5</td><td>2,000</td><td>990</td></tr>
            <tr><td>Total</td><td>2,020</td><td>1,000</td></tr>
          </tbody>
        </table>"#;
        let page = parse(doc, "t").unwrap();
        assert_eq!(page.overall_odds, Some(4.5));
        assert_eq!(page.tiers.len(), 2);
        assert_eq!(page.tiers[0].prize, Some(1000.0));
        assert_eq!(page.tiers[0].total, Some(20));
        assert_eq!(page.tiers[0].remaining, Some(10));
        assert_eq!(page.tiers[1].remaining, Some(990));
    }

    #[test]
    fn data_title_rows_map_without_header() {
        let doc = r#"<table>
            <tr><td data-title="Tier">1</td><td data-title="Prize">Free Ticket</td><td data-title="Remaining">N/A</td></tr>
            <tr><td data-title="Tier">2</td><td data-title="Prize">$2</td><td data-title="Remaining">15</td></tr>
          </table>"#;
        let page = parse(doc, "t").unwrap();
        assert_eq!(page.overall_odds, None);
        assert_eq!(page.tiers.len(), 2);
        assert!(page.tiers[0].is_ticket);
        assert_eq!(page.tiers[0].prize, Some(0.0));
        assert_eq!(page.tiers[0].remaining, None);
        assert_eq!(page.tiers[1].remaining, Some(15));
    }

    #[test]
    fn odds_ignore_script_and_prefer_overall_phrase() {
        let doc = r#"<script>var odds = "1 in 99";</script>
            <table><tr><th>Prize</th><th>Odds</th></tr><tr><td>$5</td><td>1 in 10</td></tr></table>
            <div>Overall odds of winning: 1 in 3.85</div>"#;
        assert_eq!(parse(doc, "t").unwrap().overall_odds, Some(3.85));
    }

    #[test]
    fn table_without_prize_column_is_empty_not_error() {
        let doc = "<table><tr><th>Claim centers</th></tr><tr><td>Trenton</td></tr></table>";
        let page = parse(doc, "t").unwrap();
        assert!(page.tiers.is_empty());
    }

    #[test]
    fn foreign_body_is_parse_error() {
        let err = parse("<html><body>Just a moment...</body></html>", "t").unwrap_err();
        assert!(matches!(err, ScrapeError::Parse { .. }));
    }
}
