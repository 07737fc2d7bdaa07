// src/specs/listing.rs
//! Scraping *spec* for the per-jurisdiction listing page.
//!
//! Purpose:
//! - GET `<base>/<slug>/scratch-offs` and turn every qualifying table into
//!   [`CandidateGame`]s, in page order.
//! - A table qualifies when one header mentions odds and another mentions a
//!   game, prize or price. Columns are then mapped through `normalize::ALIASES`.
//!
//! Row rules:
//! - No name or no detail link → row skipped and counted.
//! - Price outside the known denominations → price unknown, row kept.
//! - No dedup: two rows for the same game give two candidates.

use crate::config::consts::KNOWN_DENOMINATIONS;
use crate::config::options::ScrapeOptions;
use crate::core::net::{Fetch, absolute_url};
use crate::data::CandidateGame;
use crate::error::{Result, ScrapeError};
use crate::jurisdiction::Jurisdiction;
use crate::normalize::{self, ALIASES, ColumnMap, Field, Parsed};

use super::table::{RawCell, RawTable, tables};

#[derive(Debug, Default)]
pub struct ListingPage {
    pub games: Vec<CandidateGame>,
    /// Rows dropped for lacking a name or a detail link.
    pub skipped_rows: usize,
}

pub fn fetch(fetcher: &dyn Fetch, opts: &ScrapeOptions) -> Result<ListingPage> {
    let url = opts.listing_url();
    let doc = fetcher.get(&url)?;
    parse(&doc, opts.jurisdiction, &url)
}

/// Parse a listing document fetched from `url`. Relative links resolve against it.
pub fn parse(doc: &str, jurisdiction: Jurisdiction, url: &str) -> Result<ListingPage> {
    let mut page = ListingPage::default();
    let mut qualifying = 0usize;

    for block in tables(doc) {
        let table = RawTable::read(&block);
        if !is_listing_table(&table) {
            continue;
        }
        qualifying += 1;

        let map = ALIASES.resolve(&table.labels, Field::LISTING);
        if !map.unmatched.is_empty() {
            logd!(
                "[{jurisdiction}] unmapped listing columns (alias table v{}): {:?}",
                ALIASES.version,
                map.unmatched
            );
        }
        if !map.has(Field::GameName) {
            logw!("[{jurisdiction}] listing table has no recognizable name column");
        }

        for row in &table.rows {
            match candidate(row, &map, jurisdiction, url) {
                RowOutcome::Game(game) => page.games.push(game),
                RowOutcome::Malformed(why) => {
                    logd!("[{jurisdiction}] skipping listing row ({why})");
                    page.skipped_rows += 1;
                }
                RowOutcome::Blank => {}
            }
        }
    }

    if qualifying == 0 {
        return Err(ScrapeError::parse(url, "no scratch-off table found"));
    }
    logf!(
        "[{jurisdiction}] listing: {} game(s), {} malformed row(s) skipped",
        page.games.len(),
        page.skipped_rows
    );
    Ok(page)
}

fn is_listing_table(table: &RawTable) -> bool {
    let labels = table.lowered_labels();
    labels.iter().any(|h| h.contains("odds"))
        && labels
            .iter()
            .any(|h| h.contains("game") || h.contains("prize") || h.contains("price"))
}

enum RowOutcome {
    Game(CandidateGame),
    Malformed(&'static str),
    Blank,
}

fn candidate(cells: &[RawCell], map: &ColumnMap, jurisdiction: Jurisdiction, page_url: &str) -> RowOutcome {
    if cells.iter().all(|c| c.text.is_empty() && c.href.is_none()) {
        return RowOutcome::Blank;
    }
    let texts: Vec<String> = cells.iter().map(|c| c.text.clone()).collect();
    let cell = |f: Field| map.cell(&texts, f).unwrap_or("");

    let name = cell(Field::GameName).trim().to_string();
    if name.is_empty() {
        return RowOutcome::Malformed("no name");
    }

    // the name cell's link, else the first link in the row
    let href = map
        .get(Field::GameName)
        .and_then(|i| cells.get(i))
        .and_then(|c| c.href.clone())
        .or_else(|| cells.iter().find_map(|c| c.href.clone()));
    let Some(href) = href else {
        return RowOutcome::Malformed("no detail link");
    };
    let Some(detail_url) = absolute_url(page_url, &href) else {
        return RowOutcome::Malformed("unresolvable detail link");
    };

    let game_number = field_value(&name, Field::GameNumber, normalize::parse_count(cell(Field::GameNumber)))
        .and_then(|n| u32::try_from(n).ok())
        .or_else(|| number_after_hash(&name));

    let price = field_value(&name, Field::Price, normalize::parse_currency(cell(Field::Price)))
        .and_then(|p| known_denomination(&name, p));

    RowOutcome::Game(CandidateGame {
        jurisdiction,
        detail_url,
        game_number,
        price,
        listed_odds: field_value(&name, Field::OverallOdds, normalize::parse_odds(cell(Field::OverallOdds))),
        top_prize: field_value(&name, Field::TopPrize, normalize::parse_currency(cell(Field::TopPrize))),
        top_prizes_remaining: field_value(
            &name,
            Field::TopPrizesRemaining,
            normalize::parse_count(cell(Field::TopPrizesRemaining)),
        ),
        name,
    })
}

/// Unparsable degrades to unknown, with a trace of what was there.
fn field_value<T>(game: &str, field: Field, parsed: Parsed<T>) -> Option<T> {
    match parsed {
        Ok(v) => v,
        Err(e) => {
            logd!("{game}: {field:?}: {e}");
            None
        }
    }
}

fn known_denomination(game: &str, price: f64) -> Option<f64> {
    if KNOWN_DENOMINATIONS.iter().any(|d| (d - price).abs() < 1e-9) {
        Some(price)
    } else {
        logd!("{game}: price {price} is not a known denomination");
        None
    }
}

/// "Cash Blast #1523" → 1523.
fn number_after_hash(name: &str) -> Option<u32> {
    let (_, rest) = name.split_once('#')?;
    let digits: String = rest
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
