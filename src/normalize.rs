// src/normalize.rs
//! Field normalizer: raw cell text → numbers.
//!
//! Every parser returns `Ok(None)` for "unknown" (blank cell or a placeholder
//! such as `N/A` or `-`) and `Err(UnparsableValue)` for text that is present
//! but not a number of the expected kind. Callers degrade both to an unknown
//! field; only the log line differs. Unknown is never coerced to zero.
//!
//! Column labels go through [`ALIASES`], a versioned table mapping each
//! canonical field to the source labels seen for it so far.

use std::collections::HashMap;
use std::fmt;

use crate::core::sanitize::{decode_entities, label_key, normalize_ws, strip_footnotes};
use crate::error::UnparsableValue;

pub type Parsed<T> = Result<Option<T>, UnparsableValue>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Currency,
    Count,
    Odds,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldKind::Currency => "currency",
            FieldKind::Count => "count",
            FieldKind::Odds => "odds",
        })
    }
}

const PLACEHOLDERS: &[&str] = &["", "-", "--", "—", "–", "n/a", "na", "n.a.", "tbd", "unknown", "?", "none listed"];

fn clean(raw: &str) -> String {
    normalize_ws(strip_footnotes(&decode_entities(raw)))
}

/// True for prize labels that stand for a free ticket rather than cash.
pub fn is_ticket_label(raw: &str) -> bool {
    let t = raw.to_lowercase();
    t.contains("free") || t.contains("ticket")
}

/// Split `s` into a leading number (digits, `,` separators, one `.`) and the rest.
fn leading_number(s: &str) -> Option<(f64, &str)> {
    let mut end = 0usize;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, ch) in s.char_indices() {
        match ch {
            '0'..='9' => { seen_digit = true; end = i + 1; }
            ',' if seen_digit && !seen_dot => end = i + 1,
            '.' if !seen_dot => { seen_dot = true; end = i + 1; }
            _ => break,
        }
    }
    if !seen_digit {
        return None;
    }
    let body = s[..end].trim_end_matches([',', '.']);
    let digits: String = body.chars().filter(|c| *c != ',').collect();
    let value = digits.parse::<f64>().ok()?;
    Some((value, &s[body.len()..]))
}

/// Trailing text allowed after a number: nothing, or a separate word/clause
/// (`/Week for Life`, ` a year`, ` (12%)`). Letters glued to the digits are not.
fn tail_is_detached(rest: &str) -> bool {
    match rest.chars().next() {
        None => true,
        Some(c) => c.is_whitespace() || matches!(c, '/' | '(' | '+' | ';' | '|'),
    }
}

fn magnitude(rest: &str) -> Option<(f64, &str)> {
    let trimmed = rest.trim_start();
    let word_end = trimmed
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(trimmed.len());
    let word = trimmed[..word_end].to_ascii_lowercase();
    let factor = match word.as_str() {
        "k" | "thousand" => 1e3,
        "m" | "mm" | "mil" | "million" => 1e6,
        "b" | "bn" | "billion" => 1e9,
        _ => return None,
    };
    // "5 M" is fine, "5 Mega Bucks" is not a magnitude
    if word.len() == 1 && rest.starts_with(char::is_whitespace) && word_end < trimmed.len() {
        let next = trimmed[word_end..].chars().next();
        if next.is_some_and(|c| c.is_alphanumeric()) {
            return None;
        }
    }
    Some((factor, &trimmed[word_end..]))
}

/// Currency amount in whole units.
///
/// `"$1,000"` → 1000, `"1000"` → 1000, `"FREE"` / `"Free Ticket"` → 0,
/// `"$2.5 Million"` → 2_500_000, `"$1,000/Week for Life"` → 1000.
pub fn parse_currency(raw: &str) -> Parsed<f64> {
    let t = clean(raw);
    if PLACEHOLDERS.contains(&t.to_lowercase().as_str()) {
        return Ok(None);
    }
    if is_ticket_label(&t) {
        return Ok(Some(0.0));
    }

    let unsigned = t
        .trim_start_matches(|c: char| matches!(c, '$' | '€' | '£' | '¥') || c.is_whitespace())
        .trim_start_matches("USD")
        .trim_start_matches("US$")
        .trim_start();
    let Some((value, rest)) = leading_number(unsigned) else {
        return Err(UnparsableValue::new(FieldKind::Currency, raw));
    };

    if let Some((factor, after)) = magnitude(rest) {
        if tail_is_detached(after) {
            return Ok(Some(value * factor));
        }
    }
    if !tail_is_detached(rest) {
        return Err(UnparsableValue::new(FieldKind::Currency, raw));
    }
    Ok(Some(value))
}

/// Largest count an `f64` still holds exactly (2^53).
const MAX_EXACT_COUNT: f64 = 9_007_199_254_740_992.0;

/// Non-negative integer count. `"1,234"` → 1234, `"N/A"` / `""` → unknown.
pub fn parse_count(raw: &str) -> Parsed<u64> {
    let t = clean(raw);
    if PLACEHOLDERS.contains(&t.to_lowercase().as_str()) {
        return Ok(None);
    }
    let err = || UnparsableValue::new(FieldKind::Count, raw);

    let (value, rest) = leading_number(&t).ok_or_else(err)?;
    if value.fract() != 0.0 || value > MAX_EXACT_COUNT || !tail_is_detached(rest) {
        return Err(err());
    }
    Ok(Some(value as u64))
}

/// Overall-odds denominator from a `"1 in X"` (or `"1:X"`) phrase.
///
/// Only the number directly after the ratio is read: in `"1 in 4 5 top prizes"`
/// the odds are 4.
pub fn parse_odds(raw: &str) -> Parsed<f64> {
    let t = clean(raw);
    if PLACEHOLDERS.contains(&t.to_lowercase().as_str()) {
        return Ok(None);
    }
    // ASCII lowering keeps byte offsets aligned with `t`
    let lc = t.to_ascii_lowercase();

    for (at, _) in lc.match_indices('1') {
        let standalone = !lc[..at]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_digit() || c == '.' || c == ',');
        if !standalone {
            continue;
        }
        let after = lc[at + 1..].trim_start();
        let Some(rest) = after.strip_prefix("in").or_else(|| after.strip_prefix(':')) else {
            continue;
        };
        if let Some((x, _)) = leading_number(rest.trim_start()) {
            return Ok(Some(x));
        }
    }
    Err(UnparsableValue::new(FieldKind::Odds, raw))
}

/* ---------------- Column aliases ---------------- */

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    GameName,
    GameNumber,
    Price,
    OverallOdds,
    TopPrize,
    TopPrizesRemaining,
    Prize,
    TotalPrizes,
    PrizesRemaining,
}

impl Field {
    /// Fields read from the per-jurisdiction listing table, most specific first.
    pub const LISTING: &'static [Field] = &[
        Field::TopPrizesRemaining,
        Field::GameNumber,
        Field::TopPrize,
        Field::OverallOdds,
        Field::Price,
        Field::GameName,
    ];

    /// Fields read from a game's prize table, most specific first.
    pub const TIERS: &'static [Field] = &[
        Field::PrizesRemaining,
        Field::TotalPrizes,
        Field::Prize,
    ];
}

pub struct AliasTable {
    pub version: u32,
    entries: &'static [(Field, &'static [&'static str])],
}

/// Labels are compared lowercased with whitespace collapsed. Within a field,
/// earlier labels win.
pub static ALIASES: AliasTable = AliasTable {
    version: 3,
    entries: &[
        (Field::GameName, &["game name", "game", "scratch-off", "scratch off", "scratcher", "ticket name", "name", "title"]),
        (Field::GameNumber, &["game number", "game #", "game no.", "game no", "game id", "number", "no.", "#", "id"]),
        (Field::Price, &["ticket price", "price", "cost", "ticket cost"]),
        (Field::OverallOdds, &["overall odds", "odds of winning", "odds"]),
        (Field::TopPrize, &["top prize", "largest prize", "top prize amount", "jackpot"]),
        (Field::TopPrizesRemaining, &["top prizes remaining", "remaining top prizes", "top prizes left", "top prizes unclaimed", "top remaining"]),
        (Field::Prize, &["prize", "prize amount", "prize value", "prize level", "amount"]),
        (Field::TotalPrizes, &["total prizes", "prizes issued", "total issued", "initial prizes", "starting prizes", "number of prizes", "total", "issued"]),
        (Field::PrizesRemaining, &["prizes remaining", "remaining", "prizes left", "left", "unclaimed", "prizes unclaimed", "available"]),
    ],
};

impl AliasTable {
    pub fn aliases(&self, field: Field) -> &'static [&'static str] {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, a)| *a)
            .unwrap_or(&[])
    }

    fn matches_partial(&self, field: Field, label: &str) -> bool {
        let key = label_key(label);
        !key.is_empty() && self.aliases(field).iter().any(|a| a.len() > 2 && key.contains(a))
    }

    /// Map source column labels to canonical fields.
    ///
    /// Pass 1 assigns exact matches; pass 2 assigns substring matches for
    /// fields still open, in the priority order of `fields`. A column is
    /// claimed at most once. Fields left open are simply absent from the map,
    /// which callers treat as "unknown for every row".
    pub fn resolve(&self, labels: &[String], fields: &[Field]) -> ColumnMap {
        let mut map = ColumnMap::default();
        let mut claimed = vec![false; labels.len()];

        for &field in fields {
            for alias in self.aliases(field) {
                if map.get(field).is_some() {
                    break;
                }
                if let Some(ix) = (0..labels.len())
                    .find(|&i| !claimed[i] && label_key(&labels[i]) == *alias)
                {
                    map.columns.insert(field, ix);
                    claimed[ix] = true;
                }
            }
        }
        for &field in fields {
            if map.get(field).is_some() {
                continue;
            }
            if let Some(ix) = (0..labels.len()).find(|&i| !claimed[i] && self.matches_partial(field, &labels[i])) {
                map.columns.insert(field, ix);
                claimed[ix] = true;
            }
        }
        map.unmatched = labels
            .iter()
            .zip(&claimed)
            .filter(|(l, c)| !**c && !l.trim().is_empty())
            .map(|(l, _)| l.clone())
            .collect();
        map
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnMap {
    columns: HashMap<Field, usize>,
    /// Source labels that matched no requested field.
    pub unmatched: Vec<String>,
}

impl ColumnMap {
    pub fn get(&self, field: Field) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    pub fn has(&self, field: Field) -> bool {
        self.columns.contains_key(&field)
    }

    /// Text of `field`'s cell in `row`, if the column is known and present.
    pub fn cell<'r>(&self, row: &'r [String], field: Field) -> Option<&'r str> {
        self.get(field).and_then(|i| row.get(i)).map(String::as_str)
    }
}
