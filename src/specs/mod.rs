// src/specs/mod.rs
//! # Scraping “specs” module
//!
//! Page-specific scraping specifications for the source site. Each spec owns one
//! page kind and encodes *where the ground truth lives in the HTML* and *how to
//! extract it robustly*.
//!
//! ## What lives here
//! - **Pure HTML parsing** of the two page kinds: the per-jurisdiction listing
//!   (`/<state>/scratch-offs`) and a game's detail page.
//! - **Column resolution** through the alias table in `normalize`, so a renamed
//!   header degrades one field instead of the whole page.
//! - **Tolerant extraction** using `core::html` helpers (case-insensitive tag blocks,
//!   tag stripping, whitespace/entity normalization).
//!
//! ## What does **not** live here
//! - **Pacing, retries, failure accounting** – `scrape` decides when and whether
//!   to fetch.
//! - **Metrics** – specs hand back tiers; `metrics` derives EV and odds.
//! - **Export formatting.**
//!
//! ## Typical call chain
//! ```text
//! cli → scrape::collect_games → specs::listing::fetch()
//!                             ↘ specs::detail::fetch() per game
//!                               data::Game::assemble → export
//! ```
//!
//! ## Conventions & invariants
//! - **Case-insensitive** tag detection; no full-document regexes.
//! - Prefer **local scanning within known blocks** (`<table>…</table>`, `<tr>…</tr>`).
//! - Field-level problems never fail a page. A value that does not parse is
//!   unknown; a row missing what it needs is skipped and counted.
//! - A page fails with `ScrapeError::Parse` only when it has none of the
//!   structure the spec looks for.
//!
//! ## Testing notes
//! - Specs are testable **offline** against captured fixtures (saved HTML under
//!   `tests/fixtures/`), through `parse` entry points that take the document text.
pub mod detail;
pub mod listing;
pub(crate) mod table;
