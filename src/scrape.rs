// src/scrape.rs
//! Pipeline orchestration: listing → details → reconciled games.
//!
//! One [`Run`] per jurisdiction. Detail pages are fetched one at a time with a
//! fixed pause in front of each request. A detail failure is recorded against
//! its game and the run moves on; only a listing failure ends the run early.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use chrono::{SecondsFormat, Utc};

use crate::config::options::ScrapeOptions;
use crate::core::net::Fetch;
use crate::data::{CandidateGame, DetailStatus, FailureRecord, Game, RunState, ScrapeRunResult};
use crate::error::{Result, ScrapeError};
use crate::jurisdiction::Jurisdiction;
use crate::progress::Progress;
use crate::specs::{self, detail::DetailPage};

pub const CANCELLED: &str = "cancelled";

pub struct Run {
    jurisdiction: Jurisdiction,
    state: RunState,
}

impl Run {
    pub fn new(jurisdiction: Jurisdiction) -> Self {
        Self { jurisdiction, state: RunState::Idle }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn advance(&mut self, next: RunState) {
        logd!("[{}] {:?} -> {:?}", self.jurisdiction, self.state, next);
        self.state = next;
    }

    /// Drive the run to `Done` or `Failed`. A `Run` is single-use.
    ///
    /// `cancel` is polled before every detail request; once set, the games not
    /// yet fetched are recorded as failures and the run still ends `Done`.
    pub fn collect(
        &mut self,
        opts: &ScrapeOptions,
        fetcher: &dyn Fetch,
        mut progress: Option<&mut dyn Progress>,
        cancel: Option<&AtomicBool>,
    ) -> Result<ScrapeRunResult> {
        if self.state != RunState::Idle {
            return Err(ScrapeError::Config(format!("run for {} already used", self.jurisdiction)));
        }
        let j = self.jurisdiction;

        self.advance(RunState::FetchingListing);
        if let Some(p) = progress.as_deref_mut() {
            p.log(&format!("Fetching {} listing...", j.name()));
        }
        let opts = opts.for_jurisdiction(j);
        let listing = match specs::listing::fetch(fetcher, &opts) {
            Ok(page) => page,
            Err(e) => {
                self.advance(RunState::Failed);
                loge!("[{j}] listing failed: {e}");
                if let Some(p) = progress.as_deref_mut() {
                    p.finish();
                }
                return Err(e);
            }
        };

        self.advance(RunState::FetchingDetails);
        let scraped_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let candidates = listing.games;
        if let Some(p) = progress.as_deref_mut() {
            p.begin(candidates.len());
        }

        let mut details: Vec<(Option<DetailPage>, DetailStatus)> = Vec::with_capacity(candidates.len());
        let mut failures: Vec<FailureRecord> = Vec::new();
        let mut streak = 0usize;
        let limit = opts.max_consecutive_failures;

        for game in &candidates {
            let skip_reason = if cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
                Some(CANCELLED.to_string())
            } else if limit > 0 && streak >= limit {
                Some(format!("skipped after {limit} consecutive failures"))
            } else {
                None
            };
            if let Some(reason) = skip_reason {
                record_failure(&mut failures, progress.as_deref_mut(), game, reason);
                details.push((None, DetailStatus::Skipped));
                continue;
            }

            if !opts.pause.is_zero() {
                thread::sleep(opts.pause);
            }
            match specs::detail::fetch(fetcher, &game.detail_url) {
                Ok(page) => {
                    streak = 0;
                    if let Some(p) = progress.as_deref_mut() {
                        p.item_done(game);
                    }
                    details.push((Some(page), DetailStatus::Parsed));
                }
                Err(e) => {
                    streak += 1;
                    logw!("[{j}] {}: {e}", game.name);
                    record_failure(&mut failures, progress.as_deref_mut(), game, e.to_string());
                    details.push((None, DetailStatus::Failed));
                    if limit > 0 && streak == limit {
                        logw!("[{j}] {limit} detail failures in a row; not fetching the rest");
                    }
                }
            }
        }

        self.advance(RunState::Reconciling);
        let games: Vec<Game> = candidates
            .into_iter()
            .zip(details)
            .map(|(c, (page, status))| Game::assemble(c, page, status, &scraped_at))
            .collect();

        self.advance(RunState::Done);
        logf!("[{j}] done: {} game(s), {} failure(s)", games.len(), failures.len());
        if let Some(p) = progress.as_deref_mut() {
            p.finish();
        }

        Ok(ScrapeRunResult {
            jurisdiction: j,
            status: self.state,
            games,
            failures,
            skipped_listing_rows: listing.skipped_rows,
        })
    }
}

fn record_failure(
    failures: &mut Vec<FailureRecord>,
    progress: Option<&mut (dyn Progress + '_)>,
    game: &CandidateGame,
    reason: String,
) {
    if let Some(p) = progress {
        p.item_failed(game, &reason);
    }
    failures.push(FailureRecord {
        reference: game.detail_url.clone(),
        name: game.name.clone(),
        reason,
    });
}

/// One full run for `opts.jurisdiction`.
pub fn collect_games(
    opts: &ScrapeOptions,
    fetcher: &dyn Fetch,
    progress: Option<&mut dyn Progress>,
    cancel: Option<&AtomicBool>,
) -> Result<ScrapeRunResult> {
    Run::new(opts.jurisdiction).collect(opts, fetcher, progress, cancel)
}

/// Independent runs, one thread each, results in input order.
/// The fetcher and options are shared read-only; nothing else crosses threads.
pub fn collect_many(
    jurisdictions: &[Jurisdiction],
    opts: &ScrapeOptions,
    fetcher: &dyn Fetch,
    cancel: Option<&AtomicBool>,
) -> Vec<(Jurisdiction, Result<ScrapeRunResult>)> {
    thread::scope(|s| {
        let handles: Vec<_> = jurisdictions
            .iter()
            .map(|&j| {
                let opts = opts.for_jurisdiction(j);
                (j, s.spawn(move || collect_games(&opts, fetcher, None, cancel)))
            })
            .collect();

        handles
            .into_iter()
            .map(|(j, h)| {
                let result = h
                    .join()
                    .unwrap_or_else(|_| Err(ScrapeError::Worker(j.code().to_string())));
                (j, result)
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;

    struct FakeSite {
        pages: HashMap<String, String>,
        hits: Mutex<Vec<String>>,
    }

    impl FakeSite {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages.iter().map(|(u, b)| (u.to_string(), b.to_string())).collect(),
                hits: Mutex::new(Vec::new()),
            }
        }

        fn hits(&self) -> Vec<String> {
            self.hits.lock().unwrap().clone()
        }
    }

    impl Fetch for FakeSite {
        fn get(&self, url: &str) -> Result<String> {
            self.hits.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| ScrapeError::fetch(url, "HTTP 404 Not Found"))
        }
    }

    const LISTING_URL: &str = "http://site.test/new-jersey/scratch-offs";

    fn opts() -> ScrapeOptions {
        let mut o = ScrapeOptions::default();
        o.base_url = "http://site.test".into();
        o.pause = Duration::ZERO;
        o
    }

    fn listing(n: usize) -> String {
        let rows: String = (1..=n)
            .map(|i| format!(r#"<tr><td><a href="/g{i}">Game {i}</a></td><td>$5</td><td>1 in 4</td></tr>"#))
            .collect();
        format!("<table><tr><th>Game</th><th>Price</th><th>Odds</th></tr>{rows}</table>")
    }

    const DETAIL: &str = r#"<table><tr><th>Prize</th><th>Remaining</th></tr><tr><td>$10</td><td>5</td></tr></table>"#;

    #[test]
    fn listing_failure_fails_the_run() {
        let site = FakeSite::new(&[]);
        let mut run = Run::new(Jurisdiction::NewJersey);
        let err = run.collect(&opts(), &site, None, None).unwrap_err();
        assert!(matches!(err, ScrapeError::Fetch { .. }));
        assert_eq!(run.state(), RunState::Failed);
        assert!(run.collect(&opts(), &site, None, None).is_err());
    }

    #[test]
    fn breaker_stops_after_consecutive_failures() {
        let page = listing(6);
        let site = FakeSite::new(&[(LISTING_URL, page.as_str())]);
        let mut o = opts();
        o.max_consecutive_failures = 2;

        let result = collect_games(&o, &site, None, None).unwrap();
        assert_eq!(result.status, RunState::Done);
        assert_eq!(result.games.len(), 6);
        // listing + two failed details, nothing after
        assert_eq!(site.hits().len(), 3);
        assert_eq!(result.failures.len(), 6);
        assert_eq!(result.games[1].detail_status(), DetailStatus::Failed);
        assert_eq!(result.games[2].detail_status(), DetailStatus::Skipped);
        assert!(result.failures[5].reason.contains("2 consecutive"));
    }

    #[test]
    fn success_resets_the_streak() {
        let page = listing(4);
        let site = FakeSite::new(&[(LISTING_URL, page.as_str()), ("http://site.test/g2", DETAIL)]);
        let mut o = opts();
        o.max_consecutive_failures = 2;

        let result = collect_games(&o, &site, None, None).unwrap();
        // g1 fails, g2 ok, g3 + g4 fail: every detail page was tried
        assert_eq!(site.hits().len(), 5);
        assert_eq!(result.failures.len(), 3);
        assert_eq!(result.games[1].true_ev(), Some(10.0));
    }

    #[derive(Default)]
    struct Tally {
        total: Option<usize>,
        done: Vec<String>,
        failed: Vec<(String, String)>,
        finished: usize,
    }

    impl Progress for Tally {
        fn begin(&mut self, total: usize) {
            self.total = Some(total);
        }
        fn item_done(&mut self, game: &CandidateGame) {
            self.done.push(game.name.clone());
        }
        fn item_failed(&mut self, game: &CandidateGame, reason: &str) {
            self.failed.push((game.name.clone(), reason.to_string()));
        }
        fn finish(&mut self) {
            self.finished += 1;
        }
    }

    #[test]
    fn progress_sees_every_game_once() {
        let page = listing(5);
        let site = FakeSite::new(&[(LISTING_URL, page.as_str()), ("http://site.test/g2", DETAIL)]);
        let mut o = opts();
        o.max_consecutive_failures = 2;

        let mut tally = Tally::default();
        let result = collect_games(&o, &site, Some(&mut tally), None).unwrap();
        assert_eq!(result.failures.len(), 4);

        // g1 fails, g2 ok, g3 + g4 fail, g5 skipped by the breaker
        assert_eq!(tally.total, Some(5));
        assert_eq!(tally.done, ["Game 2"]);
        let failed: Vec<&str> = tally.failed.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(failed, ["Game 1", "Game 3", "Game 4", "Game 5"]);
        assert!(tally.failed[0].1.contains("404"));
        assert!(tally.failed[3].1.contains("2 consecutive"));
        assert_eq!(tally.finished, 1);
    }

    #[test]
    fn cancelled_run_keeps_listing_and_is_done() {
        let page = listing(3);
        let site = FakeSite::new(&[(LISTING_URL, page.as_str())]);
        let cancel = AtomicBool::new(true);

        let result = collect_games(&opts(), &site, None, Some(&cancel)).unwrap();
        assert_eq!(result.status, RunState::Done);
        assert_eq!(result.games.len(), 3);
        assert_eq!(site.hits(), vec![LISTING_URL.to_string()]);
        assert!(result.failures.iter().all(|f| f.reason == CANCELLED));
        assert!(result.games.iter().all(|g| g.detail_status() == DetailStatus::Skipped));
    }

    #[test]
    fn many_runs_return_in_input_order() {
        let nj = listing(1);
        let site = FakeSite::new(&[(LISTING_URL, nj.as_str()), ("http://site.test/g1", DETAIL)]);

        let out = collect_many(&[Jurisdiction::Texas, Jurisdiction::NewJersey], &opts(), &site, None);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].0, Jurisdiction::Texas);
        assert!(out[0].1.is_err());
        let nj_result = out[1].1.as_ref().unwrap();
        assert_eq!(nj_result.jurisdiction, Jurisdiction::NewJersey);
        assert_eq!(nj_result.games[0].detail_status(), DetailStatus::Parsed);
    }
}
