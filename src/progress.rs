// src/progress.rs
use crate::data::CandidateGame;

/// Progress reporting for a scrape run.
/// Frontends implement this to surface status to users; every method has a no-op default.
pub trait Progress {
    /// Called once the listing is parsed, with the number of detail pages to visit.
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// A game's detail page was fetched and parsed.
    fn item_done(&mut self, _game: &CandidateGame) {}

    /// A game's detail page failed, was skipped, or the run was cancelled before it.
    fn item_failed(&mut self, _game: &CandidateGame, _reason: &str) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}
