// src/lib.rs

#[macro_use]
pub mod log;

pub mod config;
pub mod core;
pub mod error;
pub mod jurisdiction;
pub mod normalize;
pub mod specs;

pub mod csv;
pub mod data;
pub mod export;
pub mod file;
pub mod metrics;
pub mod progress;
pub mod scrape;

#[cfg(feature = "cli")]
pub mod cli;

pub use data::{CandidateGame, DetailStatus, FailureRecord, Game, PrizeTier, RunState, ScrapeRunResult};
pub use error::{Result, ScrapeError, UnparsableValue};
pub use jurisdiction::Jurisdiction;
pub use scrape::{collect_games, collect_many};
