// src/config/consts.rs

// Net config
pub const BASE_URL: &str = "https://www.lottery.net";
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.9";
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

// Pacing
pub const REQUEST_PAUSE_MS: u64 = 1000; // be polite
pub const MAX_CONSECUTIVE_FAILURES: usize = 3; // likely blocked past this

// Ticket denominations seen across supported jurisdictions
pub const KNOWN_DENOMINATIONS: &[f64] = &[1.0, 2.0, 3.0, 5.0, 10.0, 20.0, 25.0, 30.0, 50.0, 100.0];

// Export
pub const DEFAULT_OUT_DIR: &str = "out";
pub const DEFAULT_FILE_PREFIX: &str = "scratchoffs";

// Logging
pub const LOG_ENV: &str = "SCRATCH_LOG";
pub const DEFAULT_LOG_LEVEL: &str = "info";
