// src/config/options.rs
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use super::consts::*;
use crate::error::{Result, ScrapeError};
use crate::file::looks_like_dir_hint;
use crate::jurisdiction::Jurisdiction;

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AppOptions {
    pub scrape: ScrapeOptions,
    pub export: ExportOptions,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScrapeOptions {
    pub jurisdiction: Jurisdiction,
    /// Scheme + host of the source site, no trailing slash.
    pub base_url: String,
    pub user_agent: String,
    /// Per-request bound; a timeout is a fetch failure like any other.
    pub timeout: Duration,
    /// Fixed pause before each detail request.
    pub pause: Duration,
    /// Stop fetching details after this many failures in a row. 0 disables.
    pub max_consecutive_failures: usize,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            jurisdiction: Jurisdiction::NewJersey,
            base_url: BASE_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            pause: Duration::from_millis(REQUEST_PAUSE_MS),
            max_consecutive_failures: MAX_CONSECUTIVE_FAILURES,
        }
    }
}

impl ScrapeOptions {
    /// Defaults, overridden by `SCRATCH_*` environment variables when set.
    pub fn from_env() -> Result<Self> {
        let mut opts = Self::default();
        if let Some(code) = env_var("SCRATCH_STATE") {
            opts.jurisdiction = code.parse()?;
        }
        if let Some(url) = env_var("SCRATCH_BASE_URL") {
            opts.set_base_url(&url)?;
        }
        if let Some(ua) = env_var("SCRATCH_USER_AGENT") {
            opts.user_agent = ua;
        }
        if let Some(secs) = env_parse::<u64>("SCRATCH_TIMEOUT_SECS")? {
            opts.timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(ms) = env_parse::<u64>("SCRATCH_DELAY_MS")? {
            opts.pause = Duration::from_millis(ms);
        }
        if let Some(n) = env_parse::<usize>("SCRATCH_MAX_FAILURES")? {
            opts.max_consecutive_failures = n;
        }
        Ok(opts)
    }

    pub fn set_base_url(&mut self, url: &str) -> Result<()> {
        let url = url.trim().trim_end_matches('/');
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ScrapeError::Config(format!("base URL must be http(s): {url:?}")));
        }
        self.base_url = url.to_string();
        Ok(())
    }

    pub fn listing_url(&self) -> String {
        self.jurisdiction.listing_url(&self.base_url)
    }

    /// Same settings, another jurisdiction.
    pub fn for_jurisdiction(&self, jurisdiction: Jurisdiction) -> Self {
        Self { jurisdiction, ..self.clone() }
    }
}

fn env_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>> {
    match env_var(key) {
        None => Ok(None),
        Some(v) => v
            .parse::<T>()
            .map(Some)
            .map_err(|_| ScrapeError::Config(format!("{key} is not a valid number: {v:?}"))),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Tsv,
}

impl ExportFormat {
    pub fn ext(&self) -> &'static str {
        match self { ExportFormat::Csv => "csv", ExportFormat::Tsv => "tsv" }
    }
    pub fn delim(&self) -> char {
        match self { ExportFormat::Csv => ',', ExportFormat::Tsv => '\t' }
    }
}

impl FromStr for ExportFormat {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "tsv" => Ok(ExportFormat::Tsv),
            other => Err(ScrapeError::Config(format!("unknown format: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    out_path: OutputPath,
    pub include_headers: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Csv,
            out_path: OutputPath::default(),
            include_headers: true,
        }
    }
}

impl ExportOptions {
    /// Final file path for a run of `jurisdiction`.
    ///
    /// No file name given → `scratchoffs_<CODE>.<ext>` in the directory.
    /// A file name without extension gets the format's extension; one with
    /// an extension is kept as typed.
    pub fn out_path(&self, jurisdiction: Jurisdiction) -> PathBuf {
        let ext = self.format.ext();
        let file = match &self.out_path.file_name {
            None => OsString::from(format!("{DEFAULT_FILE_PREFIX}_{}.{ext}", jurisdiction.code())),
            Some(name) if Path::new(name).extension().is_none() => {
                let mut n = name.clone();
                n.push(".");
                n.push(ext);
                n
            }
            Some(name) => name.clone(),
        };
        self.out_path.dir.join(file)
    }

    /// Parse user text into dir + optional file name.
    /// A trailing separator or an existing directory means "directory only".
    pub fn set_path(&mut self, text: &str) {
        let s = text.trim();
        if s.is_empty() {
            self.out_path = OutputPath::default();
            return;
        }
        let p = Path::new(s);
        if looks_like_dir_hint(p) || p.is_dir() {
            self.out_path = OutputPath { dir: p.to_path_buf(), file_name: None };
            return;
        }
        self.out_path = OutputPath {
            dir: p.parent().map(Path::to_path_buf).unwrap_or_default(),
            file_name: p.file_name().map(|n| n.to_os_string()),
        };
    }

    pub fn delim(&self) -> char {
        self.format.delim()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct OutputPath {
    dir: PathBuf,
    file_name: Option<OsString>,
}

impl Default for OutputPath {
    fn default() -> Self {
        Self { dir: PathBuf::from(DEFAULT_OUT_DIR), file_name: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_is_per_jurisdiction() {
        let opts = ExportOptions::default();
        let p = opts.out_path(Jurisdiction::Texas);
        assert_eq!(p, PathBuf::from("out").join("scratchoffs_TX.csv"));
    }

    #[test]
    fn extension_follows_format_until_user_types_one() {
        let mut opts = ExportOptions::default();
        opts.set_path("reports/nj_games");
        opts.format = ExportFormat::Tsv;
        assert!(opts.out_path(Jurisdiction::NewJersey).to_string_lossy().ends_with("nj_games.tsv"));

        opts.set_path("reports/nj_games.data");
        assert!(opts.out_path(Jurisdiction::NewJersey).to_string_lossy().ends_with("nj_games.data"));
    }

    #[test]
    fn dir_hint_keeps_default_name() {
        let mut opts = ExportOptions::default();
        opts.set_path("exports/");
        let p = opts.out_path(Jurisdiction::Florida);
        assert_eq!(p.file_name().unwrap(), "scratchoffs_FL.csv");
        assert!(p.starts_with("exports"));
    }

    #[test]
    fn base_url_must_be_http() {
        let mut opts = ScrapeOptions::default();
        assert!(opts.set_base_url("ftp://example.org").is_err());
        opts.set_base_url("http://127.0.0.1:8080/").unwrap();
        assert_eq!(opts.base_url, "http://127.0.0.1:8080");
        assert_eq!(opts.listing_url(), "http://127.0.0.1:8080/new-jersey/scratch-offs");
    }
}
