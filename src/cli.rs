// src/cli.rs
use std::{env, path::PathBuf, time::Duration};

use color_eyre::eyre::{Result, eyre};

use crate::config::options::{AppOptions, ScrapeOptions};
use crate::core::net::HttpFetcher;
use crate::data::{CandidateGame, ScrapeRunResult};
use crate::error::ScrapeError;
use crate::jurisdiction::Jurisdiction;
use crate::normalize::parse_currency;
use crate::progress::Progress;
use crate::{export, file, scrape};

pub enum Command {
    Help,
    ListStates,
    Scrape(Params),
}

pub struct Params {
    pub options: AppOptions,
    pub states: Vec<Jurisdiction>,
    pub prices: Vec<f64>,
    pub json: bool,
    pub log_file: Option<PathBuf>,
}

pub fn run() -> Result<()> {
    let defaults = ScrapeOptions::from_env()?;
    let params = match parse_args(env::args().skip(1), defaults)? {
        Command::Help => {
            eprintln!("{}", include_str!("cli_help.txt"));
            return Ok(());
        }
        Command::ListStates => {
            for j in Jurisdiction::ALL {
                println!("{}\t{}", j.code(), j.name());
            }
            return Ok(());
        }
        Command::Scrape(p) => p,
    };

    crate::log::init(params.log_file.as_deref())?;
    let fetcher = HttpFetcher::new(&params.options.scrape)?;

    let results: Vec<(Jurisdiction, Result<ScrapeRunResult, ScrapeError>)> = match params.states.as_slice() {
        [one] => {
            let opts = params.options.scrape.for_jurisdiction(*one);
            let mut progress = CliProgress::default();
            vec![(*one, scrape::collect_games(&opts, &fetcher, Some(&mut progress), None))]
        }
        many => scrape::collect_many(many, &params.options.scrape, &fetcher, None),
    };

    let mut fatal = Vec::new();
    for (j, result) in results {
        match result {
            Ok(run) => report(&params, &run)?,
            Err(e) => {
                eprintln!("{j}: {e}");
                fatal.push(j.code());
            }
        }
    }
    if !fatal.is_empty() {
        return Err(eyre!("scrape failed for {}", fatal.join(", ")));
    }
    Ok(())
}

fn report(params: &Params, run: &ScrapeRunResult) -> Result<()> {
    let games = run.games_priced(&params.prices);
    let path = file::write_export(&params.options.export, run.jurisdiction, &games)?;
    eprintln!(
        "{}: wrote {} of {} game(s) to {}",
        run.jurisdiction,
        games.len(),
        run.games.len(),
        path.display()
    );
    if run.skipped_listing_rows > 0 {
        eprintln!("{}: {} malformed listing row(s) skipped", run.jurisdiction, run.skipped_listing_rows);
    }
    if !run.failures.is_empty() {
        eprintln!("{}: {} detail page(s) without tiers:", run.jurisdiction, run.failures.len());
        for f in &run.failures {
            eprintln!("  {} ({}): {}", f.name, f.reference, f.reason);
        }
    }
    if params.json {
        println!("{}", export::to_json(run)?);
    }
    Ok(())
}

pub fn parse_args<I>(args: I, scrape: ScrapeOptions) -> Result<Command, ScrapeError>
where
    I: IntoIterator<Item = String>,
{
    let mut options = AppOptions { scrape, ..AppOptions::default() };
    let mut states = vec![options.scrape.jurisdiction];
    let mut prices = Vec::new();
    let mut json = false;
    let mut log_file = None;
    let mut out: Option<String> = None;

    let mut args = args.into_iter();
    while let Some(a) = args.next() {
        let mut value = |name: &str| {
            args.next().ok_or_else(|| ScrapeError::Config(format!("Missing value for {name}")))
        };
        match a.as_str() {
            "-s" | "--state" => states = parse_state_list(&value("--state")?)?,
            "-o" | "--out" => out = Some(value("--out")?),
            "--format" => options.export.format = value("--format")?.parse()?,
            "--no-headers" => options.export.include_headers = false,
            "--include-headers" => options.export.include_headers = true,
            "--json" => json = true,
            "--price" => prices = parse_price_list(&value("--price")?)?,
            "--delay-ms" => options.scrape.pause = Duration::from_millis(number(&value("--delay-ms")?, "--delay-ms")?),
            "--timeout-secs" => {
                options.scrape.timeout = Duration::from_secs(number(&value("--timeout-secs")?, "--timeout-secs")?.max(1))
            }
            "--max-failures" => {
                options.scrape.max_consecutive_failures = number(&value("--max-failures")?, "--max-failures")? as usize
            }
            "--base-url" => options.scrape.set_base_url(&value("--base-url")?)?,
            "--log-file" => log_file = Some(PathBuf::from(value("--log-file")?)),
            "--list-states" => return Ok(Command::ListStates),
            "-h" | "--help" => return Ok(Command::Help),
            _ => return Err(ScrapeError::Config(format!("Unknown arg: {a}"))),
        }
    }

    // set after --format so an extension-less name picks up the right one
    if let Some(o) = out {
        options.export.set_path(&o);
    }
    if let Some(first) = states.first() {
        options.scrape.jurisdiction = *first;
    }
    Ok(Command::Scrape(Params { options, states, prices, json, log_file }))
}

fn number(v: &str, flag: &str) -> Result<u64, ScrapeError> {
    v.trim()
        .parse()
        .map_err(|_| ScrapeError::Config(format!("{flag} expects a whole number, got {v:?}")))
}

/// "NJ,ny" → [NJ, NY]. Unknown codes fail before anything is fetched.
fn parse_state_list(s: &str) -> Result<Vec<Jurisdiction>, ScrapeError> {
    let mut out: Vec<Jurisdiction> = Vec::new();
    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let j: Jurisdiction = part.parse()?;
        if !out.contains(&j) {
            out.push(j);
        }
    }
    if out.is_empty() {
        return Err(ScrapeError::Config("--state needs at least one code".into()));
    }
    Ok(out)
}

/// "5,$10, 20" → [5.0, 10.0, 20.0]
fn parse_price_list(s: &str) -> Result<Vec<f64>, ScrapeError> {
    let mut out = Vec::new();
    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match parse_currency(part) {
            Ok(Some(p)) if p > 0.0 => out.push(p),
            _ => return Err(ScrapeError::Config(format!("Invalid price: {part}"))),
        }
    }
    Ok(out)
}

/// Progress lines on stderr, one per detail page.
#[derive(Default)]
struct CliProgress {
    total: usize,
    seen: usize,
}

impl Progress for CliProgress {
    fn begin(&mut self, total: usize) {
        self.total = total;
        eprintln!("Fetching {total} detail page(s)...");
    }

    fn log(&mut self, msg: &str) {
        eprintln!("{msg}");
    }

    fn item_done(&mut self, game: &CandidateGame) {
        self.seen += 1;
        eprintln!("[{}/{}] {}", self.seen, self.total, game.name);
    }

    fn item_failed(&mut self, game: &CandidateGame, reason: &str) {
        self.seen += 1;
        eprintln!("[{}/{}] {}: {reason}", self.seen, self.total, game.name);
    }
}
