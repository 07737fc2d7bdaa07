// tests/export.rs
use std::fs;
use std::path::PathBuf;

use scratch_ev::config::options::{ExportFormat, ExportOptions};
use scratch_ev::csv::parse_rows;
use scratch_ev::export::HEADERS;
use scratch_ev::file;
use scratch_ev::specs::detail;
use scratch_ev::{CandidateGame, DetailStatus, Game, Jurisdiction};

fn tmp_dir(name: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("scratch_ev_{name}"));
    let _ = fs::remove_dir_all(&p);
    fs::create_dir_all(&p).unwrap();
    p
}

fn games() -> Vec<Game> {
    let detail_doc = fs::read_to_string(
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/detail_full.html"),
    )
    .unwrap();
    let page = detail::parse(&detail_doc, "fixture").unwrap();

    let candidate = |name: &str, price| CandidateGame {
        jurisdiction: Jurisdiction::Pennsylvania,
        name: name.to_string(),
        price,
        detail_url: format!("https://example.test/{name}"),
        game_number: Some(7),
        listed_odds: None,
        top_prize: Some(1000.0),
        top_prizes_remaining: None,
    };
    vec![
        Game::assemble(candidate("lucky", Some(5.0)), Some(page), DetailStatus::Parsed, "2026-10-16T12:00:00Z"),
        Game::assemble(candidate("unknown", None), None, DetailStatus::Failed, "2026-10-16T12:00:00Z"),
    ]
}

#[test]
fn csv_export_round_trips_through_reader() {
    let dir = tmp_dir("csv");
    let mut opts = ExportOptions::default();
    opts.set_path(&format!("{}/", dir.display()));

    let games = games();
    let refs: Vec<&Game> = games.iter().collect();
    let path = file::write_export(&opts, Jurisdiction::Pennsylvania, &refs).unwrap();
    assert_eq!(path.file_name().unwrap(), "scratchoffs_PA.csv");

    let rows = parse_rows(&fs::read_to_string(&path).unwrap(), ',');
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], HEADERS.iter().map(|h| h.to_string()).collect::<Vec<_>>());

    let parsed = &rows[1];
    assert_eq!(parsed[0], "PA");
    assert_eq!(parsed[4], "4.5");
    assert_eq!(parsed[6], "14.95");
    assert_eq!(parsed[10], "parsed");
    let tiers: serde_json::Value = serde_json::from_str(&parsed[13]).unwrap();
    assert_eq!(tiers.as_array().unwrap().len(), 2);
    assert_eq!(tiers[0]["remaining"], 10);

    // unknowns stay empty, never zero
    let unknown = &rows[2];
    assert_eq!(unknown[3], "");
    assert_eq!(unknown[6], "");
    assert_eq!(unknown[13], "");
}

#[test]
fn tsv_to_named_file_without_headers() {
    let dir = tmp_dir("tsv");
    let mut opts = ExportOptions::default();
    opts.format = ExportFormat::Tsv;
    opts.include_headers = false;
    opts.set_path(dir.join("pa_games").to_str().unwrap());

    let games = games();
    let refs: Vec<&Game> = games.iter().take(1).collect();
    let path = file::write_export(&opts, Jurisdiction::Pennsylvania, &refs).unwrap();
    assert!(path.to_string_lossy().ends_with("pa_games.tsv"));

    let rows = parse_rows(&fs::read_to_string(&path).unwrap(), '\t');
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][2], "lucky");
}

#[test]
fn export_into_a_file_path_fails_cleanly() {
    let dir = tmp_dir("blocked");
    let blocker = dir.join("not_a_dir");
    fs::write(&blocker, "x").unwrap();

    let mut opts = ExportOptions::default();
    opts.set_path(blocker.join("out.csv").to_str().unwrap());
    let games = games();
    let refs: Vec<&Game> = games.iter().collect();
    assert!(file::write_export(&opts, Jurisdiction::Pennsylvania, &refs).is_err());
}
