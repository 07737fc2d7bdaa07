// src/bin/cli.rs
use scratch_ev::cli;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    cli::run()
}
