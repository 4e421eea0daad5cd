//! tola-content - inspect and publish a static site content tree.

use anyhow::Result;
use clap::{ColorChoice, Parser};
use tola_content::cli::{self, Cli};
use tola_content::logger;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    cli::run(&cli)
}
