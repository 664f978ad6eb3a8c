mod app;
mod cli;
mod commands;
mod config;
mod content;
mod deck;
mod effects;
mod input;
mod parser;
mod render;
mod reveal;
mod schedule;
mod scroll;
mod segment;
mod theme;

use clap::Parser;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use cli::Cli;

fn level(verbose: u8, quiet: bool) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "scrolldeck=debug,info",
        (false, _) => "scrolldeck=trace,info",
    }
}

fn init_tracing(verbose: u8, quiet: bool, color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level(verbose, quiet)));
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(color)
        .with_target(verbose > 0);
    tracing_subscriber::registry().with(filter).with(layer).init();
}

fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    init_tracing(cli.verbose, cli.quiet, !cli.no_color);

    if let Err(e) = cli.run() {
        eprintln!("{} {e:#}", colored::Colorize::red("error:"));
        std::process::exit(1);
    }
}
