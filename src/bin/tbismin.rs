//! Command-line front end: ingest a directory of indented-text tree files,
//! run backward bisimulation minimization, and print the resulting blocks.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::debug;

use tree_bisim::{parser, Automaton, Partition};

/// Minimizes a bottom-up tree automaton by backward bisimulation.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Directory containing one indented-text tree file per tree.
    directory: PathBuf,

    /// Raise the log level to show per-iteration diagnostics.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut automaton = Automaton::new();
    if let Err(err) = parser::ingest_directory(&mut automaton, &cli.directory) {
        eprintln!("tbismin: {err}");
        return ExitCode::FAILURE;
    }

    debug!("ingested {} states from {}", automaton.num_states(), cli.directory.display());

    let partition = tree_bisim::minimize_backward_with(&automaton, |i, p, r| {
        debug!("iteration {i}: |P|={} |R|={}", p.num_blocks(), r.num_blocks());
    });

    print_blocks(&partition);
    ExitCode::SUCCESS
}

fn print_blocks(partition: &Partition) {
    for block in 0..partition.num_blocks() {
        let mut states: Vec<_> = partition.states_of(block).iter().copied().collect();
        states.sort_unstable();
        let members = states.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
        println!("{{{members}}}");
    }
}
