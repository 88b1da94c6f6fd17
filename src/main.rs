use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{ArgAction, Parser};
use log::{error, info, LevelFilter};
use thiserror::Error;

use topdown_synth::grammar::{Grammar, GrammarError};
use topdown_synth::search::{Limits, Search, SynthError};
use topdown_synth::synth::{parse_examples, Example, ExampleError};

#[derive(Parser)]
#[command(name = "topdown-synth", version, about = "Synthesize an integer program from input/output examples")]
struct Cli {
    /// An example such as `x=1, y=0, z=0 -> 2` (repeatable)
    #[arg(short, long = "example", value_name = "EXAMPLE")]
    examples: Vec<String>,

    /// File with one example per line
    #[arg(long, value_name = "FILE")]
    examples_file: Option<PathBuf>,

    /// Grammar file; the built-in arithmetic grammar otherwise
    #[arg(short, long, value_name = "FILE")]
    grammar: Option<PathBuf>,

    /// Stop after constructing this many tree nodes
    #[arg(long)]
    max_nodes: Option<usize>,

    /// Stop once the worklist grows past this size
    #[arg(long)]
    max_queue: Option<usize>,

    /// Stop after examining this many trees
    #[arg(long)]
    max_steps: Option<usize>,

    /// Stop after this many milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("cannot read {}: {}", .0.display(), .1)]
    Io(PathBuf, std::io::Error),
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    #[error(transparent)]
    Example(#[from] ExampleError),
    #[error(transparent)]
    Synth(#[from] SynthError),
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|e| CliError::Io(path.to_path_buf(), e))
}

fn run(cli: Cli) -> Result<(), CliError> {
    let grammar = match &cli.grammar {
        Some(path) => Grammar::parse(&read(path)?)?,
        None => Grammar::arithmetic(),
    };

    let mut examples = cli.examples.iter()
        .map(|e| e.parse::<Example>())
        .collect::<Result<Vec<_>, _>>()?;
    if let Some(path) = &cli.examples_file {
        examples.extend(parse_examples(&read(path)?)?);
    }

    let limits = Limits {
        max_nodes: cli.max_nodes,
        max_queue: cli.max_queue,
        max_steps: cli.max_steps,
        timeout: cli.timeout_ms.map(Duration::from_millis),
        cancel: None,
    };

    let mut search = Search::new(grammar, examples, limits)?;
    let prog = search.run()?;
    info!("Stats: {:?}", search.stats());

    println!("{prog}");

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    colog::default_builder()
        .filter_level(level)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        },
    }
}
