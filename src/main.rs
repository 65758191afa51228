//! Command-line entry point: read a graph, match it, print the matching.

use std::fs::File;
use std::io::{BufReader, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use parmatch::{find_matching, io, sequential, Error};

#[derive(Parser, Debug)]
#[command(
    name = "parmatch",
    version,
    about = "Maximum matching in bipartite graphs via concurrent augmenting-path search"
)]
struct Args {
    /// Input graph file: a header "<vertices> <edges>", then one "<a> <b>"
    /// pair per edge, whitespace separated.
    input: PathBuf,

    /// Number of worker threads (clamped to the vertex count).
    #[arg(short, long, default_value = "1")]
    threads: NonZeroUsize,

    /// Run the single-threaded reference engine instead of the workers.
    #[arg(long)]
    sequential: bool,

    /// Dump the parsed adjacency structure to stderr before matching.
    #[arg(long)]
    print_graph: bool,
}

fn run(args: &Args) -> Result<(), Error> {
    let file = File::open(&args.input)?;
    let graph = io::read_graph(BufReader::new(file))?;

    if args.print_graph {
        io::write_graph(&graph, &mut std::io::stderr().lock())?;
    }

    if args.sequential {
        sequential::augment_to_maximum(&graph);
    } else {
        find_matching(&graph, args.threads.get());
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    io::write_matching(&graph, &mut out)?;
    out.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("parmatch: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
