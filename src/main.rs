use std::{num::NonZero, process, thread};

use clap::Parser;
use mimalloc::MiMalloc;
use trmap::{
    alignment::ReadAlignmentsError,
    commands::{self, MapError},
    resolve::ParseQueryError,
    Cli,
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let worker_count = cli
        .threads
        .unwrap_or_else(|| thread::available_parallelism().unwrap_or(NonZero::<usize>::MIN));

    if let Err(e) = commands::map(&cli.alignments, &cli.queries, &cli.output, worker_count) {
        let code = exit_code(&e);
        eprintln!("trmap: {:#}", anyhow::Error::new(e));
        process::exit(code);
    }
}

// Each fatal error kind maps to its own exit code. 2 is left to clap's
// usage errors.
fn exit_code(e: &MapError) -> i32 {
    match e {
        MapError::Io(_) | MapError::OpenFile(..) => 1,
        MapError::ReadAlignments(e) => match e {
            ReadAlignmentsError::Io(_) => 1,
            ReadAlignmentsError::MissingFields(_) => 3,
            ReadAlignmentsError::InvalidCoordinate(..) => 4,
            ReadAlignmentsError::InvalidCigarFormat(_) => 5,
            ReadAlignmentsError::MalformedCigar(..) => 6,
        },
        MapError::ParseQuery(e, _) => match e {
            ParseQueryError::MissingFields => 3,
            ParseQueryError::InvalidPosition(_) => 4,
        },
    }
}
