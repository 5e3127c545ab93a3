use std::{num::NonZero, path::PathBuf};

use clap::Parser;
use git_testament::{git_testament, render_testament};

git_testament!(TESTAMENT);

#[derive(Parser)]
#[command(version = render_testament!(TESTAMENT))]
pub struct Cli {
    /// Output destination for resolved coordinates.
    #[arg(short = 'o', long, default_value = "Output.txt")]
    pub output: PathBuf,

    /// Force a specific number of threads.
    #[arg(long)]
    pub threads: Option<NonZero<usize>>,

    /// Input alignments file (transcript, chromosome, start, CIGAR).
    pub alignments: PathBuf,

    /// Input queries file (transcript, position).
    pub queries: PathBuf,
}
