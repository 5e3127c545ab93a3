pub use self::{
    alignment::{Alignment, AlignmentSet},
    cigar::Cigar,
    correspondence::{CorrespondenceIndex, CorrespondenceMap},
    resolve::Resolution,
};

pub mod alignment;
pub mod cigar;
pub mod cli;
pub mod commands;
pub mod correspondence;
mod reader;
pub mod resolve;

pub use self::cli::Cli;
