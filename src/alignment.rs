use std::{
    collections::HashMap,
    io::{self, BufRead},
    num,
};

use thiserror::Error;
use tracing::warn;

use crate::{
    cigar::{self, Cigar, Kind},
    reader::read_line,
};

const MIN_FIELD_COUNT: usize = 4;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Alignment {
    reference_sequence_name: String,
    start: u64,
    cigar: Cigar,
}

impl Alignment {
    pub fn new(reference_sequence_name: String, start: u64, cigar: Cigar) -> Self {
        Self {
            reference_sequence_name,
            start,
            cigar,
        }
    }

    pub fn reference_sequence_name(&self) -> &str {
        &self.reference_sequence_name
    }

    /// 0-based position on the reference where the alignment begins.
    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn cigar(&self) -> &Cigar {
        &self.cigar
    }
}

#[derive(Debug, Default)]
pub struct AlignmentSet {
    entries: HashMap<String, Vec<Alignment>>,
}

impl AlignmentSet {
    /// Inserts an alignment, keyed by (transcript, chromosome).
    ///
    /// The last record wins for a repeated pair. The replaced entry keeps
    /// its slot, so chromosome iteration order stays the order of first
    /// appearance.
    pub fn insert(&mut self, transcript_id: String, alignment: Alignment) {
        let position = self.entries.get(&transcript_id).and_then(|alignments| {
            alignments
                .iter()
                .position(|a| a.reference_sequence_name() == alignment.reference_sequence_name())
        });

        if position.is_some() {
            warn!(
                transcript_id = transcript_id.as_str(),
                reference_sequence_name = alignment.reference_sequence_name(),
                "replacing duplicate alignment"
            );
        }

        let alignments = self.entries.entry(transcript_id).or_default();

        match position {
            Some(i) => alignments[i] = alignment,
            None => alignments.push(alignment),
        }
    }

    pub fn get(&self, transcript_id: &str) -> Option<&[Alignment]> {
        self.entries.get(transcript_id).map(|list| list.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<Alignment>)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum ReadAlignmentsError {
    #[error("I/O error")]
    Io(#[from] io::Error),
    #[error("line {0}: expected at least {MIN_FIELD_COUNT} fields")]
    MissingFields(u64),
    #[error("line {0}: invalid start coordinate")]
    InvalidCoordinate(u64, #[source] num::ParseIntError),
    #[error("line {0}: invalid CIGAR string")]
    InvalidCigarFormat(u64),
    #[error("line {0}: malformed CIGAR string")]
    MalformedCigar(u64, #[source] cigar::ParseError),
}

/// Reads alignment records into an alignment set.
///
/// Any invalid record fails the whole read, so no partial set escapes.
pub fn read<R>(reader: &mut R) -> Result<AlignmentSet, ReadAlignmentsError>
where
    R: BufRead,
{
    let mut alignment_set = AlignmentSet::default();

    let mut line = String::new();
    let mut line_no = 0;

    loop {
        line.clear();

        if read_line(reader, &mut line)? == 0 {
            break;
        }

        line_no += 1;

        let (transcript_id, alignment) = parse_line(&line, line_no)?;
        alignment_set.insert(transcript_id.into(), alignment);
    }

    Ok(alignment_set)
}

fn parse_line(s: &str, line_no: u64) -> Result<(&str, Alignment), ReadAlignmentsError> {
    let mut fields = s.split_whitespace();

    let transcript_id = fields
        .next()
        .ok_or(ReadAlignmentsError::MissingFields(line_no))?;
    let reference_sequence_name = fields
        .next()
        .ok_or(ReadAlignmentsError::MissingFields(line_no))?;
    let raw_start = fields
        .next()
        .ok_or(ReadAlignmentsError::MissingFields(line_no))?;
    let raw_cigar = fields
        .next()
        .ok_or(ReadAlignmentsError::MissingFields(line_no))?;

    let start = raw_start
        .parse()
        .map_err(|e| ReadAlignmentsError::InvalidCoordinate(line_no, e))?;

    if !is_cigar_like(raw_cigar) {
        return Err(ReadAlignmentsError::InvalidCigarFormat(line_no));
    }

    let cigar = raw_cigar
        .parse()
        .map_err(|e| ReadAlignmentsError::MalformedCigar(line_no, e))?;

    Ok((
        transcript_id,
        Alignment::new(reference_sequence_name.into(), start, cigar),
    ))
}

// The string must contain at least one digit run immediately followed by an
// operation code before tokenization is attempted.
fn is_cigar_like(s: &str) -> bool {
    let mut prev_is_digit = false;

    for c in s.chars() {
        if c.is_ascii_digit() {
            prev_is_digit = true;
        } else {
            if prev_is_digit && Kind::try_from(c).is_ok() {
                return true;
            }

            prev_is_digit = false;
        }
    }

    false
}
