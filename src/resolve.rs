use std::{
    io::{self, Write},
    num,
};

use thiserror::Error;

use crate::correspondence::CorrespondenceIndex;

const MIN_FIELD_COUNT: usize = 2;

#[derive(Debug, Error, Eq, PartialEq)]
pub enum ParseQueryError {
    #[error("expected at least {MIN_FIELD_COUNT} fields")]
    MissingFields,
    #[error("invalid transcript position")]
    InvalidPosition(#[source] num::ParseIntError),
}

pub fn parse_line(s: &str) -> Result<(&str, u64), ParseQueryError> {
    let mut fields = s.split_whitespace();

    let transcript_id = fields.next().ok_or(ParseQueryError::MissingFields)?;
    let raw_position = fields.next().ok_or(ParseQueryError::MissingFields)?;

    let position = raw_position
        .parse()
        .map_err(ParseQueryError::InvalidPosition)?;

    Ok((transcript_id, position))
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Resolution<'i> {
    Mapped {
        reference_sequence_name: &'i str,
        position: u64,
    },
    OutOfRange {
        reference_sequence_name: &'i str,
    },
}

/// Resolves a transcript position against every chromosome the transcript
/// aligns to, in insertion order.
///
/// Returns `None` when the transcript is not in the index. A single query
/// can yield a mix of mapped and out-of-range resolutions.
pub fn resolve<'i>(
    index: &'i CorrespondenceIndex,
    transcript_id: &str,
    transcript_position: u64,
) -> Option<Vec<Resolution<'i>>> {
    let maps = index.get(transcript_id)?;

    let resolutions = maps
        .iter()
        .map(
            |(reference_sequence_name, map)| match map.get(transcript_position) {
                Some(position) => Resolution::Mapped {
                    reference_sequence_name,
                    position,
                },
                None => Resolution::OutOfRange {
                    reference_sequence_name,
                },
            },
        )
        .collect();

    Some(resolutions)
}

pub struct Writer<W> {
    inner: W,
}

impl<W> Writer<W>
where
    W: Write,
{
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn write_record(
        &mut self,
        transcript_id: &str,
        transcript_position: u64,
        reference_sequence_name: &str,
        position: u64,
    ) -> io::Result<()> {
        writeln!(
            self.inner,
            "{transcript_id}\t{transcript_position}\t{reference_sequence_name}\t{position}"
        )
    }
}
