use std::{fmt, num, num::NonZero, str::FromStr};

use thiserror::Error;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Kind {
    Match,
    Insertion,
    Deletion,
    Skip,
    SoftClip,
    HardClip,
    Pad,
    SequenceMatch,
    SequenceMismatch,
}

/// How an operation advances the transcript and reference counters.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Consumption {
    Both,
    Reference,
    Query,
    Neither,
}

impl Kind {
    pub const fn consumption(self) -> Consumption {
        match self {
            Self::Match | Self::SequenceMatch | Self::SequenceMismatch => Consumption::Both,
            Self::Deletion | Self::Skip => Consumption::Reference,
            Self::Insertion | Self::SoftClip => Consumption::Query,
            Self::HardClip | Self::Pad => Consumption::Neither,
        }
    }
}

impl TryFrom<char> for Kind {
    type Error = ParseError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c.to_ascii_uppercase() {
            'M' => Ok(Self::Match),
            'I' => Ok(Self::Insertion),
            'D' => Ok(Self::Deletion),
            'N' => Ok(Self::Skip),
            'S' => Ok(Self::SoftClip),
            'H' => Ok(Self::HardClip),
            'P' => Ok(Self::Pad),
            '=' => Ok(Self::SequenceMatch),
            'X' => Ok(Self::SequenceMismatch),
            _ => Err(ParseError::InvalidOp(c)),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Self::Match => 'M',
            Self::Insertion => 'I',
            Self::Deletion => 'D',
            Self::Skip => 'N',
            Self::SoftClip => 'S',
            Self::HardClip => 'H',
            Self::Pad => 'P',
            Self::SequenceMatch => '=',
            Self::SequenceMismatch => 'X',
        };

        write!(f, "{c}")
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Op {
    kind: Kind,
    len: NonZero<u64>,
}

impl Op {
    pub const fn new(kind: Kind, len: NonZero<u64>) -> Self {
        Self { kind, len }
    }

    pub const fn kind(&self) -> Kind {
        self.kind
    }

    pub const fn len(&self) -> NonZero<u64> {
        self.len
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.len, self.kind)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Cigar(Vec<Op>);

impl Cigar {
    pub fn iter(&self) -> impl Iterator<Item = &Op> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Cigar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for op in &self.0 {
            write!(f, "{op}")?;
        }

        Ok(())
    }
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum ParseError {
    #[error("empty input")]
    Empty,
    #[error("invalid operation length")]
    InvalidLength(#[source] num::ParseIntError),
    #[error("invalid operation: {0}")]
    InvalidOp(char),
    #[error("missing operation after length")]
    MissingOp,
}

impl FromStr for Cigar {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseError::Empty);
        }

        let mut ops = Vec::new();
        let mut raw_len = String::new();

        for c in s.chars() {
            if c.is_ascii_alphabetic() || c == '=' {
                // the accumulator must be a positive integer
                let len = raw_len.parse().map_err(ParseError::InvalidLength)?;
                let kind = Kind::try_from(c)?;

                ops.push(Op::new(kind, len));
                raw_len.clear();
            } else {
                raw_len.push(c);
            }
        }

        if !raw_len.is_empty() {
            return Err(ParseError::MissingOp);
        }

        Ok(Self(ops))
    }
}
