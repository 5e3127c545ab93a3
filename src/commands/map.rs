use std::{
    fs::File,
    io::{self, BufWriter},
    num::NonZero,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{info, warn};

use crate::{
    alignment::{self, ReadAlignmentsError},
    correspondence::CorrespondenceIndex,
    reader::{open, read_line},
    resolve::{self, ParseQueryError, Resolution},
};

#[derive(Debug, Error)]
pub enum MapError {
    #[error("I/O error")]
    Io(#[from] io::Error),
    #[error("could not open {}", .1.display())]
    OpenFile(#[source] io::Error, PathBuf),
    #[error("invalid alignments")]
    ReadAlignments(#[source] ReadAlignmentsError),
    #[error("line {1}: invalid query record")]
    ParseQuery(#[source] ParseQueryError, u64),
}

/// Resolves transcript positions to reference positions.
///
/// The alignment set is fully loaded and every correspondence map built
/// before the first query is read. Queries are then processed in file
/// order: resolved coordinates go to `results_dst`, unknown transcripts and
/// out-of-range positions are logged and skipped.
pub fn map<P, Q, R>(
    alignments_src: P,
    queries_src: Q,
    results_dst: R,
    worker_count: NonZero<usize>,
) -> Result<(), MapError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    R: AsRef<Path>,
{
    let alignments_src = alignments_src.as_ref();
    let queries_src = queries_src.as_ref();
    let results_dst = results_dst.as_ref();

    let mut reader =
        open(alignments_src).map_err(|e| MapError::OpenFile(e, alignments_src.into()))?;

    info!(src = ?alignments_src, "reading alignments");

    let alignment_set = alignment::read(&mut reader).map_err(MapError::ReadAlignments)?;

    info!(transcript_count = alignment_set.len(), "read alignments");
    info!(
        worker_count = worker_count.get(),
        "building coordinate correspondence"
    );

    let index = CorrespondenceIndex::from_alignments(&alignment_set, worker_count);

    let mut query_reader =
        open(queries_src).map_err(|e| MapError::OpenFile(e, queries_src.into()))?;

    let writer = File::create(results_dst)
        .map(BufWriter::new)
        .map_err(|e| MapError::OpenFile(e, results_dst.into()))?;
    let mut writer = resolve::Writer::new(writer);

    info!(src = ?queries_src, "resolving queries");

    let mut line = String::new();
    let mut line_no = 0;
    let mut record_count = 0u64;

    loop {
        line.clear();

        if read_line(&mut query_reader, &mut line)? == 0 {
            break;
        }

        line_no += 1;

        let (transcript_id, transcript_position) =
            resolve::parse_line(&line).map_err(|e| MapError::ParseQuery(e, line_no))?;

        let Some(resolutions) = resolve::resolve(&index, transcript_id, transcript_position)
        else {
            warn!(transcript_id, "transcript not present in alignments");
            continue;
        };

        for resolution in resolutions {
            match resolution {
                Resolution::Mapped {
                    reference_sequence_name,
                    position,
                } => {
                    writer.write_record(
                        transcript_id,
                        transcript_position,
                        reference_sequence_name,
                        position,
                    )?;

                    record_count += 1;
                }
                Resolution::OutOfRange {
                    reference_sequence_name,
                } => warn!(
                    transcript_id,
                    transcript_position,
                    reference_sequence_name,
                    "transcript position out of alignment range"
                ),
            }
        }
    }

    info!(record_count, "wrote resolved coordinates");

    Ok(())
}
