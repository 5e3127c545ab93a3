use std::{collections::HashMap, num::NonZero, thread};

use crate::{
    alignment::{Alignment, AlignmentSet},
    cigar::{Cigar, Consumption},
};

const CHUNK_SIZE: usize = 64;

/// Transcript position to reference position correspondence for one
/// alignment.
///
/// The map is partial: only positions consumed by both the transcript and
/// the reference have entries. Positions covered by query-only operations
/// (insertions, soft clips) are skipped over and later resolve out of range.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CorrespondenceMap(HashMap<u64, u64>);

impl CorrespondenceMap {
    pub fn new(start: u64, cigar: &Cigar) -> Self {
        let mut entries = HashMap::new();

        let mut transcript_position = 0;
        let mut reference_position = start;

        for op in cigar.iter() {
            let len = op.len().get();

            match op.kind().consumption() {
                Consumption::Both => {
                    for _ in 0..len {
                        entries.insert(transcript_position, reference_position);
                        transcript_position += 1;
                        reference_position += 1;
                    }
                }
                Consumption::Reference => reference_position += len,
                Consumption::Query => transcript_position += len,
                Consumption::Neither => {}
            }
        }

        Self(entries)
    }

    pub fn get(&self, transcript_position: u64) -> Option<u64> {
        self.0.get(&transcript_position).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Correspondence maps for every (transcript, chromosome) pair in an
/// alignment set, built before any query is resolved.
pub struct CorrespondenceIndex {
    entries: HashMap<String, Vec<(String, CorrespondenceMap)>>,
}

impl CorrespondenceIndex {
    pub fn from_alignments(alignment_set: &AlignmentSet, worker_count: NonZero<usize>) -> Self {
        let jobs: Vec<&Alignment> = alignment_set
            .iter()
            .flat_map(|(_, alignments)| alignments.iter())
            .collect();

        let maps = build_maps(&jobs, worker_count);
        let mut maps = maps.into_iter();

        let mut entries = HashMap::with_capacity(alignment_set.len());

        for (transcript_id, alignments) in alignment_set.iter() {
            let list = alignments
                .iter()
                .map(|alignment| {
                    let map = maps.next().flatten().expect("missing correspondence map");
                    (alignment.reference_sequence_name().into(), map)
                })
                .collect();

            entries.insert(transcript_id.clone(), list);
        }

        Self { entries }
    }

    /// Returns the per-chromosome correspondence maps for a transcript, in
    /// the insertion order of the source records.
    pub fn get(&self, transcript_id: &str) -> Option<&[(String, CorrespondenceMap)]> {
        self.entries.get(transcript_id).map(|list| list.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Maps are built on a chunked worker pool and reassembled by job index.
// Alignments are independent of each other.
fn build_maps(jobs: &[&Alignment], worker_count: NonZero<usize>) -> Vec<Option<CorrespondenceMap>> {
    let mut maps = vec![None; jobs.len()];

    thread::scope(|scope| {
        let (tx, rx) = crossbeam_channel::bounded(worker_count.get());

        scope.spawn(move || {
            for (i, chunk) in jobs.chunks(CHUNK_SIZE).enumerate() {
                tx.send((i * CHUNK_SIZE, chunk))
                    .expect("worker channel unexpectedly closed");
            }
        });

        let handles: Vec<_> = (0..worker_count.get())
            .map(|_| {
                let rx = rx.clone();

                scope.spawn(move || {
                    let mut built = Vec::new();

                    while let Ok((offset, chunk)) = rx.recv() {
                        for (i, alignment) in chunk.iter().enumerate() {
                            let map =
                                CorrespondenceMap::new(alignment.start(), alignment.cigar());

                            built.push((offset + i, map));
                        }
                    }

                    built
                })
            })
            .collect();

        for handle in handles {
            for (i, map) in handle.join().expect("worker thread panicked") {
                maps[i] = Some(map);
            }
        }
    });

    maps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() -> anyhow::Result<()> {
        let cigar: Cigar = "3M2D4M".parse()?;
        let map = CorrespondenceMap::new(100, &cigar);

        assert_eq!(map.len(), 7);

        assert_eq!(map.get(0), Some(100));
        assert_eq!(map.get(1), Some(101));
        assert_eq!(map.get(2), Some(102));
        assert_eq!(map.get(3), Some(105));
        assert_eq!(map.get(4), Some(106));
        assert_eq!(map.get(5), Some(107));
        assert_eq!(map.get(6), Some(108));

        assert_eq!(map.get(7), None);

        Ok(())
    }

    #[test]
    fn test_new_with_matches_only() -> anyhow::Result<()> {
        let cigar: Cigar = "5M".parse()?;
        let map = CorrespondenceMap::new(8, &cigar);

        assert_eq!(map.len(), 5);

        for i in 0..5 {
            assert_eq!(map.get(i), Some(8 + i));
        }

        Ok(())
    }

    #[test]
    fn test_new_with_insertion() -> anyhow::Result<()> {
        let cigar: Cigar = "2M3I2M".parse()?;
        let map = CorrespondenceMap::new(10, &cigar);

        assert_eq!(map.len(), 4);

        assert_eq!(map.get(0), Some(10));
        assert_eq!(map.get(1), Some(11));

        assert_eq!(map.get(2), None);
        assert_eq!(map.get(3), None);
        assert_eq!(map.get(4), None);

        assert_eq!(map.get(5), Some(12));
        assert_eq!(map.get(6), Some(13));

        Ok(())
    }

    #[test]
    fn test_new_with_soft_clip() -> anyhow::Result<()> {
        let cigar: Cigar = "2S3M".parse()?;
        let map = CorrespondenceMap::new(0, &cigar);

        assert_eq!(map.len(), 3);

        assert_eq!(map.get(0), None);
        assert_eq!(map.get(1), None);

        assert_eq!(map.get(2), Some(0));
        assert_eq!(map.get(3), Some(1));
        assert_eq!(map.get(4), Some(2));

        Ok(())
    }

    #[test]
    fn test_new_with_skip() -> anyhow::Result<()> {
        let cigar: Cigar = "2M100N2M".parse()?;
        let map = CorrespondenceMap::new(0, &cigar);

        assert_eq!(map.len(), 4);

        assert_eq!(map.get(1), Some(1));
        assert_eq!(map.get(2), Some(102));

        Ok(())
    }

    #[test]
    fn test_new_with_nonconsuming_ops() -> anyhow::Result<()> {
        let cigar: Cigar = "1H3M1P".parse()?;
        let map = CorrespondenceMap::new(5, &cigar);

        assert_eq!(map.len(), 3);

        assert_eq!(map.get(0), Some(5));
        assert_eq!(map.get(1), Some(6));
        assert_eq!(map.get(2), Some(7));

        Ok(())
    }

    #[test]
    fn test_new_is_idempotent() -> anyhow::Result<()> {
        let cigar: Cigar = "8M7D6M2I2M11D7M".parse()?;

        assert_eq!(
            CorrespondenceMap::new(3, &cigar),
            CorrespondenceMap::new(3, &cigar)
        );

        Ok(())
    }

    fn build_alignment_set() -> anyhow::Result<AlignmentSet> {
        let mut alignment_set = AlignmentSet::default();

        alignment_set.insert(
            String::from("t0"),
            Alignment::new(String::from("sq0"), 100, "3M2D4M".parse()?),
        );
        alignment_set.insert(
            String::from("t0"),
            Alignment::new(String::from("sq1"), 0, "2M".parse()?),
        );
        alignment_set.insert(
            String::from("t1"),
            Alignment::new(String::from("sq0"), 5, "4M".parse()?),
        );

        Ok(alignment_set)
    }

    #[test]
    fn test_from_alignments() -> anyhow::Result<()> {
        let alignment_set = build_alignment_set()?;
        let index = CorrespondenceIndex::from_alignments(&alignment_set, NonZero::<usize>::MIN);

        assert_eq!(index.len(), 2);

        let maps = index.get("t0").expect("missing transcript");
        assert_eq!(maps.len(), 2);

        assert_eq!(maps[0].0, "sq0");
        assert_eq!(maps[0].1.get(3), Some(105));

        assert_eq!(maps[1].0, "sq1");
        assert_eq!(maps[1].1.get(1), Some(1));

        let maps = index.get("t1").expect("missing transcript");
        assert_eq!(maps.len(), 1);
        assert_eq!(maps[0].1.get(0), Some(5));

        assert!(index.get("t2").is_none());

        Ok(())
    }

    #[test]
    fn test_from_alignments_with_multiple_workers() -> anyhow::Result<()> {
        let alignment_set = build_alignment_set()?;

        let worker_count = NonZero::new(4).unwrap();
        let index = CorrespondenceIndex::from_alignments(&alignment_set, worker_count);

        assert_eq!(index.len(), 2);

        let maps = index.get("t0").expect("missing transcript");
        assert_eq!(maps[0].1.get(6), Some(108));
        assert_eq!(maps[1].1.get(0), Some(0));

        Ok(())
    }
}
