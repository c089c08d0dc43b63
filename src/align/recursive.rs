//! Linear-space recursion: dense when the sub-problem fits the byte budget,
//! otherwise split at the optimal path's crossing of the middle transcript
//! position and recurse on both halves.

use super::dense;
use super::midpoint;
use super::pair_memory::PairMemory;
use super::result::{AlignmentResult, EditOp};
use super::{packed_area, AlignConfig, AlignError, AlignMode};
use crate::scoring::{SpliceView, SubstitutionTable};

/// Transcript halving bounds the depth at log2(transcript); anything past
/// this is a runaway split.
const MAX_DEPTH: usize = 64;

/// Global, start-anchored alignment of the full slices within `max_area`
/// bytes of path matrix.
///
/// A pair-memory overflow from the dense attempt is not propagated: it means
/// this sub-problem was still too entangled for the bounded history, so it
/// is split further exactly as if the area test had failed.
#[allow(clippy::too_many_arguments)]
pub fn align_recursive(
    genome: &[u8],
    transcript: &[u8],
    table: &SubstitutionTable,
    splice: Option<SpliceView<'_>>,
    config: &AlignConfig,
    max_area: usize,
    pairs: &mut PairMemory,
    depth: usize,
) -> Result<AlignmentResult, AlignError> {
    // A midpoint can land before the first or after the last genome base,
    // leaving one half with nothing to align against.
    if genome.is_empty() {
        return Ok(gap_only(transcript.len(), EditOp::GapInGenome, config));
    }
    if transcript.is_empty() {
        return Ok(gap_only(genome.len(), EditOp::GapInTranscript, config));
    }
    let n = genome.len();
    let m = transcript.len();

    let area = packed_area(n, m);
    if area <= max_area {
        match dense::align_with_traceback(
            genome,
            transcript,
            table,
            splice,
            config,
            AlignMode::Global,
            true,
            pairs,
        ) {
            Ok(result) => return Ok(result),
            Err(AlignError::PairCapacityExceeded) => {}
            Err(e) => return Err(e),
        }
    }
    if m < 2 || depth >= MAX_DEPTH {
        return Err(AlignError::BudgetTooSmall {
            area,
            budget: max_area,
        });
    }

    let mid = if m == 2 { 0 } else { m / 2 };
    let crossing = midpoint::find_midpoint(genome, transcript, table, splice, config, mid + 1)?;
    debug_assert!(
        crossing.genome_right == crossing.genome_left
            || crossing.genome_right == crossing.genome_left + 1
    );
    // First genome base of the right half. A diagonal crossing consumes base
    // `genome_right` as its first move; a horizontal crossing consumes none,
    // so the right half resumes just past the left half's last base. Either
    // way the halves are disjoint and exhaustive and join by concatenation.
    let split = (crossing.genome_left + 1) as usize;
    debug_assert!(split <= n);

    let (left_genome, right_genome) = genome.split_at(split);
    let (left_transcript, right_transcript) = transcript.split_at(mid + 1);
    let (left_splice, right_splice) = match splice {
        Some(v) => (Some(v.slice(0, split)), Some(v.slice(split, n))),
        None => (None, None),
    };

    let left = align_recursive(
        left_genome,
        left_transcript,
        table,
        left_splice,
        config,
        max_area,
        pairs,
        depth + 1,
    )?;
    let right = align_recursive(
        right_genome,
        right_transcript,
        table,
        right_splice,
        config,
        max_area,
        pairs,
        depth + 1,
    )?;

    let mut operations = left.operations;
    operations.extend(right.operations);
    Ok(AlignmentResult {
        genome_start: 0,
        genome_end: n - 1,
        transcript_start: 0,
        transcript_end: m - 1,
        score: left.score + right.score,
        operations,
    })
}

/// Degenerate global alignment against an empty slice: pure gaps.
fn gap_only(len: usize, op: EditOp, config: &AlignConfig) -> AlignmentResult {
    AlignmentResult {
        genome_start: 0,
        genome_end: 0,
        transcript_start: 0,
        transcript_end: 0,
        score: -(len as i32) * config.gap,
        operations: vec![op; len],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::SpliceSiteMap;

    fn unit_table() -> SubstitutionTable {
        SubstitutionTable::build(1, 1, 1, 0, b'-')
    }

    fn no_intron_config() -> AlignConfig {
        AlignConfig {
            gap: 1,
            intron_penalty: 10_000,
            splice_penalty: 10_000,
        }
    }

    #[test]
    fn forced_split_matches_dense_result() {
        let table = unit_table();
        let config = no_intron_config();
        let mut pairs = PairMemory::with_budget(1 << 10);
        // Area of GT x GT is (3*3)/4 = 2 bytes; a 1-byte cap forces one
        // split, after which each half (2*2)/4 = 1 fits.
        let result =
            align_recursive(b"GT", b"GT", &table, None, &config, 1, &mut pairs, 0).unwrap();
        assert_eq!(result.score, 2);
        assert_eq!(result.operations, vec![EditOp::Match, EditOp::Match]);
        assert_eq!(result.genome_start, 0);
        assert_eq!(result.genome_end, 1);
    }

    #[test]
    fn split_score_equals_unsplit_score() {
        let table = unit_table();
        let config = no_intron_config();
        let genome = b"ACGTACGTACGTACGT";
        let transcript = b"ACGTACGTACGTACGT";
        let mut pairs = PairMemory::with_budget(1 << 20);
        let whole = align_recursive(
            genome,
            transcript,
            &table,
            None,
            &config,
            1 << 20,
            &mut pairs,
            0,
        )
        .unwrap();
        for budget in [8usize, 16, 32] {
            let split = align_recursive(
                genome,
                transcript,
                &table,
                None,
                &config,
                budget,
                &mut pairs,
                0,
            )
            .unwrap();
            assert_eq!(split.score, whole.score, "budget {budget}");
            assert_eq!(split.operations, whole.operations, "budget {budget}");
        }
    }

    #[test]
    fn spliced_alignment_survives_splitting() {
        let genome = b"GCAGTAAAAAAAGCTC";
        let transcript = b"GCACTC";
        let table = unit_table();
        let config = AlignConfig {
            gap: 2,
            intron_penalty: 40,
            splice_penalty: 1,
        };
        let map = SpliceSiteMap::build(genome, true);
        let mut pairs = PairMemory::with_budget(1 << 20);
        let whole = align_recursive(
            genome,
            transcript,
            &table,
            Some(map.view()),
            &config,
            1 << 20,
            &mut pairs,
            0,
        )
        .unwrap();
        assert_eq!(whole.score, 5);
        let split = align_recursive(
            genome,
            transcript,
            &table,
            Some(map.view()),
            &config,
            8,
            &mut pairs,
            0,
        )
        .unwrap();
        assert_eq!(split.score, whole.score);
        assert_eq!(
            split.replay_score(genome, transcript, &table, &config),
            split.score
        );
        assert_eq!(split.genome_consumed(), genome.len());
        assert_eq!(split.transcript_consumed(), transcript.len());
    }

    #[test]
    fn unsplittable_budget_fails_closed() {
        let table = unit_table();
        let config = no_intron_config();
        let mut pairs = PairMemory::with_budget(1 << 10);
        // One transcript base cannot be halved; a zero budget must error
        // rather than recurse forever.
        let err = align_recursive(
            b"ACGTACGT",
            b"A",
            &table,
            None,
            &config,
            0,
            &mut pairs,
            0,
        );
        assert!(matches!(err, Err(AlignError::BudgetTooSmall { .. })));
    }
}
