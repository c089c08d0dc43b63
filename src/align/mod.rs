//! Splice-aware, memory-bounded alignment engine.
//!
//! The public entry point is [`align_linear_space`]: a cheap local scan
//! locates the best-scoring region, both sequences are trimmed to it, and
//! the trimmed pair is aligned globally in linear space, splitting at
//! Hirschberg midpoints whenever the dense method would exceed the byte
//! budget.

pub mod dense;
pub mod midpoint;
pub mod pair_memory;
pub mod recursive;
pub mod result;

use std::fmt;

use crate::scoring::{SpliceView, SubstitutionTable};
use pair_memory::PairMemory;
pub use result::{AlignmentResult, EditOp, IntronKind};

/// Effectively -infinity without risking i32 underflow in the recurrence.
pub(crate) const NEG_INF: i32 = i32::MIN / 2;

/// Penalty magnitudes shared by every pass of one alignment run.
#[derive(Debug, Clone, Copy)]
pub struct AlignConfig {
    /// Cost of a single-base gap in either sequence.
    pub gap: i32,
    /// Flat cost of skipping a genomic region without splice signals.
    pub intron_penalty: i32,
    /// Reduced cost when the skip is flanked by donor/acceptor marks.
    pub splice_penalty: i32,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            gap: 2,
            intron_penalty: 40,
            splice_penalty: 20,
        }
    }
}

/// Whether the dense pass floors at zero or spans both sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignMode {
    Local,
    Global,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlignError {
    /// Zero-length genome or transcript.
    EmptySequence,
    /// The bounded intron-origin history filled up during a traceback pass.
    /// Recoverable only inside the recursive driver, which splits instead.
    PairCapacityExceeded,
    /// A traceback step asked for an intron origin that was never recorded.
    MissingIntronOrigin { column: usize, row: usize },
    /// The optimal path never crossed the requested midpoint column.
    MissingCrossing { column: usize },
    /// No recursive split can bring the problem under the byte budget.
    BudgetTooSmall { area: usize, budget: usize },
}

impl fmt::Display for AlignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignError::EmptySequence => write!(f, "empty genome or transcript sequence"),
            AlignError::PairCapacityExceeded => {
                write!(f, "intron origin history exceeded its capacity")
            }
            AlignError::MissingIntronOrigin { column, row } => write!(
                f,
                "internal inconsistency: no intron origin recorded at column {column} below row {row}"
            ),
            AlignError::MissingCrossing { column } => write!(
                f,
                "internal inconsistency: optimal path never crossed transcript position {column}"
            ),
            AlignError::BudgetTooSmall { area, budget } => write!(
                f,
                "memory budget of {budget} bytes too small for any split (smallest area {area})"
            ),
        }
    }
}

impl std::error::Error for AlignError {}

/// Bytes the packed 2-bit direction grid needs for an `n` x `m` problem.
/// Four cells per byte, hence the division by 4.
pub(crate) fn packed_area(n: usize, m: usize) -> usize {
    (n + 1).saturating_mul(m + 1) / 4
}

/// Align `transcript` against `genome` within `budget_bytes` of working
/// memory for the path matrix.
///
/// If the whole problem fits the budget this is a single local dense pass.
/// Otherwise a coordinate-only local pass finds the optimal region, the
/// inputs are trimmed to it, and the trimmed pair is aligned by the
/// recursive driver; the returned coordinates are translated back into the
/// caller's numbering. A best score of zero or less yields an empty result.
pub fn align_linear_space(
    genome: &[u8],
    transcript: &[u8],
    table: &SubstitutionTable,
    splice: Option<SpliceView<'_>>,
    config: &AlignConfig,
    budget_bytes: usize,
) -> Result<AlignmentResult, AlignError> {
    if genome.is_empty() || transcript.is_empty() {
        return Err(AlignError::EmptySequence);
    }
    let mut pairs = PairMemory::with_budget(budget_bytes);

    if packed_area(genome.len(), transcript.len()) <= budget_bytes {
        // A capacity overflow here has no smaller sub-problem to fall back
        // to, so it propagates as-is.
        return dense::align_with_traceback(
            genome,
            transcript,
            table,
            splice,
            config,
            AlignMode::Local,
            false,
            &mut pairs,
        );
    }

    let bounds = dense::find_best_region(genome, transcript, table, splice, config);
    if bounds.score <= 0 {
        return Ok(AlignmentResult::empty());
    }
    let sub_genome = &genome[bounds.genome_start..=bounds.genome_end];
    let sub_transcript = &transcript[bounds.transcript_start..=bounds.transcript_end];
    let sub_splice = splice.map(|v| v.slice(bounds.genome_start, bounds.genome_end + 1));

    let sub = recursive::align_recursive(
        sub_genome,
        sub_transcript,
        table,
        sub_splice,
        config,
        budget_bytes,
        &mut pairs,
        0,
    )?;
    debug_assert_eq!(sub.score, bounds.score);

    Ok(AlignmentResult {
        genome_start: bounds.genome_start,
        genome_end: bounds.genome_end,
        transcript_start: bounds.transcript_start,
        transcript_end: bounds.transcript_end,
        score: sub.score,
        operations: sub.operations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_area_counts_four_cells_per_byte() {
        assert_eq!(packed_area(4, 3), 5);
        assert_eq!(packed_area(0, 0), 0);
        assert_eq!(packed_area(99, 99), 2500);
    }

    #[test]
    fn empty_inputs_are_rejected() {
        let table = SubstitutionTable::build(1, 1, 1, 0, b'-');
        let config = AlignConfig::default();
        let err = align_linear_space(b"", b"ACGT", &table, None, &config, 1 << 20);
        assert_eq!(err.unwrap_err(), AlignError::EmptySequence);
        let err = align_linear_space(b"ACGT", b"", &table, None, &config, 1 << 20);
        assert_eq!(err.unwrap_err(), AlignError::EmptySequence);
    }
}
