use super::AlignConfig;
use crate::scoring::SubstitutionTable;

/// One unit of the reported edit script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOp {
    /// Identical residues; both sequences advance one base.
    Match,
    /// Differing residues; both sequences advance one base.
    Mismatch,
    /// The genome advances one base, the transcript does not.
    GapInTranscript,
    /// The transcript advances one base, the genome does not.
    GapInGenome,
    /// The genome jumps `length` bases without consuming transcript.
    Intron { length: usize, kind: IntronKind },
}

/// How an intron jump was priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntronKind {
    /// No splice signal; charged the flat intron penalty.
    Unscored,
    /// gt..ag flanked; charged the reduced splice penalty.
    ForwardSpliced,
    /// ct..ac flanked; charged the reduced splice penalty.
    ReverseSpliced,
}

/// Result of one alignment. Coordinates are 0-based inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentResult {
    pub genome_start: usize,
    pub genome_end: usize,
    pub transcript_start: usize,
    pub transcript_end: usize,
    /// Raw alignment score.
    pub score: i32,
    /// Edit script from `(genome_start, transcript_start)` onward.
    pub operations: Vec<EditOp>,
}

impl AlignmentResult {
    /// The "no alignment found" result (local score never rose above zero).
    pub fn empty() -> Self {
        Self {
            genome_start: 0,
            genome_end: 0,
            transcript_start: 0,
            transcript_end: 0,
            score: 0,
            operations: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Genome bases consumed by the edit script.
    pub fn genome_consumed(&self) -> usize {
        self.operations
            .iter()
            .map(|op| match op {
                EditOp::Match | EditOp::Mismatch | EditOp::GapInTranscript => 1,
                EditOp::GapInGenome => 0,
                EditOp::Intron { length, .. } => *length,
            })
            .sum()
    }

    /// Transcript bases consumed by the edit script.
    pub fn transcript_consumed(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| matches!(op, EditOp::Match | EditOp::Mismatch | EditOp::GapInGenome))
            .count()
    }

    pub fn matches(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| matches!(op, EditOp::Match))
            .count()
    }

    pub fn mismatches(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| matches!(op, EditOp::Mismatch))
            .count()
    }

    /// Percent identity over aligned (non-intron) columns.
    pub fn identity(&self) -> f64 {
        let columns = self
            .operations
            .iter()
            .filter(|op| !matches!(op, EditOp::Intron { .. }))
            .count();
        if columns == 0 {
            return 0.0;
        }
        100.0 * self.matches() as f64 / columns as f64
    }

    /// Recompute the score by replaying the edit script against the table
    /// and penalties. Must reproduce `self.score` exactly.
    pub fn replay_score(
        &self,
        genome: &[u8],
        transcript: &[u8],
        table: &SubstitutionTable,
        config: &AlignConfig,
    ) -> i32 {
        let mut gi = self.genome_start;
        let mut ti = self.transcript_start;
        let mut total = 0i32;
        for op in &self.operations {
            match op {
                EditOp::Match | EditOp::Mismatch => {
                    total += table.score(genome[gi], transcript[ti]);
                    gi += 1;
                    ti += 1;
                }
                EditOp::GapInTranscript => {
                    total -= config.gap;
                    gi += 1;
                }
                EditOp::GapInGenome => {
                    total -= config.gap;
                    ti += 1;
                }
                EditOp::Intron { length, kind } => {
                    total -= match kind {
                        IntronKind::Unscored => config.intron_penalty,
                        IntronKind::ForwardSpliced | IntronKind::ReverseSpliced => {
                            config.splice_penalty
                        }
                    };
                    gi += length;
                }
            }
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consumption_counts_every_op_kind() {
        let result = AlignmentResult {
            genome_start: 0,
            genome_end: 14,
            transcript_start: 0,
            transcript_end: 4,
            score: 0,
            operations: vec![
                EditOp::Match,
                EditOp::Mismatch,
                EditOp::GapInTranscript,
                EditOp::Intron {
                    length: 10,
                    kind: IntronKind::Unscored,
                },
                EditOp::GapInGenome,
                EditOp::Match,
                EditOp::Match,
            ],
        };
        assert_eq!(result.genome_consumed(), 15);
        assert_eq!(result.transcript_consumed(), 5);
        assert_eq!(result.matches(), 3);
        assert_eq!(result.mismatches(), 1);
    }

    #[test]
    fn identity_ignores_introns() {
        let result = AlignmentResult {
            genome_start: 0,
            genome_end: 11,
            transcript_start: 0,
            transcript_end: 1,
            score: 0,
            operations: vec![
                EditOp::Match,
                EditOp::Intron {
                    length: 10,
                    kind: IntronKind::ForwardSpliced,
                },
                EditOp::Match,
            ],
        };
        assert!((result.identity() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn replay_matches_hand_computed_score() {
        let table = SubstitutionTable::build(5, 4, 2, 0, b'-');
        let config = AlignConfig {
            gap: 2,
            intron_penalty: 40,
            splice_penalty: 20,
        };
        let result = AlignmentResult {
            genome_start: 0,
            genome_end: 3,
            transcript_start: 0,
            transcript_end: 2,
            score: 4,
            operations: vec![
                EditOp::Match,
                EditOp::GapInTranscript,
                EditOp::Mismatch,
                EditOp::Match,
            ],
        };
        // ACGT vs AAT: 5 - 2 - 4 + 5 = 4
        assert_eq!(result.replay_score(b"ACGT", b"AAT", &table, &config), 4);
    }
}
