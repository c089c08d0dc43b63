//! Locates where the optimal global path crosses a fixed transcript
//! position, in O(transcript) memory and with no path matrix.
//!
//! Each cell carries, alongside its rolling score, the pair of genome
//! coordinates between which the path consumed the target transcript base:
//! recorded at the move that consumes it, propagated unchanged along the
//! winning predecessor ever after (intron jumps included, via the tracker).

use super::dense::intron_cost;
use super::{AlignConfig, AlignError, NEG_INF};
use crate::scoring::{SpliceView, SubstitutionTable};

/// Where the optimal anchored-global path crossed the target column.
///
/// `genome_left` is the last genome base consumed before the crossing move
/// and `genome_right` the first consumed by or after it: a diagonal crossing
/// gives `left + 1 == right`, a horizontal (gap-in-genome) crossing consumed
/// no genome base and gives `left == right`. A crossing at the very first
/// row reports `-1`, meaning the left half consumes no genome at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Midpoint {
    pub score: i32,
    pub genome_left: i64,
    pub genome_right: i64,
}

const NO_CROSSING: (i64, i64) = (i64::MIN, i64::MIN);

/// Anchored-global forward pass reporting the crossing of 0-based transcript
/// position `target` (`1 <= target < transcript.len()`).
pub fn find_midpoint(
    genome: &[u8],
    transcript: &[u8],
    table: &SubstitutionTable,
    splice: Option<SpliceView<'_>>,
    config: &AlignConfig,
    target: usize,
) -> Result<Midpoint, AlignError> {
    if genome.is_empty() || transcript.is_empty() {
        return Err(AlignError::EmptySequence);
    }
    let n = genome.len();
    let m = transcript.len();
    debug_assert!(target >= 1 && target < m);
    // One-based DP column whose entering move consumes transcript[target].
    let cross_col = target + 1;

    let mut prev: Vec<i32> = (0..=m).map(|t| -(t as i32) * config.gap).collect();
    let mut curr = vec![0i32; m + 1];
    // Paths still on row zero cross the column horizontally, having
    // consumed no genome.
    let mut prev_pair: Vec<(i64, i64)> = (0..=m)
        .map(|t| if t >= cross_col { (-1, -1) } else { NO_CROSSING })
        .collect();
    let mut curr_pair = vec![NO_CROSSING; m + 1];

    let mut tracker_score = prev.clone();
    let mut tracker_row = vec![0usize; m + 1];
    let mut tracker_pair = prev_pair.clone();

    for g in 1..=n {
        curr[0] = -(g as i32) * config.gap;
        curr_pair[0] = NO_CROSSING;
        for t in 1..=m {
            let mut score = prev[t - 1] + table.score(genome[g - 1], transcript[t - 1]);
            let mut pair = if t == cross_col {
                (g as i64 - 2, g as i64 - 1)
            } else {
                prev_pair[t - 1]
            };
            let up = prev[t] - config.gap;
            if up > score {
                score = up;
                pair = prev_pair[t];
            }
            let left = curr[t - 1] - config.gap;
            if left > score {
                score = left;
                pair = if t == cross_col {
                    (g as i64 - 1, g as i64 - 1)
                } else {
                    curr_pair[t - 1]
                };
            }
            let (penalty, _) = intron_cost(splice, config, tracker_row[t], g);
            let jump = tracker_score[t] - penalty;
            if jump > score {
                score = jump;
                pair = tracker_pair[t];
            }
            curr[t] = score.max(NEG_INF);
            curr_pair[t] = pair;
        }
        for t in 1..=m {
            if curr[t] > tracker_score[t] {
                tracker_score[t] = curr[t];
                tracker_row[t] = g;
                tracker_pair[t] = curr_pair[t];
            }
        }
        std::mem::swap(&mut prev, &mut curr);
        std::mem::swap(&mut prev_pair, &mut curr_pair);
    }

    let (genome_left, genome_right) = prev_pair[m];
    if (genome_left, genome_right) == NO_CROSSING {
        return Err(AlignError::MissingCrossing { column: target });
    }
    Ok(Midpoint {
        score: prev[m],
        genome_left,
        genome_right,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_table() -> SubstitutionTable {
        SubstitutionTable::build(1, 1, 1, 0, b'-')
    }

    fn config() -> AlignConfig {
        AlignConfig {
            gap: 1,
            intron_penalty: 10_000,
            splice_penalty: 10_000,
        }
    }

    #[test]
    fn diagonal_crossing_on_identity_alignment() {
        let table = unit_table();
        let mid = find_midpoint(b"ACGT", b"ACGT", &table, None, &config(), 2).unwrap();
        // The all-diagonal path consumes transcript base 2 against genome
        // base 2.
        assert_eq!(mid.score, 4);
        assert_eq!(mid.genome_left, 1);
        assert_eq!(mid.genome_right, 2);
    }

    #[test]
    fn crossing_of_two_base_identity() {
        let table = unit_table();
        let mid = find_midpoint(b"GT", b"GT", &table, None, &config(), 1).unwrap();
        assert_eq!(mid.score, 2);
        assert_eq!(mid.genome_left, 0);
        assert_eq!(mid.genome_right, 1);
    }

    #[test]
    fn horizontal_crossing_reports_equal_pair() {
        // Transcript has an extra base the genome lacks; with the mismatch
        // priced above two gaps the optimal path gaps over transcript[1].
        let table = SubstitutionTable::build(5, 10, 1, 0, b'-');
        let cfg = AlignConfig {
            gap: 1,
            intron_penalty: 10_000,
            splice_penalty: 10_000,
        };
        let mid = find_midpoint(b"AT", b"ACT", &table, None, &cfg, 1).unwrap();
        // Path: match A, gap over C, match T. The gap consumes no genome.
        assert_eq!(mid.score, 9);
        assert_eq!(mid.genome_left, 0);
        assert_eq!(mid.genome_right, 0);
    }

    #[test]
    fn crossing_at_row_zero_leaves_left_half_empty() {
        // Transcript's first bases match nothing; best global path gaps them
        // at the start, so the crossing happens before any genome base.
        let table = SubstitutionTable::build(5, 10, 1, 0, b'-');
        let cfg = AlignConfig {
            gap: 1,
            intron_penalty: 10_000,
            splice_penalty: 10_000,
        };
        let mid = find_midpoint(b"GG", b"CCGG", &table, None, &cfg, 1).unwrap();
        // Gaps over C,C then matches G,G: 10 - 2.
        assert_eq!(mid.score, 8);
        assert_eq!(mid.genome_left, -1);
        assert_eq!(mid.genome_right, -1);
    }
}
