//! Shuffled-transcript significance estimation.
//!
//! Aligning random permutations of the transcript against the same genome
//! gives a null score distribution; a real hit should stand well clear of
//! its maximum.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::align::{align_linear_space, AlignConfig, AlignError};
use crate::scoring::{SpliceView, SubstitutionTable};

/// Align `count` shuffles of the transcript and return their scores.
/// Deterministic for a given seed.
#[allow(clippy::too_many_arguments)]
pub fn null_scores(
    genome: &[u8],
    transcript: &[u8],
    table: &SubstitutionTable,
    splice: Option<SpliceView<'_>>,
    config: &AlignConfig,
    budget_bytes: usize,
    count: usize,
    seed: u64,
) -> Result<Vec<i32>, AlignError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut shuffled = transcript.to_vec();
    let mut scores = Vec::with_capacity(count);
    for _ in 0..count {
        shuffled.shuffle(&mut rng);
        let result = align_linear_space(genome, &shuffled, table, splice, config, budget_bytes)?;
        scores.push(result.score);
    }
    Ok(scores)
}

/// Max, mean and sample standard deviation of a null distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NullSummary {
    pub max: i32,
    pub mean: f64,
    pub sd: f64,
}

pub fn summarize(scores: &[i32]) -> NullSummary {
    if scores.is_empty() {
        return NullSummary {
            max: 0,
            mean: 0.0,
            sd: 0.0,
        };
    }
    let max = scores.iter().copied().max().unwrap_or(0);
    let mean = scores.iter().map(|&s| s as f64).sum::<f64>() / scores.len() as f64;
    let sd = if scores.len() > 1 {
        let var = scores
            .iter()
            .map(|&s| (s as f64 - mean).powi(2))
            .sum::<f64>()
            / (scores.len() - 1) as f64;
        var.sqrt()
    } else {
        0.0
    };
    NullSummary { max, mean, sd }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_scores() {
        let table = SubstitutionTable::build(1, 1, 1, 0, b'-');
        let config = AlignConfig {
            gap: 1,
            intron_penalty: 10_000,
            splice_penalty: 10_000,
        };
        let genome = b"ACGTACGTACGTACGT";
        let transcript = b"ACGTACGT";
        let a = null_scores(genome, transcript, &table, None, &config, 1 << 20, 5, 42).unwrap();
        let b = null_scores(genome, transcript, &table, None, &config, 1 << 20, 5, 42).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 5);
    }

    #[test]
    fn summary_of_known_values() {
        let s = summarize(&[2, 4, 6]);
        assert_eq!(s.max, 6);
        assert!((s.mean - 4.0).abs() < f64::EPSILON);
        assert!((s.sd - 2.0).abs() < 1e-9);
    }
}
