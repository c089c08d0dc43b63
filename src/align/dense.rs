//! Dense spliced-alignment core.
//!
//! One forward pass over the full (genome+1) x (transcript+1) grid with two
//! rolling score rows and a per-column best-intron tracker. Traceback
//! directions are packed four to a byte, which is what the byte-area
//! accounting used by the recursive driver reflects.
//!
//! The recurrence follows Mott's est2genome: each cell takes the best of a
//! diagonal move, a gap in either sequence, and an intron jump from the best
//! cell seen so far in the same transcript column. Ties are broken in that
//! fixed order; changing it changes which of several equal-scoring paths is
//! reported, so it is part of the contract.

use super::pair_memory::PairMemory;
use super::result::{AlignmentResult, EditOp, IntronKind};
use super::{AlignConfig, AlignError, AlignMode, NEG_INF};
use crate::scoring::{SpliceView, SubstitutionTable};

/// Traceback direction, packed two bits per cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dir {
    Diag = 0,
    GapTranscript = 1,
    GapGenome = 2,
    Intron = 3,
}

/// Flat 2-bit-per-cell direction matrix, indexed row-major.
struct PathGrid {
    data: Vec<u8>,
    cols: usize,
}

impl PathGrid {
    fn new(rows: usize, cols: usize) -> Self {
        let cells = rows * cols;
        Self {
            data: vec![0u8; cells.div_ceil(4)],
            cols,
        }
    }

    #[inline]
    fn set(&mut self, row: usize, col: usize, dir: Dir) {
        let idx = row * self.cols + col;
        let shift = (idx & 3) * 2;
        let byte = &mut self.data[idx >> 2];
        *byte = (*byte & !(0b11 << shift)) | ((dir as u8) << shift);
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> Dir {
        let idx = row * self.cols + col;
        match (self.data[idx >> 2] >> ((idx & 3) * 2)) & 0b11 {
            0 => Dir::Diag,
            1 => Dir::GapTranscript,
            2 => Dir::GapGenome,
            _ => Dir::Intron,
        }
    }
}

/// Best DP value seen so far in each transcript column, with its row.
struct IntronTracker {
    score: Vec<i32>,
    row: Vec<usize>,
}

impl IntronTracker {
    fn seed(row0: &[i32]) -> Self {
        Self {
            score: row0.to_vec(),
            row: vec![0; row0.len()],
        }
    }

    /// Strict improvement only, so the first row reaching a value wins.
    #[inline]
    fn update(&mut self, t: usize, score: i32, row: usize) {
        if score > self.score[t] {
            self.score[t] = score;
            self.row[t] = row;
        }
    }
}

/// Penalty and kind for a jump entering row `current` from row `origin`
/// (rows count genome bases consumed, so the skipped bases are
/// `origin..current-1` and the donor mark sits on base `origin-1`).
pub(super) fn intron_cost(
    splice: Option<SpliceView<'_>>,
    config: &AlignConfig,
    origin: usize,
    current: usize,
) -> (i32, IntronKind) {
    if let Some(map) = splice {
        if origin >= 1 && map.donor(origin - 1) && map.acceptor(current - 1) {
            let kind = if map.forward() {
                IntronKind::ForwardSpliced
            } else {
                IntronKind::ReverseSpliced
            };
            return (config.splice_penalty, kind);
        }
    }
    (config.intron_penalty, IntronKind::Unscored)
}

fn seed_row0(m: usize, mode: AlignMode, anchor_start: bool, gap: i32) -> Vec<i32> {
    if mode == AlignMode::Global && anchor_start {
        (0..=m).map(|t| -(t as i32) * gap).collect()
    } else {
        vec![0; m + 1]
    }
}

#[inline]
fn seed_col0(g: usize, mode: AlignMode, anchor_start: bool, gap: i32) -> i32 {
    if mode == AlignMode::Global && anchor_start {
        -(g as i32) * gap
    } else {
        0
    }
}

/// Full dense alignment with an explicit edit script.
///
/// Local mode floors every cell at zero and ends at the grid-wide maximum;
/// global mode ends at the last cell, starting at (0,0) when `anchor_start`
/// is set and at the best free entry on the boundary otherwise. Fails with
/// [`AlignError::PairCapacityExceeded`] when the intron-origin history fills
/// up; nothing is partially returned in that case.
#[allow(clippy::too_many_arguments)]
pub fn align_with_traceback(
    genome: &[u8],
    transcript: &[u8],
    table: &SubstitutionTable,
    splice: Option<SpliceView<'_>>,
    config: &AlignConfig,
    mode: AlignMode,
    anchor_start: bool,
    pairs: &mut PairMemory,
) -> Result<AlignmentResult, AlignError> {
    if genome.is_empty() || transcript.is_empty() {
        return Err(AlignError::EmptySequence);
    }
    let n = genome.len();
    let m = transcript.len();
    let local = mode == AlignMode::Local;

    // Entries are in this sub-problem's coordinates; older ones must not
    // alias lookups.
    pairs.clear();

    let mut grid = PathGrid::new(n + 1, m + 1);
    for t in 1..=m {
        grid.set(0, t, Dir::GapGenome);
    }
    for g in 1..=n {
        grid.set(g, 0, Dir::GapTranscript);
    }

    let mut prev = seed_row0(m, mode, anchor_start, config.gap);
    let mut curr = vec![0i32; m + 1];
    let mut tracker = IntronTracker::seed(&prev);

    let mut best_score = if local { 0 } else { NEG_INF };
    let mut best_cell = (0usize, 0usize);

    for g in 1..=n {
        curr[0] = seed_col0(g, mode, anchor_start, config.gap);
        for t in 1..=m {
            let mut score = prev[t - 1] + table.score(genome[g - 1], transcript[t - 1]);
            let mut dir = Dir::Diag;
            let up = prev[t] - config.gap;
            if up > score {
                score = up;
                dir = Dir::GapTranscript;
            }
            let left = curr[t - 1] - config.gap;
            if left > score {
                score = left;
                dir = Dir::GapGenome;
            }
            let (penalty, _) = intron_cost(splice, config, tracker.row[t], g);
            let jump = tracker.score[t] - penalty;
            if jump > score {
                score = jump;
                dir = Dir::Intron;
            }
            if local && score < 0 {
                score = 0;
                dir = Dir::Diag;
            }
            if dir == Dir::Intron {
                pairs.record(t, tracker.row[t])?;
            }
            curr[t] = score;
            grid.set(g, t, dir);
            if local && score > best_score {
                best_score = score;
                best_cell = (g, t);
            }
        }
        // The tracker must only see rows strictly above the one being
        // computed, so it absorbs the finished row afterwards.
        for t in 1..=m {
            tracker.update(t, curr[t], g);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    if !local {
        best_score = prev[m];
        best_cell = (n, m);
    } else if best_score <= 0 {
        return Ok(AlignmentResult::empty());
    }

    let (end_g, end_t) = best_cell;
    let (mut g, mut t) = best_cell;
    // In local mode the walk stops where the path's score is exhausted,
    // which is exactly where the forward scan restarted from zero.
    let mut remaining = best_score;
    let mut operations: Vec<EditOp> = Vec::new();
    let mut frozen = false;

    loop {
        let done = if local {
            remaining == 0
        } else if anchor_start {
            g == 0 && t == 0
        } else {
            g == 0 || t == 0
        };
        if done {
            break;
        }
        match grid.get(g, t) {
            Dir::Diag => {
                let (a, b) = (genome[g - 1], transcript[t - 1]);
                operations.push(if a.eq_ignore_ascii_case(&b) {
                    EditOp::Match
                } else {
                    EditOp::Mismatch
                });
                remaining -= table.score(a, b);
                g -= 1;
                t -= 1;
            }
            Dir::GapTranscript => {
                operations.push(EditOp::GapInTranscript);
                remaining += config.gap;
                g -= 1;
            }
            Dir::GapGenome => {
                operations.push(EditOp::GapInGenome);
                remaining += config.gap;
                t -= 1;
            }
            Dir::Intron => {
                // The live tracker is still the right origin unless a later
                // row overwrote it, in which case the recorded history has
                // the origin that was current when this cell was scored.
                let origin = if tracker.row[t] < g {
                    tracker.row[t]
                } else {
                    if !frozen {
                        pairs.freeze();
                        frozen = true;
                    }
                    pairs.lookup(t, g - 1)?
                };
                let (penalty, kind) = intron_cost(splice, config, origin, g);
                operations.push(EditOp::Intron {
                    length: g - origin,
                    kind,
                });
                remaining += penalty;
                g = origin;
            }
        }
    }
    operations.reverse();

    Ok(AlignmentResult {
        genome_start: g,
        genome_end: end_g - 1,
        transcript_start: t,
        transcript_end: end_t - 1,
        score: best_score,
        operations,
    })
}

/// Bounding box of the best local region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionBounds {
    pub genome_start: usize,
    pub genome_end: usize,
    pub transcript_start: usize,
    pub transcript_end: usize,
    pub score: i32,
}

/// Coordinate-only local pass: no direction grid, just two rolling rows of
/// path-origin coordinates alongside the scores. Used to find where to trim
/// before a precise alignment is attempted.
pub fn find_best_region(
    genome: &[u8],
    transcript: &[u8],
    table: &SubstitutionTable,
    splice: Option<SpliceView<'_>>,
    config: &AlignConfig,
) -> RegionBounds {
    let n = genome.len();
    let m = transcript.len();

    let mut prev = vec![0i32; m + 1];
    let mut curr = vec![0i32; m + 1];
    // Cell where the path through each cell restarted from zero.
    let mut prev_org: Vec<(usize, usize)> = (0..=m).map(|t| (0, t)).collect();
    let mut curr_org = vec![(0usize, 0usize); m + 1];

    let mut tracker = IntronTracker::seed(&prev);
    let mut tracker_org: Vec<(usize, usize)> = prev_org.clone();

    let mut best_score = 0i32;
    let mut best_cell = (0usize, 0usize);
    let mut best_org = (0usize, 0usize);

    for g in 1..=n {
        curr[0] = 0;
        curr_org[0] = (g, 0);
        for t in 1..=m {
            let mut score = prev[t - 1] + table.score(genome[g - 1], transcript[t - 1]);
            let mut org = prev_org[t - 1];
            let up = prev[t] - config.gap;
            if up > score {
                score = up;
                org = prev_org[t];
            }
            let left = curr[t - 1] - config.gap;
            if left > score {
                score = left;
                org = curr_org[t - 1];
            }
            let (penalty, _) = intron_cost(splice, config, tracker.row[t], g);
            let jump = tracker.score[t] - penalty;
            if jump > score {
                score = jump;
                org = tracker_org[t];
            }
            // A zero cell is a restart point, matching where the traceback's
            // score replay stops; a stale origin here would drag a
            // zero-scoring prefix into the bounding box.
            if score <= 0 {
                score = 0;
                org = (g, t);
            }
            curr[t] = score;
            curr_org[t] = org;
            if score > best_score {
                best_score = score;
                best_cell = (g, t);
                best_org = org;
            }
        }
        for t in 1..=m {
            if curr[t] > tracker.score[t] {
                tracker.score[t] = curr[t];
                tracker.row[t] = g;
                tracker_org[t] = curr_org[t];
            }
        }
        std::mem::swap(&mut prev, &mut curr);
        std::mem::swap(&mut prev_org, &mut curr_org);
    }

    if best_score <= 0 {
        return RegionBounds {
            genome_start: 0,
            genome_end: 0,
            transcript_start: 0,
            transcript_end: 0,
            score: 0,
        };
    }
    RegionBounds {
        genome_start: best_org.0,
        genome_end: best_cell.0 - 1,
        transcript_start: best_org.1,
        transcript_end: best_cell.1 - 1,
        score: best_score,
    }
}
