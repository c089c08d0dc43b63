//! Substitution scoring and splice-site detection.
//!
//! The substitution table is a full 256x256 byte-indexed matrix so the inner
//! DP loop is a single unconditional lookup, the same shape the classic
//! est2genome C implementation uses. Splice sites follow its dinucleotide
//! heuristic: gt/ag in the forward orientation, ct/ac in the reverse.

/// Candidate splice donor mark (set on the last base of the preceding exon).
pub const DONOR: u8 = 1;
/// Candidate splice acceptor mark (set on the last base of the intron).
pub const ACCEPTOR: u8 = 2;

const TABLE_DIM: usize = 256;

/// Byte-indexed substitution table, case-folded at build time.
pub struct SubstitutionTable {
    scores: Vec<i32>,
}

impl SubstitutionTable {
    /// Build a table from penalty magnitudes (all non-negative).
    ///
    /// Identical residues score `match_score`, except the neutral symbols
    /// (`*`, `n`, and the pad character) which score 0. Differing residues
    /// score `-mismatch`, any pair touching the pad scores `-gap`, and any
    /// pair touching `n` scores `neutral`.
    pub fn build(match_score: i32, mismatch: i32, gap: i32, neutral: i32, pad: u8) -> Self {
        let pad = pad.to_ascii_lowercase();
        let mut scores = vec![0i32; TABLE_DIM * TABLE_DIM];
        for a in 0..TABLE_DIM {
            for b in 0..TABLE_DIM {
                let fa = (a as u8).to_ascii_lowercase();
                let fb = (b as u8).to_ascii_lowercase();
                scores[a * TABLE_DIM + b] = if fa == fb {
                    if fa == b'*' || fa == b'n' || fa == pad {
                        0
                    } else {
                        match_score
                    }
                } else if fa == pad || fb == pad {
                    -gap
                } else if fa == b'n' || fb == b'n' {
                    neutral
                } else {
                    -mismatch
                };
            }
        }
        Self { scores }
    }

    /// Score for aligning byte `a` against byte `b`.
    #[inline]
    pub fn score(&self, a: u8, b: u8) -> i32 {
        self.scores[a as usize * TABLE_DIM + b as usize]
    }
}

/// Donor/acceptor bitmask parallel to a genomic sequence.
///
/// Built once per orientation and never mutated; the aligners borrow it
/// through [`SpliceView`] so recursive sub-problems can slice it in O(1).
pub struct SpliceSiteMap {
    flags: Vec<u8>,
    forward: bool,
}

impl SpliceSiteMap {
    /// Scan the genome once for candidate splice signals.
    ///
    /// Forward orientation: a `gt` at positions `(p, p+1)` marks `p-1` as a
    /// donor; otherwise an `ag` ending at `p` marks `p` as an acceptor. The
    /// two checks are mutually exclusive per scan index, donor winning, so a
    /// `g` that both follows an `a` and precedes a `t` is a donor only.
    /// Separate scan indices can still land different marks on one position
    /// (as in `aggt`, where position 1 collects both), which is why the map
    /// is a bitmask.
    pub fn build(genome: &[u8], forward: bool) -> Self {
        let (d0, d1, a0, a1) = if forward {
            (b'g', b't', b'a', b'g')
        } else {
            (b'c', b't', b'a', b'c')
        };
        let n = genome.len();
        let mut flags = vec![0u8; n];
        let at = |i: usize| genome[i].to_ascii_lowercase();
        for p in 1..n {
            if p + 1 < n && at(p) == d0 && at(p + 1) == d1 {
                flags[p - 1] |= DONOR;
            } else if at(p - 1) == a0 && at(p) == a1 {
                flags[p] |= ACCEPTOR;
            }
        }
        Self { flags, forward }
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Raw bitmask at position `i`.
    pub fn mark(&self, i: usize) -> u8 {
        self.flags[i]
    }

    pub fn view(&self) -> SpliceView<'_> {
        SpliceView {
            flags: &self.flags,
            forward: self.forward,
        }
    }
}

/// Borrowed window of a [`SpliceSiteMap`].
#[derive(Debug, Clone, Copy)]
pub struct SpliceView<'a> {
    flags: &'a [u8],
    forward: bool,
}

impl<'a> SpliceView<'a> {
    #[inline]
    pub fn donor(&self, pos: usize) -> bool {
        self.flags[pos] & DONOR != 0
    }

    #[inline]
    pub fn acceptor(&self, pos: usize) -> bool {
        self.flags[pos] & ACCEPTOR != 0
    }

    pub fn forward(&self) -> bool {
        self.forward
    }

    /// Sub-view over `[start, end)`, keeping the orientation tag.
    pub fn slice(&self, start: usize, end: usize) -> SpliceView<'a> {
        SpliceView {
            flags: &self.flags[start..end],
            forward: self.forward,
        }
    }
}
