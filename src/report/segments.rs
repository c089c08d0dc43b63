//! Tabular exon/intron segment view.
//!
//! One line per exon (consecutive run of matches, mismatches and short
//! gaps) and one per intron, followed by a Span summary line, in the style
//! of the classic est2genome report. Coordinates are printed 1-based
//! inclusive.

use std::io::{self, Write};

use crate::align::result::{AlignmentResult, EditOp, IntronKind};
use crate::align::AlignConfig;
use crate::scoring::SubstitutionTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Exon,
    Intron(IntronKind),
}

/// One exon or intron of the alignment, with its own score contribution.
#[derive(Debug, Clone)]
pub struct Segment {
    pub kind: SegmentKind,
    pub score: i32,
    pub matches: usize,
    /// Aligned columns for an exon, genomic length for an intron.
    pub columns: usize,
    pub genome_start: usize,
    pub genome_end: usize,
    pub transcript_start: usize,
    pub transcript_end: usize,
}

impl Segment {
    pub fn identity(&self) -> f64 {
        if self.columns == 0 {
            return 0.0;
        }
        100.0 * self.matches as f64 / self.columns as f64
    }
}

/// Cut the edit script into exon and intron segments.
pub fn segments(
    result: &AlignmentResult,
    genome: &[u8],
    transcript: &[u8],
    table: &SubstitutionTable,
    config: &AlignConfig,
) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut gi = result.genome_start;
    let mut ti = result.transcript_start;
    let mut exon: Option<Segment> = None;

    for op in &result.operations {
        if let EditOp::Intron { length, kind } = op {
            if let Some(seg) = exon.take() {
                out.push(seg);
            }
            let penalty = match kind {
                IntronKind::Unscored => config.intron_penalty,
                _ => config.splice_penalty,
            };
            out.push(Segment {
                kind: SegmentKind::Intron(*kind),
                score: -penalty,
                matches: 0,
                columns: *length,
                genome_start: gi,
                genome_end: gi + length - 1,
                transcript_start: ti,
                transcript_end: ti,
            });
            gi += length;
            continue;
        }
        let seg = exon.get_or_insert(Segment {
            kind: SegmentKind::Exon,
            score: 0,
            matches: 0,
            columns: 0,
            genome_start: gi,
            genome_end: gi,
            transcript_start: ti,
            transcript_end: ti,
        });
        match op {
            EditOp::Match | EditOp::Mismatch => {
                seg.score += table.score(genome[gi], transcript[ti]);
                if matches!(op, EditOp::Match) {
                    seg.matches += 1;
                }
                seg.genome_end = gi;
                seg.transcript_end = ti;
                gi += 1;
                ti += 1;
            }
            EditOp::GapInTranscript => {
                seg.score -= config.gap;
                seg.genome_end = gi;
                gi += 1;
            }
            EditOp::GapInGenome => {
                seg.score -= config.gap;
                seg.transcript_end = ti;
                ti += 1;
            }
            EditOp::Intron { .. } => unreachable!(),
        }
        seg.columns += 1;
    }
    if let Some(seg) = exon.take() {
        out.push(seg);
    }
    out
}

fn intron_label(kind: IntronKind) -> &'static str {
    match kind {
        IntronKind::ForwardSpliced => "+Intron",
        IntronKind::ReverseSpliced => "-Intron",
        IntronKind::Unscored => "?Intron",
    }
}

/// Write the segment table and a final Span line.
pub fn write_segments<W: Write>(
    w: &mut W,
    result: &AlignmentResult,
    segs: &[Segment],
    genome_id: &str,
    est_id: &str,
) -> io::Result<()> {
    for seg in segs {
        match seg.kind {
            SegmentKind::Exon => writeln!(
                w,
                "Exon\t{}\t{:.1}\t{}\t{}\t{}\t{}\t{}\t{}",
                seg.score,
                seg.identity(),
                seg.genome_start + 1,
                seg.genome_end + 1,
                genome_id,
                seg.transcript_start + 1,
                seg.transcript_end + 1,
                est_id,
            )?,
            SegmentKind::Intron(kind) => writeln!(
                w,
                "{}\t{}\t.\t{}\t{}\t{}\t{}",
                intron_label(kind),
                seg.score,
                seg.genome_start + 1,
                seg.genome_end + 1,
                genome_id,
                seg.columns,
            )?,
        }
    }
    writeln!(
        w,
        "Span\t{}\t{:.1}\t{}\t{}\t{}\t{}\t{}\t{}",
        result.score,
        result.identity(),
        result.genome_start + 1,
        result.genome_end + 1,
        genome_id,
        result.transcript_start + 1,
        result.transcript_end + 1,
        est_id,
    )
}
