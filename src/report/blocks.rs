//! Pairwise block view: genome, marker and transcript lanes wrapped at a
//! fixed width, with introns collapsed to a one-line annotation between
//! blocks instead of being spelled out base by base.

use std::io::{self, Write};

use crate::align::result::{AlignmentResult, EditOp, IntronKind};

struct Block {
    top: String,
    mid: String,
    bottom: String,
    genome_start: usize,
    transcript_start: usize,
}

enum Piece {
    Aligned(Block),
    Intron { length: usize, kind: IntronKind },
}

fn build_pieces(result: &AlignmentResult, genome: &[u8], transcript: &[u8]) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut gi = result.genome_start;
    let mut ti = result.transcript_start;
    let mut block: Option<Block> = None;

    for op in &result.operations {
        if let EditOp::Intron { length, kind } = op {
            if let Some(b) = block.take() {
                pieces.push(Piece::Aligned(b));
            }
            pieces.push(Piece::Intron {
                length: *length,
                kind: *kind,
            });
            gi += length;
            continue;
        }
        let b = block.get_or_insert_with(|| Block {
            top: String::new(),
            mid: String::new(),
            bottom: String::new(),
            genome_start: gi,
            transcript_start: ti,
        });
        match op {
            EditOp::Match => {
                b.top.push(genome[gi] as char);
                b.mid.push('|');
                b.bottom.push(transcript[ti] as char);
                gi += 1;
                ti += 1;
            }
            EditOp::Mismatch => {
                b.top.push(genome[gi] as char);
                b.mid.push(' ');
                b.bottom.push(transcript[ti] as char);
                gi += 1;
                ti += 1;
            }
            EditOp::GapInTranscript => {
                b.top.push(genome[gi] as char);
                b.mid.push(' ');
                b.bottom.push('-');
                gi += 1;
            }
            EditOp::GapInGenome => {
                b.top.push('-');
                b.mid.push(' ');
                b.bottom.push(transcript[ti] as char);
                ti += 1;
            }
            EditOp::Intron { .. } => unreachable!(),
        }
    }
    if let Some(b) = block.take() {
        pieces.push(Piece::Aligned(b));
    }
    pieces
}

fn intron_tag(kind: IntronKind) -> &'static str {
    match kind {
        IntronKind::ForwardSpliced => "forward",
        IntronKind::ReverseSpliced => "reverse",
        IntronKind::Unscored => "unscored",
    }
}

fn consumed(lane: &str) -> usize {
    lane.bytes().filter(|&c| c != b'-').count()
}

/// Write the wrapped pairwise view of an alignment.
pub fn write_blocks<W: Write>(
    w: &mut W,
    result: &AlignmentResult,
    genome: &[u8],
    transcript: &[u8],
    genome_id: &str,
    est_id: &str,
    width: usize,
) -> io::Result<()> {
    let width = width.max(1);
    let label_len = genome_id.len().max(est_id.len());
    for piece in build_pieces(result, genome, transcript) {
        match piece {
            Piece::Intron { length, kind } => {
                writeln!(w)?;
                writeln!(w, "{:>label_len$} ...... {} bp {} intron ......", "", length, intron_tag(kind))?;
            }
            Piece::Aligned(block) => {
                let mut g_pos = block.genome_start;
                let mut t_pos = block.transcript_start;
                let mut offset = 0;
                while offset < block.top.len() {
                    let end = (offset + width).min(block.top.len());
                    let top = &block.top[offset..end];
                    let mid = &block.mid[offset..end];
                    let bottom = &block.bottom[offset..end];
                    let g_used = consumed(top);
                    let t_used = consumed(bottom);
                    writeln!(w)?;
                    writeln!(
                        w,
                        "{:>label_len$} {:>8} {} {}",
                        genome_id,
                        g_pos + 1,
                        top,
                        g_pos + g_used,
                    )?;
                    writeln!(w, "{:>label_len$} {:>8} {}", "", "", mid)?;
                    writeln!(
                        w,
                        "{:>label_len$} {:>8} {} {}",
                        est_id,
                        t_pos + 1,
                        bottom,
                        t_pos + t_used,
                    )?;
                    g_pos += g_used;
                    t_pos += t_used;
                    offset = end;
                }
            }
        }
    }
    writeln!(w)
}
