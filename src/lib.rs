//! Splice-aware alignment of spliced transcripts (ESTs, mRNAs) to genomic
//! DNA in bounded memory, after Mott's est2genome.

pub mod align;
pub mod engine;
pub mod report;
pub mod scoring;
pub mod shuffle;
