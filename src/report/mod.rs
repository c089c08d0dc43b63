//! Report renderers. Both views consume only the edit script of an
//! [`crate::align::result::AlignmentResult`]; the engine core owns no output
//! format.

pub mod blocks;
pub mod segments;

pub use blocks::write_blocks;
pub use segments::{segments, write_segments, Segment, SegmentKind};
