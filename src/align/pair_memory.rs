//! Bounded history of intron origins.
//!
//! The forward scan keeps only the best intron origin per transcript column,
//! so by the time the traceback reaches an intron cell the live tracker may
//! already have been overwritten by a later, better origin. Every origin
//! that ever won a cell is therefore appended here; the traceback sorts the
//! store once and binary-searches the origin that was current at its row.

use super::AlignError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct PairEntry {
    col: u32,
    row: u32,
}

const ENTRY_BYTES: usize = std::mem::size_of::<PairEntry>();
const MIN_CAPACITY: usize = 16;

/// Append-only, capacity-bounded store of (transcript column, genome row)
/// observations. One instance lives exactly one top-level alignment call.
pub struct PairMemory {
    entries: Vec<PairEntry>,
    capacity: usize,
    sorted: bool,
}

impl PairMemory {
    /// Capacity derives from the same byte budget as the path matrix.
    pub fn with_budget(budget_bytes: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: (budget_bytes / ENTRY_BYTES).max(MIN_CAPACITY),
            sorted: false,
        }
    }

    /// Drop all entries, keeping the capacity. Called at the start of each
    /// traceback pass: entries are in sub-problem-local coordinates and must
    /// not leak between sub-problems.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.sorted = false;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append one observation; consecutive duplicates are collapsed.
    pub fn record(&mut self, col: usize, row: usize) -> Result<(), AlignError> {
        let entry = PairEntry {
            col: col as u32,
            row: row as u32,
        };
        if self.entries.last() == Some(&entry) {
            return Ok(());
        }
        if self.entries.len() >= self.capacity {
            return Err(AlignError::PairCapacityExceeded);
        }
        self.entries.push(entry);
        self.sorted = false;
        Ok(())
    }

    /// Sort for lookup. Idempotent.
    pub fn freeze(&mut self) {
        if !self.sorted {
            self.entries.sort_unstable();
            self.sorted = true;
        }
    }

    /// Greatest recorded row `<= row` at exactly `col`. Asking for a
    /// coordinate that was never recorded is a logic defect, not a data
    /// problem, and reported as such.
    pub fn lookup(&self, col: usize, row: usize) -> Result<usize, AlignError> {
        debug_assert!(self.sorted, "lookup before freeze");
        let probe = PairEntry {
            col: col as u32,
            row: row as u32,
        };
        let idx = self.entries.partition_point(|e| *e <= probe);
        if idx > 0 {
            let hit = self.entries[idx - 1];
            if hit.col == col as u32 {
                return Ok(hit.row as usize);
            }
        }
        Err(AlignError::MissingIntronOrigin { column: col, row })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_greatest_row_at_column() {
        let mut mem = PairMemory::with_budget(1 << 10);
        mem.record(3, 5).unwrap();
        mem.record(3, 9).unwrap();
        mem.record(7, 2).unwrap();
        mem.record(3, 14).unwrap();
        mem.freeze();
        assert_eq!(mem.lookup(3, 9).unwrap(), 9);
        assert_eq!(mem.lookup(3, 13).unwrap(), 9);
        assert_eq!(mem.lookup(3, 100).unwrap(), 14);
        assert_eq!(mem.lookup(7, 2).unwrap(), 2);
    }

    #[test]
    fn lookup_misses_are_fatal() {
        let mut mem = PairMemory::with_budget(1 << 10);
        mem.record(3, 5).unwrap();
        mem.freeze();
        assert_eq!(
            mem.lookup(3, 4),
            Err(AlignError::MissingIntronOrigin { column: 3, row: 4 })
        );
        assert_eq!(
            mem.lookup(2, 100),
            Err(AlignError::MissingIntronOrigin { column: 2, row: 100 })
        );
    }

    #[test]
    fn capacity_is_enforced() {
        let mut mem = PairMemory::with_budget(0);
        assert_eq!(mem.capacity(), 16);
        for i in 0..16 {
            mem.record(1, i).unwrap();
        }
        assert_eq!(mem.record(1, 99), Err(AlignError::PairCapacityExceeded));
        // Duplicates of the last entry still succeed at capacity.
        mem.record(1, 15).unwrap();
        assert_eq!(mem.len(), 16);
    }

    #[test]
    fn consecutive_duplicates_collapse() {
        let mut mem = PairMemory::with_budget(1 << 10);
        mem.record(2, 4).unwrap();
        mem.record(2, 4).unwrap();
        mem.record(2, 4).unwrap();
        assert_eq!(mem.len(), 1);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut mem = PairMemory::with_budget(1 << 10);
        mem.record(1, 1).unwrap();
        mem.freeze();
        let cap = mem.capacity();
        mem.clear();
        assert!(mem.is_empty());
        assert_eq!(mem.capacity(), cap);
    }
}
