use crate::draw::codec::Snapshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub seq: u64,
    pub snapshot: Snapshot,
}

/// Linear undo/redo log of surface snapshots.
///
/// The log always holds at least one entry and `cursor` always indexes an
/// existing entry. Entry 0 is the floor: undo stops there and neither commit
/// nor the optional capacity limit removes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
    cursor: usize,
    next_seq: u64,
    max_entries: Option<usize>,
}

impl HistoryLog {
    pub fn new(initial: Snapshot) -> Self {
        Self {
            entries: vec![HistoryEntry {
                seq: 0,
                snapshot: initial,
            }],
            cursor: 0,
            next_seq: 1,
            max_entries: None,
        }
    }

    /// Caps the log at `max_entries` (at least 2). Once full, each commit
    /// evicts the oldest entry after the floor.
    pub fn with_limit(initial: Snapshot, max_entries: Option<usize>) -> Self {
        let mut log = Self::new(initial);
        log.max_entries = max_entries.map(|limit| limit.max(2));
        log
    }

    /// Drops the redo future, appends `snapshot` and moves the cursor onto it.
    /// Returns the new entry's sequence number.
    pub fn commit(&mut self, snapshot: Snapshot) -> u64 {
        self.entries.truncate(self.cursor + 1);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(HistoryEntry { seq, snapshot });

        if let Some(limit) = self.max_entries {
            while self.entries.len() > limit {
                self.entries.remove(1);
            }
        }
        self.cursor = self.entries.len() - 1;
        seq
    }

    pub fn undo(&mut self) -> Option<Snapshot> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.entries[self.cursor].snapshot.clone())
    }

    pub fn redo(&mut self) -> Option<Snapshot> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.entries[self.cursor].snapshot.clone())
    }

    pub fn reset(&mut self, initial: Snapshot) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.clear();
        self.entries.push(HistoryEntry {
            seq,
            snapshot: initial,
        });
        self.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true: the floor entry is always present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn undo_len(&self) -> usize {
        self.cursor
    }

    pub fn redo_len(&self) -> usize {
        self.entries.len() - self.cursor - 1
    }

    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.cursor]
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(tag: u8) -> Snapshot {
        Snapshot::from_bytes(vec![tag])
    }

    fn log_with(commits: &[u8]) -> HistoryLog {
        let mut log = HistoryLog::new(snap(0));
        for &tag in commits {
            log.commit(snap(tag));
        }
        log
    }

    #[test]
    fn new_log_has_single_floor_entry() {
        let log = HistoryLog::new(snap(0));
        assert_eq!(log.len(), 1);
        assert_eq!(log.cursor(), 0);
        assert!(!log.can_undo());
        assert!(!log.can_redo());
    }

    #[test]
    fn new_commit_clears_redo_future() {
        let mut log = log_with(&[1, 2]);
        assert_eq!(log.undo(), Some(snap(1)));
        assert_eq!(log.redo_len(), 1);

        log.commit(snap(3));
        assert_eq!(log.redo_len(), 0);
        assert_eq!(log.redo(), None);
        let tags: Vec<u8> = log.entries().iter().map(|e| e.snapshot.as_bytes()[0]).collect();
        assert_eq!(tags, vec![0, 1, 3]);
    }

    #[test]
    fn undo_redo_walk_the_cursor() {
        let mut log = log_with(&[1, 2]);
        assert_eq!(log.undo(), Some(snap(1)));
        assert_eq!(log.undo(), Some(snap(0)));
        assert_eq!(log.undo(), None);

        assert_eq!(log.redo(), Some(snap(1)));
        assert_eq!(log.redo(), Some(snap(2)));
        assert_eq!(log.redo(), None);
    }

    #[test]
    fn undo_never_drops_floor() {
        let mut log = log_with(&[1]);
        for _ in 0..5 {
            log.undo();
        }
        assert_eq!(log.len(), 2);
        assert_eq!(log.cursor(), 0);
        assert_eq!(log.current().snapshot, snap(0));
    }

    #[test]
    fn sequence_numbers_increase_across_truncation_and_reset() {
        let mut log = log_with(&[1, 2]);
        log.undo();
        let seq = log.commit(snap(3));
        assert_eq!(seq, 3);

        log.reset(snap(9));
        assert_eq!(log.len(), 1);
        assert_eq!(log.cursor(), 0);
        assert_eq!(log.current().seq, 4);
    }

    #[test]
    fn limit_evicts_oldest_entry_after_floor() {
        let mut log = HistoryLog::with_limit(snap(0), Some(3));
        for tag in 1..=4 {
            log.commit(snap(tag));
        }
        let tags: Vec<u8> = log.entries().iter().map(|e| e.snapshot.as_bytes()[0]).collect();
        assert_eq!(tags, vec![0, 3, 4]);
        assert_eq!(log.cursor(), 2);
    }

    #[test]
    fn limit_below_two_is_raised_to_keep_one_undo_step() {
        let mut log = HistoryLog::with_limit(snap(0), Some(0));
        log.commit(snap(1));
        assert_eq!(log.len(), 2);
        assert_eq!(log.undo(), Some(snap(0)));
    }
}
