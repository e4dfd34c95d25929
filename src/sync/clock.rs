//! Snapshot ordering guard

/// How inbound snapshots are reconciled with local state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Every inbound snapshot overwrites local state
    #[default]
    LastWriterWins,
    /// Snapshots carry a sequence number and stale ones are dropped
    Ordered,
}

/// Lamport style counter stamping outbound snapshots and filtering inbound ones
#[derive(Debug, Clone, Default)]
pub struct SnapshotClock {
    mode: SyncMode,
    last_seq: u64,
}

impl SnapshotClock {
    pub fn new(mode: SyncMode) -> Self {
        Self { mode, last_seq: 0 }
    }

    pub fn last_seq(&self) -> u64 {
        self.last_seq
    }

    /// Sequence number for the next outbound snapshot, if ordering is on
    pub fn stamp(&mut self) -> Option<u64> {
        match self.mode {
            SyncMode::LastWriterWins => None,
            SyncMode::Ordered => {
                self.last_seq += 1;
                Some(self.last_seq)
            }
        }
    }

    /// Whether an inbound snapshot with this stamp should be applied.
    ///
    /// Unstamped snapshots are always accepted.
    pub fn accept(&mut self, seq: Option<u64>) -> bool {
        match (self.mode, seq) {
            (SyncMode::LastWriterWins, _) | (SyncMode::Ordered, None) => true,
            (SyncMode::Ordered, Some(seq)) if seq > self.last_seq => {
                self.last_seq = seq;
                true
            }
            (SyncMode::Ordered, Some(_)) => false,
        }
    }
}
