use jiff::Timestamp;

/// The fields packed into a single id, as laid out by a [`Layout`](crate::Layout).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdParts {
    /// Seconds elapsed since the generator's epoch.
    pub timestamp: u64,
    pub node_id: u64,
    pub sequence: u64,
}

impl IdParts {
    /// Wall-clock time of the id, given the epoch it was generated against.
    ///
    /// Returns `None` if the result falls outside the range [`Timestamp`] supports.
    pub fn timestamp_at(&self, epoch: Timestamp) -> Option<Timestamp> {
        let elapsed = i64::try_from(self.timestamp).ok()?;
        let second = epoch.as_second().checked_add(elapsed)?;
        Timestamp::from_second(second).ok()
    }
}
