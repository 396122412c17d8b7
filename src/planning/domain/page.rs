//! Offset/limit window for list queries.

/// Offset/limit window applied to list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Page {
    skip: u64,
    limit: u64,
}

impl Page {
    /// Number of records skipped when no offset is given.
    pub const DEFAULT_SKIP: u64 = 0;
    /// Number of records returned when no limit is given.
    pub const DEFAULT_LIMIT: u64 = 100;

    /// Creates a window skipping `skip` records and returning at most
    /// `limit`.
    #[must_use]
    pub const fn new(skip: u64, limit: u64) -> Self {
        Self { skip, limit }
    }

    /// Returns the number of records to skip.
    #[must_use]
    pub const fn skip(self) -> u64 {
        self.skip
    }

    /// Returns the maximum number of records to return.
    #[must_use]
    pub const fn limit(self) -> u64 {
        self.limit
    }

    /// Applies the window to an iterator.
    pub fn apply<I: Iterator>(self, items: I) -> impl Iterator<Item = I::Item> {
        items
            .skip(usize::try_from(self.skip).unwrap_or(usize::MAX))
            .take(usize::try_from(self.limit).unwrap_or(usize::MAX))
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SKIP, Self::DEFAULT_LIMIT)
    }
}
