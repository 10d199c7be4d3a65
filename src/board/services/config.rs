//! Configuration for the optimistic board cache.

/// Tunables for [`OptimisticBoardCache`](super::OptimisticBoardCache).
///
/// # Examples
///
/// ```
/// use kanban_board_cache::board::services::BoardCacheConfig;
///
/// let config = BoardCacheConfig::default();
/// assert!(!config.refetch_after_confirm);
///
/// let refetching = BoardCacheConfig::refetching();
/// assert!(refetching.refetch_after_confirm);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardCacheConfig {
    /// Per-project change notification buffer. Slow subscribers lose the
    /// oldest changes beyond this many.
    pub event_capacity: usize,
    /// Refetch the whole board after every confirmed move.
    pub refetch_after_confirm: bool,
}

impl BoardCacheConfig {
    /// Default notification buffer per project.
    pub const DEFAULT_EVENT_CAPACITY: usize = 64;

    /// Configuration that refetches the board after each confirmed move,
    /// picking up server-side changes made by other actors.
    #[must_use]
    pub const fn refetching() -> Self {
        Self {
            event_capacity: Self::DEFAULT_EVENT_CAPACITY,
            refetch_after_confirm: true,
        }
    }

    /// Sets the notification buffer size.
    #[must_use]
    pub const fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Returns the notification buffer size, never zero.
    #[must_use]
    pub const fn effective_event_capacity(&self) -> usize {
        if self.event_capacity == 0 {
            1
        } else {
            self.event_capacity
        }
    }
}

impl Default for BoardCacheConfig {
    fn default() -> Self {
        Self {
            event_capacity: Self::DEFAULT_EVENT_CAPACITY,
            refetch_after_confirm: false,
        }
    }
}
