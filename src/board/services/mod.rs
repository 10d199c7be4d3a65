//! Application services for client-side board state.

mod cache;
mod config;
mod lane;

pub use cache::{
    BoardCacheError, BoardCacheResult, BoardChange, ChangeKind, OptimisticBoardCache,
    PendingMove, StaleReference,
};
pub use config::BoardCacheConfig;
