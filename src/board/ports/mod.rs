//! Port contracts for the remote board backend.
//!
//! The board cache only ever talks to the backend through these traits.

pub mod mover;
pub mod query;

pub use mover::{TaskMoveError, TaskMoveRequest, TaskMoveResult, TaskMoveService};
pub use query::{BoardQueryError, BoardQueryResult, BoardQueryService};
