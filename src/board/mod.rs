//! Kanban board state for the web client.
//!
//! The client keeps the last known board of each project and lets users drag
//! tasks between columns. Moves are applied to the cached board immediately,
//! sent to the backend, and then either confirmed with the server's task or
//! rolled back. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Backend contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - The optimistic board cache in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
