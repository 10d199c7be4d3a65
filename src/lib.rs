//! Kanban board cache with optimistic task moves.
//!
//! This crate keeps a per-project snapshot of a Kanban board in memory,
//! applies task moves to it speculatively, and reconciles each move with the
//! authoritative server once the remote call settles.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Board, column and task types with their invariants
//! - **Ports**: Abstract trait interfaces for the board query and move services
//! - **Adapters**: Concrete implementations of ports (in-memory backend)
//! - **Services**: The optimistic board cache itself
//!
//! # Modules
//!
//! - [`board`]: Board snapshots, move intents and the optimistic cache

pub mod board;
