//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage primitives the planner service builds on.
//! - Isolate SQLite query details from use-case orchestration.
//!
//! # Invariants
//! - Repositories never cascade; referential cleanup is a service concern.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod memory_repo;
pub mod planner_repo;
