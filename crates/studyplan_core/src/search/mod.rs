//! Planner search entry points.
//!
//! # Responsibility
//! - Expose a single keyword query across terms, courses and assessments.
//! - Keep hit shaping inside core.

pub mod scan;

pub use scan::{search_entities, SearchHit};
