//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository primitives into planner use-cases.
//! - Keep callers decoupled from storage details.

pub mod planner_service;
