//! Domain model for meetings and their dependents.
//!
//! # Responsibility
//! - Define canonical records and request inputs used by core logic.
//! - Validate caller input before it reaches a transaction.
//!
//! # Invariants
//! - `Meeting` is the aggregate root; every other record references one
//!   meeting (comments reference one note).
//! - Every record is identified by a stable v4 UUID.
//! - Timestamps are Unix epoch milliseconds.

pub mod actor;
pub mod attendee;
pub mod item;
pub mod meeting;
pub mod note;
pub mod validation;
