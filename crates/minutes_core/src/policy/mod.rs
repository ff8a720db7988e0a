//! Access policy for meetings and their dependents.
//!
//! # Responsibility
//! - Derive per-request roles (creator, attendee, overseer, other).
//! - Evaluate every capability through one function.
//!
//! # Invariants
//! - Roles are computed from stored rows on each call, never persisted.
//! - Policy code performs no I/O.

pub mod access;
pub mod capability;

pub use access::{evaluate, require, AccessDecision, AccessDenied, AccessRequest};
pub use capability::{Capability, MeetingScope, Roles};
