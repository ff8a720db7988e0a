//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate policy, audit and repository calls into lifecycle operations.
//! - Keep transports decoupled from storage details and error internals.

pub mod error;
pub mod lifecycle;

pub use error::{LifecycleError, LifecycleResult};
pub use lifecycle::{Dashboard, LifecycleManager, MeetingDetail};
