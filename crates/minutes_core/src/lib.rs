//! Core domain logic for Minutes, a meeting notes and RSVP tracker.
//! This crate is the single source of truth for access rules, audit stamping
//! and the meeting lifecycle. Transports call into `LifecycleManager`.

pub mod audit;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod policy;
pub mod repo;
pub mod service;

pub use audit::{Clock, SystemClock};
pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status};
pub use model::actor::{Actor, ActorId};
pub use model::attendee::{Attendee, AttendeeInvite, AttendeePatch, AttendeeStatus};
pub use model::item::{ActionItem, ActionItemPatch, Attachment, NewActionItem, NewAttachment};
pub use model::meeting::{Meeting, MeetingPatch, NewMeeting, Visibility};
pub use model::note::{Comment, Note, NoteThread};
pub use model::validation::ValidationError;
pub use repo::meeting_repo::CascadeReport;
pub use repo::{RepoError, RepoResult};
pub use service::{Dashboard, LifecycleError, LifecycleManager, LifecycleResult, MeetingDetail};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
