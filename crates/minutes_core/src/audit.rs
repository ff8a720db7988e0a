//! Audit trail stamping.
//!
//! # Responsibility
//! - Compute creator/editor identity and timestamps for each write.
//! - Provide the clock seam used by the lifecycle service.
//!
//! # Invariants
//! - Stamping is a pure function of (actor, prior stamp, now).
//! - An update always advances `updated_at` strictly past its prior value,
//!   even when the wall clock stalls or steps backwards.
//! - Stamps are only persisted by committed writes; reads never stamp.

use crate::model::actor::{Actor, ActorId};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of "now" in epoch milliseconds.
pub trait Clock {
    fn now_ms(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
            .unwrap_or(0)
    }
}

/// Provenance fields carried by auditable records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditStamp {
    pub created_by: ActorId,
    pub created_at: i64,
    pub last_edited_by: Option<ActorId>,
    pub updated_at: i64,
}

impl AuditStamp {
    /// Stamp for a freshly created record. Nobody has edited it yet.
    pub fn created(actor: &Actor, now: i64) -> Self {
        Self {
            created_by: actor.id,
            created_at: now,
            last_edited_by: None,
            updated_at: now,
        }
    }

    /// Stamp after an accepted write by `actor`.
    ///
    /// Write-through: the stamp refreshes even when no field value changed.
    pub fn touched(&self, actor: &Actor, now: i64) -> Self {
        Self {
            created_by: self.created_by,
            created_at: self.created_at,
            last_edited_by: Some(actor.id),
            updated_at: next_updated_at(self.updated_at, now),
        }
    }
}

/// Next `updated_at` strictly greater than `previous`.
pub fn next_updated_at(previous: i64, now: i64) -> i64 {
    now.max(previous.saturating_add(1))
}
