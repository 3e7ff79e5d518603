//! Local draft persistence for the template editing form.
//!
//! Two slots protect in-progress edits: a timed autosave per template (or one
//! shared slot for the create flow) and a single auth-interruption backup
//! taken when a session refresh fails right before a forced re-login.

mod autosave;
mod events;
mod session;
mod store;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::spec::TemplateForm;

pub use autosave::{AutosaveTask, SharedSession};
pub use events::{AuthEvent, AuthEvents, Subscription};
pub use session::{DraftSession, MountOutcome, RestoreSource, SessionPhase};
pub use store::{DraftError, DraftStore, FsDraftStore, MemoryDraftStore};

/// Slot holding the auth-interruption backup.
pub const AUTH_BACKUP_KEY: &str = "checkup-template-auth-backup";
const AUTOSAVE_PREFIX: &str = "checkup-template-draft";

pub const AUTOSAVE_PERIOD: Duration = Duration::from_secs(30);
pub const AUTOSAVE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const AUTH_BACKUP_TTL: Duration = Duration::from_secs(60 * 60);
/// Pause between writing the auth backup and tearing the session down.
pub const AUTH_BACKUP_GRACE: Duration = Duration::from_millis(100);

/// Autosave slot for a template, or the shared slot of the create flow.
pub fn autosave_key(template_id: Option<&str>) -> String {
    match template_id {
        Some(id) => format!("{AUTOSAVE_PREFIX}-{id}"),
        None => format!("{AUTOSAVE_PREFIX}-new"),
    }
}

/// Route an editing session is tagged with.
pub fn route_path(template_id: Option<&str>) -> String {
    match template_id {
        Some(id) => format!("/checkup-templates/{id}"),
        None => "/checkup-templates/create".to_string(),
    }
}

/// Timed autosave entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutosaveEntry {
    pub data: TemplateForm,
    /// Unix milliseconds.
    pub timestamp: i64,
}

/// Snapshot taken because the session is about to be cleared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthBackupEntry {
    pub data: TemplateForm,
    pub path: String,
    /// Unix milliseconds.
    pub timestamp: i64,
}

/// Source of "now" for draft timestamps.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
    }
}

pub(crate) fn is_expired(saved_at: i64, now: i64, ttl: Duration) -> bool {
    let age = now.saturating_sub(saved_at);
    age > i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX)
}
