use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use super::{
    AUTH_BACKUP_KEY, AUTH_BACKUP_TTL, AUTOSAVE_TTL, AuthBackupEntry, AutosaveEntry, Clock,
    DraftError, DraftStore, autosave_key, is_expired, route_path,
};
use crate::conditions;
use crate::editor::QuestionnaireEditor;
use crate::spec::TemplateForm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Loading,
    Editing,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreSource {
    /// Backup written when the session expired on this route.
    AuthBackup,
    /// Timed autosave; the user may still discard it for the server copy.
    Autosave { saved_at: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountOutcome {
    Restored(RestoreSource),
    /// Nothing to restore: load the server copy (edit) or defaults (create).
    NeedsAuthoritative,
}

/// Draft lifecycle of one template-editing session.
pub struct DraftSession {
    store: Arc<dyn DraftStore>,
    clock: Arc<dyn Clock>,
    template_id: Option<String>,
    route_path: String,
    phase: SessionPhase,
    data_loaded: bool,
    form: TemplateForm,
}

impl std::fmt::Debug for DraftSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftSession")
            .field("template_id", &self.template_id)
            .field("route_path", &self.route_path)
            .field("phase", &self.phase)
            .field("data_loaded", &self.data_loaded)
            .finish_non_exhaustive()
    }
}

impl DraftSession {
    /// Session for `template_id` (edit flow) or `None` (create flow).
    pub fn new(
        store: Arc<dyn DraftStore>,
        clock: Arc<dyn Clock>,
        template_id: Option<String>,
    ) -> Self {
        let route_path = route_path(template_id.as_deref());
        Self {
            store,
            clock,
            template_id,
            route_path,
            phase: SessionPhase::Loading,
            data_loaded: false,
            form: TemplateForm::default(),
        }
    }

    pub fn template_id(&self) -> Option<&str> {
        self.template_id.as_deref()
    }

    pub fn route_path(&self) -> &str {
        &self.route_path
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_data_loaded(&self) -> bool {
        self.data_loaded
    }

    pub fn autosave_key(&self) -> String {
        autosave_key(self.template_id.as_deref())
    }

    pub fn form(&self) -> &TemplateForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut TemplateForm {
        &mut self.form
    }

    pub fn editor(&mut self) -> QuestionnaireEditor<'_> {
        QuestionnaireEditor::new(&mut self.form.questions)
    }

    /// Looks for something to restore: first an auth backup tagged with this
    /// route, then a fresh, non-empty autosave.
    pub fn mount(&mut self) -> Result<MountOutcome, DraftError> {
        let now = self.clock.now_millis();

        if let Some(backup) = self.read_entry::<AuthBackupEntry>(AUTH_BACKUP_KEY)? {
            if is_expired(backup.timestamp, now, AUTH_BACKUP_TTL) {
                warn!(path = %backup.path, "discarding expired auth backup");
                self.store.remove(AUTH_BACKUP_KEY)?;
            } else if backup.path == self.route_path {
                self.store.remove(AUTH_BACKUP_KEY)?;
                self.restore(backup.data);
                info!(path = %self.route_path, "restored form from auth backup");
                return Ok(MountOutcome::Restored(RestoreSource::AuthBackup));
            }
        }

        let key = self.autosave_key();
        if let Some(entry) = self.read_entry::<AutosaveEntry>(&key)? {
            if is_expired(entry.timestamp, now, AUTOSAVE_TTL) {
                warn!(key = %key, "discarding stale autosave");
                self.store.remove(&key)?;
            } else if entry.data.has_content() {
                let saved_at = entry.timestamp;
                self.restore(entry.data);
                info!(key = %key, saved_at, "restored form from autosave");
                return Ok(MountOutcome::Restored(RestoreSource::Autosave { saved_at }));
            } else {
                self.store.remove(&key)?;
            }
        }

        Ok(MountOutcome::NeedsAuthoritative)
    }

    /// Installs the server copy (edit flow) or the defaults (create flow).
    pub fn load_authoritative(&mut self, form: TemplateForm) {
        self.restore(form);
    }

    /// Drops a restored autosave; the caller reloads the authoritative copy.
    pub fn discard_restored(&mut self) -> Result<(), DraftError> {
        self.store.remove(&self.autosave_key())?;
        self.data_loaded = false;
        self.phase = SessionPhase::Loading;
        Ok(())
    }

    /// Writes the timed autosave. Returns `false` when nothing was written
    /// because the form is not populated yet or the session is over.
    pub fn autosave(&self) -> Result<bool, DraftError> {
        if !self.can_snapshot() {
            return Ok(false);
        }
        let entry = AutosaveEntry {
            data: self.form.clone(),
            timestamp: self.clock.now_millis(),
        };
        self.write_entry(&self.autosave_key(), &entry)?;
        Ok(true)
    }

    /// Final best-effort snapshot when the process or view goes away.
    pub fn on_unload(&self) {
        if let Err(err) = self.autosave() {
            warn!(error = %err, "autosave on unload failed");
        }
    }

    /// Snapshots the form into the auth backup slot, tagged with this route.
    pub fn on_auth_failure(&self) -> Result<bool, DraftError> {
        if !self.can_snapshot() {
            return Ok(false);
        }
        let entry = AuthBackupEntry {
            data: self.form.clone(),
            path: self.route_path.clone(),
            timestamp: self.clock.now_millis(),
        };
        self.write_entry(AUTH_BACKUP_KEY, &entry)?;
        info!(path = %self.route_path, "saved auth backup");
        Ok(true)
    }

    /// Clears both slots after the server accepted the template.
    pub fn on_save_success(&mut self) -> Result<(), DraftError> {
        self.store.remove(&self.autosave_key())?;
        self.store.remove(AUTH_BACKUP_KEY)?;
        self.phase = SessionPhase::Closed;
        Ok(())
    }

    fn can_snapshot(&self) -> bool {
        self.phase == SessionPhase::Editing && self.data_loaded
    }

    fn restore(&mut self, mut form: TemplateForm) {
        form.questions = conditions::normalize(form.questions);
        self.form = form;
        self.data_loaded = true;
        self.phase = SessionPhase::Editing;
    }

    fn read_entry<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, DraftError> {
        let Some(raw) = self.store.load(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(entry) => Ok(Some(entry)),
            Err(err) => {
                warn!(key, error = %err, "discarding unreadable draft");
                self.store.remove(key)?;
                Ok(None)
            }
        }
    }

    fn write_entry<T: Serialize>(&self, key: &str, entry: &T) -> Result<(), DraftError> {
        let raw = serde_json::to_string(entry)?;
        self.store.save(key, &raw)
    }
}
