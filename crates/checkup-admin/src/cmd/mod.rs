pub mod admin;
pub mod draft;
pub mod edit;
pub mod i18n;
pub mod import;
pub mod login;
pub mod preview;
pub mod remote;
pub mod schema;
pub mod validate;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use checkup_questionnaire::{
    AuthEvents, CheckupTemplate, DraftStore, FsDraftStore, TemplateForm, ValidationResult,
};
use serde::Serialize;
use serde_json::Value;

use crate::api::{ApiClient, ApiError, SessionFile};
use crate::config::AdminConfig;

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Env {
    pub config: AdminConfig,
}

impl Env {
    pub fn new(config: AdminConfig) -> Self {
        Self { config }
    }

    pub fn api_client(&self, events: AuthEvents) -> Result<ApiClient> {
        let base = self.config.base_url()?;
        let sessions = SessionFile::new(self.config.session_path()?);
        ApiClient::connect(base, sessions, events).context("failed to set up the HTTP client")
    }

    pub fn draft_store(&self) -> Result<Arc<dyn DraftStore>> {
        Ok(Arc::new(FsDraftStore::new(self.config.drafts_dir()?)))
    }
}

/// Template read from disk, with the server id when the file is a full record.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTemplate {
    pub form: TemplateForm,
    pub id: Option<String>,
}

/// Accepts both a bare form and a server record (`_id`, `createdAt`, ...).
pub fn read_template(path: &Path) -> Result<LoadedTemplate> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    if value.get("_id").is_some() {
        let record: CheckupTemplate = serde_json::from_value(value)
            .with_context(|| format!("{} is not a checkup template", path.display()))?;
        return Ok(LoadedTemplate {
            form: record.form,
            id: Some(record.id),
        });
    }
    let form = serde_json::from_value(value)
        .with_context(|| format!("{} is not a checkup template", path.display()))?;
    Ok(LoadedTemplate { form, id: None })
}

/// Pretty JSON to `out`, or stdout when `out` is `None`.
pub fn write_json<T: Serialize>(value: &T, out: Option<&PathBuf>) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to encode JSON")?;
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            fs::write(path, format!("{rendered}\n"))
                .with_context(|| format!("failed to write {}", path.display()))
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{rendered}").context("failed to write to stdout")
        }
    }
}

/// Localised line per validation error.
pub fn describe_validation(result: &ValidationResult) -> Vec<String> {
    result
        .errors
        .iter()
        .map(|error| {
            let key = format!("validation.{}", error.code);
            let message = if i18n::has_key(&key) {
                i18n::tr_key(&key)
            } else {
                error.message.clone()
            };
            format!("{}: {message}", error.path)
        })
        .collect()
}

/// Localised message for a failed API call. Known server codes get their
/// catalog entry, everything else the generic failure text.
pub fn describe_api_error(err: &ApiError) -> String {
    match err {
        ApiError::SessionExpired => i18n::tr_key("cli.api.session_expired"),
        ApiError::Upload(upload) => {
            let key = format!("cli.upload.{}", upload.code());
            format!("{}: {upload}", i18n::tr_key(&key))
        }
        _ => {
            if let Some(code) = err.server_code() {
                let key = format!("server.{code}");
                if i18n::has_key(&key) {
                    return i18n::tr_key(&key);
                }
            }
            i18n::tr_args("cli.api.failed", &[("detail", &err.to_string())])
        }
    }
}
