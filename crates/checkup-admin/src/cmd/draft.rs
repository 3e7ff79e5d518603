use anyhow::{Context, Result};
use checkup_questionnaire::DraftStore;
use checkup_questionnaire::draft::{
    AUTH_BACKUP_KEY, AuthBackupEntry, AutosaveEntry, autosave_key, route_path,
};
use checkup_questionnaire::render_text;
use clap::{Args, Subcommand};
use serde::de::DeserializeOwned;
use time::OffsetDateTime;

use super::Env;
use super::i18n::{tr_args, tr_key};

#[derive(Subcommand, Debug, Clone)]
pub enum DraftCommand {
    /// Show the locally saved drafts for a template
    Show(DraftArgs),
    /// Delete the local drafts for a template
    Discard(DraftArgs),
}

#[derive(Args, Debug, Clone)]
pub struct DraftArgs {
    /// Template id; omit for the create flow
    #[arg(long = "id", value_name = "ID")]
    pub id: Option<String>,
}

pub fn run(command: DraftCommand, env: &Env) -> Result<()> {
    let store = env.draft_store()?;
    match command {
        DraftCommand::Show(args) => {
            let key = autosave_key(args.id.as_deref());
            let mut found = false;

            if let Some(entry) = backup_for(store.as_ref(), args.id.as_deref())? {
                found = true;
                println!(
                    "{}",
                    tr_args(
                        "cli.draft.auth_backup",
                        &[("path", &entry.path), ("saved", &format_millis(entry.timestamp))]
                    )
                );
                print!("{}", render_text(&entry.data));
            }
            if let Some(entry) = read::<AutosaveEntry>(store.as_ref(), &key)? {
                found = true;
                println!(
                    "{}",
                    tr_args(
                        "cli.draft.autosave",
                        &[("key", &key), ("saved", &format_millis(entry.timestamp))]
                    )
                );
                print!("{}", render_text(&entry.data));
            }
            if !found {
                println!("{}", tr_key("cli.draft.none"));
            }
            Ok(())
        }
        DraftCommand::Discard(args) => {
            store.remove(&autosave_key(args.id.as_deref()))?;
            if backup_for(store.as_ref(), args.id.as_deref())?.is_some() {
                store.remove(AUTH_BACKUP_KEY)?;
            }
            println!("{}", tr_key("cli.draft.discarded"));
            Ok(())
        }
    }
}

/// The auth backup slot is shared; it only belongs to this template when its
/// route matches.
fn backup_for(
    store: &dyn DraftStore,
    template_id: Option<&str>,
) -> Result<Option<AuthBackupEntry>> {
    let route = route_path(template_id);
    Ok(read::<AuthBackupEntry>(store, AUTH_BACKUP_KEY)?.filter(|entry| entry.path == route))
}

fn read<T: DeserializeOwned>(store: &dyn DraftStore, key: &str) -> Result<Option<T>> {
    let Some(raw) = store.load(key)? else {
        return Ok(None);
    };
    let entry = serde_json::from_str(&raw).with_context(|| format!("draft '{key}' is corrupt"))?;
    Ok(Some(entry))
}

fn format_millis(millis: i64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .ok()
        .and_then(|at| at.format(&time::format_description::well_known::Rfc3339).ok())
        .unwrap_or_else(|| millis.to_string())
}
