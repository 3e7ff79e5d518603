use std::collections::BTreeMap;
use std::env;
use std::ffi::OsString;
use std::sync::OnceLock;

use unic_langid::LanguageIdentifier;

const SUPPORTED_LOCALES: &[&str] = &["en", "ru"];

const EN_CATALOG: &str = include_str!("../../i18n/en.json");
const RU_CATALOG: &str = include_str!("../../i18n/ru.json");

static EN_MESSAGES: OnceLock<BTreeMap<String, String>> = OnceLock::new();
static SELECTED_LOCALE: OnceLock<String> = OnceLock::new();
static LOCALE_MESSAGES: OnceLock<BTreeMap<String, String>> = OnceLock::new();
static EN_VALUE_TO_KEY: OnceLock<BTreeMap<String, String>> = OnceLock::new();

fn parse_catalog(raw: &str) -> BTreeMap<String, String> {
    serde_json::from_str(raw).unwrap_or_default()
}

fn en_messages() -> &'static BTreeMap<String, String> {
    EN_MESSAGES.get_or_init(|| parse_catalog(EN_CATALOG))
}

fn en_value_to_key() -> &'static BTreeMap<String, String> {
    EN_VALUE_TO_KEY.get_or_init(|| {
        en_messages()
            .iter()
            .map(|(k, v)| (v.clone(), k.clone()))
            .collect()
    })
}

fn detect_env_locale() -> Option<String> {
    for key in ["LC_ALL", "LC_MESSAGES", "LANG"] {
        if let Ok(val) = env::var(key) {
            let trimmed = val.trim();
            if !trimmed.is_empty() && trimmed != "C" && trimmed != "POSIX" {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

fn normalize_locale(raw: &str) -> Option<String> {
    let mut cleaned = raw.trim();
    if cleaned.is_empty() {
        return None;
    }
    if let Some((head, _)) = cleaned.split_once('.') {
        cleaned = head;
    }
    if let Some((head, _)) = cleaned.split_once('@') {
        cleaned = head;
    }
    let cleaned = cleaned.replace('_', "-");
    cleaned
        .parse::<LanguageIdentifier>()
        .ok()
        .map(|lid| lid.language.as_str().to_string())
}

fn resolve_supported_locale(candidate: &str) -> Option<String> {
    let language = normalize_locale(candidate)?;
    SUPPORTED_LOCALES
        .iter()
        .find(|supported| **supported == language)
        .map(|supported| supported.to_string())
}

/// `--locale`, then the config file, then the environment, then the OS.
pub fn select_locale(cli_locale: Option<&str>, configured: Option<&str>) -> String {
    for candidate in [cli_locale, configured].into_iter().flatten() {
        if let Some(found) = resolve_supported_locale(candidate) {
            return found;
        }
    }
    if let Some(env_loc) = detect_env_locale()
        && let Some(found) = resolve_supported_locale(&env_loc)
    {
        return found;
    }
    if let Some(sys_loc) = sys_locale::get_locale()
        && let Some(found) = resolve_supported_locale(&sys_loc)
    {
        return found;
    }
    "en".to_string()
}

/// English catalog with the locale's entries layered on top.
pub fn resolved_catalog(locale: &str) -> BTreeMap<String, String> {
    let mut merged = en_messages().clone();
    if locale == "ru" {
        merged.extend(parse_catalog(RU_CATALOG));
    }
    merged
}

pub fn init(cli_locale: Option<&str>, configured: Option<&str>) {
    let locale = select_locale(cli_locale, configured);
    let _ = LOCALE_MESSAGES.set(resolved_catalog(&locale));
    let _ = SELECTED_LOCALE.set(locale);
}

/// Value of a global `--flag VALUE` / `--flag=VALUE`, read before clap runs.
pub fn flag_from_argv(args: &[OsString], flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        let raw = arg.to_string_lossy();
        if raw == flag {
            return iter.next().map(|value| value.to_string_lossy().to_string());
        }
        if let Some(rest) = raw.strip_prefix(&prefix) {
            return Some(rest.to_string());
        }
    }
    None
}

pub fn cli_locale_from_argv(args: &[OsString]) -> Option<String> {
    flag_from_argv(args, "--locale")
}

pub fn selected_locale() -> &'static str {
    SELECTED_LOCALE.get().map(String::as_str).unwrap_or("en")
}

pub fn has_key(key: &str) -> bool {
    LOCALE_MESSAGES
        .get()
        .map_or_else(|| en_messages().contains_key(key), |m| m.contains_key(key))
}

pub fn tr_key(key: &str) -> String {
    LOCALE_MESSAGES
        .get()
        .and_then(|m| m.get(key))
        .cloned()
        .or_else(|| en_messages().get(key).cloned())
        .unwrap_or_else(|| key.to_string())
}

/// Translates `key` and fills `{name}` placeholders.
pub fn tr_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut text = tr_key(key);
    for (name, value) in args {
        text = text.replace(&format!("{{{name}}}"), value);
    }
    text
}

pub fn tr_lit(english_literal: &str) -> String {
    let Some(key) = en_value_to_key().get(english_literal) else {
        return english_literal.to_string();
    };
    tr_key(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_candidates_are_normalised() {
        assert_eq!(resolve_supported_locale("ru_RU.UTF-8").as_deref(), Some("ru"));
        assert_eq!(resolve_supported_locale("en-GB").as_deref(), Some("en"));
        assert_eq!(resolve_supported_locale("de"), None);
        assert_eq!(select_locale(Some("ru"), Some("en")), "ru");
        assert_eq!(select_locale(Some("xx"), Some("ru")), "ru");
    }

    #[test]
    fn locale_flag_is_found_before_parsing() {
        let argv: Vec<OsString> = ["checkup-admin", "validate", "--locale=ru", "t.json"]
            .into_iter()
            .map(OsString::from)
            .collect();
        assert_eq!(cli_locale_from_argv(&argv).as_deref(), Some("ru"));
    }

    #[test]
    fn russian_catalog_overrides_english() {
        let ru = resolved_catalog("ru");
        let en = resolved_catalog("en");
        assert_eq!(ru.len(), en.len());
        assert_ne!(ru.get("cli.validate.ok"), en.get("cli.validate.ok"));
    }
}
