//! Line-oriented editing session over one template.
//!
//! Positions typed by the user are 1-based, the way the dashboard numbers
//! questions. Drafts are autosaved in the background and restored on the next
//! session for the same template.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use checkup_questionnaire::draft::AUTOSAVE_PERIOD;
use checkup_questionnaire::{
    AuthEvent, AuthEvents, AutosaveTask, DraftSession, Direction, FieldType, FormFieldPatch,
    MountOutcome, QuestionField, QuestionKind, RestoreSource, SharedSession, SystemClock,
    TemplateForm, VariantField, import_file, render_text, validate,
};
use clap::Args;
use tokio::runtime::Runtime;
use tracing::{debug, warn};

use super::i18n::{tr_args, tr_key};
use super::{Env, describe_api_error, describe_validation, read_template};
use crate::api::{ApiClient, UploadKind};

#[derive(Args, Debug, Clone)]
pub struct EditArgs {
    /// Server id of the template; omit to create a new one
    #[arg(long = "id", value_name = "ID")]
    pub id: Option<String>,
    /// Seed a new template from a local file instead of the defaults
    #[arg(long = "from", value_name = "TEMPLATE.json", conflicts_with = "id")]
    pub from: Option<PathBuf>,
}

/// Template-level setting changed with `set`.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateSetting {
    Title(String),
    TestKey(String),
    Description(String),
    CarouselTitle(String),
    CarouselSubtitle(String),
    Price(Option<f64>),
    Free(bool),
    Active(bool),
}

/// One parsed input line. Positions are already 0-based.
#[derive(Debug, Clone, PartialEq)]
pub enum EditCommand {
    List,
    Add,
    Remove(usize),
    Duplicate(usize),
    Move(usize, Direction),
    Question(usize, QuestionField),
    VariantAdd(usize),
    VariantRemove(usize, usize),
    Variant(usize, usize, VariantField),
    FieldAdd(usize),
    FieldRemove(usize, usize),
    Field(usize, usize, FormFieldPatch),
    Condition {
        position: usize,
        dependency: String,
        values: Vec<String>,
    },
    Uncondition(usize),
    Set(TemplateSetting),
    BenefitAdd(String),
    BenefitRemove(usize),
    Import(PathBuf),
    Image(usize, PathBuf),
    Hero(PathBuf),
    Validate,
    Preview,
    Autosave,
    Discard,
    Save,
    Help,
    Quit,
}

/// Why a line could not be parsed, as a catalog key plus detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub key: &'static str,
    pub detail: String,
}

impl ParseError {
    fn new(key: &'static str, detail: impl Into<String>) -> Self {
        Self {
            key,
            detail: detail.into(),
        }
    }

    fn usage(command: &str) -> Self {
        Self::new("cli.edit.usage", command)
    }
}

fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (input, ""),
    }
}

fn position(raw: &str) -> Result<usize, ParseError> {
    raw.parse::<usize>()
        .ok()
        .and_then(|value| value.checked_sub(1))
        .ok_or_else(|| ParseError::new("cli.edit.bad_position", raw))
}

fn flag(raw: &str) -> Result<bool, ParseError> {
    match raw {
        "yes" | "on" | "true" | "1" => Ok(true),
        "no" | "off" | "false" | "0" => Ok(false),
        other => Err(ParseError::new("cli.edit.bad_flag", other)),
    }
}

fn field_type(raw: &str) -> Result<FieldType, ParseError> {
    match raw {
        "text" => Ok(FieldType::Text),
        "number" => Ok(FieldType::Number),
        "email" => Ok(FieldType::Email),
        "tel" => Ok(FieldType::Tel),
        other => Err(ParseError::new("cli.edit.bad_field_type", other)),
    }
}

fn optional_number(raw: &str) -> Result<Option<f64>, ParseError> {
    if raw.is_empty() || raw == "none" {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|_| ParseError::new("cli.edit.bad_number", raw))
}

/// Parses one line of input. Blank lines and `#` comments yield `None`.
pub fn parse_command(line: &str) -> Result<Option<EditCommand>, ParseError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (verb, rest) = split_word(line);
    let command = match verb {
        "list" | "ls" => EditCommand::List,
        "add" => EditCommand::Add,
        "remove" | "rm" => EditCommand::Remove(position(rest)?),
        "dup" => EditCommand::Duplicate(position(rest)?),
        "up" => EditCommand::Move(position(rest)?, Direction::Up),
        "down" => EditCommand::Move(position(rest)?, Direction::Down),
        "text" => {
            let (at, text) = split_word(rest);
            EditCommand::Question(position(at)?, QuestionField::Text(text.to_string()))
        }
        "kind" => {
            let (at, kind) = split_word(rest);
            let kind = QuestionKind::parse(kind)
                .ok_or_else(|| ParseError::new("cli.edit.bad_kind", kind))?;
            EditCommand::Question(position(at)?, QuestionField::Kind(kind))
        }
        "other" | "none-answer" => {
            let (at, value) = split_word(rest);
            let value = flag(value)?;
            let field = if verb == "other" {
                QuestionField::HasOtherAnswer(value)
            } else {
                QuestionField::HasNoSelectedAnswer(value)
            };
            EditCommand::Question(position(at)?, field)
        }
        "variant" => parse_variant(rest)?,
        "field" => parse_field(rest)?,
        "cond" => {
            let (at, rest) = split_word(rest);
            let (dependency, values) = split_word(rest);
            if dependency.is_empty() {
                return Err(ParseError::usage("cond"));
            }
            let values = values
                .split(',')
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
                .collect();
            EditCommand::Condition {
                position: position(at)?,
                dependency: dependency.to_string(),
                values,
            }
        }
        "uncond" => EditCommand::Uncondition(position(rest)?),
        "set" => EditCommand::Set(parse_setting(rest)?),
        "benefit" => {
            let (action, value) = split_word(rest);
            match action {
                "add" => EditCommand::BenefitAdd(value.to_string()),
                "rm" => EditCommand::BenefitRemove(position(value)?),
                _ => return Err(ParseError::usage("benefit")),
            }
        }
        "import" if !rest.is_empty() => EditCommand::Import(PathBuf::from(rest)),
        "image" => {
            let (at, file) = split_word(rest);
            if file.is_empty() {
                return Err(ParseError::usage("image"));
            }
            EditCommand::Image(position(at)?, PathBuf::from(file))
        }
        "hero" if !rest.is_empty() => EditCommand::Hero(PathBuf::from(rest)),
        "validate" => EditCommand::Validate,
        "preview" => EditCommand::Preview,
        "autosave" => EditCommand::Autosave,
        "discard" => EditCommand::Discard,
        "save" => EditCommand::Save,
        "help" | "?" => EditCommand::Help,
        "quit" | "exit" | "q" => EditCommand::Quit,
        "import" | "hero" => return Err(ParseError::usage(verb)),
        other => return Err(ParseError::new("cli.edit.unknown_command", other)),
    };
    Ok(Some(command))
}

fn parse_variant(rest: &str) -> Result<EditCommand, ParseError> {
    let (action, rest) = split_word(rest);
    let (at, rest) = split_word(rest);
    let question = position(at)?;
    if action == "add" {
        return Ok(EditCommand::VariantAdd(question));
    }
    let (variant, value) = split_word(rest);
    let variant = position(variant)?;
    let field = match action {
        "rm" => return Ok(EditCommand::VariantRemove(question, variant)),
        "label" => VariantField::Label(value.to_string()),
        "value" => VariantField::Value(value.to_string()),
        "input" => VariantField::HasInput(flag(value)?),
        _ => return Err(ParseError::usage("variant")),
    };
    Ok(EditCommand::Variant(question, variant, field))
}

fn parse_field(rest: &str) -> Result<EditCommand, ParseError> {
    let (action, rest) = split_word(rest);
    let (at, rest) = split_word(rest);
    let question = position(at)?;
    if action == "add" {
        return Ok(EditCommand::FieldAdd(question));
    }
    let (field, value) = split_word(rest);
    let field = position(field)?;
    let patch = match action {
        "rm" => return Ok(EditCommand::FieldRemove(question, field)),
        "label" => FormFieldPatch::Label(value.to_string()),
        "name" => FormFieldPatch::Name(value.to_string()),
        "type" => FormFieldPatch::FieldType(field_type(value)?),
        "required" => FormFieldPatch::Required(flag(value)?),
        "placeholder" if value.is_empty() => FormFieldPatch::Placeholder(None),
        "placeholder" => FormFieldPatch::Placeholder(Some(value.to_string())),
        "min" => FormFieldPatch::Min(optional_number(value)?),
        "max" => FormFieldPatch::Max(optional_number(value)?),
        _ => return Err(ParseError::usage("field")),
    };
    Ok(EditCommand::Field(question, field, patch))
}

fn parse_setting(rest: &str) -> Result<TemplateSetting, ParseError> {
    let (name, value) = split_word(rest);
    let setting = match name {
        "title" => TemplateSetting::Title(value.to_string()),
        "key" => TemplateSetting::TestKey(value.to_string()),
        "description" => TemplateSetting::Description(value.to_string()),
        "carousel-title" => TemplateSetting::CarouselTitle(value.to_string()),
        "carousel-subtitle" => TemplateSetting::CarouselSubtitle(value.to_string()),
        "price" => TemplateSetting::Price(optional_number(value)?),
        "free" => TemplateSetting::Free(flag(value)?),
        "active" => TemplateSetting::Active(flag(value)?),
        _ => return Err(ParseError::usage("set")),
    };
    Ok(setting)
}

/// Applies a form-only command. Commands that need I/O are handled by the
/// session loop and return `Ok(false)` here.
pub fn apply_to_form(form: &mut TemplateForm, command: &EditCommand) -> Result<bool> {
    let mut editor = checkup_questionnaire::QuestionnaireEditor::new(&mut form.questions);
    match command.clone() {
        EditCommand::Add => {
            editor.add_question();
        }
        EditCommand::Remove(at) => {
            editor.remove_question(at)?;
        }
        EditCommand::Duplicate(at) => {
            editor.duplicate_question(at)?;
        }
        EditCommand::Move(at, direction) => {
            editor.move_question(at, direction)?;
        }
        EditCommand::Question(at, field) => {
            editor.set_question_field(at, field)?;
        }
        EditCommand::VariantAdd(at) => {
            editor.add_answer_variant(at)?;
        }
        EditCommand::VariantRemove(at, variant) => {
            editor.remove_answer_variant(at, variant)?;
        }
        EditCommand::Variant(at, variant, field) => {
            editor.update_answer_variant(at, variant, field)?;
        }
        EditCommand::FieldAdd(at) => {
            editor.add_form_field(at)?;
        }
        EditCommand::FieldRemove(at, field) => {
            editor.remove_form_field(at, field)?;
        }
        EditCommand::Field(at, field, patch) => {
            editor.update_form_field(at, field, patch)?;
        }
        EditCommand::Condition {
            position,
            dependency,
            values,
        } => {
            editor.set_condition(position, &dependency, values)?;
        }
        EditCommand::Uncondition(at) => {
            editor.clear_condition(at)?;
        }
        EditCommand::Set(setting) => match setting {
            TemplateSetting::Title(value) => form.title = value,
            TemplateSetting::TestKey(value) => form.test_key = value,
            TemplateSetting::Description(value) => form.description = value,
            TemplateSetting::CarouselTitle(value) => form.carousel_title = value,
            TemplateSetting::CarouselSubtitle(value) => form.carousel_subtitle = value,
            TemplateSetting::Price(value) => form.price = value,
            TemplateSetting::Free(value) => form.free = value,
            TemplateSetting::Active(value) => form.is_active = value,
        },
        EditCommand::BenefitAdd(value) => {
            // The create screen starts with one empty line; fill it first.
            match form.benefits.iter_mut().find(|line| line.trim().is_empty()) {
                Some(slot) => *slot = value,
                None => form.benefits.push(value),
            }
        }
        EditCommand::BenefitRemove(at) => {
            if at >= form.benefits.len() {
                anyhow::bail!(tr_args("cli.edit.bad_position", &[("detail", &(at + 1).to_string())]));
            }
            form.benefits.remove(at);
        }
        _ => return Ok(false),
    }
    Ok(true)
}

fn lock(session: &SharedSession) -> MutexGuard<'_, DraftSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

fn authoritative_form(
    client: &mut ApiClient,
    id: Option<&str>,
    from: Option<&PathBuf>,
) -> Result<TemplateForm> {
    match (id, from) {
        (Some(id), _) => client
            .get_template(id)
            .map(|template| template.form)
            .map_err(|err| anyhow::anyhow!(describe_api_error(&err))),
        (None, Some(path)) => Ok(read_template(path)?.form),
        (None, None) => Ok(TemplateForm::default()),
    }
}

fn print_questions(form: &TemplateForm) {
    if form.questions.is_empty() {
        println!("{}", tr_key("cli.edit.no_questions"));
    }
    for question in &form.questions {
        let condition = question
            .condition
            .as_ref()
            .map(|condition| {
                let values: Vec<&str> = condition.values.iter().map(String::as_str).collect();
                format!(" if #{} in [{}]", condition.question_id, values.join(","))
            })
            .unwrap_or_default();
        println!(
            "{:>3}. [{}] {}{condition}",
            question.index,
            question.kind.as_str(),
            question.text
        );
        for (at, variant) in question.variants.iter().enumerate() {
            println!("       {}) {} = {}", at + 1, variant.value, variant.label);
        }
        for (at, field) in question.fields.iter().enumerate() {
            let field_type = serde_json::to_value(field.field_type)
                .ok()
                .and_then(|value| value.as_str().map(str::to_string))
                .unwrap_or_default();
            println!(
                "       {}) {} ({field_type}) {}",
                at + 1,
                field.name,
                field.label
            );
        }
    }
}

pub fn run(args: EditArgs, env: &Env) -> Result<()> {
    let events = AuthEvents::new();
    let mut client = env.api_client(events.clone())?;
    let store = env.draft_store()?;

    let mut session = DraftSession::new(store, Arc::new(SystemClock), args.id.clone());
    match session.mount().context("failed to read local drafts")? {
        MountOutcome::Restored(RestoreSource::AuthBackup) => {
            println!("{}", tr_key("cli.edit.restored_auth"));
        }
        MountOutcome::Restored(RestoreSource::Autosave { saved_at }) => {
            println!(
                "{}",
                tr_args("cli.edit.restored_autosave", &[("saved", &saved_at.to_string())])
            );
        }
        MountOutcome::NeedsAuthoritative => {
            let form = authoritative_form(&mut client, args.id.as_deref(), args.from.as_ref())?;
            session.load_authoritative(form);
        }
    }

    let shared: SharedSession = Arc::new(Mutex::new(session));
    let backup_target = Arc::clone(&shared);
    let subscription = events.subscribe(move |event| {
        let AuthEvent::SessionExpired { request_path } = event;
        debug!(path = %request_path, "auth failure during edit session");
        if let Err(err) = lock(&backup_target).on_auth_failure() {
            warn!(error = %err, "failed to write auth backup");
        }
    });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .context("failed to start the autosave runtime")?;
    let autosave = AutosaveTask::spawn(runtime.handle(), Arc::clone(&shared), AUTOSAVE_PERIOD);
    if let Err(err) = watch_interrupts(&runtime, Arc::clone(&shared)) {
        warn!(error = %err, "interrupted sessions will not be snapshotted");
    }

    let outcome = repl(&shared, &mut client, &args);

    autosave.cancel();
    lock(&shared).on_unload();
    drop(subscription);
    runtime.shutdown_background();
    outcome
}

/// Ctrl-C and SIGTERM skip the normal exit path, so the unload snapshot is
/// taken here before the process ends with `128 + signal`.
#[cfg(unix)]
fn watch_interrupts(runtime: &Runtime, shared: SharedSession) -> Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let _entered = runtime.enter();
    let mut interrupt = signal(SignalKind::interrupt()).context("failed to watch SIGINT")?;
    let mut terminate = signal(SignalKind::terminate()).context("failed to watch SIGTERM")?;
    runtime.spawn(async move {
        let status = tokio::select! {
            _ = interrupt.recv() => 130,
            _ = terminate.recv() => 143,
        };
        snapshot_and_exit(&shared, status);
    });
    Ok(())
}

#[cfg(not(unix))]
fn watch_interrupts(runtime: &Runtime, shared: SharedSession) -> Result<()> {
    runtime.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            snapshot_and_exit(&shared, 130);
        }
    });
    Ok(())
}

fn snapshot_and_exit(shared: &SharedSession, status: i32) -> ! {
    debug!(status, "edit session interrupted");
    lock(shared).on_unload();
    std::process::exit(status)
}

fn repl(shared: &SharedSession, client: &mut ApiClient, args: &EditArgs) -> Result<()> {
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    if interactive {
        println!("{}", tr_key("cli.edit.banner"));
    }
    let mut lines = stdin.lock().lines();
    loop {
        if interactive {
            print!("> ");
            io::stdout().flush().context("failed to flush stdout")?;
        }
        let Some(line) = lines.next() else {
            return Ok(());
        };
        let line = line.context("failed to read input")?;
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                eprintln!("{}", tr_args(err.key, &[("detail", &err.detail)]));
                continue;
            }
        };
        match step(shared, client, args, command) {
            Ok(true) => {}
            Ok(false) => return Ok(()),
            Err(err) => eprintln!("{err}"),
        }
    }
}

/// Runs one command. Returns `false` once the session should end.
fn step(
    shared: &SharedSession,
    client: &mut ApiClient,
    args: &EditArgs,
    command: EditCommand,
) -> Result<bool> {
    match command {
        EditCommand::Quit => return Ok(false),
        EditCommand::Help => println!("{}", tr_key("cli.edit.help")),
        EditCommand::List => print_questions(lock(shared).form()),
        EditCommand::Preview => print!("{}", render_text(lock(shared).form())),
        EditCommand::Validate => {
            let result = validate(lock(shared).form());
            if result.valid {
                println!("{}", tr_key("cli.validate.ok"));
            }
            for line in describe_validation(&result) {
                println!("  {line}");
            }
        }
        EditCommand::Autosave => {
            let written = lock(shared).autosave()?;
            let key = if written {
                "cli.edit.autosaved"
            } else {
                "cli.edit.autosave_skipped"
            };
            println!("{}", tr_key(key));
        }
        EditCommand::Discard => {
            lock(shared).discard_restored()?;
            let form = authoritative_form(client, args.id.as_deref(), args.from.as_ref())?;
            lock(shared).load_authoritative(form);
            println!("{}", tr_key("cli.edit.discarded"));
        }
        EditCommand::Import(path) => {
            let mut session = lock(shared);
            let existing = session.form().questions.len();
            let imported = import_file(&path, existing).map_err(|err| {
                anyhow::anyhow!(tr_args(
                    &format!("cli.import.{}", err.code()),
                    &[("detail", &err.to_string())]
                ))
            })?;
            let count = imported.len();
            session.editor().import_questions(imported);
            println!("{}", tr_args("cli.import.done", &[("count", &count.to_string())]));
        }
        EditCommand::Image(at, path) => {
            lock(shared).form().questions.get(at).with_context(|| {
                tr_args("cli.edit.bad_position", &[("detail", &(at + 1).to_string())])
            })?;
            // The auth handler takes the session lock, so upload without holding it.
            let url = client
                .upload_image(&path, UploadKind::QuestionImage)
                .map_err(|err| anyhow::anyhow!(describe_api_error(&err)))?;
            lock(shared)
                .editor()
                .set_question_field(at, QuestionField::Image(Some(url.clone())))?;
            println!("{url}");
        }
        EditCommand::Hero(path) => {
            let url = client
                .upload_image(&path, UploadKind::TemplateHero)
                .map_err(|err| anyhow::anyhow!(describe_api_error(&err)))?;
            lock(shared).form_mut().image = Some(url.clone());
            println!("{url}");
        }
        EditCommand::Save => {
            let form = lock(shared).form().clone();
            let result = validate(&form);
            if !result.valid {
                for line in describe_validation(&result) {
                    eprintln!("  {line}");
                }
                anyhow::bail!(tr_args(
                    "cli.validate.failed",
                    &[("count", &result.errors.len().to_string())]
                ));
            }
            let saved = match args.id.as_deref() {
                Some(id) => client.update_template(id, &form),
                None => client.create_template(&form),
            }
            .map_err(|err| anyhow::anyhow!(describe_api_error(&err)))?;
            lock(shared).on_save_success()?;
            println!("{}", tr_args("cli.remote.saved", &[("id", &saved.id)]));
            return Ok(false);
        }
        other => {
            let mut session = lock(shared);
            apply_to_form(session.form_mut(), &other)?;
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_one_based() {
        assert_eq!(parse_command("rm 1").unwrap(), Some(EditCommand::Remove(0)));
        assert!(parse_command("rm 0").is_err());
        assert!(parse_command("up x").is_err());
    }

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        assert_eq!(parse_command("   ").unwrap(), None);
        assert_eq!(parse_command("# note").unwrap(), None);
    }

    #[test]
    fn text_keeps_inner_whitespace() {
        assert_eq!(
            parse_command("text 2 How  are you?").unwrap(),
            Some(EditCommand::Question(
                1,
                QuestionField::Text("How  are you?".into())
            ))
        );
    }

    #[test]
    fn condition_values_are_comma_separated() {
        assert_eq!(
            parse_command("cond 3 1 a, b").unwrap(),
            Some(EditCommand::Condition {
                position: 2,
                dependency: "1".into(),
                values: vec!["a".into(), "b".into()],
            })
        );
        assert_eq!(
            parse_command("cond 3 1").unwrap(),
            Some(EditCommand::Condition {
                position: 2,
                dependency: "1".into(),
                values: Vec::new(),
            })
        );
        assert!(parse_command("cond 3").is_err());
    }

    #[test]
    fn variant_and_field_commands() {
        assert_eq!(
            parse_command("variant label 1 2 Often").unwrap(),
            Some(EditCommand::Variant(0, 1, VariantField::Label("Often".into())))
        );
        assert_eq!(
            parse_command("field type 4 1 email").unwrap(),
            Some(EditCommand::Field(
                3,
                0,
                FormFieldPatch::FieldType(FieldType::Email)
            ))
        );
        assert!(parse_command("field type 4 1 date").is_err());
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = parse_command("kind 1 dropdown").unwrap_err();
        assert_eq!(err.key, "cli.edit.bad_kind");
    }

    #[test]
    fn settings_update_the_form() {
        let mut form = TemplateForm::default();
        for line in ["set title Heart", "set price 12.5", "set free yes", "benefit add Fast"] {
            let command = parse_command(line).unwrap().unwrap();
            assert!(apply_to_form(&mut form, &command).unwrap());
        }
        assert_eq!(form.title, "Heart");
        assert_eq!(form.price, Some(12.5));
        assert!(form.free);
        assert_eq!(form.benefits, vec!["Fast".to_string()]);
    }

    #[test]
    fn structural_commands_go_through_the_editor() {
        let mut form = TemplateForm::default();
        for line in ["add", "add", "cond 2 1 a", "up 2"] {
            let command = parse_command(line).unwrap().unwrap();
            apply_to_form(&mut form, &command).unwrap();
        }
        // The dependent moved above its dependency, so its condition is gone.
        assert!(form.questions.iter().all(|q| q.condition.is_none()));
        assert_eq!(form.questions[0].id, "1");
    }

    #[test]
    fn io_commands_are_left_to_the_session() {
        let mut form = TemplateForm::default();
        assert!(!apply_to_form(&mut form, &EditCommand::Save).unwrap());
    }
}
