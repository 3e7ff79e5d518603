use std::path::PathBuf;

use anyhow::{Result, anyhow, bail};
use checkup_questionnaire::{AuthEvents, validate};
use clap::{Args, Subcommand};
use tracing::info;

use super::i18n::{tr_args, tr_key};
use super::{Env, describe_api_error, describe_validation, read_template, write_json};
use crate::api::{ApiClient, ApiError, UploadKind};

#[derive(Subcommand, Debug, Clone)]
pub enum RemoteCommand {
    /// List templates on the server
    List(ListArgs),
    /// Fetch one template by id or test key
    Get(GetArgs),
    /// Validate and create or update a template
    Push(PushArgs),
    /// Flip the active flag of a template
    Toggle(IdArgs),
    /// Delete a template
    Delete(IdArgs),
    /// Upload an image and print its URL
    Upload(UploadArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Only active templates
    #[arg(long = "active", default_value_t = false)]
    pub active: bool,
}

#[derive(Args, Debug, Clone)]
pub struct GetArgs {
    #[arg(value_name = "ID", required_unless_present = "key")]
    pub id: Option<String>,
    #[arg(long = "key", value_name = "TEST_KEY", conflicts_with = "id")]
    pub key: Option<String>,
    #[arg(long = "out", value_name = "PATH")]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct PushArgs {
    #[arg(value_name = "TEMPLATE.json")]
    pub template: PathBuf,
    /// Update this template instead of the id stored in the file
    #[arg(long = "id", value_name = "ID")]
    pub id: Option<String>,
    /// Always create a new template
    #[arg(long = "create", default_value_t = false, conflicts_with = "id")]
    pub create: bool,
}

#[derive(Args, Debug, Clone)]
pub struct IdArgs {
    #[arg(value_name = "ID")]
    pub id: String,
}

#[derive(Args, Debug, Clone)]
pub struct UploadArgs {
    #[arg(value_name = "IMAGE")]
    pub file: PathBuf,
    /// Use the per-question ceiling instead of the hero image one
    #[arg(long = "question", default_value_t = false)]
    pub question: bool,
}

pub fn run(command: RemoteCommand, env: &Env) -> Result<()> {
    let mut client = env.api_client(AuthEvents::new())?;
    dispatch(command, &mut client).map_err(|err| match err.downcast::<ApiError>() {
        Ok(api) => anyhow!(describe_api_error(&api)),
        Err(other) => other,
    })
}

fn dispatch(command: RemoteCommand, client: &mut ApiClient) -> Result<()> {
    match command {
        RemoteCommand::List(args) => {
            let templates = client.list_templates(args.active)?;
            if templates.is_empty() {
                println!("{}", tr_key("cli.remote.empty"));
            }
            for template in templates {
                let status = if template.form.is_active {
                    tr_key("cli.remote.active")
                } else {
                    tr_key("cli.remote.inactive")
                };
                println!(
                    "{}\t{}\t{}\t{status}\t{}",
                    template.id,
                    template.form.test_key,
                    template.form.title,
                    template.form.questions.len()
                );
            }
            Ok(())
        }
        RemoteCommand::Get(args) => {
            let template = match (&args.id, &args.key) {
                (Some(id), _) => client.get_template(id)?,
                (None, Some(key)) => client.get_template_by_key(key)?,
                (None, None) => bail!("{}", tr_key("cli.remote.id_or_key")),
            };
            write_json(&template, args.out.as_ref())
        }
        RemoteCommand::Push(args) => {
            let loaded = read_template(&args.template)?;
            let result = validate(&loaded.form);
            if !result.valid {
                for line in describe_validation(&result) {
                    eprintln!("  {line}");
                }
                bail!(
                    "{}",
                    tr_args(
                        "cli.validate.failed",
                        &[("count", &result.errors.len().to_string())]
                    )
                );
            }

            let target = if args.create {
                None
            } else {
                args.id.or(loaded.id)
            };
            let saved = match target {
                Some(id) => client.update_template(&id, &loaded.form)?,
                None => client.create_template(&loaded.form)?,
            };
            info!(id = %saved.id, "template pushed");
            println!("{}", tr_args("cli.remote.saved", &[("id", &saved.id)]));
            Ok(())
        }
        RemoteCommand::Toggle(args) => {
            let template = client.toggle_template_active(&args.id)?;
            let key = if template.form.is_active {
                "cli.remote.active"
            } else {
                "cli.remote.inactive"
            };
            println!("{}: {}", template.id, tr_key(key));
            Ok(())
        }
        RemoteCommand::Delete(args) => {
            client.delete_template(&args.id)?;
            println!("{}", tr_args("cli.remote.deleted", &[("id", &args.id)]));
            Ok(())
        }
        RemoteCommand::Upload(args) => {
            let kind = if args.question {
                UploadKind::QuestionImage
            } else {
                UploadKind::TemplateHero
            };
            let url = client.upload_image(&args.file, kind)?;
            println!("{url}");
            Ok(())
        }
    }
}
