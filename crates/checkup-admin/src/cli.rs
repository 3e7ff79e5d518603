use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Error, Result};
use clap::{Arg, ArgAction, CommandFactory, FromArgMatches, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::{
    self, Env, admin::AdminCommand, draft::DraftCommand, edit::EditArgs, import::ImportArgs,
    login::LoginArgs, preview::PreviewArgs, remote::RemoteCommand, schema::SchemaArgs,
    validate::ValidateArgs,
};
use crate::config::AdminConfig;

#[derive(Parser, Debug)]
#[command(
    name = "checkup-admin",
    about = "Admin toolkit for checkup templates",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    #[arg(long = "locale", value_name = "LOCALE", global = true)]
    locale: Option<String>,

    /// Config file (defaults to the per-user config directory)
    #[arg(long = "config", value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build questions from a .txt, .md or .docx list
    Import(ImportArgs),
    /// Check a template before publishing
    Validate(ValidateArgs),
    /// Print a text preview of a template
    Preview(PreviewArgs),
    /// Print the JSON schema of the template form
    Schema(SchemaArgs),
    /// Edit a template interactively with local drafts
    Edit(EditArgs),
    /// Inspect or discard local drafts
    #[command(subcommand)]
    Draft(DraftCommand),
    /// Sign in to the backend
    Login(LoginArgs),
    /// Manage templates on the backend
    #[command(subcommand)]
    Remote(RemoteCommand),
    /// Read-only admin data (users, statistics, applications)
    #[command(subcommand)]
    Admin(AdminCommand),
}

pub fn main() -> Result<()> {
    let argv: Vec<OsString> = std::env::args_os().collect();
    let config_hint = cmd::i18n::flag_from_argv(&argv, "--config").map(PathBuf::from);
    let configured_locale = AdminConfig::load(config_hint.as_deref())
        .ok()
        .and_then(|config| config.locale);
    cmd::i18n::init(
        cmd::i18n::cli_locale_from_argv(&argv).as_deref(),
        configured_locale.as_deref(),
    );

    let mut command = localize_help(Cli::command(), true);
    let matches = match command.try_get_matches_from_mut(argv) {
        Ok(matches) => matches,
        Err(err) => err.exit(),
    };
    let cli = Cli::from_arg_matches(&matches).map_err(|err| Error::msg(err.to_string()))?;
    init_tracing(cli.verbose);

    let config = AdminConfig::load(cli.config.as_deref())?;
    tracing::debug!(locale = cmd::i18n::selected_locale(), "locale selected");
    let env = Env::new(config);
    match cli.command {
        Commands::Import(args) => cmd::import::run(args),
        Commands::Validate(args) => cmd::validate::run(args),
        Commands::Preview(args) => cmd::preview::run(args),
        Commands::Schema(args) => cmd::schema::run(args),
        Commands::Edit(args) => cmd::edit::run(args, &env),
        Commands::Draft(draft_cmd) => cmd::draft::run(draft_cmd, &env),
        Commands::Login(args) => cmd::login::run(args, &env),
        Commands::Remote(remote_cmd) => cmd::remote::run(remote_cmd, &env),
        Commands::Admin(admin_cmd) => cmd::admin::run(admin_cmd, &env),
    }
}

/// `RUST_LOG` wins; otherwise `-v` flags pick the level. Logs go to stderr so
/// JSON on stdout stays clean.
fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn localize_help(mut command: clap::Command, is_root: bool) -> clap::Command {
    if let Some(about) = command.get_about().map(|s| s.to_string()) {
        command = command.about(cmd::i18n::tr_lit(&about));
    }
    if let Some(long_about) = command.get_long_about().map(|s| s.to_string()) {
        command = command.long_about(cmd::i18n::tr_lit(&long_about));
    }

    command = command
        .disable_help_subcommand(true)
        .disable_help_flag(true)
        .arg(
            Arg::new("help")
                .short('h')
                .long("help")
                .action(ArgAction::Help)
                .help(cmd::i18n::tr_lit("Print help")),
        );
    if is_root {
        command = command.disable_version_flag(true).arg(
            Arg::new("version")
                .short('V')
                .long("version")
                .action(ArgAction::Version)
                .help(cmd::i18n::tr_lit("Print version")),
        );
    }

    let arg_ids = command
        .get_arguments()
        .map(|arg| arg.get_id().clone())
        .collect::<Vec<_>>();
    for arg_id in arg_ids {
        command = command.mut_arg(arg_id, |arg| {
            let mut arg = arg;
            if let Some(help) = arg.get_help().map(ToString::to_string) {
                arg = arg.help(cmd::i18n::tr_lit(&help));
            }
            arg
        });
    }

    let sub_names = command
        .get_subcommands()
        .map(|sub| sub.get_name().to_string())
        .collect::<Vec<_>>();
    for name in sub_names {
        command = command.mut_subcommand(name, |sub| localize_help(sub, false));
    }
    command
}
