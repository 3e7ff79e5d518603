use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, Result, anyhow, bail};
use checkup_questionnaire::AuthEvents;
use clap::Args;

use super::i18n::{tr_args, tr_key};
use super::{Env, describe_api_error};

pub const ENV_PASSWORD: &str = "CHECKUP_PASSWORD";

#[derive(Args, Debug, Clone)]
pub struct LoginArgs {
    #[arg(long = "email", value_name = "EMAIL")]
    pub email: String,
    /// Read from CHECKUP_PASSWORD or stdin when omitted
    #[arg(long = "password", value_name = "PASSWORD")]
    pub password: Option<String>,
    /// Forget the stored session instead of logging in
    #[arg(long = "logout", default_value_t = false)]
    pub logout: bool,
}

pub fn run(args: LoginArgs, env: &Env) -> Result<()> {
    let mut client = env.api_client(AuthEvents::new())?;
    if args.logout {
        client.logout().map_err(|err| anyhow!(describe_api_error(&err)))?;
        println!("{}", tr_key("cli.login.logged_out"));
        return Ok(());
    }

    let password = match args.password {
        Some(password) => password,
        None => match std::env::var(ENV_PASSWORD) {
            Ok(password) => password,
            Err(_) => prompt_password()?,
        },
    };
    if password.is_empty() {
        bail!("{}", tr_key("cli.login.password_required"));
    }

    client
        .login(&args.email, &password)
        .map_err(|err| anyhow!(describe_api_error(&err)))?;
    println!("{}", tr_args("cli.login.ok", &[("email", &args.email)]));
    Ok(())
}

fn prompt_password() -> Result<String> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        print!("{}: ", tr_key("cli.login.password_prompt"));
        io::stdout().flush().context("failed to flush stdout")?;
    }
    let mut line = String::new();
    stdin
        .lock()
        .read_line(&mut line)
        .context("failed to read password")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
