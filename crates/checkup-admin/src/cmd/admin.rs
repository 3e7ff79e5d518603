use std::path::PathBuf;

use anyhow::{Result, anyhow, bail};
use checkup_questionnaire::AuthEvents;
use clap::{Args, Subcommand};

use super::i18n::tr_key;
use super::{Env, describe_api_error, write_json};
use crate::api::{AdminQuery, AdminResource};

#[derive(Subcommand, Debug, Clone)]
pub enum AdminCommand {
    /// List an admin-data collection
    List(AdminListArgs),
    /// Fetch one admin-data record
    Get(AdminGetArgs),
}

#[derive(Args, Debug, Clone)]
pub struct AdminListArgs {
    #[arg(value_enum, value_name = "RESOURCE")]
    pub resource: AdminResource,
    #[arg(long = "page", default_value_t = 1)]
    pub page: u32,
    #[arg(long = "limit", default_value_t = 20)]
    pub limit: u32,
    /// Email (users) or status (doctor applications)
    #[arg(long = "filter", value_name = "VALUE")]
    pub filter: Option<String>,
    #[arg(long = "out", value_name = "PATH")]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct AdminGetArgs {
    #[arg(value_enum, value_name = "RESOURCE")]
    pub resource: AdminResource,
    #[arg(value_name = "ID")]
    pub id: String,
    #[arg(long = "out", value_name = "PATH")]
    pub out: Option<PathBuf>,
}

pub fn run(command: AdminCommand, env: &Env) -> Result<()> {
    let mut client = env.api_client(AuthEvents::new())?;
    let (value, out) = match command {
        AdminCommand::List(args) => {
            let query = AdminQuery {
                page: args.page,
                limit: args.limit,
                filter: args.filter,
            };
            let value = client
                .admin_list(args.resource, &query)
                .map_err(|err| anyhow!(describe_api_error(&err)))?;
            (value, args.out)
        }
        AdminCommand::Get(args) => {
            if !args.resource.has_items() {
                bail!("{}", tr_key("cli.admin.no_items"));
            }
            let value = client
                .admin_get(args.resource, &args.id)
                .map_err(|err| anyhow!(describe_api_error(&err)))?;
            (value, args.out)
        }
    };
    write_json(&value, out.as_ref())
}
