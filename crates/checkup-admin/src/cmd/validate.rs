use std::path::PathBuf;

use anyhow::{Result, bail};
use checkup_questionnaire::validate;
use clap::Args;

use super::i18n::{tr_args, tr_key};
use super::{describe_validation, read_template, write_json};

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    #[arg(value_name = "TEMPLATE.json")]
    pub template: PathBuf,
    /// Print the raw validation result as JSON
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,
}

pub fn run(args: ValidateArgs) -> Result<()> {
    let loaded = read_template(&args.template)?;
    let result = validate(&loaded.form);

    if args.json {
        write_json(&result, None)?;
    } else if result.valid {
        println!("{}", tr_key("cli.validate.ok"));
    } else {
        for line in describe_validation(&result) {
            println!("  {line}");
        }
    }

    if !result.valid {
        bail!(
            "{}",
            tr_args(
                "cli.validate.failed",
                &[("count", &result.errors.len().to_string())]
            )
        );
    }
    Ok(())
}
