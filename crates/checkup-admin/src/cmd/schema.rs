use std::path::PathBuf;

use anyhow::Result;
use checkup_questionnaire::TemplateForm;
use clap::Args;

use super::write_json;

#[derive(Args, Debug, Clone)]
pub struct SchemaArgs {
    /// Write the schema here instead of stdout
    #[arg(long = "out", value_name = "PATH")]
    pub out: Option<PathBuf>,
}

pub fn run(args: SchemaArgs) -> Result<()> {
    let schema = schemars::schema_for!(TemplateForm);
    write_json(&schema, args.out.as_ref())
}
