use std::path::PathBuf;

use anyhow::Result;
use checkup_questionnaire::render_text;
use clap::Args;

use super::read_template;

#[derive(Args, Debug, Clone)]
pub struct PreviewArgs {
    #[arg(value_name = "TEMPLATE.json")]
    pub template: PathBuf,
}

pub fn run(args: PreviewArgs) -> Result<()> {
    let loaded = read_template(&args.template)?;
    print!("{}", render_text(&loaded.form));
    Ok(())
}
