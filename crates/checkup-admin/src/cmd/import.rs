use std::path::PathBuf;

use anyhow::{Result, anyhow};
use checkup_questionnaire::{QuestionnaireEditor, TemplateForm, import_file};
use clap::Args;

use super::i18n::tr_args;
use super::{read_template, write_json};

#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    /// Question list (.txt, .md or .docx)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
    /// Template to append the questions to
    #[arg(long = "into", value_name = "TEMPLATE.json")]
    pub into: Option<PathBuf>,
    /// Where to write the resulting template (stdout when omitted)
    #[arg(long = "out", value_name = "PATH")]
    pub out: Option<PathBuf>,
}

pub fn run(args: ImportArgs) -> Result<()> {
    let mut form = match &args.into {
        Some(path) => read_template(path)?.form,
        None => TemplateForm::default(),
    };

    let existing = form.questions.len();
    let imported = import_file(&args.file, existing).map_err(|err| {
        anyhow!(
            "{}",
            tr_args(
                &format!("cli.import.{}", err.code()),
                &[("detail", &err.to_string())]
            )
        )
    })?;
    let count = imported.len();

    let mut editor = QuestionnaireEditor::new(&mut form.questions);
    editor.import_questions(imported);

    write_json(&form, args.out.as_ref())?;
    eprintln!(
        "{}",
        tr_args("cli.import.done", &[("count", &count.to_string())])
    );
    Ok(())
}
