use anyhow::{Context, Result, bail};
use clap::Args;

use super::{AnswersSource, SchemaSource};
use crate::config::Config;
use crate::session::Session;

#[derive(Args, Debug, Clone)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub source: SchemaSource,
    #[command(flatten)]
    pub answers: AnswersSource,
    /// Last section to include, counting from 1; defaults to the final section
    #[arg(long = "section", value_name = "N")]
    pub section: Option<usize>,
    /// Emit the clauses as JSON
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,
}

pub fn run(args: PreviewArgs, config: &Config) -> Result<()> {
    let schema = args.source.load(config)?;
    if schema.is_empty() {
        bail!("form schema has no sections");
    }
    let answers = args.answers.load(config)?;
    let mut session = Session::new(schema).with_answers(answers);
    let step = args.section.unwrap_or(session.progress().total);
    if step == 0 {
        bail!("--section counts from 1");
    }
    session.jump_to(step - 1)?;
    let clauses = session.preview();

    if args.json {
        let rendered = serde_json::to_string_pretty(&clauses).context("failed to encode clauses")?;
        println!("{rendered}");
        return Ok(());
    }
    println!("{}", session.progress());
    if clauses.is_empty() {
        println!("no clauses yet");
    }
    for (index, clause) in clauses.iter().enumerate() {
        println!("{}. {} [{}]", index + 1, clause.field_label, clause.section_label);
        println!("   {}", clause.text);
    }
    Ok(())
}
