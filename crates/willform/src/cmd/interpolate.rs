use anyhow::Result;
use clap::Args;

use super::AnswersSource;
use crate::config::Config;

#[derive(Args, Debug, Clone)]
pub struct InterpolateArgs {
    #[command(flatten)]
    pub answers: AnswersSource,
    /// Clause template containing `{{field:...}}` placeholders
    #[arg(value_name = "TEMPLATE")]
    pub template: String,
}

pub fn run(args: InterpolateArgs, config: &Config) -> Result<()> {
    let answers = args.answers.load(config)?;
    println!("{}", willform_spec::interpolate(&args.template, &answers));
    Ok(())
}
