use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;

use super::{AnswersSource, SchemaSource};
use crate::config::Config;
use crate::exporter::{ExportFormat, exporter_for};
use crate::session::Session;

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub source: SchemaSource,
    #[command(flatten)]
    pub answers: AnswersSource,
    #[arg(long = "out", value_name = "PATH")]
    pub out: PathBuf,
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: ExportFormat,
    /// Export even when required answers are missing
    #[arg(long = "force", default_value_t = false)]
    pub force: bool,
}

pub fn run(args: ExportArgs, config: &Config) -> Result<()> {
    let schema = args.source.load(config)?;
    let answers = args.answers.load(config)?;
    let layout = config.layout()?;
    let session = Session::new(schema)
        .with_answers(answers)
        .with_policy(config.failure_policy());
    let exporter = exporter_for(args.format, &args.out, layout);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let artifact = match runtime.block_on(session.export(exporter.as_ref(), args.force)) {
        Ok(artifact) => artifact,
        Err(failure) => bail!("{}", failure.message),
    };

    match artifact.pages {
        Some(pages) => println!(
            "wrote {} ({} bytes, {pages} pages)",
            artifact.path.display(),
            artifact.bytes
        ),
        None => println!("wrote {} ({} bytes)", artifact.path.display(), artifact.bytes),
    }
    Ok(())
}
