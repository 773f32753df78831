use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use willform_spec::FormSchema;

#[derive(Args, Debug, Clone)]
pub struct SchemaArgs {
    /// Write to a file instead of stdout
    #[arg(long = "out", value_name = "schema.json")]
    pub out: Option<PathBuf>,
}

pub fn run(args: SchemaArgs) -> Result<()> {
    let rendered = serde_json::to_string_pretty(&FormSchema::json_schema())
        .context("failed to encode JSON Schema")?;
    match args.out {
        Some(path) => fs::write(&path, format!("{rendered}\n"))
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            println!("{rendered}");
            Ok(())
        }
    }
}
