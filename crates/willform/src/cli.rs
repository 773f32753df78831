use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::cmd::{
    self, answer::AnswerArgs, answer::ClearArgs, answer::ToggleArgs, check::CheckArgs,
    draft::DraftCommand, export::ExportArgs, interpolate::InterpolateArgs, preview::PreviewArgs,
    schema::SchemaArgs,
};
use crate::config::Config;
use crate::logging;

#[derive(Parser, Debug)]
#[command(
    name = "willform",
    about = "Schema-driven will questionnaire: completion, clause preview and export",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    #[arg(long = "config", value_name = "willform.toml", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the JSON Schema of the form schema document
    Schema(SchemaArgs),
    /// Report per-section completion and missing required answers
    Check(CheckArgs),
    /// Print the resolved will clauses up to a section
    Preview(PreviewArgs),
    /// Resolve the placeholders of one clause template
    Interpolate(InterpolateArgs),
    /// Store an answer in the draft
    Answer(AnswerArgs),
    /// Check or uncheck one option of a checkbox group in the draft
    Toggle(ToggleArgs),
    /// Remove an answer from the draft
    Clear(ClearArgs),
    /// Inspect or discard the saved draft
    #[command(subcommand)]
    Draft(DraftCommand),
    /// Export the will document
    Export(ExportArgs),
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    logging::init(&config.log.filter);
    match cli.command {
        Commands::Schema(args) => cmd::schema::run(args),
        Commands::Check(args) => cmd::check::run(args, &config),
        Commands::Preview(args) => cmd::preview::run(args, &config),
        Commands::Interpolate(args) => cmd::interpolate::run(args, &config),
        Commands::Answer(args) => cmd::answer::run_answer(args, &config),
        Commands::Toggle(args) => cmd::answer::run_toggle(args, &config),
        Commands::Clear(args) => cmd::answer::run_clear(args, &config),
        Commands::Draft(command) => cmd::draft::run(command, &config),
        Commands::Export(args) => cmd::export::run(args, &config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exporter::ExportFormat;

    #[test]
    fn parses_export_command() {
        let cli = Cli::try_parse_from([
            "willform",
            "--config",
            "custom.toml",
            "export",
            "--schema",
            "will.json",
            "--out",
            "will.txt",
            "--format",
            "json",
            "--force",
        ])
        .expect("expected CLI to parse");
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        match cli.command {
            Commands::Export(args) => {
                assert_eq!(args.source.schema, Some(PathBuf::from("will.json")));
                assert_eq!(args.out, PathBuf::from("will.txt"));
                assert_eq!(args.format, ExportFormat::Json);
                assert!(args.force);
            }
            _ => panic!("expected export args"),
        }
    }

    #[test]
    fn parses_toggle_off() {
        let cli = Cli::try_parse_from([
            "willform",
            "toggle",
            "funeralWishes",
            "music",
            "--off",
        ])
        .expect("expected CLI to parse");
        match cli.command {
            Commands::Toggle(args) => {
                assert_eq!(args.field, "funeralWishes");
                assert_eq!(args.value, "music");
                assert!(args.off);
            }
            _ => panic!("expected toggle args"),
        }
    }

    #[test]
    fn parses_draft_subcommand() {
        let cli = Cli::try_parse_from(["willform", "draft", "clear"])
            .expect("expected CLI to parse");
        assert!(matches!(cli.command, Commands::Draft(DraftCommand::Clear)));
    }

    #[test]
    fn export_requires_out() {
        assert!(Cli::try_parse_from(["willform", "export"]).is_err());
    }
}
