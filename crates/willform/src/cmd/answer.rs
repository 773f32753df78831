//! Draft mutations that stand in for widget callbacks.

use anyhow::Result;
use clap::Args;
use serde_json::Value;
use willform_spec::{AnswerValue, Scalar};

use super::SchemaSource;
use crate::config::Config;
use crate::session::Session;

#[derive(Args, Debug, Clone)]
pub struct AnswerArgs {
    #[command(flatten)]
    pub source: SchemaSource,
    #[arg(value_name = "FIELD")]
    pub field: String,
    /// JSON value (`42`, `true`, `[...]`, `{...}`) or plain text
    #[arg(value_name = "VALUE")]
    pub value: String,
    /// Store VALUE as text even when it parses as JSON
    #[arg(long = "text", default_value_t = false)]
    pub text: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ToggleArgs {
    #[command(flatten)]
    pub source: SchemaSource,
    #[arg(value_name = "FIELD")]
    pub field: String,
    #[arg(value_name = "OPTION")]
    pub value: String,
    /// Uncheck the option instead of checking it
    #[arg(long = "off", default_value_t = false)]
    pub off: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ClearArgs {
    #[command(flatten)]
    pub source: SchemaSource,
    #[arg(value_name = "FIELD")]
    pub field: String,
}

pub fn run_answer(args: AnswerArgs, config: &Config) -> Result<()> {
    let mut session = open(&args.source, config)?;
    let value = if args.text {
        AnswerValue::text(args.value)
    } else {
        parse_value(&args.value)
    };
    session.set_answer(&args.field, value)?;
    println!("saved {}", args.field);
    Ok(())
}

pub fn run_toggle(args: ToggleArgs, config: &Config) -> Result<()> {
    let mut session = open(&args.source, config)?;
    let option = serde_json::from_str::<Value>(&args.value)
        .ok()
        .and_then(|value| Scalar::from_json(&value))
        .unwrap_or_else(|| Scalar::from(args.value.as_str()));
    session.toggle_option(&args.field, option, !args.off)?;
    let state = if args.off { "unchecked" } else { "checked" };
    println!("{state} {} on {}", args.value, args.field);
    Ok(())
}

pub fn run_clear(args: ClearArgs, config: &Config) -> Result<()> {
    let mut session = open(&args.source, config)?;
    session.clear_answer(&args.field)?;
    println!("cleared {}", args.field);
    Ok(())
}

fn open(source: &SchemaSource, config: &Config) -> Result<Session> {
    let schema = source.load(config)?;
    let mut session = Session::new(schema)
        .with_policy(config.failure_policy())
        .with_draft(Box::new(config.draft_store()?));
    session.restore_draft()?;
    Ok(session)
}

fn parse_value(raw: &str) -> AnswerValue {
    serde_json::from_str::<Value>(raw)
        .map(AnswerValue::from)
        .unwrap_or_else(|_| AnswerValue::text(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_parse_as_json_then_text() {
        assert_eq!(parse_value("42"), AnswerValue::from(42));
        assert_eq!(parse_value("Ada Lovelace"), AnswerValue::text("Ada Lovelace"));
        assert!(matches!(parse_value(r#"["a","b"]"#), AnswerValue::List(items) if items.len() == 2));
    }
}
