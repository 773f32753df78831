use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use willform_spec::walk::{active_section_fields, flatten};
use willform_spec::{
    AnswerStore, FormSchema, is_form_complete_with, is_section_complete, uk, unsatisfied_fields,
};

use super::{AnswersSource, SchemaSource};
use crate::config::Config;

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub source: SchemaSource,
    #[command(flatten)]
    pub answers: AnswersSource,
    /// Emit the report as JSON
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub sections: Vec<SectionReport>,
    pub complete: bool,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionReport {
    pub index: usize,
    pub title: String,
    pub complete: bool,
    pub missing: Vec<String>,
}

pub fn run(args: CheckArgs, config: &Config) -> Result<()> {
    let schema = args.source.load(config)?;
    let answers = args.answers.load(config)?;
    let report = build_report(&schema, &answers, config);
    if args.json {
        let rendered = serde_json::to_string_pretty(&report).context("failed to encode report")?;
        println!("{rendered}");
        return Ok(());
    }
    for section in &report.sections {
        let mark = if section.complete { "x" } else { " " };
        println!("[{mark}] {}. {}", section.index + 1, section.title);
        if !section.missing.is_empty() {
            println!("      missing: {}", section.missing.join(", "));
        }
    }
    for warning in &report.warnings {
        println!("warning: {warning}");
    }
    println!(
        "form complete: {}",
        if report.complete { "yes" } else { "no" }
    );
    Ok(())
}

pub fn build_report(schema: &FormSchema, answers: &AnswerStore, config: &Config) -> CheckReport {
    let sections = schema
        .sections
        .iter()
        .enumerate()
        .map(|(index, section)| SectionReport {
            index,
            title: section.title.clone(),
            complete: is_section_complete(section, answers),
            missing: unsatisfied_fields(section, answers),
        })
        .collect();
    CheckReport {
        sections,
        complete: is_form_complete_with(schema, answers, config.failure_policy()),
        warnings: format_warnings(schema, answers),
    }
}

/// Regional format problems in visible answers. These never block completion.
fn format_warnings(schema: &FormSchema, answers: &AnswerStore) -> Vec<String> {
    let mut warnings = Vec::new();
    for section in &schema.sections {
        let active = active_section_fields(section, answers);
        for node in flatten(&active) {
            let field = node.field;
            let Some(value) = answers.get(&field.id).printable() else {
                continue;
            };
            let id = field.id.to_ascii_lowercase();
            if id.contains("postcode") && !uk::validate_postcode(&value) {
                warnings.push(format!("{}: '{value}' is not a valid UK postcode", field.id));
            } else if id.contains("phone") && !uk::validate_phone(&value) {
                warnings.push(format!("{}: '{value}' is not a valid UK phone number", field.id));
            } else if id.contains("address") && !uk::validate_address(&value) {
                warnings.push(format!(
                    "{}: address looks too short ({})",
                    field.id,
                    uk::ADDRESS_EXAMPLE
                ));
            }
        }
    }
    warnings
}
