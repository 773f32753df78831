use std::path::PathBuf;

use async_trait::async_trait;
use handlebars::Handlebars;
use serde_json::json;
use willform_spec::{ExportDocument, SummaryEntry};

use super::{DocumentExporter, ExportArtifact, ExportError, ExportFormat, write_output};

const COVER: &str = "cover";
const OPENING: &str = "opening";
const SIGNATURE: &str = "signature";
const FOOTER: &str = "footer";

const COVER_TEMPLATE: &str = "{{title}}\n\n-of-\n\n{{name}}";
const OPENING_TEMPLATE: &str = "This is the Will of {{name}}.";
const SIGNATURE_TEMPLATE: &str = "\
Signed by {{name}}, to give effect to this Will, on

Date
{{rule}}

SIGNATURE
{{#if has_signature}}[signature image on file]{{else}}{{rule}}{{/if}}

We confirm this Will was signed first by {{name}} in our presence and then by both of us in the presence of {{name}}.";
const FOOTER_TEMPLATE: &str = "{{page}}/{{total}}";

const WITNESS_ROWS: [&str; 5] = ["SIGNATURE", "Full name", "Address", "Phone", "Occupation"];
const PAGE_BREAK: char = '\u{c}';

/// Character grid of one page, footer included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLayout {
    pub width: usize,
    pub height: usize,
}

impl PageLayout {
    pub const MIN_WIDTH: usize = 40;
    pub const MIN_HEIGHT: usize = 36;

    pub fn new(width: usize, height: usize) -> Result<Self, ExportError> {
        let layout = Self { width, height };
        layout.validate()?;
        Ok(layout)
    }

    pub fn validate(&self) -> Result<(), ExportError> {
        if self.width < Self::MIN_WIDTH || self.height < Self::MIN_HEIGHT {
            return Err(ExportError::Layout(format!(
                "page must be at least {}x{} characters, got {}x{}",
                Self::MIN_WIDTH,
                Self::MIN_HEIGHT,
                self.width,
                self.height
            )));
        }
        Ok(())
    }

    /// Lines available above the blank separator and the footer.
    fn body_height(&self) -> usize {
        self.height - 2
    }
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            width: 80,
            height: 60,
        }
    }
}

/// A rendered plain-text will.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedText {
    pub text: String,
    pub pages: usize,
}

/// Paginated plain-text will: cover page, numbered clauses, schedule of
/// answers and a signature page with two witness blocks.
#[derive(Debug, Clone)]
pub struct TextExporter {
    out: PathBuf,
    layout: PageLayout,
}

impl TextExporter {
    pub fn new(out: impl Into<PathBuf>, layout: PageLayout) -> Self {
        Self {
            out: out.into(),
            layout,
        }
    }

    pub fn render(&self, document: &ExportDocument) -> Result<RenderedText, ExportError> {
        self.layout.validate()?;
        let templates = templates()?;
        let name = document.testator_or_placeholder();
        let width = self.layout.width;

        let mut pages = vec![self.cover_page(&templates, document)?];
        pages.extend(paginate(
            self.content_lines(&templates, document)?,
            self.layout.body_height(),
        ));

        let mut signature = Vec::new();
        let rendered = templates.render(
            SIGNATURE,
            &json!({
                "name": name,
                "rule": "_".repeat(width.min(40)),
                "has_signature": document.signature.is_some(),
            }),
        )?;
        for line in rendered.lines() {
            push_wrapped(&mut signature, line, width, 0);
        }
        signature.push(String::new());
        signature.extend(witness_blocks(width));
        pages.extend(paginate(signature, self.layout.body_height()));

        let total = pages.len();
        let mut text = String::new();
        for (index, body) in pages.into_iter().enumerate() {
            if index > 0 {
                text.push(PAGE_BREAK);
                text.push('\n');
            }
            let footer = templates.render(FOOTER, &json!({ "page": index + 1, "total": total }))?;
            text.push_str(&self.frame(body, &footer));
        }
        Ok(RenderedText { text, pages: total })
    }

    fn cover_page(
        &self,
        templates: &Handlebars<'static>,
        document: &ExportDocument,
    ) -> Result<Vec<String>, ExportError> {
        let rendered = templates.render(
            COVER,
            &json!({
                "title": document.title,
                "name": document.testator_name.as_deref().unwrap_or_default(),
            }),
        )?;
        let mut centered = Vec::new();
        for line in rendered.lines() {
            if line.is_empty() {
                centered.push(String::new());
                continue;
            }
            for wrapped in wrap(line, self.layout.width) {
                centered.push(center(&wrapped, self.layout.width));
            }
        }
        let top = self.layout.body_height().saturating_sub(centered.len()) / 2;
        let mut page = vec![String::new(); top];
        page.extend(centered);
        page.truncate(self.layout.body_height());
        Ok(page)
    }

    fn content_lines(
        &self,
        templates: &Handlebars<'static>,
        document: &ExportDocument,
    ) -> Result<Vec<Block>, ExportError> {
        let width = self.layout.width;
        let mut blocks = Vec::new();

        let opening = templates.render(
            OPENING,
            &json!({ "name": document.testator_or_placeholder() }),
        )?;
        let mut lines = Vec::new();
        push_wrapped(&mut lines, &opening, width, 0);
        lines.push(String::new());
        blocks.push(Block::new(lines));

        for (index, clause) in document.clauses.iter().enumerate() {
            let mut lines = Vec::new();
            push_wrapped(
                &mut lines,
                &format!("{}. {}", index + 1, clause.field_label),
                width,
                0,
            );
            push_wrapped(&mut lines, &clause.text, width, 0);
            lines.push(String::new());
            blocks.push(Block::new(lines));
        }

        if !document.summary.is_empty() {
            blocks.push(Block::page_start(vec![
                "SCHEDULE OF ANSWERS".to_string(),
                String::new(),
            ]));
            blocks.extend(summary_blocks(&document.summary, width));
        }
        Ok(blocks)
    }

    fn frame(&self, mut body: Vec<String>, footer: &str) -> String {
        body.resize(self.layout.body_height(), String::new());
        body.push(String::new());
        body.push(format!("{footer:>width$}", width = self.layout.width));
        let mut page = body
            .iter()
            .map(|line| line.trim_end())
            .collect::<Vec<_>>()
            .join("\n");
        page.push('\n');
        page
    }
}

#[async_trait]
impl DocumentExporter for TextExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Text
    }

    async fn export(&self, document: &ExportDocument) -> Result<ExportArtifact, ExportError> {
        let rendered = self.render(document)?;
        write_output(&self.out, rendered.text.as_bytes()).await?;
        tracing::info!(
            path = %self.out.display(),
            pages = rendered.pages,
            clauses = document.clauses.len(),
            "wrote text export"
        );
        Ok(ExportArtifact {
            path: self.out.clone(),
            format: ExportFormat::Text,
            bytes: rendered.text.len(),
            pages: Some(rendered.pages),
        })
    }
}

fn templates() -> Result<Handlebars<'static>, ExportError> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.set_strict_mode(true);
    for (name, source) in [
        (COVER, COVER_TEMPLATE),
        (OPENING, OPENING_TEMPLATE),
        (SIGNATURE, SIGNATURE_TEMPLATE),
        (FOOTER, FOOTER_TEMPLATE),
    ] {
        handlebars
            .register_template_string(name, source)
            .map_err(|err| ExportError::Template {
                name: name.to_string(),
                message: err.to_string(),
            })?;
    }
    Ok(handlebars)
}

/// Lines that should stay together on a page when they fit.
#[derive(Debug)]
struct Block {
    lines: Vec<String>,
    new_page: bool,
}

impl Block {
    fn new(lines: Vec<String>) -> Self {
        Self {
            lines,
            new_page: false,
        }
    }

    fn page_start(lines: Vec<String>) -> Self {
        Self {
            lines,
            new_page: true,
        }
    }
}

impl From<String> for Block {
    fn from(line: String) -> Self {
        Block::new(vec![line])
    }
}

fn paginate(blocks: impl IntoIterator<Item = impl Into<Block>>, body_height: usize) -> Vec<Vec<String>> {
    let mut pages = Vec::new();
    let mut page: Vec<String> = Vec::new();
    for block in blocks {
        let block = block.into();
        let remaining = body_height - page.len();
        let breaks = block.new_page || (block.lines.len() > remaining && block.lines.len() <= body_height);
        if breaks && !page.is_empty() {
            pages.push(std::mem::take(&mut page));
        }
        for line in block.lines {
            if page.len() == body_height {
                pages.push(std::mem::take(&mut page));
            }
            page.push(line);
        }
    }
    if !page.is_empty() {
        pages.push(page);
    }
    pages
}

fn summary_blocks(summary: &[SummaryEntry], width: usize) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut current_section: Option<&str> = None;
    for entry in summary {
        if current_section != Some(entry.section_label.as_str()) {
            current_section = Some(&entry.section_label);
            blocks.push(Block::new(vec![entry.section_label.to_uppercase()]));
        }
        let indent = entry.depth * 2;
        let mut lines = Vec::new();
        push_wrapped(&mut lines, &entry.label, width, indent);
        for value in &entry.lines {
            push_wrapped(&mut lines, value, width, indent + 2);
        }
        lines.push(String::new());
        blocks.push(Block::new(lines));
    }
    blocks
}

fn witness_blocks(width: usize) -> Vec<String> {
    let column = width / 2;
    let rule = "_".repeat(column.saturating_sub(4).min(36));
    let mut lines = vec![format!("{:<column$}{}", "Witness 1", "Witness 2")];
    for row in WITNESS_ROWS {
        lines.push(String::new());
        lines.push(format!("{row:<column$}{row}"));
        lines.push(format!("{rule:<column$}{rule}"));
    }
    lines
}

fn center(line: &str, width: usize) -> String {
    let len = line.chars().count();
    let pad = width.saturating_sub(len) / 2;
    format!("{}{line}", " ".repeat(pad))
}

fn push_wrapped(out: &mut Vec<String>, text: &str, width: usize, indent: usize) {
    if text.trim().is_empty() {
        out.push(String::new());
        return;
    }
    let prefix = " ".repeat(indent);
    for line in wrap(text, width.saturating_sub(indent).max(1)) {
        out.push(format!("{prefix}{line}"));
    }
}

/// Greedy word wrap; words longer than `width` are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    for word in text.split_whitespace() {
        let mut word = word;
        while word.chars().count() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let split = word
                .char_indices()
                .nth(width)
                .map(|(index, _)| index)
                .unwrap_or(word.len());
            lines.push(word[..split].to_string());
            word = &word[split..];
        }
        if word.is_empty() {
            continue;
        }
        let word_len = word.chars().count();
        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
