use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use willform::{
    DocumentExporter, ExportArtifact, ExportError, ExportFormat, JsonExporter, PageLayout,
    Session, TextExporter,
};
use willform_spec::{AnswerStore, ExportDocument, FormSchema, prepare_export};

const FIXTURE: &str = include_str!("../../willform-spec/tests/fixtures/will_form.json");

fn will_form() -> Arc<FormSchema> {
    Arc::new(FormSchema::from_json_str(FIXTURE).expect("fixture schema"))
}

fn complete_answers() -> AnswerStore {
    AnswerStore::from_value(json!({
        "title": "Dr",
        "firstName": "Ada",
        "lastName": "Lovelace",
        "dateOfBirth": "1815-12-10",
        "address": "12 St James's Square, London",
        "maritalStatus": "married",
        "partnerFullName": "William King",
        "partnerData": [{"fullName": "William King"}],
        "hasChildren": "no",
        "executorName": "Sam Jones",
        "residuaryBeneficiary": "William King",
        "signingDate": "2024-05-06",
        "testatorSignature": format!("data:image/png;base64,{}", "Q".repeat(400))
    }))
    .expect("answers")
}

struct FailingExporter;

#[async_trait]
impl DocumentExporter for FailingExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Text
    }

    async fn export(&self, _document: &ExportDocument) -> Result<ExportArtifact, ExportError> {
        Err(ExportError::Layout("renderer unavailable".into()))
    }
}

#[tokio::test]
async fn text_export_writes_paginated_will() {
    let temp = tempfile::TempDir::new().unwrap();
    let out = temp.path().join("out").join("will.txt");
    let session = Session::new(will_form()).with_answers(complete_answers());
    let exporter = TextExporter::new(&out, PageLayout::default());

    let artifact = session.export(&exporter, false).await.expect("export");
    let pages = artifact.pages.expect("page count");
    assert!(pages >= 3);

    let text = std::fs::read_to_string(&out).unwrap();
    assert_eq!(text.len(), artifact.bytes);
    assert_eq!(text.matches('\u{c}').count(), pages - 1);
    assert!(text.contains("Last Will and Testament"));
    assert!(text.contains("-of-"));
    assert!(text.contains("Dr Ada Lovelace"));
    assert!(text.contains("This is the Will of Dr Ada Lovelace."));
    assert!(text.contains("1. Last name"));
    assert!(text.contains("[signature image on file]"));
    assert!(text.contains("Witness 1"));
    assert!(text.contains(&format!("{pages}/{pages}")));
    assert!(!text.contains("{{field:"));
    assert!(!text.contains("base64"));
}

#[tokio::test]
async fn incomplete_form_is_refused_unless_forced() {
    let temp = tempfile::TempDir::new().unwrap();
    let out = temp.path().join("will.json");
    let session = Session::new(will_form());
    let exporter = JsonExporter::new(&out);

    let failure = session.export(&exporter, false).await.unwrap_err();
    assert!(failure.message.contains("required answer"));
    assert!(!out.exists());

    let artifact = session.export(&exporter, true).await.expect("forced export");
    assert_eq!(artifact.format, ExportFormat::Json);
    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(written["title"], "Last Will and Testament");
    assert!(written["clauses"].is_array());
    assert!(written["testatorName"].is_null());
}

#[tokio::test]
async fn exporter_failure_keeps_answers() {
    let session = Session::new(will_form()).with_answers(complete_answers());
    let before = session.answers().clone();
    let failure = session.export(&FailingExporter, false).await.unwrap_err();
    assert!(failure.message.starts_with("Export failed"));
    assert!(failure.message.contains("renderer unavailable"));
    assert_eq!(session.answers(), &before);
}

#[test]
fn unnamed_testator_uses_placeholder_on_signature_page() {
    let schema = will_form();
    let document = prepare_export(&schema, &AnswerStore::new());
    let rendered = TextExporter::new("unused.txt", PageLayout::default())
        .render(&document)
        .unwrap();
    assert!(rendered.text.contains("Signed by [Full Name], to give effect to this Will, on"));
    assert!(!rendered.text.contains("[signature image on file]"));
    for page in rendered.text.split('\u{c}') {
        let page = page.strip_prefix('\n').unwrap_or(page);
        assert_eq!(page.lines().count(), 60);
    }
}

#[test]
fn narrow_layout_is_rejected() {
    let document = prepare_export(&will_form(), &complete_answers());
    let exporter = TextExporter::new("unused.txt", PageLayout { width: 10, height: 10 });
    assert!(matches!(exporter.render(&document), Err(ExportError::Layout(_))));
}
