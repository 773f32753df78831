use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;

const FIXTURE: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../willform-spec/tests/fixtures/will_form.json"
);

const COMPLETE_ANSWERS: &str = r#"{
    "title": "Dr",
    "firstName": "Ada",
    "lastName": "Lovelace",
    "dateOfBirth": "1815-12-10",
    "address": "12 St James's Square, London",
    "postcode": "SW1Y 4LE",
    "maritalStatus": "single",
    "hasChildren": "no",
    "executorName": "Sam Jones",
    "residuaryBeneficiary": "Cancer Research UK",
    "signingDate": "2024-05-06"
}"#;

/// Temp workspace with a config that keeps drafts inside it.
fn workspace() -> TempDir {
    let temp = TempDir::new().unwrap();
    temp.child("willform.toml")
        .write_str(&format!(
            "schema = {FIXTURE:?}\n[draft]\ndir = \"drafts\"\n[log]\nfilter = \"warn\"\n"
        ))
        .unwrap();
    temp
}

fn willform(temp: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_willform"));
    cmd.current_dir(temp.path())
        .arg("--config")
        .arg(temp.child("willform.toml").path())
        .env_remove("WILLFORM_LOG");
    cmd
}

#[test]
fn prints_form_json_schema() {
    let temp = workspace();
    willform(&temp)
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("formSections"));
}

#[test]
fn check_reports_missing_answers() {
    let temp = workspace();
    willform(&temp)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("[ ] 1. Personal Details"))
        .stdout(predicate::str::contains("missing: firstName, lastName"))
        .stdout(predicate::str::contains("form complete: no"));
}

#[test]
fn check_accepts_answers_file_as_json() {
    let temp = workspace();
    temp.child("answers.json").write_str(COMPLETE_ANSWERS).unwrap();
    let output = willform(&temp)
        .args(["check", "--answers", "answers.json", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["complete"], true);
    assert_eq!(report["sections"].as_array().unwrap().len(), 5);
    assert_eq!(report["warnings"], serde_json::json!([]));
}

#[test]
fn answers_accumulate_in_the_draft() {
    let temp = workspace();
    willform(&temp)
        .args(["answer", "firstName", "Ada"])
        .assert()
        .success();
    willform(&temp)
        .args(["toggle", "funeralWishes", "burial"])
        .assert()
        .success()
        .stdout(predicate::str::contains("checked burial on funeralWishes"));
    temp.child("drafts/willForm.json")
        .assert(predicate::path::exists());

    willform(&temp)
        .args(["interpolate", "I, {{field:firstName}}, of {{field:address}}."])
        .assert()
        .success()
        .stdout("I, Ada, of .\n");

    willform(&temp)
        .args(["draft", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"burial\""));

    willform(&temp)
        .args(["draft", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cleared draft"));
    temp.child("drafts/willForm.json")
        .assert(predicate::path::missing());
}

#[test]
fn unknown_field_is_an_error() {
    let temp = workspace();
    willform(&temp)
        .args(["answer", "favouriteColour", "blue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown field 'favouriteColour'"));
}

#[test]
fn export_refuses_incomplete_form() {
    let temp = workspace();
    willform(&temp)
        .args(["export", "--out", "will.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be exported yet"));
    temp.child("will.txt").assert(predicate::path::missing());
}

#[test]
fn export_writes_text_will() {
    let temp = workspace();
    temp.child("answers.json").write_str(COMPLETE_ANSWERS).unwrap();
    willform(&temp)
        .args(["export", "--answers", "answers.json", "--out", "out/will.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pages)"));
    temp.child("out/will.txt")
        .assert(predicate::str::contains("This is the Will of Dr Ada Lovelace."))
        .assert(predicate::str::contains("Witness 2"));
}

#[test]
fn forced_json_export() {
    let temp = workspace();
    willform(&temp)
        .args(["export", "--out", "will.json", "--format", "json", "--force"])
        .assert()
        .success();
    temp.child("will.json")
        .assert(predicate::str::contains("\"title\": \"Last Will and Testament\""));
}

#[test]
fn preview_is_bounded_by_section() {
    let temp = workspace();
    temp.child("answers.json").write_str(COMPLETE_ANSWERS).unwrap();
    willform(&temp)
        .args(["preview", "--answers", "answers.json", "--section", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Step 1 of 5"))
        .stdout(predicate::str::contains("1. Last name [Personal Details]"))
        .stdout(predicate::str::contains("Residuary").not());
}

#[test]
fn duplicate_field_ids_are_rejected_on_load() {
    let temp = workspace();
    temp.child("dupes.json")
        .write_str(
            r#"{"formSections": [
                {"formSection": "A", "fields": [{"id": "name", "type": "text"}]},
                {"formSection": "B", "fields": [{"id": "name", "type": "text"}]}
            ]}"#,
        )
        .unwrap();
    willform(&temp)
        .args(["check", "--schema", "dupes.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load form schema"))
        .stderr(predicate::str::contains("'name' is declared more than once"));
}
