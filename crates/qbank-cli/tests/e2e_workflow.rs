//! End-to-end workflow tests: the question bank driven against the mock store.

use std::sync::Arc;

use serde_json::json;

use qbank_core::answer::DerivedAnswer;
use qbank_core::bank::{NoticeKind, QuestionBank};
use qbank_core::error::ValidationError;
use qbank_core::image::ImageResolver;
use qbank_core::model::{Language, OptionsField, QuestionType, RawQuestion};
use qbank_core::statistics::FilterCriteria;
use qbank_core::upload::UploadState;
use qbank_store::MockStore;

fn question(id: &str, language: Language, options: serde_json::Value) -> RawQuestion {
    let mut q = RawQuestion::new(id);
    q.question_text = format!("Question {id}");
    q.language = language;
    q.options = OptionsField::from(options);
    q
}

fn seed() -> Vec<RawQuestion> {
    let mut integer = question("3", Language::English, json!(null));
    integer.question_type = QuestionType::Integer;
    integer.correct_answer = Some("42".into());
    integer.solution_image_path = Some("uploads/sol3.png".into());

    vec![
        question(
            "1",
            Language::English,
            json!([{"text": "Paris", "is_correct": true}, {"text": "Lyon"}]),
        ),
        question("2", Language::Hindi, json!(["Delhi", "Mumbai"])),
        integer,
        question(
            "4",
            Language::Hindi,
            json!({"a": {"text": "x", "image_path": "opt/x.png"}, "b": "y"}),
        ),
    ]
}

fn bank(store: &Arc<MockStore>) -> QuestionBank {
    QuestionBank::new(store.clone(), ImageResolver::new("http://localhost:5000/api/images"))
}

#[tokio::test]
async fn load_derives_views_for_every_shape() {
    let store = Arc::new(MockStore::new(seed()));
    let mut bank = bank(&store);
    bank.load().await.unwrap();

    let views = bank.views();
    assert_eq!(views.len(), 4);
    assert_eq!(views[0].answer, DerivedAnswer::Labels(vec!["A".into()]));
    assert_eq!(views[1].answer, DerivedAnswer::NoneSelected);
    assert_eq!(views[2].answer, DerivedAnswer::Explicit("42".into()));
    assert_eq!(views[2].options.len(), 4);
    assert!(views[2].media.has_solution_image);
    assert_eq!(views[3].options[0].label, "A");
    assert!(views[3].media.has_any_option_image);

    assert_eq!(bank.stats().total, 4);
    assert_eq!(bank.stats().language_count(Language::Hindi), 2);
    assert_eq!(store.list_calls(), 1);
    assert_eq!(store.stats_calls(), 1);
}

#[tokio::test]
async fn filters_leave_headline_stats_alone() {
    let store = Arc::new(MockStore::new(seed()));
    let mut bank = bank(&store);
    bank.load().await.unwrap();
    let before = bank.local_stats();

    bank.set_filters(FilterCriteria {
        language: Some(Language::Hindi),
        has_images: Some(true),
        ..Default::default()
    });
    let visible: Vec<&str> = bank.visible().iter().map(|q| q.id.as_str()).collect();
    assert_eq!(visible, ["4"]);
    assert_eq!(bank.local_stats(), before);

    bank.clear_filters();
    assert_eq!(bank.visible().len(), 4);
    assert_eq!(store.list_calls(), 1);
}

#[tokio::test]
async fn delete_removes_exactly_one_and_refreshes_stats_once() {
    let store = Arc::new(MockStore::new(seed()));
    let mut bank = bank(&store);
    bank.load().await.unwrap();
    let stats_before = store.stats_calls();

    bank.delete("2").await.unwrap();

    let ids: Vec<&str> = bank.questions().iter().map(|q| q.id.as_str()).collect();
    assert_eq!(ids, ["1", "3", "4"]);
    assert_eq!(store.delete_calls(), 1);
    assert_eq!(store.stats_calls(), stats_before + 1);
    assert_eq!(bank.stats().total, 3);
    assert_eq!(bank.notice().unwrap().kind, NoticeKind::Success);
}

#[tokio::test]
async fn failed_delete_keeps_collection_and_sets_notice() {
    let store = Arc::new(MockStore::new(seed()));
    let mut bank = bank(&store);
    bank.load().await.unwrap();
    store.fail_with("Question is referenced by a test paper");

    assert!(bank.delete("1").await.is_err());
    assert_eq!(bank.questions().len(), 4);
    let notice = bank.notice().unwrap();
    assert_eq!(notice.kind, NoticeKind::Error);
    assert!(notice
        .message
        .contains("Question is referenced by a test paper"));
    assert_eq!(store.stats_calls(), 1);
}

#[tokio::test]
async fn zero_marks_rejected_before_any_update() {
    let store = Arc::new(MockStore::new(seed()));
    let mut bank = bank(&store);
    bank.load().await.unwrap();

    bank.begin_edit("1").unwrap().set_marks(0);
    let err = bank.save_edit().await.unwrap_err();
    assert_eq!(
        err.downcast_ref::<ValidationError>(),
        Some(&ValidationError::NonPositiveMarks(0))
    );
    assert_eq!(store.update_calls(), 0);
    assert!(bank.session().is_editing());
}

#[tokio::test]
async fn edit_round_trip_cleans_options() {
    let store = Arc::new(MockStore::new(seed()));
    let mut bank = bank(&store);
    bank.load().await.unwrap();

    let draft = bank.begin_edit("2").unwrap();
    assert_eq!(draft.answer_preview(), DerivedAnswer::NoneSelected);
    draft.set_option_correct(0, true).unwrap();
    draft.set_correct_answer("");

    let saved = bank.save_edit().await.unwrap();
    assert_eq!(saved.correct_answer, None);
    assert_eq!(
        serde_json::Value::from(saved.options),
        json!([
            {"text": "Delhi", "is_correct": true, "image_path": null},
            {"text": "Mumbai", "is_correct": false, "image_path": null}
        ])
    );
    assert_eq!(store.update_calls(), 1);
    assert_eq!(store.stats_calls(), 2);
    assert!(!bank.session().is_editing());

    let view = bank.views().into_iter().find(|v| v.id() == "2").unwrap();
    assert_eq!(view.answer.display().as_deref(), Some("A"));
}

#[tokio::test]
async fn wrong_extension_upload_never_reaches_store() {
    let store = Arc::new(MockStore::new(seed()));
    let mut bank = bank(&store);

    bank.select_file("questions.txt").unwrap();
    let err = bank.upload().await.unwrap_err();
    assert_eq!(err.to_string(), "Please upload a .docx file");
    assert_eq!(store.upload_calls(), 0);
    assert!(matches!(
        bank.upload_workflow().state(),
        UploadState::FileSelected(_)
    ));
}

#[tokio::test]
async fn docx_upload_creates_questions_and_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("questions.docx");
    std::fs::write(&file, b"PK\x03\x04fake-docx").unwrap();

    let store = Arc::new(
        MockStore::new(seed()).with_upload_batch(vec![
            question("", Language::English, json!(["a", "b"])),
            question("", Language::Hindi, json!(["c", "d"])),
        ]),
    );
    let mut bank = bank(&store);
    bank.load().await.unwrap();

    bank.select_file(&file).unwrap();
    assert_eq!(bank.upload().await.unwrap(), 2);

    assert_eq!(store.upload_calls(), 1);
    assert_eq!(store.last_upload_name().as_deref(), Some("questions.docx"));
    assert_eq!(bank.questions().len(), 6);
    assert_eq!(bank.stats().total, 6);
    assert_eq!(store.list_calls(), 2);
    assert_eq!(
        bank.upload_workflow().state(),
        &UploadState::Succeeded { created: 2 }
    );
}

#[tokio::test]
async fn failed_upload_can_be_retried() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("questions.docx");
    std::fs::write(&file, b"PK").unwrap();

    let store = Arc::new(MockStore::new(vec![]));
    let mut bank = bank(&store);
    store.fail_with("No questions found in document");

    bank.select_file(&file).unwrap();
    assert!(bank.upload().await.is_err());
    match bank.upload_workflow().state() {
        UploadState::Failed { reason, .. } => assert_eq!(reason, "No questions found in document"),
        other => panic!("expected failed, got {other:?}"),
    }

    store.recover();
    bank.select_file(&file).unwrap();
    assert_eq!(bank.upload().await.unwrap(), 0);
    assert_eq!(store.upload_calls(), 2);
}
