//! Question bank: the UI state layer.
//!
//! Owns the in-memory collection, the edit session, the upload workflow,
//! the current filter and a dismissible notice. Collaborator calls are made
//! one at a time through `&mut self`; a stats refresh only ever follows a
//! completed delete, update or upload.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::error::{failure_reason, ValidationError};
use crate::image::ImageResolver;
use crate::model::RawQuestion;
use crate::session::{EditDraft, EditSession};
use crate::statistics::{aggregate, filter, FilterCriteria, QuestionStats};
use crate::traits::QuestionStore;
use crate::upload::UploadWorkflow;
use crate::view::{build, QuestionViewModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A dismissible banner message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

pub struct QuestionBank {
    store: Arc<dyn QuestionStore>,
    resolver: ImageResolver,
    questions: Vec<RawQuestion>,
    stats: QuestionStats,
    filters: FilterCriteria,
    session: EditSession,
    upload: UploadWorkflow,
    notice: Option<Notice>,
}

impl QuestionBank {
    pub fn new(store: Arc<dyn QuestionStore>, resolver: ImageResolver) -> Self {
        Self {
            store,
            resolver,
            questions: Vec::new(),
            stats: QuestionStats::default(),
            filters: FilterCriteria::default(),
            session: EditSession::default(),
            upload: UploadWorkflow::default(),
            notice: None,
        }
    }

    /// Use a different required document extension for uploads.
    pub fn with_document_extension(mut self, extension: impl Into<String>) -> Self {
        self.upload = UploadWorkflow::new(extension);
        self
    }

    pub fn store(&self) -> &Arc<dyn QuestionStore> {
        &self.store
    }

    pub fn resolver(&self) -> &ImageResolver {
        &self.resolver
    }

    pub fn questions(&self) -> &[RawQuestion] {
        &self.questions
    }

    /// Stats as last reported by the collaborator.
    pub fn stats(&self) -> &QuestionStats {
        &self.stats
    }

    /// Stats computed locally over the full collection.
    pub fn local_stats(&self) -> QuestionStats {
        aggregate(&self.questions, &self.resolver)
    }

    pub fn find(&self, id: &str) -> Option<&RawQuestion> {
        self.questions.iter().find(|q| q.id == id)
    }

    // --- loading -----------------------------------------------------------

    /// Fetch the collection and the stats concurrently.
    ///
    /// A failed collection fetch keeps the prior collection, sets a notice
    /// and is returned. A failed stats fetch only sets a notice: the
    /// collection is usable and `local_stats` still reflects it.
    pub async fn load(&mut self) -> Result<()> {
        let store = Arc::clone(&self.store);
        let (questions, stats) = futures::join!(store.list_questions(None), store.get_stats());

        match stats {
            Ok(stats) => self.stats = stats.into(),
            Err(e) => self.report_failure("load stats", &e),
        }
        match questions {
            Ok(questions) => {
                tracing::debug!(count = questions.len(), "loaded questions");
                self.questions = questions;
                Ok(())
            }
            Err(e) => {
                self.report_failure("load questions", &e);
                Err(e.context("failed to load questions"))
            }
        }
    }

    /// Re-fetch the stats alone.
    pub async fn refresh_stats(&mut self) -> Result<()> {
        match self.store.get_stats().await {
            Ok(stats) => {
                self.stats = stats.into();
                Ok(())
            }
            Err(e) => {
                self.report_failure("load stats", &e);
                Err(e.context("failed to refresh stats"))
            }
        }
    }

    // --- filtering ---------------------------------------------------------

    pub fn filters(&self) -> &FilterCriteria {
        &self.filters
    }

    pub fn set_filters(&mut self, criteria: FilterCriteria) {
        self.filters = criteria;
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    /// Questions passing the current filter, in collection order.
    pub fn visible(&self) -> Vec<&RawQuestion> {
        filter(&self.questions, &self.filters, &self.resolver)
    }

    /// View models for the visible questions.
    pub fn views(&self) -> Vec<QuestionViewModel> {
        self.visible()
            .into_iter()
            .map(|q| build(q, &self.resolver))
            .collect()
    }

    // --- delete ------------------------------------------------------------

    /// Delete one question, then refresh the stats once.
    pub async fn delete(&mut self, id: &str) -> Result<()> {
        if let Err(e) = self.store.delete_question(id).await {
            self.report_failure("delete question", &e);
            return Err(e.context(format!("failed to delete question {id}")));
        }

        if let Some(pos) = self.questions.iter().position(|q| q.id == id) {
            self.questions.remove(pos);
        }
        tracing::info!(question = %id, "question deleted");
        self.notice = Some(Notice::success("Question deleted successfully"));

        // The delete itself succeeded; a stats failure only sets the notice.
        let _ = self.refresh_stats().await;
        Ok(())
    }

    // --- editing -----------------------------------------------------------

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn draft_mut(&mut self) -> Option<&mut EditDraft> {
        self.session.draft_mut()
    }

    /// Start editing the question with `id`, replacing any active draft.
    pub fn begin_edit(&mut self, id: &str) -> Result<&mut EditDraft, ValidationError> {
        let question = self
            .questions
            .iter()
            .find(|q| q.id == id)
            .ok_or_else(|| ValidationError::UnknownQuestion(id.to_string()))?;
        Ok(self.session.begin(question))
    }

    pub fn cancel_edit(&mut self) {
        self.session.cancel();
    }

    /// Validate and submit the active draft.
    ///
    /// Validation failures return before any collaborator call. A rejected
    /// update keeps the draft open.
    pub async fn save_edit(&mut self) -> Result<RawQuestion> {
        let submission = self.session.prepare_save()?;
        let id = submission.id.clone();

        let saved = match self.store.update_question(&id, &submission).await {
            Ok(saved) => saved,
            Err(e) => {
                self.report_failure("update question", &e);
                return Err(e.context(format!("failed to update question {id}")));
            }
        };

        match self.questions.iter_mut().find(|q| q.id == id) {
            Some(slot) => *slot = saved.clone(),
            None => self.questions.push(saved.clone()),
        }
        self.session.finish_save();
        tracing::info!(question = %id, "question updated");
        self.notice = Some(Notice::success("Question updated successfully"));

        let _ = self.refresh_stats().await;
        Ok(saved)
    }

    // --- upload ------------------------------------------------------------

    pub fn upload_workflow(&self) -> &UploadWorkflow {
        &self.upload
    }

    pub fn select_file(&mut self, path: impl AsRef<Path>) -> Result<(), ValidationError> {
        self.upload.select_file(path)
    }

    /// Submit the selected file. On success the collection and stats are
    /// reloaded and the number of created questions is returned.
    pub async fn upload(&mut self) -> Result<usize> {
        let file = self.upload.begin_upload()?;

        let outcome = match tokio::fs::read(&file.path)
            .await
            .with_context(|| format!("failed to read {}", file.path.display()))
        {
            Ok(bytes) => self.store.upload_document(&file.name, bytes).await,
            Err(e) => Err(e),
        };
        self.upload.complete(&outcome);

        let receipt = match outcome {
            Ok(receipt) => receipt,
            Err(e) => {
                self.report_failure("upload document", &e);
                return Err(e);
            }
        };

        let created = receipt.created();
        tracing::info!(file = %file.name, created, "document uploaded");
        // Reload failures set their own notice; the upload still succeeded.
        if self.load().await.is_ok() {
            self.notice = Some(Notice::success(format!(
                "Successfully uploaded {created} questions"
            )));
        }
        Ok(created)
    }

    /// Acknowledge a finished upload.
    pub fn reset_upload(&mut self) {
        self.upload.reset();
    }

    // --- notices -----------------------------------------------------------

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    fn report_failure(&mut self, action: &str, err: &anyhow::Error) {
        let reason = failure_reason(err);
        tracing::warn!("failed to {action}: {reason}");
        self.notice = Some(Notice::error(format!("Failed to {action}: {reason}")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::model::{Language, StatsResponse, UploadReceipt};
    use crate::upload::UploadState;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeStore {
        questions: Mutex<Vec<RawQuestion>>,
        fail_list: bool,
        fail_stats: bool,
        fail_update: bool,
        stats_calls: AtomicU32,
        update_calls: AtomicU32,
        upload_calls: AtomicU32,
    }

    impl FakeStore {
        fn with(questions: Vec<RawQuestion>) -> Self {
            Self {
                questions: Mutex::new(questions),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl QuestionStore for FakeStore {
        fn name(&self) -> &str {
            "fake"
        }

        async fn list_questions(
            &self,
            _filter: Option<&FilterCriteria>,
        ) -> anyhow::Result<Vec<RawQuestion>> {
            if self.fail_list {
                return Err(StoreError::Network("connection refused".into()).into());
            }
            Ok(self.questions.lock().unwrap().clone())
        }

        async fn get_question(&self, id: &str) -> anyhow::Result<RawQuestion> {
            self.questions
                .lock()
                .unwrap()
                .iter()
                .find(|q| q.id == id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(id.into()).into())
        }

        async fn get_stats(&self) -> anyhow::Result<StatsResponse> {
            self.stats_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_stats {
                return Err(StoreError::Timeout(30).into());
            }
            let mut stats = StatsResponse::default();
            stats.summary.total_questions = self.questions.lock().unwrap().len();
            Ok(stats)
        }

        async fn update_question(
            &self,
            id: &str,
            question: &RawQuestion,
        ) -> anyhow::Result<RawQuestion> {
            self.update_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_update {
                return Err(StoreError::Api {
                    status: 500,
                    message: Some("database is locked".into()),
                }
                .into());
            }
            let mut questions = self.questions.lock().unwrap();
            if let Some(slot) = questions.iter_mut().find(|q| q.id == id) {
                *slot = question.clone();
            }
            Ok(question.clone())
        }

        async fn delete_question(&self, id: &str) -> anyhow::Result<()> {
            self.questions.lock().unwrap().retain(|q| q.id != id);
            Ok(())
        }

        async fn upload_document(
            &self,
            _file_name: &str,
            _bytes: Vec<u8>,
        ) -> anyhow::Result<UploadReceipt> {
            self.upload_calls.fetch_add(1, Ordering::SeqCst);
            Ok(UploadReceipt {
                question_ids: vec!["10".into(), "11".into()],
            })
        }
    }

    fn seed() -> Vec<RawQuestion> {
        ["1", "2", "3"]
            .iter()
            .map(|id| {
                let mut q = RawQuestion::new(*id);
                q.question_text = format!("Question {id}");
                if *id == "2" {
                    q.language = Language::Hindi;
                }
                q
            })
            .collect()
    }

    fn bank(store: FakeStore) -> (Arc<FakeStore>, QuestionBank) {
        let store = Arc::new(store);
        let bank = QuestionBank::new(store.clone(), ImageResolver::new("http://img.test"));
        (store, bank)
    }

    #[tokio::test]
    async fn load_fetches_list_and_stats() {
        let (store, mut bank) = bank(FakeStore::with(seed()));
        bank.load().await.unwrap();
        assert_eq!(bank.questions().len(), 3);
        assert_eq!(bank.stats().total, 3);
        assert_eq!(store.stats_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_load_keeps_prior_collection() {
        let (_, mut bank) = bank(FakeStore::with(seed()));
        bank.load().await.unwrap();

        let failing: Arc<dyn QuestionStore> = Arc::new(FakeStore {
            fail_list: true,
            ..Default::default()
        });
        bank.store = failing;
        assert!(bank.load().await.is_err());
        assert_eq!(bank.questions().len(), 3);
        let notice = bank.notice().unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert!(notice.message.contains("connection refused"));
        bank.dismiss_notice();
        assert!(bank.notice().is_none());
    }

    #[tokio::test]
    async fn stats_failure_alone_still_loads_collection() {
        let (_, mut bank) = bank(FakeStore {
            fail_stats: true,
            ..FakeStore::with(seed())
        });
        bank.load().await.unwrap();

        assert_eq!(bank.questions().len(), 3);
        assert_eq!(bank.stats().total, 0);
        assert_eq!(bank.local_stats().total, 3);
        let notice = bank.notice().unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert!(notice.message.starts_with("Failed to load stats"));
    }

    #[tokio::test]
    async fn delete_removes_one_and_refreshes_stats_once() {
        let (store, mut bank) = bank(FakeStore::with(seed()));
        bank.load().await.unwrap();
        let before = store.stats_calls.load(Ordering::SeqCst);

        bank.delete("2").await.unwrap();
        let ids: Vec<&str> = bank.questions().iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, ["1", "3"]);
        assert_eq!(store.stats_calls.load(Ordering::SeqCst), before + 1);
        assert_eq!(bank.stats().total, 2);
    }

    #[tokio::test]
    async fn zero_marks_never_reach_the_store() {
        let (store, mut bank) = bank(FakeStore::with(seed()));
        bank.load().await.unwrap();
        bank.begin_edit("1").unwrap().set_marks(0);

        let err = bank.save_edit().await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::NonPositiveMarks(0))
        );
        assert_eq!(store.update_calls.load(Ordering::SeqCst), 0);
        assert!(bank.session().is_editing());
    }

    #[tokio::test]
    async fn save_replaces_entry_and_returns_to_browsing() {
        let (store, mut bank) = bank(FakeStore::with(seed()));
        bank.load().await.unwrap();
        let draft = bank.begin_edit("3").unwrap();
        draft.set_question_text("Edited");
        draft.set_marks(4);

        let saved = bank.save_edit().await.unwrap();
        assert_eq!(saved.marks, 4);
        assert_eq!(bank.find("3").unwrap().question_text, "Edited");
        assert!(!bank.session().is_editing());
        assert_eq!(store.update_calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.stats_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn rejected_save_keeps_draft() {
        let (_, mut bank) = bank(FakeStore {
            questions: Mutex::new(seed()),
            fail_update: true,
            ..Default::default()
        });
        bank.load().await.unwrap();
        bank.begin_edit("1").unwrap().set_question_text("Changed");

        assert!(bank.save_edit().await.is_err());
        assert!(bank.session().is_editing());
        assert_eq!(bank.find("1").unwrap().question_text, "Question 1");
        assert!(bank
            .notice()
            .unwrap()
            .message
            .contains("database is locked"));
    }

    #[tokio::test]
    async fn begin_edit_unknown_id_is_rejected() {
        let (_, mut bank) = bank(FakeStore::with(seed()));
        bank.load().await.unwrap();
        assert_eq!(
            bank.begin_edit("99").unwrap_err(),
            ValidationError::UnknownQuestion("99".into())
        );
    }

    #[tokio::test]
    async fn wrong_extension_upload_makes_no_call() {
        let (store, mut bank) = bank(FakeStore::default());
        bank.select_file("questions.txt").unwrap();
        assert!(bank.upload().await.is_err());
        assert_eq!(store.upload_calls.load(Ordering::SeqCst), 0);
        assert!(matches!(
            bank.upload_workflow().state(),
            UploadState::FileSelected(_)
        ));
    }

    #[tokio::test]
    async fn upload_reloads_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questions.docx");
        std::fs::write(&path, b"PK\x03\x04").unwrap();

        let (store, mut bank) = bank(FakeStore::with(seed()));
        bank.select_file(&path).unwrap();
        assert_eq!(bank.upload().await.unwrap(), 2);
        assert_eq!(store.upload_calls.load(Ordering::SeqCst), 1);
        assert_eq!(bank.questions().len(), 3);
        assert_eq!(
            bank.upload_workflow().state(),
            &UploadState::Succeeded { created: 2 }
        );
        assert_eq!(
            bank.notice().unwrap().message,
            "Successfully uploaded 2 questions"
        );
    }

    #[tokio::test]
    async fn filters_do_not_touch_collection_or_stats() {
        let (_, mut bank) = bank(FakeStore::with(seed()));
        bank.load().await.unwrap();
        let stats = bank.local_stats();
        bank.set_filters(FilterCriteria {
            language: Some(Language::Hindi),
            ..Default::default()
        });
        assert_eq!(bank.visible().len(), 1);
        assert_eq!(bank.views()[0].language_badge(), "HI");
        assert_eq!(bank.local_stats(), stats);
        bank.clear_filters();
        assert_eq!(bank.visible().len(), 3);
    }
}
