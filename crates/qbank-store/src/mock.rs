//! Mock store for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use qbank_core::error::StoreError;
use qbank_core::image::ImageResolver;
use qbank_core::model::{RawQuestion, StatsResponse, UploadReceipt};
use qbank_core::statistics::{aggregate, FilterCriteria};
use qbank_core::traits::QuestionStore;

/// An in-memory question store for exercising the question bank without a
/// server.
///
/// Counts every call so tests can assert on request ordering and volume.
pub struct MockStore {
    questions: Mutex<Vec<RawQuestion>>,
    resolver: ImageResolver,
    /// Questions appended on each successful upload.
    upload_batch: Mutex<Vec<RawQuestion>>,
    /// When set, every mutating call fails with this server message.
    failure: Mutex<Option<String>>,
    next_id: AtomicU32,
    list_calls: AtomicU32,
    stats_calls: AtomicU32,
    update_calls: AtomicU32,
    delete_calls: AtomicU32,
    upload_calls: AtomicU32,
    last_upload_name: Mutex<Option<String>>,
}

impl MockStore {
    /// Create a mock seeded with `questions`.
    pub fn new(questions: Vec<RawQuestion>) -> Self {
        let next_id = questions
            .iter()
            .filter_map(|q| q.id.parse::<u32>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        Self {
            questions: Mutex::new(questions),
            resolver: ImageResolver::new("http://mock/images"),
            upload_batch: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
            next_id: AtomicU32::new(next_id),
            list_calls: AtomicU32::new(0),
            stats_calls: AtomicU32::new(0),
            update_calls: AtomicU32::new(0),
            delete_calls: AtomicU32::new(0),
            upload_calls: AtomicU32::new(0),
            last_upload_name: Mutex::new(None),
        }
    }

    /// Questions a successful upload will create (ids are assigned).
    pub fn with_upload_batch(self, batch: Vec<RawQuestion>) -> Self {
        *self.upload_batch.lock().unwrap() = batch;
        self
    }

    /// Make mutating calls fail with `message` as the server's reason.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.lock().unwrap() = Some(message.into());
    }

    pub fn recover(&self) {
        *self.failure.lock().unwrap() = None;
    }

    pub fn questions(&self) -> Vec<RawQuestion> {
        self.questions.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> u32 {
        self.list_calls.load(Ordering::Relaxed)
    }

    pub fn stats_calls(&self) -> u32 {
        self.stats_calls.load(Ordering::Relaxed)
    }

    pub fn update_calls(&self) -> u32 {
        self.update_calls.load(Ordering::Relaxed)
    }

    pub fn delete_calls(&self) -> u32 {
        self.delete_calls.load(Ordering::Relaxed)
    }

    pub fn upload_calls(&self) -> u32 {
        self.upload_calls.load(Ordering::Relaxed)
    }

    /// File name of the last upload received.
    pub fn last_upload_name(&self) -> Option<String> {
        self.last_upload_name.lock().unwrap().clone()
    }

    fn check_failure(&self) -> anyhow::Result<()> {
        match self.failure.lock().unwrap().clone() {
            Some(message) => Err(StoreError::Api {
                status: 500,
                message: Some(message),
            }
            .into()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl QuestionStore for MockStore {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_questions(
        &self,
        filter: Option<&FilterCriteria>,
    ) -> anyhow::Result<Vec<RawQuestion>> {
        self.list_calls.fetch_add(1, Ordering::Relaxed);
        let questions = self.questions.lock().unwrap();
        Ok(match filter {
            Some(criteria) => questions
                .iter()
                .filter(|q| criteria.matches(q, &self.resolver))
                .cloned()
                .collect(),
            None => questions.clone(),
        })
    }

    async fn get_question(&self, id: &str) -> anyhow::Result<RawQuestion> {
        self.questions
            .lock()
            .unwrap()
            .iter()
            .find(|q| q.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()).into())
    }

    async fn get_stats(&self) -> anyhow::Result<StatsResponse> {
        self.stats_calls.fetch_add(1, Ordering::Relaxed);
        let stats = aggregate(&self.questions.lock().unwrap(), &self.resolver);

        let mut response = StatsResponse::default();
        response.summary.total_questions = stats.total;
        response.language_distribution = stats
            .per_language
            .iter()
            .map(|(language, count)| qbank_core::model::LanguageCount {
                language: language.to_string(),
                count: *count,
            })
            .collect();
        response.image_stats.with_question_images = stats.with_question_images;
        response.image_stats.with_solution_images = stats.with_solution_images;
        response.image_stats.with_option_images = stats.with_option_images;
        Ok(response)
    }

    async fn update_question(
        &self,
        id: &str,
        question: &RawQuestion,
    ) -> anyhow::Result<RawQuestion> {
        self.update_calls.fetch_add(1, Ordering::Relaxed);
        self.check_failure()?;

        let mut questions = self.questions.lock().unwrap();
        let slot = questions
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        *slot = question.clone();
        Ok(question.clone())
    }

    async fn delete_question(&self, id: &str) -> anyhow::Result<()> {
        self.delete_calls.fetch_add(1, Ordering::Relaxed);
        self.check_failure()?;

        let mut questions = self.questions.lock().unwrap();
        let pos = questions
            .iter()
            .position(|q| q.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        questions.remove(pos);
        Ok(())
    }

    async fn upload_document(
        &self,
        file_name: &str,
        _bytes: Vec<u8>,
    ) -> anyhow::Result<UploadReceipt> {
        self.upload_calls.fetch_add(1, Ordering::Relaxed);
        *self.last_upload_name.lock().unwrap() = Some(file_name.to_string());
        self.check_failure()?;

        let batch = self.upload_batch.lock().unwrap().clone();
        let mut questions = self.questions.lock().unwrap();
        let mut question_ids = Vec::with_capacity(batch.len());
        for mut question in batch {
            question.id = self.next_id.fetch_add(1, Ordering::Relaxed).to_string();
            question_ids.push(question.id.clone());
            questions.push(question);
        }
        Ok(UploadReceipt { question_ids })
    }
}
