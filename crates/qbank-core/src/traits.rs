//! Collaborator trait for question persistence.
//!
//! Implemented by the `qbank-store` crate (HTTP and in-memory mock).

use async_trait::async_trait;

use crate::model::{RawQuestion, StatsResponse, UploadReceipt};
use crate::statistics::FilterCriteria;

/// Trait for backends that store questions and parse uploaded documents.
///
/// Failures should be returned as `StoreError` wrapped in `anyhow::Error` so
/// the question bank can surface the backend's own reason.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// Human-readable backend name (e.g. "http").
    fn name(&self) -> &str;

    /// Fetch the collection, filtered server-side when criteria are given.
    async fn list_questions(
        &self,
        filter: Option<&FilterCriteria>,
    ) -> anyhow::Result<Vec<RawQuestion>>;

    /// Fetch one question by identifier.
    async fn get_question(&self, id: &str) -> anyhow::Result<RawQuestion>;

    /// Fetch summary statistics for the whole collection.
    async fn get_stats(&self) -> anyhow::Result<StatsResponse>;

    /// Replace a question. Returns the stored record.
    async fn update_question(&self, id: &str, question: &RawQuestion)
        -> anyhow::Result<RawQuestion>;

    /// Delete a question.
    async fn delete_question(&self, id: &str) -> anyhow::Result<()>;

    /// Submit a document for parsing. Returns the created record identifiers.
    async fn upload_document(&self, file_name: &str, bytes: Vec<u8>)
        -> anyhow::Result<UploadReceipt>;
}
