//! REST implementation of `QuestionStore`.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use qbank_core::error::StoreError;
use qbank_core::model::{RawQuestion, StatsResponse, UploadReceipt};
use qbank_core::statistics::FilterCriteria;
use qbank_core::traits::QuestionStore;

/// Multipart field the document parser reads the upload from.
pub const UPLOAD_FIELD: &str = "file";

/// Question server client.
pub struct HttpStore {
    base_url: String,
    timeout_secs: Option<u64>,
    client: reqwest::Client,
}

impl HttpStore {
    /// Build a client for `base_url` (e.g. `http://localhost:5000/api`).
    ///
    /// Without `timeout_secs` requests wait as long as the transport does.
    pub fn new(base_url: &str, timeout_secs: Option<u64>) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn list_url(&self, filter: Option<&FilterCriteria>) -> anyhow::Result<reqwest::Url> {
        let pairs = filter.map(FilterCriteria::query_pairs).unwrap_or_default();
        if pairs.is_empty() {
            return reqwest::Url::parse(&self.url("/questions"))
                .with_context(|| format!("invalid API base URL: {}", self.base_url));
        }

        let mut url = reqwest::Url::parse(&self.url("/questions/filter"))
            .with_context(|| format!("invalid API base URL: {}", self.base_url))?;
        url.query_pairs_mut().extend_pairs(pairs);
        Ok(url)
    }

    fn transport_error(&self, e: reqwest::Error) -> StoreError {
        if e.is_timeout() {
            StoreError::Timeout(self.timeout_secs.unwrap_or_default())
        } else {
            StoreError::Network(e.to_string())
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, StoreError> {
        let response = request.send().await.map_err(|e| self.transport_error(e))?;

        let status = response.status().as_u16();
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body);
            tracing::debug!(status, body = %body, "question server returned an error");
            return Err(StoreError::Api { status, message });
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T, StoreError> {
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))
    }
}

/// The `error` field of a JSON error payload, if there is one.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .and_then(Value::as_str)
        .filter(|msg| !msg.is_empty())
        .map(str::to_string)
}

// 404 on an id-addressed resource means the question does not exist.
fn not_found_for(id: &str, err: StoreError) -> StoreError {
    match err {
        StoreError::Api { status: 404, .. } => StoreError::NotFound(id.to_string()),
        other => other,
    }
}

/// The list endpoint answers with either a bare array or a wrapper object.
#[derive(Deserialize)]
#[serde(untagged)]
enum QuestionList {
    Bare(Vec<RawQuestion>),
    Wrapped { questions: Vec<RawQuestion> },
}

impl From<QuestionList> for Vec<RawQuestion> {
    fn from(list: QuestionList) -> Self {
        match list {
            QuestionList::Bare(questions) | QuestionList::Wrapped { questions } => questions,
        }
    }
}

#[async_trait]
impl QuestionStore for HttpStore {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self))]
    async fn list_questions(
        &self,
        filter: Option<&FilterCriteria>,
    ) -> anyhow::Result<Vec<RawQuestion>> {
        let url = self.list_url(filter)?;
        let response = self.send(self.client.get(url)).await?;
        let list: QuestionList = self.decode(response).await?;
        Ok(list.into())
    }

    #[instrument(skip(self))]
    async fn get_question(&self, id: &str) -> anyhow::Result<RawQuestion> {
        let response = self
            .send(self.client.get(self.url(&format!("/questions/{id}"))))
            .await
            .map_err(|e| not_found_for(id, e))?;
        Ok(self.decode(response).await?)
    }

    #[instrument(skip(self))]
    async fn get_stats(&self) -> anyhow::Result<StatsResponse> {
        let response = self.send(self.client.get(self.url("/stats"))).await?;
        Ok(self.decode(response).await?)
    }

    #[instrument(skip(self, question))]
    async fn update_question(
        &self,
        id: &str,
        question: &RawQuestion,
    ) -> anyhow::Result<RawQuestion> {
        let response = self
            .send(
                self.client
                    .put(self.url(&format!("/questions/{id}")))
                    .json(question),
            )
            .await
            .map_err(|e| not_found_for(id, e))?;

        // Some servers answer with a status message instead of the record.
        let body: Value = self.decode(response).await.unwrap_or(Value::Null);
        if body.get("id").is_some() {
            if let Ok(saved) = serde_json::from_value::<RawQuestion>(body) {
                return Ok(saved);
            }
        }
        tracing::debug!("update response is not a question record, keeping submitted copy");
        Ok(question.clone())
    }

    #[instrument(skip(self))]
    async fn delete_question(&self, id: &str) -> anyhow::Result<()> {
        self.send(self.client.delete(self.url(&format!("/questions/{id}"))))
            .await
            .map_err(|e| not_found_for(id, e))?;
        Ok(())
    }

    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload_document(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> anyhow::Result<UploadReceipt> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .send(self.client.post(self.url("/upload-questions")).multipart(form))
            .await?;
        let receipt: UploadReceipt = self.decode(response).await?;
        tracing::debug!(created = receipt.created(), "document parsed");
        Ok(receipt)
    }
}
