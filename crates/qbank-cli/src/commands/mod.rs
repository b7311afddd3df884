//! Subcommand implementations.

pub mod delete;
pub mod edit;
pub mod init;
pub mod list;
pub mod show;
pub mod stats;
pub mod upload;

use std::path::Path;

use anyhow::Result;

use qbank_core::bank::{NoticeKind, QuestionBank};
use qbank_store::config::{create_store, load_config_from};

/// Build a question bank from configuration, without fetching anything.
pub fn open_bank(config_path: Option<&Path>) -> Result<QuestionBank> {
    let config = load_config_from(config_path)?;
    let store = create_store(&config)?;
    tracing::debug!(
        store = store.name(),
        api = %config.api_base_url,
        images = %config.images_base_url(),
        "opening question bank"
    );
    Ok(QuestionBank::new(store, config.image_resolver())
        .with_document_extension(config.document_extension))
}

/// Build a question bank and load the collection and stats.
///
/// Only a failed collection fetch is an error; a stats failure is printed
/// as a warning.
pub async fn load_bank(config_path: Option<&Path>) -> Result<QuestionBank> {
    let mut bank = open_bank(config_path)?;
    bank.load().await?;
    if let Some(notice) = bank.notice() {
        if notice.kind == NoticeKind::Error {
            eprintln!("Warning: {}", notice.message);
        }
    }
    Ok(bank)
}
