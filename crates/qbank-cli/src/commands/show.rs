//! The `qbank show` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use qbank_core::view::build;

use super::open_bank;
use crate::render::question_detail;

pub async fn execute(id: String, config_path: Option<PathBuf>) -> Result<()> {
    let bank = open_bank(config_path.as_deref())?;
    let question = bank
        .store()
        .get_question(&id)
        .await
        .with_context(|| format!("failed to fetch question {id}"))?;

    println!("{}", question_detail(&build(&question, bank.resolver())));
    Ok(())
}
