//! The `qbank delete` command.

use std::path::PathBuf;

use anyhow::Result;

use super::load_bank;

pub async fn execute(id: String, config_path: Option<PathBuf>) -> Result<()> {
    let mut bank = load_bank(config_path.as_deref()).await?;
    anyhow::ensure!(bank.find(&id).is_some(), "question not found: {id}");

    bank.delete(&id).await?;
    println!("Deleted question {id}");
    println!("{} questions remain", bank.stats().total);
    Ok(())
}
