//! The `qbank upload` command.

use std::path::PathBuf;

use anyhow::Result;

use super::open_bank;

pub async fn execute(file: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let mut bank = open_bank(config_path.as_deref())?;
    bank.select_file(&file)?;

    eprintln!("Uploading {}...", file.display());
    let created = bank.upload().await?;

    println!("Successfully uploaded {created} questions");
    println!("Collection now holds {} questions", bank.stats().total);
    Ok(())
}
