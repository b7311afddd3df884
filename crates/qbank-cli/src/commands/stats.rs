//! The `qbank stats` command.

use std::path::PathBuf;

use anyhow::Result;

use qbank_core::bank::NoticeKind;

use super::load_bank;
use crate::render::stats_table;

pub async fn execute(local: bool, config_path: Option<PathBuf>) -> Result<()> {
    let bank = load_bank(config_path.as_deref()).await?;
    // The only error a successful load can leave behind is a stats failure.
    let server_stats_failed = bank
        .notice()
        .is_some_and(|n| n.kind == NoticeKind::Error);
    let stats = if local || server_stats_failed {
        if !local {
            eprintln!("Showing counts computed from the loaded questions");
        }
        bank.local_stats()
    } else {
        bank.stats().clone()
    };
    println!("{}", stats_table(&stats));
    Ok(())
}
