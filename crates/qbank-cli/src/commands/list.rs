//! The `qbank list` command.

use std::path::PathBuf;

use anyhow::Result;

use qbank_core::statistics::FilterCriteria;
use qbank_core::view::build_all;

use super::{load_bank, open_bank};
use crate::render::question_table;

pub async fn execute(
    criteria: FilterCriteria,
    remote: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (views, total) = if remote {
        let bank = open_bank(config_path.as_deref())?;
        let questions = bank.store().list_questions(Some(&criteria)).await?;
        (build_all(&questions, bank.resolver()), None)
    } else {
        let mut bank = load_bank(config_path.as_deref()).await?;
        bank.set_filters(criteria);
        (bank.views(), Some(bank.questions().len()))
    };

    if views.is_empty() {
        println!("No questions found.");
        return Ok(());
    }

    println!("{}", question_table(&views));
    match total {
        Some(total) if !criteria.is_empty() => {
            println!("Showing {} of {total} questions", views.len())
        }
        _ => println!("{} questions", views.len()),
    }

    let missing = views.iter().filter(|v| v.needs_answer_warning()).count();
    if missing > 0 {
        eprintln!("Warning: {missing} multiple-choice question(s) have no correct answer selected");
    }

    Ok(())
}
