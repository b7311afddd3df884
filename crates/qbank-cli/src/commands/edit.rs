//! The `qbank edit` command.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use qbank_core::model::{Language, QuestionType};
use qbank_core::options::label_index;
use qbank_core::session::EditDraft;
use qbank_core::view::build;

use super::load_bank;
use crate::render::{answer_text, question_detail};

/// Field changes requested on the command line.
#[derive(Debug, Default)]
pub struct EditArgs {
    pub marks: Option<i64>,
    pub language: Option<Language>,
    pub question_type: Option<QuestionType>,
    pub text: Option<String>,
    pub solution: Option<String>,
    pub answer: Option<String>,
    /// Comma-separated option letters, e.g. `A,C`.
    pub correct: Option<String>,
    /// `LETTER=TEXT` pairs.
    pub option_text: Vec<String>,
}

impl EditArgs {
    fn is_empty(&self) -> bool {
        self.marks.is_none()
            && self.language.is_none()
            && self.question_type.is_none()
            && self.text.is_none()
            && self.solution.is_none()
            && self.answer.is_none()
            && self.correct.is_none()
            && self.option_text.is_empty()
    }

    /// Apply every change to `draft`.
    fn apply(self, draft: &mut EditDraft) -> Result<()> {
        if let Some(marks) = self.marks {
            draft.set_marks(marks);
        }
        if let Some(language) = self.language {
            draft.set_language(language);
        }
        if let Some(question_type) = self.question_type {
            draft.set_question_type(question_type);
        }
        if let Some(text) = self.text {
            draft.set_question_text(text);
        }
        if let Some(solution) = self.solution {
            draft.set_solution(solution);
        }
        if let Some(answer) = self.answer {
            draft.set_correct_answer(answer);
        }
        for pair in &self.option_text {
            let (index, text) = parse_option_text(pair)?;
            draft.set_option_text(index, text)?;
        }
        if let Some(correct) = &self.correct {
            draft.set_correct_options(&parse_labels(correct)?)?;
        }
        Ok(())
    }
}

/// Parse `A,C` into option positions.
pub fn parse_labels(labels: &str) -> Result<Vec<usize>> {
    labels
        .split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| label_index(l).with_context(|| format!("invalid option letter: {l}")))
        .collect()
}

/// Parse `B=Lyon` into a position and text.
pub fn parse_option_text(pair: &str) -> Result<(usize, &str)> {
    let Some((label, text)) = pair.split_once('=') else {
        bail!("expected LETTER=TEXT, got: {pair}");
    };
    let index = label_index(label).with_context(|| format!("invalid option letter: {label}"))?;
    Ok((index, text))
}

pub async fn execute(id: String, changes: EditArgs, config_path: Option<PathBuf>) -> Result<()> {
    if changes.is_empty() {
        bail!("nothing to change; pass at least one field option (see `qbank edit --help`)");
    }

    let mut bank = load_bank(config_path.as_deref()).await?;
    let draft = bank.begin_edit(&id)?;
    if let Err(e) = changes.apply(draft) {
        bank.cancel_edit();
        return Err(e);
    }

    if let Some(draft) = bank.session().draft() {
        let preview = draft.answer_preview();
        if preview.is_warning() {
            eprintln!("Warning: {}", answer_text(&preview));
        }
    }

    let saved = bank.save_edit().await?;
    println!("Question {id} updated\n");
    println!("{}", question_detail(&build(&saved, bank.resolver())));
    Ok(())
}
