//! Terminal rendering for question views and stats.

use comfy_table::{Cell, Table};

use qbank_core::answer::DerivedAnswer;
use qbank_core::image::{ImageRef, ImageState};
use qbank_core::model::Language;
use qbank_core::statistics::QuestionStats;
use qbank_core::view::QuestionViewModel;

const PREVIEW_CHARS: usize = 60;
const NO_ANSWER: &str = "(no correct answer selected)";

/// One-line summary of the derived answer.
pub fn answer_text(answer: &DerivedAnswer) -> String {
    match answer {
        DerivedAnswer::NoneSelected => NO_ANSWER.to_string(),
        DerivedAnswer::NotApplicable => "-".to_string(),
        other => other.display().unwrap_or_default(),
    }
}

/// Collapse whitespace and cut `text` to `max` characters.
pub fn preview(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        flat
    } else {
        let cut: String = flat.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}

fn image_flags(view: &QuestionViewModel) -> String {
    let mut flags = Vec::new();
    if view.media.has_question_image {
        flags.push("Q");
    }
    if view.media.has_any_option_image {
        flags.push("O");
    }
    if view.media.has_solution_image {
        flags.push("S");
    }
    if flags.is_empty() {
        "-".to_string()
    } else {
        flags.join(",")
    }
}

pub fn question_table(views: &[QuestionViewModel]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Type", "Lang", "Marks", "Answer", "Images", "Question"]);

    for view in views {
        table.add_row(vec![
            Cell::new(view.id()),
            Cell::new(view.type_badge()),
            Cell::new(view.language_badge()),
            Cell::new(view.marks_label()),
            Cell::new(answer_text(&view.answer)),
            Cell::new(image_flags(view)),
            Cell::new(preview(&view.question.question_text, PREVIEW_CHARS)),
        ]);
    }

    table
}

pub fn stats_table(stats: &QuestionStats) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Metric", "Count"]);
    table.add_row(vec![Cell::new("Total questions"), Cell::new(stats.total)]);
    for language in Language::ALL {
        table.add_row(vec![
            Cell::new(format!("{language} ({})", language.badge())),
            Cell::new(stats.language_count(language)),
        ]);
    }
    table.add_row(vec![
        Cell::new("With question images"),
        Cell::new(stats.with_question_images),
    ]);
    table.add_row(vec![
        Cell::new("With solution images"),
        Cell::new(stats.with_solution_images),
    ]);
    table.add_row(vec![
        Cell::new("With option images"),
        Cell::new(stats.with_option_images),
    ]);
    table
}

fn image_line(label: &str, image: &ImageRef) -> Option<String> {
    match image.state() {
        ImageState::Absent => None,
        ImageState::Ready(url) => Some(format!(
            "{label}: {} ({url})",
            image.file_name.as_deref().unwrap_or_default()
        )),
        ImageState::Failed => Some(format!("{label}: failed to load")),
    }
}

/// Full multi-line rendering of one question.
pub fn question_detail(view: &QuestionViewModel) -> String {
    let mut out = Vec::new();
    out.push(format!(
        "Question {}  [{}] [{}] {}",
        view.id(),
        view.type_badge(),
        view.language_badge(),
        view.marks_label()
    ));
    out.push(String::new());
    out.push(view.question.question_text.trim().to_string());
    out.extend(image_line("Image", &view.question_image));

    if view.question.question_type.is_multiple_choice() {
        out.push(String::new());
        for option in &view.options {
            let marker = if option.highlighted { "*" } else { " " };
            out.push(format!("{marker} {}. {}", option.label, option.display_text()));
            out.extend(image_line("    Image", &option.image));
        }
    }

    out.push(String::new());
    out.push(format!("Correct answer: {}", answer_text(&view.answer)));
    if let Some(conflict) = &view.answer_conflict {
        out.push(format!("Warning: {conflict}"));
    }

    let solution = view.question.solution.as_deref().unwrap_or_default().trim();
    if !solution.is_empty() || view.solution_image.is_present() {
        out.push(String::new());
        out.push("Solution:".to_string());
        if !solution.is_empty() {
            out.push(solution.to_string());
        }
        out.extend(image_line("Image", &view.solution_image));
    }

    out.join("\n")
}
