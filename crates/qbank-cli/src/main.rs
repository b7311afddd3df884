//! qbank CLI — the operator-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use qbank_core::model::{Language, QuestionType};

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "qbank", version, about = "Question bank import, review and editing")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a question document for parsing
    Upload {
        /// Path to the document (.docx unless configured otherwise)
        #[arg(long)]
        file: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List questions, optionally filtered
    List {
        /// Only questions in this language (english, hindi)
        #[arg(long)]
        language: Option<Language>,

        /// Only questions of this type (multiple_choice, integer, fill_ups, true_false, comprehension)
        #[arg(long = "type")]
        question_type: Option<QuestionType>,

        /// Only questions with (true) or without (false) any image
        #[arg(long)]
        has_images: Option<bool>,

        /// Filter on the server instead of locally
        #[arg(long)]
        remote: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show collection statistics
    Stats {
        /// Compute from the fetched questions instead of asking the server
        #[arg(long)]
        local: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show one question in full
    Show {
        /// Question id
        #[arg(long)]
        id: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Edit a question and save it
    Edit {
        /// Question id
        #[arg(long)]
        id: String,

        /// Marks awarded (must be positive)
        #[arg(long, allow_negative_numbers = true)]
        marks: Option<i64>,

        /// Question language
        #[arg(long)]
        language: Option<Language>,

        /// Question type
        #[arg(long = "type")]
        question_type: Option<QuestionType>,

        /// Question text
        #[arg(long)]
        text: Option<String>,

        /// Solution text
        #[arg(long)]
        solution: Option<String>,

        /// Explicit correct answer (empty to clear)
        #[arg(long)]
        answer: Option<String>,

        /// Options to flag correct, by letter (e.g. "A,C")
        #[arg(long)]
        correct: Option<String>,

        /// Option text as LETTER=TEXT (repeatable)
        #[arg(long = "option-text")]
        option_text: Vec<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Delete a question
    Delete {
        /// Question id
        #[arg(long)]
        id: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter qbank.toml
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("qbank=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Upload { file, config } => commands::upload::execute(file, config).await,
        Commands::List {
            language,
            question_type,
            has_images,
            remote,
            config,
        } => {
            let criteria = qbank_core::statistics::FilterCriteria {
                language,
                question_type,
                has_images,
            };
            commands::list::execute(criteria, remote, config).await
        }
        Commands::Stats { local, config } => commands::stats::execute(local, config).await,
        Commands::Show { id, config } => commands::show::execute(id, config).await,
        Commands::Edit {
            id,
            marks,
            language,
            question_type,
            text,
            solution,
            answer,
            correct,
            option_text,
            config,
        } => {
            let changes = commands::edit::EditArgs {
                marks,
                language,
                question_type,
                text,
                solution,
                answer,
                correct,
                option_text,
            };
            commands::edit::execute(id, changes, config).await
        }
        Commands::Delete { id, config } => commands::delete::execute(id, config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
