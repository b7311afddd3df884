//! The `qbank init` command.

use anyhow::Result;

use qbank_store::config::CONFIG_FILE_NAME;

pub fn execute() -> Result<()> {
    if std::path::Path::new(CONFIG_FILE_NAME).exists() {
        println!("{CONFIG_FILE_NAME} already exists, skipping.");
    } else {
        std::fs::write(CONFIG_FILE_NAME, SAMPLE_CONFIG)?;
        println!("Created {CONFIG_FILE_NAME}");
    }

    println!("\nNext steps:");
    println!("  1. Point api_base_url in {CONFIG_FILE_NAME} at your question server");
    println!("  2. Run: qbank upload --file questions.docx");
    println!("  3. Run: qbank list");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# qbank configuration

# REST API of the question server.
api_base_url = "http://localhost:5000/api"

# Where question, option and solution images are served from.
# Defaults to "<api_base_url>/images".
# images_base_url = "${QBANK_IMAGES_URL}"

# Per-request timeout in seconds. Unset waits as long as the transport does.
# request_timeout_secs = 30

# Uploaded documents must end with this extension (case-sensitive).
document_extension = ".docx"
"#;
