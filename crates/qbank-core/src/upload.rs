//! Upload workflow state machine.
//!
//! `Idle -> FileSelected -> Uploading -> {Succeeded, Failed} -> Idle`.
//! Selecting a new file always lands in `FileSelected`; retrying a failure
//! returns there with the same file.

use std::path::{Path, PathBuf};

use crate::error::{failure_reason, ValidationError};
use crate::model::UploadReceipt;

/// Extension the document parser accepts unless configured otherwise.
pub const DEFAULT_DOCUMENT_EXTENSION: &str = ".docx";

/// A file chosen for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    /// Final path component, sent as the multipart file name.
    pub name: String,
}

impl SelectedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, name }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UploadState {
    #[default]
    Idle,
    FileSelected(SelectedFile),
    /// A request is in flight; the submit trigger is disabled.
    Uploading(SelectedFile),
    Succeeded {
        created: usize,
    },
    Failed {
        file: SelectedFile,
        reason: String,
    },
}

/// Drives one upload at a time.
#[derive(Debug, Clone)]
pub struct UploadWorkflow {
    state: UploadState,
    required_extension: String,
    validation: Option<ValidationError>,
}

impl Default for UploadWorkflow {
    fn default() -> Self {
        Self::new(DEFAULT_DOCUMENT_EXTENSION)
    }
}

impl UploadWorkflow {
    pub fn new(required_extension: impl Into<String>) -> Self {
        Self {
            state: UploadState::Idle,
            required_extension: required_extension.into(),
            validation: None,
        }
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn required_extension(&self) -> &str {
        &self.required_extension
    }

    /// Inline validation failure from the last submit attempt, if any.
    pub fn validation(&self) -> Option<&ValidationError> {
        self.validation.as_ref()
    }

    /// Status text for the upload panel.
    pub fn message(&self) -> Option<String> {
        if let Some(err) = &self.validation {
            return Some(err.to_string());
        }
        match &self.state {
            UploadState::Uploading(file) => Some(format!("Uploading {}...", file.name)),
            UploadState::Succeeded { created } => {
                Some(format!("Successfully uploaded {created} questions"))
            }
            UploadState::Failed { reason, .. } => Some(format!("Upload failed: {reason}")),
            UploadState::Idle | UploadState::FileSelected(_) => None,
        }
    }

    /// Choose a file. Resets any finished upload.
    pub fn select_file(&mut self, path: impl AsRef<Path>) -> Result<(), ValidationError> {
        if matches!(self.state, UploadState::Uploading(_)) {
            return Err(ValidationError::UploadInFlight);
        }
        self.validation = None;
        self.state = UploadState::FileSelected(SelectedFile::new(path.as_ref()));
        Ok(())
    }

    /// Whether the submit trigger is enabled.
    pub fn can_submit(&self) -> bool {
        matches!(self.state, UploadState::FileSelected(_))
    }

    /// Try to move `FileSelected -> Uploading`.
    ///
    /// On a validation failure the state is left alone and the error is
    /// also kept for `message()`. No collaborator call may follow an error.
    pub fn begin_upload(&mut self) -> Result<SelectedFile, ValidationError> {
        let selected = match &self.state {
            UploadState::Uploading(_) => return Err(ValidationError::UploadInFlight),
            UploadState::FileSelected(file) => Some(file.clone()),
            _ => None,
        };
        let Some(file) = selected else {
            return Err(self.reject(ValidationError::NoFileSelected));
        };

        if !file.name.ends_with(&self.required_extension) {
            let err = ValidationError::WrongExtension {
                file_name: file.name.clone(),
                expected: self.required_extension.clone(),
            };
            return Err(self.reject(err));
        }

        self.validation = None;
        self.state = UploadState::Uploading(file.clone());
        Ok(file)
    }

    /// Record the collaborator's answer for the in-flight upload.
    pub fn complete(&mut self, outcome: &anyhow::Result<UploadReceipt>) {
        let file = match std::mem::take(&mut self.state) {
            UploadState::Uploading(file) => file,
            other => {
                tracing::debug!("ignoring upload completion in state {other:?}");
                self.state = other;
                return;
            }
        };

        self.state = match outcome {
            Ok(receipt) => UploadState::Succeeded {
                created: receipt.created(),
            },
            Err(err) => UploadState::Failed {
                file,
                reason: failure_reason(err),
            },
        };
    }

    /// `Failed -> FileSelected` with the same file.
    pub fn retry(&mut self) -> bool {
        match std::mem::take(&mut self.state) {
            UploadState::Failed { file, .. } => {
                self.state = UploadState::FileSelected(file);
                true
            }
            other => {
                self.state = other;
                false
            }
        }
    }

    /// Acknowledge a finished upload and return to `Idle`.
    pub fn reset(&mut self) {
        if !matches!(self.state, UploadState::Uploading(_)) {
            self.state = UploadState::Idle;
            self.validation = None;
        }
    }

    fn reject(&mut self, err: ValidationError) -> ValidationError {
        self.validation = Some(err.clone());
        err
    }
}
