//! Transcript buffer and plain-text export.
//!
//! The export is one `"<speaker>: <text>"` line per entry joined by newlines.
//! It is meant for reading, not for loading back.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Who said a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::User => write!(f, "You"),
            Speaker::Assistant => write!(f, "AI"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub text: String,
}

impl fmt::Display for TranscriptEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.speaker, self.text)
    }
}

#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("failed to write transcript {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TranscriptError {
    fn write(path: &Path, source: std::io::Error) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Append-only record of an exchange.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.entries.push(TranscriptEntry {
            speaker,
            text: text.into(),
        });
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Speaker-prefixed lines joined by `\n`, no trailing newline.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Write [`render`](Self::render) to `path`, replacing any existing file.
    pub async fn export(&self, path: &Path) -> Result<(), TranscriptError> {
        atomic_write_file(path, self.render().as_bytes()).await
    }
}

/// Write data to a temp file, fsync it, then atomically rename to the final path.
async fn atomic_write_file(final_path: &Path, data: &[u8]) -> Result<(), TranscriptError> {
    let file_name = final_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("transcript");
    let temp_path = final_path.with_file_name(format!("{}.{}.tmp", file_name, ulid::Ulid::new()));

    let mut file = fs::File::create(&temp_path)
        .await
        .map_err(|e| TranscriptError::write(&temp_path, e))?;
    file.write_all(data)
        .await
        .map_err(|e| TranscriptError::write(&temp_path, e))?;
    file.sync_all()
        .await
        .map_err(|e| TranscriptError::write(&temp_path, e))?;
    fs::rename(&temp_path, final_path)
        .await
        .map_err(|e| TranscriptError::write(final_path, e))?;
    Ok(())
}
