//! Transcript export.
//!
//! Writes the current log as a standalone HTML page using the same markup
//! the browser widget renders.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chatwidget_engine::{render_log, LogEntry};
use thiserror::Error;
use tracing::info;

/// Errors that can occur while exporting a transcript.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write transcript: {0}")]
    Io(#[from] std::io::Error),
}

const HEAD: &str = "<!DOCTYPE html>\n<html lang=\"es\">\n<head>\n<meta charset=\"utf-8\">\n<title>Asistente de denuncias</title>\n</head>\n<body>\n";
const TAIL: &str = "</body>\n</html>\n";

/// Build the exported document for a log.
pub fn transcript_document(entries: &[LogEntry]) -> String {
    format!("{HEAD}{}{TAIL}", render_log(entries))
}

/// Write the log to `dir/chat_<timestamp>.html` and return the path.
///
/// An existing file is never overwritten; a numeric suffix is added instead.
pub fn export_transcript(dir: &Path, entries: &[LogEntry]) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(dir)?;
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S_%3f").to_string();
    let document = transcript_document(entries);

    let mut suffix = 0;
    let path = loop {
        let name = if suffix == 0 {
            format!("chat_{stamp}.html")
        } else {
            format!("chat_{stamp}_{suffix}.html")
        };
        let path = dir.join(name);
        match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(document.as_bytes())?;
                break path;
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => suffix += 1,
            Err(e) => return Err(e.into()),
        }
    };
    info!(path = %path.display(), entries = entries.len(), "exported transcript");
    Ok(path)
}
