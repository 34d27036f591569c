use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_KNOWLEDGE_BASE_FILE: &str = "knowledge_base.txt";

pub const MISSING_KNOWLEDGE_TEXT: &str = "No knowledge base file found.\nPlease create a 'knowledge_base.txt' file with your course information.";
pub const UNREADABLE_KNOWLEDGE_TEXT: &str = "Error loading knowledge base.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KnowledgeStatus {
    Loaded,
    Missing,
    Unreadable(String),
}

/// Course information spliced into every system prompt.
///
/// Loaded once at startup. A missing or unreadable file never aborts the
/// session; it degrades to a fixed placeholder text instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeBase {
    path: PathBuf,
    text: String,
    status: KnowledgeStatus,
}

impl KnowledgeBase {
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(text) => Self {
                path: path.to_path_buf(),
                text,
                status: KnowledgeStatus::Loaded,
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => Self {
                path: path.to_path_buf(),
                text: MISSING_KNOWLEDGE_TEXT.to_string(),
                status: KnowledgeStatus::Missing,
            },
            Err(err) => Self {
                path: path.to_path_buf(),
                text: UNREADABLE_KNOWLEDGE_TEXT.to_string(),
                status: KnowledgeStatus::Unreadable(err.to_string()),
            },
        }
    }

    pub fn from_text(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
            status: KnowledgeStatus::Loaded,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn status(&self) -> &KnowledgeStatus {
        &self.status
    }

    pub fn warning(&self) -> Option<String> {
        match &self.status {
            KnowledgeStatus::Loaded => None,
            KnowledgeStatus::Missing => Some(format!(
                "No knowledge base found at {}. Answers will not include course information.",
                self.path.display()
            )),
            KnowledgeStatus::Unreadable(reason) => Some(format!(
                "Error loading knowledge base {}: {reason}",
                self.path.display()
            )),
        }
    }

    pub fn summary(&self) -> String {
        match &self.status {
            KnowledgeStatus::Loaded => format!(
                "knowledge base: {} ({} chars, {} lines)",
                self.path.display(),
                self.text.chars().count(),
                self.text.lines().count()
            ),
            KnowledgeStatus::Missing => {
                format!("knowledge base: {} (missing)", self.path.display())
            }
            KnowledgeStatus::Unreadable(reason) => format!(
                "knowledge base: {} (unreadable: {reason})",
                self.path.display()
            ),
        }
    }
}
