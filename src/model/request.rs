//! The analysis request: who is asking, what for, and over which documents.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Input record naming the persona, the task and the documents to rank.
///
/// Unknown fields (e.g. `challenge_info`) are accepted and ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub persona: Persona,
    pub job_to_be_done: JobToBeDone,
    pub documents: Vec<DocumentRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobToBeDone {
    pub task: String,
}

/// A document entry of the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRef {
    /// File name relative to the document directory
    pub filename: String,
    /// Optional human title, carried but unused
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl DocumentRef {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            title: None,
        }
    }
}

impl Request {
    /// Build a request in code.
    pub fn new(
        role: impl Into<String>,
        task: impl Into<String>,
        documents: impl IntoIterator<Item = DocumentRef>,
    ) -> Self {
        Self {
            persona: Persona { role: role.into() },
            job_to_be_done: JobToBeDone { task: task.into() },
            documents: documents.into_iter().collect(),
        }
    }

    /// Parse and validate a request from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let request: Request =
            serde_json::from_str(json).map_err(|e| Error::InvalidRequest(e.to_string()))?;
        request.validate()?;
        Ok(request)
    }

    /// Read, parse and validate a request file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Reject requests that cannot name a readable document.
    pub fn validate(&self) -> Result<()> {
        for (i, doc) in self.documents.iter().enumerate() {
            if doc.filename.trim().is_empty() {
                return Err(Error::InvalidRequest(format!(
                    "documents[{}].filename is empty",
                    i
                )));
            }
        }
        Ok(())
    }

    /// Text embedded as the relevance query.
    pub fn query_text(&self) -> String {
        format!(
            "Persona: {}. Task: {}",
            self.persona.role, self.job_to_be_done.task
        )
    }

    /// Filenames in request order.
    pub fn filenames(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.filename.clone()).collect()
    }
}
