//! Knowledge base loader.
//!
//! Reads a directory of plain-text documents into immutable, process-wide
//! memory at startup. One [`KnowledgeDocument`] per file, `source_id` = file
//! name. The pack is rendered once into the labeled block the prompt
//! assembler injects, and shared read-only (`Arc`) across all requests.
//!
//! Failure to read the directory is fatal at startup: without a knowledge
//! pack the gateway cannot honor its citation contract.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use vitrine_core::error::KnowledgeError;

/// One loaded knowledge document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    /// Derived from the file name (e.g. "rarity.txt")
    pub source_id: String,

    /// The full file text
    pub content: String,
}

/// The immutable set of loaded documents plus the pre-rendered prompt block.
#[derive(Debug, Clone)]
pub struct KnowledgePack {
    documents: Vec<KnowledgeDocument>,
    rendered: String,
}

impl KnowledgePack {
    /// Build a pack from already-loaded documents. Used by `load_all` and by
    /// tests that don't want to touch the filesystem.
    pub fn from_documents(documents: Vec<KnowledgeDocument>) -> Self {
        let rendered = documents
            .iter()
            .map(|d| format!("### {}\n{}", d.source_id, d.content.trim_end()))
            .collect::<Vec<_>>()
            .join("\n\n");
        Self {
            documents,
            rendered,
        }
    }

    /// The loaded documents, sorted by source id.
    pub fn documents(&self) -> &[KnowledgeDocument] {
        &self.documents
    }

    /// The concatenated labeled block (`### <sourceId>\n<content>`).
    pub fn rendered(&self) -> &str {
        &self.rendered
    }

    /// Whether a document with this source id was loaded.
    pub fn contains(&self, source_id: &str) -> bool {
        self.documents.iter().any(|d| d.source_id == source_id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Load every document in `dir` into a [`KnowledgePack`].
///
/// Enumeration is deterministic: entries are sorted by file name.
/// Subdirectories are skipped with a warning; unreadable files are errors.
pub fn load_all(dir: &Path) -> Result<KnowledgePack, KnowledgeError> {
    let entries = fs::read_dir(dir).map_err(|e| KnowledgeError::ReadDir {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| KnowledgeError::ReadDir {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;
        let path = entry.path();
        if path.is_dir() {
            warn!(path = %path.display(), "Skipping subdirectory in knowledge base");
            continue;
        }
        paths.push(path);
    }
    paths.sort();

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let source_id = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content = fs::read_to_string(&path).map_err(|e| KnowledgeError::ReadDocument {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        documents.push(KnowledgeDocument { source_id, content });
    }

    if documents.is_empty() {
        warn!(dir = %dir.display(), "Knowledge directory is empty — answers will have nothing to cite");
    } else {
        info!(
            dir = %dir.display(),
            documents = documents.len(),
            "Knowledge pack loaded"
        );
    }

    Ok(KnowledgePack::from_documents(documents))
}
