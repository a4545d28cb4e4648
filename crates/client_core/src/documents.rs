//! Ordered set of uploaded documents and the grounding context derived from it.

use shared::domain::Document;

/// Separator placed between document texts in the combined context.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    documents: Vec<Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a document. Names are display labels only; duplicates are kept as
    /// distinct entries.
    pub fn add_document(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.documents.push(Document::new(name, text));
    }

    /// Removes the document at `index`, shifting later entries down. Returns the removed
    /// document, or `None` when `index` is out of bounds.
    pub fn remove_document(&mut self, index: usize) -> Option<Document> {
        if index >= self.documents.len() {
            tracing::debug!(
                index,
                documents = self.documents.len(),
                "ignoring out-of-range document removal"
            );
            return None;
        }
        Some(self.documents.remove(index))
    }

    pub fn combined_context(&self) -> String {
        self.documents
            .iter()
            .map(|doc| doc.text.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/documents_tests.rs"]
mod tests;
