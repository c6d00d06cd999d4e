//! Document model - turns raw text into the structure the steps consume
//!
//! A document is segmented into sections (by ATX headings), paragraphs
//! (maximal runs of non-blank lines), and sentences. Fenced code blocks
//! are skipped entirely; common inline markdown is stripped before word
//! counting so `**bold**` counts as one word, not punctuation soup.

mod segment;
mod sentences;

pub use segment::segment;
pub use sentences::split_sentences;

use crate::models::DocumentSummary;
use anyhow::{Context, Result};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// File extensions treated as analyzable documents
pub const DOCUMENT_EXTENSIONS: &[&str] = &["md", "markdown", "txt"];

/// Custom ignore file honored when walking directories
pub const IGNORE_FILENAME: &str = ".stylometerignore";

/// A single sentence with its word count
#[derive(Debug, Clone, PartialEq)]
pub struct Sentence {
    pub text: String,
    pub word_count: usize,
}

/// A paragraph: a maximal run of non-blank prose lines
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    /// 1-based line where the paragraph starts in the source
    pub line_start: u32,
    pub word_count: usize,
    pub sentences: Vec<Sentence>,
}

impl Paragraph {
    /// First sentence text, if any (used for transition-opener checks)
    pub fn opening(&self) -> Option<&str> {
        self.sentences.first().map(|s| s.text.as_str())
    }

    /// Full paragraph text rejoined from sentences
    pub fn text(&self) -> String {
        self.sentences
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A section opened by an ATX heading (or the unlabeled preamble)
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Heading text with markers stripped; None for the preamble
    pub heading: Option<String>,
    /// Heading level 1-6; 0 for the preamble
    pub level: u8,
    /// 1-based line of the heading (or first paragraph for the preamble)
    pub line_start: u32,
    pub paragraphs: Vec<Paragraph>,
}

impl Section {
    pub fn word_count(&self) -> usize {
        self.paragraphs.iter().map(|p| p.word_count).sum()
    }
}

/// A fully segmented document
#[derive(Debug, Clone)]
pub struct Document {
    pub name: String,
    pub word_count: usize,
    pub sections: Vec<Section>,
}

impl Document {
    /// Segment raw text into a document
    pub fn from_text(name: impl Into<String>, text: &str) -> Self {
        segment(name.into(), text)
    }

    /// Load and segment a UTF-8 file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read document: {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::from_text(name, &text))
    }

    /// All paragraphs across sections, in document order
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.sections.iter().flat_map(|s| s.paragraphs.iter())
    }

    pub fn paragraph_count(&self) -> usize {
        self.sections.iter().map(|s| s.paragraphs.len()).sum()
    }

    pub fn sentence_count(&self) -> usize {
        self.paragraphs().map(|p| p.sentences.len()).sum()
    }

    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            sections: self.sections.len(),
            paragraphs: self.paragraph_count(),
            sentences: self.sentence_count(),
            words: self.word_count,
        }
    }

    /// Word counts per paragraph, in document order
    pub fn paragraph_word_counts(&self) -> Vec<f64> {
        self.paragraphs().map(|p| p.word_count as f64).collect()
    }

    /// Paragraph by document-order index
    pub fn paragraph_at(&self, index: usize) -> Option<&Paragraph> {
        self.paragraphs().nth(index)
    }

    /// Full text of a section rejoined from its paragraphs
    pub fn section_text(&self, index: usize) -> Option<String> {
        self.sections.get(index).map(|s| {
            s.paragraphs
                .iter()
                .map(|p| p.text())
                .collect::<Vec<_>>()
                .join("\n\n")
        })
    }
}

/// Collect analyzable documents under a directory, honoring .gitignore
/// plus a `.stylometerignore` file.
pub fn walk_documents(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(true)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(true)
        .add_custom_ignore_filename(IGNORE_FILENAME);

    for entry in builder.build().filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.is_file() {
            if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
                if DOCUMENT_EXTENSIONS.contains(&ext) {
                    files.push(path.to_path_buf());
                }
            }
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let doc = Document::from_text(
            "t.md",
            "# One\n\nFirst para here. Second sentence!\n\nAnother para.\n\n# Two\n\nClosing words now.\n",
        );
        let summary = doc.summary();
        assert_eq!(summary.sections, 2);
        assert_eq!(summary.paragraphs, 3);
        assert_eq!(summary.sentences, 4);
        assert_eq!(summary.words, 10);
        assert_eq!(doc.word_count, 10);
    }

    #[test]
    fn test_walk_documents_filters_extensions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), "# Hi\n\nText.").unwrap();
        std::fs::write(dir.path().join("b.txt"), "Plain text.").unwrap();
        std::fs::write(dir.path().join("c.rs"), "fn main() {}").unwrap();

        let files = walk_documents(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| {
            let ext = f.extension().unwrap().to_str().unwrap();
            DOCUMENT_EXTENSIONS.contains(&ext)
        }));
    }

    #[test]
    fn test_walk_documents_honors_custom_ignore() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("keep.md"), "Text.").unwrap();
        std::fs::write(dir.path().join("drafts.md"), "Draft.").unwrap();
        std::fs::write(dir.path().join(IGNORE_FILENAME), "drafts.md\n").unwrap();

        let files = walk_documents(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("keep.md"));
    }
}
