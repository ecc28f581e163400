//! Core document types for docatlas.
//!
//! A [`DocumentRecord`] wraps one text document of the corpus with the
//! metadata the index needs. The body is carried as opaque text.

use serde::Serialize;

/// Separator between the project name and the file stem in an identifier.
pub const ID_SEPARATOR: char = '/';

/// Build the corpus identifier of a document from its project and file stem.
///
/// # Examples
///
/// ```
/// use docatlas::document::document_id;
///
/// assert_eq!(document_id("speeches", "keynote"), "speeches/keynote");
/// ```
#[must_use]
pub fn document_id(project: &str, stem: &str) -> String {
    format!("{project}{ID_SEPARATOR}{stem}")
}

/// One document of the corpus.
///
/// Records are immutable once built; the project, ordinal and identifier
/// never change for the lifetime of the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentRecord {
    id: String,
    project: String,
    ordinal: u32,
    title: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    links: Vec<String>,
    content_hash: String,
    #[serde(skip)]
    body: String,
}

impl DocumentRecord {
    /// Create a record for the document `stem` of `project`.
    ///
    /// Computes the identifier and the content hash of the body.
    #[must_use]
    pub fn new(
        project: impl Into<String>,
        stem: &str,
        ordinal: u32,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        let project = project.into();
        let body = body.into();
        Self {
            id: document_id(&project, stem),
            content_hash: Self::compute_hash(&body),
            project,
            ordinal,
            title: title.into(),
            tags: Vec::new(),
            links: Vec::new(),
            body,
        }
    }

    /// Attach topic tags. Tags are lowercased, trimmed and deduplicated,
    /// keeping first-appearance order; empty tags are dropped.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for tag in tags {
            let tag = tag.as_ref().trim().to_lowercase();
            if !tag.is_empty() && !self.tags.contains(&tag) {
                self.tags.push(tag);
            }
        }
        self
    }

    /// Attach cross-link targets (document identifiers).
    ///
    /// Duplicates and links to the document itself are dropped.
    #[must_use]
    pub fn with_links<I, S>(mut self, links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for link in links {
            let link = link.into();
            if link != self.id && !self.links.contains(&link) {
                self.links.push(link);
            }
        }
        self
    }

    /// Compute the BLAKE3 hash of a document body.
    #[must_use]
    pub fn compute_hash(body: &str) -> String {
        blake3::hash(body.as_bytes()).to_hex().to_string()
    }

    /// Unique identifier, `<project>/<stem>`.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Name of the project the document belongs to.
    #[must_use]
    pub fn project(&self) -> &str {
        &self.project
    }

    /// The file stem part of the identifier.
    #[must_use]
    pub fn stem(&self) -> &str {
        &self.id[self.project.len() + ID_SEPARATOR.len_utf8()..]
    }

    /// Reading position within the project.
    #[must_use]
    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }

    /// Document title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Document text, never interpreted by the index.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Topic tags, lowercase.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Identifiers of documents this one links to.
    #[must_use]
    pub fn links(&self) -> &[String] {
        &self.links
    }

    /// BLAKE3 hex digest of the body.
    #[must_use]
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    /// Check whether the document carries `tag` (case-insensitive).
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = tag.trim().to_lowercase();
        self.tags.iter().any(|t| *t == tag)
    }

    /// Check whether the document links to `id`.
    #[must_use]
    pub fn links_to(&self, id: &str) -> bool {
        self.links.iter().any(|l| l == id)
    }
}
