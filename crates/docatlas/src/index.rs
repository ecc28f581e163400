//! Corpus index.
//!
//! A read-only catalog of [`DocumentRecord`]s grouped by project. The index
//! is assembled once through an [`IndexBuilder`], which enforces that
//! identifiers are unique and that ordinals are unique within a project, and
//! is never mutated afterwards.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};

use tracing::{trace, warn};

use crate::document::DocumentRecord;
use crate::error::{Error, Result};

/// Collects documents and checks the index invariants before freezing them.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    documents: HashMap<String, DocumentRecord>,
    projects: BTreeMap<String, BTreeMap<u32, String>>,
}

impl IndexBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateDocument`] if the identifier is already
    /// present, or [`Error::DuplicateOrdinal`] if the project already holds a
    /// document at the same ordinal. The builder is left unchanged on error.
    pub fn insert(&mut self, record: DocumentRecord) -> Result<&mut Self> {
        if self.documents.contains_key(record.id()) {
            return Err(Error::DuplicateDocument {
                id: record.id().to_string(),
            });
        }

        let ordinals = self.projects.entry(record.project().to_string()).or_default();
        match ordinals.entry(record.ordinal()) {
            Entry::Occupied(existing) => {
                return Err(Error::DuplicateOrdinal {
                    project: record.project().to_string(),
                    ordinal: record.ordinal(),
                    first: existing.get().clone(),
                    second: record.id().to_string(),
                });
            }
            Entry::Vacant(slot) => {
                slot.insert(record.id().to_string());
            }
        }

        trace!(id = record.id(), ordinal = record.ordinal(), "indexed document");
        self.documents.insert(record.id().to_string(), record);
        Ok(self)
    }

    /// Add every document of an iterator, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Same as [`IndexBuilder::insert`].
    pub fn extend<I>(&mut self, records: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = DocumentRecord>,
    {
        for record in records {
            self.insert(record)?;
        }
        Ok(self)
    }

    /// Freeze the collected documents into an index.
    #[must_use]
    pub fn build(self) -> CorpusIndex {
        let projects = self
            .projects
            .into_iter()
            .map(|(name, ordinals)| (name, ordinals.into_values().collect()))
            .collect();
        CorpusIndex {
            documents: self.documents,
            projects,
        }
    }
}

/// Read-only view over the corpus documents.
#[derive(Debug, Clone, Default)]
pub struct CorpusIndex {
    documents: HashMap<String, DocumentRecord>,
    /// Project name to document identifiers in ascending ordinal order.
    projects: BTreeMap<String, Vec<String>>,
}

impl CorpusIndex {
    /// Start building an index.
    #[must_use]
    pub fn builder() -> IndexBuilder {
        IndexBuilder::new()
    }

    /// Look up a document by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DocumentNotFound`] if no document has that identifier.
    pub fn get_document(&self, id: &str) -> Result<&DocumentRecord> {
        self.documents
            .get(id)
            .ok_or_else(|| Error::document_not_found(id))
    }

    /// The documents of a project in reading order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProjectNotFound`] if the project is unknown.
    pub fn list_project(&self, name: &str) -> Result<Vec<&DocumentRecord>> {
        let ids = self
            .projects
            .get(name)
            .ok_or_else(|| Error::project_not_found(name))?;
        Ok(ids.iter().map(|id| &self.documents[id]).collect())
    }

    /// Names of all projects, sorted.
    #[must_use]
    pub fn list_projects(&self) -> Vec<&str> {
        self.projects.keys().map(String::as_str).collect()
    }

    /// Check whether a project exists.
    #[must_use]
    pub fn has_project(&self, name: &str) -> bool {
        self.projects.contains_key(name)
    }

    /// Number of documents in a project, or `None` if it is unknown.
    #[must_use]
    pub fn project_len(&self, name: &str) -> Option<usize> {
        self.projects.get(name).map(Vec::len)
    }

    /// Total number of documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check if the index holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// All documents, by project name then ordinal.
    pub fn documents(&self) -> impl Iterator<Item = &DocumentRecord> + '_ {
        self.projects
            .values()
            .flatten()
            .map(|id| &self.documents[id])
    }

    /// Documents that `id` links to, in link order.
    ///
    /// Link targets missing from the index are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DocumentNotFound`] if `id` itself is unknown.
    pub fn linked_documents(&self, id: &str) -> Result<Vec<&DocumentRecord>> {
        let source = self.get_document(id)?;
        let mut linked = Vec::with_capacity(source.links().len());
        for target in source.links() {
            match self.documents.get(target) {
                Some(doc) => linked.push(doc),
                None => warn!(from = id, to = %target, "skipping dangling cross-link"),
            }
        }
        Ok(linked)
    }

    /// Documents that link to `id`, in corpus order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DocumentNotFound`] if `id` is unknown.
    pub fn backlinks(&self, id: &str) -> Result<Vec<&DocumentRecord>> {
        self.get_document(id)?;
        Ok(self.documents().filter(|doc| doc.links_to(id)).collect())
    }

    /// Documents carrying `tag` (case-insensitive), in corpus order.
    #[must_use]
    pub fn documents_tagged(&self, tag: &str) -> Vec<&DocumentRecord> {
        self.documents().filter(|doc| doc.has_tag(tag)).collect()
    }

    /// Cross-links whose target is not in the index, as `(source, target)`.
    #[must_use]
    pub fn dangling_links(&self) -> Vec<(&str, &str)> {
        self.documents()
            .flat_map(|doc| {
                doc.links()
                    .iter()
                    .filter(|target| !self.documents.contains_key(target.as_str()))
                    .map(move |target| (doc.id(), target.as_str()))
            })
            .collect()
    }

    /// Groups of documents with byte-identical bodies.
    ///
    /// Each group lists identifiers in corpus order; groups are ordered by
    /// their first member.
    #[must_use]
    pub fn duplicate_bodies(&self) -> Vec<Vec<&str>> {
        let mut by_hash: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut order = Vec::new();
        for doc in self.documents() {
            let group = by_hash.entry(doc.content_hash()).or_default();
            if group.is_empty() {
                order.push(doc.content_hash());
            }
            group.push(doc.id());
        }
        order
            .into_iter()
            .filter_map(|hash| by_hash.remove(hash))
            .filter(|group| group.len() > 1)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    const PROJECT: &str = "rodrigo_manguinho";

    fn doc(project: &str, stem: &str, ordinal: u32) -> DocumentRecord {
        DocumentRecord::new(project, stem, ordinal, stem, format!("body of {stem}"))
    }

    fn manguinho_index() -> CorpusIndex {
        let mut builder = CorpusIndex::builder();
        // Inserted out of order on purpose.
        for ordinal in [4, 1, 6, 2, 5, 3] {
            builder
                .insert(doc(PROJECT, &format!("0{ordinal}-part"), ordinal))
                .unwrap();
        }
        builder.build()
    }

    #[test]
    fn test_get_document_returns_inserted_record() {
        let record = doc(PROJECT, "01-intro", 1).with_tags(["intro"]);
        let mut builder = CorpusIndex::builder();
        builder.insert(record.clone()).unwrap();
        let index = builder.build();

        assert_eq!(index.get_document("rodrigo_manguinho/01-intro").unwrap(), &record);
    }

    #[test]
    fn test_get_document_unknown_is_not_found() {
        let index = manguinho_index();
        let err = index
            .get_document("rodrigo_manguinho/07-nonexistent")
            .unwrap_err();
        assert!(matches!(err, Error::DocumentNotFound { .. }));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_list_project_in_ordinal_order() {
        let index = manguinho_index();
        let docs = index.list_project(PROJECT).unwrap();

        assert_eq!(docs.len(), 6);
        let ordinals: Vec<u32> = docs.iter().map(|d| d.ordinal()).collect();
        assert_eq!(ordinals, vec![1, 2, 3, 4, 5, 6]);
        assert!(ordinals.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_list_project_unknown_is_not_found() {
        let index = manguinho_index();
        let err = index.list_project("unknown").unwrap_err();
        assert!(matches!(err, Error::ProjectNotFound { .. }));
    }

    #[test]
    fn test_list_projects_is_distinct_set() {
        let mut builder = CorpusIndex::builder();
        builder
            .extend([
                doc("a", "1", 1),
                doc("b", "1", 1),
                doc("a", "2", 2),
                doc("c", "1", 1),
                doc("b", "2", 2),
            ])
            .unwrap();
        let index = builder.build();

        let projects: BTreeSet<&str> = index.list_projects().into_iter().collect();
        assert_eq!(projects, BTreeSet::from(["a", "b", "c"]));
        assert_eq!(index.list_projects().len(), 3);
        assert_eq!(index.len(), 5);
        assert_eq!(index.project_len("a"), Some(2));
        assert_eq!(index.project_len("z"), None);
    }

    #[test]
    fn test_empty_index() {
        let index = CorpusIndex::builder().build();
        assert!(index.is_empty());
        assert!(index.list_projects().is_empty());
        assert!(index.get_document("a/b").is_err());
    }

    #[test]
    fn test_duplicate_identifier_rejected() {
        let mut builder = CorpusIndex::builder();
        builder.insert(doc(PROJECT, "01-intro", 1)).unwrap();
        let err = builder.insert(doc(PROJECT, "01-intro", 2)).unwrap_err();
        assert!(matches!(err, Error::DuplicateDocument { .. }));
        assert!(err.is_load_error());

        // The failed insert left nothing behind.
        let index = builder.build();
        assert_eq!(index.list_project(PROJECT).unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_ordinal_rejected() {
        let mut builder = CorpusIndex::builder();
        builder.insert(doc(PROJECT, "01-intro", 1)).unwrap();
        let err = builder.insert(doc(PROJECT, "01-other", 1)).unwrap_err();
        match err {
            Error::DuplicateOrdinal { first, second, .. } => {
                assert_eq!(first, "rodrigo_manguinho/01-intro");
                assert_eq!(second, "rodrigo_manguinho/01-other");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_same_ordinal_in_different_projects() {
        let mut builder = CorpusIndex::builder();
        builder.insert(doc("a", "01", 1)).unwrap();
        assert!(builder.insert(doc("b", "01", 1)).is_ok());
    }

    #[test]
    fn test_documents_iterates_project_then_ordinal() {
        let mut builder = CorpusIndex::builder();
        builder
            .extend([doc("b", "2", 2), doc("a", "9", 9), doc("b", "1", 1)])
            .unwrap();
        let index = builder.build();
        let ids: Vec<&str> = index.documents().map(DocumentRecord::id).collect();
        assert_eq!(ids, vec!["a/9", "b/1", "b/2"]);
    }

    fn linked_index() -> CorpusIndex {
        let mut builder = CorpusIndex::builder();
        builder
            .extend([
                doc("p", "01-a", 1).with_links(["p/02-b", "p/99-missing"]),
                doc("p", "02-b", 2).with_links(["p/03-c"]),
                doc("p", "03-c", 3).with_links(["p/02-b"]),
            ])
            .unwrap();
        builder.build()
    }

    #[test]
    fn test_linked_documents_skips_dangling() {
        let index = linked_index();
        let linked = index.linked_documents("p/01-a").unwrap();
        let ids: Vec<&str> = linked.iter().map(|d| d.id()).collect();
        assert_eq!(ids, vec!["p/02-b"]);
        assert!(index.linked_documents("p/nope").is_err());
    }

    #[test]
    fn test_backlinks() {
        let index = linked_index();
        let ids: Vec<&str> = index
            .backlinks("p/02-b")
            .unwrap()
            .iter()
            .map(|d| d.id())
            .collect();
        assert_eq!(ids, vec!["p/01-a", "p/03-c"]);
        assert!(index.backlinks("p/01-a").unwrap().is_empty());
    }

    #[test]
    fn test_dangling_links() {
        let index = linked_index();
        assert_eq!(index.dangling_links(), vec![("p/01-a", "p/99-missing")]);
    }

    #[test]
    fn test_documents_tagged() {
        let mut builder = CorpusIndex::builder();
        builder
            .extend([
                doc("p", "1", 1).with_tags(["testing"]),
                doc("p", "2", 2).with_tags(["Architecture"]),
                doc("q", "1", 1).with_tags(["architecture", "testing"]),
            ])
            .unwrap();
        let index = builder.build();

        let ids: Vec<&str> = index
            .documents_tagged("ARCHITECTURE")
            .iter()
            .map(|d| d.id())
            .collect();
        assert_eq!(ids, vec!["p/2", "q/1"]);
        assert!(index.documents_tagged("none").is_empty());
    }

    #[test]
    fn test_duplicate_bodies() {
        let mut builder = CorpusIndex::builder();
        builder
            .extend([
                DocumentRecord::new("p", "1", 1, "one", "same"),
                DocumentRecord::new("p", "2", 2, "two", "different"),
                DocumentRecord::new("q", "1", 1, "three", "same"),
            ])
            .unwrap();
        let index = builder.build();
        assert_eq!(index.duplicate_bodies(), vec![vec!["p/1", "q/1"]]);
    }

    #[test]
    fn test_index_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CorpusIndex>();
    }
}
