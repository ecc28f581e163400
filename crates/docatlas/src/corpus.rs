//! The loaded corpus: document index plus comparison matrix.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::Config;
use crate::content::ContentLoader;
use crate::document::DocumentRecord;
use crate::error::Result;
use crate::index::CorpusIndex;
use crate::matrix::{ComparisonMatrix, ComparisonRow};

/// An immutable, loaded corpus.
///
/// Nothing mutates a `Corpus` after construction, so it can be shared
/// between threads behind an `Arc` without locking.
#[derive(Debug, Clone)]
pub struct Corpus {
    root: PathBuf,
    index: CorpusIndex,
    matrix: ComparisonMatrix,
}

/// Document count of one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    /// Project name.
    pub name: String,
    /// Number of documents in the project.
    pub documents: usize,
}

/// Overview of a loaded corpus, as reported by `docatlas check`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorpusSummary {
    /// Content root the corpus was loaded from.
    pub root: PathBuf,
    /// Total number of documents.
    pub documents: usize,
    /// Per-project document counts.
    pub projects: Vec<ProjectSummary>,
    /// Comparison subjects.
    pub subjects: Vec<String>,
    /// Number of comparison attributes.
    pub attributes: usize,
    /// Number of comparison cells marked absent.
    pub absent_cells: usize,
    /// Cross-links whose target is missing, as `(source, target)`.
    pub dangling_links: Vec<(String, String)>,
    /// Groups of documents with identical bodies.
    pub duplicate_bodies: Vec<Vec<String>>,
}

impl Corpus {
    /// Load the corpus from the content root named by `config`.
    ///
    /// # Errors
    ///
    /// Returns a load error if the content is missing or malformed.
    pub fn load(config: &Config) -> Result<Self> {
        Self::load_from(config.content_root(), config)
    }

    /// Load the corpus from an explicit content root.
    ///
    /// # Errors
    ///
    /// Returns a load error if the content is missing or malformed.
    pub fn load_from(root: impl AsRef<Path>, config: &Config) -> Result<Self> {
        let loader = ContentLoader::new(root, &config.content)?;
        let (index, matrix) = loader.load()?;
        Ok(Self {
            root: loader.root().to_path_buf(),
            index,
            matrix,
        })
    }

    /// Assemble a corpus from parts built elsewhere.
    #[must_use]
    pub fn from_parts(
        root: impl Into<PathBuf>,
        index: CorpusIndex,
        matrix: ComparisonMatrix,
    ) -> Self {
        Self {
            root: root.into(),
            index,
            matrix,
        }
    }

    /// The content root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The document index.
    #[must_use]
    pub fn index(&self) -> &CorpusIndex {
        &self.index
    }

    /// The comparison matrix.
    #[must_use]
    pub fn matrix(&self) -> &ComparisonMatrix {
        &self.matrix
    }

    /// See [`CorpusIndex::get_document`].
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown identifier.
    pub fn get_document(&self, id: &str) -> Result<&DocumentRecord> {
        self.index.get_document(id)
    }

    /// See [`CorpusIndex::list_project`].
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown project.
    pub fn list_project(&self, name: &str) -> Result<Vec<&DocumentRecord>> {
        self.index.list_project(name)
    }

    /// See [`CorpusIndex::list_projects`].
    #[must_use]
    pub fn list_projects(&self) -> Vec<&str> {
        self.index.list_projects()
    }

    /// See [`ComparisonMatrix::get_value`].
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown attribute or subject, or an
    /// absent cell.
    pub fn get_value(&self, attribute: &str, subject: &str) -> Result<&str> {
        self.matrix.get_value(attribute, subject)
    }

    /// See [`ComparisonMatrix::get_row`].
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown attribute.
    pub fn get_row(&self, attribute: &str) -> Result<&ComparisonRow> {
        self.matrix.get_row(attribute)
    }

    /// Summarize the corpus.
    #[must_use]
    pub fn summary(&self) -> CorpusSummary {
        let projects = self
            .index
            .list_projects()
            .into_iter()
            .map(|name| ProjectSummary {
                name: name.to_string(),
                documents: self.index.project_len(name).unwrap_or(0),
            })
            .collect();

        CorpusSummary {
            root: self.root.clone(),
            documents: self.index.len(),
            projects,
            subjects: self.matrix.subjects().to_vec(),
            attributes: self.matrix.len(),
            absent_cells: self.matrix.rows().iter().map(ComparisonRow::absent_count).sum(),
            dangling_links: self
                .index
                .dangling_links()
                .into_iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
            duplicate_bodies: self
                .index
                .duplicate_bodies()
                .into_iter()
                .map(|group| group.into_iter().map(str::to_string).collect())
                .collect(),
        }
    }
}
