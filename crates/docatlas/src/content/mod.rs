//! Content loading for docatlas.
//!
//! This module turns a content tree into a [`CorpusIndex`] and a
//! [`ComparisonMatrix`]:
//!
//! ```text
//! <root>/
//!   speeches/*.md              speech documents
//!   projects/<project>/*.md    numbered documentation sets
//!   projects/README.md         overview with the comparison table
//! ```
//!
//! Directory and file names come from [`ContentConfig`]. Content is read
//! once; any missing or malformed piece fails the load with a load error.

pub mod markdown;
pub mod table;

use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use regex::Regex;
use tracing::{debug, info, trace, warn};

use crate::config::ContentConfig;
use crate::document::{document_id, DocumentRecord};
use crate::error::{Error, Result};
use crate::index::{CorpusIndex, IndexBuilder};
use crate::matrix::ComparisonMatrix;

use self::markdown::{first_heading, parse_front_matter, relative_link_targets, title_from_stem};
use self::table::parse_comparison_table;

/// A document file read from disk, before ordinals are settled.
#[derive(Debug)]
struct DocumentFile {
    path: PathBuf,
    stem: String,
    explicit_ordinal: Option<u32>,
    title: String,
    tags: Vec<String>,
    links: Vec<String>,
    body: String,
}

/// Loads a content tree.
#[derive(Debug)]
pub struct ContentLoader {
    root: PathBuf,
    config: ContentConfig,
    ordinal: Regex,
}

impl ContentLoader {
    /// Create a loader for the content tree at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ContentMissing`] if `root` does not exist, or a
    /// configuration error if the ordinal pattern is invalid.
    pub fn new(root: impl AsRef<Path>, config: &ContentConfig) -> Result<Self> {
        let root = root.as_ref();
        let root = fs::canonicalize(root).map_err(|_| Error::ContentMissing {
            path: root.to_path_buf(),
        })?;
        Ok(Self {
            ordinal: config.ordinal_regex()?,
            config: config.clone(),
            root,
        })
    }

    /// The canonical content root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load the whole tree.
    ///
    /// # Errors
    ///
    /// Returns a load error if the projects directory or overview file is
    /// missing, a file cannot be read, front matter or the comparison table
    /// is malformed, or documents collide on identifier or ordinal.
    pub fn load(&self) -> Result<(CorpusIndex, ComparisonMatrix)> {
        info!(root = %self.root.display(), "loading content");

        let mut builder = CorpusIndex::builder();
        self.load_speeches(&mut builder)?;
        let projects = self.load_projects(&mut builder)?;
        let index = builder.build();

        let matrix = self.load_matrix()?;
        for subject in matrix.subjects() {
            if !projects.contains(subject) {
                warn!(subject = %subject, "comparison subject matches no project directory");
            }
        }

        for (from, to) in index.dangling_links() {
            warn!(from, to, "cross-link target not found");
        }

        info!(
            documents = index.len(),
            projects = index.list_projects().len(),
            attributes = matrix.len(),
            "content loaded"
        );
        Ok((index, matrix))
    }

    fn speeches_dir(&self) -> PathBuf {
        self.root.join(&self.config.speeches_dir)
    }

    fn projects_dir(&self) -> PathBuf {
        self.root.join(&self.config.projects_dir)
    }

    fn load_speeches(&self, builder: &mut IndexBuilder) -> Result<()> {
        let dir = self.speeches_dir();
        if !dir.is_dir() {
            debug!(path = %dir.display(), "no speeches directory, skipping");
            return Ok(());
        }
        let records = self.load_group(&self.config.speeches_project, &dir)?;
        builder.extend(records)?;
        Ok(())
    }

    /// Index every project directory and return the project names.
    fn load_projects(&self, builder: &mut IndexBuilder) -> Result<HashSet<String>> {
        let dir = self.projects_dir();
        if !dir.is_dir() {
            return Err(Error::ContentMissing { path: dir });
        }

        let mut projects = HashSet::new();
        for path in read_dir_sorted(&dir)? {
            if !path.is_dir() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                warn!(path = %path.display(), "skipping project directory with non UTF-8 name");
                continue;
            };
            if name == self.config.speeches_project {
                return Err(Error::ConfigValidation {
                    message: format!(
                        "project directory '{name}' collides with speeches_project; \
                         rename one of them"
                    ),
                });
            }
            debug!(project = name, "scanning project");
            let records = self.load_group(name, &path)?;
            if records.is_empty() {
                warn!(project = name, "project directory has no documents, skipping");
                continue;
            }
            builder.extend(records)?;
            projects.insert(name.to_string());
        }
        Ok(projects)
    }

    fn load_matrix(&self) -> Result<ComparisonMatrix> {
        let path = self.projects_dir().join(&self.config.overview_file);
        if !path.is_file() {
            return Err(Error::ContentMissing { path });
        }
        let text = fs::read_to_string(&path).map_err(|e| Error::read(&path, e))?;
        parse_comparison_table(&path, &text, &self.config)
    }

    /// Read the documents of one directory and settle their ordinals.
    ///
    /// Numbered files keep their number. Unnumbered files follow the highest
    /// number, in file name order.
    fn load_group(&self, project: &str, dir: &Path) -> Result<Vec<DocumentRecord>> {
        let mut files = Vec::new();
        for path in read_dir_sorted(dir)? {
            if !path.is_file() || !self.config.is_document(&path) {
                trace!(path = %path.display(), "not a document, skipping");
                continue;
            }
            files.push(self.read_document(&path)?);
        }

        let mut next = files
            .iter()
            .filter_map(|f| f.explicit_ordinal)
            .max()
            .unwrap_or(0);

        let mut records = Vec::with_capacity(files.len());
        for file in files {
            let ordinal = match file.explicit_ordinal {
                Some(ordinal) => ordinal,
                None => {
                    next = next.checked_add(1).ok_or_else(|| Error::OrdinalOverflow {
                        project: project.to_string(),
                        path: file.path.clone(),
                    })?;
                    next
                }
            };
            trace!(path = %file.path.display(), ordinal, "read document");
            records.push(
                DocumentRecord::new(project, &file.stem, ordinal, file.title, file.body)
                    .with_tags(file.tags)
                    .with_links(file.links),
            );
        }
        Ok(records)
    }

    fn read_document(&self, path: &Path) -> Result<DocumentFile> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .ok_or_else(|| Error::ContentMissing {
                path: path.to_path_buf(),
            })?;

        let text = fs::read_to_string(path).map_err(|e| Error::read(path, e))?;
        let (front, body) = parse_front_matter(path, &text)?;

        let explicit_ordinal = front.ordinal.or_else(|| {
            self.ordinal
                .captures(&stem)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse().ok())
        });
        let title = front
            .title
            .or_else(|| first_heading(body))
            .unwrap_or_else(|| title_from_stem(&stem, &self.ordinal));

        let dir = path.parent().unwrap_or(&self.root);
        let links = relative_link_targets(body)
            .iter()
            .filter_map(|target| self.resolve_link(dir, target))
            .collect();

        Ok(DocumentFile {
            path: path.to_path_buf(),
            stem,
            explicit_ordinal,
            title,
            tags: front.tags,
            links,
            body: body.to_string(),
        })
    }

    /// Map a relative link target to a document identifier.
    ///
    /// Returns `None` for targets outside the content tree or that cannot be
    /// documents of the corpus.
    fn resolve_link(&self, dir: &Path, target: &str) -> Option<String> {
        let path = normalize(&dir.join(target));
        if !self.config.is_document(&path) {
            return None;
        }
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<&str> = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<_>>()?;
        let stem = path.file_stem()?.to_str()?;

        match parts.as_slice() {
            [group, _] if *group == self.config.speeches_dir => {
                Some(document_id(&self.config.speeches_project, stem))
            }
            [group, project, _] if *group == self.config.projects_dir => {
                Some(document_id(project, stem))
            }
            _ => {
                trace!(link = target, "link target is not a corpus document");
                None
            }
        }
    }
}

/// Directory entries sorted by file name, hidden entries excluded.
fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| Error::read(dir, e))?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::read(dir, e))?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}

/// Resolve `.` and `..` components lexically.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use tempfile::TempDir;

    use super::*;

    const OVERVIEW: &str = "\
# Comparison

| Aspect | rodrigo_manguinho | resocoder |
|---|---|---|
| State management | GetX | BLoC |
| Tests | unit, integration | — |
";

    fn write(root: &Path, rel: &str, text: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    fn corpus_tree() -> TempDir {
        crate::logging::init_test_logging();
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "projects/README.md", OVERVIEW);
        for (i, name) in [
            "introducao",
            "camadas",
            "dominio",
            "dados",
            "infra",
            "apresentacao",
        ]
        .iter()
        .enumerate()
        {
            let n = i + 1;
            write(
                root,
                &format!("projects/rodrigo_manguinho/0{n}-{name}.md"),
                &format!("# Parte {n}: {name}\n\nTexto da parte {n}.\n"),
            );
        }
        write(
            root,
            "projects/resocoder/01-overview.md",
            "+++\ntags = [\"Architecture\", \"tdd\"]\n+++\n# Overview\n\n\
             Next: [entities](02-entities.md). Compare [layers](../rodrigo_manguinho/02-camadas.md). \
             Source: [repo](https://github.com/example/app).\n",
        );
        write(
            root,
            "projects/resocoder/02-entities.md",
            "No heading here. Back to [overview](01-overview.md#top).\n",
        );
        write(root, "projects/resocoder/notes.txt", "not a document");
        write(root, "projects/resocoder/.draft.md", "# hidden");
        write(root, "speeches/keynote-architecture.md", "# The Architecture Keynote\n");
        write(root, "speeches/closing.md", "Thanks, see [keynote](keynote-architecture.md).\n");
        dir
    }

    fn load(root: &Path) -> Result<(CorpusIndex, ComparisonMatrix)> {
        ContentLoader::new(root, &ContentConfig::default())?.load()
    }

    #[test]
    fn test_load_project_in_reading_order() {
        let dir = corpus_tree();
        let (index, _) = load(dir.path()).unwrap();

        let docs = index.list_project("rodrigo_manguinho").unwrap();
        assert_eq!(docs.len(), 6);
        let ordinals: Vec<u32> = docs.iter().map(|d| d.ordinal()).collect();
        assert_eq!(ordinals, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(docs[0].id(), "rodrigo_manguinho/01-introducao");
        assert_eq!(docs[0].title(), "Parte 1: introducao");

        let err = index
            .get_document("rodrigo_manguinho/07-nonexistent")
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_load_projects_and_speeches() {
        let dir = corpus_tree();
        let (index, _) = load(dir.path()).unwrap();

        let projects: BTreeSet<&str> = index.list_projects().into_iter().collect();
        assert_eq!(
            projects,
            BTreeSet::from(["resocoder", "rodrigo_manguinho", "speeches"])
        );
        assert_eq!(index.len(), 10);

        // Unnumbered speeches are ordered by file name.
        let speeches = index.list_project("speeches").unwrap();
        let ids: Vec<&str> = speeches.iter().map(|d| d.id()).collect();
        assert_eq!(ids, vec!["speeches/closing", "speeches/keynote-architecture"]);
        assert_eq!(speeches[0].ordinal(), 1);
        assert_eq!(speeches[1].ordinal(), 2);
        assert_eq!(speeches[1].title(), "The Architecture Keynote");
        assert_eq!(speeches[0].title(), "closing");
    }

    #[test]
    fn test_front_matter_tags_and_fallback_title() {
        let dir = corpus_tree();
        let (index, _) = load(dir.path()).unwrap();

        let overview = index.get_document("resocoder/01-overview").unwrap();
        assert_eq!(overview.tags(), ["architecture", "tdd"]);
        assert!(overview.body().starts_with("# Overview"));

        let entities = index.get_document("resocoder/02-entities").unwrap();
        assert_eq!(entities.title(), "entities");
        assert_eq!(index.documents_tagged("TDD").len(), 1);
    }

    #[test]
    fn test_cross_links_resolved() {
        let dir = corpus_tree();
        let (index, _) = load(dir.path()).unwrap();

        let overview = index.get_document("resocoder/01-overview").unwrap();
        assert_eq!(
            overview.links(),
            ["resocoder/02-entities", "rodrigo_manguinho/02-camadas"]
        );
        let back: Vec<&str> = index
            .backlinks("resocoder/01-overview")
            .unwrap()
            .iter()
            .map(|d| d.id())
            .collect();
        assert_eq!(back, vec!["resocoder/02-entities"]);

        let closing = index.get_document("speeches/closing").unwrap();
        assert_eq!(closing.links(), ["speeches/keynote-architecture"]);
        assert!(index.dangling_links().is_empty());
    }

    #[test]
    fn test_matrix_loaded() {
        let dir = corpus_tree();
        let (_, matrix) = load(dir.path()).unwrap();

        assert_eq!(matrix.get_value("State management", "resocoder").unwrap(), "BLoC");
        assert!(matrix.get_value("Tests", "resocoder").unwrap_err().is_not_found());
        assert_eq!(matrix.get_row("Tests").unwrap().cells().len(), 2);
    }

    #[test]
    fn test_missing_root() {
        let err = ContentLoader::new("/nonexistent/docatlas/root", &ContentConfig::default())
            .unwrap_err();
        assert!(matches!(err, Error::ContentMissing { .. }));
    }

    #[test]
    fn test_missing_projects_dir() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "speeches/a.md", "# A");
        let err = load(dir.path()).unwrap_err();
        assert!(matches!(err, Error::ContentMissing { .. }));
        assert!(err.is_load_error());
    }

    #[test]
    fn test_missing_overview() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "projects/p/01-a.md", "# A");
        let err = load(dir.path()).unwrap_err();
        match err {
            Error::ContentMissing { path } => assert!(path.ends_with("projects/README.md")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_overview_row() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "projects/p/01-a.md", "# A");
        write(
            dir.path(),
            "projects/README.md",
            "| Aspect | p | q |\n|---|---|---|\n| Tests | yes |\n",
        );
        let err = load(dir.path()).unwrap_err();
        assert!(matches!(err, Error::MalformedTable { line: 3, .. }));
    }

    #[test]
    fn test_duplicate_ordinal_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "projects/README.md", OVERVIEW);
        write(dir.path(), "projects/p/01-a.md", "# A");
        write(dir.path(), "projects/p/01-b.md", "# B");
        let err = load(dir.path()).unwrap_err();
        assert!(matches!(err, Error::DuplicateOrdinal { ordinal: 1, .. }));
    }

    #[test]
    fn test_front_matter_ordinal_overrides_prefix() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "projects/README.md", OVERVIEW);
        write(dir.path(), "projects/p/01-a.md", "+++\nordinal = 5\n+++\n# A");
        write(dir.path(), "projects/p/02-b.md", "# B");
        write(dir.path(), "projects/p/zz.md", "# Z");
        let (index, _) = load(dir.path()).unwrap();
        let ordinals: Vec<(&str, u32)> = index
            .list_project("p")
            .unwrap()
            .iter()
            .map(|d| (d.id(), d.ordinal()))
            .collect();
        assert_eq!(ordinals, vec![("p/02-b", 2), ("p/01-a", 5), ("p/zz", 6)]);
    }

    #[test]
    fn test_optional_ordinal_group() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "projects/README.md", OVERVIEW);
        write(dir.path(), "projects/p/3c-setup.md", "Setup");
        write(dir.path(), "projects/p/intro.md", "Intro");
        let config = ContentConfig {
            ordinal_pattern: r"^(\d+)?[a-z]".to_string(),
            ..ContentConfig::default()
        };
        let (index, _) = ContentLoader::new(dir.path(), &config)
            .unwrap()
            .load()
            .unwrap();
        let docs: Vec<(&str, u32, &str)> = index
            .list_project("p")
            .unwrap()
            .iter()
            .map(|d| (d.id(), d.ordinal(), d.title()))
            .collect();
        assert_eq!(docs, vec![("p/3c-setup", 3, "setup"), ("p/intro", 4, "intro")]);
    }

    #[test]
    fn test_unnumbered_after_largest_ordinal_overflows() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "projects/README.md", OVERVIEW);
        write(dir.path(), "projects/p/01-a.md", "+++\nordinal = 4294967295\n+++\n# A");
        write(dir.path(), "projects/p/zz.md", "# Z");
        let err = load(dir.path()).unwrap_err();
        match &err {
            Error::OrdinalOverflow { project, path } => {
                assert_eq!(project, "p");
                assert!(path.ends_with("zz.md"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.is_load_error());
    }

    #[test]
    fn test_empty_project_dir_not_listed() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "projects/README.md", OVERVIEW);
        write(dir.path(), "projects/p/01-a.md", "# A");
        write(dir.path(), "projects/empty/notes.txt", "not a document");
        let (index, _) = load(dir.path()).unwrap();
        assert_eq!(index.list_projects(), vec!["p"]);
        assert!(index.list_project("empty").unwrap_err().is_not_found());
    }

    #[test]
    fn test_project_named_like_speeches_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "projects/README.md", OVERVIEW);
        write(dir.path(), "projects/speeches/01-a.md", "# A");
        let err = load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("speeches_project"));
    }

    #[test]
    fn test_custom_layout() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "apps/OVERVIEW.md", OVERVIEW);
        write(dir.path(), "apps/p/1_a.txt", "A");
        write(dir.path(), "apps/p/2_b.md", "B");
        let config = ContentConfig {
            projects_dir: "apps".to_string(),
            overview_file: "OVERVIEW.md".to_string(),
            extensions: vec!["txt".to_string()],
            ..ContentConfig::default()
        };
        let (index, _) = ContentLoader::new(dir.path(), &config)
            .unwrap()
            .load()
            .unwrap();
        let docs = index.list_project("p").unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id(), "p/1_a");
        assert_eq!(docs[0].title(), "a");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize(Path::new("/c/projects/a/../b/./02-x.md")),
            PathBuf::from("/c/projects/b/02-x.md")
        );
    }

    #[test]
    fn test_resolve_link_outside_tree() {
        let dir = corpus_tree();
        let loader = ContentLoader::new(dir.path(), &ContentConfig::default()).unwrap();
        let from = loader.root().join("projects/resocoder");
        assert_eq!(loader.resolve_link(&from, "../../../elsewhere/x.md"), None);
        assert_eq!(loader.resolve_link(&from, "image.png"), None);
        assert_eq!(
            loader.resolve_link(&from, "../../speeches/closing.md"),
            Some("speeches/closing".to_string())
        );
    }
}
