//! `docatlas` - A read-only index over a prose documentation corpus
//!
//! This library loads a content tree of speeches and per-project
//! documentation sets into a [`CorpusIndex`] of documents and a
//! [`ComparisonMatrix`] read from the projects' overview table, and answers
//! lookups against both.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod content;
pub mod corpus;
pub mod document;
pub mod error;
pub mod index;
pub mod logging;
pub mod matrix;

pub use config::Config;
pub use content::ContentLoader;
pub use corpus::{Corpus, CorpusSummary};
pub use document::DocumentRecord;
pub use error::{Error, ErrorKind, Result};
pub use index::{CorpusIndex, IndexBuilder};
pub use logging::init_logging;
pub use matrix::{Cell, ComparisonMatrix, ComparisonRow};
