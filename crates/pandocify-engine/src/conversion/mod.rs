//! Dialect manuscripts to Pandoc Markdown.
//!
//! Each pass is a function from document text to document text. A
//! [`Pipeline`] sniffs the dialect of a document and runs the passes in a
//! fixed order:
//!
//! 1. [`transclude::resolve`] inlines external code samples,
//! 2. [`code_blocks::normalize`] rewrites code blocks as fenced blocks,
//! 3. [`headers::move_header_attributes`] moves attribute lines onto headers,
//! 4. [`headers::strip_special_directive_lines`] drops book-structure markers.

pub mod attributes;
pub mod code_blocks;
pub mod headers;
pub mod rewrite;
pub mod transclude;

use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("Unresolved transclusion {path}: {source}")]
    UnresolvedTransclusion {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Source markup dialect of a manuscript file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Markua,
    /// Leanpub-flavoured Markdown.
    Lfm,
}

impl Dialect {
    /// Guess the dialect of `text`. A bare closing fence (a line holding only
    /// three backticks) means Markua; anything else is treated as LFM.
    pub fn detect(text: &str) -> Self {
        static BARE_FENCE: OnceLock<Regex> = OnceLock::new();
        let bare_fence = BARE_FENCE
            .get_or_init(|| Regex::new(r"(?m)^```[ \t]*\r?$").expect("Invalid bare fence regex"));

        if bare_fence.is_match(text) {
            Dialect::Markua
        } else {
            Dialect::Lfm
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Markua => write!(f, "Markua"),
            Dialect::Lfm => write!(f, "LFM"),
        }
    }
}

/// The four delete/insert marker tokens of one dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerVocabulary {
    pub start_delete: String,
    pub end_delete: String,
    pub start_insert: String,
    pub end_insert: String,
}

impl MarkerVocabulary {
    /// Markers spelled `<prefix>-start-delete`, `<prefix>-end-delete` and so on.
    pub fn new(prefix: &str) -> Self {
        Self {
            start_delete: format!("{prefix}-start-delete"),
            end_delete: format!("{prefix}-end-delete"),
            start_insert: format!("{prefix}-start-insert"),
            end_insert: format!("{prefix}-end-insert"),
        }
    }

    pub fn markua() -> Self {
        Self::new("markua")
    }

    pub fn lfm() -> Self {
        Self::new("leanpub")
    }
}

/// Everything a pipeline run needs to know about its surroundings.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Base directory that transclusion paths are resolved against.
    pub resources_dir: PathBuf,
    pub markua_markers: MarkerVocabulary,
    pub lfm_markers: MarkerVocabulary,
}

impl PipelineConfig {
    pub fn new(resources_dir: impl Into<PathBuf>) -> Self {
        Self {
            resources_dir: resources_dir.into(),
            markua_markers: MarkerVocabulary::markua(),
            lfm_markers: MarkerVocabulary::lfm(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Convert one document, sniffing its dialect.
    pub fn convert(&self, text: &str) -> Result<String, ConversionError> {
        self.convert_as(text, Dialect::detect(text))
    }

    /// Convert one document written in `dialect`. CRLF line endings are
    /// converted to LF first.
    pub fn convert_as(&self, text: &str, dialect: Dialect) -> Result<String, ConversionError> {
        log::debug!("Converting {} document ({} bytes)", dialect, text.len());
        let text = text.replace("\r\n", "\n");
        let markers = match dialect {
            Dialect::Markua => &self.config.markua_markers,
            Dialect::Lfm => &self.config.lfm_markers,
        };

        let text = transclude::resolve(&text, dialect, &self.config.resources_dir)?;
        let text = code_blocks::normalize(&text, dialect, markers);
        let text = headers::move_header_attributes(&text);
        Ok(headers::strip_special_directive_lines(&text))
    }
}

/// Convert one document with default marker vocabularies.
pub fn convert(text: &str, resources_dir: &Path) -> Result<String, ConversionError> {
    Pipeline::new(PipelineConfig::new(resources_dir)).convert(text)
}
