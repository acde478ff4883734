//! Rebuild sections and lectures from a flattened, annotated document.
//!
//! The document carries standalone marker lines, usually wrapped in a
//! comment, e.g. `<!-- begin-section title="Charts" -->`. Markers are found
//! by substring so the wrapper syntax does not matter.

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{Book, Lecture, Section};

const BEGIN_SECTION: &str = "begin-section";
const END_SECTION: &str = "end-section";
const BEGIN_LECTURE: &str = "begin-lecture";
const END_LECTURE: &str = "end-lecture";

/// Where the splitter is in the two-level structure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SplitState {
    #[default]
    Idle,
    InSection(Section),
    InSectionAndLecture(Section, Lecture),
}

/// Advance the state machine by one line, emitting a section when its
/// `end-section` marker is seen.
///
/// Lines outside an open lecture that are not the expected marker are
/// dropped. Inside a lecture every line except `end-lecture` is content,
/// including stray section markers.
pub fn transition(state: SplitState, line: &str) -> (SplitState, Option<Section>) {
    match state {
        SplitState::InSectionAndLecture(mut section, lecture) if line.contains(END_LECTURE) => {
            section.lectures.push(lecture);
            (SplitState::InSection(section), None)
        }
        SplitState::InSectionAndLecture(section, mut lecture) => {
            lecture.lecture_lines.push(line.to_string());
            (SplitState::InSectionAndLecture(section, lecture), None)
        }
        SplitState::InSection(section) if line.contains(END_SECTION) => {
            (SplitState::Idle, Some(section))
        }
        SplitState::InSection(section) if line.contains(BEGIN_LECTURE) => {
            let lecture = Lecture::new(marker_title(line));
            (SplitState::InSectionAndLecture(section, lecture), None)
        }
        SplitState::Idle if line.contains(BEGIN_SECTION) => {
            (SplitState::InSection(Section::new(marker_title(line))), None)
        }
        state => (state, None),
    }
}

/// Title from a `title="..."` attribute on a marker line, empty if absent.
fn marker_title(line: &str) -> String {
    static TITLE: OnceLock<Regex> = OnceLock::new();
    let title = TITLE.get_or_init(|| Regex::new(r#"title="(.*)""#).expect("Invalid title regex"));

    title
        .captures(line)
        .map(|caps| caps[1].to_string())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Default)]
pub struct Splitter {
    dedent: bool,
}

impl Splitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove one leading 4-space indent from every line before splitting.
    pub fn dedent(mut self, dedent: bool) -> Self {
        self.dedent = dedent;
        self
    }

    pub fn split(&self, text: &str) -> Book {
        let mut state = SplitState::Idle;
        let mut book = Book::default();

        for line in text.lines() {
            let line = if self.dedent {
                line.strip_prefix("    ").unwrap_or(line)
            } else {
                line
            };

            let (next, emitted) = transition(state, line);
            state = next;
            if let Some(section) = emitted {
                log::trace!(
                    "Closed section {:?} with {} lectures",
                    section.section_title,
                    section.lectures.len()
                );
                book.sections.push(section);
            }
        }

        match state {
            SplitState::Idle => {}
            SplitState::InSection(section) => {
                log::warn!("Dropping unterminated section {:?}", section.section_title);
            }
            SplitState::InSectionAndLecture(section, lecture) => {
                log::warn!(
                    "Dropping unterminated lecture {:?} in section {:?}",
                    lecture.lecture_title,
                    section.section_title
                );
            }
        }

        log::debug!("Split document into {} sections", book.sections.len());
        book
    }
}

/// Split with default settings.
pub fn split(text: &str) -> Book {
    Splitter::new().split(text)
}
