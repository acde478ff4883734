use relative_path::RelativePathBuf;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sections and lectures rebuilt from an annotated document.
///
/// Serialises as `{ "sections": [ { "sectionTitle", "lectures": [ { "lectureTitle", "lectureLines" } ] } ] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub section_title: String,
    pub lectures: Vec<Lecture>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lecture {
    pub lecture_title: String,
    pub lecture_lines: Vec<String>,
}

/// One per-lecture output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LectureFile {
    pub relative_path: RelativePathBuf,
    pub contents: String,
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            section_title: title.into(),
            lectures: Vec::new(),
        }
    }
}

impl Lecture {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            lecture_title: title.into(),
            lecture_lines: Vec::new(),
        }
    }
}

impl Book {
    /// Number of lectures in each section, in order.
    pub fn lecture_counts(&self) -> Vec<usize> {
        self.sections.iter().map(|s| s.lectures.len()).collect()
    }

    /// Overwrite the `sections` key of previously persisted book metadata,
    /// keeping every other key. Anything that is not a JSON object is
    /// replaced by a fresh object.
    pub fn merge_into(&self, existing: Value) -> Result<Value, serde_json::Error> {
        let mut object = match existing {
            Value::Object(object) => object,
            _ => Map::new(),
        };
        object.insert("sections".to_string(), serde_json::to_value(&self.sections)?);
        Ok(Value::Object(object))
    }

    /// Lay the book out as one file per lecture:
    /// `sNN/sNNeMM - <title><extension>`.
    ///
    /// `NN` is the section index and `MM` counts lectures across the whole
    /// book, both from zero.
    pub fn lecture_files(&self, extension: &str) -> Vec<LectureFile> {
        let mut files = Vec::new();
        let mut lecture_index = 0;

        for (section_index, section) in self.sections.iter().enumerate() {
            let section_dir = format!("s{section_index:02}");
            for lecture in &section.lectures {
                let file_name = format!(
                    "s{section_index:02}e{lecture_index:02} - {}{extension}",
                    sanitize_file_name(&lecture.lecture_title)
                );
                files.push(LectureFile {
                    relative_path: RelativePathBuf::from(section_dir.as_str()).join(file_name.as_str()),
                    contents: lecture.lecture_lines.join("\n"),
                });
                lecture_index += 1;
            }
        }

        files
    }
}

/// Titles are free text; keep them out of the directory structure.
fn sanitize_file_name(title: &str) -> String {
    title.replace(['/', '\\'], "-")
}
