pub mod book;
pub mod manuscript_file;

pub use book::{Book, Lecture, LectureFile, Section};
pub use manuscript_file::{ManuscriptFile, parse_manifest};
