//! Inlines external code samples in place of transclusion directives.
//!
//! Markua:
//!
//! ```text
//! {crop-start: 5, crop-end: 48, format: javascript, line-numbers: false}
//! ![Data parsing functions](code_samples/es6v2/DataHandling.js)
//! ```
//!
//! Leanpub-flavoured Markdown:
//!
//! ```text
//! {crop-start-line=4,crop-end-line=17,linenos=on,starting-line-number=19}
//! <<[Add LESS loaders](code_samples/env/webpack.config.dev.js)
//! ```
//!
//! The result is a code block in the same dialect, left for
//! [`code_blocks`](super::code_blocks) to normalize.

use regex::{Captures, Regex};
use relative_path::RelativePath;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use super::ConversionError;
use super::Dialect;
use super::attributes::{AttributeSet, Separator};
use super::rewrite::{replace_blocks, standalone};

fn markua_directive_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(
            r"(?P<lead>\A|\n\n)(?:\{(?P<attrs>[^\n]*)\}\n)?!\[(?P<caption>[^\n]*)\]\((?P<path>code_samples[^\n]+)\)(?P<tail>\n\n|\n?\z)",
        )
        .expect("Invalid Markua transclusion regex")
    })
}

fn lfm_directive_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(
            r"(?P<lead>\A|\n\n)(?:\{(?P<attrs>[^\n]*)\}\n)?<<\[(?P<caption>[^\n]*)\]\((?P<path>[^\n]+)\)(?P<tail>\n\n|\n?\z)",
        )
        .expect("Invalid LFM transclusion regex")
    })
}

/// Dialect-specific spelling of a transclusion.
struct Syntax {
    separator: Separator,
    caption_key: &'static str,
    crop_start_key: &'static str,
    crop_end_key: &'static str,
    indent: bool,
}

impl Syntax {
    fn of(dialect: Dialect) -> Self {
        match dialect {
            Dialect::Markua => Syntax {
                separator: Separator::Colon,
                caption_key: "caption",
                crop_start_key: "crop-start",
                crop_end_key: "crop-end",
                indent: false,
            },
            Dialect::Lfm => Syntax {
                separator: Separator::Equals,
                caption_key: "title",
                crop_start_key: "crop-start-line",
                crop_end_key: "crop-end-line",
                indent: true,
            },
        }
    }

    fn render_caption(&self, caption: &str) -> String {
        match self.separator {
            Separator::Colon => format!("{}: \"{caption}\"", self.caption_key),
            Separator::Equals => format!("{}=\"{caption}\"", self.caption_key),
        }
    }
}

/// A transclusion directive after its attributes have been read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscludeDirective {
    pub path: String,
    pub caption: Option<String>,
    pub id: Option<String>,
    pub crop_start: Option<usize>,
    pub crop_end: Option<usize>,
    /// Attributes forwarded untouched to the code block.
    pub passthrough: AttributeSet,
}

impl TranscludeDirective {
    fn from_captures(caps: &Captures, syntax: &Syntax) -> Self {
        let mut attrs = caps
            .name("attrs")
            .map(|m| AttributeSet::parse(m.as_str(), syntax.separator))
            .unwrap_or_default();

        let literal_caption = caps["caption"].trim_matches(|c: char| c == '"' || c == ' ');
        let attribute_caption = attrs.take(syntax.caption_key);
        let caption = if literal_caption.is_empty() {
            attribute_caption
        } else {
            Some(literal_caption.to_string())
        };

        let id = attrs.take_id();
        let crop_start = attrs.take(syntax.crop_start_key).and_then(parse_bound);
        let crop_end = attrs.take(syntax.crop_end_key).and_then(parse_bound);

        Self {
            path: caps["path"].trim().to_string(),
            caption,
            id,
            crop_start,
            crop_end,
            passthrough: attrs,
        }
    }
}

/// Crop bounds are 1-indexed; zero or non-numeric means "not given".
fn parse_bound(raw: String) -> Option<usize> {
    raw.trim().parse::<usize>().ok().filter(|n| *n > 0)
}

/// Select the inclusive, 1-indexed line window `[start, end]` from `body`.
/// A missing start is line 1, a missing end is the last line.
pub fn crop_lines(body: &str, start: Option<usize>, end: Option<usize>) -> Vec<&str> {
    let lines: Vec<&str> = body.lines().collect();
    let from = start.map_or(0, |n| n - 1).min(lines.len());
    let to = end.unwrap_or(lines.len()).min(lines.len());
    if from >= to {
        return Vec::new();
    }
    lines[from..to].to_vec()
}

/// Replace every transclusion directive of `dialect` with the referenced
/// code sample read from `resources_dir`.
///
/// A sample that cannot be read aborts the whole document.
pub fn resolve(text: &str, dialect: Dialect, resources_dir: &Path) -> Result<String, ConversionError> {
    let syntax = Syntax::of(dialect);
    let regex = match dialect {
        Dialect::Markua => markua_directive_regex(),
        Dialect::Lfm => lfm_directive_regex(),
    };

    replace_blocks(regex, text, |caps| {
        let directive = TranscludeDirective::from_captures(caps, &syntax);
        let sample = read_sample(&directive.path, resources_dir)?;
        Ok(standalone(caps, &render(&directive, &sample, &syntax)))
    })
}

fn read_sample(relative_path: &str, resources_dir: &Path) -> Result<String, ConversionError> {
    let absolute_path = RelativePath::new(relative_path).to_path(resources_dir);
    log::debug!("Transcluding {}", absolute_path.display());
    fs::read_to_string(&absolute_path).map_err(|source| ConversionError::UnresolvedTransclusion {
        path: absolute_path,
        source,
    })
}

fn render(directive: &TranscludeDirective, sample: &str, syntax: &Syntax) -> String {
    let mut attributes = Vec::new();
    if let Some(id) = &directive.id {
        attributes.push(format!("#{id}"));
    }
    if let Some(caption) = &directive.caption {
        attributes.push(syntax.render_caption(caption));
    }
    attributes.extend(directive.passthrough.render_pairs(syntax.separator));

    let attribute_line = if attributes.is_empty() {
        String::new()
    } else {
        format!("{{{}}}\n", attributes.join(", "))
    };

    let lines = crop_lines(sample, directive.crop_start, directive.crop_end);
    log::debug!(
        "Cropped {} to {} line(s) ({:?}..={:?})",
        directive.path,
        lines.len(),
        directive.crop_start,
        directive.crop_end
    );

    if syntax.indent {
        // An empty window still needs one indented line to read as a code block
        let code = if lines.is_empty() {
            "    ".to_string()
        } else {
            lines
                .iter()
                .map(|line| format!("    {line}"))
                .collect::<Vec<_>>()
                .join("\n")
        };
        format!("{attribute_line}{code}")
    } else {
        let code = lines.join("\n");
        format!("{attribute_line}```\n{code}\n```")
    }
}
