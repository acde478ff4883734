//! Rewrites dialect code blocks into Pandoc fenced blocks.
//!
//! Markua:
//!
//! ````text
//! {caption: "Hi", format: javascript}
//! ```
//! console.log(1)
//! ```
//! ````
//!
//! Leanpub-flavoured Markdown uses an optional attribute line followed by
//! 4-space indented lines. Both become
//!
//! ````text
//! ``` {.javascript caption="Hi"}
//! console.log(1)
//! ```
//! ````

use regex::{Captures, Regex};
use std::sync::OnceLock;

use super::attributes::{AttributeSet, Separator};
use super::rewrite::{replace_blocks_with, standalone};
use super::{Dialect, MarkerVocabulary};

const START_DELETE: &str = "Delete the line(s) between here...";
const END_DELETE: &str = "...and here.";
const START_INSERT: &str = "Insert the line(s) between here...";
const END_INSERT: &str = "...and here.";

/// Language tags allowed in LFM source and the Pandoc class each maps to.
const LFM_LANGUAGES: &[(&str, &str)] = &[
    ("json", "json"),
    ("jsx", "javascript"),
    ("js", "javascript"),
    ("less", "css"),
];

fn markua_block_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(
            r"(?P<lead>\A|\n\n)\{(?P<attrs>[^\n]+)\}\n```(?P<lang>[^\n]*)\n(?P<code>(?s:.*?))\n```(?P<tail>\n\n|\n?\z)",
        )
        .expect("Invalid Markua code block regex")
    })
}

fn lfm_block_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(
            r"(?P<lead>\A|\n\n)(?:\{(?P<attrs>[^\n]*)\}\n)?(?P<code>(?: {4}(?s:.*?)(?:\n\n {4}(?s:.*?))?)+)(?P<tail>\n\n|\n?\z)",
        )
        .expect("Invalid LFM code block regex")
    })
}

/// Normalize every conforming code block of `dialect` in `text`. Blocks that
/// do not match the expected shape are left untouched.
pub fn normalize(text: &str, dialect: Dialect, markers: &MarkerVocabulary) -> String {
    match dialect {
        Dialect::Markua => replace_blocks_with(markua_block_regex(), text, |caps| {
            render_markua(caps, markers)
        }),
        Dialect::Lfm => replace_blocks_with(lfm_block_regex(), text, |caps| {
            render_lfm(caps, markers)
        }),
    }
}

fn render_markua(caps: &Captures, markers: &MarkerVocabulary) -> String {
    let mut attrs = AttributeSet::parse(&caps["attrs"], Separator::Colon);
    let fence_language = caps["lang"].trim();
    let language = if fence_language.is_empty() {
        attrs.take("format")
    } else {
        Some(fence_language.to_string())
    };

    let code = expand_markers(&caps["code"], markers);
    log::debug!("Normalizing Markua code block (language: {language:?})");
    standalone(caps, &render_fence(&mut attrs, language.as_deref(), &code))
}

fn render_lfm(caps: &Captures, markers: &MarkerVocabulary) -> String {
    let mut attrs = caps
        .name("attrs")
        .map(|m| AttributeSet::parse(m.as_str(), Separator::Equals))
        .unwrap_or_default();
    let language = attrs.take("lang").and_then(|tag| lfm_language(&tag));

    let code = caps["code"]
        .split('\n')
        .map(unindent)
        .collect::<Vec<_>>()
        .join("\n");
    let code = expand_markers(&code, markers);
    log::debug!("Normalizing LFM code block (language: {language:?})");
    standalone(caps, &render_fence(&mut attrs, language, &code))
}

/// Map an LFM language tag onto a Pandoc class. Unknown tags have no class.
pub fn lfm_language(tag: &str) -> Option<&'static str> {
    LFM_LANGUAGES
        .iter()
        .find(|(source, _)| *source == tag)
        .map(|(_, target)| *target)
}

fn render_fence(attrs: &mut AttributeSet, language: Option<&str>, code: &str) -> String {
    let mut annotation = Vec::new();
    if let Some(id) = attrs.take_id() {
        annotation.push(format!("#{id}"));
    }
    if let Some(language) = language {
        annotation.push(format!(".{language}"));
    }
    if let Some(caption) = attrs.take("caption").or_else(|| attrs.take("title")) {
        annotation.push(format!("caption=\"{caption}\""));
    }

    let annotation = if annotation.is_empty() {
        String::new()
    } else {
        format!(" {{{}}}", annotation.join(" "))
    };

    let replacement = format!("```{annotation}\n{code}\n```");
    log::trace!("Code block replacement: {replacement:?}");
    replacement
}

/// Replace delete/insert markers with the sentences readers see.
pub fn expand_markers(code: &str, markers: &MarkerVocabulary) -> String {
    code.replace(&markers.start_delete, START_DELETE)
        .replace(&markers.end_delete, END_DELETE)
        .replace(&markers.start_insert, START_INSERT)
        .replace(&markers.end_insert, END_INSERT)
}

/// Drop the 4-space code indent (fewer on short or blank lines).
fn unindent(line: &str) -> &str {
    let spaces = line.bytes().take(4).take_while(|b| *b == b' ').count();
    &line[spaces..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn markua(text: &str) -> String {
        normalize(text, Dialect::Markua, &MarkerVocabulary::markua())
    }

    fn lfm(text: &str) -> String {
        normalize(text, Dialect::Lfm, &MarkerVocabulary::lfm())
    }

    #[test]
    fn markua_block_with_caption_and_format() {
        let input = "{caption: \"Hi\", format: javascript}\n```\nconsole.log(1)\n```\n";

        let output = markua(input);

        assert_eq!(
            output,
            "\n\n``` {.javascript caption=\"Hi\"}\nconsole.log(1)\n```\n\n"
        );
        assert!(!output.contains("caption:"));
    }

    #[test]
    fn markua_fence_language_beats_format_attribute() {
        let input = "Text\n\n{format: ruby}\n```python\nprint(1)\n```\n\nMore";

        assert_eq!(markua(input), "Text\n\n``` {.python}\nprint(1)\n```\n\nMore");
    }

    #[test]
    fn markua_id_comes_first() {
        let input = "{caption: \"Loader\", #loader, format: js}\n```\nload()\n```";

        assert_eq!(
            markua(input),
            "\n\n``` {#loader .js caption=\"Loader\"}\nload()\n```\n\n"
        );
    }

    #[test]
    fn markua_annotation_omitted_when_nothing_survives() {
        let input = "{line-numbers: false}\n```\nx\n```";
        assert_eq!(markua(input), "\n\n```\nx\n```\n\n");
    }

    #[test]
    fn markua_block_without_attribute_line_is_untouched() {
        let input = "Intro\n\n```js\nx()\n```\n\nOutro";
        assert_eq!(markua(input), input);
    }

    #[test]
    fn markua_body_is_not_reparsed() {
        let input = "{format: md}\n```\n{caption: \"nested\"}\n# Not a header\n```";

        assert_eq!(
            markua(input),
            "\n\n``` {.md}\n{caption: \"nested\"}\n# Not a header\n```\n\n"
        );
    }

    #[test]
    fn two_markua_blocks_separated_by_one_blank_line() {
        let input = "{format: js}\n```\na\n```\n\n{format: css}\n```\nb\n```\n";

        assert_eq!(
            markua(input),
            "\n\n``` {.js}\na\n```\n\n``` {.css}\nb\n```\n\n"
        );
    }

    #[test]
    fn markua_markers_are_expanded() {
        let input = "{format: js}\n```\nmarkua-start-delete\nold()\nmarkua-end-delete\nmarkua-start-insert\nnew()\nmarkua-end-insert\n```";

        let output = markua(input);

        assert_eq!(
            output,
            "\n\n``` {.js}\nDelete the line(s) between here...\nold()\n...and here.\nInsert the line(s) between here...\nnew()\n...and here.\n```\n\n"
        );
        assert!(!output.contains("markua-"));
    }

    #[test]
    fn markua_pass_ignores_leanpub_markers() {
        let input = "{format: js}\n```\nleanpub-start-insert\n```";
        assert_eq!(markua(input), "\n\n``` {.js}\nleanpub-start-insert\n```\n\n");
    }

    #[test]
    fn lfm_indented_block_is_fenced_and_unindented() {
        let input = "Some text\n\n{lang=jsx, title=\"App\"}\n    <App />\n      nested\n\nAfter";

        assert_eq!(
            lfm(input),
            "Some text\n\n``` {.javascript caption=\"App\"}\n<App />\n  nested\n```\n\nAfter"
        );
    }

    #[test]
    fn lfm_block_keeps_inner_blank_lines() {
        let input = "Intro\n\n    first()\n\n    second()\n\nOutro";

        assert_eq!(lfm(input), "Intro\n\n```\nfirst()\n\nsecond()\n```\n\nOutro");
    }

    #[test]
    fn lfm_markers_are_expanded() {
        let input = "Intro\n\n{lang=js}\n    leanpub-start-insert\n    add()\n    leanpub-end-insert\n";

        let output = lfm(input);

        assert_eq!(
            output,
            "Intro\n\n``` {.javascript}\nInsert the line(s) between here...\nadd()\n...and here.\n```\n\n"
        );
        assert!(!output.contains("leanpub-"));
    }

    #[rstest]
    #[case("json", Some("json"))]
    #[case("jsx", Some("javascript"))]
    #[case("js", Some("javascript"))]
    #[case("less", Some("css"))]
    #[case("ruby", None)]
    #[case("", None)]
    fn lfm_language_table(#[case] tag: &str, #[case] expected: Option<&str>) {
        assert_eq!(lfm_language(tag), expected);
    }

    #[test]
    fn lfm_unknown_language_is_silently_omitted() {
        let input = "Intro\n\n{lang=ruby, #sample}\n    puts 1\n\nOutro";
        assert_eq!(lfm(input), "Intro\n\n``` {#sample}\nputs 1\n```\n\nOutro");
    }

    #[test]
    fn unindent_strips_at_most_four_spaces() {
        assert_eq!(unindent("      six"), "  six");
        assert_eq!(unindent("  two"), "two");
        assert_eq!(unindent(""), "");
    }
}
