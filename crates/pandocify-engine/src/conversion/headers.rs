use regex::Regex;
use std::sync::OnceLock;

use super::rewrite::{lead, replace_blocks_with};

fn header_attribute_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"(?P<lead>\A|\n\n)(?P<attrs>\{[^\n]*\})\n(?P<header>#+[^\n]*)(?P<tail>\n\n|\n?\z)")
            .expect("Invalid header attribute regex")
    })
}

fn special_directive_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"(?m)^\{(?:frontmatter|pagebreak|mainmatter|backmatter)\}[ \t]*(?:\r?\n|\z)")
            .expect("Invalid special directive regex")
    })
}

/// Move a standalone attribute line onto the header below it.
///
/// ```text
/// {#animating-react-redux}
/// # Animating with React, Redux, and d3
/// ```
///
/// becomes `# Animating with React, Redux, and d3 {#animating-react-redux}`.
/// Both dialects share this syntax.
pub fn move_header_attributes(text: &str) -> String {
    replace_blocks_with(header_attribute_regex(), text, |caps| {
        let header = caps["header"].trim_end_matches([' ', '#']);
        log::debug!("Moving {} onto header {header:?}", &caps["attrs"]);
        format!("{}{header} {}", lead(caps), &caps["attrs"])
    })
}

/// Delete `{frontmatter}`, `{pagebreak}`, `{mainmatter}` and `{backmatter}`
/// lines.
pub fn strip_special_directive_lines(text: &str) -> String {
    special_directive_regex().replace_all(text, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn attributes_move_onto_header() {
        let input = "{#animating-react-redux}\n# Animating with React, Redux, and d3\n\nBody text";

        assert_eq!(
            move_header_attributes(input),
            "# Animating with React, Redux, and d3 {#animating-react-redux}\n\nBody text"
        );
    }

    #[test]
    fn closing_hashes_are_trimmed() {
        let input = "Intro\n\n{#setup}\n## Setup ##\n";

        assert_eq!(move_header_attributes(input), "Intro\n\n## Setup {#setup}\n");
    }

    #[test]
    fn attribute_line_before_paragraph_is_untouched() {
        let input = "Intro\n\n{#not-a-header}\nJust text\n\nMore";
        assert_eq!(move_header_attributes(input), input);
    }

    #[test]
    fn attribute_line_needs_a_blank_line_before_it() {
        let input = "Intro\n{#x}\n# Header\n\nMore";
        assert_eq!(move_header_attributes(input), input);
    }

    #[test]
    fn consecutive_headers_are_all_rewritten() {
        let input = "{#one}\n# One\n\n{#two}\n## Two\n\n{#three}\n### Three";

        assert_eq!(
            move_header_attributes(input),
            "# One {#one}\n\n## Two {#two}\n\n### Three {#three}"
        );
    }

    #[test]
    fn moving_is_idempotent() {
        let input = "{#one}\n# One\n\nText\n\n{#two, class: wide}\n## Two ##\n\n{#three}\nnot a header\n";

        let once = move_header_attributes(input);
        let twice = move_header_attributes(&once);

        assert_eq!(twice, once);
    }

    #[rstest]
    #[case("frontmatter")]
    #[case("pagebreak")]
    #[case("mainmatter")]
    #[case("backmatter")]
    fn special_directive_lines_are_removed(#[case] name: &str) {
        let input = format!("Before\n\n{{{name}}}\n\nAfter");

        assert_eq!(strip_special_directive_lines(&input), "Before\n\n\nAfter");
    }

    #[test]
    fn special_directive_at_document_edges() {
        assert_eq!(
            strip_special_directive_lines("{frontmatter}\n# Preface\n\nText\n{backmatter}"),
            "# Preface\n\nText\n"
        );
    }

    #[test]
    fn directive_names_inside_text_are_kept() {
        let input = "See {pagebreak} here\n{pagebreaks}\n  {mainmatter}";
        assert_eq!(strip_special_directive_lines(input), input);
    }
}
