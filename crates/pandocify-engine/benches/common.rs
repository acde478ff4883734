// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_markua_chapter(size: usize) -> String {
    let base = "{#section}\n# Section\n\n{pagebreak}\n\nParagraph with some content.\n\n{caption: \"Example, with comma\", format: javascript}\n```\nconst x = 1;\nmarkua-start-delete\nconst y = 2;\nmarkua-end-delete\n```\n\n";
    base.repeat(size)
}

#[allow(dead_code)]
pub fn generate_lfm_chapter(size: usize) -> String {
    let base = "{#section}\n## Section\n\nParagraph with some content.\n\n{title=\"Example\", lang=jsx}\n    render(<App />);\n    leanpub-start-insert\n    update();\n    leanpub-end-insert\n\n";
    base.repeat(size)
}

#[allow(dead_code)]
pub fn generate_annotated_book(sections: usize, lectures: usize) -> String {
    let mut content = String::new();

    for section in 0..sections {
        content.push_str(&format!("<!-- begin-section title=\"Section {section}\" -->\n"));
        for lecture in 0..lectures {
            content.push_str(&format!("<!-- begin-lecture title=\"Lecture {lecture}\" -->\n"));
            content.push_str("<p>Some lecture content.</p>\n<pre><code>x()</code></pre>\n");
            content.push_str("<!-- end-lecture -->\n");
        }
        content.push_str("<!-- end-section -->\n");
    }

    content
}
