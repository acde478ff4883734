use indexmap::IndexMap;
use regex::Regex;
use std::sync::OnceLock;

/// Key/value separator used inside an attribute list.
///
/// Markua writes `{caption: "Hi", format: javascript}`, Leanpub-flavoured
/// Markdown writes `{caption=Hi, lang=js}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    Colon,
    Equals,
}

impl Separator {
    pub fn as_char(self) -> char {
        match self {
            Separator::Colon => ':',
            Separator::Equals => '=',
        }
    }
}

/// Attributes parsed from a `{...}` line.
///
/// Keys keep the order they were first seen in. A repeated key overwrites the
/// earlier value but keeps the earlier position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeSet {
    id: Option<String>,
    pairs: IndexMap<String, String>,
}

impl AttributeSet {
    /// Parse an attribute list. Surrounding braces are optional.
    ///
    /// This never fails: chunks that are not `#id` or `key<sep>value` with a
    /// non-empty key and value are dropped.
    pub fn parse(raw: &str, separator: Separator) -> Self {
        static CHUNK_REGEX: OnceLock<Regex> = OnceLock::new();
        static ID_REGEX: OnceLock<Regex> = OnceLock::new();
        let chunk_regex = CHUNK_REGEX
            .get_or_init(|| Regex::new(r#"(?:[^,"]|"[^"]*")+"#).expect("Invalid chunk regex"));
        let id_regex =
            ID_REGEX.get_or_init(|| Regex::new(r"^#([\w-]+)$").expect("Invalid id regex"));

        let inner = raw.trim().trim_matches(['{', '}']);
        let mut attributes = Self::default();

        for chunk in chunk_regex.find_iter(inner) {
            let chunk = chunk.as_str().trim();
            if chunk.is_empty() {
                continue;
            }

            if let Some(caps) = id_regex.captures(chunk) {
                attributes.id = Some(caps[1].to_string());
                continue;
            }

            let Some((key, value)) = chunk.split_once(separator.as_char()) else {
                continue;
            };
            attributes.insert(key, value);
        }

        attributes
    }

    /// Insert a pair after trimming spaces and double quotes. Empty keys or
    /// values are ignored.
    pub fn insert(&mut self, key: &str, value: &str) {
        let key = trim_value(key);
        let value = trim_value(value);
        if key.is_empty() || value.is_empty() {
            return;
        }
        self.pairs.insert(key.to_string(), value.to_string());
    }

    /// The `#id` chunk, if one was present.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.get(key).map(String::as_str)
    }

    /// Remove a key, keeping the order of the remaining pairs.
    pub fn take(&mut self, key: &str) -> Option<String> {
        self.pairs.shift_remove(key)
    }

    /// Remove and return the identifier. An inline `#id` wins over an `id`
    /// attribute; both are consumed.
    pub fn take_id(&mut self) -> Option<String> {
        let attribute = self.take("id");
        self.id.take().or(attribute)
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render the remaining pairs in `key<sep>value` form, in order.
    pub fn render_pairs(&self, separator: Separator) -> Vec<String> {
        self.iter()
            .map(|(key, value)| render_pair(key, value, separator))
            .collect()
    }

    /// Render the whole set back to a `{...}` list that [`AttributeSet::parse`]
    /// reads into an equal set.
    pub fn to_attribute_list(&self, separator: Separator) -> String {
        let mut chunks = Vec::with_capacity(self.pairs.len() + 1);
        if let Some(id) = &self.id {
            chunks.push(format!("#{id}"));
        }
        chunks.extend(self.render_pairs(separator));
        format!("{{{}}}", chunks.join(", "))
    }
}

fn trim_value(s: &str) -> &str {
    s.trim_matches(|c: char| c == '"' || c.is_whitespace())
}

fn render_pair(key: &str, value: &str, separator: Separator) -> String {
    let sep = separator.as_char();
    if value.contains(',') || value.contains(sep) {
        format!("{key}{sep}\"{value}\"")
    } else {
        format!("{key}{sep}{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn parses_markua_attributes() {
        let attrs = AttributeSet::parse(
            r#"{caption: "Hello", format: javascript}"#,
            Separator::Colon,
        );

        assert_eq!(attrs.get("caption"), Some("Hello"));
        assert_eq!(attrs.get("format"), Some("javascript"));
        assert_eq!(attrs.id(), None);
    }

    #[test]
    fn parses_lfm_attributes() {
        let attrs = AttributeSet::parse(
            "crop-start-line=4,crop-end-line=17,linenos=on",
            Separator::Equals,
        );

        let pairs: Vec<_> = attrs.iter().collect();
        assert_eq!(
            pairs,
            vec![
                ("crop-start-line", "4"),
                ("crop-end-line", "17"),
                ("linenos", "on")
            ]
        );
    }

    #[test]
    fn extracts_inline_id() {
        let attrs = AttributeSet::parse(r#"#intro, caption: "x""#, Separator::Colon);

        assert_eq!(attrs.id(), Some("intro"));
        assert_eq!(attrs.get("caption"), Some("x"));
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn hyphenated_id_is_kept_whole() {
        let attrs = AttributeSet::parse("{#animating-react-redux}", Separator::Colon);
        assert_eq!(attrs.id(), Some("animating-react-redux"));
        assert!(attrs.iter().next().is_none());
    }

    #[test]
    fn inline_id_wins_over_id_attribute() {
        let mut attrs = AttributeSet::parse("#inline, id: other", Separator::Colon);

        assert_eq!(attrs.take_id(), Some("inline".to_string()));
        assert_eq!(attrs.get("id"), None);
        assert!(attrs.is_empty());
    }

    #[test]
    fn quoted_values_may_contain_commas() {
        let attrs = AttributeSet::parse(
            r#"caption: "Parse, then render", format: js"#,
            Separator::Colon,
        );
        assert_eq!(attrs.get("caption"), Some("Parse, then render"));
        assert_eq!(attrs.get("format"), Some("js"));
    }

    #[rstest]
    #[case::no_separator("just words")]
    #[case::empty_value("caption:")]
    #[case::empty_key(": value")]
    #[case::only_commas(",,,")]
    #[case::unterminated_quote(r#"caption: "oops"#)]
    #[case::wrong_separator("lang=js")]
    fn malformed_chunks_are_dropped(#[case] raw: &str) {
        let attrs = AttributeSet::parse(raw, Separator::Colon);
        assert_eq!(attrs.len(), 0);
    }

    #[test]
    fn malformed_chunk_does_not_hide_valid_ones() {
        let attrs = AttributeSet::parse("garbage, format: ruby, :", Separator::Colon);
        let pairs: Vec<_> = attrs.iter().collect();
        assert_eq!(pairs, vec![("format", "ruby")]);
    }

    #[test]
    fn duplicate_key_last_value_wins_first_position_kept() {
        let attrs = AttributeSet::parse("a: 1, b: 2, a: 3", Separator::Colon);
        let pairs: Vec<_> = attrs.iter().collect();
        assert_eq!(pairs, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn take_preserves_order_of_remaining_pairs() {
        let mut attrs = AttributeSet::parse("a=1, b=2, c=3", Separator::Equals);
        assert_eq!(attrs.take("b"), Some("2".to_string()));
        assert_eq!(attrs.render_pairs(Separator::Equals), vec!["a=1", "c=3"]);
    }

    #[rstest]
    #[case(Separator::Colon, r#"{#sample, caption: "One, two", line-numbers: false, format: js}"#)]
    #[case(Separator::Equals, "{#sample, linenos=on, starting-line-number=19, lang=jsx}")]
    fn rendering_and_reparsing_is_stable(#[case] separator: Separator, #[case] raw: &str) {
        let parsed = AttributeSet::parse(raw, separator);

        let reparsed = AttributeSet::parse(&parsed.to_attribute_list(separator), separator);

        assert_eq!(reparsed, parsed);
    }
}
