use regex::{Captures, Regex};
use std::convert::Infallible;

/// Replace every block matched by `regex`, like [`Regex::replace_all`], but
/// with a fallible renderer.
///
/// Patterns must have a `tail` group for the blank line (or end of input)
/// that closes a block. The tail is left in the input so it can open the
/// next block; renderers must not emit it.
pub fn replace_blocks<E>(
    regex: &Regex,
    text: &str,
    mut render: impl FnMut(&Captures) -> Result<String, E>,
) -> Result<String, E> {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;

    while pos <= text.len() {
        let Some((caps, whole)) = regex
            .captures_at(text, pos)
            .and_then(|caps| caps.get(0).map(|whole| (caps, whole)))
        else {
            break;
        };
        let resume = caps.name("tail").map_or(whole.end(), |tail| tail.start());

        out.push_str(&text[pos..whole.start()]);
        out.push_str(&render(&caps)?);

        if resume <= whole.start() {
            // Zero-width block; step over one char so the scan advances.
            let step = text[whole.start()..].chars().next().map_or(1, char::len_utf8);
            out.push_str(&text[whole.start()..(whole.start() + step).min(text.len())]);
            pos = whole.start() + step;
        } else {
            pos = resume;
        }
    }

    if pos < text.len() {
        out.push_str(&text[pos..]);
    }
    Ok(out)
}

/// Infallible form of [`replace_blocks`].
pub fn replace_blocks_with(
    regex: &Regex,
    text: &str,
    mut render: impl FnMut(&Captures) -> String,
) -> String {
    match replace_blocks::<Infallible>(regex, text, |caps| Ok(render(caps))) {
        Ok(out) => out,
        Err(never) => match never {},
    }
}

/// Wrap a rendered block in blank lines, replacing the captured `lead` and
/// topping the `tail` up to a full blank line at the end of the document.
pub fn standalone(caps: &Captures, block: &str) -> String {
    let tail = caps.name("tail").map_or("", |m| m.as_str());
    let padding = BLANK_LINE.get(tail.len()..).unwrap_or("");
    format!("{BLANK_LINE}{block}{padding}")
}

const BLANK_LINE: &str = "\n\n";

/// Leading separator captured as `lead`: empty at the start of the document,
/// the blank line otherwise.
pub fn lead<'t>(caps: &Captures<'t>) -> &'t str {
    caps.name("lead").map_or("", |m| m.as_str())
}
