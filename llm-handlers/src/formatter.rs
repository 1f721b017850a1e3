//! Reply formatting: translates the model's asterisk emphasis into Telegram
//! HTML. Two passes in fixed order: `**bold**` first, then `*italic*`, both
//! shortest-match. Unmatched markers stay literal.

use regex::Regex;
use std::sync::OnceLock;

fn bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*").expect("bold pattern"))
}

fn italic_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*(.+?)\*").expect("italic pattern"))
}

/// Produces HTML for Telegram's HTML parse mode. Escapes `&`, `<`, `>` before
/// the emphasis passes so model output cannot inject markup.
pub fn format(text: &str) -> String {
    let escaped = text
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    let bolded = bold_re().replace_all(&escaped, "<b>$1</b>");
    italic_re().replace_all(&bolded, "<i>$1</i>").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_and_italic() {
        assert_eq!(
            format("**bold** and *italic*"),
            "<b>bold</b> and <i>italic</i>"
        );
    }

    #[test]
    fn test_unclosed_markers_stay_literal() {
        assert_eq!(format("*unclosed"), "*unclosed");
        assert_eq!(format("a ** b"), "a ** b");
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(format("no markup here"), "no markup here");
    }

    #[test]
    fn test_bold_pass_consumes_double_markers_first() {
        // The bold span is matched as one unit; the italic pass then runs on
        // what remains inside it.
        assert_eq!(format("**a *b* c**"), "<b>a <i>b</i> c</b>");
    }

    #[test]
    fn test_multiple_spans_shortest_match() {
        assert_eq!(
            format("**one** mid **two**"),
            "<b>one</b> mid <b>two</b>"
        );
        assert_eq!(format("*a* and *b*"), "<i>a</i> and <i>b</i>");
    }

    #[test]
    fn test_html_is_escaped() {
        assert_eq!(format("1 < 2 & 3 > 2"), "1 &lt; 2 &amp; 3 &gt; 2");
        assert_eq!(format("**<tag>**"), "<b>&lt;tag&gt;</b>");
    }
}
