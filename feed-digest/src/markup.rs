//! HTML fragment to chat-markup conversion.
//!
//! Feed bodies use a small, known tag vocabulary, so the conversion is a fixed
//! sequence of regex rewrites rather than a DOM walk. Output dialect:
//! `**bold**`, `*italic*`, `<url|text>` links and blank-line paragraphs.

use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::warn;

// Private-use code points never produced by the other rules.
const LINK_OPEN: char = '\u{E000}';
const LINK_CLOSE: char = '\u{E001}';

static RULES: LazyLock<Option<Rules>> = LazyLock::new(|| match Rules::compile() {
    Ok(rules) => Some(rules),
    Err(e) => {
        warn!("Markup rules failed to compile, passing HTML through untouched: {}", e);
        None
    }
});

/// Rewrite an HTML fragment into chat-markup.
///
/// Never fails: unknown or unclosed tags are dropped, and if the rule set is
/// unavailable the input is returned as-is.
pub fn rewrite(html: &str) -> String {
    match RULES.as_ref() {
        Some(rules) => rules.apply(html),
        None => html.to_string(),
    }
}

struct Rules {
    anchor: Regex,
    strong: Regex,
    em: Regex,
    paragraph: Regex,
    line_break: Regex,
    any_tag: Regex,
    entity: Regex,
    separator: Regex,
    blank_lines: Regex,
    placeholder: Regex,
}

struct Link {
    url: String,
    text: String,
}

impl Rules {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            anchor: Regex::new(r#"<a href="([^"]+)"[^>]*>([^<]+)</a>"#)?,
            strong: Regex::new(r"(?s)<strong>(.*?)</strong>")?,
            em: Regex::new(r"(?s)<em>(.*?)</em>")?,
            paragraph: Regex::new(r"(?s)<p>(.*?)</p>")?,
            line_break: Regex::new(r"<br\s*/?>")?,
            any_tag: Regex::new(r"<[^>]+>")?,
            entity: Regex::new(r"&(amp|lt|gt|quot|apos|#39);")?,
            separator: Regex::new(r"\s*\|\s*")?,
            blank_lines: Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)*")?,
            placeholder: Regex::new(&format!("{}([0-9]+){}", LINK_OPEN, LINK_CLOSE))?,
        })
    }

    fn apply(&self, html: &str) -> String {
        if html.is_empty() {
            return String::new();
        }

        // Links are lifted out whole so no later rule can split target from text.
        let mut links = Vec::new();
        let text = self.anchor.replace_all(html, |caps: &Captures| {
            links.push(Link {
                url: caps[1].to_string(),
                text: caps[2].to_string(),
            });
            format!("{}{}{}", LINK_OPEN, links.len() - 1, LINK_CLOSE)
        });

        let text = self.strong.replace_all(&text, "**${1}**");
        let text = self.em.replace_all(&text, "*${1}*");
        let text = self
            .paragraph
            .replace_all(&text, |caps: &Captures| format!("{}\n\n", caps[1].trim()));
        let text = self.line_break.replace_all(&text, "\n");
        let text = self.any_tag.replace_all(&text, "");
        let text = self.decode_entities(&text, false);

        // Link markup is still opaque here, so only free-standing separators move.
        let text = self.separator.replace_all(&text, " | ");
        let text = self.blank_lines.replace_all(&text, "\n\n");

        let text = self.placeholder.replace_all(&text, |caps: &Captures| {
            let link = caps[1].parse::<usize>().ok().and_then(|i| links.get(i));
            match link {
                Some(link) => format!(
                    "<{}|{}>",
                    self.decode_entities(link.url.trim(), true),
                    self.decode_entities(link.text.trim(), true)
                ),
                None => caps[0].to_string(),
            }
        });

        text.trim().to_string()
    }

    /// Single pass, so `&amp;lt;` becomes `&lt;` rather than `<`.
    ///
    /// With `keep_angles`, `&lt;` and `&gt;` stay encoded; a bare `>` would end
    /// a `<url|text>` link early.
    fn decode_entities(&self, text: &str, keep_angles: bool) -> String {
        self.entity
            .replace_all(text, |caps: &Captures| match &caps[1] {
                "amp" => "&",
                "lt" if keep_angles => "&lt;",
                "gt" if keep_angles => "&gt;",
                "lt" => "<",
                "gt" => ">",
                "quot" => "\"",
                _ => "'",
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraphs_become_blank_line_separated() {
        assert_eq!(rewrite("<p>A</p><p>B</p>"), "A\n\nB");
        assert_eq!(
            rewrite("<p>これは段落です</p><p>これは2つ目の段落です</p>"),
            "これは段落です\n\nこれは2つ目の段落です"
        );
    }

    #[test]
    fn links_are_rewritten_atomically() {
        assert_eq!(
            rewrite(r#"<a href="https://x.com">T</a>"#),
            "<https://x.com|T>"
        );
        assert_eq!(
            rewrite(r#"こちらは<a href="https://example.com">リンク</a>です"#),
            "こちらは<https://example.com|リンク>です"
        );
    }

    #[test]
    fn links_next_to_other_tags_survive() {
        let html = r#"<p><strong>太字</strong>と<em>斜体</em>と<a href="https://test1.com">リンク1</a>と<a href="https://test2.com">リンク2</a></p>"#;
        assert_eq!(
            rewrite(html),
            "**太字**と*斜体*と<https://test1.com|リンク1>と<https://test2.com|リンク2>"
        );

        let html = r#"<strong>New</strong><a href="https://a.io" rel="nofollow">a.io</a><br/>"#;
        assert_eq!(rewrite(html), "**New**<https://a.io|a.io>");
    }

    #[test]
    fn angle_entities_stay_encoded_inside_links() {
        assert_eq!(
            rewrite(r#"<a href="https://x.com">a &gt; b</a>"#),
            "<https://x.com|a &gt; b>"
        );
        assert_eq!(
            rewrite(r#"<a href="https://x.com/?q=&lt;tag&gt;&amp;n=1">&lt;tag&gt; &amp; more</a>"#),
            "<https://x.com/?q=&lt;tag&gt;&n=1|&lt;tag&gt; & more>"
        );
        assert_eq!(rewrite("a &gt; b"), "a > b");
    }

    #[test]
    fn entities_decode_once() {
        assert_eq!(rewrite("&amp;と&lt;と&gt;と&quot;と&#39;"), "&と<と>と\"と'");
        assert_eq!(rewrite("&apos;quoted&apos;"), "'quoted'");
        assert_eq!(rewrite("&amp;lt;"), "&lt;");
    }

    #[test]
    fn unknown_entities_pass_through() {
        assert_eq!(rewrite("caf&eacute; &nbsp; &#8217;"), "caf&eacute; &nbsp; &#8217;");
    }

    #[test]
    fn line_breaks_in_all_spellings() {
        assert_eq!(rewrite("これは<br>改行<br/>です"), "これは\n改行\nです");
        assert_eq!(rewrite("a<br />b"), "a\nb");
    }

    #[test]
    fn empty_input_is_empty() {
        assert_eq!(rewrite(""), "");
        assert_eq!(rewrite("   \n "), "");
    }

    #[test]
    fn unclosed_strong_drops_delimiter() {
        assert_eq!(rewrite("<strong>bold"), "bold");
        assert_eq!(rewrite("tail <em>"), "tail");
        assert!(!rewrite("<p>x<strong>y</p>").contains("**"));
    }

    #[test]
    fn interleaved_unclosed_tags_inside_paragraph() {
        assert_eq!(
            rewrite("<p>閉じタグがない<strong>太字<em>斜体</p>"),
            "閉じタグがない太字斜体"
        );
        assert_eq!(rewrite("<p>text<strong>bold<em>italic</p>"), "textbolditalic");
    }

    #[test]
    fn feed_body_with_separator_between_links() {
        let html = "<p>\nCapture notes on every new Tab\n</p>\n<p>\n<a href=\"https://www.producthunt.com/posts/noteux?utm_campaign=feed&amp;utm_medium=rss-feed\">Discussion</a>\n|\n<a href=\"https://www.producthunt.com/r/p/949372?app_id=339\">Link</a>\n</p>";
        assert_eq!(
            rewrite(html),
            "Capture notes on every new Tab\n\n\
             <https://www.producthunt.com/posts/noteux?utm_campaign=feed&utm_medium=rss-feed|Discussion> | \
             <https://www.producthunt.com/r/p/949372?app_id=339|Link>"
        );
    }

    #[test]
    fn plain_text_is_a_fixed_point() {
        let samples = [
            "Just a sentence.",
            "Two lines\nof text",
            "First paragraph\n\nSecond paragraph",
            "Ship faster: notes, tasks and docs in one tab",
            "日本語のテキスト",
            "Docs | Pricing | Blog",
        ];
        for text in samples {
            assert_eq!(rewrite(text), text);
            assert_eq!(rewrite(&rewrite(text)), text);
        }
    }

    #[test]
    fn whitespace_only_lines_collapse() {
        assert_eq!(rewrite("<p>a</p>\n \n<p>b</p>"), "a\n\nb");
        assert_eq!(rewrite("a\n\t\n  \n\nb"), "a\n\nb");
        assert_eq!(rewrite("a\n \nb"), "a\n\nb");
    }

    #[test]
    fn bare_separators_are_spaced() {
        assert_eq!(rewrite("a|b"), "a | b");
        assert_eq!(rewrite("a  |\nb"), "a | b");
        assert_eq!(rewrite(&rewrite("a|b")), "a | b");
    }

    #[test]
    fn unknown_tags_are_stripped() {
        assert_eq!(
            rewrite(r#"<div class="x"><span>inner</span></div><img src="a.png"/>"#),
            "inner"
        );
    }
}
