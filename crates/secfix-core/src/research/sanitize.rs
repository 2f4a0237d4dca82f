//! Markup stripping and bounding for reference pages.

use scraper::{ElementRef, Html};

/// Elements whose whole subtree is discarded before text extraction.
const NON_CONTENT_ELEMENTS: [&str; 5] = ["script", "style", "nav", "footer", "header"];

/// Elements that start a new line in the extracted text.
const BLOCK_ELEMENTS: [&str; 24] = [
    "p", "div", "br", "li", "ul", "ol", "dl", "dt", "dd", "h1", "h2", "h3", "h4", "h5", "h6",
    "tr", "td", "th", "table", "section", "article", "main", "pre", "blockquote",
];

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_element) = ElementRef::wrap(child) {
            let name = child_element.value().name();
            if NON_CONTENT_ELEMENTS.contains(&name) {
                continue;
            }
            let block = BLOCK_ELEMENTS.contains(&name);
            if block {
                out.push('\n');
            }
            collect_text(child_element, out);
            if block {
                out.push('\n');
            }
        }
    }
}

/// Extract readable text from an HTML document.
///
/// The document is parsed into a DOM. Non-content subtrees are skipped,
/// comments and attributes never contribute text, and block-level elements
/// become line breaks. Whitespace is then collapsed: each line is trimmed,
/// split on runs of two or more spaces, and empty fragments are discarded.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut text = String::new();
    collect_text(document.root_element(), &mut text);

    text.lines()
        .map(str::trim)
        .flat_map(|line| line.split("  "))
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// First `max_chars` characters of `text`, never splitting a character.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_non_content_elements() {
        let html = r#"<html><head><style>body { color: red }</style></head>
<body><header>Site Header</header><nav><a href="/">Home</a></nav>
<script type="text/javascript">var x = 1;</script>
<p>Path traversal allows access to files.</p>
<footer>Copyright</footer></body></html>"#;
        let text = html_to_text(html);
        assert_eq!(text, "Path traversal allows access to files.");
    }

    #[test]
    fn block_tags_become_lines() {
        let html = "<h1>CWE-22</h1><p>Improper Limitation</p><ul><li>one</li><li>two</li></ul>";
        assert_eq!(html_to_text(html), "CWE-22\nImproper Limitation\none\ntwo");
    }

    #[test]
    fn inline_tags_do_not_split_words() {
        assert_eq!(html_to_text("<p>use <code>os.path</code> safely</p>"), "use os.path safely");
    }

    #[test]
    fn collapses_whitespace_runs_and_blank_lines() {
        let html = "<div>  alpha   beta  </div>\n\n\n<div>\tgamma </div>";
        assert_eq!(html_to_text(html), "alpha\nbeta\ngamma");
    }

    #[test]
    fn decodes_common_entities() {
        assert_eq!(
            html_to_text("<p>a &lt;b&gt; &amp;&amp; &quot;c&quot;</p>"),
            "a <b> && \"c\""
        );
    }

    #[test]
    fn removes_comments() {
        assert_eq!(html_to_text("<p>kept<!-- <p>hidden</p> --></p>"), "kept");
    }

    #[test]
    fn quoted_angle_brackets_in_attributes_stay_out() {
        let html = r#"<p title="a > b">Hello</p><img alt="x>y"> world"#;
        assert_eq!(html_to_text(html), "Hello\nworld");
    }

    #[test]
    fn unclosed_script_is_dropped() {
        let html = "<p>Body</p><script>var secret = 1; // no close";
        assert_eq!(html_to_text(html), "Body");
    }

    #[test]
    fn truncate_is_char_safe() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }
}
