// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! HTML escaping for text and attribute values built from untrusted labels.

/// Escape `&`, `<` and `>` so the value is safe as element text content.
///
/// # Examples
///
/// ```
/// use bump_selector::utils::escape_html;
///
/// assert_eq!(escape_html("Tea & <Cake>"), "Tea &amp; &lt;Cake&gt;");
/// ```
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

/// Escape a value for a double-quoted attribute: everything [`escape_html`]
/// handles plus `"`.
pub fn escape_html_attr(value: &str) -> String {
    escape_html(value).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Decode the four entities produced above; enough to play the parser.
    fn decode(value: &str) -> String {
        value
            .replace("&quot;", "\"")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&amp;", "&")
    }

    #[test]
    fn text_escaping_leaves_quotes_alone() {
        assert_eq!(escape_html(r#"5 "pack""#), r#"5 "pack""#);
        assert_eq!(escape_html("a<b>&c"), "a&lt;b&gt;&amp;c");
    }

    #[test]
    fn attribute_escaping_covers_quotes() {
        assert_eq!(
            escape_html_attr(r#"<script>"x"&"#),
            "&lt;script&gt;&quot;x&quot;&amp;"
        );
    }

    #[test]
    fn escaped_labels_decode_to_the_original_text() {
        let labels = [
            "Plain label",
            "Fish & Chips",
            "<img src=x onerror=alert(1)>",
            r#"12" pizza "deluxe""#,
            "&amp; already looks escaped",
        ];
        for label in labels {
            assert_eq!(decode(&escape_html(label)), label);
            assert_eq!(decode(&escape_html_attr(label)), label);
            assert!(!escape_html(label).contains('<'));
            assert!(!escape_html_attr(label).contains('"'));
        }
    }
}
