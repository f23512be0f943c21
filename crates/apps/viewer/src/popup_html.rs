//! Markup for popups on surfaces that take an HTML string.

use surface::popup::PopupContent;

/// `<strong>title</strong><br/>line...`, every piece of text escaped.
pub fn popup_html(content: &PopupContent) -> String {
    let mut out = format!("<strong>{}</strong>", escape(&content.title));
    for line in &content.lines {
        out.push_str("<br/>");
        out.push_str(&escape(line));
    }
    out
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::popup_html;
    use pretty_assertions::assert_eq;
    use surface::popup::PopupContent;

    #[test]
    fn text_is_escaped() {
        let c = PopupContent::new("<b>Fish & Chips</b>").line("Joe's \"spot\"");
        assert_eq!(
            popup_html(&c),
            "<strong>&lt;b&gt;Fish &amp; Chips&lt;/b&gt;</strong><br/>Joe&#39;s &quot;spot&quot;"
        );
    }
}
