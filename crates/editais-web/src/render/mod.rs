//! HTML rendering. Every page is built with `format!`; all dynamic text goes
//! through `html_escape`.

pub mod layout;
pub mod cards;
pub mod detail;
pub mod filters;
pub mod admin;
pub mod chat;

use chrono::NaiveDate;
use editais_common::entities::NOT_INFORMED;
use url::Url;

pub use cards::{render_cards, CardMode};
pub use detail::render_detail;

/// Escape text for HTML element content and quoted attribute values.
pub fn html_escape(s: &str) -> String {
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

/// An escaped `href` value for an external link, or `None` unless the link
/// is an absolute http(s) URL.
pub fn safe_href(link: &str) -> Option<String> {
    let url = Url::parse(link.trim()).ok()?;
    match url.scheme() {
        "http" | "https" => Some(html_escape(url.as_str())),
        _ => None,
    }
}

/// `YYYY-MM-DD` → `dd/mm/yyyy`; absent or unparseable → "Não informado".
pub fn format_date(date: Option<&str>) -> String {
    date.and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| NOT_INFORMED.to_string())
}

/// At most `max` characters, cut on a char boundary and suffixed with `…`.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…", s[..cut].trim_end()),
    }
}

/// `a=1&b=2`, form-encoded.
pub fn query_string<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#39;y&#39;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_safe_href_only_allows_web_schemes() {
        assert_eq!(safe_href("https://x/r.pdf").as_deref(), Some("https://x/r.pdf"));
        assert_eq!(
            safe_href(" http://portal.example/?id=1&a=\"b\" ").as_deref(),
            Some("http://portal.example/?id=1&amp;a=%22b%22")
        );
        assert_eq!(safe_href("javascript:alert(1)"), None);
        assert_eq!(safe_href("JavaScript:alert(1)"), None);
        assert_eq!(safe_href("java\tscript:alert(1)"), None);
        assert_eq!(safe_href("data:text/html,<script>alert(1)</script>"), None);
        assert_eq!(safe_href("/relativo.pdf"), None);
        assert_eq!(safe_href(""), None);
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(Some("2025-03-10")), "10/03/2025");
        assert_eq!(format_date(None), "Não informado");
        assert_eq!(format_date(Some("amanhã")), "Não informado");
    }

    #[test]
    fn test_truncate_on_char_boundary() {
        assert_eq!(truncate_chars("curto", 10), "curto");
        assert_eq!(truncate_chars("exatamente", 10), "exatamente");
        assert_eq!(truncate_chars("Inovação tecnológica", 8), "Inovação…");
        assert_eq!(truncate_chars("ab cd", 3), "ab…");
    }

    #[test]
    fn test_query_string_encodes() {
        assert_eq!(query_string([("q", "são paulo"), ("region", "SP")]), "q=s%C3%A3o+paulo&region=SP");
    }
}
