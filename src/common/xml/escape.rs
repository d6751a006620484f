use aho_corasick::{AhoCorasick, MatchKind};
use once_cell::sync::Lazy;

// Built once, shared between threads
static XML_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">", "\"", "'"])
        .expect("XML escaper patterns are valid")
});

static XML_UNESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .match_kind(MatchKind::LeftmostLongest)
        .build(["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"])
        .expect("XML unescaper patterns are valid")
});

/// Escape the five XML special characters, for text nodes and attribute values.
///
/// # Examples
///
/// ```
/// use slide_inserter::common::xml::escape_xml;
/// assert_eq!(escape_xml("C:\\img\\a&b.png"), "C:\\img\\a&amp;b.png");
/// assert_eq!(escape_xml("<\"x\">"), "&lt;&quot;x&quot;&gt;");
/// ```
#[inline]
pub fn escape_xml(s: &str) -> String {
    XML_ESCAPER.replace_all(s, &["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"])
}

/// Reverse [`escape_xml`]. Unknown entities are left as they are.
///
/// # Examples
///
/// ```
/// use slide_inserter::common::xml::unescape_xml;
/// assert_eq!(unescape_xml("a &amp;lt; b"), "a &lt; b");
/// assert_eq!(unescape_xml("&unknown;"), "&unknown;");
/// ```
#[inline]
pub fn unescape_xml(s: &str) -> String {
    XML_UNESCAPER.replace_all(s, &["&", "<", ">", "\"", "'"])
}
