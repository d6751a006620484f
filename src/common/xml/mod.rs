//! XML helpers shared by the package and slide layers.
pub mod escape;
pub mod rewrite;

pub use escape::{escape_xml, unescape_xml};
pub use rewrite::{local_name, remap_relationship_ids, rewrite_first, rewrite_tags, set_attr};

use quick_xml::events::BytesStart;

/// Unescaped value of the attribute whose qualified name is `key`.
pub fn attr_value(tag: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    tag.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| {
            std::str::from_utf8(&attr.value)
                .ok()
                .map(unescape_xml)
        })
}

/// Attribute value parsed as an integer.
pub fn attr_int(tag: &BytesStart<'_>, key: &[u8]) -> Option<i64> {
    tag.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| atoi_simd::parse::<i64, false, false>(&attr.value).ok())
}
