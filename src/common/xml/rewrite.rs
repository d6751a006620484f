//! Attribute-level rewriting of XML parts.
//!
//! Parts are edited as bytes: every start or empty tag is offered to a callback
//! together with its raw (still escaped) attributes. Only tags the callback
//! changes are re-emitted. Everything else, including whitespace, namespace
//! declarations and unknown extension markup, is copied through untouched.
use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::ooxml::opc::constants::namespace;

/// Raw attribute as it appears in the source: qualified key and escaped value.
pub type RawAttr = (Vec<u8>, Vec<u8>);

/// Local part of a possibly prefixed XML name (`p:cNvPr` -> `cNvPr`).
#[inline]
pub fn local_name(qname: &[u8]) -> &[u8] {
    match memchr::memrchr(b':', qname) {
        Some(pos) => &qname[pos + 1..],
        None => qname,
    }
}

/// Set `key` to an already escaped `value`, appending it if absent.
pub fn set_attr(attrs: &mut Vec<RawAttr>, key: &str, escaped_value: &str) {
    let key = key.as_bytes();
    match attrs.iter_mut().find(|(k, _)| k.as_slice() == key) {
        Some((_, v)) => *v = escaped_value.as_bytes().to_vec(),
        None => attrs.push((key.to_vec(), escaped_value.as_bytes().to_vec())),
    }
}

/// Offer every start/empty tag of `xml` to `edit`.
///
/// `edit` receives the qualified tag name and a mutable attribute list and
/// returns `true` when it changed something.
pub fn rewrite_tags<F>(xml: &[u8], mut edit: F) -> Result<Vec<u8>, quick_xml::Error>
where
    F: FnMut(&[u8], &mut Vec<RawAttr>) -> bool,
{
    let mut reader = Reader::from_reader(xml);
    let mut out = Vec::with_capacity(xml.len() + 128);
    let mut copied = 0usize;

    loop {
        let start = reader.buffer_position() as usize;
        let event = reader.read_event()?;
        let end = reader.buffer_position() as usize;

        let (tag, is_empty) = match event {
            Event::Start(e) => (e, false),
            Event::Empty(e) => (e, true),
            Event::Eof => break,
            _ => continue,
        };

        let mut attrs: Vec<RawAttr> = Vec::new();
        for attr in tag.attributes() {
            let attr = attr.map_err(quick_xml::Error::InvalidAttr)?;
            attrs.push((attr.key.as_ref().to_vec(), attr.value.to_vec()));
        }

        let name = tag.name();
        if edit(name.as_ref(), &mut attrs) {
            out.extend_from_slice(&xml[copied..start]);
            write_tag(&mut out, name.as_ref(), &attrs, is_empty);
            copied = end;
        }
    }

    out.extend_from_slice(&xml[copied..]);
    Ok(out)
}

/// Rewrite the first tag whose local name is `local`, returning `None` when no
/// such tag exists.
pub fn rewrite_first<F>(
    xml: &[u8],
    local: &[u8],
    mut edit: F,
) -> Result<Option<Vec<u8>>, quick_xml::Error>
where
    F: FnMut(&mut Vec<RawAttr>),
{
    let mut found = false;
    let out = rewrite_tags(xml, |name, attrs| {
        if found || local_name(name) != local {
            return false;
        }
        found = true;
        edit(attrs);
        true
    })?;
    Ok(found.then_some(out))
}

/// Rewrite every relationship-namespace attribute value through `map`.
///
/// The prefix is whatever the document binds to the relationships namespace,
/// `r` when it declares none. Used when a part is cloned and its relationships
/// are re-issued under new ids. Values missing from the map are left alone.
pub fn remap_relationship_ids(
    xml: &[u8],
    map: &HashMap<String, String>,
) -> Result<Vec<u8>, quick_xml::Error> {
    if map.is_empty() {
        return Ok(xml.to_vec());
    }
    let mut prefixes: Vec<Vec<u8>> = Vec::new();
    rewrite_tags(xml, |_, attrs| {
        for (key, value) in attrs.iter() {
            if let Some(prefix) = key.strip_prefix(b"xmlns:")
                && value.as_slice() == namespace::OFC_RELATIONSHIPS.as_bytes()
                && !prefixes.iter().any(|p| p.as_slice() == prefix)
            {
                prefixes.push(prefix.to_vec());
            }
        }
        let mut changed = false;
        for (key, value) in attrs.iter_mut() {
            let Some(colon) = memchr::memchr(b':', key) else {
                continue;
            };
            let prefix = &key[..colon];
            let bound = if prefixes.is_empty() {
                prefix == b"r"
            } else {
                prefixes.iter().any(|p| p.as_slice() == prefix)
            };
            if !bound {
                continue;
            }
            let Ok(current) = std::str::from_utf8(value) else {
                continue;
            };
            if let Some(new_id) = map.get(current) {
                *value = new_id.as_bytes().to_vec();
                changed = true;
            }
        }
        changed
    })
}

fn write_tag(out: &mut Vec<u8>, name: &[u8], attrs: &[RawAttr], is_empty: bool) {
    out.push(b'<');
    out.extend_from_slice(name);
    for (key, value) in attrs {
        out.push(b' ');
        out.extend_from_slice(key);
        out.extend_from_slice(b"=\"");
        // values lifted from single-quoted attributes may hold a bare quote
        for &b in value {
            if b == b'"' {
                out.extend_from_slice(b"&quot;");
            } else {
                out.push(b);
            }
        }
        out.push(b'"');
    }
    if is_empty {
        out.extend_from_slice(b"/>");
    } else {
        out.push(b'>');
    }
}
