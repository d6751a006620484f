//! Part names inside an OPC package.
//!
//! A part name is an absolute, slash-separated path such as
//! `/ppt/slides/slide1.xml`. Relationship targets are stored relative to the
//! directory of their source part and are resolved through [`PackURI::from_rel_ref`].

/// Name of the package root, the source of the package-level relationships.
pub const PACKAGE_URI: &str = "/";

/// Name of the content types stream.
pub const CONTENT_TYPES_URI: &str = "/[Content_Types].xml";

/// Absolute part name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackURI {
    uri: String,
}

impl PackURI {
    pub fn new<S: Into<String>>(uri: S) -> Result<Self, String> {
        let uri = uri.into();
        if !uri.starts_with('/') {
            return Err(format!("part name must start with '/': '{uri}'"));
        }
        Ok(PackURI { uri })
    }

    /// Resolve `relative_ref` against the directory `base_uri`.
    pub fn from_rel_ref(base_uri: &str, relative_ref: &str) -> Result<Self, String> {
        let joined = if relative_ref.starts_with('/') {
            relative_ref.to_string()
        } else if base_uri.ends_with('/') {
            format!("{base_uri}{relative_ref}")
        } else {
            format!("{base_uri}/{relative_ref}")
        };

        let mut segments: Vec<&str> = Vec::new();
        for segment in joined.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                other => segments.push(other),
            }
        }
        Self::new(format!("/{}", segments.join("/")))
    }

    /// Directory containing this part, `/` for top-level parts.
    pub fn base_uri(&self) -> &str {
        match self.uri.rfind('/') {
            Some(0) | None => "/",
            Some(pos) => &self.uri[..pos],
        }
    }

    pub fn filename(&self) -> &str {
        self.uri.rsplit('/').next().unwrap_or("")
    }

    /// Extension without the dot, empty when there is none.
    pub fn ext(&self) -> &str {
        let filename = self.filename();
        filename.rfind('.').map_or("", |pos| &filename[pos + 1..])
    }

    /// ZIP member name: the part name without its leading slash.
    pub fn membername(&self) -> &str {
        &self.uri[1..]
    }

    /// Path of this part relative to the directory `base_uri`.
    pub fn relative_ref(&self, base_uri: &str) -> String {
        if base_uri == "/" {
            return self.membername().to_string();
        }

        let from: Vec<&str> = base_uri.split('/').filter(|s| !s.is_empty()).collect();
        let to: Vec<&str> = self.uri.split('/').filter(|s| !s.is_empty()).collect();
        let shared = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

        let mut parts: Vec<&str> = vec![".."; from.len() - shared];
        parts.extend_from_slice(&to[shared..]);
        parts.join("/")
    }

    /// Part name of the relationships part belonging to this part.
    pub fn rels_uri(&self) -> PackURI {
        let base = self.base_uri().trim_end_matches('/');
        PackURI {
            uri: format!("{base}/_rels/{}.rels", self.filename()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.uri
    }
}

impl std::fmt::Display for PackURI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.uri)
    }
}

impl AsRef<str> for PackURI {
    fn as_ref(&self) -> &str {
        &self.uri
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_leading_slash() {
        assert!(PackURI::new("ppt/slides/slide1.xml").is_err());
        assert!(PackURI::new("/ppt/slides/slide1.xml").is_ok());
    }

    #[test]
    fn test_components() {
        let uri = PackURI::new("/ppt/media/image3.png").unwrap();
        assert_eq!(uri.base_uri(), "/ppt/media");
        assert_eq!(uri.filename(), "image3.png");
        assert_eq!(uri.ext(), "png");
        assert_eq!(uri.membername(), "ppt/media/image3.png");

        let top = PackURI::new("/[Content_Types].xml").unwrap();
        assert_eq!(top.base_uri(), "/");
    }

    #[test]
    fn test_from_rel_ref() {
        let uri = PackURI::from_rel_ref("/ppt/slides", "../media/image1.png").unwrap();
        assert_eq!(uri.as_str(), "/ppt/media/image1.png");

        let uri = PackURI::from_rel_ref("/", "ppt/presentation.xml").unwrap();
        assert_eq!(uri.as_str(), "/ppt/presentation.xml");

        let uri = PackURI::from_rel_ref("/ppt", "/ppt/slides/./slide2.xml").unwrap();
        assert_eq!(uri.as_str(), "/ppt/slides/slide2.xml");
    }

    #[test]
    fn test_relative_ref() {
        let media = PackURI::new("/ppt/media/image1.png").unwrap();
        assert_eq!(media.relative_ref("/ppt/slides"), "../media/image1.png");
        assert_eq!(media.relative_ref("/"), "ppt/media/image1.png");

        let slide = PackURI::new("/ppt/slides/slide4.xml").unwrap();
        assert_eq!(slide.relative_ref("/ppt"), "slides/slide4.xml");
        assert_eq!(slide.relative_ref("/ppt/slides"), "slide4.xml");
    }

    #[test]
    fn test_rels_uri() {
        let slide = PackURI::new("/ppt/slides/slide1.xml").unwrap();
        assert_eq!(slide.rels_uri().as_str(), "/ppt/slides/_rels/slide1.xml.rels");

        let root = PackURI::new(PACKAGE_URI).unwrap();
        assert_eq!(root.rels_uri().as_str(), "/_rels/.rels");
    }
}
