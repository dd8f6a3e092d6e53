//! Package relationship parts (`*.rels`) and part-name resolution.

use super::PptError;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

/// One `<Relationship>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

/// All relationships of one source part, in document order.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    items: Vec<Relationship>,
}

impl Relationships {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `.rels` part. `part` is only used for error messages.
    pub fn parse(xml: &[u8], part: &str) -> Result<Self, PptError> {
        let mut reader = Reader::from_reader(xml);
        let mut items = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                    if e.local_name().as_ref() == b"Relationship" =>
                {
                    let mut rel = Relationship {
                        id: String::new(),
                        rel_type: String::new(),
                        target: String::new(),
                        external: false,
                    };
                    for attr in e.attributes().flatten() {
                        let value = attr
                            .unescape_value()
                            .map_err(|err| PptError::xml(part, err))?
                            .into_owned();
                        match attr.key.as_ref() {
                            b"Id" => rel.id = value,
                            b"Type" => rel.rel_type = value,
                            b"Target" => rel.target = value,
                            b"TargetMode" => rel.external = value == "External",
                            _ => {}
                        }
                    }
                    items.push(rel);
                }
                Ok(Event::Eof) => break,
                Err(err) => return Err(PptError::xml(part, err)),
                _ => {}
            }
        }

        Ok(Self { items })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.items.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.id == id)
    }

    pub fn first_of_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.rel_type == rel_type)
    }

    /// Smallest `rIdN` greater than every numeric id present.
    pub fn next_id(&self) -> String {
        let max = self
            .items
            .iter()
            .filter_map(|r| r.id.strip_prefix("rId"))
            .filter_map(|n| n.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        format!("rId{}", max + 1)
    }

    /// Add an internal relationship and return its new id.
    pub fn add(&mut self, rel_type: &str, target: &str) -> String {
        let id = self.next_id();
        self.items.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            external: false,
        });
        id
    }

    pub fn to_xml(&self) -> String {
        let mut xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#
            .to_string();
        for rel in &self.items {
            xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}"{}/>"#,
                escape(&rel.id),
                escape(&rel.rel_type),
                escape(&rel.target),
                if rel.external {
                    r#" TargetMode="External""#
                } else {
                    ""
                }
            ));
        }
        xml.push_str("</Relationships>");
        xml
    }
}

/// `ppt/slides/slide1.xml` -> `ppt/slides/_rels/slide1.xml.rels`
pub fn rels_part_name(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

fn directory_of(part: &str) -> &str {
    part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Resolve a relationship target against the part that owns it.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    let joined = match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => {
            let dir = directory_of(source_part);
            if dir.is_empty() {
                target.to_string()
            } else {
                format!("{}/{}", dir, target)
            }
        }
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
    segments.join("/")
}

/// Target string that points from `source_part` to `dest_part`.
pub fn relative_target(source_part: &str, dest_part: &str) -> String {
    let source_dir: Vec<&str> = directory_of(source_part)
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    let dest: Vec<&str> = dest_part.split('/').filter(|s| !s.is_empty()).collect();

    let common = source_dir
        .iter()
        .zip(dest.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = vec![".."; source_dir.len() - common];
    parts.extend_from_slice(&dest[common..]);
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLIDE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout2.xml"/>
<Relationship Id="rId7" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/?a=1&amp;b=2" TargetMode="External"/>
</Relationships>"#;

    #[test]
    fn parses_and_allocates_ids() {
        let mut rels = Relationships::parse(SLIDE_RELS.as_bytes(), "slide1.xml.rels").unwrap();
        assert_eq!(rels.iter().count(), 2);
        assert_eq!(
            rels.get("rId1").unwrap().target,
            "../slideLayouts/slideLayout2.xml"
        );
        let link = rels.get("rId7").unwrap();
        assert!(link.external);
        assert_eq!(link.target, "https://example.com/?a=1&b=2");

        assert_eq!(rels.add("chart", "../charts/chart1.xml"), "rId8");
        assert_eq!(rels.next_id(), "rId9");
    }

    #[test]
    fn serialization_round_trips_escaped_targets() {
        let rels = Relationships::parse(SLIDE_RELS.as_bytes(), "x").unwrap();
        let xml = rels.to_xml();
        assert!(xml.contains("a=1&amp;b=2"));
        assert!(xml.contains(r#"TargetMode="External""#));
        let again = Relationships::parse(xml.as_bytes(), "x").unwrap();
        assert_eq!(again.get("rId7"), rels.get("rId7"));
    }

    #[test]
    fn resolves_relative_and_absolute_targets() {
        assert_eq!(
            resolve_target("ppt/slides/slide3.xml", "../slideLayouts/slideLayout6.xml"),
            "ppt/slideLayouts/slideLayout6.xml"
        );
        assert_eq!(
            resolve_target("ppt/presentation.xml", "slides/slide1.xml"),
            "ppt/slides/slide1.xml"
        );
        assert_eq!(
            resolve_target("", "/ppt/presentation.xml"),
            "ppt/presentation.xml"
        );
        assert_eq!(resolve_target("", "ppt/presentation.xml"), "ppt/presentation.xml");
    }

    #[test]
    fn builds_relative_targets() {
        assert_eq!(
            relative_target("ppt/slides/slide4.xml", "ppt/charts/chart2.xml"),
            "../charts/chart2.xml"
        );
        assert_eq!(
            relative_target("ppt/presentation.xml", "ppt/slides/slide4.xml"),
            "slides/slide4.xml"
        );
        assert_eq!(
            relative_target("ppt/charts/chart1.xml", "ppt/embeddings/Microsoft_Excel_Sheet1.xlsx"),
            "../embeddings/Microsoft_Excel_Sheet1.xlsx"
        );
        assert_eq!(rels_part_name("ppt/slides/slide4.xml"), "ppt/slides/_rels/slide4.xml.rels");
        assert_eq!(rels_part_name("ppt/presentation.xml"), "ppt/_rels/presentation.xml.rels");
    }
}
