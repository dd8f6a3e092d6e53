//! `[Content_Types].xml` editing.

use super::PptError;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

#[derive(Debug, Clone, Default)]
pub struct ContentTypes {
    defaults: Vec<(String, String)>,
    overrides: Vec<(String, String)>,
}

impl ContentTypes {
    pub fn parse(xml: &[u8]) -> Result<Self, PptError> {
        let mut reader = Reader::from_reader(xml);
        let mut types = Self::default();

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    let local = e.local_name();
                    let (key_attr, is_default): (&[u8], bool) = match local.as_ref() {
                        b"Default" => (&b"Extension"[..], true),
                        b"Override" => (&b"PartName"[..], false),
                        _ => continue,
                    };

                    let mut key = String::new();
                    let mut content_type = String::new();
                    for attr in e.attributes().flatten() {
                        let value = attr
                            .unescape_value()
                            .map_err(|err| PptError::xml(CONTENT_TYPES_PART, err))?
                            .into_owned();
                        if attr.key.as_ref() == key_attr {
                            key = value;
                        } else if attr.key.as_ref() == b"ContentType" {
                            content_type = value;
                        }
                    }

                    if is_default {
                        types.defaults.push((key, content_type));
                    } else {
                        types.overrides.push((key, content_type));
                    }
                }
                Ok(Event::Eof) => break,
                Err(err) => return Err(PptError::xml(CONTENT_TYPES_PART, err)),
                _ => {}
            }
        }

        Ok(types)
    }

    pub fn has_default(&self, extension: &str) -> bool {
        self.defaults
            .iter()
            .any(|(ext, _)| ext.eq_ignore_ascii_case(extension))
    }

    pub fn ensure_default(&mut self, extension: &str, content_type: &str) {
        if !self.has_default(extension) {
            self.defaults
                .push((extension.to_string(), content_type.to_string()));
        }
    }

    /// Register `part` (zip entry name, no leading slash).
    pub fn add_override(&mut self, part: &str, content_type: &str) {
        let part_name = format!("/{}", part);
        match self.overrides.iter_mut().find(|(name, _)| *name == part_name) {
            Some(existing) => existing.1 = content_type.to_string(),
            None => self.overrides.push((part_name, content_type.to_string())),
        }
    }

    pub fn override_for(&self, part: &str) -> Option<&str> {
        let part_name = format!("/{}", part);
        self.overrides
            .iter()
            .find(|(name, _)| *name == part_name)
            .map(|(_, ct)| ct.as_str())
    }

    pub fn to_xml(&self) -> String {
        let mut xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#
            .to_string();
        for (ext, ct) in &self.defaults {
            xml.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape(ext),
                escape(ct)
            ));
        }
        for (part, ct) in &self.overrides {
            xml.push_str(&format!(
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape(part),
                escape(ct)
            ));
        }
        xml.push_str("</Types>");
        xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_defaults_and_overrides_once() {
        let xml = r#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Override PartName="/ppt/slides/slide1.xml" ContentType="slide"/></Types>"#;
        let mut types = ContentTypes::parse(xml.as_bytes()).unwrap();

        types.ensure_default("XML", "other");
        types.ensure_default("xlsx", "sheet");
        types.add_override("ppt/charts/chart1.xml", "chart");
        types.add_override("ppt/charts/chart1.xml", "chart");

        let out = types.to_xml();
        assert_eq!(out.matches("Extension=\"xml\"").count(), 1);
        assert!(out.contains(r#"<Default Extension="xlsx" ContentType="sheet"/>"#));
        assert_eq!(out.matches("/ppt/charts/chart1.xml").count(), 1);
        assert_eq!(types.override_for("ppt/slides/slide1.xml"), Some("slide"));
    }
}
