//! Presentation-level structure: slide order, layouts and appending slides.

use super::relationships::{relative_target, resolve_target};
use super::{content_type_names, rel_types, Deck, PptError, Relationships};
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, info};

const DEFAULT_MAIN_PART: &str = "ppt/presentation.xml";
const MIN_SLIDE_ID: u64 = 256;

/// Placeholder types that are never copied onto a new slide.
const SKIPPED_PLACEHOLDERS: [&str; 3] = ["dt", "ftr", "sldNum"];
/// Placeholder types that start with an empty text body.
const TEXT_PLACEHOLDERS: [&str; 5] = ["title", "body", "ctrTitle", "subTitle", "obj"];

/// One `sldId`/`sldMasterId`/`sldLayoutId` entry.
#[derive(Debug)]
struct IdEntry {
    id: Option<u64>,
    rel_id: String,
}

/// A placeholder read from a slide layout.
#[derive(Debug, Clone, PartialEq)]
struct LayoutPlaceholder {
    name: String,
    ph_type: String,
    idx: u32,
}

fn read_id_entry(e: &BytesStart, part: &str) -> Result<IdEntry, PptError> {
    let mut entry = IdEntry {
        id: None,
        rel_id: String::new(),
    };
    for attr in e.attributes().flatten() {
        let value = attr
            .unescape_value()
            .map_err(|err| PptError::xml(part, err))?;
        // `r:id` is the prefixed one, the bare `id` is the numeric slide id.
        if attr.key.local_name().as_ref() == b"id" {
            if attr.key.prefix().is_some() {
                entry.rel_id = value.into_owned();
            } else {
                entry.id = value.parse().ok();
            }
        }
    }
    Ok(entry)
}

/// `element` entries directly inside the root-level `list`, in document order.
///
/// Same-named lists nested deeper (e.g. `p14:sldIdLst` in a section list) are ignored.
fn id_entries(
    xml: &[u8],
    list: &[u8],
    element: &[u8],
    part: &str,
) -> Result<Vec<IdEntry>, PptError> {
    let mut reader = Reader::from_reader(xml);
    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut in_list = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                if in_list && depth == 2 && e.local_name().as_ref() == element {
                    entries.push(read_id_entry(e, part)?);
                }
                if depth == 1 && e.local_name().as_ref() == list {
                    in_list = true;
                }
                depth += 1;
            }
            Ok(Event::Empty(ref e))
                if in_list && depth == 2 && e.local_name().as_ref() == element =>
            {
                entries.push(read_id_entry(e, part)?);
            }
            Ok(Event::End(_)) => {
                depth = depth.saturating_sub(1);
                if depth == 1 {
                    in_list = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(PptError::xml(part, err)),
            _ => {}
        }
    }

    Ok(entries)
}

/// Byte span of a direct child of the root element.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ChildSpan {
    start: usize,
    /// Offset of the closing tag, `None` for an empty element.
    close: Option<usize>,
    end: usize,
}

/// First root-level child named `local_name`.
fn root_child(xml: &[u8], local_name: &[u8], part: &str) -> Result<Option<ChildSpan>, PptError> {
    let mut reader = Reader::from_reader(xml);
    let mut depth = 0usize;
    let mut open = None;

    loop {
        let before = reader.buffer_position() as usize;
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                if depth == 1 && e.local_name().as_ref() == local_name {
                    open = Some(before);
                }
                depth += 1;
            }
            Ok(Event::Empty(ref e)) if depth == 1 && e.local_name().as_ref() == local_name => {
                return Ok(Some(ChildSpan {
                    start: before,
                    close: None,
                    end: reader.buffer_position() as usize,
                }));
            }
            Ok(Event::End(_)) => {
                depth = depth.saturating_sub(1);
                if let (1, Some(start)) = (depth, open) {
                    return Ok(Some(ChildSpan {
                        start,
                        close: Some(before),
                        end: reader.buffer_position() as usize,
                    }));
                }
            }
            Ok(Event::Eof) => return Ok(None),
            Err(err) => return Err(PptError::xml(part, err)),
            _ => {}
        }
    }
}

/// Namespace prefix of the root element, e.g. `p` for `<p:presentation>`.
fn root_prefix(xml: &[u8], part: &str) -> Result<String, PptError> {
    let mut reader = Reader::from_reader(xml);

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                return Ok(e
                    .name()
                    .prefix()
                    .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned())
                    .unwrap_or_default());
            }
            Ok(Event::Eof) => return Err(PptError::xml(part, "document has no root element")),
            Err(err) => return Err(PptError::xml(part, err)),
            _ => {}
        }
    }
}

fn layout_placeholders(xml: &[u8], part: &str) -> Result<Vec<LayoutPlaceholder>, PptError> {
    let mut reader = Reader::from_reader(xml);
    let mut placeholders = Vec::new();
    let mut sp_depth = 0usize;
    let mut name = String::new();
    let mut placeholder: Option<(String, u32)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"sp" => {
                sp_depth += 1;
                if sp_depth == 1 {
                    name.clear();
                    placeholder = None;
                }
            }
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"sp" => {
                if sp_depth == 1 {
                    if let Some((ph_type, idx)) = placeholder.take() {
                        placeholders.push(LayoutPlaceholder {
                            name: std::mem::take(&mut name),
                            ph_type,
                            idx,
                        });
                    }
                }
                sp_depth = sp_depth.saturating_sub(1);
            }
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) if sp_depth == 1 => {
                match e.local_name().as_ref() {
                    b"cNvPr" => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"name" {
                                name = attr
                                    .unescape_value()
                                    .map_err(|err| PptError::xml(part, err))?
                                    .into_owned();
                            }
                        }
                    }
                    b"ph" => {
                        // Absent type means a content ("obj") placeholder.
                        let mut ph_type = "obj".to_string();
                        let mut idx = 0;
                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"type" => {
                                    ph_type = String::from_utf8_lossy(&attr.value).into_owned()
                                }
                                b"idx" => {
                                    idx = std::str::from_utf8(&attr.value)
                                        .ok()
                                        .and_then(|v| v.parse().ok())
                                        .unwrap_or(0)
                                }
                                _ => {}
                            }
                        }
                        placeholder = Some((ph_type, idx));
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(PptError::xml(part, err)),
            _ => {}
        }
    }

    Ok(placeholders)
}

fn new_slide_xml(placeholders: &[LayoutPlaceholder]) -> String {
    let shapes: String = placeholders
        .iter()
        .filter(|ph| !SKIPPED_PLACEHOLDERS.contains(&ph.ph_type.as_str()))
        .enumerate()
        .map(|(i, ph)| {
            let id = i + 2;
            let name = if ph.name.is_empty() {
                format!("Placeholder {}", id - 1)
            } else {
                ph.name.clone()
            };
            let type_attr = if ph.ph_type == "obj" {
                String::new()
            } else {
                format!(r#" type="{}""#, escape(&ph.ph_type))
            };
            let idx_attr = if ph.idx > 0 {
                format!(r#" idx="{}""#, ph.idx)
            } else {
                String::new()
            };
            let tx_body = if TEXT_PLACEHOLDERS.contains(&ph.ph_type.as_str()) {
                "<p:txBody><a:bodyPr/><a:lstStyle/><a:p/></p:txBody>"
            } else {
                ""
            };
            format!(
                r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph{}{}/></p:nvPr></p:nvSpPr><p:spPr/>{}</p:sp>"#,
                id,
                escape(&name),
                type_attr,
                idx_attr,
                tx_body
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
        shapes
    )
}

fn splice(xml: &[u8], offset: usize, fragment: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(xml.len() + fragment.len());
    out.extend_from_slice(&xml[..offset]);
    out.extend_from_slice(fragment.as_bytes());
    out.extend_from_slice(&xml[offset..]);
    out
}

impl Deck {
    /// The main presentation part, found through the package relationships.
    pub fn main_part(&self) -> Result<String, PptError> {
        let rels = self.relationships("")?;
        Ok(rels
            .first_of_type(rel_types::OFFICE_DOCUMENT)
            .map(|rel| resolve_target("", &rel.target))
            .unwrap_or_else(|| DEFAULT_MAIN_PART.to_string()))
    }

    /// Slide part names in presentation order.
    pub fn slide_parts(&self) -> Result<Vec<String>, PptError> {
        let main = self.main_part()?;
        let xml = self.require_part(&main)?;
        let rels = self.relationships(&main)?;

        id_entries(xml, b"sldIdLst", b"sldId", &main)?
            .into_iter()
            .map(|entry| {
                rels.get(&entry.rel_id)
                    .map(|rel| resolve_target(&main, &rel.target))
                    .ok_or_else(|| PptError::MissingRelationship {
                        part: main.clone(),
                        id: entry.rel_id,
                    })
            })
            .collect()
    }

    pub fn slide_count(&self) -> Result<usize, PptError> {
        Ok(self.slide_parts()?.len())
    }

    /// Part name of the slide at zero-based `index`.
    pub fn slide_part(&self, index: usize) -> Result<String, PptError> {
        let mut slides = self.slide_parts()?;
        let count = slides.len();
        if index >= count {
            return Err(PptError::SlideOutOfRange { index, count });
        }
        Ok(slides.swap_remove(index))
    }

    /// Layout part names of the first slide master, in master order.
    pub fn slide_layout_parts(&self) -> Result<Vec<String>, PptError> {
        let main = self.main_part()?;
        let main_rels = self.relationships(&main)?;
        let masters = id_entries(self.require_part(&main)?, b"sldMasterIdLst", b"sldMasterId", &main)?;

        let master = match masters.first() {
            Some(entry) => match main_rels.get(&entry.rel_id) {
                Some(rel) => resolve_target(&main, &rel.target),
                None => {
                    return Err(PptError::MissingRelationship {
                        part: main,
                        id: entry.rel_id.clone(),
                    })
                }
            },
            None => match main_rels.first_of_type(rel_types::SLIDE_MASTER) {
                Some(rel) => resolve_target(&main, &rel.target),
                None => return Ok(Vec::new()),
            },
        };

        let master_rels = self.relationships(&master)?;
        id_entries(
            self.require_part(&master)?,
            b"sldLayoutIdLst",
            b"sldLayoutId",
            &master,
        )?
            .into_iter()
            .map(|entry| {
                master_rels
                    .get(&entry.rel_id)
                    .map(|rel| resolve_target(&master, &rel.target))
                    .ok_or_else(|| PptError::MissingRelationship {
                        part: master.clone(),
                        id: entry.rel_id,
                    })
            })
            .collect()
    }

    /// Append a slide based on layout `layout_index` of the first master.
    ///
    /// Returns the zero-based index of the new slide.
    pub fn append_slide(&mut self, layout_index: usize) -> Result<usize, PptError> {
        let layouts = self.slide_layout_parts()?;
        let layout = layouts
            .get(layout_index)
            .cloned()
            .ok_or(PptError::LayoutNotFound {
                index: layout_index,
                available: layouts.len(),
            })?;

        let placeholders = layout_placeholders(self.require_part(&layout)?, &layout)?;
        let slide = self.next_part_name("ppt/slides/slide", ".xml");
        self.set_part(&slide, new_slide_xml(&placeholders).into_bytes());

        let mut slide_rels = Relationships::new();
        slide_rels.add(rel_types::SLIDE_LAYOUT, &relative_target(&slide, &layout));
        self.set_relationships(&slide, &slide_rels);

        let main = self.main_part()?;
        let mut main_rels = self.relationships(&main)?;
        let rel_id = main_rels.add(rel_types::SLIDE, &relative_target(&main, &slide));
        self.set_relationships(&main, &main_rels);

        let updated = self.insert_slide_id(&main, &rel_id)?;
        self.set_part(&main, updated);

        let mut types = self.content_types()?;
        types.add_override(&slide, content_type_names::SLIDE);
        self.set_content_types(&types);

        let index = self.slide_count()? - 1;
        info!(
            "Appended slide {} ({}) using layout {} ({})",
            index, slide, layout_index, layout
        );
        Ok(index)
    }

    fn insert_slide_id(&self, main: &str, rel_id: &str) -> Result<Vec<u8>, PptError> {
        let xml = self.require_part(main)?;
        let prefix = root_prefix(xml, main)?;
        let p = if prefix.is_empty() {
            String::new()
        } else {
            format!("{}:", prefix)
        };

        let next_id = id_entries(xml, b"sldIdLst", b"sldId", main)?
            .iter()
            .filter_map(|entry| entry.id)
            .max()
            .map_or(MIN_SLIDE_ID, |max| (max + 1).max(MIN_SLIDE_ID));
        let entry = format!(r#"<{}sldId id="{}" r:id="{}"/>"#, p, next_id, rel_id);
        debug!("Registering slide id {} -> {} in {}", next_id, rel_id, main);

        let list = format!("<{p}sldIdLst>{entry}</{p}sldIdLst>", p = p, entry = entry);
        match root_child(xml, b"sldIdLst", main)? {
            Some(ChildSpan {
                close: Some(close), ..
            }) => return Ok(splice(xml, close, &entry)),
            // `<p:sldIdLst/>` has no closing tag; replace it outright.
            Some(ChildSpan { start, end, .. }) => {
                let mut out = xml[..start].to_vec();
                out.extend_from_slice(list.as_bytes());
                out.extend_from_slice(&xml[end..]);
                return Ok(out);
            }
            None => {}
        }

        // The list must follow the master id lists.
        let mut anchor = None;
        let master_lists: [&[u8]; 3] = [b"sldMasterIdLst", b"notesMasterIdLst", b"handoutMasterIdLst"];
        for element in master_lists {
            if let Some(span) = root_child(xml, element, main)? {
                anchor = Some(anchor.map_or(span.end, |a: usize| a.max(span.end)));
            }
        }
        let anchor =
            anchor.ok_or_else(|| PptError::xml(main, "presentation has no slide master list"))?;
        Ok(splice(xml, anchor, &list))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_slides_in_presentation_order() {
        let deck = Deck::blank(3);
        assert_eq!(
            deck.slide_parts().unwrap(),
            vec![
                "ppt/slides/slide1.xml",
                "ppt/slides/slide2.xml",
                "ppt/slides/slide3.xml"
            ]
        );
        assert_eq!(deck.main_part().unwrap(), "ppt/presentation.xml");
    }

    #[test]
    fn slide_order_follows_id_list_not_file_names() {
        let mut deck = Deck::blank(2);
        let main = "ppt/presentation.xml";
        let xml = String::from_utf8(deck.part(main).unwrap().to_vec()).unwrap();
        let swapped = xml.replace(
            r#"<p:sldId id="256" r:id="rId3"/><p:sldId id="257" r:id="rId4"/>"#,
            r#"<p:sldId id="257" r:id="rId4"/><p:sldId id="256" r:id="rId3"/>"#,
        );
        assert_ne!(xml, swapped);
        deck.set_part(main, swapped.into_bytes());

        assert_eq!(deck.slide_part(0).unwrap(), "ppt/slides/slide2.xml");
    }

    #[test]
    fn lists_seven_stock_layouts() {
        let layouts = Deck::blank(1).slide_layout_parts().unwrap();
        assert_eq!(layouts.len(), 7);
        assert_eq!(layouts[5], "ppt/slideLayouts/slideLayout6.xml");
    }

    #[test]
    fn appends_title_only_slide() {
        let mut deck = Deck::blank(2);
        let index = deck.append_slide(5).unwrap();

        assert_eq!(index, 2);
        assert_eq!(deck.slide_count().unwrap(), 3);
        let part = deck.slide_part(2).unwrap();
        assert_eq!(part, "ppt/slides/slide3.xml");

        let xml = String::from_utf8(deck.part(&part).unwrap().to_vec()).unwrap();
        assert!(xml.contains(r#"<p:ph type="title"/>"#));
        assert!(!xml.contains("sldNum"));
        assert!(!xml.contains(r#"type="dt""#));

        let rels = deck.relationships(&part).unwrap();
        assert_eq!(
            rels.first_of_type(rel_types::SLIDE_LAYOUT).unwrap().target,
            "../slideLayouts/slideLayout6.xml"
        );

        let main = String::from_utf8(deck.part("ppt/presentation.xml").unwrap().to_vec()).unwrap();
        assert!(main.contains(r#"<p:sldId id="258" r:id="rId5"/></p:sldIdLst>"#));
        assert_eq!(
            deck.content_types().unwrap().override_for(&part),
            Some(content_type_names::SLIDE)
        );
    }

    #[test]
    fn appends_to_deck_without_slides() {
        let mut deck = Deck::blank(0);
        assert_eq!(deck.slide_count().unwrap(), 0);

        assert_eq!(deck.append_slide(0).unwrap(), 0);
        let main = String::from_utf8(deck.part("ppt/presentation.xml").unwrap().to_vec()).unwrap();
        assert!(main.contains(r#"</p:sldMasterIdLst><p:sldIdLst><p:sldId id="256""#));

        let xml = String::from_utf8(deck.part("ppt/slides/slide1.xml").unwrap().to_vec()).unwrap();
        assert!(xml.contains(r#"<p:ph type="ctrTitle"/>"#));
        assert!(xml.contains(r#"<p:ph type="subTitle" idx="1"/>"#));
    }

    const SECTIONS: &str = r#"<p:extLst><p:ext uri="{521415D9-36F7-43E2-AB2F-B90AF26B5E84}"><p14:sectionLst xmlns:p14="http://schemas.microsoft.com/office/powerpoint/2010/main"><p14:section name="Default Section" id="{0B1C3F5E-64A2-4C1B-9E7D-2F6A8B9C0D11}"><p14:sldIdLst><p14:sldId id="256"/><p14:sldId id="257"/><p14:sldId id="258"/></p14:sldIdLst></p14:section></p14:sectionLst></p:ext></p:extLst>"#;

    fn edit_main(deck: &mut Deck, edit: impl Fn(String) -> String) {
        let main = "ppt/presentation.xml";
        let xml = String::from_utf8(deck.part(main).unwrap().to_vec()).unwrap();
        deck.set_part(main, edit(xml).into_bytes());
    }

    #[test]
    fn section_list_ids_are_not_slides() {
        let mut deck = Deck::blank(3);
        edit_main(&mut deck, |xml| {
            xml.replace("</p:presentation>", &format!("{}</p:presentation>", SECTIONS))
        });

        assert_eq!(deck.slide_count().unwrap(), 3);
        assert_eq!(deck.append_slide(5).unwrap(), 3);

        let main = String::from_utf8(deck.part("ppt/presentation.xml").unwrap().to_vec()).unwrap();
        assert!(main.contains(r#"<p:sldId id="259" r:id="rId6"/></p:sldIdLst>"#));
        assert!(main.contains(r#"<p14:sldId id="258"/></p14:sldIdLst>"#));
    }

    #[test]
    fn replaces_empty_slide_id_list() {
        let mut deck = Deck::blank(0);
        edit_main(&mut deck, |xml| {
            xml.replace(
                "</p:sldMasterIdLst>",
                "</p:sldMasterIdLst><p:sldIdLst/>",
            )
            .replace("</p:presentation>", &format!("{}</p:presentation>", SECTIONS))
        });

        assert_eq!(deck.append_slide(6).unwrap(), 0);
        let main = String::from_utf8(deck.part("ppt/presentation.xml").unwrap().to_vec()).unwrap();
        assert!(main.contains(r#"</p:sldMasterIdLst><p:sldIdLst><p:sldId id="256" r:id="rId3"/></p:sldIdLst>"#));
        assert!(!main.contains("<p:sldIdLst/>"));
        assert_eq!(deck.slide_count().unwrap(), 1);
    }

    #[test]
    fn finds_root_children_only() {
        let xml = br#"<p:presentation><p:extLst><p:sldIdLst/></p:extLst><p:sldIdLst><p:sldId/></p:sldIdLst><p:notesSz/></p:presentation>"#;

        let list = root_child(xml, b"sldIdLst", "p").unwrap().unwrap();
        assert_eq!(&xml[list.start..list.start + 12], b"<p:sldIdLst>");
        assert_eq!(&xml[list.close.unwrap()..list.end], b"</p:sldIdLst>");

        let notes = root_child(xml, b"notesSz", "p").unwrap().unwrap();
        assert_eq!(notes.close, None);
        assert_eq!(&xml[notes.start..notes.end], b"<p:notesSz/>");

        assert_eq!(root_child(xml, b"sldId", "p").unwrap(), None);
    }

    #[test]
    fn missing_layout_is_reported() {
        let mut deck = Deck::blank(1);
        let err = deck.append_slide(9).unwrap_err();
        assert!(matches!(
            err,
            PptError::LayoutNotFound {
                index: 9,
                available: 7
            }
        ));
        assert_eq!(deck.slide_count().unwrap(), 1);
    }

    #[test]
    fn reads_layout_placeholders() {
        let deck = Deck::blank(0);
        let xml = deck.part("ppt/slideLayouts/slideLayout2.xml").unwrap();
        let placeholders = layout_placeholders(xml, "layout").unwrap();
        let types: Vec<&str> = placeholders.iter().map(|p| p.ph_type.as_str()).collect();
        assert_eq!(types, ["title", "body", "dt", "ftr", "sldNum"]);
        assert_eq!(placeholders[1].idx, 1);
    }
}
