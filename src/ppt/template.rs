//! Blank template deck
//! A minimal 4:3 package with one master, the seven stock layouts and N empty slides.
//! Used when no template is supplied and as a test fixture.

use super::{Deck, PPTX_CONTENT_TYPE, SLIDE_HEIGHT, SLIDE_WIDTH};

/// Stock layouts in PowerPoint's default order: (name, type, placeholders).
/// Index 5 is "Title Only", the layout the summary slide uses by default.
const LAYOUTS: [(&str, &str, &[&str]); 7] = [
    ("Title Slide", "title", &["ctrTitle", "subTitle", "dt", "ftr", "sldNum"]),
    ("Title and Content", "obj", &["title", "body", "dt", "ftr", "sldNum"]),
    ("Section Header", "secHead", &["title", "body", "dt", "ftr", "sldNum"]),
    ("Two Content", "twoObj", &["title", "body", "body", "dt", "ftr", "sldNum"]),
    ("Comparison", "twoTxTwoObj", &["title", "body", "body", "dt", "ftr", "sldNum"]),
    ("Title Only", "titleOnly", &["title", "dt", "ftr", "sldNum"]),
    ("Blank", "blank", &["dt", "ftr", "sldNum"]),
];

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

const EMPTY_GROUP: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#;

impl Deck {
    /// Build a blank deck with `slide_count` slides on the "Blank" layout.
    pub fn blank(slide_count: usize) -> Self {
        let mut deck = Self::empty();

        deck.put("[Content_Types].xml", content_types_xml(slide_count));
        deck.put("_rels/.rels", root_rels_xml());
        deck.put("ppt/presentation.xml", presentation_xml(slide_count));
        deck.put(
            "ppt/_rels/presentation.xml.rels",
            presentation_rels_xml(slide_count),
        );

        for slide_num in 1..=slide_count {
            deck.put(&format!("ppt/slides/slide{}.xml", slide_num), blank_slide_xml());
            deck.put(
                &format!("ppt/slides/_rels/slide{}.xml.rels", slide_num),
                single_rel_xml(
                    super::rel_types::SLIDE_LAYOUT,
                    &format!("../slideLayouts/slideLayout{}.xml", LAYOUTS.len()),
                ),
            );
        }

        for (i, (name, kind, placeholders)) in LAYOUTS.iter().enumerate() {
            let num = i + 1;
            deck.put(
                &format!("ppt/slideLayouts/slideLayout{}.xml", num),
                slide_layout_xml(name, kind, placeholders),
            );
            deck.put(
                &format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", num),
                single_rel_xml(
                    super::rel_types::SLIDE_MASTER,
                    "../slideMasters/slideMaster1.xml",
                ),
            );
        }

        deck.put("ppt/slideMasters/slideMaster1.xml", slide_master_xml());
        deck.put(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            master_rels_xml(),
        );
        deck.put("ppt/theme/theme1.xml", theme_xml().to_string());
        deck.put("docProps/core.xml", core_props_xml());
        deck.put("docProps/app.xml", app_props_xml(slide_count));

        deck
    }

    fn put(&mut self, name: &str, xml: String) {
        self.set_part(name, xml.into_bytes());
    }
}

fn content_types_xml(slide_count: usize) -> String {
    let mut xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>
<Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>
<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>
"#
    .to_string();

    xml.push_str(&format!(
        r#"<Override PartName="/ppt/presentation.xml" ContentType="{}.main+xml"/>"#,
        PPTX_CONTENT_TYPE
    ));
    xml.push('\n');
    for i in 1..=LAYOUTS.len() {
        xml.push_str(&format!(
            r#"<Override PartName="/ppt/slideLayouts/slideLayout{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>"#,
            i
        ));
        xml.push('\n');
    }
    for i in 1..=slide_count {
        xml.push_str(&format!(
            r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="{}"/>"#,
            i,
            super::content_type_names::SLIDE
        ));
        xml.push('\n');
    }
    xml.push_str("</Types>");
    xml
}

fn root_rels_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="{}" Target="ppt/presentation.xml"/>
<Relationship Id="rId2" Type="{}" Target="docProps/core.xml"/>
<Relationship Id="rId3" Type="{}" Target="docProps/app.xml"/>
</Relationships>"#,
        super::rel_types::OFFICE_DOCUMENT,
        super::rel_types::CORE_PROPERTIES,
        super::rel_types::EXTENDED_PROPERTIES
    )
}

fn single_rel_xml(rel_type: &str, target: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="{}" Target="{}"/>
</Relationships>"#,
        rel_type, target
    )
}

fn presentation_rels_xml(slide_count: usize) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="{}" Target="slideMasters/slideMaster1.xml"/>
<Relationship Id="rId2" Type="{}" Target="theme/theme1.xml"/>
"#,
        super::rel_types::SLIDE_MASTER,
        super::rel_types::THEME
    );

    for i in 1..=slide_count {
        xml.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="{}" Target="slides/slide{}.xml"/>"#,
            i + 2,
            super::rel_types::SLIDE,
            i
        ));
        xml.push('\n');
    }
    xml.push_str("</Relationships>");
    xml
}

fn presentation_xml(slide_count: usize) -> String {
    let slide_ids: String = (1..=slide_count)
        .map(|i| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 255 + i, i + 2))
        .collect();
    let slide_list = if slide_ids.is_empty() {
        String::new()
    } else {
        format!("<p:sldIdLst>{}</p:sldIdLst>", slide_ids)
    };

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation {} saveSubsetFonts="1">
<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>
{}
<p:sldSz cx="{}" cy="{}" type="screen4x3"/>
<p:notesSz cx="{}" cy="{}"/>
</p:presentation>"#,
        NS, slide_list, SLIDE_WIDTH, SLIDE_HEIGHT, SLIDE_HEIGHT, SLIDE_WIDTH
    )
}

fn blank_slide_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld {}>
<p:cSld><p:spTree>{}</p:spTree></p:cSld>
<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
</p:sld>"#,
        NS, EMPTY_GROUP
    )
}

fn placeholder_sp(id: usize, ph_type: &str, idx: usize) -> String {
    let idx_attr = if idx > 0 {
        format!(r#" idx="{}""#, idx)
    } else {
        String::new()
    };
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{ph_type} {id}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="{ph_type}"{idx_attr}/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang="en-US"/></a:p></p:txBody></p:sp>"#
    )
}

fn slide_layout_xml(name: &str, kind: &str, placeholders: &[&str]) -> String {
    let shapes: String = placeholders
        .iter()
        .enumerate()
        .map(|(i, ph_type)| {
            // Titles are unindexed; every other placeholder gets its position as idx.
            let idx = if matches!(*ph_type, "title" | "ctrTitle") { 0 } else { i };
            placeholder_sp(i + 2, ph_type, idx)
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldLayout {} type="{}" preserve="1">
<p:cSld name="{}"><p:spTree>{}{}</p:spTree></p:cSld>
<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>
</p:sldLayout>"#,
        NS, kind, name, EMPTY_GROUP, shapes
    )
}

fn slide_master_xml() -> String {
    let layout_ids: String = (1..=LAYOUTS.len())
        .map(|i| {
            format!(
                r#"<p:sldLayoutId id="{}" r:id="rId{}"/>"#,
                2147483648u64 + i as u64,
                i
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldMaster {}>
<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree>{}{}</p:spTree></p:cSld>
<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>
<p:sldLayoutIdLst>{}</p:sldLayoutIdLst>
</p:sldMaster>"#,
        NS,
        EMPTY_GROUP,
        placeholder_sp(2, "title", 0),
        layout_ids
    )
}

fn master_rels_xml() -> String {
    let mut xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
"#
    .to_string();
    for i in 1..=LAYOUTS.len() {
        xml.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="{}" Target="../slideLayouts/slideLayout{}.xml"/>"#,
            i,
            super::rel_types::SLIDE_LAYOUT,
            i
        ));
        xml.push('\n');
    }
    xml.push_str(&format!(
        r#"<Relationship Id="rId{}" Type="{}" Target="../theme/theme1.xml"/>"#,
        LAYOUTS.len() + 1,
        super::rel_types::THEME
    ));
    xml.push_str("\n</Relationships>");
    xml
}

fn theme_xml() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="PCA Theme">
<a:themeElements>
<a:clrScheme name="PCA"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="1F2A44"/></a:dk2><a:lt2><a:srgbClr val="EEF1F5"/></a:lt2><a:accent1><a:srgbClr val="3498DB"/></a:accent1><a:accent2><a:srgbClr val="E74C3C"/></a:accent2><a:accent3><a:srgbClr val="2ECC71"/></a:accent3><a:accent4><a:srgbClr val="F39C12"/></a:accent4><a:accent5><a:srgbClr val="9B59B6"/></a:accent5><a:accent6><a:srgbClr val="1ABC9C"/></a:accent6><a:hlink><a:srgbClr val="0563C1"/></a:hlink><a:folHlink><a:srgbClr val="954F72"/></a:folHlink></a:clrScheme>
<a:fontScheme name="PCA"><a:majorFont><a:latin typeface="Arial"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="Arial"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme>
<a:fmtScheme name="PCA">
<a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"><a:tint val="50000"/></a:schemeClr></a:solidFill><a:solidFill><a:schemeClr val="phClr"><a:shade val="80000"/></a:schemeClr></a:solidFill></a:fillStyleLst>
<a:lnStyleLst><a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="12700"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="19050"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst>
<a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst>
<a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"><a:tint val="95000"/></a:schemeClr></a:solidFill><a:solidFill><a:schemeClr val="phClr"><a:shade val="90000"/></a:schemeClr></a:solidFill></a:bgFillStyleLst>
</a:fmtScheme>
</a:themeElements>
<a:objectDefaults/>
<a:extraClrSchemeLst/>
</a:theme>"#
}

fn core_props_xml() -> String {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
<dc:title>PCA Template</dc:title>
<dc:creator>PCA Commentary Generator</dc:creator>
<cp:revision>1</cp:revision>
</cp:coreProperties>"#
        .to_string()
}

fn app_props_xml(slide_count: usize) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">
<Application>PCA Commentary Generator</Application>
<PresentationFormat>On-screen Show (4:3)</PresentationFormat>
<Slides>{}</Slides>
<AppVersion>16.0000</AppVersion>
</Properties>"#,
        slide_count
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_deck_declares_main_presentation_part() {
        let deck = Deck::blank(2);
        let types = deck.content_types().unwrap();
        assert_eq!(
            types.override_for("ppt/presentation.xml"),
            Some("application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml")
        );
        assert_eq!(deck.part_names().filter(|n| n.starts_with("ppt/slides/slide")).count(), 2);
    }
}
