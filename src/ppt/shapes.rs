//! Slide shape tree editing: text boxes and chart graphic frames.

use super::{
    content_type_names, points_to_centipoints, rel_types, relationships, Deck, EmuRect, PptError,
};
use crate::config::TextBoxStyle;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

/// Largest `cNvPr/@id` in a slide, 1 for an empty tree.
pub(crate) fn max_shape_id(xml: &[u8], part: &str) -> Result<u32, PptError> {
    let mut reader = Reader::from_reader(xml);
    let mut max_id = 1;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if e.local_name().as_ref() == b"cNvPr" =>
            {
                let id = e
                    .attributes()
                    .flatten()
                    .find(|a| a.key.as_ref() == b"id")
                    .and_then(|a| std::str::from_utf8(&a.value).ok()?.parse::<u32>().ok());
                if let Some(id) = id {
                    max_id = max_id.max(id);
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(PptError::xml(part, err)),
            _ => {}
        }
    }

    Ok(max_id)
}

/// Byte offset of the `</...>` tag closing the first element named `local_name`.
pub(crate) fn closing_tag_offset(
    xml: &[u8],
    local_name: &[u8],
    part: &str,
) -> Result<Option<usize>, PptError> {
    let mut reader = Reader::from_reader(xml);

    loop {
        match reader.read_event() {
            Ok(Event::End(ref e)) if e.local_name().as_ref() == local_name => {
                let end = reader.buffer_position() as usize;
                let start = xml[..end]
                    .windows(2)
                    .rposition(|w| w == b"</")
                    .ok_or_else(|| PptError::xml(part, "unterminated closing tag"))?;
                return Ok(Some(start));
            }
            Ok(Event::Eof) => return Ok(None),
            Err(err) => return Err(PptError::xml(part, err)),
            _ => {}
        }
    }
}

/// Splice `fragment` in front of the closing `spTree` tag.
pub(crate) fn append_to_sp_tree(
    xml: &[u8],
    fragment: &str,
    part: &str,
) -> Result<Vec<u8>, PptError> {
    let offset = closing_tag_offset(xml, b"spTree", part)?
        .ok_or_else(|| PptError::xml(part, "slide has no shape tree"))?;

    let mut out = Vec::with_capacity(xml.len() + fragment.len());
    out.extend_from_slice(&xml[..offset]);
    out.extend_from_slice(fragment.as_bytes());
    out.extend_from_slice(&xml[offset..]);
    Ok(out)
}

/// `p:sp` text box with one paragraph holding one styled run.
pub(crate) fn text_box_xml(id: u32, rect: EmuRect, text: &str, style: &TextBoxStyle) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="TextBox {}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr><p:txBody><a:bodyPr wrap="none"><a:spAutoFit/></a:bodyPr><a:lstStyle/><a:p><a:r><a:rPr lang="en-US" sz="{}" dirty="0"><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:latin typeface="{}"/></a:rPr><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp>"#,
        id,
        id - 1,
        rect.x,
        rect.y,
        rect.cx,
        rect.cy,
        points_to_centipoints(style.font_size_pt),
        style.color.to_ascii_uppercase(),
        escape(&style.font_name),
        escape(text)
    )
}

/// `p:graphicFrame` hosting a chart part referenced by `rel_id`.
pub(crate) fn chart_frame_xml(id: u32, rect: EmuRect, rel_id: &str) -> String {
    format!(
        r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="{}" name="Chart {}"/><p:cNvGraphicFramePr><a:graphicFrameLocks noGrp="1"/></p:cNvGraphicFramePr><p:nvPr/></p:nvGraphicFramePr><p:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></p:xfrm><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/chart"><c:chart xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" r:id="{}"/></a:graphicData></a:graphic></p:graphicFrame>"#,
        id,
        id - 1,
        rect.x,
        rect.y,
        rect.cx,
        rect.cy,
        rel_id
    )
}

impl Deck {
    /// Add a single-run text box to the slide at `slide_index`.
    pub fn add_text_box(
        &mut self,
        slide_index: usize,
        rect: EmuRect,
        text: &str,
        style: &TextBoxStyle,
    ) -> Result<(), PptError> {
        let part = self.slide_part(slide_index)?;
        let xml = self.require_part(&part)?;
        let id = max_shape_id(xml, &part)? + 1;
        let updated = append_to_sp_tree(xml, &text_box_xml(id, rect, text, style), &part)?;
        self.set_part(&part, updated);

        debug!("Added text box #{} to slide {} ({})", id, slide_index, part);
        Ok(())
    }

    /// Store a chart part (and its embedded workbook) and frame it on a slide.
    ///
    /// `chart_xml` must reference the workbook through relationship `rId1`.
    pub fn add_chart(
        &mut self,
        slide_index: usize,
        rect: EmuRect,
        chart_xml: Vec<u8>,
        workbook: Vec<u8>,
    ) -> Result<String, PptError> {
        let slide = self.slide_part(slide_index)?;
        let chart_part = self.next_part_name("ppt/charts/chart", ".xml");
        let workbook_part =
            self.next_part_name("ppt/embeddings/Microsoft_Excel_Sheet", ".xlsx");

        let mut chart_rels = super::Relationships::new();
        chart_rels.add(
            rel_types::PACKAGE,
            &relationships::relative_target(&chart_part, &workbook_part),
        );
        self.set_part(&chart_part, chart_xml);
        self.set_relationships(&chart_part, &chart_rels);
        self.set_part(&workbook_part, workbook);

        let mut types = self.content_types()?;
        types.add_override(&chart_part, content_type_names::CHART);
        types.ensure_default("xlsx", content_type_names::XLSX);
        self.set_content_types(&types);

        let mut slide_rels = self.relationships(&slide)?;
        let rel_id = slide_rels.add(
            rel_types::CHART,
            &relationships::relative_target(&slide, &chart_part),
        );
        self.set_relationships(&slide, &slide_rels);

        let xml = self.require_part(&slide)?;
        let id = max_shape_id(xml, &slide)? + 1;
        let updated = append_to_sp_tree(xml, &chart_frame_xml(id, rect, &rel_id), &slide)?;
        self.set_part(&slide, updated);

        debug!("Added {} to slide {} as {}", chart_part, slide_index, rel_id);
        Ok(chart_part)
    }
}
